pub mod db;
pub mod memory;
pub mod models;
pub mod queries;
pub mod query;
pub mod schema;
pub mod store;

mod error;

pub use db::Db;
pub use error::Error;
pub use memory::MemoryStore;
pub use store::{BoxFuture, EntityStore};

pub type Result<T, E = Error> = std::result::Result<T, E>;
