use std::{future::Future, pin::Pin};

use uuid::Uuid;

use crate::{
	Result,
	query::{Predicate, QueryDescriptor},
};
use orgdex_domain::Entity;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Persistence seam for directory entities and their presence side-data.
///
/// Presence rows are written by the realtime layer, outside this service, so the seam only
/// removes them. Backends expose an inherent `record_presence` for seeding.
///
/// Implementations must evaluate a [`QueryDescriptor`] exactly like
/// [`QueryDescriptor::apply`] does, so callers can switch backends without observable
/// differences in filtering, ordering, or cursor handling.
pub trait EntityStore
where
	Self: Send + Sync,
{
	fn backend_name(&self) -> &'static str;

	fn query<'a>(&'a self, descriptor: &'a QueryDescriptor) -> BoxFuture<'a, Result<Vec<Entity>>>;

	fn count<'a>(&'a self, filters: &'a [Predicate]) -> BoxFuture<'a, Result<u64>>;

	fn get<'a>(&'a self, id: Uuid) -> BoxFuture<'a, Result<Option<Entity>>>;

	/// Fails with [`crate::Error::Conflict`] when the id is already taken.
	fn insert<'a>(&'a self, entity: &'a Entity) -> BoxFuture<'a, Result<()>>;

	/// Replaces every mutable column. Fails with [`crate::Error::NotFound`] when absent.
	fn update<'a>(&'a self, entity: &'a Entity) -> BoxFuture<'a, Result<()>>;

	/// Returns whether a row was removed.
	fn delete<'a>(&'a self, id: Uuid) -> BoxFuture<'a, Result<bool>>;

	/// Returns the number of presence records removed.
	fn delete_presence<'a>(&'a self, entity_id: Uuid) -> BoxFuture<'a, Result<u64>>;
}
