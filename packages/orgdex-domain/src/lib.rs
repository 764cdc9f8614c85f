pub mod entity;
pub mod entity_type;
pub mod fuzzy;
pub mod role;
pub mod text;
pub mod time_serde;
pub mod visibility;

pub use entity::Entity;
pub use entity_type::EntityType;
pub use role::{Caller, Role};
pub use visibility::{Visibility, VisibilityFilter, can_view, visibility_filter_for};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
	#[error("Unknown role '{0}'.")]
	UnknownRole(String),
	#[error("Unknown visibility '{0}'.")]
	UnknownVisibility(String),
	#[error("Unknown entity type '{0}'.")]
	UnknownEntityType(String),
}
