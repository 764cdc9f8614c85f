pub mod cache;
pub mod create;
pub mod delete;
pub mod fetch;
pub mod list;
pub mod query;
pub mod search;
pub mod synthetic;
pub mod update;

mod access;
mod error;
mod payload;

pub use cache::{CacheCoordinator, CacheStatus, InvalidationGuard, Phase, Snapshot};
pub use create::CreateEntityRequest;
pub use delete::DeleteResponse;
pub use error::{Error, Result};
pub use list::{ListRequest, ListResponse};
pub use query::{DirectoryFilters, SortRequest};
pub use search::{
	SearchRequest, SearchResponse,
	scoring::{RelevanceScorer, SearchResult},
};
pub use update::EntityPatch;

use std::sync::Arc;

use time::OffsetDateTime;
use uuid::Uuid;

use orgdex_config::Config;
use orgdex_domain::{Entity, Role, can_view};
use orgdex_storage::{EntityStore, query::QueryDescriptor};

/// Entity access and search engine over one pluggable store.
pub struct DirectoryService {
	pub cfg: Config,
	pub store: Arc<dyn EntityStore>,
	pub cache: CacheCoordinator,
}
impl DirectoryService {
	pub fn new(cfg: Config, store: Arc<dyn EntityStore>) -> Self {
		let cache = CacheCoordinator::new(&cfg.cache);

		Self { cfg, store, cache }
	}

	/// Snapshot for a role bucket when the coordinator serves snapshots. Build failures and
	/// empty or stale snapshots yield `None` so the caller falls through to a live query.
	pub(crate) async fn snapshot_for(&self, role: Role) -> Option<Arc<Snapshot>> {
		if !self.cache.serves_snapshots() {
			return None;
		}
		if let Some(snapshot) = self.cache.lookup(role) {
			tracing::debug!(bucket = %role, entities = snapshot.len(), "Cache snapshot hit.");

			return Some(snapshot);
		}

		tracing::debug!(bucket = %role, "Cache snapshot miss.");

		let generation = self.cache.generation();
		let source = if self.cache.use_synthetic_data() {
			Ok(synthetic::entities())
		} else {
			self.load_snapshot_source().await
		};
		let entities = match source {
			Ok(entities) => entities,
			Err(err) => {
				tracing::warn!(
					bucket = %role,
					error = %err,
					"Cache snapshot build failed. Falling through to a live query."
				);

				return None;
			},
		};
		let snapshot = Snapshot::new(entities, self.cache.snapshot_cap(), generation);

		if snapshot.is_empty() {
			tracing::debug!(
				bucket = %role,
				"Cache snapshot is empty. Falling through to a live query."
			);

			return None;
		}

		self.cache.install(role, snapshot)
	}

	async fn load_snapshot_source(&self) -> orgdex_storage::Result<Vec<Entity>> {
		let mut descriptor = QueryDescriptor::entities();

		descriptor.filters.extend(query::visibility_predicate(Role::Visitor));

		descriptor.pagination.limit = u32::try_from(self.cache.snapshot_cap()).ok();

		self.store.query(&descriptor).await
	}
}

/// Post-query guard. Drops anything the visibility policy rejects for `role`.
pub(crate) fn retain_visible(
	mut entities: Vec<Entity>,
	role: Role,
	operation: &str,
) -> Vec<Entity> {
	let before = entities.len();

	entities.retain(|entity| can_view(entity, role));

	if entities.len() != before {
		tracing::warn!(
			operation,
			role = %role,
			removed = before - entities.len(),
			"Visibility guard removed entities the query returned."
		);
	}

	entities
}

/// Current time at the microsecond precision every backend can store.
pub(crate) fn now() -> OffsetDateTime {
	let now = OffsetDateTime::now_utc();

	now.replace_nanosecond(now.nanosecond() / 1_000 * 1_000).unwrap_or(now)
}

pub(crate) fn not_found(id: Uuid) -> Error {
	Error::NotFound { message: format!("Entity {id} does not exist.") }
}
