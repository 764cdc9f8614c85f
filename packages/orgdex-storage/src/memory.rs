use std::collections::HashMap;

use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
	Error, Result,
	query::{Predicate, QueryDescriptor},
	store::{BoxFuture, EntityStore},
};
use orgdex_domain::Entity;

/// Process-local store backed by hash maps.
#[derive(Default)]
pub struct MemoryStore {
	entities: RwLock<HashMap<Uuid, Entity>>,
	presence: RwLock<HashMap<Uuid, HashMap<String, OffsetDateTime>>>,
}
impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_entities<I>(entities: I) -> Self
	where
		I: IntoIterator<Item = Entity>,
	{
		let entities = entities.into_iter().map(|entity| (entity.id, entity)).collect();

		Self { entities: RwLock::new(entities), presence: RwLock::default() }
	}

	pub async fn len(&self) -> usize {
		self.entities.read().await.len()
	}

	pub async fn is_empty(&self) -> bool {
		self.entities.read().await.is_empty()
	}

	pub async fn record_presence(&self, entity_id: Uuid, user_id: &str, seen_at: OffsetDateTime) {
		self.presence
			.write()
			.await
			.entry(entity_id)
			.or_default()
			.insert(user_id.to_string(), seen_at);
	}

	pub async fn presence_count(&self, entity_id: Uuid) -> usize {
		self.presence.read().await.get(&entity_id).map_or(0, HashMap::len)
	}
}
impl EntityStore for MemoryStore {
	fn backend_name(&self) -> &'static str {
		"memory"
	}

	fn query<'a>(&'a self, descriptor: &'a QueryDescriptor) -> BoxFuture<'a, Result<Vec<Entity>>> {
		Box::pin(async move {
			descriptor.validate()?;

			let entities = self.entities.read().await;

			Ok(descriptor.apply(entities.values().cloned()))
		})
	}

	fn count<'a>(&'a self, filters: &'a [Predicate]) -> BoxFuture<'a, Result<u64>> {
		Box::pin(async move {
			for predicate in filters {
				predicate.validate()?;
			}

			let entities = self.entities.read().await;
			let count = entities
				.values()
				.filter(|entity| filters.iter().all(|predicate| predicate.matches(entity)))
				.count();

			Ok(count as u64)
		})
	}

	fn get<'a>(&'a self, id: Uuid) -> BoxFuture<'a, Result<Option<Entity>>> {
		Box::pin(async move { Ok(self.entities.read().await.get(&id).cloned()) })
	}

	fn insert<'a>(&'a self, entity: &'a Entity) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			let mut entities = self.entities.write().await;

			if entities.contains_key(&entity.id) {
				tracing::warn!(
					entity_id = %entity.id,
					"Entity insert conflicted with an existing id."
				);

				return Err(Error::Conflict(format!("Entity {} already exists.", entity.id)));
			}

			entities.insert(entity.id, entity.clone());

			Ok(())
		})
	}

	fn update<'a>(&'a self, entity: &'a Entity) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			let mut entities = self.entities.write().await;
			let Some(slot) = entities.get_mut(&entity.id) else {
				return Err(Error::NotFound(format!("Entity {} does not exist.", entity.id)));
			};

			*slot = entity.clone();

			Ok(())
		})
	}

	fn delete<'a>(&'a self, id: Uuid) -> BoxFuture<'a, Result<bool>> {
		Box::pin(async move { Ok(self.entities.write().await.remove(&id).is_some()) })
	}

	fn delete_presence<'a>(&'a self, entity_id: Uuid) -> BoxFuture<'a, Result<u64>> {
		Box::pin(async move {
			let removed = self.presence.write().await.remove(&entity_id);

			Ok(removed.map_or(0, |records| records.len() as u64))
		})
	}
}
