#![allow(dead_code)]

use std::sync::{
	Arc,
	atomic::{AtomicBool, AtomicUsize, Ordering},
};

use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use orgdex_config::{
	Cache, CachePhase, Config, Directory, Search, Security, Service, Storage, StorageBackend,
};
use orgdex_domain::{Caller, Entity, EntityType, Role, Visibility};
use orgdex_service::DirectoryService;
use orgdex_storage::{
	BoxFuture, EntityStore, Error, MemoryStore, Result,
	query::{Predicate, QueryDescriptor},
};

pub fn config(phase: CachePhase, use_synthetic_data: bool) -> Config {
	Config {
		service: Service {
			http_bind: "127.0.0.1:0".to_string(),
			admin_bind: "127.0.0.1:0".to_string(),
			log_level: "info".to_string(),
		},
		storage: Storage { backend: StorageBackend::Memory, postgres: None },
		cache: Cache { phase, use_synthetic_data, snapshot_cap: 50 },
		directory: Directory::default(),
		search: Search::default(),
		security: Security {
			bind_localhost_only: true,
			user_header: "x-orgdex-user".to_string(),
			role_header: "x-orgdex-role".to_string(),
			admin_auth_token: None,
		},
	}
}

pub fn caller(user_id: &str, role: Role) -> Caller {
	Caller::new(user_id, role)
}

/// Entity added `age_secs` seconds before a fixed epoch, so larger ages sort later under the
/// default `date_added desc` order.
pub fn entity(name: &str, entity_type: EntityType, age_secs: i64) -> Entity {
	let at = OffsetDateTime::from_unix_timestamp(1_720_000_000).expect("Valid timestamp.")
		- Duration::seconds(age_secs);

	Entity {
		id: Uuid::new_v4(),
		added_by: "owner-1".to_string(),
		visibility: Some(Visibility::Public),
		is_confidential: false,
		name: name.to_string(),
		entity_type,
		short_description: format!("{name} company profile"),
		full_description: None,
		location: Some("Austin, TX".to_string()),
		founded_year: Some(2012),
		employee_count: Some(25),
		tags: Vec::new(),
		services: Vec::new(),
		industries: Vec::new(),
		certifications: Vec::new(),
		partnerships: Vec::new(),
		store: None,
		date_added: at,
		last_updated: at,
	}
}

pub fn with_visibility(
	mut entity: Entity,
	visibility: Visibility,
	is_confidential: bool,
) -> Entity {
	entity.visibility = Some(visibility);
	entity.is_confidential = is_confidential;

	entity
}

pub fn service(phase: CachePhase, entities: Vec<Entity>) -> (DirectoryService, Arc<MemoryStore>) {
	let store = Arc::new(MemoryStore::with_entities(entities));
	let service = DirectoryService::new(config(phase, false), store.clone());

	(service, store)
}

pub fn live_service(entities: Vec<Entity>) -> (DirectoryService, Arc<MemoryStore>) {
	service(CachePhase::Live, entities)
}

/// Memory store with switchable failures and a query counter.
#[derive(Default)]
pub struct FlakyStore {
	pub inner: MemoryStore,
	pub fail_queries: AtomicBool,
	pub fail_writes: AtomicBool,
	pub fail_presence: AtomicBool,
	pub queries: AtomicUsize,
}
impl FlakyStore {
	pub fn with_entities(entities: Vec<Entity>) -> Self {
		Self { inner: MemoryStore::with_entities(entities), ..Default::default() }
	}

	fn check(&self, flag: &AtomicBool) -> Result<()> {
		if flag.load(Ordering::SeqCst) {
			return Err(Error::InvalidArgument("Injected store failure.".to_string()));
		}

		Ok(())
	}
}
impl EntityStore for FlakyStore {
	fn backend_name(&self) -> &'static str {
		"flaky"
	}

	fn query<'a>(&'a self, descriptor: &'a QueryDescriptor) -> BoxFuture<'a, Result<Vec<Entity>>> {
		Box::pin(async move {
			self.queries.fetch_add(1, Ordering::SeqCst);
			self.check(&self.fail_queries)?;
			self.inner.query(descriptor).await
		})
	}

	fn count<'a>(&'a self, filters: &'a [Predicate]) -> BoxFuture<'a, Result<u64>> {
		Box::pin(async move {
			self.check(&self.fail_queries)?;
			self.inner.count(filters).await
		})
	}

	fn get<'a>(&'a self, id: Uuid) -> BoxFuture<'a, Result<Option<Entity>>> {
		Box::pin(async move {
			self.check(&self.fail_queries)?;
			self.inner.get(id).await
		})
	}

	fn insert<'a>(&'a self, entity: &'a Entity) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			self.check(&self.fail_writes)?;
			self.inner.insert(entity).await
		})
	}

	fn update<'a>(&'a self, entity: &'a Entity) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			self.check(&self.fail_writes)?;
			self.inner.update(entity).await
		})
	}

	fn delete<'a>(&'a self, id: Uuid) -> BoxFuture<'a, Result<bool>> {
		Box::pin(async move {
			self.check(&self.fail_writes)?;
			self.inner.delete(id).await
		})
	}

	fn delete_presence<'a>(&'a self, entity_id: Uuid) -> BoxFuture<'a, Result<u64>> {
		Box::pin(async move {
			self.check(&self.fail_presence)?;
			self.inner.delete_presence(entity_id).await
		})
	}
}
