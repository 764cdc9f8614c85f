//! Cache/phase coordination.
//!
//! In the build phase, or when synthetic data is enabled, reads are served from per-role
//! snapshots. A snapshot only ever holds public, non-confidential entities and is bounded by
//! `cache.snapshot_cap`. Every invalidation bumps a generation counter; a snapshot built under
//! an older generation is discarded rather than installed.

use std::{
	collections::HashMap,
	sync::{
		Arc, RwLock,
		atomic::{AtomicBool, AtomicU64, Ordering},
	},
};

use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use orgdex_config::CachePhase;
use orgdex_domain::{Entity, Role};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
	Build,
	Live,
}
impl Phase {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Build => "build",
			Self::Live => "live",
		}
	}
}

/// Immutable, public-only copy of a bounded entity subset.
#[derive(Debug)]
pub struct Snapshot {
	entities: Vec<Entity>,
	generation: u64,
	built_at: OffsetDateTime,
}
impl Snapshot {
	pub fn new<I>(entities: I, cap: usize, generation: u64) -> Self
	where
		I: IntoIterator<Item = Entity>,
	{
		let entities =
			entities.into_iter().filter(Entity::is_publicly_visible).take(cap).collect::<Vec<_>>();

		Self { entities, generation, built_at: OffsetDateTime::now_utc() }
	}

	pub fn entities(&self) -> &[Entity] {
		&self.entities
	}

	pub fn get(&self, id: Uuid) -> Option<&Entity> {
		self.entities.iter().find(|entity| entity.id == id)
	}

	pub fn len(&self) -> usize {
		self.entities.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entities.is_empty()
	}

	pub fn generation(&self) -> u64 {
		self.generation
	}

	pub fn built_at(&self) -> OffsetDateTime {
		self.built_at
	}
}

#[derive(Clone, Copy, Debug, Serialize)]
pub struct CacheStatus {
	pub phase: Phase,
	pub use_synthetic_data: bool,
	pub generation: u64,
	pub invalidations: u64,
	pub cached_buckets: usize,
}

pub struct CacheCoordinator {
	live: AtomicBool,
	use_synthetic_data: bool,
	snapshot_cap: usize,
	generation: AtomicU64,
	invalidations: AtomicU64,
	snapshots: RwLock<HashMap<Role, Arc<Snapshot>>>,
}
impl CacheCoordinator {
	pub fn new(cfg: &orgdex_config::Cache) -> Self {
		Self {
			live: AtomicBool::new(cfg.phase == CachePhase::Live),
			use_synthetic_data: cfg.use_synthetic_data,
			snapshot_cap: cfg.snapshot_cap as usize,
			generation: AtomicU64::new(0),
			invalidations: AtomicU64::new(0),
			snapshots: RwLock::new(HashMap::new()),
		}
	}

	pub fn phase(&self) -> Phase {
		if self.live.load(Ordering::Acquire) { Phase::Live } else { Phase::Build }
	}

	/// Switches to the live phase. Returns `false` when already live; there is no way back.
	pub fn enter_live(&self) -> bool {
		let switched = !self.live.swap(true, Ordering::AcqRel);

		if switched {
			self.snapshots.write().unwrap_or_else(|err| err.into_inner()).clear();

			tracing::info!(phase = Phase::Live.as_str(), "Cache phase transitioned.");
		}

		switched
	}

	pub fn use_synthetic_data(&self) -> bool {
		self.use_synthetic_data
	}

	pub fn snapshot_cap(&self) -> usize {
		self.snapshot_cap
	}

	/// Whether reads should try a snapshot before querying the store.
	pub fn serves_snapshots(&self) -> bool {
		self.use_synthetic_data || self.phase() == Phase::Build
	}

	pub fn generation(&self) -> u64 {
		self.generation.load(Ordering::Acquire)
	}

	pub fn invalidation_count(&self) -> u64 {
		self.invalidations.load(Ordering::Acquire)
	}

	pub fn lookup(&self, bucket: Role) -> Option<Arc<Snapshot>> {
		let snapshots = self.snapshots.read().unwrap_or_else(|err| err.into_inner());
		let snapshot = snapshots.get(&bucket)?;

		if snapshot.generation != self.generation() {
			return None;
		}

		Some(snapshot.clone())
	}

	/// Installs a snapshot unless an invalidation happened since its build started.
	pub fn install(&self, bucket: Role, snapshot: Snapshot) -> Option<Arc<Snapshot>> {
		let mut snapshots = self.snapshots.write().unwrap_or_else(|err| err.into_inner());

		// Checked under the write lock so a concurrent invalidation cannot interleave.
		if snapshot.generation != self.generation() {
			tracing::debug!(
				bucket = %bucket,
				built_generation = snapshot.generation,
				"Discarded stale cache snapshot."
			);

			return None;
		}

		let snapshot = Arc::new(snapshot);

		snapshots.insert(bucket, snapshot.clone());

		tracing::info!(
			bucket = %bucket,
			entities = snapshot.len(),
			generation = snapshot.generation,
			"Cache snapshot rebuilt."
		);

		Some(snapshot)
	}

	/// Drops the given buckets and bumps the generation. Safe to call repeatedly.
	pub fn invalidate(&self, buckets: &[Role], reason: &str) {
		let mut snapshots = self.snapshots.write().unwrap_or_else(|err| err.into_inner());

		for bucket in buckets {
			snapshots.remove(bucket);
		}

		let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;

		self.invalidations.fetch_add(1, Ordering::AcqRel);

		tracing::info!(reason, buckets = buckets.len(), generation, "Cache invalidated.");
	}

	/// Returns a guard that invalidates every bucket when dropped, including on cancellation.
	pub fn invalidate_on_drop<'a>(
		&'a self,
		reason: &'static str,
		entity_id: Uuid,
	) -> InvalidationGuard<'a> {
		InvalidationGuard { cache: self, reason, entity_id }
	}

	pub fn status(&self) -> CacheStatus {
		let cached_buckets = self.snapshots.read().unwrap_or_else(|err| err.into_inner()).len();

		CacheStatus {
			phase: self.phase(),
			use_synthetic_data: self.use_synthetic_data,
			generation: self.generation(),
			invalidations: self.invalidation_count(),
			cached_buckets,
		}
	}
}

#[must_use = "the cache is invalidated when the guard is dropped"]
pub struct InvalidationGuard<'a> {
	cache: &'a CacheCoordinator,
	reason: &'static str,
	entity_id: Uuid,
}
impl Drop for InvalidationGuard<'_> {
	fn drop(&mut self) {
		tracing::debug!(
			reason = self.reason,
			entity_id = %self.entity_id,
			"Releasing invalidation guard."
		);

		self.cache.invalidate(&Role::ALL, self.reason);
	}
}
