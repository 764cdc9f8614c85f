use std::sync::Arc;

use color_eyre::eyre;

use orgdex_config::{Config, StorageBackend};
use orgdex_service::DirectoryService;
use orgdex_storage::{Db, EntityStore, MemoryStore};

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<DirectoryService>,
}
impl AppState {
	/// Connects the configured backend and wraps it in a directory service.
	pub async fn new(config: Config) -> color_eyre::Result<Self> {
		let store: Arc<dyn EntityStore> = match config.storage.backend {
			StorageBackend::Memory => Arc::new(MemoryStore::new()),
			StorageBackend::Postgres => {
				let Some(postgres) = config.storage.postgres.as_ref() else {
					return Err(eyre::eyre!(
						"storage.postgres is required when storage.backend is postgres."
					));
				};
				let db = Db::connect(postgres).await?;

				db.ensure_schema().await?;

				Arc::new(db)
			},
		};

		tracing::info!(
			backend = store.backend_name(),
			phase = ?config.cache.phase,
			synthetic = config.cache.use_synthetic_data,
			"Entity store ready."
		);

		Ok(Self::with_store(config, store))
	}

	pub fn with_store(config: Config, store: Arc<dyn EntityStore>) -> Self {
		Self { service: Arc::new(DirectoryService::new(config, store)) }
	}
}
