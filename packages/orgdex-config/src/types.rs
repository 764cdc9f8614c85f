use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	#[serde(default)]
	pub cache: Cache,
	#[serde(default)]
	pub directory: Directory,
	#[serde(default)]
	pub search: Search,
	pub security: Security,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub admin_bind: String,
	pub log_level: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Storage {
	pub backend: StorageBackend,
	pub postgres: Option<Postgres>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
	Postgres,
	/// Process-local store. Used for demos, tests, and synthetic-data deployments.
	Memory,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Cache {
	/// Phase the process starts in. `build` serves reads from public-only snapshots until an
	/// operator switches the process to `live`.
	pub phase: CachePhase,
	pub use_synthetic_data: bool,
	pub snapshot_cap: u32,
}
impl Default for Cache {
	fn default() -> Self {
		Self { phase: CachePhase::Live, use_synthetic_data: false, snapshot_cap: 50 }
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CachePhase {
	Build,
	Live,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Directory {
	pub default_page_size: u32,
	pub max_page_size: u32,
	pub batch_limit: u32,
}
impl Default for Directory {
	fn default() -> Self {
		Self { default_page_size: 20, max_page_size: 100, batch_limit: 100 }
	}
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Search {
	pub default_max_results: u32,
	/// Upper bound on the oversampled candidate set fetched before scoring.
	pub max_candidates: u32,
	pub fuzzy_default: bool,
}
impl Default for Search {
	fn default() -> Self {
		Self { default_max_results: 50, max_candidates: 200, fuzzy_default: true }
	}
}

#[derive(Clone, Debug, Deserialize)]
pub struct Security {
	pub bind_localhost_only: bool,
	#[serde(default = "default_user_header")]
	pub user_header: String,
	#[serde(default = "default_role_header")]
	pub role_header: String,
	pub admin_auth_token: Option<String>,
}

fn default_user_header() -> String {
	"x-orgdex-user".to_string()
}

fn default_role_header() -> String {
	"x-orgdex-role".to_string()
}
