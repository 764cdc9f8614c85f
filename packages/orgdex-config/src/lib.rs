mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Cache, CachePhase, Config, Directory, Postgres, Search, Security, Service, Storage,
	StorageBackend,
};

use std::{fs, path::Path};

const MAX_SNAPSHOT_CAP: u32 = 500;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	for (label, value) in [
		("service.http_bind", &cfg.service.http_bind),
		("service.admin_bind", &cfg.service.admin_bind),
		("service.log_level", &cfg.service.log_level),
	] {
		if value.trim().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}

	match (cfg.storage.backend, cfg.storage.postgres.as_ref()) {
		(StorageBackend::Postgres, None) => {
			return Err(Error::Validation {
				message: "storage.postgres is required when storage.backend is postgres."
					.to_string(),
			});
		},
		(StorageBackend::Postgres, Some(postgres)) => {
			if postgres.dsn.trim().is_empty() {
				return Err(Error::Validation {
					message: "storage.postgres.dsn must be non-empty.".to_string(),
				});
			}
			if postgres.pool_max_conns == 0 {
				return Err(Error::Validation {
					message: "storage.postgres.pool_max_conns must be greater than zero."
						.to_string(),
				});
			}
		},
		(StorageBackend::Memory, _) => {},
	}

	if cfg.cache.snapshot_cap == 0 || cfg.cache.snapshot_cap > MAX_SNAPSHOT_CAP {
		return Err(Error::Validation {
			message: format!("cache.snapshot_cap must be in the range 1-{MAX_SNAPSHOT_CAP}."),
		});
	}
	if cfg.directory.max_page_size == 0 {
		return Err(Error::Validation {
			message: "directory.max_page_size must be greater than zero.".to_string(),
		});
	}
	if cfg.directory.default_page_size == 0
		|| cfg.directory.default_page_size > cfg.directory.max_page_size
	{
		return Err(Error::Validation {
			message: "directory.default_page_size must be between 1 and directory.max_page_size."
				.to_string(),
		});
	}
	if cfg.directory.batch_limit == 0 {
		return Err(Error::Validation {
			message: "directory.batch_limit must be greater than zero.".to_string(),
		});
	}
	if cfg.search.max_candidates == 0 {
		return Err(Error::Validation {
			message: "search.max_candidates must be greater than zero.".to_string(),
		});
	}
	if cfg.search.default_max_results == 0
		|| cfg.search.default_max_results > cfg.search.max_candidates
	{
		return Err(Error::Validation {
			message: "search.default_max_results must be between 1 and search.max_candidates."
				.to_string(),
		});
	}

	let user_header = cfg.security.user_header.trim();
	let role_header = cfg.security.role_header.trim();

	if user_header.is_empty() || role_header.is_empty() {
		return Err(Error::Validation {
			message: "security.user_header and security.role_header must be non-empty."
				.to_string(),
		});
	}
	if user_header.eq_ignore_ascii_case(role_header) {
		return Err(Error::Validation {
			message: "security.user_header and security.role_header must differ.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg
		.security
		.admin_auth_token
		.as_deref()
		.map(|token| token.trim().is_empty())
		.unwrap_or(false)
	{
		cfg.security.admin_auth_token = None;
	}

	cfg.security.user_header = cfg.security.user_header.trim().to_ascii_lowercase();
	cfg.security.role_header = cfg.security.role_header.trim().to_ascii_lowercase();
}
