use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use toml::{Table, Value};

use orgdex_config::{CachePhase, Config, Error, StorageBackend};

const SAMPLE_CONFIG_TEMPLATE_TOML: &str = include_str!("fixtures/sample_config.template.toml");

fn sample_table() -> Table {
	toml::from_str(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Failed to parse template config.")
}

fn section<'a>(root: &'a mut Table, name: &str) -> &'a mut Table {
	root.get_mut(name)
		.and_then(Value::as_table_mut)
		.unwrap_or_else(|| panic!("Template config must include [{name}]."))
}

fn render(root: &Table) -> String {
	toml::to_string(root).expect("Failed to render template config.")
}

fn write_temp_config(payload: String) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System time must be valid.")
		.as_nanos();
	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let pid = std::process::id();
	let mut path = env::temp_dir();

	path.push(format!("orgdex_config_test_{nanos}_{pid}_{ordinal}.toml"));

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn load_payload(payload: String) -> orgdex_config::Result<Config> {
	let path = write_temp_config(payload);
	let result = orgdex_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	result
}

fn expect_validation_message(payload: String, expected: &str) {
	let err = load_payload(payload).expect_err("Expected validation error.");

	assert!(matches!(err, Error::Validation { .. }), "Unexpected error kind: {err:?}");

	let message = err.to_string();

	assert!(message.contains(expected), "Unexpected error message: {message}");
}

#[test]
fn sample_config_loads_and_normalizes() {
	let cfg = load_payload(render(&sample_table())).expect("Sample config must load.");

	assert_eq!(cfg.storage.backend, StorageBackend::Postgres);
	assert_eq!(cfg.cache.phase, CachePhase::Build);
	assert_eq!(cfg.cache.snapshot_cap, 50);
	assert_eq!(cfg.directory.batch_limit, 100);
	assert_eq!(cfg.security.user_header, "x-orgdex-user");
	assert!(cfg.security.admin_auth_token.is_none());
}

#[test]
fn optional_sections_fall_back_to_defaults() {
	let mut root = sample_table();

	root.remove("cache");
	root.remove("directory");
	root.remove("search");

	let cfg = load_payload(render(&root)).expect("Config without optional sections must load.");

	assert_eq!(cfg.cache.phase, CachePhase::Live);
	assert!(!cfg.cache.use_synthetic_data);
	assert_eq!(cfg.directory.default_page_size, 20);
	assert_eq!(cfg.search.max_candidates, 200);
	assert!(cfg.search.fuzzy_default);
}

#[test]
fn postgres_backend_requires_postgres_section() {
	let mut root = sample_table();

	section(&mut root, "storage").remove("postgres");

	expect_validation_message(render(&root), "storage.postgres is required");
}

#[test]
fn memory_backend_does_not_need_postgres() {
	let mut root = sample_table();
	let storage = section(&mut root, "storage");

	storage.insert("backend".to_string(), Value::String("memory".to_string()));
	storage.remove("postgres");

	let cfg = load_payload(render(&root)).expect("Memory backend config must load.");

	assert_eq!(cfg.storage.backend, StorageBackend::Memory);
}

#[test]
fn unknown_backend_fails_to_parse() {
	let mut root = sample_table();

	section(&mut root, "storage")
		.insert("backend".to_string(), Value::String("firestore".to_string()));

	let err = load_payload(render(&root)).expect_err("Expected parse error.");

	assert!(matches!(err, Error::ParseConfig { .. }), "Unexpected error kind: {err:?}");
}

#[test]
fn snapshot_cap_must_be_bounded() {
	for cap in [0, 501] {
		let mut root = sample_table();

		section(&mut root, "cache").insert("snapshot_cap".to_string(), Value::Integer(cap));

		expect_validation_message(render(&root), "cache.snapshot_cap must be in the range");
	}
}

#[test]
fn default_page_size_cannot_exceed_max() {
	let mut root = sample_table();

	section(&mut root, "directory")
		.insert("default_page_size".to_string(), Value::Integer(101));

	expect_validation_message(render(&root), "directory.default_page_size");
}

#[test]
fn default_max_results_cannot_exceed_candidates() {
	let mut root = sample_table();

	section(&mut root, "search").insert("default_max_results".to_string(), Value::Integer(201));

	expect_validation_message(render(&root), "search.default_max_results");
}

#[test]
fn identity_headers_must_differ() {
	let mut root = sample_table();

	section(&mut root, "security")
		.insert("role_header".to_string(), Value::String("X-ORGDEX-USER".to_string()));

	expect_validation_message(render(&root), "must differ");
}

#[test]
fn missing_file_reports_path() {
	let path = env::temp_dir().join("orgdex_config_missing_file.toml");
	let err = orgdex_config::load(&path).expect_err("Expected read error.");

	assert!(matches!(err, Error::ReadConfig { .. }));
	assert!(err.to_string().contains("orgdex_config_missing_file.toml"));
}
