use sqlx::{PgPool, postgres::PgPoolOptions};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
	Result, queries,
	query::{Predicate, QueryDescriptor},
	schema,
	store::{BoxFuture, EntityStore},
};
use orgdex_domain::Entity;

pub struct Db {
	pub pool: PgPool,
}
impl Db {
	pub async fn connect(cfg: &orgdex_config::Postgres) -> Result<Self> {
		let pool =
			PgPoolOptions::new().max_connections(cfg.pool_max_conns).connect(&cfg.dsn).await?;

		Ok(Self { pool })
	}

	pub async fn ensure_schema(&self) -> Result<()> {
		let sql = schema::render_schema();
		let lock_id: i64 = 4_207_311;
		// Advisory locks are held per connection, so keep the lock inside one transaction.
		let mut tx = self.pool.begin().await?;

		sqlx::query("SELECT pg_advisory_xact_lock($1)").bind(lock_id).execute(&mut *tx).await?;

		let mut applied = 0_usize;

		for statement in sql.split(';') {
			let trimmed = statement.trim();

			if trimmed.is_empty() {
				continue;
			}

			sqlx::query(trimmed).execute(&mut *tx).await?;

			applied += 1;
		}

		tx.commit().await?;

		tracing::info!(statements = applied, "Schema ensured.");

		Ok(())
	}

	/// Upserts a presence row. The realtime layer owns these writes in production.
	pub async fn record_presence(
		&self,
		entity_id: Uuid,
		user_id: &str,
		seen_at: OffsetDateTime,
	) -> Result<()> {
		queries::upsert_presence(self, entity_id, user_id, seen_at).await
	}
}
impl EntityStore for Db {
	fn backend_name(&self) -> &'static str {
		"postgres"
	}

	fn query<'a>(&'a self, descriptor: &'a QueryDescriptor) -> BoxFuture<'a, Result<Vec<Entity>>> {
		Box::pin(queries::select_entities(self, descriptor))
	}

	fn count<'a>(&'a self, filters: &'a [Predicate]) -> BoxFuture<'a, Result<u64>> {
		Box::pin(queries::count_entities(self, filters))
	}

	fn get<'a>(&'a self, id: Uuid) -> BoxFuture<'a, Result<Option<Entity>>> {
		Box::pin(queries::fetch_entity(self, id))
	}

	fn insert<'a>(&'a self, entity: &'a Entity) -> BoxFuture<'a, Result<()>> {
		Box::pin(queries::insert_entity(self, entity))
	}

	fn update<'a>(&'a self, entity: &'a Entity) -> BoxFuture<'a, Result<()>> {
		Box::pin(queries::update_entity(self, entity))
	}

	fn delete<'a>(&'a self, id: Uuid) -> BoxFuture<'a, Result<bool>> {
		Box::pin(queries::delete_entity(self, id))
	}

	fn delete_presence<'a>(&'a self, entity_id: Uuid) -> BoxFuture<'a, Result<u64>> {
		Box::pin(queries::delete_presence(self, entity_id))
	}
}
