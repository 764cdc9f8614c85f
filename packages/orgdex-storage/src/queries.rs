use sqlx::{Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
	Error, Result,
	db::Db,
	models::EntityRow,
	query::{
		Cursor, FilterField, FilterOp, FilterValue, OrderBy, Predicate, QueryDescriptor,
		SortDirection, SortField, SortValue,
	},
};
use orgdex_domain::Entity;

const ENTITY_COLUMNS: &str = "\
id, added_by, visibility, is_confidential, name, entity_type, short_description,
full_description, location, founded_year, employee_count, tags, services, industries,
certifications, partnerships, store, date_added, last_updated";
const EFFECTIVE_VISIBILITY_SQL: &str =
	"(CASE WHEN is_confidential THEN 'confidential' ELSE COALESCE(visibility, 'public') END)";

pub async fn select_entities(db: &Db, descriptor: &QueryDescriptor) -> Result<Vec<Entity>> {
	descriptor.validate()?;

	let mut builder = QueryBuilder::<Postgres>::new("SELECT ");

	builder.push(ENTITY_COLUMNS).push(" FROM ").push(descriptor.collection.as_str());
	builder.push(" WHERE TRUE");

	push_predicates(&mut builder, &descriptor.filters);

	if let Some(cursor) = descriptor.pagination.after.as_ref() {
		push_cursor(&mut builder, &descriptor.order_by, cursor);
	}

	push_order_by(&mut builder, &descriptor.order_by);

	if let Some(limit) = descriptor.pagination.limit {
		builder.push(" LIMIT ").push_bind(i64::from(limit));
	}
	if descriptor.pagination.offset > 0 {
		builder.push(" OFFSET ").push_bind(i64::from(descriptor.pagination.offset));
	}

	let rows: Vec<EntityRow> = builder.build_query_as().fetch_all(&db.pool).await?;

	rows.into_iter().map(Entity::try_from).collect()
}

pub async fn count_entities(db: &Db, filters: &[Predicate]) -> Result<u64> {
	for predicate in filters {
		predicate.validate()?;
	}

	let mut builder = QueryBuilder::<Postgres>::new("SELECT count(*) FROM entities WHERE TRUE");

	push_predicates(&mut builder, filters);

	let count: i64 = builder.build_query_scalar().fetch_one(&db.pool).await?;

	Ok(u64::try_from(count).unwrap_or_default())
}

pub async fn fetch_entity(db: &Db, id: Uuid) -> Result<Option<Entity>> {
	let sql = format!("SELECT {ENTITY_COLUMNS} FROM entities WHERE id = $1");
	let row: Option<EntityRow> =
		sqlx::query_as(sql.as_str()).bind(id).fetch_optional(&db.pool).await?;

	row.map(Entity::try_from).transpose()
}

pub async fn insert_entity(db: &Db, entity: &Entity) -> Result<()> {
	let result = sqlx::query(
		"\
INSERT INTO entities (
	id,
	added_by,
	visibility,
	is_confidential,
	name,
	entity_type,
	short_description,
	full_description,
	location,
	founded_year,
	employee_count,
	tags,
	services,
	industries,
	certifications,
	partnerships,
	store,
	date_added,
	last_updated
)
VALUES (
	$1,
	$2,
	$3,
	$4,
	$5,
	$6,
	$7,
	$8,
	$9,
	$10,
	$11,
	$12,
	$13,
	$14,
	$15,
	$16,
	$17,
	$18,
	$19
)",
	)
	.bind(entity.id)
	.bind(entity.added_by.as_str())
	.bind(entity.visibility.map(|visibility| visibility.as_str()))
	.bind(entity.is_confidential)
	.bind(entity.name.as_str())
	.bind(entity.entity_type.as_str())
	.bind(entity.short_description.as_str())
	.bind(entity.full_description.as_deref())
	.bind(entity.location.as_deref())
	.bind(entity.founded_year)
	.bind(entity.employee_count)
	.bind(entity.tags.as_slice())
	.bind(entity.services.as_slice())
	.bind(entity.industries.as_slice())
	.bind(entity.certifications.as_slice())
	.bind(entity.partnerships.as_slice())
	.bind(entity.store.as_ref())
	.bind(entity.date_added)
	.bind(entity.last_updated)
	.execute(&db.pool)
	.await;

	match result {
		Ok(_) => Ok(()),
		Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
			tracing::warn!(entity_id = %entity.id, "Entity insert conflicted with an existing id.");

			Err(Error::Conflict(format!("Entity {} already exists.", entity.id)))
		},
		Err(err) => Err(err.into()),
	}
}

pub async fn update_entity(db: &Db, entity: &Entity) -> Result<()> {
	let result = sqlx::query(
		"\
UPDATE entities
SET
	visibility = $1,
	is_confidential = $2,
	name = $3,
	entity_type = $4,
	short_description = $5,
	full_description = $6,
	location = $7,
	founded_year = $8,
	employee_count = $9,
	tags = $10,
	services = $11,
	industries = $12,
	certifications = $13,
	partnerships = $14,
	store = $15,
	last_updated = $16
WHERE id = $17",
	)
	.bind(entity.visibility.map(|visibility| visibility.as_str()))
	.bind(entity.is_confidential)
	.bind(entity.name.as_str())
	.bind(entity.entity_type.as_str())
	.bind(entity.short_description.as_str())
	.bind(entity.full_description.as_deref())
	.bind(entity.location.as_deref())
	.bind(entity.founded_year)
	.bind(entity.employee_count)
	.bind(entity.tags.as_slice())
	.bind(entity.services.as_slice())
	.bind(entity.industries.as_slice())
	.bind(entity.certifications.as_slice())
	.bind(entity.partnerships.as_slice())
	.bind(entity.store.as_ref())
	.bind(entity.last_updated)
	.bind(entity.id)
	.execute(&db.pool)
	.await?;

	if result.rows_affected() == 0 {
		return Err(Error::NotFound(format!("Entity {} does not exist.", entity.id)));
	}

	Ok(())
}

pub async fn delete_entity(db: &Db, id: Uuid) -> Result<bool> {
	let result =
		sqlx::query("DELETE FROM entities WHERE id = $1").bind(id).execute(&db.pool).await?;

	Ok(result.rows_affected() > 0)
}

pub async fn upsert_presence(
	db: &Db,
	entity_id: Uuid,
	user_id: &str,
	seen_at: OffsetDateTime,
) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO entity_presence (entity_id, user_id, last_seen_at)
VALUES ($1, $2, $3)
ON CONFLICT (entity_id, user_id) DO UPDATE
SET last_seen_at = EXCLUDED.last_seen_at",
	)
	.bind(entity_id)
	.bind(user_id)
	.bind(seen_at)
	.execute(&db.pool)
	.await?;

	Ok(())
}

pub async fn delete_presence(db: &Db, entity_id: Uuid) -> Result<u64> {
	let result = sqlx::query("DELETE FROM entity_presence WHERE entity_id = $1")
		.bind(entity_id)
		.execute(&db.pool)
		.await?;

	Ok(result.rows_affected())
}

fn column_sql(field: FilterField) -> &'static str {
	match field {
		FilterField::Id => "id",
		FilterField::AddedBy => "added_by",
		FilterField::Type => "entity_type",
		FilterField::EmployeeCount => "employee_count",
		FilterField::FoundedYear => "founded_year",
		FilterField::Certifications => "certifications",
		FilterField::Partnerships => "partnerships",
		FilterField::IsConfidential => "is_confidential",
		FilterField::Visibility => "visibility",
		FilterField::EffectiveVisibility => EFFECTIVE_VISIBILITY_SQL,
	}
}

fn sort_sql(field: SortField) -> &'static str {
	match field {
		SortField::DateAdded => "date_added",
		SortField::LastUpdated => "last_updated",
		// Byte-order collation keeps database ordering identical to in-memory string ordering.
		SortField::Name => "name COLLATE \"C\"",
		SortField::FoundedYear => "COALESCE(founded_year, -1)",
		SortField::EmployeeCount => "COALESCE(employee_count, -1)",
	}
}

fn push_predicates(builder: &mut QueryBuilder<'_, Postgres>, filters: &[Predicate]) {
	for predicate in filters {
		let column = column_sql(predicate.field);
		let is_array =
			matches!(predicate.field, FilterField::Certifications | FilterField::Partnerships);

		match &predicate.op {
			FilterOp::Eq(value) => {
				builder.push(" AND ").push(column).push(" = ");

				push_value(builder, value);
			},
			FilterOp::Gte(value) => {
				builder.push(" AND ").push(column).push(" >= ");

				push_value(builder, value);
			},
			FilterOp::Lte(value) => {
				builder.push(" AND ").push(column).push(" <= ");

				push_value(builder, value);
			},
			FilterOp::In(values) => push_in(builder, column, values),
			FilterOp::IsNull if is_array => {
				builder.push(" AND cardinality(").push(column).push(") = 0");
			},
			FilterOp::IsNotNull if is_array => {
				builder.push(" AND cardinality(").push(column).push(") > 0");
			},
			FilterOp::IsNull => {
				builder.push(" AND ").push(column).push(" IS NULL");
			},
			FilterOp::IsNotNull => {
				builder.push(" AND ").push(column).push(" IS NOT NULL");
			},
		}
	}
}

fn push_value(builder: &mut QueryBuilder<'_, Postgres>, value: &FilterValue) {
	match value {
		FilterValue::Text(text) => builder.push_bind(text.clone()),
		FilterValue::Integer(number) => builder.push_bind(*number),
		FilterValue::Bool(flag) => builder.push_bind(*flag),
		FilterValue::Uuid(id) => builder.push_bind(*id),
	};
}

fn push_in(builder: &mut QueryBuilder<'_, Postgres>, column: &str, values: &[FilterValue]) {
	let Some(first) = values.first() else {
		builder.push(" AND FALSE");

		return;
	};

	builder.push(" AND ").push(column).push(" = ANY(");

	match first {
		FilterValue::Text(_) => {
			let list: Vec<String> = values
				.iter()
				.filter_map(|value| match value {
					FilterValue::Text(text) => Some(text.clone()),
					_ => None,
				})
				.collect();

			builder.push_bind(list);
		},
		FilterValue::Integer(_) => {
			let list: Vec<i64> = values
				.iter()
				.filter_map(|value| match value {
					FilterValue::Integer(number) => Some(*number),
					_ => None,
				})
				.collect();

			builder.push_bind(list);
		},
		FilterValue::Uuid(_) => {
			let list: Vec<Uuid> = values
				.iter()
				.filter_map(|value| match value {
					FilterValue::Uuid(id) => Some(*id),
					_ => None,
				})
				.collect();

			builder.push_bind(list);
		},
		FilterValue::Bool(_) => {
			let list: Vec<bool> = values
				.iter()
				.filter_map(|value| match value {
					FilterValue::Bool(flag) => Some(*flag),
					_ => None,
				})
				.collect();

			builder.push_bind(list);
		},
	}

	builder.push(")");
}

fn push_cursor(builder: &mut QueryBuilder<'_, Postgres>, order_by: &OrderBy, cursor: &Cursor) {
	let comparison = match order_by.direction {
		SortDirection::Asc => ") > (",
		SortDirection::Desc => ") < (",
	};

	builder.push(" AND (").push(sort_sql(order_by.field)).push(", id").push(comparison);

	match &cursor.value {
		SortValue::Timestamp(at) => builder.push_bind(*at),
		SortValue::Text(text) => builder.push_bind(text.clone()),
		SortValue::Integer(number) => builder.push_bind(*number),
	};

	builder.push(", ").push_bind(cursor.id).push(")");
}

fn push_order_by(builder: &mut QueryBuilder<'_, Postgres>, order_by: &OrderBy) {
	let direction = order_by.direction.as_sql();

	builder
		.push(" ORDER BY ")
		.push(sort_sql(order_by.field))
		.push(" ")
		.push(direction)
		.push(", id ")
		.push(direction);
}
