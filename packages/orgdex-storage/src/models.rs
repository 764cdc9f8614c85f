use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::Error;
use orgdex_domain::Entity;

#[derive(Debug, sqlx::FromRow)]
pub struct EntityRow {
	pub id: Uuid,
	pub added_by: String,
	pub visibility: Option<String>,
	pub is_confidential: bool,
	pub name: String,
	pub entity_type: String,
	pub short_description: String,
	pub full_description: Option<String>,
	pub location: Option<String>,
	pub founded_year: Option<i32>,
	pub employee_count: Option<i32>,
	pub tags: Vec<String>,
	pub services: Vec<String>,
	pub industries: Vec<String>,
	pub certifications: Vec<String>,
	pub partnerships: Vec<String>,
	pub store: Option<Value>,
	pub date_added: OffsetDateTime,
	pub last_updated: OffsetDateTime,
}
impl TryFrom<EntityRow> for Entity {
	type Error = Error;

	fn try_from(row: EntityRow) -> Result<Self, Self::Error> {
		let visibility = row
			.visibility
			.as_deref()
			.map(str::parse)
			.transpose()
			.map_err(|err| Error::Decode(format!("entity {}: {err}", row.id)))?;
		let entity_type = row
			.entity_type
			.parse()
			.map_err(|err| Error::Decode(format!("entity {}: {err}", row.id)))?;

		Ok(Self {
			id: row.id,
			added_by: row.added_by,
			visibility,
			is_confidential: row.is_confidential,
			name: row.name,
			entity_type,
			short_description: row.short_description,
			full_description: row.full_description,
			location: row.location,
			founded_year: row.founded_year,
			employee_count: row.employee_count,
			tags: row.tags,
			services: row.services,
			industries: row.industries,
			certifications: row.certifications,
			partnerships: row.partnerships,
			store: row.store,
			date_added: row.date_added,
			last_updated: row.last_updated,
		})
	}
}
