use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::{DirectoryService, Error, Result, access, payload};
use orgdex_domain::{Caller, Entity, Visibility};

/// Create payload. Fields are loosely typed so validation can name every bad field.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateEntityRequest {
	pub name: Option<String>,
	#[serde(rename = "type")]
	pub entity_type: Option<String>,
	pub short_description: Option<String>,
	pub full_description: Option<String>,
	pub location: Option<String>,
	pub founded_year: Option<i32>,
	pub employee_count: Option<i32>,
	pub visibility: Option<String>,
	pub is_confidential: Option<bool>,
	pub tags: Option<Value>,
	pub services: Option<Value>,
	pub industries: Option<Value>,
	pub certifications: Option<Value>,
	pub partnerships: Option<Value>,
	pub store: Option<Value>,
}

impl DirectoryService {
	pub async fn create(
		&self,
		caller: Option<&Caller>,
		req: CreateEntityRequest,
	) -> Result<Entity> {
		const OPERATION: &str = "create";

		let caller = access::require_caller(caller, OPERATION)?;

		if !caller.role.can_create() {
			return Err(Error::Permission {
				message: format!("Role {} may not create entities.", caller.role),
			});
		}

		let requested =
			payload::requested_visibility(req.visibility.as_deref(), req.is_confidential);

		access::ensure_clearance_for(caller, requested.unwrap_or_default(), "create")?;

		let entity = build_entity(caller, req)?;
		let _invalidate = self.cache.invalidate_on_drop(OPERATION, entity.id);

		self.store.insert(&entity).await.map_err(|err| Error::query(OPERATION, caller.role, err))?;

		tracing::info!(
			entity_id = %entity.id,
			added_by = %entity.added_by,
			visibility = %entity.effective_visibility(),
			"Entity created."
		);

		Ok(entity)
	}
}

fn build_entity(caller: &Caller, req: CreateEntityRequest) -> Result<Entity> {
	let mut check = payload::FieldCheck::default();
	let name = check.required_text("name", req.name.as_deref());
	let entity_type = check.entity_type("type", req.entity_type.as_deref());

	if req.entity_type.is_none() {
		check.required_text("type", None);
	}

	let short_description =
		check.required_text("short_description", req.short_description.as_deref());
	let visibility = check.visibility(req.visibility.as_deref());
	let founded_year = check.non_negative("founded_year", req.founded_year);
	let employee_count = check.non_negative("employee_count", req.employee_count);
	let tags = check.string_array("tags", req.tags.as_ref());
	let services = check.string_array("services", req.services.as_ref());
	let industries = check.string_array("industries", req.industries.as_ref());
	let certifications = check.string_array("certifications", req.certifications.as_ref());
	let partnerships = check.string_array("partnerships", req.partnerships.as_ref());

	check.finish()?;

	let (Some(name), Some(entity_type), Some(short_description)) =
		(name, entity_type, short_description)
	else {
		return Err(Error::validation(
			["name", "type", "short_description"].map(str::to_string).to_vec(),
		));
	};
	let now = crate::now();

	Ok(Entity {
		id: Uuid::new_v4(),
		added_by: caller.user_id.clone(),
		visibility: Some(visibility.unwrap_or(Visibility::Public)),
		is_confidential: req.is_confidential.unwrap_or(false),
		name,
		entity_type,
		short_description,
		full_description: trimmed(req.full_description),
		location: trimmed(req.location),
		founded_year,
		employee_count,
		tags: tags.unwrap_or_default(),
		services: services.unwrap_or_default(),
		industries: industries.unwrap_or_default(),
		certifications: certifications.unwrap_or_default(),
		partnerships: partnerships.unwrap_or_default(),
		store: req.store,
		date_added: now,
		last_updated: now,
	})
}

pub(crate) fn trimmed(value: Option<String>) -> Option<String> {
	value.map(|text| text.trim().to_string()).filter(|text| !text.is_empty())
}
