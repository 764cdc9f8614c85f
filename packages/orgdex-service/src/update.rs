use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::{DirectoryService, Error, Result, access, create::trimmed, payload};
use orgdex_domain::{Caller, Entity};

/// Field-level patch. Absent and null fields leave the stored value untouched; identity,
/// ownership and `date_added` cannot be patched.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityPatch {
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
	pub async fn update(
		&self,
		caller: Option<&Caller>,
		id: Uuid,
		patch: EntityPatch,
	) -> Result<Entity> {
		const OPERATION: &str = "update";

		let caller = access::require_caller(caller, OPERATION)?;
		let current = self
			.store
			.get(id)
			.await
			.map_err(|err| Error::query(OPERATION, caller.role, err))?
			.ok_or_else(|| crate::not_found(id))?;

		access::ensure_owner_or_admin(caller, &current, "update")?;
		access::ensure_clearance_for(caller, current.effective_visibility(), "update")?;

		if let Some(requested) =
			payload::requested_visibility(patch.visibility.as_deref(), patch.is_confidential)
		{
			access::ensure_clearance_for(caller, requested, "promote")?;
		}

		let updated = merge(current, patch)?;
		let _invalidate = self.cache.invalidate_on_drop(OPERATION, id);

		self.store.update(&updated).await.map_err(|err| match err {
			orgdex_storage::Error::NotFound(_) => crate::not_found(id),
			err => Error::query(OPERATION, caller.role, err),
		})?;

		tracing::info!(entity_id = %id, user_id = %caller.user_id, "Entity updated.");

		Ok(updated)
	}
}

fn merge(mut entity: Entity, patch: EntityPatch) -> Result<Entity> {
	let mut check = payload::FieldCheck::default();
	let name = check.non_blank("name", patch.name.as_deref());
	let entity_type = check.entity_type("type", patch.entity_type.as_deref());
	let short_description =
		check.non_blank("short_description", patch.short_description.as_deref());
	let visibility = check.visibility(patch.visibility.as_deref());
	let founded_year = check.non_negative("founded_year", patch.founded_year);
	let employee_count = check.non_negative("employee_count", patch.employee_count);
	let tags = check.string_array("tags", patch.tags.as_ref());
	let services = check.string_array("services", patch.services.as_ref());
	let industries = check.string_array("industries", patch.industries.as_ref());
	let certifications = check.string_array("certifications", patch.certifications.as_ref());
	let partnerships = check.string_array("partnerships", patch.partnerships.as_ref());

	check.finish()?;

	if let Some(name) = name {
		entity.name = name;
	}
	if let Some(entity_type) = entity_type {
		entity.entity_type = entity_type;
	}
	if let Some(short_description) = short_description {
		entity.short_description = short_description;
	}
	if patch.full_description.is_some() {
		entity.full_description = trimmed(patch.full_description);
	}
	if patch.location.is_some() {
		entity.location = trimmed(patch.location);
	}
	if founded_year.is_some() {
		entity.founded_year = founded_year;
	}
	if employee_count.is_some() {
		entity.employee_count = employee_count;
	}
	if visibility.is_some() {
		entity.visibility = visibility;
	}
	if let Some(is_confidential) = patch.is_confidential {
		entity.is_confidential = is_confidential;
	}
	if let Some(tags) = tags {
		entity.tags = tags;
	}
	if let Some(services) = services {
		entity.services = services;
	}
	if let Some(industries) = industries {
		entity.industries = industries;
	}
	if let Some(certifications) = certifications {
		entity.certifications = certifications;
	}
	if let Some(partnerships) = partnerships {
		entity.partnerships = partnerships;
	}
	if patch.store.is_some() {
		entity.store = patch.store;
	}

	entity.last_updated = crate::now().max(entity.date_added);

	Ok(entity)
}
