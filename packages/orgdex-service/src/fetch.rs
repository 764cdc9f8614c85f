use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::{
	DirectoryService, Error, Result, access,
	query::{self, DirectoryFilters},
};
use orgdex_domain::{Caller, Entity, can_view};
use orgdex_storage::query::{FilterField, FilterValue, Pagination, Predicate, QueryDescriptor};

impl DirectoryService {
	/// Single-entity lookup. Anonymous callers are served as visitors.
	///
	/// Existing entities the caller may not observe yield [`Error::AccessDenied`]; absent ids
	/// yield [`Error::NotFound`].
	pub async fn get_by_id(&self, caller: Option<&Caller>, id: Uuid) -> Result<Entity> {
		const OPERATION: &str = "get_by_id";

		let role = access::effective_role(caller);

		if let Some(snapshot) = self.snapshot_for(role).await
			&& let Some(entity) = snapshot.get(id)
		{
			return Ok(entity.clone());
		}

		let entity = self
			.store
			.get(id)
			.await
			.map_err(|err| Error::query(OPERATION, role, err))?
			.ok_or_else(|| crate::not_found(id))?;

		if !can_view(&entity, role) {
			tracing::info!(entity_id = %id, role = %role, "Denied entity read.");

			return Err(Error::AccessDenied {
				message: "You do not have access to this entity.".to_string(),
			});
		}

		Ok(entity)
	}

	/// Batch lookup in request order. Ids past the batch cap are dropped, duplicates are
	/// returned once, and entities the caller may not observe are omitted.
	pub async fn get_by_ids(&self, caller: Option<&Caller>, ids: &[Uuid]) -> Result<Vec<Entity>> {
		const OPERATION: &str = "get_by_ids";

		let role = access::require_caller(caller, OPERATION)?.role;
		let limit = self.cfg.directory.batch_limit as usize;
		let ids = if ids.len() > limit {
			tracing::warn!(
				requested = ids.len(),
				limit,
				"Batch fetch exceeded the id cap. Truncating."
			);

			&ids[..limit]
		} else {
			ids
		};
		let mut seen = HashSet::with_capacity(ids.len());
		let ids = ids.iter().copied().filter(|id| seen.insert(*id)).collect::<Vec<_>>();

		if ids.is_empty() {
			return Ok(Vec::new());
		}

		let mut found: HashMap<Uuid, Entity> = HashMap::with_capacity(ids.len());

		if let Some(snapshot) = self.snapshot_for(role).await {
			for id in &ids {
				if let Some(entity) = snapshot.get(*id) {
					found.insert(*id, entity.clone());
				}
			}
		}

		let missing = ids
			.iter()
			.filter(|id| !found.contains_key(id))
			.map(|id| FilterValue::Uuid(*id))
			.collect::<Vec<_>>();

		if !missing.is_empty() {
			let mut descriptor =
				query::build(role, &DirectoryFilters::default(), None, Pagination::default())?;

			descriptor.filters.push(Predicate::is_in(FilterField::Id, missing));

			let rows = self
				.store
				.query(&descriptor)
				.await
				.map_err(|err| Error::query(OPERATION, role, err))?;

			for entity in rows {
				found.insert(entity.id, entity);
			}
		}

		let entities = ids.iter().filter_map(|id| found.remove(id)).collect();

		Ok(crate::retain_visible(entities, role, OPERATION))
	}

	/// Entities created by `user_id` that the caller may observe. Only that user or an admin
	/// may ask.
	pub async fn get_owned_by(
		&self,
		caller: Option<&Caller>,
		user_id: &str,
	) -> Result<Vec<Entity>> {
		const OPERATION: &str = "get_owned_by";

		let caller = access::require_caller(caller, OPERATION)?;

		if !(caller.owns(user_id) || caller.role.is_admin()) {
			return Err(Error::AccessDenied {
				message: "Only the owner or an admin may list these entities.".to_string(),
			});
		}

		let mut descriptor = QueryDescriptor::entities();

		// Ownership grants no extra visibility; the caller's tiers still apply.
		descriptor.filters.extend(query::visibility_predicate(caller.role));
		descriptor
			.filters
			.push(Predicate::eq(FilterField::AddedBy, FilterValue::Text(user_id.to_string())));

		let rows = self
			.store
			.query(&descriptor)
			.await
			.map_err(|err| Error::query(OPERATION, caller.role, err))?;

		Ok(crate::retain_visible(rows, caller.role, OPERATION))
	}
}
