use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
	DirectoryService, Error, Result, Snapshot, access,
	query::{self, DirectoryFilters, SortRequest},
};
use orgdex_domain::{Caller, Entity, Role, can_view};
use orgdex_storage::query::Pagination;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ListRequest {
	pub limit: Option<u32>,
	pub start_after: Option<Uuid>,
	pub filters: DirectoryFilters,
	pub sort: Option<SortRequest>,
	pub include_total: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ListResponse {
	pub entities: Vec<Entity>,
	pub last_visible_id: Option<Uuid>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub total_count: Option<u64>,
}

impl DirectoryService {
	pub async fn list_for_role(
		&self,
		caller: Option<&Caller>,
		req: ListRequest,
	) -> Result<ListResponse> {
		const OPERATION: &str = "list_for_role";

		let role = access::require_caller(caller, OPERATION)?.role;
		let pagination =
			Pagination { limit: Some(self.page_size(req.limit)), ..Default::default() };
		let mut descriptor = query::build(role, &req.filters, req.sort.as_ref(), pagination)?;
		let snapshot = self.snapshot_for(role).await;

		if let Some(start_after) = req.start_after {
			let anchor = self.find_anchor(snapshot.as_deref(), start_after, role, OPERATION).await?;

			descriptor.pagination.after =
				query::cursor_from(anchor.as_ref(), start_after, &descriptor.order_by);
		}

		let (rows, total_count) = match snapshot.as_deref() {
			Some(snapshot) => {
				let total_count = req.include_total.then(|| {
					snapshot.entities().iter().filter(|entity| descriptor.matches(entity)).count()
						as u64
				});

				(descriptor.apply(snapshot.entities().iter().cloned()), total_count)
			},
			None => {
				let rows = self
					.store
					.query(&descriptor)
					.await
					.map_err(|err| Error::query(OPERATION, role, err))?;
				let total_count = if req.include_total {
					let count = self
						.store
						.count(&descriptor.filters)
						.await
						.map_err(|err| Error::query(OPERATION, role, err))?;

					Some(count)
				} else {
					None
				};

				(rows, total_count)
			},
		};
		let entities = crate::retain_visible(rows, role, OPERATION);
		let last_visible_id = entities.last().map(|entity| entity.id);

		Ok(ListResponse { entities, last_visible_id, total_count })
	}

	fn page_size(&self, requested: Option<u32>) -> u32 {
		let cfg = &self.cfg.directory;

		requested.unwrap_or(cfg.default_page_size).clamp(1, cfg.max_page_size)
	}

	/// A cursor row the caller cannot see is treated as missing.
	async fn find_anchor(
		&self,
		snapshot: Option<&Snapshot>,
		id: Uuid,
		role: Role,
		operation: &'static str,
	) -> Result<Option<Entity>> {
		if let Some(entity) = snapshot.and_then(|snapshot| snapshot.get(id)) {
			return Ok(can_view(entity, role).then(|| entity.clone()));
		}

		let anchor = self.store.get(id).await.map_err(|err| Error::query(operation, role, err))?;

		Ok(anchor.filter(|entity| can_view(entity, role)))
	}
}
