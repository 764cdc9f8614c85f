use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{DirectoryService, Error, Result, access};
use orgdex_domain::Caller;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
	pub id: Uuid,
	/// Presence records removed alongside the entity. `None` when cleanup failed.
	pub presence_removed: Option<u64>,
}

impl DirectoryService {
	/// Hard delete. Owners without clearance cannot delete their own confidential entities.
	pub async fn delete(&self, caller: Option<&Caller>, id: Uuid) -> Result<DeleteResponse> {
		const OPERATION: &str = "delete";

		let caller = access::require_caller(caller, OPERATION)?;
		let entity = self
			.store
			.get(id)
			.await
			.map_err(|err| Error::query(OPERATION, caller.role, err))?
			.ok_or_else(|| crate::not_found(id))?;

		access::ensure_owner_or_admin(caller, &entity, "delete")?;
		access::ensure_clearance_for(caller, entity.effective_visibility(), "delete")?;

		let _invalidate = self.cache.invalidate_on_drop(OPERATION, id);
		let removed =
			self.store.delete(id).await.map_err(|err| Error::query(OPERATION, caller.role, err))?;

		if !removed {
			return Err(crate::not_found(id));
		}

		let presence_removed = match self.store.delete_presence(id).await {
			Ok(count) => Some(count),
			Err(err) => {
				tracing::warn!(
					entity_id = %id,
					error = %err,
					"Presence cleanup failed after delete. Entity removal stands."
				);

				None
			},
		};

		tracing::info!(entity_id = %id, user_id = %caller.user_id, "Entity deleted.");

		Ok(DeleteResponse { id, presence_removed })
	}
}
