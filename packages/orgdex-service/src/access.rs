use orgdex_domain::{Caller, Entity, Role, Visibility};

use crate::{Error, Result};

pub(crate) fn require_caller<'a>(
	caller: Option<&'a Caller>,
	operation: &'static str,
) -> Result<&'a Caller> {
	caller.ok_or_else(|| {
		tracing::debug!(operation, "Rejected anonymous caller.");

		Error::Auth { message: format!("A caller identity is required for {operation}.") }
	})
}

/// Anonymous callers are read as visitors on the public single-entity lookup.
pub(crate) fn effective_role(caller: Option<&Caller>) -> Role {
	caller.map_or(Role::Visitor, |caller| caller.role)
}

pub(crate) fn ensure_owner_or_admin(caller: &Caller, entity: &Entity, action: &str) -> Result<()> {
	if caller.owns(&entity.added_by) || caller.role.is_admin() {
		return Ok(());
	}

	Err(Error::Permission {
		message: format!("Only the owner or an admin may {action} this entity."),
	})
}

/// Writing an entity whose effective tier is confidential requires clearance.
pub(crate) fn ensure_clearance_for(
	caller: &Caller,
	visibility: Visibility,
	action: &str,
) -> Result<()> {
	if visibility != Visibility::Confidential || caller.role.has_clearance() {
		return Ok(());
	}

	Err(Error::Permission {
		message: format!("Confidential clearance is required to {action} a confidential entity."),
	})
}
