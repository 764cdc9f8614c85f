//! Visibility policy.
//!
//! Single source of truth for which roles may observe which entities. The query builder
//! turns [`visibility_filter_for`] into a storage predicate and every read path re-checks
//! results with [`can_view`]; both are derived from [`Entity::effective_visibility`] so the
//! pushed-down predicate and the post-query guard cannot disagree.

use std::{
	fmt::{Display, Formatter},
	str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::{ParseError, Role, entity::Entity};

const VISITOR_TIERS: &[Visibility] = &[Visibility::Public];
const SUBSCRIBER_TIERS: &[Visibility] = &[Visibility::Public, Visibility::Subscriber];
const MEMBER_TIERS: &[Visibility] =
	&[Visibility::Public, Visibility::Subscriber, Visibility::Member];

#[derive(
	Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
	#[default]
	Public,
	Subscriber,
	Member,
	Confidential,
}
impl Visibility {
	pub const ALL: [Self; 4] = [Self::Public, Self::Subscriber, Self::Member, Self::Confidential];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Public => "public",
			Self::Subscriber => "subscriber",
			Self::Member => "member",
			Self::Confidential => "confidential",
		}
	}
}
impl Display for Visibility {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}
impl FromStr for Visibility {
	type Err = ParseError;

	fn from_str(raw: &str) -> Result<Self, Self::Err> {
		match raw.trim().to_ascii_lowercase().as_str() {
			"public" => Ok(Self::Public),
			"subscriber" => Ok(Self::Subscriber),
			"member" => Ok(Self::Member),
			"confidential" => Ok(Self::Confidential),
			other => Err(ParseError::UnknownVisibility(other.to_string())),
		}
	}
}

/// Allowed effective visibilities for a role.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VisibilityFilter {
	/// Full bypass, including confidential entities. No predicate is pushed down.
	Unrestricted,
	Tiers(&'static [Visibility]),
}
impl VisibilityFilter {
	pub fn allows(self, visibility: Visibility) -> bool {
		match self {
			Self::Unrestricted => true,
			Self::Tiers(tiers) => tiers.contains(&visibility),
		}
	}
}

pub fn visibility_filter_for(role: Role) -> VisibilityFilter {
	match role {
		Role::Admin | Role::Confidential => VisibilityFilter::Unrestricted,
		Role::Member => VisibilityFilter::Tiers(MEMBER_TIERS),
		Role::Subscriber => VisibilityFilter::Tiers(SUBSCRIBER_TIERS),
		Role::Visitor => VisibilityFilter::Tiers(VISITOR_TIERS),
	}
}

pub fn can_view(entity: &Entity, role: Role) -> bool {
	visibility_filter_for(role).allows(entity.effective_visibility())
}
