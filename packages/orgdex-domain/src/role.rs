use std::{
	fmt::{Display, Formatter},
	str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::ParseError;

/// Caller trust level supplied by the authentication collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
	Visitor,
	Subscriber,
	Member,
	Admin,
	/// Confidential-clearance role. Sees everything an admin sees but carries no ownership
	/// override on writes.
	Confidential,
}
impl Role {
	pub const ALL: [Self; 5] =
		[Self::Visitor, Self::Subscriber, Self::Member, Self::Admin, Self::Confidential];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Visitor => "visitor",
			Self::Subscriber => "subscriber",
			Self::Member => "member",
			Self::Admin => "admin",
			Self::Confidential => "confidential",
		}
	}

	/// Position in the trust hierarchy. Admin and confidential share the top rank.
	pub fn rank(self) -> u8 {
		match self {
			Self::Visitor => 0,
			Self::Subscriber => 1,
			Self::Member => 2,
			Self::Admin | Self::Confidential => 3,
		}
	}

	pub fn has_clearance(self) -> bool {
		matches!(self, Self::Admin | Self::Confidential)
	}

	pub fn is_admin(self) -> bool {
		self == Self::Admin
	}

	pub fn can_create(self) -> bool {
		matches!(self, Self::Member | Self::Admin | Self::Confidential)
	}
}
impl Display for Role {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}
impl FromStr for Role {
	type Err = ParseError;

	fn from_str(raw: &str) -> Result<Self, Self::Err> {
		match raw.trim().to_ascii_lowercase().as_str() {
			"visitor" => Ok(Self::Visitor),
			"subscriber" => Ok(Self::Subscriber),
			"member" => Ok(Self::Member),
			"admin" => Ok(Self::Admin),
			"confidential" => Ok(Self::Confidential),
			other => Err(ParseError::UnknownRole(other.to_string())),
		}
	}
}

/// Authenticated caller identity. The directory never authenticates; it only authorizes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
	pub user_id: String,
	pub role: Role,
}
impl Caller {
	pub fn new(user_id: impl Into<String>, role: Role) -> Self {
		Self { user_id: user_id.into(), role }
	}

	pub fn owns(&self, added_by: &str) -> bool {
		self.user_id == added_by
	}
}
