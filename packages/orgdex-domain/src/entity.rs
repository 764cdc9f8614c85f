use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{EntityType, Visibility};

/// A directory record representing one organization.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entity {
	pub id: Uuid,
	/// Creator's user id. Immutable after creation.
	pub added_by: String,
	/// Nominal tier. `None` is treated as public.
	pub visibility: Option<Visibility>,
	pub is_confidential: bool,
	pub name: String,
	#[serde(rename = "type")]
	pub entity_type: EntityType,
	pub short_description: String,
	pub full_description: Option<String>,
	pub location: Option<String>,
	pub founded_year: Option<i32>,
	pub employee_count: Option<i32>,
	#[serde(default)]
	pub tags: Vec<String>,
	#[serde(default)]
	pub services: Vec<String>,
	#[serde(default)]
	pub industries: Vec<String>,
	#[serde(default)]
	pub certifications: Vec<String>,
	#[serde(default)]
	pub partnerships: Vec<String>,
	/// Opaque store sub-document (activation flag, status, tier, metrics).
	pub store: Option<Value>,
	#[serde(with = "crate::time_serde")]
	pub date_added: OffsetDateTime,
	#[serde(with = "crate::time_serde")]
	pub last_updated: OffsetDateTime,
}
impl Entity {
	/// The confidential flag always wins over the nominal tier.
	pub fn effective_visibility(&self) -> Visibility {
		if self.is_confidential {
			return Visibility::Confidential;
		}

		self.visibility.unwrap_or_default()
	}

	/// Public and not confidential. Only these entities may enter a cache snapshot.
	pub fn is_publicly_visible(&self) -> bool {
		self.effective_visibility() == Visibility::Public
	}

	pub fn has_certifications(&self) -> bool {
		!self.certifications.is_empty()
	}

	pub fn has_partnerships(&self) -> bool {
		!self.partnerships.is_empty()
	}
}
