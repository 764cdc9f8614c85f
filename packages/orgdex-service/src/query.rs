//! Query builder: role and caller filters in, backend-agnostic descriptor out.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};
use orgdex_domain::{Entity, EntityType, Role, Visibility, VisibilityFilter, visibility_filter_for};
use orgdex_storage::query::{
	Cursor, FilterField, FilterValue, OrderBy, Pagination, Predicate, QueryDescriptor,
	SortDirection, SortField,
};

/// Caller-supplied filters. Every field is optional and the set is conjunctive.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryFilters {
	#[serde(rename = "type")]
	pub entity_type: Option<EntityType>,
	pub min_employees: Option<i64>,
	pub max_employees: Option<i64>,
	pub founded_from: Option<i64>,
	pub founded_to: Option<i64>,
	pub has_certifications: Option<bool>,
	pub has_partnerships: Option<bool>,
	pub is_confidential: Option<bool>,
	/// Shortcut over the tier model: `confidential` selects flagged entities, any other tier
	/// selects entities whose effective tier equals it.
	pub membership_tier: Option<Visibility>,
}
impl DirectoryFilters {
	pub fn predicates(&self) -> Vec<Predicate> {
		let mut predicates = Vec::new();

		if let Some(entity_type) = self.entity_type {
			predicates.push(Predicate::eq(
				FilterField::Type,
				FilterValue::Text(entity_type.as_str().to_string()),
			));
		}
		if let Some(min) = self.min_employees {
			predicates.push(Predicate::gte(FilterField::EmployeeCount, min));
		}
		if let Some(max) = self.max_employees {
			predicates.push(Predicate::lte(FilterField::EmployeeCount, max));
		}
		if let Some(from) = self.founded_from {
			predicates.push(Predicate::gte(FilterField::FoundedYear, from));
		}
		if let Some(to) = self.founded_to {
			predicates.push(Predicate::lte(FilterField::FoundedYear, to));
		}
		if let Some(present) = self.has_certifications {
			predicates.push(presence(FilterField::Certifications, present));
		}
		if let Some(present) = self.has_partnerships {
			predicates.push(presence(FilterField::Partnerships, present));
		}
		if let Some(flag) = self.is_confidential {
			predicates.push(Predicate::eq(FilterField::IsConfidential, FilterValue::Bool(flag)));
		}

		match self.membership_tier {
			Some(Visibility::Confidential) => predicates
				.push(Predicate::eq(FilterField::IsConfidential, FilterValue::Bool(true))),
			Some(tier) => predicates.push(Predicate::eq(
				FilterField::EffectiveVisibility,
				FilterValue::Text(tier.as_str().to_string()),
			)),
			None => {},
		}

		predicates
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortRequest {
	pub field: String,
	#[serde(default)]
	pub direction: Option<String>,
}

/// Base predicate derived from the visibility policy. `None` for roles with full bypass.
pub fn visibility_predicate(role: Role) -> Option<Predicate> {
	match visibility_filter_for(role) {
		VisibilityFilter::Unrestricted => None,
		VisibilityFilter::Tiers(tiers) => Some(Predicate::is_in(
			FilterField::EffectiveVisibility,
			tiers.iter().map(|tier| FilterValue::Text(tier.as_str().to_string())).collect(),
		)),
	}
}

pub fn build(
	role: Role,
	filters: &DirectoryFilters,
	sort: Option<&SortRequest>,
	pagination: Pagination,
) -> Result<QueryDescriptor> {
	let order_by = match sort {
		Some(sort) =>
			parse_sort(sort).map_err(|message| Error::query("build_query", role, message))?,
		None => OrderBy::default(),
	};
	let mut descriptor = QueryDescriptor::entities();

	descriptor.filters.extend(visibility_predicate(role));
	descriptor.filters.extend(filters.predicates());

	descriptor.order_by = order_by;
	descriptor.pagination = pagination;

	Ok(descriptor)
}

pub fn parse_sort(sort: &SortRequest) -> std::result::Result<OrderBy, String> {
	let field = match sort.field.trim() {
		"dateAdded" | "date_added" => SortField::DateAdded,
		"lastUpdated" | "last_updated" => SortField::LastUpdated,
		"name" => SortField::Name,
		"foundedYear" | "founded_year" => SortField::FoundedYear,
		"employeeCount" | "employee_count" => SortField::EmployeeCount,
		other => return Err(format!("Unsupported sort field '{other}'.")),
	};
	let direction = match sort.direction.as_deref().map(str::trim) {
		None | Some("") => SortDirection::Desc,
		Some(raw) if raw.eq_ignore_ascii_case("desc") => SortDirection::Desc,
		Some(raw) if raw.eq_ignore_ascii_case("asc") => SortDirection::Asc,
		Some(other) => return Err(format!("Unsupported sort direction '{other}'.")),
	};

	Ok(OrderBy { field, direction })
}

/// Turns the looked-up anchor of a `start_after` id into a cursor. A missing anchor
/// continues without a cursor.
pub fn cursor_from(
	anchor: Option<&Entity>,
	start_after: Uuid,
	order_by: &OrderBy,
) -> Option<Cursor> {
	match anchor {
		Some(entity) => Some(Cursor::of(entity, order_by.field)),
		None => {
			tracing::warn!(
				start_after = %start_after,
				"Pagination cursor id not found. Continuing without a cursor."
			);

			None
		},
	}
}

fn presence(field: FilterField, present: bool) -> Predicate {
	if present { Predicate::is_not_null(field) } else { Predicate::is_null(field) }
}
