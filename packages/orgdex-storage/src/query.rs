//! Backend-agnostic query descriptor.
//!
//! Every backend must honor the same semantics: predicates are conjunctive, ordering is
//! `(sort key, id)` in the requested direction, and a cursor selects rows strictly after it in
//! that order. [`QueryDescriptor::apply`] is the reference evaluator used by the in-memory
//! backend and by cache snapshots.

use std::cmp::Ordering;

use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Error, Result};
use orgdex_domain::Entity;

/// Sentinel used for missing integer sort keys so rows with no value sort lowest.
pub const NULL_INTEGER_SORT_KEY: i64 = -1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Collection {
	Entities,
}
impl Collection {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Entities => "entities",
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterField {
	Id,
	AddedBy,
	Type,
	EmployeeCount,
	FoundedYear,
	Certifications,
	Partnerships,
	IsConfidential,
	/// Nominal tier as stored, possibly null.
	Visibility,
	/// Tier after applying the confidential override and the public default.
	EffectiveVisibility,
}
impl FilterField {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Id => "id",
			Self::AddedBy => "added_by",
			Self::Type => "type",
			Self::EmployeeCount => "employee_count",
			Self::FoundedYear => "founded_year",
			Self::Certifications => "certifications",
			Self::Partnerships => "partnerships",
			Self::IsConfidential => "is_confidential",
			Self::Visibility => "visibility",
			Self::EffectiveVisibility => "effective_visibility",
		}
	}

	fn kind(self) -> FieldKind {
		match self {
			Self::Id => FieldKind::Uuid,
			Self::AddedBy | Self::Type | Self::EffectiveVisibility => FieldKind::Text,
			Self::Visibility => FieldKind::NullableText,
			Self::EmployeeCount | Self::FoundedYear => FieldKind::NullableInteger,
			Self::Certifications | Self::Partnerships => FieldKind::Array,
			Self::IsConfidential => FieldKind::Bool,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FieldKind {
	Uuid,
	Text,
	NullableText,
	NullableInteger,
	Array,
	Bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FilterValue {
	Text(String),
	Integer(i64),
	Bool(bool),
	Uuid(Uuid),
}
impl FilterValue {
	fn fits(&self, kind: FieldKind) -> bool {
		matches!(
			(self, kind),
			(Self::Text(_), FieldKind::Text | FieldKind::NullableText)
				| (Self::Integer(_), FieldKind::NullableInteger)
				| (Self::Bool(_), FieldKind::Bool)
				| (Self::Uuid(_), FieldKind::Uuid)
		)
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FilterOp {
	Eq(FilterValue),
	Gte(FilterValue),
	Lte(FilterValue),
	In(Vec<FilterValue>),
	/// On array fields: the array is empty.
	IsNull,
	/// On array fields: the array has at least one element.
	IsNotNull,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Predicate {
	pub field: FilterField,
	pub op: FilterOp,
}
impl Predicate {
	pub fn eq(field: FilterField, value: FilterValue) -> Self {
		Self { field, op: FilterOp::Eq(value) }
	}

	pub fn gte(field: FilterField, value: i64) -> Self {
		Self { field, op: FilterOp::Gte(FilterValue::Integer(value)) }
	}

	pub fn lte(field: FilterField, value: i64) -> Self {
		Self { field, op: FilterOp::Lte(FilterValue::Integer(value)) }
	}

	pub fn is_in(field: FilterField, values: Vec<FilterValue>) -> Self {
		Self { field, op: FilterOp::In(values) }
	}

	pub fn is_null(field: FilterField) -> Self {
		Self { field, op: FilterOp::IsNull }
	}

	pub fn is_not_null(field: FilterField) -> Self {
		Self { field, op: FilterOp::IsNotNull }
	}

	pub fn validate(&self) -> Result<()> {
		let kind = self.field.kind();
		let field = self.field.as_str();
		let supported = match &self.op {
			FilterOp::Eq(value) => kind != FieldKind::Array && value.fits(kind),
			FilterOp::Gte(value) | FilterOp::Lte(value) =>
				kind == FieldKind::NullableInteger && value.fits(kind),
			FilterOp::In(values) =>
				kind != FieldKind::Array
					&& kind != FieldKind::Bool
					&& values.iter().all(|value| value.fits(kind)),
			FilterOp::IsNull | FilterOp::IsNotNull => matches!(
				kind,
				FieldKind::NullableText | FieldKind::NullableInteger | FieldKind::Array
			),
		};

		if supported {
			Ok(())
		} else {
			Err(Error::InvalidArgument(format!(
				"Unsupported predicate {:?} on field {field}.",
				self.op
			)))
		}
	}

	pub fn matches(&self, entity: &Entity) -> bool {
		let value = field_value(self.field, entity);

		match &self.op {
			FilterOp::Eq(expected) => value.equals(expected),
			FilterOp::Gte(FilterValue::Integer(bound)) =>
				matches!(value, FieldValue::Integer(Some(actual)) if actual >= *bound),
			FilterOp::Lte(FilterValue::Integer(bound)) =>
				matches!(value, FieldValue::Integer(Some(actual)) if actual <= *bound),
			FilterOp::Gte(_) | FilterOp::Lte(_) => false,
			FilterOp::In(values) => values.iter().any(|expected| value.equals(expected)),
			FilterOp::IsNull => value.is_null(),
			FilterOp::IsNotNull => !value.is_null(),
		}
	}
}

enum FieldValue<'a> {
	Uuid(Uuid),
	Text(Option<&'a str>),
	Integer(Option<i64>),
	Bool(bool),
	ArrayLen(usize),
}
impl FieldValue<'_> {
	fn equals(&self, expected: &FilterValue) -> bool {
		match (self, expected) {
			(Self::Uuid(actual), FilterValue::Uuid(expected)) => actual == expected,
			(Self::Text(Some(actual)), FilterValue::Text(expected)) => *actual == expected,
			(Self::Integer(Some(actual)), FilterValue::Integer(expected)) => actual == expected,
			(Self::Bool(actual), FilterValue::Bool(expected)) => actual == expected,
			_ => false,
		}
	}

	fn is_null(&self) -> bool {
		match self {
			Self::Text(value) => value.is_none(),
			Self::Integer(value) => value.is_none(),
			Self::ArrayLen(len) => *len == 0,
			Self::Uuid(_) | Self::Bool(_) => false,
		}
	}
}

fn field_value(field: FilterField, entity: &Entity) -> FieldValue<'_> {
	match field {
		FilterField::Id => FieldValue::Uuid(entity.id),
		FilterField::AddedBy => FieldValue::Text(Some(entity.added_by.as_str())),
		FilterField::Type => FieldValue::Text(Some(entity.entity_type.as_str())),
		FilterField::EmployeeCount => FieldValue::Integer(entity.employee_count.map(i64::from)),
		FilterField::FoundedYear => FieldValue::Integer(entity.founded_year.map(i64::from)),
		FilterField::Certifications => FieldValue::ArrayLen(entity.certifications.len()),
		FilterField::Partnerships => FieldValue::ArrayLen(entity.partnerships.len()),
		FilterField::IsConfidential => FieldValue::Bool(entity.is_confidential),
		FilterField::Visibility =>
			FieldValue::Text(entity.visibility.map(|visibility| visibility.as_str())),
		FilterField::EffectiveVisibility =>
			FieldValue::Text(Some(entity.effective_visibility().as_str())),
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortField {
	DateAdded,
	LastUpdated,
	Name,
	FoundedYear,
	EmployeeCount,
}
impl SortField {
	pub const ALL: [Self; 5] =
		[Self::DateAdded, Self::LastUpdated, Self::Name, Self::FoundedYear, Self::EmployeeCount];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::DateAdded => "date_added",
			Self::LastUpdated => "last_updated",
			Self::Name => "name",
			Self::FoundedYear => "founded_year",
			Self::EmployeeCount => "employee_count",
		}
	}

	pub fn key_of(self, entity: &Entity) -> SortValue {
		match self {
			Self::DateAdded => SortValue::Timestamp(entity.date_added),
			Self::LastUpdated => SortValue::Timestamp(entity.last_updated),
			Self::Name => SortValue::Text(entity.name.clone()),
			Self::FoundedYear => SortValue::Integer(
				entity.founded_year.map_or(NULL_INTEGER_SORT_KEY, i64::from),
			),
			Self::EmployeeCount => SortValue::Integer(
				entity.employee_count.map_or(NULL_INTEGER_SORT_KEY, i64::from),
			),
		}
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortDirection {
	Asc,
	#[default]
	Desc,
}
impl SortDirection {
	pub fn as_sql(self) -> &'static str {
		match self {
			Self::Asc => "ASC",
			Self::Desc => "DESC",
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OrderBy {
	pub field: SortField,
	pub direction: SortDirection,
}
impl Default for OrderBy {
	fn default() -> Self {
		Self { field: SortField::DateAdded, direction: SortDirection::Desc }
	}
}
impl OrderBy {
	/// Total order over entities: sort key first, id as the tie-break, both in `direction`.
	pub fn compare(&self, a: &Entity, b: &Entity) -> Ordering {
		let ordering =
			self.field.key_of(a).cmp(&self.field.key_of(b)).then_with(|| a.id.cmp(&b.id));

		match self.direction {
			SortDirection::Asc => ordering,
			SortDirection::Desc => ordering.reverse(),
		}
	}

	pub fn is_after_cursor(&self, entity: &Entity, cursor: &Cursor) -> bool {
		let ordering =
			self.field.key_of(entity).cmp(&cursor.value).then_with(|| entity.id.cmp(&cursor.id));

		match self.direction {
			SortDirection::Asc => ordering == Ordering::Greater,
			SortDirection::Desc => ordering == Ordering::Less,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortValue {
	Timestamp(OffsetDateTime),
	Text(String),
	Integer(i64),
}

/// Position of a previously returned row: its sort key and id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cursor {
	pub value: SortValue,
	pub id: Uuid,
}
impl Cursor {
	pub fn of(entity: &Entity, field: SortField) -> Self {
		Self { value: field.key_of(entity), id: entity.id }
	}
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Pagination {
	pub limit: Option<u32>,
	pub offset: u32,
	pub after: Option<Cursor>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryDescriptor {
	pub collection: Collection,
	pub filters: Vec<Predicate>,
	pub order_by: OrderBy,
	pub pagination: Pagination,
}
impl QueryDescriptor {
	pub fn entities() -> Self {
		Self {
			collection: Collection::Entities,
			filters: Vec::new(),
			order_by: OrderBy::default(),
			pagination: Pagination::default(),
		}
	}

	pub fn validate(&self) -> Result<()> {
		for predicate in &self.filters {
			predicate.validate()?;
		}

		if let Some(cursor) = self.pagination.after.as_ref() {
			let fits = matches!(
				(self.order_by.field, &cursor.value),
				(SortField::DateAdded | SortField::LastUpdated, SortValue::Timestamp(_))
					| (SortField::Name, SortValue::Text(_))
					| (SortField::FoundedYear | SortField::EmployeeCount, SortValue::Integer(_))
			);

			if !fits {
				return Err(Error::InvalidArgument(format!(
					"Cursor value does not match sort field {}.",
					self.order_by.field.as_str()
				)));
			}
		}

		Ok(())
	}

	pub fn matches(&self, entity: &Entity) -> bool {
		self.filters.iter().all(|predicate| predicate.matches(entity))
	}

	/// Reference evaluation over an in-memory candidate set.
	pub fn apply<I>(&self, entities: I) -> Vec<Entity>
	where
		I: IntoIterator<Item = Entity>,
	{
		let mut rows: Vec<Entity> = entities
			.into_iter()
			.filter(|entity| self.matches(entity))
			.filter(|entity| match self.pagination.after.as_ref() {
				Some(cursor) => self.order_by.is_after_cursor(entity, cursor),
				None => true,
			})
			.collect();

		rows.sort_by(|a, b| self.order_by.compare(a, b));

		let rows = rows.into_iter().skip(self.pagination.offset as usize);

		match self.pagination.limit {
			Some(limit) => rows.take(limit as usize).collect(),
			None => rows.collect(),
		}
	}
}
