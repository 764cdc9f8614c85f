use serde_json::Value;

use crate::{Error, Result};
use orgdex_domain::{EntityType, Visibility};

/// Collects every missing or malformed field before failing once.
#[derive(Default)]
pub(crate) struct FieldCheck {
	invalid: Vec<String>,
}
impl FieldCheck {
	pub(crate) fn required_text(&mut self, field: &str, value: Option<&str>) -> Option<String> {
		match value.map(str::trim) {
			Some(text) if !text.is_empty() => Some(text.to_string()),
			_ => {
				self.reject(field);

				None
			},
		}
	}

	/// Present values must be non-blank.
	pub(crate) fn non_blank(&mut self, field: &str, value: Option<&str>) -> Option<String> {
		value.and_then(|text| self.required_text(field, Some(text)))
	}

	pub(crate) fn entity_type(&mut self, field: &str, value: Option<&str>) -> Option<EntityType> {
		let raw = value?;

		match raw.parse() {
			Ok(entity_type) => Some(entity_type),
			Err(_) => {
				self.reject(field);

				None
			},
		}
	}

	pub(crate) fn visibility(&mut self, value: Option<&str>) -> Option<Visibility> {
		let raw = value?;

		match raw.parse() {
			Ok(visibility) => Some(visibility),
			Err(_) => {
				self.reject("visibility");

				None
			},
		}
	}

	pub(crate) fn non_negative(&mut self, field: &str, value: Option<i32>) -> Option<i32> {
		match value {
			Some(number) if number < 0 => {
				self.reject(field);

				None
			},
			other => other,
		}
	}

	/// `None` for absent or null values. Anything but an array of strings is rejected.
	pub(crate) fn string_array(
		&mut self,
		field: &str,
		value: Option<&Value>,
	) -> Option<Vec<String>> {
		match value {
			None | Some(Value::Null) => None,
			Some(Value::Array(items)) => {
				let mut out = Vec::with_capacity(items.len());

				for item in items {
					let Some(text) = item.as_str() else {
						self.reject(field);

						return None;
					};
					let text = text.trim();

					if !text.is_empty() {
						out.push(text.to_string());
					}
				}

				Some(out)
			},
			Some(_) => {
				self.reject(field);

				None
			},
		}
	}

	pub(crate) fn finish(self) -> Result<()> {
		if self.invalid.is_empty() {
			return Ok(());
		}

		Err(Error::validation(self.invalid))
	}

	fn reject(&mut self, field: &str) {
		if !self.invalid.iter().any(|existing| existing == field) {
			self.invalid.push(field.to_string());
		}
	}
}

/// Tier a payload asks for, read leniently so permission checks run before validation.
pub(crate) fn requested_visibility(
	visibility: Option<&str>,
	is_confidential: Option<bool>,
) -> Option<Visibility> {
	if is_confidential == Some(true) {
		return Some(Visibility::Confidential);
	}

	visibility.and_then(|raw| raw.parse().ok())
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn collects_every_invalid_field() {
		let mut check = FieldCheck::default();

		check.required_text("name", Some("  "));
		check.entity_type("type", Some("spaceships"));
		check.string_array("tags", Some(&json!("robots")));
		check.string_array("services", Some(&json!(["ok", 3])));

		let Err(Error::Validation { fields, .. }) = check.finish() else {
			panic!("Expected a validation error.");
		};

		assert_eq!(fields, vec!["name", "type", "tags", "services"]);
	}

	#[test]
	fn null_arrays_count_as_unset() {
		let mut check = FieldCheck::default();

		assert_eq!(check.string_array("tags", Some(&Value::Null)), None);
		assert_eq!(
			check.string_array("tags", Some(&json!([" a ", ""]))),
			Some(vec!["a".to_string()])
		);
		assert!(check.finish().is_ok());
	}

	#[test]
	fn confidential_flag_wins_over_nominal_tier() {
		assert_eq!(
			requested_visibility(Some("public"), Some(true)),
			Some(Visibility::Confidential)
		);
		assert_eq!(requested_visibility(Some("member"), None), Some(Visibility::Member));
		assert_eq!(requested_visibility(Some("bogus"), Some(false)), None);
	}
}
