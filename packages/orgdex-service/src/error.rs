use std::fmt::Display;

use time::OffsetDateTime;

use orgdex_domain::Role;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Authentication required: {message}")]
	Auth { message: String },
	#[error("Permission denied: {message}")]
	Permission { message: String },
	#[error("Validation failed: {message}")]
	Validation { message: String, fields: Vec<String> },
	#[error("Query failed during {operation}: {message}")]
	Query { operation: &'static str, role: Role, at: OffsetDateTime, message: String },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Access denied: {message}")]
	AccessDenied { message: String },
}
impl Error {
	/// Wraps a persistence failure with operation context and logs the full detail.
	pub(crate) fn query(operation: &'static str, role: Role, err: impl Display) -> Self {
		let at = OffsetDateTime::now_utc();
		let message = err.to_string();

		tracing::error!(
			operation,
			role = %role,
			at = %at,
			error = %message,
			"Persistence call failed."
		);

		Self::Query { operation, role, at, message }
	}

	pub(crate) fn validation(fields: Vec<String>) -> Self {
		let message = format!("Missing or invalid fields: {}.", fields.join(", "));

		Self::Validation { message, fields }
	}

	/// Short machine-readable code for the error kind.
	pub fn code(&self) -> &'static str {
		match self {
			Self::Auth { .. } => "auth_required",
			Self::Permission { .. } => "permission_denied",
			Self::Validation { .. } => "validation_failed",
			Self::Query { .. } => "query_failed",
			Self::NotFound { .. } => "not_found",
			Self::AccessDenied { .. } => "access_denied",
		}
	}
}
