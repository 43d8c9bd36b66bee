//! Error taxonomy for the operation model and the query builders.
//!
//! Each enum carries enough context (field, target object, violated rule) for
//! a caller to correct its input, and a stable [`code`](ValidationError::code)
//! for branching on the failure cause without matching on message text.

use crate::constants::{ComputeType, MAX_IDENTIFIER_LENGTH, QueryType};

/// Result alias defaulting to [`ValidationError`].
pub type Result<T, E = ValidationError> = std::result::Result<T, E>;

/// An identifier failed the safety rules applied before SQL interpolation.
///
/// `kind` names the role of the identifier ("schema", "object", "column", ...).
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentifierError {
	#[error("Empty {kind} name")]
	Empty { kind: &'static str },

	#[error("{kind} name too long: {length} characters (max {MAX_IDENTIFIER_LENGTH})")]
	TooLong { kind: &'static str, length: usize },

	#[error("Invalid {kind} name '{identifier}': must start with a letter or underscore")]
	InvalidFirstCharacter {
		kind: &'static str,
		identifier: String,
	},

	#[error("Invalid {kind} name '{identifier}': character '{character}' is not allowed")]
	InvalidCharacter {
		kind: &'static str,
		identifier: String,
		character: char,
	},

	#[error("Potentially dangerous {kind} name: '{identifier}'")]
	DangerousPattern {
		kind: &'static str,
		identifier: String,
	},
}

impl IdentifierError {
	pub fn code(&self) -> &'static str {
		"INVALID_IDENTIFIER"
	}
}

/// Construction or finalize-time validation failure.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
	#[error("Invalid {field}: {source}")]
	Identifier {
		field: &'static str,
		#[source]
		source: IdentifierError,
	},

	#[error("{field} cannot be empty")]
	EmptyField { field: &'static str },

	#[error("{field} must be {expected}, got {actual}")]
	OutOfRange {
		field: &'static str,
		expected: &'static str,
		actual: String,
	},

	/// Two or more fields were set in a combination that is not allowed.
	#[error("{message}")]
	Conflict {
		fields: &'static [&'static str],
		message: String,
	},

	/// A variant is missing something it needs to describe a statement.
	#[error("{message}")]
	Incomplete {
		operation: QueryType,
		message: String,
	},

	#[error(
		"No columns specified for statistics on {object}. Either provide columns explicitly or enable auto_discover with a stats column provider configured."
	)]
	NoStatisticsColumns { object: String },
}

impl ValidationError {
	/// Stable error code for programmatic branching.
	pub fn code(&self) -> &'static str {
		match self {
			ValidationError::Identifier { .. } => "VALIDATION_001",
			ValidationError::EmptyField { .. } => "VALIDATION_002",
			ValidationError::OutOfRange { .. } => "VALIDATION_003",
			ValidationError::Conflict { .. } => "VALIDATION_004",
			ValidationError::Incomplete { .. } => "VALIDATION_005",
			ValidationError::NoStatisticsColumns { .. } => "VALIDATION_006",
		}
	}

	/// Field the failure is attributed to, when there is a single one.
	pub fn field(&self) -> Option<&'static str> {
		match self {
			ValidationError::Identifier { field, .. }
			| ValidationError::EmptyField { field }
			| ValidationError::OutOfRange { field, .. } => Some(*field),
			ValidationError::Conflict { fields, .. } => fields.first().copied(),
			ValidationError::NoStatisticsColumns { .. } => Some("columns"),
			ValidationError::Incomplete { .. } => None,
		}
	}

	pub fn identifier(field: &'static str, source: IdentifierError) -> Self {
		ValidationError::Identifier { field, source }
	}
}

/// Failure while rendering an operation into SQL text.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QueryBuildError {
	#[error("Operation type {operation} not supported by the {platform} query builder: {reason}")]
	Unsupported {
		platform: ComputeType,
		operation: QueryType,
		reason: &'static str,
	},

	#[error(transparent)]
	Identifier(#[from] IdentifierError),

	#[error(transparent)]
	Validation(#[from] ValidationError),

	#[error("Potentially dangerous SQL pattern detected: {pattern}")]
	UnsafeSql { pattern: &'static str },

	#[error("Cannot create statistics on {object}: {reason}")]
	Statistics { object: String, reason: String },

	/// The operation is valid but lacks what this platform needs to render it.
	#[error("Cannot render {operation} for {object} on {platform}: {reason}")]
	Unrenderable {
		platform: ComputeType,
		operation: QueryType,
		object: String,
		reason: &'static str,
	},
}

impl QueryBuildError {
	pub fn code(&self) -> &'static str {
		match self {
			QueryBuildError::Unsupported { .. } => "OPERATION_NOT_SUPPORTED",
			QueryBuildError::Identifier(err) => err.code(),
			QueryBuildError::Validation(err) => err.code(),
			QueryBuildError::UnsafeSql { .. } => "UNSAFE_SQL",
			QueryBuildError::Statistics { .. } => "QUERY_BUILD_001",
			QueryBuildError::Unrenderable { .. } => "QUERY_BUILD_002",
		}
	}

	/// Returns `true` when the failure is an identifier-safety rejection.
	pub fn is_identifier_error(&self) -> bool {
		matches!(
			self,
			QueryBuildError::Identifier(_)
				| QueryBuildError::Validation(ValidationError::Identifier { .. })
		)
	}
}
