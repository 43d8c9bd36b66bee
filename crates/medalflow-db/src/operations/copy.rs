use super::target::ObjectTarget;
use super::value::SqlValue;
use indexmap::IndexMap;
use medalflow_core::validators::validate_sql_identifier;
use medalflow_core::{FileFormat, ResultFormat, ValidationError};
use serde::Serialize;

/// Bulk load of files into the target table (`COPY INTO`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Copy {
	#[serde(flatten)]
	target: ObjectTarget,
	source_path: String,
	file_format: FileFormat,
	#[serde(skip_serializing_if = "IndexMap::is_empty")]
	options: IndexMap<String, SqlValue>,
	#[serde(skip_serializing)]
	credential: Option<String>,
}

impl Copy {
	pub fn new(
		target: ObjectTarget,
		source_path: impl Into<String>,
	) -> Result<Self, ValidationError> {
		let source_path = source_path.into();
		if source_path.trim().is_empty() {
			return Err(ValidationError::EmptyField { field: "source_path" });
		}
		Ok(Self {
			target,
			source_path,
			file_format: FileFormat::default(),
			options: IndexMap::new(),
			credential: None,
		})
	}

	pub fn with_file_format(mut self, format: FileFormat) -> Self {
		self.file_format = format;
		self
	}

	/// Adds a `KEY = value` option to the `WITH` clause. Keys are validated identifiers.
	pub fn with_option(
		mut self,
		key: impl Into<String>,
		value: impl Into<SqlValue>,
	) -> Result<Self, ValidationError> {
		let key = key.into();
		validate_sql_identifier(&key, "option").map_err(|e| ValidationError::identifier("options", e))?;
		self.options.insert(key, value.into());
		Ok(self)
	}

	/// Credential clause body, e.g. `IDENTITY = 'Managed Identity'`. Trusted SQL.
	pub fn with_credential(mut self, credential: impl Into<String>) -> Self {
		self.credential = Some(credential.into());
		self
	}

	pub fn target(&self) -> &ObjectTarget {
		&self.target
	}

	pub fn source_path(&self) -> &str {
		&self.source_path
	}

	pub fn file_format(&self) -> FileFormat {
		self.file_format
	}

	pub fn options(&self) -> &IndexMap<String, SqlValue> {
		&self.options
	}

	pub fn credential(&self) -> Option<&str> {
		self.credential.as_deref()
	}
}

/// Raw SQL executed in the context of a target object.
///
/// The text is screened against the platform's deny list at render time but
/// is otherwise passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecuteSql {
	#[serde(flatten)]
	target: ObjectTarget,
	sql: String,
	returns_results: bool,
	result_format: ResultFormat,
	limit: Option<u64>,
}

impl ExecuteSql {
	pub fn new(target: ObjectTarget, sql: impl Into<String>) -> Result<Self, ValidationError> {
		let sql = sql.into();
		if sql.trim().is_empty() {
			return Err(ValidationError::EmptyField { field: "sql" });
		}
		Ok(Self {
			target,
			sql,
			returns_results: false,
			result_format: ResultFormat::default(),
			limit: None,
		})
	}

	/// Marks the statement as returning rows in `format`.
	pub fn returning(mut self, format: ResultFormat) -> Self {
		self.returns_results = true;
		self.result_format = format;
		self
	}

	pub fn with_returns_results(mut self, returns_results: bool) -> Result<Self, ValidationError> {
		self.returns_results = returns_results;
		self.validate()?;
		Ok(self)
	}

	pub fn with_result_format(mut self, format: ResultFormat) -> Result<Self, ValidationError> {
		self.result_format = format;
		self.validate()?;
		Ok(self)
	}

	pub fn with_limit(mut self, limit: u64) -> Result<Self, ValidationError> {
		if limit == 0 {
			return Err(ValidationError::OutOfRange {
				field: "limit",
				expected: "a positive integer",
				actual: limit.to_string(),
			});
		}
		self.limit = Some(limit);
		Ok(self)
	}

	fn validate(&self) -> Result<(), ValidationError> {
		if !self.returns_results && self.result_format != ResultFormat::default() {
			return Err(ValidationError::Conflict {
				fields: &["result_format", "returns_results"],
				message: "result_format can only be set when returns_results=true".to_string(),
			});
		}
		Ok(())
	}

	pub fn target(&self) -> &ObjectTarget {
		&self.target
	}

	pub fn sql(&self) -> &str {
		&self.sql
	}

	pub fn returns_results(&self) -> bool {
		self.returns_results
	}

	pub fn result_format(&self) -> ResultFormat {
		self.result_format
	}

	pub fn limit(&self) -> Option<u64> {
		self.limit
	}
}
