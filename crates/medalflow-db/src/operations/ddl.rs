//! Table and schema DDL operations.

use super::column::ColumnDefinition;
use super::target::ObjectTarget;
use indexmap::IndexMap;
use medalflow_core::validators::{validate_column_name, validate_object_identifier};
use medalflow_core::{FileFormat, QueryType, ValidationError};
use serde::Serialize;

/// How a table's shape and contents are defined.
///
/// At least one of the four must be set. `location` may be combined with
/// `columns` to describe a table over files that already exist.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableDefinition {
	pub columns: Vec<ColumnDefinition>,
	pub select_query: Option<String>,
	pub source_table: Option<String>,
	pub location: Option<String>,
}

impl TableDefinition {
	pub fn columns(columns: impl IntoIterator<Item = ColumnDefinition>) -> Self {
		Self {
			columns: columns.into_iter().collect(),
			..Self::default()
		}
	}

	pub fn select(query: impl Into<String>) -> Self {
		Self {
			select_query: Some(query.into()),
			..Self::default()
		}
	}

	pub fn source_table(table: impl Into<String>) -> Self {
		Self {
			source_table: Some(table.into()),
			..Self::default()
		}
	}

	pub fn location(location: impl Into<String>) -> Self {
		Self {
			location: Some(location.into()),
			..Self::default()
		}
	}

	pub fn with_location(mut self, location: impl Into<String>) -> Self {
		self.location = Some(location.into());
		self
	}

	pub fn with_columns(mut self, columns: impl IntoIterator<Item = ColumnDefinition>) -> Self {
		self.columns = columns.into_iter().collect();
		self
	}

	fn is_empty(&self) -> bool {
		self.columns.is_empty()
			&& self.select_query.is_none()
			&& self.source_table.is_none()
			&& self.location.is_none()
	}
}

fn non_blank(
	field: &'static str,
	value: Option<String>,
) -> Result<Option<String>, ValidationError> {
	match value {
		Some(v) if v.trim().is_empty() => Err(ValidationError::EmptyField { field }),
		other => Ok(other),
	}
}

/// `CREATE TABLE` in any of its definition modes.
///
/// The select text is trusted SQL and rendered verbatim.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateTable {
	#[serde(flatten)]
	target: ObjectTarget,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	columns: Vec<ColumnDefinition>,
	select_query: Option<String>,
	source_table: Option<String>,
	location: Option<String>,
	file_format: FileFormat,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	partitions: Vec<String>,
	distribution: Option<String>,
	#[serde(skip_serializing_if = "IndexMap::is_empty")]
	properties: IndexMap<String, String>,
	recreate: bool,
}

impl CreateTable {
	/// Validates `definition` against the target.
	///
	/// When a select query is given without a location, the location
	/// defaults to `"{schema_name}/{object_name}"`.
	pub fn new(target: ObjectTarget, definition: TableDefinition) -> Result<Self, ValidationError> {
		if definition.is_empty() {
			return Err(ValidationError::Incomplete {
				operation: QueryType::CreateTable,
				message: "CreateTable requires at least one definition method: columns, select_query, source_table, or location".to_string(),
			});
		}

		let TableDefinition {
			columns,
			select_query,
			source_table,
			location,
		} = definition;

		for column in &columns {
			column.validate()?;
		}
		let select_query = non_blank("select_query", select_query)?;
		let source_table = non_blank("source_table", source_table)?;
		if let Some(source) = &source_table {
			for part in source.split('.') {
				validate_object_identifier(part, "source table")
					.map_err(|e| ValidationError::identifier("source_table", e))?;
			}
		}
		let mut location = non_blank("location", location)?;
		if select_query.is_some() && location.is_none() {
			location = Some(format!("{}/{}", target.schema_name(), target.object_name()));
		}

		Ok(Self {
			target,
			columns,
			select_query,
			source_table,
			location,
			file_format: FileFormat::default(),
			partitions: Vec::new(),
			distribution: None,
			properties: IndexMap::new(),
			recreate: true,
		})
	}

	/// CREATE TABLE AS SELECT.
	pub fn as_select(
		target: ObjectTarget,
		query: impl Into<String>,
	) -> Result<Self, ValidationError> {
		Self::new(target, TableDefinition::select(query))
	}

	pub fn with_file_format(mut self, format: FileFormat) -> Self {
		self.file_format = format;
		self
	}

	pub fn with_partitions<I, S>(mut self, partitions: I) -> Result<Self, ValidationError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let partitions: Vec<String> = partitions.into_iter().map(Into::into).collect();
		for partition in &partitions {
			validate_column_name(partition).map_err(|e| ValidationError::identifier("partitions", e))?;
		}
		self.partitions = partitions;
		Ok(self)
	}

	pub fn with_distribution(mut self, distribution: impl Into<String>) -> Self {
		self.distribution = Some(distribution.into());
		self
	}

	pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.properties.insert(key.into(), value.into());
		self
	}

	pub fn with_recreate(mut self, recreate: bool) -> Self {
		self.recreate = recreate;
		self
	}

	pub fn target(&self) -> &ObjectTarget {
		&self.target
	}

	pub fn columns(&self) -> &[ColumnDefinition] {
		&self.columns
	}

	pub fn select_query(&self) -> Option<&str> {
		self.select_query.as_deref()
	}

	/// Source table as written by the caller, optionally `schema.table`.
	pub fn source_table(&self) -> Option<&str> {
		self.source_table.as_deref()
	}

	pub fn location(&self) -> Option<&str> {
		self.location.as_deref()
	}

	pub fn file_format(&self) -> FileFormat {
		self.file_format
	}

	pub fn partitions(&self) -> &[String] {
		&self.partitions
	}

	pub fn distribution(&self) -> Option<&str> {
		self.distribution.as_deref()
	}

	pub fn properties(&self) -> &IndexMap<String, String> {
		&self.properties
	}

	pub fn recreate(&self) -> bool {
		self.recreate
	}
}

/// `DROP TABLE`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DropTable {
	#[serde(flatten)]
	target: ObjectTarget,
	if_exists: bool,
	cascade: bool,
}

impl DropTable {
	pub fn new(target: ObjectTarget) -> Self {
		Self {
			target,
			if_exists: true,
			cascade: false,
		}
	}

	pub fn with_if_exists(mut self, if_exists: bool) -> Self {
		self.if_exists = if_exists;
		self
	}

	pub fn with_cascade(mut self, cascade: bool) -> Self {
		self.cascade = cascade;
		self
	}

	pub fn target(&self) -> &ObjectTarget {
		&self.target
	}

	pub fn if_exists(&self) -> bool {
		self.if_exists
	}

	pub fn cascade(&self) -> bool {
		self.cascade
	}
}

/// `CREATE SCHEMA`. The target's schema is the schema being created.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateSchema {
	#[serde(flatten)]
	target: ObjectTarget,
	if_not_exists: bool,
	authorization: Option<String>,
}

impl CreateSchema {
	pub fn new(target: ObjectTarget) -> Self {
		Self {
			target,
			if_not_exists: true,
			authorization: None,
		}
	}

	/// Schema-only target, with the schema name doubling as the object name.
	pub fn named(schema_name: impl Into<String>) -> Result<Self, ValidationError> {
		let schema_name = schema_name.into();
		Ok(Self::new(ObjectTarget::new(schema_name.clone(), schema_name)?))
	}

	pub fn with_if_not_exists(mut self, if_not_exists: bool) -> Self {
		self.if_not_exists = if_not_exists;
		self
	}

	pub fn with_authorization(mut self, owner: impl Into<String>) -> Result<Self, ValidationError> {
		let owner = owner.into();
		validate_object_identifier(&owner, "authorization")
			.map_err(|e| ValidationError::identifier("authorization", e))?;
		self.authorization = Some(owner);
		Ok(self)
	}

	pub fn target(&self) -> &ObjectTarget {
		&self.target
	}

	pub fn schema_name(&self) -> &str {
		self.target.schema_name()
	}

	pub fn if_not_exists(&self) -> bool {
		self.if_not_exists
	}

	pub fn authorization(&self) -> Option<&str> {
		self.authorization.as_deref()
	}
}

/// `DROP SCHEMA`. `cascade` and `restrict` are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DropSchema {
	#[serde(flatten)]
	target: ObjectTarget,
	if_exists: bool,
	cascade: bool,
	restrict: bool,
}

impl DropSchema {
	pub fn new(target: ObjectTarget) -> Self {
		Self {
			target,
			if_exists: true,
			cascade: false,
			restrict: false,
		}
	}

	pub fn named(schema_name: impl Into<String>) -> Result<Self, ValidationError> {
		let schema_name = schema_name.into();
		Ok(Self::new(ObjectTarget::new(schema_name.clone(), schema_name)?))
	}

	pub fn with_if_exists(mut self, if_exists: bool) -> Self {
		self.if_exists = if_exists;
		self
	}

	pub fn with_cascade(mut self, cascade: bool) -> Result<Self, ValidationError> {
		self.cascade = cascade;
		self.validate()?;
		Ok(self)
	}

	pub fn with_restrict(mut self, restrict: bool) -> Result<Self, ValidationError> {
		self.restrict = restrict;
		self.validate()?;
		Ok(self)
	}

	fn validate(&self) -> Result<(), ValidationError> {
		if self.cascade && self.restrict {
			return Err(ValidationError::Conflict {
				fields: &["cascade", "restrict"],
				message: "Cannot specify both cascade and restrict".to_string(),
			});
		}
		Ok(())
	}

	pub fn target(&self) -> &ObjectTarget {
		&self.target
	}

	pub fn schema_name(&self) -> &str {
		self.target.schema_name()
	}

	pub fn if_exists(&self) -> bool {
		self.if_exists
	}

	pub fn cascade(&self) -> bool {
		self.cascade
	}

	pub fn restrict(&self) -> bool {
		self.restrict
	}
}
