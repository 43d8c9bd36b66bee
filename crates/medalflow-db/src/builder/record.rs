//! Loosely-typed form of a serialized [`Operation`].
//!
//! A record carries every field any variant may have, keyed by the names
//! operations serialize under. Converting it feeds those fields through
//! [`OperationBuilder`], so deserialized operations pass the same
//! validation as constructed ones.

use super::{BuildError, OperationBuilder};
use crate::operations::{ColumnDefinition, InsertSource, MergeActions, Operation, SqlValue};
use indexmap::IndexMap;
use medalflow_core::{EngineType, FileFormat, InsertMode, QueryType, ResultFormat, ValidationError};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct OperationRecord {
	#[serde(rename = "type")]
	query_type: Option<QueryType>,
	schema_name: String,
	object_name: String,
	engine_hint: Option<EngineType>,
	logging_context: Option<String>,

	columns: ColumnsRecord,
	select_query: Option<String>,
	source_table: Option<String>,
	location: Option<String>,
	file_format: Option<FileFormat>,
	partitions: Vec<String>,
	distribution: Option<String>,
	properties: IndexMap<String, String>,
	recreate: Option<bool>,
	if_exists: Option<bool>,
	if_not_exists: Option<bool>,
	cascade: Option<bool>,
	restrict: Option<bool>,
	authorization: Option<String>,

	distinct: bool,
	join_clause: Option<String>,
	where_clause: Option<String>,
	group_by: Vec<String>,
	having: Option<String>,
	order_by: Vec<String>,
	limit: Option<u64>,
	offset: Option<u64>,

	source: Option<InsertSource>,
	mode: Option<InsertMode>,
	set_columns: IndexMap<String, SqlValue>,
	from_clause: Option<String>,

	source_query: Option<String>,
	merge_condition: Option<String>,
	when_matched_update: Option<IndexMap<String, SqlValue>>,
	when_matched_delete: Option<String>,
	when_not_matched_insert: Option<IndexMap<String, SqlValue>>,
	when_not_matched_by_source_update: Option<IndexMap<String, SqlValue>>,
	when_not_matched_by_source_delete: bool,

	schemabinding: Option<bool>,
	materialized: Option<bool>,
	or_replace: Option<bool>,

	sample_percent: Option<f64>,
	with_fullscan: Option<bool>,
	stats_name: Option<String>,
	auto_discover: Option<bool>,

	source_path: Option<String>,
	options: IndexMap<String, SqlValue>,
	credential: Option<String>,

	sql: Option<String>,
	returns_results: Option<bool>,
	result_format: Option<ResultFormat>,
}

/// `columns` holds names for most operations and full definitions for
/// CREATE TABLE.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ColumnsRecord {
	Names(Vec<String>),
	Definitions(Vec<ColumnRecord>),
}

impl Default for ColumnsRecord {
	fn default() -> Self {
		ColumnsRecord::Names(Vec::new())
	}
}

#[derive(Debug, Deserialize)]
struct ColumnRecord {
	name: String,
	data_type: String,
	#[serde(default = "nullable_by_default")]
	nullable: bool,
	#[serde(default)]
	default_value: Option<SqlValue>,
	#[serde(default)]
	primary_key: bool,
	#[serde(default)]
	unique: bool,
	#[serde(default)]
	check_constraint: Option<String>,
	#[serde(default)]
	collation: Option<String>,
	#[serde(default)]
	computed_expression: Option<String>,
}

fn nullable_by_default() -> bool {
	true
}

impl ColumnRecord {
	fn into_definition(self) -> Result<ColumnDefinition, ValidationError> {
		let mut column = ColumnDefinition::new(self.name, self.data_type)?.with_nullable(self.nullable);
		if self.primary_key {
			column = column.primary_key();
		}
		if self.unique {
			column = column.unique();
		}
		if let Some(check) = self.check_constraint {
			column = column.with_check_constraint(check);
		}
		if let Some(collation) = self.collation {
			column = column.with_collation(collation)?;
		}
		if let Some(value) = self.default_value {
			column = column.with_default_value(value)?;
		}
		if let Some(expression) = self.computed_expression {
			column = column.with_computed_expression(expression)?;
		}
		Ok(column)
	}
}

impl OperationRecord {
	fn into_builder(self) -> Result<OperationBuilder, BuildError> {
		let query_type = self.query_type.unwrap_or(QueryType::Unknown);
		let invalid = |source: ValidationError| BuildError::Invalid {
			operation: query_type,
			source,
		};

		let mut builder = OperationBuilder::new(query_type, self.schema_name, self.object_name);
		if let Some(engine) = self.engine_hint {
			builder = builder.engine_hint(engine);
		}
		if let Some(context) = self.logging_context {
			builder = builder.logging_context(context);
		}

		match (query_type, self.columns) {
			(QueryType::CreateTable, ColumnsRecord::Definitions(columns)) => {
				for column in columns {
					builder = builder.column(column.into_definition().map_err(invalid)?);
				}
			}
			(QueryType::CreateTable, ColumnsRecord::Names(names)) if !names.is_empty() => {
				return Err(invalid(ValidationError::Conflict {
					fields: &["columns"],
					message: "CREATE_TABLE columns must be column definitions".to_string(),
				}));
			}
			(_, ColumnsRecord::Names(names)) => builder = builder.columns(names),
			(_, ColumnsRecord::Definitions(_)) => {
				return Err(invalid(ValidationError::Conflict {
					fields: &["columns"],
					message: format!("{query_type} columns must be column names"),
				}));
			}
		}

		let select_query = self.select_query.or(self.source_query);
		if let Some(query) = select_query {
			builder = builder.select_query(query);
		}
		match self.source {
			Some(InsertSource::Query(query)) => builder = builder.select_query(query),
			Some(InsertSource::Values(rows)) => {
				for row in rows {
					builder = builder.value_row(row);
				}
			}
			None => {}
		}

		if let Some(table) = self.source_table {
			builder = builder.source_table(table);
		}
		if let Some(location) = self.location {
			builder = builder.location(location);
		}
		if let Some(format) = self.file_format {
			builder = builder.file_format(format);
		}
		for partition in self.partitions {
			builder = builder.partition(partition);
		}
		if let Some(distribution) = self.distribution {
			builder = builder.distribution(distribution);
		}
		for (key, value) in self.properties {
			builder = builder.property(key, value);
		}
		if let Some(recreate) = self.recreate {
			builder = builder.recreate(recreate);
		}
		if let Some(if_exists) = self.if_exists {
			builder = builder.if_exists(if_exists);
		}
		if let Some(if_not_exists) = self.if_not_exists {
			builder = builder.if_not_exists(if_not_exists);
		}
		if let Some(cascade) = self.cascade {
			builder = builder.cascade(cascade);
		}
		if let Some(restrict) = self.restrict {
			builder = builder.restrict(restrict);
		}
		if let Some(owner) = self.authorization {
			builder = builder.authorization(owner);
		}

		builder = builder.distinct(self.distinct);
		if let Some(join) = self.join_clause {
			builder = builder.join(join);
		}
		if let Some(condition) = self.where_clause {
			builder = builder.where_clause(condition);
		}
		for column in self.group_by {
			builder = builder.group_by(column);
		}
		if let Some(having) = self.having {
			builder = builder.having(having);
		}
		for expression in self.order_by {
			builder = builder.order_by(expression);
		}
		if let Some(limit) = self.limit {
			builder = builder.limit(limit);
		}
		if let Some(offset) = self.offset {
			builder = builder.offset(offset);
		}

		if let Some(mode) = self.mode {
			builder = builder.insert_mode(mode);
		}
		for (column, value) in self.set_columns {
			builder = builder.set(column, value);
		}
		if let Some(from) = self.from_clause {
			builder = builder.from_clause(from);
		}

		if let Some(condition) = self.merge_condition {
			builder = builder.merge_condition(condition);
		}
		builder = builder.merge_actions(MergeActions {
			when_matched_update: self.when_matched_update,
			when_matched_delete: self.when_matched_delete,
			when_not_matched_insert: self.when_not_matched_insert,
			when_not_matched_by_source_update: self.when_not_matched_by_source_update,
			when_not_matched_by_source_delete: self.when_not_matched_by_source_delete,
		});

		if let Some(or_replace) = self.or_replace {
			builder = builder.or_replace(or_replace);
		}
		if let Some(schemabinding) = self.schemabinding {
			builder = builder.schemabinding(schemabinding);
		}
		if let Some(materialized) = self.materialized {
			builder = builder.materialized(materialized);
		}

		if let Some(fullscan) = self.with_fullscan {
			builder = builder.fullscan(fullscan);
		}
		if let Some(percent) = self.sample_percent {
			builder = builder.sample_percent(percent);
		}
		if let Some(name) = self.stats_name {
			builder = builder.stats_name(name);
		}
		if let Some(auto_discover) = self.auto_discover {
			builder = builder.auto_discover(auto_discover);
		}

		if let Some(path) = self.source_path {
			builder = builder.source_path(path);
		}
		for (key, value) in self.options {
			builder = builder.option(key, value);
		}
		if let Some(credential) = self.credential {
			builder = builder.credential(credential);
		}

		if let Some(sql) = self.sql {
			builder = builder.sql(sql);
		}
		if let Some(returns_results) = self.returns_results {
			builder = builder.returns_results(returns_results);
		}
		if let Some(format) = self.result_format {
			builder = builder.result_format(format);
		}

		Ok(builder)
	}
}

impl TryFrom<OperationRecord> for Operation {
	type Error = BuildError;

	fn try_from(record: OperationRecord) -> Result<Self, Self::Error> {
		record.into_builder()?.build()
	}
}
