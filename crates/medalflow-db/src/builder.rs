//! Incremental construction of operations.
//!
//! [`OperationBuilder`] collects fields without checking them and hands them
//! to the validated constructor of the requested variant on
//! [`build`](OperationBuilder::build). It suits callers that assemble an
//! operation from loosely-typed input, such as pipeline metadata.

mod record;

pub(crate) use record::OperationRecord;

use crate::operations::{
	ColumnDefinition, Copy, CreateOrAlterView, CreateSchema, CreateStatistics, CreateTable,
	Delete, DropSchema, DropTable, DropView, ExecuteSql, Insert, InsertSource, Merge,
	MergeActions, ObjectTarget, Operation, QueryMetadata, Select, SqlValue, TableDefinition,
	Update,
};
use crate::stats::StatsColumnProvider;
use indexmap::IndexMap;
use medalflow_core::{EngineType, FileFormat, InsertMode, QueryType, ResultFormat, ValidationError};
use std::sync::Arc;

/// Failure to turn accumulated builder state into an [`Operation`].
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BuildError {
	#[error("Unsupported operation type: {0}")]
	UnsupportedType(QueryType),

	#[error("Cannot create operation {operation}: {source}")]
	Invalid {
		operation: QueryType,
		#[source]
		source: ValidationError,
	},
}

/// Accumulates the fields of one operation.
///
/// Every setter is a plain assignment; the variant's constructor and `with_*`
/// methods run on [`build`](Self::build), so the builder rejects exactly what
/// direct construction rejects.
///
/// # Examples
///
/// ```
/// use medalflow_core::QueryType;
/// use medalflow_db::OperationBuilder;
///
/// let operation = OperationBuilder::new(QueryType::Select, "silver", "orders")
///     .columns(["order_id", "amount"])
///     .where_clause("amount > 100")
///     .limit(10)
///     .build()
///     .unwrap();
///
/// assert_eq!(operation.operation_type(), QueryType::Select);
/// ```
#[derive(Debug, Clone)]
pub struct OperationBuilder {
	query_type: QueryType,
	schema_name: String,
	object_name: String,
	engine_hint: Option<EngineType>,
	logging_context: Option<String>,
	metadata: Option<Arc<QueryMetadata>>,

	column_definitions: Vec<ColumnDefinition>,
	columns: Vec<String>,
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
	set_columns: IndexMap<String, SqlValue>,
	from_clause: Option<String>,
	value_rows: Vec<IndexMap<String, SqlValue>>,
	insert_mode: Option<InsertMode>,
	merge_condition: Option<String>,
	merge_actions: MergeActions,

	or_replace: Option<bool>,
	schemabinding: Option<bool>,
	materialized: Option<bool>,

	sql: Option<String>,
	returns_results: Option<bool>,
	result_format: Option<ResultFormat>,
	source_path: Option<String>,
	options: IndexMap<String, SqlValue>,
	credential: Option<String>,

	sample_percent: Option<f64>,
	fullscan: Option<bool>,
	stats_name: Option<String>,
	auto_discover: Option<bool>,
}

impl OperationBuilder {
	pub fn new(
		query_type: QueryType,
		schema_name: impl Into<String>,
		object_name: impl Into<String>,
	) -> Self {
		Self {
			query_type,
			schema_name: schema_name.into(),
			object_name: object_name.into(),
			engine_hint: None,
			logging_context: None,
			metadata: None,
			column_definitions: Vec::new(),
			columns: Vec::new(),
			select_query: None,
			source_table: None,
			location: None,
			file_format: None,
			partitions: Vec::new(),
			distribution: None,
			properties: IndexMap::new(),
			recreate: None,
			if_exists: None,
			if_not_exists: None,
			cascade: None,
			restrict: None,
			authorization: None,
			distinct: false,
			join_clause: None,
			where_clause: None,
			group_by: Vec::new(),
			having: None,
			order_by: Vec::new(),
			limit: None,
			offset: None,
			set_columns: IndexMap::new(),
			from_clause: None,
			value_rows: Vec::new(),
			insert_mode: None,
			merge_condition: None,
			merge_actions: MergeActions::default(),
			or_replace: None,
			schemabinding: None,
			materialized: None,
			sql: None,
			returns_results: None,
			result_format: None,
			source_path: None,
			options: IndexMap::new(),
			credential: None,
			sample_percent: None,
			fullscan: None,
			stats_name: None,
			auto_discover: None,
		}
	}

	pub fn query_type(&self) -> QueryType {
		self.query_type
	}

	pub fn engine_hint(mut self, engine: EngineType) -> Self {
		self.engine_hint = Some(engine);
		self
	}

	pub fn logging_context(mut self, context: impl Into<String>) -> Self {
		self.logging_context = Some(context.into());
		self
	}

	pub fn metadata(mut self, metadata: impl Into<Arc<QueryMetadata>>) -> Self {
		self.metadata = Some(metadata.into());
		self
	}

	/// Adds a column definition (CREATE TABLE).
	pub fn column(mut self, column: ColumnDefinition) -> Self {
		self.column_definitions.push(column);
		self
	}

	/// Column names for SELECT, INSERT, views and statistics.
	pub fn columns<I, S>(mut self, columns: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.columns.extend(columns.into_iter().map(Into::into));
		self
	}

	/// Select text for CREATE TABLE AS SELECT, INSERT ... SELECT, views and
	/// the MERGE source.
	pub fn select_query(mut self, query: impl Into<String>) -> Self {
		self.select_query = Some(query.into());
		self
	}

	pub fn source_table(mut self, table: impl Into<String>) -> Self {
		self.source_table = Some(table.into());
		self
	}

	pub fn location(mut self, location: impl Into<String>) -> Self {
		self.location = Some(location.into());
		self
	}

	pub fn file_format(mut self, format: FileFormat) -> Self {
		self.file_format = Some(format);
		self
	}

	pub fn partition(mut self, column: impl Into<String>) -> Self {
		self.partitions.push(column.into());
		self
	}

	pub fn distribution(mut self, distribution: impl Into<String>) -> Self {
		self.distribution = Some(distribution.into());
		self
	}

	pub fn property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.properties.insert(key.into(), value.into());
		self
	}

	pub fn recreate(mut self, recreate: bool) -> Self {
		self.recreate = Some(recreate);
		self
	}

	pub fn if_exists(mut self, if_exists: bool) -> Self {
		self.if_exists = Some(if_exists);
		self
	}

	pub fn if_not_exists(mut self, if_not_exists: bool) -> Self {
		self.if_not_exists = Some(if_not_exists);
		self
	}

	/// DROP TABLE / DROP SCHEMA.
	pub fn cascade(mut self, cascade: bool) -> Self {
		self.cascade = Some(cascade);
		self
	}

	pub fn restrict(mut self, restrict: bool) -> Self {
		self.restrict = Some(restrict);
		self
	}

	/// Schema owner for CREATE SCHEMA.
	pub fn authorization(mut self, owner: impl Into<String>) -> Self {
		self.authorization = Some(owner.into());
		self
	}

	pub fn distinct(mut self, distinct: bool) -> Self {
		self.distinct = distinct;
		self
	}

	pub fn join(mut self, join: impl Into<String>) -> Self {
		self.join_clause = Some(join.into());
		self
	}

	pub fn where_clause(mut self, condition: impl Into<String>) -> Self {
		self.where_clause = Some(condition.into());
		self
	}

	pub fn group_by(mut self, column: impl Into<String>) -> Self {
		self.group_by.push(column.into());
		self
	}

	pub fn having(mut self, condition: impl Into<String>) -> Self {
		self.having = Some(condition.into());
		self
	}

	pub fn order_by(mut self, expression: impl Into<String>) -> Self {
		self.order_by.push(expression.into());
		self
	}

	pub fn limit(mut self, limit: u64) -> Self {
		self.limit = Some(limit);
		self
	}

	pub fn offset(mut self, offset: u64) -> Self {
		self.offset = Some(offset);
		self
	}

	/// `column = value` assignment for UPDATE.
	pub fn set(mut self, column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
		self.set_columns.insert(column.into(), value.into());
		self
	}

	/// `FROM` clause of an UPDATE.
	pub fn from_clause(mut self, from: impl Into<String>) -> Self {
		self.from_clause = Some(from.into());
		self
	}

	/// One literal row for INSERT ... VALUES.
	pub fn value_row<I, K, V>(mut self, row: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<SqlValue>,
	{
		self.value_rows
			.push(row.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
		self
	}

	pub fn insert_mode(mut self, mode: InsertMode) -> Self {
		self.insert_mode = Some(mode);
		self
	}

	pub fn merge_condition(mut self, condition: impl Into<String>) -> Self {
		self.merge_condition = Some(condition.into());
		self
	}

	pub fn merge_actions(mut self, actions: MergeActions) -> Self {
		self.merge_actions = actions;
		self
	}

	pub fn or_replace(mut self, or_replace: bool) -> Self {
		self.or_replace = Some(or_replace);
		self
	}

	pub fn schemabinding(mut self, schemabinding: bool) -> Self {
		self.schemabinding = Some(schemabinding);
		self
	}

	pub fn materialized(mut self, materialized: bool) -> Self {
		self.materialized = Some(materialized);
		self
	}

	pub fn sql(mut self, sql: impl Into<String>) -> Self {
		self.sql = Some(sql.into());
		self
	}

	pub fn returns_results(mut self, returns_results: bool) -> Self {
		self.returns_results = Some(returns_results);
		self
	}

	/// Only valid together with `returns_results(true)`.
	pub fn result_format(mut self, format: ResultFormat) -> Self {
		self.result_format = Some(format);
		self
	}

	pub fn source_path(mut self, path: impl Into<String>) -> Self {
		self.source_path = Some(path.into());
		self
	}

	pub fn option(mut self, key: impl Into<String>, value: impl Into<SqlValue>) -> Self {
		self.options.insert(key.into(), value.into());
		self
	}

	/// Credential clause body for COPY INTO. Trusted SQL.
	pub fn credential(mut self, credential: impl Into<String>) -> Self {
		self.credential = Some(credential.into());
		self
	}

	/// Sampled statistics. Full scans are the default, so this needs
	/// `fullscan(false)` as well.
	pub fn sample_percent(mut self, percent: f64) -> Self {
		self.sample_percent = Some(percent);
		self
	}

	pub fn fullscan(mut self, fullscan: bool) -> Self {
		self.fullscan = Some(fullscan);
		self
	}

	pub fn stats_name(mut self, name: impl Into<String>) -> Self {
		self.stats_name = Some(name.into());
		self
	}

	pub fn auto_discover(mut self, auto_discover: bool) -> Self {
		self.auto_discover = Some(auto_discover);
		self
	}

	/// Builds without a stats column provider.
	pub fn build(self) -> Result<Operation, BuildError> {
		self.build_with_provider(None)
	}

	/// Builds, resolving CREATE STATISTICS columns through `provider` when needed.
	pub fn build_with_provider(
		self,
		provider: Option<&dyn StatsColumnProvider>,
	) -> Result<Operation, BuildError> {
		let operation = self.query_type;
		self.assemble(provider).map_err(|err| match err {
			Assembly::Unsupported => BuildError::UnsupportedType(operation),
			Assembly::Invalid(source) => BuildError::Invalid { operation, source },
		})
	}

	fn target(&self) -> Result<ObjectTarget, ValidationError> {
		let mut target = ObjectTarget::new(&self.schema_name, &self.object_name)?;
		if let Some(engine) = self.engine_hint {
			target = target.with_engine_hint(engine);
		}
		if let Some(context) = &self.logging_context {
			target = target.with_logging_context(context);
		}
		if let Some(metadata) = &self.metadata {
			target = target.with_metadata(Arc::clone(metadata));
		}
		Ok(target)
	}

	fn assemble(self, provider: Option<&dyn StatsColumnProvider>) -> Result<Operation, Assembly> {
		let target = self.target()?;

		let operation = match self.query_type {
			QueryType::CreateTable => {
				let definition = TableDefinition {
					columns: self.column_definitions,
					select_query: self.select_query,
					source_table: self.source_table,
					location: self.location,
				};
				let mut table = CreateTable::new(target, definition)?
					.with_file_format(self.file_format.unwrap_or_default())
					.with_recreate(self.recreate.unwrap_or(true));
				if !self.partitions.is_empty() {
					table = table.with_partitions(self.partitions)?;
				}
				if let Some(distribution) = self.distribution {
					table = table.with_distribution(distribution);
				}
				for (key, value) in self.properties {
					table = table.with_property(key, value);
				}
				table.into()
			}
			QueryType::DropTable => DropTable::new(target)
				.with_if_exists(self.if_exists.unwrap_or(true))
				.with_cascade(self.cascade.unwrap_or(false))
				.into(),
			QueryType::CreateSchema => {
				let mut schema =
					CreateSchema::new(target).with_if_not_exists(self.if_not_exists.unwrap_or(true));
				if let Some(owner) = self.authorization {
					schema = schema.with_authorization(owner)?;
				}
				schema.into()
			}
			QueryType::DropSchema => DropSchema::new(target)
				.with_if_exists(self.if_exists.unwrap_or(true))
				.with_cascade(self.cascade.unwrap_or(false))?
				.with_restrict(self.restrict.unwrap_or(false))?
				.into(),
			QueryType::Select => {
				let mut select = Select::new(target)
					.with_columns(self.columns)?
					.with_order_by(self.order_by);
				if self.distinct {
					select = select.distinct();
				}
				if let Some(join) = self.join_clause {
					select = select.with_join(join);
				}
				if let Some(condition) = self.where_clause {
					select = select.with_where(condition);
				}
				if !self.group_by.is_empty() {
					select = select.with_group_by(self.group_by)?;
				}
				if let Some(having) = self.having {
					select = select.with_having(having)?;
				}
				if let Some(limit) = self.limit {
					select = select.with_limit(limit)?;
				}
				if let Some(offset) = self.offset {
					select = select.with_offset(offset);
				}
				select.into()
			}
			QueryType::Insert => {
				let source = match (self.select_query, self.value_rows.is_empty()) {
					(Some(query), true) => InsertSource::Query(query),
					(None, false) => InsertSource::Values(self.value_rows),
					(Some(_), false) | (None, true) => {
						return Err(ValidationError::Incomplete {
							operation: QueryType::Insert,
							message: "Insert requires exactly one data source: source_query or values"
								.to_string(),
						}
						.into());
					}
				};
				let mut insert = Insert::new(target, source)?
					.with_mode(self.insert_mode.unwrap_or_default());
				if !self.columns.is_empty() {
					insert = insert.with_columns(self.columns)?;
				}
				insert.into()
			}
			QueryType::Update => {
				let mut update = Update::new(target, self.set_columns)?;
				if let Some(from) = self.from_clause {
					update = update.with_from(from);
				}
				if let Some(condition) = self.where_clause {
					update = update.with_where(condition);
				}
				update.into()
			}
			QueryType::Delete => {
				let mut delete = Delete::new(target);
				if let Some(condition) = self.where_clause {
					delete = delete.with_where(condition);
				}
				delete.into()
			}
			QueryType::Merge => Merge::new(
				target,
				self.select_query.unwrap_or_default(),
				self.merge_condition.unwrap_or_default(),
				self.merge_actions,
			)?
			.into(),
			QueryType::CreateOrAlterView => {
				let mut view = CreateOrAlterView::new(target, self.select_query.unwrap_or_default())?
					.with_or_replace(self.or_replace.unwrap_or(true))
					.with_schemabinding(self.schemabinding.unwrap_or(false))
					.with_materialized(self.materialized.unwrap_or(false));
				if !self.columns.is_empty() {
					view = view.with_columns(self.columns)?;
				}
				view.into()
			}
			QueryType::DropView => DropView::new(target)
				.with_if_exists(self.if_exists.unwrap_or(true))
				.into(),
			QueryType::CreateStatistics => {
				let mut spec = CreateStatistics::builder(target);
				if !self.columns.is_empty() {
					spec = spec.with_columns(self.columns)?;
				}
				if let Some(fullscan) = self.fullscan {
					spec = spec.with_fullscan(fullscan)?;
				}
				if let Some(percent) = self.sample_percent {
					spec = spec.with_sample_percent(percent)?;
				}
				if let Some(name) = self.stats_name {
					spec = spec.with_stats_name(name)?;
				}
				spec.with_auto_discover(self.auto_discover.unwrap_or(true))
					.resolve(provider)?
					.into()
			}
			QueryType::Copy => {
				let mut copy = Copy::new(target, self.source_path.unwrap_or_default())?
					.with_file_format(self.file_format.unwrap_or_default());
				for (key, value) in self.options {
					copy = copy.with_option(key, value)?;
				}
				if let Some(credential) = self.credential {
					copy = copy.with_credential(credential);
				}
				copy.into()
			}
			QueryType::ExecuteSql => {
				let mut exec = ExecuteSql::new(target, self.sql.unwrap_or_default())?;
				if let Some(returns_results) = self.returns_results {
					exec = exec.with_returns_results(returns_results)?;
				}
				if let Some(format) = self.result_format {
					exec = exec.with_result_format(format)?;
				}
				if let Some(limit) = self.limit {
					exec = exec.with_limit(limit)?;
				}
				exec.into()
			}
			QueryType::Truncate
			| QueryType::Alter
			| QueryType::DropStatistics
			| QueryType::Unknown => return Err(Assembly::Unsupported),
		};

		Ok(operation)
	}
}

enum Assembly {
	Unsupported,
	Invalid(ValidationError),
}

impl From<ValidationError> for Assembly {
	fn from(err: ValidationError) -> Self {
		Assembly::Invalid(err)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::stats::DiscoveryError;
	use rstest::rstest;

	#[rstest]
	fn test_builds_create_table_as_select() {
		let operation = OperationBuilder::new(QueryType::CreateTable, "silver", "customers")
			.select_query("SELECT * FROM bronze.raw_customers")
			.partition("load_date")
			.build()
			.unwrap();

		let Operation::CreateTable(table) = operation else {
			panic!("expected CreateTable");
		};
		assert_eq!(table.location(), Some("silver/customers"));
		assert_eq!(table.partitions(), ["load_date"]);
	}

	#[rstest]
	#[case(QueryType::Truncate)]
	#[case(QueryType::Alter)]
	#[case(QueryType::DropStatistics)]
	#[case(QueryType::Unknown)]
	fn test_query_types_without_variant_are_unsupported(#[case] query_type: QueryType) {
		let err = OperationBuilder::new(query_type, "silver", "customers")
			.build()
			.unwrap_err();

		assert_eq!(err, BuildError::UnsupportedType(query_type));
	}

	#[rstest]
	fn test_validation_failures_are_wrapped() {
		let err = OperationBuilder::new(QueryType::CreateTable, "silver", "customers")
			.build()
			.unwrap_err();

		assert_eq!(
			err.to_string(),
			"Cannot create operation CREATE_TABLE: CreateTable requires at least one definition method: columns, select_query, source_table, or location"
		);
	}

	#[rstest]
	fn test_invalid_target_is_wrapped() {
		let err = OperationBuilder::new(QueryType::DropTable, "silver", "customers;--")
			.build()
			.unwrap_err();

		assert!(matches!(
			err,
			BuildError::Invalid {
				operation: QueryType::DropTable,
				source: ValidationError::Identifier { field: "object_name", .. },
			}
		));
	}

	#[rstest]
	fn test_insert_with_both_sources_fails() {
		let err = OperationBuilder::new(QueryType::Insert, "silver", "orders")
			.select_query("SELECT 1 AS id")
			.value_row([("id", 1)])
			.build()
			.unwrap_err();

		assert!(err.to_string().ends_with("Insert requires exactly one data source: source_query or values"));
	}

	#[rstest]
	fn test_statistics_use_provider() {
		let provider = |table: &str, layer: &str| -> Result<Vec<String>, DiscoveryError> {
			assert_eq!((table, layer), ("orders", "silver"));
			Ok(vec!["order_id".to_string()])
		};

		let operation = OperationBuilder::new(QueryType::CreateStatistics, "silver", "orders")
			.fullscan(false)
			.sample_percent(25.0)
			.build_with_provider(Some(&provider))
			.unwrap();

		let Operation::CreateStatistics(stats) = operation else {
			panic!("expected CreateStatistics");
		};
		assert_eq!(stats.columns(), ["order_id"]);
		assert_eq!(stats.sample_percent(), Some(25.0));
		assert!(!stats.with_fullscan());
	}

	#[rstest]
	fn test_statistics_without_columns_fail_without_provider() {
		let err = OperationBuilder::new(QueryType::CreateStatistics, "silver", "orders")
			.build()
			.unwrap_err();

		assert!(matches!(
			err,
			BuildError::Invalid {
				source: ValidationError::NoStatisticsColumns { .. },
				..
			}
		));
	}

	#[rstest]
	fn test_execute_sql_with_result_format() {
		let operation = OperationBuilder::new(QueryType::ExecuteSql, "gold", "report")
			.sql("SELECT COUNT(*) FROM gold.report")
			.returns_results(true)
			.result_format(ResultFormat::Scalar)
			.limit(1)
			.build()
			.unwrap();

		let Operation::ExecuteSql(exec) = operation else {
			panic!("expected ExecuteSql");
		};
		assert!(exec.returns_results());
		assert_eq!(exec.limit(), Some(1));
	}

	#[rstest]
	fn test_result_format_without_returns_results_fails_like_direct_construction() {
		// Arrange
		let target = ObjectTarget::new("gold", "report").unwrap();
		let direct = ExecuteSql::new(target, "SELECT 1")
			.unwrap()
			.with_result_format(ResultFormat::Scalar)
			.unwrap_err();

		// Act
		let err = OperationBuilder::new(QueryType::ExecuteSql, "gold", "report")
			.sql("SELECT 1")
			.result_format(ResultFormat::Scalar)
			.build()
			.unwrap_err();

		// Assert
		assert_eq!(
			err,
			BuildError::Invalid {
				operation: QueryType::ExecuteSql,
				source: direct,
			}
		);
	}

	#[rstest]
	fn test_sample_percent_without_disabling_fullscan_fails() {
		let err = OperationBuilder::new(QueryType::CreateStatistics, "silver", "orders")
			.columns(["order_id"])
			.sample_percent(10.0)
			.build()
			.unwrap_err();

		assert!(matches!(
			err,
			BuildError::Invalid {
				source: ValidationError::Conflict { .. },
				..
			}
		));
	}

	#[rstest]
	fn test_select_clauses_reach_the_operation() {
		// Act
		let operation = OperationBuilder::new(QueryType::Select, "silver", "orders")
			.columns(["customer_id"])
			.distinct(true)
			.join("JOIN silver.customers c ON c.id = orders.customer_id")
			.group_by("customer_id")
			.having("COUNT(*) > 1")
			.order_by("customer_id")
			.offset(20)
			.limit(10)
			.build()
			.unwrap();

		// Assert
		let Operation::Select(select) = operation else {
			panic!("expected Select");
		};
		assert!(select.is_distinct());
		assert_eq!(select.join_clause(), Some("JOIN silver.customers c ON c.id = orders.customer_id"));
		assert_eq!(select.group_by(), ["customer_id"]);
		assert_eq!(select.having(), Some("COUNT(*) > 1"));
		assert_eq!((select.limit(), select.offset()), (Some(10), Some(20)));
	}

	#[rstest]
	fn test_having_without_group_by_fails() {
		let err = OperationBuilder::new(QueryType::Select, "silver", "orders")
			.having("COUNT(*) > 1")
			.build()
			.unwrap_err();

		assert!(err.to_string().ends_with("HAVING clause requires GROUP BY"));
	}

	#[rstest]
	fn test_ddl_flags_reach_the_operation() {
		let table = OperationBuilder::new(QueryType::CreateTable, "gold", "sales")
			.select_query("SELECT * FROM silver.sales")
			.distribution("HASH(customer_id)")
			.build()
			.unwrap();
		let drop_table = OperationBuilder::new(QueryType::DropTable, "gold", "sales")
			.cascade(true)
			.build()
			.unwrap();
		let schema = OperationBuilder::new(QueryType::CreateSchema, "gold", "gold")
			.if_not_exists(false)
			.authorization("etl_owner")
			.build()
			.unwrap();
		let view = OperationBuilder::new(QueryType::CreateOrAlterView, "gold", "v_sales")
			.select_query("SELECT 1 AS x")
			.or_replace(false)
			.schemabinding(true)
			.materialized(true)
			.build()
			.unwrap();

		let Operation::CreateTable(table) = table else { panic!("expected CreateTable") };
		let Operation::DropTable(drop_table) = drop_table else { panic!("expected DropTable") };
		let Operation::CreateSchema(schema) = schema else { panic!("expected CreateSchema") };
		let Operation::CreateOrAlterView(view) = view else { panic!("expected view") };
		assert_eq!(table.distribution(), Some("HASH(customer_id)"));
		assert!(drop_table.cascade());
		assert!(!schema.if_not_exists());
		assert_eq!(schema.authorization(), Some("etl_owner"));
		assert!(!view.or_replace() && view.schemabinding() && view.materialized());
	}

	#[rstest]
	fn test_drop_schema_cascade_and_restrict_conflict() {
		let err = OperationBuilder::new(QueryType::DropSchema, "staging", "staging")
			.cascade(true)
			.restrict(true)
			.build()
			.unwrap_err();

		assert!(err.to_string().ends_with("Cannot specify both cascade and restrict"));
	}

	#[rstest]
	fn test_update_from_and_copy_credential() {
		let update = OperationBuilder::new(QueryType::Update, "silver", "orders")
			.set("status", "closed")
			.from_clause("bronze.closures c")
			.build()
			.unwrap();
		let copy = OperationBuilder::new(QueryType::Copy, "bronze", "orders")
			.source_path("https://acct.blob.core.windows.net/raw/orders/")
			.credential("IDENTITY = 'Managed Identity'")
			.build()
			.unwrap();

		let Operation::Update(update) = update else { panic!("expected Update") };
		let Operation::Copy(copy) = copy else { panic!("expected Copy") };
		assert_eq!(update.from_clause(), Some("bronze.closures c"));
		assert_eq!(copy.credential(), Some("IDENTITY = 'Managed Identity'"));
	}
}
