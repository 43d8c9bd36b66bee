//! Fabric warehouses.
//!
//! Tables are Delta tables, so the full DML surface (including `MERGE` and
//! `COPY INTO`) is available alongside Delta maintenance statements.

use super::base::{BuilderBase, DenyPattern, deny_list};
use super::{BuildResult, QueryBuilder};
use crate::operations::{
	ColumnDefinition, Copy, CreateOrAlterView, CreateSchema, CreateStatistics, CreateTable, Delete,
	DropSchema, DropTable, ExecuteSql, Insert, InsertSource, Merge, SqlValue, Update,
};
use indexmap::IndexMap;
use medalflow_conf::ComputeSettings;
use medalflow_core::{
	ComputeType, FileFormat, IdentifierError, InsertMode, QueryBuildError, QueryType,
};
use std::sync::LazyLock;

static DENY_LIST: LazyLock<Vec<DenyPattern>> = LazyLock::new(|| {
	deny_list(&[
		("xp_cmdshell", "xp_cmdshell"),
		("sp_configure", "sp_configure"),
		("sp_addextendedproc", "sp_addextendedproc"),
		("sp_execute_external_script", "sp_execute_external_script"),
		("OPENROWSET BULK", r"OPENROWSET\s*\(.*BULK"),
		("OPENDATASOURCE", "OPENDATASOURCE"),
	])
});

/// T-SQL for Fabric warehouse Delta tables.
#[derive(Debug, Clone)]
pub struct FabricWarehouseBuilder {
	base: BuilderBase,
}

impl FabricWarehouseBuilder {
	pub fn new(settings: ComputeSettings) -> Self {
		Self {
			base: BuilderBase::new(settings),
		}
	}

	/// Column definitions with constraints. Primary keys and unique
	/// constraints are declared `NOT ENFORCED`; check constraints are omitted.
	fn column_definitions(&self, columns: &[ColumnDefinition]) -> Result<String, IdentifierError> {
		let rendered = columns
			.iter()
			.map(|column| {
				let mut definition = format!(
					"{} {}",
					self.base.quote_identifier(column.name(), "column")?,
					column.data_type()
				);
				if let Some(collation) = column.collation() {
					definition.push_str(&format!(" COLLATE {collation}"));
				}
				if let Some(expression) = column.computed_expression() {
					definition.push_str(&format!(" GENERATED ALWAYS AS ({expression})"));
				}
				if !column.nullable() {
					definition.push_str(" NOT NULL");
				}
				if let Some(default) = column.default_value() {
					definition.push_str(&format!(" DEFAULT {default}"));
				}
				if column.is_primary_key() {
					definition.push_str(" PRIMARY KEY NONCLUSTERED NOT ENFORCED");
				} else if column.is_unique() {
					definition.push_str(" UNIQUE NOT ENFORCED");
				}
				Ok(definition)
			})
			.collect::<Result<Vec<_>, IdentifierError>>()?;
		Ok(rendered.join(",\n    "))
	}

	fn table_properties(&self, properties: &IndexMap<String, String>) -> String {
		properties
			.iter()
			.map(|(key, value)| format!("{} = {}", self.base.quote_string(key), self.base.quote_string(value)))
			.collect::<Vec<_>>()
			.join(", ")
	}

	fn values_list(
		&self,
		columns: &[&str],
		rows: &[IndexMap<String, SqlValue>],
	) -> String {
		rows.iter()
			.map(|row| {
				let values = columns
					.iter()
					.map(|column| row.get(*column).map_or_else(|| SqlValue::Null.to_sql(), SqlValue::to_sql))
					.collect::<Vec<_>>();
				format!("({})", values.join(", "))
			})
			.collect::<Vec<_>>()
			.join(",\n")
	}

	/// `OPTIMIZE [schema].[object]`, Z-ordered by `zorder_by` when non-empty.
	///
	/// # Examples
	///
	/// ```
	/// use medalflow_conf::ComputeSettings;
	/// use medalflow_db::FabricWarehouseBuilder;
	///
	/// let builder = FabricWarehouseBuilder::new(ComputeSettings::fabric());
	/// assert_eq!(
	///     builder.optimize_table("silver", "orders", &["customer_id"]).unwrap(),
	///     "OPTIMIZE [silver].[orders] ZORDER BY ([customer_id])"
	/// );
	/// ```
	pub fn optimize_table<S: AsRef<str>>(
		&self,
		schema: &str,
		object_name: &str,
		zorder_by: &[S],
	) -> Result<String, IdentifierError> {
		let mut sql = format!("OPTIMIZE {}", self.base.qualified_name(schema, object_name)?);
		if !zorder_by.is_empty() {
			sql.push_str(&format!(" ZORDER BY ({})", self.base.format_column_list(zorder_by)?));
		}
		Ok(sql)
	}

	/// `[lakehouse].[schema].[object]` for reading a lakehouse table from the
	/// warehouse, or the two-part name when no lakehouse is configured.
	/// Lakehouse tables never receive the table prefix.
	pub fn lakehouse_object_name(
		&self,
		schema: &str,
		object_name: &str,
	) -> Result<String, IdentifierError> {
		let name = format!(
			"{}.{}",
			self.base.quote_identifier(schema, "schema")?,
			self.base.quote_identifier(object_name, "object")?
		);
		self.in_database(self.base.settings().fabric.lakehouse_name.as_deref(), name)
	}

	/// `[warehouse].[schema].[object]`, prefix applied, for cross-database
	/// references to this warehouse.
	pub fn warehouse_object_name(
		&self,
		schema: &str,
		object_name: &str,
	) -> Result<String, IdentifierError> {
		let name = self.base.qualified_name(schema, object_name)?;
		self.in_database(self.base.settings().fabric.warehouse_name.as_deref(), name)
	}

	fn in_database(&self, database: Option<&str>, name: String) -> Result<String, IdentifierError> {
		match database.filter(|database| !database.is_empty()) {
			Some(database) => Ok(format!("{}.{name}", self.base.quote_identifier(database, "database")?)),
			None => Ok(name),
		}
	}

	/// `VACUUM` with the given retention, or the configured default.
	pub fn vacuum_table(
		&self,
		schema: &str,
		object_name: &str,
		retention_hours: Option<u32>,
	) -> Result<String, IdentifierError> {
		let hours = retention_hours.unwrap_or(self.base.settings().fabric.default_retention_hours);
		Ok(format!(
			"VACUUM {} RETAIN {hours} HOURS",
			self.base.qualified_name(schema, object_name)?
		))
	}
}

impl QueryBuilder for FabricWarehouseBuilder {
	fn platform(&self) -> ComputeType {
		ComputeType::Fabric
	}

	fn base(&self) -> &BuilderBase {
		&self.base
	}

	fn build_create_table(&self, op: &CreateTable) -> BuildResult {
		let name = self.base.target_name(op.target())?;
		let mut sql = String::new();

		if op.recreate() {
			sql.push_str(&format!("DROP TABLE IF EXISTS {name};\nCREATE TABLE {name}"));
		} else {
			sql.push_str(&format!("CREATE TABLE IF NOT EXISTS {name}"));
		}
		if !op.columns().is_empty() {
			sql.push_str(&format!(" (\n    {}\n)", self.column_definitions(op.columns())?));
		}
		sql.push_str("\nUSING DELTA");

		if !op.partitions().is_empty() {
			sql.push_str(&format!(
				"\nPARTITIONED BY ({})",
				self.base.format_column_list(op.partitions())?
			));
		}
		let from_query = op.select_query().is_some() || op.source_table().is_some();
		if !from_query && let Some(location) = op.location() {
			sql.push_str(&format!("\nLOCATION {}", self.base.quote_string(location)));
		}
		if !op.properties().is_empty() {
			sql.push_str(&format!("\nTBLPROPERTIES ({})", self.table_properties(op.properties())));
		}

		if let Some(select) = op.select_query() {
			sql.push_str(&format!("\nAS {select}"));
		} else if let Some(source) = op.source_table() {
			sql.push_str(&format!("\nAS SELECT * FROM {}", self.base.qualify_dotted(source)?));
		}
		Ok(sql)
	}

	fn build_drop_table(&self, op: &DropTable) -> BuildResult {
		let name = self.base.target_name(op.target())?;
		Ok(if op.if_exists() {
			format!("DROP TABLE IF EXISTS {name}")
		} else {
			format!("DROP TABLE {name}")
		})
	}

	fn build_create_schema(&self, op: &CreateSchema) -> BuildResult {
		let mut sql = String::from("CREATE SCHEMA ");
		if op.if_not_exists() {
			sql.push_str("IF NOT EXISTS ");
		}
		sql.push_str(&self.base.quote_identifier(op.schema_name(), "schema")?);
		if let Some(owner) = op.authorization() {
			sql.push_str(&format!(" AUTHORIZATION {}", self.base.quote_identifier(owner, "owner")?));
		}
		Ok(sql)
	}

	fn build_drop_schema(&self, op: &DropSchema) -> BuildResult {
		let mut sql = String::from("DROP SCHEMA ");
		if op.if_exists() {
			sql.push_str("IF EXISTS ");
		}
		sql.push_str(&self.base.quote_identifier(op.schema_name(), "schema")?);
		if op.cascade() {
			sql.push_str(" CASCADE");
		} else if op.restrict() {
			sql.push_str(" RESTRICT");
		}
		Ok(sql)
	}

	fn build_insert(&self, op: &Insert) -> BuildResult {
		let keyword = match op.mode() {
			InsertMode::Append => "INSERT INTO",
			InsertMode::Overwrite => "INSERT OVERWRITE",
		};
		let columns = op.effective_columns();
		let mut sql = format!("{keyword} {}", self.base.target_name(op.target())?);
		if !columns.is_empty() {
			sql.push_str(&format!(" ({})", self.base.format_column_list(&columns)?));
		}

		match op.source() {
			InsertSource::Query(query) => sql.push_str(&format!("\n{query}")),
			InsertSource::Values(rows) => {
				sql.push_str(&format!("\nVALUES {}", self.values_list(&columns, rows)));
			}
		}
		Ok(sql)
	}

	fn build_update(&self, op: &Update) -> BuildResult {
		let mut sql = format!(
			"UPDATE {}\nSET {}",
			self.base.target_name(op.target())?,
			self.base.format_assignments(op.set_columns(), "")?
		);
		if let Some(from) = op.from_clause() {
			sql.push_str(&format!("\nFROM {from}"));
		}
		if let Some(condition) = op.where_clause() {
			sql.push_str(&format!("\nWHERE {condition}"));
		}
		Ok(sql)
	}

	fn build_delete(&self, op: &Delete) -> BuildResult {
		let mut sql = format!("DELETE FROM {}", self.base.target_name(op.target())?);
		if let Some(condition) = op.where_clause() {
			sql.push_str(&format!("\nWHERE {condition}"));
		}
		Ok(sql)
	}

	fn build_merge(&self, op: &Merge) -> BuildResult {
		let actions = op.actions();
		let mut sql = format!(
			"MERGE INTO {} AS target\nUSING ({}) AS source\nON {}",
			self.base.target_name(op.target())?,
			op.source_query(),
			op.merge_condition()
		);

		// the conditional WHEN MATCHED clause must come first
		if let Some(condition) = &actions.when_matched_delete {
			sql.push_str(&format!("\nWHEN MATCHED AND {condition} THEN DELETE"));
		}
		if let Some(assignments) = &actions.when_matched_update {
			sql.push_str(&format!(
				"\nWHEN MATCHED THEN UPDATE SET {}",
				self.base.format_assignments(assignments, "target.")?
			));
		}
		if let Some(values) = &actions.when_not_matched_insert {
			let columns = values.keys().collect::<Vec<_>>();
			let rendered = values.values().map(SqlValue::to_sql).collect::<Vec<_>>();
			sql.push_str(&format!(
				"\nWHEN NOT MATCHED THEN INSERT ({}) VALUES ({})",
				self.base.format_column_list(&columns)?,
				rendered.join(", ")
			));
		}
		if let Some(assignments) = &actions.when_not_matched_by_source_update {
			sql.push_str(&format!(
				"\nWHEN NOT MATCHED BY SOURCE THEN UPDATE SET {}",
				self.base.format_assignments(assignments, "target.")?
			));
		} else if actions.when_not_matched_by_source_delete {
			sql.push_str("\nWHEN NOT MATCHED BY SOURCE THEN DELETE");
		}

		sql.push(';');
		Ok(sql)
	}

	fn build_copy(&self, op: &Copy) -> BuildResult {
		let file_type = match op.file_format() {
			FileFormat::Parquet => "PARQUET",
			FileFormat::Csv => "CSV",
			FileFormat::Delta | FileFormat::Json => {
				return Err(QueryBuildError::Unrenderable {
					platform: ComputeType::Fabric,
					operation: QueryType::Copy,
					object: op.target().full_object_name(),
					reason: "COPY INTO only loads PARQUET and CSV files",
				});
			}
		};

		let mut options = vec![format!("FILE_TYPE = '{file_type}'")];
		options.extend(op.options().iter().map(|(key, value)| format!("{} = {value}", key.to_uppercase())));
		if let Some(credential) = op.credential() {
			options.push(format!("CREDENTIAL = ({credential})"));
		}

		Ok(format!(
			"COPY INTO {}\nFROM {}\nWITH (\n    {}\n)",
			self.base.target_name(op.target())?,
			self.base.quote_string(op.source_path()),
			options.join(",\n    ")
		))
	}

	/// `schemabinding` has no Fabric equivalent and is ignored.
	fn build_create_or_alter_view(&self, op: &CreateOrAlterView) -> BuildResult {
		if op.materialized() {
			return Err(QueryBuildError::Unrenderable {
				platform: ComputeType::Fabric,
				operation: QueryType::CreateOrAlterView,
				object: op.target().full_object_name(),
				reason: "materialized views are not available in Fabric warehouses",
			});
		}

		let create = if op.or_replace() { "CREATE OR REPLACE VIEW" } else { "CREATE VIEW" };
		let mut sql = format!("{create} {}", self.base.target_name(op.target())?);
		if !op.columns().is_empty() {
			sql.push_str(&format!(" ({})", self.base.format_column_list(op.columns())?));
		}
		sql.push_str(&format!("\nAS {}", op.select_query()));
		Ok(sql)
	}

	fn build_create_statistics(&self, op: &CreateStatistics) -> BuildResult {
		let mut sql = format!(
			"CREATE STATISTICS {}\nON {} ({})",
			self.base.stats_name(op)?,
			self.base.target_name(op.target())?,
			self.base.format_column_list(op.columns())?
		);
		if op.with_fullscan() {
			sql.push_str("\nWITH FULLSCAN");
		} else if let Some(percent) = op.sample_percent() {
			sql.push_str(&format!("\nWITH SAMPLE {percent} PERCENT"));
		}
		Ok(sql)
	}

	fn build_execute_sql(&self, op: &ExecuteSql) -> BuildResult {
		self.base.render_execute_sql(op, &DENY_LIST)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::operations::{MergeActions, ObjectTarget, Operation, Select, TableDefinition};
	use rstest::{fixture, rstest};

	#[fixture]
	fn builder() -> FabricWarehouseBuilder {
		FabricWarehouseBuilder::new(ComputeSettings::fabric())
	}

	fn target() -> ObjectTarget {
		ObjectTarget::new("silver", "orders").unwrap()
	}

	fn build(builder: &FabricWarehouseBuilder, operation: impl Into<Operation>) -> BuildResult {
		builder.build_query(&operation.into(), None)
	}

	fn row<const N: usize>(pairs: [(&str, SqlValue); N]) -> IndexMap<String, SqlValue> {
		pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
	}

	#[rstest]
	fn test_create_table_with_columns(builder: FabricWarehouseBuilder) {
		// Arrange
		let table = CreateTable::new(
			target(),
			TableDefinition::columns([
				ColumnDefinition::new("order_id", "BIGINT").unwrap().not_null().primary_key(),
				ColumnDefinition::new("status", "VARCHAR(20)")
					.unwrap()
					.with_default_value("open")
					.unwrap(),
				ColumnDefinition::new("total", "DECIMAL(18, 2)")
					.unwrap()
					.with_computed_expression("price * quantity")
					.unwrap()
					.with_check_constraint("total >= 0"),
				ColumnDefinition::new("email", "VARCHAR(200)").unwrap().unique(),
			]),
		)
		.unwrap()
		.with_partitions(["order_date"])
		.unwrap()
		.with_property("delta.appendOnly", "false");

		// Act
		let sql = build(&builder, table).unwrap();

		// Assert
		assert_eq!(
			sql,
			"DROP TABLE IF EXISTS [silver].[orders];\nCREATE TABLE [silver].[orders] (\n    [order_id] BIGINT NOT NULL PRIMARY KEY NONCLUSTERED NOT ENFORCED,\n    [status] VARCHAR(20) DEFAULT 'open',\n    [total] DECIMAL(18, 2) GENERATED ALWAYS AS (price * quantity),\n    [email] VARCHAR(200) UNIQUE NOT ENFORCED\n)\nUSING DELTA\nPARTITIONED BY ([order_date])\nTBLPROPERTIES ('delta.appendOnly' = 'false')"
		);
	}

	#[rstest]
	fn test_ctas_omits_location(builder: FabricWarehouseBuilder) {
		let table = CreateTable::as_select(target(), "SELECT * FROM bronze.orders")
			.unwrap()
			.with_recreate(false);

		let sql = build(&builder, table).unwrap();

		assert_eq!(
			sql,
			"CREATE TABLE IF NOT EXISTS [silver].[orders]\nUSING DELTA\nAS SELECT * FROM bronze.orders"
		);
	}

	#[rstest]
	fn test_location_mode(builder: FabricWarehouseBuilder) {
		let table = CreateTable::new(target(), TableDefinition::location("Tables/orders"))
			.unwrap()
			.with_recreate(false);

		let sql = build(&builder, table).unwrap();

		assert!(sql.ends_with("USING DELTA\nLOCATION 'Tables/orders'"));
	}

	#[rstest]
	#[case::cascade(DropSchema::named("staging").unwrap().with_cascade(true).unwrap(), "DROP SCHEMA IF EXISTS [staging] CASCADE")]
	#[case::restrict(
		DropSchema::named("staging").unwrap().with_if_exists(false).with_restrict(true).unwrap(),
		"DROP SCHEMA [staging] RESTRICT"
	)]
	fn test_drop_schema(
		builder: FabricWarehouseBuilder,
		#[case] op: DropSchema,
		#[case] expected: &str,
	) {
		assert_eq!(build(&builder, op).unwrap(), expected);
	}

	#[rstest]
	fn test_create_schema_with_owner(builder: FabricWarehouseBuilder) {
		let op = CreateSchema::named("silver").unwrap().with_authorization("etl_owner").unwrap();

		assert_eq!(
			build(&builder, op).unwrap(),
			"CREATE SCHEMA IF NOT EXISTS [silver] AUTHORIZATION [etl_owner]"
		);
	}

	#[rstest]
	fn test_insert_values(builder: FabricWarehouseBuilder) {
		let insert = Insert::from_values(
			target(),
			vec![
				row([("id", SqlValue::Integer(1)), ("name", SqlValue::from("O'Hara"))]),
				row([("id", SqlValue::Integer(2)), ("name", SqlValue::Null)]),
			],
		)
		.unwrap();

		let sql = build(&builder, insert).unwrap();

		assert_eq!(
			sql,
			"INSERT INTO [silver].[orders] ([id], [name])\nVALUES (1, 'O''Hara'),\n(2, NULL)"
		);
	}

	#[rstest]
	fn test_insert_overwrite_from_query(builder: FabricWarehouseBuilder) {
		let insert = Insert::from_query(target(), "SELECT id, name FROM bronze.orders")
			.unwrap()
			.with_columns(["id", "name"])
			.unwrap()
			.with_mode(InsertMode::Overwrite);

		let sql = build(&builder, insert).unwrap();

		assert_eq!(
			sql,
			"INSERT OVERWRITE [silver].[orders] ([id], [name])\nSELECT id, name FROM bronze.orders"
		);
	}

	#[rstest]
	fn test_update_and_delete(builder: FabricWarehouseBuilder) {
		let update = Update::new(target(), row([("status", SqlValue::from("closed"))]))
			.unwrap()
			.with_from("bronze.closures c")
			.with_where("c.order_id = orders.order_id");
		let delete = Delete::new(target()).with_where("status = 'void'");

		assert_eq!(
			build(&builder, update).unwrap(),
			"UPDATE [silver].[orders]\nSET [status] = 'closed'\nFROM bronze.closures c\nWHERE c.order_id = orders.order_id"
		);
		assert_eq!(
			build(&builder, delete).unwrap(),
			"DELETE FROM [silver].[orders]\nWHERE status = 'void'"
		);
	}

	#[rstest]
	fn test_merge_renders_every_clause(builder: FabricWarehouseBuilder) {
		// Arrange
		let actions = MergeActions {
			when_matched_update: Some(row([("status", SqlValue::expr("source.status"))])),
			when_matched_delete: Some("source.is_deleted = 1".to_string()),
			when_not_matched_insert: Some(row([
				("order_id", SqlValue::expr("source.order_id")),
				("status", SqlValue::expr("source.status")),
			])),
			when_not_matched_by_source_delete: true,
			..MergeActions::default()
		};
		let merge = Merge::new(
			target(),
			"SELECT * FROM bronze.orders",
			"target.order_id = source.order_id",
			actions,
		)
		.unwrap();

		// Act
		let sql = build(&builder, merge).unwrap();

		// Assert
		assert_eq!(
			sql,
			"MERGE INTO [silver].[orders] AS target\nUSING (SELECT * FROM bronze.orders) AS source\nON target.order_id = source.order_id\nWHEN MATCHED AND source.is_deleted = 1 THEN DELETE\nWHEN MATCHED THEN UPDATE SET target.[status] = source.status\nWHEN NOT MATCHED THEN INSERT ([order_id], [status]) VALUES (source.order_id, source.status)\nWHEN NOT MATCHED BY SOURCE THEN DELETE;"
		);
	}

	#[rstest]
	fn test_merge_matched_delete_carries_its_condition(builder: FabricWarehouseBuilder) {
		// Arrange
		let actions = MergeActions {
			when_matched_delete: Some("source.op = 'D'".to_string()),
			..MergeActions::default()
		};
		let merge = Merge::new(target(), "SELECT * FROM bronze.orders", "target.id = source.id", actions)
			.unwrap();

		// Act
		let sql = build(&builder, merge).unwrap();

		// Assert
		assert!(sql.ends_with("ON target.id = source.id\nWHEN MATCHED AND source.op = 'D' THEN DELETE;"));
		assert!(!sql.contains("WHEN MATCHED THEN DELETE"));
	}

	#[rstest]
	fn test_non_finite_assignment_renders_null(builder: FabricWarehouseBuilder) {
		let update = Update::new(target(), row([("ratio", SqlValue::from(f64::NAN))])).unwrap();

		assert_eq!(
			build(&builder, update).unwrap(),
			"UPDATE [silver].[orders]\nSET [ratio] = NULL"
		);
	}

	#[rstest]
	fn test_copy_into(builder: FabricWarehouseBuilder) {
		let copy = Copy::new(target(), "https://acct.blob.core.windows.net/raw/orders/*.parquet")
			.unwrap()
			.with_option("max_errors", 10)
			.unwrap()
			.with_credential("IDENTITY = 'Managed Identity'");

		let sql = build(&builder, copy).unwrap();

		assert_eq!(
			sql,
			"COPY INTO [silver].[orders]\nFROM 'https://acct.blob.core.windows.net/raw/orders/*.parquet'\nWITH (\n    FILE_TYPE = 'PARQUET',\n    MAX_ERRORS = 10,\n    CREDENTIAL = (IDENTITY = 'Managed Identity')\n)"
		);
	}

	#[rstest]
	fn test_copy_rejects_json(builder: FabricWarehouseBuilder) {
		let copy = Copy::new(target(), "raw/orders/").unwrap().with_file_format(FileFormat::Json);

		let err = build(&builder, copy).unwrap_err();

		assert_eq!(err.code(), "QUERY_BUILD_002");
	}

	#[rstest]
	#[case(true, "CREATE OR REPLACE VIEW [gold].[v_orders] ([id])\nAS SELECT order_id FROM silver.orders")]
	#[case(false, "CREATE VIEW [gold].[v_orders] ([id])\nAS SELECT order_id FROM silver.orders")]
	fn test_view(
		builder: FabricWarehouseBuilder,
		#[case] or_replace: bool,
		#[case] expected: &str,
	) {
		let view = CreateOrAlterView::new(
			ObjectTarget::new("gold", "v_orders").unwrap(),
			"SELECT order_id FROM silver.orders",
		)
		.unwrap()
		.with_columns(["id"])
		.unwrap()
		.with_schemabinding(true)
		.with_or_replace(or_replace);

		assert_eq!(build(&builder, view).unwrap(), expected);
	}

	#[rstest]
	fn test_materialized_view_is_unrenderable(builder: FabricWarehouseBuilder) {
		let view = CreateOrAlterView::new(target(), "SELECT 1 AS x")
			.unwrap()
			.with_materialized(true);

		assert!(matches!(
			build(&builder, view),
			Err(QueryBuildError::Unrenderable { .. })
		));
	}

	#[rstest]
	fn test_statistics_with_named_object(builder: FabricWarehouseBuilder) {
		let stats = CreateStatistics::builder(target())
			.with_columns(["customer_id"])
			.unwrap()
			.with_stats_name("st_orders_customer")
			.unwrap()
			.resolve(None)
			.unwrap();

		assert_eq!(
			build(&builder, stats).unwrap(),
			"CREATE STATISTICS [st_orders_customer]\nON [silver].[orders] ([customer_id])\nWITH FULLSCAN"
		);
	}

	#[rstest]
	fn test_multi_column_statistics_fail_before_rendering(builder: FabricWarehouseBuilder) {
		let stats = CreateStatistics::builder(target())
			.with_columns(["a", "b"])
			.unwrap()
			.resolve(None)
			.unwrap();

		let err = build(&builder, stats).unwrap_err();

		assert_eq!(err.code(), "QUERY_BUILD_001");
	}

	#[rstest]
	fn test_select_uses_shared_rendering(builder: FabricWarehouseBuilder) {
		let select = Select::new(target()).with_limit(100).unwrap();

		assert_eq!(
			build(&builder, select).unwrap(),
			"SELECT TOP 100 * FROM [silver].[orders]"
		);
	}

	#[rstest]
	#[case("SELECT * FROM OPENROWSET(BULK 'https://x/y.parquet', FORMAT = 'PARQUET') AS r", "OPENROWSET BULK")]
	#[case("SELECT * FROM OPENDATASOURCE('SQLNCLI', 'Data Source=x').db.dbo.t", "OPENDATASOURCE")]
	#[case("exec sp_execute_external_script @language = N'Python'", "sp_execute_external_script")]
	fn test_execute_sql_deny_list(
		builder: FabricWarehouseBuilder,
		#[case] sql: &str,
		#[case] pattern: &'static str,
	) {
		let exec = ExecuteSql::new(target(), sql).unwrap();

		let err = build(&builder, exec).unwrap_err();

		assert_eq!(err, QueryBuildError::UnsafeSql { pattern });
	}

	#[rstest]
	fn test_cross_database_names() {
		// Arrange
		let mut settings = ComputeSettings::fabric().with_table_prefix("sap_");
		settings.fabric.lakehouse_name = Some("raw_lakehouse".to_string());
		settings.fabric.warehouse_name = Some("sales_wh".to_string());
		let builder = FabricWarehouseBuilder::new(settings);

		// Act
		let lakehouse = builder.lakehouse_object_name("dbo", "orders").unwrap();
		let warehouse = builder.warehouse_object_name("silver", "orders").unwrap();

		// Assert
		assert_eq!(lakehouse, "[raw_lakehouse].[dbo].[orders]");
		assert_eq!(warehouse, "[sales_wh].[silver].[sap_orders]");
	}

	#[rstest]
	fn test_cross_database_names_without_databases(builder: FabricWarehouseBuilder) {
		assert_eq!(builder.lakehouse_object_name("dbo", "orders").unwrap(), "[dbo].[orders]");
		assert_eq!(builder.warehouse_object_name("silver", "orders").unwrap(), "[silver].[orders]");
	}

	#[rstest]
	fn test_hostile_lakehouse_name_is_rejected() {
		let mut settings = ComputeSettings::fabric();
		settings.fabric.lakehouse_name = Some("lh]; DROP TABLE x; --".to_string());

		let result = FabricWarehouseBuilder::new(settings).lakehouse_object_name("dbo", "orders");

		assert!(result.is_err());
	}

	#[rstest]
	fn test_sampled_statistics_keep_fraction(builder: FabricWarehouseBuilder) {
		let stats = CreateStatistics::builder(target())
			.with_columns(["customer_id"])
			.unwrap()
			.with_fullscan(false)
			.unwrap()
			.with_sample_percent(0.5)
			.unwrap()
			.resolve(None)
			.unwrap();

		assert!(build(&builder, stats).unwrap().ends_with("\nWITH SAMPLE 0.5 PERCENT"));
	}

	#[rstest]
	fn test_maintenance_statements() {
		let builder = FabricWarehouseBuilder::new(ComputeSettings::fabric().with_table_prefix("sap_"));

		assert_eq!(
			builder.optimize_table("silver", "orders", &[] as &[&str]).unwrap(),
			"OPTIMIZE [silver].[sap_orders]"
		);
		assert_eq!(
			builder.vacuum_table("silver", "orders", None).unwrap(),
			"VACUUM [silver].[sap_orders] RETAIN 168 HOURS"
		);
		assert_eq!(
			builder.vacuum_table("gold", "orders", Some(24)).unwrap(),
			"VACUUM [gold].[orders] RETAIN 24 HOURS"
		);
	}
}
