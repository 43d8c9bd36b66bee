//! Synapse serverless SQL pools.
//!
//! Serverless pools only read data lake files: tables are external tables
//! (written through CREATE EXTERNAL TABLE AS SELECT), and row-level DML is
//! unavailable.

use super::base::{BuilderBase, DenyPattern, deny_list};
use super::{BuildResult, QueryBuilder};
use crate::operations::{
	ColumnDefinition, Copy, CreateOrAlterView, CreateSchema, CreateStatistics, CreateTable, Delete,
	DropSchema, DropTable, ExecuteSql, Insert, Merge, ObjectTarget, Update,
};
use medalflow_conf::ComputeSettings;
use medalflow_core::{ComputeType, FileFormat, IdentifierError, QueryBuildError, QueryType};
use std::sync::LazyLock;

static DENY_LIST: LazyLock<Vec<DenyPattern>> = LazyLock::new(|| {
	deny_list(&[
		("xp_cmdshell", "xp_cmdshell"),
		("sp_configure", "sp_configure"),
		("sp_addextendedproc", "sp_addextendedproc"),
		("sp_execute_external_script", "sp_execute_external_script"),
	])
});

/// T-SQL for Synapse serverless external tables.
///
/// # Examples
///
/// ```
/// use medalflow_conf::ComputeSettings;
/// use medalflow_db::{DropTable, ObjectTarget, Operation, QueryBuilder, SynapseServerlessBuilder};
///
/// let builder = SynapseServerlessBuilder::new(ComputeSettings::synapse());
/// let operation: Operation = DropTable::new(ObjectTarget::new("silver", "customers").unwrap()).into();
///
/// let sql = builder.build_query(&operation, None).unwrap();
/// assert!(sql.starts_with("IF EXISTS (SELECT * FROM sys.external_tables"));
/// assert!(sql.ends_with("DROP EXTERNAL TABLE [silver].[customers]"));
/// ```
#[derive(Debug, Clone)]
pub struct SynapseServerlessBuilder {
	base: BuilderBase,
}

impl SynapseServerlessBuilder {
	pub fn new(settings: ComputeSettings) -> Self {
		Self {
			base: BuilderBase::new(settings),
		}
	}

	fn file_format_name(&self, table: &CreateTable) -> Result<&str, QueryBuildError> {
		let synapse = &self.base.settings().synapse;
		let name = match table.file_format() {
			FileFormat::Parquet => &synapse.parquet_file_format,
			FileFormat::Csv => &synapse.csv_file_format,
			FileFormat::Delta | FileFormat::Json => {
				return Err(QueryBuildError::Unrenderable {
					platform: ComputeType::Synapse,
					operation: QueryType::CreateTable,
					object: table.target().full_object_name(),
					reason: "external tables only support PARQUET and CSV file formats",
				});
			}
		};
		Ok(self.base.setting_identifier(name, "file format")?)
	}

	/// `{location_prefix}/{schema}/{object}/`, or `{schema}/{object}/` without a prefix.
	fn generated_location(&self, target: &ObjectTarget) -> String {
		let relative = format!("{}/{}/", target.schema_name(), target.object_name());
		match self.base.settings().synapse.location_prefix.as_deref() {
			Some(prefix) if !prefix.is_empty() => {
				format!("{}/{relative}", prefix.trim_end_matches('/'))
			}
			_ => relative,
		}
	}

	fn external_table_options(
		&self,
		location: &str,
		file_format: &str,
	) -> Result<String, IdentifierError> {
		let data_source = self.base.setting_identifier(
			&self.base.settings().synapse.processed_external_data_source,
			"data source",
		)?;
		Ok(format!(
			"WITH (\n    DATA_SOURCE = {data_source},\n    LOCATION = {},\n    FILE_FORMAT = {file_format}\n)",
			self.base.quote_string(location),
		))
	}

	/// Ad-hoc read of raw lake files through the raw external data source.
	///
	/// ```
	/// use medalflow_conf::ComputeSettings;
	/// use medalflow_core::FileFormat;
	/// use medalflow_db::SynapseServerlessBuilder;
	///
	/// let builder = SynapseServerlessBuilder::new(ComputeSettings::synapse());
	/// let sql = builder.openrowset_query("sap/orders/*.parquet", FileFormat::Parquet).unwrap();
	/// assert!(sql.contains("DATA_SOURCE = 'raw_data_source'"));
	/// ```
	pub fn openrowset_query(
		&self,
		path: &str,
		file_format: FileFormat,
	) -> Result<String, QueryBuildError> {
		let format = match file_format {
			FileFormat::Parquet => "PARQUET",
			FileFormat::Csv => "CSV",
			FileFormat::Delta => "DELTA",
			FileFormat::Json => {
				return Err(QueryBuildError::Unrenderable {
					platform: ComputeType::Synapse,
					operation: QueryType::Select,
					object: path.to_string(),
					reason: "OPENROWSET reads PARQUET, CSV and DELTA files",
				});
			}
		};
		let data_source = self.base.setting_identifier(
			&self.base.settings().synapse.raw_external_data_source,
			"data source",
		)?;
		Ok(format!(
			"SELECT *\nFROM OPENROWSET(\n    BULK {},\n    DATA_SOURCE = {},\n    FORMAT = '{format}'\n) AS [rows]",
			self.base.quote_string(path),
			self.base.quote_string(data_source),
		))
	}

	/// Column name and type only. External tables accept no constraints.
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
				Ok(definition)
			})
			.collect::<Result<Vec<_>, IdentifierError>>()?;
		Ok(rendered.join(",\n    "))
	}

	fn drop_if_exists(name: &str) -> String {
		format!(
			"IF EXISTS (SELECT * FROM sys.external_tables WHERE object_id = OBJECT_ID('{name}'))\n    DROP EXTERNAL TABLE {name}"
		)
	}

	fn sys_name_filters(
		&self,
		schema: &str,
		object_name: &str,
	) -> Result<(String, String), IdentifierError> {
		let physical = self.base.settings().physical_object_name(schema, object_name);
		self.base.quote_identifier(schema, "schema")?;
		self.base.quote_identifier(&physical, "object")?;
		Ok((self.base.quote_string(schema), self.base.quote_string(&physical)))
	}

	/// Query returning a row when `schema.object` is an external table.
	pub fn is_external_table_query(
		&self,
		schema: &str,
		object_name: &str,
	) -> Result<String, IdentifierError> {
		let (schema, table) = self.sys_name_filters(schema, object_name)?;
		Ok(format!(
			"SELECT 1 FROM sys.external_tables et\nJOIN sys.schemas s ON et.schema_id = s.schema_id\nWHERE s.name = {schema} AND et.name = {table}"
		))
	}

	/// Query returning the full lake location of an external table.
	pub fn external_table_location_query(
		&self,
		schema: &str,
		object_name: &str,
	) -> Result<String, IdentifierError> {
		let (schema, table) = self.sys_name_filters(schema, object_name)?;
		Ok(format!(
			"SELECT eds.location + '/' + et.location AS full_location\nFROM sys.external_tables et\nJOIN sys.schemas s ON et.schema_id = s.schema_id\nJOIN sys.external_data_sources eds ON et.data_source_id = eds.data_source_id\nWHERE s.name = {schema} AND et.name = {table}"
		))
	}
}

impl QueryBuilder for SynapseServerlessBuilder {
	fn platform(&self) -> ComputeType {
		ComputeType::Synapse
	}

	fn base(&self) -> &BuilderBase {
		&self.base
	}

	fn build_create_table(&self, op: &CreateTable) -> BuildResult {
		let name = self.base.target_name(op.target())?;
		let file_format = self.file_format_name(op)?;

		let create = if let Some(select) = op.select_query() {
			let location = op
				.location()
				.map(str::to_string)
				.unwrap_or_else(|| self.generated_location(op.target()));
			format!(
				"CREATE EXTERNAL TABLE {name}\n{}\nAS {select}",
				self.external_table_options(&location, file_format)?
			)
		} else if let Some(source) = op.source_table() {
			let location = op
				.location()
				.map(str::to_string)
				.unwrap_or_else(|| self.generated_location(op.target()));
			format!(
				"CREATE EXTERNAL TABLE {name}\n{}\nAS SELECT * FROM {}",
				self.external_table_options(&location, file_format)?,
				self.base.qualify_dotted(source)?
			)
		} else {
			if op.columns().is_empty() {
				return Err(QueryBuildError::Unrenderable {
					platform: ComputeType::Synapse,
					operation: QueryType::CreateTable,
					object: op.target().full_object_name(),
					reason: "columns are required for an external table over existing data",
				});
			}
			let location = op
				.location()
				.map(str::to_string)
				.unwrap_or_else(|| self.generated_location(op.target()));
			format!(
				"CREATE EXTERNAL TABLE {name} (\n    {}\n)\n{}",
				self.column_definitions(op.columns())?,
				self.external_table_options(&location, file_format)?
			)
		};

		if op.recreate() {
			return Ok(format!("{};\n{create}", Self::drop_if_exists(&name)));
		}
		Ok(create)
	}

	fn build_drop_table(&self, op: &DropTable) -> BuildResult {
		let name = self.base.target_name(op.target())?;
		Ok(if op.if_exists() {
			Self::drop_if_exists(&name)
		} else {
			format!("DROP EXTERNAL TABLE {name}")
		})
	}

	fn build_create_schema(&self, op: &CreateSchema) -> BuildResult {
		let schema = self.base.quote_identifier(op.schema_name(), "schema")?;
		let authorization = match op.authorization() {
			Some(owner) => format!(" AUTHORIZATION {}", self.base.quote_identifier(owner, "owner")?),
			None => String::new(),
		};
		let create = format!("CREATE SCHEMA {schema}{authorization}");

		if op.if_not_exists() {
			return Ok(format!(
				"IF NOT EXISTS (SELECT * FROM sys.schemas WHERE name = {})\nBEGIN\n    {create}\nEND",
				self.base.quote_string(op.schema_name())
			));
		}
		Ok(create)
	}

	fn build_drop_schema(&self, op: &DropSchema) -> BuildResult {
		let schema = self.base.quote_identifier(op.schema_name(), "schema")?;
		let drop = format!("DROP SCHEMA {schema}");

		if op.if_exists() {
			return Ok(format!(
				"IF EXISTS (SELECT * FROM sys.schemas WHERE name = {})\nBEGIN\n    {drop}\nEND",
				self.base.quote_string(op.schema_name())
			));
		}
		Ok(drop)
	}

	fn build_insert(&self, _op: &Insert) -> BuildResult {
		Err(self.unsupported(
			QueryType::Insert,
			"Cannot INSERT into external tables in Synapse Serverless. Use CREATE EXTERNAL TABLE AS SELECT instead.",
		))
	}

	fn build_update(&self, _op: &Update) -> BuildResult {
		Err(self.unsupported(
			QueryType::Update,
			"Cannot UPDATE external tables in Synapse Serverless. Data is read-only.",
		))
	}

	fn build_delete(&self, _op: &Delete) -> BuildResult {
		Err(self.unsupported(
			QueryType::Delete,
			"Cannot DELETE from external tables in Synapse Serverless. Data is read-only.",
		))
	}

	fn build_merge(&self, _op: &Merge) -> BuildResult {
		Err(self.unsupported(
			QueryType::Merge,
			"MERGE not supported for external tables in Synapse Serverless.",
		))
	}

	fn build_copy(&self, _op: &Copy) -> BuildResult {
		Err(self.unsupported(
			QueryType::Copy,
			"COPY operation not implemented. Use OPENROWSET for ad-hoc queries.",
		))
	}

	fn build_create_or_alter_view(&self, op: &CreateOrAlterView) -> BuildResult {
		if op.materialized() {
			return Err(QueryBuildError::Unrenderable {
				platform: ComputeType::Synapse,
				operation: QueryType::CreateOrAlterView,
				object: op.target().full_object_name(),
				reason: "materialized views are not available in serverless pools",
			});
		}

		let name = self.base.target_name(op.target())?;
		let columns = if op.columns().is_empty() {
			String::new()
		} else {
			format!(" ({})", self.base.format_column_list(op.columns())?)
		};
		let schemabinding = if op.schemabinding() { " WITH SCHEMABINDING" } else { "" };

		Ok(format!(
			"CREATE OR ALTER VIEW {name}{columns}{schemabinding} AS\n{}",
			op.select_query()
		))
	}

	fn build_create_statistics(&self, op: &CreateStatistics) -> BuildResult {
		let name = self.base.target_name(op.target())?;
		let stats_name = self.base.stats_name(op)?;
		let column = self.base.format_column_list(op.columns())?;

		let mut sql = format!("CREATE STATISTICS {stats_name} ON {name} ({column})");
		if op.with_fullscan() {
			sql.push_str(" WITH FULLSCAN");
		} else if let Some(percent) = op.sample_percent() {
			sql.push_str(&format!(" WITH SAMPLE {percent} PERCENT"));
		}
		Ok(sql)
	}

	fn build_execute_sql(&self, op: &ExecuteSql) -> BuildResult {
		self.base.render_execute_sql(op, &DENY_LIST)
	}
}
