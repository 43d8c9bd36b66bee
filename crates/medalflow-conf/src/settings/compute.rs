//! Compute platform settings.

use medalflow_core::constants::DEFAULT_SKIP_PREFIX_SCHEMAS;
use medalflow_core::ComputeType;
use serde::{Deserialize, Serialize};

/// Settings read by the query builder factory.
///
/// Every field has a default, so a partial TOML file or a handful of
/// environment variables is enough to produce a usable value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComputeSettings {
	/// Platform the generated SQL targets.
	pub compute_type: ComputeType,
	/// SQL dialect label. Informational; both supported platforms speak T-SQL.
	pub dialect: String,
	/// Prefix added to object names (e.g. `sap_`) outside the skip-list schemas.
	pub table_prefix: Option<String>,
	/// Schemas whose objects never receive `table_prefix`. Compared case-insensitively.
	pub skip_prefix_on_schema: Vec<String>,
	pub synapse: SynapseSettings,
	pub fabric: FabricSettings,
}

impl Default for ComputeSettings {
	fn default() -> Self {
		Self {
			compute_type: ComputeType::default(),
			dialect: "tsql".to_string(),
			table_prefix: None,
			skip_prefix_on_schema: DEFAULT_SKIP_PREFIX_SCHEMAS
				.iter()
				.map(|schema| schema.to_string())
				.collect(),
			synapse: SynapseSettings::default(),
			fabric: FabricSettings::default(),
		}
	}
}

impl ComputeSettings {
	/// Settings targeting Synapse serverless with every other field defaulted.
	pub fn synapse() -> Self {
		Self {
			compute_type: ComputeType::Synapse,
			..Self::default()
		}
	}

	/// Settings targeting a Fabric warehouse with every other field defaulted.
	pub fn fabric() -> Self {
		Self {
			compute_type: ComputeType::Fabric,
			..Self::default()
		}
	}

	pub fn with_table_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.table_prefix = Some(prefix.into());
		self
	}

	pub fn with_skip_prefix_on_schema<I, S>(mut self, schemas: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.skip_prefix_on_schema = schemas.into_iter().map(Into::into).collect();
		self
	}

	/// Object name as it exists in the warehouse: `table_prefix` applied unless
	/// `schema` is in the skip list or no prefix is configured.
	///
	/// # Examples
	///
	/// ```
	/// use medalflow_conf::ComputeSettings;
	///
	/// let settings = ComputeSettings::default().with_table_prefix("sap_");
	/// assert_eq!(settings.physical_object_name("silver", "orders"), "sap_orders");
	/// assert_eq!(settings.physical_object_name("GOLD", "orders"), "orders");
	/// ```
	pub fn physical_object_name(&self, schema: &str, object_name: &str) -> String {
		match self.table_prefix.as_deref() {
			Some(prefix) if !prefix.is_empty() && !self.skips_prefix(schema) => {
				format!("{prefix}{object_name}")
			}
			_ => object_name.to_string(),
		}
	}

	fn skips_prefix(&self, schema: &str) -> bool {
		self.skip_prefix_on_schema
			.iter()
			.any(|skipped| skipped.eq_ignore_ascii_case(schema))
	}
}

/// Object names used by Synapse serverless SQL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynapseSettings {
	pub csv_file_format: String,
	pub parquet_file_format: String,
	pub raw_external_data_source: String,
	pub processed_external_data_source: String,
	/// Prepended to generated external table locations (`{prefix}/{schema}/{table}/`).
	pub location_prefix: Option<String>,
}

impl Default for SynapseSettings {
	fn default() -> Self {
		Self {
			csv_file_format: "csv_file_format".to_string(),
			parquet_file_format: "parquet_file_format".to_string(),
			raw_external_data_source: "raw_data_source".to_string(),
			processed_external_data_source: "processed_data_source".to_string(),
			location_prefix: None,
		}
	}
}

/// Fabric warehouse settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FabricSettings {
	pub warehouse_name: Option<String>,
	pub lakehouse_name: Option<String>,
	/// Retention used by `VACUUM` when the caller does not pass one.
	pub default_retention_hours: u32,
}

impl Default for FabricSettings {
	fn default() -> Self {
		Self {
			warehouse_name: None,
			lakehouse_name: None,
			default_retention_hours: 168,
		}
	}
}
