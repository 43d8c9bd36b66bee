//! Statistics column discovery.
//!
//! A [`StatsColumnProvider`] answers "which columns of this table deserve
//! statistics" for a given layer. It is handed explicitly to
//! [`CreateStatisticsSpec::resolve`](crate::CreateStatisticsSpec::resolve);
//! nothing here is looked up from global state.

use crate::operations::ObjectTarget;
use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::HashMap;

/// Failure reported by a [`StatsColumnProvider`].
///
/// Discovery is best-effort: these errors are logged and never propagated
/// out of [`discover_statistics_columns`].
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
	#[error("stats column provider unavailable: {0}")]
	Unavailable(String),

	#[error("stats column lookup failed for {table}: {source}")]
	Lookup {
		table: String,
		#[source]
		source: Box<dyn std::error::Error + Send + Sync>,
	},
}

/// Source of statistics column lists.
///
/// Implementations may block (catalog lookups, remote calls). Timeouts and
/// retries belong inside the implementation.
pub trait StatsColumnProvider: Send + Sync {
	fn stats_columns(&self, table_name: &str, layer: &str) -> Result<Vec<String>, DiscoveryError>;
}

impl<F> StatsColumnProvider for F
where
	F: Fn(&str, &str) -> Result<Vec<String>, DiscoveryError> + Send + Sync,
{
	fn stats_columns(&self, table_name: &str, layer: &str) -> Result<Vec<String>, DiscoveryError> {
		self(table_name, layer)
	}
}

/// Statistics columns declared for the tables of one layer.
///
/// ```toml
/// schema_name = "silver"
///
/// [table_stats]
/// customers = ["customer_id", "region"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StatsConfiguration {
	pub schema_name: String,
	#[serde(default)]
	pub table_stats: IndexMap<String, Vec<String>>,
}

impl StatsConfiguration {
	pub fn has_table(&self, table_name: &str) -> bool {
		self.table_stats.contains_key(table_name)
	}

	pub fn table_columns(&self, table_name: &str) -> &[String] {
		self.table_stats
			.get(table_name)
			.map(Vec::as_slice)
			.unwrap_or_default()
	}
}

/// [`StatsColumnProvider`] backed by per-layer [`StatsConfiguration`]s.
///
/// Table names are matched lowercased; configuration keys are expected in
/// lowercase.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredStatsProvider {
	layers: HashMap<String, StatsConfiguration>,
}

impl ConfiguredStatsProvider {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_layer(
		mut self,
		layer: impl Into<String>,
		configuration: StatsConfiguration,
	) -> Self {
		self.layers.insert(layer.into().to_lowercase(), configuration);
		self
	}

	/// Parses one layer's configuration from TOML.
	pub fn with_layer_toml(
		self,
		layer: impl Into<String>,
		source: &str,
	) -> Result<Self, toml::de::Error> {
		let configuration: StatsConfiguration = toml::from_str(source)?;
		Ok(self.with_layer(layer, configuration))
	}

	pub fn layer(&self, layer: &str) -> Option<&StatsConfiguration> {
		self.layers.get(&layer.to_lowercase())
	}
}

impl StatsColumnProvider for ConfiguredStatsProvider {
	fn stats_columns(&self, table_name: &str, layer: &str) -> Result<Vec<String>, DiscoveryError> {
		Ok(self
			.layer(layer)
			.map(|config| config.table_columns(&table_name.to_lowercase()).to_vec())
			.unwrap_or_default())
	}
}

/// Discovery chain for statistics columns of `target`.
///
/// Metadata `stats_columns` win when non-empty. Otherwise `provider` is asked
/// with the object name and the target's schema as layer. Every outcome is
/// logged; an empty result means nothing was found.
pub fn discover_statistics_columns(
	target: &ObjectTarget,
	provider: Option<&dyn StatsColumnProvider>,
) -> Vec<String> {
	let object = target.full_object_name();

	if let Some(columns) = target.metadata().and_then(|m| m.stats_columns())
		&& !columns.is_empty()
	{
		tracing::info!(object = %object, columns = ?columns, "using stats columns from metadata");
		return columns.to_vec();
	}

	let Some(provider) = provider else {
		tracing::debug!(object = %object, "no stats column provider configured, skipping discovery");
		return Vec::new();
	};

	match provider.stats_columns(target.object_name(), target.schema_name()) {
		Ok(columns) if !columns.is_empty() => {
			tracing::info!(object = %object, columns = ?columns, "auto-discovered stats columns");
			columns
		}
		Ok(_) => {
			tracing::debug!(object = %object, "stats column provider returned no columns");
			Vec::new()
		}
		Err(DiscoveryError::Unavailable(reason)) => {
			tracing::debug!(object = %object, reason = %reason, "stats discovery unavailable, skipping");
			Vec::new()
		}
		Err(err) => {
			tracing::warn!(object = %object, error = %err, "failed to auto-discover stats columns");
			Vec::new()
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::operations::QueryMetadata;
	use rstest::{fixture, rstest};

	const SILVER: &str = r#"
schema_name = "silver"

[table_stats]
customers = ["customer_id", "region"]
orders = ["order_id"]
"#;

	#[fixture]
	fn provider() -> ConfiguredStatsProvider {
		ConfiguredStatsProvider::new()
			.with_layer_toml("silver", SILVER)
			.unwrap()
	}

	#[rstest]
	#[case("customers", "silver", vec!["customer_id", "region"])]
	#[case("CUSTOMERS", "Silver", vec!["customer_id", "region"])]
	#[case("missing", "silver", vec![])]
	#[case("customers", "gold", vec![])]
	fn test_configured_provider_lookup(
		provider: ConfiguredStatsProvider,
		#[case] table: &str,
		#[case] layer: &str,
		#[case] expected: Vec<&str>,
	) {
		let columns = provider.stats_columns(table, layer).unwrap();

		assert_eq!(columns, expected);
	}

	#[rstest]
	fn test_configuration_helpers(provider: ConfiguredStatsProvider) {
		let silver = provider.layer("silver").unwrap();

		assert_eq!(silver.schema_name, "silver");
		assert!(silver.has_table("orders"));
		assert!(!silver.has_table("payments"));
		assert!(silver.table_columns("payments").is_empty());
	}

	#[rstest]
	fn test_metadata_short_circuits_provider() {
		let target = ObjectTarget::new("silver", "customers")
			.unwrap()
			.with_metadata(QueryMetadata::new().with_stats_columns(["from_metadata"]));
		let panicking = |_: &str, _: &str| -> Result<Vec<String>, DiscoveryError> {
			panic!("provider must not be consulted")
		};

		let columns = discover_statistics_columns(&target, Some(&panicking));

		assert_eq!(columns, vec!["from_metadata"]);
	}

	#[rstest]
	fn test_empty_metadata_falls_through_to_provider(provider: ConfiguredStatsProvider) {
		let target = ObjectTarget::new("silver", "orders")
			.unwrap()
			.with_metadata(QueryMetadata::new().with_stats_columns(Vec::<String>::new()));

		let columns = discover_statistics_columns(&target, Some(&provider));

		assert_eq!(columns, vec!["order_id"]);
	}

	#[rstest]
	fn test_provider_error_yields_nothing() {
		let target = ObjectTarget::new("silver", "orders").unwrap();
		let failing = |table: &str, _: &str| -> Result<Vec<String>, DiscoveryError> {
			Err(DiscoveryError::Unavailable(format!("catalog offline for {table}")))
		};

		assert!(discover_statistics_columns(&target, Some(&failing)).is_empty());
	}
}
