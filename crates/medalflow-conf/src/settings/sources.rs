//! Configuration sources for layered settings.
//!
//! Sources are merged in priority order (environment variables > TOML
//! files > defaults). Each source yields a flat-or-nested map of JSON values
//! keyed by settings field name.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::fs;
use std::path::PathBuf;

use super::compute::ComputeSettings;

/// Trait for configuration sources
pub trait ConfigSource: Send + Sync {
	/// Load configuration from this source
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError>;

	/// Priority of this source (higher = more important)
	fn priority(&self) -> u8;

	fn description(&self) -> String;
}

/// Error type for configuration sources
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("Parse error: {0}")]
	Parse(String),

	#[error("TOML error: {0}")]
	Toml(#[from] toml::de::Error),

	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

/// Default values of [`ComputeSettings`] as a source, lowest priority.
#[derive(Debug, Default)]
pub struct DefaultSource;

impl DefaultSource {
	pub fn new() -> Self {
		Self
	}
}

impl ConfigSource for DefaultSource {
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError> {
		let value = serde_json::to_value(ComputeSettings::default())?;
		match value {
			Value::Object(map) => Ok(map.into_iter().collect()),
			_ => Err(SourceError::Parse(
				"default settings did not serialize to an object".to_string(),
			)),
		}
	}

	fn priority(&self) -> u8 {
		0
	}

	fn description(&self) -> String {
		"Default settings".to_string()
	}
}

/// TOML file configuration source. A missing file yields no values.
pub struct TomlFileSource {
	path: PathBuf,
}

impl TomlFileSource {
	/// Create a new TOML file configuration source
	///
	/// # Examples
	///
	/// ```
	/// use medalflow_conf::TomlFileSource;
	///
	/// let source = TomlFileSource::new("medalflow.toml");
	/// ```
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}
}

impl ConfigSource for TomlFileSource {
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError> {
		if !self.path.exists() {
			return Ok(IndexMap::new());
		}

		let content = fs::read_to_string(&self.path)?;
		let toml_value: toml::Value = toml::from_str(&content)?;
		let json_value = serde_json::to_value(toml_value)?;

		let map = json_value
			.as_object()
			.ok_or_else(|| SourceError::Parse("Expected table at root".to_string()))?;

		Ok(map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
	}

	fn priority(&self) -> u8 {
		50
	}

	fn description(&self) -> String {
		format!("TOML file: {}", self.path.display())
	}
}

/// Environment variable configuration source.
///
/// Only variables starting with the prefix (default `MEDALFLOW_`) are read.
/// The remainder is lowercased and split on `__` into nested tables, so
/// `MEDALFLOW_SYNAPSE__LOCATION_PREFIX` sets `synapse.location_prefix`.
pub struct EnvSource {
	prefix: String,
	vars: Option<Vec<(String, String)>>,
}

impl EnvSource {
	pub const DEFAULT_PREFIX: &'static str = "MEDALFLOW_";

	pub fn new() -> Self {
		Self {
			prefix: Self::DEFAULT_PREFIX.to_string(),
			vars: None,
		}
	}

	/// Set the variable prefix
	///
	/// # Examples
	///
	/// ```
	/// use medalflow_conf::EnvSource;
	///
	/// let source = EnvSource::new().with_prefix("PIPELINE_");
	/// ```
	pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.prefix = prefix.into();
		self
	}

	/// Read from a fixed set of variables instead of the process environment.
	pub fn with_vars<I, K, V>(mut self, vars: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		self.vars = Some(
			vars.into_iter()
				.map(|(k, v)| (k.into(), v.into()))
				.collect(),
		);
		self
	}

	fn parse_value(key: &str, value: String) -> Value {
		if key == "skip_prefix_on_schema" {
			return Value::Array(
				value
					.split(',')
					.map(str::trim)
					.filter(|s| !s.is_empty())
					.map(|s| Value::String(s.to_string()))
					.collect(),
			);
		}

		if let Ok(num) = value.parse::<i64>() {
			Value::Number(num.into())
		} else if let Ok(b) = value.parse::<bool>() {
			Value::Bool(b)
		} else {
			Value::String(value)
		}
	}
}

impl Default for EnvSource {
	fn default() -> Self {
		Self::new()
	}
}

fn insert_path(map: &mut Map<String, Value>, path: &[&str], value: Value) {
	match path {
		[] => {}
		[leaf] => {
			map.insert(leaf.to_string(), value);
		}
		[head, rest @ ..] => {
			let entry = map
				.entry(head.to_string())
				.or_insert_with(|| Value::Object(Map::new()));
			if !entry.is_object() {
				*entry = Value::Object(Map::new());
			}
			if let Value::Object(child) = entry {
				insert_path(child, rest, value);
			}
		}
	}
}

impl ConfigSource for EnvSource {
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError> {
		let vars: Vec<(String, String)> = match &self.vars {
			Some(vars) => vars.clone(),
			None => std::env::vars().collect(),
		};

		let mut config = Map::new();
		for (key, value) in vars {
			let Some(clean_key) = key.strip_prefix(&self.prefix) else {
				continue;
			};
			let lower_key = clean_key.to_lowercase();
			let path: Vec<&str> = lower_key.split("__").collect();
			let Some(leaf) = path.last() else {
				continue;
			};
			let parsed = Self::parse_value(leaf, value);
			insert_path(&mut config, &path, parsed);
		}

		Ok(config.into_iter().collect())
	}

	fn priority(&self) -> u8 {
		100
	}

	fn description(&self) -> String {
		format!("Environment variables (prefix: {})", self.prefix)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::io::Write;
	use tempfile::NamedTempFile;

	#[rstest]
	fn test_env_source_nests_double_underscore_keys() {
		// Arrange
		let source = EnvSource::new().with_vars([
			("MEDALFLOW_COMPUTE_TYPE", "fabric"),
			("MEDALFLOW_SYNAPSE__LOCATION_PREFIX", "abfss://lake"),
			("MEDALFLOW_FABRIC__DEFAULT_RETENTION_HOURS", "72"),
			("OTHER_TABLE_PREFIX", "ignored_"),
		]);

		// Act
		let config = source.load().unwrap();

		// Assert
		assert_eq!(config["compute_type"], Value::String("fabric".to_string()));
		assert_eq!(config["synapse"]["location_prefix"], "abfss://lake");
		assert_eq!(config["fabric"]["default_retention_hours"], 72);
		assert!(!config.contains_key("table_prefix"));
	}

	#[rstest]
	fn test_env_source_splits_skip_list() {
		let source =
			EnvSource::new().with_vars([("MEDALFLOW_SKIP_PREFIX_ON_SCHEMA", "dbo, gold ,")]);

		let config = source.load().unwrap();

		assert_eq!(config["skip_prefix_on_schema"], serde_json::json!(["dbo", "gold"]));
	}

	#[rstest]
	fn test_missing_toml_file_yields_nothing() {
		let source = TomlFileSource::new("/nonexistent/medalflow.toml");

		assert!(source.load().unwrap().is_empty());
	}

	#[rstest]
	fn test_toml_file_source_reads_tables() {
		let mut file = NamedTempFile::new().unwrap();
		writeln!(file, "table_prefix = \"sap_\"\n[fabric]\nwarehouse_name = \"wh\"").unwrap();

		let config = TomlFileSource::new(file.path()).load().unwrap();

		assert_eq!(config["table_prefix"], "sap_");
		assert_eq!(config["fabric"]["warehouse_name"], "wh");
	}

	#[rstest]
	fn test_invalid_toml_is_reported() {
		let mut file = NamedTempFile::new().unwrap();
		writeln!(file, "table_prefix = ").unwrap();

		let err = TomlFileSource::new(file.path()).load().unwrap_err();

		assert!(matches!(err, SourceError::Toml(_)));
	}

	#[rstest]
	fn test_priorities_are_ordered() {
		assert!(EnvSource::new().priority() > TomlFileSource::new("x.toml").priority());
		assert!(TomlFileSource::new("x.toml").priority() > DefaultSource::new().priority());
	}
}
