//! Merges configuration sources into typed settings.

use super::sources::{ConfigSource, SourceError};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Collects [`ConfigSource`]s and merges them by priority.
///
/// Nested tables are merged key by key, so an environment override of
/// `synapse.location_prefix` leaves the other `synapse` keys from lower
/// priority sources intact.
#[derive(Default)]
pub struct SettingsBuilder {
	sources: Vec<Box<dyn ConfigSource>>,
}

impl SettingsBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add_source<S: ConfigSource + 'static>(mut self, source: S) -> Self {
		self.sources.push(Box::new(source));
		self
	}

	/// Merged raw values, lowest priority first so higher priorities overwrite.
	pub fn merged(&self) -> Result<IndexMap<String, Value>, SourceError> {
		let mut ordered: Vec<&Box<dyn ConfigSource>> = self.sources.iter().collect();
		ordered.sort_by_key(|source| source.priority());

		let mut merged = Map::new();
		for source in ordered {
			let values = source.load()?;
			tracing::debug!(
				source = %source.description(),
				keys = values.len(),
				"loaded settings source"
			);
			for (key, value) in values {
				merge_value(&mut merged, key, value);
			}
		}

		Ok(merged.into_iter().collect())
	}

	/// Merge every source and deserialize into `T`.
	pub fn build<T: DeserializeOwned>(&self) -> Result<T, SourceError> {
		let merged: Map<String, Value> = self.merged()?.into_iter().collect();
		Ok(serde_json::from_value(Value::Object(merged))?)
	}
}

fn merge_value(target: &mut Map<String, Value>, key: String, value: Value) {
	match value {
		Value::Object(incoming) => {
			if let Some(Value::Object(existing)) = target.get_mut(&key) {
				for (child_key, child_value) in incoming {
					merge_value(existing, child_key, child_value);
				}
				return;
			}
			target.insert(key, Value::Object(incoming));
		}
		value => {
			target.insert(key, value);
		}
	}
}
