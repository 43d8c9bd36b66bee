//! Target object identity shared by every operation.

use medalflow_core::validators::validate_object_identifier;
use medalflow_core::{EngineType, Layer, ValidationError};
use serde::Serialize;
use std::sync::Arc;

/// Layer metadata an operation may be associated with.
///
/// Operations only hold a shared handle to it; it is consulted by statistics
/// column discovery and never owned or mutated by the operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryMetadata {
	stats_columns: Option<Vec<String>>,
	layer: Option<Layer>,
	description: Option<String>,
}

impl QueryMetadata {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_stats_columns<I, S>(mut self, columns: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.stats_columns = Some(columns.into_iter().map(Into::into).collect());
		self
	}

	pub fn with_layer(mut self, layer: Layer) -> Self {
		self.layer = Some(layer);
		self
	}

	pub fn with_description(mut self, description: impl Into<String>) -> Self {
		self.description = Some(description.into());
		self
	}

	/// Statistics columns declared for the object, if any were declared.
	pub fn stats_columns(&self) -> Option<&[String]> {
		self.stats_columns.as_deref()
	}

	pub fn layer(&self) -> Option<Layer> {
		self.layer
	}

	pub fn description(&self) -> Option<&str> {
		self.description.as_deref()
	}
}

/// Schema and object an operation acts on, plus cross-cutting hints.
///
/// Both names are validated on construction. The fully-qualified name is
/// derived on demand and never includes a table prefix; prefixes are a
/// rendering concern of the query builders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectTarget {
	schema_name: String,
	object_name: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	engine_hint: Option<EngineType>,
	#[serde(skip_serializing_if = "Option::is_none")]
	logging_context: Option<String>,
	#[serde(skip)]
	metadata: Option<Arc<QueryMetadata>>,
}

impl ObjectTarget {
	/// # Examples
	///
	/// ```
	/// use medalflow_db::ObjectTarget;
	///
	/// let target = ObjectTarget::new("silver", "customers").unwrap();
	/// assert_eq!(target.full_object_name(), "silver.customers");
	///
	/// assert!(ObjectTarget::new("silver", "customers; DROP").is_err());
	/// assert!(ObjectTarget::new("", "customers").is_err());
	/// ```
	pub fn new(
		schema_name: impl Into<String>,
		object_name: impl Into<String>,
	) -> Result<Self, ValidationError> {
		let schema_name = schema_name.into();
		let object_name = object_name.into();

		validate_object_identifier(&schema_name, "schema")
			.map_err(|e| ValidationError::identifier("schema_name", e))?;
		validate_object_identifier(&object_name, "object")
			.map_err(|e| ValidationError::identifier("object_name", e))?;

		Ok(Self {
			schema_name,
			object_name,
			engine_hint: None,
			logging_context: None,
			metadata: None,
		})
	}

	pub fn with_engine_hint(mut self, engine: EngineType) -> Self {
		self.engine_hint = Some(engine);
		self
	}

	pub fn with_logging_context(mut self, context: impl Into<String>) -> Self {
		self.logging_context = Some(context.into());
		self
	}

	pub fn with_metadata(mut self, metadata: impl Into<Arc<QueryMetadata>>) -> Self {
		self.metadata = Some(metadata.into());
		self
	}

	pub fn schema_name(&self) -> &str {
		&self.schema_name
	}

	pub fn object_name(&self) -> &str {
		&self.object_name
	}

	pub fn engine_hint(&self) -> Option<EngineType> {
		self.engine_hint
	}

	pub fn logging_context(&self) -> Option<&str> {
		self.logging_context.as_deref()
	}

	pub fn metadata(&self) -> Option<&QueryMetadata> {
		self.metadata.as_deref()
	}

	/// `schema.object`
	pub fn full_object_name(&self) -> String {
		format!("{}.{}", self.schema_name, self.object_name)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("bronze", "raw_customers")]
	#[case("_stage", "tmp#1")]
	#[case("silver", "orders$2024")]
	fn test_valid_targets(#[case] schema: &str, #[case] object: &str) {
		let target = ObjectTarget::new(schema, object).unwrap();

		assert_eq!(target.full_object_name(), format!("{schema}.{object}"));
	}

	#[rstest]
	#[case("1bronze", "orders", "schema_name")]
	#[case("bronze", "", "object_name")]
	#[case("bronze", "orders.x", "object_name")]
	#[case("bro nze", "orders", "schema_name")]
	fn test_invalid_targets_name_the_field(
		#[case] schema: &str,
		#[case] object: &str,
		#[case] field: &str,
	) {
		let err = ObjectTarget::new(schema, object).unwrap_err();

		assert_eq!(err.field(), Some(field));
	}

	#[rstest]
	fn test_metadata_is_shared_not_copied() {
		let metadata = Arc::new(QueryMetadata::new().with_stats_columns(["id"]));

		let a = ObjectTarget::new("silver", "a")
			.unwrap()
			.with_metadata(Arc::clone(&metadata));
		let b = ObjectTarget::new("silver", "b")
			.unwrap()
			.with_metadata(Arc::clone(&metadata));

		assert_eq!(Arc::strong_count(&metadata), 3);
		assert_eq!(a.metadata().and_then(QueryMetadata::stats_columns), Some(&["id".to_string()][..]));
		assert_eq!(a.metadata(), b.metadata());
	}
}
