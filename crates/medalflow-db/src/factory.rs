//! Builder selection.

use crate::query_builder::{FabricWarehouseBuilder, QueryBuilder, SynapseServerlessBuilder};
use medalflow_conf::{ComputeSettings, SettingsBuilder, SourceError};
use medalflow_core::ComputeType;

/// Failure to produce a query builder.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum FactoryError {
	#[error("Unsupported compute type: {platform}. Supported types: SYNAPSE, FABRIC")]
	PlatformNotSupported { platform: String },

	#[error("Failed to load compute settings: {0}")]
	Settings(#[from] SourceError),
}

impl FactoryError {
	pub fn code(&self) -> &'static str {
		match self {
			FactoryError::PlatformNotSupported { .. } => "PLATFORM_NOT_SUPPORTED",
			FactoryError::Settings(_) => "SETTINGS_ERROR",
		}
	}
}

/// Creates the [`QueryBuilder`] for a compute platform.
pub struct BuilderFactory;

impl BuilderFactory {
	pub fn synapse(settings: &ComputeSettings) -> SynapseServerlessBuilder {
		SynapseServerlessBuilder::new(settings.clone())
	}

	pub fn fabric(settings: &ComputeSettings) -> FabricWarehouseBuilder {
		FabricWarehouseBuilder::new(settings.clone())
	}

	/// Builder for `settings.compute_type`.
	pub fn create(settings: &ComputeSettings) -> Box<dyn QueryBuilder> {
		tracing::debug!(platform = %settings.compute_type, "creating query builder");
		match settings.compute_type {
			ComputeType::Synapse => Box::new(Self::synapse(settings)),
			ComputeType::Fabric => Box::new(Self::fabric(settings)),
		}
	}

	/// Builder for a platform named by the caller (`"synapse"`, `"FABRIC"`, ...),
	/// overriding `settings.compute_type`.
	///
	/// ```
	/// use medalflow_conf::ComputeSettings;
	/// use medalflow_core::ComputeType;
	/// use medalflow_db::BuilderFactory;
	///
	/// let builder = BuilderFactory::for_platform("FABRIC", &ComputeSettings::default()).unwrap();
	/// assert_eq!(builder.platform(), ComputeType::Fabric);
	///
	/// let err = BuilderFactory::for_platform("snowflake", &ComputeSettings::default()).err().unwrap();
	/// assert_eq!(err.code(), "PLATFORM_NOT_SUPPORTED");
	/// ```
	pub fn for_platform(
		platform: &str,
		settings: &ComputeSettings,
	) -> Result<Box<dyn QueryBuilder>, FactoryError> {
		let compute_type = platform.trim().parse::<ComputeType>().map_err(|_| {
			tracing::warn!(platform, "unsupported compute type requested");
			FactoryError::PlatformNotSupported {
				platform: platform.to_string(),
			}
		})?;

		Ok(Self::create(&ComputeSettings {
			compute_type,
			..settings.clone()
		}))
	}

	/// Loads [`ComputeSettings`] from `sources` and creates the matching builder.
	pub fn from_settings_builder(
		sources: &SettingsBuilder,
	) -> Result<Box<dyn QueryBuilder>, FactoryError> {
		let settings: ComputeSettings = sources.build()?;
		Ok(Self::create(&settings))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use medalflow_conf::{DefaultSource, EnvSource};
	use rstest::rstest;

	#[rstest]
	#[case(ComputeSettings::synapse(), ComputeType::Synapse)]
	#[case(ComputeSettings::fabric(), ComputeType::Fabric)]
	fn test_create_follows_compute_type(
		#[case] settings: ComputeSettings,
		#[case] expected: ComputeType,
	) {
		assert_eq!(BuilderFactory::create(&settings).platform(), expected);
	}

	#[rstest]
	#[case("synapse", ComputeType::Synapse)]
	#[case(" Fabric ", ComputeType::Fabric)]
	fn test_for_platform_is_case_insensitive(#[case] name: &str, #[case] expected: ComputeType) {
		let builder = BuilderFactory::for_platform(name, &ComputeSettings::default()).unwrap();

		assert_eq!(builder.platform(), expected);
	}

	#[rstest]
	fn test_unknown_platform_lists_supported_types() {
		let err = BuilderFactory::for_platform("databricks", &ComputeSettings::default())
			.err()
			.unwrap();

		assert_eq!(
			err.to_string(),
			"Unsupported compute type: databricks. Supported types: SYNAPSE, FABRIC"
		);
		assert!(matches!(err, FactoryError::PlatformNotSupported { .. }));
	}

	#[rstest]
	fn test_for_platform_keeps_other_settings() {
		let settings = ComputeSettings::synapse().with_table_prefix("sap_");
		let builder = BuilderFactory::for_platform("fabric", &settings).unwrap();

		assert_eq!(builder.base().settings().table_prefix.as_deref(), Some("sap_"));
		assert_eq!(builder.base().settings().compute_type, ComputeType::Fabric);
	}

	#[rstest]
	fn test_from_settings_builder_reads_environment() {
		let sources = SettingsBuilder::new()
			.add_source(DefaultSource::new())
			.add_source(EnvSource::new().with_vars([("MEDALFLOW_COMPUTE_TYPE", "fabric")]));

		let builder = BuilderFactory::from_settings_builder(&sources).unwrap();

		assert_eq!(builder.platform(), ComputeType::Fabric);
	}
}
