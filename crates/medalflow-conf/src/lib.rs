//! # medalflow conf
//!
//! Settings consumed by the query builder factory: which platform to target,
//! how table names are prefixed, and the platform-specific object names
//! (external data sources, file formats) that generated SQL refers to.
//!
//! Settings are assembled from layered [`ConfigSource`]s, highest priority
//! winning, then deserialized into [`ComputeSettings`].
//!
//! ```
//! use medalflow_conf::{ComputeSettings, SettingsBuilder, DefaultSource};
//!
//! let settings: ComputeSettings = SettingsBuilder::new()
//!     .add_source(DefaultSource::new())
//!     .build()
//!     .unwrap();
//! assert_eq!(settings.dialect, "tsql");
//! ```

pub mod settings;

pub use settings::builder::SettingsBuilder;
pub use settings::compute::{ComputeSettings, FabricSettings, SynapseSettings};
pub use settings::sources::{ConfigSource, DefaultSource, EnvSource, SourceError, TomlFileSource};
