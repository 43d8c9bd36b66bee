//! # medalflow
//!
//! Typed SQL operations for medallion-architecture pipelines
//! (Bronze → Silver → Gold → Snapshot), rendered for Azure Synapse serverless
//! pools and Microsoft Fabric warehouses.
//!
//! An operation is built once, validated at construction, and rendered by the
//! query builder of whichever platform the settings select. Rendering is pure:
//! the same operation and settings always produce the same SQL text.
//!
//! ## Feature Flags
//!
//! - `conf` - settings layer (TOML files, environment overrides)
//! - `db` (default) - operation IR, query builders and builder factory
//!
//! ## Quick Example
//!
//! ```
//! use medalflow::prelude::*;
//!
//! let settings = ComputeSettings::synapse();
//! let operation = OperationBuilder::new(QueryType::CreateTable, "silver", "customers")
//!     .select_query("SELECT * FROM bronze.raw_customers")
//!     .build()
//!     .unwrap();
//!
//! let sql = BuilderFactory::create(&settings).build_query(&operation, None).unwrap();
//! assert!(sql.contains("CREATE EXTERNAL TABLE [silver].[customers]"));
//! ```

#[cfg(feature = "conf")]
pub mod conf;
pub mod core;
#[cfg(feature = "db")]
pub mod db;

pub use medalflow_core::{
	ComputeType, EngineType, FileFormat, IdentifierError, Layer, QueryBuildError, QueryType,
	ValidationError,
};

#[cfg(feature = "conf")]
pub use medalflow_conf::{ComputeSettings, SettingsBuilder, SourceError};

#[cfg(feature = "db")]
pub use medalflow_db::{
	BuildError, BuilderFactory, FactoryError, Operation, OperationBuilder, QueryBuilder, QueryContext,
};

/// The types most pipelines need.
pub mod prelude {
	pub use medalflow_core::{
		ComputeType, EngineType, FileFormat, InsertMode, Layer, QueryBuildError, QueryType,
		ValidationError,
	};

	#[cfg(feature = "conf")]
	pub use medalflow_conf::{ComputeSettings, EnvSource, SettingsBuilder, TomlFileSource};

	#[cfg(feature = "db")]
	pub use medalflow_db::{
		BuilderFactory, ColumnDefinition, ConfiguredStatsProvider, CreateStatistics, CreateTable,
		ObjectTarget, Operation, OperationBuilder, QueryBuilder, QueryContext, QueryMetadata,
		SqlValue, StatsColumnProvider, TableDefinition,
	};
}
