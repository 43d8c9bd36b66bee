//! # medalflow db
//!
//! The operation/query-builder subsystem of medalflow.
//!
//! An [`Operation`] is a validated, platform-agnostic description of one SQL
//! statement. A [`QueryBuilder`] renders it into the dialect of a target
//! platform, and the [`BuilderFactory`] picks the builder from
//! [`ComputeSettings`](medalflow_conf::ComputeSettings).
//!
//! ```
//! use medalflow_conf::ComputeSettings;
//! use medalflow_db::{BuilderFactory, CreateTable, ObjectTarget, Operation};
//!
//! let target = ObjectTarget::new("silver", "customers").unwrap();
//! let operation: Operation =
//!     CreateTable::as_select(target, "SELECT * FROM bronze.raw_customers").unwrap().into();
//!
//! let builder = BuilderFactory::create(&ComputeSettings::synapse());
//! let sql = builder.build_query(&operation, None).unwrap();
//! assert!(sql.contains("LOCATION = 'silver/customers'"));
//! ```
//!
//! ## Modules
//!
//! - [`operations`]: the operation IR and its validated constructors
//! - [`stats`]: statistics column discovery
//! - [`context`]: execution hints attached to an operation
//! - [`builder`]: incremental construction of operations
//! - [`query_builder`]: per-platform SQL rendering
//! - [`factory`]: builder selection from settings

pub mod builder;
pub mod context;
pub mod factory;
pub mod operations;
pub mod query_builder;
pub mod stats;

pub use builder::{BuildError, OperationBuilder};
pub use context::QueryContext;
pub use factory::{BuilderFactory, FactoryError};
pub use operations::{
	ColumnDefinition, Copy, CreateOrAlterView, CreateSchema, CreateStatistics,
	CreateStatisticsSpec, CreateTable, Delete, DropSchema, DropTable, DropView, ExecuteSql, Insert,
	InsertSource, Merge, MergeActions, ObjectTarget, Operation, QueryMetadata, Select, SqlValue,
	TableDefinition, Update,
};
pub use query_builder::{
	BuilderBase, FabricWarehouseBuilder, QueryBuilder, SynapseServerlessBuilder,
};
pub use stats::{
	ConfiguredStatsProvider, DiscoveryError, StatsColumnProvider, StatsConfiguration,
	discover_statistics_columns,
};
