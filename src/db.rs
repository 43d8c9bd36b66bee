//! Operation IR, statistics discovery, query builders and the builder factory.
//!
//! # Examples
//!
//! ```
//! use medalflow::conf::ComputeSettings;
//! use medalflow::db::{BuilderFactory, OperationBuilder};
//! use medalflow::core::QueryType;
//!
//! let operation = OperationBuilder::new(QueryType::DropView, "gold", "v_sales")
//!     .build()
//!     .unwrap();
//! let sql = BuilderFactory::create(&ComputeSettings::fabric())
//!     .build_query(&operation, None)
//!     .unwrap();
//! assert_eq!(sql, "DROP VIEW IF EXISTS [gold].[v_sales]");
//! ```

pub use medalflow_db::*;
