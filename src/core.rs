//! Vocabularies, error types and identifier validators shared by every layer.
//!
//! # Examples
//!
//! ```
//! use medalflow::core::validators::validate_sql_identifier;
//!
//! assert!(validate_sql_identifier("customer_id", "column").is_ok());
//! ```

pub use medalflow_core::*;
