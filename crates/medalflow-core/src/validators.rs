//! Validators for names and literal values that end up in generated SQL.
//!
//! Three identifier rule sets exist because they guard different boundaries:
//!
//! - [`validate_object_identifier`]: schema and object names accepted by the
//!   operation model (T-SQL regular identifier characters).
//! - [`validate_column_name`]: column names of table column definitions.
//! - [`validate_sql_identifier`]: the stricter check a query builder applies
//!   immediately before bracket-quoting a name into SQL text.
//!
//! None of them sanitize. A name that fails is rejected.

pub mod identifier;
pub mod literal;

pub use identifier::{validate_column_name, validate_object_identifier, validate_sql_identifier};
pub use literal::quote_string_literal;
