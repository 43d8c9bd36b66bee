use medalflow_core::validators::quote_string_literal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A value placed into generated SQL.
///
/// `Text` is always rendered as an escaped string literal. `Expression` is
/// rendered verbatim and is trusted: the caller is responsible for its safety.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SqlValue {
	Null,
	Bool(bool),
	Integer(i64),
	Float(f64),
	Text(String),
	Expression(String),
}

impl SqlValue {
	/// Raw SQL expression, e.g. `GETDATE()` or `source.[id]`.
	pub fn expr(expression: impl Into<String>) -> Self {
		SqlValue::Expression(expression.into())
	}

	pub fn text(value: impl Into<String>) -> Self {
		SqlValue::Text(value.into())
	}

	/// SQL text for this value. T-SQL has no boolean literal, so booleans render as `1`/`0`.
	/// NaN and infinite floats have no literal either and render as `NULL`.
	pub fn to_sql(&self) -> String {
		match self {
			SqlValue::Null => "NULL".to_string(),
			SqlValue::Bool(b) => (if *b { "1" } else { "0" }).to_string(),
			SqlValue::Integer(i) => i.to_string(),
			SqlValue::Float(f) if !f.is_finite() => "NULL".to_string(),
			SqlValue::Float(f) => f.to_string(),
			SqlValue::Text(s) => quote_string_literal(s),
			SqlValue::Expression(e) => e.clone(),
		}
	}
}

impl fmt::Display for SqlValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.to_sql())
	}
}

impl From<&str> for SqlValue {
	fn from(value: &str) -> Self {
		SqlValue::Text(value.to_string())
	}
}

impl From<String> for SqlValue {
	fn from(value: String) -> Self {
		SqlValue::Text(value)
	}
}

impl From<i64> for SqlValue {
	fn from(value: i64) -> Self {
		SqlValue::Integer(value)
	}
}

impl From<i32> for SqlValue {
	fn from(value: i32) -> Self {
		SqlValue::Integer(value.into())
	}
}

impl From<f64> for SqlValue {
	fn from(value: f64) -> Self {
		SqlValue::Float(value)
	}
}

impl From<bool> for SqlValue {
	fn from(value: bool) -> Self {
		SqlValue::Bool(value)
	}
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
	fn from(value: Option<T>) -> Self {
		value.map_or(SqlValue::Null, Into::into)
	}
}
