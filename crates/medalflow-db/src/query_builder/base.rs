//! Scaffolding shared by the T-SQL query builders.

use crate::operations::{CreateStatistics, ExecuteSql, ObjectTarget, Select, SqlValue};
use indexmap::IndexMap;
use medalflow_conf::ComputeSettings;
use medalflow_core::validators::{quote_string_literal, validate_sql_identifier};
use medalflow_core::{IdentifierError, QueryBuildError};
use regex::Regex;

/// A named entry of a raw-SQL deny list.
pub type DenyPattern = (&'static str, Regex);

/// Builds a case-insensitive deny list from `(name, pattern)` pairs.
pub(crate) fn deny_list(patterns: &[(&'static str, &str)]) -> Vec<DenyPattern> {
	patterns
		.iter()
		.map(|(name, pattern)| {
			let regex = Regex::new(&format!("(?is){pattern}"))
				.expect("deny list patterns are valid regular expressions");
			(*name, regex)
		})
		.collect()
}

/// Identifier quoting, naming and shared rendering used by every builder.
#[derive(Debug, Clone)]
pub struct BuilderBase {
	settings: ComputeSettings,
}

impl BuilderBase {
	pub fn new(settings: ComputeSettings) -> Self {
		Self { settings }
	}

	pub fn settings(&self) -> &ComputeSettings {
		&self.settings
	}

	/// Validates `identifier` and wraps it in brackets.
	///
	/// Bracket characters make validation fail; they are never stripped.
	///
	/// ```
	/// use medalflow_conf::ComputeSettings;
	/// use medalflow_db::BuilderBase;
	///
	/// let base = BuilderBase::new(ComputeSettings::default());
	/// assert_eq!(base.quote_identifier("customer_id", "column").unwrap(), "[customer_id]");
	/// assert!(base.quote_identifier("x]; DROP TABLE y; --", "column").is_err());
	/// ```
	pub fn quote_identifier(
		&self,
		identifier: &str,
		kind: &'static str,
	) -> Result<String, IdentifierError> {
		validate_sql_identifier(identifier, kind)?;
		Ok(format!("[{identifier}]"))
	}

	/// Validates a name taken from settings (data sources, file formats, ...)
	/// and returns it unquoted.
	pub fn setting_identifier<'a>(
		&self,
		value: &'a str,
		kind: &'static str,
	) -> Result<&'a str, IdentifierError> {
		validate_sql_identifier(value, kind)?;
		Ok(value)
	}

	/// `[schema].[object]` with the configured table prefix applied to the object.
	pub fn qualified_name(
		&self,
		schema: &str,
		object_name: &str,
	) -> Result<String, IdentifierError> {
		let physical = self.settings.physical_object_name(schema, object_name);
		Ok(format!(
			"{}.{}",
			self.quote_identifier(schema, "schema")?,
			self.quote_identifier(&physical, "object")?
		))
	}

	pub fn target_name(&self, target: &ObjectTarget) -> Result<String, IdentifierError> {
		self.qualified_name(target.schema_name(), target.object_name())
	}

	/// Quotes a caller-written `schema.object` (or bare `object`) reference.
	pub fn qualify_dotted(&self, name: &str) -> Result<String, IdentifierError> {
		match name.split_once('.') {
			Some((schema, object)) => self.qualified_name(schema, object),
			None => self.quote_identifier(name, "object"),
		}
	}

	/// `[a], [b], [c]`
	pub fn format_column_list<S: AsRef<str>>(
		&self,
		columns: &[S],
	) -> Result<String, IdentifierError> {
		let quoted = columns
			.iter()
			.map(|column| self.quote_identifier(column.as_ref(), "column"))
			.collect::<Result<Vec<_>, _>>()?;
		Ok(quoted.join(", "))
	}

	/// `[a] = 1, [b] = 'x'`, each column preceded by `qualifier` (e.g. `"target."`).
	pub fn format_assignments(
		&self,
		assignments: &IndexMap<String, SqlValue>,
		qualifier: &str,
	) -> Result<String, IdentifierError> {
		let rendered = assignments
			.iter()
			.map(|(column, value)| {
				Ok(format!(
					"{qualifier}{} = {}",
					self.quote_identifier(column, "column")?,
					value.to_sql()
				))
			})
			.collect::<Result<Vec<_>, IdentifierError>>()?;
		Ok(rendered.join(", "))
	}

	pub fn quote_string(&self, value: &str) -> String {
		quote_string_literal(value)
	}

	/// Both platforms only build single-column statistics.
	pub fn validate_statistics_columns(
		&self,
		stats: &CreateStatistics,
	) -> Result<(), QueryBuildError> {
		let object = stats.target().full_object_name();
		match stats.columns() {
			[] => Err(QueryBuildError::Statistics {
				object,
				reason: "No columns specified. Statistics operations require exactly one column."
					.to_string(),
			}),
			[_] => Ok(()),
			columns => Err(QueryBuildError::Statistics {
				object,
				reason: format!(
					"Multiple columns specified ({}). Both Synapse and Fabric only support single-column statistics. Create separate statistics for each column.",
					columns.join(", ")
				),
			}),
		}
	}

	/// Quoted statistics name: the explicit one, or `stat_{object}_{column}`.
	pub fn stats_name(&self, stats: &CreateStatistics) -> Result<String, IdentifierError> {
		match stats.stats_name() {
			Some(name) => self.quote_identifier(name, "statistics"),
			None => {
				let column = stats.columns().first().map(String::as_str).unwrap_or_default();
				self.quote_identifier(
					&format!("stat_{}_{column}", stats.target().object_name()),
					"statistics",
				)
			}
		}
	}

	/// Rejects `sql` when it matches any entry of `patterns`.
	pub fn check_raw_sql(
		&self,
		sql: &str,
		patterns: &[DenyPattern],
	) -> Result<(), QueryBuildError> {
		match patterns.iter().find(|(_, regex)| regex.is_match(sql)) {
			Some((name, _)) => {
				tracing::warn!(pattern = %name, "rejected raw SQL");
				Err(QueryBuildError::UnsafeSql { pattern: *name })
			}
			None => Ok(()),
		}
	}

	/// T-SQL `SELECT`: `TOP n` for a bare limit, `OFFSET .. FETCH NEXT` once an
	/// offset is involved.
	pub fn render_select(&self, select: &Select) -> Result<String, QueryBuildError> {
		let mut sql = String::from("SELECT");
		if select.is_distinct() {
			sql.push_str(" DISTINCT");
		}
		if let (Some(limit), None) = (select.limit(), select.offset()) {
			sql.push_str(&format!(" TOP {limit}"));
		}

		let columns = if select.columns().is_empty() {
			"*".to_string()
		} else {
			self.format_column_list(select.columns())?
		};
		sql.push_str(&format!(" {columns} FROM {}", self.target_name(select.target())?));

		if let Some(join) = select.join_clause() {
			sql.push_str(&format!(" {join}"));
		}
		if let Some(condition) = select.where_clause() {
			sql.push_str(&format!(" WHERE {condition}"));
		}
		if !select.group_by().is_empty() {
			sql.push_str(&format!(" GROUP BY {}", self.format_column_list(select.group_by())?));
			if let Some(having) = select.having() {
				sql.push_str(&format!(" HAVING {having}"));
			}
		}

		if !select.order_by().is_empty() {
			sql.push_str(&format!(" ORDER BY {}", select.order_by().join(", ")));
		} else if select.offset().is_some() {
			// OFFSET requires an ORDER BY in T-SQL
			sql.push_str(" ORDER BY (SELECT NULL)");
		}

		if let Some(offset) = select.offset() {
			sql.push_str(&format!(" OFFSET {offset} ROWS"));
			if let Some(limit) = select.limit() {
				sql.push_str(&format!(" FETCH NEXT {limit} ROWS ONLY"));
			}
		}

		Ok(sql)
	}

	/// Screens raw SQL and applies the row limit to result-returning `SELECT`s.
	pub fn render_execute_sql(
		&self,
		exec: &ExecuteSql,
		patterns: &[DenyPattern],
	) -> Result<String, QueryBuildError> {
		let sql = exec.sql().trim();
		self.check_raw_sql(sql, patterns)?;

		if exec.returns_results()
			&& let Some(limit) = exec.limit()
			&& sql.to_uppercase().starts_with("SELECT")
		{
			return Ok(format!("SELECT TOP {limit} * FROM ({sql}) AS limited_results"));
		}

		Ok(sql.to_string())
	}
}
