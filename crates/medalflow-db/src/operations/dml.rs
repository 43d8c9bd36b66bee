//! Query and data-modification operations.

use super::target::ObjectTarget;
use super::value::SqlValue;
use indexmap::IndexMap;
use medalflow_core::validators::validate_column_name;
use medalflow_core::{InsertMode, QueryType, ValidationError};
use serde::{Deserialize, Serialize};

fn validate_columns<'a>(
	field: &'static str,
	columns: impl IntoIterator<Item = &'a String>,
) -> Result<(), ValidationError> {
	for column in columns {
		validate_column_name(column).map_err(|e| ValidationError::identifier(field, e))?;
	}
	Ok(())
}

fn collect_strings<I, S>(items: I) -> Vec<String>
where
	I: IntoIterator<Item = S>,
	S: Into<String>,
{
	items.into_iter().map(Into::into).collect()
}

/// `SELECT` from the target object.
///
/// `where_clause`, `join_clause`, `having` and `order_by` are trusted SQL
/// fragments. Column lists are validated identifiers; an empty list selects `*`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Select {
	#[serde(flatten)]
	target: ObjectTarget,
	columns: Vec<String>,
	distinct: bool,
	where_clause: Option<String>,
	join_clause: Option<String>,
	group_by: Vec<String>,
	having: Option<String>,
	order_by: Vec<String>,
	limit: Option<u64>,
	offset: Option<u64>,
}

impl Select {
	pub fn new(target: ObjectTarget) -> Self {
		Self {
			target,
			columns: Vec::new(),
			distinct: false,
			where_clause: None,
			join_clause: None,
			group_by: Vec::new(),
			having: None,
			order_by: Vec::new(),
			limit: None,
			offset: None,
		}
	}

	pub fn with_columns<I, S>(mut self, columns: I) -> Result<Self, ValidationError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let columns = collect_strings(columns);
		validate_columns("columns", &columns)?;
		self.columns = columns;
		Ok(self)
	}

	pub fn distinct(mut self) -> Self {
		self.distinct = true;
		self
	}

	pub fn with_where(mut self, condition: impl Into<String>) -> Self {
		self.where_clause = Some(condition.into());
		self
	}

	pub fn with_join(mut self, join: impl Into<String>) -> Self {
		self.join_clause = Some(join.into());
		self
	}

	pub fn with_group_by<I, S>(mut self, columns: I) -> Result<Self, ValidationError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let columns = collect_strings(columns);
		validate_columns("group_by", &columns)?;
		self.group_by = columns;
		Ok(self)
	}

	/// Requires a prior [`with_group_by`](Self::with_group_by).
	pub fn with_having(mut self, condition: impl Into<String>) -> Result<Self, ValidationError> {
		if self.group_by.is_empty() {
			return Err(ValidationError::Conflict {
				fields: &["having", "group_by"],
				message: "HAVING clause requires GROUP BY".to_string(),
			});
		}
		self.having = Some(condition.into());
		Ok(self)
	}

	/// Order expressions such as `"created_at DESC"`.
	pub fn with_order_by<I, S>(mut self, expressions: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.order_by = collect_strings(expressions);
		self
	}

	pub fn with_limit(mut self, limit: u64) -> Result<Self, ValidationError> {
		if limit == 0 {
			return Err(ValidationError::OutOfRange {
				field: "limit",
				expected: "a positive integer",
				actual: limit.to_string(),
			});
		}
		self.limit = Some(limit);
		Ok(self)
	}

	pub fn with_offset(mut self, offset: u64) -> Self {
		self.offset = Some(offset);
		self
	}

	pub fn target(&self) -> &ObjectTarget {
		&self.target
	}

	pub fn columns(&self) -> &[String] {
		&self.columns
	}

	pub fn is_distinct(&self) -> bool {
		self.distinct
	}

	pub fn where_clause(&self) -> Option<&str> {
		self.where_clause.as_deref()
	}

	pub fn join_clause(&self) -> Option<&str> {
		self.join_clause.as_deref()
	}

	pub fn group_by(&self) -> &[String] {
		&self.group_by
	}

	pub fn having(&self) -> Option<&str> {
		self.having.as_deref()
	}

	pub fn order_by(&self) -> &[String] {
		&self.order_by
	}

	pub fn limit(&self) -> Option<u64> {
		self.limit
	}

	pub fn offset(&self) -> Option<u64> {
		self.offset
	}
}

/// Where inserted rows come from. Exactly one source per insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertSource {
	/// Trusted `SELECT` text.
	Query(String),
	/// Literal rows, every row carrying the same columns.
	Values(Vec<IndexMap<String, SqlValue>>),
}

/// `INSERT INTO` (or `INSERT OVERWRITE`) the target table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insert {
	#[serde(flatten)]
	target: ObjectTarget,
	source: InsertSource,
	columns: Vec<String>,
	mode: InsertMode,
}

impl Insert {
	pub fn new(target: ObjectTarget, source: InsertSource) -> Result<Self, ValidationError> {
		match &source {
			InsertSource::Query(query) if query.trim().is_empty() => {
				return Err(Self::missing_source());
			}
			InsertSource::Values(rows) => {
				let Some(first) = rows.first() else {
					return Err(Self::missing_source());
				};
				validate_columns("values", first.keys())?;
				if rows
					.iter()
					.any(|row| row.len() != first.len() || !first.keys().all(|key| row.contains_key(key)))
				{
					return Err(ValidationError::Conflict {
						fields: &["values"],
						message: "All value rows must have the same columns".to_string(),
					});
				}
			}
			InsertSource::Query(_) => {}
		}

		Ok(Self {
			target,
			source,
			columns: Vec::new(),
			mode: InsertMode::default(),
		})
	}

	pub fn from_query(
		target: ObjectTarget,
		query: impl Into<String>,
	) -> Result<Self, ValidationError> {
		Self::new(target, InsertSource::Query(query.into()))
	}

	pub fn from_values(
		target: ObjectTarget,
		rows: Vec<IndexMap<String, SqlValue>>,
	) -> Result<Self, ValidationError> {
		Self::new(target, InsertSource::Values(rows))
	}

	fn missing_source() -> ValidationError {
		ValidationError::Incomplete {
			operation: QueryType::Insert,
			message: "Insert requires exactly one data source: source_query or values".to_string(),
		}
	}

	/// Explicit target column list. With literal rows, every listed column
	/// must be present in the rows.
	pub fn with_columns<I, S>(mut self, columns: I) -> Result<Self, ValidationError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let columns = collect_strings(columns);
		validate_columns("columns", &columns)?;
		if let InsertSource::Values(rows) = &self.source
			&& let Some(missing) = columns.iter().find(|c| !rows[0].contains_key(*c))
		{
			return Err(ValidationError::Conflict {
				fields: &["columns", "values"],
				message: format!("Column '{missing}' is not present in the value rows"),
			});
		}
		self.columns = columns;
		Ok(self)
	}

	pub fn with_mode(mut self, mode: InsertMode) -> Self {
		self.mode = mode;
		self
	}

	pub fn target(&self) -> &ObjectTarget {
		&self.target
	}

	pub fn source(&self) -> &InsertSource {
		&self.source
	}

	pub fn columns(&self) -> &[String] {
		&self.columns
	}

	/// Columns to list in the statement: the explicit list, or the keys of
	/// the first value row.
	pub fn effective_columns(&self) -> Vec<&str> {
		if !self.columns.is_empty() {
			return self.columns.iter().map(String::as_str).collect();
		}
		match &self.source {
			InsertSource::Values(rows) => rows
				.first()
				.map(|row| row.keys().map(String::as_str).collect())
				.unwrap_or_default(),
			InsertSource::Query(_) => Vec::new(),
		}
	}

	pub fn mode(&self) -> InsertMode {
		self.mode
	}
}

/// `UPDATE` the target table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Update {
	#[serde(flatten)]
	target: ObjectTarget,
	set_columns: IndexMap<String, SqlValue>,
	where_clause: Option<String>,
	from_clause: Option<String>,
}

impl Update {
	pub fn new(
		target: ObjectTarget,
		set_columns: IndexMap<String, SqlValue>,
	) -> Result<Self, ValidationError> {
		if set_columns.is_empty() {
			return Err(ValidationError::EmptyField { field: "set_columns" });
		}
		validate_columns("set_columns", set_columns.keys())?;
		Ok(Self {
			target,
			set_columns,
			where_clause: None,
			from_clause: None,
		})
	}

	pub fn with_where(mut self, condition: impl Into<String>) -> Self {
		self.where_clause = Some(condition.into());
		self
	}

	pub fn with_from(mut self, from: impl Into<String>) -> Self {
		self.from_clause = Some(from.into());
		self
	}

	pub fn target(&self) -> &ObjectTarget {
		&self.target
	}

	pub fn set_columns(&self) -> &IndexMap<String, SqlValue> {
		&self.set_columns
	}

	pub fn where_clause(&self) -> Option<&str> {
		self.where_clause.as_deref()
	}

	pub fn from_clause(&self) -> Option<&str> {
		self.from_clause.as_deref()
	}
}

/// `DELETE FROM` the target table. Without a condition every row is removed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Delete {
	#[serde(flatten)]
	target: ObjectTarget,
	where_clause: Option<String>,
}

impl Delete {
	pub fn new(target: ObjectTarget) -> Self {
		Self {
			target,
			where_clause: None,
		}
	}

	pub fn with_where(mut self, condition: impl Into<String>) -> Self {
		self.where_clause = Some(condition.into());
		self
	}

	pub fn target(&self) -> &ObjectTarget {
		&self.target
	}

	pub fn where_clause(&self) -> Option<&str> {
		self.where_clause.as_deref()
	}
}

/// Actions of a [`Merge`]. Values are SQL expressions, typically
/// [`SqlValue::Expression`]s referring to `source`.
///
/// `when_matched_delete` is the search condition under which matched rows
/// are deleted (`WHEN MATCHED AND {condition} THEN DELETE`).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MergeActions {
	pub when_matched_update: Option<IndexMap<String, SqlValue>>,
	pub when_matched_delete: Option<String>,
	pub when_not_matched_insert: Option<IndexMap<String, SqlValue>>,
	pub when_not_matched_by_source_update: Option<IndexMap<String, SqlValue>>,
	pub when_not_matched_by_source_delete: bool,
}

impl MergeActions {
	fn is_empty(&self) -> bool {
		self.when_matched_update.is_none()
			&& self.when_matched_delete.is_none()
			&& self.when_not_matched_insert.is_none()
			&& self.when_not_matched_by_source_update.is_none()
			&& !self.when_not_matched_by_source_delete
	}
}

/// `MERGE INTO` the target from a source query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Merge {
	#[serde(flatten)]
	target: ObjectTarget,
	source_query: String,
	merge_condition: String,
	#[serde(flatten)]
	actions: MergeActions,
}

impl Merge {
	pub fn new(
		target: ObjectTarget,
		source_query: impl Into<String>,
		merge_condition: impl Into<String>,
		actions: MergeActions,
	) -> Result<Self, ValidationError> {
		let source_query = source_query.into();
		let merge_condition = merge_condition.into();

		if source_query.trim().is_empty() {
			return Err(ValidationError::EmptyField { field: "source_query" });
		}
		if merge_condition.trim().is_empty() {
			return Err(ValidationError::EmptyField {
				field: "merge_condition",
			});
		}
		if actions.is_empty() {
			return Err(ValidationError::Incomplete {
				operation: QueryType::Merge,
				message: "Merge requires at least one action to be specified".to_string(),
			});
		}
		if actions.when_not_matched_by_source_update.is_some()
			&& actions.when_not_matched_by_source_delete
		{
			return Err(ValidationError::Conflict {
				fields: &[
					"when_not_matched_by_source_update",
					"when_not_matched_by_source_delete",
				],
				message: "Cannot both update and delete rows not matched by source".to_string(),
			});
		}
		if let Some(condition) = &actions.when_matched_delete
			&& condition.trim().is_empty()
		{
			return Err(ValidationError::EmptyField {
				field: "when_matched_delete",
			});
		}
		for (field, assignments) in [
			("when_matched_update", &actions.when_matched_update),
			("when_not_matched_insert", &actions.when_not_matched_insert),
			(
				"when_not_matched_by_source_update",
				&actions.when_not_matched_by_source_update,
			),
		] {
			if let Some(assignments) = assignments {
				if assignments.is_empty() {
					return Err(ValidationError::EmptyField { field });
				}
				validate_columns(field, assignments.keys())?;
			}
		}

		Ok(Self {
			target,
			source_query,
			merge_condition,
			actions,
		})
	}

	pub fn target(&self) -> &ObjectTarget {
		&self.target
	}

	pub fn source_query(&self) -> &str {
		&self.source_query
	}

	pub fn merge_condition(&self) -> &str {
		&self.merge_condition
	}

	pub fn actions(&self) -> &MergeActions {
		&self.actions
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::{fixture, rstest};

	#[fixture]
	fn target() -> ObjectTarget {
		ObjectTarget::new("silver", "orders").unwrap()
	}

	fn row(pairs: &[(&str, SqlValue)]) -> IndexMap<String, SqlValue> {
		pairs
			.iter()
			.map(|(k, v)| (k.to_string(), v.clone()))
			.collect()
	}

	#[rstest]
	fn test_having_requires_group_by(target: ObjectTarget) {
		let err = Select::new(target.clone()).with_having("COUNT(*) > 1").unwrap_err();
		assert_eq!(err.to_string(), "HAVING clause requires GROUP BY");

		let select = Select::new(target)
			.with_group_by(["customer_id"])
			.unwrap()
			.with_having("COUNT(*) > 1")
			.unwrap();
		assert_eq!(select.having(), Some("COUNT(*) > 1"));
	}

	#[rstest]
	fn test_select_limit_must_be_positive(target: ObjectTarget) {
		let err = Select::new(target).with_limit(0).unwrap_err();

		assert_eq!(err.field(), Some("limit"));
	}

	#[rstest]
	fn test_select_rejects_unsafe_column(target: ObjectTarget) {
		assert!(Select::new(target).with_columns(["id", "name; DROP"]).is_err());
	}

	#[rstest]
	#[case::blank_query(InsertSource::Query("  ".into()))]
	#[case::no_rows(InsertSource::Values(vec![]))]
	fn test_insert_requires_a_source(target: ObjectTarget, #[case] source: InsertSource) {
		let err = Insert::new(target, source).unwrap_err();

		assert_eq!(
			err.to_string(),
			"Insert requires exactly one data source: source_query or values"
		);
	}

	#[rstest]
	fn test_insert_rows_must_share_columns(target: ObjectTarget) {
		let rows = vec![
			row(&[("id", 1.into()), ("name", "a".into())]),
			row(&[("id", 2.into()), ("email", "b".into())]),
		];

		assert!(matches!(
			Insert::from_values(target, rows),
			Err(ValidationError::Conflict { .. })
		));
	}

	#[rstest]
	fn test_insert_columns_must_exist_in_rows(target: ObjectTarget) {
		let insert = Insert::from_values(target, vec![row(&[("id", 1.into())])]).unwrap();

		assert_eq!(insert.effective_columns(), vec!["id"]);
		assert!(insert.clone().with_columns(["id"]).is_ok());
		assert!(insert.with_columns(["name"]).is_err());
	}

	#[rstest]
	fn test_update_requires_assignments(target: ObjectTarget) {
		let err = Update::new(target, IndexMap::new()).unwrap_err();

		assert_eq!(err.to_string(), "set_columns cannot be empty");
	}

	#[rstest]
	fn test_merge_requires_an_action(target: ObjectTarget) {
		let err = Merge::new(
			target,
			"SELECT * FROM bronze.orders",
			"target.id = source.id",
			MergeActions::default(),
		)
		.unwrap_err();

		assert_eq!(err.to_string(), "Merge requires at least one action to be specified");
	}

	#[rstest]
	fn test_merge_by_source_actions_are_exclusive(target: ObjectTarget) {
		let actions = MergeActions {
			when_not_matched_by_source_update: Some(row(&[("active", false.into())])),
			when_not_matched_by_source_delete: true,
			..MergeActions::default()
		};

		let err = Merge::new(target, "SELECT 1", "target.id = source.id", actions).unwrap_err();

		assert_eq!(err.code(), "VALIDATION_004");
	}

	#[rstest]
	fn test_merge_validates_assignment_columns(target: ObjectTarget) {
		let actions = MergeActions {
			when_matched_update: Some(row(&[("bad col", SqlValue::expr("source.x"))])),
			..MergeActions::default()
		};

		let err = Merge::new(target, "SELECT 1", "target.id = source.id", actions).unwrap_err();

		assert_eq!(err.field(), Some("when_matched_update"));
	}

	#[rstest]
	#[case::matched_update(
		MergeActions { when_matched_update: Some(IndexMap::new()), ..MergeActions::default() },
		"when_matched_update"
	)]
	#[case::not_matched_insert(
		MergeActions { when_not_matched_insert: Some(IndexMap::new()), ..MergeActions::default() },
		"when_not_matched_insert"
	)]
	#[case::by_source_update(
		MergeActions {
			when_not_matched_by_source_update: Some(IndexMap::new()),
			..MergeActions::default()
		},
		"when_not_matched_by_source_update"
	)]
	#[case::blank_delete_condition(
		MergeActions { when_matched_delete: Some("  ".to_string()), ..MergeActions::default() },
		"when_matched_delete"
	)]
	fn test_merge_rejects_empty_actions(
		target: ObjectTarget,
		#[case] actions: MergeActions,
		#[case] field: &str,
	) {
		// Act
		let err = Merge::new(target, "SELECT 1", "target.id = source.id", actions).unwrap_err();

		// Assert
		assert!(matches!(err, ValidationError::EmptyField { .. }), "unexpected error: {err}");
		assert_eq!(err.field(), Some(field));
	}

	#[rstest]
	fn test_merge_accepts_update_with_conditional_delete(target: ObjectTarget) {
		let actions = MergeActions {
			when_matched_update: Some(row(&[("status", SqlValue::expr("source.status"))])),
			when_matched_delete: Some("source.is_deleted = 1".to_string()),
			..MergeActions::default()
		};

		let merge = Merge::new(target, "SELECT 1", "target.id = source.id", actions).unwrap();

		assert_eq!(
			merge.actions().when_matched_delete.as_deref(),
			Some("source.is_deleted = 1")
		);
	}
}
