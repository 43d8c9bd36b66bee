use super::target::ObjectTarget;
use medalflow_core::ValidationError;
use medalflow_core::validators::validate_column_name;
use serde::Serialize;

/// `CREATE OR ALTER VIEW` (Synapse) / `CREATE OR REPLACE VIEW` (Fabric).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateOrAlterView {
	#[serde(flatten)]
	target: ObjectTarget,
	select_query: String,
	columns: Vec<String>,
	schemabinding: bool,
	materialized: bool,
	or_replace: bool,
}

impl CreateOrAlterView {
	pub fn new(
		target: ObjectTarget,
		select_query: impl Into<String>,
	) -> Result<Self, ValidationError> {
		let select_query = select_query.into();
		if select_query.trim().is_empty() {
			return Err(ValidationError::EmptyField { field: "select_query" });
		}
		Ok(Self {
			target,
			select_query,
			columns: Vec::new(),
			schemabinding: false,
			materialized: false,
			or_replace: true,
		})
	}

	/// Column aliases for the view.
	pub fn with_columns<I, S>(mut self, columns: I) -> Result<Self, ValidationError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
		for column in &columns {
			validate_column_name(column).map_err(|e| ValidationError::identifier("columns", e))?;
		}
		self.columns = columns;
		Ok(self)
	}

	pub fn with_schemabinding(mut self, schemabinding: bool) -> Self {
		self.schemabinding = schemabinding;
		self
	}

	pub fn with_materialized(mut self, materialized: bool) -> Self {
		self.materialized = materialized;
		self
	}

	pub fn with_or_replace(mut self, or_replace: bool) -> Self {
		self.or_replace = or_replace;
		self
	}

	pub fn target(&self) -> &ObjectTarget {
		&self.target
	}

	pub fn select_query(&self) -> &str {
		&self.select_query
	}

	pub fn columns(&self) -> &[String] {
		&self.columns
	}

	pub fn schemabinding(&self) -> bool {
		self.schemabinding
	}

	pub fn materialized(&self) -> bool {
		self.materialized
	}

	pub fn or_replace(&self) -> bool {
		self.or_replace
	}
}

/// `DROP VIEW`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DropView {
	#[serde(flatten)]
	target: ObjectTarget,
	if_exists: bool,
}

impl DropView {
	pub fn new(target: ObjectTarget) -> Self {
		Self {
			target,
			if_exists: true,
		}
	}

	pub fn with_if_exists(mut self, if_exists: bool) -> Self {
		self.if_exists = if_exists;
		self
	}

	pub fn target(&self) -> &ObjectTarget {
		&self.target
	}

	pub fn if_exists(&self) -> bool {
		self.if_exists
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_view_requires_select() {
		let target = ObjectTarget::new("gold", "v_customers").unwrap();

		let err = CreateOrAlterView::new(target, "").unwrap_err();

		assert_eq!(err.field(), Some("select_query"));
	}

	#[rstest]
	fn test_view_defaults() {
		let view = CreateOrAlterView::new(
			ObjectTarget::new("gold", "v_customers").unwrap(),
			"SELECT id FROM silver.customers",
		)
		.unwrap();

		assert!(view.or_replace());
		assert!(!view.schemabinding());
		assert!(!view.materialized());
		assert!(view.columns().is_empty());
	}
}
