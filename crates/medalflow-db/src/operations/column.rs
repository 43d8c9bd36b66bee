use super::value::SqlValue;
use medalflow_core::validators::{validate_column_name, validate_object_identifier};
use medalflow_core::ValidationError;
use serde::Serialize;

/// Column of a table created by [`CreateTable`](super::CreateTable).
///
/// `data_type` is an opaque, platform-specific type string (`NVARCHAR(100)`,
/// `DECIMAL(18, 2)`, ...) rendered verbatim; choosing one that the target
/// platform accepts is the caller's responsibility. The same holds for
/// `check_constraint` and `computed_expression`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDefinition {
	name: String,
	data_type: String,
	nullable: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	default_value: Option<SqlValue>,
	primary_key: bool,
	unique: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	check_constraint: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	collation: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	computed_expression: Option<String>,
}

impl ColumnDefinition {
	/// Nullable column with no constraints.
	///
	/// # Examples
	///
	/// ```
	/// use medalflow_db::ColumnDefinition;
	///
	/// let column = ColumnDefinition::new("customer_id", "INT").unwrap().not_null();
	/// assert!(!column.nullable());
	///
	/// assert!(ColumnDefinition::new("2bad", "INT").is_err());
	/// assert!(ColumnDefinition::new("ok", " ").is_err());
	/// ```
	pub fn new(
		name: impl Into<String>,
		data_type: impl Into<String>,
	) -> Result<Self, ValidationError> {
		let name = name.into();
		let data_type = data_type.into();

		validate_column_name(&name).map_err(|e| ValidationError::identifier("name", e))?;
		if data_type.trim().is_empty() {
			return Err(ValidationError::EmptyField { field: "data_type" });
		}

		Ok(Self {
			name,
			data_type,
			nullable: true,
			default_value: None,
			primary_key: false,
			unique: false,
			check_constraint: None,
			collation: None,
			computed_expression: None,
		})
	}

	pub fn not_null(mut self) -> Self {
		self.nullable = false;
		self
	}

	pub fn with_nullable(mut self, nullable: bool) -> Self {
		self.nullable = nullable;
		self
	}

	pub fn primary_key(mut self) -> Self {
		self.primary_key = true;
		self
	}

	pub fn unique(mut self) -> Self {
		self.unique = true;
		self
	}

	pub fn with_check_constraint(mut self, check: impl Into<String>) -> Self {
		self.check_constraint = Some(check.into());
		self
	}

	pub fn with_collation(mut self, collation: impl Into<String>) -> Result<Self, ValidationError> {
		let collation = collation.into();
		validate_object_identifier(&collation, "collation")
			.map_err(|e| ValidationError::identifier("collation", e))?;
		self.collation = Some(collation);
		Ok(self)
	}

	pub fn with_default_value(
		mut self,
		value: impl Into<SqlValue>,
	) -> Result<Self, ValidationError> {
		self.default_value = Some(value.into());
		self.validate()?;
		Ok(self)
	}

	pub fn with_computed_expression(
		mut self,
		expression: impl Into<String>,
	) -> Result<Self, ValidationError> {
		let expression = expression.into();
		if expression.trim().is_empty() {
			return Err(ValidationError::EmptyField {
				field: "computed_expression",
			});
		}
		self.computed_expression = Some(expression);
		self.validate()?;
		Ok(self)
	}

	/// Checks the cross-field rules of a column.
	pub fn validate(&self) -> Result<(), ValidationError> {
		if self.computed_expression.is_some() && self.default_value.is_some() {
			return Err(ValidationError::Conflict {
				fields: &["computed_expression", "default_value"],
				message: "Computed columns cannot have default values".to_string(),
			});
		}
		Ok(())
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn data_type(&self) -> &str {
		&self.data_type
	}

	pub fn nullable(&self) -> bool {
		self.nullable
	}

	pub fn default_value(&self) -> Option<&SqlValue> {
		self.default_value.as_ref()
	}

	pub fn is_primary_key(&self) -> bool {
		self.primary_key
	}

	pub fn is_unique(&self) -> bool {
		self.unique
	}

	pub fn check_constraint(&self) -> Option<&str> {
		self.check_constraint.as_deref()
	}

	pub fn collation(&self) -> Option<&str> {
		self.collation.as_deref()
	}

	pub fn computed_expression(&self) -> Option<&str> {
		self.computed_expression.as_deref()
	}
}
