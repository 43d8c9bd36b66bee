//! Execution hints that accompany an operation to a query builder.

use medalflow_core::{EngineType, ValidationError};
use serde::Serialize;

const COMPLEX_THRESHOLD: u8 = 7;
const SPARK_ROW_THRESHOLD: u64 = 10_000_000;

/// Hints about how an operation is expected to run.
///
/// Builders accept a context for logging; it never changes the rendered SQL.
/// Engine selection uses [`suggested_engine`](Self::suggested_engine).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryContext {
	engine_preference: EngineType,
	complexity_score: u8,
	estimated_rows: u64,
	has_complex_transformations: bool,
	timeout_seconds: Option<u64>,
}

impl Default for QueryContext {
	fn default() -> Self {
		Self {
			engine_preference: EngineType::Auto,
			complexity_score: 1,
			estimated_rows: 0,
			has_complex_transformations: false,
			timeout_seconds: None,
		}
	}
}

impl QueryContext {
	/// # Examples
	///
	/// ```
	/// use medalflow_core::EngineType;
	/// use medalflow_db::QueryContext;
	///
	/// let context = QueryContext::new(EngineType::Auto, 8).unwrap();
	/// assert!(context.is_complex());
	/// assert_eq!(context.suggested_engine(), EngineType::Spark);
	///
	/// assert!(QueryContext::new(EngineType::Auto, 11).is_err());
	/// ```
	pub fn new(
		engine_preference: EngineType,
		complexity_score: u8,
	) -> Result<Self, ValidationError> {
		Self::default()
			.with_engine_preference(engine_preference)
			.with_complexity_score(complexity_score)
	}

	pub fn with_engine_preference(mut self, engine: EngineType) -> Self {
		self.engine_preference = engine;
		self
	}

	pub fn with_complexity_score(mut self, score: u8) -> Result<Self, ValidationError> {
		if !(1..=10).contains(&score) {
			return Err(ValidationError::OutOfRange {
				field: "complexity_score",
				expected: "between 1 and 10",
				actual: score.to_string(),
			});
		}
		self.complexity_score = score;
		Ok(self)
	}

	pub fn with_estimated_rows(mut self, rows: u64) -> Self {
		self.estimated_rows = rows;
		self
	}

	pub fn with_complex_transformations(mut self, complex: bool) -> Self {
		self.has_complex_transformations = complex;
		self
	}

	pub fn with_timeout_seconds(mut self, seconds: u64) -> Result<Self, ValidationError> {
		if seconds == 0 {
			return Err(ValidationError::OutOfRange {
				field: "timeout_seconds",
				expected: "a positive number of seconds",
				actual: seconds.to_string(),
			});
		}
		self.timeout_seconds = Some(seconds);
		Ok(self)
	}

	pub fn engine_preference(&self) -> EngineType {
		self.engine_preference
	}

	pub fn complexity_score(&self) -> u8 {
		self.complexity_score
	}

	pub fn estimated_rows(&self) -> u64 {
		self.estimated_rows
	}

	pub fn has_complex_transformations(&self) -> bool {
		self.has_complex_transformations
	}

	pub fn timeout_seconds(&self) -> Option<u64> {
		self.timeout_seconds
	}

	pub fn is_complex(&self) -> bool {
		self.complexity_score >= COMPLEX_THRESHOLD || self.has_complex_transformations
	}

	/// Engine to run on. An explicit preference wins; `Auto` picks Spark for
	/// complex or large (over ten million rows) work.
	pub fn suggested_engine(&self) -> EngineType {
		match self.engine_preference {
			EngineType::Auto if self.is_complex() || self.estimated_rows > SPARK_ROW_THRESHOLD => {
				EngineType::Spark
			}
			EngineType::Auto => EngineType::Sql,
			explicit => explicit,
		}
	}
}
