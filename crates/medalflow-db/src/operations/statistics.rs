//! `CREATE STATISTICS` and the resolution of its column list.

use super::target::ObjectTarget;
use crate::stats::{StatsColumnProvider, discover_statistics_columns};
use medalflow_core::ValidationError;
use medalflow_core::validators::{validate_column_name, validate_object_identifier};
use serde::Serialize;

/// A `CREATE STATISTICS` operation whose column list is settled.
///
/// Only obtainable through [`CreateStatisticsSpec::resolve`], so a value of
/// this type always carries at least one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateStatistics {
	#[serde(flatten)]
	target: ObjectTarget,
	columns: Vec<String>,
	sample_percent: Option<f64>,
	with_fullscan: bool,
	stats_name: Option<String>,
	auto_discover: bool,
}

impl CreateStatistics {
	/// Starts an unresolved statistics operation on `target`.
	///
	/// # Examples
	///
	/// ```
	/// use medalflow_db::{CreateStatistics, ObjectTarget, QueryMetadata};
	///
	/// let target = ObjectTarget::new("silver", "customers")
	///     .unwrap()
	///     .with_metadata(QueryMetadata::new().with_stats_columns(["customer_id"]));
	///
	/// let stats = CreateStatistics::builder(target).resolve(None).unwrap();
	/// assert_eq!(stats.columns(), ["customer_id"]);
	/// ```
	pub fn builder(target: ObjectTarget) -> CreateStatisticsSpec {
		CreateStatisticsSpec::new(target)
	}

	pub fn target(&self) -> &ObjectTarget {
		&self.target
	}

	pub fn columns(&self) -> &[String] {
		&self.columns
	}

	pub fn sample_percent(&self) -> Option<f64> {
		self.sample_percent
	}

	pub fn with_fullscan(&self) -> bool {
		self.with_fullscan
	}

	pub fn stats_name(&self) -> Option<&str> {
		self.stats_name.as_deref()
	}

	pub fn auto_discover(&self) -> bool {
		self.auto_discover
	}
}

/// Unresolved [`CreateStatistics`]: columns may still be empty and be
/// discovered on [`resolve`](Self::resolve).
#[derive(Debug, Clone, PartialEq)]
pub struct CreateStatisticsSpec {
	target: ObjectTarget,
	columns: Vec<String>,
	sample_percent: Option<f64>,
	with_fullscan: bool,
	stats_name: Option<String>,
	auto_discover: bool,
}

impl CreateStatisticsSpec {
	pub fn new(target: ObjectTarget) -> Self {
		Self {
			target,
			columns: Vec::new(),
			sample_percent: None,
			with_fullscan: true,
			stats_name: None,
			auto_discover: true,
		}
	}

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

	/// Sampling rate in percent, fractions allowed. Requires
	/// `with_fullscan(false)`, since full scans are the default.
	pub fn with_sample_percent(mut self, percent: f64) -> Result<Self, ValidationError> {
		if !(0.0..=100.0).contains(&percent) {
			return Err(ValidationError::OutOfRange {
				field: "sample_percent",
				expected: "between 0 and 100",
				actual: percent.to_string(),
			});
		}
		self.sample_percent = Some(percent);
		self.validate_sampling()?;
		Ok(self)
	}

	pub fn with_fullscan(mut self, fullscan: bool) -> Result<Self, ValidationError> {
		self.with_fullscan = fullscan;
		self.validate_sampling()?;
		Ok(self)
	}

	pub fn with_stats_name(mut self, name: impl Into<String>) -> Result<Self, ValidationError> {
		let name = name.into();
		validate_object_identifier(&name, "statistics")
			.map_err(|e| ValidationError::identifier("stats_name", e))?;
		self.stats_name = Some(name);
		Ok(self)
	}

	pub fn with_auto_discover(mut self, auto_discover: bool) -> Self {
		self.auto_discover = auto_discover;
		self
	}

	pub fn target(&self) -> &ObjectTarget {
		&self.target
	}

	fn validate_sampling(&self) -> Result<(), ValidationError> {
		if self.sample_percent.is_some() && self.with_fullscan {
			return Err(ValidationError::Conflict {
				fields: &["sample_percent", "with_fullscan"],
				message: "Cannot specify both sample_percent and with_fullscan".to_string(),
			});
		}
		Ok(())
	}

	/// Settles the column list.
	///
	/// Explicit columns win. Otherwise, when `auto_discover` is set, the
	/// target's metadata and then `provider` are consulted. Discovery
	/// failures are logged by [`discover_statistics_columns`]; only an empty
	/// final list is an error.
	pub fn resolve(
		self,
		provider: Option<&dyn StatsColumnProvider>,
	) -> Result<CreateStatistics, ValidationError> {
		self.validate_sampling()?;

		let columns = if !self.columns.is_empty() {
			self.columns
		} else if self.auto_discover {
			discover_statistics_columns(&self.target, provider)
		} else {
			Vec::new()
		};

		if columns.is_empty() {
			return Err(ValidationError::NoStatisticsColumns {
				object: self.target.full_object_name(),
			});
		}
		for column in &columns {
			validate_column_name(column).map_err(|e| ValidationError::identifier("columns", e))?;
		}

		Ok(CreateStatistics {
			target: self.target,
			columns,
			sample_percent: self.sample_percent,
			with_fullscan: self.with_fullscan,
			stats_name: self.stats_name,
			auto_discover: self.auto_discover,
		})
	}
}
