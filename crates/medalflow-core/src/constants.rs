//! Closed vocabularies shared across the workspace.
//!
//! Every enum here has a fixed wire spelling (used by serde, `Display` and
//! `FromStr`). Parsing and deserialization are case-insensitive so that
//! values coming from settings files or environment variables do not need
//! exact casing.

use serde::{Deserialize, Deserializer, Serialize, de};
use std::fmt;
use std::str::FromStr;

/// Maximum length of any schema, object or column identifier.
pub const MAX_IDENTIFIER_LENGTH: usize = 128;

/// Schemas whose tables never receive the configured table prefix.
pub const DEFAULT_SKIP_PREFIX_SCHEMAS: [&str; 3] = ["dbo", "gold", "snapshot"];

/// Error returned when a string does not name a variant of a vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown {kind} '{value}'")]
pub struct UnknownVariant {
	pub kind: &'static str,
	pub value: String,
}

macro_rules! closed_vocabulary {
	(
		$(#[$meta:meta])*
		$name:ident ($kind:literal) {
			$($(#[$vmeta:meta])* $variant:ident => $wire:literal),+ $(,)?
		}
	) => {
		$(#[$meta])*
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
		pub enum $name {
			$(
				$(#[$vmeta])*
				#[serde(rename = $wire)]
				$variant,
			)+
		}

		impl $name {
			/// All variants in declaration order.
			pub const ALL: &'static [$name] = &[$($name::$variant),+];

			/// Wire spelling of this variant.
			pub const fn as_str(&self) -> &'static str {
				match self {
					$($name::$variant => $wire,)+
				}
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				f.write_str(self.as_str())
			}
		}

		impl FromStr for $name {
			type Err = UnknownVariant;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				let trimmed = s.trim();
				$(
					if trimmed.eq_ignore_ascii_case($wire) {
						return Ok($name::$variant);
					}
				)+
				Err(UnknownVariant {
					kind: $kind,
					value: s.to_string(),
				})
			}
		}

		impl<'de> Deserialize<'de> for $name {
			fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
			where
				D: Deserializer<'de>,
			{
				let raw = String::deserialize(deserializer)?;
				raw.parse().map_err(de::Error::custom)
			}
		}
	};
}

closed_vocabulary! {
	/// Kind of SQL statement an operation represents.
	QueryType("query type") {
		Select => "SELECT",
		Insert => "INSERT",
		Update => "UPDATE",
		Delete => "DELETE",
		Merge => "MERGE",
		Copy => "COPY",
		Truncate => "TRUNCATE",
		CreateTable => "CREATE_TABLE",
		DropTable => "DROP_TABLE",
		CreateOrAlterView => "CREATE_OR_ALTER_VIEW",
		DropView => "DROP_VIEW",
		CreateSchema => "CREATE_SCHEMA",
		DropSchema => "DROP_SCHEMA",
		Alter => "ALTER",
		CreateStatistics => "CREATE_STATISTICS",
		DropStatistics => "DROP_STATISTICS",
		ExecuteSql => "EXECUTE_SQL",
		Unknown => "UNKNOWN",
	}
}

impl QueryType {
	/// Returns `true` for statements that change schema objects.
	pub const fn is_ddl(&self) -> bool {
		matches!(
			self,
			QueryType::CreateTable
				| QueryType::DropTable
				| QueryType::CreateOrAlterView
				| QueryType::DropView
				| QueryType::CreateSchema
				| QueryType::DropSchema
				| QueryType::Alter
				| QueryType::Truncate
				| QueryType::CreateStatistics
				| QueryType::DropStatistics
		)
	}

	/// Returns `true` for statements that read or change table data.
	pub const fn is_dml(&self) -> bool {
		matches!(
			self,
			QueryType::Select
				| QueryType::Insert
				| QueryType::Update
				| QueryType::Delete
				| QueryType::Merge
				| QueryType::Copy
		)
	}
}

closed_vocabulary! {
	/// Medallion layer a schema belongs to.
	Layer("layer") {
		Bronze => "bronze",
		Silver => "silver",
		Gold => "gold",
		Temp => "temp",
		Staging => "staging",
		Snapshot => "snapshot",
		Archive => "archive",
		Dbo => "dbo",
	}
}

closed_vocabulary! {
	/// Target warehouse platform.
	ComputeType("compute type") {
		Synapse => "synapse",
		Fabric => "fabric",
	}
}

impl Default for ComputeType {
	fn default() -> Self {
		ComputeType::Synapse
	}
}

closed_vocabulary! {
	/// Which environment a pipeline step runs in.
	ComputeEnvironment("compute environment") {
		Etl => "etl",
		Consumption => "consumption",
	}
}

closed_vocabulary! {
	/// Engine preference for executing an operation.
	EngineType("engine type") {
		Sql => "sql",
		Spark => "spark",
		Auto => "auto",
	}
}

impl Default for EngineType {
	fn default() -> Self {
		EngineType::Auto
	}
}

closed_vocabulary! {
	ExecutionMode("execution mode") {
		Sequential => "SEQUENTIAL",
		Parallel => "PARALLEL",
	}
}

impl Default for ExecutionMode {
	fn default() -> Self {
		ExecutionMode::Sequential
	}
}

closed_vocabulary! {
	LakeType("lake type") {
		Processed => "processed",
		Internal => "internal",
	}
}

closed_vocabulary! {
	ValidationLevel("validation level") {
		Error => "error",
		Warning => "warning",
		Info => "info",
	}
}

closed_vocabulary! {
	/// Shape in which an `ExecuteSql` result is handed back to the caller.
	ResultFormat("result format") {
		Dataframe => "dataframe",
		DictList => "dict_list",
		Scalar => "scalar",
	}
}

impl Default for ResultFormat {
	fn default() -> Self {
		ResultFormat::Dataframe
	}
}

closed_vocabulary! {
	/// Whether an insert appends to or replaces the target's rows.
	InsertMode("insert mode") {
		Append => "append",
		Overwrite => "overwrite",
	}
}

impl Default for InsertMode {
	fn default() -> Self {
		InsertMode::Append
	}
}

closed_vocabulary! {
	/// Storage format of lake files.
	FileFormat("file format") {
		Parquet => "parquet",
		Csv => "csv",
		Delta => "delta",
		Json => "json",
	}
}

impl Default for FileFormat {
	fn default() -> Self {
		FileFormat::Parquet
	}
}
