//! The operation IR.
//!
//! Every [`Operation`] variant wraps a struct whose constructor validates it,
//! so a value of any variant describes a statement that can be rendered.

pub mod column;
pub mod copy;
pub mod ddl;
pub mod dml;
pub mod statistics;
pub mod target;
pub mod value;
pub mod views;

pub use column::ColumnDefinition;
pub use copy::{Copy, ExecuteSql};
pub use ddl::{CreateSchema, CreateTable, DropSchema, DropTable, TableDefinition};
pub use dml::{Delete, Insert, InsertSource, Merge, MergeActions, Select, Update};
pub use statistics::{CreateStatistics, CreateStatisticsSpec};
pub use target::{ObjectTarget, QueryMetadata};
pub use value::SqlValue;
pub use views::{CreateOrAlterView, DropView};

use crate::builder::OperationRecord;
use medalflow_core::QueryType;
use serde::{Deserialize, Deserializer, Serialize, de};

/// One database operation, independent of the platform it will run on.
///
/// Serializes with a `type` tag. Deserializing goes through
/// [`OperationBuilder`](crate::OperationBuilder), so input that would fail
/// construction fails to deserialize; target metadata and COPY credentials
/// are not serialized and come back empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operation {
	CreateTable(CreateTable),
	DropTable(DropTable),
	CreateSchema(CreateSchema),
	DropSchema(DropSchema),
	Select(Select),
	Insert(Insert),
	Update(Update),
	Delete(Delete),
	Merge(Merge),
	CreateOrAlterView(CreateOrAlterView),
	DropView(DropView),
	CreateStatistics(CreateStatistics),
	Copy(Copy),
	ExecuteSql(ExecuteSql),
}

macro_rules! operation_variants {
	($($variant:ident),+ $(,)?) => {
		impl Operation {
			/// The fixed [`QueryType`] of this variant.
			pub fn operation_type(&self) -> QueryType {
				match self {
					$(Operation::$variant(_) => QueryType::$variant,)+
				}
			}

			pub fn target(&self) -> &ObjectTarget {
				match self {
					$(Operation::$variant(op) => op.target(),)+
				}
			}
		}

		$(
			impl From<$variant> for Operation {
				fn from(op: $variant) -> Self {
					Operation::$variant(op)
				}
			}
		)+
	};
}

operation_variants!(
	CreateTable,
	DropTable,
	CreateSchema,
	DropSchema,
	Select,
	Insert,
	Update,
	Delete,
	Merge,
	CreateOrAlterView,
	DropView,
	CreateStatistics,
	Copy,
	ExecuteSql,
);

impl Operation {
	/// `schema.object` of the target, without any table prefix.
	pub fn full_object_name(&self) -> String {
		self.target().full_object_name()
	}
}

impl<'de> Deserialize<'de> for Operation {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let record = OperationRecord::deserialize(deserializer)?;
		Operation::try_from(record).map_err(de::Error::custom)
	}
}
