//! Per-platform SQL rendering.
//!
//! A [`QueryBuilder`] turns an [`Operation`] into the SQL text of one
//! platform. Builders hold only settings and may be shared across threads.
//!
//! # Implementations
//!
//! - [`SynapseServerlessBuilder`]: Synapse serverless SQL pools (external tables)
//! - [`FabricWarehouseBuilder`]: Fabric warehouses (Delta tables)

pub mod base;
pub mod fabric;
pub mod synapse;

pub use base::{BuilderBase, DenyPattern};
pub use fabric::FabricWarehouseBuilder;
pub use synapse::SynapseServerlessBuilder;

use crate::context::QueryContext;
use crate::operations::{
	Copy, CreateOrAlterView, CreateSchema, CreateStatistics, CreateTable, Delete, DropSchema,
	DropTable, DropView, ExecuteSql, Insert, Merge, Operation, Select, Update,
};
use medalflow_core::{ComputeType, QueryBuildError, QueryType};

type BuildResult = Result<String, QueryBuildError>;

/// Renders operations for one platform.
///
/// Implementors provide the `build_*` methods for the variants their platform
/// supports; the remaining ones report [`QueryBuildError::Unsupported`].
pub trait QueryBuilder: Send + Sync {
	fn platform(&self) -> ComputeType;

	fn base(&self) -> &BuilderBase;

	/// Renders `operation`.
	///
	/// `context` is logged alongside the operation; it does not alter the SQL.
	/// Statistics operations are checked for the single-column rule before
	/// the platform renders them.
	fn build_query(&self, operation: &Operation, context: Option<&QueryContext>) -> BuildResult {
		tracing::debug!(
			operation = %operation.operation_type(),
			platform = %self.platform(),
			object = %operation.full_object_name(),
			engine = ?context.map(QueryContext::suggested_engine),
			"building query"
		);

		let sql = match operation {
			Operation::CreateTable(op) => self.build_create_table(op),
			Operation::DropTable(op) => self.build_drop_table(op),
			Operation::CreateSchema(op) => self.build_create_schema(op),
			Operation::DropSchema(op) => self.build_drop_schema(op),
			Operation::Select(op) => self.build_select(op),
			Operation::Insert(op) => self.build_insert(op),
			Operation::Update(op) => self.build_update(op),
			Operation::Delete(op) => self.build_delete(op),
			Operation::Merge(op) => self.build_merge(op),
			Operation::CreateOrAlterView(op) => self.build_create_or_alter_view(op),
			Operation::DropView(op) => self.build_drop_view(op),
			Operation::CreateStatistics(op) => {
				self.base().validate_statistics_columns(op)?;
				self.build_create_statistics(op)
			}
			Operation::Copy(op) => self.build_copy(op),
			Operation::ExecuteSql(op) => self.build_execute_sql(op),
		}?;

		tracing::trace!(sql = %sql, "built query");
		Ok(sql)
	}

	/// Error for an operation this platform cannot express.
	fn unsupported(&self, operation: QueryType, reason: &'static str) -> QueryBuildError {
		QueryBuildError::Unsupported {
			platform: self.platform(),
			operation,
			reason,
		}
	}

	fn build_create_table(&self, _op: &CreateTable) -> BuildResult {
		Err(self.unsupported(QueryType::CreateTable, "not implemented for this platform"))
	}

	fn build_drop_table(&self, _op: &DropTable) -> BuildResult {
		Err(self.unsupported(QueryType::DropTable, "not implemented for this platform"))
	}

	fn build_create_schema(&self, _op: &CreateSchema) -> BuildResult {
		Err(self.unsupported(QueryType::CreateSchema, "not implemented for this platform"))
	}

	fn build_drop_schema(&self, _op: &DropSchema) -> BuildResult {
		Err(self.unsupported(QueryType::DropSchema, "not implemented for this platform"))
	}

	fn build_select(&self, op: &Select) -> BuildResult {
		self.base().render_select(op)
	}

	fn build_insert(&self, _op: &Insert) -> BuildResult {
		Err(self.unsupported(QueryType::Insert, "not implemented for this platform"))
	}

	fn build_update(&self, _op: &Update) -> BuildResult {
		Err(self.unsupported(QueryType::Update, "not implemented for this platform"))
	}

	fn build_delete(&self, _op: &Delete) -> BuildResult {
		Err(self.unsupported(QueryType::Delete, "not implemented for this platform"))
	}

	fn build_merge(&self, _op: &Merge) -> BuildResult {
		Err(self.unsupported(QueryType::Merge, "not implemented for this platform"))
	}

	fn build_create_or_alter_view(&self, _op: &CreateOrAlterView) -> BuildResult {
		Err(self.unsupported(
			QueryType::CreateOrAlterView,
			"not implemented for this platform",
		))
	}

	fn build_drop_view(&self, op: &DropView) -> BuildResult {
		let name = self.base().target_name(op.target())?;
		Ok(if op.if_exists() {
			format!("DROP VIEW IF EXISTS {name}")
		} else {
			format!("DROP VIEW {name}")
		})
	}

	/// Called with exactly one column.
	fn build_create_statistics(&self, _op: &CreateStatistics) -> BuildResult {
		Err(self.unsupported(
			QueryType::CreateStatistics,
			"not implemented for this platform",
		))
	}

	fn build_copy(&self, _op: &Copy) -> BuildResult {
		Err(self.unsupported(QueryType::Copy, "not implemented for this platform"))
	}

	fn build_execute_sql(&self, _op: &ExecuteSql) -> BuildResult {
		Err(self.unsupported(QueryType::ExecuteSql, "not implemented for this platform"))
	}
}
