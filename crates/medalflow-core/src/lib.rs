//! # medalflow core
//!
//! Leaf crate of the medalflow workspace. It owns the closed vocabularies
//! shared by every layer (query types, medallion layers, compute platforms),
//! the error taxonomy used by the operation model and the query builders, and
//! the identifier validators that guard every name interpolated into SQL.
//!
//! Nothing in here performs I/O or logging.

pub mod constants;
pub mod exception;
pub mod validators;

pub use constants::{
	ComputeEnvironment, ComputeType, EngineType, ExecutionMode, FileFormat, InsertMode, LakeType,
	Layer, QueryType, ResultFormat, UnknownVariant, ValidationLevel,
};
pub use exception::{IdentifierError, QueryBuildError, Result, ValidationError};
