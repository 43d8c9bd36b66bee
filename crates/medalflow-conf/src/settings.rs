//! Compute settings and the sources they are loaded from.

pub mod builder;
pub mod compute;
pub mod sources;
