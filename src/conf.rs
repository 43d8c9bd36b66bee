//! Compute settings and the layered sources they are loaded from.

pub use medalflow_conf::*;
