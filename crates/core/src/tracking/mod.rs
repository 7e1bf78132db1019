//! Durable commit-tracking state and the reconciliation decision.

pub mod registry;
pub mod frontier;
pub mod tracker;
pub mod plan;

pub use registry::*;
pub use frontier::*;
pub use tracker::*;
pub use plan::*;
