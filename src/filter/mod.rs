//! Pattern filter engine.
//!
//! Include and exclude are evaluated as two separate predicates and combined
//! with AND-NOT, never folded into one regex.

pub mod pattern;
pub mod visible;

pub use pattern::{PatternSet, Which};
pub use visible::{VisibleSubgraph, compute_visible};
