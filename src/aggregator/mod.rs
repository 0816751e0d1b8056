//! Aggregation layer.
//!
//! Turns the raw issue collections produced by the analyzer modules into
//! standardized results:
//! - collects issues from multiple checks in detection order
//! - computes per-severity summary counts
//! - handles the success/error/partial result states
//!
//! Everything here is pure over values passed in; no I/O and no shared state,
//! so concurrent hosts may call into it freely.

pub mod collector;
pub mod result;
pub mod summary;

pub use collector::IssueCollector;
pub use result::ModuleResult;
pub use summary::{Summary, SummaryBuilder};
