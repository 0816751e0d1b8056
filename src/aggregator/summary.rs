//! Summary builder for module results.

use crate::model::{count_by_severity, Issue, Severity};
use serde_json::Value;

/// Open summary map carried by every module result. Always holds the
/// `total_issues` count and the four per-severity counts; modules merge their
/// own metrics on top.
pub type Summary = serde_json::Map<String, Value>;

/// Builds the standard severity summary for a set of issues, then lets the
/// caller merge module-specific metrics over it. Merged keys win over the
/// computed counts; a module may deliberately override a count.
#[derive(Debug, Default)]
pub struct SummaryBuilder {
    counts: Summary,
    extras: Summary,
}

impl SummaryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the builder with the computed counts for `issues`.
    pub fn from_issues(issues: &[Issue]) -> Self {
        let mut counts = Summary::new();
        counts.insert("total_issues".to_string(), issues.len().into());
        counts.insert(
            "critical".to_string(),
            count_by_severity(issues, Severity::Critical).into(),
        );
        counts.insert(
            "high".to_string(),
            count_by_severity(issues, Severity::High).into(),
        );
        counts.insert(
            "medium".to_string(),
            count_by_severity(issues, Severity::Medium).into(),
        );
        counts.insert(
            "low".to_string(),
            count_by_severity(issues, Severity::Low).into(),
        );
        Self {
            counts,
            extras: Summary::new(),
        }
    }

    /// Add one module-specific metric.
    pub fn with_metric(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extras.insert(key.into(), value.into());
        self
    }

    /// Merge a whole metric map.
    pub fn merge(mut self, extra: Summary) -> Self {
        self.extras.extend(extra);
        self
    }

    /// Produce the final map: computed counts first, extras layered on top.
    pub fn build(self) -> Summary {
        let mut summary = self.counts;
        summary.extend(self.extras);
        summary
    }
}
