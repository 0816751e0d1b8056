//! Issue collector used by analyzers that run several independent checks.

use crate::model::{Issue, Severity};
use rustc_hash::FxHashMap;

/// Accumulates issues from multiple checks while keeping detection order,
/// with by-kind and by-severity indexes for summary metrics.
#[derive(Debug, Default)]
pub struct IssueCollector {
    issues: Vec<Issue>,
    by_kind: FxHashMap<String, usize>,
    by_severity: FxHashMap<Severity, usize>,
}

impl IssueCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, issue: Issue) {
        *self.by_kind.entry(issue.kind.clone()).or_default() += 1;
        *self.by_severity.entry(issue.severity).or_default() += 1;
        self.issues.push(issue);
    }

    pub fn add_all(&mut self, issues: impl IntoIterator<Item = Issue>) {
        for issue in issues {
            self.add(issue);
        }
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn total(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Number of findings for one issue kind.
    pub fn count_of_kind(&self, kind: &str) -> usize {
        self.by_kind.get(kind).copied().unwrap_or(0)
    }

    pub fn count_of_severity(&self, severity: Severity) -> usize {
        self.by_severity.get(&severity).copied().unwrap_or(0)
    }

    pub fn highest_severity(&self) -> Option<Severity> {
        self.issues.iter().map(|i| i.severity).max()
    }

    pub fn into_issues(self) -> Vec<Issue> {
        self.issues
    }
}
