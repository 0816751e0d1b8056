//! Standardized module results.

use crate::aggregator::{Summary, SummaryBuilder};
use crate::error::{AuditError, Result};
use crate::model::{Issue, Status};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The complete, serializable outcome of one analysis run. A value object:
/// built once per run and never mutated after it is handed to the transport
/// layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleResult {
    pub module: String,
    pub status: Status,
    /// Detection order, unless the caller explicitly re-sorts.
    pub issues: Vec<Issue>,
    pub summary: Summary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl ModuleResult {
    /// Successful run. The summary carries the computed severity counts with
    /// `extra_summary` merged on top (caller keys win).
    ///
    /// Both timestamps derive from a single captured instant, so
    /// `completed_at >= started_at` holds by construction.
    pub fn success(issues: Vec<Issue>, module: impl Into<String>, extra_summary: Summary) -> Self {
        let now = Utc::now();
        let summary = SummaryBuilder::from_issues(&issues)
            .merge(extra_summary)
            .build();
        Self {
            module: module.into(),
            status: Status::Success,
            issues,
            summary,
            error_message: None,
            started_at: now,
            completed_at: now,
        }
    }

    /// Failed run. No issues; the summary holds only the error message.
    pub fn error(error_message: impl Into<String>, module: impl Into<String>) -> Self {
        let now = Utc::now();
        let error_message = error_message.into();
        let mut summary = Summary::new();
        summary.insert("error".to_string(), error_message.clone().into());
        Self {
            module: module.into(),
            status: Status::Error,
            issues: Vec::new(),
            summary,
            error_message: Some(error_message),
            started_at: now,
            completed_at: now,
        }
    }

    /// Run that completed some checks but skipped others. `skipped` must
    /// describe what was not analyzed; an empty description is rejected.
    /// Issues found before the interruption are kept and counted.
    pub fn partial(
        issues: Vec<Issue>,
        module: impl Into<String>,
        skipped: impl Into<String>,
        extra_summary: Summary,
    ) -> Result<Self> {
        let skipped = skipped.into();
        if skipped.trim().is_empty() {
            return Err(AuditError::MissingSkipReason);
        }
        let now = Utc::now();
        let summary = SummaryBuilder::from_issues(&issues)
            .merge(extra_summary)
            .with_metric("error", skipped.clone())
            .build();
        Ok(Self {
            module: module.into(),
            status: Status::Partial,
            issues,
            summary,
            error_message: Some(skipped),
            started_at: now,
            completed_at: now,
        })
    }

    /// A run passes when it produced no critical or high findings and did not
    /// itself fail.
    pub fn passed(&self) -> bool {
        self.status == Status::Success
            && self
                .issues
                .iter()
                .all(|i| i.severity < crate::model::Severity::High)
    }
}
