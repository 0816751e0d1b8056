use crate::error::AuditError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

/// Open attribute map identifying which container element an issue concerns,
/// e.g. `{"tagId": "12", "name": "GA4 Event"}`. Values are arbitrary JSON
/// scalars and must round-trip losslessly across the wire.
pub type Subject = serde_json::Map<String, Value>;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }

    /// Numeric rank used everywhere severities are compared.
    pub fn weight(&self) -> u32 {
        match self {
            Severity::Low => 1,
            Severity::Medium => 2,
            Severity::High => 3,
            Severity::Critical => 4,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Severity {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            other => Err(AuditError::InvalidSeverity(other.to_string())),
        }
    }
}

/// Weight of a severity string as it appears on the wire.
/// Unrecognized values weigh 0 and rank below every defined severity.
pub fn severity_weight(severity: &str) -> u32 {
    severity
        .parse::<Severity>()
        .map(|s| s.weight())
        .unwrap_or(0)
}

/// Outcome classification for a module run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
    Partial,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Success => "success",
            Status::Error => "error",
            Status::Partial => "partial",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Status {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(Status::Success),
            "error" => Ok(Status::Error),
            "partial" => Ok(Status::Partial),
            other => Err(AuditError::InvalidStatus(other.to_string())),
        }
    }
}

/// One standardized finding produced by an analysis module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    /// Issue category, e.g. "orphaned_trigger", "missing_documentation".
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: Severity,
    /// Which element this finding concerns.
    #[serde(rename = "element")]
    pub subject: Subject,
    pub message: String,
    pub recommendation: String,
    /// Name of the analyzer that produced this issue.
    pub module: String,
    pub detected_at: DateTime<Utc>,
}

impl Issue {
    /// Construct an issue stamped with the current time.
    pub fn new(
        kind: impl Into<String>,
        severity: Severity,
        subject: Subject,
        message: impl Into<String>,
        recommendation: impl Into<String>,
        module: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            severity,
            subject,
            message: message.into(),
            recommendation: recommendation.into(),
            module: module.into(),
            detected_at: Utc::now(),
        }
    }
}

/// Count issues matching exactly the given severity.
pub fn count_by_severity(issues: &[Issue], severity: Severity) -> usize {
    issues.iter().filter(|i| i.severity == severity).count()
}

/// Keep issues at or above the given severity, preserving input order.
pub fn filter_by_min_severity(issues: &[Issue], min_severity: Severity) -> Vec<Issue> {
    issues
        .iter()
        .filter(|i| i.severity.weight() >= min_severity.weight())
        .cloned()
        .collect()
}

/// Return a new sequence ordered by severity weight descending.
/// Equal-severity issues keep their original relative order.
pub fn sort_by_severity_desc(issues: &[Issue]) -> Vec<Issue> {
    let mut sorted = issues.to_vec();
    sorted.sort_by(|a, b| b.severity.weight().cmp(&a.severity.weight()));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn make_issue(kind: &str, severity: Severity) -> Issue {
        let mut subject = Subject::new();
        subject.insert("tagId".to_string(), json!("12"));
        Issue::new(
            kind,
            severity,
            subject,
            "test message",
            "test recommendation",
            "associations",
        )
    }

    #[test]
    fn test_severity_as_str() {
        assert_eq!(Severity::Low.as_str(), "low");
        assert_eq!(Severity::Medium.as_str(), "medium");
        assert_eq!(Severity::High.as_str(), "high");
        assert_eq!(Severity::Critical.as_str(), "critical");
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
        assert!(Severity::High < Severity::Critical);
    }

    #[test]
    fn test_severity_weight() {
        assert_eq!(Severity::Low.weight(), 1);
        assert_eq!(Severity::Medium.weight(), 2);
        assert_eq!(Severity::High.weight(), 3);
        assert_eq!(Severity::Critical.weight(), 4);
    }

    #[test]
    fn test_severity_weight_unknown_is_zero() {
        assert_eq!(severity_weight("critical"), 4);
        assert_eq!(severity_weight("urgent"), 0);
        assert_eq!(severity_weight(""), 0);
        assert_eq!(severity_weight("CRITICAL"), 0);
    }

    #[test]
    fn test_severity_from_str_rejects_unknown() {
        assert!("low".parse::<Severity>().is_ok());
        assert!(matches!(
            "urgent".parse::<Severity>(),
            Err(AuditError::InvalidSeverity(s)) if s == "urgent"
        ));
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("success".parse::<Status>().unwrap(), Status::Success);
        assert_eq!("error".parse::<Status>().unwrap(), Status::Error);
        assert_eq!("partial".parse::<Status>().unwrap(), Status::Partial);
        assert!("running".parse::<Status>().is_err());
    }

    #[test]
    fn test_severity_serialization() {
        let json = serde_json::to_string(&Severity::Critical).unwrap();
        assert_eq!(json, "\"critical\"");
        let back: Severity = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Severity::Critical);
    }

    #[test]
    fn test_unknown_severity_rejected_at_wire_boundary() {
        let raw = json!({
            "type": "missing_name",
            "severity": "urgent",
            "element": {},
            "message": "m",
            "recommendation": "r",
            "module": "associations",
            "detected_at": "2026-01-01T00:00:00Z"
        });
        assert!(serde_json::from_value::<Issue>(raw).is_err());
    }

    #[test]
    fn test_issue_subject_round_trip() {
        let mut subject = Subject::new();
        subject.insert("tagId".to_string(), json!("42"));
        subject.insert("line".to_string(), json!(7));
        subject.insert("enabled".to_string(), json!(false));
        let issue = Issue::new(
            "configuration_issue",
            Severity::Medium,
            subject,
            "m",
            "r",
            "governance",
        );

        let encoded = serde_json::to_string(&issue).unwrap();
        let decoded: Issue = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded.subject["tagId"], json!("42"));
        assert_eq!(decoded.subject["line"], json!(7));
        assert_eq!(decoded.subject["enabled"], json!(false));
        assert_eq!(decoded.kind, "configuration_issue");
        assert_eq!(decoded.detected_at, issue.detected_at);
    }

    #[test]
    fn test_issue_serializes_kind_as_type() {
        let issue = make_issue("orphaned_trigger", Severity::Medium);
        let value = serde_json::to_value(&issue).unwrap();
        assert_eq!(value["type"], "orphaned_trigger");
        assert!(value.get("kind").is_none());
    }

    #[test]
    fn test_count_by_severity_is_exact_match() {
        let issues = vec![
            make_issue("a", Severity::Critical),
            make_issue("b", Severity::High),
            make_issue("c", Severity::High),
            make_issue("d", Severity::Low),
        ];
        assert_eq!(count_by_severity(&issues, Severity::Critical), 1);
        assert_eq!(count_by_severity(&issues, Severity::High), 2);
        assert_eq!(count_by_severity(&issues, Severity::Medium), 0);
        assert_eq!(count_by_severity(&issues, Severity::Low), 1);
    }

    #[test]
    fn test_counts_partition_the_sequence() {
        let issues = vec![
            make_issue("a", Severity::Low),
            make_issue("b", Severity::Critical),
            make_issue("c", Severity::Medium),
            make_issue("d", Severity::Critical),
            make_issue("e", Severity::High),
        ];
        let total: usize = [
            Severity::Critical,
            Severity::High,
            Severity::Medium,
            Severity::Low,
        ]
        .iter()
        .map(|s| count_by_severity(&issues, *s))
        .sum();
        assert_eq!(total, issues.len());
    }

    #[test]
    fn test_filter_by_min_severity_keeps_order() {
        let issues = vec![
            make_issue("a", Severity::Low),
            make_issue("b", Severity::Critical),
            make_issue("c", Severity::Medium),
            make_issue("d", Severity::High),
        ];
        let filtered = filter_by_min_severity(&issues, Severity::High);
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].kind, "b");
        assert_eq!(filtered[1].kind, "d");
    }

    #[test]
    fn test_filter_by_min_severity_low_keeps_all() {
        let issues = vec![
            make_issue("a", Severity::Low),
            make_issue("b", Severity::Medium),
        ];
        assert_eq!(filter_by_min_severity(&issues, Severity::Low).len(), 2);
    }

    #[test]
    fn test_sort_by_severity_desc() {
        let issues = vec![
            make_issue("a", Severity::Low),
            make_issue("b", Severity::Critical),
            make_issue("c", Severity::Medium),
            make_issue("d", Severity::Critical),
            make_issue("e", Severity::High),
        ];
        let sorted = sort_by_severity_desc(&issues);

        let kinds: Vec<&str> = sorted.iter().map(|i| i.kind.as_str()).collect();
        assert_eq!(kinds, vec!["b", "d", "e", "c", "a"]);

        // Weights non-increasing, input untouched.
        for pair in sorted.windows(2) {
            assert!(pair[0].severity.weight() >= pair[1].severity.weight());
        }
        assert_eq!(issues[0].kind, "a");
    }

    #[test]
    fn test_sort_is_stable_for_equal_severities() {
        let issues = vec![
            make_issue("first_medium", Severity::Medium),
            make_issue("second_medium", Severity::Medium),
            make_issue("third_medium", Severity::Medium),
        ];
        let sorted = sort_by_severity_desc(&issues);
        let kinds: Vec<&str> = sorted.iter().map(|i| i.kind.as_str()).collect();
        assert_eq!(kinds, vec!["first_medium", "second_medium", "third_medium"]);
    }

    #[test]
    fn test_sort_is_a_permutation() {
        let issues = vec![
            make_issue("a", Severity::High),
            make_issue("b", Severity::Low),
            make_issue("c", Severity::High),
        ];
        let sorted = sort_by_severity_desc(&issues);
        assert_eq!(sorted.len(), issues.len());
        for issue in &issues {
            assert!(sorted.iter().any(|s| s.kind == issue.kind));
        }
    }
}
