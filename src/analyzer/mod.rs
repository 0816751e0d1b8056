//! Analyzer modules.
//!
//! Each module inspects one aspect of a container export and reports
//! standardized issues. Modules share the [`Analyzer`] skeleton: a name, an
//! `analyze` pass returning issues in detection order, and optional metrics
//! merged into the result summary.

pub mod associations;
pub mod governance;

use crate::aggregator::{ModuleResult, Summary};
use crate::error::{AuditError, Result};
use crate::model::{Container, Issue, Severity, Subject};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

pub use associations::AssociationsAnalyzer;
pub use governance::GovernanceAnalyzer;

/// Names of the available analyzer modules, in run order.
pub const MODULES: [&str; 2] = [associations::MODULE, governance::MODULE];

/// Per-module analyzer contract.
pub trait Analyzer {
    /// Module name stamped into every issue and result.
    fn name(&self) -> &'static str;

    /// Run every check and return issues in detection order.
    fn analyze(&self) -> Result<Vec<Issue>>;

    /// Module-specific metrics merged into the result summary.
    fn metrics(&self, _issues: &[Issue]) -> Summary {
        Summary::new()
    }
}

/// Knobs a caller may set per analysis request.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    pub include_low_severity: bool,
    pub min_severity: Option<Severity>,
    pub max_issues_per_module: Option<usize>,
    pub exclude_issue_types: Vec<String>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            include_low_severity: true,
            min_severity: None,
            max_issues_per_module: None,
            exclude_issue_types: Vec::new(),
        }
    }
}

impl AnalysisOptions {
    /// Apply the configured filters to a detection-ordered issue list.
    /// Relative order of surviving issues is preserved.
    pub fn apply(&self, issues: Vec<Issue>) -> Vec<Issue> {
        let before = issues.len();
        let mut kept = match self.min_severity {
            Some(min) => crate::model::filter_by_min_severity(&issues, min),
            None => issues,
        };
        kept.retain(|i| self.include_low_severity || i.severity > Severity::Low);
        kept.retain(|i| !self.exclude_issue_types.iter().any(|k| k == &i.kind));
        if let Some(max) = self.max_issues_per_module {
            kept.truncate(max);
        }
        if kept.len() < before {
            debug!("analysis options dropped {} issue(s)", before - kept.len());
        }
        kept
    }
}

/// Run one analyzer over a result: success with filtered issues and module
/// metrics, or an error result if the analysis pass failed. Transport-level
/// faults never escape this function.
pub fn run_analyzer(analyzer: &dyn Analyzer, options: &AnalysisOptions) -> ModuleResult {
    match analyzer.analyze() {
        Ok(issues) => {
            let issues = options.apply(issues);
            let metrics = analyzer.metrics(&issues);
            ModuleResult::success(issues, analyzer.name(), metrics)
        }
        Err(e) => {
            warn!("{} analysis failed: {}", analyzer.name(), e);
            ModuleResult::error(format!("Analysis failed: {}", e), analyzer.name())
        }
    }
}

/// Run the named module against a container.
pub fn run_module(
    container: &Container,
    name: &str,
    options: &AnalysisOptions,
) -> Result<ModuleResult> {
    match name {
        associations::MODULE => Ok(run_analyzer(
            &AssociationsAnalyzer::new(container),
            options,
        )),
        governance::MODULE => Ok(run_analyzer(&GovernanceAnalyzer::new(container), options)),
        other => Err(AuditError::UnknownModule(other.to_string())),
    }
}

/// Run a set of modules (all of them when `names` is empty), one result per
/// module.
pub fn run_modules(
    container: &Container,
    names: &[String],
    options: &AnalysisOptions,
) -> Result<Vec<ModuleResult>> {
    if names.is_empty() {
        return MODULES
            .iter()
            .map(|name| run_module(container, name, options))
            .collect();
    }
    names
        .iter()
        .map(|name| run_module(container, name, options))
        .collect()
}

/// Build an issue subject from key/value pairs.
pub(crate) fn element<const N: usize>(pairs: [(&str, Value); N]) -> Subject {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Status;
    use crate::test_utils::fixtures::{make_issue, sample_container};
    use serde_json::json;

    #[test]
    fn test_options_default_keeps_everything() {
        let issues = vec![
            make_issue("a", Severity::Low),
            make_issue("b", Severity::Critical),
        ];
        let kept = AnalysisOptions::default().apply(issues);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_options_drop_low_severity() {
        let options = AnalysisOptions {
            include_low_severity: false,
            ..Default::default()
        };
        let issues = vec![
            make_issue("a", Severity::Low),
            make_issue("b", Severity::Medium),
        ];
        let kept = options.apply(issues);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].kind, "b");
    }

    #[test]
    fn test_options_min_severity() {
        let options = AnalysisOptions {
            min_severity: Some(Severity::High),
            ..Default::default()
        };
        let issues = vec![
            make_issue("a", Severity::Low),
            make_issue("b", Severity::Critical),
            make_issue("c", Severity::Medium),
        ];
        let kept = options.apply(issues);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].kind, "b");
    }

    #[test]
    fn test_options_exclude_kinds() {
        let options = AnalysisOptions {
            exclude_issue_types: vec!["unused_variable".to_string()],
            ..Default::default()
        };
        let issues = vec![
            make_issue("unused_variable", Severity::Low),
            make_issue("orphaned_trigger", Severity::Medium),
        ];
        let kept = options.apply(issues);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].kind, "orphaned_trigger");
    }

    #[test]
    fn test_options_max_issues_keeps_prefix() {
        let options = AnalysisOptions {
            max_issues_per_module: Some(2),
            ..Default::default()
        };
        let issues = vec![
            make_issue("a", Severity::Low),
            make_issue("b", Severity::Medium),
            make_issue("c", Severity::High),
        ];
        let kept = options.apply(issues);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].kind, "a");
        assert_eq!(kept[1].kind, "b");
    }

    #[test]
    fn test_options_deserialize_from_request_params() {
        let options: AnalysisOptions = serde_json::from_value(json!({
            "include_low_severity": false,
            "max_issues_per_module": 10
        }))
        .unwrap();
        assert!(!options.include_low_severity);
        assert_eq!(options.max_issues_per_module, Some(10));
        assert!(options.exclude_issue_types.is_empty());
    }

    #[test]
    fn test_run_module_unknown_name() {
        let container = sample_container();
        let err = run_module(&container, "javascript", &AnalysisOptions::default()).unwrap_err();
        assert!(matches!(err, AuditError::UnknownModule(_)));
    }

    #[test]
    fn test_run_modules_defaults_to_all() {
        let container = sample_container();
        let results = run_modules(&container, &[], &AnalysisOptions::default()).unwrap();
        assert_eq!(results.len(), MODULES.len());
        assert_eq!(results[0].module, "associations");
        assert_eq!(results[1].module, "governance");
        assert!(results.iter().all(|r| r.status == Status::Success));
    }

    struct FailingAnalyzer;

    impl Analyzer for FailingAnalyzer {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn analyze(&self) -> Result<Vec<Issue>> {
            Err(AuditError::InvalidContainer("truncated export".to_string()))
        }
    }

    #[test]
    fn test_run_analyzer_maps_failure_to_error_result() {
        let result = run_analyzer(&FailingAnalyzer, &AnalysisOptions::default());
        assert_eq!(result.status, Status::Error);
        assert!(result.issues.is_empty());
        assert!(result
            .error_message
            .as_deref()
            .unwrap()
            .contains("truncated export"));
    }
}
