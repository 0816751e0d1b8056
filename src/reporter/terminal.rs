use crate::aggregator::ModuleResult;
use crate::model::{sort_by_severity_desc, Severity, Status};
use crate::reporter::Reporter;
use colored::Colorize;

pub struct TerminalReporter {
    verbose: bool,
}

impl TerminalReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    fn severity_label(&self, severity: Severity) -> colored::ColoredString {
        let label = format!("[{}]", severity.as_str().to_uppercase());
        match severity {
            Severity::Critical => label.red().bold(),
            Severity::High => label.yellow().bold(),
            Severity::Medium => label.cyan(),
            Severity::Low => label.white(),
        }
    }

    fn format_module(&self, result: &ModuleResult, output: &mut String) {
        output.push_str(&format!(
            "\n{} {}\n",
            "Module:".bold(),
            result.module.bold()
        ));

        match result.status {
            Status::Error => {
                output.push_str(&format!(
                    "  {} {}\n",
                    "analysis failed:".red().bold(),
                    result.error_message.as_deref().unwrap_or("unknown error")
                ));
                return;
            }
            Status::Partial => {
                output.push_str(&format!(
                    "  {} {}\n",
                    "partial run:".yellow().bold(),
                    result.error_message.as_deref().unwrap_or("unknown reason")
                ));
            }
            Status::Success => {}
        }

        if result.issues.is_empty() {
            output.push_str(&format!("  {}\n", "No issues found".green()));
        }

        for issue in sort_by_severity_desc(&result.issues) {
            output.push_str(&format!(
                "  {} {}: {}\n",
                self.severity_label(issue.severity),
                issue.kind,
                issue.message
            ));
            if self.verbose {
                output.push_str(&format!("      fix: {}\n", issue.recommendation.dimmed()));
                if !issue.subject.is_empty() {
                    let subject = serde_json::to_string(&issue.subject)
                        .unwrap_or_else(|_| "{}".to_string());
                    output.push_str(&format!("      element: {}\n", subject.dimmed()));
                }
            }
        }

        let counts = ["critical", "high", "medium", "low"]
            .iter()
            .map(|key| {
                format!(
                    "{} {}",
                    result.summary.get(*key).and_then(|v| v.as_u64()).unwrap_or(0),
                    key
                )
            })
            .collect::<Vec<_>>()
            .join(", ");
        output.push_str(&format!("  {} {}\n", "Summary:".bold(), counts));
    }
}

impl Reporter for TerminalReporter {
    fn report(&self, results: &[ModuleResult]) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "{} v{}\n",
            "gtm-audit".bold(),
            env!("CARGO_PKG_VERSION")
        ));

        for result in results {
            self.format_module(result, &mut output);
        }

        let passed = results.iter().all(|r| r.passed());
        output.push('\n');
        if passed {
            output.push_str(&format!("{}\n", "PASSED".green().bold()));
        } else {
            output.push_str(&format!("{}\n", "FAILED".red().bold()));
        }
        output
    }
}
