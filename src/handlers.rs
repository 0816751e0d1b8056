//! CLI mode handlers.

use crate::analyzer::{run_modules, AnalysisOptions};
use crate::cli::{Cli, OutputFormat};
use crate::error::Result;
use crate::model::{Container, Status};
use crate::reporter::{json::JsonReporter, terminal::TerminalReporter, Reporter};
use crate::server::RpcServer;
use std::path::Path;
use std::process::ExitCode;
use tracing::info;

/// Audit a container export file and print the report.
pub fn run_normal_mode(cli: &Cli) -> ExitCode {
    let Some(path) = cli.path.as_deref() else {
        eprintln!("Error: no container export given");
        return ExitCode::FAILURE;
    };

    match run_audit(cli, path) {
        Ok((output, passed)) => {
            println!("{}", output);
            if passed {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_audit(cli: &Cli, path: &Path) -> Result<(String, bool)> {
    let container = Container::from_file(path)?;
    info!(
        "loaded container export from {}: {} elements",
        path.display(),
        container.element_count()
    );

    let options = AnalysisOptions {
        min_severity: cli.min_severity,
        exclude_issue_types: cli.exclude.clone(),
        max_issues_per_module: cli.max_issues,
        ..Default::default()
    };
    let results = run_modules(&container, &cli.module.names(), &options)?;

    let passed = if cli.strict {
        results
            .iter()
            .all(|r| r.status == Status::Success && r.issues.is_empty())
    } else {
        results.iter().all(|r| r.passed())
    };

    let output = match cli.format {
        OutputFormat::Terminal => TerminalReporter::new(cli.verbose).report(&results),
        OutputFormat::Json => JsonReporter::new().report(&results),
    };
    Ok((output, passed))
}

/// Run the JSON-RPC analysis server on stdio.
pub fn handle_serve() -> ExitCode {
    match RpcServer::new().run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    fn write_export(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        (dir, path)
    }

    const BROKEN_EXPORT: &str = r#"{
        "containerVersion": {
            "tag": [{"tagId": "1", "name": "Broken", "type": "html",
                     "firingTriggerId": ["999"]}]
        }
    }"#;

    #[test]
    fn test_audit_fails_on_critical_finding() {
        let (_dir, path) = write_export(BROKEN_EXPORT);
        let cli = Cli::try_parse_from(["gtm-audit", path.to_str().unwrap()]).unwrap();
        let (output, passed) = run_audit(&cli, &path).unwrap();
        assert!(!passed);
        assert!(output.contains("dangling_reference"));
    }

    #[test]
    fn test_audit_passes_clean_container_without_strict() {
        // Only low/medium governance findings; default mode passes.
        let (_dir, path) = write_export(
            r#"{"containerVersion": {
                "tag": [{"tagId": "1", "name": "T", "type": "html",
                         "firingTriggerId": ["10"],
                         "notes": "Sends the GA4 page_view event on every page",
                         "parentFolderId": "100"}],
                "trigger": [{"triggerId": "10", "name": "All Pages", "type": "pageview",
                             "notes": "Fires on every page of the main site"}],
                "folder": [{"folderId": "100", "name": "Analytics"}]
            }}"#,
        );
        let cli = Cli::try_parse_from(["gtm-audit", path.to_str().unwrap()]).unwrap();
        let (_, passed) = run_audit(&cli, &path).unwrap();
        assert!(passed);

        let strict = Cli::try_parse_from(["gtm-audit", "--strict", path.to_str().unwrap()]).unwrap();
        let (_, passed) = run_audit(&strict, &path).unwrap();
        // The trigger is unorganized, so strict mode fails.
        assert!(!passed);
    }

    #[test]
    fn test_audit_json_format_is_parseable() {
        let (_dir, path) = write_export(BROKEN_EXPORT);
        let cli = Cli::try_parse_from([
            "gtm-audit",
            "--format",
            "json",
            path.to_str().unwrap(),
        ])
        .unwrap();
        let (output, _) = run_audit(&cli, &path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_audit_min_severity_drops_lesser_findings() {
        let (_dir, path) = write_export(BROKEN_EXPORT);
        let cli = Cli::try_parse_from([
            "gtm-audit",
            "--format",
            "json",
            "--min-severity",
            "critical",
            path.to_str().unwrap(),
        ])
        .unwrap();
        let (output, _) = run_audit(&cli, &path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        for result in parsed.as_array().unwrap() {
            for issue in result["issues"].as_array().unwrap() {
                assert_eq!(issue["severity"], "critical");
            }
            // Summary counts follow the filtered list.
            assert_eq!(
                result["summary"]["total_issues"].as_u64().unwrap() as usize,
                result["issues"].as_array().unwrap().len()
            );
        }
    }

    #[test]
    fn test_audit_missing_file() {
        let cli = Cli::try_parse_from(["gtm-audit", "/nonexistent/export.json"]).unwrap();
        let err = run_audit(&cli, Path::new("/nonexistent/export.json")).unwrap_err();
        assert!(matches!(err, crate::error::AuditError::FileNotFound(_)));
    }
}
