use crate::model::Severity;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Terminal,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum ModuleSelection {
    #[default]
    All,
    Associations,
    Governance,
}

impl ModuleSelection {
    /// Module names to run, empty meaning all.
    pub fn names(&self) -> Vec<String> {
        match self {
            ModuleSelection::All => Vec::new(),
            ModuleSelection::Associations => vec!["associations".to_string()],
            ModuleSelection::Governance => vec!["governance".to_string()],
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "gtm-audit",
    version,
    about = "Configuration auditor for Google Tag Manager container exports",
    long_about = "gtm-audit inspects GTM container exports for broken associations, \
                  orphaned elements, and governance problems, and reports \
                  severity-ranked issues per analysis module."
)]
pub struct Cli {
    /// Container export JSON to audit
    #[arg(required_unless_present = "serve")]
    pub path: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Terminal)]
    pub format: OutputFormat,

    /// Analysis module to run
    #[arg(short, long, value_enum, default_value_t = ModuleSelection::All)]
    pub module: ModuleSelection,

    /// Hide issues below this severity
    #[arg(long, value_enum)]
    pub min_severity: Option<Severity>,

    /// Issue kinds to skip, e.g. --exclude unused_variable
    #[arg(long = "exclude", value_name = "KIND")]
    pub exclude: Vec<String>,

    /// Cap the number of issues reported per module
    #[arg(long)]
    pub max_issues: Option<usize>,

    /// Strict mode: any finding fails the audit, not just critical/high
    #[arg(short, long)]
    pub strict: bool,

    /// Run the JSON-RPC analysis server on stdio instead of auditing a file
    #[arg(long)]
    pub serve: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}
