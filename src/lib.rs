pub mod aggregator;
pub mod analyzer;
pub mod cli;
pub mod error;
pub mod handlers;
pub mod model;
pub mod reporter;
pub mod server;

#[cfg(test)]
pub mod test_utils;

pub use aggregator::{IssueCollector, ModuleResult, Summary, SummaryBuilder};
pub use analyzer::{
    Analyzer, AnalysisOptions, AssociationsAnalyzer, GovernanceAnalyzer, run_module, run_modules,
};
pub use cli::{Cli, ModuleSelection, OutputFormat};
pub use error::{AuditError, Result};
pub use model::{Container, Issue, Severity, Status, Subject};
pub use reporter::{json::JsonReporter, terminal::TerminalReporter, Reporter};
pub use server::RpcServer;
