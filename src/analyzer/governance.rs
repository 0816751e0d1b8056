//! Governance analyzer: documentation coverage and folder organization.

use crate::aggregator::{IssueCollector, Summary};
use crate::analyzer::{element, Analyzer};
use crate::error::Result;
use crate::model::{Container, Folder, Issue, Severity};
use regex::Regex;
use serde_json::json;
use std::sync::LazyLock;
use tracing::debug;

pub const MODULE: &str = "governance";

pub const MISSING_DOCUMENTATION: &str = "missing_documentation";
pub const NO_FOLDER_STRUCTURE: &str = "no_folder_structure";
pub const EMPTY_FOLDER: &str = "empty_folder";
pub const UNORGANIZED_ELEMENT: &str = "unorganized_element";

/// Auto-generated note prefixes: "[2024-03-01] user@example.com " stamps.
static AUTOGEN_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[.*?\]\s*[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}\s*")
        .expect("autogen prefix pattern")
});
static TIMESTAMP_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}.*?:\s*").expect("timestamp prefix pattern"));

static BOILERPLATE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)^(tag|trigger|variable)$",
        r"(?i)^(todo|fixme|temp|temporary)$",
        r"(?i)^(test|testing)$",
        r"(?i)^(new|old|legacy)$",
        r"^\w{1,5}$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("boilerplate pattern"))
    .collect()
});

/// Severity for each issue kind this module emits. Lookup misses fall back
/// to medium.
fn severity_for(kind: &str) -> Severity {
    match kind {
        MISSING_DOCUMENTATION | NO_FOLDER_STRUCTURE => Severity::Medium,
        EMPTY_FOLDER | UNORGANIZED_ELEMENT => Severity::Low,
        _ => Severity::Medium,
    }
}

/// One tag/trigger/variable viewed through the fields governance cares about.
struct ElementRef<'a> {
    id: &'a str,
    name: &'a str,
    kind: &'static str,
    notes: Option<&'a str>,
    parent_folder_id: Option<&'a str>,
}

pub struct GovernanceAnalyzer<'a> {
    container: &'a Container,
}

impl<'a> GovernanceAnalyzer<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    fn elements(&self) -> Vec<ElementRef<'a>> {
        let tags = self.container.tag.iter().map(|t| ElementRef {
            id: &t.tag_id,
            name: &t.name,
            kind: "tag",
            notes: t.notes.as_deref(),
            parent_folder_id: t.parent_folder_id.as_deref(),
        });
        let triggers = self.container.trigger.iter().map(|t| ElementRef {
            id: &t.trigger_id,
            name: &t.name,
            kind: "trigger",
            notes: t.notes.as_deref(),
            parent_folder_id: t.parent_folder_id.as_deref(),
        });
        let variables = self.container.variable.iter().map(|v| ElementRef {
            id: &v.variable_id,
            name: &v.name,
            kind: "variable",
            notes: v.notes.as_deref(),
            parent_folder_id: v.parent_folder_id.as_deref(),
        });
        tags.chain(triggers).chain(variables).collect()
    }

    fn documentation_issues(&self) -> Vec<Issue> {
        self.elements()
            .into_iter()
            .filter(|item| !has_documentation(item.notes))
            .map(|item| {
                Issue::new(
                    MISSING_DOCUMENTATION,
                    severity_for(MISSING_DOCUMENTATION),
                    element([
                        ("id", json!(item.id)),
                        ("name", json!(item.name)),
                        ("type", json!(item.kind)),
                    ]),
                    format!(
                        "{} '{}' has no meaningful documentation notes",
                        capitalize(item.kind),
                        item.name
                    ),
                    "Add notes describing what this element does, why it exists, \
                     and who owns it",
                    MODULE,
                )
            })
            .collect()
    }

    fn organization_issues(&self) -> Vec<Issue> {
        let mut issues = Vec::new();

        if self.container.folder.is_empty() {
            issues.push(Issue::new(
                NO_FOLDER_STRUCTURE,
                severity_for(NO_FOLDER_STRUCTURE),
                element([
                    ("totalTags", json!(self.container.tag.len())),
                    ("totalTriggers", json!(self.container.trigger.len())),
                    ("totalVariables", json!(self.container.variable.len())),
                ]),
                "Container has no folder organization structure",
                "Create folders to organize tags, triggers, and variables by \
                 purpose, team, or functionality",
                MODULE,
            ));
            // Without folders every element counts as unorganized.
            for item in self.elements() {
                issues.push(self.unorganized_element_issue(&item));
            }
            return issues;
        }

        for folder in &self.container.folder {
            if self.folder_is_empty(folder) {
                issues.push(Issue::new(
                    EMPTY_FOLDER,
                    severity_for(EMPTY_FOLDER),
                    element([
                        ("folderId", json!(folder.folder_id)),
                        ("name", json!(folder.name)),
                        ("type", json!("folder")),
                    ]),
                    format!("Folder '{}' contains no elements", folder.name),
                    "Remove the empty folder or move related elements into it",
                    MODULE,
                ));
            }
        }

        for item in self.elements() {
            if item.parent_folder_id.is_none() {
                issues.push(self.unorganized_element_issue(&item));
            }
        }

        issues
    }

    fn unorganized_element_issue(&self, item: &ElementRef<'_>) -> Issue {
        Issue::new(
            UNORGANIZED_ELEMENT,
            severity_for(UNORGANIZED_ELEMENT),
            element([
                ("id", json!(item.id)),
                ("name", json!(item.name)),
                ("type", json!(item.kind)),
            ]),
            format!(
                "{} '{}' is not assigned to any folder",
                capitalize(item.kind),
                item.name
            ),
            "Move this element into a folder that matches its purpose",
            MODULE,
        )
    }

    fn folder_is_empty(&self, folder: &Folder) -> bool {
        !self
            .elements()
            .iter()
            .any(|item| item.parent_folder_id == Some(folder.folder_id.as_str()))
    }

    fn documented_count(&self) -> usize {
        self.elements()
            .iter()
            .filter(|item| has_documentation(item.notes))
            .count()
    }

    fn organized_count(&self) -> usize {
        self.elements()
            .iter()
            .filter(|item| item.parent_folder_id.is_some())
            .count()
    }
}

impl Analyzer for GovernanceAnalyzer<'_> {
    fn name(&self) -> &'static str {
        MODULE
    }

    fn analyze(&self) -> Result<Vec<Issue>> {
        debug!("starting governance analysis");

        let mut collector = IssueCollector::new();
        collector.add_all(self.documentation_issues());
        collector.add_all(self.organization_issues());

        debug!(
            "governance analysis completed: {} issues found",
            collector.total()
        );
        Ok(collector.into_issues())
    }

    fn metrics(&self, _issues: &[Issue]) -> Summary {
        let total = self.elements().len();
        let mut metrics = Summary::new();
        metrics.insert(
            "documentation_coverage".to_string(),
            percentage(self.documented_count(), total).into(),
        );
        metrics.insert(
            "organization_percentage".to_string(),
            percentage(self.organized_count(), total).into(),
        );
        metrics.insert(
            "total_folders".to_string(),
            self.container.folder.len().into(),
        );
        metrics
    }
}

/// Meaningful documentation: at least 10 characters left after stripping
/// auto-generated prefixes, and not a known boilerplate word.
fn has_documentation(notes: Option<&str>) -> bool {
    let Some(notes) = notes else {
        return false;
    };
    let cleaned = AUTOGEN_PREFIX.replace(notes.trim(), "");
    let cleaned = TIMESTAMP_PREFIX.replace(&cleaned, "");
    let cleaned = cleaned.trim();
    cleaned.len() >= 10 && !is_boilerplate(cleaned)
}

fn is_boilerplate(text: &str) -> bool {
    BOILERPLATE.iter().any(|pattern| pattern.is_match(text))
}

fn percentage(part: usize, total: usize) -> u64 {
    if total == 0 {
        return 0;
    }
    ((part as f64 / total as f64) * 100.0).round() as u64
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
