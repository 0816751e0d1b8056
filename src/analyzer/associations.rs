//! Associations analyzer: orphaned elements and broken references.
//!
//! Checks, in detection order:
//! - triggers referenced by no tag
//! - variables never referenced via `{{name}}` anywhere in the container
//! - tags firing or blocking on non-existent trigger ids
//! - built-in variables referenced but not enabled
//! - setup/teardown references to non-existent tags

use crate::aggregator::{IssueCollector, Summary};
use crate::analyzer::{element, Analyzer};
use crate::error::Result;
use crate::model::{Container, Issue, Parameter, Severity};
use regex::Regex;
use rustc_hash::FxHashSet;
use serde_json::{json, Value};
use std::sync::LazyLock;
use tracing::debug;

pub const MODULE: &str = "associations";

pub const ORPHANED_TRIGGER: &str = "orphaned_trigger";
pub const UNUSED_VARIABLE: &str = "unused_variable";
pub const DANGLING_REFERENCE: &str = "dangling_reference";
pub const BUILTIN_VARIABLE_ISSUE: &str = "builtin_variable_issue";
pub const SETUP_BLOCKING_ISSUE: &str = "setup_blocking_issue";

static VAR_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([^}]+)\}\}").expect("variable reference pattern"));

/// Built-in variable names GTM resolves without an explicit declaration.
const BUILTIN_VARIABLE_NAMES: &[&str] = &[
    "Page URL",
    "Page Hostname",
    "Page Path",
    "Referrer",
    "Event",
    "Click Element",
    "Click Classes",
    "Click ID",
    "Click Target",
    "Click Text",
    "Click URL",
    "Form Element",
    "Form Classes",
    "Form ID",
    "Form Target",
    "Form Text",
    "Form URL",
    "JavaScript Variable",
    "Container ID",
    "Container Version",
    "Debug Mode",
    "Environment Name",
    "Random Number",
    "Video Current Time",
    "Video Duration",
    "Video Percent",
    "Video Provider",
    "Video Status",
    "Video Title",
    "Video URL",
    "Video Visible",
];

/// Severity for each issue kind this module emits. Lookup misses fall back
/// to medium.
fn severity_for(kind: &str) -> Severity {
    match kind {
        DANGLING_REFERENCE | SETUP_BLOCKING_ISSUE => Severity::Critical,
        ORPHANED_TRIGGER | BUILTIN_VARIABLE_ISSUE => Severity::Medium,
        UNUSED_VARIABLE => Severity::Low,
        _ => Severity::Medium,
    }
}

pub struct AssociationsAnalyzer<'a> {
    container: &'a Container,
    tag_ids: FxHashSet<&'a str>,
    trigger_ids: FxHashSet<&'a str>,
    variable_names: FxHashSet<&'a str>,
    enabled_builtins: FxHashSet<&'a str>,
}

impl<'a> AssociationsAnalyzer<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self {
            container,
            tag_ids: container.tag.iter().map(|t| t.tag_id.as_str()).collect(),
            trigger_ids: container
                .trigger
                .iter()
                .map(|t| t.trigger_id.as_str())
                .collect(),
            variable_names: container
                .variable
                .iter()
                .map(|v| v.name.as_str())
                .collect(),
            enabled_builtins: container
                .built_in_variable
                .iter()
                .map(|b| b.name.as_str())
                .collect(),
        }
    }

    /// Every `{{name}}` reference in tag parameters, trigger filters, and
    /// variable parameters.
    fn referenced_variable_names(&self) -> FxHashSet<String> {
        let mut refs = FxHashSet::default();
        for tag in &self.container.tag {
            collect_parameter_refs(&tag.parameter, &mut refs);
        }
        for trigger in &self.container.trigger {
            for filter in trigger.filter.iter().chain(&trigger.custom_event_filter) {
                collect_parameter_refs(&filter.parameter, &mut refs);
            }
        }
        for variable in &self.container.variable {
            collect_parameter_refs(&variable.parameter, &mut refs);
        }
        refs
    }

    fn orphaned_triggers(&self) -> Vec<Issue> {
        let mut referenced: FxHashSet<&str> = FxHashSet::default();
        for tag in &self.container.tag {
            referenced.extend(tag.firing_trigger_id.iter().map(String::as_str));
            referenced.extend(tag.blocking_trigger_id.iter().map(String::as_str));
        }

        self.container
            .trigger
            .iter()
            .filter(|t| !referenced.contains(t.trigger_id.as_str()))
            .map(|trigger| {
                Issue::new(
                    ORPHANED_TRIGGER,
                    severity_for(ORPHANED_TRIGGER),
                    element([
                        ("triggerId", json!(trigger.trigger_id)),
                        ("name", json!(trigger.name)),
                        ("type", json!(trigger.kind)),
                    ]),
                    format!(
                        "Trigger '{}' ({}) is not referenced by any tag",
                        trigger.name, trigger.trigger_id
                    ),
                    "Consider removing this trigger if it's no longer needed, \
                     or ensure it's properly linked to tags",
                    MODULE,
                )
            })
            .collect()
    }

    fn unused_variables(&self, referenced: &FxHashSet<String>) -> Vec<Issue> {
        self.container
            .variable
            .iter()
            .filter(|v| !referenced.contains(&v.name))
            .map(|variable| {
                Issue::new(
                    UNUSED_VARIABLE,
                    severity_for(UNUSED_VARIABLE),
                    element([
                        ("variableId", json!(variable.variable_id)),
                        ("name", json!(variable.name)),
                        ("type", json!(variable.kind)),
                    ]),
                    format!(
                        "Variable '{}' ({}) is not referenced anywhere",
                        variable.name, variable.variable_id
                    ),
                    "Consider removing this variable if it's no longer needed \
                     to clean up the container",
                    MODULE,
                )
            })
            .collect()
    }

    fn dangling_references(&self) -> Vec<Issue> {
        let mut issues = Vec::new();
        for tag in &self.container.tag {
            for (reference_type, trigger_ids) in [
                ("firingTriggerId", &tag.firing_trigger_id),
                ("blockingTriggerId", &tag.blocking_trigger_id),
            ] {
                for trigger_id in trigger_ids {
                    if !self.trigger_ids.contains(trigger_id.as_str()) {
                        issues.push(Issue::new(
                            DANGLING_REFERENCE,
                            severity_for(DANGLING_REFERENCE),
                            element([
                                ("tagId", json!(tag.tag_id)),
                                ("tagName", json!(tag.name)),
                                ("missing_trigger", json!(trigger_id)),
                                ("reference_type", json!(reference_type)),
                            ]),
                            format!(
                                "Tag '{}' references non-existent {} trigger {}",
                                tag.name,
                                if reference_type == "firingTriggerId" {
                                    "firing"
                                } else {
                                    "blocking"
                                },
                                trigger_id
                            ),
                            "Remove the invalid trigger reference or create the missing trigger",
                            MODULE,
                        ));
                    }
                }
            }
        }
        issues
    }

    fn builtin_variable_issues(&self, referenced: &FxHashSet<String>) -> Vec<Issue> {
        let mut names: Vec<&String> = referenced
            .iter()
            .filter(|name| {
                BUILTIN_VARIABLE_NAMES.contains(&name.as_str())
                    && !self.enabled_builtins.contains(name.as_str())
                    && !self.variable_names.contains(name.as_str())
            })
            .collect();
        // Set iteration order is arbitrary; report deterministically.
        names.sort();

        names
            .into_iter()
            .map(|name| {
                Issue::new(
                    BUILTIN_VARIABLE_ISSUE,
                    severity_for(BUILTIN_VARIABLE_ISSUE),
                    element([
                        ("variable_name", json!(name)),
                        ("used_but_not_enabled", json!(true)),
                    ]),
                    format!(
                        "Built-in variable '{}' is referenced but not enabled in the container",
                        name
                    ),
                    "Enable this built-in variable in GTM or remove references to it",
                    MODULE,
                )
            })
            .collect()
    }

    fn setup_blocking_issues(&self) -> Vec<Issue> {
        let mut issues = Vec::new();
        for tag in &self.container.tag {
            for (issue_type, key, refs) in [
                ("missing_setup_tag", "missing_setup_tag", &tag.setup_tag),
                (
                    "missing_teardown_tag",
                    "missing_teardown_tag",
                    &tag.teardown_tag,
                ),
            ] {
                for reference in refs {
                    if !self.tag_ids.contains(reference.tag_id.as_str()) {
                        issues.push(Issue::new(
                            SETUP_BLOCKING_ISSUE,
                            severity_for(SETUP_BLOCKING_ISSUE),
                            element([
                                ("tagId", json!(tag.tag_id)),
                                ("tagName", json!(tag.name)),
                                (key, json!(reference.tag_id)),
                                ("issue_type", json!(issue_type)),
                            ]),
                            format!(
                                "Tag '{}' references non-existent {} tag {}",
                                tag.name,
                                if issue_type == "missing_setup_tag" {
                                    "setup"
                                } else {
                                    "teardown"
                                },
                                reference.tag_id
                            ),
                            "Remove the invalid tag reference or create the missing tag",
                            MODULE,
                        ));
                    }
                }
            }
        }
        issues
    }
}

impl Analyzer for AssociationsAnalyzer<'_> {
    fn name(&self) -> &'static str {
        MODULE
    }

    fn analyze(&self) -> Result<Vec<Issue>> {
        debug!("starting associations analysis");
        let referenced = self.referenced_variable_names();

        let mut collector = IssueCollector::new();
        collector.add_all(self.orphaned_triggers());
        collector.add_all(self.unused_variables(&referenced));
        collector.add_all(self.dangling_references());
        collector.add_all(self.builtin_variable_issues(&referenced));
        collector.add_all(self.setup_blocking_issues());

        debug!(
            "associations analysis completed: {} issues found",
            collector.total()
        );
        Ok(collector.into_issues())
    }

    fn metrics(&self, _issues: &[Issue]) -> Summary {
        let mut metrics = Summary::new();
        metrics.insert(
            "total_tags_analyzed".to_string(),
            self.container.tag.len().into(),
        );
        metrics.insert(
            "total_triggers_analyzed".to_string(),
            self.container.trigger.len().into(),
        );
        metrics.insert(
            "total_variables_analyzed".to_string(),
            self.container.variable.len().into(),
        );
        metrics
    }
}

fn collect_parameter_refs(parameters: &[Parameter], refs: &mut FxHashSet<String>) {
    for param in parameters {
        if let Some(value) = &param.value {
            collect_text_refs(value, refs);
        }
        for nested in param.list.iter().flatten() {
            collect_value_refs(nested, refs);
        }
        for nested in param.map.iter().flatten() {
            collect_value_refs(nested, refs);
        }
    }
}

fn collect_value_refs(value: &Value, refs: &mut FxHashSet<String>) {
    match value {
        Value::String(text) => collect_text_refs(text, refs),
        Value::Array(items) => {
            for item in items {
                collect_value_refs(item, refs);
            }
        }
        Value::Object(map) => {
            for nested in map.values() {
                collect_value_refs(nested, refs);
            }
        }
        _ => {}
    }
}

fn collect_text_refs(text: &str, refs: &mut FxHashSet<String>) {
    for capture in VAR_REF.captures_iter(text) {
        refs.insert(capture[1].to_string());
    }
}
