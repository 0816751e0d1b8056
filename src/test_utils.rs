//! Shared test fixtures.

pub mod fixtures {
    use crate::model::{Container, Issue, Severity, Subject};
    use serde_json::json;

    pub fn make_issue(kind: &str, severity: Severity) -> Issue {
        let mut subject = Subject::new();
        subject.insert("id".to_string(), json!("1"));
        Issue::new(
            kind,
            severity,
            subject,
            "test message",
            "test recommendation",
            "associations",
        )
    }

    /// A small container with one wired-up tag/trigger pair plus one orphaned
    /// trigger and one unused variable.
    pub fn sample_container() -> Container {
        Container::from_json(
            r#"{
                "tag": [{"tagId": "1", "name": "GA4 Pageview", "type": "gaawe",
                         "notes": "Sends the GA4 page_view event on every page",
                         "parentFolderId": "100",
                         "firingTriggerId": ["10"]}],
                "trigger": [
                    {"triggerId": "10", "name": "All Pages", "type": "pageview",
                     "notes": "Fires on every page of the main site",
                     "parentFolderId": "100"},
                    {"triggerId": "11", "name": "Old Click", "type": "click",
                     "notes": "Leftover trigger from the 2023 campaign setup",
                     "parentFolderId": "100"}
                ],
                "variable": [{"variableId": "20", "name": "Old Lookup", "type": "smm",
                              "notes": "Maps legacy page paths to friendly names",
                              "parentFolderId": "100"}],
                "folder": [{"folderId": "100", "name": "Analytics"}]
            }"#,
        )
        .expect("sample container parses")
    }
}
