//! Data model for Google Tag Manager container exports.
//!
//! Mirrors the subset of the export schema the analyzers need. Field names
//! follow the export's camelCase wire format; unknown fields are ignored and
//! missing collections default to empty, so partial exports still parse.

use crate::error::{AuditError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

/// A parameter attached to a tag or variable. `list` and `map` hold nested
/// structures that may themselves contain `{{variable}}` references.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Parameter {
    pub key: Option<String>,
    pub value: Option<String>,
    pub list: Option<Vec<Value>>,
    pub map: Option<Vec<Value>>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// Reference to another tag from a setupTag/teardownTag entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TagReference {
    pub tag_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Tag {
    pub tag_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub notes: Option<String>,
    pub parent_folder_id: Option<String>,
    pub parameter: Vec<Parameter>,
    pub firing_trigger_id: Vec<String>,
    pub blocking_trigger_id: Vec<String>,
    pub setup_tag: Vec<TagReference>,
    pub teardown_tag: Vec<TagReference>,
}

/// One filter condition on a trigger; its parameters may reference variables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TriggerFilter {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub parameter: Vec<Parameter>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Trigger {
    pub trigger_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub notes: Option<String>,
    pub parent_folder_id: Option<String>,
    pub filter: Vec<TriggerFilter>,
    pub custom_event_filter: Vec<TriggerFilter>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Variable {
    pub variable_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub notes: Option<String>,
    pub parent_folder_id: Option<String>,
    pub parameter: Vec<Parameter>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuiltInVariable {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Folder {
    pub folder_id: String,
    pub name: String,
}

/// The analyzable content of one container version.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Container {
    pub tag: Vec<Tag>,
    pub trigger: Vec<Trigger>,
    pub variable: Vec<Variable>,
    pub built_in_variable: Vec<BuiltInVariable>,
    pub folder: Vec<Folder>,
}

impl Container {
    /// Parse an export document. Full exports wrap the content under
    /// `containerVersion`; bare container-version objects are accepted too.
    pub fn from_export(value: Value) -> Result<Self> {
        let inner = match value {
            Value::Object(mut map) => match map.remove("containerVersion") {
                Some(version) => version,
                None => Value::Object(map),
            },
            other => {
                return Err(AuditError::InvalidContainer(format!(
                    "expected a JSON object, got {}",
                    json_type_name(&other)
                )));
            }
        };
        Ok(serde_json::from_value(inner)?)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Self::from_export(serde_json::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(AuditError::FileNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path).map_err(|source| AuditError::ReadError {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Total number of tags, triggers, and variables.
    pub fn element_count(&self) -> usize {
        self.tag.len() + self.trigger.len() + self.variable.len()
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
