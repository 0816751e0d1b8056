//! Shared data model: standardized issues and the container export schema.

pub mod container;
pub mod issue;

pub use container::{
    BuiltInVariable, Container, Folder, Parameter, Tag, TagReference, Trigger, TriggerFilter,
    Variable,
};
pub use issue::{
    count_by_severity, filter_by_min_severity, severity_weight, sort_by_severity_desc, Issue,
    Severity, Status, Subject,
};
