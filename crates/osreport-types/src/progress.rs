//! Progress messages emitted during a refresh.
//!
//! Messages are transient: they live on a session's outlet for the lifetime
//! of one refresh and are never persisted. A session sees an optional
//! `start`, any number of `progress` messages and then exactly one terminal
//! message (`complete` or `error`).

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::report::ResourceType;
use crate::summary::TypeCounts;

/// Kind of progress message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProgressKind {
    Start,
    Progress,
    Complete,
    Error,
}

impl ProgressKind {
    /// Terminal kinds end a session's event sequence.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProgressKind::Complete | ProgressKind::Error)
    }
}

/// A single progress event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProgressMessage {
    #[serde(rename = "type")]
    pub kind: ProgressKind,
    pub message: String,
    /// Resource counts by type; only set on `complete`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub summary: Option<TypeCounts>,
    /// Project currently being collected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    /// Resource type currently being collected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<ResourceType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_step: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_steps: Option<u32>,
    /// Number of resources found in the step that just finished.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl ProgressMessage {
    fn new(kind: ProgressKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            summary: None,
            project: None,
            resource_type: None,
            current_step: None,
            total_steps: None,
            count: None,
        }
    }

    pub fn start(message: impl Into<String>) -> Self {
        Self::new(ProgressKind::Start, message)
    }

    pub fn progress(message: impl Into<String>) -> Self {
        Self::new(ProgressKind::Progress, message)
    }

    pub fn complete(message: impl Into<String>, summary: TypeCounts) -> Self {
        let mut msg = Self::new(ProgressKind::Complete, message);
        msg.summary = Some(summary);
        msg
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(ProgressKind::Error, message)
    }

    /// Name the project this event refers to.
    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// Name the resource type this event refers to.
    pub fn with_resource_type(mut self, resource_type: ResourceType) -> Self {
        self.resource_type = Some(resource_type);
        self
    }

    /// Position within the collector's overall plan.
    pub fn with_step(mut self, current: u32, total: u32) -> Self {
        self.current_step = Some(current);
        self.total_steps = Some(total);
        self
    }

    /// Number of resources found.
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    /// True for `complete` and `error`.
    pub fn is_terminal(&self) -> bool {
        self.kind.is_terminal()
    }
}
