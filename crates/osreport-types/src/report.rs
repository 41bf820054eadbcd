//! Report and resource types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::summary::Summary;
use crate::{Timestamp, now};

/// A full inventory snapshot.
///
/// Reports are immutable once produced: a refresh builds a new report and
/// replaces the stored one wholesale. The `summary` always describes the
/// `resources` it ships with; use [`Report::with_resources`] rather than
/// assigning `resources` directly so the two cannot drift apart. A summary
/// found in serialized input is ignored and recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Report {
    /// When the collector produced this report.
    pub generated_at: DateTime<Utc>,
    /// Projects visible to the collector, in collector order.
    pub projects: Vec<Project>,
    /// All resources, in collector order.
    pub resources: Vec<Resource>,
    /// Aggregate counts derived from `resources`.
    pub summary: Summary,
}

impl Report {
    /// Build a report stamped with the current time.
    pub fn new(projects: Vec<Project>, resources: Vec<Resource>) -> Self {
        Self::generated_at(now(), projects, resources)
    }

    /// Build a report with an explicit generation timestamp.
    pub fn generated_at(
        generated_at: Timestamp,
        projects: Vec<Project>,
        resources: Vec<Resource>,
    ) -> Self {
        let summary = Summary::from_resources(&resources);
        Self {
            generated_at,
            projects,
            resources,
            summary,
        }
    }

    /// Same metadata, different resources; the summary is recomputed.
    pub fn with_resources(&self, resources: Vec<Resource>) -> Self {
        Self::generated_at(self.generated_at, self.projects.clone(), resources)
    }

    /// Number of resources in the report.
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// True if the report has no resources.
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

/// Serialized form of a [`Report`]; `summary` is accepted but not trusted.
#[derive(Deserialize)]
struct RawReport {
    generated_at: DateTime<Utc>,
    #[serde(default)]
    projects: Vec<Project>,
    #[serde(default)]
    resources: Vec<Resource>,
}

impl<'de> Deserialize<'de> for Report {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawReport::deserialize(deserializer)?;
        Ok(Report::generated_at(raw.generated_at, raw.projects, raw.resources))
    }
}

/// A project (tenant).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_id: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl Project {
    /// Create an enabled project with no description.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            domain_id: None,
            enabled: true,
        }
    }
}

/// A single cloud resource.
///
/// Only `resource_type`, `status` and the project fields are interpreted by
/// the service; `properties` carries type-specific attributes verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Resource {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub project_name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    #[schema(value_type = Object)]
    pub properties: serde_json::Value,
}

impl Resource {
    /// Create a resource with empty name, no timestamps and no properties.
    pub fn new(id: impl Into<String>, resource_type: ResourceType) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            resource_type,
            project_id: String::new(),
            project_name: String::new(),
            status: String::new(),
            created_at: None,
            updated_at: None,
            properties: serde_json::Value::Null,
        }
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the owning project.
    pub fn with_project(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.project_id = id.into();
        self.project_name = name.into();
        self
    }

    /// Set the status string.
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    /// Attach type-specific properties.
    pub fn with_properties(mut self, properties: serde_json::Value) -> Self {
        self.properties = properties;
        self
    }
}

/// Kind of resource.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Server,
    Volume,
    LoadBalancer,
    FloatingIp,
    VpnService,
    Cluster,
    Router,
    Network,
}

impl ResourceType {
    /// Every resource type, in summary order.
    pub const ALL: [ResourceType; 8] = [
        ResourceType::Server,
        ResourceType::Volume,
        ResourceType::LoadBalancer,
        ResourceType::FloatingIp,
        ResourceType::VpnService,
        ResourceType::Cluster,
        ResourceType::Router,
        ResourceType::Network,
    ];

    /// Wire name, identical to the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Server => "server",
            ResourceType::Volume => "volume",
            ResourceType::LoadBalancer => "load_balancer",
            ResourceType::FloatingIp => "floating_ip",
            ResourceType::VpnService => "vpn_service",
            ResourceType::Cluster => "cluster",
            ResourceType::Router => "router",
            ResourceType::Network => "network",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no known resource type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown resource type: {0}")]
pub struct ParseResourceTypeError(pub String);

impl FromStr for ResourceType {
    type Err = ParseResourceTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ParseResourceTypeError(s.to_string()))
    }
}
