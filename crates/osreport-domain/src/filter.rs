//! Report filtering.
//!
//! Each dimension holds a list of accepted values. A resource passes when,
//! for every non-empty dimension, its value equals one of the accepted
//! values (AND across dimensions, OR within one). Comparisons are exact and
//! case-sensitive.

use osreport_types::{Report, Resource};
use serde::Deserialize;

/// Raw filter parameters as they arrive on a query string.
///
/// Every field is a comma-separated list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterQuery {
    /// Project names.
    pub project: Option<String>,
    /// Project IDs.
    pub project_id: Option<String>,
    /// Resource type wire names.
    #[serde(rename = "type")]
    pub resource_type: Option<String>,
    /// Status strings.
    pub status: Option<String>,
}

/// Parsed filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub project_names: Vec<String>,
    pub project_ids: Vec<String>,
    pub types: Vec<String>,
    pub statuses: Vec<String>,
}

impl FilterCriteria {
    /// A filter that accepts everything.
    pub fn all() -> Self {
        Self::default()
    }

    /// Parse query parameters into criteria.
    pub fn from_query(query: &FilterQuery) -> Self {
        let parse = |v: &Option<String>| v.as_deref().map(split_list).unwrap_or_default();
        Self {
            project_names: parse(&query.project),
            project_ids: parse(&query.project_id),
            types: parse(&query.resource_type),
            statuses: parse(&query.status),
        }
    }

    pub fn with_project_names(mut self, names: Vec<String>) -> Self {
        self.project_names = names;
        self
    }

    pub fn with_project_ids(mut self, ids: Vec<String>) -> Self {
        self.project_ids = ids;
        self
    }

    pub fn with_types(mut self, types: Vec<String>) -> Self {
        self.types = types;
        self
    }

    pub fn with_statuses(mut self, statuses: Vec<String>) -> Self {
        self.statuses = statuses;
        self
    }

    /// True if no dimension restricts anything.
    pub fn is_empty(&self) -> bool {
        self.project_names.is_empty()
            && self.project_ids.is_empty()
            && self.types.is_empty()
            && self.statuses.is_empty()
    }

    /// Whether `resource` passes every dimension.
    pub fn matches(&self, resource: &Resource) -> bool {
        accepts(&self.project_names, &resource.project_name)
            && accepts(&self.project_ids, &resource.project_id)
            && accepts(&self.types, resource.resource_type.as_str())
            && accepts(&self.statuses, &resource.status)
    }
}

impl From<&FilterQuery> for FilterCriteria {
    fn from(query: &FilterQuery) -> Self {
        Self::from_query(query)
    }
}

fn accepts(allowed: &[String], value: &str) -> bool {
    allowed.is_empty() || allowed.iter().any(|a| a == value)
}

/// Split a comma-separated list, trimming items and skipping empty ones.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Produce the filtered view of `report`.
///
/// Resource order is preserved and the summary is recomputed from the kept
/// resources. Projects and `generated_at` are passed through unchanged.
pub fn filter_report(report: &Report, criteria: &FilterCriteria) -> Report {
    let kept = report
        .resources
        .iter()
        .filter(|r| criteria.matches(r))
        .cloned()
        .collect();
    report.with_resources(kept)
}
