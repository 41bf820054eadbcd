//! Aggregate counts over a resource sequence.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::report::{Resource, ResourceType};

/// Per-type resource counts, keyed by type.
pub type TypeCounts = BTreeMap<ResourceType, usize>;

/// Count resources by type.
///
/// Types with no resources are absent from the map.
pub fn type_counts(resources: &[Resource]) -> TypeCounts {
    let mut counts = TypeCounts::new();
    for resource in resources {
        *counts.entry(resource.resource_type).or_default() += 1;
    }
    counts
}

/// Aggregate counts for a report.
///
/// A summary is a pure function of a resource slice. It is never edited in
/// place; filtered views call [`Summary::from_resources`] again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Summary {
    /// Distinct non-empty project IDs among the resources.
    pub total_projects: usize,
    pub total_servers: usize,
    pub total_volumes: usize,
    pub total_load_balancers: usize,
    pub total_floating_ips: usize,
    pub total_vpn_services: usize,
    pub total_clusters: usize,
    pub total_routers: usize,
    pub total_networks: usize,
}

impl Summary {
    /// Compute the summary of a resource slice.
    pub fn from_resources(resources: &[Resource]) -> Self {
        let mut summary = Summary::default();

        let projects: HashSet<&str> = resources
            .iter()
            .map(|r| r.project_id.as_str())
            .filter(|id| !id.is_empty())
            .collect();
        summary.total_projects = projects.len();

        for resource in resources {
            *summary.counter_mut(resource.resource_type) += 1;
        }

        summary
    }

    /// Count for one resource type.
    pub fn count(&self, resource_type: ResourceType) -> usize {
        match resource_type {
            ResourceType::Server => self.total_servers,
            ResourceType::Volume => self.total_volumes,
            ResourceType::LoadBalancer => self.total_load_balancers,
            ResourceType::FloatingIp => self.total_floating_ips,
            ResourceType::VpnService => self.total_vpn_services,
            ResourceType::Cluster => self.total_clusters,
            ResourceType::Router => self.total_routers,
            ResourceType::Network => self.total_networks,
        }
    }

    /// Sum of all per-type counters.
    pub fn total_resources(&self) -> usize {
        ResourceType::ALL.iter().map(|t| self.count(*t)).sum()
    }

    fn counter_mut(&mut self, resource_type: ResourceType) -> &mut usize {
        match resource_type {
            ResourceType::Server => &mut self.total_servers,
            ResourceType::Volume => &mut self.total_volumes,
            ResourceType::LoadBalancer => &mut self.total_load_balancers,
            ResourceType::FloatingIp => &mut self.total_floating_ips,
            ResourceType::VpnService => &mut self.total_vpn_services,
            ResourceType::Cluster => &mut self.total_clusters,
            ResourceType::Router => &mut self.total_routers,
            ResourceType::Network => &mut self.total_networks,
        }
    }
}
