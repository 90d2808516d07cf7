//! Coupling and complexity metrics.
//!
//! Node metrics follow Robert C. Martin's package metrics: afferent and
//! efferent coupling, instability, abstractness and distance from the main
//! sequence. Cluster metrics add boundary-level counts that feed the
//! weighted complexity score used by the gate and the planner.

pub mod cluster;
pub mod coupling;

pub use cluster::{
    boundary_edges, complexity_score, shared_tables, ClusterMetrics, ComplexityInputs,
};
pub use coupling::{compute_node_metrics, NodeMetrics};

use crate::config::{ComplexityBuckets, ComplexityWeights};
use crate::graph::{DependencyGraph, GraphFindings, NodeId};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeSet;

/// Complexity bucket a cluster falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityBucket {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for ComplexityBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        })
    }
}

/// Metrics computation bound to one run's weights and bucket boundaries.
#[derive(Debug, Clone, Default)]
pub struct MetricsEngine {
    pub weights: ComplexityWeights,
    pub buckets: ComplexityBuckets,
}

impl MetricsEngine {
    pub fn new(weights: ComplexityWeights, buckets: ComplexityBuckets) -> Self {
        Self { weights, buckets }
    }

    /// Metrics for one candidate cluster.
    pub fn cluster_metrics(
        &self,
        graph: &DependencyGraph,
        findings: &GraphFindings,
        members: &BTreeSet<NodeId>,
    ) -> ClusterMetrics {
        ClusterMetrics::compute(graph, findings, members, &self.weights, &self.buckets)
    }

    /// Metrics for every cluster, computed in parallel, in input order.
    pub fn cluster_metrics_all(
        &self,
        graph: &DependencyGraph,
        findings: &GraphFindings,
        clusters: &[BTreeSet<NodeId>],
    ) -> Vec<ClusterMetrics> {
        clusters
            .par_iter()
            .map(|members| self.cluster_metrics(graph, findings, members))
            .collect()
    }
}
