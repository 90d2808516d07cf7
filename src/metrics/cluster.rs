//! Cluster-level metrics and the weighted complexity score.

use super::coupling::{instability, ratio};
use super::ComplexityBucket;
use crate::config::{ComplexityBuckets, ComplexityWeights};
use crate::graph::{DependencyGraph, Edge, GraphFindings, NodeId};
use serde::Serialize;
use std::collections::BTreeSet;

/// Counts entering the complexity score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComplexityInputs {
    pub node_count: usize,
    pub cross_boundary_refs: usize,
    pub shared_tables: usize,
    pub cycles: usize,
    pub external_integrations: usize,
}

/// Weighted sum of the complexity inputs.
///
/// All inputs are counts, so with non-negative weights raising any weight
/// can never lower the score.
pub fn complexity_score(inputs: &ComplexityInputs, weights: &ComplexityWeights) -> f64 {
    weights.node_count * inputs.node_count as f64
        + weights.cross_boundary_refs * inputs.cross_boundary_refs as f64
        + weights.shared_tables * inputs.shared_tables as f64
        + weights.cycles * inputs.cycles as f64
        + weights.external_integrations * inputs.external_integrations as f64
}

/// Edges with exactly one endpoint inside `members`, in graph order.
pub fn boundary_edges<'g>(
    graph: &'g DependencyGraph,
    members: &BTreeSet<NodeId>,
) -> Vec<&'g Edge> {
    graph
        .edges
        .iter()
        .filter(|e| members.contains(&e.source) != members.contains(&e.target))
        .collect()
}

/// Tables accessed both by a member and by a unit outside `members`.
pub fn shared_tables<'g>(
    graph: &'g DependencyGraph,
    members: &BTreeSet<NodeId>,
) -> BTreeSet<&'g str> {
    graph
        .table_accessors()
        .into_iter()
        .filter(|(_, accessors)| {
            let inside = accessors.iter().any(|a| members.contains(*a));
            let outside = accessors.iter().any(|a| !members.contains(*a));
            inside && outside
        })
        .map(|(table, _)| table)
        .collect()
}

/// Metrics of a proposed service boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterMetrics {
    pub node_count: usize,
    /// Distinct outside units with an edge into the cluster
    pub afferent_coupling: usize,
    /// Distinct outside units the cluster has an edge into
    pub efferent_coupling: usize,
    pub instability: f64,
    pub abstractness: f64,
    /// Distinct edges with one endpoint inside and one outside
    pub cross_boundary_ref_count: usize,
    pub shared_table_count: usize,
    /// Cycle findings with at least one member inside
    pub cycle_count: usize,
    pub external_integration_count: usize,
    pub complexity_score: f64,
    pub bucket: ComplexityBucket,
}

impl ClusterMetrics {
    pub fn compute(
        graph: &DependencyGraph,
        findings: &GraphFindings,
        members: &BTreeSet<NodeId>,
        weights: &ComplexityWeights,
        buckets: &ComplexityBuckets,
    ) -> Self {
        let crossing = boundary_edges(graph, members);

        let mut callers = BTreeSet::new();
        let mut callees = BTreeSet::new();
        for edge in &crossing {
            if members.contains(&edge.target) {
                callers.insert(edge.source.as_str());
            } else {
                callees.insert(edge.target.as_str());
            }
        }

        let member_nodes = || members.iter().filter_map(|id| graph.node(id));
        let declarations: usize = member_nodes().map(|n| n.declarations).sum();
        let abstract_declarations: usize = member_nodes().map(|n| n.abstract_declarations).sum();
        let integrations: BTreeSet<&str> = member_nodes()
            .flat_map(|n| n.external_integrations.iter().map(String::as_str))
            .collect();

        let inputs = ComplexityInputs {
            node_count: members.len(),
            cross_boundary_refs: crossing.len(),
            shared_tables: shared_tables(graph, members).len(),
            cycles: findings
                .cycles
                .iter()
                .filter(|c| c.members.iter().any(|m| members.contains(m)))
                .count(),
            external_integrations: integrations.len(),
        };
        let score = complexity_score(&inputs, weights);

        Self {
            node_count: inputs.node_count,
            afferent_coupling: callers.len(),
            efferent_coupling: callees.len(),
            instability: instability(callers.len(), callees.len()),
            abstractness: ratio(abstract_declarations, declarations),
            cross_boundary_ref_count: inputs.cross_boundary_refs,
            shared_table_count: inputs.shared_tables,
            cycle_count: inputs.cycles,
            external_integration_count: inputs.external_integrations,
            complexity_score: score,
            bucket: buckets.classify(score),
        }
    }
}
