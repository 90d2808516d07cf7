//! Per-node coupling metrics.

use crate::graph::{Adjacency, DependencyGraph, Node, NodeId};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;

/// Martin metrics for one compilation unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeMetrics {
    /// Ca: distinct units with an edge into this one
    pub afferent_coupling: usize,
    /// Ce: distinct units this one has an edge into
    pub efferent_coupling: usize,
    /// Ce / (Ca + Ce), 0 for an unconnected unit
    pub instability: f64,
    /// Interface/contract-only declarations over all declarations
    pub abstractness: f64,
    /// |A + I - 1|
    pub distance: f64,
    pub declarations: usize,
}

impl NodeMetrics {
    fn compute(node: &Node, adjacency: &Adjacency<'_>) -> Self {
        let afferent_coupling = adjacency.predecessors(&node.id).map_or(0, |p| p.len());
        let efferent_coupling = adjacency.successors(&node.id).map_or(0, |s| s.len());
        let instability = instability(afferent_coupling, efferent_coupling);
        let abstractness = ratio(node.abstract_declarations, node.declarations);

        Self {
            afferent_coupling,
            efferent_coupling,
            instability,
            abstractness,
            distance: (abstractness + instability - 1.0).abs(),
            declarations: node.declarations,
        }
    }
}

/// Ce / (Ca + Ce), defined as 0 when both are 0.
pub fn instability(afferent: usize, efferent: usize) -> f64 {
    ratio(efferent, afferent + efferent)
}

pub(crate) fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

/// Metrics for every node, keyed by node id.
///
/// Computed in parallel; the graph is only read.
pub fn compute_node_metrics(graph: &DependencyGraph) -> BTreeMap<NodeId, NodeMetrics> {
    let adjacency = graph.adjacency();
    let nodes: Vec<&Node> = graph.nodes.values().collect();

    nodes
        .par_iter()
        .map(|node| (node.id.clone(), NodeMetrics::compute(node, &adjacency)))
        .collect::<Vec<_>>()
        .into_iter()
        .collect()
}
