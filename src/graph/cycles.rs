//! Dependency cycle detection via strongly connected components.

use super::{DependencyGraph, NodeId};
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// A strongly connected component of two or more units.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct CycleFinding {
    /// Member ids, ascending
    pub members: Vec<NodeId>,
    /// Edges with both endpoints inside the component
    pub internal_edges: usize,
}

impl CycleFinding {
    pub fn contains(&self, id: &str) -> bool {
        self.members.binary_search_by(|m| m.as_str().cmp(id)).is_ok()
    }
}

/// Find every dependency cycle, ordered by member list.
pub fn detect_cycles(graph: &DependencyGraph) -> Vec<CycleFinding> {
    let digraph = build_petgraph(graph);

    let mut cycles: Vec<CycleFinding> = tarjan_scc(&digraph)
        .into_iter()
        .filter(|component| component.len() > 1)
        .map(|component| {
            let members: BTreeSet<&str> = component.iter().map(|&n| digraph[n]).collect();
            let internal_edges = graph
                .edges
                .iter()
                .filter(|e| {
                    members.contains(e.source.as_str()) && members.contains(e.target.as_str())
                })
                .count();
            CycleFinding {
                members: members.into_iter().map(str::to_string).collect(),
                internal_edges,
            }
        })
        .collect();

    cycles.sort();
    cycles
}

// Nodes are added in ascending id order so component discovery is stable
fn build_petgraph(graph: &DependencyGraph) -> DiGraph<&str, ()> {
    let mut digraph = DiGraph::new();
    let mut index: HashMap<&str, NodeIndex> = HashMap::new();

    for id in graph.node_ids() {
        index.insert(id, digraph.add_node(id));
    }
    for edge in &graph.edges {
        if let (Some(&from), Some(&to)) = (
            index.get(edge.source.as_str()),
            index.get(edge.target.as_str()),
        ) {
            digraph.update_edge(from, to, ());
        }
    }

    digraph
}
