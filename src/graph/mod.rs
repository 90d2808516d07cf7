//! Typed dependency graph over compilation units.
//!
//! Nodes are compilation units identified by their qualified name; edges are
//! weighted, directed relations keyed by `(source, target, kind)`. The graph
//! is built once per run and never mutated afterwards.
//!
//! Structural invariants:
//! - no self-loop edges
//! - every edge endpoint is a node of the graph
//!
//! Cycles are allowed; they are reported as [`CycleFinding`]s.

pub mod builder;
pub mod cycles;

pub use builder::{build_graph, BuiltGraph, GraphFindings, OwnershipConflict};
pub use cycles::{detect_cycles, CycleFinding};

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Stable qualified name of a compilation unit.
pub type NodeId = String;

/// Granularity of a compilation unit, finest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Class,
    Namespace,
    Project,
}

impl UnitKind {
    pub fn parse(kind: &str) -> Option<Self> {
        match kind.trim().to_ascii_lowercase().as_str() {
            "class" | "type" | "interface" => Some(Self::Class),
            "namespace" | "module" | "package" => Some(Self::Namespace),
            "project" | "assembly" | "crate" => Some(Self::Project),
            _ => None,
        }
    }
}

/// A compilation unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Node {
    pub id: NodeId,
    pub unit_kind: Option<UnitKind>,
    pub owning_team: Option<String>,
    pub table_access: BTreeSet<String>,
    pub shared_state: BTreeSet<String>,
    pub external_integrations: BTreeSet<String>,
    pub declarations: usize,
    pub abstract_declarations: usize,
}

impl Node {
    pub fn new(id: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}

/// Kind of structural relation between two units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Reference,
    Call,
    SharedTable,
    SharedState,
}

/// Directed, weighted relation. Weight counts the facts that produced it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
    pub kind: EdgeKind,
    pub weight: u64,
}

/// The canonical graph of one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DependencyGraph {
    pub nodes: BTreeMap<NodeId, Node>,
    /// Sorted by `(source, target, kind)`
    pub edges: Vec<Edge>,
}

impl DependencyGraph {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Node ids in ascending order.
    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    pub fn total_weight(&self) -> u64 {
        self.edges.iter().map(|e| e.weight).sum()
    }

    /// Distinct tables accessed by any unit.
    pub fn tables(&self) -> BTreeSet<&str> {
        self.nodes
            .values()
            .flat_map(|n| n.table_access.iter().map(String::as_str))
            .collect()
    }

    /// Units accessing each table.
    pub fn table_accessors(&self) -> BTreeMap<&str, BTreeSet<&str>> {
        let mut accessors: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for node in self.nodes.values() {
            for table in &node.table_access {
                accessors
                    .entry(table.as_str())
                    .or_default()
                    .insert(node.id.as_str());
            }
        }
        accessors
    }

    /// Distinct-neighbour view used by the coupling metrics.
    pub fn adjacency(&self) -> Adjacency<'_> {
        let mut adjacency = Adjacency::default();
        for edge in &self.edges {
            adjacency
                .outgoing
                .entry(edge.source.as_str())
                .or_default()
                .insert(edge.target.as_str());
            adjacency
                .incoming
                .entry(edge.target.as_str())
                .or_default()
                .insert(edge.source.as_str());
        }
        adjacency
    }

    /// Check the structural invariants.
    pub fn validate(&self) -> Result<(), String> {
        for edge in &self.edges {
            if edge.source == edge.target {
                return Err(format!("self-loop edge on '{}'", edge.source));
            }
            for endpoint in [&edge.source, &edge.target] {
                if !self.nodes.contains_key(endpoint) {
                    return Err(format!("edge endpoint '{endpoint}' is not a node"));
                }
            }
        }
        Ok(())
    }
}

/// Distinct predecessors and successors per node.
#[derive(Debug, Default)]
pub struct Adjacency<'a> {
    pub outgoing: BTreeMap<&'a str, BTreeSet<&'a str>>,
    pub incoming: BTreeMap<&'a str, BTreeSet<&'a str>>,
}

impl<'a> Adjacency<'a> {
    pub fn successors(&self, id: &str) -> Option<&BTreeSet<&'a str>> {
        self.outgoing.get(id)
    }

    pub fn predecessors(&self, id: &str) -> Option<&BTreeSet<&'a str>> {
        self.incoming.get(id)
    }
}

/// Compact description of the graph for the assessment result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphSummary {
    pub node_count: usize,
    pub edge_count: usize,
    pub total_edge_weight: u64,
    pub edges_by_kind: BTreeMap<EdgeKind, usize>,
    pub table_count: usize,
    pub teams: BTreeSet<String>,
    pub findings: GraphFindings,
}

impl GraphSummary {
    pub fn new(graph: &DependencyGraph, findings: &GraphFindings) -> Self {
        let mut edges_by_kind = BTreeMap::new();
        for edge in &graph.edges {
            *edges_by_kind.entry(edge.kind).or_insert(0) += 1;
        }

        Self {
            node_count: graph.node_count(),
            edge_count: graph.edge_count(),
            total_edge_weight: graph.total_weight(),
            edges_by_kind,
            table_count: graph.tables().len(),
            teams: graph
                .nodes
                .values()
                .filter_map(|n| n.owning_team.clone())
                .collect(),
            findings: findings.clone(),
        }
    }
}
