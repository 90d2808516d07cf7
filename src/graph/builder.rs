//! Graph construction from the deduplicated fact set.
//!
//! Facts are split into chunks that rayon workers turn into independent
//! [`PartialGraph`]s. The partials are then folded, in chunk order, into one
//! canonical graph by a single thread. Edge weights are only ever summed in
//! that fold, so accumulation never races.

use super::cycles::{detect_cycles, CycleFinding};
use super::{DependencyGraph, Edge, EdgeKind, Node, NodeId, UnitKind};
use crate::facts::{meta, Fact, FactKind};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

const FACTS_PER_CHUNK: usize = 2048;

/// A unit declared with more than one owning team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnershipConflict {
    pub unit: NodeId,
    pub teams: Vec<String>,
    /// Team the unit was assigned to (the lexicographically smallest)
    pub resolved: String,
}

/// Structural findings recorded while building the graph. Not errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphFindings {
    pub cycles: Vec<CycleFinding>,
    pub ownership_conflicts: Vec<OwnershipConflict>,
    pub self_references_dropped: usize,
}

impl GraphFindings {
    pub fn cycle_count(&self) -> usize {
        self.cycles.len()
    }
}

/// Output of the graph builder stage.
#[derive(Debug, Clone)]
pub struct BuiltGraph {
    pub graph: DependencyGraph,
    pub findings: GraphFindings,
}

#[derive(Debug, Default)]
struct NodeDraft {
    unit_kinds: BTreeSet<UnitKind>,
    teams: BTreeSet<String>,
    tables: BTreeSet<String>,
    states: BTreeSet<String>,
    integrations: BTreeSet<String>,
    declarations: usize,
    abstract_declarations: usize,
}

impl NodeDraft {
    fn absorb(&mut self, other: NodeDraft) {
        self.unit_kinds.extend(other.unit_kinds);
        self.teams.extend(other.teams);
        self.tables.extend(other.tables);
        self.states.extend(other.states);
        self.integrations.extend(other.integrations);
        self.declarations += other.declarations;
        self.abstract_declarations += other.abstract_declarations;
    }
}

type EdgeKey = (NodeId, NodeId, EdgeKind);

/// Graph fragment built by one worker from one chunk of facts.
#[derive(Debug, Default)]
struct PartialGraph {
    nodes: BTreeMap<NodeId, NodeDraft>,
    edges: BTreeMap<EdgeKey, u64>,
    self_references: usize,
}

impl PartialGraph {
    fn from_facts(facts: &[Fact]) -> Self {
        let mut partial = Self::default();
        for fact in facts {
            partial.add_fact(fact);
        }
        partial
    }

    fn node_mut(&mut self, id: &str) -> &mut NodeDraft {
        self.nodes.entry(id.to_string()).or_default()
    }

    fn add_fact(&mut self, fact: &Fact) {
        let source = fact.source_unit.as_str();
        let node = self.node_mut(source);

        let edge_kind = match fact.kind {
            FactKind::Declaration => {
                node.declarations += 1;
                if fact.is_abstract() {
                    node.abstract_declarations += 1;
                }
                node.unit_kinds.extend(fact.unit_kind());
                node.teams.extend(fact.meta(meta::TEAM).map(str::to_string));
                // Declarations describe the unit itself; a target carries no relation
                return;
            }
            FactKind::Reference => EdgeKind::Reference,
            FactKind::Call => {
                if let Some(integration) = fact.meta(meta::INTEGRATION) {
                    node.integrations.insert(integration.to_string());
                }
                EdgeKind::Call
            }
            FactKind::TableAccess => {
                node.tables.extend(fact.meta(meta::TABLE).map(str::to_string));
                EdgeKind::SharedTable
            }
            FactKind::SharedState => {
                node.states.extend(fact.meta(meta::STATE).map(str::to_string));
                EdgeKind::SharedState
            }
        };

        let Some(target) = fact.target_unit.as_deref() else {
            return;
        };
        if target == source {
            self.self_references += 1;
            return;
        }

        self.node_mut(target);
        *self
            .edges
            .entry((source.to_string(), target.to_string(), edge_kind))
            .or_insert(0) += 1;
    }

    fn merge(&mut self, other: PartialGraph) {
        for (id, draft) in other.nodes {
            self.nodes.entry(id).or_default().absorb(draft);
        }
        for (key, weight) in other.edges {
            *self.edges.entry(key).or_insert(0) += weight;
        }
        self.self_references += other.self_references;
    }

    fn finish(self) -> BuiltGraph {
        let mut ownership_conflicts = Vec::new();

        let nodes = self
            .nodes
            .into_iter()
            .map(|(id, draft)| {
                let owning_team = draft.teams.iter().next().cloned();
                if draft.teams.len() > 1 {
                    if let Some(resolved) = owning_team.clone() {
                        debug!(unit = %id, teams = ?draft.teams, "Ambiguous ownership");
                        ownership_conflicts.push(OwnershipConflict {
                            unit: id.clone(),
                            teams: draft.teams.iter().cloned().collect(),
                            resolved,
                        });
                    }
                }

                let node = Node {
                    id: id.clone(),
                    unit_kind: draft.unit_kinds.iter().next_back().copied(),
                    owning_team,
                    table_access: draft.tables,
                    shared_state: draft.states,
                    external_integrations: draft.integrations,
                    declarations: draft.declarations,
                    abstract_declarations: draft.abstract_declarations,
                };
                (id, node)
            })
            .collect();

        let edges = self
            .edges
            .into_iter()
            .map(|((source, target, kind), weight)| Edge {
                source,
                target,
                kind,
                weight,
            })
            .collect();

        let graph = DependencyGraph { nodes, edges };
        let cycles = detect_cycles(&graph);
        for cycle in &cycles {
            debug!(members = ?cycle.members, "Dependency cycle");
        }

        BuiltGraph {
            graph,
            findings: GraphFindings {
                cycles,
                ownership_conflicts,
                self_references_dropped: self.self_references,
            },
        }
    }
}

/// Build the dependency graph and its structural findings.
///
/// Every unit named by any fact becomes a node. Relations between distinct
/// units accumulate into one weighted edge per `(source, target, kind)`;
/// self-references are dropped and counted.
pub fn build_graph(facts: &[Fact]) -> BuiltGraph {
    let partials: Vec<PartialGraph> = facts
        .par_chunks(FACTS_PER_CHUNK)
        .map(PartialGraph::from_facts)
        .collect();

    let merged = partials
        .into_iter()
        .fold(PartialGraph::default(), |mut canonical, partial| {
            canonical.merge(partial);
            canonical
        });

    let built = merged.finish();
    debug!(
        nodes = built.graph.node_count(),
        edges = built.graph.edge_count(),
        cycles = built.findings.cycle_count(),
        "Graph built"
    );
    built
}
