//! Community detection for service boundaries.
//!
//! Implements the Louvain method over an undirected, weighted projection of
//! the dependency graph. The projection used for clustering adds two kinds of
//! non-structural links:
//!
//! - **Shared data**: units touching the same table or piece of shared state
//!   are linked once per shared item. Items touched by more than
//!   `max_data_accessors` units are global and carry no boundary signal.
//! - **Team affinity**: every team with two or more units gets one virtual
//!   hub node, linked to each member. Hubs sit after the units in index order
//!   and never appear in the returned membership.
//!
//! # Properties
//!
//! - Deterministic output for same input (ties resolve by node-id order)
//! - Linear in team size; no pairwise team links are materialized
//! - The run deadline is checked between passes and between levels

use crate::config::ClusteringConfig;
use crate::errors::Result;
use crate::graph::DependencyGraph;
use crate::observability::AnalysisPhase;
use crate::pipeline::Deadline;
use std::collections::{BTreeMap, HashMap};

/// Symmetric weighted graph indexed by position in ascending node-id order.
#[derive(Debug, Clone)]
pub(crate) struct WeightedGraph {
    adjacency: Vec<BTreeMap<usize, f64>>,
    degrees: Vec<f64>,
    /// Sum of all degrees (twice the total edge weight)
    total: f64,
    /// Leading entries that are real units; the rest are team hubs
    units: usize,
}

impl WeightedGraph {
    /// Project the structural edges only.
    ///
    /// The weight between two units is the sum of their edge weights in both
    /// directions.
    pub(crate) fn structural(graph: &DependencyGraph) -> Self {
        let index = unit_index(graph);
        let mut adjacency = vec![BTreeMap::new(); index.len()];
        add_structural_edges(graph, &index, &mut adjacency);
        Self::from_adjacency(adjacency, index.len())
    }

    /// Project the structural edges plus shared-data links and team hubs.
    pub(crate) fn seeded(graph: &DependencyGraph, config: &ClusteringConfig) -> Self {
        let index = unit_index(graph);
        let units = index.len();
        let mut adjacency = vec![BTreeMap::new(); units];
        add_structural_edges(graph, &index, &mut adjacency);

        if config.shared_data_affinity > 0.0 {
            let (tables, states) = data_accessors(graph, &index);
            for accessors in tables.values().chain(states.values()) {
                if accessors.len() > config.max_data_accessors {
                    continue;
                }
                for (pos, &a) in accessors.iter().enumerate() {
                    for &b in &accessors[pos + 1..] {
                        add_symmetric(&mut adjacency, a, b, config.shared_data_affinity);
                    }
                }
            }
        }

        if config.team_affinity > 0.0 {
            for members in team_members(graph, &index).values() {
                if members.len() < 2 {
                    continue;
                }
                let hub = adjacency.len();
                adjacency.push(BTreeMap::new());
                for &member in members {
                    add_symmetric(&mut adjacency, member, hub, config.team_affinity);
                }
            }
        }

        Self::from_adjacency(adjacency, units)
    }

    fn from_adjacency(adjacency: Vec<BTreeMap<usize, f64>>, units: usize) -> Self {
        let degrees: Vec<f64> = adjacency.iter().map(|row| row.values().sum()).collect();
        let total = degrees.iter().sum();
        Self {
            adjacency,
            degrees,
            total,
            units,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.adjacency.len()
    }
}

fn unit_index(graph: &DependencyGraph) -> HashMap<&str, usize> {
    graph
        .node_ids()
        .enumerate()
        .map(|(i, id)| (id, i))
        .collect()
}

fn add_structural_edges(
    graph: &DependencyGraph,
    index: &HashMap<&str, usize>,
    adjacency: &mut [BTreeMap<usize, f64>],
) {
    for edge in &graph.edges {
        if let (Some(&a), Some(&b)) = (
            index.get(edge.source.as_str()),
            index.get(edge.target.as_str()),
        ) {
            add_symmetric(adjacency, a, b, edge.weight as f64);
        }
    }
}

fn add_symmetric(adjacency: &mut [BTreeMap<usize, f64>], a: usize, b: usize, weight: f64) {
    if a == b {
        return;
    }
    *adjacency[a].entry(b).or_insert(0.0) += weight;
    *adjacency[b].entry(a).or_insert(0.0) += weight;
}

type Accessors<'g> = BTreeMap<&'g str, Vec<usize>>;

/// Units touching each table and each piece of shared state, in unit order.
fn data_accessors<'g>(
    graph: &'g DependencyGraph,
    index: &HashMap<&str, usize>,
) -> (Accessors<'g>, Accessors<'g>) {
    let mut tables: Accessors<'g> = BTreeMap::new();
    let mut states: Accessors<'g> = BTreeMap::new();
    for node in graph.nodes.values() {
        let Some(&i) = index.get(node.id.as_str()) else {
            continue;
        };
        for table in &node.table_access {
            tables.entry(table.as_str()).or_default().push(i);
        }
        for state in &node.shared_state {
            states.entry(state.as_str()).or_default().push(i);
        }
    }
    (tables, states)
}

fn team_members(
    graph: &DependencyGraph,
    index: &HashMap<&str, usize>,
) -> BTreeMap<String, Vec<usize>> {
    let mut teams: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for node in graph.nodes.values() {
        if let (Some(team), Some(&i)) = (&node.owning_team, index.get(node.id.as_str())) {
            teams.entry(team.clone()).or_default().push(i);
        }
    }
    teams
}

/// Outcome of community detection.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Communities {
    /// Community of every unit, indexed like the weighted graph.
    /// Communities are numbered by first appearance in unit order.
    pub membership: Vec<usize>,
    pub levels: usize,
}

/// Apply Louvain community detection.
///
/// # Algorithm
///
/// 1. Start with each node in its own community
/// 2. Visit nodes in order, moving each to the neighbouring community with
///    the largest strictly positive modularity gain
/// 3. Repeat until a pass makes no moves
/// 4. Collapse communities into single nodes and repeat from 2
/// 5. Stop when a level makes no moves
pub(crate) fn apply_community_detection(
    graph: &WeightedGraph,
    config: &ClusteringConfig,
    deadline: &Deadline,
) -> Result<Communities> {
    let mut membership: Vec<usize> = (0..graph.len()).collect();
    if graph.total <= 0.0 {
        membership.truncate(graph.units);
        return Ok(Communities {
            membership,
            levels: 0,
        });
    }

    let mut level_graph = graph.clone();
    let mut levels = 0;

    while levels < config.max_levels {
        let (assignment, moved) = iteratively_improve_communities(&level_graph, config, deadline)?;
        if !moved {
            break;
        }
        levels += 1;

        let renumbered = renumber_by_first_appearance(&assignment);
        for community in membership.iter_mut() {
            *community = renumbered[assignment[*community]];
        }
        level_graph = aggregate(&level_graph, &assignment, &renumbered);
        deadline.check(AnalysisPhase::Clustering)?;
    }

    // Hubs come last, so units keep first-appearance numbering from 0
    membership.truncate(graph.units);
    Ok(Communities { membership, levels })
}

/// Local-moving phase: returns the community of each node and whether any
/// node moved.
fn iteratively_improve_communities(
    graph: &WeightedGraph,
    config: &ClusteringConfig,
    deadline: &Deadline,
) -> Result<(Vec<usize>, bool)> {
    let mut community: Vec<usize> = (0..graph.len()).collect();
    let mut totals = graph.degrees.clone();
    let mut moved_any = false;

    for _ in 0..config.max_passes {
        deadline.check(AnalysisPhase::Clustering)?;
        let mut moved = false;

        for node in 0..graph.len() {
            let current = community[node];
            let best = find_best_community(node, &community, &mut totals, graph, config);
            if best != current {
                community[node] = best;
                moved = true;
            }
        }

        if !moved {
            break;
        }
        moved_any = true;
    }

    Ok((community, moved_any))
}

/// Remove `node` from its community and return the community it should join.
///
/// The node's degree is added back to the returned community's total.
fn find_best_community(
    node: usize,
    community: &[usize],
    totals: &mut [f64],
    graph: &WeightedGraph,
    config: &ClusteringConfig,
) -> usize {
    let current = community[node];
    let degree = graph.degrees[node];
    totals[current] -= degree;

    let links = links_to_communities(node, community, graph);
    let view: &[f64] = totals;
    let gain = |c: usize| links.get(&c).copied().unwrap_or(0.0) - view[c] * degree / graph.total;

    let mut best = current;
    let mut best_gain = gain(current);
    for &candidate in links.keys() {
        let candidate_gain = gain(candidate);
        if candidate_gain > best_gain + config.min_modularity_gain {
            best = candidate;
            best_gain = candidate_gain;
        }
    }

    totals[best] += degree;
    best
}

/// Weight from `node` into each neighbouring community, self-loop excluded.
fn links_to_communities(
    node: usize,
    community: &[usize],
    graph: &WeightedGraph,
) -> BTreeMap<usize, f64> {
    let mut links = BTreeMap::new();
    for (&neighbour, &weight) in &graph.adjacency[node] {
        if neighbour != node {
            *links.entry(community[neighbour]).or_insert(0.0) += weight;
        }
    }
    links
}

/// Map community labels to 0.. in order of first appearance.
fn renumber_by_first_appearance(assignment: &[usize]) -> Vec<usize> {
    let size = assignment.iter().copied().max().map_or(0, |m| m + 1);
    let mut renumbered = vec![usize::MAX; size];
    let mut next = 0;
    for &community in assignment {
        if renumbered[community] == usize::MAX {
            renumbered[community] = next;
            next += 1;
        }
    }
    renumbered
}

/// Collapse each community into one node; internal weight becomes a self-loop.
fn aggregate(graph: &WeightedGraph, assignment: &[usize], renumbered: &[usize]) -> WeightedGraph {
    let count = assignment
        .iter()
        .map(|&c| renumbered[c] + 1)
        .max()
        .unwrap_or(0);
    let mut adjacency = vec![BTreeMap::new(); count];

    for (node, row) in graph.adjacency.iter().enumerate() {
        let from = renumbered[assignment[node]];
        for (&neighbour, &weight) in row {
            let to = renumbered[assignment[neighbour]];
            *adjacency[from].entry(to).or_insert(0.0) += weight;
        }
    }

    WeightedGraph::from_adjacency(adjacency, count)
}

/// Newman modularity of a partition of the graph's units.
pub(crate) fn modularity(graph: &WeightedGraph, membership: &[usize]) -> f64 {
    if graph.total <= 0.0 {
        return 0.0;
    }

    let communities = membership.iter().copied().max().map_or(0, |m| m + 1);
    let mut internal = vec![0.0; communities];
    let mut totals = vec![0.0; communities];

    for (node, row) in graph.adjacency.iter().enumerate() {
        let c = membership[node];
        totals[c] += graph.degrees[node];
        for (&neighbour, &weight) in row {
            if membership[neighbour] == c {
                internal[c] += weight;
            }
        }
    }

    internal
        .iter()
        .zip(&totals)
        .map(|(inside, total)| inside / graph.total - (total / graph.total).powi(2))
        .sum()
}
