//! Boundary proposal: partitions the dependency graph into candidate services.
//!
//! Clusters come from deterministic Louvain modularity optimization over the
//! undirected projection of the graph. Units that declare the same owning
//! team are pulled together through a virtual team hub, and units touching
//! the same tables or shared state are linked, so proposed boundaries follow
//! team and data lines where the code allows it.
//!
//! The same graph and configuration always yield the same clusters, the
//! same ids, and the same labels.

mod community;
pub mod partition;

pub use partition::validate_partition;

use crate::config::ClusteringConfig;
use crate::errors::Result;
use crate::graph::{DependencyGraph, GraphFindings, NodeId};
use crate::metrics::{ClusterMetrics, MetricsEngine};
use crate::pipeline::Deadline;
use community::{apply_community_detection, modularity, WeightedGraph};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

const QUALIFIED_NAME_SEPARATOR: char = '.';

/// A proposed service boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cluster {
    /// `cluster-001`, `cluster-002`, ... in order of smallest member
    pub id: String,
    pub label: String,
    pub dominant_team: Option<String>,
    pub members: BTreeSet<NodeId>,
    pub metrics: ClusterMetrics,
}

impl Cluster {
    pub fn contains(&self, id: &str) -> bool {
        self.members.contains(id)
    }

    /// Smallest member id, used for ordering ties.
    pub fn first_member(&self) -> &str {
        self.members.first().map_or("", String::as_str)
    }
}

/// Output of the boundary proposer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProposedBoundaries {
    pub clusters: Vec<Cluster>,
    /// Newman modularity of the partition over the structural edges only
    pub modularity: f64,
    /// Louvain aggregation levels that produced a move
    pub levels: usize,
}

impl ProposedBoundaries {
    /// Map every node to the id of its cluster.
    pub fn assignment(&self) -> BTreeMap<&str, &str> {
        self.clusters
            .iter()
            .flat_map(|c| c.members.iter().map(move |m| (m.as_str(), c.id.as_str())))
            .collect()
    }

    pub fn member_sets(&self) -> Vec<BTreeSet<NodeId>> {
        self.clusters.iter().map(|c| c.members.clone()).collect()
    }
}

/// Partition `graph` into clusters and compute their metrics.
///
/// Fails with `PartitionInvariant` if the clusters do not cover the graph
/// exactly once, and with `BudgetExceeded` if the deadline passes while
/// clustering.
pub fn propose_boundaries(
    graph: &DependencyGraph,
    findings: &GraphFindings,
    engine: &MetricsEngine,
    config: &ClusteringConfig,
    deadline: &Deadline,
) -> Result<ProposedBoundaries> {
    let seeded = WeightedGraph::seeded(graph, config);
    let communities = apply_community_detection(&seeded, config, deadline)?;

    let member_sets = group_members(graph, &communities.membership);
    validate_partition(graph, &member_sets)?;

    let metrics = engine.cluster_metrics_all(graph, findings, &member_sets);
    let clusters = member_sets
        .into_iter()
        .zip(metrics)
        .enumerate()
        .map(|(i, (members, metrics))| {
            let dominant_team = dominant_team(graph, &members);
            Cluster {
                id: cluster_id(i),
                label: cluster_label(dominant_team.as_deref(), &members),
                dominant_team,
                members,
                metrics,
            }
        })
        .collect();

    let structural = WeightedGraph::structural(graph);
    Ok(ProposedBoundaries {
        clusters,
        modularity: modularity(&structural, &communities.membership),
        levels: communities.levels,
    })
}

/// Member sets ordered by smallest member.
fn group_members(graph: &DependencyGraph, membership: &[usize]) -> Vec<BTreeSet<NodeId>> {
    let mut groups: BTreeMap<usize, BTreeSet<NodeId>> = BTreeMap::new();
    for (id, &community) in graph.node_ids().zip(membership) {
        groups.entry(community).or_default().insert(id.to_string());
    }

    let mut sets: Vec<BTreeSet<NodeId>> = groups.into_values().collect();
    sets.sort_by(|a, b| a.first().cmp(&b.first()));
    sets
}

pub(crate) fn cluster_id(index: usize) -> String {
    format!("cluster-{:03}", index + 1)
}

/// Most common declared team among the members. Ties go to the smallest name.
fn dominant_team(graph: &DependencyGraph, members: &BTreeSet<NodeId>) -> Option<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for node in members.iter().filter_map(|id| graph.node(id)) {
        if let Some(team) = &node.owning_team {
            *counts.entry(team.as_str()).or_insert(0) += 1;
        }
    }

    counts
        .into_iter()
        .fold(None, |best: Option<(&str, usize)>, (team, count)| match best {
            Some((_, top)) if top >= count => best,
            _ => Some((team, count)),
        })
        .map(|(team, _)| team.to_string())
}

fn cluster_label(dominant_team: Option<&str>, members: &BTreeSet<NodeId>) -> String {
    if let Some(team) = dominant_team {
        return team.to_string();
    }
    let prefix = common_prefix(members);
    if !prefix.is_empty() {
        return prefix;
    }
    members.first().cloned().unwrap_or_default()
}

/// Longest run of leading qualified-name segments shared by every member.
fn common_prefix(members: &BTreeSet<NodeId>) -> String {
    let mut names = members.iter();
    let Some(first) = names.next() else {
        return String::new();
    };

    let mut shared: Vec<&str> = first.split(QUALIFIED_NAME_SEPARATOR).collect();
    for name in names {
        let common = shared
            .iter()
            .zip(name.split(QUALIFIED_NAME_SEPARATOR))
            .take_while(|(a, b)| **a == *b)
            .count();
        shared.truncate(common);
    }

    shared.join(".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::{meta, Fact, RawFact};
    use crate::graph::{build_graph, BuiltGraph};
    use pretty_assertions::assert_eq;

    fn built(raw: Vec<RawFact>) -> BuiltGraph {
        let facts: Vec<Fact> = raw
            .iter()
            .enumerate()
            .map(|(i, r)| Fact::from_raw(r, "test", i).unwrap())
            .collect();
        build_graph(&facts)
    }

    fn propose(b: &BuiltGraph) -> ProposedBoundaries {
        propose_boundaries(
            &b.graph,
            &b.findings,
            &MetricsEngine::default(),
            &ClusteringConfig::default(),
            &Deadline::start(std::time::Duration::from_secs(60)),
        )
        .unwrap()
    }

    fn set(ids: &[&str]) -> BTreeSet<NodeId> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn shop() -> BuiltGraph {
        built(vec![
            RawFact::reference("Orders.Api", "Orders.Domain"),
            RawFact::reference("Orders.Domain", "Orders.Data"),
            RawFact::reference("Orders.Data", "Orders.Api"),
            RawFact::reference("Billing.Api", "Billing.Invoices"),
            RawFact::reference("Billing.Invoices", "Billing.Ledger"),
            RawFact::reference("Billing.Ledger", "Billing.Api"),
            RawFact::call("Orders.Domain", "Billing.Api"),
        ])
    }

    #[test]
    fn test_clusters_follow_dense_groups() {
        let proposed = propose(&shop());

        let members: Vec<_> = proposed.clusters.iter().map(|c| c.members.clone()).collect();
        assert_eq!(
            members,
            vec![
                set(&["Billing.Api", "Billing.Invoices", "Billing.Ledger"]),
                set(&["Orders.Api", "Orders.Data", "Orders.Domain"]),
            ]
        );
        assert_eq!(proposed.clusters[0].id, "cluster-001");
        assert_eq!(proposed.clusters[0].label, "Billing");
        assert_eq!(proposed.clusters[1].label, "Orders");
        assert!(proposed.modularity > 0.0);
    }

    #[test]
    fn test_proposal_is_reproducible() {
        let b = shop();
        let first = propose(&b);
        for _ in 0..5 {
            assert_eq!(propose(&b), first);
        }
    }

    #[test]
    fn test_team_label_wins_over_prefix() {
        let b = built(vec![
            RawFact::declaration("Search.Index").meta(meta::TEAM, "discovery"),
            RawFact::declaration("Search.Query").meta(meta::TEAM, "discovery"),
        ]);
        let proposed = propose(&b);

        assert_eq!(proposed.clusters.len(), 1);
        assert_eq!(proposed.clusters[0].label, "discovery");
        assert_eq!(
            proposed.clusters[0].dominant_team.as_deref(),
            Some("discovery")
        );
    }

    #[test]
    fn test_isolated_units_become_singletons() {
        let b = built(vec![RawFact::declaration("Zeta"), RawFact::declaration("Alpha")]);
        let proposed = propose(&b);

        let labels: Vec<_> = proposed.clusters.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["Alpha", "Zeta"]);
        assert_eq!(proposed.modularity, 0.0);
        assert_eq!(proposed.assignment().get("Zeta"), Some(&"cluster-002"));
    }

    #[test]
    fn test_label_falls_back_to_smallest_member() {
        assert_eq!(cluster_label(None, &set(&["Web", "Api"])), "Api");
        assert_eq!(
            cluster_label(None, &set(&["Shop.Cart.Api", "Shop.Cart.Store"])),
            "Shop.Cart"
        );
    }

    #[test]
    fn test_dominant_team_tie_takes_smallest_name() {
        let b = built(vec![
            RawFact::declaration("A").meta(meta::TEAM, "zulu"),
            RawFact::declaration("B").meta(meta::TEAM, "alpha"),
            RawFact::declaration("C"),
        ]);
        assert_eq!(
            dominant_team(&b.graph, &set(&["A", "B", "C"])).as_deref(),
            Some("alpha")
        );
    }
}
