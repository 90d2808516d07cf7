//! Migration planning: orders clusters into extraction waves.
//!
//! Waves extract the least complex cluster first. Ties fall back to fewer
//! shared tables, then to the smallest member id, so the order is total.
//!
//! Every wave records the edges and tables that must be restorable for the
//! extraction to be reverted. [`MigrationPlan::verify_reversible`] checks
//! those notes against the graph.

use crate::boundary::Cluster;
use crate::errors::{AssessmentError, Result};
use crate::graph::{DependencyGraph, Edge, EdgeKind, NodeId};
use crate::metrics::{boundary_edges, shared_tables, ComplexityBucket};
use serde::Serialize;
use std::cmp::Ordering;

/// One extraction step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Wave {
    /// 1-based position in the plan
    pub order: usize,
    pub cluster_id: String,
    pub label: String,
    /// Negated complexity score; higher extracts earlier
    pub priority_score: f64,
    pub shared_table_count: usize,
    pub risk: ComplexityBucket,
    pub risk_notes: Vec<String>,
    pub rollback_note: RollbackNote,
}

/// What must be restorable to revert a wave.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollbackNote {
    pub restorable_edges: Vec<RestorableEdge>,
    pub restorable_tables: Vec<String>,
    pub condition: String,
}

/// A boundary-crossing dependency that the rollback must reconnect.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct RestorableEdge {
    pub source: NodeId,
    pub target: NodeId,
    pub kind: EdgeKind,
}

impl From<&Edge> for RestorableEdge {
    fn from(edge: &Edge) -> Self {
        Self {
            source: edge.source.clone(),
            target: edge.target.clone(),
            kind: edge.kind,
        }
    }
}

impl RollbackNote {
    fn for_cluster(graph: &DependencyGraph, cluster: &Cluster) -> Self {
        let restorable_edges: Vec<RestorableEdge> = boundary_edges(graph, &cluster.members)
            .into_iter()
            .map(RestorableEdge::from)
            .collect();
        let restorable_tables: Vec<String> = shared_tables(graph, &cluster.members)
            .into_iter()
            .map(str::to_string)
            .collect();

        let condition = if restorable_edges.is_empty() && restorable_tables.is_empty() {
            format!(
                "{} has no boundary dependencies; redeploying its units in place reverts it",
                cluster.id
            )
        } else {
            format!(
                "revertible while the {} boundary edges stay reconnectable in-process and the \
                 {} shared tables stay readable and writable by both sides",
                restorable_edges.len(),
                restorable_tables.len()
            )
        };

        Self {
            restorable_edges,
            restorable_tables,
            condition,
        }
    }
}

/// Ordered extraction waves.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MigrationPlan {
    pub waves: Vec<Wave>,
}

impl MigrationPlan {
    pub fn len(&self) -> usize {
        self.waves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waves.is_empty()
    }

    /// Check that every cluster is extracted exactly once, in order, and that
    /// each wave's rollback note covers exactly its boundary edges and shared
    /// tables.
    pub fn verify_reversible(&self, graph: &DependencyGraph, clusters: &[Cluster]) -> Result<()> {
        if self.waves.len() != clusters.len() {
            return Err(AssessmentError::PartitionInvariant(format!(
                "migration plan has {} waves for {} clusters",
                self.waves.len(),
                clusters.len()
            )));
        }

        for (position, wave) in self.waves.iter().enumerate() {
            if wave.order != position + 1 {
                return Err(AssessmentError::PartitionInvariant(format!(
                    "wave at position {} is numbered {}",
                    position + 1,
                    wave.order
                )));
            }

            let cluster = clusters
                .iter()
                .find(|c| c.id == wave.cluster_id)
                .ok_or_else(|| {
                    AssessmentError::PartitionInvariant(format!(
                        "wave {} extracts unknown cluster {}",
                        wave.order, wave.cluster_id
                    ))
                })?;

            let expected = RollbackNote::for_cluster(graph, cluster);
            if expected.restorable_edges != wave.rollback_note.restorable_edges
                || expected.restorable_tables != wave.rollback_note.restorable_tables
            {
                return Err(AssessmentError::PartitionInvariant(format!(
                    "rollback note of wave {} ({}) does not cover its boundary: expected {} \
                     edges and {} tables, found {} edges and {} tables",
                    wave.order,
                    wave.cluster_id,
                    expected.restorable_edges.len(),
                    expected.restorable_tables.len(),
                    wave.rollback_note.restorable_edges.len(),
                    wave.rollback_note.restorable_tables.len()
                )));
            }
        }

        Ok(())
    }
}

/// Extraction order: lower complexity, then fewer shared tables, then
/// smallest member id.
pub fn compare_extraction_order(a: &Cluster, b: &Cluster) -> Ordering {
    a.metrics
        .complexity_score
        .partial_cmp(&b.metrics.complexity_score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.metrics.shared_table_count.cmp(&b.metrics.shared_table_count))
        .then_with(|| a.first_member().cmp(b.first_member()))
}

/// Build the migration plan and verify its rollback notes.
pub fn plan_migration(graph: &DependencyGraph, clusters: &[Cluster]) -> Result<MigrationPlan> {
    let mut ordered: Vec<&Cluster> = clusters.iter().collect();
    ordered.sort_by(|a, b| compare_extraction_order(a, b));

    let waves = ordered
        .into_iter()
        .enumerate()
        .map(|(i, cluster)| Wave {
            order: i + 1,
            cluster_id: cluster.id.clone(),
            label: cluster.label.clone(),
            priority_score: 0.0 - cluster.metrics.complexity_score,
            shared_table_count: cluster.metrics.shared_table_count,
            risk: cluster.metrics.bucket,
            risk_notes: risk_notes(cluster),
            rollback_note: RollbackNote::for_cluster(graph, cluster),
        })
        .collect();

    let plan = MigrationPlan { waves };
    plan.verify_reversible(graph, clusters)?;
    Ok(plan)
}

fn risk_notes(cluster: &Cluster) -> Vec<String> {
    let metrics = &cluster.metrics;
    let mut notes = Vec::new();

    if metrics.bucket == ComplexityBucket::High {
        notes.push(format!(
            "complexity score {:.1} is in the high bucket",
            metrics.complexity_score
        ));
    }
    if metrics.shared_table_count > 0 {
        notes.push(format!(
            "shares {} tables with units outside the cluster; plan data ownership first",
            metrics.shared_table_count
        ));
    }
    if metrics.cycle_count > 0 {
        notes.push(format!(
            "participates in {} dependency cycles; break them before extraction",
            metrics.cycle_count
        ));
    }
    if metrics.external_integration_count > 0 {
        notes.push(format!(
            "owns {} external integrations that must move with it",
            metrics.external_integration_count
        ));
    }

    notes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::{Fact, RawFact};
    use crate::graph::{build_graph, BuiltGraph};
    use crate::metrics::ClusterMetrics;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;

    fn built(raw: Vec<RawFact>) -> BuiltGraph {
        let facts: Vec<Fact> = raw
            .iter()
            .enumerate()
            .map(|(i, r)| Fact::from_raw(r, "test", i).unwrap())
            .collect();
        build_graph(&facts)
    }

    fn metrics(score: f64, shared_tables: usize) -> ClusterMetrics {
        ClusterMetrics {
            node_count: 1,
            afferent_coupling: 0,
            efferent_coupling: 0,
            instability: 0.0,
            abstractness: 0.0,
            cross_boundary_ref_count: 0,
            shared_table_count: shared_tables,
            cycle_count: 0,
            external_integration_count: 0,
            complexity_score: score,
            bucket: ComplexityBucket::Low,
        }
    }

    fn cluster(id: &str, member: &str, score: f64, shared_tables: usize) -> Cluster {
        Cluster {
            id: id.into(),
            label: member.into(),
            dominant_team: None,
            members: BTreeSet::from([member.to_string()]),
            metrics: metrics(score, shared_tables),
        }
    }

    fn isolated(ids: &[&str]) -> DependencyGraph {
        built(ids.iter().map(|id| RawFact::declaration(*id)).collect()).graph
    }

    #[test]
    fn test_waves_extract_least_complex_first() {
        let graph = isolated(&["A", "B", "C"]);
        let clusters = vec![
            cluster("cluster-001", "A", 5.0, 0),
            cluster("cluster-002", "B", 10.0, 0),
            cluster("cluster-003", "C", 2.0, 0),
        ];

        let plan = plan_migration(&graph, &clusters).unwrap();
        let order: Vec<_> = plan.waves.iter().map(|w| w.cluster_id.as_str()).collect();
        assert_eq!(order, vec!["cluster-003", "cluster-001", "cluster-002"]);
        let priorities: Vec<_> = plan.waves.iter().map(|w| w.priority_score).collect();
        assert_eq!(priorities, vec![-2.0, -5.0, -10.0]);
        assert_eq!(plan.waves[0].order, 1);
    }

    #[test]
    fn test_ties_break_on_shared_tables_then_member_id() {
        let graph = isolated(&["A", "B", "C"]);
        let clusters = vec![
            cluster("cluster-001", "A", 4.0, 2),
            cluster("cluster-002", "B", 4.0, 1),
            cluster("cluster-003", "C", 4.0, 1),
        ];

        let plan = plan_migration(&graph, &clusters).unwrap();
        let order: Vec<_> = plan.waves.iter().map(|w| w.label.as_str()).collect();
        assert_eq!(order, vec!["B", "C", "A"]);
    }

    #[test]
    fn test_rollback_note_lists_boundary() {
        let b = built(vec![
            RawFact::reference("Web", "Orders"),
            RawFact::call("Orders", "Billing"),
            RawFact::table_access("Orders", "orders"),
            RawFact::table_access("Billing", "orders"),
        ]);
        let engine = crate::metrics::MetricsEngine::default();
        let clusters: Vec<Cluster> = [
            ("cluster-001", "Billing"),
            ("cluster-002", "Orders"),
            ("cluster-003", "Web"),
        ]
        .iter()
        .map(|(id, member)| {
            let members = BTreeSet::from([member.to_string()]);
            Cluster {
                id: id.to_string(),
                label: member.to_string(),
                dominant_team: None,
                metrics: engine.cluster_metrics(&b.graph, &b.findings, &members),
                members,
            }
        })
        .collect();

        let plan = plan_migration(&b.graph, &clusters).unwrap();
        let orders = plan.waves.iter().find(|w| w.label == "Orders").unwrap();
        assert_eq!(
            orders.rollback_note.restorable_edges,
            vec![
                RestorableEdge {
                    source: "Orders".into(),
                    target: "Billing".into(),
                    kind: EdgeKind::Call,
                },
                RestorableEdge {
                    source: "Web".into(),
                    target: "Orders".into(),
                    kind: EdgeKind::Reference,
                },
            ]
        );
        assert_eq!(orders.rollback_note.restorable_tables, vec!["orders"]);
        assert!(orders.risk_notes[0].contains("shares 1 tables"));

        let web = plan.waves.iter().find(|w| w.label == "Web").unwrap();
        assert!(web.rollback_note.restorable_tables.is_empty());
        assert!(web.risk_notes.is_empty());
    }

    #[test]
    fn test_tampered_rollback_note_fails_verification() {
        let b = built(vec![RawFact::reference("A", "B")]);
        let clusters = vec![
            cluster("cluster-001", "A", 3.0, 0),
            cluster("cluster-002", "B", 3.0, 0),
        ];
        let mut plan = plan_migration(&b.graph, &clusters).unwrap();
        assert!(plan.verify_reversible(&b.graph, &clusters).is_ok());

        plan.waves[0].rollback_note.restorable_edges.clear();
        let err = plan.verify_reversible(&b.graph, &clusters).unwrap_err();
        assert!(err.to_string().contains("does not cover its boundary"));
    }

    #[test]
    fn test_plan_must_cover_every_cluster() {
        let graph = isolated(&["A", "B"]);
        let clusters = vec![
            cluster("cluster-001", "A", 1.0, 0),
            cluster("cluster-002", "B", 1.0, 0),
        ];
        let mut plan = plan_migration(&graph, &clusters).unwrap();
        plan.waves.pop();

        assert!(plan.verify_reversible(&graph, &clusters).is_err());
    }
}
