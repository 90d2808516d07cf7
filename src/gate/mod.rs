//! Viability gate: decides whether decomposition is worth attempting.
//!
//! The policy is an explicit rule table evaluated in a fixed order:
//!
//! 1. `DoNotProceed` when the team is smaller than the floor AND the
//!    aggregate complexity of all clusters is below the not-worth-it ceiling.
//! 2. `ProceedWithCaution` when any cluster is in the high bucket, when more
//!    tables than the risk threshold are shared across clusters, or when the
//!    number of dependency cycles reaches the cycle threshold. Every condition
//!    that fires adds its own reason.
//! 3. `Proceed` otherwise, with a reason per metric checked.
//!
//! Every verdict carries at least one reason naming the metric, its value
//! and the threshold it was compared against.
//!
//! The cycle rule counts every structural cycle finding, not only those the
//! proposed partition happens to cut. Louvain keeps a tight cycle inside one
//! cluster, yet the cycle still crosses a service boundary as soon as any of
//! its units is extracted on its own. Cycles already cut by the partition are
//! reported alongside as evidence.

use crate::boundary::ProposedBoundaries;
use crate::config::{ComplexityBuckets, GateThresholds};
use crate::graph::{DependencyGraph, GraphFindings};
use crate::metrics::ComplexityBucket;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Outcome class of the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictStatus {
    Proceed,
    ProceedWithCaution,
    DoNotProceed,
}

impl VerdictStatus {
    pub fn label(&self) -> &'static str {
        match self {
            VerdictStatus::Proceed => "PROCEED",
            VerdictStatus::ProceedWithCaution => "PROCEED WITH CAUTION",
            VerdictStatus::DoNotProceed => "DO NOT PROCEED",
        }
    }

    /// Whether a migration plan should be produced.
    pub fn allows_migration(&self) -> bool {
        !matches!(self, VerdictStatus::DoNotProceed)
    }
}

impl std::fmt::Display for VerdictStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The gate's decision with its audit trail.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub status: VerdictStatus,
    pub reasons: Vec<String>,
    pub evidence: GateInput,
}

/// Cluster of concern as seen by the gate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterScore {
    pub cluster_id: String,
    pub label: String,
    pub complexity_score: f64,
    pub bucket: ComplexityBucket,
}

/// Everything the gate decides on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GateInput {
    pub team_size: usize,
    pub clusters: Vec<ClusterScore>,
    /// Sum of cluster complexity scores
    pub aggregate_complexity: f64,
    /// Structural cycle findings, compared against the cycle threshold
    pub dependency_cycles: usize,
    /// Cycle findings whose members already fall in two or more clusters
    pub cross_cluster_cycles: usize,
    /// Tables accessed from two or more clusters
    pub cross_cluster_shared_tables: usize,
}

impl GateInput {
    /// Derive gate inputs from the proposed boundaries and graph findings.
    pub fn from_boundaries(
        graph: &DependencyGraph,
        findings: &GraphFindings,
        proposed: &ProposedBoundaries,
        team_size: usize,
    ) -> Self {
        let assignment = proposed.assignment();

        let cross_cluster_cycles = findings
            .cycles
            .iter()
            .filter(|cycle| {
                clusters_touched(&assignment, cycle.members.iter().map(String::as_str)) > 1
            })
            .count();

        let cross_cluster_shared_tables = graph
            .table_accessors()
            .values()
            .filter(|accessors| clusters_touched(&assignment, accessors.iter().copied()) > 1)
            .count();

        let clusters: Vec<ClusterScore> = proposed
            .clusters
            .iter()
            .map(|c| ClusterScore {
                cluster_id: c.id.clone(),
                label: c.label.clone(),
                complexity_score: c.metrics.complexity_score,
                bucket: c.metrics.bucket,
            })
            .collect();

        Self {
            team_size,
            aggregate_complexity: clusters.iter().map(|c| c.complexity_score).sum(),
            clusters,
            dependency_cycles: findings.cycle_count(),
            cross_cluster_cycles,
            cross_cluster_shared_tables,
        }
    }
}

/// Number of distinct clusters the given units fall in.
fn clusters_touched<'i>(
    assignment: &BTreeMap<&str, &str>,
    ids: impl IntoIterator<Item = &'i str>,
) -> usize {
    ids.into_iter()
        .filter_map(|id| assignment.get(id))
        .collect::<BTreeSet<_>>()
        .len()
}

/// Apply the gate policy.
pub fn evaluate(
    input: GateInput,
    thresholds: &GateThresholds,
    buckets: &ComplexityBuckets,
) -> Verdict {
    let (status, reasons) = if let Some(reason) = not_worth_it(&input, thresholds) {
        (VerdictStatus::DoNotProceed, vec![reason])
    } else {
        let cautions = caution_reasons(&input, thresholds, buckets);
        if cautions.is_empty() {
            (
                VerdictStatus::Proceed,
                proceed_reasons(&input, thresholds, buckets),
            )
        } else {
            (VerdictStatus::ProceedWithCaution, cautions)
        }
    };

    Verdict {
        status,
        reasons,
        evidence: input,
    }
}

fn not_worth_it(input: &GateInput, thresholds: &GateThresholds) -> Option<String> {
    let small_team = input.team_size < thresholds.team_size_floor;
    let simple = input.aggregate_complexity < thresholds.not_worth_it_ceiling;

    (small_team && simple).then(|| {
        format!(
            "team size {} is below the floor of {} and aggregate complexity {:.1} is below \
             the not-worth-it ceiling of {:.1}",
            input.team_size,
            thresholds.team_size_floor,
            input.aggregate_complexity,
            thresholds.not_worth_it_ceiling
        )
    })
}

fn caution_reasons(
    input: &GateInput,
    thresholds: &GateThresholds,
    buckets: &ComplexityBuckets,
) -> Vec<String> {
    let mut reasons: Vec<String> = input
        .clusters
        .iter()
        .filter(|c| c.bucket == ComplexityBucket::High)
        .map(|c| {
            format!(
                "cluster {} ({}) has complexity score {:.1}, above the high-bucket boundary \
                 of {:.1}",
                c.cluster_id, c.label, c.complexity_score, buckets.medium_max
            )
        })
        .collect();

    if input.cross_cluster_shared_tables > thresholds.shared_table_risk_threshold {
        reasons.push(format!(
            "{} tables are shared across clusters, above the risk threshold of {}",
            input.cross_cluster_shared_tables, thresholds.shared_table_risk_threshold
        ));
    }

    if input.dependency_cycles >= thresholds.cross_cluster_cycle_threshold {
        reasons.push(format!(
            "{} dependency cycles will cross service boundaries once extracted ({} already \
             span clusters), reaching the threshold of {}",
            input.dependency_cycles,
            input.cross_cluster_cycles,
            thresholds.cross_cluster_cycle_threshold
        ));
    }

    reasons
}

fn proceed_reasons(
    input: &GateInput,
    thresholds: &GateThresholds,
    buckets: &ComplexityBuckets,
) -> Vec<String> {
    let max_score = input
        .clusters
        .iter()
        .map(|c| c.complexity_score)
        .fold(0.0_f64, f64::max);

    let viability = if input.team_size >= thresholds.team_size_floor {
        format!(
            "team size {} meets the floor of {}",
            input.team_size, thresholds.team_size_floor
        )
    } else {
        format!(
            "aggregate complexity {:.1} reaches the not-worth-it ceiling of {:.1}",
            input.aggregate_complexity, thresholds.not_worth_it_ceiling
        )
    };

    vec![
        viability,
        format!(
            "highest cluster complexity score {:.1} is within the high-bucket boundary of {:.1}",
            max_score, buckets.medium_max
        ),
        format!(
            "{} tables are shared across clusters, within the risk threshold of {}",
            input.cross_cluster_shared_tables, thresholds.shared_table_risk_threshold
        ),
        format!(
            "{} dependency cycles would cross service boundaries once extracted, below the \
             threshold of {}",
            input.dependency_cycles, thresholds.cross_cluster_cycle_threshold
        ),
    ]
}
