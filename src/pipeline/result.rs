//! The single artifact an assessment run emits.

use crate::boundary::Cluster;
use crate::facts::IngestionSummary;
use crate::gate::{Verdict, VerdictStatus};
use crate::graph::{GraphSummary, NodeId};
use crate::metrics::NodeMetrics;
use crate::planner::MigrationPlan;
use serde::Serialize;
use std::collections::BTreeMap;

/// Everything a run produced.
///
/// Contains no timings or other run-dependent values, so serializing the
/// result of two runs over the same input yields identical bytes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentResult {
    pub ingestion: IngestionSummary,
    pub graph: GraphSummary,
    pub node_metrics: BTreeMap<NodeId, NodeMetrics>,
    pub clusters: Vec<Cluster>,
    pub modularity: f64,
    pub verdict: Verdict,
    /// Absent when the verdict is `DoNotProceed`
    pub migration_plan: Option<MigrationPlan>,
}

impl AssessmentResult {
    pub fn status(&self) -> VerdictStatus {
        self.verdict.status
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
