//! Assessment pipeline.
//!
//! A run is single-pass and stage-ordered:
//!
//! ```text
//! facts -> ingestion -> graph building -> metrics -> clustering -> gate -> planning
//! ```
//!
//! Stages never overlap. Parallelism lives inside stages (batch validation,
//! partial graphs, per-node and per-cluster metrics) and always ends in a
//! sequential merge. A run either completes every stage or fails as a whole.

pub mod deadline;
pub mod result;
pub mod stage;

pub use deadline::Deadline;
pub use result::AssessmentResult;
pub use stage::{run_stage, FallibleStage, PureStage, Stage};

use crate::boundary::propose_boundaries;
use crate::config::SplitmapConfig;
use crate::errors::{AssessmentError, Result};
use crate::facts::{ingest, FactBatch, IngestedFacts};
use crate::gate::{evaluate, GateInput};
use crate::graph::{build_graph, BuiltGraph, GraphSummary};
use crate::metrics::{compute_node_metrics, MetricsEngine};
use crate::observability::AnalysisPhase;
use crate::planner::plan_migration;
use tracing::{info, info_span};

/// Assess whether the codebase described by `batches` should be split into
/// services, and how.
///
/// Malformed facts are skipped and reported in the result. Any other problem
/// aborts the run.
pub fn run_assessment(
    batches: &[FactBatch],
    team_size: usize,
    config: &SplitmapConfig,
) -> Result<AssessmentResult> {
    config.validate()?;

    let budget = config.budget();
    let gate_thresholds = config.gate();
    let buckets = config.buckets();
    let clustering = config.clustering();
    let engine = MetricsEngine::new(config.weights(), buckets.clone());
    let deadline = Deadline::start(budget.deadline());

    let span = info_span!("assessment", batches = batches.len(), team_size);
    let _entered = span.enter();

    let ingestion = FallibleStage::new(
        "ingest facts",
        AnalysisPhase::Ingestion,
        |batches: &[FactBatch]| ingest(batches, &budget, &deadline),
    );
    let IngestedFacts { facts, summary } = run_stage(&ingestion, batches, &deadline)?;
    if facts.is_empty() {
        return Err(AssessmentError::EmptyGraph {
            skipped: summary.skipped_count(),
        });
    }

    let graph_building = PureStage::new(
        "build dependency graph",
        AnalysisPhase::GraphBuilding,
        build_graph,
    );
    let BuiltGraph { graph, findings } = run_stage(&graph_building, facts.as_slice(), &deadline)?;
    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        cycles = findings.cycle_count(),
        "Dependency graph built"
    );

    let node_metrics = run_stage(
        &PureStage::new(
            "compute node metrics",
            AnalysisPhase::Metrics,
            compute_node_metrics,
        ),
        &graph,
        &deadline,
    )?;

    let clustering_stage = FallibleStage::new(
        "propose boundaries",
        AnalysisPhase::Clustering,
        |_: ()| propose_boundaries(&graph, &findings, &engine, &clustering, &deadline),
    );
    let proposed = run_stage(&clustering_stage, (), &deadline)?;
    info!(
        clusters = proposed.clusters.len(),
        modularity = proposed.modularity,
        levels = proposed.levels,
        "Boundaries proposed"
    );

    let verdict = {
        let gate_stage = PureStage::new("evaluate viability", AnalysisPhase::Gate, |_: ()| {
            let input = GateInput::from_boundaries(&graph, &findings, &proposed, team_size);
            evaluate(input, &gate_thresholds, &buckets)
        });
        run_stage(&gate_stage, (), &deadline)?
    };
    info!(status = %verdict.status, "Viability verdict");

    let migration_plan = if verdict.status.allows_migration() {
        let planning = FallibleStage::new(
            "plan migration waves",
            AnalysisPhase::Planning,
            |_: ()| plan_migration(&graph, &proposed.clusters),
        );
        Some(run_stage(&planning, (), &deadline)?)
    } else {
        None
    };

    Ok(AssessmentResult {
        ingestion: summary,
        graph: GraphSummary::new(&graph, &findings),
        node_metrics,
        clusters: proposed.clusters,
        modularity: proposed.modularity,
        verdict,
        migration_plan,
    })
}
