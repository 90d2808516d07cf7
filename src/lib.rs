//! Service decomposition assessment.
//!
//! Turns language-agnostic structural facts about a codebase into a dependency
//! graph, coupling metrics, proposed service boundaries, a viability verdict
//! and, when worth it, an ordered migration plan.
//!
//! ```rust
//! use splitmap::{run_assessment, FactBatch, RawFact, SplitmapConfig};
//!
//! let batch = FactBatch::new(
//!     "orders.jsonl",
//!     vec![
//!         RawFact::reference("Orders.Api", "Orders.Domain"),
//!         RawFact::table_access("Orders.Domain", "orders"),
//!     ],
//! );
//! let result = run_assessment(&[batch], 8, &SplitmapConfig::default()).unwrap();
//! assert_eq!(result.graph.node_count, 2);
//! ```

// Export modules for library usage
pub mod boundary;
pub mod cli;
pub mod config;
pub mod errors;
pub mod facts;
pub mod gate;
pub mod graph;
pub mod metrics;
pub mod observability;
pub mod pipeline;
pub mod planner;

// Re-export commonly used types
pub use crate::boundary::{propose_boundaries, Cluster, ProposedBoundaries};
pub use crate::config::{EcosystemPreset, SplitmapConfig};
pub use crate::errors::{AssessmentError, ErrorCode};
pub use crate::facts::{Fact, FactBatch, FactKind, IngestionSummary, RawFact};
pub use crate::gate::{Verdict, VerdictStatus};
pub use crate::graph::{DependencyGraph, Edge, EdgeKind, GraphSummary, Node, NodeId};
pub use crate::metrics::{ClusterMetrics, ComplexityBucket, MetricsEngine, NodeMetrics};
pub use crate::pipeline::{run_assessment, AssessmentResult, Deadline};
pub use crate::planner::{MigrationPlan, RollbackNote, Wave};
