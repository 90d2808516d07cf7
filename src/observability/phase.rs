//! Pipeline phases.
//!
//! Every stage, budget error and span names the phase it belongs to. The
//! phase is always passed explicitly: rayon workers inside a stage share no
//! thread state with the driver, so there is no ambient "current phase".

use serde::Serialize;

/// Pipeline phases, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisPhase {
    /// Validating, normalizing and deduplicating front-end facts
    Ingestion,
    /// Building the dependency graph and structural findings
    GraphBuilding,
    /// Computing per-node coupling metrics
    Metrics,
    /// Proposing service boundaries
    Clustering,
    /// Evaluating the viability gate
    Gate,
    /// Ordering clusters into extraction waves
    Planning,
}

impl AnalysisPhase {
    pub const ALL: [AnalysisPhase; 6] = [
        Self::Ingestion,
        Self::GraphBuilding,
        Self::Metrics,
        Self::Clustering,
        Self::Gate,
        Self::Planning,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ingestion => "ingestion",
            Self::GraphBuilding => "graph_building",
            Self::Metrics => "metrics",
            Self::Clustering => "clustering",
            Self::Gate => "gate",
            Self::Planning => "planning",
        }
    }
}

impl std::fmt::Display for AnalysisPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phases_are_ordered_by_execution() {
        let mut sorted = AnalysisPhase::ALL;
        sorted.sort();
        assert_eq!(sorted, AnalysisPhase::ALL);
        assert_eq!(AnalysisPhase::GraphBuilding.to_string(), "graph_building");
    }

    #[test]
    fn test_phase_serializes_in_snake_case() {
        let json = serde_json::to_string(&AnalysisPhase::GraphBuilding).unwrap();
        assert_eq!(json, "\"graph_building\"");
    }
}
