//! Complexity score weights.
//!
//! ```text
//! complexityScore = w1*nodeCount + w2*crossBoundaryRefCount + w3*sharedTableCount
//!                 + w4*cycleCount + w5*externalIntegrationCount
//! ```

use serde::{Deserialize, Serialize};

/// Weights of the cluster complexity score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplexityWeights {
    /// w1: weight per member node
    #[serde(default = "default_node_count_weight")]
    pub node_count: f64,

    /// w2: weight per edge crossing the cluster boundary
    #[serde(default = "default_cross_boundary_weight")]
    pub cross_boundary_refs: f64,

    /// w3: weight per table shared with the rest of the system
    #[serde(default = "default_shared_table_weight")]
    pub shared_tables: f64,

    /// w4: weight per dependency cycle touching the cluster
    #[serde(default = "default_cycle_weight")]
    pub cycles: f64,

    /// w5: weight per external integration used by the cluster
    #[serde(default = "default_external_integration_weight")]
    pub external_integrations: f64,
}

impl Default for ComplexityWeights {
    fn default() -> Self {
        Self {
            node_count: default_node_count_weight(),
            cross_boundary_refs: default_cross_boundary_weight(),
            shared_tables: default_shared_table_weight(),
            cycles: default_cycle_weight(),
            external_integrations: default_external_integration_weight(),
        }
    }
}

impl ComplexityWeights {
    // Pure function: a weight must be a finite non-negative number
    pub fn is_valid_weight(weight: f64) -> bool {
        weight.is_finite() && weight >= 0.0
    }

    /// Validate every weight, collecting all problems.
    pub fn validate(&self) -> Vec<String> {
        [
            ("weights.node_count", self.node_count),
            ("weights.cross_boundary_refs", self.cross_boundary_refs),
            ("weights.shared_tables", self.shared_tables),
            ("weights.cycles", self.cycles),
            ("weights.external_integrations", self.external_integrations),
        ]
        .into_iter()
        .filter(|(_, weight)| !Self::is_valid_weight(*weight))
        .map(|(name, weight)| format!("{name} must be finite and >= 0.0 (got {weight})"))
        .collect()
    }
}

pub fn default_node_count_weight() -> f64 {
    1.0
}
pub fn default_cross_boundary_weight() -> f64 {
    2.0
}
pub fn default_shared_table_weight() -> f64 {
    3.0
}
pub fn default_cycle_weight() -> f64 {
    4.0
}
pub fn default_external_integration_weight() -> f64 {
    2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights() {
        let weights = ComplexityWeights::default();
        assert_eq!(
            (
                weights.node_count,
                weights.cross_boundary_refs,
                weights.shared_tables,
                weights.cycles,
                weights.external_integrations
            ),
            (1.0, 2.0, 3.0, 4.0, 2.0)
        );
        assert!(weights.validate().is_empty());
    }

    #[test]
    fn test_rejects_negative_and_nan() {
        let weights = ComplexityWeights {
            shared_tables: -1.0,
            cycles: f64::NAN,
            ..Default::default()
        };
        let problems = weights.validate();
        assert_eq!(problems.len(), 2);
        assert!(problems[0].contains("weights.shared_tables"));
        assert!(problems[1].contains("weights.cycles"));
    }
}
