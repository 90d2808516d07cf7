use crate::metrics::ComplexityBucket;
use serde::{Deserialize, Serialize};

/// Boundaries between complexity buckets.
///
/// A score at or below `low_max` is low, at or below `medium_max` is medium,
/// anything above is high. Ecosystems with larger typical projects supply
/// larger boundaries (see `EcosystemPreset`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplexityBuckets {
    #[serde(default = "default_low_max")]
    pub low_max: f64,

    #[serde(default = "default_medium_max")]
    pub medium_max: f64,
}

impl Default for ComplexityBuckets {
    fn default() -> Self {
        Self {
            low_max: default_low_max(),
            medium_max: default_medium_max(),
        }
    }
}

impl ComplexityBuckets {
    /// Bucket a complexity score falls into.
    pub fn classify(&self, score: f64) -> ComplexityBucket {
        if score <= self.low_max {
            ComplexityBucket::Low
        } else if score <= self.medium_max {
            ComplexityBucket::Medium
        } else {
            ComplexityBucket::High
        }
    }

    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if !self.low_max.is_finite() || self.low_max < 0.0 {
            problems.push(format!(
                "buckets.low_max must be finite and >= 0.0 (got {})",
                self.low_max
            ));
        }
        if !self.medium_max.is_finite() || self.medium_max <= self.low_max {
            problems.push(format!(
                "buckets.medium_max ({}) must be finite and greater than buckets.low_max ({})",
                self.medium_max, self.low_max
            ));
        }
        problems
    }
}

fn default_low_max() -> f64 {
    15.0
}
fn default_medium_max() -> f64 {
    40.0
}

/// Viability gate thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateThresholds {
    /// Teams smaller than this gain little from independent services
    #[serde(default = "default_team_size_floor")]
    pub team_size_floor: usize,

    /// Aggregate complexity below which decomposition is not worth it
    #[serde(default = "default_not_worth_it_ceiling")]
    pub not_worth_it_ceiling: f64,

    /// Caution when more tables than this are shared across clusters
    #[serde(default = "default_shared_table_risk_threshold")]
    pub shared_table_risk_threshold: usize,

    /// Caution when at least this many structural dependency cycles exist.
    /// The key keeps its historical name for config compatibility.
    #[serde(default = "default_cross_cluster_cycle_threshold")]
    pub cross_cluster_cycle_threshold: usize,
}

impl Default for GateThresholds {
    fn default() -> Self {
        Self {
            team_size_floor: default_team_size_floor(),
            not_worth_it_ceiling: default_not_worth_it_ceiling(),
            shared_table_risk_threshold: default_shared_table_risk_threshold(),
            cross_cluster_cycle_threshold: default_cross_cluster_cycle_threshold(),
        }
    }
}

impl GateThresholds {
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if !self.not_worth_it_ceiling.is_finite() || self.not_worth_it_ceiling < 0.0 {
            problems.push(format!(
                "gate.not_worth_it_ceiling must be finite and >= 0.0 (got {})",
                self.not_worth_it_ceiling
            ));
        }
        if self.cross_cluster_cycle_threshold == 0 {
            problems.push("gate.cross_cluster_cycle_threshold must be >= 1".to_string());
        }
        problems
    }
}

fn default_team_size_floor() -> usize {
    5
}
fn default_not_worth_it_ceiling() -> f64 {
    60.0
}
fn default_shared_table_risk_threshold() -> usize {
    3
}
fn default_cross_cluster_cycle_threshold() -> usize {
    2
}
