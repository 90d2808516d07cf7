use serde::{Deserialize, Serialize};

/// Boundary proposer tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusteringConfig {
    /// Weight of the link between each unit and the virtual hub of its
    /// owning team. Zero disables team seeding.
    #[serde(default = "default_team_affinity")]
    pub team_affinity: f64,

    /// Link weight per table or shared state two units both touch.
    /// Zero disables shared-data seeding.
    #[serde(default = "default_shared_data_affinity")]
    pub shared_data_affinity: f64,

    /// Tables or states touched by more units than this are treated as
    /// global and add no links
    #[serde(default = "default_max_data_accessors")]
    pub max_data_accessors: usize,

    /// Local-moving passes per Louvain level
    #[serde(default = "default_max_passes")]
    pub max_passes: usize,

    /// Aggregation levels before giving up on further merging
    #[serde(default = "default_max_levels")]
    pub max_levels: usize,

    /// Smallest modularity gain that justifies moving a node
    #[serde(default = "default_min_modularity_gain")]
    pub min_modularity_gain: f64,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            team_affinity: default_team_affinity(),
            shared_data_affinity: default_shared_data_affinity(),
            max_data_accessors: default_max_data_accessors(),
            max_passes: default_max_passes(),
            max_levels: default_max_levels(),
            min_modularity_gain: default_min_modularity_gain(),
        }
    }
}

impl ClusteringConfig {
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if !self.team_affinity.is_finite() || self.team_affinity < 0.0 {
            problems.push(format!(
                "clustering.team_affinity must be finite and >= 0.0 (got {})",
                self.team_affinity
            ));
        }
        if !self.shared_data_affinity.is_finite() || self.shared_data_affinity < 0.0 {
            problems.push(format!(
                "clustering.shared_data_affinity must be finite and >= 0.0 (got {})",
                self.shared_data_affinity
            ));
        }
        if self.max_data_accessors < 2 {
            problems.push(format!(
                "clustering.max_data_accessors must be >= 2 (got {})",
                self.max_data_accessors
            ));
        }
        if self.max_passes == 0 {
            problems.push("clustering.max_passes must be >= 1".to_string());
        }
        if self.max_levels == 0 {
            problems.push("clustering.max_levels must be >= 1".to_string());
        }
        if !self.min_modularity_gain.is_finite() || self.min_modularity_gain < 0.0 {
            problems.push(format!(
                "clustering.min_modularity_gain must be finite and >= 0.0 (got {})",
                self.min_modularity_gain
            ));
        }
        problems
    }
}

fn default_team_affinity() -> f64 {
    1.0
}
fn default_shared_data_affinity() -> f64 {
    1.0
}
fn default_max_data_accessors() -> usize {
    64
}
fn default_max_passes() -> usize {
    32
}
fn default_max_levels() -> usize {
    16
}
fn default_min_modularity_gain() -> f64 {
    1e-9
}
