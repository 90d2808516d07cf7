use serde::{Deserialize, Serialize};

use super::budget::RunBudget;
use super::clustering::ClusteringConfig;
use super::presets::EcosystemPreset;
use super::scoring::ComplexityWeights;
use super::thresholds::{ComplexityBuckets, GateThresholds};
use crate::errors::{AssessmentError, Result};

/// Root configuration structure for splitmap
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SplitmapConfig {
    /// Ecosystem preset supplying defaults for absent sections
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<EcosystemPreset>,

    /// Complexity score weights
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<ComplexityWeights>,

    /// Complexity bucket boundaries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buckets: Option<ComplexityBuckets>,

    /// Viability gate thresholds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gate: Option<GateThresholds>,

    /// Boundary proposer tuning
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clustering: Option<ClusteringConfig>,

    /// Fact-count and time budget
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<RunBudget>,
}

impl SplitmapConfig {
    /// Configuration with every section filled in from a preset.
    pub fn from_preset(preset: EcosystemPreset) -> Self {
        Self {
            preset: Some(preset),
            weights: Some(ComplexityWeights::default()),
            buckets: Some(preset.buckets()),
            gate: Some(preset.gate()),
            clustering: Some(ClusteringConfig::default()),
            budget: Some(RunBudget::default()),
        }
    }

    fn effective_preset(&self) -> EcosystemPreset {
        self.preset.unwrap_or_default()
    }

    pub fn weights(&self) -> ComplexityWeights {
        self.weights.clone().unwrap_or_default()
    }

    pub fn buckets(&self) -> ComplexityBuckets {
        self.buckets
            .clone()
            .unwrap_or_else(|| self.effective_preset().buckets())
    }

    pub fn gate(&self) -> GateThresholds {
        self.gate
            .clone()
            .unwrap_or_else(|| self.effective_preset().gate())
    }

    pub fn clustering(&self) -> ClusteringConfig {
        self.clustering.clone().unwrap_or_default()
    }

    pub fn budget(&self) -> RunBudget {
        self.budget.clone().unwrap_or_default()
    }

    /// Validate the effective configuration, reporting every problem at once.
    pub fn validate(&self) -> Result<()> {
        let problems: Vec<String> = self
            .weights()
            .validate()
            .into_iter()
            .chain(self.buckets().validate())
            .chain(self.gate().validate())
            .chain(self.clustering().validate())
            .chain(self.budget().validate())
            .collect();

        if problems.is_empty() {
            Ok(())
        } else {
            Err(AssessmentError::config(problems.join("; ")))
        }
    }

    /// Render as TOML, e.g. for `splitmap init`.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| AssessmentError::config(format!("failed to serialize config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_sections_fall_back_to_preset() {
        let config = SplitmapConfig {
            preset: Some(EcosystemPreset::Large),
            ..Default::default()
        };
        assert_eq!(config.buckets(), EcosystemPreset::Large.buckets());
        assert_eq!(config.gate(), EcosystemPreset::Large.gate());
        assert_eq!(config.weights(), ComplexityWeights::default());
    }

    #[test]
    fn test_explicit_section_overrides_preset() {
        let buckets = ComplexityBuckets {
            low_max: 1.0,
            medium_max: 2.0,
        };
        let config = SplitmapConfig {
            preset: Some(EcosystemPreset::Large),
            buckets: Some(buckets.clone()),
            ..Default::default()
        };
        assert_eq!(config.buckets(), buckets);
    }

    #[test]
    fn test_validate_collects_all_problems() {
        let config = SplitmapConfig {
            weights: Some(ComplexityWeights {
                node_count: -1.0,
                ..Default::default()
            }),
            budget: Some(RunBudget {
                max_facts: 0,
                deadline_ms: 10,
            }),
            ..Default::default()
        };
        let message = config.validate().unwrap_err().to_string();
        assert!(message.contains("weights.node_count"));
        assert!(message.contains("budget.max_facts"));
    }

    #[test]
    fn test_toml_round_trip_of_full_config() {
        let config = SplitmapConfig::from_preset(EcosystemPreset::Standard);
        let rendered = config.to_toml().unwrap();
        let parsed: SplitmapConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, config);
    }
}
