//! Ecosystem presets.
//!
//! Typical project sizes differ a lot between ecosystems, so a cluster that
//! counts as "high" complexity in a small service fleet is routine in a large
//! enterprise solution. Presets shift the bucket boundaries and gate
//! thresholds accordingly:
//! - **Small**: compact codebases, a handful of projects
//! - **Standard**: reasonable defaults for most codebases
//! - **Large**: enterprise solutions with hundreds of projects
//!
//! ```rust
//! use splitmap::config::{EcosystemPreset, SplitmapConfig};
//!
//! let config = SplitmapConfig::from_preset(EcosystemPreset::Large);
//! assert!(config.buckets().medium_max > 40.0);
//! ```

use serde::{Deserialize, Serialize};

use super::thresholds::{ComplexityBuckets, GateThresholds};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EcosystemPreset {
    Small,
    #[default]
    Standard,
    Large,
}

impl EcosystemPreset {
    pub fn buckets(self) -> ComplexityBuckets {
        match self {
            Self::Small => ComplexityBuckets {
                low_max: 8.0,
                medium_max: 20.0,
            },
            Self::Standard => ComplexityBuckets::default(),
            Self::Large => ComplexityBuckets {
                low_max: 30.0,
                medium_max: 80.0,
            },
        }
    }

    pub fn gate(self) -> GateThresholds {
        match self {
            Self::Small => GateThresholds {
                team_size_floor: 4,
                not_worth_it_ceiling: 30.0,
                shared_table_risk_threshold: 2,
                ..Default::default()
            },
            Self::Standard => GateThresholds::default(),
            Self::Large => GateThresholds {
                team_size_floor: 8,
                not_worth_it_ceiling: 120.0,
                shared_table_risk_threshold: 6,
                cross_cluster_cycle_threshold: 3,
            },
        }
    }
}

impl std::str::FromStr for EcosystemPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "small" => Ok(Self::Small),
            "standard" => Ok(Self::Standard),
            "large" => Ok(Self::Large),
            other => Err(format!(
                "unknown preset '{other}' (expected small, standard or large)"
            )),
        }
    }
}
