//! Run configuration.
//!
//! Every tunable of the engine lives here: complexity weights, bucket
//! boundaries, gate thresholds, clustering knobs and the run budget. Sections
//! are optional in the file; an absent section falls back to the selected
//! ecosystem preset (or the standard defaults).
//!
//! ```toml
//! preset = "large"
//!
//! [weights]
//! shared_tables = 5.0
//! ```

mod budget;
mod clustering;
mod core;
mod loader;
pub mod presets;
mod scoring;
mod thresholds;

pub use budget::RunBudget;
pub use clustering::ClusteringConfig;
pub use core::SplitmapConfig;
pub use loader::{
    directory_ancestors, discover_config, load_config, load_config_from,
    parse_and_validate_config, CONFIG_FILE_NAME,
};
pub use presets::EcosystemPreset;
pub use scoring::ComplexityWeights;
pub use thresholds::{ComplexityBuckets, GateThresholds};
