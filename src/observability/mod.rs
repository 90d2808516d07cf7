//! Observability infrastructure for assessment runs.
//!
//! - **Phases**: the pipeline stages that budget aborts and spans report
//! - **Tracing setup**: subscriber installation for the binary
//!
//! The library never installs a subscriber itself; it only emits `tracing`
//! events and spans. Installing one is the job of the binary:
//!
//! ```ignore
//! use splitmap::observability::init_tracing;
//!
//! fn main() {
//!     init_tracing(1);
//!     // ... run assessment ...
//! }
//! ```

pub mod phase;
pub mod tracing;

pub use phase::AnalysisPhase;
pub use self::tracing::{init_tracing, LOG_ENV_VAR};
