//! Command-line interface for splitmap
//!
//! - Argument parsing (`args`)
//! - Command handlers (`commands`)
//! - Runtime setup (`setup`)

pub mod args;
pub mod commands;
pub mod setup;

pub use args::{AssessArgs, Cli, Commands, PresetArg};
pub use commands::{handle_assess_command, init_config};
pub use setup::{configure_thread_pool, get_worker_count};

/// Parse CLI arguments using Clap
pub fn parse_args() -> Cli {
    args::parse_args()
}
