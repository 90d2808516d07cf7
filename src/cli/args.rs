use crate::config::EcosystemPreset;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PresetArg {
    /// Compact codebases, a handful of projects
    Small,
    /// Typical codebases (default)
    Standard,
    /// Enterprise solutions with hundreds of projects
    Large,
}

impl From<PresetArg> for EcosystemPreset {
    fn from(preset: PresetArg) -> Self {
        match preset {
            PresetArg::Small => EcosystemPreset::Small,
            PresetArg::Standard => EcosystemPreset::Standard,
            PresetArg::Large => EcosystemPreset::Large,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "splitmap")]
#[command(about = "Assess whether a codebase should be split into services, and how", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Assess a codebase from front-end fact files (JSON Lines)
    Assess(AssessArgs),

    /// Write a default .splitmap.toml in the current directory
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct AssessArgs {
    /// Fact files, one batch per file
    #[arg(required = true)]
    pub facts: Vec<PathBuf>,

    /// Number of engineers available for the migration
    #[arg(long = "team-size")]
    pub team_size: usize,

    /// Configuration file (defaults to discovering .splitmap.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Ecosystem preset for bucket boundaries and gate thresholds
    #[arg(long, value_enum)]
    pub preset: Option<PresetArg>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Emit single-line JSON
    #[arg(long)]
    pub compact: bool,

    /// Worker threads (0 = all cores)
    #[arg(short = 'j', long = "jobs", default_value = "0", env = "SPLITMAP_JOBS")]
    pub jobs: usize,

    /// Increase verbosity level (can be repeated: -v, -vv)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
