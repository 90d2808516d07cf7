//! Command handlers. I/O lives here; the engine stays pure.

use super::args::AssessArgs;
use super::setup::{configure_thread_pool, get_worker_count};
use crate::config::{load_config, load_config_from, SplitmapConfig, CONFIG_FILE_NAME};
use crate::facts::{read_fact_file, FactBatch};
use crate::gate::VerdictStatus;
use crate::pipeline::{run_assessment, AssessmentResult};
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};

/// Run `splitmap assess`. Returns the verdict status of the run.
pub fn handle_assess_command(args: AssessArgs) -> Result<VerdictStatus> {
    configure_thread_pool(args.jobs);
    tracing::debug!(workers = get_worker_count(args.jobs), "Worker threads");

    let config = resolve_config(&args)?;
    let batches = read_batches(&args.facts)?;

    let result = run_assessment(&batches, args.team_size, &config)?;
    let json = if args.compact {
        result.to_json()
    } else {
        result.to_json_pretty()
    }
    .context("Failed to serialize assessment result")?;

    match &args.output {
        Some(path) => std::fs::write(path, format!("{json}\n"))
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => println!("{json}"),
    }

    print_verdict(&result);
    Ok(result.status())
}

fn resolve_config(args: &AssessArgs) -> Result<SplitmapConfig> {
    let mut config = match &args.config {
        Some(path) => load_config_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => load_config(),
    };
    if let Some(preset) = args.preset {
        config.preset = Some(preset.into());
    }
    Ok(config)
}

fn read_batches(paths: &[PathBuf]) -> Result<Vec<FactBatch>> {
    paths
        .iter()
        .map(|path| {
            read_fact_file(path)
                .with_context(|| format!("Failed to read facts from {}", path.display()))
        })
        .collect()
}

fn print_verdict(result: &AssessmentResult) {
    let status = result.status();
    let label = match status {
        VerdictStatus::Proceed => status.label().green().bold(),
        VerdictStatus::ProceedWithCaution => status.label().yellow().bold(),
        VerdictStatus::DoNotProceed => status.label().red().bold(),
    };

    eprintln!(
        "{} {} ({} clusters, {} skipped facts)",
        "verdict:".bold(),
        label,
        result.clusters.len(),
        result.ingestion.skipped_count()
    );
    for reason in &result.verdict.reasons {
        eprintln!("  {} {}", "-".dimmed(), reason);
    }
}

/// Run `splitmap init`.
pub fn init_config(force: bool) -> Result<()> {
    init_config_in(Path::new("."), force)
}

fn init_config_in(dir: &Path, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!("Configuration file already exists. Use --force to overwrite.");
    }

    let body = SplitmapConfig::from_preset(Default::default()).to_toml()?;
    let contents = format!("# splitmap configuration\n\n{body}");
    std::fs::write(&config_path, contents)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    println!("Created {CONFIG_FILE_NAME} configuration file");

    Ok(())
}
