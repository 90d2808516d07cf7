use anyhow::Result;
use splitmap::cli::{handle_assess_command, init_config, parse_args, Commands};
use splitmap::observability::init_tracing;

fn main() -> Result<()> {
    let cli = parse_args();

    match cli.command {
        Commands::Assess(args) => {
            init_tracing(args.verbosity);
            handle_assess_command(args)?;
        }
        Commands::Init { force } => {
            init_tracing(0);
            init_config(force)?;
        }
    }

    Ok(())
}
