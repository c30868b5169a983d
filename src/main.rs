use clap::Parser;
use field_autofill::cli::commands::{cmd_apply, cmd_detect};
use field_autofill::cli::config::{Cli, Commands, load_config};
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = load_config(cli.config.as_deref());

    match cli.command {
        Commands::Detect { document, output } => {
            cmd_detect(&document, output.as_deref(), &config)?;
        }
        Commands::Apply {
            document,
            suggestions,
            output,
            trace,
            no_retry,
        } => {
            let run = cmd_apply(
                &document,
                &suggestions,
                output.as_deref(),
                trace.as_deref(),
                no_retry,
                &config,
            )?;
            if run.report.summary.failed > 0 {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
