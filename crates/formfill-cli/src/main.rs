//! Formfill CLI: classify form fields and fill them with synthetic data
//!
//! ## Usage
//!
//! ```bash
//! formfill classify --type text --name billing_zip   # -> zip
//! formfill generate email -n 5 --locale fr_FR        # five French emails
//! formfill generate number --min 1 --max 3 --seed 7  # reproducible
//! formfill fill http://localhost:3000/signup --exclude '#captcha' --submit
//! ```

use clap::Parser;
use formfill_cli::{handlers, Cli, CliConfig, CliResult, Commands, Printer, Verbosity};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();

    // Build configuration from CLI args
    let config = build_config(&cli);
    init_tracing(config.verbosity);
    let printer = Printer::new(&config);

    match cli.command {
        Commands::Classify(args) => printer.field_type(handlers::run_classify(&args)),
        Commands::Generate(args) => {
            let (field_type, values) = handlers::run_generate(&args)?;
            printer.values(field_type, &values)
        }
        Commands::Fill(args) => {
            let report = handlers::run_fill(&args)?;
            printer.report(&args.url, &report)
        }
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(cli.color.clone().into())
        .with_format(cli.format.clone().into())
}

/// Logs go to stderr; `RUST_LOG` wins over `-v`/`-q`
fn init_tracing(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.log_filter()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
