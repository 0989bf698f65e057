//! Report Alchemy CLI
//!
//! Reads every configured source report and writes the combined problems
//! to every configured sink.

mod cli;

use std::process::ExitCode;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use report_alchemy_core::{AlchemyError, load_configuration, run_report_alchemy};
use report_alchemy_plugins::{bundled_registry, default_plugin};

use crate::cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.version {
        println!("report-alchemy {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to start runtime: {}", e);
            return ExitCode::from(1);
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(e);
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli) -> Result<(), AlchemyError> {
    let cwd = std::env::current_dir().map_err(|e| AlchemyError::io(".", e))?;
    let config = load_configuration(cli.config.as_deref(), &cwd).await?;

    // The built-in plugin has the lowest priority.
    let mut plugins = vec![default_plugin()];
    plugins.extend(bundled_registry().load_plugins(&config.plugins)?);

    let count = run_report_alchemy(&config, &plugins).await?;
    debug!("Wrote {} problem(s)", count);
    Ok(())
}

/// Prints a failed run to stderr.
///
/// Configuration problems and missing files are expected user errors and
/// only get their message; everything else gets the full diagnostic.
fn report(error: AlchemyError) {
    if let AlchemyError::Configuration(message) = &error {
        eprintln!("{}", message);
    } else if error.is_not_found() {
        eprintln!("{}", error);
    } else {
        eprintln!("{:?}", miette::Report::new(error));
    }
}
