//! QueryPilot CLI - AI-assisted terminal for a SQL warehouse
//!
//! # Usage
//!
//! ```bash
//! # Interactive mode (credentials from the environment or ./.env)
//! querypilot
//!
//! # Generate SQL for a question
//! querypilot --ask "how many rides today"
//!
//! # One metric as JSON
//! querypilot --json --metric revenue
//!
//! # Run one statement
//! querypilot -c "SELECT COUNT(*) FROM agent.shuttler.ride_bookings"
//! ```

use clap::Parser;
use colored::*;

use querypilot_cli::{logging, CLIConfiguration, CLIError, Result};

mod args;
mod connect;

use args::Cli;
use connect::{create_session, resolve_color};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("{}", format!("✗ {}", e).red());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Credentials come from the environment; a dotenv file only fills gaps
    match cli.env_file {
        Some(ref path) => {
            dotenvy::from_path(path).map_err(|e| {
                CLIError::ConfigurationError(format!(
                    "Failed to load env file {}: {}",
                    path.display(),
                    e
                ))
            })?;
        }
        None => {
            dotenvy::dotenv().ok();
        }
    }

    let config = CLIConfiguration::load(&cli.config)?;

    logging::init_logging(cli.verbose, resolve_color(&cli, &config))
        .map_err(|e| CLIError::ConfigurationError(e.to_string()))?;
    log::debug!("Loaded configuration from {}", cli.config.display());

    let mut session = create_session(&cli, &config)?;

    let outcome = match (cli.command.as_deref(), cli.ask.as_deref(), cli.metric.as_deref()) {
        (Some(sql), _, _) => session.execute(sql).await,
        (None, Some(question), _) => session.ask(question).await,
        (None, None, Some(key)) => session.show_metric(key).await,
        (None, None, None) => session.run_interactive().await,
    };

    session.close().await;
    outcome
}
