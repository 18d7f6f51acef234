use crate::args::Cli;
use querypilot_cli::{CLIConfiguration, CLISession, OutputFormat, Result};
use querypilot_link::ConnectionManager;

/// Resolve the output format: shorthand flags, then --format, then config
fn resolve_format(cli: &Cli, config: &CLIConfiguration) -> OutputFormat {
    if cli.json {
        OutputFormat::Json
    } else if cli.csv {
        OutputFormat::Csv
    } else if let Some(format) = cli.format {
        format
    } else {
        let configured = config.resolved_ui().format;
        OutputFormat::parse_name(&configured).unwrap_or_else(|| {
            log::warn!("Unknown format '{}' in config, using table", configured);
            OutputFormat::Table
        })
    }
}

/// Whether to colorize: --no-color and NO_COLOR win over the config file
pub fn resolve_color(cli: &Cli, config: &CLIConfiguration) -> bool {
    !cli.no_color && std::env::var_os("NO_COLOR").is_none() && config.resolved_ui().color
}

/// Build a disconnected session; callers connect when they need to
pub fn create_session(cli: &Cli, config: &CLIConfiguration) -> Result<CLISession> {
    let format = resolve_format(cli, config);
    let color = resolve_color(cli, config);
    if !color {
        colored::control::set_override(false);
    }

    let connection = ConnectionManager::http(config.to_connection_options());
    let mut session = CLISession::new(
        connection,
        config.clone(),
        format,
        color,
        !cli.no_spinner,
    )?;

    if let Some(ref path) = cli.dictionary {
        session = session.with_dictionary_path(path.clone());
    }

    Ok(session)
}
