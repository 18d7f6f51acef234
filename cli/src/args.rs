use clap::Parser;
use querypilot_cli::OutputFormat;
use std::path::PathBuf;

// Macro to create the version string at compile time
macro_rules! version_string {
    () => {
        concat!(
            env!("CARGO_PKG_VERSION"),
            "\nCommit: ",
            env!("GIT_COMMIT_HASH"),
            " (",
            env!("GIT_BRANCH"),
            ")\nBuilt: ",
            env!("BUILD_DATE")
        )
    };
}

/// QueryPilot - ask a SQL warehouse questions in plain language
#[derive(Parser, Debug)]
#[command(name = "querypilot")]
#[command(version = version_string!())]
#[command(
    about = "Interactive terminal for AI-assisted warehouse analytics",
    long_about = None
)]
pub struct Cli {
    /// Execute one SQL statement and exit
    #[arg(short = 'c', long = "command", conflicts_with_all = ["ask", "metric"])]
    pub command: Option<String>,

    /// Generate SQL for a question, print it and exit
    #[arg(long = "ask", value_name = "QUESTION", conflicts_with = "metric")]
    pub ask: Option<String>,

    /// Show one quick-analytics metric and exit (rides, revenue, users, rating)
    #[arg(long = "metric", value_name = "KEY")]
    pub metric: Option<String>,

    /// Output format (defaults to the config file setting)
    #[arg(long = "format")]
    pub format: Option<OutputFormat>,

    /// Enable JSON output (shorthand for --format=json)
    #[arg(long = "json", conflicts_with = "format")]
    pub json: bool,

    /// Enable CSV output (shorthand for --format=csv)
    #[arg(long = "csv", conflicts_with_all = ["format", "json"])]
    pub csv: bool,

    /// Disable colored output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Disable spinners/animations
    #[arg(long = "no-spinner")]
    pub no_spinner: bool,

    /// Configuration file path
    #[arg(long = "config", default_value = "~/.querypilot/config.toml")]
    pub config: PathBuf,

    /// Load warehouse credentials from this dotenv file instead of ./.env
    #[arg(long = "env-file", value_name = "PATH")]
    pub env_file: Option<PathBuf>,

    /// Data dictionary CSV (overrides the config file)
    #[arg(long = "dictionary", value_name = "PATH")]
    pub dictionary: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_parse() {
        let cli = Cli::parse_from(["querypilot", "--json", "--metric", "revenue"]);
        assert!(cli.json);
        assert_eq!(cli.metric.as_deref(), Some("revenue"));
        assert!(cli.format.is_none());
    }

    #[test]
    fn test_command_conflicts_with_ask() {
        let res = Cli::try_parse_from(["querypilot", "-c", "SELECT 1", "--ask", "rides"]);
        assert!(res.is_err());
    }

    #[test]
    fn test_format_value() {
        let cli = Cli::parse_from(["querypilot", "--format", "csv"]);
        assert_eq!(cli.format, Some(OutputFormat::Csv));
    }
}
