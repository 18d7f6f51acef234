//! CLI session
//!
//! Interactive readline loop over a [`SessionState`]. The session owns the
//! warehouse connection and routes each command to one state transition,
//! then renders whatever the transition produced.

use clap::ValueEnum;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use querypilot_link::{
    ConnectionManager, ExportArtifact, LinkError, NaturalLanguageQueryGenerator,
    ResultMaterializer, ResultSet,
};
use rustyline::error::ReadlineError;
use rustyline::{Config, DefaultEditor, EditMode};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::{
    config::CLIConfiguration,
    dictionary::DataDictionary,
    error::{CLIError, Result},
    formatter::OutputFormatter,
    history::CommandHistory,
    metrics::{find_metric, metric_keys, CANNED_METRICS},
    parser::{Command, CommandParser},
    state::{QueryServices, SessionState, Tab},
    CLI_VERSION,
};

/// Output format for query results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    /// Parse a format name as written in the config file or `\format`
    pub fn parse_name(name: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(name.trim(), true).ok()
    }
}

/// Threshold above which elapsed time is printed after a remote call
const TIMING_THRESHOLD: Duration = Duration::from_millis(200);

/// CLI session state
pub struct CLISession {
    /// Warehouse connection, owned for the whole session
    connection: ConnectionManager,

    /// Generator, executor and materializer
    services: QueryServices,

    /// Tab, question draft and retained results
    state: SessionState,

    /// Command parser
    parser: CommandParser,

    /// Output formatter
    formatter: OutputFormatter,

    /// CLI configuration
    config: CLIConfiguration,

    /// Output format
    format: OutputFormat,

    /// Enable colored output
    color: bool,

    /// Enable spinners/animations
    animations: bool,

    /// Data dictionary file
    dictionary_path: PathBuf,

    /// Session start time
    started_at: Instant,

    /// Number of remote statements issued in this session
    queries_executed: u64,
}

impl CLISession {
    /// Create a session around an existing connection manager
    pub fn new(
        connection: ConnectionManager,
        config: CLIConfiguration,
        format: OutputFormat,
        color: bool,
        animations: bool,
    ) -> Result<Self> {
        let warehouse = config.resolved_warehouse();
        let services = QueryServices::new(
            NaturalLanguageQueryGenerator::new(warehouse.ai_function)?,
            ResultMaterializer::new(warehouse.persist_namespace)?,
        );
        let dictionary_path = config.resolved_dictionary().path;

        Ok(Self {
            connection,
            services,
            state: SessionState::new(),
            parser: CommandParser::new(),
            formatter: OutputFormatter::new(format, color),
            config,
            format,
            color,
            animations,
            dictionary_path,
            started_at: Instant::now(),
            queries_executed: 0,
        })
    }

    /// Override the data dictionary location
    pub fn with_dictionary_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.dictionary_path = path.into();
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn connection(&self) -> &ConnectionManager {
        &self.connection
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    pub fn set_format(&mut self, format: OutputFormat) {
        self.format = format;
        self.formatter = OutputFormatter::new(format, self.color);
    }

    /// Create a spinner for remote calls
    fn create_spinner(&self, message: &str) -> Option<ProgressBar> {
        if !self.animations {
            return None;
        }
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.cyan} {msg}")
        {
            pb.set_style(style);
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(80));
        Some(pb)
    }

    fn finish_spinner(spinner: Option<ProgressBar>) {
        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }
    }

    fn is_machine_format(&self) -> bool {
        matches!(self.format, OutputFormat::Json | OutputFormat::Csv)
    }

    /// Print a status line; goes to stderr for machine formats so stdout
    /// stays parseable
    fn notice(&self, message: impl AsRef<str>) {
        let message = message.as_ref();
        let rendered = if self.color {
            message.dimmed().to_string()
        } else {
            message.to_string()
        };
        if self.is_machine_format() {
            eprintln!("{}", rendered);
        } else {
            println!("{}", rendered);
        }
    }

    /// Open the warehouse connection from the environment, replacing any
    /// existing one
    pub async fn connect(&mut self) -> Result<()> {
        let spinner = self.create_spinner("Connecting to warehouse...");
        let result = self.connection.connect_from_environment().await;
        Self::finish_spinner(spinner);
        result?;

        if let Some(creds) = self.connection.credentials() {
            self.notice(format!("✓ Connected to {}", creds.server_hostname));
        }
        Ok(())
    }

    /// Reconnect lazily before a remote action
    async fn ensure_connected(&mut self) -> Result<()> {
        if self.connection.is_connected() {
            return Ok(());
        }
        self.connect().await
    }

    /// Drop the connection when the transport says it is gone; the next
    /// remote action reconnects
    async fn note_failure(&mut self, err: &LinkError) {
        if err.is_connection_lost() {
            log::warn!("[CONNECT] Connection lost, closing session: {}", err);
            self.connection.close().await;
        }
    }

    fn print_result(&self, result: &ResultSet, elapsed: Duration) -> Result<()> {
        let output = self.formatter.format_result(result)?;
        println!("{}", output);

        if elapsed >= TIMING_THRESHOLD && !self.is_machine_format() {
            self.notice(format!("⏱  Time: {:.3} ms", elapsed.as_secs_f64() * 1000.0));
        }
        Ok(())
    }

    /// Generate SQL for a question on the assistant tab
    pub async fn ask(&mut self, question: &str) -> Result<()> {
        self.state = self.state.select_tab(Tab::Assistant);
        self.ensure_connected().await?;

        let spinner = self.create_spinner("Generating SQL...");
        self.queries_executed += 1;
        let outcome = self
            .state
            .submit_question(question, &self.services, &self.connection)
            .await;
        Self::finish_spinner(spinner);

        match outcome {
            Ok(next) => {
                self.state = next;
                if let Some(generated) = self.state.generated_query() {
                    if self.is_machine_format() {
                        println!("{}", generated);
                    } else if self.color {
                        println!("{}\n{}", "Generated SQL:".cyan().bold(), generated);
                        println!("{}", "Use \\run to execute it.".dimmed());
                    } else {
                        println!("Generated SQL:\n{}", generated);
                        println!("Use \\run to execute it.");
                    }
                }
                Ok(())
            }
            Err(e) => {
                self.note_failure(&e).await;
                Err(e.into())
            }
        }
    }

    /// Execute the generated SQL from the last question
    pub async fn run_generated(&mut self) -> Result<()> {
        if self.state.generated_query().is_none() {
            return Err(LinkError::NoGeneratedQuery.into());
        }
        self.ensure_connected().await?;

        let start = Instant::now();
        let spinner = self.create_spinner("Executing query...");
        self.queries_executed += 1;
        let outcome = self
            .state
            .run_generated(&self.services, &self.connection)
            .await;
        Self::finish_spinner(spinner);

        match outcome {
            Ok(next) => {
                self.state = next;
                if let Some(result) = self.state.result_for(Tab::Assistant) {
                    self.print_result(result, start.elapsed())?;
                }
                Ok(())
            }
            Err(e) => {
                self.note_failure(&e).await;
                Err(e.into())
            }
        }
    }

    /// Execute hand-written SQL on the custom tab. The tab only changes once
    /// the statement succeeds, so a failure keeps the pending question.
    pub async fn execute(&mut self, sql: &str) -> Result<()> {
        if sql.trim().is_empty() {
            return Err(LinkError::ExecutionError {
                message: "empty statement".to_string(),
                connection_lost: false,
            }
            .into());
        }
        self.ensure_connected().await?;

        let start = Instant::now();
        let spinner = self.create_spinner("Executing query...");
        self.queries_executed += 1;
        let outcome = self
            .state
            .run_custom_sql(sql, &self.services, &self.connection)
            .await;
        Self::finish_spinner(spinner);

        match outcome {
            Ok(next) => {
                self.state = next.select_tab(Tab::CustomSql);
                if let Some(result) = self.state.result_for(Tab::CustomSql) {
                    self.print_result(result, start.elapsed())?;
                }
                Ok(())
            }
            Err(e) => {
                self.note_failure(&e).await;
                Err(e.into())
            }
        }
    }

    /// Show one quick-analytics metric
    pub async fn show_metric(&mut self, key: &str) -> Result<()> {
        let metric = find_metric(key).ok_or_else(|| {
            CLIError::ParseError(format!(
                "Unknown metric '{}' (available: {})",
                key,
                metric_keys().join(", ")
            ))
        })?;
        self.ensure_connected().await?;

        let spinner = self.create_spinner(&format!("Loading {}...", metric.label));
        self.queries_executed += 1;
        let outcome = self
            .state
            .run_canned_metric(metric, &self.services, &self.connection)
            .await;
        Self::finish_spinner(spinner);

        match outcome {
            Ok(reading) => {
                self.state = self.state.select_tab(Tab::QuickAnalytics);
                println!("{}", self.formatter.format_metric(&reading));
                Ok(())
            }
            Err(e) => {
                self.note_failure(&e).await;
                Err(e.into())
            }
        }
    }

    /// Show every quick-analytics metric; one failing metric does not stop
    /// the others
    pub async fn show_all_metrics(&mut self) -> Result<()> {
        for metric in CANNED_METRICS {
            if let Err(e) = self.show_metric(metric.key).await {
                let lost = e.link_error().map(|l| l.is_connection_lost()).unwrap_or(false);
                eprintln!("{}", format!("✗ {}: {}", metric.label, e).red());
                if lost || !self.connection.is_connected() {
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    /// Artifact for the active tab: the retained result, or the dictionary
    /// file verbatim on the dictionary tab
    fn export_artifact(&self, file_name: Option<&str>) -> Result<ExportArtifact> {
        let tab = self.state.active_tab();
        if tab == Tab::Dictionary {
            return Ok(DataDictionary::load(&self.dictionary_path)?.export());
        }

        let default_name = self.config.resolved_export().file_name;
        self.state
            .export_result(tab, Some(file_name.unwrap_or(default_name.as_str())))
            .ok_or_else(|| {
                CLIError::FileError(format!("No results to export on the {} tab", tab.title()))
            })
    }

    /// Write the active tab's result to a CSV file
    pub fn export(&self, file_name: Option<&str>) -> Result<PathBuf> {
        let artifact = self.export_artifact(file_name)?;
        let path = PathBuf::from(&artifact.file_name);
        std::fs::write(&path, &artifact.bytes).map_err(|e| {
            CLIError::FileError(format!("Failed to write {}: {}", path.display(), e))
        })?;
        self.notice(format!(
            "✓ Exported {} bytes ({}) to {}",
            artifact.bytes.len(),
            artifact.content_type,
            path.display()
        ));
        Ok(path)
    }

    /// Save the active tab's result as a warehouse table
    pub async fn persist(&mut self, target: &str) -> Result<()> {
        let tab = self.state.active_tab();
        if self.state.result_for(tab).is_none() {
            return Err(LinkError::PersistError(format!(
                "No {} result to save",
                tab.title()
            ))
            .into());
        }
        self.ensure_connected().await?;

        let spinner = self.create_spinner("Saving results...");
        self.queries_executed += 1;
        let outcome = self
            .state
            .persist_result(tab, target, &self.services, &self.connection)
            .await;
        Self::finish_spinner(spinner);

        match outcome {
            Ok(saved) => {
                self.notice(format!(
                    "✓ Saved {} rows to {}",
                    saved.rows_written, saved.target
                ));
                Ok(())
            }
            Err(e) => {
                self.note_failure(&e).await;
                Err(e.into())
            }
        }
    }

    /// Display the data dictionary
    pub fn show_dictionary(&mut self) -> Result<()> {
        let dictionary = DataDictionary::load(&self.dictionary_path)?;
        self.state = self.state.select_tab(Tab::Dictionary);
        println!("{}", self.formatter.format_result(&dictionary.to_result_set())?);
        Ok(())
    }

    /// Route one parsed command
    pub async fn execute_command(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Sql(sql) => self.execute(&sql).await,
            Command::Ask(question) => self.ask(&question).await,
            Command::RunGenerated => self.run_generated().await,
            Command::Metric(key) => self.show_metric(&key).await,
            Command::Metrics => self.show_all_metrics().await,
            Command::SelectTab(tab) => {
                self.state = self.state.select_tab(tab);
                self.notice(format!("Switched to {}", tab.title()));
                Ok(())
            }
            Command::Export(file) => self.export(file.as_deref()).map(|_| ()),
            Command::Persist(target) => self.persist(&target).await,
            Command::Dictionary => self.show_dictionary(),
            Command::SetFormat(name) => match OutputFormat::parse_name(&name) {
                Some(format) => {
                    self.set_format(format);
                    self.notice(format!("Output format set to {:?}", format));
                    Ok(())
                }
                None => Err(CLIError::ParseError(format!(
                    "Unknown format '{}' (expected table, json or csv)",
                    name
                ))),
            },
            Command::Connect => self.connect().await,
            Command::Status => {
                self.print_status();
                Ok(())
            }
            Command::Help => {
                self.print_help();
                Ok(())
            }
            Command::Quit => Ok(()),
            Command::Unknown(cmd) => Err(CLIError::ParseError(format!(
                "Unknown command: {}. Type \\help for help.",
                cmd
            ))),
        }
    }

    fn primary_prompt(&self) -> String {
        let tab = self.state.active_tab().name();
        if !self.color {
            let marker = if self.is_connected() { "" } else { " (offline)" };
            return format!("querypilot[{}]{}> ", tab, marker);
        }
        let dot = if self.is_connected() {
            "●".green()
        } else {
            "○".red()
        };
        format!("{} {}[{}]> ", dot, "querypilot".bright_blue().bold(), tab.cyan())
    }

    fn continuation_prompt(&self) -> String {
        if self.color {
            format!("{}", "  -> ".dimmed())
        } else {
            "  -> ".to_string()
        }
    }

    /// Run interactive readline loop
    pub async fn run_interactive(&mut self) -> Result<()> {
        self.print_banner();

        if let Err(e) = self.connect().await {
            eprintln!("{} {}", "Connection failed:".red().bold(), e);
            eprintln!(
                "  Set {}, {} and {} (or pass --env-file), then use {}.",
                querypilot_link::credentials::ENV_SERVER_HOSTNAME,
                querypilot_link::credentials::ENV_HTTP_PATH,
                querypilot_link::credentials::ENV_ACCESS_TOKEN,
                "\\connect".cyan()
            );
            eprintln!();
        }

        let rl_config = Config::builder()
            .edit_mode(EditMode::Emacs)
            .auto_add_history(false)
            .build();
        let mut rl = DefaultEditor::with_config(rl_config)?;

        let history = CommandHistory::new(self.config.resolved_ui().history_size);
        if let Ok(entries) = history.load() {
            for entry in entries {
                let _ = rl.add_history_entry(entry.as_str());
            }
        }

        let mut accumulated_command = String::new();

        loop {
            let prompt = if accumulated_command.is_empty() {
                self.primary_prompt()
            } else {
                self.continuation_prompt()
            };

            match rl.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim();

                    if line.is_empty() && accumulated_command.is_empty() {
                        continue;
                    }

                    if !accumulated_command.is_empty() {
                        accumulated_command.push('\n');
                    }
                    accumulated_command.push_str(line);

                    // SQL ends with `;` or a blank line; backslash commands are one line
                    let is_complete = line.ends_with(';')
                        || accumulated_command.trim_start().starts_with('\\')
                        || line.is_empty();
                    if !is_complete {
                        continue;
                    }

                    let final_command = accumulated_command.trim().to_string();
                    accumulated_command.clear();
                    if final_command.is_empty() {
                        continue;
                    }

                    let _ = rl.add_history_entry(final_command.as_str());
                    if let Err(e) = history.append(&final_command) {
                        log::debug!("Could not update history: {}", e);
                    }

                    match self.parser.parse(&final_command) {
                        Ok(Command::Quit) => {
                            println!("{}", "Goodbye!".cyan());
                            break;
                        }
                        Ok(command) => {
                            if let Err(e) = self.execute_command(command).await {
                                eprintln!("{}", format!("✗ {}", e).red());
                            }
                        }
                        Err(e) => {
                            eprintln!("{}", format!("✗ {}", e).red());
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    if !accumulated_command.is_empty() {
                        println!("\n{}", "Command cancelled".yellow());
                        accumulated_command.clear();
                    } else {
                        println!("{}", "Use \\quit or \\q to exit".dimmed());
                    }
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("\n{}", "Goodbye!".cyan());
                    break;
                }
                Err(err) => {
                    eprintln!("{}", format!("✗ {}", err).red());
                    break;
                }
            }
        }

        Ok(())
    }

    /// Release the warehouse connection
    pub async fn close(&mut self) {
        self.connection.close().await;
    }

    /// Print welcome banner
    fn print_banner(&self) {
        println!();
        println!(
            "{}",
            "╔═══════════════════════════════════════════════════════════╗"
                .bright_blue()
                .bold()
        );
        println!(
            "{}{}{}",
            "║        ".bright_blue().bold(),
            "QueryPilot - ask your warehouse in plain language".white().bold(),
            " ║".bright_blue().bold()
        );
        println!(
            "{}",
            "╚═══════════════════════════════════════════════════════════╝"
                .bright_blue()
                .bold()
        );
        println!(
            "  {}",
            format!("CLI version: {} (built: {})", CLI_VERSION, env!("BUILD_DATE")).dimmed()
        );
        println!(
            "  Type {} to ask a question, {} for help, {} to exit",
            "\\ask".cyan().bold(),
            "\\help".cyan().bold(),
            "\\quit".cyan().bold()
        );
        println!();
    }

    fn print_help(&self) {
        println!();
        println!("{}", "Tabs".yellow().bold());
        println!("  \\tab <assistant|quick|custom|dictionary>  Switch tab");
        println!();
        println!("{}", "AI assistant".yellow().bold());
        println!("  \\ask <question>      Generate SQL for a question");
        println!("  \\run                 Execute the generated SQL");
        println!();
        println!("{}", "Quick analytics".yellow().bold());
        println!("  \\metrics             Show all metrics");
        println!(
            "  \\metric <key>        Show one metric ({})",
            metric_keys().join(", ")
        );
        println!();
        println!("{}", "Custom SQL".yellow().bold());
        println!("  <sql>;               Execute SQL (end with ; or a blank line)");
        println!();
        println!("{}", "Results".yellow().bold());
        println!("  \\export [file]       Write the current tab's result as CSV");
        println!("  \\persist <name>      Save the current tab's result as a table");
        println!("  \\dict                Show the data dictionary");
        println!("  \\format <fmt>        table, json or csv");
        println!();
        println!("{}", "Session".yellow().bold());
        println!("  \\connect             Reconnect using the environment");
        println!("  \\status              Show session status");
        println!("  \\help, \\?            Show this help");
        println!("  \\quit, \\q            Exit");
        println!();
    }

    fn print_status(&self) {
        let uptime = self.started_at.elapsed();
        println!();
        println!("{}", "Session".yellow().bold());
        println!("  Connection:     {}", self.connection.state());
        if let Some(creds) = self.connection.credentials() {
            println!("  Host:           {}", creds.server_hostname);
            println!("  HTTP path:      {}", creds.http_path);
        }
        println!("  AI function:    {}", self.services.generator.function_name());
        println!("  Save namespace: {}", self.services.materializer.namespace());
        println!("  Active tab:     {}", self.state.active_tab().title());
        match self.state.draft() {
            Some(draft) => {
                println!("  Question:       {}", draft.question);
                println!("  Generated SQL:  {}", draft.generated);
            }
            None => println!("  Question:       (none)"),
        }
        for tab in [Tab::Assistant, Tab::CustomSql] {
            let summary = match self.state.result_for(tab) {
                Some(rs) => format!("{} rows, {} columns", rs.row_count(), rs.columns.len()),
                None => "(none)".to_string(),
            };
            println!("  {:<15} {}", format!("{} result:", tab.name()), summary);
        }
        println!("  Statements:     {}", self.queries_executed);
        println!("  Uptime:         {}s", uptime.as_secs());
        println!("  CLI version:    {}", CLI_VERSION.green());
        println!();
    }
}
