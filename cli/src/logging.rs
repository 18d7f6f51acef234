// Logging module, powered by tracing-subscriber
//
// A compatibility bridge (`tracing_log::LogTracer`) captures the `log::*`
// calls made by querypilot-link and routes them through the subscriber.
// Output goes to stderr so it never mixes with query results on stdout.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Default level when `--verbose` is not given
pub const DEFAULT_LEVEL: &str = "warn";

/// Level used with `--verbose`
pub const VERBOSE_LEVEL: &str = "debug";

/// Build the `EnvFilter` from the base level and hardcoded noisy-crate caps.
///
/// `RUST_LOG`, when set and valid, replaces the whole directive set.
pub fn build_env_filter(level: &str, rust_log: Option<&str>) -> anyhow::Result<EnvFilter> {
    if let Some(spec) = rust_log.map(str::trim).filter(|s| !s.is_empty()) {
        if let Ok(filter) = EnvFilter::try_new(spec) {
            return Ok(filter);
        }
    }

    let mut directives = vec![level.to_string()];

    // Suppress noisy third-party crates
    let noisy: &[(&str, &str)] = &[
        ("hyper", "warn"),
        ("hyper_util", "warn"),
        ("reqwest", "warn"),
        ("rustls", "warn"),
        ("h2", "warn"),
        ("rustyline", "warn"),
    ];
    for (target, lvl) in noisy {
        directives.push(format!("{}={}", target, lvl));
    }

    let filter_str = directives.join(",");
    EnvFilter::try_new(&filter_str)
        .map_err(|e| anyhow::anyhow!("Invalid tracing filter '{}': {}", filter_str, e))
}

/// Initialize logging for the terminal client.
///
/// Sets up `tracing-subscriber` with a stderr fmt layer and the
/// `tracing_log::LogTracer` bridge.
pub fn init_logging(verbose: bool, color: bool) -> anyhow::Result<()> {
    let level = if verbose { VERBOSE_LEVEL } else { DEFAULT_LEVEL };
    let rust_log = std::env::var("RUST_LOG").ok();

    // Bridge `log` crate → tracing
    tracing_log::LogTracer::init().ok(); // ok() in case already initialized

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(color)
        .with_target(verbose)
        .without_time()
        .with_filter(build_env_filter(level, rust_log.as_deref())?);

    tracing_subscriber::registry()
        .with(console_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {}", e))?;

    tracing::trace!("Logging initialized: level={}, color={}", level, color);

    Ok(())
}
