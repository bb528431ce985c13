#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Logging initialisation for the NDS admin client.
//!
//! # Design
//! - Centralises logging setup (fmt or JSON) with a single entry point.
//! - Logs go to stderr so command output on stdout stays machine-readable.
//! - Records the invocation trace id once so every module reports the same value.

use anyhow::{Result, anyhow};
use once_cell::sync::OnceCell;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Default logging target when `RUST_LOG` is not provided.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

static TRACE_ID: OnceCell<String> = OnceCell::new();

/// Configure and install the global tracing subscriber.
///
/// # Errors
///
/// Returns an error if the tracing subscriber cannot be installed (for example,
/// because another subscriber has already been set globally).
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let _ = TRACE_ID.set(config.trace_id.to_string());

    let installed = match config.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(build_env_filter(config.level))
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_thread_ids(false),
            )
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(build_env_filter(config.level))
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_thread_ids(false),
            )
            .try_init(),
    };
    installed.map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))?;

    tracing::debug!(
        trace_id = config.trace_id,
        format = ?config.format,
        "logging initialised"
    );
    Ok(())
}

/// Trace id recorded during logging initialisation.
#[must_use]
pub fn trace_id() -> &'static str {
    TRACE_ID.get().map_or("unset", String::as_str)
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig<'a> {
    /// Log level string (e.g., `warn`, `debug`) used when `RUST_LOG` is unset.
    pub level: &'a str,
    /// Output format selection for the tracing subscriber.
    pub format: LogFormat,
    /// Per-invocation identifier, also sent as `x-request-id`.
    pub trace_id: &'a str,
}

impl Default for LoggingConfig<'_> {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL,
            format: LogFormat::infer(),
            trace_id: trace_id(),
        }
    }
}

/// Available output formats for the logger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Emit logs as structured JSON objects.
    Json,
    /// Emit human-readable logs.
    Pretty,
}

impl LogFormat {
    /// Choose a sensible default for the current build.
    #[must_use]
    pub const fn infer() -> Self {
        if cfg!(debug_assertions) {
            Self::Pretty
        } else {
            Self::Json
        }
    }

    /// Parse a format name; unknown names fall back to [`LogFormat::infer`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            "pretty" => Self::Pretty,
            _ => Self::infer(),
        }
    }
}

fn build_env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_names_are_case_insensitive() {
        assert_eq!(LogFormat::from_name(" JSON "), LogFormat::Json);
        assert_eq!(LogFormat::from_name("Pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::from_name("unknown"), LogFormat::infer());
    }

    #[test]
    fn init_logging_installs_subscriber_once() {
        let config = LoggingConfig {
            level: "info",
            format: LogFormat::Pretty,
            trace_id: "trace-1",
        };
        init_logging(&config).expect("first install succeeds and logs its start-up event");
        assert!(init_logging(&config).is_err());
        assert_eq!(trace_id(), "trace-1");
    }
}
