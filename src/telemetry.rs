//! Tracing subscriber setup
//!
//! The library only emits `tracing` events. Binaries and tests that want to
//! see them call one of the `init_*` functions once at startup.
//!
//! ```rust,ignore
//! use apiprobe::telemetry::{init_subscriber, OutputFormat, SubscriberConfig};
//!
//! let config = SubscriberConfig::builder()
//!     .log_level(tracing::Level::DEBUG)
//!     .output_format(OutputFormat::Json)
//!     .build();
//! let _guard = init_subscriber(config)?;
//! ```

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::MakeWriter;

use crate::defaults::env;
use crate::error::ClientError;

/// Output format for tracing logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON, one object per line
    Json,
    /// JSON without the span list
    JsonCompact,
}

impl std::str::FromStr for OutputFormat {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "json-compact" => Ok(Self::JsonCompact),
            other => Err(ClientError::ConfigurationError(format!(
                "Invalid log format: {other}. Valid options: text, json, json-compact"
            ))),
        }
    }
}

/// Configuration for the tracing subscriber
#[derive(Debug, Clone)]
pub struct SubscriberConfig {
    pub log_level: tracing::Level,
    pub output_format: OutputFormat,
    /// Write to this file instead of stdout.
    pub log_file: Option<PathBuf>,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            log_level: tracing::Level::INFO,
            output_format: OutputFormat::Text,
            log_file: None,
        }
    }
}

impl SubscriberConfig {
    pub fn builder() -> SubscriberConfigBuilder {
        SubscriberConfigBuilder::default()
    }

    pub fn debug() -> Self {
        Self {
            log_level: tracing::Level::DEBUG,
            ..Self::default()
        }
    }

    /// The crate-scoped filter directive, e.g. `apiprobe=debug`.
    pub fn filter_directive(&self) -> String {
        format!("apiprobe={}", level_name(self.log_level))
    }
}

/// Builder for SubscriberConfig
#[derive(Debug, Default)]
pub struct SubscriberConfigBuilder {
    log_level: Option<tracing::Level>,
    output_format: Option<OutputFormat>,
    log_file: Option<PathBuf>,
}

impl SubscriberConfigBuilder {
    pub fn log_level(mut self, level: tracing::Level) -> Self {
        self.log_level = Some(level);
        self
    }

    /// Set the log level from a string
    pub fn log_level_str(mut self, level: &str) -> Result<Self, ClientError> {
        let level = match level.trim().to_lowercase().as_str() {
            "trace" => tracing::Level::TRACE,
            "debug" => tracing::Level::DEBUG,
            "info" => tracing::Level::INFO,
            "warn" => tracing::Level::WARN,
            "error" => tracing::Level::ERROR,
            other => {
                return Err(ClientError::ConfigurationError(format!(
                    "Invalid log level: {other}. Valid options: trace, debug, info, warn, error"
                )));
            }
        };
        self.log_level = Some(level);
        Ok(self)
    }

    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = Some(format);
        self
    }

    pub fn log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }

    pub fn build(self) -> SubscriberConfig {
        SubscriberConfig {
            log_level: self.log_level.unwrap_or(tracing::Level::INFO),
            output_format: self.output_format.unwrap_or_default(),
            log_file: self.log_file,
        }
    }
}

fn level_name(level: tracing::Level) -> &'static str {
    match level {
        tracing::Level::TRACE => "trace",
        tracing::Level::DEBUG => "debug",
        tracing::Level::INFO => "info",
        tracing::Level::WARN => "warn",
        tracing::Level::ERROR => "error",
    }
}

/// Install the global subscriber.
///
/// Returns the appender guard when logging to a file; keep it alive for the
/// life of the program or buffered lines are lost. Calling this when a
/// subscriber is already installed is not an error.
pub fn init_subscriber(config: SubscriberConfig) -> Result<Option<WorkerGuard>, ClientError> {
    if tracing::dispatcher::has_been_set() {
        return Ok(None);
    }
    let filter = config.filter_directive();

    let (result, guard) = match &config.log_file {
        Some(path) => {
            let (writer, guard) = tracing_appender::non_blocking(file_appender(path)?);
            (try_init(&config, filter, writer, false), Some(guard))
        }
        None => (try_init(&config, filter, std::io::stdout, true), None),
    };

    match result {
        Ok(()) => Ok(guard),
        // Lost a race with another thread installing its subscriber.
        Err(_) if tracing::dispatcher::has_been_set() => Ok(None),
        Err(e) => Err(ClientError::ConfigurationError(format!(
            "Failed to initialize tracing: {e}"
        ))),
    }
}

fn file_appender(path: &Path) -> Result<RollingFileAppender, ClientError> {
    let file_name = path.file_name().ok_or_else(|| {
        ClientError::ConfigurationError(format!("Invalid log file path: {}", path.display()))
    })?;
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy())
        .build(dir)
        .map_err(|e| {
            ClientError::ConfigurationError(format!(
                "Failed to open log file {}: {e}",
                path.display()
            ))
        })
}

fn try_init<W>(
    config: &SubscriberConfig,
    filter: String,
    writer: W,
    ansi: bool,
) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    match config.output_format {
        OutputFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_target(true)
            .with_thread_ids(true)
            .json()
            .try_init(),
        OutputFormat::JsonCompact => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_target(true)
            .json()
            .flatten_event(true)
            .with_current_span(false)
            .with_span_list(false)
            .try_init(),
        OutputFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_ansi(ansi)
            .with_target(true)
            .try_init(),
    }
}

pub fn init_default() -> Result<Option<WorkerGuard>, ClientError> {
    init_subscriber(SubscriberConfig::default())
}

pub fn init_debug() -> Result<Option<WorkerGuard>, ClientError> {
    init_subscriber(SubscriberConfig::debug())
}

/// Build a config from environment variables
///
/// - `APIPROBE_LOG_LEVEL`: trace, debug, info, warn, error
/// - `APIPROBE_LOG_FORMAT`: text, json, json-compact
/// - `APIPROBE_LOG_FILE`: log file path
pub fn config_from_env() -> Result<SubscriberConfig, ClientError> {
    config_from_lookup(|k| std::env::var(k).ok())
}

fn config_from_lookup<F>(lookup: F) -> Result<SubscriberConfig, ClientError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut builder = SubscriberConfig::builder();
    if let Some(level) = lookup(env::LOG_LEVEL).filter(|v| !v.trim().is_empty()) {
        builder = builder.log_level_str(&level)?;
    }
    if let Some(format) = lookup(env::LOG_FORMAT).filter(|v| !v.trim().is_empty()) {
        builder = builder.output_format(format.parse()?);
    }
    if let Some(path) = lookup(env::LOG_FILE).filter(|v| !v.trim().is_empty()) {
        builder = builder.log_file(path.trim());
    }
    Ok(builder.build())
}

/// Initialize from `APIPROBE_LOG_*` environment variables.
pub fn init_from_env() -> Result<Option<WorkerGuard>, ClientError> {
    init_subscriber(config_from_env()?)
}
