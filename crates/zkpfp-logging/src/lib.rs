//! Tracing subscriber setup for zkPFP
//!
//! # Features
//!
//! - **JSONL Output**: structured JSON lines on stderr (default)
//! - **Pretty Output**: human-readable console format for development
//! - **File Output**: daily/hourly rolling JSONL files via tracing-appender
//! - **`RUST_LOG`**: overrides the configured default level
//!
//! # Quick Start
//!
//! ```ignore
//! use zkpfp_logging::{LogConfig, ZkpfpSubscriberBuilder};
//!
//! // Development mode with pretty human-readable output
//! let _guard = ZkpfpSubscriberBuilder::new()
//!     .with_config(LogConfig::development())
//!     .init()?;
//! ```

pub mod config;

pub use config::{
    ConsoleConfig, FileConfig, JsonlConfig, LogConfig, PIPELINE_DEBUG_FILTER, RotationStrategy,
};

use std::fs::{self, File};

use thiserror::Error;
use tracing::Subscriber;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, Registry, layer::SubscriberExt, util::SubscriberInitExt};

/// Errors raised while installing the subscriber
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to open log file: {0}")]
    File(#[from] std::io::Error),

    #[error("Invalid log filter: {0}")]
    Filter(String),

    #[error("A global subscriber is already installed")]
    AlreadyInitialized,
}

type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync + 'static>;

/// Builder for configuring and initializing the zkPFP logging subscriber
///
/// By default, console output uses JSONL format. Use `LogConfig::development()`
/// for human-readable pretty output during development.
pub struct ZkpfpSubscriberBuilder {
    config: LogConfig,
}

impl ZkpfpSubscriberBuilder {
    /// Create a new subscriber builder with default configuration
    pub fn new() -> Self {
        Self {
            config: LogConfig::default(),
        }
    }

    /// Use a specific configuration
    pub fn with_config(mut self, config: LogConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the default log level
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.config.default_level = level.into();
        self
    }

    /// Enable or disable console output
    pub fn with_console(mut self, enabled: bool) -> Self {
        self.config.console.enabled = enabled;
        self
    }

    /// Configure file output
    pub fn with_file_output(mut self, config: FileConfig) -> Self {
        self.config.file = Some(config);
        self
    }

    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    /// `RUST_LOG` if set, otherwise the configured default level
    fn env_filter(&self) -> Result<EnvFilter, LoggingError> {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => EnvFilter::try_new(&self.config.default_level)
                .map_err(|e| LoggingError::Filter(e.to_string())),
        }
    }

    fn build_layers<S>(&self) -> Result<(Vec<BoxedLayer<S>>, Option<WorkerGuard>), LoggingError>
    where
        S: Subscriber + for<'a> LookupSpan<'a> + Send + Sync,
    {
        let jsonl = &self.config.jsonl;
        let mut layers: Vec<BoxedLayer<S>> = Vec::new();
        let mut guard = None;

        if self.config.console.enabled {
            let layer = if self.config.console.pretty {
                tracing_subscriber::fmt::layer()
                    .with_ansi(self.config.console.ansi)
                    .with_target(true)
                    .with_writer(std::io::stderr)
                    .boxed()
            } else {
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(jsonl.include_spans)
                    .flatten_event(jsonl.flatten_events)
                    .with_file(jsonl.include_location)
                    .with_line_number(jsonl.include_location)
                    .with_writer(std::io::stderr)
                    .boxed()
            };
            layers.push(layer);
        }

        if let Some(file_config) = &self.config.file {
            let (writer, file_guard) = create_file_writer(file_config)?;
            guard = Some(file_guard);
            layers.push(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(jsonl.include_spans)
                    .flatten_event(jsonl.flatten_events)
                    .with_file(jsonl.include_location)
                    .with_line_number(jsonl.include_location)
                    .with_ansi(false)
                    .with_writer(writer)
                    .boxed(),
            );
        }

        Ok((layers, guard))
    }

    /// Install the subscriber globally.
    ///
    /// The returned guard flushes file output on drop and must be kept alive
    /// for the duration of the program.
    pub fn init(self) -> Result<Option<WorkerGuard>, LoggingError> {
        let filter = self.env_filter()?;
        let (layers, guard) = self.build_layers::<Registry>()?;

        Registry::default()
            .with(layers)
            .with(filter)
            .try_init()
            .map_err(|_| LoggingError::AlreadyInitialized)?;

        Ok(guard)
    }
}

impl Default for ZkpfpSubscriberBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Truncating writer for `Never`, rolling appender otherwise
fn create_file_writer(file_config: &FileConfig) -> Result<(NonBlocking, WorkerGuard), LoggingError> {
    fs::create_dir_all(&file_config.directory)?;
    let rotation = match file_config.rotation {
        RotationStrategy::Never => {
            let path = file_config.directory.join(format!("{}.log", file_config.prefix));
            return Ok(tracing_appender::non_blocking(File::create(path)?));
        }
        RotationStrategy::Daily => Rotation::DAILY,
        RotationStrategy::Hourly => Rotation::HOURLY,
    };
    let appender = RollingFileAppender::new(rotation, &file_config.directory, &file_config.prefix);
    Ok(tracing_appender::non_blocking(appender))
}

/// Install the quiet test subscriber.
///
/// Repeated calls are fine: an already installed subscriber is left in place.
pub fn init_testing() -> Result<(), LoggingError> {
    match ZkpfpSubscriberBuilder::new()
        .with_config(LogConfig::testing())
        .init()
    {
        Ok(_) | Err(LoggingError::AlreadyInitialized) => Ok(()),
        Err(e) => Err(e),
    }
}
