//! The `[logging]` table of `zkpfp.toml`
//!
//! ```toml
//! [logging]
//! default_level = "info,zkpfp_proof=debug"
//!
//! [logging.file]
//! directory = "/var/log/zkpfp"
//! rotation = "daily"
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Filter directive for the pipeline crates at debug, everything else at info
pub const PIPELINE_DEBUG_FILTER: &str = "info,zkpfp=debug,zkpfp_crypto=debug,zkpfp_proof=debug";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive; `RUST_LOG` wins when set
    pub default_level: String,
    pub console: ConsoleConfig,
    /// Rolling JSONL file, off unless configured
    pub file: Option<FileConfig>,
    pub jsonl: JsonlConfig,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            default_level: "info".to_string(),
            console: ConsoleConfig::default(),
            file: None,
            jsonl: JsonlConfig::default(),
        }
    }
}

impl LogConfig {
    /// Pretty stderr output with the pipeline crates at debug. Proof stages and
    /// commitment checks become visible; key material is never logged.
    pub fn development() -> Self {
        Self {
            default_level: PIPELINE_DEBUG_FILTER.to_string(),
            console: ConsoleConfig {
                enabled: true,
                pretty: true,
                ansi: true,
            },
            ..Default::default()
        }
    }

    /// Verifier deployments: JSONL files under `log_dir`, console off.
    pub fn production(log_dir: PathBuf) -> Self {
        Self {
            console: ConsoleConfig {
                enabled: false,
                ..ConsoleConfig::default()
            },
            file: Some(FileConfig {
                directory: log_dir,
                ..FileConfig::default()
            }),
            ..Default::default()
        }
    }

    /// Warnings only, so proof fallbacks and rejected proofs still surface in
    /// test output.
    pub fn testing() -> Self {
        Self {
            default_level: "warn".to_string(),
            ..Default::default()
        }
    }
}

/// Console output (always stderr)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub enabled: bool,
    /// Human-readable lines instead of JSONL
    pub pretty: bool,
    pub ansi: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            pretty: false,
            ansi: false,
        }
    }
}

/// Rolling JSONL log files, named `<prefix>.<date>` or `<prefix>.log` when not rotated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub directory: PathBuf,
    pub prefix: String,
    pub rotation: RotationStrategy,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./logs"),
            prefix: "zkpfp".to_string(),
            rotation: RotationStrategy::Daily,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RotationStrategy {
    #[default]
    Daily,
    Hourly,
    /// One file, truncated on start
    Never,
}

/// Shape of JSONL records, shared by the file and non-pretty console output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonlConfig {
    /// `commitment`, `proof` and other event fields at the top level
    pub flatten_events: bool,
    /// Enclosing spans such as `encrypt_image` with their fields
    pub include_spans: bool,
    pub include_location: bool,
}

impl Default for JsonlConfig {
    fn default() -> Self {
        Self {
            flatten_events: true,
            include_spans: true,
            include_location: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert_eq!(config.default_level, "info");
        assert!(config.console.enabled);
        assert!(!config.console.pretty); // JSONL by default
        assert!(config.file.is_none());
    }

    #[test]
    fn test_development_config() {
        let config = LogConfig::development();
        assert_eq!(config.default_level, PIPELINE_DEBUG_FILTER);
        assert!(config.console.pretty);
        assert!(config.console.ansi);
    }

    #[test]
    fn test_presets_are_valid_filters() {
        for config in [
            LogConfig::default(),
            LogConfig::development(),
            LogConfig::production(PathBuf::from("/var/log/zkpfp")),
            LogConfig::testing(),
        ] {
            assert!(
                tracing_subscriber::EnvFilter::try_new(&config.default_level).is_ok(),
                "bad filter {:?}",
                config.default_level
            );
        }
    }

    #[test]
    fn test_production_config() {
        let config = LogConfig::production(PathBuf::from("/var/log/zkpfp"));
        assert_eq!(config.default_level, "info");
        assert!(!config.console.enabled);
        let file = config.file.unwrap();
        assert_eq!(file.directory, PathBuf::from("/var/log/zkpfp"));
        assert_eq!(file.rotation, RotationStrategy::Daily);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: LogConfig = toml::from_str(
            r#"
            default_level = "trace"

            [file]
            directory = "/tmp/zkpfp-logs"
            rotation = "hourly"
            "#,
        )
        .unwrap();
        assert_eq!(config.default_level, "trace");
        assert!(config.console.enabled);
        let file = config.file.unwrap();
        assert_eq!(file.prefix, "zkpfp");
        assert_eq!(file.rotation, RotationStrategy::Hourly);
    }
}
