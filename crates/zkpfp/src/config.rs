//! TOML configuration
//!
//! ```toml
//! [prover]
//! enabled = true
//! proving_key = "/etc/zkpfp/proving.key"
//! timeout_secs = 60
//!
//! [verifier]
//! verification_key = "/etc/zkpfp/verification_key.json"
//!
//! [logging]
//! default_level = "info"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use zkpfp_logging::LogConfig;
use zkpfp_proof::{DEFAULT_PROOF_TIMEOUT, VerificationKey};

use crate::error::{PipelineError, PipelineResult};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZkpfpConfig {
    pub prover: ProverConfig,
    pub verifier: VerifierConfig,
    pub logging: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProverConfig {
    /// Attempt proof generation at all
    pub enabled: bool,
    /// Compressed Groth16 proving key
    pub proving_key: Option<PathBuf>,
    pub timeout_secs: u64,
}

impl Default for ProverConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            proving_key: None,
            timeout_secs: DEFAULT_PROOF_TIMEOUT.as_secs(),
        }
    }
}

impl ProverConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    /// snarkjs `verification_key.json`
    pub verification_key: Option<PathBuf>,
}

impl ZkpfpConfig {
    pub fn load(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> PipelineResult<Self> {
        let config: Self =
            toml::from_str(contents).map_err(|e| PipelineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> PipelineResult<()> {
        if self.prover.timeout_secs == 0 {
            return Err(PipelineError::Config(
                "prover.timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Load the configured verification key, if any.
    pub fn verification_key(&self) -> PipelineResult<Option<VerificationKey>> {
        self.verifier
            .verification_key
            .as_ref()
            .map(VerificationKey::load)
            .transpose()
            .map_err(PipelineError::from)
    }
}
