//! Client-visible verification state machine
//!
//! ```text
//! Pending ──verify()──▶ Verifying ──▶ Valid
//!                                └──▶ Invalid
//! ```
//!
//! A session without proof data never leaves `Pending` and displays as
//! [`ProofDisplay::CommitmentOnly`]. `Valid` and `Invalid` are terminal.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{info, warn};
use zkpfp_crypto::KeyCommitment;

use crate::artifact::PublicSignals;
use crate::verifier::{VerificationFailure, verify_serialized};
use crate::vkey::VerificationKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationState {
    Pending,
    Verifying,
    Valid,
    Invalid,
}

impl VerificationState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Valid | Self::Invalid)
    }
}

impl std::fmt::Display for VerificationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Verifying => "verifying",
            Self::Valid => "valid",
            Self::Invalid => "invalid",
        };
        f.write_str(s)
    }
}

/// What a viewer should render for an artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProofDisplay {
    /// No proof attached; only the commitment can be shown
    CommitmentOnly,
    Protocol(VerificationState),
}

/// Verification of one transported proof.
pub struct VerificationSession {
    key: Arc<VerificationKey>,
    proof: Option<String>,
    signals: Option<Vec<serde_json::Value>>,
    commitment: String,
    state: watch::Sender<VerificationState>,
    history: Vec<VerificationState>,
    last_failure: Option<VerificationFailure>,
}

impl VerificationSession {
    /// A session for an artifact with the given Base64 commitment
    pub fn new(key: Arc<VerificationKey>, commitment: impl Into<String>) -> Self {
        let (state, _) = watch::channel(VerificationState::Pending);
        Self {
            key,
            proof: None,
            signals: None,
            commitment: commitment.into(),
            state,
            history: vec![VerificationState::Pending],
            last_failure: None,
        }
    }

    /// Attach a proof string and its signals (strings or JSON integers).
    ///
    /// A blank proof string counts as no proof.
    pub fn with_proof<S>(mut self, proof: impl Into<String>, signals: impl IntoIterator<Item = S>) -> Self
    where
        S: Into<serde_json::Value>,
    {
        let proof = proof.into();
        if proof.trim().is_empty() {
            return self;
        }
        self.proof = Some(proof);
        self.signals = Some(signals.into_iter().map(Into::into).collect());
        self
    }

    pub fn has_proof(&self) -> bool {
        self.proof.is_some() && self.signals.is_some()
    }

    pub fn state(&self) -> VerificationState {
        *self.state.borrow()
    }

    pub fn display(&self) -> ProofDisplay {
        if self.has_proof() {
            ProofDisplay::Protocol(self.state())
        } else {
            ProofDisplay::CommitmentOnly
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<VerificationState> {
        self.state.subscribe()
    }

    /// Every state entered so far, starting with `Pending`
    pub fn history(&self) -> &[VerificationState] {
        &self.history
    }

    /// Diagnostic for an `Invalid` outcome
    pub fn last_failure(&self) -> Option<&VerificationFailure> {
        self.last_failure.as_ref()
    }

    pub fn commitment(&self) -> &str {
        &self.commitment
    }

    fn transition(&mut self, next: VerificationState) {
        self.history.push(next);
        self.state.send_replace(next);
    }

    /// Run verification once. Returns the resulting state.
    ///
    /// Calls after a terminal state, or on a session without proof data,
    /// return the current state unchanged.
    pub async fn verify(&mut self) -> VerificationState {
        let current = self.state();
        if current != VerificationState::Pending {
            return current;
        }
        let (Some(proof), Some(signals)) = (self.proof.clone(), self.signals.clone()) else {
            info!("No ZK proof attached; showing commitment only");
            return current;
        };

        self.transition(VerificationState::Verifying);
        let key = Arc::clone(&self.key);
        let commitment = self.commitment.clone();

        let outcome = tokio::task::spawn_blocking(move || check(&key, &proof, &signals, &commitment))
            .await
            .unwrap_or_else(|e| Err(VerificationFailure::Backend(format!("verifier task failed: {}", e))));

        match outcome {
            Ok(()) => {
                info!("ZK proof verified");
                self.transition(VerificationState::Valid);
            }
            Err(failure) => {
                warn!(%failure, "ZK proof rejected");
                self.last_failure = Some(failure);
                self.transition(VerificationState::Invalid);
            }
        }
        self.state()
    }
}

fn check(
    key: &VerificationKey,
    proof: &str,
    signals: &[serde_json::Value],
    commitment: &str,
) -> Result<(), VerificationFailure> {
    let signals = PublicSignals::from_json_values(signals)?;
    let commitment = KeyCommitment::from_base64(commitment)
        .map_err(|e| VerificationFailure::MalformedSignals(format!("commitment: {}", e)))?;
    verify_serialized(key, proof, &signals, Some(&commitment))
}

impl std::fmt::Debug for VerificationSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationSession")
            .field("state", &self.state())
            .field("has_proof", &self.has_proof())
            .field("commitment", &self.commitment)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!VerificationState::Pending.is_terminal());
        assert!(!VerificationState::Verifying.is_terminal());
        assert!(VerificationState::Valid.is_terminal());
        assert!(VerificationState::Invalid.is_terminal());
    }

    #[test]
    fn test_state_serialization() {
        assert_eq!(serde_json::to_string(&VerificationState::Valid).unwrap(), "\"valid\"");
        assert_eq!(VerificationState::Verifying.to_string(), "verifying");
    }
}
