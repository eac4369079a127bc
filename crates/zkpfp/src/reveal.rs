//! Reveal-path verification of transported artifacts

use std::sync::Arc;

use tracing::instrument;
use zkpfp_proof::{VerificationFailure, VerificationKey, VerificationSession, VerificationState};

use crate::error::{PipelineError, PipelineResult};
use crate::transport::TransportArtifact;

/// Build a verification session for a transported artifact.
///
/// Artifacts without `zkProof`, or with a blank proof string, produce a
/// commitment-only session.
pub fn verification_session(
    artifact: &TransportArtifact,
    key: Arc<VerificationKey>,
) -> VerificationSession {
    let session = VerificationSession::new(key, artifact.commitment.clone());
    match artifact.zk_proof.as_ref().filter(|zk| !zk.proof.trim().is_empty()) {
        Some(zk) => session.with_proof(zk.proof.clone(), zk.public_signals.iter().cloned()),
        None => session,
    }
}

/// Session against the process-wide verification key
pub fn global_verification_session(artifact: &TransportArtifact) -> PipelineResult<VerificationSession> {
    let key = VerificationKey::global().ok_or(PipelineError::NoVerificationKey)?;
    Ok(verification_session(artifact, key))
}

/// Outcome of verifying one artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealReport {
    pub state: VerificationState,
    pub has_proof: bool,
    pub failure: Option<VerificationFailure>,
}

/// Verify a transported artifact to completion.
#[instrument(skip_all, fields(commitment = %artifact.commitment))]
pub async fn verify_artifact(artifact: &TransportArtifact, key: Arc<VerificationKey>) -> RevealReport {
    let mut session = verification_session(artifact, key);
    let state = session.verify().await;
    RevealReport {
        state,
        has_proof: session.has_proof(),
        failure: session.last_failure().cloned(),
    }
}
