//! Error types for the zkPFP pipeline

use thiserror::Error;
use zkpfp_crypto::CryptoError;
use zkpfp_proof::ProofError;

/// Errors that abort an encrypt / decrypt / reveal operation.
///
/// Proof generation failures never appear here: the pipeline records them as
/// an absent proof and carries on.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Proof(#[from] ProofError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid image input: {0}")]
    InvalidInput(String),

    #[error("Invalid transport artifact: {0}")]
    Transport(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Recovered key does not match the artifact commitment")]
    CommitmentMismatch,

    #[error("No verification key configured")]
    NoVerificationKey,
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;
