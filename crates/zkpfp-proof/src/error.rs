//! Error types for zkpfp-proof

use thiserror::Error;

/// Errors from proof generation, (de)serialization and key handling
#[derive(Debug, Error)]
pub enum ProofError {
    /// Proof generation could not complete. Callers treat this as "no proof"
    /// and continue with a commitment-only artifact.
    #[error("Proof generation unavailable: {0}")]
    GenerationUnavailable(String),

    #[error("Malformed proof: {0}")]
    MalformedProof(String),

    #[error("Malformed public signal: {0}")]
    MalformedSignal(String),

    #[error("Pairing verification failed")]
    PairingVerificationFailed,

    #[error("Invalid verification key: {0}")]
    InvalidVerificationKey(String),

    #[error("Verification key already installed")]
    VerificationKeyAlreadyInstalled,
}

/// Result type for proof operations
pub type ProofResult<T> = Result<T, ProofError>;
