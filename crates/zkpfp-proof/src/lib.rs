//! # zkPFP Proof
//!
//! Groth16 (BN254) proofs that a published key commitment was built from the
//! key material used to encrypt a photo.
//!
//! ## Components
//!
//! - [`ProofGenerator`]: best-effort, timeout-bounded proof generation over a
//!   pluggable [`ProvingBackend`]
//! - [`serialize_proof`] / [`deserialize_proof`]: snarkjs-compatible JSON in Base64
//! - [`verify_proof`]: pairing check with [`VerificationFailure`] diagnostics
//! - [`VerificationSession`]: the pending / verifying / valid / invalid state machine
//! - [`VerificationKey`]: snarkjs `verification_key.json`, installable once per process
//!
//! ## Public signals
//!
//! `[commitment_hi, commitment_lo, recipient]`: the big-endian 128-bit halves
//! of the commitment and the first 31 bytes of `SHA-256(recipient)`.

pub mod artifact;
pub mod encoding;
pub mod error;
#[cfg(any(test, feature = "fixtures"))]
pub mod fixture;
pub mod generator;
pub mod serialize;
pub mod session;
pub mod verifier;
pub mod vkey;
pub mod witness;

// Re-exports
pub use artifact::{Groth16Proof, PUBLIC_SIGNAL_COUNT, ProofArtifact, PublicSignals};
pub use error::{ProofError, ProofResult};
pub use generator::{
    DEFAULT_PROOF_TIMEOUT, Groth16Prover, ProgressCallback, ProgressReporter, ProofGenerator,
    ProofProgress, ProofStage, ProvingBackend, WitnessCircuit, read_proving_key,
    write_proving_key,
};
pub use serialize::{deserialize_proof, serialize_proof};
pub use session::{ProofDisplay, VerificationSession, VerificationState};
pub use verifier::{VerificationFailure, verify_proof, verify_serialized};
pub use vkey::VerificationKey;
pub use witness::ProofWitness;
