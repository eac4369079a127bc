//! # zkPFP
//!
//! Confidential profile photos: encrypt an image for one recipient, publish a
//! commitment to its key, and attach a Groth16 proof that the commitment was
//! built from that key.
//!
//! ## Example
//!
//! ```rust,ignore
//! use zkpfp::*;
//!
//! let bob = RecipientKeypair::generate()?;
//! let encryptor = ImageEncryptor::from_config::<MyCircuit>(&config.prover);
//!
//! let artifact = encryptor.encrypt_image(&image, &bob.recipient(), None).await?;
//! let json = artifact.to_transport().to_json()?;
//!
//! // Viewer side
//! let report = verify_artifact(&TransportArtifact::from_json(&json)?, key).await;
//! assert_eq!(report.state, VerificationState::Valid);
//!
//! // Recipient side
//! let image = decrypt_image(&artifact, bob.secret())?;
//! ```

pub mod config;
pub mod error;
pub mod pipeline;
pub mod reveal;
pub mod transport;

// Re-exports
pub use config::{ProverConfig, VerifierConfig, ZkpfpConfig};
pub use error::{PipelineError, PipelineResult};
pub use pipeline::{ImageEncryptor, ImageInput, decrypt_image, parse_data_url};
pub use reveal::{RevealReport, global_verification_session, verification_session, verify_artifact};
pub use transport::{
    EncryptionArtifact, ProofAbsence, ProofAttachment, TransportArtifact, TransportProof,
};

pub use zkpfp_crypto::{KeyCommitment, Recipient, RecipientKeypair};
pub use zkpfp_proof::{
    ProofDisplay, ProofGenerator, VerificationFailure, VerificationKey, VerificationSession,
    VerificationState,
};
