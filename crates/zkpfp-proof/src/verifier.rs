//! Groth16 proof verification with typed failure diagnostics.

use ark_bn254::{Bn254, Fr};
use ark_groth16::Groth16;
use ark_snark::SNARK;
use thiserror::Error;
use tracing::debug;
use zkpfp_crypto::KeyCommitment;

use crate::artifact::{Groth16Proof, PublicSignals};
use crate::error::ProofError;
use crate::serialize::deserialize_proof;
use crate::vkey::VerificationKey;

/// Why a proof was not accepted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationFailure {
    #[error("malformed proof: {0}")]
    MalformedProof(String),

    #[error("malformed public signals: {0}")]
    MalformedSignals(String),

    #[error("expected {expected} public signals, got {actual}")]
    SignalCountMismatch { expected: usize, actual: usize },

    #[error("public signals do not encode the artifact commitment")]
    CommitmentMismatch,

    #[error("pairing check failed")]
    PairingVerificationFailed,

    #[error("verification backend error: {0}")]
    Backend(String),
}

impl From<ProofError> for VerificationFailure {
    fn from(err: ProofError) -> Self {
        match err {
            ProofError::MalformedProof(msg) => Self::MalformedProof(msg),
            ProofError::MalformedSignal(msg) => Self::MalformedSignals(msg),
            ProofError::PairingVerificationFailed => Self::PairingVerificationFailed,
            other => Self::Backend(other.to_string()),
        }
    }
}

/// Verify `proof` against `signals` under `key`.
pub fn verify_proof(
    key: &VerificationKey,
    proof: &Groth16Proof,
    signals: &PublicSignals,
) -> Result<(), VerificationFailure> {
    let expected = key.num_public_inputs();
    if signals.len() != expected {
        return Err(VerificationFailure::SignalCountMismatch {
            expected,
            actual: signals.len(),
        });
    }

    let inputs: Vec<Fr> = signals.to_field_elements()?;
    let proof: ark_groth16::Proof<Bn254> = proof.into();
    let accepted = Groth16::<Bn254>::verify_with_processed_vk(key.prepared(), &inputs, &proof)
        .map_err(|e| VerificationFailure::Backend(e.to_string()))?;

    debug!(accepted, "Pairing check complete");
    if accepted {
        Ok(())
    } else {
        Err(VerificationFailure::PairingVerificationFailed)
    }
}

/// Deserialize and verify a transported proof, optionally requiring that the
/// signals encode `commitment`.
pub fn verify_serialized(
    key: &VerificationKey,
    proof: &str,
    signals: &PublicSignals,
    commitment: Option<&KeyCommitment>,
) -> Result<(), VerificationFailure> {
    let proof = deserialize_proof(proof)?;
    if let Some(commitment) = commitment {
        if !signals.encodes_commitment(commitment) {
            return Err(VerificationFailure::CommitmentMismatch);
        }
    }
    verify_proof(key, &proof, signals)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use zkpfp_crypto::SymmetricKeyMaterial;

    use super::*;
    use crate::artifact::ProofArtifact;
    use crate::fixture::{FixtureCircuit, fixture_rng, setup_fixture_keys};
    use crate::generator::{Groth16Prover, ProofGenerator};
    use crate::serialize::serialize_proof;

    async fn fixture() -> (VerificationKey, ProofArtifact, KeyCommitment) {
        let (pk, vk) = setup_fixture_keys(&mut fixture_rng()).unwrap();
        let material = SymmetricKeyMaterial::generate().unwrap();
        let commitment = KeyCommitment::from_material(&material);
        let generator = ProofGenerator::new(Arc::new(Groth16Prover::<FixtureCircuit>::with_proving_key(pk)));
        let artifact = generator.generate(&material, "R1", &commitment, None).await.unwrap();
        (vk, artifact, commitment)
    }

    #[tokio::test]
    async fn test_valid_proof_accepted() {
        let (vk, artifact, commitment) = fixture().await;
        assert!(verify_proof(&vk, &artifact.proof, &artifact.public_signals).is_ok());

        let encoded = serialize_proof(&artifact.proof);
        assert!(verify_serialized(&vk, &encoded, &artifact.public_signals, Some(&commitment)).is_ok());
    }

    #[tokio::test]
    async fn test_altered_signal_rejected() {
        let (vk, artifact, _) = fixture().await;
        let mut signals = artifact.public_signals.as_slice().to_vec();
        signals[2] = "12345".to_string();
        let signals = PublicSignals::parse(signals).unwrap();
        assert_eq!(
            verify_proof(&vk, &artifact.proof, &signals),
            Err(VerificationFailure::PairingVerificationFailed)
        );
    }

    #[tokio::test]
    async fn test_signal_count_checked() {
        let (vk, artifact, _) = fixture().await;
        let signals = PublicSignals::parse(&artifact.public_signals.as_slice()[..2]).unwrap();
        assert_eq!(
            verify_proof(&vk, &artifact.proof, &signals),
            Err(VerificationFailure::SignalCountMismatch { expected: 3, actual: 2 })
        );
    }

    #[tokio::test]
    async fn test_commitment_mismatch() {
        let (vk, artifact, _) = fixture().await;
        let other = KeyCommitment::compute(&[1u8; 32], &[2u8; 12]).unwrap();
        let encoded = serialize_proof(&artifact.proof);
        assert_eq!(
            verify_serialized(&vk, &encoded, &artifact.public_signals, Some(&other)),
            Err(VerificationFailure::CommitmentMismatch)
        );
    }

    #[tokio::test]
    async fn test_malformed_proof_string() {
        let (vk, artifact, _) = fixture().await;
        let result = verify_serialized(&vk, "bm90IGEgcHJvb2Y=", &artifact.public_signals, None);
        assert!(matches!(result, Err(VerificationFailure::MalformedProof(_))));
    }
}
