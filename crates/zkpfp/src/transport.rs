//! Encryption artifact and its JSON transport form

use serde::{Deserialize, Serialize};
use zkpfp_crypto::{KeyCommitment, NONCE_SIZE, WrappedKey, decode_base64, encode_base64};
use zkpfp_proof::{ProofArtifact, PublicSignals, deserialize_proof, serialize_proof};

use crate::error::{PipelineError, PipelineResult};

/// Why an artifact carries no proof
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProofAbsence {
    /// No proving backend configured
    Disabled,
    /// Generation failed or timed out
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProofAttachment {
    Attached(ProofArtifact),
    Absent(ProofAbsence),
}

impl ProofAttachment {
    pub fn artifact(&self) -> Option<&ProofArtifact> {
        match self {
            Self::Attached(artifact) => Some(artifact),
            Self::Absent(_) => None,
        }
    }

    pub fn is_attached(&self) -> bool {
        matches!(self, Self::Attached(_))
    }
}

/// Result of encrypting one photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptionArtifact {
    ciphertext: Vec<u8>,
    wrapped_key: WrappedKey,
    nonce: [u8; NONCE_SIZE],
    commitment: KeyCommitment,
    proof: ProofAttachment,
}

impl EncryptionArtifact {
    pub(crate) fn new(
        ciphertext: Vec<u8>,
        wrapped_key: WrappedKey,
        nonce: [u8; NONCE_SIZE],
        commitment: KeyCommitment,
        proof: ProofAttachment,
    ) -> Self {
        Self {
            ciphertext,
            wrapped_key,
            nonce,
            commitment,
            proof,
        }
    }

    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    pub fn wrapped_key(&self) -> &WrappedKey {
        &self.wrapped_key
    }

    pub fn nonce(&self) -> &[u8; NONCE_SIZE] {
        &self.nonce
    }

    pub fn commitment(&self) -> &KeyCommitment {
        &self.commitment
    }

    pub fn proof(&self) -> &ProofAttachment {
        &self.proof
    }

    pub fn to_transport(&self) -> TransportArtifact {
        TransportArtifact {
            encrypted_data: encode_base64(&self.ciphertext),
            encrypted_key: encode_base64(&self.wrapped_key.to_bytes()),
            iv: encode_base64(&self.nonce),
            commitment: self.commitment.to_base64(),
            zk_proof: self.proof.artifact().map(TransportProof::from_artifact),
        }
    }

    /// Strict parse of a transport artifact. A present but unparseable proof
    /// is an error here; use [`crate::reveal`] to grade untrusted proofs.
    pub fn from_transport(transport: &TransportArtifact) -> PipelineResult<Self> {
        let field = |name: &str, value: &str| {
            decode_base64(value).map_err(|e| PipelineError::Transport(format!("{}: {}", name, e)))
        };

        let ciphertext = field("encryptedData", &transport.encrypted_data)?;
        let wrapped_key = WrappedKey::from_bytes(&field("encryptedKey", &transport.encrypted_key)?)
            .map_err(|e| PipelineError::Transport(format!("encryptedKey: {}", e)))?;
        let iv = field("iv", &transport.iv)?;
        let nonce: [u8; NONCE_SIZE] = iv.as_slice().try_into().map_err(|_| {
            PipelineError::Transport(format!("iv: expected {} bytes, got {}", NONCE_SIZE, iv.len()))
        })?;
        let commitment = KeyCommitment::from_base64(&transport.commitment)
            .map_err(|e| PipelineError::Transport(format!("commitment: {}", e)))?;

        let proof = match &transport.zk_proof {
            Some(zk) => ProofAttachment::Attached(zk.to_artifact()?),
            None => ProofAttachment::Absent(ProofAbsence::Unavailable(
                "no proof in transport artifact".to_string(),
            )),
        };

        Ok(Self::new(ciphertext, wrapped_key, nonce, commitment, proof))
    }
}

/// JSON shape exchanged with clients; every binary field is Base64.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportArtifact {
    pub encrypted_data: String,
    pub encrypted_key: String,
    pub iv: String,
    pub commitment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zk_proof: Option<TransportProof>,
}

impl TransportArtifact {
    pub fn to_json(&self) -> PipelineResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| PipelineError::Transport(e.to_string()))
    }

    pub fn from_json(json: &str) -> PipelineResult<Self> {
        serde_json::from_str(json).map_err(|e| PipelineError::Transport(e.to_string()))
    }
}

/// Proof as transported. Signals are kept as raw JSON so loosely typed
/// producers (numbers instead of strings) can still be graded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportProof {
    pub proof: String,
    pub public_signals: Vec<serde_json::Value>,
}

impl TransportProof {
    pub fn from_artifact(artifact: &ProofArtifact) -> Self {
        Self {
            proof: serialize_proof(&artifact.proof),
            public_signals: artifact
                .public_signals
                .as_slice()
                .iter()
                .cloned()
                .map(serde_json::Value::String)
                .collect(),
        }
    }

    pub fn to_artifact(&self) -> PipelineResult<ProofArtifact> {
        let proof = deserialize_proof(&self.proof)?;
        let public_signals = PublicSignals::from_json_values(&self.public_signals)?;
        Ok(ProofArtifact {
            proof,
            public_signals,
        })
    }
}
