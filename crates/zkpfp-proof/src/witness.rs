//! Private proof inputs.

use ark_bn254::Fr;
use ark_ff::PrimeField;
use zeroize::Zeroizing;
use zkpfp_crypto::{KEY_SIZE, KeyCommitment, NONCE_SIZE, SymmetricKeyMaterial};

use crate::artifact::{PublicSignals, commitment_fields, recipient_field};
use crate::error::{ProofError, ProofResult};

/// Key material, recipient and commitment for one proof.
///
/// Secret fields are zeroized on drop.
pub struct ProofWitness {
    key: Zeroizing<[u8; KEY_SIZE]>,
    nonce: Zeroizing<[u8; NONCE_SIZE]>,
    recipient: String,
    commitment: KeyCommitment,
}

impl ProofWitness {
    /// Build a witness. Fails if `commitment` was not computed from `material`.
    pub fn new(
        material: &SymmetricKeyMaterial,
        recipient: impl Into<String>,
        commitment: KeyCommitment,
    ) -> ProofResult<Self> {
        if !commitment.matches(material.key(), material.nonce()) {
            return Err(ProofError::GenerationUnavailable(
                "malformed witness: commitment does not match key material".to_string(),
            ));
        }
        Ok(Self {
            key: Zeroizing::new(*material.key()),
            nonce: Zeroizing::new(*material.nonce()),
            recipient: recipient.into(),
            commitment,
        })
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    pub fn commitment(&self) -> &KeyCommitment {
        &self.commitment
    }

    /// Public signals this witness should prove
    pub fn public_signals(&self) -> PublicSignals {
        PublicSignals::for_commitment(&self.commitment, &self.recipient)
    }

    /// Public inputs in circuit order: `[commitment_hi, commitment_lo, recipient]`
    pub fn public_inputs(&self) -> [Fr; 3] {
        let [hi, lo] = commitment_fields(&self.commitment);
        [hi, lo, recipient_field(&self.recipient)]
    }

    /// Key as two 128-bit big-endian scalars, high half first
    pub fn key_fields(&self) -> [Fr; 2] {
        let half = KEY_SIZE / 2;
        [
            Fr::from_be_bytes_mod_order(&self.key[..half]),
            Fr::from_be_bytes_mod_order(&self.key[half..]),
        ]
    }

    pub fn nonce_field(&self) -> Fr {
        Fr::from_be_bytes_mod_order(&self.nonce[..])
    }
}

impl std::fmt::Debug for ProofWitness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProofWitness")
            .field("key", &"[REDACTED]")
            .field("nonce", &"[REDACTED]")
            .field("recipient", &self.recipient)
            .field("commitment", &self.commitment)
            .finish()
    }
}
