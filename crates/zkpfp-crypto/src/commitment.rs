//! Key commitments.
//!
//! `commitment = SHA-256(key || nonce)`. The digest is published alongside the
//! ciphertext and is what a ZK proof is checked against; it binds the
//! encryption secret without revealing it.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::codec::{decode_base64, encode_base64};
use crate::error::{CryptoError, CryptoResult};
use crate::key_material::{KEY_SIZE, NONCE_SIZE, SymmetricKeyMaterial};

/// Commitment size (32 bytes, SHA-256 output)
pub const COMMITMENT_SIZE: usize = 32;

/// Binding commitment to a (key, nonce) pair
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyCommitment([u8; COMMITMENT_SIZE]);

impl KeyCommitment {
    /// Compute the commitment for raw key and nonce bytes.
    pub fn compute(key: &[u8], nonce: &[u8]) -> CryptoResult<Self> {
        if key.len() != KEY_SIZE {
            return Err(CryptoError::InvalidKeyLength {
                expected: KEY_SIZE,
                actual: key.len(),
            });
        }
        if nonce.len() != NONCE_SIZE {
            return Err(CryptoError::InvalidNonceLength {
                expected: NONCE_SIZE,
                actual: nonce.len(),
            });
        }
        Ok(Self::digest(key, nonce))
    }

    /// Compute the commitment for validated key material.
    pub fn from_material(material: &SymmetricKeyMaterial) -> Self {
        Self::digest(material.key(), material.nonce())
    }

    fn digest(key: &[u8], nonce: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(key);
        hasher.update(nonce);
        Self(hasher.finalize().into())
    }

    /// Wrap an existing digest
    pub fn from_bytes(bytes: [u8; COMMITMENT_SIZE]) -> Self {
        Self(bytes)
    }

    /// Parse a commitment from a byte slice
    pub fn from_slice(bytes: &[u8]) -> CryptoResult<Self> {
        let digest: [u8; COMMITMENT_SIZE] =
            bytes
                .try_into()
                .map_err(|_| CryptoError::InvalidEncoding(format!(
                    "commitment must be {} bytes, got {}",
                    COMMITMENT_SIZE,
                    bytes.len()
                )))?;
        Ok(Self(digest))
    }

    /// Parse the Base64 transport form
    pub fn from_base64(encoded: &str) -> CryptoResult<Self> {
        Self::from_slice(&decode_base64(encoded)?)
    }

    /// Base64 transport form
    pub fn to_base64(&self) -> String {
        encode_base64(&self.0)
    }

    /// Get the digest bytes
    pub fn as_bytes(&self) -> &[u8; COMMITMENT_SIZE] {
        &self.0
    }

    /// Big-endian 128-bit halves `(hi, lo)`.
    ///
    /// Each half fits a BN254 scalar, which is how the commitment is carried
    /// in proof public signals.
    pub fn limbs(&self) -> ([u8; 16], [u8; 16]) {
        let mut hi = [0u8; 16];
        let mut lo = [0u8; 16];
        hi.copy_from_slice(&self.0[..16]);
        lo.copy_from_slice(&self.0[16..]);
        (hi, lo)
    }

    /// Recompute from `key` and `nonce` and compare in constant time.
    pub fn matches(&self, key: &[u8], nonce: &[u8]) -> bool {
        match Self::compute(key, nonce) {
            Ok(other) => self.0[..].ct_eq(&other.0[..]).into(),
            Err(_) => false,
        }
    }
}

impl std::fmt::Debug for KeyCommitment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "KeyCommitment({}..)", hex::encode(&self.0[..8]))
    }
}

impl std::fmt::Display for KeyCommitment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_base64())
    }
}
