//! Per-encryption symmetric key material
//!
//! Every photo encryption draws a fresh 256-bit key and 96-bit nonce from the
//! operating system's CSPRNG. The material lives only for the duration of one
//! encrypt + prove call and is zeroized when dropped.

use rand::TryRngCore;
use rand::rngs::OsRng;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{CryptoError, CryptoResult};

/// Symmetric key size (32 bytes, AES-256)
pub const KEY_SIZE: usize = 32;

/// Nonce size (12 bytes, AES-GCM IV)
pub const NONCE_SIZE: usize = 12;

/// Raw symmetric key
pub type SymmetricKey = [u8; KEY_SIZE];

/// Fill a buffer from the OS random source.
///
/// Fails with [`CryptoError::CryptoUnavailable`] when no entropy source can be
/// reached, which is the only way key generation can fail.
pub fn fill_random(buf: &mut [u8]) -> CryptoResult<()> {
    OsRng
        .try_fill_bytes(buf)
        .map_err(|e| CryptoError::CryptoUnavailable(format!("OS random source: {}", e)))
}

/// Key and nonce for a single encryption operation.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKeyMaterial {
    key: SymmetricKey,
    nonce: [u8; NONCE_SIZE],
}

impl SymmetricKeyMaterial {
    /// Generate fresh key material from the OS CSPRNG
    pub fn generate() -> CryptoResult<Self> {
        let mut material = Self {
            key: [0u8; KEY_SIZE],
            nonce: [0u8; NONCE_SIZE],
        };
        fill_random(&mut material.key)?;
        fill_random(&mut material.nonce)?;
        Ok(material)
    }

    /// Build from raw slices, validating both lengths
    pub fn from_slices(key: &[u8], nonce: &[u8]) -> CryptoResult<Self> {
        let key: SymmetricKey = key.try_into().map_err(|_| CryptoError::InvalidKeyLength {
            expected: KEY_SIZE,
            actual: key.len(),
        })?;
        let nonce: [u8; NONCE_SIZE] =
            nonce
                .try_into()
                .map_err(|_| CryptoError::InvalidNonceLength {
                    expected: NONCE_SIZE,
                    actual: nonce.len(),
                })?;
        Ok(Self { key, nonce })
    }

    /// Get the raw key bytes (use with caution)
    pub fn key(&self) -> &SymmetricKey {
        &self.key
    }

    /// Get the nonce bytes
    pub fn nonce(&self) -> &[u8; NONCE_SIZE] {
        &self.nonce
    }
}

impl std::fmt::Debug for SymmetricKeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymmetricKeyMaterial")
            .field("key", &"<redacted>")
            .field("nonce", &hex::encode(self.nonce))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_material() {
        let a = SymmetricKeyMaterial::generate().unwrap();
        let b = SymmetricKeyMaterial::generate().unwrap();

        assert_ne!(a.key(), b.key());
        assert_ne!(a.nonce(), b.nonce());
        assert_eq!(a.key().len(), KEY_SIZE);
        assert_eq!(a.nonce().len(), NONCE_SIZE);
    }

    #[test]
    fn test_from_slices_validates_lengths() {
        assert!(SymmetricKeyMaterial::from_slices(&[1u8; 32], &[2u8; 12]).is_ok());

        match SymmetricKeyMaterial::from_slices(&[1u8; 16], &[2u8; 12]) {
            Err(CryptoError::InvalidKeyLength { expected, actual }) => {
                assert_eq!(expected, 32);
                assert_eq!(actual, 16);
            }
            other => panic!("expected InvalidKeyLength, got {:?}", other),
        }

        match SymmetricKeyMaterial::from_slices(&[1u8; 32], &[2u8; 24]) {
            Err(CryptoError::InvalidNonceLength { expected, actual }) => {
                assert_eq!(expected, 12);
                assert_eq!(actual, 24);
            }
            other => panic!("expected InvalidNonceLength, got {:?}", other),
        }
    }

    #[test]
    fn test_debug_redacts_key() {
        let material = SymmetricKeyMaterial::from_slices(&[0xAB; 32], &[0x01; 12]).unwrap();
        let debug_str = format!("{:?}", material);

        assert!(debug_str.contains("<redacted>"));
        assert!(!debug_str.contains("abab"));
    }

    #[test]
    fn test_zeroize_clears_key() {
        let mut material = SymmetricKeyMaterial::from_slices(&[0xAB; 32], &[0x01; 12]).unwrap();
        material.zeroize();

        assert_eq!(material.key(), &[0u8; KEY_SIZE]);
        assert_eq!(material.nonce(), &[0u8; NONCE_SIZE]);
    }
}
