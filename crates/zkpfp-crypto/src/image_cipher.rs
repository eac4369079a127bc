//! Photo encryption with AES-256-GCM.
//!
//! The image is sealed under a per-photo key and nonce
//! ([`SymmetricKeyMaterial`]). The output is the ciphertext with the 16-byte
//! authentication tag appended; the nonce travels separately as the artifact's
//! `iv` field.
//!
//! ## Security Model
//!
//! - Each photo gets its own random 256-bit key and 96-bit nonce
//! - AEAD: any modification of the ciphertext, or a wrong key or nonce, makes
//!   decryption fail instead of returning garbage
//! - There is no unauthenticated fallback mode
//!
//! ## Usage
//!
//! ```rust,ignore
//! use zkpfp_crypto::{SymmetricKeyMaterial, encrypt_image_bytes, decrypt_image_bytes};
//!
//! let material = SymmetricKeyMaterial::generate()?;
//! let ciphertext = encrypt_image_bytes(image, material.key(), material.nonce())?;
//! let plaintext = decrypt_image_bytes(&ciphertext, material.key(), material.nonce())?;
//! assert_eq!(plaintext, image);
//! ```

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit},
};
use tracing::debug;

use crate::error::{CryptoError, CryptoResult};
use crate::key_material::{KEY_SIZE, NONCE_SIZE, SymmetricKeyMaterial};

/// AES-GCM authentication tag size (16 bytes)
pub const TAG_SIZE: usize = 16;

fn cipher_for(key: &[u8], nonce: &[u8]) -> CryptoResult<Aes256Gcm> {
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
    Aes256Gcm::new_from_slice(key).map_err(|e| CryptoError::CryptoUnavailable(e.to_string()))
}

/// Encrypt image bytes under `key` and `nonce`.
///
/// Returns `plaintext.len() + TAG_SIZE` bytes.
pub fn encrypt_image_bytes(plaintext: &[u8], key: &[u8], nonce: &[u8]) -> CryptoResult<Vec<u8>> {
    let cipher = cipher_for(key, nonce)?;

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(nonce), plaintext)
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

    debug!(
        plaintext_len = plaintext.len(),
        ciphertext_len = ciphertext.len(),
        "AES-256-GCM encryption completed"
    );
    Ok(ciphertext)
}

/// Decrypt image bytes produced by [`encrypt_image_bytes`].
///
/// # Errors
///
/// Returns [`CryptoError::DecryptionFailed`] if:
/// - The key or nonce is not the one used for encryption
/// - The ciphertext or tag has been tampered with
/// - The input is shorter than the authentication tag
pub fn decrypt_image_bytes(ciphertext: &[u8], key: &[u8], nonce: &[u8]) -> CryptoResult<Vec<u8>> {
    let cipher = cipher_for(key, nonce)?;

    if ciphertext.len() < TAG_SIZE {
        return Err(CryptoError::DataTooShort {
            expected: TAG_SIZE,
            actual: ciphertext.len(),
        });
    }

    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))
}

/// Encrypt with a [`SymmetricKeyMaterial`] pair.
pub fn encrypt_with_material(
    plaintext: &[u8],
    material: &SymmetricKeyMaterial,
) -> CryptoResult<Vec<u8>> {
    encrypt_image_bytes(plaintext, material.key(), material.nonce())
}
