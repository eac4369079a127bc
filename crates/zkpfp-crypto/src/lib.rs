//! # zkPFP Crypto
//!
//! Cryptographic primitives for confidential profile photos.
//!
//! ## Features
//!
//! - AES-256-GCM authenticated encryption of image bytes
//! - SHA-256 key commitments binding a photo's key and nonce
//! - X25519 + HKDF + ChaCha20-Poly1305 key wrapping for a recipient
//! - Chunked Base64 codec for every transport field
//!
//! ## Key Types
//!
//! - [`SymmetricKeyMaterial`]: per-photo key and nonce, zeroized on drop
//! - [`KeyCommitment`]: published digest of the key material
//! - [`Recipient`] / [`RecipientKeypair`]: who a photo key is wrapped for
//! - [`WrappedKey`]: version-tagged wrapped key
//!
//! ## Example
//!
//! ```rust,ignore
//! use zkpfp_crypto::*;
//!
//! let bob = RecipientKeypair::generate()?;
//! let material = SymmetricKeyMaterial::generate()?;
//!
//! let ciphertext = encrypt_with_material(image, &material)?;
//! let commitment = KeyCommitment::from_material(&material);
//! let wrapped = wrap_key(material.key(), &bob.recipient())?;
//!
//! // Bob recovers the key and the photo
//! let key = unwrap_key(&wrapped, bob.secret())?;
//! let image = decrypt_image_bytes(&ciphertext, key.as_slice(), material.nonce())?;
//! ```

pub mod codec;
pub mod commitment;
pub mod error;
pub mod image_cipher;
pub mod key_material;
pub mod key_wrap;

// Re-exports
pub use codec::{CHUNK_SIZE, decode_base64, encode_base64};
pub use commitment::{COMMITMENT_SIZE, KeyCommitment};
pub use error::{CryptoError, CryptoResult};
pub use image_cipher::{TAG_SIZE, decrypt_image_bytes, encrypt_image_bytes, encrypt_with_material};
pub use key_material::{KEY_SIZE, NONCE_SIZE, SymmetricKey, SymmetricKeyMaterial};
pub use key_wrap::{
    Recipient, RecipientKeypair, WRAP_VERSION, WRAPPED_KEY_SIZE, WrappedKey, unwrap_key, wrap_key,
};

// Re-export x25519 types for convenience
pub use x25519_dalek::{PublicKey, StaticSecret};
