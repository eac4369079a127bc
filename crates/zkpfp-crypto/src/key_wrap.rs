//! Recipient key wrapping
//!
//! Packages a photo's symmetric key so that only the intended recipient can
//! recover it. Each wrap uses a fresh ephemeral X25519 secret; the wrapping
//! key is derived with HKDF-SHA256 from the shared secret and both public
//! keys, and the symmetric key is sealed with ChaCha20-Poly1305.
//!
//! Wire format (version 1):
//! `[1 byte: version][32 bytes: ephemeral public][12 bytes: nonce][48 bytes: ciphertext + tag]`
//!
//! The leading version byte is checked on parse. Digest-style placeholders
//! from older prototypes carry no version and are rejected instead of being
//! "unwrapped" into garbage.

use chacha20poly1305::{
    ChaCha20Poly1305, Nonce,
    aead::{Aead, KeyInit},
};
use hkdf::Hkdf;
use sha2::Sha256;
use x25519_dalek::{PublicKey, StaticSecret};
use zeroize::Zeroizing;

use crate::error::{CryptoError, CryptoResult};
use crate::key_material::{KEY_SIZE, SymmetricKey, fill_random};

/// Current wrap format version
pub const WRAP_VERSION: u8 = 1;

/// Nonce size for ChaCha20-Poly1305 (12 bytes)
pub const WRAP_NONCE_SIZE: usize = 12;

/// Poly1305 tag size
const WRAP_TAG_SIZE: usize = 16;

/// Total encoded size of a version 1 wrapped key
pub const WRAPPED_KEY_SIZE: usize = 1 + 32 + WRAP_NONCE_SIZE + KEY_SIZE + WRAP_TAG_SIZE;

const HKDF_INFO: &[u8] = b"zkpfp/key-wrap/v1";

/// Prefix for explicit X25519 recipient keys
const X25519_PREFIX: &str = "x25519:";

/// A recipient: the identity label the proof is bound to, plus the X25519
/// public key the symmetric key is wrapped for.
#[derive(Clone)]
pub struct Recipient {
    identity: String,
    public_key: PublicKey,
}

impl Recipient {
    /// Bind an identity label to an explicit X25519 public key
    pub fn new(identity: impl Into<String>, public_key: PublicKey) -> Self {
        Self {
            identity: identity.into(),
            public_key,
        }
    }

    /// Parse a recipient identity string into a public key.
    ///
    /// Accepted forms:
    /// - `x25519:<64 hex chars>`: a raw X25519 public key
    /// - `<64 hex chars>`: same, without the prefix
    /// - a Base58 Ed25519 wallet address, converted to its X25519 form
    ///
    /// The full input string becomes the recipient identity.
    pub fn parse(identity: &str) -> CryptoResult<Self> {
        let trimmed = identity.trim();
        if trimmed.is_empty() {
            return Err(CryptoError::RecipientKeyInvalid(
                "empty recipient identity".to_string(),
            ));
        }

        let hex_part = trimmed.strip_prefix(X25519_PREFIX);
        let public_key = match hex_part {
            Some(h) => parse_x25519_hex(h)?,
            None if trimmed.len() == 64 && trimmed.bytes().all(|b| b.is_ascii_hexdigit()) => {
                parse_x25519_hex(trimmed)?
            }
            None => parse_ed25519_address(trimmed)?,
        };

        Ok(Self {
            identity: trimmed.to_string(),
            public_key,
        })
    }

    /// The identity label
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// The X25519 public key
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }
}

impl std::fmt::Debug for Recipient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recipient")
            .field("identity", &self.identity)
            .field("public_key", &hex::encode(&self.public_key.as_bytes()[..8]))
            .finish()
    }
}

fn parse_x25519_hex(h: &str) -> CryptoResult<PublicKey> {
    let bytes = hex::decode(h).map_err(|e| CryptoError::RecipientKeyInvalid(e.to_string()))?;
    let bytes: [u8; 32] = bytes.try_into().map_err(|v: Vec<u8>| {
        CryptoError::RecipientKeyInvalid(format!("X25519 key must be 32 bytes, got {}", v.len()))
    })?;
    Ok(PublicKey::from(bytes))
}

fn parse_ed25519_address(address: &str) -> CryptoResult<PublicKey> {
    let bytes = bs58::decode(address)
        .into_vec()
        .map_err(|e| CryptoError::RecipientKeyInvalid(format!("not a base58 address: {}", e)))?;
    let bytes: [u8; 32] = bytes.try_into().map_err(|v: Vec<u8>| {
        CryptoError::RecipientKeyInvalid(format!("address must decode to 32 bytes, got {}", v.len()))
    })?;
    let verifying_key = ed25519_dalek::VerifyingKey::from_bytes(&bytes)
        .map_err(|e| CryptoError::RecipientKeyInvalid(e.to_string()))?;
    Ok(PublicKey::from(verifying_key.to_montgomery().to_bytes()))
}

/// Recipient-side X25519 key pair
pub struct RecipientKeypair {
    secret: StaticSecret,
    public: PublicKey,
}

impl RecipientKeypair {
    /// Generate a new random key pair
    pub fn generate() -> CryptoResult<Self> {
        let mut bytes = Zeroizing::new([0u8; 32]);
        fill_random(&mut bytes[..])?;
        Ok(Self::from_secret_bytes(*bytes))
    }

    /// Create from raw secret bytes
    pub fn from_secret_bytes(bytes: [u8; 32]) -> Self {
        let secret = StaticSecret::from(bytes);
        let public = PublicKey::from(&secret);
        Self { secret, public }
    }

    /// Parse a hex-encoded secret
    pub fn from_secret_hex(h: &str) -> CryptoResult<Self> {
        let bytes = Zeroizing::new(
            hex::decode(h.trim()).map_err(|e| CryptoError::RecipientKeyInvalid(e.to_string()))?,
        );
        let secret: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
            CryptoError::RecipientKeyInvalid(format!(
                "secret must be 32 bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self::from_secret_bytes(secret))
    }

    /// Hex-encoded secret (keep this private)
    pub fn secret_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.secret.to_bytes()))
    }

    /// The secret half
    pub fn secret(&self) -> &StaticSecret {
        &self.secret
    }

    /// The public half
    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    /// The public key in `x25519:<hex>` identity form
    pub fn identity(&self) -> String {
        format!("{}{}", X25519_PREFIX, hex::encode(self.public.as_bytes()))
    }

    /// A [`Recipient`] for this key pair with its default identity
    pub fn recipient(&self) -> Recipient {
        Recipient::new(self.identity(), self.public)
    }
}

/// A symmetric key wrapped for one recipient
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrappedKey {
    /// Format version
    pub version: u8,
    /// Ephemeral X25519 public key of the sender
    pub ephemeral_public: [u8; 32],
    /// ChaCha20-Poly1305 nonce
    pub nonce: [u8; WRAP_NONCE_SIZE],
    /// Encrypted symmetric key with authentication tag
    pub ciphertext: Vec<u8>,
}

impl WrappedKey {
    /// Encode to the version-tagged wire format
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(1 + 32 + WRAP_NONCE_SIZE + self.ciphertext.len());
        bytes.push(self.version);
        bytes.extend_from_slice(&self.ephemeral_public);
        bytes.extend_from_slice(&self.nonce);
        bytes.extend_from_slice(&self.ciphertext);
        bytes
    }

    /// Parse the wire format, rejecting unknown versions
    pub fn from_bytes(data: &[u8]) -> CryptoResult<Self> {
        let version = *data.first().ok_or(CryptoError::DataTooShort {
            expected: WRAPPED_KEY_SIZE,
            actual: 0,
        })?;
        if version != WRAP_VERSION {
            return Err(CryptoError::UnsupportedWrapVersion(version));
        }
        if data.len() != WRAPPED_KEY_SIZE {
            return Err(CryptoError::DataTooShort {
                expected: WRAPPED_KEY_SIZE,
                actual: data.len(),
            });
        }

        let mut ephemeral_public = [0u8; 32];
        ephemeral_public.copy_from_slice(&data[1..33]);
        let mut nonce = [0u8; WRAP_NONCE_SIZE];
        nonce.copy_from_slice(&data[33..33 + WRAP_NONCE_SIZE]);

        Ok(Self {
            version,
            ephemeral_public,
            nonce,
            ciphertext: data[33 + WRAP_NONCE_SIZE..].to_vec(),
        })
    }
}

fn derive_wrapping_key(
    shared: &[u8; 32],
    ephemeral_public: &[u8; 32],
    recipient_public: &[u8; 32],
) -> CryptoResult<Zeroizing<[u8; 32]>> {
    let mut salt = [0u8; 64];
    salt[..32].copy_from_slice(ephemeral_public);
    salt[32..].copy_from_slice(recipient_public);

    let hk = Hkdf::<Sha256>::new(Some(&salt), shared);
    let mut okm = Zeroizing::new([0u8; 32]);
    hk.expand(HKDF_INFO, &mut okm[..])
        .map_err(|e| CryptoError::CryptoUnavailable(e.to_string()))?;
    Ok(okm)
}

/// Wrap `key` for `recipient`.
pub fn wrap_key(key: &SymmetricKey, recipient: &Recipient) -> CryptoResult<WrappedKey> {
    let mut ephemeral_bytes = Zeroizing::new([0u8; 32]);
    fill_random(&mut ephemeral_bytes[..])?;
    let ephemeral_secret = StaticSecret::from(*ephemeral_bytes);
    let ephemeral_public = PublicKey::from(&ephemeral_secret);

    let shared = ephemeral_secret.diffie_hellman(recipient.public_key());
    if !shared.was_contributory() {
        return Err(CryptoError::RecipientKeyInvalid(
            "recipient key is a low-order point".to_string(),
        ));
    }

    let wrapping_key = derive_wrapping_key(
        shared.as_bytes(),
        ephemeral_public.as_bytes(),
        recipient.public_key().as_bytes(),
    )?;
    let cipher = ChaCha20Poly1305::new_from_slice(wrapping_key.as_slice())
        .map_err(|e| CryptoError::CryptoUnavailable(e.to_string()))?;

    let mut nonce = [0u8; WRAP_NONCE_SIZE];
    fill_random(&mut nonce)?;

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), key.as_slice())
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

    Ok(WrappedKey {
        version: WRAP_VERSION,
        ephemeral_public: ephemeral_public.to_bytes(),
        nonce,
        ciphertext,
    })
}

/// Recover the symmetric key with the recipient's secret.
pub fn unwrap_key(
    wrapped: &WrappedKey,
    recipient_secret: &StaticSecret,
) -> CryptoResult<Zeroizing<SymmetricKey>> {
    if wrapped.version != WRAP_VERSION {
        return Err(CryptoError::UnsupportedWrapVersion(wrapped.version));
    }

    let ephemeral_public = PublicKey::from(wrapped.ephemeral_public);
    let recipient_public = PublicKey::from(recipient_secret);
    let shared = recipient_secret.diffie_hellman(&ephemeral_public);
    if !shared.was_contributory() {
        return Err(CryptoError::DecryptionFailed(
            "ephemeral key is a low-order point".to_string(),
        ));
    }

    let wrapping_key = derive_wrapping_key(
        shared.as_bytes(),
        &wrapped.ephemeral_public,
        recipient_public.as_bytes(),
    )?;
    let cipher = ChaCha20Poly1305::new_from_slice(wrapping_key.as_slice())
        .map_err(|e| CryptoError::CryptoUnavailable(e.to_string()))?;

    let key_bytes = Zeroizing::new(
        cipher
            .decrypt(Nonce::from_slice(&wrapped.nonce), wrapped.ciphertext.as_slice())
            .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))?,
    );

    let key: SymmetricKey = key_bytes.as_slice().try_into().map_err(|_| {
        CryptoError::InvalidKeyLength {
            expected: KEY_SIZE,
            actual: key_bytes.len(),
        }
    })?;
    Ok(Zeroizing::new(key))
}
