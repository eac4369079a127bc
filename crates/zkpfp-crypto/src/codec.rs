//! Base64 transport codec.
//!
//! Every binary field of an artifact (ciphertext, wrapped key, IV,
//! commitment, serialized proof) travels as standard padded Base64. Inputs
//! can be multi-megabyte ciphertexts, so both directions work in fixed
//! windows appended to a single pre-sized buffer.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::error::{CryptoError, CryptoResult};

/// Encode window in bytes; a multiple of 3 so window outputs concatenate
/// without intermediate padding.
pub const CHUNK_SIZE: usize = 8190;

/// Decode window in characters (`CHUNK_SIZE / 3 * 4`).
pub const ENCODED_CHUNK_SIZE: usize = CHUNK_SIZE / 3 * 4;

/// Encode bytes as standard padded Base64.
pub fn encode_base64(bytes: &[u8]) -> String {
    let capacity = base64::encoded_len(bytes.len(), true).unwrap_or(0);
    let mut out = String::with_capacity(capacity);
    for chunk in bytes.chunks(CHUNK_SIZE) {
        STANDARD.encode_string(chunk, &mut out);
    }
    out
}

/// Decode standard padded Base64. Exact inverse of [`encode_base64`].
pub fn decode_base64(encoded: &str) -> CryptoResult<Vec<u8>> {
    let input = encoded.as_bytes();
    if input.len() % 4 != 0 {
        return Err(CryptoError::InvalidEncoding(format!(
            "base64 length {} is not a multiple of 4",
            input.len()
        )));
    }

    let mut out = Vec::with_capacity(input.len() / 4 * 3);
    let mut windows = input.chunks(ENCODED_CHUNK_SIZE).peekable();
    while let Some(window) = windows.next() {
        // Padding is only legal in the final window.
        if windows.peek().is_some() && window.last() == Some(&b'=') {
            return Err(CryptoError::InvalidEncoding(
                "padding before end of input".to_string(),
            ));
        }
        STANDARD
            .decode_vec(window, &mut out)
            .map_err(|e| CryptoError::InvalidEncoding(e.to_string()))?;
    }
    Ok(out)
}
