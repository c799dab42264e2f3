//! AES-256-CTR message encryption.
//!
//! Every call draws a fresh 8-byte nonce; the counter block is
//! `nonce ‖ 0u64` and increments big-endian per 16-byte block. The token is
//! `base64(nonce ‖ ciphertext)`.
//!
//! CTR gives confidentiality only. A flipped ciphertext bit flips the same
//! plaintext bit; decryption fails only when the result is not UTF-8. The
//! same goes for a wrong key, so an empty message opens under any key.

use aes::Aes256;
use ctr::cipher::{KeyIvInit, StreamCipher};
use tracing::debug;

use crate::errors::SymmetricError;
use crate::keys::{FsKeyProvider, KeyProvider};
use crate::types::{Nonce, SymmetricEnvelope, SymmetricKey, MAX_SYMMETRIC_CHARS};

type Aes256Ctr = ctr::Ctr64BE<Aes256>;

fn apply_keystream(key: &SymmetricKey, nonce: &Nonce, buf: &mut [u8]) {
    let mut cipher = Aes256Ctr::new(key.as_bytes().into(), &nonce.counter_block().into());
    cipher.apply_keystream(buf);
}

/// Encrypt `message` into an envelope under a freshly generated nonce.
pub fn seal(message: &str, key: &SymmetricKey) -> Result<SymmetricEnvelope, SymmetricError> {
    let len = message.chars().count();
    if len > MAX_SYMMETRIC_CHARS {
        return Err(SymmetricError::MessageTooLong {
            len,
            max: MAX_SYMMETRIC_CHARS,
        });
    }

    let nonce = Nonce::random();
    let mut ciphertext = message.as_bytes().to_vec();
    apply_keystream(key, &nonce, &mut ciphertext);
    debug!(bytes = ciphertext.len(), "sealed symmetric envelope");

    Ok(SymmetricEnvelope { nonce, ciphertext })
}

/// Recover the plaintext of an already parsed envelope.
pub fn open(envelope: &SymmetricEnvelope, key: &SymmetricKey) -> Result<String, SymmetricError> {
    let mut plaintext = envelope.ciphertext.clone();
    apply_keystream(key, &envelope.nonce, &mut plaintext);
    String::from_utf8(plaintext).map_err(|_| SymmetricError::DecryptionFailed)
}

/// Encrypt to a text token.
pub fn encrypt(message: &str, key: &SymmetricKey) -> Result<String, SymmetricError> {
    seal(message, key).map(|env| env.to_token())
}

/// Decrypt a text token produced by [`encrypt`].
///
/// A wrong key is reported as [`SymmetricError::DecryptionFailed`] only when
/// the resulting bytes are not UTF-8. Empty and very short messages can come
/// back as `Ok` with garbled text.
pub fn decrypt(token: &str, key: &SymmetricKey) -> Result<String, SymmetricError> {
    let envelope = SymmetricEnvelope::from_token(token)?;
    open(&envelope, key)
}

/// Encrypt with a key given as base64 text or a path to a key file.
pub fn encrypt_symmetric(message: &str, key: &str) -> Result<String, SymmetricError> {
    let key = FsKeyProvider
        .symmetric_key(key)
        .map_err(|e| SymmetricError::InvalidKey(e.to_string()))?;
    encrypt(message, &key)
}

/// Decrypt with a key given as base64 text or a path to a key file.
///
/// A key that cannot be resolved is reported as
/// [`SymmetricError::DecryptionFailed`]. A wrong but well-formed key is
/// caught only as reliably as in [`decrypt`].
pub fn decrypt_symmetric(token: &str, key: &str) -> Result<String, SymmetricError> {
    let key = FsKeyProvider.symmetric_key(key).map_err(|e| {
        debug!(error = %e, "symmetric key resolution failed");
        SymmetricError::DecryptionFailed
    })?;
    decrypt(token, &key)
}
