//! Hybrid RSA message protection: OAEP for confidentiality, PKCS#1 v1.5
//! signatures for authenticity.
//!
//! The signature covers SHA-256 of the *plaintext*, so a recipient can only
//! check it after decrypting. Decryption and verification failures are
//! therefore mutually exclusive for a given call.
//!
//! Both private-key operations (signing and OAEP decryption) run blinded
//! with fresh randomness from the OS CSPRNG.

use rand::rngs::OsRng;
use rsa::{Oaep, Pkcs1v15Sign};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::errors::HybridError;
use crate::keys::{FsKeyProvider, KeyProvider};
use crate::types::{HybridEnvelope, PrivateKey, PublicKey};

/* ---------------- Encrypt ---------------- */

/// Encrypt `message` for `receiver` and sign it as `sender`.
pub fn seal(
    message: &str,
    receiver: &PublicKey,
    sender: &PrivateKey,
) -> Result<HybridEnvelope, HybridError> {
    let plaintext = message.as_bytes();
    let max = receiver.oaep_capacity();
    if plaintext.len() > max {
        return Err(HybridError::MessageTooLong {
            len: plaintext.len(),
            max,
        });
    }

    let encrypted_message = receiver
        .as_rsa()
        .encrypt(&mut OsRng, Oaep::new::<Sha256>(), plaintext)
        .map_err(|e| HybridError::EncryptionFailed(format!("oaep: {e}")))?;

    let digest = Sha256::digest(plaintext);
    let signature = sender
        .as_rsa()
        .sign_with_rng(&mut OsRng, Pkcs1v15Sign::new::<Sha256>(), &digest)
        .map_err(|e| HybridError::EncryptionFailed(format!("signing: {e}")))?;

    debug!(
        ciphertext = encrypted_message.len(),
        signature = signature.len(),
        "sealed hybrid envelope"
    );
    Ok(HybridEnvelope {
        encrypted_message,
        signature,
    })
}

/// Encrypt and sign to a text token.
pub fn encrypt(
    message: &str,
    receiver: &PublicKey,
    sender: &PrivateKey,
) -> Result<String, HybridError> {
    seal(message, receiver, sender)?.to_token()
}

/* ---------------- Decrypt ---------------- */

/// Decrypt with `receiver`, then verify the plaintext against `sender`.
/// Plaintext is only returned when both succeed.
pub fn open(
    envelope: &HybridEnvelope,
    receiver: &PrivateKey,
    sender: &PublicKey,
) -> Result<String, HybridError> {
    let plaintext = receiver
        .as_rsa()
        .decrypt_blinded(&mut OsRng, Oaep::new::<Sha256>(), &envelope.encrypted_message)
        .map_err(|e| HybridError::DecryptionFailed(format!("oaep: {e}")))?;

    let digest = Sha256::digest(&plaintext);
    sender
        .as_rsa()
        .verify(Pkcs1v15Sign::new::<Sha256>(), &digest, &envelope.signature)
        .map_err(|_| {
            warn!("hybrid envelope signature rejected");
            HybridError::SignatureVerificationFailed
        })?;

    String::from_utf8(plaintext)
        .map_err(|_| HybridError::DecryptionFailed("plaintext is not utf-8".into()))
}

/// Parse a text token and [`open`] it.
pub fn decrypt(
    token: &str,
    receiver: &PrivateKey,
    sender: &PublicKey,
) -> Result<String, HybridError> {
    let envelope = HybridEnvelope::from_token(token)?;
    open(&envelope, receiver, sender)
}

/* ---------------- Key text / path entry points ---------------- */

/// Encrypt with keys given as PEM text or paths to PEM files.
///
/// Any key problem (missing file, bad PEM, private key passed as the
/// receiver's public key, ...) is reported as
/// [`HybridError::EncryptionFailed`].
pub fn encrypt_asymmetric(
    message: &str,
    receiver_public: &str,
    sender_private: &str,
) -> Result<String, HybridError> {
    let provider = FsKeyProvider;
    let receiver = provider
        .public_key(receiver_public)
        .map_err(|e| HybridError::EncryptionFailed(format!("receiver public key: {e}")))?;
    let sender = provider
        .private_key(sender_private)
        .map_err(|e| HybridError::EncryptionFailed(format!("sender private key: {e}")))?;
    encrypt(message, &receiver, &sender)
}

/// Decrypt with keys given as PEM text or paths to PEM files.
///
/// The token is parsed first; key problems are then reported as
/// [`HybridError::DecryptionFailed`].
pub fn decrypt_asymmetric(
    token: &str,
    receiver_private: &str,
    sender_public: &str,
) -> Result<String, HybridError> {
    let envelope = HybridEnvelope::from_token(token)?;
    let provider = FsKeyProvider;
    let receiver = provider
        .private_key(receiver_private)
        .map_err(|e| HybridError::DecryptionFailed(format!("receiver private key: {e}")))?;
    let sender = provider
        .public_key(sender_public)
        .map_err(|e| HybridError::DecryptionFailed(format!("sender public key: {e}")))?;
    open(&envelope, &receiver, &sender)
}
