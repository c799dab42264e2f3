//! Error types for duocrypt operations.
//!
//! Each component owns a small closed enum. Callers can match on the variant;
//! the carried text is for humans only.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while resolving, parsing, generating, or saving key material.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum KeyError {
    /// Key text is not valid base64 (or not valid UTF-8 where text was expected).
    #[error("invalid key encoding: {0}")]
    InvalidEncoding(String),

    /// Decoded key has the wrong number of bytes.
    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    WrongLength { expected: usize, actual: usize },

    /// Key file does not exist.
    #[error("key file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Reading or writing a key file failed.
    #[error("key file i/o: {0}")]
    Io(String),

    /// PEM text could not be parsed as the expected RSA key type.
    #[error("invalid pem: {0}")]
    InvalidPem(String),

    /// RSA key generation or export failed.
    #[error("key generation failed: {0}")]
    Generation(String),
}

/// Errors from the symmetric (AES-256-CTR) engine.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SymmetricError {
    /// The key could not be resolved to exactly 32 bytes.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Message exceeds the symmetric ceiling (counted in characters).
    #[error("message too long: {len} characters, max {max}")]
    MessageTooLong { len: usize, max: usize },

    /// Token is not base64 or is shorter than the nonce.
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// Wrong key, corrupted ciphertext, or undecodable plaintext. Deliberately
    /// carries no detail.
    #[error("decryption failed")]
    DecryptionFailed,
}

/// Errors from the hybrid RSA engine.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum HybridError {
    /// Key import, key type, OAEP encryption, or signing failed.
    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    /// Message exceeds RSA-OAEP capacity (counted in bytes).
    #[error("message too long: {len} bytes, max {max}")]
    MessageTooLong { len: usize, max: usize },

    /// Token is not base64, not JSON, missing a field, or a field is not base64.
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    /// OAEP decryption failed (wrong receiver key or corrupted ciphertext).
    #[error("decryption failed: {0}")]
    DecryptionFailed(String),

    /// Plaintext recovered but the sender signature does not verify.
    #[error("signature verification failed")]
    SignatureVerificationFailed,
}

/// Errors from the shift codec helpers.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ShiftError {
    /// Protecting or recovering the shift value through the symmetric engine failed.
    #[error(transparent)]
    Symmetric(#[from] SymmetricError),

    /// Decrypted shift token did not hold an integer.
    #[error("invalid shift: {0}")]
    InvalidShift(String),
}
