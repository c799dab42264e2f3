//! # duocrypt
//!
//! A small toolkit for protecting short text messages, with a symmetric mode
//! and a hybrid public-key mode. Every operation returns a text-safe token.
//!
//! ## Algorithm Suite
//!
//! - **Symmetric:** AES-256 in CTR mode, fresh 8-byte nonce per message
//! - **Asymmetric confidentiality:** RSA-2048 with OAEP (SHA-256)
//! - **Asymmetric authenticity:** RSASSA-PKCS1-v1_5 over SHA-256 of the plaintext
//! - **Wire format:** base64 of `nonce ‖ ciphertext`, or base64 of a JSON
//!   object `{"encrypted_message", "signature"}` with base64 fields
//!
//! ## Limits
//!
//! - Symmetric messages: at most 256 characters
//! - Asymmetric messages: at most 190 bytes of UTF-8 (one OAEP block)
//!
//! Larger payloads have to be chunked by the caller.
//!
//! ## Example
//!
//! ```rust
//! use duocrypt::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Shared-key mode
//! let key = SymmetricKey::generate();
//! let token = symmetric::encrypt("Hello, World!", &key)?;
//! assert_eq!(symmetric::decrypt(&token, &key)?, "Hello, World!");
//!
//! // Public-key mode: A signs, B receives
//! let alice = KeyPair::generate()?;
//! let bob = KeyPair::generate()?;
//! let token = asymmetric::encrypt("Hi", &bob.public, &alice.private)?;
//! assert_eq!(asymmetric::decrypt(&token, &bob.private, &alice.public)?, "Hi");
//! # Ok(())
//! # }
//! ```
//!
//! The `*_symmetric` / `*_asymmetric` functions take keys as text (base64 or
//! PEM) or as paths to key files, resolved through [`FsKeyProvider`].
//!
//! ## Security Considerations
//!
//! - Symmetric tokens are **not** integrity protected; a modified token can
//!   decrypt to different text without error
//! - A wrong symmetric key is only caught when the garbled output is not
//!   UTF-8; empty and very short messages usually decrypt to garbage without
//!   error
//! - Symmetric decryption never says why it failed
//! - Asymmetric decryption distinguishes a bad ciphertext from a bad signature
//! - RSA private-key operations are blinded
//! - Seeded key pairs are only as secret as their seed
//!
//! ## License
//!
//! Licensed under the Apache License, Version 2.0.

mod errors;
mod types;

pub mod asymmetric;
pub mod keys;
pub mod shift;
pub mod symmetric;

pub use asymmetric::{decrypt_asymmetric, encrypt_asymmetric};
pub use errors::{HybridError, KeyError, ShiftError, SymmetricError};
pub use keys::{
    generate_asymmetric_keypair, generate_asymmetric_keypair_from_seed, generate_symmetric_key,
    save_keypair, save_symmetric_key, FsKeyProvider, KeyPair, KeyProvider, KeySource,
};
pub use shift::{decode_data, decrypt_shift, encode_data, encrypt_shift};
pub use symmetric::{decrypt_symmetric, encrypt_symmetric};
pub use types::*;
