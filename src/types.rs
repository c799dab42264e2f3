//! Key, envelope, and token types plus the text codec shared by both engines.

use std::fmt;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use rand::rngs::OsRng;
use rand::RngCore;
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey, EncodeRsaPrivateKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePublicKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::errors::{HybridError, KeyError, SymmetricError};

/// Symmetric key length in bytes (AES-256).
pub const SYMMETRIC_KEY_LEN: usize = 32;

/// Per-message nonce length in bytes. The remaining 8 bytes of the AES
/// counter block hold the big-endian block counter.
pub const NONCE_LEN: usize = 8;

/// Longest message the symmetric engine accepts, in characters.
pub const MAX_SYMMETRIC_CHARS: usize = 256;

/// RSA modulus size used for generated key pairs.
pub const RSA_BITS: usize = 2048;

/// OAEP overhead for SHA-256: two digests plus two framing bytes.
const OAEP_SHA256_OVERHEAD: usize = 2 * 32 + 2;

/// Largest plaintext, in bytes, that fits one RSA-2048 OAEP-SHA256 block.
pub const MAX_HYBRID_BYTES: usize = RSA_BITS / 8 - OAEP_SHA256_OVERHEAD;

/* ---------------- Symmetric key material ---------------- */

/// A 256-bit symmetric key. Always exactly 32 bytes; wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey([u8; SYMMETRIC_KEY_LEN]);

impl SymmetricKey {
    /// Draw a fresh key from the OS CSPRNG.
    pub fn generate() -> Self {
        let mut bytes = [0u8; SYMMETRIC_KEY_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Wrap existing key bytes.
    pub fn from_bytes(bytes: [u8; SYMMETRIC_KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Accept a raw buffer, rejecting anything that is not 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, KeyError> {
        let arr: [u8; SYMMETRIC_KEY_LEN] =
            bytes.try_into().map_err(|_| KeyError::WrongLength {
                expected: SYMMETRIC_KEY_LEN,
                actual: bytes.len(),
            })?;
        Ok(Self(arr))
    }

    /// Decode the 44-character base64 text form. Surrounding whitespace is ignored.
    pub fn from_base64(text: &str) -> Result<Self, KeyError> {
        let mut raw = BASE64
            .decode(text.trim())
            .map_err(|e| KeyError::InvalidEncoding(e.to_string()))?;
        let key = Self::from_slice(&raw);
        raw.zeroize();
        key
    }

    /// Standard base64 with padding: always 44 characters.
    pub fn to_base64(&self) -> String {
        BASE64.encode(self.0)
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; SYMMETRIC_KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SymmetricKey(..)")
    }
}

/// Random per-message nonce for the symmetric engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Nonce(pub [u8; NONCE_LEN]);

impl Nonce {
    /// Draw a fresh nonce from the OS CSPRNG.
    pub fn random() -> Self {
        let mut bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Initial AES counter block: `nonce ‖ 0u64` (big-endian counter).
    pub fn counter_block(&self) -> [u8; 16] {
        let mut block = [0u8; 16];
        block[..NONCE_LEN].copy_from_slice(&self.0);
        block
    }
}

/* ---------------- Envelopes ---------------- */

/// `nonce ‖ ciphertext`, carried as standard base64.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SymmetricEnvelope {
    /// Nonce used to build the initial counter block
    pub nonce: Nonce,
    /// Same length as the UTF-8 plaintext
    pub ciphertext: Vec<u8>,
}

impl SymmetricEnvelope {
    /// Concatenate `nonce ‖ ciphertext`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(NONCE_LEN + self.ciphertext.len());
        out.extend_from_slice(&self.nonce.0);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Split raw token bytes into nonce and ciphertext.
    ///
    /// # Arguments
    ///
    /// * `bytes` - Decoded token, at least [`NONCE_LEN`] bytes long
    ///
    /// # Returns
    ///
    /// The envelope, or [`SymmetricError::MalformedEnvelope`] if the input is
    /// shorter than a nonce. An empty ciphertext is accepted.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SymmetricError> {
        if bytes.len() < NONCE_LEN {
            return Err(SymmetricError::MalformedEnvelope(format!(
                "{} bytes is shorter than the {NONCE_LEN}-byte nonce",
                bytes.len()
            )));
        }
        let (nonce, ciphertext) = bytes.split_at(NONCE_LEN);
        let mut n = [0u8; NONCE_LEN];
        n.copy_from_slice(nonce);
        Ok(Self {
            nonce: Nonce(n),
            ciphertext: ciphertext.to_vec(),
        })
    }

    /// Encode as a standard base64 token.
    pub fn to_token(&self) -> String {
        BASE64.encode(self.to_bytes())
    }

    /// Decode a base64 token.
    ///
    /// # Arguments
    ///
    /// * `token` - Token text; surrounding whitespace is ignored
    ///
    /// # Returns
    ///
    /// The envelope, or [`SymmetricError::MalformedEnvelope`] if the token is
    /// not base64 or is too short.
    pub fn from_token(token: &str) -> Result<Self, SymmetricError> {
        let bytes = BASE64
            .decode(token.trim())
            .map_err(|e| SymmetricError::MalformedEnvelope(e.to_string()))?;
        Self::from_bytes(&bytes)
    }
}

/// RSA-OAEP ciphertext plus the sender's PKCS#1 v1.5 signature over
/// SHA-256(plaintext).
///
/// On the wire this is base64(JSON) where both JSON fields are themselves
/// base64 strings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HybridEnvelope {
    /// RSA-OAEP-SHA256 ciphertext, one modulus length long
    #[serde(with = "b64")]
    pub encrypted_message: Vec<u8>,
    /// PKCS#1 v1.5 signature over SHA-256 of the plaintext
    #[serde(with = "b64")]
    pub signature: Vec<u8>,
}

impl HybridEnvelope {
    /// Serialize to JSON and wrap the JSON in base64.
    ///
    /// # Returns
    ///
    /// The token text, or [`HybridError::EncryptionFailed`] if JSON
    /// serialization fails.
    pub fn to_token(&self) -> Result<String, HybridError> {
        let json =
            serde_json::to_vec(self).map_err(|e| HybridError::EncryptionFailed(e.to_string()))?;
        Ok(BASE64.encode(json))
    }

    /// Parse a token produced by [`HybridEnvelope::to_token`].
    ///
    /// # Arguments
    ///
    /// * `token` - base64 of a JSON object with `encrypted_message` and
    ///   `signature` fields
    ///
    /// # Returns
    ///
    /// The envelope, or [`HybridError::InvalidFormat`] if any decoding layer
    /// fails or a field is missing.
    pub fn from_token(token: &str) -> Result<Self, HybridError> {
        let json = BASE64
            .decode(token.trim())
            .map_err(|e| HybridError::InvalidFormat(format!("token is not base64: {e}")))?;
        serde_json::from_slice(&json)
            .map_err(|e| HybridError::InvalidFormat(format!("envelope: {e}")))
    }
}

mod b64 {
    use super::BASE64;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<T: AsRef<[u8]>, S: Serializer>(bytes: T, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&BASE64.encode(bytes.as_ref()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(d)?;
        BASE64.decode(text.as_bytes()).map_err(serde::de::Error::custom)
    }
}

/* ---------------- RSA keys ---------------- */

/// RSA public key. Exported as SPKI PEM (`BEGIN PUBLIC KEY`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey(RsaPublicKey);

impl PublicKey {
    /// Parse SPKI or PKCS#1 PEM. Private key PEM is refused outright.
    pub fn from_pem(pem: &str) -> Result<Self, KeyError> {
        let pem = pem.trim();
        if pem.contains("PRIVATE KEY") {
            return Err(KeyError::InvalidPem(
                "expected a public key, got a private key".into(),
            ));
        }
        RsaPublicKey::from_public_key_pem(pem)
            .ok()
            .or_else(|| RsaPublicKey::from_pkcs1_pem(pem).ok())
            .map(Self)
            .ok_or_else(|| KeyError::InvalidPem("not an RSA public key".into()))
    }

    /// Export as SPKI PEM (`BEGIN PUBLIC KEY`), LF line endings.
    pub fn to_pem(&self) -> Result<String, KeyError> {
        self.0
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| KeyError::Generation(e.to_string()))
    }

    /// Modulus size in bytes.
    pub fn size(&self) -> usize {
        self.0.size()
    }

    /// Largest plaintext OAEP-SHA256 can carry under this key.
    pub fn oaep_capacity(&self) -> usize {
        self.size().saturating_sub(OAEP_SHA256_OVERHEAD)
    }

    /// Underlying `rsa` key for direct primitive calls.
    pub fn as_rsa(&self) -> &RsaPublicKey {
        &self.0
    }
}

impl From<RsaPublicKey> for PublicKey {
    fn from(key: RsaPublicKey) -> Self {
        Self(key)
    }
}

/// RSA private key. Exported as PKCS#1 PEM (`BEGIN RSA PRIVATE KEY`).
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey(RsaPrivateKey);

impl PrivateKey {
    /// Parse PKCS#1 or PKCS#8 PEM. Public key PEM is refused outright.
    pub fn from_pem(pem: &str) -> Result<Self, KeyError> {
        let pem = pem.trim();
        if !pem.contains("PRIVATE KEY") {
            return Err(KeyError::InvalidPem(
                "expected a private key pem block".into(),
            ));
        }
        RsaPrivateKey::from_pkcs1_pem(pem)
            .ok()
            .or_else(|| RsaPrivateKey::from_pkcs8_pem(pem).ok())
            .map(Self)
            .ok_or_else(|| KeyError::InvalidPem("not an RSA private key".into()))
    }

    /// Export as PKCS#1 PEM (`BEGIN RSA PRIVATE KEY`), LF line endings.
    pub fn to_pem(&self) -> Result<String, KeyError> {
        self.0
            .to_pkcs1_pem(LineEnding::LF)
            .map(|pem| pem.to_string())
            .map_err(|e| KeyError::Generation(e.to_string()))
    }

    /// Matching public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.0.to_public_key())
    }

    /// Underlying `rsa` key for direct primitive calls.
    pub fn as_rsa(&self) -> &RsaPrivateKey {
        &self.0
    }
}

impl From<RsaPrivateKey> for PrivateKey {
    fn from(key: RsaPrivateKey) -> Self {
        Self(key)
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("bits", &(self.0.size() * 8))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_hybrid_bytes_matches_rsa_2048() {
        assert_eq!(MAX_HYBRID_BYTES, 190);
    }

    #[test]
    fn counter_block_starts_at_zero() {
        let nonce = Nonce([1, 2, 3, 4, 5, 6, 7, 8]);
        let block = nonce.counter_block();
        assert_eq!(&block[..8], &nonce.0);
        assert_eq!(&block[8..], &[0u8; 8]);
    }

    #[test]
    fn symmetric_key_rejects_wrong_length() {
        let err = SymmetricKey::from_slice(&[0u8; 16]).unwrap_err();
        assert_eq!(
            err,
            KeyError::WrongLength {
                expected: 32,
                actual: 16
            }
        );
    }

    #[test]
    fn symmetric_key_debug_is_redacted() {
        let key = SymmetricKey::from_bytes([7u8; 32]);
        assert_eq!(format!("{key:?}"), "SymmetricKey(..)");
    }

    #[test]
    fn zero_key_base64_form() {
        let key = SymmetricKey::from_bytes([0u8; 32]);
        let text = key.to_base64();
        assert_eq!(text.len(), 44);
        assert_eq!(text, "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=");
        let back = SymmetricKey::from_base64(&text).unwrap();
        assert_eq!(back.as_bytes(), &[0u8; 32]);
    }

    #[test]
    fn hybrid_envelope_json_field_names() {
        let env = HybridEnvelope {
            encrypted_message: vec![1, 2, 3],
            signature: vec![4, 5, 6],
        };
        let json = serde_json::to_string(&env).unwrap();
        assert_eq!(json, r#"{"encrypted_message":"AQID","signature":"BAUG"}"#);
    }

    #[test]
    fn hybrid_envelope_missing_field_is_invalid_format() {
        let token = BASE64.encode(br#"{"encrypted_message":"AQID"}"#);
        let err = HybridEnvelope::from_token(&token).unwrap_err();
        assert!(matches!(err, HybridError::InvalidFormat(_)));
    }

    #[test]
    fn symmetric_envelope_needs_a_full_nonce() {
        let token = BASE64.encode([0u8; 7]);
        let err = SymmetricEnvelope::from_token(&token).unwrap_err();
        assert!(matches!(err, SymmetricError::MalformedEnvelope(_)));
    }

    #[test]
    fn symmetric_envelope_accepts_bare_nonce_and_surrounding_whitespace() {
        let token = format!("  {}\n", BASE64.encode([5u8; NONCE_LEN]));
        let env = SymmetricEnvelope::from_token(&token).unwrap();
        assert_eq!(env.nonce, Nonce([5u8; NONCE_LEN]));
        assert!(env.ciphertext.is_empty());
        assert_eq!(env.to_bytes(), vec![5u8; NONCE_LEN]);
    }
}
