//! Letter-rotation codec and a wrapper that protects the rotation amount.
//!
//! Rotation is obfuscation, not encryption. Only ASCII letters move; case
//! and every other character are preserved.

use crate::errors::ShiftError;
use crate::symmetric;
use crate::types::SymmetricKey;

const ALPHABET_LEN: i64 = 26;

fn rotate(text: &str, by: u8) -> String {
    text.chars()
        .map(|c| match c {
            'a'..='z' => ((c as u8 - b'a' + by) % 26 + b'a') as char,
            'A'..='Z' => ((c as u8 - b'A' + by) % 26 + b'A') as char,
            _ => c,
        })
        .collect()
}

/// Rotate every ASCII letter forward by `shift` positions. Negative and
/// oversized shifts wrap around the alphabet.
pub fn encode_data(message: &str, shift: i64) -> String {
    rotate(message, shift.rem_euclid(ALPHABET_LEN) as u8)
}

/// Undo [`encode_data`] with the same `shift`.
pub fn decode_data(encoded: &str, shift: i64) -> String {
    let forward = shift.rem_euclid(ALPHABET_LEN);
    rotate(encoded, ((ALPHABET_LEN - forward) % ALPHABET_LEN) as u8)
}

/// Protect a shift value with the symmetric engine.
pub fn encrypt_shift(shift: i64, key: &SymmetricKey) -> Result<String, ShiftError> {
    Ok(symmetric::encrypt(&shift.to_string(), key)?)
}

/// Recover a shift value sealed by [`encrypt_shift`].
pub fn decrypt_shift(token: &str, key: &SymmetricKey) -> Result<i64, ShiftError> {
    let text = symmetric::decrypt(token, key)?;
    text.trim()
        .parse::<i64>()
        .map_err(|e| ShiftError::InvalidShift(e.to_string()))
}
