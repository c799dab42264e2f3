//! Key material: generation, "key or path to key" resolution, and key files.
//!
//! The engines only ever see [`SymmetricKey`], [`PublicKey`], and
//! [`PrivateKey`]. Everything that touches the filesystem lives here.

use std::fs;
use std::io;
use std::path::Path;

use rand::rngs::OsRng;
use rand_chacha::ChaCha20Rng;
use rand_core::{CryptoRngCore, SeedableRng};
use rsa::RsaPrivateKey;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::errors::KeyError;
use crate::types::{PrivateKey, PublicKey, SymmetricKey, RSA_BITS, SYMMETRIC_KEY_LEN};

/// File extensions treated as key files even when the file is missing, so a
/// typo surfaces as [`KeyError::NotFound`] instead of a decoding error.
const KEY_FILE_EXTENSIONS: &[&str] = &["pem", "key", "b64", "der", "pub"];

/// The shape of a key argument after classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeySource<'a> {
    /// Key bytes as-is: 32 raw bytes for symmetric, PEM bytes for RSA.
    Raw(&'a [u8]),
    /// Text form: base64 for symmetric, PEM for RSA.
    Text(&'a str),
    /// Path to a file holding either of the above.
    Path(&'a Path),
}

/// Strategy for turning caller-supplied key arguments into key material.
pub trait KeyProvider {
    /// Decide which [`KeySource`] a string argument denotes.
    fn classify<'a>(&self, input: &'a str) -> KeySource<'a>;

    fn resolve_symmetric_key(&self, source: KeySource<'_>) -> Result<SymmetricKey, KeyError>;

    /// Returns PEM text.
    fn resolve_asymmetric_key(&self, source: KeySource<'_>) -> Result<String, KeyError>;

    fn symmetric_key(&self, input: &str) -> Result<SymmetricKey, KeyError> {
        self.resolve_symmetric_key(self.classify(input))
    }

    fn public_key(&self, input: &str) -> Result<PublicKey, KeyError> {
        let pem = self.resolve_asymmetric_key(self.classify(input))?;
        PublicKey::from_pem(&pem)
    }

    fn private_key(&self, input: &str) -> Result<PrivateKey, KeyError> {
        let pem = self.resolve_asymmetric_key(self.classify(input))?;
        PrivateKey::from_pem(&pem)
    }
}

/// Default provider: an argument is a path when it names an existing file or
/// carries a key-file extension; PEM blocks and everything else are key text.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsKeyProvider;

impl KeyProvider for FsKeyProvider {
    fn classify<'a>(&self, input: &'a str) -> KeySource<'a> {
        if input.trim_start().starts_with("-----BEGIN") {
            return KeySource::Text(input);
        }
        let path = Path::new(input);
        let has_key_ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| KEY_FILE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));
        if path.is_file() || has_key_ext {
            KeySource::Path(path)
        } else {
            KeySource::Text(input)
        }
    }

    fn resolve_symmetric_key(&self, source: KeySource<'_>) -> Result<SymmetricKey, KeyError> {
        match source {
            KeySource::Raw(bytes) => SymmetricKey::from_slice(bytes),
            KeySource::Text(text) => SymmetricKey::from_base64(text),
            KeySource::Path(path) => {
                let bytes = read_key_file(path)?;
                // A bare 32-byte file is raw key material; base64 text is 44 bytes.
                if bytes.len() == SYMMETRIC_KEY_LEN {
                    return SymmetricKey::from_slice(&bytes);
                }
                let text = std::str::from_utf8(&bytes)
                    .map_err(|e| KeyError::InvalidEncoding(e.to_string()))?;
                SymmetricKey::from_base64(text)
            }
        }
    }

    fn resolve_asymmetric_key(&self, source: KeySource<'_>) -> Result<String, KeyError> {
        match source {
            KeySource::Raw(bytes) => String::from_utf8(bytes.to_vec())
                .map_err(|e| KeyError::InvalidEncoding(e.to_string())),
            KeySource::Text(text) => Ok(text.to_string()),
            KeySource::Path(path) => {
                let bytes = read_key_file(path)?;
                String::from_utf8(bytes).map_err(|e| KeyError::InvalidEncoding(e.to_string()))
            }
        }
    }
}

fn read_key_file(path: &Path) -> Result<Vec<u8>, KeyError> {
    debug!(path = %path.display(), "reading key file");
    fs::read(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => KeyError::NotFound(path.to_path_buf()),
        _ => KeyError::Io(format!("{}: {e}", path.display())),
    })
}

/* ---------------- RSA key pairs ---------------- */

/// An RSA-2048 key pair.
#[derive(Clone, Debug)]
pub struct KeyPair {
    pub private: PrivateKey,
    pub public: PublicKey,
}

impl KeyPair {
    /// Generate from the OS CSPRNG.
    pub fn generate() -> Result<Self, KeyError> {
        Self::generate_with(&mut OsRng)
    }

    /// Deterministic key pair: the same seed always yields the same keys.
    ///
    /// SHA-256(seed) seeds a ChaCha20 stream that drives prime generation.
    /// Anyone holding the seed holds the private key, so this is for fixtures
    /// and reproducible tests.
    pub fn from_seed(seed: &[u8]) -> Result<Self, KeyError> {
        let digest: [u8; 32] = Sha256::digest(seed).into();
        let mut rng = ChaCha20Rng::from_seed(digest);
        Self::generate_with(&mut rng)
    }

    fn generate_with<R: CryptoRngCore + ?Sized>(rng: &mut R) -> Result<Self, KeyError> {
        let sk = RsaPrivateKey::new(rng, RSA_BITS).map_err(|e| KeyError::Generation(e.to_string()))?;
        let private = PrivateKey::from(sk);
        let public = private.public_key();
        Ok(Self { private, public })
    }

    /// `(private_pem, public_pem)`.
    pub fn to_pem(&self) -> Result<(String, String), KeyError> {
        Ok((self.private.to_pem()?, self.public.to_pem()?))
    }
}

/* ---------------- Key files ---------------- */

/// Write the base64 text form of `key` to `path`, creating parent directories.
pub fn save_symmetric_key(key: &SymmetricKey, path: &Path) -> Result<(), KeyError> {
    write_key_file(path, key.to_base64().as_bytes(), true)
}

/// Write either half of `pair` as PEM. Passing `None` skips that half.
pub fn save_keypair(
    pair: &KeyPair,
    private_path: Option<&Path>,
    public_path: Option<&Path>,
) -> Result<(), KeyError> {
    if let Some(path) = private_path {
        write_key_file(path, pair.private.to_pem()?.as_bytes(), true)?;
    }
    if let Some(path) = public_path {
        write_key_file(path, pair.public.to_pem()?.as_bytes(), false)?;
    }
    Ok(())
}

fn write_key_file(path: &Path, contents: &[u8], secret: bool) -> Result<(), KeyError> {
    let io_err = |e: io::Error| KeyError::Io(format!("{}: {e}", path.display()));
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(path, contents).map_err(io_err)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if secret {
            fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(io_err)?;
        }
    }
    debug!(path = %path.display(), secret, "wrote key file");
    Ok(())
}

/* ---------------- Text-level helpers ---------------- */

/// Fresh symmetric key as 44-character base64 text.
pub fn generate_symmetric_key() -> String {
    SymmetricKey::generate().to_base64()
}

/// Fresh RSA-2048 key pair as `(private_pem, public_pem)`.
pub fn generate_asymmetric_keypair() -> Result<(String, String), KeyError> {
    KeyPair::generate()?.to_pem()
}

/// Seeded RSA-2048 key pair as `(private_pem, public_pem)`. See [`KeyPair::from_seed`].
pub fn generate_asymmetric_keypair_from_seed(seed: &[u8]) -> Result<(String, String), KeyError> {
    KeyPair::from_seed(seed)?.to_pem()
}
