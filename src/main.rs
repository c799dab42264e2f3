//! duocrypt command line front end.
//!
//! Thin wrapper over the library: every key argument accepts key text or a
//! path to a key file, and results are printed to stdout.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use duocrypt::*;

#[derive(Parser)]
#[command(name = "duocrypt")]
#[command(about = "Symmetric and hybrid RSA message encryption")]
#[command(version)]
struct Cli {
    /// Verbose logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate key material
    Keygen {
        #[command(subcommand)]
        kind: KeygenCommand,
    },
    /// Encrypt a message
    Encrypt {
        #[command(subcommand)]
        mode: CipherCommand,
    },
    /// Decrypt a token
    Decrypt {
        #[command(subcommand)]
        mode: CipherCommand,
    },
    /// Letter-rotation codec
    Shift {
        #[command(subcommand)]
        action: ShiftCommand,
    },
}

#[derive(Subcommand)]
enum KeygenCommand {
    /// 256-bit key, printed as base64
    Symmetric {
        /// Write the key to this file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// RSA-2048 key pair, printed as PEM
    Asymmetric {
        /// Write the private key here
        #[arg(long)]
        private_out: Option<PathBuf>,
        /// Write the public key here
        #[arg(long)]
        public_out: Option<PathBuf>,
        /// Derive the pair deterministically from this seed
        #[arg(long)]
        seed: Option<String>,
    },
}

#[derive(Subcommand)]
enum CipherCommand {
    /// Shared-key AES-256-CTR
    Symmetric(SymmetricArgs),
    /// RSA-OAEP plus PKCS#1 v1.5 signature
    Asymmetric(AsymmetricArgs),
}

#[derive(Args)]
struct SymmetricArgs {
    /// Base64 key or path to a key file
    #[arg(long, env = "DUOCRYPT_KEY")]
    key: String,
    /// Message (encrypt) or token (decrypt)
    input: String,
}

#[derive(Args)]
struct AsymmetricArgs {
    /// Public key: the receiver's when encrypting, the sender's when decrypting
    #[arg(long, env = "DUOCRYPT_PUBLIC_KEY")]
    public_key: String,
    /// Private key: the sender's when encrypting, the receiver's when decrypting
    #[arg(long, env = "DUOCRYPT_PRIVATE_KEY")]
    private_key: String,
    /// Message (encrypt) or token (decrypt)
    input: String,
}

#[derive(Subcommand)]
enum ShiftCommand {
    /// Rotate letters forward
    Encode {
        #[arg(long, allow_negative_numbers = true)]
        shift: i64,
        message: String,
    },
    /// Rotate letters back
    Decode {
        #[arg(long, allow_negative_numbers = true)]
        shift: i64,
        message: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "duocrypt=debug" } else { "duocrypt=info" };
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Keygen { kind } => keygen(kind),
        Commands::Encrypt { mode } => {
            let token = match mode {
                CipherCommand::Symmetric(args) => encrypt_symmetric(&args.input, &args.key)?,
                CipherCommand::Asymmetric(args) => {
                    encrypt_asymmetric(&args.input, &args.public_key, &args.private_key)?
                }
            };
            println!("{token}");
            Ok(())
        }
        Commands::Decrypt { mode } => {
            let message = match mode {
                CipherCommand::Symmetric(args) => decrypt_symmetric(&args.input, &args.key)?,
                CipherCommand::Asymmetric(args) => {
                    decrypt_asymmetric(&args.input, &args.private_key, &args.public_key)?
                }
            };
            println!("{message}");
            Ok(())
        }
        Commands::Shift { action } => {
            let out = match action {
                ShiftCommand::Encode { shift, message } => encode_data(&message, shift),
                ShiftCommand::Decode { shift, message } => decode_data(&message, shift),
            };
            println!("{out}");
            Ok(())
        }
    }
}

fn keygen(kind: KeygenCommand) -> Result<()> {
    match kind {
        KeygenCommand::Symmetric { out: Some(path) } => {
            save_symmetric_key(&SymmetricKey::generate(), &path)
                .with_context(|| format!("writing {}", path.display()))?;
            eprintln!("wrote {}", path.display());
        }
        KeygenCommand::Symmetric { out: None } => println!("{}", generate_symmetric_key()),
        KeygenCommand::Asymmetric {
            private_out,
            public_out,
            seed,
        } => {
            let pair = match seed {
                Some(seed) => KeyPair::from_seed(seed.as_bytes())?,
                None => KeyPair::generate()?,
            };
            if private_out.is_none() && public_out.is_none() {
                let (private_pem, public_pem) = pair.to_pem()?;
                print!("{private_pem}{public_pem}");
            } else {
                save_keypair(&pair, private_out.as_deref(), public_out.as_deref())
                    .context("writing key files")?;
            }
        }
    }
    Ok(())
}
