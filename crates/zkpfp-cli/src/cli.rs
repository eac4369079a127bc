use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "zkpfp", about = "Confidential profile photos with ZK key commitments")]
pub struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a recipient key pair
    Keygen {
        /// Write the secret here (mode 0600 on unix) instead of printing it
        #[arg(long)]
        secret_out: Option<PathBuf>,
    },
    /// Generate proving and verification keys for the bundled reference circuit
    Setup {
        /// Output directory
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Encrypt a photo for a recipient
    Encrypt {
        /// Image file, or a base64 `data:` URL
        input: String,
        /// Recipient identity (`x25519:<hex>` or wallet address)
        #[arg(long)]
        recipient: String,
        /// Write the transport JSON here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Decrypt a transport artifact with the recipient secret
    ///
    /// The hex secret is read from `--secret-file`, or from the
    /// `ZKPFP_SECRET` environment variable when no file is given.
    Decrypt {
        /// Transport artifact JSON
        artifact: PathBuf,
        /// File holding the hex-encoded recipient secret
        #[arg(long)]
        secret_file: Option<PathBuf>,
        /// Where to write the recovered image
        #[arg(long)]
        out: PathBuf,
    },
    /// Verify the proof attached to a transport artifact
    Verify {
        /// Transport artifact JSON
        artifact: PathBuf,
        /// snarkjs verification key; falls back to the configured one
        #[arg(long)]
        vkey: Option<PathBuf>,
    },
    /// Show the commitment and proof status of a transport artifact
    Inspect {
        /// Transport artifact JSON
        artifact: PathBuf,
    },
}
