mod cli;

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use ark_std::rand::SeedableRng;
use ark_std::rand::rngs::StdRng;
use clap::Parser;
use tracing::info;
use zeroize::Zeroizing;
use zkpfp::{
    EncryptionArtifact, ImageEncryptor, ImageInput, Recipient, RecipientKeypair,
    TransportArtifact, VerificationKey, VerificationState, ZkpfpConfig, decrypt_image,
    global_verification_session,
};
use zkpfp_crypto::key_material::fill_random;
use zkpfp_logging::ZkpfpSubscriberBuilder;
use zkpfp_proof::fixture::{FixtureCircuit, setup_fixture_keys};
use zkpfp_proof::{ProgressCallback, ProofProgress, write_proving_key};

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ZkpfpConfig::load(path)?,
        None => ZkpfpConfig::default(),
    };

    let mut logging = ZkpfpSubscriberBuilder::new().with_config(config.logging.clone());
    if let Some(level) = &cli.log_level {
        logging = logging.with_level(level.clone());
    }
    let _guard = logging.init()?;

    match cli.command {
        Command::Keygen { secret_out } => {
            let keypair = RecipientKeypair::generate()?;
            println!("identity: {}", keypair.identity());
            match secret_out {
                Some(path) => {
                    write_secret(&path, keypair.secret_hex().as_str())?;
                    println!("secret:   written to {}", path.display());
                }
                None => println!("secret:   {}", keypair.secret_hex().as_str()),
            }
        }

        Command::Setup { out_dir } => {
            std::fs::create_dir_all(&out_dir)?;
            let mut seed = [0u8; 32];
            fill_random(&mut seed)?;
            let (pk, vk) = setup_fixture_keys(&mut StdRng::from_seed(seed))?;

            let pk_path = out_dir.join("proving.key");
            let vk_path = out_dir.join("verification_key.json");
            write_proving_key(&pk, &pk_path)
                .with_context(|| format!("writing {}", pk_path.display()))?;
            std::fs::write(&vk_path, vk.to_json())?;
            println!("Proving key:      {}", pk_path.display());
            println!("Verification key: {}", vk_path.display());
        }

        Command::Encrypt { input, recipient, out } => {
            let recipient = Recipient::parse(&recipient)?;
            let input = if input.starts_with("data:") {
                ImageInput::DataUrl(input)
            } else {
                ImageInput::File(input.into())
            };

            let encryptor = ImageEncryptor::from_config::<FixtureCircuit>(&config.prover);
            let progress: ProgressCallback = Arc::new(|p: ProofProgress| {
                info!(stage = ?p.stage, percent = p.percent, "Proof progress");
            });
            let artifact = encryptor
                .encrypt_input(input, &recipient, Some(progress))
                .await?;

            let json = artifact.to_transport().to_json()?;
            match out {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    eprintln!("Wrote {}", path.display());
                }
                None => println!("{}", json),
            }
        }

        Command::Decrypt { artifact, secret_file, out } => {
            let keypair =
                load_keypair(secret_file.as_deref(), std::env::var(SECRET_ENV).ok().as_deref())?;
            let artifact = EncryptionArtifact::from_transport(&read_artifact(&artifact)?)?;
            let image = decrypt_image(&artifact, keypair.secret())?;
            std::fs::write(&out, &image)?;
            println!("Decrypted {} bytes to {}", image.len(), out.display());
        }

        Command::Verify { artifact, vkey } => {
            let key = match vkey {
                Some(path) => VerificationKey::load(path)?,
                None => config
                    .verification_key()?
                    .context("no verification key given (use --vkey or [verifier] in config)")?,
            };
            VerificationKey::install_global(key)?;

            let transport = read_artifact(&artifact)?;
            let mut session = global_verification_session(&transport)?;
            let state = session.verify().await;
            match (state, session.last_failure()) {
                (VerificationState::Valid, _) => println!("valid"),
                (VerificationState::Pending, _) => println!("no proof attached (commitment only)"),
                (state, Some(failure)) => anyhow::bail!("{}: {}", state, failure),
                (state, None) => anyhow::bail!("{}", state),
            }
        }

        Command::Inspect { artifact } => {
            let transport = read_artifact(&artifact)?;
            println!("commitment: {}", transport.commitment);
            match &transport.zk_proof {
                Some(zk) => println!("proof:      groth16, {} public signals", zk.public_signals.len()),
                None => println!("proof:      none"),
            }
        }
    }

    Ok(())
}

/// Environment fallback for the decrypt secret
const SECRET_ENV: &str = "ZKPFP_SECRET";

/// Recipient key pair from a secret file, else from the environment value.
fn load_keypair(secret_file: Option<&Path>, env_secret: Option<&str>) -> anyhow::Result<RecipientKeypair> {
    let secret = match secret_file {
        Some(path) => Zeroizing::new(
            std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?,
        ),
        None => Zeroizing::new(
            env_secret
                .with_context(|| format!("no secret given (use --secret-file or {})", SECRET_ENV))?
                .to_string(),
        ),
    };
    Ok(RecipientKeypair::from_secret_hex(&secret)?)
}

fn write_secret(path: &Path, secret_hex: &str) -> anyhow::Result<()> {
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    std::os::unix::fs::OpenOptionsExt::mode(&mut options, 0o600);
    let mut file = options
        .open(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writeln!(file, "{}", secret_hex)?;
    Ok(())
}

fn read_artifact(path: &Path) -> anyhow::Result<TransportArtifact> {
    let json =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(TransportArtifact::from_json(&json)?)
}
