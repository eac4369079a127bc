//! Encrypt / commit / wrap / prove orchestration

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use zkpfp_crypto::{
    KeyCommitment, Recipient, StaticSecret, SymmetricKeyMaterial, decode_base64,
    decrypt_image_bytes, encrypt_with_material, unwrap_key, wrap_key,
};
use zkpfp_proof::{Groth16Prover, ProgressCallback, ProofGenerator, WitnessCircuit};

use crate::config::ProverConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::transport::{EncryptionArtifact, ProofAbsence, ProofAttachment};

/// Where image bytes come from
#[derive(Debug, Clone)]
pub enum ImageInput {
    Bytes(Vec<u8>),
    /// `data:<mime>;base64,<payload>`
    DataUrl(String),
    File(PathBuf),
}

impl ImageInput {
    pub async fn load(self) -> PipelineResult<Vec<u8>> {
        match self {
            Self::Bytes(bytes) => Ok(bytes),
            Self::DataUrl(url) => parse_data_url(&url).map(|(_, bytes)| bytes),
            Self::File(path) => Ok(tokio::fs::read(&path).await?),
        }
    }
}

/// Split a Base64 `data:` URL into its media type and decoded payload.
pub fn parse_data_url(url: &str) -> PipelineResult<(String, Vec<u8>)> {
    let invalid = |msg: &str| PipelineError::InvalidInput(msg.to_string());

    let rest = url.strip_prefix("data:").ok_or_else(|| invalid("not a data: URL"))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| invalid("data: URL has no payload"))?;
    let media_type = header
        .strip_suffix(";base64")
        .ok_or_else(|| invalid("only base64 data: URLs are supported"))?;

    let bytes = decode_base64(payload)?;
    Ok((media_type.to_string(), bytes))
}

/// Encrypts photos for a recipient and attaches a proof when one can be made.
#[derive(Debug, Clone)]
pub struct ImageEncryptor {
    generator: ProofGenerator,
}

impl ImageEncryptor {
    pub fn new(generator: ProofGenerator) -> Self {
        Self { generator }
    }

    /// Encryptor that never attempts a proof
    pub fn without_proofs() -> Self {
        Self::new(ProofGenerator::disabled())
    }

    /// Build from configuration, proving with circuit `C`.
    ///
    /// Proofs are disabled when the prover is turned off or no proving key
    /// path is configured.
    pub fn from_config<C: WitnessCircuit>(config: &ProverConfig) -> Self {
        let generator = match (config.enabled, &config.proving_key) {
            (true, Some(path)) => {
                ProofGenerator::new(Arc::new(Groth16Prover::<C>::from_key_file(path.clone())))
            }
            _ => ProofGenerator::disabled(),
        };
        Self::new(generator.with_timeout(config.timeout()))
    }

    pub fn proofs_enabled(&self) -> bool {
        self.generator.is_enabled()
    }

    /// Encrypt `image` for `recipient`.
    ///
    /// Cipher, commitment and key wrapping failures abort. Proof failures
    /// are logged and leave the proof absent.
    #[instrument(skip(self, image, recipient, progress), fields(bytes = image.len(), recipient = %recipient.identity()))]
    pub async fn encrypt_image(
        &self,
        image: &[u8],
        recipient: &Recipient,
        progress: Option<ProgressCallback>,
    ) -> PipelineResult<EncryptionArtifact> {
        let material = SymmetricKeyMaterial::generate()?;
        let ciphertext = encrypt_with_material(image, &material)?;
        let commitment = KeyCommitment::from_material(&material);
        let wrapped_key = wrap_key(material.key(), recipient)?;
        debug!(%commitment, ciphertext_len = ciphertext.len(), "Image encrypted");

        let proof = if !self.generator.is_enabled() {
            ProofAttachment::Absent(ProofAbsence::Disabled)
        } else {
            match self
                .generator
                .generate(&material, recipient.identity(), &commitment, progress)
                .await
            {
                Ok(artifact) => ProofAttachment::Attached(artifact),
                Err(e) => {
                    warn!(error = %e, "ZK proof generation failed, continuing without proof");
                    ProofAttachment::Absent(ProofAbsence::Unavailable(e.to_string()))
                }
            }
        };

        info!(%commitment, proof = proof.is_attached(), "Encryption artifact ready");
        Ok(EncryptionArtifact::new(
            ciphertext,
            wrapped_key,
            *material.nonce(),
            commitment,
            proof,
        ))
    }

    pub async fn encrypt_input(
        &self,
        input: ImageInput,
        recipient: &Recipient,
        progress: Option<ProgressCallback>,
    ) -> PipelineResult<EncryptionArtifact> {
        let image = input.load().await?;
        self.encrypt_image(&image, recipient, progress).await
    }
}

/// Recover the photo with the recipient's secret.
///
/// The unwrapped key must reproduce the artifact's commitment.
#[instrument(skip_all, fields(commitment = %artifact.commitment()))]
pub fn decrypt_image(artifact: &EncryptionArtifact, secret: &StaticSecret) -> PipelineResult<Vec<u8>> {
    let key = unwrap_key(artifact.wrapped_key(), secret)?;
    if !artifact.commitment().matches(&key[..], artifact.nonce()) {
        return Err(PipelineError::CommitmentMismatch);
    }
    let image = decrypt_image_bytes(artifact.ciphertext(), &key[..], artifact.nonce())?;
    debug!(bytes = image.len(), "Image decrypted");
    Ok(image)
}

#[cfg(test)]
mod tests {
    use zkpfp_crypto::{RecipientKeypair, encode_base64};

    use super::*;

    #[test]
    fn test_parse_data_url() {
        let url = format!("data:image/png;base64,{}", encode_base64(b"\x89PNG"));
        let (mime, bytes) = parse_data_url(&url).unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(bytes, b"\x89PNG");
    }

    #[test]
    fn test_parse_data_url_rejects() {
        for bad in [
            "image/png;base64,AAAA",
            "data:image/png,AAAA",
            "data:image/png;base64",
            "data:image/png;base64,!!!",
        ] {
            assert!(parse_data_url(bad).is_err(), "accepted {}", bad);
        }
    }

    #[tokio::test]
    async fn test_without_proofs_marks_disabled() {
        let bob = RecipientKeypair::generate().unwrap();
        let artifact = ImageEncryptor::without_proofs()
            .encrypt_image(b"pixels", &bob.recipient(), None)
            .await
            .unwrap();
        assert_eq!(artifact.proof(), &ProofAttachment::Absent(ProofAbsence::Disabled));
        assert_eq!(decrypt_image(&artifact, bob.secret()).unwrap(), b"pixels");
    }

    #[tokio::test]
    async fn test_decrypt_with_wrong_secret_fails() {
        let bob = RecipientKeypair::generate().unwrap();
        let eve = RecipientKeypair::generate().unwrap();
        let artifact = ImageEncryptor::without_proofs()
            .encrypt_image(b"pixels", &bob.recipient(), None)
            .await
            .unwrap();
        assert!(decrypt_image(&artifact, eve.secret()).is_err());
    }

    #[tokio::test]
    async fn test_input_sources() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.bin");
        std::fs::write(&path, b"file pixels").unwrap();

        assert_eq!(ImageInput::File(path).load().await.unwrap(), b"file pixels");
        assert_eq!(ImageInput::Bytes(vec![1, 2]).load().await.unwrap(), vec![1, 2]);
        let url = format!("data:image/jpeg;base64,{}", encode_base64(b"jpeg"));
        assert_eq!(ImageInput::DataUrl(url).load().await.unwrap(), b"jpeg");
        assert!(ImageInput::File(dir.path().join("missing")).load().await.is_err());
    }

    #[test]
    fn test_from_config_without_key_is_disabled() {
        let config = ProverConfig::default();
        let encryptor = ImageEncryptor::from_config::<zkpfp_proof::fixture::FixtureCircuit>(&config);
        assert!(!encryptor.proofs_enabled());

        let config = ProverConfig {
            enabled: true,
            proving_key: Some(PathBuf::from("/keys/proving.key")),
            timeout_secs: 3,
        };
        let encryptor = ImageEncryptor::from_config::<zkpfp_proof::fixture::FixtureCircuit>(&config);
        assert!(encryptor.proofs_enabled());
    }
}
