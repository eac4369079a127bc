//! Asynchronous proof generation
//!
//! [`ProofGenerator`] wraps a pluggable [`ProvingBackend`] with a timeout and
//! a progress channel. Every failure path (no backend, missing proving key,
//! malformed witness, prover error or panic, timeout) surfaces as
//! [`ProofError::GenerationUnavailable`] so callers can fall back to a
//! commitment-only artifact.

use std::marker::PhantomData;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use ark_bn254::{Bn254, Fr};
use ark_groth16::{Groth16, ProvingKey};
use ark_relations::r1cs::ConstraintSynthesizer;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_snark::SNARK;
use ark_std::rand::SeedableRng;
use ark_std::rand::rngs::StdRng;
use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;
use zkpfp_crypto::key_material::fill_random;
use zkpfp_crypto::{KeyCommitment, SymmetricKeyMaterial};

use crate::artifact::ProofArtifact;
use crate::error::{ProofError, ProofResult};
use crate::witness::ProofWitness;

/// Default bound on a single proof generation
pub const DEFAULT_PROOF_TIMEOUT: Duration = Duration::from_secs(60);

/// Coarse phase of proof generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProofStage {
    LoadingArtifacts,
    PreparingWitness,
    Proving,
    Finalizing,
    Complete,
}

/// Progress update delivered to a [`ProgressCallback`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProofProgress {
    pub stage: ProofStage,
    /// 0..=100, never decreasing within one generation
    pub percent: u8,
}

pub type ProgressCallback = Arc<dyn Fn(ProofProgress) + Send + Sync>;

/// Delivers monotonic progress to an optional callback.
///
/// A panicking callback is caught and logged; it never aborts generation.
pub struct ProgressReporter {
    callback: Option<ProgressCallback>,
    last: AtomicU8,
}

impl ProgressReporter {
    pub fn new(callback: Option<ProgressCallback>) -> Self {
        Self {
            callback,
            last: AtomicU8::new(0),
        }
    }

    pub fn report(&self, stage: ProofStage, percent: u8) {
        let Some(callback) = &self.callback else {
            return;
        };
        let percent = percent.min(100);
        let previous = self.last.fetch_max(percent, Ordering::SeqCst);
        let update = ProofProgress {
            stage,
            percent: percent.max(previous),
        };
        if catch_unwind(AssertUnwindSafe(|| callback(update))).is_err() {
            warn!(?stage, "Progress callback panicked; ignoring");
        }
    }
}

/// A succinct-proof backend.
#[async_trait]
pub trait ProvingBackend: Send + Sync {
    /// Backend name for logs
    fn name(&self) -> &str;

    async fn prove(
        &self,
        witness: &ProofWitness,
        progress: &ProgressReporter,
    ) -> ProofResult<ProofArtifact>;
}

/// A circuit whose public inputs are `[commitment_hi, commitment_lo, recipient]`.
pub trait WitnessCircuit: ConstraintSynthesizer<Fr> + Send + 'static {
    fn from_witness(witness: &ProofWitness) -> Self;
}

enum ProvingKeySource {
    Memory,
    File(PathBuf),
}

/// arkworks Groth16 prover over BN254 for circuit `C`.
pub struct Groth16Prover<C> {
    source: ProvingKeySource,
    key: OnceCell<Arc<ProvingKey<Bn254>>>,
    _circuit: PhantomData<fn() -> C>,
}

impl<C: WitnessCircuit> Groth16Prover<C> {
    pub fn with_proving_key(key: ProvingKey<Bn254>) -> Self {
        Self {
            source: ProvingKeySource::Memory,
            key: OnceCell::new_with(Some(Arc::new(key))),
            _circuit: PhantomData,
        }
    }

    /// Prover whose key is read on first use from a compressed
    /// `ark-serialize` file.
    pub fn from_key_file(path: impl Into<PathBuf>) -> Self {
        Self {
            source: ProvingKeySource::File(path.into()),
            key: OnceCell::new(),
            _circuit: PhantomData,
        }
    }

    async fn proving_key(&self) -> ProofResult<Arc<ProvingKey<Bn254>>> {
        self.key
            .get_or_try_init(|| async {
                let path = match &self.source {
                    ProvingKeySource::File(path) => path.clone(),
                    ProvingKeySource::Memory => {
                        return Err(ProofError::GenerationUnavailable(
                            "proving key not loaded".to_string(),
                        ));
                    }
                };
                tokio::task::spawn_blocking(move || read_proving_key(&path))
                    .await
                    .map_err(|e| {
                        ProofError::GenerationUnavailable(format!("key loader task failed: {}", e))
                    })?
                    .map(Arc::new)
            })
            .await
            .cloned()
    }
}

#[async_trait]
impl<C: WitnessCircuit> ProvingBackend for Groth16Prover<C> {
    fn name(&self) -> &str {
        "groth16-bn254"
    }

    async fn prove(
        &self,
        witness: &ProofWitness,
        progress: &ProgressReporter,
    ) -> ProofResult<ProofArtifact> {
        progress.report(ProofStage::LoadingArtifacts, 5);
        let key = self.proving_key().await?;

        progress.report(ProofStage::PreparingWitness, 20);
        let circuit = C::from_witness(witness);
        let public_signals = witness.public_signals();

        let mut seed = Zeroizing::new([0u8; 32]);
        fill_random(&mut seed[..])
            .map_err(|e| ProofError::GenerationUnavailable(e.to_string()))?;

        progress.report(ProofStage::Proving, 30);
        let proof = tokio::task::spawn_blocking(move || {
            let mut rng = StdRng::from_seed(*seed);
            Groth16::<Bn254>::prove(key.as_ref(), circuit, &mut rng)
        })
        .await
        .map_err(|e| ProofError::GenerationUnavailable(format!("prover task failed: {}", e)))?
        .map_err(|e| ProofError::GenerationUnavailable(format!("prover error: {}", e)))?;

        progress.report(ProofStage::Finalizing, 95);
        Ok(ProofArtifact {
            proof: proof.into(),
            public_signals,
        })
    }
}

/// Read a compressed proving key
pub fn read_proving_key(path: &Path) -> ProofResult<ProvingKey<Bn254>> {
    let bytes = std::fs::read(path).map_err(|e| {
        ProofError::GenerationUnavailable(format!("proving key {}: {}", path.display(), e))
    })?;
    ProvingKey::<Bn254>::deserialize_compressed(&bytes[..]).map_err(|e| {
        ProofError::GenerationUnavailable(format!("proving key {}: {}", path.display(), e))
    })
}

/// Write a proving key in the form [`read_proving_key`] expects
pub fn write_proving_key(key: &ProvingKey<Bn254>, path: &Path) -> std::io::Result<()> {
    let mut bytes = Vec::with_capacity(key.compressed_size());
    key.serialize_compressed(&mut bytes)
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    std::fs::write(path, bytes)
}

/// Best-effort proof generation.
#[derive(Clone)]
pub struct ProofGenerator {
    backend: Option<Arc<dyn ProvingBackend>>,
    timeout: Duration,
}

impl ProofGenerator {
    pub fn new(backend: Arc<dyn ProvingBackend>) -> Self {
        Self {
            backend: Some(backend),
            timeout: DEFAULT_PROOF_TIMEOUT,
        }
    }

    /// A generator with no backend; every call is unavailable
    pub fn disabled() -> Self {
        Self {
            backend: None,
            timeout: DEFAULT_PROOF_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Prove knowledge of `material` behind `commitment` for `recipient`.
    pub async fn generate(
        &self,
        material: &SymmetricKeyMaterial,
        recipient: &str,
        commitment: &KeyCommitment,
        progress: Option<ProgressCallback>,
    ) -> ProofResult<ProofArtifact> {
        let backend = self.backend.as_ref().ok_or_else(|| {
            ProofError::GenerationUnavailable("no proving backend configured".to_string())
        })?;

        let witness = ProofWitness::new(material, recipient, *commitment)?;
        let reporter = ProgressReporter::new(progress);
        debug!(backend = backend.name(), timeout = ?self.timeout, "Generating proof");

        let artifact = tokio::time::timeout(self.timeout, backend.prove(&witness, &reporter))
            .await
            .map_err(|_| {
                ProofError::GenerationUnavailable(format!(
                    "proof generation timed out after {:?}",
                    self.timeout
                ))
            })?
            .map_err(|e| match e {
                ProofError::GenerationUnavailable(_) => e,
                other => ProofError::GenerationUnavailable(other.to_string()),
            })?;

        if !artifact.public_signals.encodes_commitment(commitment) {
            return Err(ProofError::GenerationUnavailable(
                "backend returned signals for a different commitment".to_string(),
            ));
        }

        reporter.report(ProofStage::Complete, 100);
        info!(
            backend = backend.name(),
            signals = artifact.public_signals.len(),
            "Proof generated"
        );
        Ok(artifact)
    }
}

impl std::fmt::Debug for ProofGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProofGenerator")
            .field("backend", &self.backend.as_ref().map(|b| b.name().to_string()))
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::fixture::{FixtureCircuit, fixture_rng, setup_fixture_keys};

    struct FailingBackend;

    #[async_trait]
    impl ProvingBackend for FailingBackend {
        fn name(&self) -> &str {
            "failing"
        }

        async fn prove(&self, _: &ProofWitness, _: &ProgressReporter) -> ProofResult<ProofArtifact> {
            Err(ProofError::MalformedProof("backend exploded".to_string()))
        }
    }

    struct SlowBackend;

    #[async_trait]
    impl ProvingBackend for SlowBackend {
        fn name(&self) -> &str {
            "slow"
        }

        async fn prove(&self, _: &ProofWitness, _: &ProgressReporter) -> ProofResult<ProofArtifact> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Err(ProofError::GenerationUnavailable("unreachable".to_string()))
        }
    }

    struct PanickingBackend;

    #[async_trait]
    impl ProvingBackend for PanickingBackend {
        fn name(&self) -> &str {
            "panicking"
        }

        async fn prove(&self, _: &ProofWitness, _: &ProgressReporter) -> ProofResult<ProofArtifact> {
            tokio::task::spawn_blocking(|| -> ProofResult<ProofArtifact> { panic!("prover bug") })
                .await
                .map_err(|e| ProofError::GenerationUnavailable(e.to_string()))?
        }
    }

    fn inputs() -> (SymmetricKeyMaterial, KeyCommitment) {
        let material = SymmetricKeyMaterial::generate().unwrap();
        let commitment = KeyCommitment::from_material(&material);
        (material, commitment)
    }

    fn fixture_prover() -> Groth16Prover<FixtureCircuit> {
        let (pk, _) = setup_fixture_keys(&mut fixture_rng()).unwrap();
        Groth16Prover::with_proving_key(pk)
    }

    #[tokio::test]
    async fn test_disabled_generator_unavailable() {
        let (material, commitment) = inputs();
        let err = ProofGenerator::disabled()
            .generate(&material, "R1", &commitment, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ProofError::GenerationUnavailable(_)));
    }

    #[tokio::test]
    async fn test_backend_errors_become_unavailable() {
        let (material, commitment) = inputs();
        let err = ProofGenerator::new(Arc::new(FailingBackend))
            .generate(&material, "R1", &commitment, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ProofError::GenerationUnavailable(_)));
        assert!(err.to_string().contains("backend exploded"));
    }

    #[tokio::test]
    async fn test_panicking_backend_unavailable() {
        let (material, commitment) = inputs();
        let err = ProofGenerator::new(Arc::new(PanickingBackend))
            .generate(&material, "R1", &commitment, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ProofError::GenerationUnavailable(_)));
    }

    #[tokio::test]
    async fn test_timeout_unavailable() {
        let (material, commitment) = inputs();
        let err = ProofGenerator::new(Arc::new(SlowBackend))
            .with_timeout(Duration::from_millis(50))
            .generate(&material, "R1", &commitment, None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn test_mismatched_commitment_rejected() {
        let (material, _) = inputs();
        let (_, other) = inputs();
        let err = ProofGenerator::new(Arc::new(FailingBackend))
            .generate(&material, "R1", &other, None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("malformed witness"));
    }

    #[tokio::test]
    async fn test_missing_key_file_unavailable() {
        let (material, commitment) = inputs();
        let prover = Groth16Prover::<FixtureCircuit>::from_key_file("/nonexistent/proving.key");
        let err = ProofGenerator::new(Arc::new(prover))
            .generate(&material, "R1", &commitment, None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("proving key"));
    }

    #[tokio::test]
    async fn test_fixture_proof_with_progress() {
        let (material, commitment) = inputs();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let callback: ProgressCallback = Arc::new(move |p: ProofProgress| sink.lock().unwrap().push(p));

        let artifact = ProofGenerator::new(Arc::new(fixture_prover()))
            .generate(&material, "R1", &commitment, Some(callback))
            .await
            .unwrap();
        assert!(artifact.public_signals.encodes_commitment(&commitment));

        let seen = seen.lock().unwrap();
        assert!(seen.windows(2).all(|w| w[0].percent <= w[1].percent));
        assert_eq!(seen.last().map(|p| (p.stage, p.percent)), Some((ProofStage::Complete, 100)));
    }

    #[tokio::test]
    async fn test_panicking_progress_callback_ignored() {
        let (material, commitment) = inputs();
        let callback: ProgressCallback = Arc::new(|_: ProofProgress| panic!("ui bug"));
        let result = ProofGenerator::new(Arc::new(fixture_prover()))
            .generate(&material, "R1", &commitment, Some(callback))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_key_file_roundtrip() {
        let (pk, _) = setup_fixture_keys(&mut fixture_rng()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("proving.key");
        write_proving_key(&pk, &path).unwrap();

        let (material, commitment) = inputs();
        let prover = Groth16Prover::<FixtureCircuit>::from_key_file(&path);
        let artifact = ProofGenerator::new(Arc::new(prover))
            .generate(&material, "R1", &commitment, None)
            .await
            .unwrap();
        assert_eq!(artifact.public_signals.len(), 3);
    }

    #[test]
    fn test_reporter_is_monotonic() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let callback: ProgressCallback = Arc::new(move |p: ProofProgress| sink.lock().unwrap().push(p.percent));
        let reporter = ProgressReporter::new(Some(callback));
        reporter.report(ProofStage::Proving, 50);
        reporter.report(ProofStage::Proving, 30);
        reporter.report(ProofStage::Finalizing, 250);
        assert_eq!(*seen.lock().unwrap(), vec![50, 50, 100]);
    }
}
