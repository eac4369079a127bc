//! Groth16 verification key in snarkjs `verification_key.json` form.

use std::path::Path;
use std::sync::{Arc, OnceLock};

use ark_bn254::Bn254;
use ark_groth16::{Groth16, PreparedVerifyingKey, VerifyingKey};
use ark_snark::SNARK;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::encoding::{g1_from_strings, g1_to_strings, g2_from_strings, g2_to_strings};
use crate::error::{ProofError, ProofResult};
use crate::serialize::{CURVE, PROTOCOL};

static GLOBAL_KEY: OnceLock<Arc<VerificationKey>> = OnceLock::new();

#[derive(Deserialize)]
struct VerificationKeyJson {
    protocol: String,
    curve: String,
    #[serde(rename = "nPublic")]
    n_public: usize,
    vk_alpha_1: Vec<String>,
    vk_beta_2: Vec<Vec<String>>,
    vk_gamma_2: Vec<Vec<String>>,
    vk_delta_2: Vec<Vec<String>>,
    #[serde(rename = "IC")]
    ic: Vec<Vec<String>>,
}

/// A verification key with its pairing-prepared form
#[derive(Clone)]
pub struct VerificationKey {
    prepared: PreparedVerifyingKey<Bn254>,
}

impl VerificationKey {
    pub fn from_arkworks(vk: VerifyingKey<Bn254>) -> ProofResult<Self> {
        if vk.gamma_abc_g1.is_empty() {
            return Err(ProofError::InvalidVerificationKey("empty IC".to_string()));
        }
        let prepared = Groth16::<Bn254>::process_vk(&vk)
            .map_err(|e| ProofError::InvalidVerificationKey(e.to_string()))?;
        Ok(Self { prepared })
    }

    /// Parse snarkjs `verification_key.json` content.
    pub fn from_json(json: &str) -> ProofResult<Self> {
        let invalid = ProofError::InvalidVerificationKey;
        let parsed: VerificationKeyJson =
            serde_json::from_str(json).map_err(|e| invalid(e.to_string()))?;

        if parsed.protocol != PROTOCOL {
            return Err(invalid(format!("unsupported protocol {:?}", parsed.protocol)));
        }
        if parsed.curve != CURVE && parsed.curve != "bn254" {
            return Err(invalid(format!("unsupported curve {:?}", parsed.curve)));
        }
        if parsed.ic.len() != parsed.n_public + 1 {
            return Err(invalid(format!(
                "IC has {} points, expected nPublic + 1 = {}",
                parsed.ic.len(),
                parsed.n_public + 1
            )));
        }

        let gamma_abc_g1 = parsed
            .ic
            .iter()
            .enumerate()
            .map(|(i, p)| g1_from_strings(p, &format!("IC[{}]", i)))
            .collect::<Result<Vec<_>, _>>()
            .map_err(invalid)?;

        let vk = VerifyingKey {
            alpha_g1: g1_from_strings(&parsed.vk_alpha_1, "vk_alpha_1").map_err(invalid)?,
            beta_g2: g2_from_strings(&parsed.vk_beta_2, "vk_beta_2").map_err(invalid)?,
            gamma_g2: g2_from_strings(&parsed.vk_gamma_2, "vk_gamma_2").map_err(invalid)?,
            delta_g2: g2_from_strings(&parsed.vk_delta_2, "vk_delta_2").map_err(invalid)?,
            gamma_abc_g1,
        };
        Self::from_arkworks(vk)
    }

    pub fn load(path: impl AsRef<Path>) -> ProofResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            ProofError::InvalidVerificationKey(format!("{}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    /// snarkjs `verification_key.json` representation
    pub fn to_json(&self) -> String {
        let vk = &self.prepared.vk;
        let value = json!({
            "protocol": PROTOCOL,
            "curve": CURVE,
            "nPublic": self.num_public_inputs(),
            "vk_alpha_1": g1_to_strings(&vk.alpha_g1),
            "vk_beta_2": g2_to_strings(&vk.beta_g2),
            "vk_gamma_2": g2_to_strings(&vk.gamma_g2),
            "vk_delta_2": g2_to_strings(&vk.delta_g2),
            "IC": vk.gamma_abc_g1.iter().map(g1_to_strings).collect::<Vec<_>>(),
        });
        format!("{:#}", value)
    }

    /// Number of public inputs the key expects
    pub fn num_public_inputs(&self) -> usize {
        self.prepared.vk.gamma_abc_g1.len().saturating_sub(1)
    }

    pub fn prepared(&self) -> &PreparedVerifyingKey<Bn254> {
        &self.prepared
    }

    pub fn verifying_key(&self) -> &VerifyingKey<Bn254> {
        &self.prepared.vk
    }

    /// Install the process-wide verification key. Fails if one is already set.
    pub fn install_global(key: VerificationKey) -> ProofResult<Arc<VerificationKey>> {
        let key = Arc::new(key);
        GLOBAL_KEY
            .set(Arc::clone(&key))
            .map_err(|_| ProofError::VerificationKeyAlreadyInstalled)?;
        info!(n_public = key.num_public_inputs(), "Verification key installed");
        Ok(key)
    }

    pub fn global() -> Option<Arc<VerificationKey>> {
        GLOBAL_KEY.get().cloned()
    }
}

impl std::fmt::Debug for VerificationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationKey")
            .field("protocol", &PROTOCOL)
            .field("n_public", &self.num_public_inputs())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;
    use crate::fixture::{fixture_rng, setup_fixture_keys};

    fn fixture_key() -> VerificationKey {
        setup_fixture_keys(&mut fixture_rng()).unwrap().1
    }

    #[test]
    fn test_json_roundtrip() {
        let key = fixture_key();
        assert_eq!(key.num_public_inputs(), 3);

        let parsed = VerificationKey::from_json(&key.to_json()).unwrap();
        assert_eq!(parsed.verifying_key(), key.verifying_key());
    }

    #[test]
    fn test_ic_length_checked() {
        let mut value: Value = serde_json::from_str(&fixture_key().to_json()).unwrap();
        value["nPublic"] = serde_json::json!(5);
        let err = VerificationKey::from_json(&value.to_string()).unwrap_err();
        assert!(err.to_string().contains("IC"));
    }

    #[test]
    fn test_wrong_protocol_rejected() {
        let mut value: Value = serde_json::from_str(&fixture_key().to_json()).unwrap();
        value["protocol"] = serde_json::json!("plonk");
        assert!(matches!(
            VerificationKey::from_json(&value.to_string()),
            Err(ProofError::InvalidVerificationKey(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("verification_key.json");
        std::fs::write(&path, fixture_key().to_json()).unwrap();
        assert_eq!(VerificationKey::load(&path).unwrap().num_public_inputs(), 3);
        assert!(VerificationKey::load(dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_install_global_once() {
        let first = VerificationKey::install_global(fixture_key());
        let second = VerificationKey::install_global(fixture_key());
        // Other tests in this binary may have installed first
        assert!(first.is_ok() || matches!(first, Err(ProofError::VerificationKeyAlreadyInstalled)));
        assert!(matches!(second, Err(ProofError::VerificationKeyAlreadyInstalled)));
        assert!(VerificationKey::global().is_some());
    }
}
