//! snarkjs-compatible proof JSON, carried as Base64.

use serde::Deserialize;
use serde_json::json;
use zkpfp_crypto::{decode_base64, encode_base64};

use crate::artifact::Groth16Proof;
use crate::encoding::{g1_from_strings, g1_to_strings, g2_from_strings, g2_to_strings};
use crate::error::{ProofError, ProofResult};

pub const PROTOCOL: &str = "groth16";

/// Curve tag written by snarkjs for BN254
pub const CURVE: &str = "bn128";

const CURVE_ALIASES: [&str; 2] = ["bn128", "bn254"];

#[derive(Deserialize)]
struct ProofJson {
    pi_a: Option<Vec<String>>,
    pi_b: Option<Vec<Vec<String>>>,
    pi_c: Option<Vec<String>>,
    protocol: Option<String>,
    curve: Option<String>,
}

/// Serialize a proof to Base64-wrapped snarkjs JSON.
///
/// Only the three point groups are written. The snarkjs `protocol` and
/// `curve` tags are accepted on input but never emitted.
pub fn serialize_proof(proof: &Groth16Proof) -> String {
    let value = json!({
        "pi_a": g1_to_strings(&proof.a),
        "pi_b": g2_to_strings(&proof.b),
        "pi_c": g1_to_strings(&proof.c),
    });
    encode_base64(value.to_string().as_bytes())
}

/// Parse a proof from its Base64 form or from a raw JSON object.
pub fn deserialize_proof(encoded: &str) -> ProofResult<Groth16Proof> {
    let trimmed = encoded.trim();
    let bytes = if trimmed.starts_with('{') {
        trimmed.as_bytes().to_vec()
    } else {
        decode_base64(trimmed).map_err(|e| ProofError::MalformedProof(e.to_string()))?
    };

    let parsed: ProofJson = serde_json::from_slice(&bytes)
        .map_err(|e| ProofError::MalformedProof(format!("invalid proof JSON: {}", e)))?;

    if let Some(protocol) = parsed.protocol.as_deref().filter(|p| *p != PROTOCOL) {
        return Err(ProofError::MalformedProof(format!(
            "unsupported protocol {:?}",
            protocol
        )));
    }
    if let Some(curve) = parsed.curve.as_deref().filter(|c| !CURVE_ALIASES.contains(c)) {
        return Err(ProofError::MalformedProof(format!("unsupported curve {:?}", curve)));
    }

    let missing = |name: &str| ProofError::MalformedProof(format!("missing {}", name));
    let a = parsed.pi_a.ok_or_else(|| missing("pi_a"))?;
    let b = parsed.pi_b.ok_or_else(|| missing("pi_b"))?;
    let c = parsed.pi_c.ok_or_else(|| missing("pi_c"))?;

    Ok(Groth16Proof {
        a: g1_from_strings(&a, "pi_a").map_err(ProofError::MalformedProof)?,
        b: g2_from_strings(&b, "pi_b").map_err(ProofError::MalformedProof)?,
        c: g1_from_strings(&c, "pi_c").map_err(ProofError::MalformedProof)?,
    })
}

#[cfg(test)]
mod tests {
    use ark_bn254::{Fr, G1Projective, G2Projective};
    use ark_ec::{CurveGroup, Group};
    use serde_json::Value;

    use super::*;

    fn sample_proof() -> Groth16Proof {
        Groth16Proof {
            a: (G1Projective::generator() * Fr::from(3u64)).into_affine(),
            b: (G2Projective::generator() * Fr::from(5u64)).into_affine(),
            c: (G1Projective::generator() * Fr::from(7u64)).into_affine(),
        }
    }

    fn json_of(proof: &Groth16Proof) -> Value {
        let bytes = decode_base64(&serialize_proof(proof)).unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_roundtrip() {
        let proof = sample_proof();
        let encoded = serialize_proof(&proof);
        assert_eq!(deserialize_proof(&encoded).unwrap(), proof);
    }

    #[test]
    fn test_snarkjs_shape() {
        let value = json_of(&sample_proof());
        let mut keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, ["pi_a", "pi_b", "pi_c"]);
        assert_eq!(value["pi_a"].as_array().unwrap().len(), 3);
        assert_eq!(value["pi_a"][2], "1");
        assert_eq!(value["pi_b"][2], json!(["1", "0"]));
    }

    #[test]
    fn test_raw_json_accepted() {
        let proof = sample_proof();
        let raw = json_of(&proof).to_string();
        assert_eq!(deserialize_proof(&raw).unwrap(), proof);
    }

    #[test]
    fn test_missing_group_rejected() {
        for group in ["pi_a", "pi_b", "pi_c"] {
            let mut value = json_of(&sample_proof());
            value.as_object_mut().unwrap().remove(group);
            let err = deserialize_proof(&value.to_string()).unwrap_err();
            assert!(matches!(err, ProofError::MalformedProof(_)));
            assert!(err.to_string().contains(group));
        }
    }

    #[test]
    fn test_wrong_protocol_rejected() {
        let mut value = json_of(&sample_proof());
        value["protocol"] = json!("plonk");
        assert!(deserialize_proof(&value.to_string()).is_err());

        let mut value = json_of(&sample_proof());
        value["curve"] = json!("bls12381");
        assert!(deserialize_proof(&value.to_string()).is_err());
    }

    #[test]
    fn test_snarkjs_tags_accepted() {
        let proof = sample_proof();
        for curve in ["bn128", "bn254"] {
            let mut value = json_of(&proof);
            value["protocol"] = json!("groth16");
            value["curve"] = json!(curve);
            assert_eq!(deserialize_proof(&value.to_string()).unwrap(), proof);
        }
    }

    #[test]
    fn test_off_curve_rejected() {
        let mut value = json_of(&sample_proof());
        value["pi_c"][1] = json!("4");
        let err = deserialize_proof(&value.to_string()).unwrap_err();
        assert!(err.to_string().contains("pi_c"));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(deserialize_proof("").is_err());
        assert!(deserialize_proof("not base64!").is_err());
        assert!(deserialize_proof(&encode_base64(b"[1,2,3]")).is_err());
        assert!(deserialize_proof("{\"pi_a\": 5}").is_err());
    }
}
