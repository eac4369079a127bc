//! Proof and public-signal types.

use ark_bn254::{Bn254, Fr, G1Affine, G2Affine};
use ark_ff::PrimeField;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use zkpfp_crypto::KeyCommitment;

use crate::encoding::{field_to_decimal, parse_decimal, parse_numeric};
use crate::error::{ProofError, ProofResult};

/// Number of public signals in the zkPFP layout
pub const PUBLIC_SIGNAL_COUNT: usize = 3;

/// Bytes of the recipient digest mapped into the scalar field
const RECIPIENT_FIELD_BYTES: usize = 31;

/// A Groth16 proof over BN254
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Groth16Proof {
    pub a: G1Affine,
    pub b: G2Affine,
    pub c: G1Affine,
}

impl From<ark_groth16::Proof<Bn254>> for Groth16Proof {
    fn from(proof: ark_groth16::Proof<Bn254>) -> Self {
        Self {
            a: proof.a,
            b: proof.b,
            c: proof.c,
        }
    }
}

impl From<&Groth16Proof> for ark_groth16::Proof<Bn254> {
    fn from(proof: &Groth16Proof) -> Self {
        ark_groth16::Proof {
            a: proof.a,
            b: proof.b,
            c: proof.c,
        }
    }
}

/// Ordered public signals as canonical decimal strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct PublicSignals(Vec<String>);

impl PublicSignals {
    /// Signals for a commitment and recipient identity:
    /// `[commitment_hi, commitment_lo, recipient]`.
    pub fn for_commitment(commitment: &KeyCommitment, recipient_identity: &str) -> Self {
        let [hi, lo] = commitment_fields(commitment);
        Self::from_field_elements(&[hi, lo, recipient_field(recipient_identity)])
    }

    pub fn from_field_elements(elements: &[Fr]) -> Self {
        Self(elements.iter().map(field_to_decimal).collect())
    }

    /// Parse signals from strings, canonicalizing each to decimal.
    ///
    /// Accepts decimal or `0x` hexadecimal. Anything else, or a value outside
    /// the scalar field, fails with [`ProofError::MalformedSignal`].
    pub fn parse<I, S>(signals: I) -> ProofResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        signals
            .into_iter()
            .enumerate()
            .map(|(i, s)| {
                parse_numeric::<Fr>(s.as_ref())
                    .map(|f| field_to_decimal(&f))
                    .map_err(|e| ProofError::MalformedSignal(format!("signal {}: {}", i, e)))
            })
            .collect::<ProofResult<Vec<_>>>()
            .map(Self)
    }

    /// Coerce loosely typed JSON signals (strings or integers).
    pub fn from_json_values(values: &[serde_json::Value]) -> ProofResult<Self> {
        let strings = values
            .iter()
            .enumerate()
            .map(|(i, v)| match v {
                serde_json::Value::String(s) => Ok(s.clone()),
                serde_json::Value::Number(n) if !n.is_f64() => Ok(n.to_string()),
                other => Err(ProofError::MalformedSignal(format!(
                    "signal {}: expected string or integer, got {}",
                    i, other
                ))),
            })
            .collect::<ProofResult<Vec<_>>>()?;
        Self::parse(strings)
    }

    pub fn to_field_elements(&self) -> ProofResult<Vec<Fr>> {
        self.0
            .iter()
            .map(|s| parse_decimal::<Fr>(s).map_err(ProofError::MalformedSignal))
            .collect()
    }

    /// Whether the leading signals encode `commitment`.
    pub fn encodes_commitment(&self, commitment: &KeyCommitment) -> bool {
        let expected = commitment_fields(commitment);
        self.0.len() >= 2
            && self.0[0] == field_to_decimal(&expected[0])
            && self.0[1] == field_to_decimal(&expected[1])
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<Vec<String>> for PublicSignals {
    type Error = ProofError;

    fn try_from(value: Vec<String>) -> ProofResult<Self> {
        Self::parse(value)
    }
}

impl From<PublicSignals> for Vec<String> {
    fn from(signals: PublicSignals) -> Self {
        signals.0
    }
}

/// The two 128-bit commitment halves as scalars, high half first.
pub fn commitment_fields(commitment: &KeyCommitment) -> [Fr; 2] {
    let (hi, lo) = commitment.limbs();
    [
        Fr::from_be_bytes_mod_order(&hi),
        Fr::from_be_bytes_mod_order(&lo),
    ]
}

/// Recipient identity as a scalar: the first 31 bytes of its SHA-256 digest.
pub fn recipient_field(identity: &str) -> Fr {
    let digest = Sha256::digest(identity.as_bytes());
    Fr::from_be_bytes_mod_order(&digest[..RECIPIENT_FIELD_BYTES])
}

/// A proof together with the public signals it attests to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofArtifact {
    pub proof: Groth16Proof,
    pub public_signals: PublicSignals,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn commitment() -> KeyCommitment {
        KeyCommitment::compute(&[7u8; 32], &[9u8; 12]).unwrap()
    }

    #[test]
    fn test_layout_for_commitment() {
        let c = commitment();
        let signals = PublicSignals::for_commitment(&c, "R1");
        assert_eq!(signals.len(), PUBLIC_SIGNAL_COUNT);
        assert!(signals.encodes_commitment(&c));

        let other = KeyCommitment::compute(&[8u8; 32], &[9u8; 12]).unwrap();
        assert!(!signals.encodes_commitment(&other));
    }

    #[test]
    fn test_limbs_are_big_endian_halves() {
        let mut bytes = [0u8; 32];
        bytes[15] = 1;
        bytes[31] = 2;
        let [hi, lo] = commitment_fields(&KeyCommitment::from_bytes(bytes));
        assert_eq!(hi, Fr::from(1u64));
        assert_eq!(lo, Fr::from(2u64));
    }

    #[test]
    fn test_recipient_field_depends_on_identity() {
        assert_eq!(recipient_field("R1"), recipient_field("R1"));
        assert_ne!(recipient_field("R1"), recipient_field("R2"));
    }

    #[test]
    fn test_parse_canonicalizes() {
        let signals = PublicSignals::parse(["0x10", "16", "0"]).unwrap();
        assert_eq!(signals.as_slice(), &["16", "16", "0"]);
    }

    #[test]
    fn test_parse_rejects_non_numeric() {
        let err = PublicSignals::parse(["12", "abc"]).unwrap_err();
        assert!(matches!(err, ProofError::MalformedSignal(_)));
        assert!(err.to_string().contains("signal 1"));
    }

    #[test]
    fn test_json_coercion() {
        let values = vec![json!("5"), json!(6), json!("0x07")];
        let signals = PublicSignals::from_json_values(&values).unwrap();
        assert_eq!(signals.as_slice(), &["5", "6", "7"]);

        assert!(PublicSignals::from_json_values(&[json!(1.5)]).is_err());
        assert!(PublicSignals::from_json_values(&[json!(null)]).is_err());
        assert!(PublicSignals::from_json_values(&[json!([1])]).is_err());
    }

    #[test]
    fn test_serde_validates() {
        let signals: PublicSignals = serde_json::from_str(r#"["1","2","3"]"#).unwrap();
        assert_eq!(signals.to_field_elements().unwrap()[2], Fr::from(3u64));
        assert!(serde_json::from_str::<PublicSignals>(r#"["1","x"]"#).is_err());

        let encoded = serde_json::to_string(&signals).unwrap();
        assert_eq!(encoded, r#"["1","2","3"]"#);
    }
}
