//! A small Groth16 circuit over the zkPFP public-input layout.
//!
//! Public inputs are `[commitment_hi, commitment_lo, recipient]`. The circuit
//! ties the key halves and nonce to the recipient through one product
//! constraint and copies the commitment limbs into the witness. It does not
//! prove SHA-256 preimage knowledge; production deployments supply their own
//! [`WitnessCircuit`].

use ark_bn254::{Bn254, Fr};
use ark_groth16::{Groth16, ProvingKey};
use ark_relations::lc;
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystemRef, SynthesisError, Variable};
use ark_snark::SNARK;
use ark_std::rand::rngs::StdRng;
use ark_std::rand::{CryptoRng, RngCore, SeedableRng};

use crate::error::{ProofError, ProofResult};
use crate::generator::WitnessCircuit;
use crate::vkey::VerificationKey;
use crate::witness::ProofWitness;

#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureCircuit {
    pub commitment_hi: Option<Fr>,
    pub commitment_lo: Option<Fr>,
    pub recipient: Option<Fr>,
    pub key_hi: Option<Fr>,
    pub key_lo: Option<Fr>,
    pub nonce: Option<Fr>,
}

impl WitnessCircuit for FixtureCircuit {
    fn from_witness(witness: &ProofWitness) -> Self {
        let [commitment_hi, commitment_lo, recipient] = witness.public_inputs();
        let [key_hi, key_lo] = witness.key_fields();
        Self {
            commitment_hi: Some(commitment_hi),
            commitment_lo: Some(commitment_lo),
            recipient: Some(recipient),
            key_hi: Some(key_hi),
            key_lo: Some(key_lo),
            nonce: Some(witness.nonce_field()),
        }
    }
}

fn assigned(value: Option<Fr>) -> Result<Fr, SynthesisError> {
    value.ok_or(SynthesisError::AssignmentMissing)
}

impl ConstraintSynthesizer<Fr> for FixtureCircuit {
    fn generate_constraints(self, cs: ConstraintSystemRef<Fr>) -> Result<(), SynthesisError> {
        let commitment_hi = cs.new_input_variable(|| assigned(self.commitment_hi))?;
        let commitment_lo = cs.new_input_variable(|| assigned(self.commitment_lo))?;
        let recipient = cs.new_input_variable(|| assigned(self.recipient))?;

        let key_hi = cs.new_witness_variable(|| assigned(self.key_hi))?;
        let key_lo = cs.new_witness_variable(|| assigned(self.key_lo))?;
        let nonce = cs.new_witness_variable(|| assigned(self.nonce))?;

        // binding = (key_hi + nonce) * (key_lo + recipient)
        let binding_value = match (self.key_hi, self.nonce, self.key_lo, self.recipient) {
            (Some(a), Some(n), Some(b), Some(r)) => Some((a + n) * (b + r)),
            _ => None,
        };
        let binding = cs.new_witness_variable(|| assigned(binding_value))?;
        cs.enforce_constraint(
            lc!() + key_hi + nonce,
            lc!() + key_lo + recipient,
            lc!() + binding,
        )?;

        let hi_copy = cs.new_witness_variable(|| assigned(self.commitment_hi))?;
        let lo_copy = cs.new_witness_variable(|| assigned(self.commitment_lo))?;
        cs.enforce_constraint(lc!() + commitment_hi, lc!() + Variable::One, lc!() + hi_copy)?;
        cs.enforce_constraint(lc!() + commitment_lo, lc!() + Variable::One, lc!() + lo_copy)?;

        Ok(())
    }
}

/// Seed shared by fixture key generation in tests
pub const FIXTURE_SEED: u64 = 7;

/// Deterministic RNG for fixture setup; the same seed always yields the same keys.
pub fn fixture_rng() -> StdRng {
    StdRng::seed_from_u64(FIXTURE_SEED)
}

/// Circuit-specific setup for [`FixtureCircuit`]
pub fn setup_fixture_keys<R: RngCore + CryptoRng>(
    rng: &mut R,
) -> ProofResult<(ProvingKey<Bn254>, VerificationKey)> {
    let (pk, vk) = Groth16::<Bn254>::circuit_specific_setup(FixtureCircuit::default(), rng)
        .map_err(|e| ProofError::GenerationUnavailable(format!("setup failed: {}", e)))?;
    Ok((pk, VerificationKey::from_arkworks(vk)?))
}
