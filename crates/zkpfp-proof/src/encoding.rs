//! Decimal field-element and curve-point encoding (snarkjs conventions).
//!
//! Points are written in normalized projective form: G1 as `[x, y, "1"]`,
//! G2 as `[[x.c0, x.c1], [y.c0, y.c1], ["1", "0"]]`. The point at infinity
//! is `["0", "1", "0"]` / `[["0","0"], ["1","0"], ["0","0"]]`.

use ark_bn254::{Fq, Fq2, G1Affine, G2Affine};
use ark_ec::AffineRepr;
use ark_ff::{One, PrimeField, Zero};
use num_bigint::BigUint;

/// Canonical decimal form of a field element
pub fn field_to_decimal<F: PrimeField>(value: &F) -> String {
    let n: BigUint = (*value).into();
    n.to_string()
}

/// Parse a decimal field element, rejecting values outside `[0, p)`.
pub fn parse_decimal<F: PrimeField>(s: &str) -> Result<F, String> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("not a decimal field element: {:?}", s));
    }
    let n = BigUint::parse_bytes(s.as_bytes(), 10)
        .ok_or_else(|| format!("not a decimal field element: {:?}", s))?;
    reduce_checked(n, s)
}

/// Parse a decimal or `0x`-prefixed hexadecimal field element.
pub fn parse_numeric<F: PrimeField>(s: &str) -> Result<F, String> {
    let s = s.trim();
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(h) => {
            if h.is_empty() || !h.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(format!("not a hexadecimal field element: {:?}", s));
            }
            let n = BigUint::parse_bytes(h.as_bytes(), 16)
                .ok_or_else(|| format!("not a hexadecimal field element: {:?}", s))?;
            reduce_checked(n, s)
        }
        None => parse_decimal(s),
    }
}

fn reduce_checked<F: PrimeField>(n: BigUint, original: &str) -> Result<F, String> {
    let modulus: BigUint = F::MODULUS.into();
    if n >= modulus {
        return Err(format!("field element out of range: {}", original));
    }
    Ok(F::from(n))
}

fn coordinate(coords: &[String], index: usize, what: &str) -> Result<Fq, String> {
    parse_decimal(&coords[index]).map_err(|e| format!("{}[{}]: {}", what, index, e))
}

/// Encode a G1 point
pub fn g1_to_strings(p: &G1Affine) -> Vec<String> {
    if p.infinity {
        return vec!["0".to_string(), "1".to_string(), "0".to_string()];
    }
    vec![field_to_decimal(&p.x), field_to_decimal(&p.y), "1".to_string()]
}

/// Decode a G1 point, checking curve and subgroup membership
pub fn g1_from_strings(coords: &[String], what: &str) -> Result<G1Affine, String> {
    if coords.len() != 3 {
        return Err(format!("{} must have 3 coordinates, got {}", what, coords.len()));
    }
    let z = coordinate(coords, 2, what)?;
    if z.is_zero() {
        return Ok(G1Affine::zero());
    }
    if !z.is_one() {
        return Err(format!("{} is not normalized (z != 1)", what));
    }

    let p = G1Affine::new_unchecked(coordinate(coords, 0, what)?, coordinate(coords, 1, what)?);
    if !p.is_on_curve() {
        return Err(format!("{} is not on the curve", what));
    }
    if !p.is_in_correct_subgroup_assuming_on_curve() {
        return Err(format!("{} is not in the prime-order subgroup", what));
    }
    Ok(p)
}

fn fq2_to_strings(v: &Fq2) -> Vec<String> {
    vec![field_to_decimal(&v.c0), field_to_decimal(&v.c1)]
}

fn fq2_from_strings(pair: &[String], what: &str) -> Result<Fq2, String> {
    if pair.len() != 2 {
        return Err(format!("{} must have 2 components, got {}", what, pair.len()));
    }
    Ok(Fq2::new(coordinate(pair, 0, what)?, coordinate(pair, 1, what)?))
}

/// Encode a G2 point
pub fn g2_to_strings(p: &G2Affine) -> Vec<Vec<String>> {
    if p.infinity {
        return vec![
            vec!["0".to_string(), "0".to_string()],
            vec!["1".to_string(), "0".to_string()],
            vec!["0".to_string(), "0".to_string()],
        ];
    }
    vec![
        fq2_to_strings(&p.x),
        fq2_to_strings(&p.y),
        vec!["1".to_string(), "0".to_string()],
    ]
}

/// Decode a G2 point, checking curve and subgroup membership
pub fn g2_from_strings(coords: &[Vec<String>], what: &str) -> Result<G2Affine, String> {
    if coords.len() != 3 {
        return Err(format!("{} must have 3 coordinates, got {}", what, coords.len()));
    }
    let z = fq2_from_strings(&coords[2], &format!("{}.z", what))?;
    if z.is_zero() {
        return Ok(G2Affine::zero());
    }
    if !z.is_one() {
        return Err(format!("{} is not normalized (z != 1)", what));
    }

    let x = fq2_from_strings(&coords[0], &format!("{}.x", what))?;
    let y = fq2_from_strings(&coords[1], &format!("{}.y", what))?;
    let p = G2Affine::new_unchecked(x, y);
    if !p.is_on_curve() {
        return Err(format!("{} is not on the curve", what));
    }
    if !p.is_in_correct_subgroup_assuming_on_curve() {
        return Err(format!("{} is not in the prime-order subgroup", what));
    }
    Ok(p)
}

#[cfg(test)]
mod tests {
    use ark_bn254::{Fr, G1Projective, G2Projective};
    use ark_ec::{CurveGroup, Group};

    use super::*;

    #[test]
    fn test_field_decimal_roundtrip() {
        for v in [0u64, 1, 42, u64::MAX] {
            let f = Fr::from(v);
            let s = field_to_decimal(&f);
            assert_eq!(s, v.to_string());
            assert_eq!(parse_decimal::<Fr>(&s).unwrap(), f);
        }
    }

    #[test]
    fn test_parse_rejects_out_of_range() {
        let modulus: BigUint = Fr::MODULUS.into();
        assert!(parse_decimal::<Fr>(&modulus.to_string()).is_err());
        let below = &modulus - 1u32;
        assert!(parse_decimal::<Fr>(&below.to_string()).is_ok());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", "-1", "1.5", "12a", " 7", "+3"] {
            assert!(parse_decimal::<Fr>(bad).is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_parse_numeric_accepts_hex() {
        assert_eq!(parse_numeric::<Fr>("0x2a").unwrap(), Fr::from(42u64));
        assert_eq!(parse_numeric::<Fr>(" 42 ").unwrap(), Fr::from(42u64));
        assert!(parse_numeric::<Fr>("0x").is_err());
    }

    #[test]
    fn test_parse_numeric_rejects_loose_hex() {
        for bad in ["0x1_0", "0x+10", "0x-1", "0x 10", "0x1g"] {
            assert!(parse_numeric::<Fr>(bad).is_err(), "accepted {:?}", bad);
        }
        assert!(parse_numeric::<Fr>("1_0").is_err());
    }

    #[test]
    fn test_g1_roundtrip() {
        let p = (G1Projective::generator() * Fr::from(7u64)).into_affine();
        let strings = g1_to_strings(&p);
        assert_eq!(strings[2], "1");
        assert_eq!(g1_from_strings(&strings, "pi_a").unwrap(), p);

        let zero = G1Affine::zero();
        assert_eq!(g1_from_strings(&g1_to_strings(&zero), "pi_a").unwrap(), zero);
    }

    #[test]
    fn test_g2_roundtrip() {
        let p = (G2Projective::generator() * Fr::from(11u64)).into_affine();
        let strings = g2_to_strings(&p);
        assert_eq!(g2_from_strings(&strings, "pi_b").unwrap(), p);
    }

    #[test]
    fn test_g1_off_curve_rejected() {
        let strings = vec!["1".to_string(), "3".to_string(), "1".to_string()];
        let err = g1_from_strings(&strings, "pi_a").unwrap_err();
        assert!(err.contains("not on the curve"));
    }

    #[test]
    fn test_g1_wrong_arity_rejected() {
        let strings = vec!["1".to_string(), "2".to_string()];
        assert!(g1_from_strings(&strings, "pi_a").unwrap_err().contains("3 coordinates"));
    }
}
