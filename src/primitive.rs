//! Primitive element search in `GF(p)`.

use num_bigint::BigUint;

use crate::error::{RescueError, Result};
use crate::field::PrimeField;

/// Smallest integer `g >= 2` generating the multiplicative group of `field`.
///
/// Linear scan testing `multiplicative_order(g) == p - 1`. A primitive root
/// exists for every prime, so the scan only runs out of candidates when `p`
/// is not actually prime.
pub fn find_primitive_element(field: &PrimeField) -> Result<BigUint> {
    let group_order = field.group_order();
    let mut candidate = BigUint::from(2u32);

    while &candidate < field.modulus() {
        if field.multiplicative_order(&candidate)? == group_order {
            return Ok(candidate);
        }
        candidate += 1u32;
    }

    Err(RescueError::Domain(format!(
        "no primitive element below {}; modulus is not prime",
        field.modulus()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets;

    #[test]
    fn test_known_primitive_roots() {
        let cases = [
            (3u64, 2u64),
            (5, 2),
            (7, 3),
            (11, 2),
            (17, 3),
            (23, 5),
            (41, 6),
            (65537, 3),
            (18_446_744_069_414_584_321, 7),
        ];
        for (p, g) in cases {
            let field = PrimeField::from_u64(p).unwrap();
            assert_eq!(
                find_primitive_element(&field).unwrap(),
                BigUint::from(g),
                "p = {}",
                p
            );
        }
    }

    #[test]
    fn test_recorded_field_generators() {
        let cases = [
            (presets::PALLAS_BASE, 5u32),
            (presets::VESTA_BASE, 5),
            (presets::SECP256K1_SCALAR, 7),
            (presets::BLS12_377_SCALAR, 22),
        ];
        for (known, g) in cases {
            let field = PrimeField::new(known.modulus()).unwrap();
            assert_eq!(
                find_primitive_element(&field).unwrap(),
                BigUint::from(g),
                "{}",
                known.name
            );
        }
    }

    #[test]
    fn test_bn254_scalar_generator() {
        let field = PrimeField::new(presets::BN254_SCALAR.modulus()).unwrap();
        assert_eq!(find_primitive_element(&field).unwrap(), BigUint::from(5u32));
    }
}
