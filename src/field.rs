//! Exact modular arithmetic over a prime field `GF(p)`.
//!
//! Elements are plain [`BigUint`] values kept in `[0, p)`; every operation
//! reduces its result, so there is no overflow or wraparound at any size of
//! `p`. The factorisation of the group order `p - 1` is only needed for order
//! queries and is computed lazily the first time one is made.

use std::sync::OnceLock;

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::config::DerivationConfig;
use crate::error::{RescueError, Result};
use crate::factor::{self, Factorization};
use crate::presets;

/// The prime field of integers modulo `p`.
///
/// Primality of `p` is a precondition and is not checked here; the derived
/// results are meaningless for composite moduli.
#[derive(Debug, Clone)]
pub struct PrimeField {
    modulus: BigUint,
    config: DerivationConfig,
    order_factors: OnceLock<Factorization>,
}

impl PartialEq for PrimeField {
    fn eq(&self, other: &Self) -> bool {
        self.modulus == other.modulus
    }
}

impl Eq for PrimeField {}

impl PrimeField {
    /// Creates the field `GF(p)` with default search bounds.
    pub fn new(modulus: BigUint) -> Result<Self> {
        Self::with_config(modulus, DerivationConfig::default())
    }

    /// Creates the field with explicit bounds for factoring `p - 1`.
    pub fn with_config(modulus: BigUint, config: DerivationConfig) -> Result<Self> {
        if modulus <= BigUint::from(2u32) {
            return Err(RescueError::InvalidParameters(format!(
                "field modulus must be an odd prime greater than 2, got {}",
                modulus
            )));
        }
        Ok(Self {
            modulus,
            config,
            order_factors: OnceLock::new(),
        })
    }

    /// Creates the field with a caller-supplied factorisation of `p - 1`.
    pub fn with_order_factors(modulus: BigUint, factors: Factorization) -> Result<Self> {
        Self::new(modulus)?.with_factored_order(factors)
    }

    /// Replaces the lazily computed factorisation of `p - 1` with `factors`.
    ///
    /// The factorisation is checked: its product must equal `p - 1` and every
    /// listed factor must pass the probable-prime test.
    pub fn with_factored_order(self, mut factors: Factorization) -> Result<Self> {
        if factor::factorization_product(&factors) != self.group_order() {
            return Err(RescueError::InvalidParameters(format!(
                "supplied factorisation does not multiply to p - 1 = {}",
                self.group_order()
            )));
        }
        if let Some((composite, _)) = factors
            .iter()
            .find(|(prime, _)| !factor::is_probable_prime(prime))
        {
            return Err(RescueError::InvalidParameters(format!(
                "supplied factor {} is not prime",
                composite
            )));
        }

        factors.sort();
        Ok(Self {
            order_factors: OnceLock::from(factors),
            ..self
        })
    }

    /// Convenience constructor for small test fields.
    pub fn from_u64(modulus: u64) -> Result<Self> {
        Self::new(BigUint::from(modulus))
    }

    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    /// Order of the multiplicative group, `p - 1`.
    pub fn group_order(&self) -> BigUint {
        &self.modulus - 1u32
    }

    /// Bit length of `p`.
    pub fn bit_length(&self) -> u64 {
        self.modulus.bits()
    }

    /// Prime factorisation of `p - 1`, from the known-field table when `p` is
    /// recorded there and by factoring otherwise.
    pub fn order_factors(&self) -> Result<&Factorization> {
        if let Some(factors) = self.order_factors.get() {
            return Ok(factors);
        }
        let factors = match presets::lookup(&self.modulus) {
            Some(known) => known.order_factorization(),
            None => factor::factorize(&self.group_order(), &self.config)?,
        };
        Ok(self.order_factors.get_or_init(|| factors))
    }

    pub fn reduce(&self, x: &BigUint) -> BigUint {
        x % &self.modulus
    }

    pub fn add(&self, a: &BigUint, b: &BigUint) -> BigUint {
        (a + b) % &self.modulus
    }

    pub fn sub(&self, a: &BigUint, b: &BigUint) -> BigUint {
        let b = self.reduce(b);
        (a + &self.modulus - b) % &self.modulus
    }

    pub fn neg(&self, a: &BigUint) -> BigUint {
        self.sub(&BigUint::zero(), a)
    }

    pub fn mul(&self, a: &BigUint, b: &BigUint) -> BigUint {
        (a * b) % &self.modulus
    }

    pub fn pow(&self, base: &BigUint, exp: &BigUint) -> BigUint {
        base.modpow(exp, &self.modulus)
    }

    /// Multiplicative inverse by Fermat's little theorem, `a^(p-2)`.
    pub fn inverse(&self, a: &BigUint) -> Result<BigUint> {
        let a = self.reduce(a);
        if a.is_zero() {
            return Err(RescueError::DivisionByZero);
        }
        let exp = &self.modulus - 2u32;
        Ok(a.modpow(&exp, &self.modulus))
    }

    pub fn div(&self, a: &BigUint, b: &BigUint) -> Result<BigUint> {
        let inv = self.inverse(b)?;
        Ok(self.mul(a, &inv))
    }

    /// Smallest `k > 0` with `x^k = 1 (mod p)`.
    ///
    /// Starts from `p - 1` and strips each prime factor `q` of the group order
    /// for as long as `x^(order / q)` is still one.
    ///
    /// # Errors
    /// * `Domain` if `x = 0 (mod p)`, which has no multiplicative order
    /// * `Domain` if `p - 1` cannot be factored within the configured budget
    pub fn multiplicative_order(&self, x: &BigUint) -> Result<BigUint> {
        let x = self.reduce(x);
        if x.is_zero() {
            return Err(RescueError::Domain(
                "multiplicative order of zero is undefined".to_string(),
            ));
        }

        let mut order = self.group_order();
        for (prime, exp) in self.order_factors()? {
            for _ in 0..*exp {
                let candidate = &order / prime;
                if self.pow(&x, &candidate).is_one() {
                    order = candidate;
                } else {
                    break;
                }
            }
        }
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn big(n: u64) -> BigUint {
        BigUint::from(n)
    }

    fn naive_order(x: u64, p: u64) -> u64 {
        let mut acc = x % p;
        let mut k = 1;
        while acc != 1 {
            acc = acc * x % p;
            k += 1;
        }
        k
    }

    #[test]
    fn test_basic_arithmetic() {
        let f = PrimeField::from_u64(101).unwrap();
        assert_eq!(f.add(&big(60), &big(50)), big(9));
        assert_eq!(f.sub(&big(3), &big(10)), big(94));
        assert_eq!(f.sub(&big(3), &big(204)), big(1));
        assert_eq!(f.sub(&big(3), &big(206)), big(100));
        assert_eq!(f.neg(&big(1)), big(100));
        assert_eq!(f.neg(&big(0)), big(0));
        assert_eq!(f.mul(&big(20), &big(30)), big(95));
        assert_eq!(f.pow(&big(2), &big(100)), big(1));
        assert_eq!(f.inverse(&big(2)).unwrap(), big(51));
        assert_eq!(f.div(&big(1), &big(2)).unwrap(), big(51));
    }

    #[test]
    fn test_division_by_zero() {
        let f = PrimeField::from_u64(13).unwrap();
        assert_eq!(f.inverse(&big(0)), Err(RescueError::DivisionByZero));
        assert_eq!(f.div(&big(5), &big(26)), Err(RescueError::DivisionByZero));
    }

    #[test]
    fn test_order_of_zero_is_domain_error() {
        let f = PrimeField::from_u64(13).unwrap();
        assert!(matches!(
            f.multiplicative_order(&big(0)),
            Err(RescueError::Domain(_))
        ));
        assert!(matches!(
            f.multiplicative_order(&big(13)),
            Err(RescueError::Domain(_))
        ));
    }

    #[test]
    fn test_rejects_tiny_modulus() {
        assert!(PrimeField::from_u64(2).is_err());
        assert!(PrimeField::from_u64(0).is_err());
        assert!(PrimeField::from_u64(3).is_ok());
    }

    #[test]
    fn test_order_in_bn254_scalar_field() {
        let f = PrimeField::new(presets::BN254_SCALAR.modulus()).unwrap();
        let five = big(5);
        assert_eq!(f.multiplicative_order(&five).unwrap(), f.group_order());

        let square = f.mul(&five, &five);
        assert_eq!(f.multiplicative_order(&square).unwrap(), f.group_order() / 2u32);

        // 5^((p-1)/2^28) generates the 2-adic subgroup.
        let root = f.pow(&five, &(f.group_order() >> 28u32));
        assert_eq!(f.multiplicative_order(&root).unwrap(), big(1 << 28));

        assert_eq!(f.multiplicative_order(&big(1)).unwrap(), big(1));
        assert_eq!(f.multiplicative_order(&f.neg(&big(1))).unwrap(), big(2));
    }

    #[test]
    fn test_supplied_factorisation_is_validated() {
        let good = vec![(big(2), 2), (big(5), 2)];
        let f = PrimeField::with_order_factors(big(101), good).unwrap();
        assert_eq!(f.multiplicative_order(&big(2)).unwrap(), big(100));

        let wrong_product = vec![(big(2), 2), (big(5), 1)];
        assert!(PrimeField::with_order_factors(big(101), wrong_product).is_err());

        let composite = vec![(big(4), 1), (big(25), 1)];
        assert!(PrimeField::with_order_factors(big(101), composite).is_err());
    }

    #[test]
    fn test_factored_order_replaces_factoring() {
        // Without rho, trial division up to 3 leaves 515 = 5 * 103 unsplit.
        let config = DerivationConfig {
            trial_division_bound: 3,
            rho_iteration_budget: 0,
            ..DerivationConfig::default()
        };
        let bare = PrimeField::with_config(big(1031), config.clone()).unwrap();
        assert!(matches!(
            bare.multiplicative_order(&big(14)),
            Err(RescueError::Domain(_))
        ));

        let factors = vec![(big(103), 1), (big(2), 1), (big(5), 1)];
        let f = PrimeField::with_config(big(1031), config)
            .unwrap()
            .with_factored_order(factors)
            .unwrap();
        assert_eq!(
            f.order_factors().unwrap(),
            &vec![(big(2), 1), (big(5), 1), (big(103), 1)]
        );
        assert_eq!(f.multiplicative_order(&big(14)).unwrap(), big(naive_order(14, 1031)));
    }

    proptest! {
        #[test]
        fn test_order_matches_naive(
            p in prop::sample::select(vec![3u64, 5, 7, 11, 13, 17, 97, 101, 257, 65537]),
            x in 1u64..100_000
        ) {
            prop_assume!(x % p != 0);
            let f = PrimeField::from_u64(p).unwrap();
            let order = f.multiplicative_order(&big(x)).unwrap();
            prop_assert_eq!(order, big(naive_order(x, p)));
        }

        #[test]
        fn test_field_axioms(a in 0u64..1009, b in 0u64..1009, c in 0u64..1009) {
            let f = PrimeField::from_u64(1009).unwrap();
            let (a, b, c) = (big(a), big(b), big(c));

            prop_assert_eq!(f.add(&a, &b), f.add(&b, &a));
            prop_assert_eq!(f.mul(&a, &b), f.mul(&b, &a));
            prop_assert_eq!(
                f.mul(&a, &f.add(&b, &c)),
                f.add(&f.mul(&a, &b), &f.mul(&a, &c))
            );
            prop_assert_eq!(f.add(&f.sub(&a, &b), &b), a.clone());
            if !a.is_zero() {
                prop_assert_eq!(f.mul(&a, &f.inverse(&a).unwrap()), big(1));
            }
        }
    }
}
