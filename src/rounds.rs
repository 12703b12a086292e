//! Round count selection against Groebner-basis attacks.
//!
//! For a trial depth `l` the attack is modelled by a polynomial system in
//! `v(l) = m(l-1) + rate` variables of degree of regularity
//! `d_con(l) = floor((alpha-1) m (l-1) / 2) + 2`; its cost is taken as
//! `C(v + d_con, v)^2`. The smallest depth whose cost exceeds
//! `2^security_level` is floored and padded by the configured margin.

use num_bigint::BigUint;
use num_traits::One;

use crate::config::DerivationConfig;
use crate::error::{RescueError, Result};

/// Binomial coefficient `C(n, k)`, exact.
pub fn binomial(n: u64, k: u64) -> BigUint {
    if k > n {
        return BigUint::from(0u32);
    }
    let k = k.min(n - k);
    (0..k).fold(BigUint::one(), |acc, i| acc * (n - i) / (i + 1))
}

/// Searches the round count for one parameter set.
#[derive(Debug, Clone)]
pub struct RoundCountEstimator {
    config: DerivationConfig,
}

impl Default for RoundCountEstimator {
    fn default() -> Self {
        Self {
            config: DerivationConfig::default(),
        }
    }
}

impl RoundCountEstimator {
    pub fn new(config: DerivationConfig) -> Self {
        Self { config }
    }

    /// Variables and degree of the attack system at `depth`, or `None` on overflow.
    fn system_shape(m: u64, rate: u64, alpha: u64, depth: u64) -> Option<(u64, u64)> {
        let steps = m.checked_mul(depth - 1)?;
        let variables = steps.checked_add(rate)?;
        let degree = (alpha - 1).checked_mul(steps)? / 2 + 2;
        Some((variables, degree))
    }

    /// Smallest trial depth whose attack cost exceeds `2^security_level`.
    pub fn minimal_depth(
        &self,
        m: usize,
        capacity: usize,
        security_level: u32,
        alpha: u64,
    ) -> Result<usize> {
        if m < 2 || capacity == 0 || capacity >= m {
            return Err(RescueError::InvalidParameters(format!(
                "need m >= 2 and 0 < capacity < m, got m = {}, capacity = {}",
                m, capacity
            )));
        }
        if alpha < 3 {
            return Err(RescueError::InvalidParameters(format!(
                "S-box exponent must be at least 3, got {}",
                alpha
            )));
        }

        let rate = (m - capacity) as u64;
        let target = BigUint::one() << security_level;

        for depth in 1..=self.config.max_round_depth {
            let (variables, degree) = Self::system_shape(m as u64, rate, alpha, depth as u64)
                .ok_or_else(|| {
                    RescueError::InvalidParameters(format!(
                        "attack system size overflows at depth {}",
                        depth
                    ))
                })?;
            let cost = binomial(variables + degree, variables);
            if &cost * &cost > target {
                return Ok(depth);
            }
        }

        Err(RescueError::SecurityBoundUnreachable {
            security_level,
            max_depth: self.config.max_round_depth,
        })
    }

    /// Final round count `ceil(margin * max(min_rounds, depth))`.
    pub fn estimate(
        &self,
        m: usize,
        capacity: usize,
        security_level: u32,
        alpha: u64,
    ) -> Result<usize> {
        let depth = self.minimal_depth(m, capacity, security_level, alpha)?;
        Ok(self.config.rounds_for_depth(depth))
    }
}

/// Round count with the default search window (24), floor (5) and margin (3/2).
///
/// The field modulus does not enter the bound; only the state shape, the
/// S-box exponent and the security level do.
pub fn estimate_rounds(m: usize, capacity: usize, security_level: u32, alpha: u64) -> Result<usize> {
    RoundCountEstimator::default().estimate(m, capacity, security_level, alpha)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_binomial() {
        assert_eq!(binomial(5, 2), BigUint::from(10u32));
        assert_eq!(binomial(10, 0), BigUint::one());
        assert_eq!(binomial(10, 10), BigUint::one());
        assert_eq!(binomial(3, 4), BigUint::from(0u32));
        assert_eq!(
            binomial(100, 50).to_string(),
            "100891344545564193334812497256"
        );
    }

    #[test]
    fn test_reference_round_counts() {
        // alpha = 5 (BN254 scalar field)
        assert_eq!(estimate_rounds(2, 1, 128, 5).unwrap(), 20);
        assert_eq!(estimate_rounds(3, 1, 128, 5).unwrap(), 14);
        assert_eq!(estimate_rounds(3, 2, 128, 5).unwrap(), 14);
        assert_eq!(estimate_rounds(4, 2, 128, 5).unwrap(), 11);
        assert_eq!(estimate_rounds(2, 1, 80, 5).unwrap(), 14);
        // alpha = 3 and alpha = 7
        assert_eq!(estimate_rounds(2, 1, 128, 3).unwrap(), 27);
        assert_eq!(estimate_rounds(3, 1, 128, 3).unwrap(), 18);
        assert_eq!(estimate_rounds(2, 1, 128, 7).unwrap(), 17);
        assert_eq!(estimate_rounds(3, 1, 128, 7).unwrap(), 12);
    }

    #[test]
    fn test_floor_of_five_rounds() {
        // Depth 1 already suffices for one bit of security.
        let estimator = RoundCountEstimator::default();
        assert_eq!(estimator.minimal_depth(2, 1, 1, 5).unwrap(), 1);
        assert_eq!(estimator.estimate(2, 1, 1, 5).unwrap(), 8);
    }

    #[test]
    fn test_unreachable_security_level() {
        assert_eq!(
            estimate_rounds(2, 1, 256, 5),
            Err(RescueError::SecurityBoundUnreachable {
                security_level: 256,
                max_depth: 24
            })
        );

        let wide = RoundCountEstimator::new(DerivationConfig {
            max_round_depth: 64,
            ..DerivationConfig::default()
        });
        assert_eq!(wide.estimate(2, 1, 256, 5).unwrap(), 38);
    }

    #[test]
    fn test_invalid_shapes() {
        assert!(estimate_rounds(1, 0, 128, 5).is_err());
        assert!(estimate_rounds(2, 0, 128, 5).is_err());
        assert!(estimate_rounds(2, 2, 128, 5).is_err());
        assert!(estimate_rounds(2, 1, 128, 2).is_err());
    }

    proptest! {
        #[test]
        fn test_monotone_in_security_level(
            m in 2usize..6,
            capacity_seed in 0usize..5,
            alpha in prop::sample::select(vec![3u64, 5, 7, 11]),
            low in 1u32..160,
            step in 0u32..40
        ) {
            let capacity = 1 + capacity_seed % (m - 1);
            let high = low + step;
            let lower = estimate_rounds(m, capacity, low, alpha);
            let higher = estimate_rounds(m, capacity, high, alpha);
            match (lower, higher) {
                (Ok(a), Ok(b)) => prop_assert!(a <= b),
                (Ok(_), Err(RescueError::SecurityBoundUnreachable { .. })) => {}
                (Err(RescueError::SecurityBoundUnreachable { .. }), Err(_)) => {}
                (l, h) => prop_assert!(false, "unexpected {:?} / {:?}", l, h),
            }
        }
    }
}
