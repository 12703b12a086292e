//! Integer factorisation of multiplicative group orders.
//!
//! Multiplicative orders in `GF(p)` are computed from the prime factorisation of
//! `p - 1`. Small factors are removed by trial division, remaining cofactors
//! are tested with a deterministic-witness Miller-Rabin test and split with
//! Brent's variant of Pollard's rho. Every loop here is bounded by the
//! [`DerivationConfig`]; running out of budget is reported as a domain error.

use std::collections::BTreeMap;

use num_bigint::BigUint;
use num_traits::{One, ToPrimitive, Zero};

use crate::config::DerivationConfig;
use crate::error::{RescueError, Result};

/// Fixed Miller-Rabin witnesses. Deterministic for every n < 3.3 * 10^24 and a
/// strong probable-prime test beyond that.
const MILLER_RABIN_WITNESSES: [u32; 20] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71,
];

/// Number of rho steps folded into one gcd.
const RHO_BATCH: u64 = 128;

/// Prime factorisation as sorted `(prime, exponent)` pairs.
pub type Factorization = Vec<(BigUint, u32)>;

/// Miller-Rabin probable-prime test with fixed witnesses; no randomness, so
/// the answer is reproducible.
pub fn is_probable_prime(n: &BigUint) -> bool {
    let two = BigUint::from(2u32);
    if n < &two {
        return false;
    }

    for &w in MILLER_RABIN_WITNESSES.iter() {
        let w = BigUint::from(w);
        if n == &w {
            return true;
        }
        if (n % &w).is_zero() {
            return false;
        }
    }

    let n_minus_one = n - 1u32;
    let r = n_minus_one.trailing_zeros().unwrap_or(0);
    let d = &n_minus_one >> r;

    'witness: for &w in MILLER_RABIN_WITNESSES.iter() {
        let mut x = BigUint::from(w).modpow(&d, n);
        if x.is_one() || x == n_minus_one {
            continue;
        }
        for _ in 1..r {
            x = &x * &x % n;
            if x == n_minus_one {
                continue 'witness;
            }
        }
        return false;
    }

    true
}

/// Euclid's algorithm.
pub(crate) fn gcd(a: &BigUint, b: &BigUint) -> BigUint {
    let mut a = a.clone();
    let mut b = b.clone();
    while !b.is_zero() {
        let t = &a % &b;
        a = b;
        b = t;
    }
    a
}

fn abs_diff(x: &BigUint, y: &BigUint) -> BigUint {
    if x >= y {
        x - y
    } else {
        y - x
    }
}

/// Finds a non-trivial divisor of the odd composite `n` with Brent's cycle
/// detection. `budget` is decremented by every polynomial evaluation.
fn pollard_brent(n: &BigUint, budget: &mut u64) -> Result<BigUint> {
    let one = BigUint::one();

    for c in 1u32.. {
        let c = BigUint::from(c);
        let step = |x: &BigUint| (x * x + &c) % n;

        let mut y = BigUint::from(2u32);
        let mut x = y.clone();
        let mut ys = y.clone();
        let mut q = one.clone();
        let mut g = one.clone();
        let mut r: u64 = 1;

        while g.is_one() {
            x = y.clone();
            spend(budget, r, n)?;
            for _ in 0..r {
                y = step(&y);
            }

            let mut k = 0;
            while k < r && g.is_one() {
                ys = y.clone();
                let batch = RHO_BATCH.min(r - k);
                spend(budget, batch, n)?;
                for _ in 0..batch {
                    y = step(&y);
                    q = q * abs_diff(&x, &y) % n;
                }
                g = gcd(&q, n);
                k += batch;
            }
            r *= 2;
        }

        if &g == n {
            // The batch overshot; replay it one step at a time.
            loop {
                spend(budget, 1, n)?;
                ys = step(&ys);
                g = gcd(&abs_diff(&x, &ys), n);
                if !g.is_one() {
                    break;
                }
            }
        }

        if &g != n {
            return Ok(g);
        }
    }

    Err(RescueError::Domain(format!(
        "exhausted polynomial constants while factoring {}",
        n
    )))
}

fn spend(budget: &mut u64, steps: u64, n: &BigUint) -> Result<()> {
    if *budget < steps {
        return Err(RescueError::Domain(format!(
            "factorisation budget exhausted before splitting {}",
            n
        )));
    }
    *budget -= steps;
    Ok(())
}

/// Factors `n` completely.
///
/// # Arguments
/// * `n` - Integer to factor (must be non-zero)
/// * `config` - Supplies the trial division bound and the rho iteration budget
///
/// # Returns
/// * `Result<Factorization>` - Primes in ascending order with their exponents
///
/// # Errors
/// * `Domain` if `n` is zero or a cofactor cannot be split within the budget
pub fn factorize(n: &BigUint, config: &DerivationConfig) -> Result<Factorization> {
    if n.is_zero() {
        return Err(RescueError::Domain("cannot factor zero".to_string()));
    }

    let mut factors: BTreeMap<BigUint, u32> = BTreeMap::new();
    let mut rest = n.clone();

    // Trial division by 2 and then by odd candidates.
    let mut divisor: u64 = 2;
    while divisor <= config.trial_division_bound {
        let d = BigUint::from(divisor);
        if &d * &d > rest {
            break;
        }
        while (&rest % divisor).to_u64() == Some(0) {
            rest /= divisor;
            *factors.entry(d.clone()).or_insert(0) += 1;
        }
        divisor += if divisor == 2 { 1 } else { 2 };
    }

    let mut budget = config.rho_iteration_budget;
    let mut pending = Vec::new();
    if !rest.is_one() {
        pending.push(rest);
    }

    while let Some(composite) = pending.pop() {
        if composite.is_one() {
            continue;
        }
        if is_probable_prime(&composite) {
            *factors.entry(composite).or_insert(0) += 1;
            continue;
        }
        let divisor = pollard_brent(&composite, &mut budget)?;
        let cofactor = &composite / &divisor;
        pending.push(divisor);
        pending.push(cofactor);
    }

    Ok(factors.into_iter().collect())
}

/// Multiplies a factorisation back out.
pub fn factorization_product(factors: &[(BigUint, u32)]) -> BigUint {
    factors
        .iter()
        .fold(BigUint::one(), |acc, (prime, exp)| acc * prime.pow(*exp))
}
