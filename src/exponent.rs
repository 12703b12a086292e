//! S-box exponent selection.
//!
//! `alpha` is the smallest integer from 3 upwards that is coprime to `p - 1`,
//! which makes `x -> x^alpha` a permutation of the field; its inverse
//! exponent undoes it.

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{One, ToPrimitive, Zero};

use crate::error::{RescueError, Result};

/// Default exclusive bound for the exponent scan.
pub const DEFAULT_ALPHA_SEARCH_LIMIT: u64 = 1 << 16;

/// Returns `(gcd(a, b), s)` with `s * a = gcd (mod b)`.
fn extended_gcd(a: &BigInt, b: &BigInt) -> (BigInt, BigInt) {
    let (mut old_r, mut r) = (a.clone(), b.clone());
    let (mut old_s, mut s) = (BigInt::one(), BigInt::zero());

    while !r.is_zero() {
        let q = &old_r / &r;
        let next_r = &old_r - &q * &r;
        old_r = std::mem::replace(&mut r, next_r);
        let next_s = &old_s - &q * &s;
        old_s = std::mem::replace(&mut s, next_s);
    }

    (old_r, old_s)
}

/// Inverse of `a` modulo `n` when `gcd(a, n) = 1`.
pub fn mod_inverse(a: &BigUint, n: &BigUint) -> Option<BigUint> {
    if n.is_zero() {
        return None;
    }
    let n_signed = BigInt::from_biguint(Sign::Plus, n.clone());
    let (g, s) = extended_gcd(&BigInt::from_biguint(Sign::Plus, a.clone()), &n_signed);
    if !g.is_one() {
        return None;
    }
    let reduced = ((s % &n_signed) + &n_signed) % &n_signed;
    reduced.to_biguint()
}

/// Selects the S-box exponent for `GF(p)`.
///
/// `alpha` is the smallest integer `>= 3` coprime to `p - 1`, so `x -> x^alpha`
/// permutes the field; `alpha_inverse` is its inverse modulo `p - 1`, in
/// `[0, p - 1)`.
pub fn select_alpha(p: &BigUint) -> Result<(u64, BigUint)> {
    select_alpha_with_limit(p, DEFAULT_ALPHA_SEARCH_LIMIT)
}

/// [`select_alpha`] with an explicit exclusive bound on the candidates; the
/// scan also never reaches `p`.
///
/// # Errors
/// * `InvalidParameters` if `p <= 2`
/// * `Domain` if no candidate below the bound is coprime to `p - 1`
pub fn select_alpha_with_limit(p: &BigUint, search_limit: u64) -> Result<(u64, BigUint)> {
    if p <= &BigUint::from(2u32) {
        return Err(RescueError::InvalidParameters(format!(
            "exponent selection needs p > 2, got {}",
            p
        )));
    }

    let group_order = p - 1u32;
    let bound = p.to_u64().map_or(search_limit, |p| p.min(search_limit));

    for alpha in 3..bound {
        if let Some(alpha_inverse) = mod_inverse(&BigUint::from(alpha), &group_order) {
            return Ok((alpha, alpha_inverse));
        }
    }

    Err(RescueError::Domain(format!(
        "no exponent below {} is coprime to p - 1 = {}",
        bound, group_order
    )))
}
