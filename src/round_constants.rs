//! Round constant derivation.
//!
//! Constants are squeezed from SHAKE256 over a domain separation string that
//! names the permutation and its four scalar parameters. Each constant uses
//! one byte more than `p` needs; the resulting modular bias is accepted.

use digest::{ExtendableOutput, Update, XofReader};
use num_bigint::BigUint;
use sha3::Shake256;

use crate::error::{RescueError, Result};

/// Permutation name embedded in the seed string.
pub const DOMAIN_TAG: &str = "Rescue-XLIX";

/// The ASCII seed `Rescue-XLIX(p,m,capacity,security_level)`, integers in decimal.
pub fn seed_string(p: &BigUint, m: usize, capacity: usize, security_level: u32) -> String {
    format!("{}({},{},{},{})", DOMAIN_TAG, p, m, capacity, security_level)
}

/// Bytes consumed per constant: `ceil(bits(p) / 8) + 1`.
pub fn byte_width(p: &BigUint) -> usize {
    (p.bits() as usize + 7) / 8 + 1
}

/// Derives the `2 * m * rounds` round constants.
///
/// # Arguments
/// * `p` - Field modulus
/// * `m` - State width
/// * `capacity` - Capacity, part of the seed only
/// * `security_level` - Security level in bits, part of the seed only
/// * `rounds` - Number of rounds N
///
/// # Returns
/// * `Result<Vec<BigUint>>` - Constants in consumption order: for round `i`,
///   entries `2mi..2mi+m` then `2mi+m..2m(i+1)`
///
/// # Implementation Details
/// The XOF output is cut into consecutive `byte_width(p)` chunks; each chunk
/// is read as an unsigned little-endian integer and reduced modulo `p`.
pub fn derive_round_constants(
    p: &BigUint,
    m: usize,
    capacity: usize,
    security_level: u32,
    rounds: usize,
) -> Result<Vec<BigUint>> {
    if p <= &BigUint::from(1u32) {
        return Err(RescueError::InvalidParameters(format!(
            "modulus {} cannot reduce round constants",
            p
        )));
    }

    let count = m
        .checked_mul(rounds)
        .and_then(|n| n.checked_mul(2))
        .ok_or_else(|| {
            RescueError::InvalidParameters(format!(
                "2 * {} * {} round constants overflow",
                m, rounds
            ))
        })?;
    let width = byte_width(p);
    let total = width.checked_mul(count).ok_or_else(|| {
        RescueError::InvalidParameters(format!("{} bytes of XOF output overflow", count))
    })?;

    let seed = seed_string(p, m, capacity, security_level);
    let mut hasher = Shake256::default();
    hasher.update(seed.as_bytes());
    let mut reader = hasher.finalize_xof();

    let mut bytes = vec![0u8; total];
    reader.read(&mut bytes);

    Ok(bytes
        .chunks_exact(width)
        .map(|chunk| BigUint::from_bytes_le(chunk) % p)
        .collect())
}
