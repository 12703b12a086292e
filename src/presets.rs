//! Well-known prime fields with precomputed group-order factorisations.
//!
//! `p - 1` for pairing-friendly scalar fields carries prime factors far beyond
//! what trial division and rho can split in reasonable time, so the
//! factorisations of the common fields are recorded here and looked up by
//! modulus before any factoring is attempted.

use num_bigint::BigUint;
use num_traits::Zero;

use crate::factor::Factorization;

/// A prime field whose multiplicative group order is known in factored form.
#[derive(Debug, Clone, Copy)]
pub struct KnownField {
    pub name: &'static str,
    /// Decimal modulus.
    pub modulus: &'static str,
    /// Decimal primes and exponents of `modulus - 1`, ascending.
    pub order_factors: &'static [(&'static str, u32)],
}

/// Scalar field of BN254 (alt_bn128).
pub const BN254_SCALAR: KnownField = KnownField {
    name: "bn254-scalar",
    modulus: "21888242871839275222246405745257275088548364400416034343698204186575808495617",
    order_factors: &[
        ("2", 28),
        ("3", 2),
        ("13", 1),
        ("29", 1),
        ("983", 1),
        ("11003", 1),
        ("237073", 1),
        ("405928799", 1),
        ("1670836401704629", 1),
        ("13818364434197438864469338081", 1),
    ],
};

/// Scalar field of BLS12-381.
pub const BLS12_381_SCALAR: KnownField = KnownField {
    name: "bls12-381-scalar",
    modulus: "52435875175126190479447740508185965837690552500527637822603658699938581184513",
    order_factors: &[
        ("2", 32),
        ("3", 1),
        ("11", 1),
        ("19", 1),
        ("10177", 1),
        ("125527", 1),
        ("859267", 1),
        ("906349", 2),
        ("2508409", 1),
        ("2529403", 1),
        ("52437899", 1),
        ("254760293", 2),
    ],
};

/// Base field of the Pallas curve (scalar field of Vesta).
pub const PALLAS_BASE: KnownField = KnownField {
    name: "pallas-base",
    modulus: "28948022309329048855892746252171976963363056481941560715954676764349967630337",
    order_factors: &[
        ("2", 32),
        ("3", 1),
        ("463", 1),
        ("539204044132271846773", 1),
        ("8999194758858563409123804352480028797519453", 1),
    ],
};

/// Base field of the Vesta curve (scalar field of Pallas).
pub const VESTA_BASE: KnownField = KnownField {
    name: "vesta-base",
    modulus: "28948022309329048855892746252171976963363056481941647379679742748393362948097",
    order_factors: &[
        ("2", 32),
        ("3", 2),
        ("1709", 1),
        ("24859", 1),
        ("1690502597179744445941507", 1),
        ("10427374428728808478656897599072717", 1),
    ],
};

/// Group order of secp256k1.
pub const SECP256K1_SCALAR: KnownField = KnownField {
    name: "secp256k1-scalar",
    modulus: "115792089237316195423570985008687907852837564279074904382605163141518161494337",
    order_factors: &[
        ("2", 6),
        ("3", 1),
        ("149", 1),
        ("631", 1),
        ("107361793816595537", 1),
        ("174723607534414371449", 1),
        ("341948486974166000522343609283189", 1),
    ],
};

/// Scalar field of BLS12-377.
pub const BLS12_377_SCALAR: KnownField = KnownField {
    name: "bls12-377-scalar",
    modulus: "8444461749428370424248824938781546531375899335154063827935233455917409239041",
    order_factors: &[
        ("2", 47),
        ("3", 1),
        ("5", 1),
        ("7", 1),
        ("13", 1),
        ("499", 1),
        ("958612291309063373", 1),
        ("9586122913090633729", 2),
    ],
};

/// Goldilocks field `2^64 - 2^32 + 1`.
pub const GOLDILOCKS: KnownField = KnownField {
    name: "goldilocks",
    modulus: "18446744069414584321",
    order_factors: &[
        ("2", 32),
        ("3", 1),
        ("5", 1),
        ("17", 1),
        ("257", 1),
        ("65537", 1),
    ],
};

pub const KNOWN_FIELDS: &[KnownField] = &[
    BN254_SCALAR,
    BLS12_381_SCALAR,
    BLS12_377_SCALAR,
    PALLAS_BASE,
    VESTA_BASE,
    SECP256K1_SCALAR,
    GOLDILOCKS,
];

/// Parses an ASCII decimal constant from this module.
fn parse_decimal(digits: &str) -> BigUint {
    digits
        .bytes()
        .filter(u8::is_ascii_digit)
        .fold(BigUint::zero(), |acc, b| acc * 10u32 + u32::from(b - b'0'))
}

impl KnownField {
    pub fn modulus(&self) -> BigUint {
        parse_decimal(self.modulus)
    }

    pub fn order_factorization(&self) -> Factorization {
        self.order_factors
            .iter()
            .map(|(prime, exp)| (parse_decimal(prime), *exp))
            .collect()
    }
}

/// Returns the recorded field for `modulus`, if any.
pub fn lookup(modulus: &BigUint) -> Option<&'static KnownField> {
    KNOWN_FIELDS.iter().find(|field| &field.modulus() == modulus)
}
