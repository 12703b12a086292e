//! Parameter assembly: the fixed pipeline that turns `(p, m, capacity,
//! security_level)` into a complete, immutable [`ParameterBundle`].

use num_bigint::BigUint;
use num_traits::One;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::DerivationConfig;
use crate::error::{RescueError, Result};
use crate::exponent::select_alpha_with_limit;
use crate::factor::Factorization;
use crate::field::PrimeField;
use crate::matrix::FieldMatrix;
use crate::mds::build_mds;
use crate::round_constants::derive_round_constants;
use crate::rounds::RoundCountEstimator;

/// Complete parameter set of one Rescue-XLIX instance.
///
/// Produced only by [`ParameterAssembler`] (or deserialisation) and read-only
/// afterwards. A bundle obtained from an untrusted source should be checked
/// with [`ParameterBundle::validate`] before use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterBundle {
    p: BigUint,
    m: usize,
    capacity: usize,
    security_level: u32,
    alpha: u64,
    alpha_inverse: BigUint,
    rounds: usize,
    mds: FieldMatrix,
    round_constants: Vec<BigUint>,
}

impl ParameterBundle {
    /// Field modulus.
    pub fn p(&self) -> &BigUint {
        &self.p
    }

    /// State width.
    pub fn m(&self) -> usize {
        self.m
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of state elements exposed to absorption and squeezing. Zero
    /// for a malformed bundle with `capacity >= m`.
    pub fn rate(&self) -> usize {
        self.m.saturating_sub(self.capacity)
    }

    pub fn security_level(&self) -> u32 {
        self.security_level
    }

    /// S-box exponent.
    pub fn alpha(&self) -> u64 {
        self.alpha
    }

    /// Inverse S-box exponent, `alpha^-1 mod (p - 1)`.
    pub fn alpha_inverse(&self) -> &BigUint {
        &self.alpha_inverse
    }

    /// Number of rounds N.
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    pub fn mds(&self) -> &FieldMatrix {
        &self.mds
    }

    /// All `2 * m * N` round constants in consumption order.
    pub fn round_constants(&self) -> &[BigUint] {
        &self.round_constants
    }

    /// The two constant blocks of `round`: the first is added after the
    /// forward half-round, the second after the backward half-round.
    pub fn round_constant_blocks(&self, round: usize) -> Option<(&[BigUint], &[BigUint])> {
        if round >= self.rounds {
            return None;
        }
        let width = self.m.checked_mul(2)?;
        let start = width.checked_mul(round)?;
        let block = self.round_constants.get(start..start.checked_add(width)?)?;
        Some(block.split_at(self.m))
    }

    /// Re-checks every structural invariant of the bundle.
    ///
    /// Verifies the state shape, the exponent pair, that the MDS matrix is an
    /// invertible `m x m` matrix over the field and that the constant sequence
    /// has length `2mN` with every element reduced. The full MDS property is
    /// exponential in `m` and is left to [`FieldMatrix::is_mds`].
    pub fn validate(&self) -> Result<()> {
        validate_shape(&self.p, self.m, self.capacity, self.security_level)?;
        let field = PrimeField::new(self.p.clone())?;

        let group_order = field.group_order();
        if (BigUint::from(self.alpha) * &self.alpha_inverse) % &group_order != BigUint::one()
            || self.alpha_inverse >= group_order
        {
            return Err(RescueError::InvalidParameters(format!(
                "alpha {} and alpha_inverse {} are not inverse modulo p - 1",
                self.alpha, self.alpha_inverse
            )));
        }

        if self.rounds == 0 {
            return Err(RescueError::InvalidParameters(
                "round count must be positive".to_string(),
            ));
        }

        if self.mds.rows != self.m || self.mds.cols != self.m {
            return Err(RescueError::InvalidDimension {
                expected: self.m,
                got: self.mds.rows.max(self.mds.cols),
            });
        }
        if self.mds.data.iter().flatten().any(|x| x >= &self.p) {
            return Err(RescueError::InvalidParameters(
                "MDS entry outside the field".to_string(),
            ));
        }
        if !self.mds.is_invertible(&field)? {
            return Err(RescueError::SingularMatrix {
                rank: self.mds.rank(&field)?,
                required: self.m,
            });
        }

        let expected = self
            .m
            .checked_mul(2)
            .and_then(|width| width.checked_mul(self.rounds))
            .ok_or_else(|| {
                RescueError::InvalidParameters(format!(
                    "round count {} overflows the constant sequence length",
                    self.rounds
                ))
            })?;
        if self.round_constants.len() != expected {
            return Err(RescueError::InvalidDimension {
                expected,
                got: self.round_constants.len(),
            });
        }
        if self.round_constants.iter().any(|c| c >= &self.p) {
            return Err(RescueError::InvalidParameters(
                "round constant outside the field".to_string(),
            ));
        }

        Ok(())
    }
}

/// Input tuple for one derivation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParameterRequest {
    pub p: BigUint,
    pub m: usize,
    pub capacity: usize,
    pub security_level: u32,
    /// Factorisation of `p - 1`, for moduli that are neither recorded in
    /// [`crate::presets`] nor factorable within the configured budget.
    #[serde(default)]
    pub order_factors: Option<Factorization>,
}

impl ParameterRequest {
    pub fn new(p: BigUint, m: usize, capacity: usize, security_level: u32) -> Self {
        Self {
            p,
            m,
            capacity,
            security_level,
            order_factors: None,
        }
    }

    pub fn with_order_factors(mut self, factors: Factorization) -> Self {
        self.order_factors = Some(factors);
        self
    }
}

fn validate_shape(p: &BigUint, m: usize, capacity: usize, security_level: u32) -> Result<()> {
    if p <= &BigUint::from(2u32) {
        return Err(RescueError::InvalidParameters(format!(
            "modulus must be a prime greater than 2, got {}",
            p
        )));
    }
    if m < 2 {
        return Err(RescueError::InvalidParameters(format!(
            "state width must be at least 2, got {}",
            m
        )));
    }
    if capacity == 0 || capacity >= m {
        return Err(RescueError::InvalidParameters(format!(
            "capacity must satisfy 0 < capacity < m = {}, got {}",
            m, capacity
        )));
    }
    if security_level == 0 {
        return Err(RescueError::InvalidParameters(
            "security level must be positive".to_string(),
        ));
    }
    Ok(())
}

/// Derives parameter bundles.
///
/// Runs the fixed pipeline exponent selection -> round count -> MDS matrix ->
/// round constants. The assembler holds only configuration, so one instance
/// can serve any number of derivations, concurrently.
#[derive(Debug, Clone)]
pub struct ParameterAssembler {
    config: DerivationConfig,
    estimator: RoundCountEstimator,
}

impl ParameterAssembler {
    /// Creates an assembler; `None` selects [`DerivationConfig::default`].
    ///
    /// # Errors
    /// * `InvalidParameters` if the configuration fails validation
    pub fn new(config: Option<DerivationConfig>) -> Result<Self> {
        let config = config.unwrap_or_default();
        config.validate()?;
        let estimator = RoundCountEstimator::new(config.clone());
        Ok(Self { config, estimator })
    }

    pub fn config(&self) -> &DerivationConfig {
        &self.config
    }

    /// Derives the bundle for one parameter tuple.
    ///
    /// # Arguments
    /// * `p` - Prime modulus (primality is a precondition)
    /// * `m` - State width, at least 2
    /// * `capacity` - Capacity, `0 < capacity < m`
    /// * `security_level` - Target security in bits
    ///
    /// # Errors
    /// Any component error is returned unchanged; no partial bundle is built.
    pub fn assemble(
        &self,
        p: BigUint,
        m: usize,
        capacity: usize,
        security_level: u32,
    ) -> Result<ParameterBundle> {
        validate_shape(&p, m, capacity, security_level)?;
        let field = PrimeField::with_config(p, self.config.clone())?;
        self.assemble_in(&field, m, capacity, security_level)
    }

    /// Derives the bundle over an existing field.
    ///
    /// The field's factorisation of `p - 1` is used as is, so a field built
    /// with [`PrimeField::with_factored_order`] never has its group order
    /// factored here.
    pub fn assemble_in(
        &self,
        field: &PrimeField,
        m: usize,
        capacity: usize,
        security_level: u32,
    ) -> Result<ParameterBundle> {
        validate_shape(field.modulus(), m, capacity, security_level)?;

        let (alpha, alpha_inverse) =
            select_alpha_with_limit(field.modulus(), self.config.alpha_search_limit)?;
        let rounds = self.estimator.estimate(m, capacity, security_level, alpha)?;
        let mds = build_mds(&field, m)?;
        let round_constants =
            derive_round_constants(field.modulus(), m, capacity, security_level, rounds)?;

        Ok(ParameterBundle {
            p: field.modulus().clone(),
            m,
            capacity,
            security_level,
            alpha,
            alpha_inverse,
            rounds,
            mds,
            round_constants,
        })
    }

    pub fn assemble_request(&self, request: &ParameterRequest) -> Result<ParameterBundle> {
        validate_shape(&request.p, request.m, request.capacity, request.security_level)?;
        let mut field = PrimeField::with_config(request.p.clone(), self.config.clone())?;
        if let Some(factors) = &request.order_factors {
            field = field.with_factored_order(factors.clone())?;
        }
        self.assemble_in(&field, request.m, request.capacity, request.security_level)
    }

    /// Derives independent tuples in parallel. Output order matches `requests`.
    pub fn assemble_many(&self, requests: &[ParameterRequest]) -> Vec<Result<ParameterBundle>> {
        requests
            .par_iter()
            .map(|request| self.assemble_request(request))
            .collect()
    }
}

/// Derives the bundle for `(p, m, capacity, security_level)` with default bounds.
pub fn assemble(p: BigUint, m: usize, capacity: usize, security_level: u32) -> Result<ParameterBundle> {
    ParameterAssembler::new(None)?.assemble(p, m, capacity, security_level)
}

/// Parallel [`assemble`] over many tuples with default bounds.
pub fn assemble_many(requests: &[ParameterRequest]) -> Result<Vec<Result<ParameterBundle>>> {
    Ok(ParameterAssembler::new(None)?.assemble_many(requests))
}
