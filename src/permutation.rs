//! The Rescue-XLIX permutation and the sponge hash built on it.
//!
//! Each round applies a forward half-round (`x^alpha`, MDS, first constant
//! block) and a backward half-round (`x^(1/alpha)`, MDS, second constant
//! block). The sponge absorbs `rate` elements per permutation call and
//! squeezes the first `rate` state elements.

use num_bigint::BigUint;
use num_traits::Zero;

use crate::error::{RescueError, Result};
use crate::field::PrimeField;
use crate::params::ParameterBundle;

/// The keyless permutation defined by a parameter bundle.
#[derive(Debug, Clone)]
pub struct RescuePermutation<'a> {
    params: &'a ParameterBundle,
    field: PrimeField,
    alpha: BigUint,
}

impl<'a> RescuePermutation<'a> {
    /// Wraps `params` after checking it with [`ParameterBundle::validate`].
    pub fn new(params: &'a ParameterBundle) -> Result<Self> {
        params.validate()?;
        let field = PrimeField::new(params.p().clone())?;
        Ok(Self {
            params,
            field,
            alpha: BigUint::from(params.alpha()),
        })
    }

    pub fn params(&self) -> &ParameterBundle {
        self.params
    }

    pub fn field(&self) -> &PrimeField {
        &self.field
    }

    /// Applies all N rounds to `state`, which must hold exactly `m` elements.
    pub fn permute(&self, state: &[BigUint]) -> Result<Vec<BigUint>> {
        if state.len() != self.params.m() {
            return Err(RescueError::InvalidDimension {
                expected: self.params.m(),
                got: state.len(),
            });
        }
        let mut state: Vec<BigUint> = state.iter().map(|x| self.field.reduce(x)).collect();
        self.permute_in_place(&mut state)?;
        Ok(state)
    }

    fn permute_in_place(&self, state: &mut Vec<BigUint>) -> Result<()> {
        for round in 0..self.params.rounds() {
            let (first, second) = self.params.round_constant_blocks(round).ok_or(
                RescueError::InvalidDimension {
                    expected: 2 * self.params.m() * self.params.rounds(),
                    got: self.params.round_constants().len(),
                },
            )?;

            self.half_round(state, &self.alpha, first)?;
            self.half_round(state, self.params.alpha_inverse(), second)?;
        }
        Ok(())
    }

    fn half_round(
        &self,
        state: &mut Vec<BigUint>,
        exponent: &BigUint,
        constants: &[BigUint],
    ) -> Result<()> {
        for x in state.iter_mut() {
            *x = self.field.pow(x, exponent);
        }
        *state = self.params.mds().mul_vec(&self.field, state)?;
        for (x, c) in state.iter_mut().zip(constants) {
            *x = self.field.add(x, c);
        }
        Ok(())
    }
}

/// Sponge hash over [`RescuePermutation`].
#[derive(Debug, Clone)]
pub struct RescueSponge<'a> {
    permutation: RescuePermutation<'a>,
}

impl<'a> RescueSponge<'a> {
    pub fn new(params: &'a ParameterBundle) -> Result<Self> {
        Ok(Self {
            permutation: RescuePermutation::new(params)?,
        })
    }

    /// Hashes `input` without padding.
    ///
    /// Elements are added into the first `rate` state cells, one block per
    /// permutation call; a short final block fills only its leading cells.
    /// Returns the `rate` leading state elements.
    pub fn hash_elements(&self, input: &[BigUint]) -> Result<Vec<BigUint>> {
        let params = self.permutation.params();
        let field = self.permutation.field();
        let rate = params.rate();

        let mut state = vec![BigUint::zero(); params.m()];
        for block in input.chunks(rate) {
            for (cell, x) in state.iter_mut().zip(block) {
                *cell = field.add(cell, &field.reduce(x));
            }
            self.permutation.permute_in_place(&mut state)?;
        }

        state.truncate(rate);
        Ok(state)
    }

    /// Hashes `input` after appending a one and then zeros up to a multiple of
    /// the rate.
    pub fn hash_padded(&self, input: &[BigUint]) -> Result<Vec<BigUint>> {
        let rate = self.permutation.params().rate();
        let mut padded = input.to_vec();
        padded.push(BigUint::from(1u32));
        while padded.len() % rate != 0 {
            padded.push(BigUint::zero());
        }
        self.hash_elements(&padded)
    }

    /// Hashes a string as its UTF-16 code units, padded.
    pub fn hash_str(&self, input: &str) -> Result<Vec<BigUint>> {
        let elements: Vec<BigUint> = input.encode_utf16().map(BigUint::from).collect();
        self.hash_padded(&elements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::assemble;

    fn bundle(p: u64) -> ParameterBundle {
        assemble(BigUint::from(p), 3, 1, 64).unwrap()
    }

    #[test]
    fn test_state_length_checked() {
        let params = bundle(101);
        let permutation = RescuePermutation::new(&params).unwrap();
        let short = vec![BigUint::zero(); 2];
        assert_eq!(
            permutation.permute(&short),
            Err(RescueError::InvalidDimension {
                expected: 3,
                got: 2
            })
        );
    }

    #[test]
    fn test_permutation_is_bijective_on_small_field() {
        // GF(13)^2 has 169 states; distinct inputs must stay distinct.
        let params = assemble(BigUint::from(13u32), 2, 1, 16).unwrap();
        let permutation = RescuePermutation::new(&params).unwrap();

        let mut outputs = std::collections::HashSet::new();
        for a in 0u32..13 {
            for b in 0u32..13 {
                let out = permutation
                    .permute(&[BigUint::from(a), BigUint::from(b)])
                    .unwrap();
                assert!(out.iter().all(|x| x < params.p()));
                outputs.insert(out);
            }
        }
        assert_eq!(outputs.len(), 169);
    }

    #[test]
    fn test_inputs_are_reduced() {
        let params = bundle(101);
        let permutation = RescuePermutation::new(&params).unwrap();
        let a = permutation
            .permute(&[BigUint::from(1u32), BigUint::from(2u32), BigUint::from(3u32)])
            .unwrap();
        let b = permutation
            .permute(&[BigUint::from(102u32), BigUint::from(2u32), BigUint::from(306u32)])
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_padding_separates_inputs() {
        let params = bundle(101);
        let sponge = RescueSponge::new(&params).unwrap();
        let one = vec![BigUint::from(1u32)];
        let one_zero = vec![BigUint::from(1u32), BigUint::zero()];

        // Without padding [1] and [1, 0] absorb identically.
        assert_eq!(
            sponge.hash_elements(&one).unwrap(),
            sponge.hash_elements(&one_zero).unwrap()
        );
        assert_ne!(
            sponge.hash_padded(&one).unwrap(),
            sponge.hash_padded(&one_zero).unwrap()
        );
    }

    #[test]
    fn test_malformed_bundle_rejected() {
        let params = bundle(101);
        let mut json: serde_json::Value = serde_json::to_value(&params).unwrap();

        json["capacity"] = serde_json::json!(3);
        let full_capacity: ParameterBundle = serde_json::from_value(json.clone()).unwrap();
        assert!(matches!(
            RescueSponge::new(&full_capacity),
            Err(RescueError::InvalidParameters(_))
        ));

        json["capacity"] = serde_json::json!(4);
        let over_capacity: ParameterBundle = serde_json::from_value(json.clone()).unwrap();
        assert!(RescuePermutation::new(&over_capacity).is_err());

        json["capacity"] = serde_json::json!(1);
        json["rounds"] = serde_json::json!(params.rounds() + 1);
        let short_constants: ParameterBundle = serde_json::from_value(json).unwrap();
        assert!(matches!(
            RescuePermutation::new(&short_constants),
            Err(RescueError::InvalidDimension { .. })
        ));
    }

    #[test]
    fn test_empty_input() {
        let params = bundle(101);
        let sponge = RescueSponge::new(&params).unwrap();
        assert_eq!(
            sponge.hash_elements(&[]).unwrap(),
            vec![BigUint::zero(); 2]
        );
        assert_eq!(sponge.hash_str("").unwrap().len(), 2);
    }
}
