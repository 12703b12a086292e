//! MDS matrix construction from a systematic Reed-Solomon generator matrix.
//!
//! The `m x 2m` matrix `V[i][j] = g^(i*j)` generates a Reed-Solomon code with
//! evaluation points `g^0, ..., g^(2m-1)`. Once brought into systematic form
//! `[I | A]` by row reduction, `A` inherits the MDS property of the code, and
//! the mixing matrix is `A^T`.

use num_bigint::BigUint;

use crate::error::{RescueError, Result};
use crate::field::PrimeField;
use crate::matrix::FieldMatrix;
use crate::primitive::find_primitive_element;

/// The `m x 2m` generator matrix `V[i][j] = g^(i*j) mod p`.
pub fn vandermonde_generator(field: &PrimeField, g: &BigUint, m: usize) -> FieldMatrix {
    FieldMatrix::from_fn(m, 2 * m, |i, j| {
        field.pow(g, &BigUint::from(i * j))
    })
}

/// Builds the `m x m` MDS mixing matrix over `field`.
///
/// # Errors
/// * `InvalidParameters` if `m` is zero
/// * `SingularMatrix` if the generator matrix has no systematic echelon form,
///   i.e. fewer than `m` pivots land in its left half (`m` too large for `p`)
/// * any error from the primitive element search
pub fn build_mds(field: &PrimeField, m: usize) -> Result<FieldMatrix> {
    if m == 0 {
        return Err(RescueError::InvalidParameters(
            "state width must be positive".to_string(),
        ));
    }

    let g = find_primitive_element(field)?;
    let generator = vandermonde_generator(field, &g, m);
    let (echelon, pivots) = generator.reduced_row_echelon(field)?;

    let systematic_rank = pivots
        .iter()
        .enumerate()
        .take_while(|(row, col)| row == *col)
        .count();
    if systematic_rank < m {
        return Err(RescueError::SingularMatrix {
            rank: systematic_rank,
            required: m,
        });
    }

    Ok(echelon.column_block(m, m)?.transpose())
}
