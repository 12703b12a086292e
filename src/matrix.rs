//! Dense matrices over a prime field.

use num_bigint::BigUint;
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};

use crate::error::{RescueError, Result};
use crate::field::PrimeField;

/// Dense matrix of prime field elements, stored row-major.
///
/// The matrix does not own a field; operations that need arithmetic take the
/// [`PrimeField`] explicitly, and entries are expected to be reduced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMatrix {
    pub data: Vec<Vec<BigUint>>,
    pub rows: usize,
    pub cols: usize,
}

impl FieldMatrix {
    pub fn new(data: Vec<Vec<BigUint>>) -> Result<Self> {
        if data.is_empty() || data[0].is_empty() {
            return Err(RescueError::InvalidParameters(
                "Matrix cannot be empty".to_string(),
            ));
        }

        let rows = data.len();
        let cols = data[0].len();

        for row in &data {
            if row.len() != cols {
                return Err(RescueError::InvalidParameters(
                    "Matrix rows must have equal length".to_string(),
                ));
            }
        }

        Ok(Self { data, rows, cols })
    }

    pub fn from_fn<F>(rows: usize, cols: usize, mut entry: F) -> Self
    where
        F: FnMut(usize, usize) -> BigUint,
    {
        let data = (0..rows)
            .map(|i| (0..cols).map(|j| entry(i, j)).collect())
            .collect();
        Self { data, rows, cols }
    }

    pub fn get(&self, row: usize, col: usize) -> &BigUint {
        &self.data[row][col]
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    pub fn transpose(&self) -> Self {
        Self::from_fn(self.cols, self.rows, |i, j| self.data[j][i].clone())
    }

    /// Columns `start..start + width` as a new matrix.
    pub fn column_block(&self, start: usize, width: usize) -> Result<Self> {
        if start + width > self.cols || width == 0 {
            return Err(RescueError::InvalidDimension {
                expected: self.cols,
                got: start + width,
            });
        }
        Ok(Self::from_fn(self.rows, width, |i, j| {
            self.data[i][start + j].clone()
        }))
    }

    /// The submatrix formed by the given row and column indices.
    pub fn submatrix(&self, rows: &[usize], cols: &[usize]) -> Self {
        Self::from_fn(rows.len(), cols.len(), |i, j| {
            self.data[rows[i]][cols[j]].clone()
        })
    }

    /// Matrix-vector product `M * v` over the field.
    pub fn mul_vec(&self, field: &PrimeField, v: &[BigUint]) -> Result<Vec<BigUint>> {
        if v.len() != self.cols {
            return Err(RescueError::InvalidDimension {
                expected: self.cols,
                got: v.len(),
            });
        }
        Ok(self
            .data
            .iter()
            .map(|row| {
                row.iter()
                    .zip(v)
                    .fold(BigUint::zero(), |acc, (a, b)| field.add(&acc, &field.mul(a, b)))
            })
            .collect())
    }

    /// Reduced row-echelon form by Gauss-Jordan elimination over `field`.
    ///
    /// Columns are processed left to right; the pivot of a column is the first
    /// non-zero entry at or below the current row. Each pivot row is scaled
    /// by the field inverse of its pivot, then the pivot column is cleared in
    /// every other row.
    ///
    /// # Returns
    /// * The echelon form together with the pivot column of each non-zero row
    pub fn reduced_row_echelon(&self, field: &PrimeField) -> Result<(Self, Vec<usize>)> {
        let mut m = self.data.clone();
        let mut pivots = Vec::new();
        let mut r = 0;

        for c in 0..self.cols {
            if r == self.rows {
                break;
            }
            let Some(pivot) = (r..self.rows).find(|&i| !m[i][c].is_zero()) else {
                continue;
            };
            m.swap(r, pivot);

            let inv = field.inverse(&m[r][c])?;
            for x in m[r].iter_mut() {
                *x = field.mul(x, &inv);
            }

            let pivot_row = m[r].clone();
            for (i, row) in m.iter_mut().enumerate() {
                if i == r || row[c].is_zero() {
                    continue;
                }
                let factor = row[c].clone();
                for (x, p) in row.iter_mut().zip(&pivot_row) {
                    *x = field.sub(x, &field.mul(&factor, p));
                }
            }

            pivots.push(c);
            r += 1;
        }

        Ok((
            Self {
                data: m,
                rows: self.rows,
                cols: self.cols,
            },
            pivots,
        ))
    }

    pub fn rank(&self, field: &PrimeField) -> Result<usize> {
        Ok(self.reduced_row_echelon(field)?.1.len())
    }

    /// Determinant by forward elimination, tracking row swaps.
    pub fn determinant(&self, field: &PrimeField) -> Result<BigUint> {
        if !self.is_square() {
            return Err(RescueError::InvalidDimension {
                expected: self.rows,
                got: self.cols,
            });
        }

        let n = self.rows;
        let mut m = self.data.clone();
        let mut det = BigUint::one();

        for c in 0..n {
            let Some(pivot) = (c..n).find(|&i| !m[i][c].is_zero()) else {
                return Ok(BigUint::zero());
            };
            if pivot != c {
                m.swap(c, pivot);
                det = field.neg(&det);
            }
            det = field.mul(&det, &m[c][c]);

            let inv = field.inverse(&m[c][c])?;
            let pivot_row = m[c].clone();
            for row in m.iter_mut().skip(c + 1) {
                if row[c].is_zero() {
                    continue;
                }
                let factor = field.mul(&row[c], &inv);
                for (x, p) in row.iter_mut().zip(&pivot_row).skip(c) {
                    *x = field.sub(x, &field.mul(&factor, p));
                }
            }
        }

        Ok(det)
    }

    pub fn is_invertible(&self, field: &PrimeField) -> Result<bool> {
        Ok(!self.determinant(field)?.is_zero())
    }

    /// Checks the MDS property: every square submatrix is non-singular.
    ///
    /// Enumerates all `sum_k C(n,k)^2` submatrices, so this is only practical
    /// for the small widths used by sponge permutations.
    pub fn is_mds(&self, field: &PrimeField) -> Result<bool> {
        if !self.is_square() {
            return Ok(false);
        }
        for k in 1..=self.rows {
            let subsets = combinations(self.rows, k);
            for rows in &subsets {
                for cols in &subsets {
                    if !self.submatrix(rows, cols).is_invertible(field)? {
                        return Ok(false);
                    }
                }
            }
        }
        Ok(true)
    }
}

/// All `k`-element subsets of `0..n` in lexicographic order.
fn combinations(n: usize, k: usize) -> Vec<Vec<usize>> {
    let mut out = Vec::new();
    let mut current: Vec<usize> = (0..k).collect();
    if k > n {
        return out;
    }
    loop {
        out.push(current.clone());
        let Some(i) = (0..k).rev().find(|&i| current[i] != i + n - k) else {
            return out;
        };
        current[i] += 1;
        for j in i + 1..k {
            current[j] = current[j - 1] + 1;
        }
    }
}
