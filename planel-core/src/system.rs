//! Dense linear system A·x = B.
//!
//! The system stores B and the rows of A in one contiguous buffer of
//! (N+1)·N doubles, B first. Assembly adds into it, Dirichlet constraints
//! are folded in with [`DenseSystem::constrain`], and
//! [`DenseSystem::eliminate`] solves in place by Gauss elimination without
//! pivoting, leaving the solution in B.
//!
//! # Example
//!
//! ```
//! use planel_core::system::DenseSystem;
//!
//! let mut system = DenseSystem::new(2);
//! system[(0, 0)] = 2.0;
//! system[(1, 1)] = 4.0;
//! system.rhs_mut().copy_from_slice(&[2.0, 2.0]);
//! let x = system.eliminate().unwrap();
//! assert_eq!(x, &[1.0, 0.5]);
//! ```

use crate::cfmt;
use crate::error::{Error, Result};
use std::fmt;
use std::ops::{Index, IndexMut};

/// Pivots at or below this magnitude abort elimination.
pub const PIVOT_TOLERANCE: f64 = 1e-16;

/// Square dense system with its right-hand side.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseSystem {
    size: usize,
    /// `[B | A row 0 | A row 1 | ...]`
    data: Vec<f64>,
}

impl DenseSystem {
    /// Zero system of order `size`.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            data: vec![0.0; (size + 1) * size],
        }
    }

    /// Order N of the system.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Reset every entry of A and B to zero, keeping the allocation.
    pub fn zero(&mut self) {
        self.data.fill(0.0);
    }

    #[inline]
    fn offset(&self, row: usize, col: usize) -> usize {
        self.size * (row + 1) + col
    }

    /// Right-hand side B (the solution after [`eliminate`](Self::eliminate)).
    pub fn rhs(&self) -> &[f64] {
        &self.data[..self.size]
    }

    pub fn rhs_mut(&mut self) -> &mut [f64] {
        &mut self.data[..self.size]
    }

    /// One row of A.
    pub fn row(&self, row: usize) -> &[f64] {
        let start = self.offset(row, 0);
        &self.data[start..start + self.size]
    }

    /// Matrix-vector product A·x.
    pub fn multiply(&self, x: &[f64]) -> Result<Vec<f64>> {
        if x.len() != self.size {
            return Err(Error::Configuration(format!(
                "vector of length {} cannot multiply a system of order {}",
                x.len(),
                self.size
            )));
        }
        Ok((0..self.size)
            .map(|i| self.row(i).iter().zip(x).map(|(a, x)| a * x).sum())
            .collect())
    }

    /// Impose `x[dof] = value`.
    ///
    /// Moves column `dof` to the right-hand side, clears row and column
    /// `dof`, and replaces the row by the identity equation. Applying the
    /// same constraint twice changes nothing.
    pub fn constrain(&mut self, dof: usize, value: f64) -> Result<()> {
        let n = self.size;
        if dof >= n {
            return Err(Error::Configuration(format!(
                "cannot constrain dof {dof} of a system of order {n}"
            )));
        }
        for i in 0..n {
            let a_id = self.offset(i, dof);
            self.data[i] -= value * self.data[a_id];
            self.data[a_id] = 0.0;
        }
        let row = self.offset(dof, 0);
        self.data[row..row + n].fill(0.0);
        self.data[row + dof] = 1.0;
        self.data[dof] = value;
        Ok(())
    }

    /// Solve in place by forward elimination and back-substitution.
    ///
    /// No pivoting is done; the stiffness matrix with its Dirichlet rows
    /// replaced is expected to have a non-vanishing diagonal. On success B
    /// holds the solution, which is also returned.
    ///
    /// # Errors
    ///
    /// [`Error::SingularMatrix`] with the step index when |A[k][k]| ≤ 1e-16.
    /// A and B are left partially reduced in that case.
    pub fn eliminate(&mut self) -> Result<&[f64]> {
        let n = self.size;
        for k in 0..n {
            let pivot = self[(k, k)];
            if pivot.abs() <= PIVOT_TOLERANCE {
                return Err(Error::SingularMatrix { index: k, pivot });
            }
            for i in k + 1..n {
                let factor = self[(i, k)] / pivot;
                if factor == 0.0 {
                    continue;
                }
                for j in k + 1..n {
                    let a_kj = self[(k, j)];
                    self[(i, j)] -= a_kj * factor;
                }
                self.data[i] -= self.data[k] * factor;
            }
        }

        for i in (0..n).rev() {
            let tail: f64 = (i + 1..n).map(|j| self[(i, j)] * self.data[j]).sum();
            self.data[i] = (self.data[i] - tail) / self[(i, i)];
        }
        Ok(self.rhs())
    }
}

impl Index<(usize, usize)> for DenseSystem {
    type Output = f64;

    #[inline]
    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        &self.data[self.offset(row, col)]
    }
}

impl IndexMut<(usize, usize)> for DenseSystem {
    #[inline]
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f64 {
        let at = self.offset(row, col);
        &mut self.data[at]
    }
}

/// One line per row: nonzero entries of A, then the matching entry of B.
impl fmt::Display for DenseSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.size {
            for &a in self.row(i) {
                if a == 0.0 {
                    f.write_str("         ")?;
                } else {
                    write!(f, " {}", cfmt::exp(a, 1, true))?;
                }
            }
            writeln!(f, " :  {} ", cfmt::exp(self.data[i], 1, true))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn from_rows(rows: &[&[f64]], rhs: &[f64]) -> DenseSystem {
        let mut system = DenseSystem::new(rhs.len());
        for (i, row) in rows.iter().enumerate() {
            for (j, &a) in row.iter().enumerate() {
                system[(i, j)] = a;
            }
        }
        system.rhs_mut().copy_from_slice(rhs);
        system
    }

    #[test]
    fn test_layout_is_rhs_then_rows() {
        let mut system = DenseSystem::new(3);
        system[(1, 2)] = 5.0;
        system.rhs_mut()[2] = 7.0;
        assert_eq!(system.data.len(), 12);
        assert_eq!(system.data[2], 7.0);
        assert_eq!(system.data[3 * 2 + 2], 5.0);
        assert_eq!(system.row(1), &[0.0, 0.0, 5.0]);
    }

    #[test]
    fn test_zero_keeps_size() {
        let mut system = from_rows(&[&[1.0, 2.0], &[3.0, 4.0]], &[5.0, 6.0]);
        system.zero();
        assert_eq!(system.size(), 2);
        assert!(system.data.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_solve_2x2_spd() {
        let mut system = from_rows(&[&[4.0, 1.0], &[1.0, 3.0]], &[1.0, 2.0]);
        let x = system.eliminate().unwrap();
        assert_relative_eq!(x[0], 1.0 / 11.0, max_relative = 1e-9);
        assert_relative_eq!(x[1], 7.0 / 11.0, max_relative = 1e-9);
    }

    #[test]
    fn test_solve_3x3_spd() {
        let rows: [&[f64]; 3] = [&[4.0, -1.0, 0.0], &[-1.0, 4.0, -1.0], &[0.0, -1.0, 4.0]];
        let expected = [1.0, -2.0, 3.0];
        let rhs: Vec<f64> = rows
            .iter()
            .map(|r| r.iter().zip(&expected).map(|(a, x)| a * x).sum())
            .collect();
        let mut system = from_rows(&rows, &rhs);
        let x = system.eliminate().unwrap().to_vec();
        for (got, want) in x.iter().zip(expected) {
            assert_relative_eq!(*got, want, max_relative = 1e-9);
        }
    }

    #[test]
    fn test_multiply() {
        let system = from_rows(&[&[1.0, 2.0], &[3.0, 4.0]], &[0.0, 0.0]);
        assert_eq!(system.multiply(&[1.0, -1.0]).unwrap(), vec![-1.0, -1.0]);
        assert!(system.multiply(&[1.0]).is_err());
    }

    #[test]
    fn test_constrain_moves_column_to_rhs() {
        let mut system = from_rows(&[&[2.0, -1.0], &[-1.0, 2.0]], &[0.0, 1.0]);
        system.constrain(0, 0.5).unwrap();
        assert_eq!(system.row(0), &[1.0, 0.0]);
        assert_eq!(system.row(1), &[0.0, 2.0]);
        assert_eq!(system.rhs(), &[0.5, 1.5]);
        let x = system.eliminate().unwrap();
        assert_relative_eq!(x[0], 0.5);
        assert_relative_eq!(x[1], 0.75);
    }

    #[test]
    fn test_constrain_is_idempotent() {
        let mut once = from_rows(
            &[&[4.0, 1.0, 0.5], &[1.0, 3.0, 0.2], &[0.5, 0.2, 2.0]],
            &[1.0, 2.0, 3.0],
        );
        once.constrain(1, -0.3).unwrap();
        let mut twice = once.clone();
        twice.constrain(1, -0.3).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_constrain_out_of_range() {
        let mut system = DenseSystem::new(2);
        assert!(matches!(system.constrain(2, 0.0), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_singular_pivot_detected() {
        let mut system = from_rows(&[&[1.0, 2.0], &[2.0, 4.0]], &[1.0, 2.0]);
        match system.eliminate() {
            Err(Error::SingularMatrix { index, pivot }) => {
                assert_eq!(index, 1);
                assert!(pivot.abs() <= PIVOT_TOLERANCE);
            }
            other => panic!("expected singular matrix, got {other:?}"),
        }
    }

    #[test]
    fn test_display_blanks_zero_entries() {
        let system = from_rows(&[&[2.0, 0.0], &[0.0, -1.5]], &[1.0, 0.0]);
        let text = system.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], " +2.0e+00          :  +1.0e+00 ");
        assert_eq!(lines[1], "          -1.5e+00 :  +0.0e+00 ");
    }
}
