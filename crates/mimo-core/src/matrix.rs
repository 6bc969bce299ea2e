//! Complex Matrix — dense owned matrix algebra for the MIMO link
//!
//! A small, self-contained complex linear algebra layer: allocation, element
//! access, elementwise arithmetic, transpose/conjugate/Hermitian and the
//! general matrix product. Every operation returns a new matrix; inputs are
//! never aliased or modified.
//!
//! Storage is a flat row-major `Vec<Complex64>`. Shapes are fixed at
//! construction and both dimensions are always at least 1.
//!
//! ## Example
//!
//! ```rust
//! use mimo_core::matrix::ComplexMatrix;
//! use num_complex::Complex64;
//!
//! let a = ComplexMatrix::from_rows(&[
//!     vec![Complex64::new(1.0, 2.0), Complex64::new(3.0, 0.0)],
//!     vec![Complex64::new(0.0, -1.0), Complex64::new(4.0, 1.0)],
//! ]).unwrap();
//!
//! let id = ComplexMatrix::identity(2).unwrap();
//! assert_eq!(a.matmul(&id).unwrap(), a);
//! assert_eq!(a.hermitian().hermitian(), a);
//! ```

use std::fmt;
use std::ops::{Index, IndexMut};

use crate::types::{Complex, MimoError, MimoResult};

const ZERO: Complex = Complex::new(0.0, 0.0);

/// Dense complex matrix, `rows x cols`, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexMatrix {
    rows: usize,
    cols: usize,
    data: Vec<Complex>,
}

impl ComplexMatrix {
    /// Allocate a zero-initialized `rows x cols` matrix.
    ///
    /// Fails with [`MimoError::Allocation`] if either dimension is zero or
    /// the storage cannot be obtained.
    pub fn zeros(rows: usize, cols: usize) -> MimoResult<Self> {
        let len = Self::checked_len(rows, cols)?;
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| MimoError::Allocation { rows, cols })?;
        data.resize(len, ZERO);
        Ok(Self { rows, cols, data })
    }

    /// Square identity matrix of size `n`.
    pub fn identity(n: usize) -> MimoResult<Self> {
        let mut m = Self::zeros(n, n)?;
        for i in 0..n {
            m.set(i, i, Complex::new(1.0, 0.0));
        }
        Ok(m)
    }

    /// Build a matrix by evaluating `f(row, col)` for every cell.
    pub fn from_fn<F>(rows: usize, cols: usize, mut f: F) -> MimoResult<Self>
    where
        F: FnMut(usize, usize) -> Complex,
    {
        let mut m = Self::zeros(rows, cols)?;
        for r in 0..rows {
            for c in 0..cols {
                m.data[r * cols + c] = f(r, c);
            }
        }
        Ok(m)
    }

    /// Build a matrix from nested rows. All rows must have the same length.
    pub fn from_rows(rows: &[Vec<Complex>]) -> MimoResult<Self> {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, Vec::len);
        let mut m = Self::zeros(n_rows, n_cols)?;
        for (r, row) in rows.iter().enumerate() {
            if row.len() != n_cols {
                return Err(MimoError::shape("from_rows", (1, n_cols), (1, row.len())));
            }
            m.data[r * n_cols..(r + 1) * n_cols].copy_from_slice(row);
        }
        Ok(m)
    }

    /// Build a real-valued matrix (zero imaginary parts) from nested rows.
    pub fn from_real_rows(rows: &[Vec<f64>]) -> MimoResult<Self> {
        let complex_rows: Vec<Vec<Complex>> = rows
            .iter()
            .map(|row| row.iter().map(|&re| Complex::new(re, 0.0)).collect())
            .collect();
        Self::from_rows(&complex_rows)
    }

    /// Build an `n x 1` column vector.
    pub fn from_column(values: &[Complex]) -> MimoResult<Self> {
        let mut m = Self::zeros(values.len(), 1)?;
        m.data.copy_from_slice(values);
        Ok(m)
    }

    fn checked_len(rows: usize, cols: usize) -> MimoResult<usize> {
        if rows == 0 || cols == 0 {
            return Err(MimoError::Allocation { rows, cols });
        }
        rows.checked_mul(cols)
            .filter(|&len| len <= isize::MAX as usize / std::mem::size_of::<Complex>())
            .ok_or(MimoError::Allocation { rows, cols })
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// True for `n x 1` matrices.
    pub fn is_column(&self) -> bool {
        self.cols == 1
    }

    /// Row-major view of the elements.
    pub fn as_slice(&self) -> &[Complex] {
        &self.data
    }

    /// Get element `[r][c]`.
    #[inline]
    pub fn get(&self, r: usize, c: usize) -> Complex {
        self.data[r * self.cols + c]
    }

    /// Set element `[r][c]`.
    #[inline]
    pub fn set(&mut self, r: usize, c: usize, val: Complex) {
        self.data[r * self.cols + c] = val;
    }

    /// Copy column `c` out as an `rows x 1` vector.
    pub fn column(&self, c: usize) -> ComplexMatrix {
        let data = (0..self.rows).map(|r| self.get(r, c)).collect();
        ComplexMatrix {
            rows: self.rows,
            cols: 1,
            data,
        }
    }

    /// Overwrite column `c` with a column vector of matching length.
    pub fn set_column(&mut self, c: usize, column: &ComplexMatrix) -> MimoResult<()> {
        if !column.is_column() || column.rows != self.rows || c >= self.cols {
            return Err(MimoError::shape("set_column", self.shape(), column.shape()));
        }
        for r in 0..self.rows {
            self.set(r, c, column.data[r]);
        }
        Ok(())
    }

    /// Main diagonal, `min(rows, cols)` entries.
    pub fn diagonal(&self) -> Vec<Complex> {
        (0..self.rows.min(self.cols)).map(|i| self.get(i, i)).collect()
    }

    /// True if any element has a nonzero imaginary part.
    pub fn has_imaginary(&self) -> bool {
        self.data.iter().any(|z| z.im != 0.0)
    }

    /// Real parts, row-major.
    pub fn real_part(&self) -> Vec<f64> {
        self.data.iter().map(|z| z.re).collect()
    }

    /// Transpose: element `[c][r]` of the input becomes `[r][c]` of the output.
    pub fn transpose(&self) -> ComplexMatrix {
        let mut data = vec![ZERO; self.data.len()];
        for r in 0..self.rows {
            for c in 0..self.cols {
                data[c * self.rows + r] = self.get(r, c);
            }
        }
        ComplexMatrix {
            rows: self.cols,
            cols: self.rows,
            data,
        }
    }

    /// Elementwise complex conjugate.
    pub fn conjugate(&self) -> ComplexMatrix {
        ComplexMatrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|z| z.conj()).collect(),
        }
    }

    /// Hermitian (conjugate transpose).
    pub fn hermitian(&self) -> ComplexMatrix {
        self.conjugate().transpose()
    }

    /// Elementwise sum. Shapes must match.
    pub fn add(&self, other: &ComplexMatrix) -> MimoResult<ComplexMatrix> {
        self.zip_with("add", other, |a, b| a + b)
    }

    /// Elementwise difference `self - other`. Shapes must match.
    pub fn subtract(&self, other: &ComplexMatrix) -> MimoResult<ComplexMatrix> {
        self.zip_with("subtract", other, |a, b| a - b)
    }

    fn zip_with<F>(&self, op: &'static str, other: &ComplexMatrix, f: F) -> MimoResult<ComplexMatrix>
    where
        F: Fn(Complex, Complex) -> Complex,
    {
        if self.shape() != other.shape() {
            return Err(MimoError::shape(op, self.shape(), other.shape()));
        }
        Ok(ComplexMatrix {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(&a, &b)| f(a, b))
                .collect(),
        })
    }

    /// Multiply every element by a real scalar.
    pub fn scale(&self, k: f64) -> ComplexMatrix {
        ComplexMatrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|&z| z * k).collect(),
        }
    }

    /// `sum(v1[i] * v2[i])` over two column vectors of equal length.
    ///
    /// Neither operand is conjugated, so this is a bilinear form rather than
    /// the Hermitian inner product `v1^H v2`.
    pub fn inner_product(&self, other: &ComplexMatrix) -> MimoResult<Complex> {
        if !self.is_column() || !other.is_column() || self.rows != other.rows {
            return Err(MimoError::shape("inner_product", self.shape(), other.shape()));
        }
        Ok(self
            .data
            .iter()
            .zip(&other.data)
            .fold(ZERO, |acc, (&a, &b)| acc + a * b))
    }

    /// General matrix product `self * other`.
    ///
    /// Requires `self.cols() == other.rows()`.
    pub fn matmul(&self, other: &ComplexMatrix) -> MimoResult<ComplexMatrix> {
        if self.cols != other.rows {
            return Err(MimoError::shape("matmul", self.shape(), other.shape()));
        }
        let mut out = ComplexMatrix::zeros(self.rows, other.cols)?;
        for r in 0..self.rows {
            for c in 0..other.cols {
                let mut acc = ZERO;
                for k in 0..self.cols {
                    acc += self.get(r, k) * other.get(k, c);
                }
                out.data[r * other.cols + c] = acc;
            }
        }
        Ok(out)
    }

    /// Largest elementwise distance `|self - other|`, or infinity if the
    /// shapes differ.
    pub fn max_abs_diff(&self, other: &ComplexMatrix) -> f64 {
        if self.shape() != other.shape() {
            return f64::INFINITY;
        }
        self.data
            .iter()
            .zip(&other.data)
            .map(|(a, b)| (a - b).norm())
            .fold(0.0, f64::max)
    }
}

impl Index<(usize, usize)> for ComplexMatrix {
    type Output = Complex;

    fn index(&self, (r, c): (usize, usize)) -> &Complex {
        &self.data[r * self.cols + c]
    }
}

impl IndexMut<(usize, usize)> for ComplexMatrix {
    fn index_mut(&mut self, (r, c): (usize, usize)) -> &mut Complex {
        &mut self.data[r * self.cols + c]
    }
}

impl fmt::Display for ComplexMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..self.rows {
            for c in 0..self.cols {
                let z = self.get(r, c);
                if c > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{:+.4}{:+.4}j", z.re, z.im)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn c(re: f64, im: f64) -> Complex {
        Complex::new(re, im)
    }

    fn sample_2x3() -> ComplexMatrix {
        ComplexMatrix::from_rows(&[
            vec![c(1.0, 2.0), c(3.0, -1.0), c(0.5, 0.0)],
            vec![c(-2.0, 0.5), c(0.0, 4.0), c(1.5, -2.5)],
        ])
        .unwrap()
    }

    #[test]
    fn test_zeros_shape() {
        let m = ComplexMatrix::zeros(3, 2).unwrap();
        assert_eq!(m.shape(), (3, 2));
        assert!(m.as_slice().iter().all(|z| *z == c(0.0, 0.0)));
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert_eq!(
            ComplexMatrix::zeros(0, 3),
            Err(MimoError::Allocation { rows: 0, cols: 3 })
        );
        assert!(ComplexMatrix::zeros(2, 0).is_err());
        assert!(ComplexMatrix::zeros(usize::MAX, 2).is_err());
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let rows = vec![vec![c(1.0, 0.0), c(2.0, 0.0)], vec![c(3.0, 0.0)]];
        assert!(matches!(
            ComplexMatrix::from_rows(&rows),
            Err(MimoError::ShapeMismatch { op: "from_rows", .. })
        ));
    }

    #[test]
    fn test_transpose() {
        let m = sample_2x3();
        let t = m.transpose();
        assert_eq!(t.shape(), (3, 2));
        for r in 0..2 {
            for col in 0..3 {
                assert_eq!(t.get(col, r), m.get(r, col));
            }
        }
        assert_eq!(t.transpose(), m);
    }

    #[test]
    fn test_conjugate() {
        let m = sample_2x3();
        let conj = m.conjugate();
        assert_eq!(conj.get(0, 0), c(1.0, -2.0));
        assert_eq!(conj.get(1, 1), c(0.0, -4.0));
        assert_eq!(conj.get(0, 2), c(0.5, 0.0));
    }

    #[test]
    fn test_hermitian() {
        let m = sample_2x3();
        let h = m.hermitian();
        assert_eq!(h.shape(), (3, 2));
        // H[j][i] = conj(M[i][j])
        assert_eq!(h.get(0, 1), c(-2.0, -0.5));
        assert_eq!(h.get(2, 1), c(1.5, 2.5));
        assert_eq!(h.hermitian(), m);
    }

    #[test]
    fn test_add_commutative() {
        let a = sample_2x3();
        let b = a.conjugate().scale(0.5);
        assert_eq!(a.add(&b).unwrap(), b.add(&a).unwrap());
        assert_eq!(a.add(&b).unwrap().get(0, 0), c(1.5, 1.0));
    }

    #[test]
    fn test_subtract_antisymmetric() {
        let a = sample_2x3();
        let b = ComplexMatrix::from_fn(2, 3, |r, col| c(r as f64, -(col as f64))).unwrap();
        let ab = a.subtract(&b).unwrap();
        let ba = b.subtract(&a).unwrap();
        assert_eq!(ab, ba.scale(-1.0));
    }

    #[test]
    fn test_add_shape_mismatch() {
        let a = sample_2x3();
        let b = a.transpose();
        assert!(matches!(
            a.add(&b),
            Err(MimoError::ShapeMismatch { op: "add", .. })
        ));
        assert!(a.subtract(&b).is_err());
    }

    #[test]
    fn test_scale() {
        let m = sample_2x3().scale(2.0);
        assert_eq!(m.get(0, 0), c(2.0, 4.0));
        assert_eq!(m.get(1, 2), c(3.0, -5.0));
    }

    #[test]
    fn test_inner_product_is_not_conjugated() {
        let v1 = ComplexMatrix::from_column(&[c(1.0, 1.0), c(0.0, 2.0)]).unwrap();
        let v2 = ComplexMatrix::from_column(&[c(1.0, -1.0), c(0.0, 1.0)]).unwrap();
        // (1+j)(1-j) + (2j)(j) = 2 - 2 = 0
        let p = v1.inner_product(&v2).unwrap();
        assert_relative_eq!(p.re, 0.0, epsilon = 1e-12);
        assert_relative_eq!(p.im, 0.0, epsilon = 1e-12);

        // v . v keeps the imaginary cross term: (1+j)^2 + (2j)^2 = 2j - 4
        let p = v1.inner_product(&v1).unwrap();
        assert_relative_eq!(p.re, -4.0, epsilon = 1e-12);
        assert_relative_eq!(p.im, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_inner_product_requires_columns() {
        let v = ComplexMatrix::from_column(&[c(1.0, 0.0), c(2.0, 0.0)]).unwrap();
        let short = ComplexMatrix::from_column(&[c(1.0, 0.0)]).unwrap();
        assert!(v.inner_product(&short).is_err());
        assert!(sample_2x3().inner_product(&v).is_err());
    }

    #[test]
    fn test_matmul_identity() {
        let a = sample_2x3();
        let id = ComplexMatrix::identity(3).unwrap();
        assert_eq!(a.matmul(&id).unwrap(), a);
        let id2 = ComplexMatrix::identity(2).unwrap();
        assert_eq!(id2.matmul(&a).unwrap(), a);
    }

    #[test]
    fn test_matmul_values() {
        let a = ComplexMatrix::from_rows(&[
            vec![c(1.0, 1.0), c(2.0, 0.0)],
            vec![c(0.0, -1.0), c(1.0, 0.0)],
        ])
        .unwrap();
        let b = ComplexMatrix::from_column(&[c(1.0, 0.0), c(0.0, 1.0)]).unwrap();
        let p = a.matmul(&b).unwrap();
        assert_eq!(p.shape(), (2, 1));
        // (1+j)*1 + 2*j = 1 + 3j
        assert_eq!(p.get(0, 0), c(1.0, 3.0));
        // (-j)*1 + 1*j = 0
        assert_eq!(p.get(1, 0), c(0.0, 0.0));
    }

    #[test]
    fn test_matmul_shape_mismatch() {
        let a = sample_2x3();
        assert!(matches!(
            a.matmul(&a),
            Err(MimoError::ShapeMismatch { op: "matmul", left: (2, 3), right: (2, 3) })
        ));
    }

    #[test]
    fn test_column_roundtrip() {
        let mut m = sample_2x3();
        let col = m.column(1);
        assert_eq!(col.shape(), (2, 1));
        assert_eq!(col[(1, 0)], c(0.0, 4.0));

        let replacement = ComplexMatrix::from_column(&[c(9.0, 9.0), c(8.0, 8.0)]).unwrap();
        m.set_column(1, &replacement).unwrap();
        assert_eq!(m.get(0, 1), c(9.0, 9.0));
        assert!(m.set_column(3, &replacement).is_err());
    }

    #[test]
    fn test_has_imaginary() {
        let real = ComplexMatrix::from_real_rows(&[vec![1.0, -2.0], vec![0.5, 3.0]]).unwrap();
        assert!(!real.has_imaginary());
        assert!(sample_2x3().has_imaginary());
        assert_eq!(real.diagonal(), vec![c(1.0, 0.0), c(3.0, 0.0)]);
    }

    #[test]
    fn test_index_mut() {
        let mut m = ComplexMatrix::zeros(2, 2).unwrap();
        m[(1, 0)] = c(5.0, -1.0);
        assert_eq!(m.get(1, 0), c(5.0, -1.0));
        assert_eq!(m.max_abs_diff(&ComplexMatrix::zeros(2, 2).unwrap()), c(5.0, -1.0).norm());
        assert_eq!(m.max_abs_diff(&sample_2x3()), f64::INFINITY);
    }
}
