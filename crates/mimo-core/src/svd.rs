//! SVD Engine — singular value decomposition of the channel matrix
//!
//! Factors a channel matrix `H` into `U`, `S`, `V` with `H ≈ U · S · V^H`, the
//! basis of SVD precoding: transmitting along the right singular vectors and
//! combining along the left ones turns the MIMO channel into `min(Nr, Nt)`
//! parallel scalar channels with gains equal to the singular values.
//!
//! Only the real part of `H` is decomposed. A channel with a nonzero
//! imaginary part is accepted with a warning.
//!
//! Two entry points exist, one per antenna regime:
//!
//! | Regime        | Call                            | Input      | Factors returned            |
//! |---------------|---------------------------------|------------|-----------------------------|
//! | `Nr >= Nt`    | [`SvdEngine::decompose_square_or_tall`] | `H` (Nr×Nt)  | U Nr×Nt, S Nt×Nt, V Nt×Nt |
//! | `Nr < Nt`     | [`SvdEngine::decompose_transposed`]     | `Hᵗ` (Nt×Nr) | SVD of `Hᵗ`; relabel with [`SvdFactors::swap_roles`] |
//!
//! The numerical work is delegated to an [`SvdPrimitive`]; the default one is
//! backed by `nalgebra`.
//!
//! ## Example
//!
//! ```rust
//! use mimo_core::matrix::ComplexMatrix;
//! use mimo_core::svd::SvdEngine;
//!
//! let h = ComplexMatrix::from_real_rows(&[
//!     vec![3.0, 0.0],
//!     vec![0.0, -2.0],
//!     vec![0.0, 0.0],
//! ]).unwrap();
//!
//! let factors = SvdEngine::new().decompose_square_or_tall(&h).unwrap();
//! assert_eq!(factors.u.shape(), (3, 2));
//! assert_eq!(factors.s.shape(), (2, 2));
//! assert!((factors.singular_values()[0] - 3.0).abs() < 1e-12);
//! assert!(factors.reconstruct().unwrap().max_abs_diff(&h) < 1e-9);
//! ```

use nalgebra::{DMatrix, DVector};
use tracing::warn;

use crate::matrix::ComplexMatrix;
use crate::types::{Complex, MimoError, MimoResult};

/// Real factors `A ≈ U · diag(singular_values) · Vᵗ`.
#[derive(Debug, Clone)]
pub struct RealSvd {
    /// Left singular vectors, `m x k`.
    pub u: DMatrix<f64>,
    /// Singular values, non-increasing.
    pub singular_values: DVector<f64>,
    /// Right singular vectors, `n x k` (not transposed).
    pub v: DMatrix<f64>,
}

impl RealSvd {
    /// Reorder singular values (and the matching vectors) to non-increasing.
    fn sort_descending(&mut self) {
        let len = self.singular_values.len();
        let mut order: Vec<usize> = (0..len).collect();
        order.sort_by(|&a, &b| {
            self.singular_values[b]
                .partial_cmp(&self.singular_values[a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        if order.iter().enumerate().all(|(i, &o)| i == o) {
            return;
        }
        self.singular_values =
            DVector::from_iterator(len, order.iter().map(|&i| self.singular_values[i]));
        self.u = self.u.select_columns(&order);
        self.v = self.v.select_columns(&order);
    }
}

/// A real singular value decomposition routine.
pub trait SvdPrimitive {
    /// Decompose an `m x n` real matrix with `m >= n` into thin factors.
    fn decompose(&self, a: DMatrix<f64>) -> MimoResult<RealSvd>;
}

/// [`SvdPrimitive`] backed by `nalgebra::linalg::SVD`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NalgebraSvd;

impl SvdPrimitive for NalgebraSvd {
    fn decompose(&self, a: DMatrix<f64>) -> MimoResult<RealSvd> {
        // max_niter = 0 iterates until convergence
        let svd = nalgebra::linalg::SVD::try_new(a, true, true, f64::EPSILON, 0)
            .ok_or_else(|| MimoError::Svd("did not converge".to_string()))?;
        let u = svd
            .u
            .ok_or_else(|| MimoError::Svd("left singular vectors not computed".to_string()))?;
        let v_t = svd
            .v_t
            .ok_or_else(|| MimoError::Svd("right singular vectors not computed".to_string()))?;

        let mut out = RealSvd {
            u,
            singular_values: svd.singular_values,
            v: v_t.transpose(),
        };
        out.sort_descending();
        Ok(out)
    }
}

/// `U`, `S`, `V` of a channel matrix, wrapped as complex matrices with zero
/// imaginary parts. `S` is square and diagonal.
#[derive(Debug, Clone, PartialEq)]
pub struct SvdFactors {
    pub u: ComplexMatrix,
    pub s: ComplexMatrix,
    pub v: ComplexMatrix,
}

impl SvdFactors {
    /// Diagonal of `S` (real parts).
    pub fn singular_values(&self) -> Vec<f64> {
        self.s.diagonal().iter().map(|z| z.re).collect()
    }

    /// Swap the left and right factors.
    ///
    /// The SVD of `Hᵗ = A · S · Bᵗ` gives `H = B · S · Aᵗ`, so the factors of
    /// a decomposed transpose become `(U, S, V) = (B, S, A)` for `H`.
    pub fn swap_roles(self) -> SvdFactors {
        SvdFactors {
            u: self.v,
            s: self.s,
            v: self.u,
        }
    }

    /// `U · S · V^H`.
    pub fn reconstruct(&self) -> MimoResult<ComplexMatrix> {
        self.u.matmul(&self.s)?.matmul(&self.v.hermitian())
    }
}

/// Channel SVD front end.
#[derive(Debug, Clone, Default)]
pub struct SvdEngine<P: SvdPrimitive = NalgebraSvd> {
    primitive: P,
}

impl SvdEngine<NalgebraSvd> {
    /// Engine using the `nalgebra` primitive.
    pub fn new() -> Self {
        Self {
            primitive: NalgebraSvd,
        }
    }
}

impl<P: SvdPrimitive> SvdEngine<P> {
    /// Engine using a caller-provided primitive.
    pub fn with_primitive(primitive: P) -> Self {
        Self { primitive }
    }

    /// Decompose `H` directly. Used when `Nr >= Nt`.
    pub fn decompose_square_or_tall(&self, h: &ComplexMatrix) -> MimoResult<SvdFactors> {
        self.decompose_real(h, "decompose_square_or_tall")
    }

    /// Decompose `Hᵗ` (shape `Nt x Nr`). Used when `Nr < Nt`.
    ///
    /// The returned factors describe `Hᵗ`; call [`SvdFactors::swap_roles`]
    /// to obtain the factors of `H`.
    pub fn decompose_transposed(&self, h_t: &ComplexMatrix) -> MimoResult<SvdFactors> {
        self.decompose_real(h_t, "decompose_transposed")
    }

    fn decompose_real(&self, m: &ComplexMatrix, op: &'static str) -> MimoResult<SvdFactors> {
        let (rows, cols) = m.shape();
        if rows < cols {
            return Err(MimoError::shape(op, (rows, cols), (cols, rows)));
        }
        if m.has_imaginary() {
            warn!(
                rows,
                cols, "complex matrix passed to SVD, using only the real part"
            );
        }

        let a = DMatrix::from_fn(rows, cols, |r, c| m.get(r, c).re);
        let real = self.primitive.decompose(a)?;
        let k = real.singular_values.len();

        let u = ComplexMatrix::from_fn(real.u.nrows(), real.u.ncols(), |r, c| {
            Complex::new(real.u[(r, c)], 0.0)
        })?;
        let v = ComplexMatrix::from_fn(real.v.nrows(), real.v.ncols(), |r, c| {
            Complex::new(real.v[(r, c)], 0.0)
        })?;
        let s = ComplexMatrix::from_fn(k, k, |r, c| {
            if r == c {
                Complex::new(real.singular_values[r], 0.0)
            } else {
                Complex::new(0.0, 0.0)
            }
        })?;

        Ok(SvdFactors { u, s, v })
    }
}
