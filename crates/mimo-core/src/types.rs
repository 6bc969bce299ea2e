//! Core types for the MIMO link
//!
//! This module defines the fundamental value types shared by every stage of
//! the link, and the error taxonomy used across the crate.
//!
//! ## Symbols on the wire
//!
//! Each QAM symbol is a complex number whose real part is the in-phase (I)
//! component and whose imaginary part is the quadrature (Q) component:
//!
//! ```text
//!            Q (Imaginary)
//!            ^
//!   00 (-1,+1) *   |   * 10 (+1,+1)
//!                  |
//!   ---------------+---------------> I (Real)
//!                  |
//!   01 (-1,-1) *   |   * 11 (+1,-1)
//! ```

use num_complex::Complex64;

/// Type alias for complex numbers using f64 precision
pub type Complex = Complex64;

/// Index of a QAM symbol (0..=3 for data, 4 for filler / invalid).
pub type SymbolIndex = u8;

/// Result type for link operations
pub type MimoResult<T> = Result<T, MimoError>;

/// Errors that can occur while building or running a link.
///
/// A complex-valued channel handed to the SVD engine is *not* an error: it is
/// reported as a `tracing` warning and the real part is used.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MimoError {
    #[error("cannot allocate a {rows}x{cols} matrix")]
    Allocation { rows: usize, cols: usize },

    #[error("shape mismatch in {op}: left is {left:?}, right is {right:?}")]
    ShapeMismatch {
        op: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    },

    #[error("invalid noise level selector {0}. Must be between 0 and 3")]
    InvalidNoiseLevel(u8),

    #[error("invalid noise standard deviation {0}. Must be finite and non-negative")]
    InvalidNoiseStdDev(f64),

    #[error("invalid clamp epsilon {0}. Must be finite and positive")]
    InvalidClampEpsilon(f64),

    #[error("singular value of stream {stream} is zero, cannot equalize")]
    DivisionByZeroSingularValue { stream: usize },

    #[error("invalid antenna configuration: Nr={nr}, Nt={nt}")]
    InvalidDimensions { nr: usize, nt: usize },

    #[error("SVD failed: {0}")]
    Svd(String),
}

impl MimoError {
    pub(crate) fn shape(
        op: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    ) -> Self {
        MimoError::ShapeMismatch { op, left, right }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = MimoError::InvalidNoiseLevel(7);
        assert_eq!(
            err.to_string(),
            "invalid noise level selector 7. Must be between 0 and 3"
        );

        let err = MimoError::shape("matmul", (2, 3), (2, 3));
        assert!(err.to_string().contains("matmul"));
        assert!(err.to_string().contains("(2, 3)"));
    }
}
