//! QAM Mapper — 4-point constellation used on every spatial stream
//!
//! ```text
//! index  bits  point
//!   0     00   (-1, +1)
//!   1     01   (-1, -1)
//!   2     10   (+1, +1)
//!   3     11   (+1, -1)
//! ```
//!
//! Indices outside 0..=3 map to the origin. The demapper is exact: only the
//! four constellation points map back to an index, everything else becomes
//! [`INVALID_SYMBOL`]. Received symbols are therefore rounded first (see
//! [`round_symbol`]).

use crate::types::{Complex, SymbolIndex};

/// Demapper output for anything that is not a constellation point. Also the
/// filler index used for padding.
pub const INVALID_SYMBOL: SymbolIndex = 4;

/// Constellation points in index order.
pub const CONSTELLATION: [Complex; 4] = [
    Complex::new(-1.0, 1.0),
    Complex::new(-1.0, -1.0),
    Complex::new(1.0, 1.0),
    Complex::new(1.0, -1.0),
];

/// Constellation point of `index`, or `0 + 0i` for an out-of-range index.
pub fn map_symbol(index: SymbolIndex) -> Complex {
    CONSTELLATION
        .get(usize::from(index))
        .copied()
        .unwrap_or(Complex::new(0.0, 0.0))
}

/// Index of an exact constellation point, or [`INVALID_SYMBOL`].
pub fn demap_symbol(point: Complex) -> SymbolIndex {
    CONSTELLATION
        .iter()
        .position(|&c| c == point)
        .map_or(INVALID_SYMBOL, |i| i as SymbolIndex)
}

/// Round both components to the nearest integer (halves away from zero).
pub fn round_symbol(z: Complex) -> Complex {
    Complex::new(z.re.round(), z.im.round())
}

pub fn map_symbols(indices: &[SymbolIndex]) -> Vec<Complex> {
    indices.iter().map(|&i| map_symbol(i)).collect()
}

pub fn demap_symbols(points: &[Complex]) -> Vec<SymbolIndex> {
    points.iter().map(|&p| demap_symbol(p)).collect()
}
