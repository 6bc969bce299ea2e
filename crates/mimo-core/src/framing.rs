//! Framing — bit packing, padding and layer mapping
//!
//! Turns a byte payload into the symbol-index stream fed to the link and
//! back:
//!
//! ```text
//! bytes ──► dibits (LSB pair first) ──► pad to a multiple of Nstream
//!       ──► layer map (round-robin over streams) ──► Nstream × Nvectors
//! ```
//!
//! Symbol `i` of the padded stream goes to stream `i % Nstream`, vector
//! `i / Nstream`. Padding uses [`INVALID_SYMBOL`] as filler.
//!
//! ## Example
//!
//! ```rust
//! use mimo_core::framing::{bytes_to_symbols, pad, padding_for};
//!
//! let symbols = bytes_to_symbols(&[0xA5]);
//! assert_eq!(symbols, vec![1, 1, 2, 2]);
//! assert_eq!(padding_for(symbols.len(), 4), 0);
//! assert_eq!(pad(&symbols, 3).len(), 6);
//! ```

use crate::qam::INVALID_SYMBOL;
use crate::types::{SymbolIndex, MimoError, MimoResult};

/// Dibits per byte.
pub const SYMBOLS_PER_BYTE: usize = 4;

/// Split every byte into four 2-bit indices, least significant pair first.
pub fn bytes_to_symbols(bytes: &[u8]) -> Vec<SymbolIndex> {
    bytes
        .iter()
        .flat_map(|&b| (0..SYMBOLS_PER_BYTE).map(move |j| (b >> (2 * j)) & 0b11))
        .collect()
}

/// Pack groups of four indices back into bytes.
///
/// Only the low two bits of each index are used, so a sentinel contributes
/// `00`. A trailing incomplete group is packed with the missing dibits zero.
pub fn symbols_to_bytes(symbols: &[SymbolIndex]) -> Vec<u8> {
    symbols
        .chunks(SYMBOLS_PER_BYTE)
        .map(|group| {
            group
                .iter()
                .enumerate()
                .fold(0u8, |byte, (j, &s)| byte | ((s & 0b11) << (2 * j)))
        })
        .collect()
}

/// Filler symbols needed to make `len` a multiple of `n_streams`.
pub fn padding_for(len: usize, n_streams: usize) -> usize {
    if n_streams == 0 || len % n_streams == 0 {
        0
    } else {
        n_streams - len % n_streams
    }
}

/// Append filler symbols up to the next multiple of `n_streams`.
pub fn pad(symbols: &[SymbolIndex], n_streams: usize) -> Vec<SymbolIndex> {
    let extra = padding_for(symbols.len(), n_streams);
    let mut out = Vec::with_capacity(symbols.len() + extra);
    out.extend_from_slice(symbols);
    out.resize(symbols.len() + extra, INVALID_SYMBOL);
    out
}

/// Truncate a padded stream back to `original_len`.
pub fn depad(symbols: &[SymbolIndex], original_len: usize) -> Vec<SymbolIndex> {
    symbols[..original_len.min(symbols.len())].to_vec()
}

/// Distribute a padded stream over `n_streams` layers.
///
/// Returns one `Vec` per vector (column), each of length `n_streams`.
pub fn layer_map<T: Copy>(symbols: &[T], n_streams: usize) -> MimoResult<Vec<Vec<T>>> {
    if n_streams == 0 || symbols.len() % n_streams != 0 {
        return Err(MimoError::shape(
            "layer_map",
            (symbols.len(), 1),
            (n_streams, 0),
        ));
    }
    Ok(symbols.chunks(n_streams).map(<[T]>::to_vec).collect())
}

/// Inverse of [`layer_map`]: read vectors back in transmission order.
pub fn layer_demap<T: Copy>(vectors: &[Vec<T>]) -> Vec<T> {
    vectors.iter().flatten().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_split_lsb_first() {
        assert_eq!(bytes_to_symbols(&[0xA5]), vec![1, 1, 2, 2]);
        assert_eq!(bytes_to_symbols(&[0x00]), vec![0, 0, 0, 0]);
        assert_eq!(bytes_to_symbols(&[0xFF]), vec![3, 3, 3, 3]);
        assert_eq!(bytes_to_symbols(&[0x1B]), vec![3, 2, 1, 0]);
    }

    #[test]
    fn test_pack_unpack() {
        let payload = b"Hello, MIMO!".to_vec();
        assert_eq!(symbols_to_bytes(&bytes_to_symbols(&payload)), payload);
    }

    #[test]
    fn test_sentinel_packs_as_zero() {
        assert_eq!(symbols_to_bytes(&[INVALID_SYMBOL, 1, 2, 2]), vec![0xA4]);
    }

    #[test]
    fn test_padding_counts() {
        assert_eq!(padding_for(4, 4), 0);
        assert_eq!(padding_for(5, 4), 3);
        assert_eq!(padding_for(8, 3), 1);
        assert_eq!(padding_for(0, 2), 0);
        assert_eq!(padding_for(7, 1), 0);
    }

    #[test]
    fn test_pad_fills_with_sentinel() {
        let padded = pad(&[0, 1, 2], 2);
        assert_eq!(padded, vec![0, 1, 2, INVALID_SYMBOL]);
    }

    #[test]
    fn test_depad_inverts_pad() {
        let stream: Vec<SymbolIndex> = (0..23).map(|i| (i % 4) as u8).collect();
        for len in 0..stream.len() {
            for n in 1..9 {
                let s = &stream[..len];
                assert_eq!(depad(&pad(s, n), len), s);
            }
        }
    }

    #[test]
    fn test_layer_mapping_round_robin() {
        let s = vec![10, 11, 12, 13, 14, 15];
        let layers = layer_map(&s, 3).unwrap();
        assert_eq!(layers, vec![vec![10, 11, 12], vec![13, 14, 15]]);
        // symbol 4 -> stream 1, vector 1
        assert_eq!(layers[1][1], 14);
        assert_eq!(layer_demap(&layers), s);
    }

    #[test]
    fn test_layer_map_requires_padding() {
        assert!(layer_map(&[1, 2, 3], 2).is_err());
        assert!(layer_map(&[1, 2], 0).is_err());
    }
}
