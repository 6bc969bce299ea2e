//! Link Statistics — symbol errors, BER, SNR, EVM and capacity
//!
//! Metrics compare the transmitted stream with what came out of the
//! equalizer:
//!
//! | Metric   | Definition                                              |
//! |----------|---------------------------------------------------------|
//! | errors   | positions where the recovered index differs             |
//! | BER      | `2 · errors / (2 · symbols)` (one QAM symbol = 2 bits)  |
//! | SNR (dB) | `10·log10(Σ|rx|² / Σ|tx − rx|²)`                        |
//! | EVM (dB) | `20·log10(sqrt(Σ|tx − rx|² / Σ|rx|²))`                  |
//! | capacity | `log2(1 + 10^(SNR/10))` bits/symbol                     |
//!
//! Both power ratios use the received power as reference. Degenerate inputs
//! never panic: zero error power gives SNR `+inf` and EVM `-inf`, zero
//! received power gives EVM `+inf`.
//!
//! ## Example
//!
//! ```rust
//! use mimo_core::stats::LinkStatistics;
//! use num_complex::Complex64;
//!
//! let tx = vec![0, 1, 2, 3];
//! let pts = vec![Complex64::new(1.0, 1.0); 4];
//! let stats = LinkStatistics::compute(&tx, &tx, &pts, &pts);
//! assert_eq!(stats.ber, 0.0);
//! assert!(stats.snr_db.is_infinite() && stats.snr_db > 0.0);
//! assert!(stats.evm_db.is_infinite() && stats.evm_db < 0.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::types::{Complex, SymbolIndex};

/// Positions where `transmitted` and `recovered` differ.
///
/// Only the common prefix is compared.
pub fn count_symbol_errors(transmitted: &[SymbolIndex], recovered: &[SymbolIndex]) -> usize {
    transmitted
        .iter()
        .zip(recovered)
        .filter(|(a, b)| a != b)
        .count()
}

/// Bit error rate for `symbol_errors` wrong symbols out of `symbols`.
pub fn bit_error_rate(symbol_errors: usize, symbols: usize) -> f64 {
    if symbols == 0 {
        return 0.0;
    }
    (2 * symbol_errors) as f64 / (2 * symbols) as f64
}

/// `(Σ|rx|², Σ|tx − rx|²)` over the common prefix.
fn powers(original: &[Complex], received: &[Complex]) -> (f64, f64) {
    original
        .iter()
        .zip(received)
        .fold((0.0, 0.0), |(sig, err), (&tx, &rx)| {
            (sig + rx.norm_sqr(), err + (tx - rx).norm_sqr())
        })
}

/// Signal-to-noise ratio in dB, `+inf` when there is no error power.
pub fn snr_db(original: &[Complex], received: &[Complex]) -> f64 {
    let (signal, noise) = powers(original, received);
    if noise == 0.0 {
        return f64::INFINITY;
    }
    10.0 * (signal / noise).log10()
}

/// Error vector magnitude in dB.
pub fn evm_db(original: &[Complex], received: &[Complex]) -> f64 {
    let (signal, error) = powers(original, received);
    if signal == 0.0 {
        return f64::INFINITY;
    }
    if error == 0.0 {
        return f64::NEG_INFINITY;
    }
    20.0 * (error / signal).sqrt().log10()
}

/// Shannon capacity per symbol for a given SNR in dB.
pub fn capacity(snr_db: f64) -> f64 {
    (1.0 + 10f64.powf(snr_db / 10.0)).log2()
}

/// Summary of one link run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinkStatistics {
    /// Data symbols compared (padding excluded).
    pub symbols: usize,
    pub symbol_errors: usize,
    /// `100 · symbol_errors / symbols`.
    pub error_percentage: f64,
    pub ber: f64,
    pub snr_db: f64,
    pub evm_db: f64,
    /// Bits per symbol.
    pub capacity: f64,
}

impl LinkStatistics {
    /// Compute all metrics.
    ///
    /// `transmitted`/`recovered` are data symbol indices without padding.
    /// `original`/`received` are the constellation points before the channel
    /// and after equalization (before rounding), padding included.
    pub fn compute(
        transmitted: &[SymbolIndex],
        recovered: &[SymbolIndex],
        original: &[Complex],
        received: &[Complex],
    ) -> Self {
        let symbols = transmitted.len();
        let symbol_errors = count_symbol_errors(transmitted, recovered);
        let error_percentage = if symbols == 0 {
            0.0
        } else {
            100.0 * symbol_errors as f64 / symbols as f64
        };
        let snr = snr_db(original, received);

        Self {
            symbols,
            symbol_errors,
            error_percentage,
            ber: bit_error_rate(symbol_errors, symbols),
            snr_db: snr,
            evm_db: evm_db(original, received),
            capacity: capacity(snr),
        }
    }
}

impl std::fmt::Display for LinkStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "QAM symbols transmitted: {}", self.symbols)?;
        writeln!(f, "Symbols received with error: {}", self.symbol_errors)?;
        writeln!(f, "Error percentage: {:.4}%", self.error_percentage)?;
        writeln!(f, "BER: {:.6}", self.ber)?;
        writeln!(f, "SNR: {:.6} dB", self.snr_db)?;
        writeln!(f, "EVM: {:.6} dB", self.evm_db)?;
        write!(f, "Capacity: {:.6} bit/symbol", self.capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn c(re: f64, im: f64) -> Complex {
        Complex::new(re, im)
    }

    #[test]
    fn test_error_count_and_ber() {
        let tx = [0, 1, 2, 3, 0, 1, 2, 3];
        let rx = [0, 1, 4, 3, 0, 2, 2, 3];
        assert_eq!(count_symbol_errors(&tx, &rx), 2);
        assert_relative_eq!(bit_error_rate(2, 8), 0.25);
        assert_eq!(bit_error_rate(0, 0), 0.0);
    }

    #[test]
    fn test_identical_signals() {
        let pts = vec![c(-1.0, 1.0), c(1.0, -1.0)];
        assert_eq!(snr_db(&pts, &pts), f64::INFINITY);
        assert_eq!(evm_db(&pts, &pts), f64::NEG_INFINITY);
        assert_eq!(capacity(f64::INFINITY), f64::INFINITY);
    }

    #[test]
    fn test_zero_received_power() {
        let tx = vec![c(1.0, 1.0)];
        let rx = vec![c(0.0, 0.0)];
        assert_eq!(evm_db(&tx, &rx), f64::INFINITY);
        assert_eq!(snr_db(&tx, &rx), f64::NEG_INFINITY);
        assert_relative_eq!(capacity(snr_db(&tx, &rx)), 0.0);
    }

    #[test]
    fn test_known_values() {
        // error power 0.1^2, signal power 0.9^2 + 1^2
        let tx = vec![c(1.0, 1.0)];
        let rx = vec![c(0.9, 1.0)];
        let signal: f64 = 0.81 + 1.0;
        let error: f64 = 0.01;
        assert_relative_eq!(snr_db(&tx, &rx), 10.0 * (signal / error).log10(), epsilon = 1e-9);
        assert_relative_eq!(
            evm_db(&tx, &rx),
            20.0 * (error / signal).sqrt().log10(),
            epsilon = 1e-9
        );
        assert_relative_eq!(evm_db(&tx, &rx), -snr_db(&tx, &rx), epsilon = 1e-9);
    }

    #[test]
    fn test_capacity() {
        assert_relative_eq!(capacity(0.0), 1.0, epsilon = 1e-12);
        assert_relative_eq!(capacity(10.0 * 3.0f64.log10()), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_percentage_is_fractional() {
        let tx = [0, 1, 2];
        let rx = [0, 1, 3];
        let pts = vec![c(1.0, 1.0); 3];
        let stats = LinkStatistics::compute(&tx, &rx, &pts, &pts);
        assert_eq!(stats.symbol_errors, 1);
        assert_relative_eq!(stats.error_percentage, 100.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(stats.ber, 1.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_display_summary() {
        let pts = vec![c(1.0, 1.0)];
        let stats = LinkStatistics::compute(&[2], &[2], &pts, &pts);
        let text = stats.to_string();
        assert!(text.contains("QAM symbols transmitted: 1"));
        assert!(text.contains("SNR: inf dB"));
    }
}
