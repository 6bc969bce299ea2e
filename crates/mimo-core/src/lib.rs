//! # MIMO Link Core
//!
//! Building blocks of an SVD-precoded multi-antenna (MIMO) link simulator.
//!
//! ## Overview
//!
//! A byte payload is split into 4-QAM symbols, spread over `min(Nr, Nt)`
//! spatial streams and sent through a random `Nr x Nt` channel with additive
//! Gaussian noise. The transmitter precodes with the right singular vectors
//! of the channel and the receiver combines with the left ones, so each
//! stream sees an independent scalar channel that a per-stream division
//! equalizes.
//!
//! - **Matrix algebra**: dense complex matrices ([`matrix`])
//! - **SVD**: channel decomposition for square/tall and wide channels ([`svd`])
//! - **Channel**: random channel and noise generation ([`channel`])
//! - **Pipeline**: precode, transmit, combine, equalize ([`pipeline`])
//! - **Statistics**: BER, SNR, EVM, capacity ([`stats`])
//!
//! ## Signal Flow
//!
//! ```text
//! TX: bytes → dibits → QAM map → pad → layer map → V·x
//! CH: H·xp + n
//! RX: U^H·xt → ÷ s_i → round → QAM demap → layer demap → depad → bytes
//! ```
//!
//! ## Example
//!
//! ```rust
//! use mimo_core::prelude::*;
//!
//! let mut model = ChannelModel::with_seed(1.0, 42).unwrap();
//! let link = MimoLink::generate(
//!     &mut model,
//!     8,
//!     4,
//!     NoiseLevel::VeryLow,
//!     ZeroSingularValuePolicy::default(),
//! ).unwrap();
//!
//! let payload = b"Hello MIMO";
//! let outcome = link.run(&bytes_to_symbols(payload), &mut model).unwrap();
//! let recovered = symbols_to_bytes(&outcome.recovered);
//! assert_eq!(recovered.len(), payload.len());
//! println!("BER = {}", outcome.statistics.ber);
//! ```

pub mod channel;
pub mod config;
pub mod framing;
pub mod matrix;
pub mod observe;
pub mod pipeline;
pub mod qam;
pub mod stats;
pub mod svd;
pub mod types;

pub use channel::{ChannelModel, NoiseLevel};
pub use config::{ConfigError, MimoConfig};
pub use matrix::ComplexMatrix;
pub use pipeline::{LinkOutcome, LinkRegime, MimoLink, ZeroSingularValuePolicy};
pub use stats::LinkStatistics;
pub use svd::{SvdEngine, SvdFactors};
pub use types::{Complex, MimoError, MimoResult, SymbolIndex};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::channel::{ChannelModel, NoiseLevel};
    pub use crate::framing::{bytes_to_symbols, symbols_to_bytes};
    pub use crate::matrix::ComplexMatrix;
    pub use crate::pipeline::{LinkOutcome, LinkRegime, MimoLink, ZeroSingularValuePolicy};
    pub use crate::stats::LinkStatistics;
    pub use crate::types::{Complex, MimoError, MimoResult, SymbolIndex};
}
