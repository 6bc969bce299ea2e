//! MIMO Link Pipeline — SVD precoding, transmission, combining, equalization
//!
//! For every column vector `x` of the stream matrix:
//!
//! ```text
//!   x ──► V·x ──► H·xp + n ──► U^H·xt ──► xc[i] / s_i ──► round ──► demap
//!         precode   transmit     combine     equalize
//! ```
//!
//! With `H = U·S·V^H`, the chain reduces to `xf = x + S⁻¹·U^H·n`: each
//! stream sees a scalar channel whose gain is its singular value.
//!
//! ## Regimes
//!
//! The regime is picked once per channel:
//!
//! | Regime         | Condition | Factors used                                      |
//! |----------------|-----------|---------------------------------------------------|
//! | `SquareOrTall` | Nr >= Nt  | SVD of `H`: U Nr×Nt, S Nt×Nt, V Nt×Nt             |
//! | `Wide`         | Nr < Nt   | SVD of `Hᵗ` with roles swapped: U Nr×Nr, S Nr×Nr, V Nt×Nr |
//!
//! In both cases `Nstream = min(Nr, Nt)`.
//!
//! ## Example
//!
//! ```rust
//! use mimo_core::channel::{ChannelModel, NoiseLevel};
//! use mimo_core::framing::bytes_to_symbols;
//! use mimo_core::pipeline::{MimoLink, ZeroSingularValuePolicy};
//!
//! let mut model = ChannelModel::with_seed(1.0, 7).unwrap();
//! let link = MimoLink::generate(
//!     &mut model,
//!     4,
//!     2,
//!     NoiseLevel::VeryLow,
//!     ZeroSingularValuePolicy::default(),
//! ).unwrap();
//!
//! let symbols = bytes_to_symbols(b"hi");
//! let outcome = link.run(&symbols, &mut model).unwrap();
//! assert_eq!(outcome.recovered.len(), symbols.len());
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::channel::{ChannelModel, NoiseLevel};
use crate::framing::{depad, layer_demap, layer_map, pad, padding_for};
use crate::matrix::ComplexMatrix;
use crate::qam::{demap_symbol, map_symbol, round_symbol};
use crate::stats::LinkStatistics;
use crate::svd::{NalgebraSvd, SvdEngine, SvdFactors, SvdPrimitive};
use crate::types::{Complex, MimoError, MimoResult, SymbolIndex};

/// Antenna regime, chosen once per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkRegime {
    /// `Nr >= Nt`: decompose `H` directly.
    SquareOrTall,
    /// `Nr < Nt`: decompose `Hᵗ` and swap factor roles.
    Wide,
}

impl LinkRegime {
    pub fn select(nr: usize, nt: usize) -> Self {
        if nr < nt {
            Self::Wide
        } else {
            Self::SquareOrTall
        }
    }
}

impl std::fmt::Display for LinkRegime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SquareOrTall => write!(f, "square/tall"),
            Self::Wide => write!(f, "wide"),
        }
    }
}

/// What the equalizer does with a stream whose singular value is zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ZeroSingularValuePolicy {
    /// Output `0 + 0i` for the stream; it demaps to the invalid symbol.
    #[default]
    ZeroStream,
    /// Divide by `epsilon` whenever `|s| < epsilon`.
    Clamp { epsilon: f64 },
    /// Abort with [`MimoError::DivisionByZeroSingularValue`].
    Fail,
}

/// Result of sending a symbol stream through a [`MimoLink`].
#[derive(Debug, Clone, PartialEq)]
pub struct LinkOutcome {
    /// Recovered data symbols, padding removed.
    pub recovered: Vec<SymbolIndex>,
    /// Equalized (unrounded) symbols in transmission order, padding included.
    pub received: Vec<Complex>,
    /// Filler symbols appended before layer mapping.
    pub padding: usize,
    pub n_streams: usize,
    pub statistics: LinkStatistics,
}

impl LinkOutcome {
    /// Number of transmitted vectors.
    pub fn vectors(&self) -> usize {
        if self.n_streams == 0 {
            0
        } else {
            self.received.len() / self.n_streams
        }
    }

    /// Received stream matrix, `Nstream x vectors`: column `j` is vector `j`.
    pub fn stream_matrix(&self) -> MimoResult<ComplexMatrix> {
        let n = self.n_streams;
        ComplexMatrix::from_fn(n, self.vectors(), |r, c| self.received[c * n + r])
    }
}

/// An SVD-precoded link over one fixed channel matrix.
///
/// `H` and its factors are computed once and only read afterwards.
#[derive(Debug, Clone)]
pub struct MimoLink {
    nr: usize,
    nt: usize,
    n_streams: usize,
    regime: LinkRegime,
    noise: NoiseLevel,
    policy: ZeroSingularValuePolicy,
    h: ComplexMatrix,
    factors: SvdFactors,
    /// `U^H`, cached for the combiner.
    u_h: ComplexMatrix,
    singular_values: Vec<f64>,
}

impl MimoLink {
    /// Link over `h` using the `nalgebra` SVD.
    pub fn new(
        h: ComplexMatrix,
        noise: NoiseLevel,
        policy: ZeroSingularValuePolicy,
    ) -> MimoResult<Self> {
        Self::with_engine(h, noise, policy, &SvdEngine::<NalgebraSvd>::new())
    }

    /// Draw a random `nr x nt` channel from `model` and build the link.
    pub fn generate(
        model: &mut ChannelModel,
        nr: usize,
        nt: usize,
        noise: NoiseLevel,
        policy: ZeroSingularValuePolicy,
    ) -> MimoResult<Self> {
        let h = model.generate_channel(nr, nt)?;
        Self::new(h, noise, policy)
    }

    /// Link over `h` using a caller-provided SVD engine.
    pub fn with_engine<P: SvdPrimitive>(
        h: ComplexMatrix,
        noise: NoiseLevel,
        policy: ZeroSingularValuePolicy,
        engine: &SvdEngine<P>,
    ) -> MimoResult<Self> {
        if let ZeroSingularValuePolicy::Clamp { epsilon } = policy {
            if !(epsilon.is_finite() && epsilon > 0.0) {
                return Err(MimoError::InvalidClampEpsilon(epsilon));
            }
        }

        let (nr, nt) = h.shape();
        let regime = LinkRegime::select(nr, nt);
        let n_streams = nr.min(nt);

        let factors = match regime {
            LinkRegime::SquareOrTall => engine.decompose_square_or_tall(&h)?,
            LinkRegime::Wide => engine.decompose_transposed(&h.transpose())?.swap_roles(),
        };

        let singular_values = factors.singular_values();
        if factors.s.shape() != (n_streams, n_streams) || factors.v.shape() != (nt, n_streams) {
            return Err(MimoError::shape(
                "svd_factors",
                factors.s.shape(),
                (n_streams, n_streams),
            ));
        }
        for (stream, &s) in singular_values.iter().enumerate() {
            if s == 0.0 {
                warn!(stream, policy = ?policy, "zero singular value");
            }
        }

        debug!(
            nr,
            nt,
            n_streams,
            %regime,
            max_singular_value = singular_values.first().copied().unwrap_or(0.0),
            "link ready"
        );

        let u_h = factors.u.hermitian();
        Ok(Self {
            nr,
            nt,
            n_streams,
            regime,
            noise,
            policy,
            h,
            factors,
            u_h,
            singular_values,
        })
    }

    pub fn nr(&self) -> usize {
        self.nr
    }

    pub fn nt(&self) -> usize {
        self.nt
    }

    /// `min(Nr, Nt)`.
    pub fn n_streams(&self) -> usize {
        self.n_streams
    }

    pub fn regime(&self) -> LinkRegime {
        self.regime
    }

    pub fn noise(&self) -> NoiseLevel {
        self.noise
    }

    pub fn channel(&self) -> &ComplexMatrix {
        &self.h
    }

    /// `U`, `S`, `V` of the channel, already relabeled in the wide regime.
    pub fn factors(&self) -> &SvdFactors {
        &self.factors
    }

    pub fn singular_values(&self) -> &[f64] {
        &self.singular_values
    }

    /// `xp = V · x`.
    pub fn precode(&self, x: &ComplexMatrix) -> MimoResult<ComplexMatrix> {
        self.factors.v.matmul(x)
    }

    /// `xt = H · xp + noise`.
    pub fn transmit(&self, xp: &ComplexMatrix, noise: &ComplexMatrix) -> MimoResult<ComplexMatrix> {
        self.h.matmul(xp)?.add(noise)
    }

    /// `xc = U^H · xt`.
    pub fn combine(&self, xt: &ComplexMatrix) -> MimoResult<ComplexMatrix> {
        self.u_h.matmul(xt)
    }

    /// `xf[i] = xc[i] / s_i`, one row per stream.
    pub fn equalize(&self, xc: &ComplexMatrix) -> MimoResult<ComplexMatrix> {
        if xc.rows() != self.n_streams {
            return Err(MimoError::shape(
                "equalize",
                xc.shape(),
                (self.n_streams, xc.cols()),
            ));
        }
        let mut xf = xc.clone();
        for (stream, &s) in self.singular_values.iter().enumerate() {
            let divisor = match self.policy {
                ZeroSingularValuePolicy::Clamp { epsilon } if s.abs() < epsilon => Some(epsilon),
                _ if s != 0.0 => Some(s),
                ZeroSingularValuePolicy::Fail => {
                    return Err(MimoError::DivisionByZeroSingularValue { stream })
                }
                _ => None,
            };
            for c in 0..xc.cols() {
                let out = match divisor {
                    Some(d) => xc.get(stream, c) / d,
                    None => Complex::new(0.0, 0.0),
                };
                xf.set(stream, c, out);
            }
        }
        Ok(xf)
    }

    /// Full chain for one vector with the given noise realization.
    pub fn transmit_vector_with_noise(
        &self,
        x: &ComplexMatrix,
        noise: &ComplexMatrix,
    ) -> MimoResult<ComplexMatrix> {
        let xp = self.precode(x)?;
        let xt = self.transmit(&xp, noise)?;
        let xc = self.combine(&xt)?;
        self.equalize(&xc)
    }

    /// Full chain for one vector; fresh noise is drawn from `model`.
    pub fn transmit_vector(
        &self,
        x: &ComplexMatrix,
        model: &mut ChannelModel,
    ) -> MimoResult<ComplexMatrix> {
        let noise = model.generate_noise(self.nr, 1, self.noise)?;
        self.transmit_vector_with_noise(x, &noise)
    }

    /// Send a whole symbol stream: pad, layer map, transmit every vector,
    /// demap, depad and compute statistics.
    pub fn run(&self, symbols: &[SymbolIndex], model: &mut ChannelModel) -> MimoResult<LinkOutcome> {
        let (padded, vectors) = self.frame(symbols)?;
        let mut columns = Vec::with_capacity(vectors.len());
        for (index, vector) in vectors.iter().enumerate() {
            let x = Self::modulate(vector)?;
            let xf = self.transmit_vector(&x, model)?;
            trace!(vector = index, "vector transmitted");
            columns.push(xf.as_slice().to_vec());
        }
        Ok(self.finish(symbols, &padded, layer_demap(&columns)))
    }

    /// Like [`MimoLink::run`], with vectors transmitted on the rayon pool.
    ///
    /// Vector `i` draws its noise from a generator derived from the model
    /// seed and `i`, so the outcome does not depend on scheduling. It is not
    /// the same noise realization as the sequential path.
    #[cfg(feature = "parallel")]
    pub fn run_parallel(
        &self,
        symbols: &[SymbolIndex],
        model: &ChannelModel,
    ) -> MimoResult<LinkOutcome> {
        use rayon::prelude::*;

        let (padded, vectors) = self.frame(symbols)?;
        let columns = vectors
            .par_iter()
            .enumerate()
            .map(|(index, vector)| {
                let x = Self::modulate(vector)?;
                let noise = model.noise_for_vector(index, self.nr, self.noise)?;
                self.transmit_vector_with_noise(&x, &noise)
            })
            .collect::<MimoResult<Vec<_>>>()?;

        let columns: Vec<Vec<Complex>> = columns.iter().map(|xf| xf.as_slice().to_vec()).collect();
        Ok(self.finish(symbols, &padded, layer_demap(&columns)))
    }

    fn frame(&self, symbols: &[SymbolIndex]) -> MimoResult<(Vec<SymbolIndex>, Vec<Vec<SymbolIndex>>)> {
        let padded = pad(symbols, self.n_streams);
        debug!(
            symbols = symbols.len(),
            padding = padding_for(symbols.len(), self.n_streams),
            n_streams = self.n_streams,
            "stream framed"
        );
        let vectors = layer_map(&padded, self.n_streams)?;
        Ok((padded, vectors))
    }

    fn modulate(vector: &[SymbolIndex]) -> MimoResult<ComplexMatrix> {
        let points: Vec<Complex> = vector.iter().map(|&s| map_symbol(s)).collect();
        ComplexMatrix::from_column(&points)
    }

    fn finish(
        &self,
        symbols: &[SymbolIndex],
        padded: &[SymbolIndex],
        received: Vec<Complex>,
    ) -> LinkOutcome {
        let original: Vec<Complex> = padded.iter().map(|&s| map_symbol(s)).collect();
        let demapped: Vec<SymbolIndex> = received
            .iter()
            .map(|&z| demap_symbol(round_symbol(z)))
            .collect();
        let recovered = depad(&demapped, symbols.len());
        let statistics = LinkStatistics::compute(symbols, &recovered, &original, &received);

        LinkOutcome {
            recovered,
            received,
            padding: padded.len() - symbols.len(),
            n_streams: self.n_streams,
            statistics,
        }
    }
}

/// One-shot helper: `(Nr, Nt, noise selector, symbols) → outcome` over a
/// unit-variance random channel.
pub fn simulate(
    nr: usize,
    nt: usize,
    noise_selector: u8,
    symbols: &[SymbolIndex],
    seed: Option<u64>,
) -> MimoResult<LinkOutcome> {
    let noise = NoiseLevel::from_selector(noise_selector)?;
    let mut model = ChannelModel::new(1.0, seed)?;
    let link = MimoLink::generate(&mut model, nr, nt, noise, ZeroSingularValuePolicy::default())?;
    link.run(symbols, &mut model)
}
