//! Channel Model — random MIMO channel matrices and additive noise
//!
//! Generates the flat-fading channel matrix `H` (Nr×Nt, real Gaussian
//! entries, zero imaginary part) and the complex Gaussian noise added to every
//! transmitted vector.
//!
//! ## Noise levels
//!
//! | Selector | Level      | Std. dev. per I/Q component |
//! |----------|------------|-----------------------------|
//! | 0        | `VeryLow`  | 0.001                       |
//! | 1        | `Low`      | 0.01                        |
//! | 2        | `Medium`   | 0.5                         |
//! | 3        | `High`     | 1.0                         |
//!
//! `NoiseLevel::Custom` takes an explicit standard deviation; `Custom(0.0)`
//! gives an exactly noiseless channel.
//!
//! All randomness comes from one `StdRng` owned by the model and seeded once.
//! The seed is kept so that per-vector generators can be derived from it.
//!
//! ## Example
//!
//! ```rust
//! use mimo_core::channel::{ChannelModel, NoiseLevel};
//!
//! let mut model = ChannelModel::with_seed(1.0, 42).unwrap();
//! let h = model.generate_channel(4, 2).unwrap();
//! assert_eq!(h.shape(), (4, 2));
//! assert!(!h.has_imaginary());
//!
//! let level = NoiseLevel::from_selector(2).unwrap();
//! let n = model.generate_noise(4, 1, level).unwrap();
//! assert_eq!(n.shape(), (4, 1));
//! ```

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::matrix::ComplexMatrix;
use crate::types::{Complex, MimoError, MimoResult};

/// Additive noise level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseLevel {
    VeryLow,
    Low,
    Medium,
    High,
    /// Explicit standard deviation per I/Q component.
    Custom(f64),
}

impl NoiseLevel {
    /// Map the numeric selector 0..=3 to a level.
    pub fn from_selector(selector: u8) -> MimoResult<Self> {
        match selector {
            0 => Ok(Self::VeryLow),
            1 => Ok(Self::Low),
            2 => Ok(Self::Medium),
            3 => Ok(Self::High),
            other => Err(MimoError::InvalidNoiseLevel(other)),
        }
    }

    /// Numeric selector, `None` for custom levels.
    pub fn selector(&self) -> Option<u8> {
        match self {
            Self::VeryLow => Some(0),
            Self::Low => Some(1),
            Self::Medium => Some(2),
            Self::High => Some(3),
            Self::Custom(_) => None,
        }
    }

    /// Standard deviation of each noise component.
    pub fn std_dev(&self) -> f64 {
        match self {
            Self::VeryLow => 0.001,
            Self::Low => 0.01,
            Self::Medium => 0.5,
            Self::High => 1.0,
            Self::Custom(s) => *s,
        }
    }

    fn distribution(&self) -> MimoResult<Normal<f64>> {
        let std_dev = self.std_dev();
        if !std_dev.is_finite() || std_dev < 0.0 {
            return Err(MimoError::InvalidNoiseStdDev(std_dev));
        }
        Normal::new(0.0, std_dev).map_err(|_| MimoError::InvalidNoiseStdDev(std_dev))
    }
}

impl std::fmt::Display for NoiseLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.selector() {
            Some(s) => write!(f, "{}", s),
            None => write!(f, "custom({})", self.std_dev()),
        }
    }
}

/// Seeded generator of channel matrices and noise.
#[derive(Debug, Clone)]
pub struct ChannelModel {
    /// Standard deviation of the channel coefficients.
    sigma: f64,
    seed: u64,
    rng: StdRng,
}

impl ChannelModel {
    /// Model with an explicit seed.
    pub fn with_seed(sigma: f64, seed: u64) -> MimoResult<Self> {
        if !sigma.is_finite() || sigma < 0.0 {
            return Err(MimoError::InvalidNoiseStdDev(sigma));
        }
        debug!(sigma, seed, "channel model seeded");
        Ok(Self {
            sigma,
            seed,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// Model seeded from `seed`, or from OS entropy when `None`.
    pub fn new(sigma: f64, seed: Option<u64>) -> MimoResult<Self> {
        let seed = match seed {
            Some(s) => s,
            None => rand::random(),
        };
        Self::with_seed(sigma, seed)
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Seed the generator was created with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Random `nr x nt` channel: real part ~ N(0, sigma), imaginary part 0.
    pub fn generate_channel(&mut self, nr: usize, nt: usize) -> MimoResult<ComplexMatrix> {
        if nr == 0 || nt == 0 {
            return Err(MimoError::InvalidDimensions { nr, nt });
        }
        let dist = Normal::new(0.0, self.sigma)
            .map_err(|_| MimoError::InvalidNoiseStdDev(self.sigma))?;
        let rng = &mut self.rng;
        ComplexMatrix::from_fn(nr, nt, |_, _| Complex::new(dist.sample(rng), 0.0))
    }

    /// `rows x cols` noise; real and imaginary parts drawn independently.
    pub fn generate_noise(
        &mut self,
        rows: usize,
        cols: usize,
        level: NoiseLevel,
    ) -> MimoResult<ComplexMatrix> {
        noise_matrix(&mut self.rng, rows, cols, level)
    }

    /// Noise for vector `index` from a generator derived from the model seed.
    ///
    /// Independent of call order, which makes it usable from worker threads.
    pub fn noise_for_vector(
        &self,
        index: usize,
        rows: usize,
        level: NoiseLevel,
    ) -> MimoResult<ComplexMatrix> {
        let mut rng = StdRng::seed_from_u64(derive_seed(self.seed, index));
        noise_matrix(&mut rng, rows, 1, level)
    }
}

fn derive_seed(seed: u64, index: usize) -> u64 {
    // index scaled by the 64-bit golden ratio constant
    seed ^ (index as u64)
        .wrapping_add(1)
        .wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

fn noise_matrix(
    rng: &mut StdRng,
    rows: usize,
    cols: usize,
    level: NoiseLevel,
) -> MimoResult<ComplexMatrix> {
    let dist = level.distribution()?;
    ComplexMatrix::from_fn(rows, cols, |_, _| {
        let re = dist.sample(rng);
        let im = dist.sample(rng);
        Complex::new(re, im)
    })
}
