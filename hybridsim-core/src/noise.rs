//! Sources of Gaussian deviates.
//!
//! Stochastic models draw samples through the [`NoiseSource`] capability and never construct
//! a random number generator themselves. Seeding policy belongs to whoever builds the source.

use crate::errors::{SimError, SimResult};
use crate::FloatValue;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// A source of normally distributed samples
#[typetag::serde(tag = "type")]
pub trait NoiseSource: Debug + Send + Sync {
    /// Draw a single sample from `N(mean, std_dev^2)`
    fn sample(&mut self, mean: FloatValue, std_dev: FloatValue) -> SimResult<FloatValue>;
}

/// Seeded Gaussian source backed by ChaCha8
///
/// Serialises as its seed plus the position in the generator's stream, so a restored source
/// continues exactly where the original left off. A bare `seed` is the form used in scenario
/// files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "GaussianSourceRepr", into = "GaussianSourceRepr")]
pub struct GaussianSource {
    seed: u64,
    rng: ChaCha8Rng,
}

#[derive(Serialize, Deserialize)]
struct GaussianSourceRepr {
    seed: u64,
    #[serde(default)]
    word_pos: u64,
}

impl From<GaussianSourceRepr> for GaussianSource {
    fn from(repr: GaussianSourceRepr) -> Self {
        let mut source = Self::from_seed(repr.seed);
        source.rng.set_word_pos(u128::from(repr.word_pos));
        source
    }
}

impl From<GaussianSource> for GaussianSourceRepr {
    fn from(source: GaussianSource) -> Self {
        GaussianSourceRepr {
            seed: source.seed,
            word_pos: u64::try_from(source.rng.get_word_pos()).unwrap_or(u64::MAX),
        }
    }
}

impl GaussianSource {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// The seed the source was created from
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

#[typetag::serde]
impl NoiseSource for GaussianSource {
    fn sample(&mut self, mean: FloatValue, std_dev: FloatValue) -> SimResult<FloatValue> {
        // `Normal` accepts a negative deviation and reflects the sample
        if !(std_dev >= 0.0) {
            return Err(SimError::InvalidParameter(format!(
                "standard deviation must be non-negative, got {}",
                std_dev
            )));
        }
        let normal = Normal::new(mean, std_dev).map_err(|err| {
            SimError::InvalidParameter(format!(
                "cannot sample N({}, {}^2): {}",
                mean, std_dev, err
            ))
        })?;
        Ok(normal.sample(&mut self.rng))
    }
}
