//! Parametric distributions used for per-individual trait sampling.
//!
//! Every distribution draws from the caller's RNG, so one seeded generator
//! threaded through a run reproduces it exactly. In configuration files a
//! distribution is a tagged map:
//!
//! ```yaml
//! type: weibull_min
//! shape: 2.2472
//! scale: 6.2131
//! loc: 0.7275
//! ```

use crate::errors::ConfigError;
use rand::Rng;
use rand_distr::{Distribution, Exp1, StandardNormal};
use serde::{Deserialize, Serialize};

/// One weighted Gaussian component of a [`Dist::NormalMixture`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MixtureComponent {
    pub weight: f64,
    pub mean: f64,
    pub std: f64,
}

/// A univariate distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Dist {
    /// Always returns `value`.
    Constant { value: f64 },
    /// Uniform on `[low, high)`.
    Uniform { low: f64, high: f64 },
    /// Gaussian with mean and standard deviation.
    Normal { mean: f64, std: f64 },
    /// Three-parameter Weibull: `loc + scale * W` with `W ~ Weibull(shape, 1)`.
    WeibullMin { shape: f64, scale: f64, loc: f64 },
    /// Weighted Gaussian mixture; samples are folded to their absolute value.
    ///
    /// Approximates a kernel density fitted to pooled field measurements.
    /// Draws come from the fitted components, not from a resampled KDE.
    NormalMixture { components: Vec<MixtureComponent> },
}

impl Dist {
    pub fn constant(value: f64) -> Self {
        Dist::Constant { value }
    }

    pub fn uniform(low: f64, high: f64) -> Self {
        Dist::Uniform { low, high }
    }

    pub fn normal(mean: f64, std: f64) -> Self {
        Dist::Normal { mean, std }
    }

    pub fn weibull_min(shape: f64, scale: f64, loc: f64) -> Self {
        Dist::WeibullMin { shape, scale, loc }
    }

    /// Draw a single value.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self {
            Dist::Constant { value } => *value,
            Dist::Uniform { low, high } => low + (high - low) * rng.random::<f64>(),
            Dist::Normal { mean, std } => {
                let z: f64 = StandardNormal.sample(rng);
                mean + std * z
            }
            Dist::WeibullMin { shape, scale, loc } => {
                let e: f64 = Exp1.sample(rng);
                loc + scale * e.powf(1.0 / shape)
            }
            Dist::NormalMixture { components } => {
                let Some(&last) = components.last() else {
                    return 0.0;
                };
                let total: f64 = components.iter().map(|c| c.weight).sum();
                let target = rng.random::<f64>() * total;
                let mut cumulative = 0.0;
                // Last component when rounding leaves `target` past the final sum.
                let mut chosen = last;
                for component in components {
                    cumulative += component.weight;
                    if target < cumulative {
                        chosen = *component;
                        break;
                    }
                }
                let z: f64 = StandardNormal.sample(rng);
                (chosen.mean + chosen.std * z).abs()
            }
        }
    }

    /// Check that the distribution can be sampled. `name` is used in the error.
    pub fn validate(&self, name: &str) -> Result<(), ConfigError> {
        let invalid = |reason: &str| {
            Err(ConfigError::InvalidDistribution {
                name: name.to_string(),
                reason: reason.to_string(),
            })
        };
        match self {
            Dist::Constant { value } if !value.is_finite() => invalid("value must be finite"),
            Dist::Uniform { low, high } if !(low.is_finite() && high.is_finite()) => {
                invalid("bounds must be finite")
            }
            Dist::Uniform { low, high } if low > high => invalid("low must not exceed high"),
            Dist::Normal { mean, std } if !mean.is_finite() || !std.is_finite() || *std < 0.0 => {
                invalid("mean must be finite and std non-negative")
            }
            Dist::WeibullMin { shape, scale, loc }
                if !(*shape > 0.0 && *scale > 0.0 && loc.is_finite()) =>
            {
                invalid("shape and scale must be positive")
            }
            Dist::NormalMixture { components } if components.is_empty() => {
                invalid("mixture needs at least one component")
            }
            Dist::NormalMixture { components } => {
                if components
                    .iter()
                    .any(|c| !(c.weight >= 0.0 && c.std >= 0.0 && c.mean.is_finite()))
                {
                    return invalid("weights and std must be non-negative");
                }
                if components.iter().map(|c| c.weight).sum::<f64>() <= 0.0 {
                    return invalid("weights must not all be zero");
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}
