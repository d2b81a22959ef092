//! Random input sequences for benchmarking.

use clap::ValueEnum;
use rand::prelude::*;
use rand_distr::{StandardNormal, Uniform};

/// Distribution the generated values are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ValueDistribution {
    /// Uniform in [0, 1).
    #[default]
    Uniform,
    /// Standard normal (mean 0, std 1).
    Normal,
}

/// Generate `n` values from `distribution`.
///
/// A fixed `seed` makes the sequence reproducible; otherwise the thread RNG
/// is used.
pub fn generate_sequence(
    n: usize,
    distribution: ValueDistribution,
    seed: Option<u64>,
) -> Vec<f32> {
    match seed {
        Some(seed) => sample(&mut StdRng::seed_from_u64(seed), n, distribution),
        None => sample(&mut rand::thread_rng(), n, distribution),
    }
}

fn sample<R: Rng>(rng: &mut R, n: usize, distribution: ValueDistribution) -> Vec<f32> {
    match distribution {
        ValueDistribution::Uniform => {
            let uniform = Uniform::new(0.0f32, 1.0);
            (0..n).map(|_| uniform.sample(rng)).collect()
        }
        ValueDistribution::Normal => (0..n).map(|_| StandardNormal.sample(rng)).collect(),
    }
}
