use serde::{Deserialize, Serialize};
use statrs::function::erf::erfc;
use std::f64::consts::SQRT_2;

use crate::constants::SEED_SPREAD;

/// How unplayed matchups are assumed to go when simulating.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutcomeModel {
    /// Every game is 50/50
    CoinFlip,
    /// Better seeds are favoured by a normal approximation on seed difference
    SeedWeighted { spread: f64 },
}

impl Default for OutcomeModel {
    fn default() -> Self {
        OutcomeModel::SeedWeighted { spread: SEED_SPREAD }
    }
}

impl OutcomeModel {
    /// Probability that the team seeded `seed_a` beats the team seeded `seed_b`.
    pub fn win_prob(&self, seed_a: Option<u32>, seed_b: Option<u32>) -> f64 {
        match self {
            OutcomeModel::CoinFlip => 0.5,
            OutcomeModel::SeedWeighted { spread } => {
                calculate_seed_win_prob(seed_a, seed_b, *spread)
            }
        }
    }
}

/// Standard normal CDF
fn normal_cdf(x: f64) -> f64 {
    0.5 * erfc(-x / SQRT_2)
}

/// Calculate the probability of team A beating team B from their seeds.
///
/// A lower seed is the stronger team. Unseeded teams play a coin flip.
///
/// # Arguments
/// * `seed_a` - Seed of the first team
/// * `seed_b` - Seed of the second team
/// * `spread` - Standard deviation in seed lines
///
/// # Returns
/// Probability of team A winning (0.0-1.0)
pub fn calculate_seed_win_prob(seed_a: Option<u32>, seed_b: Option<u32>, spread: f64) -> f64 {
    match (seed_a, seed_b) {
        (Some(a), Some(b)) if spread > 0.0 => normal_cdf((b as f64 - a as f64) / spread),
        _ => 0.5,
    }
}
