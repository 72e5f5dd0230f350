/// Points for a correct pick when a round does not say otherwise
pub const DEFAULT_ROUND_POINTS: u32 = 1;

/// Default points per round for a standard six round bracket
pub const BRACKET_ROUND_POINTS: [u32; 6] = [1, 2, 4, 8, 16, 32];

/// Number of places shown on an event podium
pub const PODIUM_PLACES: u32 = 3;

/// Largest number of open matchups enumerated exhaustively (2^12 = 4096 scenarios).
/// Anything above this is sampled instead.
pub const EXHAUSTIVE_LIMIT: u32 = 12;

/// Hard cap on the exhaustive limit so a bad config cannot ask for 2^64 scenarios
pub const MAX_EXHAUSTIVE_LIMIT: u32 = 20;

/// Monte Carlo samples drawn when the bracket is too open to enumerate
pub const DEFAULT_SIMULATIONS: usize = 10_000;

/// Standard deviation (in seed lines) of the seed-weighted outcome model.
/// A 1 seed beats a 16 seed about 99% of the time at this spread.
pub const SEED_SPREAD: f64 = 6.0;

/// Get the default points for a round by its zero-based position
pub fn default_round_points(index: usize) -> u32 {
    BRACKET_ROUND_POINTS
        .get(index)
        .copied()
        .unwrap_or(DEFAULT_ROUND_POINTS)
}
