use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_SIMULATIONS, EXHAUSTIVE_LIMIT, MAX_EXHAUSTIVE_LIMIT};
use crate::error::{ProjectorError, Result};
use crate::win_prob::OutcomeModel;

/// Tuning for the scenario simulator.
///
/// Missing fields in JSON fall back to the defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectorOptions {
    pub outcome_model: OutcomeModel,
    /// Enumerate every scenario when this many matchups or fewer are open
    pub exhaustive_limit: u32,
    /// Samples drawn when there are too many open matchups to enumerate
    pub simulations: usize,
    /// Fixed seed for sampling. `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for ProjectorOptions {
    fn default() -> Self {
        ProjectorOptions {
            outcome_model: OutcomeModel::default(),
            exhaustive_limit: EXHAUSTIVE_LIMIT,
            simulations: DEFAULT_SIMULATIONS,
            seed: None,
        }
    }
}

impl ProjectorOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        let options: ProjectorOptions = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.exhaustive_limit > MAX_EXHAUSTIVE_LIMIT {
            return Err(ProjectorError::InvalidOptions(format!(
                "exhaustiveLimit {} is above the maximum of {}",
                self.exhaustive_limit, MAX_EXHAUSTIVE_LIMIT
            )));
        }
        if self.simulations == 0 {
            return Err(ProjectorError::InvalidOptions(
                "simulations must be at least 1".to_string(),
            ));
        }
        if let OutcomeModel::SeedWeighted { spread } = self.outcome_model {
            if !(spread.is_finite() && spread > 0.0) {
                return Err(ProjectorError::InvalidOptions(format!(
                    "seed spread must be positive, got {}",
                    spread
                )));
            }
        }
        Ok(())
    }
}
