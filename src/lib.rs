//! PickCrown Core - standings and advancement projection for prediction pools.
//!
//! Everything here is a pure function of pool state fetched through a
//! `PoolSource`. Python bindings are available with the `python` feature.

pub mod bracket;
pub mod config;
pub mod constants;
pub mod elimination;
pub mod error;
pub mod matchup;
pub mod model;
pub mod pick;
pub mod podium;
pub mod pool;
pub mod projection;
pub mod round;
pub mod scenario;
pub mod scoring;
pub mod source;
pub mod standings;
pub mod survival;
pub mod team;
pub mod win_prob;

pub use config::ProjectorOptions;
pub use elimination::{derive_eliminations, EliminationMap};
pub use error::{FetchError, OrphanPick, OrphanRef, ProjectorError, Result};
pub use matchup::Matchup;
pub use model::{Category, EliminationRecord, Event, EventKind, Pool, PoolEntry};
pub use pick::{Pick, StoredPicks};
pub use podium::{podium, PodiumPlace};
pub use pool::{evaluate_snapshot_json, PoolReport, PoolState};
pub use projection::{classify, project, EntryProjection, Projection, Status};
pub use round::{Round, RoundIndex};
pub use scenario::{
    EntryOutlook, RequiredResult, ScenarioMode, ScenarioReport, ScenarioSimulator,
};
pub use source::{EntryRow, EventSnapshot, PoolSource};
pub use standings::{aggregate_standings, StandingRow, Standings};
pub use survival::{check_survival_consistency, SurvivalViolation};
pub use team::Team;
pub use win_prob::{calculate_seed_win_prob, OutcomeModel};

#[cfg(feature = "python")]
mod python {
    use pyo3::exceptions::{PyIOError, PyValueError};
    use pyo3::prelude::*;

    use crate::error::ProjectorError;
    use crate::matchup::Matchup;
    use crate::{derive_eliminations, evaluate_snapshot_json, ProjectorOptions};

    fn to_py_err(err: ProjectorError) -> PyErr {
        match err {
            ProjectorError::Fetch(e) => PyIOError::new_err(e.to_string()),
            other => PyValueError::new_err(other.to_string()),
        }
    }

    /// Evaluate one pool of an event snapshot.
    ///
    /// Takes the snapshot as JSON and returns the pool report as JSON.
    #[pyfunction]
    #[pyo3(signature = (snapshot_json, pool_id, options_json = None))]
    fn evaluate_pool(
        snapshot_json: &str,
        pool_id: &str,
        options_json: Option<&str>,
    ) -> PyResult<String> {
        let options = match options_json {
            Some(json) => ProjectorOptions::from_json(json).map_err(to_py_err)?,
            None => ProjectorOptions::default(),
        };
        evaluate_snapshot_json(snapshot_json, pool_id, &options).map_err(to_py_err)
    }

    /// Derive `team_eliminations` rows from a JSON array of matchups.
    #[pyfunction]
    fn derive_eliminations_json(matchups_json: &str) -> PyResult<String> {
        let matchups: Vec<Matchup> = serde_json::from_str(matchups_json)
            .map_err(|e| PyValueError::new_err(format!("Invalid matchups: {}", e)))?;
        let records = derive_eliminations(&matchups).to_records();
        serde_json::to_string(&records).map_err(|e| PyValueError::new_err(e.to_string()))
    }

    /// Python module definition
    #[pymodule]
    fn pickcrown_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(evaluate_pool, m)?)?;
        m.add_function(wrap_pyfunction!(derive_eliminations_json, m)?)?;

        m.add("EXHAUSTIVE_LIMIT", crate::constants::EXHAUSTIVE_LIMIT)?;
        m.add("DEFAULT_SIMULATIONS", crate::constants::DEFAULT_SIMULATIONS)?;
        m.add("SEED_SPREAD", crate::constants::SEED_SPREAD)?;

        Ok(())
    }
}
