use serde::{Deserialize, Serialize};

use crate::constants::PODIUM_PLACES;
use crate::error::{ProjectorError, Result};
use crate::model::{EntryId, PoolId};
use crate::pool::PoolState;
use crate::source::PoolSource;
use crate::standings::{assign_ranks, standing_order, StandingRow};

/// An entry on the event-wide podium.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodiumPlace {
    pub pool_id: PoolId,
    pub entry_id: EntryId,
    pub entry_name: String,
    pub total_points: u32,
    pub rank: u32,
}

/// Top entries across every pool of an event.
///
/// Ranks are recomputed over the merged field, so ties on the last step can
/// put more than three entries on the podium.
pub fn podium(source: &impl PoolSource, event_id: &str) -> Result<Vec<PodiumPlace>> {
    if source.event(event_id)?.is_none() {
        return Err(ProjectorError::UnknownEvent(event_id.to_string()));
    }

    let mut merged: Vec<(PoolId, StandingRow)> = Vec::new();
    for pool in source.pools_for_event(event_id)? {
        let standings = PoolState::load(source, &pool.id)?.standings();
        merged.extend(standings.rows.into_iter().map(|row| (pool.id.clone(), row)));
    }

    merged.sort_by(|(_, a), (_, b)| standing_order(a, b));
    assign_ranks(merged.iter_mut().map(|(_, row)| row));

    Ok(merged
        .into_iter()
        .take_while(|(_, row)| row.rank <= PODIUM_PLACES)
        .map(|(pool_id, row)| PodiumPlace {
            pool_id,
            entry_id: row.entry_id,
            entry_name: row.entry_name,
            total_points: row.total_points,
            rank: row.rank,
        })
        .collect())
}
