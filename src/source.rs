//! Data access boundary.
//!
//! The projector never talks to a database. Whatever backs a deployment
//! implements `PoolSource`; `EventSnapshot` is the in-memory version used for
//! tests, fixtures and the JSON entry points.

use serde::{Deserialize, Serialize};

use crate::error::FetchError;
use crate::matchup::Matchup;
use crate::model::{Category, EliminationRecord, EntryId, Event, Pool, PoolEntry, PoolId};
use crate::pick::StoredPicks;
use crate::round::Round;
use crate::team::Team;

pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Read access to one deployment's pools and events.
///
/// `Ok` with no rows means the data really is empty; a failed read must be
/// an `Err`.
pub trait PoolSource {
    fn pool(&self, pool_id: &str) -> FetchResult<Option<Pool>>;
    fn event(&self, event_id: &str) -> FetchResult<Option<Event>>;
    fn pools_for_event(&self, event_id: &str) -> FetchResult<Vec<Pool>>;
    /// Rounds in play order
    fn rounds(&self, event_id: &str) -> FetchResult<Vec<Round>>;
    fn teams(&self, event_id: &str) -> FetchResult<Vec<Team>>;
    fn matchups(&self, event_id: &str) -> FetchResult<Vec<Matchup>>;
    fn categories(&self, event_id: &str) -> FetchResult<Vec<Category>>;
    fn eliminations(&self, event_id: &str) -> FetchResult<Vec<EliminationRecord>>;
    /// Entries of a pool with their picks, legacy payloads already resolved
    fn entries(&self, pool_id: &str) -> FetchResult<Vec<PoolEntry>>;
}

/// An entry as stored, before legacy picks are resolved.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryRow {
    pub id: EntryId,
    #[serde(default)]
    pub pool_id: PoolId,
    pub display_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub tie_breaker_value: Option<i64>,
    #[serde(default)]
    pub picks: StoredPicks,
}

impl From<PoolEntry> for EntryRow {
    fn from(entry: PoolEntry) -> Self {
        EntryRow {
            id: entry.id,
            pool_id: entry.pool_id,
            display_name: entry.display_name,
            email: entry.email,
            tie_breaker_value: entry.tie_breaker_value,
            picks: StoredPicks::Tagged(entry.picks),
        }
    }
}

/// Everything stored for a single event, as plain rows.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSnapshot {
    pub event: Event,
    #[serde(default)]
    pub pools: Vec<Pool>,
    #[serde(default)]
    pub rounds: Vec<Round>,
    #[serde(default)]
    pub teams: Vec<Team>,
    #[serde(default)]
    pub matchups: Vec<Matchup>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub eliminations: Vec<EliminationRecord>,
    #[serde(default)]
    pub entries: Vec<EntryRow>,
}

impl EventSnapshot {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    fn rows<T: Clone>(&self, event_id: &str, rows: &[T]) -> Vec<T> {
        if self.event.id == event_id {
            rows.to_vec()
        } else {
            Vec::new()
        }
    }
}

impl PoolSource for EventSnapshot {
    fn pool(&self, pool_id: &str) -> FetchResult<Option<Pool>> {
        Ok(self.pools.iter().find(|p| p.id == pool_id).cloned())
    }

    fn event(&self, event_id: &str) -> FetchResult<Option<Event>> {
        Ok((self.event.id == event_id).then(|| self.event.clone()))
    }

    fn pools_for_event(&self, event_id: &str) -> FetchResult<Vec<Pool>> {
        Ok(self
            .pools
            .iter()
            .filter(|p| p.event_id == event_id)
            .cloned()
            .collect())
    }

    fn rounds(&self, event_id: &str) -> FetchResult<Vec<Round>> {
        // Same as `order by round_order` on the table.
        let mut rounds = self.rows(event_id, &self.rounds);
        rounds.sort_by_key(|round| round.order);
        Ok(rounds)
    }

    fn teams(&self, event_id: &str) -> FetchResult<Vec<Team>> {
        Ok(self.rows(event_id, &self.teams))
    }

    fn matchups(&self, event_id: &str) -> FetchResult<Vec<Matchup>> {
        Ok(self.rows(event_id, &self.matchups))
    }

    fn categories(&self, event_id: &str) -> FetchResult<Vec<Category>> {
        Ok(self.rows(event_id, &self.categories))
    }

    fn eliminations(&self, event_id: &str) -> FetchResult<Vec<EliminationRecord>> {
        Ok(self.rows(event_id, &self.eliminations))
    }

    fn entries(&self, pool_id: &str) -> FetchResult<Vec<PoolEntry>> {
        self.entries
            .iter()
            .filter(|row| row.pool_id == pool_id)
            .map(|row| {
                let picks = row.picks.resolve(self.event.kind).map_err(|err| {
                    FetchError::new("entries", format!("entry {}: {}", row.id, err))
                })?;
                Ok(PoolEntry {
                    id: row.id.clone(),
                    pool_id: row.pool_id.clone(),
                    display_name: row.display_name.clone(),
                    email: row.email.clone(),
                    tie_breaker_value: row.tie_breaker_value,
                    picks,
                })
            })
            .collect()
    }
}
