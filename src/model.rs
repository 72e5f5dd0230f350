//! Records consumed by the projector.
//!
//! These mirror the database rows the web app reads. The projector never owns
//! or mutates them.

use serde::{Deserialize, Serialize};

use crate::pick::Pick;

pub type TeamId = String;
pub type RoundId = String;
pub type MatchupId = String;
pub type CategoryId = String;
pub type OptionId = String;
pub type EntryId = String;
pub type PoolId = String;
pub type EventId = String;

/// How an event's picks are made and scored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// One winner per matchup
    #[default]
    Bracket,
    /// Teams picked to survive past each round (reseeding playoffs)
    Advancement,
    /// One option per category (awards shows)
    PickEm,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    pub name: String,
    #[serde(default)]
    pub kind: EventKind,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pool {
    pub id: PoolId,
    pub event_id: EventId,
    pub name: String,
}

/// A pick'em category such as "Best Picture".
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub points: u32,
    #[serde(default)]
    pub correct_option_id: Option<OptionId>,
}

impl Category {
    pub fn is_resolved(&self) -> bool {
        self.correct_option_id.is_some()
    }
}

/// One participant's entry in a pool, with the picks it holds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolEntry {
    pub id: EntryId,
    #[serde(default)]
    pub pool_id: PoolId,
    pub display_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub tie_breaker_value: Option<i64>,
    #[serde(default)]
    pub picks: Vec<Pick>,
}

impl PoolEntry {
    pub fn new(id: impl Into<EntryId>, display_name: impl Into<String>, picks: Vec<Pick>) -> Self {
        PoolEntry {
            id: id.into(),
            pool_id: PoolId::new(),
            display_name: display_name.into(),
            email: String::new(),
            tie_breaker_value: None,
            picks,
        }
    }
}

/// Cached row of the `team_eliminations` table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EliminationRecord {
    pub team_id: TeamId,
    pub eliminated_in_round_id: RoundId,
}
