use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::{CategoryId, EntryId, MatchupId, RoundId, TeamId};

/// Failure surfaced by a `PoolSource`.
///
/// Kept separate from "no rows" so a caller can offer a retry instead of an
/// empty-state message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to fetch {what}: {reason}")]
pub struct FetchError {
    pub what: &'static str,
    pub reason: String,
}

impl FetchError {
    pub fn new(what: &'static str, reason: impl Into<String>) -> Self {
        FetchError {
            what,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProjectorError {
    #[error("rounds out of order: round {round} has order {order} after order {previous}")]
    InvalidRoundOrdering {
        round: RoundId,
        order: i32,
        previous: i32,
    },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("malformed picks payload: {0}")]
    MalformedPicks(String),

    #[error("invalid projector options: {0}")]
    InvalidOptions(String),

    #[error("pool {0} not found")]
    UnknownPool(String),

    #[error("event {0} not found")]
    UnknownEvent(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// What an orphan pick pointed at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum OrphanRef {
    Matchup(MatchupId),
    Team(TeamId),
    Round(RoundId),
    Category(CategoryId),
}

impl fmt::Display for OrphanRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrphanRef::Matchup(id) => write!(f, "matchup {}", id),
            OrphanRef::Team(id) => write!(f, "team {}", id),
            OrphanRef::Round(id) => write!(f, "round {}", id),
            OrphanRef::Category(id) => write!(f, "category {}", id),
        }
    }
}

/// A pick that referenced data missing from the supplied set.
///
/// The pick is dropped from scoring; the record lets the caller flag it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrphanPick {
    pub entry_id: EntryId,
    pub reference: OrphanRef,
}

pub type Result<T> = std::result::Result<T, ProjectorError>;
