use log::warn;
use std::collections::HashMap;

use crate::matchup::Matchup;
use crate::model::{EliminationRecord, RoundId, TeamId};

/// Round in which each eliminated team's run ended.
///
/// Append-only: once a team has a round recorded it is never replaced.
/// A team with no entry is still alive.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EliminationMap {
    eliminated: HashMap<TeamId, RoundId>,
}

impl EliminationMap {
    pub fn new() -> Self {
        EliminationMap::default()
    }

    /// Start from cached `team_eliminations` rows.
    pub fn with_cached(records: &[EliminationRecord]) -> Self {
        let mut map = EliminationMap::new();
        for record in records {
            map.record(&record.team_id, &record.eliminated_in_round_id);
        }
        map
    }

    /// Record an elimination. Returns false if the team was already out.
    pub fn record(&mut self, team: &str, round: &str) -> bool {
        if self.eliminated.contains_key(team) {
            return false;
        }
        self.eliminated.insert(team.to_string(), round.to_string());
        true
    }

    /// Merge the results of `matchups` into this map.
    pub fn apply_results(&mut self, matchups: &[Matchup]) {
        for matchup in matchups {
            if !matchup.is_decided() || matchup.is_bye() {
                continue;
            }
            match matchup.loser() {
                Some(loser) => {
                    self.record(loser, &matchup.round_id);
                }
                None => warn!(
                    "matchup {} winner {:?} is not one of its teams, skipping",
                    matchup.id, matchup.winner_team_id
                ),
            }
        }
    }

    pub fn round_of(&self, team: &str) -> Option<&RoundId> {
        self.eliminated.get(team)
    }

    pub fn is_eliminated(&self, team: &str) -> bool {
        self.eliminated.contains_key(team)
    }

    pub fn len(&self) -> usize {
        self.eliminated.len()
    }

    pub fn is_empty(&self) -> bool {
        self.eliminated.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TeamId, &RoundId)> {
        self.eliminated.iter()
    }

    /// Rows suitable for the `team_eliminations` cache, sorted by team.
    pub fn to_records(&self) -> Vec<EliminationRecord> {
        let mut records: Vec<_> = self
            .eliminated
            .iter()
            .map(|(team, round)| EliminationRecord {
                team_id: team.clone(),
                eliminated_in_round_id: round.clone(),
            })
            .collect();
        records.sort_by(|a, b| a.team_id.cmp(&b.team_id));
        records
    }
}

/// Derive eliminations from matchup results.
///
/// The non-winning side of every decided matchup is eliminated in that
/// matchup's round. Byes eliminate nobody.
pub fn derive_eliminations(matchups: &[Matchup]) -> EliminationMap {
    let mut map = EliminationMap::new();
    map.apply_results(matchups);
    map
}
