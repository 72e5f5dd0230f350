use std::collections::HashMap;

use crate::matchup::Matchup;
use crate::model::{MatchupId, TeamId};
use crate::round::RoundIndex;

/// Who fills one side of a matchup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Slot {
    Team(TeamId),
    /// Winner of an undecided earlier matchup
    WinnerOf(MatchupId),
    Empty,
}

/// Matchups addressed by (round position, bracket position).
///
/// Slot `p` of round `k` is fed by slots `2p-1` (side A) and `2p` (side B)
/// of round `k-1`.
pub struct BracketIndex<'a> {
    rounds: &'a RoundIndex,
    slots: HashMap<(usize, u32), &'a Matchup>,
}

impl<'a> BracketIndex<'a> {
    pub fn new(rounds: &'a RoundIndex, matchups: &'a [Matchup]) -> Self {
        let slots = matchups
            .iter()
            .filter(|m| m.bracket_position > 0)
            .filter_map(|m| Some(((rounds.position(&m.round_id)?, m.bracket_position), m)))
            .collect();
        BracketIndex { rounds, slots }
    }

    /// The two previous-round matchups feeding sides A and B.
    pub fn feeders(&self, matchup: &Matchup) -> [Option<&'a Matchup>; 2] {
        let position = match self.rounds.position(&matchup.round_id) {
            Some(position) if position > 0 && matchup.bracket_position > 0 => position,
            _ => return [None, None],
        };
        let p = matchup.bracket_position;
        [
            self.slots.get(&(position - 1, 2 * p - 1)).copied(),
            self.slots.get(&(position - 1, 2 * p)).copied(),
        ]
    }

    /// Resolve both sides of a matchup, following feeders for empty sides.
    pub fn slots(&self, matchup: &Matchup) -> [Slot; 2] {
        let feeders = self.feeders(matchup);
        let resolve = |team: &Option<TeamId>, feeder: Option<&Matchup>| match (team, feeder) {
            (Some(team), _) => Slot::Team(team.clone()),
            (None, Some(feeder)) => match &feeder.winner_team_id {
                Some(winner) => Slot::Team(winner.clone()),
                None => Slot::WinnerOf(feeder.id.clone()),
            },
            (None, None) => Slot::Empty,
        };
        [
            resolve(&matchup.team_a_id, feeders[0]),
            resolve(&matchup.team_b_id, feeders[1]),
        ]
    }
}
