use serde::{Deserialize, Serialize};

use crate::model::{MatchupId, RoundId, TeamId};

/// A game between two teams, or a bye when only one side is filled.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Matchup {
    pub id: MatchupId,
    pub round_id: RoundId,
    /// 1-based slot within the round. Slot `p` is fed by slots `2p-1` and
    /// `2p` of the previous round.
    #[serde(default)]
    pub bracket_position: u32,
    #[serde(default)]
    pub team_a_id: Option<TeamId>,
    #[serde(default)]
    pub team_b_id: Option<TeamId>,
    #[serde(default)]
    pub winner_team_id: Option<TeamId>,
}

impl Matchup {
    pub fn new(
        id: impl Into<MatchupId>,
        round_id: impl Into<RoundId>,
        bracket_position: u32,
        team_a: Option<&str>,
        team_b: Option<&str>,
    ) -> Self {
        Matchup {
            id: id.into(),
            round_id: round_id.into(),
            bracket_position,
            team_a_id: team_a.map(str::to_string),
            team_b_id: team_b.map(str::to_string),
            winner_team_id: None,
        }
    }

    /// Create a copy of this matchup with a result
    pub fn won_by(mut self, team: &str) -> Self {
        self.winner_team_id = Some(team.to_string());
        self
    }

    pub fn is_decided(&self) -> bool {
        self.winner_team_id.is_some()
    }

    /// Exactly one side is present
    pub fn is_bye(&self) -> bool {
        self.team_a_id.is_some() != self.team_b_id.is_some()
    }

    pub fn involves(&self, team: &str) -> bool {
        self.team_a_id.as_deref() == Some(team) || self.team_b_id.as_deref() == Some(team)
    }

    /// The losing side of a decided matchup with both sides present.
    ///
    /// Returns `None` for byes, undecided games and results naming a team
    /// that is not in the game.
    pub fn loser(&self) -> Option<&TeamId> {
        let winner = self.winner_team_id.as_deref()?;
        let (a, b) = (self.team_a_id.as_ref()?, self.team_b_id.as_ref()?);
        if a == winner {
            Some(b)
        } else if b == winner {
            Some(a)
        } else {
            None
        }
    }
}
