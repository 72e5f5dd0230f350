use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::model::{EntryId, RoundId, TeamId};
use crate::pick::Pick;
use crate::round::RoundIndex;
use crate::team::Team;

/// An advancement pick for a team that was not picked to survive the
/// round before.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurvivalViolation {
    pub team_id: TeamId,
    pub round_id: RoundId,
    pub missing_round_id: RoundId,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryViolations {
    pub entry_id: EntryId,
    pub violations: Vec<SurvivalViolation>,
}

/// Check the Survival Consistency Rule over one entry's advancement picks.
///
/// A team picked past round N must also be picked past round N-1, except
/// that a team with a bye needs no pick for the first round. Picks on
/// unknown rounds are left to orphan handling.
pub fn check_survival_consistency(
    picks: &[Pick],
    rounds: &RoundIndex,
    teams: &[Team],
) -> Vec<SurvivalViolation> {
    let picked: HashSet<(&str, &str)> = picks
        .iter()
        .filter_map(|pick| match pick {
            Pick::Advancement { team_id, round_id } => Some((team_id.as_str(), round_id.as_str())),
            _ => None,
        })
        .collect();
    let byes: HashSet<&str> = teams
        .iter()
        .filter(|team| team.has_bye)
        .map(|team| team.id.as_str())
        .collect();

    let mut violations = Vec::new();
    for pick in picks {
        let Pick::Advancement { team_id, round_id } = pick else {
            continue;
        };
        let Some(previous) = rounds.previous(round_id) else {
            continue;
        };
        let exempt = rounds.position(&previous.id) == Some(0) && byes.contains(team_id.as_str());
        if !exempt && !picked.contains(&(team_id.as_str(), previous.id.as_str())) {
            violations.push(SurvivalViolation {
                team_id: team_id.clone(),
                round_id: round_id.clone(),
                missing_round_id: previous.id.clone(),
            });
        }
    }
    violations
}
