use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ProjectorError, Result};
use crate::model::{CategoryId, EventKind, MatchupId, OptionId, RoundId, TeamId};

/// A single pick held by an entry.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Pick {
    /// Winner of one matchup
    #[serde(rename_all = "camelCase")]
    Bracket {
        matchup_id: MatchupId,
        picked_team_id: TeamId,
    },

    /// Team survives past the round
    #[serde(rename_all = "camelCase")]
    Advancement { team_id: TeamId, round_id: RoundId },

    /// Option chosen for a pick'em category
    #[serde(rename_all = "camelCase")]
    Category {
        category_id: CategoryId,
        option_id: OptionId,
    },
}

impl Pick {
    pub fn bracket(matchup: &str, team: &str) -> Self {
        Pick::Bracket {
            matchup_id: matchup.to_string(),
            picked_team_id: team.to_string(),
        }
    }

    pub fn advancement(team: &str, round: &str) -> Self {
        Pick::Advancement {
            team_id: team.to_string(),
            round_id: round.to_string(),
        }
    }

    pub fn category(category: &str, option: &str) -> Self {
        Pick::Category {
            category_id: category.to_string(),
            option_id: option.to_string(),
        }
    }

    /// Convert the JSON column older events stored picks in.
    ///
    /// Shapes by event kind:
    /// * bracket: `{"<matchup>": "<team>"}`
    /// * pick'em: `{"<category>": "<option>"}`
    /// * advancement: `{"<round>": ["<team>", ...]}`
    ///
    /// `null` means no picks were saved.
    pub fn from_legacy_json(kind: EventKind, value: &Value) -> Result<Vec<Pick>> {
        let object = match value {
            Value::Null => return Ok(Vec::new()),
            Value::Object(object) => object,
            other => {
                return Err(ProjectorError::MalformedPicks(format!(
                    "expected an object, got {}",
                    json_type(other)
                )))
            }
        };

        let mut picks = Vec::with_capacity(object.len());
        for (key, value) in object {
            match (kind, value) {
                (EventKind::Bracket, Value::String(team)) => picks.push(Pick::bracket(key, team)),
                (EventKind::PickEm, Value::String(option)) => {
                    picks.push(Pick::category(key, option))
                }
                (EventKind::Advancement, Value::Array(teams)) => {
                    for team in teams {
                        let team = team.as_str().ok_or_else(|| {
                            ProjectorError::MalformedPicks(format!(
                                "round {} lists a {} instead of a team id",
                                key,
                                json_type(team)
                            ))
                        })?;
                        picks.push(Pick::advancement(team, key));
                    }
                }
                (_, Value::Null) => {}
                (kind, other) => {
                    return Err(ProjectorError::MalformedPicks(format!(
                        "{:?} pick {} has a {} value",
                        kind,
                        key,
                        json_type(other)
                    )))
                }
            }
        }

        Ok(picks)
    }
}

/// Picks as an entry row stores them: the tagged list, or the JSON column
/// of older events.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredPicks {
    Tagged(Vec<Pick>),
    Legacy(Value),
}

impl Default for StoredPicks {
    fn default() -> Self {
        StoredPicks::Tagged(Vec::new())
    }
}

impl StoredPicks {
    /// Resolve to tagged picks, reading legacy payloads by event kind.
    pub fn resolve(&self, kind: EventKind) -> Result<Vec<Pick>> {
        match self {
            StoredPicks::Tagged(picks) => Ok(picks.clone()),
            StoredPicks::Legacy(value) => Pick::from_legacy_json(kind, value),
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
