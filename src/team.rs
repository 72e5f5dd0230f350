use serde::{Deserialize, Serialize};

use crate::model::TeamId;

/// Team taking part in an event.
///
/// Seeds follow the usual convention: a lower number is a stronger team.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: TeamId,

    pub name: String,

    #[serde(default)]
    pub seed: Option<u32>,

    /// Optional grouping tag (conference, region, division)
    #[serde(default)]
    pub conference: Option<String>,

    /// Team skips the first round
    #[serde(default)]
    pub has_bye: bool,
}

impl Team {
    /// Create a new Team with no conference and no bye.
    pub fn new(id: impl Into<TeamId>, name: impl Into<String>, seed: Option<u32>) -> Self {
        Team {
            id: id.into(),
            name: name.into(),
            seed,
            conference: None,
            has_bye: false,
        }
    }

    /// Create a copy of this team tagged with a conference
    pub fn with_conference(mut self, conference: impl Into<String>) -> Self {
        self.conference = Some(conference.into());
        self
    }

    /// Create a copy of this team marked as having a first round bye
    pub fn with_bye(mut self) -> Self {
        self.has_bye = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_defaults_from_json() {
        let team: Team = serde_json::from_str(r#"{"id": "t1", "name": "Chiefs"}"#).unwrap();
        assert_eq!(team.seed, None);
        assert_eq!(team.conference, None);
        assert!(!team.has_bye);
    }

    #[test]
    fn test_team_builders() {
        let team = Team::new("t1", "Chiefs", Some(1)).with_conference("AFC").with_bye();
        assert_eq!(team.conference.as_deref(), Some("AFC"));
        assert!(team.has_bye);
        assert_eq!(team.seed, Some(1));
    }
}
