use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::constants::DEFAULT_ROUND_POINTS;
use crate::error::{ProjectorError, Result};
use crate::model::RoundId;

fn default_points() -> u32 {
    DEFAULT_ROUND_POINTS
}

/// A round of an event with the points a correct pick in it earns.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    pub id: RoundId,
    pub name: String,
    pub order: i32,
    #[serde(default = "default_points")]
    pub points_per_correct_pick: u32,
    /// Set by an admin once every result in the round is in. Advancement
    /// events have no matchup rows, so this is their only completion signal.
    #[serde(default)]
    pub completed: bool,
}

impl Round {
    pub fn new(id: impl Into<RoundId>, name: impl Into<String>, order: i32, points: u32) -> Self {
        Round {
            id: id.into(),
            name: name.into(),
            order,
            points_per_correct_pick: points,
            completed: false,
        }
    }

    pub fn completed(mut self) -> Self {
        self.completed = true;
        self
    }
}

/// Rounds of one event in play order, looked up by id.
#[derive(Clone, Debug, Default)]
pub struct RoundIndex {
    rounds: Vec<Round>,
    positions: HashMap<RoundId, usize>,
}

impl RoundIndex {
    /// Build the index. The rounds must already be strictly increasing by
    /// `order`; an out of order or duplicated round is rejected rather than
    /// reordered.
    pub fn new(rounds: Vec<Round>) -> Result<Self> {
        for pair in rounds.windows(2) {
            if pair[1].order <= pair[0].order {
                return Err(ProjectorError::InvalidRoundOrdering {
                    round: pair[1].id.clone(),
                    order: pair[1].order,
                    previous: pair[0].order,
                });
            }
        }

        let positions = rounds
            .iter()
            .enumerate()
            .map(|(i, round)| (round.id.clone(), i))
            .collect();

        Ok(RoundIndex { rounds, positions })
    }

    pub fn get(&self, id: &str) -> Option<&Round> {
        self.positions.get(id).map(|&i| &self.rounds[i])
    }

    /// Zero-based play position of a round
    pub fn position(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    pub fn order(&self, id: &str) -> Option<i32> {
        self.get(id).map(|round| round.order)
    }

    /// The round played immediately before `id`, if any
    pub fn previous(&self, id: &str) -> Option<&Round> {
        match self.position(id)? {
            0 => None,
            i => self.rounds.get(i - 1),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Round> {
        self.rounds.iter()
    }

    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rounds() -> Vec<Round> {
        vec![
            Round::new("r1", "Wild Card", 1, 1),
            Round::new("r2", "Divisional", 2, 2),
            Round::new("r3", "Conference", 3, 4),
        ]
    }

    #[test]
    fn test_index_lookup() {
        let index = RoundIndex::new(rounds()).unwrap();
        assert_eq!(index.len(), 3);
        assert_eq!(index.position("r2"), Some(1));
        assert_eq!(index.order("r3"), Some(3));
        assert_eq!(index.previous("r2").map(|r| r.id.as_str()), Some("r1"));
        assert!(index.previous("r1").is_none());
        assert!(index.get("missing").is_none());
    }

    #[test]
    fn test_rejects_out_of_order_rounds() {
        let mut rounds = rounds();
        rounds.swap(1, 2);
        let err = RoundIndex::new(rounds).unwrap_err();
        match err {
            ProjectorError::InvalidRoundOrdering { round, order, previous } => {
                assert_eq!(round, "r2");
                assert_eq!(order, 2);
                assert_eq!(previous, 3);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_rejects_duplicate_order() {
        let rounds = vec![Round::new("a", "A", 1, 1), Round::new("b", "B", 1, 1)];
        assert!(RoundIndex::new(rounds).is_err());
    }

    #[test]
    fn test_empty_rounds_are_fine() {
        let index = RoundIndex::new(Vec::new()).unwrap();
        assert!(index.is_empty());
    }

    #[test]
    fn test_points_default_when_missing() {
        let round: Round =
            serde_json::from_str(r#"{"id": "r1", "name": "R1", "order": 1}"#).unwrap();
        assert_eq!(round.points_per_correct_pick, DEFAULT_ROUND_POINTS);
        assert!(!round.completed);
    }
}
