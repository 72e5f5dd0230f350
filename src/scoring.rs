use std::collections::{HashMap, HashSet};

use crate::elimination::EliminationMap;
use crate::error::OrphanRef;
use crate::matchup::Matchup;
use crate::model::{Category, EventKind, PoolEntry};
use crate::pick::Pick;
use crate::round::{Round, RoundIndex};
use crate::team::Team;

/// Where a single pick stands against the current results.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PickOutcome {
    /// Resolved in the entry's favour, worth this many points
    Correct(u32),
    /// Resolved against the entry
    Wrong,
    /// Not resolved yet and still winnable for this many points
    Live(u32),
    /// Not resolved yet but the picked team is already out
    Dead,
    /// References something missing from the data set
    Orphan(OrphanRef),
}

/// Per-entry sums over all of its picks.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EntryTally {
    pub points: u32,
    pub correct_picks: u32,
    pub potential_points: u32,
    /// Picks that referenced known data
    pub scoreable_picks: u32,
    pub orphans: Vec<OrphanRef>,
}

/// Read-only lookup tables for scoring picks against one event's results.
pub struct ScoringContext<'a> {
    rounds: &'a RoundIndex,
    teams: HashSet<&'a str>,
    matchups: HashMap<&'a str, &'a Matchup>,
    categories: HashMap<&'a str, &'a Category>,
    eliminations: &'a EliminationMap,
    completed_rounds: HashSet<&'a str>,
}

impl<'a> ScoringContext<'a> {
    pub fn new(
        rounds: &'a RoundIndex,
        teams: &'a [Team],
        matchups: &'a [Matchup],
        categories: &'a [Category],
        eliminations: &'a EliminationMap,
    ) -> Self {
        let mut games_per_round: HashMap<&str, (usize, usize)> = HashMap::new();
        for matchup in matchups {
            let counts = games_per_round.entry(matchup.round_id.as_str()).or_insert((0, 0));
            counts.0 += 1;
            if matchup.is_decided() {
                counts.1 += 1;
            }
        }

        let completed_rounds = rounds
            .iter()
            .filter(|round| {
                round.completed
                    || games_per_round
                        .get(round.id.as_str())
                        .is_some_and(|&(total, decided)| total > 0 && total == decided)
            })
            .map(|round| round.id.as_str())
            .collect();

        ScoringContext {
            rounds,
            teams: teams.iter().map(|team| team.id.as_str()).collect(),
            matchups: matchups.iter().map(|m| (m.id.as_str(), m)).collect(),
            categories: categories.iter().map(|c| (c.id.as_str(), c)).collect(),
            eliminations,
            completed_rounds,
        }
    }

    pub fn rounds(&self) -> &RoundIndex {
        self.rounds
    }

    pub fn eliminations(&self) -> &EliminationMap {
        self.eliminations
    }

    pub fn matchup(&self, id: &str) -> Option<&'a Matchup> {
        self.matchups.get(id).copied()
    }

    /// Every result in the round is in
    pub fn is_round_complete(&self, round_id: &str) -> bool {
        self.completed_rounds.contains(round_id)
    }

    /// Number of outcomes still to be decided, counted the way the event
    /// kind is scored.
    pub fn open_outcomes(&self, kind: EventKind) -> usize {
        match kind {
            EventKind::Bracket => self.matchups.values().filter(|m| !m.is_decided()).count(),
            EventKind::Advancement => self
                .rounds
                .iter()
                .filter(|round| !self.is_round_complete(&round.id))
                .count(),
            EventKind::PickEm => self.categories.values().filter(|c| !c.is_resolved()).count(),
        }
    }

    /// True when the team is out in `round` or earlier.
    fn out_by(&self, team: &str, round: &Round) -> bool {
        match self.eliminations.round_of(team) {
            // A cached elimination in a round we don't know about still means out.
            Some(out_in) => self
                .rounds
                .order(out_in)
                .map_or(true, |order| order <= round.order),
            None => false,
        }
    }

    pub fn evaluate(&self, pick: &Pick) -> PickOutcome {
        match pick {
            Pick::Bracket {
                matchup_id,
                picked_team_id,
            } => {
                let Some(matchup) = self.matchup(matchup_id) else {
                    return PickOutcome::Orphan(OrphanRef::Matchup(matchup_id.clone()));
                };
                if !self.teams.contains(picked_team_id.as_str()) {
                    return PickOutcome::Orphan(OrphanRef::Team(picked_team_id.clone()));
                }
                let Some(round) = self.rounds.get(&matchup.round_id) else {
                    return PickOutcome::Orphan(OrphanRef::Round(matchup.round_id.clone()));
                };

                match &matchup.winner_team_id {
                    Some(winner) if winner == picked_team_id => {
                        PickOutcome::Correct(round.points_per_correct_pick)
                    }
                    Some(_) => PickOutcome::Wrong,
                    None if self.eliminations.is_eliminated(picked_team_id) => PickOutcome::Dead,
                    None => PickOutcome::Live(round.points_per_correct_pick),
                }
            }

            Pick::Advancement { team_id, round_id } => {
                let Some(round) = self.rounds.get(round_id) else {
                    return PickOutcome::Orphan(OrphanRef::Round(round_id.clone()));
                };
                if !self.teams.contains(team_id.as_str()) {
                    return PickOutcome::Orphan(OrphanRef::Team(team_id.clone()));
                }

                if self.out_by(team_id, round) {
                    PickOutcome::Wrong
                } else if self.eliminations.is_eliminated(team_id)
                    || self.is_round_complete(round_id)
                {
                    // Out in a later round means it survived this one.
                    PickOutcome::Correct(round.points_per_correct_pick)
                } else {
                    PickOutcome::Live(round.points_per_correct_pick)
                }
            }

            Pick::Category {
                category_id,
                option_id,
            } => {
                let Some(category) = self.categories.get(category_id.as_str()) else {
                    return PickOutcome::Orphan(OrphanRef::Category(category_id.clone()));
                };
                match &category.correct_option_id {
                    Some(correct) if correct == option_id => PickOutcome::Correct(category.points),
                    Some(_) => PickOutcome::Wrong,
                    None => PickOutcome::Live(category.points),
                }
            }
        }
    }

    pub fn tally(&self, entry: &PoolEntry) -> EntryTally {
        let mut tally = EntryTally::default();
        for pick in &entry.picks {
            match self.evaluate(pick) {
                PickOutcome::Correct(points) => {
                    tally.points = tally.points.saturating_add(points);
                    tally.correct_picks += 1;
                    tally.scoreable_picks += 1;
                }
                PickOutcome::Live(points) => {
                    tally.potential_points = tally.potential_points.saturating_add(points);
                    tally.scoreable_picks += 1;
                }
                PickOutcome::Wrong | PickOutcome::Dead => tally.scoreable_picks += 1,
                PickOutcome::Orphan(reference) => tally.orphans.push(reference),
            }
        }
        tally
    }
}
