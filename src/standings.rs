use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::elimination::EliminationMap;
use crate::error::{OrphanPick, Result};
use crate::matchup::Matchup;
use crate::model::{Category, EntryId, PoolEntry};
use crate::round::{Round, RoundIndex};
use crate::scoring::ScoringContext;
use crate::team::Team;

/// One row of a pool's standings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingRow {
    pub entry_id: EntryId,
    pub entry_name: String,
    pub total_points: u32,
    pub correct_picks: u32,
    pub rank: u32,
}

/// Ranked standings plus any picks that had to be dropped.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Standings {
    pub rows: Vec<StandingRow>,
    pub orphans: Vec<OrphanPick>,
}

impl Standings {
    /// Score every entry against the context and rank them.
    pub fn compute(ctx: &ScoringContext<'_>, entries: &[PoolEntry]) -> Self {
        let mut rows = Vec::with_capacity(entries.len());
        let mut orphans = Vec::new();

        for entry in entries {
            let tally = ctx.tally(entry);
            for reference in tally.orphans {
                warn!("entry {} has an orphan pick on {}, dropping it", entry.id, reference);
                orphans.push(OrphanPick {
                    entry_id: entry.id.clone(),
                    reference,
                });
            }
            rows.push(StandingRow {
                entry_id: entry.id.clone(),
                entry_name: entry.display_name.clone(),
                total_points: tally.points,
                correct_picks: tally.correct_picks,
                rank: 0,
            });
        }

        rank_rows(&mut rows);
        debug!("ranked {} entries ({} orphan picks)", rows.len(), orphans.len());

        Standings { rows, orphans }
    }

    pub fn get(&self, entry_id: &str) -> Option<&StandingRow> {
        self.rows.iter().find(|row| row.entry_id == entry_id)
    }

    pub fn leader(&self) -> Option<&StandingRow> {
        self.rows.first()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Display order: points descending, then name, then id.
pub(crate) fn standing_order(a: &StandingRow, b: &StandingRow) -> Ordering {
    b.total_points
        .cmp(&a.total_points)
        .then_with(|| a.entry_name.cmp(&b.entry_name))
        .then_with(|| a.entry_id.cmp(&b.entry_id))
}

/// Sort rows and assign standard competition ranks (1, 2, 2, 4).
pub(crate) fn rank_rows(rows: &mut [StandingRow]) {
    rows.sort_by(standing_order);
    assign_ranks(rows.iter_mut());
}

/// Assign competition ranks to rows already in `standing_order`.
pub(crate) fn assign_ranks<'a>(rows: impl Iterator<Item = &'a mut StandingRow>) {
    let mut rank = 0;
    let mut previous = None;
    for (i, row) in rows.enumerate() {
        if previous != Some(row.total_points) {
            rank = i as u32 + 1;
            previous = Some(row.total_points);
        }
        row.rank = rank;
    }
}

/// Validate the inputs, derive eliminations and compute standings in one call.
///
/// Fails only on invalid input; an empty pool gives empty standings.
pub fn aggregate_standings(
    rounds: Vec<Round>,
    teams: &[Team],
    matchups: &[Matchup],
    categories: &[Category],
    entries: &[PoolEntry],
) -> Result<Standings> {
    let rounds = RoundIndex::new(rounds)?;
    let mut eliminations = EliminationMap::new();
    eliminations.apply_results(matchups);
    let ctx = ScoringContext::new(&rounds, teams, matchups, categories, &eliminations);
    Ok(Standings::compute(&ctx, entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{OrphanRef, ProjectorError};
    use crate::pick::Pick;
    use proptest::prelude::*;

    fn row(id: &str, name: &str, points: u32) -> StandingRow {
        StandingRow {
            entry_id: id.to_string(),
            entry_name: name.to_string(),
            total_points: points,
            correct_picks: 0,
            rank: 0,
        }
    }

    fn make_event() -> (Vec<Round>, Vec<Team>, Vec<Matchup>) {
        let rounds = vec![
            Round::new("r1", "Quarterfinal", 1, 10),
            Round::new("r2", "Semifinal", 2, 20),
        ];
        let teams = ["a", "b", "c", "d"]
            .iter()
            .map(|id| Team::new(*id, id.to_uppercase(), None))
            .collect();
        let matchups = vec![
            Matchup::new("m1", "r1", 1, Some("a"), Some("b")).won_by("a"),
            Matchup::new("m2", "r1", 2, Some("c"), Some("d")).won_by("d"),
            Matchup::new("m3", "r2", 1, Some("a"), Some("d")),
        ];
        (rounds, teams, matchups)
    }

    #[test]
    fn test_competition_ranking() {
        let mut rows = vec![
            row("1", "Dee", 10),
            row("2", "Bea", 30),
            row("3", "Cal", 30),
            row("4", "Abe", 5),
        ];
        rank_rows(&mut rows);
        let got: Vec<_> = rows.iter().map(|r| (r.entry_name.as_str(), r.rank)).collect();
        assert_eq!(got, vec![("Bea", 1), ("Cal", 1), ("Dee", 3), ("Abe", 4)]);
    }

    #[test]
    fn test_aggregate_standings() {
        let (rounds, teams, matchups) = make_event();
        let entries = vec![
            PoolEntry::new("e1", "Ann", vec![Pick::bracket("m1", "a"), Pick::bracket("m2", "d")]),
            PoolEntry::new("e2", "Bob", vec![Pick::bracket("m1", "b"), Pick::bracket("m2", "d")]),
            PoolEntry::new("e3", "Cat", vec![Pick::bracket("m3", "a")]),
        ];
        let standings = aggregate_standings(rounds, &teams, &matchups, &[], &entries).unwrap();

        assert_eq!(standings.rows[0].entry_id, "e1");
        assert_eq!(standings.rows[0].total_points, 20);
        assert_eq!(standings.rows[0].correct_picks, 2);
        assert_eq!(standings.rows[1].entry_id, "e2");
        assert_eq!(standings.rows[1].rank, 2);
        assert_eq!(standings.rows[2].entry_id, "e3");
        assert_eq!(standings.rows[2].total_points, 0);
        assert_eq!(standings.leader().map(|r| r.entry_name.as_str()), Some("Ann"));
    }

    #[test]
    fn test_orphan_picks_reported_not_fatal() {
        let (rounds, teams, matchups) = make_event();
        let entries = vec![PoolEntry::new(
            "e1",
            "Ann",
            vec![Pick::bracket("m1", "a"), Pick::bracket("ghost", "a")],
        )];
        let standings = aggregate_standings(rounds, &teams, &matchups, &[], &entries).unwrap();
        assert_eq!(standings.rows[0].total_points, 10);
        assert_eq!(
            standings.orphans,
            vec![OrphanPick {
                entry_id: "e1".to_string(),
                reference: OrphanRef::Matchup("ghost".to_string()),
            }]
        );
    }

    #[test]
    fn test_bad_round_order_is_an_error_not_empty() {
        let (mut rounds, teams, matchups) = make_event();
        rounds.reverse();
        let result = aggregate_standings(rounds, &teams, &matchups, &[], &[]);
        assert!(matches!(result, Err(ProjectorError::InvalidRoundOrdering { .. })));
    }

    #[test]
    fn test_no_entries_no_rounds() {
        let standings = aggregate_standings(Vec::new(), &[], &[], &[], &[]).unwrap();
        assert!(standings.is_empty());
        assert!(standings.orphans.is_empty());
    }

    fn entries_strategy() -> impl Strategy<Value = Vec<PoolEntry>> {
        let pick = prop_oneof![
            (1usize..4, 0usize..4)
                .prop_map(|(m, t)| Pick::bracket(&format!("m{}", m), ["a", "b", "c", "d"][t])),
            Just(Pick::bracket("m9", "a")),
        ];
        prop::collection::vec(prop::collection::vec(pick, 0..6), 0..8).prop_map(|sheets| {
            sheets
                .into_iter()
                .enumerate()
                .map(|(i, picks)| {
                    PoolEntry::new(format!("e{}", i), format!("Entry {}", i % 3), picks)
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn test_points_are_sum_of_matching_picks(entries in entries_strategy()) {
            let (rounds, teams, matchups) = make_event();
            let standings =
                aggregate_standings(rounds.clone(), &teams, &matchups, &[], &entries).unwrap();

            for entry in &entries {
                let expected: u32 = entry
                    .picks
                    .iter()
                    .filter_map(|pick| match pick {
                        Pick::Bracket { matchup_id, picked_team_id } => {
                            let game = matchups.iter().find(|m| &m.id == matchup_id)?;
                            let round = rounds.iter().find(|r| r.id == game.round_id)?;
                            (game.winner_team_id.as_ref() == Some(picked_team_id))
                                .then_some(round.points_per_correct_pick)
                        }
                        _ => None,
                    })
                    .sum();
                let row = standings.get(&entry.id).unwrap();
                prop_assert_eq!(row.total_points, expected);
            }
        }

        #[test]
        fn test_aggregation_is_deterministic(entries in entries_strategy()) {
            let (rounds, teams, matchups) = make_event();
            let first =
                aggregate_standings(rounds.clone(), &teams, &matchups, &[], &entries).unwrap();
            let second = aggregate_standings(rounds, &teams, &matchups, &[], &entries).unwrap();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn test_ranks_are_competition_ranks(points in prop::collection::vec(0u32..50, 0..12)) {
            let mut rows: Vec<_> = points
                .iter()
                .enumerate()
                .map(|(i, &p)| row(&i.to_string(), &format!("n{}", i), p))
                .collect();
            rank_rows(&mut rows);
            for r in &rows {
                let above = rows.iter().filter(|o| o.total_points > r.total_points).count() as u32;
                prop_assert_eq!(r.rank, above + 1);
            }
        }
    }
}
