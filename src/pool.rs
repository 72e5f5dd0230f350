use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::ProjectorOptions;
use crate::elimination::EliminationMap;
use crate::error::{ProjectorError, Result};
use crate::matchup::Matchup;
use crate::model::{Category, EliminationRecord, EventKind, PoolEntry};
use crate::projection::{project, Projection};
use crate::round::{Round, RoundIndex};
use crate::scenario::{ScenarioReport, ScenarioSimulator};
use crate::scoring::ScoringContext;
use crate::source::{EventSnapshot, PoolSource};
use crate::standings::Standings;
use crate::survival::{check_survival_consistency, EntryViolations};
use crate::team::Team;

/// Everything the projector knows about one pool at one moment.
#[derive(Clone, Debug)]
pub struct PoolState {
    pub kind: EventKind,
    rounds: RoundIndex,
    teams: Vec<Team>,
    matchups: Vec<Matchup>,
    categories: Vec<Category>,
    eliminations: EliminationMap,
    entries: Vec<PoolEntry>,
}

/// Computed views for one pool, ready to render.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolReport {
    pub kind: EventKind,
    pub standings: Standings,
    /// Absent once every outcome is decided
    pub projection: Option<Projection>,
    /// Bracket events with open matchups only
    pub scenarios: Option<ScenarioReport>,
    pub eliminations: Vec<EliminationRecord>,
    pub violations: Vec<EntryViolations>,
}

impl PoolState {
    /// Validate and assemble a pool.
    ///
    /// `rounds` must be strictly increasing by order. Cached eliminations are
    /// applied first, then matchup results in round order, so the earliest
    /// elimination of a team is the one kept.
    pub fn new(
        kind: EventKind,
        rounds: Vec<Round>,
        teams: Vec<Team>,
        mut matchups: Vec<Matchup>,
        categories: Vec<Category>,
        cached: &[EliminationRecord],
        entries: Vec<PoolEntry>,
    ) -> Result<Self> {
        let rounds = RoundIndex::new(rounds)?;

        matchups.sort_by_key(|m| {
            (
                rounds.position(&m.round_id).unwrap_or(usize::MAX),
                m.bracket_position,
            )
        });
        let mut eliminations = EliminationMap::with_cached(cached);
        eliminations.apply_results(&matchups);

        Ok(PoolState {
            kind,
            rounds,
            teams,
            matchups,
            categories,
            eliminations,
            entries,
        })
    }

    /// Fetch a pool and its event through `source`.
    pub fn load(source: &impl PoolSource, pool_id: &str) -> Result<Self> {
        let pool = source
            .pool(pool_id)?
            .ok_or_else(|| ProjectorError::UnknownPool(pool_id.to_string()))?;
        let event = source
            .event(&pool.event_id)?
            .ok_or_else(|| ProjectorError::UnknownEvent(pool.event_id.clone()))?;

        let state = PoolState::new(
            event.kind,
            source.rounds(&event.id)?,
            source.teams(&event.id)?,
            source.matchups(&event.id)?,
            source.categories(&event.id)?,
            &source.eliminations(&event.id)?,
            source.entries(&pool.id)?,
        )?;
        debug!(
            "loaded pool {} ({} entries, {} rounds, {} matchups)",
            pool.id,
            state.entries.len(),
            state.rounds.len(),
            state.matchups.len()
        );
        Ok(state)
    }

    fn context(&self) -> ScoringContext<'_> {
        ScoringContext::new(
            &self.rounds,
            &self.teams,
            &self.matchups,
            &self.categories,
            &self.eliminations,
        )
    }

    pub fn eliminations(&self) -> &EliminationMap {
        &self.eliminations
    }

    pub fn entries(&self) -> &[PoolEntry] {
        &self.entries
    }

    pub fn standings(&self) -> Standings {
        Standings::compute(&self.context(), &self.entries)
    }

    pub fn projection(&self) -> Option<Projection> {
        let ctx = self.context();
        let standings = Standings::compute(&ctx, &self.entries);
        project(&ctx, self.kind, &standings, &self.entries)
    }

    /// Scenario analysis of the open bracket. `None` for other event kinds
    /// or when nothing is left to play.
    pub fn path_to_victory(&self, options: &ProjectorOptions) -> Result<Option<ScenarioReport>> {
        options.validate()?;
        let ctx = self.context();
        let standings = Standings::compute(&ctx, &self.entries);
        self.scenarios(&ctx, &standings, options)
    }

    fn scenarios(
        &self,
        ctx: &ScoringContext<'_>,
        standings: &Standings,
        options: &ProjectorOptions,
    ) -> Result<Option<ScenarioReport>> {
        if self.kind != EventKind::Bracket {
            return Ok(None);
        }
        let simulator = ScenarioSimulator::new(
            ctx,
            &self.teams,
            &self.matchups,
            standings,
            &self.entries,
            options.outcome_model,
        );
        simulator.map(|s| s.run(options)).transpose()
    }

    /// Entries whose advancement picks break the Survival Consistency Rule.
    pub fn violations(&self) -> Vec<EntryViolations> {
        self.entries
            .iter()
            .filter_map(|entry| {
                let violations =
                    check_survival_consistency(&entry.picks, &self.rounds, &self.teams);
                (!violations.is_empty()).then(|| EntryViolations {
                    entry_id: entry.id.clone(),
                    violations,
                })
            })
            .collect()
    }

    pub fn report(&self, options: &ProjectorOptions) -> Result<PoolReport> {
        options.validate()?;
        let ctx = self.context();
        let standings = Standings::compute(&ctx, &self.entries);
        let projection = project(&ctx, self.kind, &standings, &self.entries);
        let scenarios = self.scenarios(&ctx, &standings, options)?;

        Ok(PoolReport {
            kind: self.kind,
            standings,
            projection,
            scenarios,
            eliminations: self.eliminations.to_records(),
            violations: self.violations(),
        })
    }
}

/// JSON in, JSON out: evaluate one pool of an `EventSnapshot`.
pub fn evaluate_snapshot_json(
    json: &str,
    pool_id: &str,
    options: &ProjectorOptions,
) -> Result<String> {
    let snapshot = EventSnapshot::from_json(json)?;
    let report = PoolState::load(&snapshot, pool_id)?.report(options)?;
    Ok(serde_json::to_string(&report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::model::{Event, Pool};
    use crate::pick::Pick;
    use crate::projection::Status;
    use crate::source::FetchResult;

    fn teams(ids: &[&str]) -> Vec<Team> {
        ids.iter().map(|id| Team::new(*id, id.to_uppercase(), None)).collect()
    }

    #[test]
    fn test_two_entries_one_decided_game() {
        let state = PoolState::new(
            EventKind::Bracket,
            vec![Round::new("round1", "Round 1", 1, 10)],
            teams(&["x", "y"]),
            vec![Matchup::new("m1", "round1", 1, Some("x"), Some("y")).won_by("x")],
            Vec::new(),
            &[],
            vec![
                PoolEntry::new("a", "A", vec![Pick::bracket("m1", "x")]),
                PoolEntry::new("b", "B", vec![Pick::bracket("m1", "y")]),
            ],
        )
        .unwrap();

        let rows: Vec<_> = state
            .standings()
            .rows
            .into_iter()
            .map(|r| (r.entry_id, r.total_points, r.rank))
            .collect();
        assert_eq!(rows, vec![("a".to_string(), 10, 1), ("b".to_string(), 0, 2)]);

        assert_eq!(
            state.eliminations().to_records(),
            vec![EliminationRecord {
                team_id: "y".to_string(),
                eliminated_in_round_id: "round1".to_string(),
            }]
        );
        assert!(state.projection().is_none());
    }

    #[test]
    fn test_three_way_tie_with_nothing_open() {
        let matchups = vec![
            Matchup::new("m1", "r1", 1, Some("a"), Some("b")).won_by("a"),
            Matchup::new("m2", "r1", 2, Some("c"), Some("d")).won_by("c"),
        ];
        let entries = vec![
            PoolEntry::new("e1", "Ann", vec![Pick::bracket("m1", "a"), Pick::bracket("m2", "c")]),
            PoolEntry::new("e2", "Bob", vec![Pick::bracket("m1", "a"), Pick::bracket("m2", "c")]),
            PoolEntry::new("e3", "Cat", vec![Pick::bracket("m2", "c"), Pick::bracket("m1", "a")]),
        ];
        let state = PoolState::new(
            EventKind::Bracket,
            vec![Round::new("r1", "Round 1", 1, 10)],
            teams(&["a", "b", "c", "d"]),
            matchups,
            Vec::new(),
            &[],
            entries,
        )
        .unwrap();

        let report = state.report(&ProjectorOptions::default()).unwrap();
        assert!(report.standings.rows.iter().all(|r| r.total_points == 20 && r.rank == 1));
        assert!(report.projection.is_none());
        assert!(report.scenarios.is_none());
    }

    #[test]
    fn test_advancement_pick_after_elimination_never_counts() {
        let rounds = vec![
            Round::new("r1", "Wild Card", 1, 1).completed(),
            Round::new("r2", "Divisional", 2, 2).completed(),
            Round::new("r3", "Conference", 3, 4),
        ];
        // The team went out in round 2; the pick for round 3 was made before
        // that was recorded.
        let cached = vec![EliminationRecord {
            team_id: "buf".to_string(),
            eliminated_in_round_id: "r2".to_string(),
        }];
        let entries = vec![PoolEntry::new(
            "e1",
            "Ann",
            vec![
                Pick::advancement("buf", "r1"),
                Pick::advancement("buf", "r2"),
                Pick::advancement("buf", "r3"),
                Pick::advancement("kc", "r3"),
            ],
        )];
        let state = PoolState::new(
            EventKind::Advancement,
            rounds,
            teams(&["buf", "kc"]),
            Vec::new(),
            Vec::new(),
            &cached,
            entries,
        )
        .unwrap();

        let standings = state.standings();
        assert_eq!(standings.rows[0].total_points, 1);
        assert_eq!(standings.rows[0].correct_picks, 1);

        let projection = state.projection().unwrap();
        assert_eq!(projection.open_outcomes, 1);
        // Only the live kc pick is still worth anything.
        assert_eq!(projection.entries[0].potential_points, 4);
        assert_eq!(projection.entries[0].status, Status::Leading);

        // kc has no r2 pick and no bye.
        let violations = state.violations();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].violations[0].missing_round_id, "r2");
    }

    #[test]
    fn test_pick_em_pool() {
        let categories = vec![
            Category {
                id: "pic".to_string(),
                name: "Best Picture".to_string(),
                points: 5,
                correct_option_id: Some("film-a".to_string()),
            },
            Category {
                id: "act".to_string(),
                name: "Best Actor".to_string(),
                points: 3,
                correct_option_id: None,
            },
        ];
        let entries = vec![
            PoolEntry::new(
                "e1",
                "Ann",
                vec![Pick::category("pic", "film-a"), Pick::category("act", "x")],
            ),
            PoolEntry::new(
                "e2",
                "Bob",
                vec![Pick::category("pic", "film-b"), Pick::category("act", "y")],
            ),
        ];
        let state = PoolState::new(
            EventKind::PickEm,
            Vec::new(),
            Vec::new(),
            Vec::new(),
            categories,
            &[],
            entries,
        )
        .unwrap();
        let report = state.report(&ProjectorOptions::default()).unwrap();

        assert_eq!(report.standings.rows[0].entry_id, "e1");
        assert_eq!(report.standings.rows[0].total_points, 5);
        let projection = report.projection.unwrap();
        assert_eq!(projection.get("e1").unwrap().status, Status::Clinched);
        assert_eq!(projection.get("e2").unwrap().status, Status::Eliminated);
        assert!(report.scenarios.is_none());
    }

    #[test]
    fn test_invalid_options_rejected_for_every_kind() {
        let options = ProjectorOptions {
            simulations: 0,
            ..ProjectorOptions::default()
        };
        let pick_em = PoolState::new(
            EventKind::PickEm,
            Vec::new(),
            Vec::new(),
            Vec::new(),
            Vec::new(),
            &[],
            Vec::new(),
        )
        .unwrap();
        assert!(matches!(
            pick_em.report(&options),
            Err(ProjectorError::InvalidOptions(_))
        ));

        // A finished bracket never reaches the simulator.
        let finished = PoolState::new(
            EventKind::Bracket,
            vec![Round::new("r1", "Final", 1, 10)],
            teams(&["x", "y"]),
            vec![Matchup::new("m1", "r1", 1, Some("x"), Some("y")).won_by("x")],
            Vec::new(),
            &[],
            Vec::new(),
        )
        .unwrap();
        assert!(matches!(
            finished.path_to_victory(&options),
            Err(ProjectorError::InvalidOptions(_))
        ));
    }

    #[test]
    fn test_report_includes_scenarios_for_open_bracket() {
        let state = PoolState::new(
            EventKind::Bracket,
            vec![Round::new("r1", "Final", 1, 10)],
            teams(&["x", "y"]),
            vec![Matchup::new("m1", "r1", 1, Some("x"), Some("y"))],
            Vec::new(),
            &[],
            vec![
                PoolEntry::new("a", "A", vec![Pick::bracket("m1", "x")]),
                PoolEntry::new("b", "B", vec![Pick::bracket("m1", "y")]),
            ],
        )
        .unwrap();
        let options = ProjectorOptions {
            outcome_model: crate::win_prob::OutcomeModel::CoinFlip,
            ..ProjectorOptions::default()
        };
        let report = state.report(&options).unwrap();

        let projection = report.projection.unwrap();
        assert!(projection.entries.iter().all(|e| e.status == Status::Tied));

        let scenarios = report.scenarios.unwrap();
        assert_eq!(scenarios.scenarios, 2);
        assert!((scenarios.get("a").unwrap().win_probability - 0.5).abs() < 1e-12);
        assert_eq!(scenarios.get("a").unwrap().required_results[0].team_id, "x");
    }

    #[test]
    fn test_unsorted_rounds_rejected() {
        let result = PoolState::new(
            EventKind::Bracket,
            vec![Round::new("r2", "Final", 2, 20), Round::new("r1", "Semis", 1, 10)],
            Vec::new(),
            Vec::new(),
            Vec::new(),
            &[],
            Vec::new(),
        );
        assert!(matches!(result, Err(ProjectorError::InvalidRoundOrdering { .. })));
    }

    struct BrokenSource;

    impl PoolSource for BrokenSource {
        fn pool(&self, pool_id: &str) -> FetchResult<Option<Pool>> {
            Ok(Some(Pool {
                id: pool_id.to_string(),
                event_id: "ev".to_string(),
                name: "Office".to_string(),
            }))
        }
        fn event(&self, event_id: &str) -> FetchResult<Option<Event>> {
            Ok(Some(Event {
                id: event_id.to_string(),
                name: "Playoffs".to_string(),
                kind: EventKind::Bracket,
            }))
        }
        fn pools_for_event(&self, _: &str) -> FetchResult<Vec<Pool>> {
            Ok(Vec::new())
        }
        fn rounds(&self, _: &str) -> FetchResult<Vec<Round>> {
            Ok(Vec::new())
        }
        fn teams(&self, _: &str) -> FetchResult<Vec<Team>> {
            Ok(Vec::new())
        }
        fn matchups(&self, _: &str) -> FetchResult<Vec<Matchup>> {
            Err(FetchError::new("matchups", "connection reset"))
        }
        fn categories(&self, _: &str) -> FetchResult<Vec<Category>> {
            Ok(Vec::new())
        }
        fn eliminations(&self, _: &str) -> FetchResult<Vec<EliminationRecord>> {
            Ok(Vec::new())
        }
        fn entries(&self, _: &str) -> FetchResult<Vec<PoolEntry>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_fetch_failure_is_distinguishable_from_empty() {
        match PoolState::load(&BrokenSource, "p1") {
            Err(ProjectorError::Fetch(err)) => assert_eq!(err.what, "matchups"),
            other => panic!("expected a fetch error, got {other:?}"),
        }
    }

    #[test]
    fn test_evaluate_snapshot_json() {
        let json = r#"{
            "event": {"id": "ev", "name": "Final", "kind": "bracket"},
            "pools": [{"id": "p1", "eventId": "ev", "name": "Office"}],
            "rounds": [{"id": "r1", "name": "Final", "order": 1, "pointsPerCorrectPick": 10}],
            "teams": [{"id": "x", "name": "X", "seed": 1}, {"id": "y", "name": "Y", "seed": 2}],
            "matchups": [
                {"id": "m1", "roundId": "r1", "bracketPosition": 1,
                 "teamAId": "x", "teamBId": "y", "winnerTeamId": "x"}
            ],
            "entries": [
                {"id": "a", "poolId": "p1", "displayName": "A",
                 "picks": [{"kind": "bracket", "matchupId": "m1", "pickedTeamId": "x"}]},
                {"id": "b", "poolId": "p1", "displayName": "B",
                 "picks": [{"kind": "bracket", "matchupId": "ghost", "pickedTeamId": "y"}]}
            ]
        }"#;
        let out = evaluate_snapshot_json(json, "p1", &ProjectorOptions::default()).unwrap();
        let report: PoolReport = serde_json::from_str(&out).unwrap();
        assert_eq!(report.standings.rows[0].total_points, 10);
        assert_eq!(report.standings.orphans.len(), 1);
        assert!(report.projection.is_none());

        assert!(matches!(
            evaluate_snapshot_json(json, "missing", &ProjectorOptions::default()),
            Err(ProjectorError::UnknownPool(_))
        ));
    }

    #[test]
    fn test_snapshot_with_legacy_entry() {
        let json = r#"{
            "event": {"id": "ev", "name": "Final", "kind": "bracket"},
            "pools": [{"id": "p1", "eventId": "ev", "name": "Office"}],
            "rounds": [{"id": "r1", "name": "Final", "order": 1, "pointsPerCorrectPick": 10}],
            "teams": [{"id": "x", "name": "X"}, {"id": "y", "name": "Y"}],
            "matchups": [
                {"id": "m1", "roundId": "r1", "bracketPosition": 1,
                 "teamAId": "x", "teamBId": "y", "winnerTeamId": "x"}
            ],
            "entries": [
                {"id": "a", "poolId": "p1", "displayName": "Old", "picks": {"m1": "x"}},
                {"id": "b", "poolId": "p1", "displayName": "New",
                 "picks": [{"kind": "bracket", "matchupId": "m1", "pickedTeamId": "y"}]}
            ]
        }"#;
        let out = evaluate_snapshot_json(json, "p1", &ProjectorOptions::default()).unwrap();
        let report: PoolReport = serde_json::from_str(&out).unwrap();

        let rows: Vec<_> = report
            .standings
            .rows
            .iter()
            .map(|r| (r.entry_name.as_str(), r.total_points, r.rank))
            .collect();
        assert_eq!(rows, vec![("Old", 10, 1), ("New", 0, 2)]);
        assert!(report.standings.orphans.is_empty());
    }
}
