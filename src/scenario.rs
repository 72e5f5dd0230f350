//! Path-to-victory analysis over the remaining bracket games.
//!
//! Every open matchup is given a winner, entries are scored against the
//! filled-in bracket, and first-place finishes are tallied. Small brackets are
//! enumerated outright; larger ones are sampled.

use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::bracket::{BracketIndex, Slot};
use crate::config::ProjectorOptions;
use crate::error::Result;
use crate::matchup::Matchup;
use crate::model::{EntryId, MatchupId, PoolEntry, TeamId};
use crate::pick::Pick;
use crate::scoring::{PickOutcome, ScoringContext};
use crate::standings::Standings;
use crate::team::Team;
use crate::win_prob::OutcomeModel;

/// Scenarios handled per parallel work item
const CHUNK: usize = 256;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioMode {
    Exhaustive,
    Sampled,
}

/// A result an entry needs in every scenario where it finishes first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequiredResult {
    pub matchup_id: MatchupId,
    pub team_id: TeamId,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryOutlook {
    pub entry_id: EntryId,
    pub entry_name: String,
    /// Chance of finishing first, with shared firsts split evenly
    pub win_probability: f64,
    pub outright_firsts: u64,
    pub shared_firsts: u64,
    /// Empty when the entry never finishes first
    pub required_results: Vec<RequiredResult>,
}

impl EntryOutlook {
    pub fn can_win(&self) -> bool {
        self.outright_firsts + self.shared_firsts > 0
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioReport {
    pub mode: ScenarioMode,
    pub open_matchups: usize,
    pub scenarios: u64,
    /// In standings order
    pub outlooks: Vec<EntryOutlook>,
}

impl ScenarioReport {
    pub fn get(&self, entry_id: &str) -> Option<&EntryOutlook> {
        self.outlooks.iter().find(|o| o.entry_id == entry_id)
    }
}

#[derive(Clone, Copy, Debug)]
enum Source {
    Fixed(usize),
    Open(usize),
    Empty,
}

struct Game {
    matchup_id: MatchupId,
    sides: [Source; 2],
}

impl Game {
    fn contested(&self) -> bool {
        !matches!(self.sides, [Source::Empty, _] | [_, Source::Empty])
    }
}

/// What every winning scenario for an entry agreed on for one game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Consensus {
    Unseen,
    Always(Option<usize>),
    Mixed,
}

impl Consensus {
    fn observe(self, winner: Option<usize>) -> Self {
        match self {
            Consensus::Unseen => Consensus::Always(winner),
            Consensus::Always(seen) if seen == winner => self,
            _ => Consensus::Mixed,
        }
    }

    fn merge(self, other: Self) -> Self {
        match (self, other) {
            (Consensus::Unseen, o) => o,
            (s, Consensus::Unseen) => s,
            (Consensus::Always(a), Consensus::Always(b)) if a == b => self,
            _ => Consensus::Mixed,
        }
    }
}

struct Tally {
    scenarios: u64,
    total_weight: f64,
    weights: Vec<f64>,
    outright: Vec<u64>,
    shared: Vec<u64>,
    /// entries x games
    consensus: Vec<Vec<Consensus>>,
}

impl Tally {
    fn new(entries: usize, games: usize) -> Self {
        Tally {
            scenarios: 0,
            total_weight: 0.0,
            weights: vec![0.0; entries],
            outright: vec![0; entries],
            shared: vec![0; entries],
            consensus: vec![vec![Consensus::Unseen; games]; entries],
        }
    }

    fn add(&mut self, scores: &[u32], winners: &[Option<usize>], weight: f64) {
        self.scenarios += 1;
        self.total_weight += weight;

        let Some(&best) = scores.iter().max() else {
            return;
        };
        let firsts: Vec<usize> = (0..scores.len()).filter(|&e| scores[e] == best).collect();
        let share = weight / firsts.len() as f64;
        for &e in &firsts {
            self.weights[e] += share;
            if firsts.len() == 1 {
                self.outright[e] += 1;
            } else {
                self.shared[e] += 1;
            }
            for (g, consensus) in self.consensus[e].iter_mut().enumerate() {
                *consensus = consensus.observe(winners[g]);
            }
        }
    }

    fn merge(mut self, other: Tally) -> Tally {
        self.scenarios += other.scenarios;
        self.total_weight += other.total_weight;
        for e in 0..self.weights.len() {
            self.weights[e] += other.weights[e];
            self.outright[e] += other.outright[e];
            self.shared[e] += other.shared[e];
            for (mine, theirs) in self.consensus[e].iter_mut().zip(&other.consensus[e]) {
                *mine = mine.merge(*theirs);
            }
        }
        self
    }
}

/// Open bracket compiled to indices for fast repeated play.
pub struct ScenarioSimulator {
    games: Vec<Game>,
    team_ids: Vec<TeamId>,
    seeds: Vec<Option<u32>>,
    entry_ids: Vec<EntryId>,
    entry_names: Vec<String>,
    base_points: Vec<u32>,
    /// Per entry: (game, team, points) for every live bracket pick
    live_picks: Vec<Vec<(usize, usize, u32)>>,
    model: OutcomeModel,
}

impl ScenarioSimulator {
    /// Compile the open part of the bracket. Returns `None` when no
    /// matchup is open.
    pub fn new(
        ctx: &ScoringContext<'_>,
        teams: &[Team],
        matchups: &[Matchup],
        standings: &Standings,
        entries: &[PoolEntry],
        model: OutcomeModel,
    ) -> Option<Self> {
        let rounds = ctx.rounds();
        let mut open: Vec<&Matchup> = matchups
            .iter()
            .filter(|m| !m.is_decided() && rounds.get(&m.round_id).is_some())
            .collect();
        if open.is_empty() {
            return None;
        }
        open.sort_by_key(|m| (rounds.position(&m.round_id), m.bracket_position));

        let mut team_ids: Vec<TeamId> = Vec::new();
        let mut seeds = Vec::new();
        let mut team_index: HashMap<TeamId, usize> = HashMap::new();
        let seed_of: HashMap<&str, Option<u32>> =
            teams.iter().map(|t| (t.id.as_str(), t.seed)).collect();
        let mut intern = |id: &str| -> usize {
            if let Some(&i) = team_index.get(id) {
                return i;
            }
            team_ids.push(id.to_string());
            seeds.push(seed_of.get(id).copied().flatten());
            team_index.insert(id.to_string(), team_ids.len() - 1);
            team_ids.len() - 1
        };

        let game_index: HashMap<&str, usize> = open
            .iter()
            .enumerate()
            .map(|(i, m)| (m.id.as_str(), i))
            .collect();
        let bracket = BracketIndex::new(rounds, matchups);
        let games: Vec<Game> = open
            .iter()
            .map(|matchup| {
                let sides = bracket.slots(matchup).map(|slot| match slot {
                    Slot::Team(team) => Source::Fixed(intern(team.as_str())),
                    Slot::WinnerOf(feeder) => game_index
                        .get(feeder.as_str())
                        .map_or(Source::Empty, |&g| Source::Open(g)),
                    Slot::Empty => Source::Empty,
                });
                Game {
                    matchup_id: matchup.id.clone(),
                    sides,
                }
            })
            .collect();

        let points: HashMap<&str, u32> = standings
            .rows
            .iter()
            .map(|row| (row.entry_id.as_str(), row.total_points))
            .collect();
        let by_id: HashMap<&str, &PoolEntry> = entries.iter().map(|e| (e.id.as_str(), e)).collect();

        let mut entry_ids = Vec::new();
        let mut entry_names = Vec::new();
        let mut base_points = Vec::new();
        let mut live_picks = Vec::new();
        for row in &standings.rows {
            let mut live = Vec::new();
            if let Some(entry) = by_id.get(row.entry_id.as_str()) {
                for pick in &entry.picks {
                    let Pick::Bracket {
                        matchup_id,
                        picked_team_id,
                    } = pick
                    else {
                        continue;
                    };
                    if let (PickOutcome::Live(value), Some(&g)) =
                        (ctx.evaluate(pick), game_index.get(matchup_id.as_str()))
                    {
                        live.push((g, intern(picked_team_id.as_str()), value));
                    }
                }
            }
            entry_ids.push(row.entry_id.clone());
            entry_names.push(row.entry_name.clone());
            base_points.push(points.get(row.entry_id.as_str()).copied().unwrap_or(0));
            live_picks.push(live);
        }

        Some(ScenarioSimulator {
            games,
            team_ids,
            seeds,
            entry_ids,
            entry_names,
            base_points,
            live_picks,
            model,
        })
    }

    pub fn open_matchups(&self) -> usize {
        self.games.len()
    }

    fn side(source: Source, winners: &[Option<usize>]) -> Option<usize> {
        match source {
            Source::Fixed(team) => Some(team),
            Source::Open(game) => winners[game],
            Source::Empty => None,
        }
    }

    fn win_prob(&self, a: usize, b: usize) -> f64 {
        self.model.win_prob(self.seeds[a], self.seeds[b])
    }

    /// Play scenario `mask`: bit `g` set means side B wins game `g`.
    ///
    /// Returns `None` for masks that pick a winner out of a one-sided game;
    /// the same scenario is counted under the mask with that bit clear.
    fn play_mask(&self, mask: u64) -> Option<(Vec<Option<usize>>, f64)> {
        let mut winners = Vec::with_capacity(self.games.len());
        let mut weight = 1.0;
        for (g, game) in self.games.iter().enumerate() {
            let b_wins = (mask >> g) & 1 == 1;
            let a = Self::side(game.sides[0], &winners);
            let b = Self::side(game.sides[1], &winners);
            let winner = match (a, b) {
                (Some(a), Some(b)) => {
                    let p = self.win_prob(a, b);
                    if b_wins {
                        weight *= 1.0 - p;
                        Some(b)
                    } else {
                        weight *= p;
                        Some(a)
                    }
                }
                (one, other) => {
                    if b_wins {
                        return None;
                    }
                    one.or(other)
                }
            };
            winners.push(winner);
        }
        Some((winners, weight))
    }

    fn play_sampled(&self, seed: u64) -> Vec<Option<usize>> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut winners = Vec::with_capacity(self.games.len());
        for game in &self.games {
            let a = Self::side(game.sides[0], &winners);
            let b = Self::side(game.sides[1], &winners);
            let winner = match (a, b) {
                (Some(a), Some(b)) => {
                    if rng.gen::<f64>() < self.win_prob(a, b) {
                        Some(a)
                    } else {
                        Some(b)
                    }
                }
                (one, other) => one.or(other),
            };
            winners.push(winner);
        }
        winners
    }

    fn scores(&self, winners: &[Option<usize>]) -> Vec<u32> {
        self.base_points
            .iter()
            .zip(&self.live_picks)
            .map(|(&base, picks)| {
                picks
                    .iter()
                    .filter(|&&(g, team, _)| winners[g] == Some(team))
                    .fold(base, |total, &(_, _, points)| total.saturating_add(points))
            })
            .collect()
    }

    fn empty_tally(&self) -> Tally {
        Tally::new(self.entry_ids.len(), self.games.len())
    }

    fn run_exhaustive(&self) -> Tally {
        let total = 1u64 << self.games.len();
        let chunks = total.div_ceil(CHUNK as u64);

        // Chunks are merged in order so float sums do not depend on scheduling.
        let tallies: Vec<Tally> = (0..chunks)
            .into_par_iter()
            .map(|chunk| {
                let mut tally = self.empty_tally();
                let start = chunk * CHUNK as u64;
                for mask in start..(start + CHUNK as u64).min(total) {
                    if let Some((winners, weight)) = self.play_mask(mask) {
                        tally.add(&self.scores(&winners), &winners, weight);
                    }
                }
                tally
            })
            .collect();
        tallies.into_iter().fold(self.empty_tally(), Tally::merge)
    }

    fn run_sampled(&self, simulations: usize, seed: Option<u64>) -> Tally {
        let mut rng = match seed {
            Some(s) => ChaCha8Rng::seed_from_u64(s),
            None => ChaCha8Rng::from_entropy(),
        };
        let seeds: Vec<u64> = (0..simulations).map(|_| rng.gen::<u64>()).collect();

        let tallies: Vec<Tally> = seeds
            .par_chunks(CHUNK)
            .map(|chunk| {
                let mut tally = self.empty_tally();
                for &sim_seed in chunk {
                    let winners = self.play_sampled(sim_seed);
                    tally.add(&self.scores(&winners), &winners, 1.0);
                }
                tally
            })
            .collect();
        tallies.into_iter().fold(self.empty_tally(), Tally::merge)
    }

    /// Run the analysis with the given options.
    pub fn run(&self, options: &ProjectorOptions) -> Result<ScenarioReport> {
        options.validate()?;

        let exhaustive = self.games.len() <= options.exhaustive_limit as usize;
        let tally = if exhaustive {
            self.run_exhaustive()
        } else {
            self.run_sampled(options.simulations, options.seed)
        };
        debug!(
            "evaluated {} scenarios over {} open matchups for {} entries",
            tally.scenarios,
            self.games.len(),
            self.entry_ids.len()
        );

        let outlooks = (0..self.entry_ids.len())
            .map(|e| {
                let can_win = tally.outright[e] + tally.shared[e] > 0;
                let required_results = if can_win {
                    self.games
                        .iter()
                        .zip(&tally.consensus[e])
                        .filter(|(game, _)| game.contested())
                        .filter_map(|(game, consensus)| match consensus {
                            Consensus::Always(Some(team)) => Some(RequiredResult {
                                matchup_id: game.matchup_id.clone(),
                                team_id: self.team_ids[*team].clone(),
                            }),
                            _ => None,
                        })
                        .collect()
                } else {
                    Vec::new()
                };
                EntryOutlook {
                    entry_id: self.entry_ids[e].clone(),
                    entry_name: self.entry_names[e].clone(),
                    win_probability: if tally.total_weight > 0.0 {
                        tally.weights[e] / tally.total_weight
                    } else {
                        0.0
                    },
                    outright_firsts: tally.outright[e],
                    shared_firsts: tally.shared[e],
                    required_results,
                }
            })
            .collect();

        Ok(ScenarioReport {
            mode: if exhaustive {
                ScenarioMode::Exhaustive
            } else {
                ScenarioMode::Sampled
            },
            open_matchups: self.games.len(),
            scenarios: tally.scenarios,
            outlooks,
        })
    }
}
