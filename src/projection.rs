use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::model::{EntryId, EventKind, PoolEntry};
use crate::scoring::ScoringContext;
use crate::standings::Standings;

/// Where an entry stands in the race for first place.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// No other entry can reach the leader's current points
    Clinched,
    Leading,
    /// Shares the top score with at least one other entry
    Tied,
    Chasing,
    /// Cannot reach the leader's current points
    Eliminated,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Status::Clinched => "clinched",
            Status::Leading => "leading",
            Status::Tied => "tied",
            Status::Chasing => "chasing",
            Status::Eliminated => "eliminated",
        };
        f.write_str(label)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryProjection {
    pub entry_id: EntryId,
    pub entry_name: String,
    pub status: Status,
    pub current_points: u32,
    pub potential_points: u32,
    pub max_total: u32,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    /// At least one entry holds a pick the projection could be based on
    pub has_potential_data: bool,
    pub open_outcomes: usize,
    /// In standings order
    pub entries: Vec<EntryProjection>,
}

impl Projection {
    pub fn get(&self, entry_id: &str) -> Option<&EntryProjection> {
        self.entries.iter().find(|e| e.entry_id == entry_id)
    }
}

/// Assign a status to every entry.
///
/// `current` and `max_totals` are parallel slices. A lone sole leader is
/// only upgraded to clinched when there is pick data behind the totals and
/// at least one rival to have clinched against.
pub fn classify(current: &[u32], max_totals: &[u32], has_potential_data: bool) -> Vec<Status> {
    let Some(&leader_points) = current.iter().max() else {
        return Vec::new();
    };
    let top_count = current.iter().filter(|&&p| p == leader_points).count();

    let best_rival_max = if top_count == 1 {
        current
            .iter()
            .zip(max_totals)
            .filter(|(&p, _)| p != leader_points)
            .map(|(_, &m)| m)
            .max()
    } else {
        None
    };

    current
        .iter()
        .zip(max_totals)
        .map(|(&points, &max_total)| {
            if points == leader_points {
                if top_count > 1 {
                    Status::Tied
                } else if has_potential_data && best_rival_max.is_some_and(|m| leader_points >= m) {
                    Status::Clinched
                } else {
                    Status::Leading
                }
            } else if max_total < leader_points {
                Status::Eliminated
            } else {
                Status::Chasing
            }
        })
        .collect()
}

fn message(
    status: Status,
    points: u32,
    potential: u32,
    max_total: u32,
    leader: u32,
    runner_up: u32,
    top_count: usize,
) -> String {
    match status {
        Status::Clinched => "Clinched first place".to_string(),
        Status::Leading if top_count == 1 && runner_up == leader => {
            format!("Only entry in the pool with {} points still in play", potential)
        }
        Status::Leading => format!(
            "Leads by {} with {} points still in play",
            points - runner_up,
            potential
        ),
        Status::Tied => match top_count - 1 {
            1 => "Tied for first with 1 other entry".to_string(),
            n => format!("Tied for first with {} other entries", n),
        },
        Status::Chasing => format!(
            "{} behind with {} points still in play",
            leader - points,
            potential
        ),
        Status::Eliminated => format!(
            "Cannot catch the leader: best possible {} against {}",
            max_total, leader
        ),
    }
}

/// Project every entry's best possible finish.
///
/// Returns `None` when nothing is left to decide; the final standings are
/// the answer then.
pub fn project(
    ctx: &ScoringContext<'_>,
    kind: EventKind,
    standings: &Standings,
    entries: &[PoolEntry],
) -> Option<Projection> {
    let open_outcomes = ctx.open_outcomes(kind);
    if open_outcomes == 0 {
        debug!("no open outcomes, skipping projection");
        return None;
    }

    let tallies: HashMap<&str, _> = entries
        .iter()
        .map(|entry| (entry.id.as_str(), ctx.tally(entry)))
        .collect();
    let has_potential_data = tallies.values().any(|t| t.scoreable_picks > 0);

    let rows = &standings.rows;
    let current: Vec<u32> = rows.iter().map(|row| row.total_points).collect();
    let potential: Vec<u32> = rows
        .iter()
        .map(|row| {
            tallies
                .get(row.entry_id.as_str())
                .map_or(0, |t| t.potential_points)
        })
        .collect();
    let max_totals: Vec<u32> = current
        .iter()
        .zip(&potential)
        .map(|(c, p)| c.saturating_add(*p))
        .collect();
    let statuses = classify(&current, &max_totals, has_potential_data);

    let leader = current.iter().copied().max().unwrap_or(0);
    let top_count = current.iter().filter(|&&p| p == leader).count();
    let runner_up = current
        .iter()
        .copied()
        .filter(|&p| p != leader)
        .max()
        .unwrap_or(leader);

    let entries = rows
        .iter()
        .enumerate()
        .map(|(i, row)| EntryProjection {
            entry_id: row.entry_id.clone(),
            entry_name: row.entry_name.clone(),
            status: statuses[i],
            current_points: current[i],
            potential_points: potential[i],
            max_total: max_totals[i],
            message: message(
                statuses[i],
                current[i],
                potential[i],
                max_totals[i],
                leader,
                runner_up,
                top_count,
            ),
        })
        .collect();

    Some(Projection {
        has_potential_data,
        open_outcomes,
        entries,
    })
}
