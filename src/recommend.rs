//! Player recommendation and squad analysis.
//!
//! `recommend` is a linear filter + deterministic sort over the
//! catalog; `analyze_squad` computes aggregate metrics, flags squad
//! members strictly below the median value, and suggests up to three
//! replacements per flagged player within a small budget headroom.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use crate::catalog::PlayerCatalog;
use crate::types::{Player, Position, SquadAnalysis, SquadMetrics};

/// Budget headroom when hunting replacements, in cost tenths (£0.5m).
const REPLACEMENT_HEADROOM: u32 = 5;

/// Replacement suggestions per underperforming player.
const REPLACEMENT_COUNT: usize = 3;

/// Top players by value, filtered by position and cost ceiling.
///
/// Ordering is value descending; ties break by total points descending
/// and then id ascending so results are fully deterministic.
pub fn recommend<'a>(
    catalog: &'a PlayerCatalog,
    position: Option<Position>,
    max_cost: Option<u32>,
    limit: usize,
) -> Vec<&'a Player> {
    let mut candidates: Vec<&Player> = catalog
        .players()
        .iter()
        .filter(|p| position.map_or(true, |pos| p.position == pos))
        .filter(|p| max_cost.map_or(true, |cost| p.now_cost <= cost))
        .collect();

    candidates.sort_by(|a, b| rank_order(a, b));
    candidates.truncate(limit);
    candidates
}

fn rank_order(a: &Player, b: &Player) -> Ordering {
    b.value
        .partial_cmp(&a.value)
        .unwrap_or(Ordering::Equal)
        .then(b.total_points.cmp(&a.total_points))
        .then(a.id.cmp(&b.id))
}

/// Analyze a squad against the catalog.
///
/// Squad members absent from the catalog (inactive players) are simply
/// ignored. An empty effective squad yields zeroed metrics and no
/// underperforming list. Squad-size validation is a save-time concern
/// and deliberately not checked here.
pub fn analyze_squad(squad_ids: &[u32], catalog: &PlayerCatalog) -> SquadAnalysis {
    let id_set: HashSet<u32> = squad_ids.iter().copied().collect();
    let members: Vec<&Player> = catalog
        .players()
        .iter()
        .filter(|p| id_set.contains(&p.id))
        .collect();

    if members.is_empty() {
        return SquadAnalysis {
            metrics: SquadMetrics { total_value: 0.0, total_points: 0, avg_minutes: 0.0 },
            underperforming: Vec::new(),
            replacements: BTreeMap::new(),
        };
    }

    let total_cost: u32 = members.iter().map(|p| p.now_cost).sum();
    let total_points: i32 = members.iter().map(|p| p.total_points).sum();
    let total_minutes: u64 = members.iter().map(|p| p.minutes as u64).sum();

    let metrics = SquadMetrics {
        total_value: total_cost as f64 / 10.0,
        total_points,
        avg_minutes: total_minutes as f64 / members.len() as f64,
    };

    let median = median_value(&members);

    let mut underperformers: Vec<&Player> = members
        .iter()
        .copied()
        .filter(|p| p.value < median)
        .collect();
    underperformers.sort_by(|a, b| rank_order(b, a)); // ascending by value

    let mut replacements = BTreeMap::new();
    for player in &underperformers {
        let budget = player.now_cost + REPLACEMENT_HEADROOM;
        let suggestions: Vec<String> = recommend(catalog, Some(player.position), Some(budget), usize::MAX)
            .into_iter()
            .filter(|candidate| !id_set.contains(&candidate.id))
            .take(REPLACEMENT_COUNT)
            .map(|candidate| candidate.name.clone())
            .collect();

        if !suggestions.is_empty() {
            replacements.insert(player.name.clone(), suggestions);
        }
    }

    SquadAnalysis {
        metrics,
        underperforming: underperformers.iter().map(|p| p.name.clone()).collect(),
        replacements,
    }
}

/// Median of the members' values: mean of the middle pair for an even
/// count, the middle element otherwise.
fn median_value(members: &[&Player]) -> f64 {
    let mut values: Vec<f64> = members.iter().map(|p| p.value).collect();
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let n = values.len();
    if n % 2 == 0 {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    } else {
        values[n / 2]
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
