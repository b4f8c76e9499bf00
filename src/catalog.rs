//! Player catalog built from the bootstrap payload.
//!
//! Filters out players with no recorded minutes (inactive for every
//! recommendation and top-performer query), joins team and position
//! names from the lookup tables in the same payload, and derives the
//! cost-efficiency `value` metric.

use std::collections::HashMap;
use tracing::debug;

use crate::api::Bootstrap;
use crate::types::{Availability, Player, Position};

/// In-memory table of active players for one bootstrap snapshot.
/// Rebuilt from scratch on every fetch.
#[derive(Debug, Clone, Default)]
pub struct PlayerCatalog {
    players: Vec<Player>,
}

impl PlayerCatalog {
    /// Build the catalog from a bootstrap payload.
    ///
    /// Players with zero minutes are excluded. A zero cost makes the
    /// `value` ratio undefined; such players are kept with value 0.0
    /// so they never float to the top of a value ranking.
    pub fn build(bootstrap: &Bootstrap) -> Self {
        let team_names: HashMap<u32, &str> = bootstrap
            .teams
            .iter()
            .map(|t| (t.id, t.name.as_str()))
            .collect();

        let position_names: HashMap<u8, &str> = bootstrap
            .element_types
            .iter()
            .map(|k| (k.id, k.singular_name.as_str()))
            .collect();

        let mut players = Vec::with_capacity(bootstrap.elements.len());
        for element in &bootstrap.elements {
            if element.minutes == 0 {
                continue;
            }

            // Prefer the payload's position name, fall back to the
            // well-known element_type numbering.
            let position = position_names
                .get(&element.element_type)
                .and_then(|name| Position::parse(name))
                .or_else(|| Position::from_element_type(element.element_type));

            let Some(position) = position else {
                debug!(
                    player = %element.web_name,
                    element_type = element.element_type,
                    "Skipping player with unknown position"
                );
                continue;
            };

            let value = if element.now_cost > 0 {
                element.total_points as f64 / element.now_cost as f64
            } else {
                0.0
            };

            players.push(Player {
                id: element.id,
                name: element.web_name.clone(),
                team_id: element.team,
                team_name: team_names
                    .get(&element.team)
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "Unknown".to_string()),
                position,
                now_cost: element.now_cost,
                total_points: element.total_points,
                minutes: element.minutes,
                form: element.form.clone(),
                status: Availability::from_code(&element.status),
                value,
            });
        }

        debug!(
            active = players.len(),
            total = bootstrap.elements.len(),
            "Player catalog built"
        );

        PlayerCatalog { players }
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Look up a player by id.
    pub fn get(&self, id: u32) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    /// Find a player by display name: exact match first, then
    /// substring, both case-insensitive.
    pub fn by_name(&self, name: &str) -> Option<&Player> {
        let needle = name.to_lowercase();
        self.players
            .iter()
            .find(|p| p.name.to_lowercase() == needle)
            .or_else(|| {
                self.players
                    .iter()
                    .find(|p| p.name.to_lowercase().contains(&needle))
            })
    }

    /// Top `limit` players by total points, descending. Ties broken by
    /// id ascending for determinism.
    pub fn top_by_points(&self, limit: usize) -> Vec<&Player> {
        let mut ranked: Vec<&Player> = self.players.iter().collect();
        ranked.sort_by(|a, b| {
            b.total_points
                .cmp(&a.total_points)
                .then(a.id.cmp(&b.id))
        });
        ranked.truncate(limit);
        ranked
    }

    /// Top `limit` players by value, descending, with the recommender's
    /// tie-break order (points descending, then id ascending).
    pub fn top_by_value(&self, limit: usize) -> Vec<&Player> {
        crate::recommend::recommend(self, None, None, limit)
    }

    /// Resolve a player id to its position (used for squad validation).
    pub fn position_of(&self, id: u32) -> Option<Position> {
        self.get(id).map(|p| p.position)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ElementKind, PlayerElement};
    use crate::types::{GameweekEvent, Team};

    fn element(id: u32, name: &str, team: u32, kind: u8, cost: u32, points: i32, minutes: u32) -> PlayerElement {
        PlayerElement {
            id,
            web_name: name.to_string(),
            first_name: String::new(),
            second_name: String::new(),
            team,
            element_type: kind,
            now_cost: cost,
            total_points: points,
            minutes,
            form: "0.0".to_string(),
            status: "a".to_string(),
        }
    }

    fn sample_bootstrap() -> Bootstrap {
        Bootstrap {
            events: vec![GameweekEvent { id: 1, is_current: true, is_next: false, finished: false }],
            teams: vec![
                Team { id: 1, name: "Arsenal".into() },
                Team { id: 2, name: "Liverpool".into() },
            ],
            element_types: vec![
                ElementKind { id: 1, singular_name: "Goalkeeper".into() },
                ElementKind { id: 2, singular_name: "Defender".into() },
                ElementKind { id: 3, singular_name: "Midfielder".into() },
                ElementKind { id: 4, singular_name: "Forward".into() },
            ],
            elements: vec![
                element(1, "Striker", 1, 4, 100, 50, 900),
                element(2, "Poacher", 2, 4, 80, 60, 800),
                element(3, "Winger", 1, 3, 50, 10, 400),
                element(4, "Benchwarmer", 2, 3, 45, 0, 0), // zero minutes
                element(5, "Freebie", 1, 2, 0, 5, 90),     // zero cost
            ],
        }
    }

    #[test]
    fn test_build_filters_zero_minutes() {
        let catalog = PlayerCatalog::build(&sample_bootstrap());
        assert_eq!(catalog.len(), 4);
        assert!(catalog.get(4).is_none());
    }

    #[test]
    fn test_build_joins_names() {
        let catalog = PlayerCatalog::build(&sample_bootstrap());
        let striker = catalog.get(1).unwrap();
        assert_eq!(striker.team_name, "Arsenal");
        assert_eq!(striker.position, Position::Forward);
        let winger = catalog.get(3).unwrap();
        assert_eq!(winger.position, Position::Midfielder);
    }

    #[test]
    fn test_build_value_metric() {
        let catalog = PlayerCatalog::build(&sample_bootstrap());
        assert!((catalog.get(1).unwrap().value - 0.5).abs() < 1e-10);
        assert!((catalog.get(2).unwrap().value - 0.75).abs() < 1e-10);
    }

    #[test]
    fn test_build_zero_cost_guard() {
        let catalog = PlayerCatalog::build(&sample_bootstrap());
        let freebie = catalog.get(5).unwrap();
        assert_eq!(freebie.value, 0.0);
    }

    #[test]
    fn test_by_name_exact_then_substring() {
        let catalog = PlayerCatalog::build(&sample_bootstrap());
        assert_eq!(catalog.by_name("striker").unwrap().id, 1);
        assert_eq!(catalog.by_name("poach").unwrap().id, 2);
        assert!(catalog.by_name("nobody").is_none());
    }

    #[test]
    fn test_top_by_points() {
        let catalog = PlayerCatalog::build(&sample_bootstrap());
        let top = catalog.top_by_points(2);
        assert_eq!(top[0].id, 2); // 60 pts
        assert_eq!(top[1].id, 1); // 50 pts
    }

    #[test]
    fn test_unknown_team_name_falls_back() {
        let mut bootstrap = sample_bootstrap();
        bootstrap.elements.push(element(9, "Mystery", 99, 4, 50, 10, 90));
        let catalog = PlayerCatalog::build(&bootstrap);
        assert_eq!(catalog.get(9).unwrap().team_name, "Unknown");
    }
}
