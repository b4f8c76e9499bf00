//! Fixture index: gameweek and team views over the fixtures payload.
//!
//! Maps team ids to upcoming fixtures, resolves the current gameweek
//! from bootstrap events, flags double gameweeks, and renders the
//! textual fixture summaries used in the chat context.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::types::{Fixture, GameweekEvent, Team};

/// Resolve the current gameweek from the season's events, falling
/// back to the next gameweek and finally to 1 when the data carries
/// neither flag.
pub fn current_gameweek(events: &[GameweekEvent]) -> u32 {
    events
        .iter()
        .find(|e| e.is_current)
        .or_else(|| events.iter().find(|e| e.is_next))
        .map(|e| e.id)
        .unwrap_or(1)
}

/// Read-only view over one fixtures snapshot plus the season's team
/// and gameweek reference data. Rebuilt wholesale on each fetch.
#[derive(Debug, Clone, Default)]
pub struct FixtureIndex {
    fixtures: Vec<Fixture>,
    /// Teams in payload order; name matching walks this in order.
    teams: Vec<Team>,
    names: HashMap<u32, String>,
    events: Vec<GameweekEvent>,
}

impl FixtureIndex {
    pub fn new(fixtures: Vec<Fixture>, teams: &[Team], events: &[GameweekEvent]) -> Self {
        FixtureIndex {
            fixtures,
            teams: teams.to_vec(),
            names: teams.iter().map(|t| (t.id, t.name.clone())).collect(),
            events: events.to_vec(),
        }
    }

    pub fn fixtures(&self) -> &[Fixture] {
        &self.fixtures
    }

    /// Resolve a team id to its name.
    pub fn team_name(&self, id: u32) -> &str {
        self.names.get(&id).map(String::as_str).unwrap_or("Unknown")
    }

    /// Resolve a team name to its id, case-insensitive.
    pub fn team_id(&self, name: &str) -> Option<u32> {
        let needle = name.to_lowercase();
        self.teams
            .iter()
            .find(|t| t.name.to_lowercase() == needle)
            .map(|t| t.id)
    }

    /// All team names, in payload order.
    pub fn team_names(&self) -> impl Iterator<Item = &str> {
        self.teams.iter().map(|t| t.name.as_str())
    }

    /// The current gameweek id for this snapshot.
    pub fn current_gameweek(&self) -> u32 {
        current_gameweek(&self.events)
    }

    /// Fixtures in the given gameweek, in source order.
    pub fn for_gameweek(&self, gameweek: u32) -> Vec<&Fixture> {
        self.fixtures
            .iter()
            .filter(|f| f.event == Some(gameweek))
            .collect()
    }

    /// Unfinished fixtures for a team (home or away), ascending by
    /// gameweek with unscheduled fixtures last, truncated to `limit`.
    /// Unknown team names yield an empty list.
    pub fn for_team(&self, team_name: &str, limit: usize) -> Vec<&Fixture> {
        let Some(team_id) = self.team_id(team_name) else {
            return Vec::new();
        };

        let mut upcoming: Vec<&Fixture> = self
            .fixtures
            .iter()
            .filter(|f| f.involves(team_id) && !f.finished)
            .collect();
        upcoming.sort_by_key(|f| f.event.unwrap_or(u32::MAX));
        upcoming.truncate(limit);
        upcoming
    }

    /// Gameweek → teams appearing more than once in it.
    ///
    /// Counts every appearance across the given fixture list; fixtures
    /// without a gameweek are ignored.
    pub fn detect_double_gameweeks(&self, fixtures: &[Fixture]) -> BTreeMap<u32, BTreeSet<String>> {
        let mut counts: BTreeMap<u32, HashMap<u32, u32>> = BTreeMap::new();
        for fixture in fixtures {
            let Some(gw) = fixture.event else { continue };
            let per_gw = counts.entry(gw).or_default();
            *per_gw.entry(fixture.team_h).or_insert(0) += 1;
            *per_gw.entry(fixture.team_a).or_insert(0) += 1;
        }

        let mut doubles = BTreeMap::new();
        for (gw, per_team) in counts {
            let flagged: BTreeSet<String> = per_team
                .into_iter()
                .filter(|(_, count)| *count > 1)
                .map(|(team_id, _)| self.team_name(team_id).to_string())
                .collect();
            if !flagged.is_empty() {
                doubles.insert(gw, flagged);
            }
        }
        doubles
    }

    /// Double gameweeks across the whole snapshot.
    pub fn double_gameweeks(&self) -> BTreeMap<u32, BTreeSet<String>> {
        self.detect_double_gameweeks(&self.fixtures)
    }

    /// One fixture as a summary line: "- Home vs Away (kickoff)" with
    /// the final score in place of "vs" once finished.
    fn fixture_line(&self, fixture: &Fixture) -> String {
        format!(
            "- {} {} {} ({})",
            self.team_name(fixture.team_h),
            fixture.score_string(),
            self.team_name(fixture.team_a),
            fixture.kickoff_string(),
        )
    }

    /// Textual summary of the current and next gameweek's fixtures,
    /// used as the chat prompt context.
    pub fn summary(&self) -> String {
        let current = self.current_gameweek();
        let mut out = format!("Current Gameweek ({current}) Fixtures:\n");
        for fixture in self.for_gameweek(current) {
            out.push_str(&self.fixture_line(fixture));
            out.push('\n');
        }

        out.push_str(&format!("\nNext Gameweek ({}) Fixtures:\n", current + 1));
        for fixture in self.for_gameweek(current + 1) {
            out.push_str(&self.fixture_line(fixture));
            out.push('\n');
        }
        out
    }

    /// Upcoming fixtures for one team as "- GW{n}: Home vs {opponent}"
    /// lines, or `None` when the team has no upcoming fixtures.
    pub fn team_summary(&self, team_name: &str, limit: usize) -> Option<String> {
        let team_id = self.team_id(team_name)?;
        let upcoming = self.for_team(team_name, limit);
        if upcoming.is_empty() {
            return None;
        }

        let canonical = self.team_name(team_id);
        let mut out = format!("Upcoming fixtures for {canonical}:\n");
        for fixture in upcoming {
            let is_home = fixture.team_h == team_id;
            let opponent = if is_home {
                self.team_name(fixture.team_a)
            } else {
                self.team_name(fixture.team_h)
            };
            let venue = if is_home { "Home" } else { "Away" };
            let gw = fixture
                .event
                .map(|g| g.to_string())
                .unwrap_or_else(|| "?".to_string());
            out.push_str(&format!(
                "- GW{gw}: {venue} vs {opponent} ({})\n",
                fixture.kickoff_string()
            ));
        }
        Some(out)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
