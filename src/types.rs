//! Shared types for the FPL Assistant.
//!
//! These types form the data model used across all modules.
//! Wire-shaped types (`Team`, `Fixture`, `GameweekEvent`) deserialize
//! directly from FPL API payloads; the rest are derived domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A player's registered position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
}

impl Position {
    /// Map the FPL `element_type` id (1–4) to a position.
    pub fn from_element_type(id: u8) -> Option<Self> {
        match id {
            1 => Some(Position::Goalkeeper),
            2 => Some(Position::Defender),
            3 => Some(Position::Midfielder),
            4 => Some(Position::Forward),
            _ => None,
        }
    }

    /// Short form used in API queries and display tables.
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Position::Goalkeeper => "GK",
            Position::Defender => "DEF",
            Position::Midfielder => "MID",
            Position::Forward => "FWD",
        }
    }

    /// Parse either the full name or the abbreviation, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "goalkeeper" | "gk" | "gkp" => Some(Position::Goalkeeper),
            "defender" | "def" => Some(Position::Defender),
            "midfielder" | "mid" => Some(Position::Midfielder),
            "forward" | "fwd" => Some(Position::Forward),
            _ => None,
        }
    }

    /// Required count of this position in a valid 15-player squad.
    pub fn squad_quota(&self) -> usize {
        match self {
            Position::Goalkeeper => 2,
            Position::Defender => 5,
            Position::Midfielder => 5,
            Position::Forward => 3,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Position::Goalkeeper => "Goalkeeper",
            Position::Defender => "Defender",
            Position::Midfielder => "Midfielder",
            Position::Forward => "Forward",
        };
        write!(f, "{name}")
    }
}

// ---------------------------------------------------------------------------
// Availability
// ---------------------------------------------------------------------------

/// A player's availability status, from the single-letter `status`
/// code in the bootstrap payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Availability {
    Available,
    Doubtful,
    Injured,
    Unavailable,
    Suspended,
}

impl Availability {
    /// Decode the FPL status code. Unknown codes are treated as
    /// unavailable rather than rejected.
    pub fn from_code(code: &str) -> Self {
        match code {
            "a" => Availability::Available,
            "d" => Availability::Doubtful,
            "i" => Availability::Injured,
            "s" => Availability::Suspended,
            _ => Availability::Unavailable,
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Availability::Available => "available",
            Availability::Doubtful => "doubtful",
            Availability::Injured => "injured",
            Availability::Unavailable => "unavailable",
            Availability::Suspended => "suspended",
        };
        write!(f, "{label}")
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// An active player in the catalog, enriched with team and position
/// names and the derived cost-efficiency `value` metric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: u32,
    /// Display name (`web_name` in the API).
    pub name: String,
    pub team_id: u32,
    pub team_name: String,
    pub position: Position,
    /// Cost in tenths of £1m (e.g. 75 = £7.5m).
    pub now_cost: u32,
    pub total_points: i32,
    pub minutes: u32,
    /// Recent form as reported by the API (decimal string, e.g. "4.2").
    pub form: String,
    pub status: Availability,
    /// Cost efficiency: `total_points / now_cost`. Zero when cost is zero.
    pub value: f64,
}

impl Player {
    /// Cost in display units (£m).
    pub fn cost_millions(&self) -> f64 {
        self.now_cost as f64 / 10.0
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {}) £{:.1}m — {} pts",
            self.name,
            self.team_name,
            self.position.abbreviation(),
            self.cost_millions(),
            self.total_points,
        )
    }
}

// ---------------------------------------------------------------------------
// Team and gameweek events (wire-shaped)
// ---------------------------------------------------------------------------

/// A Premier League team. Immutable reference data for the season.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: u32,
    pub name: String,
}

/// A gameweek entry from the bootstrap `events` list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameweekEvent {
    pub id: u32,
    #[serde(default)]
    pub is_current: bool,
    #[serde(default)]
    pub is_next: bool,
    #[serde(default)]
    pub finished: bool,
}

// ---------------------------------------------------------------------------
// Fixture (wire-shaped)
// ---------------------------------------------------------------------------

/// A single match from the fixtures endpoint. Replaced wholesale on
/// each fetch; scores are present only once the match has finished.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fixture {
    /// Gameweek number; `None` for unscheduled fixtures.
    pub event: Option<u32>,
    pub team_h: u32,
    pub team_a: u32,
    #[serde(default)]
    pub finished: bool,
    #[serde(default)]
    pub team_h_score: Option<u32>,
    #[serde(default)]
    pub team_a_score: Option<u32>,
    /// Fixture difficulty rating (1–5) from each side's perspective.
    #[serde(default)]
    pub team_h_difficulty: Option<u8>,
    #[serde(default)]
    pub team_a_difficulty: Option<u8>,
    #[serde(default)]
    pub kickoff_time: Option<DateTime<Utc>>,
}

impl Fixture {
    /// Whether the given team plays in this fixture.
    pub fn involves(&self, team_id: u32) -> bool {
        self.team_h == team_id || self.team_a == team_id
    }

    /// Score string: "2 - 1" once finished, "vs" otherwise.
    pub fn score_string(&self) -> String {
        if self.finished {
            format!(
                "{} - {}",
                self.team_h_score.unwrap_or(0),
                self.team_a_score.unwrap_or(0)
            )
        } else {
            "vs".to_string()
        }
    }

    /// Kickoff formatted for display, "TBD" when unscheduled.
    pub fn kickoff_string(&self) -> String {
        match self.kickoff_time {
            Some(t) => t.format("%d %b %Y - %H:%M").to_string(),
            None => "TBD".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Squad
// ---------------------------------------------------------------------------

/// A manager's saved 15-player squad, stored as player ids. Position
/// composition (2 GK / 5 DEF / 5 MID / 3 FWD) is enforced only when
/// the squad is saved, never at analysis time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Squad {
    pub player_ids: Vec<u32>,
}

impl Squad {
    pub const SIZE: usize = 15;

    pub fn new(player_ids: Vec<u32>) -> Self {
        Squad { player_ids }
    }

    /// Validate the squad composition against position lookups.
    ///
    /// `position_of` resolves a player id to its position; unknown ids
    /// fail validation outright.
    pub fn validate<F>(&self, position_of: F) -> Result<(), FplError>
    where
        F: Fn(u32) -> Option<Position>,
    {
        if self.player_ids.len() != Self::SIZE {
            return Err(FplError::InvalidSquad(format!(
                "squad must have exactly {} players, got {}",
                Self::SIZE,
                self.player_ids.len()
            )));
        }

        let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
        for &id in &self.player_ids {
            let pos = position_of(id)
                .ok_or_else(|| FplError::InvalidSquad(format!("unknown player id {id}")))?;
            *counts.entry(pos.abbreviation()).or_insert(0) += 1;
        }

        for pos in [
            Position::Goalkeeper,
            Position::Defender,
            Position::Midfielder,
            Position::Forward,
        ] {
            let have = counts.get(pos.abbreviation()).copied().unwrap_or(0);
            if have != pos.squad_quota() {
                return Err(FplError::InvalidSquad(format!(
                    "need {} {}s, got {have}",
                    pos.squad_quota(),
                    pos.abbreviation()
                )));
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Squad analysis
// ---------------------------------------------------------------------------

/// Aggregate metrics over a squad.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SquadMetrics {
    /// Total squad cost in £m.
    pub total_value: f64,
    pub total_points: i32,
    pub avg_minutes: f64,
}

/// Output of `recommend::analyze_squad`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SquadAnalysis {
    pub metrics: SquadMetrics,
    /// Names of players strictly below the squad's median value,
    /// ascending by value.
    pub underperforming: Vec<String>,
    /// Player name → up to three suggested replacement names.
    pub replacements: BTreeMap<String, Vec<String>>,
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

/// Message role in an LLM conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        };
        write!(f, "{s}")
    }
}

/// A single role-tagged message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        ChatMessage { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        ChatMessage { role: Role::Assistant, content: content.into() }
    }
}

/// A persisted conversation entry with its timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMessage {
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl From<&StoredMessage> for ChatMessage {
    fn from(m: &StoredMessage) -> Self {
        ChatMessage { role: m.role, content: m.content.clone() }
    }
}

// ---------------------------------------------------------------------------
// User settings
// ---------------------------------------------------------------------------

/// Per-user saved settings, persisted as one JSON file per username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSettings {
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub favorite_team: Option<String>,
    /// The user's FPL entry (manager) id, used to fetch picks.
    #[serde(default)]
    pub fpl_entry_id: Option<u64>,
    #[serde(default)]
    pub notifications_enabled: bool,
}

impl UserSettings {
    pub fn new(username: impl Into<String>) -> Self {
        UserSettings {
            username: username.into(),
            display_name: None,
            favorite_team: None,
            fpl_entry_id: None,
            notifications_enabled: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for the assistant.
#[derive(Debug, thiserror::Error)]
pub enum FplError {
    #[error("FPL API error ({endpoint}): {message}")]
    Api { endpoint: String, message: String },

    #[error("LLM error ({model}): {message}")]
    Llm { model: String, message: String },

    #[error("Invalid squad: {0}")]
    InvalidSquad(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
