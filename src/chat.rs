//! Chat assistant: context assembly and LLM orchestration.
//!
//! Each turn gathers a fresh data context (current gameweek, top
//! performers, fixtures, matching rules, optional squad analysis),
//! prepends it to the user's question, and asks the configured model
//! for one completion. A failed model call becomes an inline error
//! reply rather than an HTTP failure, so the conversation survives.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::api::FplApi;
use crate::catalog::PlayerCatalog;
use crate::fixtures::FixtureIndex;
use crate::llm::ChatModel;
use crate::recommend;
use crate::rules::RulesIndex;
use crate::types::{ChatMessage, Squad};

/// How many players each leaderboard section lists.
const TOP_PLAYERS: usize = 5;

/// How many upcoming fixtures a team-specific query includes.
const TEAM_FIXTURES: usize = 5;

const SYSTEM_PROMPT: &str = "You are an AI assistant specialized in Fantasy Premier League (FPL). \
You are an expert on all FPL rules, strategies, and terminology. \
Answer user queries based on current fixtures, injuries, team management, and official FPL rules.";

/// Words that mark a query as being about a team's schedule.
const FIXTURE_CUES: &[&str] = &["fixture", "fixtures", "playing", "games"];

pub struct Assistant {
    api: FplApi,
    model: Arc<dyn ChatModel>,
    rules: RulesIndex,
}

impl Assistant {
    pub fn new(api: FplApi, model: Arc<dyn ChatModel>, rules: RulesIndex) -> Self {
        Assistant { api, model, rules }
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    /// Answer one user turn.
    ///
    /// `history` is the prior conversation in order; `squad` is the
    /// user's stored squad, when they have one. Data sections that
    /// cannot be fetched are omitted rather than failing the turn.
    pub async fn reply(
        &self,
        user_input: &str,
        history: &[ChatMessage],
        squad: Option<&Squad>,
    ) -> String {
        let context = self.build_context(user_input, squad).await;
        let question = format!("{context}\n\nUser Question: {user_input}");

        let mut messages: Vec<ChatMessage> = history.to_vec();
        messages.push(ChatMessage::user(question));

        match self.model.complete(SYSTEM_PROMPT, &messages).await {
            Ok(text) => text,
            Err(e) => {
                warn!(model = self.model.model_name(), error = %e, "model call failed");
                format!("Error getting response: {e}")
            }
        }
    }

    /// Assemble the data context for one query.
    async fn build_context(&self, user_input: &str, squad: Option<&Squad>) -> String {
        let mut sections = Vec::new();

        match self.api.bootstrap().await {
            Ok(bootstrap) => {
                let catalog = PlayerCatalog::build(&bootstrap);
                sections.push(player_context(&catalog));
                if let Some(squad) = squad {
                    sections.push(squad_context(squad, &catalog));
                }

                match self.api.fixtures().await {
                    Ok(fixtures) => {
                        let index =
                            FixtureIndex::new(fixtures, &bootstrap.teams, &bootstrap.events);
                        sections.push(format!(
                            "Current Gameweek: {}\n\n{}",
                            index.current_gameweek(),
                            index.summary()
                        ));
                        if let Some(team) = extract_team_name(user_input, &index) {
                            if let Some(team_fixtures) = index.team_summary(&team, TEAM_FIXTURES) {
                                sections.push(team_fixtures);
                            }
                        }
                    }
                    Err(e) => warn!(error = %e, "fixtures unavailable, omitting from context"),
                }
            }
            Err(e) => warn!(error = %e, "bootstrap unavailable, omitting from context"),
        }

        sections.push(format!(
            "Relevant FPL rules and terminology for this query:\n{}",
            self.rules.search(user_input)
        ));

        debug!(sections = sections.len(), "assembled chat context");
        sections.join("\n\n")
    }
}

/// Current top scorers and best value players, for the prompt.
fn player_context(catalog: &PlayerCatalog) -> String {
    let mut out = String::from("Top Point Scorers:\n");
    for player in catalog.top_by_points(TOP_PLAYERS) {
        out.push_str(&format!(
            "- {} ({}) - {} pts\n",
            player.name, player.team_name, player.total_points
        ));
    }

    out.push_str("\nBest Value Players:\n");
    for player in catalog.top_by_value(TOP_PLAYERS) {
        out.push_str(&format!(
            "- {} ({}) - {:.2} pts/£m cost £{:.1}m\n",
            player.name,
            player.team_name,
            player.value,
            player.cost_millions()
        ));
    }
    out
}

/// The user's squad metrics and suggested upgrades, for the prompt.
fn squad_context(squad: &Squad, catalog: &PlayerCatalog) -> String {
    let analysis = recommend::analyze_squad(&squad.player_ids, catalog);

    let mut out = format!(
        "User's Team Analysis:\nTeam Value: £{:.1}m\nTotal Points: {}\n",
        analysis.metrics.total_value, analysis.metrics.total_points
    );

    if !analysis.replacements.is_empty() {
        out.push_str("\nPotential Improvements:\n");
        for (player, options) in &analysis.replacements {
            out.push_str(&format!(
                "Consider replacing {player} with one of: {}\n",
                options.join(", ")
            ));
        }
    }
    out
}

/// Pick out a team name from a schedule-flavoured query.
///
/// Only fires when the query carries a fixture cue word, then matches
/// team names case-insensitively as substrings, scanning teams in
/// payload order so a query naming several teams resolves the same
/// way every time.
pub fn extract_team_name(query: &str, index: &FixtureIndex) -> Option<String> {
    let query = query.to_lowercase();
    if !FIXTURE_CUES.iter().any(|cue| query.contains(cue)) {
        return None;
    }
    index
        .team_names()
        .find(|name| query.contains(&name.to_lowercase()))
        .map(str::to_string)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GameweekEvent, Team};

    fn index() -> FixtureIndex {
        FixtureIndex::new(
            Vec::new(),
            &[
                Team { id: 1, name: "Arsenal".into() },
                Team { id: 2, name: "Aston Villa".into() },
            ],
            &[GameweekEvent { id: 1, is_current: true, is_next: false, finished: false }],
        )
    }

    #[test]
    fn test_extract_team_name_requires_fixture_cue() {
        let idx = index();
        assert_eq!(extract_team_name("tell me about Arsenal", &idx), None);
        assert_eq!(
            extract_team_name("when is arsenal playing?", &idx),
            Some("Arsenal".to_string())
        );
    }

    #[test]
    fn test_extract_team_name_case_insensitive() {
        let idx = index();
        assert_eq!(
            extract_team_name("ASTON VILLA fixtures please", &idx),
            Some("Aston Villa".to_string())
        );
    }

    #[test]
    fn test_extract_team_name_first_in_payload_order() {
        // Payload order deliberately not alphabetical.
        let idx = FixtureIndex::new(
            Vec::new(),
            &[
                Team { id: 2, name: "Liverpool".into() },
                Team { id: 1, name: "Arsenal".into() },
            ],
            &[],
        );
        assert_eq!(
            extract_team_name("arsenal vs liverpool fixtures", &idx),
            Some("Liverpool".to_string())
        );
    }

    #[test]
    fn test_extract_team_name_unknown_team() {
        let idx = index();
        assert_eq!(extract_team_name("barcelona fixtures", &idx), None);
    }

    #[test]
    fn test_system_prompt_mentions_fpl() {
        assert!(SYSTEM_PROMPT.contains("Fantasy Premier League"));
    }
}
