//! Web API route handlers.
//!
//! All endpoints return JSON. State is shared via `Arc<ServerState>`.
//! Upstream FPL API failures surface as 502, bad input as 400, and
//! missing resources as 404.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::api::FplApi;
use crate::catalog::PlayerCatalog;
use crate::chat::Assistant;
use crate::fixtures::{self, FixtureIndex};
use crate::recommend;
use crate::rules::RulesIndex;
use crate::storage::UserStore;
use crate::types::{ChatMessage, Fixture, FplError, Position, Role, Squad, StoredMessage, UserSettings};

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers.
pub struct ServerState {
    pub api: FplApi,
    pub assistant: Assistant,
    pub rules: RulesIndex,
    pub store: UserStore,
}

pub type AppState = Arc<ServerState>;

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

/// Handler error carrying an HTTP status.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        ApiError { status: StatusCode::BAD_REQUEST, message: message.into() }
    }

    fn not_found(message: impl Into<String>) -> Self {
        ApiError { status: StatusCode::NOT_FOUND, message: message.into() }
    }

    fn upstream(err: anyhow::Error) -> Self {
        error!(error = %err, "upstream FPL API failure");
        ApiError { status: StatusCode::BAD_GATEWAY, message: format!("{err:#}") }
    }

    fn internal(err: anyhow::Error) -> Self {
        error!(error = %err, "internal error");
        ApiError { status: StatusCode::INTERNAL_SERVER_ERROR, message: format!("{err:#}") }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.message }));
        (self.status, body).into_response()
    }
}

impl From<FplError> for ApiError {
    fn from(err: FplError) -> Self {
        match err {
            FplError::InvalidSquad(_) => ApiError::bad_request(err.to_string()),
            FplError::Api { .. } => {
                error!(error = %err, "upstream FPL API failure");
                ApiError { status: StatusCode::BAD_GATEWAY, message: err.to_string() }
            }
            _ => ApiError { status: StatusCode::INTERNAL_SERVER_ERROR, message: err.to_string() },
        }
    }
}

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub username: Option<String>,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
    pub model: String,
}

#[derive(Debug, Deserialize)]
pub struct TopPlayersQuery {
    /// "points" (default) or "value".
    #[serde(default)]
    pub metric: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct RecommendQuery {
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub max_cost: Option<u32>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct RulesQuery {
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct SquadRequest {
    pub player_ids: Vec<u32>,
}

/// A player row as the API reports it.
#[derive(Debug, Serialize)]
pub struct PlayerView {
    pub id: u32,
    pub name: String,
    pub team: String,
    pub position: String,
    pub cost: f64,
    pub total_points: i32,
    pub minutes: u32,
    pub form: String,
    pub value: f64,
    pub status: String,
}

impl From<&crate::types::Player> for PlayerView {
    fn from(p: &crate::types::Player) -> Self {
        PlayerView {
            id: p.id,
            name: p.name.clone(),
            team: p.team_name.clone(),
            position: p.position.abbreviation().to_string(),
            cost: p.cost_millions(),
            total_points: p.total_points,
            minutes: p.minutes,
            form: p.form.clone(),
            value: p.value,
            status: p.status.to_string(),
        }
    }
}

/// A fixture as the API reports it.
#[derive(Debug, Serialize)]
pub struct FixtureView {
    pub gameweek: Option<u32>,
    pub home_team: String,
    pub away_team: String,
    pub kickoff_time: String,
    pub score: String,
    pub finished: bool,
}

impl FixtureView {
    fn new(fixture: &Fixture, index: &FixtureIndex) -> Self {
        FixtureView {
            gameweek: fixture.event,
            home_team: index.team_name(fixture.team_h).to_string(),
            away_team: index.team_name(fixture.team_a).to_string(),
            kickoff_time: fixture.kickoff_string(),
            score: fixture.score_string(),
            finished: fixture.finished,
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn load_catalog(api: &FplApi) -> Result<PlayerCatalog, ApiError> {
    let bootstrap = api.bootstrap().await.map_err(ApiError::upstream)?;
    Ok(PlayerCatalog::build(&bootstrap))
}

async fn load_fixture_index(api: &FplApi) -> Result<FixtureIndex, ApiError> {
    let (bootstrap, fixtures) = futures::future::try_join(api.bootstrap(), api.fixtures())
        .await
        .map_err(ApiError::upstream)?;
    Ok(FixtureIndex::new(fixtures, &bootstrap.teams, &bootstrap.events))
}

fn parse_position(raw: &str) -> Result<Position, ApiError> {
    Position::parse(raw).ok_or_else(|| ApiError::bad_request(format!("Unknown position: {raw}")))
}

/// Derive a squad from the user's linked FPL entry when none is saved.
///
/// Fetches the entry's picks for the current gameweek. Any failure
/// along the way (no settings, no linked entry, picks unavailable)
/// leaves the chat turn squadless rather than failing it.
async fn linked_entry_squad(state: &ServerState, username: &str) -> Option<Squad> {
    let entry_id = state.store.load_settings(username).ok().flatten()?.fpl_entry_id?;

    let gameweek = match state.api.bootstrap().await {
        Ok(bootstrap) => fixtures::current_gameweek(&bootstrap.events),
        Err(e) => {
            warn!(entry_id, error = %e, "bootstrap unavailable, skipping entry squad");
            return None;
        }
    };

    match state.api.entry_picks(entry_id, gameweek).await {
        Ok(picks) => Some(picks.squad()),
        Err(e) => {
            warn!(entry_id, gameweek, error = %e, "picks unavailable, skipping entry squad");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// POST /api/chat
pub async fn post_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let (history, squad) = match req.username.as_deref() {
        Some(username) => (
            state.store.load_conversation(username).map_err(ApiError::internal)?,
            state.store.load_squad(username).map_err(ApiError::internal)?,
        ),
        None => (Vec::new(), None),
    };

    // No saved squad: fall back to the user's linked FPL entry.
    let squad = match (squad, req.username.as_deref()) {
        (None, Some(username)) => linked_entry_squad(&state, username).await,
        (squad, _) => squad,
    };

    let prior: Vec<ChatMessage> = history.iter().map(ChatMessage::from).collect();
    let reply = state
        .assistant
        .reply(&req.message, &prior, squad.as_ref())
        .await;

    if let Some(username) = req.username.as_deref() {
        let mut updated = history;
        updated.push(StoredMessage { role: Role::User, content: req.message.clone(), timestamp: None });
        updated.push(StoredMessage { role: Role::Assistant, content: reply.clone(), timestamp: None });
        state
            .store
            .save_conversation(username, &updated)
            .map_err(ApiError::internal)?;
    }

    info!(user = req.username.as_deref().unwrap_or("anonymous"), "chat turn served");
    Ok(Json(ChatResponse {
        reply,
        model: state.assistant.model_name().to_string(),
    }))
}

/// GET /api/players/top
pub async fn get_top_players(
    State(state): State<AppState>,
    Query(query): Query<TopPlayersQuery>,
) -> Result<Json<Vec<PlayerView>>, ApiError> {
    let catalog = load_catalog(&state.api).await?;
    let limit = query.limit.unwrap_or(10);

    let players = match query.metric.as_deref().unwrap_or("points") {
        "points" => catalog.top_by_points(limit),
        "value" => catalog.top_by_value(limit),
        other => return Err(ApiError::bad_request(format!("Unknown metric: {other}"))),
    };
    Ok(Json(players.into_iter().map(PlayerView::from).collect()))
}

/// GET /api/recommendations
pub async fn get_recommendations(
    State(state): State<AppState>,
    Query(query): Query<RecommendQuery>,
) -> Result<Json<Vec<PlayerView>>, ApiError> {
    let catalog = load_catalog(&state.api).await?;
    let position = query.position.as_deref().map(parse_position).transpose()?;
    let limit = query.limit.unwrap_or(5);

    let players = recommend::recommend(&catalog, position, query.max_cost, limit);
    Ok(Json(players.into_iter().map(PlayerView::from).collect()))
}

/// POST /api/squad/analyze
pub async fn post_analyze_squad(
    State(state): State<AppState>,
    Json(req): Json<SquadRequest>,
) -> Result<Json<crate::types::SquadAnalysis>, ApiError> {
    let catalog = load_catalog(&state.api).await?;
    Ok(Json(recommend::analyze_squad(&req.player_ids, &catalog)))
}

/// GET /api/fixtures/gameweek/:gw
pub async fn get_gameweek_fixtures(
    State(state): State<AppState>,
    Path(gw): Path<u32>,
) -> Result<Json<Vec<FixtureView>>, ApiError> {
    let index = load_fixture_index(&state.api).await?;
    let views = index
        .for_gameweek(gw)
        .into_iter()
        .map(|f| FixtureView::new(f, &index))
        .collect();
    Ok(Json(views))
}

/// GET /api/fixtures/team/:name
pub async fn get_team_fixtures(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<FixtureView>>, ApiError> {
    let index = load_fixture_index(&state.api).await?;
    if index.team_id(&name).is_none() {
        return Err(ApiError::not_found(format!("Unknown team: {name}")));
    }
    let views = index
        .for_team(&name, 5)
        .into_iter()
        .map(|f| FixtureView::new(f, &index))
        .collect();
    Ok(Json(views))
}

/// GET /api/fixtures/doubles
pub async fn get_double_gameweeks(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let index = load_fixture_index(&state.api).await?;
    let doubles = index.double_gameweeks();
    Ok(Json(serde_json::to_value(doubles).map_err(|e| ApiError::internal(e.into()))?))
}

/// GET /api/rules/search?q=...
pub async fn get_rules_search(
    State(state): State<AppState>,
    Query(query): Query<RulesQuery>,
) -> Json<serde_json::Value> {
    let results = state.rules.search(&query.q);
    Json(serde_json::json!({ "query": query.q, "results": results }))
}

/// GET /api/settings/:username
pub async fn get_settings(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<UserSettings>, ApiError> {
    state
        .store
        .load_settings(&username)
        .map_err(ApiError::internal)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("No settings for user: {username}")))
}

/// PUT /api/settings/:username
pub async fn put_settings(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(mut settings): Json<UserSettings>,
) -> Result<StatusCode, ApiError> {
    // The path is authoritative for which user we write.
    settings.username = username;
    state.store.save_settings(&settings).map_err(ApiError::internal)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/squad/:username
pub async fn post_squad(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(req): Json<SquadRequest>,
) -> Result<StatusCode, ApiError> {
    let catalog = load_catalog(&state.api).await?;
    let squad = Squad { player_ids: req.player_ids };
    squad.validate(|id| catalog.position_of(id))?;

    state.store.save_squad(&username, &squad).map_err(ApiError::internal)?;
    Ok(StatusCode::CREATED)
}

/// GET /health
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
