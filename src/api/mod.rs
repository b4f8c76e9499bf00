//! FPL API client.
//!
//! Read-only access to the public Fantasy Premier League API:
//! bootstrap (players, teams, positions, gameweeks), fixtures, and a
//! manager's picks. Responses pass through an injected time-boxed
//! cache keyed by endpoint URL. Each network call is attempted once
//! with a bounded timeout; there are no retries.
//!
//! API: `https://fantasy.premierleague.com/api/`
//! Auth: Not required for reading.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::types::{Fixture, GameweekEvent, Squad, Team};

const USER_AGENT: &str = "fpl-assistant/0.1.0";

/// Per-request timeout for the FPL API.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// Response cache
// ---------------------------------------------------------------------------

struct CacheEntry {
    fetched_at: Instant,
    body: serde_json::Value,
}

/// Time-boxed read-through cache keyed by endpoint URL.
///
/// Expired entries are refreshed by whichever request hits them first;
/// concurrent refreshes are last-writer-wins, which is safe because
/// the fetches are idempotent reads.
pub struct ResponseCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        ResponseCache { ttl, entries: Mutex::new(HashMap::new()) }
    }

    /// Fresh cached body for `url`, or `None` when absent or expired.
    pub async fn get(&self, url: &str) -> Option<serde_json::Value> {
        let entries = self.entries.lock().await;
        let entry = entries.get(url)?;
        if entry.fetched_at.elapsed() < self.ttl {
            Some(entry.body.clone())
        } else {
            None
        }
    }

    pub async fn put(&self, url: &str, body: serde_json::Value) {
        let mut entries = self.entries.lock().await;
        entries.insert(url.to_string(), CacheEntry { fetched_at: Instant::now(), body });
    }

    /// Drop all cached entries.
    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }
}

// ---------------------------------------------------------------------------
// Wire types (FPL JSON → Rust)
// ---------------------------------------------------------------------------

/// The `bootstrap-static/` payload: season reference data.
#[derive(Debug, Clone, Deserialize)]
pub struct Bootstrap {
    pub events: Vec<GameweekEvent>,
    pub teams: Vec<Team>,
    pub elements: Vec<PlayerElement>,
    pub element_types: Vec<ElementKind>,
}

/// A raw player row from the bootstrap `elements` list.
#[derive(Debug, Clone, Deserialize)]
pub struct PlayerElement {
    pub id: u32,
    pub web_name: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub second_name: String,
    /// Team id, resolved against `Bootstrap::teams`.
    pub team: u32,
    /// Position id (1–4), resolved against `Bootstrap::element_types`.
    pub element_type: u8,
    pub now_cost: u32,
    pub total_points: i32,
    pub minutes: u32,
    #[serde(default)]
    pub form: String,
    #[serde(default)]
    pub status: String,
}

/// A position kind from the bootstrap `element_types` list.
#[derive(Debug, Clone, Deserialize)]
pub struct ElementKind {
    pub id: u8,
    pub singular_name: String,
}

/// The `entry/{id}/event/{gw}/picks/` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct PicksResponse {
    pub picks: Vec<Pick>,
}

impl PicksResponse {
    /// The selected squad, in slot order (starters first, then bench).
    pub fn squad(&self) -> Squad {
        let mut picks: Vec<&Pick> = self.picks.iter().collect();
        picks.sort_by_key(|p| p.position);
        Squad { player_ids: picks.into_iter().map(|p| p.element).collect() }
    }
}

/// One squad slot from a picks payload.
#[derive(Debug, Clone, Deserialize)]
pub struct Pick {
    /// Player id.
    pub element: u32,
    /// Slot 1–11 are starters, 12–15 the bench.
    pub position: u32,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// FPL API client with a shared response cache.
#[derive(Clone)]
pub struct FplApi {
    http: Client,
    base_url: String,
    cache: Arc<ResponseCache>,
}

impl FplApi {
    /// Create a client against the given base URL (trailing slash
    /// expected) with an injected cache.
    pub fn new(base_url: impl Into<String>, cache: Arc<ResponseCache>) -> Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build FPL HTTP client")?;

        Ok(FplApi { http, base_url: base_url.into(), cache })
    }

    /// Fetch `endpoint` as JSON, read-through the cache.
    async fn get_json(&self, endpoint: &str) -> Result<serde_json::Value> {
        let url = format!("{}{endpoint}", self.base_url);

        if let Some(cached) = self.cache.get(&url).await {
            debug!(url = %url, "FPL cache hit");
            return Ok(cached);
        }

        debug!(url = %url, "Fetching from FPL API");
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("FPL API request failed: {endpoint}"))?;

        if !resp.status().is_success() {
            let status = resp.status();
            warn!(endpoint, status = %status, "FPL API returned error status");
            anyhow::bail!("FPL API error {status} for {endpoint}");
        }

        let body: serde_json::Value = resp
            .json()
            .await
            .with_context(|| format!("Failed to parse FPL response from {endpoint}"))?;

        self.cache.put(&url, body.clone()).await;
        Ok(body)
    }

    /// Fetch the season bootstrap: players, teams, positions, gameweeks.
    pub async fn bootstrap(&self) -> Result<Bootstrap> {
        let body = self.get_json("bootstrap-static/").await?;
        serde_json::from_value(body).context("Unexpected bootstrap payload shape")
    }

    /// Fetch the full season fixture list.
    pub async fn fixtures(&self) -> Result<Vec<Fixture>> {
        let body = self.get_json("fixtures/").await?;
        serde_json::from_value(body).context("Unexpected fixtures payload shape")
    }

    /// Fetch a manager's picks for a gameweek.
    pub async fn entry_picks(&self, entry_id: u64, gameweek: u32) -> Result<PicksResponse> {
        let body = self
            .get_json(&format!("entry/{entry_id}/event/{gameweek}/picks/"))
            .await?;
        serde_json::from_value(body).context("Unexpected picks payload shape")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
