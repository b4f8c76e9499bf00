//! Web server: Axum REST API plus a self-contained chat page.
//!
//! CORS enabled for local development. The HTML front end is compiled
//! into the binary.

pub mod routes;

use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderValue, Method},
    response::Html,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tracing::info;

pub use routes::{AppState, ServerState};

/// The embedded chat page (compiled into the binary).
const INDEX_HTML: &str = include_str!("templates/index.html");

/// Run the web server until shutdown.
pub async fn serve(state: AppState, port: u16) -> Result<()> {
    let app = build_router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    info!(port, "Server starting on http://localhost:{port}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind port {port}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin("*".parse::<HeaderValue>().unwrap())
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        // API routes
        .route("/api/chat", post(routes::post_chat))
        .route("/api/players/top", get(routes::get_top_players))
        .route("/api/recommendations", get(routes::get_recommendations))
        .route("/api/squad/analyze", post(routes::post_analyze_squad))
        .route("/api/squad/:username", post(routes::post_squad))
        .route("/api/fixtures/gameweek/:gw", get(routes::get_gameweek_fixtures))
        .route("/api/fixtures/team/:name", get(routes::get_team_fixtures))
        .route("/api/fixtures/doubles", get(routes::get_double_gameweeks))
        .route("/api/rules/search", get(routes::get_rules_search))
        .route(
            "/api/settings/:username",
            get(routes::get_settings).put(routes::put_settings),
        )
        .route("/health", get(routes::health))
        // Chat page
        .route("/", get(serve_index))
        .layer(cors)
        .with_state(state)
}

/// Serve the embedded chat page.
async fn serve_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
