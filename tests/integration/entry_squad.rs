//! Linked-entry squad fallback: a chat turn for a user with no saved
//! squad but a linked FPL entry id derives the squad from the entry's
//! picks for the current gameweek. The FPL API is a canned local stub.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use tower::ServiceExt;

use fpl_assistant::api::{FplApi, ResponseCache};
use fpl_assistant::chat::Assistant;
use fpl_assistant::rules::RulesIndex;
use fpl_assistant::server::{build_router, ServerState};
use fpl_assistant::storage::UserStore;
use fpl_assistant::types::UserSettings;

use crate::mock_model::MockModel;

const BOOTSTRAP: &str = r#"{
    "events": [
        {"id": 10, "is_current": true, "is_next": false, "finished": false},
        {"id": 11, "is_current": false, "is_next": true, "finished": false}
    ],
    "teams": [
        {"id": 1, "name": "Arsenal"},
        {"id": 2, "name": "Liverpool"}
    ],
    "element_types": [
        {"id": 1, "singular_name": "Goalkeeper"},
        {"id": 3, "singular_name": "Midfielder"},
        {"id": 4, "singular_name": "Forward"}
    ],
    "elements": [
        {"id": 1, "web_name": "Raya", "first_name": "David", "second_name": "Raya",
         "team": 1, "element_type": 1, "now_cost": 50, "total_points": 60,
         "minutes": 900, "form": "4.0", "status": "a"},
        {"id": 2, "web_name": "Saka", "first_name": "Bukayo", "second_name": "Saka",
         "team": 1, "element_type": 3, "now_cost": 100, "total_points": 120,
         "minutes": 950, "form": "7.5", "status": "a"},
        {"id": 3, "web_name": "Salah", "first_name": "Mohamed", "second_name": "Salah",
         "team": 2, "element_type": 3, "now_cost": 130, "total_points": 150,
         "minutes": 980, "form": "8.1", "status": "a"},
        {"id": 5, "web_name": "Havertz", "first_name": "Kai", "second_name": "Havertz",
         "team": 1, "element_type": 4, "now_cost": 80, "total_points": 90,
         "minutes": 800, "form": "5.5", "status": "d"}
    ]
}"#;

const FIXTURES: &str = r#"[
    {"event": 10, "team_h": 1, "team_a": 2, "finished": false,
     "team_h_score": null, "team_a_score": null,
     "team_h_difficulty": 4, "team_a_difficulty": 3,
     "kickoff_time": "2026-09-05T14:00:00Z"}
]"#;

const PICKS: &str = r#"{"picks": [
    {"element": 1, "position": 1, "is_captain": false, "is_vice_captain": false},
    {"element": 2, "position": 2, "is_captain": true, "is_vice_captain": false},
    {"element": 3, "position": 3, "is_captain": false, "is_vice_captain": true},
    {"element": 5, "position": 4, "is_captain": false, "is_vice_captain": false}
]}"#;

fn canned(body: &str) -> Json<serde_json::Value> {
    Json(serde_json::from_str(body).unwrap())
}

/// Serve canned FPL payloads on a local port, returning the base URL.
async fn spawn_fpl_stub(with_picks: bool) -> String {
    let mut app = Router::new()
        .route("/api/bootstrap-static/", get(|| async { canned(BOOTSTRAP) }))
        .route("/api/fixtures/", get(|| async { canned(FIXTURES) }));
    if with_picks {
        app = app.route(
            "/api/entry/:id/event/:gw/picks/",
            get(|| async { canned(PICKS) }),
        );
    }

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/api/")
}

fn test_state(base_url: String, model: MockModel) -> Arc<ServerState> {
    let cache = Arc::new(ResponseCache::new(Duration::from_secs(60)));
    let api = FplApi::new(base_url, cache).unwrap();

    let mut dir = std::env::temp_dir();
    dir.push(format!("fpl_assistant_entry_test_{}", uuid::Uuid::new_v4()));
    let store = UserStore::new(dir);

    let mut settings = UserSettings::new("bob");
    settings.fpl_entry_id = Some(777);
    store.save_settings(&settings).unwrap();

    Arc::new(ServerState {
        api: api.clone(),
        assistant: Assistant::new(api, Arc::new(model), RulesIndex::new()),
        rules: RulesIndex::new(),
        store,
    })
}

fn chat_request() -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"username":"bob","message":"how is my team doing?"}"#))
        .unwrap()
}

#[tokio::test]
async fn test_chat_derives_squad_from_linked_entry() {
    let base = spawn_fpl_stub(true).await;
    let model = MockModel::new("Looking strong.");
    let calls = model.call_log();
    let app = build_router(test_state(base, model));

    let resp = app.oneshot(chat_request()).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let calls = calls.lock().unwrap();
    let prompt = &calls[0].messages.last().unwrap().content;
    assert!(prompt.contains("User's Team Analysis:"));
    // Picks 1, 2, 3, 5: costs 50+100+130+80, points 60+120+150+90.
    assert!(prompt.contains("Team Value: £36.0m"));
    assert!(prompt.contains("Total Points: 420"));
}

#[tokio::test]
async fn test_chat_survives_missing_picks() {
    // Entry id is linked but the picks resource 404s: the turn goes
    // ahead without a squad section.
    let base = spawn_fpl_stub(false).await;
    let model = MockModel::new("No squad in sight.");
    let calls = model.call_log();
    let app = build_router(test_state(base, model));

    let resp = app.oneshot(chat_request()).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let calls = calls.lock().unwrap();
    let prompt = &calls[0].messages.last().unwrap().content;
    assert!(prompt.contains("Top Point Scorers:"));
    assert!(!prompt.contains("User's Team Analysis:"));
}
