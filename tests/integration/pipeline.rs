//! End-to-end pipeline over a canned bootstrap payload: deserialize,
//! build the catalog and fixture index, recommend, analyze.

use fpl_assistant::api::Bootstrap;
use fpl_assistant::catalog::PlayerCatalog;
use fpl_assistant::fixtures::FixtureIndex;
use fpl_assistant::recommend;
use fpl_assistant::types::{Fixture, Position, Squad};

fn canned_bootstrap() -> Bootstrap {
    serde_json::from_str(
        r#"{
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
            {"id": 2, "singular_name": "Defender"},
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
            {"id": 4, "web_name": "Benched", "first_name": "Never", "second_name": "Plays",
             "team": 2, "element_type": 4, "now_cost": 45, "total_points": 0,
             "minutes": 0, "form": "0.0", "status": "a"},
            {"id": 5, "web_name": "Havertz", "first_name": "Kai", "second_name": "Havertz",
             "team": 1, "element_type": 4, "now_cost": 80, "total_points": 90,
             "minutes": 800, "form": "5.5", "status": "d"}
        ]
    }"#,
    )
    .unwrap()
}

fn canned_fixtures() -> Vec<Fixture> {
    serde_json::from_str(
        r#"[
        {"event": 10, "team_h": 1, "team_a": 2, "finished": false,
         "team_h_score": null, "team_a_score": null,
         "team_h_difficulty": 4, "team_a_difficulty": 3,
         "kickoff_time": "2026-09-05T14:00:00Z"},
        {"event": 11, "team_h": 2, "team_a": 1, "finished": false,
         "team_h_score": null, "team_a_score": null,
         "team_h_difficulty": 3, "team_a_difficulty": 4,
         "kickoff_time": null}
    ]"#,
    )
    .unwrap()
}

#[test]
fn test_catalog_from_bootstrap() {
    let catalog = PlayerCatalog::build(&canned_bootstrap());

    // The zero-minutes player is filtered out.
    assert_eq!(catalog.len(), 4);
    assert!(catalog.get(4).is_none());

    let saka = catalog.get(2).unwrap();
    assert_eq!(saka.team_name, "Arsenal");
    assert_eq!(saka.position, Position::Midfielder);
    assert!((saka.value - 1.2).abs() < 1e-9);
}

#[test]
fn test_recommendations_over_catalog() {
    let catalog = PlayerCatalog::build(&canned_bootstrap());

    let mids = recommend::recommend(&catalog, Some(Position::Midfielder), None, 10);
    assert_eq!(mids.len(), 2);
    // Saka (120/100 = 1.2) ranks above Salah (150/130 ≈ 1.15).
    assert_eq!(mids[0].id, 2);
    assert_eq!(mids[1].id, 3);

    let cheap = recommend::recommend(&catalog, None, Some(80), 10);
    assert!(cheap.iter().all(|p| p.now_cost <= 80));
}

#[test]
fn test_squad_analysis_over_catalog() {
    let catalog = PlayerCatalog::build(&canned_bootstrap());
    let analysis = recommend::analyze_squad(&[1, 2, 3], &catalog);

    // 50 + 100 + 130 tenths = £28.0m
    assert!((analysis.metrics.total_value - 28.0).abs() < 1e-9);
    assert_eq!(analysis.metrics.total_points, 330);
}

#[test]
fn test_squad_validation_against_catalog() {
    let catalog = PlayerCatalog::build(&canned_bootstrap());
    let squad = Squad { player_ids: vec![1, 2, 3] };

    // Three players is not a legal 15-man squad.
    assert!(squad.validate(|id| catalog.position_of(id)).is_err());
}

#[test]
fn test_fixture_index_from_payloads() {
    let bootstrap = canned_bootstrap();
    let index = FixtureIndex::new(canned_fixtures(), &bootstrap.teams, &bootstrap.events);

    assert_eq!(index.current_gameweek(), 10);
    assert_eq!(index.for_gameweek(10).len(), 1);

    let arsenal = index.for_team("arsenal", 5);
    assert_eq!(arsenal.len(), 2);

    let summary = index.summary();
    assert!(summary.contains("Current Gameweek (10) Fixtures:"));
    assert!(summary.contains("Arsenal vs Liverpool (05 Sep 2026 - 14:00)"));
    assert!(summary.contains("Liverpool vs Arsenal (TBD)"));
}
