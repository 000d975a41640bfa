use std::fs;
use std::path::PathBuf;

use hoop_edge::game_log::GameLog;
use hoop_edge::gamelog_fetch::{find_player, parse_game_log_json, parse_player_index_json};
use hoop_edge::league_fetch::{
    opponent_for, parse_league_defense_json, parse_scoreboard_json,
};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_game_log_fixture() {
    let raw = read_fixture("player_game_log.json");
    let rows = parse_game_log_json(&raw).expect("fixture should parse");
    assert_eq!(rows.len(), 6);

    // provider headers keep mixed casing; normalization happens downstream
    let log = GameLog::from_raw_rows(&rows).expect("rows should normalize");
    assert_eq!(log.len(), 6);
    let pts: Vec<f64> = log.records().iter().map(|r| r.points).collect();
    assert_eq!(pts, vec![10.0, 12.0, 14.0, 16.0, 18.0, 20.0]);
    assert!(log.records().windows(2).all(|w| w[0].date < w[1].date));
}

#[test]
fn parses_player_index_fixture() {
    let raw = read_fixture("player_index.json");
    let listings = parse_player_index_json(&raw).expect("fixture should parse");
    assert_eq!(listings.len(), 3);

    let hit = find_player(&listings, "lebron james").expect("player should resolve");
    assert_eq!(hit.id, 2544);
    assert_eq!(hit.team_id, 1610612747);

    // unique substring also resolves
    assert_eq!(find_player(&listings, "quickley").map(|p| p.id), Some(1630224));
    assert!(find_player(&listings, "nobody").is_none());
}

#[test]
fn parses_league_defense_fixture() {
    let raw = read_fixture("league_defense.json");
    let rows = parse_league_defense_json(&raw).expect("fixture should parse");
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[0].team, "Oklahoma City Thunder");
    assert_eq!(rows[0].points_allowed, 1892.0);
    // tie rows both survive parsing in input order
    assert_eq!(rows[3].points_allowed, rows[4].points_allowed);
    assert_eq!(rows[3].team_id, 1610612764);
}

#[test]
fn parses_scoreboard_fixture_and_resolves_opponents() {
    let raw = read_fixture("scoreboard.json");
    let games = parse_scoreboard_json(&raw).expect("fixture should parse");
    assert_eq!(games.len(), 2);

    assert_eq!(opponent_for(&games, 1610612747), Some(1610612738));
    assert_eq!(opponent_for(&games, 1610612738), Some(1610612747));
    assert_eq!(opponent_for(&games, 1610612737), None);
}

#[test]
fn empty_result_sets_parse_to_empty_collections() {
    let raw = r#"{"resource":"x","resultSets":[]}"#;
    assert!(parse_game_log_json(raw).expect("parse").is_empty());
    assert!(parse_player_index_json(raw).expect("parse").is_empty());
    assert!(parse_league_defense_json(raw).expect("parse").is_empty());
    assert!(parse_scoreboard_json(raw).expect("parse").is_empty());
}

#[test]
fn garbage_body_is_an_error_not_a_panic() {
    assert!(parse_game_log_json("<html>rate limited</html>").is_err());
    assert!(parse_scoreboard_json("").is_err());
}
