// Checks on the files the crate ships alongside its code.

use std::path::Path;

/// Verify that defaults/league.toml is valid TOML with a team list.
#[test]
fn default_league_toml_is_valid() {
    let content =
        std::fs::read_to_string("defaults/league.toml").expect("defaults/league.toml should exist");
    let parsed: toml::Value = toml::from_str(&content).expect("defaults/league.toml is not valid TOML");
    let teams = parsed["league"]["teams"]
        .as_array()
        .expect("league.teams should be an array");
    assert!(!teams.is_empty());
}

/// Verify that defaults/strategy.toml is valid TOML with every section present.
#[test]
fn default_strategy_toml_is_valid() {
    let content = std::fs::read_to_string("defaults/strategy.toml")
        .expect("defaults/strategy.toml should exist");
    let parsed: toml::Value =
        toml::from_str(&content).expect("defaults/strategy.toml is not valid TOML");
    for section in ["recommend", "scoring", "api", "storage"] {
        assert!(parsed.get(section).is_some(), "missing [{section}] section");
    }
}

/// Verify that the player fixture is a JSON array.
#[test]
fn player_fixture_is_json_array() {
    let content = std::fs::read_to_string("tests/fixtures/players.json")
        .expect("tests/fixtures/players.json should exist");
    let parsed: serde_json::Value = serde_json::from_str(&content).expect("fixture is not valid JSON");
    assert!(parsed.is_array());
}

/// Verify that all expected directories exist.
#[test]
fn directory_structure_exists() {
    for dir in [
        "src",
        "src/catalog",
        "src/draft",
        "src/valuation",
        "src/persistence",
        "defaults",
        "tests/fixtures",
    ] {
        assert!(Path::new(dir).is_dir(), "Directory '{dir}' should exist");
    }
}
