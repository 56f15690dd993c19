//! Settings file loading and validation

use std::fs;
use std::path::PathBuf;

use train_matcher::config::{ColorTriplet, ConfigError, GameConfig, DEFAULT_TITLE};
use train_matcher::core::MatchGameSession;
use train_matcher::types::{GameMode, ModifierKind, TrainColor};

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("train-matcher-{}-{}", std::process::id(), name))
}

#[test]
fn test_load_full_settings_file() {
    let path = temp_path("full.json");
    fs::write(
        &path,
        r#"{
            "window": { "title": "Night Shift" },
            "colors": { "red": [200, 10, 10] },
            "rules": { "forgiveness_interval": 3 },
            "seed": 77,
            "levels": [
                { "name": "Yard", "colors": ["red", "blue"], "max_trains": 4, "mistakes_allowed": 2 },
                { "name": "Main Line", "colors": ["green", "cyan"], "modifiers": ["dense_fog"] }
            ]
        }"#,
    )
    .unwrap();

    let config = GameConfig::load(&path).unwrap();
    fs::remove_file(&path).ok();

    assert_eq!(config.window.title, "Night Shift");
    assert_eq!(config.palette.train(TrainColor::Red), ColorTriplet(200, 10, 10));
    assert_eq!(config.tuning.forgiveness_interval, 3);
    assert_eq!(config.seed, Some(77));
    assert_eq!(config.levels.len(), 2);

    let main_line = config.levels.get(1).unwrap();
    assert_eq!(main_line.max_trains, config.settings.initial_max_trains);
    assert!(main_line.modifiers.contains(ModifierKind::DenseFog));

    let mut session = MatchGameSession::new(config.session_config(1));
    session.start_session(GameMode::Campaign);
    assert_eq!(session.track().len(), 4);
    assert_eq!(session.max_mistakes(), Some(2));
    assert!(session
        .track()
        .iter()
        .all(|t| matches!(t.color, TrainColor::Red | TrainColor::Blue)));
}

#[test]
fn test_missing_file_yields_defaults() {
    let path = temp_path("does-not-exist.json");
    assert!(matches!(GameConfig::load(&path), Err(ConfigError::Io { .. })));
    assert_eq!(GameConfig::load_or_default(&path), GameConfig::default());
}

#[test]
fn test_malformed_file_yields_defaults() {
    let path = temp_path("broken.json");
    fs::write(&path, "{ not json").unwrap();
    let loaded = GameConfig::load(&path);
    let fallback = GameConfig::load_or_default(&path);
    fs::remove_file(&path).ok();

    assert!(matches!(loaded, Err(ConfigError::Parse { .. })));
    assert_eq!(fallback.window.title, DEFAULT_TITLE);
    assert_eq!(fallback.levels.len(), 6);
}

#[test]
fn test_invalid_fields_are_replaced_individually() {
    let config = GameConfig::from_json_str(
        r#"{
            "window": { "title": 12 },
            "colors": { "blue": "navy", "green": [1, 2, 3] },
            "rules": { "forgiveness_interval": -2 },
            "levels": [ { "name": "Ghost", "colors": ["magenta"] } ]
        }"#,
    )
    .unwrap();
    let defaults = GameConfig::default();

    assert_eq!(config.window.title, DEFAULT_TITLE);
    assert_eq!(config.palette.blue, defaults.palette.blue);
    assert_eq!(config.palette.green, ColorTriplet(1, 2, 3));
    assert_eq!(config.tuning, defaults.tuning);
    assert_eq!(config.levels, defaults.levels);
}

#[test]
fn test_config_seed_wins_over_fallback() {
    let config = GameConfig::from_json_str(r#"{ "seed": 5 }"#).unwrap();
    assert_eq!(config.session_config(999).seed, 5);
    assert_eq!(GameConfig::default().session_config(999).seed, 999);
}
