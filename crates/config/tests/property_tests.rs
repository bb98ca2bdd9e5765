//! Property-based tests for the configuration system

use audioshelf_config::{Config, ConfigManager, LogLevel};
use proptest::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

fn log_level() -> impl Strategy<Value = LogLevel> {
    prop_oneof![
        Just(LogLevel::Error),
        Just(LogLevel::Warn),
        Just(LogLevel::Info),
        Just(LogLevel::Debug),
        Just(LogLevel::Trace),
    ]
}

prop_compose! {
    fn any_config()(
        level in log_level(),
        file in "[a-z]{1,12}\\.json",
        backup in any::<bool>(),
        rewind in 0u64..120_000,
        threshold in 0u64..120_000,
        advance in any::<bool>(),
    ) -> Config {
        let mut config = Config::default();
        config.app.log_level = level;
        config.app.shelf_file = PathBuf::from(file);
        config.app.backup_on_save = backup;
        config.playback.rewind_on_resume_ms = rewind;
        config.playback.completion_threshold_ms = threshold;
        config.playback.auto_advance = advance;
        config
    }
}

proptest! {
    #[test]
    fn property_serialization_roundtrip(config in any_config()) {
        let toml_string = toml::to_string(&config).unwrap();
        let deserialized: Config = toml::from_str(&toml_string).unwrap();
        prop_assert_eq!(config, deserialized);
    }

    #[test]
    fn property_validity_matches_windows(config in any_config()) {
        let expected = config.playback.rewind_on_resume_ms <= 60_000
            && config.playback.completion_threshold_ms <= 60_000;
        prop_assert_eq!(config.validate().is_ok(), expected);
    }

    #[test]
    fn property_merge_takes_other(base in any_config(), other in any_config()) {
        let mut merged = base;
        merged.merge(other.clone());
        prop_assert_eq!(merged, other);
    }

    #[test]
    fn property_resume_never_past_saved(saved in any::<u64>(), config in any_config()) {
        prop_assert!(config.playback.resume_position_ms(saved) <= saved);
    }

    #[test]
    fn property_log_level_display_parses_back(level in log_level()) {
        prop_assert_eq!(level.to_string().parse::<LogLevel>().unwrap(), level);
    }
}

#[test]
fn property_load_save_idempotent() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let manager = ConfigManager::with_directory(temp_dir.path().to_path_buf())?;

    manager.save(&Config::default())?;
    let loaded = manager.load()?;
    manager.save(&loaded)?;
    let loaded2 = manager.load()?;
    assert_eq!(loaded, loaded2);
    Ok(())
}
