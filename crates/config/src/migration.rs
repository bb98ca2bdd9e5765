//! Configuration migration
//!
//! Old files are upgraded as raw TOML before they are deserialized, so keys
//! that no longer exist in [`Config`] can still be read and carried over.
//! When [`CONFIG_VERSION`] is incremented, add a [`Migration`] here.

use crate::{ConfigError, ConfigResult, CONFIG_VERSION};
use toml::Value;

/// A single upgrade step
pub trait Migration {
    /// The version this migration upgrades TO
    fn target_version(&self) -> u32;

    /// Rewrites the raw document in place
    fn migrate(&self, value: &mut Value) -> ConfigResult<()>;
}

/// Reads the `version` key, treating a file without one as current
pub fn document_version(value: &Value) -> u32 {
    value
        .get("version")
        .and_then(Value::as_integer)
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(CONFIG_VERSION)
}

/// Upgrades a raw config document to the current version
pub fn migrate_to_latest(mut value: Value) -> ConfigResult<Value> {
    let version = document_version(&value);

    if version == CONFIG_VERSION {
        return Ok(value);
    }

    if version > CONFIG_VERSION {
        log::warn!(
            "Config version {} is newer than supported version {}. Attempting to use as-is.",
            version,
            CONFIG_VERSION
        );
        return Ok(value);
    }

    log::info!(
        "Migrating config from version {} to {}",
        version,
        CONFIG_VERSION
    );

    for next_version in version + 1..=CONFIG_VERSION {
        match get_migration(next_version) {
            Some(migration) => {
                migration.migrate(&mut value)?;
                log::info!("Applied migration to version {}", migration.target_version());
            }
            None => log::warn!(
                "No migration defined for version {}, skipping",
                next_version
            ),
        }
    }

    let table = value.as_table_mut().ok_or_else(|| {
        ConfigError::ValidationError("config document is not a table".to_string())
    })?;
    table.insert("version".to_string(), Value::Integer(i64::from(CONFIG_VERSION)));

    Ok(value)
}

fn get_migration(version: u32) -> Option<Box<dyn Migration>> {
    match version {
        1 => Some(Box::new(RewindInMillis)),
        _ => None,
    }
}

/// Version 0 stored the resume rewind in whole seconds as
/// `playback.rewind_on_resume_secs`.
struct RewindInMillis;

impl Migration for RewindInMillis {
    fn target_version(&self) -> u32 {
        1
    }

    fn migrate(&self, value: &mut Value) -> ConfigResult<()> {
        let Some(playback) = value.get_mut("playback").and_then(Value::as_table_mut) else {
            return Ok(());
        };

        if let Some(old) = playback.remove("rewind_on_resume_secs") {
            let secs = old.as_integer().ok_or_else(|| {
                ConfigError::ValidationError(
                    "playback.rewind_on_resume_secs must be an integer".to_string(),
                )
            })?;
            playback.insert(
                "rewind_on_resume_ms".to_string(),
                Value::Integer(secs.saturating_mul(1000)),
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Config;

    fn parse(s: &str) -> Value {
        toml::from_str(s).expect("valid toml")
    }

    #[test]
    fn test_migrate_same_version() {
        let value = parse("version = 1\n[app]\nlog_level = \"info\"\n");
        let migrated = migrate_to_latest(value.clone()).expect("Should migrate");
        assert_eq!(migrated, value);
    }

    #[test]
    fn test_migrate_newer_version_left_alone() {
        let value = parse(&format!("version = {}\n", CONFIG_VERSION + 1));
        let migrated = migrate_to_latest(value).expect("Should handle newer version");
        assert_eq!(document_version(&migrated), CONFIG_VERSION + 1);
    }

    #[test]
    fn test_missing_version_is_current() {
        assert_eq!(document_version(&parse("[app]\n")), CONFIG_VERSION);
    }

    #[test]
    fn test_rewind_seconds_become_millis() {
        let value = parse("version = 0\n[playback]\nrewind_on_resume_secs = 5\n");
        let migrated = migrate_to_latest(value).expect("Should migrate");

        assert_eq!(document_version(&migrated), CONFIG_VERSION);
        let config: Config = migrated.try_into().expect("Should deserialize");
        assert_eq!(config.playback.rewind_on_resume_ms, 5_000);
    }

    #[test]
    fn test_bad_legacy_value_is_rejected() {
        let value = parse("version = 0\n[playback]\nrewind_on_resume_secs = \"five\"\n");
        assert!(matches!(
            migrate_to_latest(value),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_get_migration() {
        assert_eq!(get_migration(1).map(|m| m.target_version()), Some(1));
        assert!(get_migration(999).is_none());
    }
}
