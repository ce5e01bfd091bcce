//! Process configuration, loaded from environment variables.

use std::path::PathBuf;

use bluefeed_core::snowflake::MAX_NODE_ID;

use crate::error::EngineError;

pub const DATABASE_PATH_VAR: &str = "BLUEFEED_DATABASE_PATH";
pub const BLOB_DIR_VAR: &str = "BLUEFEED_BLOB_DIR";
pub const NODE_ID_VAR: &str = "BLUEFEED_NODE_ID";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// SQLite database file holding the four collections.
    pub database_path: String,
    /// Root directory of the content-addressed blob store.
    pub blob_dir: PathBuf,
    /// Snowflake node id for video ids, `0..=1023`.
    pub node_id: u16,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            database_path: "bluefeed.db".to_string(),
            blob_dir: PathBuf::from("blobs"),
            node_id: 1,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self, EngineError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup; unset keys use defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, EngineError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let node_id = match lookup(NODE_ID_VAR) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .ok()
                .filter(|id| *id <= MAX_NODE_ID)
                .ok_or_else(|| {
                    EngineError::Config(format!(
                        "{NODE_ID_VAR} must be an integer in 0..={MAX_NODE_ID}, got {raw:?}"
                    ))
                })?,
            None => defaults.node_id,
        };

        let database_path = lookup(DATABASE_PATH_VAR).unwrap_or(defaults.database_path);
        if database_path.is_empty() {
            return Err(EngineError::Config(format!("{DATABASE_PATH_VAR} is empty")));
        }

        Ok(Self {
            database_path,
            blob_dir: lookup(BLOB_DIR_VAR)
                .map(PathBuf::from)
                .unwrap_or(defaults.blob_dir),
            node_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_values() {
        let config = EngineConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.database_path, "bluefeed.db");
        assert_eq!(config.node_id, 1);
    }

    #[test]
    fn test_overrides() {
        let config = EngineConfig::from_lookup(lookup(&[
            (DATABASE_PATH_VAR, "/var/lib/bluefeed/main.db"),
            (BLOB_DIR_VAR, "/var/lib/bluefeed/blobs"),
            (NODE_ID_VAR, " 7 "),
        ]))
        .unwrap();
        assert_eq!(config.database_path, "/var/lib/bluefeed/main.db");
        assert_eq!(config.blob_dir, PathBuf::from("/var/lib/bluefeed/blobs"));
        assert_eq!(config.node_id, 7);
    }

    #[test]
    fn test_invalid_node_id() {
        for bad in ["1024", "-1", "one"] {
            let err = EngineConfig::from_lookup(lookup(&[(NODE_ID_VAR, bad)])).unwrap_err();
            assert!(matches!(err, EngineError::Config(_)), "{bad}: {err:?}");
        }
    }

    #[test]
    fn test_empty_database_path() {
        let err = EngineConfig::from_lookup(lookup(&[(DATABASE_PATH_VAR, "")])).unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }
}
