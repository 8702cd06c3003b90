//! Config file discovery and JSON5 parsing.

use crate::{ConfigError, LorebaseConfig};
use directories::BaseDirs;
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

/// Default config filename under the storage root.
const DEFAULT_CONFIG_FILE: &str = "lorebase.json5";
/// Default config directory under the user's home.
const DEFAULT_CONFIG_DIR: &str = ".lorebase";

/// Resolve the default config path under the user's home directory.
pub fn default_config_path() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| {
        dirs.home_dir()
            .join(DEFAULT_CONFIG_DIR)
            .join(DEFAULT_CONFIG_FILE)
    })
}

/// Load config from the default path, falling back to defaults when absent.
pub fn load() -> Result<LorebaseConfig, ConfigError> {
    match default_config_path() {
        Some(path) => load_from(&path),
        None => {
            debug!("no home directory resolved, using default config");
            Ok(LorebaseConfig::default())
        }
    }
}

/// Load config from an explicit path, falling back to defaults when absent.
pub fn load_from(path: &Path) -> Result<LorebaseConfig, ConfigError> {
    if !path.exists() {
        debug!("config file absent, using defaults (path={})", path.display());
        return Ok(LorebaseConfig::default());
    }
    let raw = fs::read_to_string(path)?;
    let config = json5::from_str(&raw).map_err(|err| ConfigError::Parse {
        path: path.display().to_string(),
        message: err.to_string(),
    })?;
    info!("loaded config (path={})", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::load_from;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn load_from_missing_path_yields_defaults() {
        let temp = tempdir().expect("tempdir");
        let config = load_from(&temp.path().join("absent.json5")).expect("load");
        assert_eq!(config.history.retention, 100);
    }

    #[test]
    fn load_from_parses_json5_overrides() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("lorebase.json5");
        fs::write(
            &path,
            r#"{
                // tighter loop for tests
                agent: { max_tool_rounds: 2 },
                history: { retention: 25 },
            }"#,
        )
        .expect("write config");

        let config = load_from(&path).expect("load");
        assert_eq!(config.agent.max_tool_rounds, 2);
        assert_eq!(config.history.retention, 25);
        assert_eq!(config.retrieval.max_sources, 5);
    }

    #[test]
    fn load_from_rejects_malformed_config() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("lorebase.json5");
        fs::write(&path, "{ agent: ").expect("write config");
        let err = load_from(&path).expect_err("parse failure");
        assert_eq!(err.to_string().contains("parse error"), true);
    }
}
