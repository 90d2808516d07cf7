use std::fs;
use std::path::{Path, PathBuf};

use super::core::SplitmapConfig;
use crate::errors::{AssessmentError, Result};

/// File name searched for during discovery.
pub const CONFIG_FILE_NAME: &str = ".splitmap.toml";

const MAX_TRAVERSAL_DEPTH: usize = 10;

/// Pure function to parse and validate config from a TOML string
pub fn parse_and_validate_config(contents: &str) -> Result<SplitmapConfig> {
    let config = toml::from_str::<SplitmapConfig>(contents)
        .map_err(|e| AssessmentError::config(format!("failed to parse config: {e}")))?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from an explicit path.
///
/// Unlike discovery, a missing or invalid file here is an error: the caller
/// asked for this file specifically.
pub fn load_config_from(path: &Path) -> Result<SplitmapConfig> {
    let contents = fs::read_to_string(path).map_err(|e| AssessmentError::io(path, e))?;
    parse_and_validate_config(&contents).map_err(|e| match e {
        AssessmentError::Config { message, .. } => AssessmentError::config_file(message, path),
        other => other,
    })
}

/// Generate directory ancestors up to a depth limit
pub fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        if parent.pop() {
            Some(parent)
        } else {
            None
        }
    })
    .take(max_depth)
}

fn try_load_config_from_path(config_path: &Path) -> Option<SplitmapConfig> {
    if !config_path.is_file() {
        return None;
    }

    match load_config_from(config_path) {
        Ok(config) => {
            tracing::debug!(path = %config_path.display(), "Loaded config");
            Some(config)
        }
        Err(e) => {
            tracing::warn!("{e}. Using defaults.");
            None
        }
    }
}

/// Discover `.splitmap.toml` in `start` or one of its ancestors.
pub fn discover_config(start: PathBuf) -> SplitmapConfig {
    directory_ancestors(start, MAX_TRAVERSAL_DEPTH)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find_map(|path| try_load_config_from_path(&path))
        .unwrap_or_else(|| {
            tracing::debug!(
                "No config found after checking {} directories. Using default config.",
                MAX_TRAVERSAL_DEPTH
            );
            SplitmapConfig::default()
        })
}

/// Discover configuration starting from the current directory.
pub fn load_config() -> SplitmapConfig {
    match std::env::current_dir() {
        Ok(dir) => discover_config(dir),
        Err(e) => {
            tracing::warn!("Failed to get current directory: {e}. Using default config.");
            SplitmapConfig::default()
        }
    }
}
