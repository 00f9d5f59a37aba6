use crate::error::{Error, Result};
use std::env;
use std::path::PathBuf;

/// Base config directory (~/.config/addon-release/ on all platforms)
pub fn config_dir() -> Result<PathBuf> {
    #[cfg(windows)]
    {
        let appdata = env::var("APPDATA").map_err(|_| {
            Error::internal_unexpected(
                "APPDATA environment variable not set on Windows".to_string(),
            )
        })?;
        Ok(PathBuf::from(appdata).join("addon-release"))
    }

    #[cfg(not(windows))]
    {
        let home = env::var("HOME").map_err(|_| {
            Error::internal_unexpected(
                "HOME environment variable not set on Unix-like system".to_string(),
            )
        })?;
        Ok(PathBuf::from(home).join(".config").join("addon-release"))
    }
}

/// Global config.json path
pub fn config_json() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.json"))
}

/// Expand `~` and env vars in a user-supplied path.
pub fn expand(path: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(path).map_err(|e| {
        Error::validation_invalid_argument(
            "path",
            format!("Cannot expand '{}': {}", path, e),
            Some(path.to_string()),
            None,
        )
    })?;
    Ok(PathBuf::from(expanded.as_ref()))
}

/// Process-unique scratch directory for a fresh clone.
pub fn scratch_dir(prefix: &str) -> PathBuf {
    env::temp_dir().join(format!("{}-{}", prefix, uuid::Uuid::new_v4()))
}
