use crate::error::{Error, Result};
use std::env;
use std::path::PathBuf;

/// Base rollout config directory (~/.config/rollout/ on all platforms)
pub fn rollout() -> Result<PathBuf> {
    #[cfg(windows)]
    {
        let appdata = env::var("APPDATA").map_err(|_| {
            Error::internal_unexpected(
                "APPDATA environment variable not set on Windows".to_string(),
            )
        })?;
        Ok(PathBuf::from(appdata).join("rollout"))
    }

    #[cfg(not(windows))]
    {
        let home = env::var("HOME").map_err(|_| {
            Error::internal_unexpected(
                "HOME environment variable not set on Unix-like system".to_string(),
            )
        })?;
        Ok(PathBuf::from(home).join(".config").join("rollout"))
    }
}

/// Target declarations directory
pub fn targets() -> Result<PathBuf> {
    Ok(rollout()?.join("targets"))
}
