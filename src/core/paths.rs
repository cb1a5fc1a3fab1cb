use crate::error::{Error, Result};
use std::env;
use std::path::PathBuf;

/// Base fieldfix config directory (~/.config/fieldfix/, %APPDATA%\fieldfix on Windows)
pub fn fieldfix() -> Result<PathBuf> {
    #[cfg(windows)]
    {
        let appdata = env::var("APPDATA").map_err(|_| {
            Error::internal_unexpected(
                "APPDATA environment variable not set on Windows".to_string(),
            )
        })?;
        Ok(PathBuf::from(appdata).join("fieldfix"))
    }

    #[cfg(not(windows))]
    {
        let home = env::var("HOME").map_err(|_| {
            Error::internal_unexpected(
                "HOME environment variable not set on Unix-like system".to_string(),
            )
        })?;
        Ok(PathBuf::from(home).join(".config").join("fieldfix"))
    }
}

/// Global fieldfix.json config file path
pub fn fieldfix_json() -> Result<PathBuf> {
    Ok(fieldfix()?.join("fieldfix.json"))
}
