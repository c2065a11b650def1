//! Project configuration: `.embedsync.toml` loading and defaults.

use std::path::Path;
use std::time::Duration;

use crate::error::Error;

/// Name of the project config file.
pub const CONFIG_FILE: &str = ".embedsync.toml";

/// Default quiet period, in milliseconds, for debounced write-backs.
pub const DEFAULT_DEBOUNCE_MS: u64 = 250;

/// Project configuration loaded from `.embedsync.toml`.
pub struct Config {
    /// API root used to recognize and build managed download URLs.
    pub base_uri: Option<String>,
    /// Quiet period for debounced write-backs, in milliseconds.
    pub debounce_ms: u64,
    /// Opaque access token appended to resolved download URLs.
    pub token: Option<String>,
}

/// Raw TOML structure for `.embedsync.toml`.
#[derive(serde::Deserialize)]
struct EmbedsyncTomlConfig {
    /// Optional API root.
    base_uri: Option<String>,
    /// Optional debounce override in milliseconds.
    debounce_ms: Option<u64>,
    /// Optional download access token.
    token: Option<String>,
}

impl Config {
    /// The debounce quiet period as a `Duration`.
    pub fn debounce(&self) -> Duration {
        return Duration::from_millis(self.debounce_ms);
    }

    /// Default config: no base URI, standard debounce, no token.
    fn defaults() -> Self {
        return Self {
            base_uri: None,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            token: None,
        };
    }

    /// Load config from `.embedsync.toml` in the given root directory.
    /// Returns defaults if the file doesn't exist. Returns an error if the
    /// file exists but is malformed — never silently falls back to
    /// defaults when the user wrote a config file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// or `Error::TomlDe` if the TOML is malformed.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::defaults()),
            Err(e) => return Err(Error::Io(e)),
        };

        let raw: EmbedsyncTomlConfig = toml::from_str(&content)?;
        return Ok(Self {
            base_uri: raw.base_uri,
            debounce_ms: raw.debounce_ms.unwrap_or(DEFAULT_DEBOUNCE_MS),
            token: raw.token,
        });
    }

    /// The base URI, with an optional CLI override taking precedence.
    ///
    /// # Errors
    ///
    /// Returns `Error::BaseUriNotConfigured` when neither the config file
    /// nor the override supplies one.
    pub fn require_base_uri<'a>(&'a self, override_uri: Option<&'a str>) -> Result<&'a str, Error> {
        return override_uri
            .or(self.base_uri.as_deref())
            .ok_or(Error::BaseUriNotConfigured);
    }
}

#[cfg(test)]
mod tests {
    use super::{Config, DEFAULT_DEBOUNCE_MS};

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert!(config.base_uri.is_none());
        assert_eq!(config.debounce_ms, DEFAULT_DEBOUNCE_MS);
    }

    #[test]
    fn file_values_are_loaded() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".embedsync.toml"),
            "base_uri = \"https://host/api\"\ndebounce_ms = 100\ntoken = \"t\"\n",
        )
        .unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.base_uri.as_deref(), Some("https://host/api"));
        assert_eq!(config.debounce_ms, 100);
        assert_eq!(config.token.as_deref(), Some("t"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".embedsync.toml"), "base_uri = [").unwrap();
        assert!(Config::load(dir.path()).is_err());
    }

    #[test]
    fn override_takes_precedence() {
        let config = Config {
            base_uri: Some("https://from-config".to_string()),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            token: None,
        };
        assert_eq!(
            config.require_base_uri(Some("https://from-flag")).unwrap(),
            "https://from-flag"
        );
        assert_eq!(config.require_base_uri(None).unwrap(), "https://from-config");
    }
}
