//! Layered configuration for the ishtar client.
//!
//! Sources, later ones overriding earlier ones:
//! 1. built-in defaults (production endpoints, `"en"` locale, a per-user
//!    cache directory),
//! 2. an `ishtar.toml` file in the working directory,
//! 3. `ISHTAR_*` environment variables.
//!
//! The only value without a usable default is the API key.

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "ishtar.toml";
const ENV_PREFIX: &str = "ISHTAR_";

/// Everything the client needs to come up.
///
/// OAuth client id/secret deliberately do not appear here: token acquisition
/// is an external concern, and the library only ever receives an
/// already-valid bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// API key issued by the vendor. Required.
    pub api_key: String,
    /// Locale selecting the world content database (`"en"` by default).
    pub locale: String,
    /// Directory holding the cache index and the reference database files.
    pub cache_dir: PathBuf,
    /// Base URL for platform (JSON) endpoints.
    pub api_base: String,
    /// Base URL for static content downloads.
    pub cdn_base: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            locale: "en".to_string(),
            cache_dir: default_cache_dir(),
            api_base: "https://www.bungie.net/Platform/".to_string(),
            cdn_base: "https://www.bungie.net/".to_string(),
        }
    }
}

impl Config {
    /// The figment underlying [`load`](Config::load), exposed so callers can
    /// merge additional providers (e.g. test overrides) before extraction.
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    /// Load and validate configuration from the default sources.
    pub fn load() -> Result<Self> {
        Self::from_figment(Self::figment())
    }

    /// Extract and validate configuration from a prepared figment.
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Config = figment.extract().or_raise(|| ErrorKind::Read)?;
        config.validate()?;
        debug!(cache_dir = %config.cache_dir.display(), locale = config.locale, "configuration loaded");
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            exn::bail!(ErrorKind::MissingApiKey);
        }
        if self.locale.trim().is_empty() {
            exn::bail!(ErrorKind::Invalid("locale"));
        }
        if self.cache_dir.as_os_str().is_empty() {
            exn::bail!(ErrorKind::Invalid("cache_dir"));
        }
        Ok(())
    }
}

/// Per-user cache directory, falling back to a relative path when the
/// platform conventions can't be determined.
fn default_cache_dir() -> PathBuf {
    match ProjectDirs::from("", "", "ishtar") {
        Some(dirs) => dirs.cache_dir().to_path_buf(),
        None => PathBuf::from(".ishtar-cache"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn figment_with(toml: &str) -> Figment {
        Figment::from(Serialized::defaults(Config::default())).merge(Toml::string(toml))
    }

    #[test]
    fn defaults_point_at_production() {
        let config = Config::default();
        assert_eq!(config.locale, "en");
        assert_eq!(config.api_base, "https://www.bungie.net/Platform/");
        assert!(!config.cache_dir.as_os_str().is_empty());
    }

    #[test]
    fn toml_overrides_defaults() {
        let config = Config::from_figment(figment_with(
            r#"
                api_key = "abc123"
                locale = "fr"
                cache_dir = "/var/cache/ishtar"
            "#,
        ))
        .unwrap();
        assert_eq!(config.api_key, "abc123");
        assert_eq!(config.locale, "fr");
        assert_eq!(config.cache_dir, PathBuf::from("/var/cache/ishtar"));
        // Untouched fields keep their defaults.
        assert_eq!(config.cdn_base, "https://www.bungie.net/");
    }

    #[test]
    fn missing_api_key_is_rejected() {
        let err = Config::from_figment(figment_with(r#"locale = "en""#)).unwrap_err();
        assert!(matches!(*err, ErrorKind::MissingApiKey));
    }

    #[rstest]
    #[case("locale = \"\"", ErrorKind::Invalid("locale"))]
    #[case("cache_dir = \"\"", ErrorKind::Invalid("cache_dir"))]
    fn blank_values_are_rejected(#[case] line: &str, #[case] expected: ErrorKind) {
        let toml = format!("api_key = \"k\"\n{line}");
        let err = Config::from_figment(figment_with(&toml)).unwrap_err();
        assert_eq!((*err).to_string(), expected.to_string());
    }
}
