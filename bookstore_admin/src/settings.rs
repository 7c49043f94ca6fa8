use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::client::ClientConfig;

pub const DEFAULT_CONFIG_FILE: &str = "bookstore_admin.toml";
const ENV_PREFIX: &str = "BOOKSTORE_ADMIN";

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ApiSettings {
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_read_retries: u32,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SessionSettings {
    pub file: PathBuf,
    pub ttl_hours: u64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CacheSettings {
    pub stale_secs: u64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TelemetrySettings {
    pub jaeger_enabled: bool,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Settings {
    pub api: ApiSettings,
    pub session: SessionSettings,
    pub cache: CacheSettings,
    pub telemetry: TelemetrySettings,
}

impl Settings {
    /// Defaults, then the config file when it exists, then `BOOKSTORE_ADMIN_*` variables,
    /// e.g. `BOOKSTORE_ADMIN_API__BASE_URL`
    pub fn load(config_file: Option<&Path>) -> anyhow::Result<Self> {
        let config_file = config_file.unwrap_or(Path::new(DEFAULT_CONFIG_FILE));
        let default_session_file = default_session_file();

        Config::builder()
            .set_default("api.base_url", "http://localhost:8080/api/v1")?
            .set_default("api.timeout_secs", 30)?
            .set_default("api.max_read_retries", 3)?
            .set_default("session.file", default_session_file.to_string_lossy().to_string())?
            .set_default("session.ttl_hours", 24)?
            .set_default("cache.stale_secs", 300)?
            .set_default("telemetry.jaeger_enabled", false)?
            .add_source(File::from(config_file).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.api.base_url.clone(),
            timeout: Duration::from_secs(self.api.timeout_secs),
            max_read_retries: self.api.max_read_retries,
        }
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session.ttl_hours * 60 * 60)
    }

    pub fn stale_time(&self) -> Duration {
        Duration::from_secs(self.cache.stale_secs)
    }
}

fn default_session_file() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_default()
        .join(".bookstore_admin")
        .join("session.json")
}

#[cfg(test)]
mod settings_tests {
    use serial_test::serial;

    use super::*;

    const OVERRIDDEN: [&str; 2] = ["BOOKSTORE_ADMIN_API__BASE_URL", "BOOKSTORE_ADMIN_CACHE__STALE_SECS"];

    fn clear_env() {
        for name in OVERRIDDEN {
            std::env::remove_var(name);
        }
    }

    #[test]
    #[serial]
    fn defaults_without_file_or_env() {
        clear_env();
        let dir = tempfile::tempdir().unwrap();

        let settings = Settings::load(Some(&dir.path().join("missing.toml"))).unwrap();

        assert_eq!(settings.api.base_url, "http://localhost:8080/api/v1");
        assert_eq!(settings.api.max_read_retries, 3);
        assert_eq!(settings.session_ttl(), Duration::from_secs(24 * 3600));
        assert_eq!(settings.stale_time(), Duration::from_secs(300));
        assert!(settings.session.file.ends_with(".bookstore_admin/session.json"));
        assert!(!settings.telemetry.jaeger_enabled);
    }

    #[test]
    #[serial]
    /// 1. Writes a config file overriding the url and the stale time
    /// 2. Overrides the url again through the environment
    /// 3. Expects the environment to win and the file to apply otherwise
    fn environment_overrides_file() {
        clear_env();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bookstore_admin.toml");
        std::fs::write(
            &path,
            "[api]\nbase_url = \"http://file:1/api/v1\"\n\n[cache]\nstale_secs = 10\n",
        )
        .unwrap();

        std::env::set_var("BOOKSTORE_ADMIN_API__BASE_URL", "http://env:2/api/v1");
        let settings = Settings::load(Some(&path));
        clear_env();
        let settings = settings.unwrap();

        assert_eq!(settings.api.base_url, "http://env:2/api/v1");
        assert_eq!(settings.stale_time(), Duration::from_secs(10));
        assert_eq!(settings.client_config().base_url, "http://env:2/api/v1");
        assert_eq!(settings.client_config().timeout, Duration::from_secs(30));
    }

    #[test]
    #[serial]
    fn numbers_from_environment_are_parsed() {
        clear_env();
        std::env::set_var("BOOKSTORE_ADMIN_CACHE__STALE_SECS", "42");
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(Some(&dir.path().join("missing.toml")));
        clear_env();

        assert_eq!(settings.unwrap().cache.stale_secs, 42);
    }
}
