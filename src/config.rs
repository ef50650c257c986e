//! Application configuration loaded from environment variables.
//!
//! Configuration is loaded once at startup and validated before the server starts.
//!
//! ## Storage
//!
//! ```bash
//! export STORAGE_BACKEND="sqlite"      # memory | file | sqlite
//! export DB_PATH="data/urls.db"        # sqlite backend
//! export DATA_PATH="urls.json"         # file backend
//! ```
//!
//! ## Optional Variables
//!
//! - `LISTEN` - Bind address (default: `0.0.0.0:3000`)
//! - `SERVICE_HOSTNAME` - Public hostname of this service, used to build short
//!   URLs and to reject links back to it (default: `localhost`)
//! - `STATIC_DIR` - Static asset root (default: `static`)
//! - `CODE_LENGTH` / `CODE_ALPHABET` - Generated code shape (default: 6, base62)
//! - `METADATA_FETCH` / `METADATA_TIMEOUT` - Preview enrichment (default: on, 10s)
//! - `RATE_LIMIT_ENABLED` / `RATE_LIMIT_PERIOD_SECS` / `RATE_LIMIT_BURST` -
//!   Per-IP limiter on `/api` (default: on, one request per 12s, burst 50)
//! - `BEHIND_PROXY` - Read client IP from forwarding headers (default: `false`)
//! - `RUST_LOG` - Log level (default: `info`)
//! - `LOG_FORMAT` - Log format: `text` or `json` (default: `text`)

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::infrastructure::persistence::{StorageBackend, StorageOptions};
use crate::utils::CodeGenerator;
use crate::utils::code_generator::{DEFAULT_ALPHABET, DEFAULT_CODE_LENGTH};

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: String,
    /// Public `host[:port]` of this service.
    pub service_hostname: String,
    pub storage_backend: StorageBackend,
    pub db_path: PathBuf,
    pub data_path: PathBuf,
    /// Maximum number of SQLite pool connections (`DB_MAX_CONNECTIONS`, default: 5).
    pub db_max_connections: u32,
    pub static_dir: PathBuf,
    pub code_length: usize,
    pub code_alphabet: String,
    pub metadata_fetch: bool,
    /// Upper bound on one metadata fetch, in seconds.
    pub metadata_timeout_secs: u64,
    pub rate_limit_enabled: bool,
    /// One request is replenished every this many seconds.
    pub rate_limit_period_secs: u64,
    pub rate_limit_burst: u32,
    /// When true, rate limiting reads client IP from X-Forwarded-For / X-Real-IP headers.
    /// Enable only when the service is behind a trusted reverse proxy.
    pub behind_proxy: bool,
    pub log_level: String,
    pub log_format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:3000".to_string(),
            service_hostname: "localhost".to_string(),
            storage_backend: StorageBackend::Sqlite,
            db_path: PathBuf::from("data/urls.db"),
            data_path: PathBuf::from("urls.json"),
            db_max_connections: 5,
            static_dir: PathBuf::from("static"),
            code_length: DEFAULT_CODE_LENGTH,
            code_alphabet: DEFAULT_ALPHABET.to_string(),
            metadata_fetch: true,
            metadata_timeout_secs: 10,
            rate_limit_enabled: true,
            rate_limit_period_secs: 12,
            rate_limit_burst: 50,
            behind_proxy: false,
            log_level: "info".to_string(),
            log_format: "text".to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `STORAGE_BACKEND` names an unknown backend.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(value) => value
                .parse()
                .map_err(anyhow::Error::msg)
                .context("Invalid STORAGE_BACKEND")?,
            Err(_) => defaults.storage_backend,
        };

        Ok(Self {
            listen_addr: env::var("LISTEN").unwrap_or(defaults.listen_addr),
            service_hostname: env::var("SERVICE_HOSTNAME").unwrap_or(defaults.service_hostname),
            storage_backend,
            db_path: env::var("DB_PATH").map_or(defaults.db_path, PathBuf::from),
            data_path: env::var("DATA_PATH").map_or(defaults.data_path, PathBuf::from),
            db_max_connections: env_parse("DB_MAX_CONNECTIONS", defaults.db_max_connections),
            static_dir: env::var("STATIC_DIR").map_or(defaults.static_dir, PathBuf::from),
            code_length: env_parse("CODE_LENGTH", defaults.code_length),
            code_alphabet: env::var("CODE_ALPHABET").unwrap_or(defaults.code_alphabet),
            metadata_fetch: env_bool("METADATA_FETCH", defaults.metadata_fetch),
            metadata_timeout_secs: env_parse("METADATA_TIMEOUT", defaults.metadata_timeout_secs),
            rate_limit_enabled: env_bool("RATE_LIMIT_ENABLED", defaults.rate_limit_enabled),
            rate_limit_period_secs: env_parse(
                "RATE_LIMIT_PERIOD_SECS",
                defaults.rate_limit_period_secs,
            ),
            rate_limit_burst: env_parse("RATE_LIMIT_BURST", defaults.rate_limit_burst),
            behind_proxy: env_bool("BEHIND_PROXY", defaults.behind_proxy),
            log_level: env::var("RUST_LOG").unwrap_or(defaults.log_level),
            log_format: env::var("LOG_FORMAT").unwrap_or(defaults.log_format),
        })
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `log_format` is not `text` or `json`
    /// - `listen_addr` is not `host:port`
    /// - `service_hostname` is empty or carries a scheme or path
    /// - the code alphabet or length is unusable
    /// - `metadata_timeout_secs` is outside `1..=60`
    /// - rate limit period or burst is zero
    pub fn validate(&self) -> Result<()> {
        if self.log_format != "text" && self.log_format != "json" {
            anyhow::bail!(
                "LOG_FORMAT must be 'text' or 'json', got '{}'",
                self.log_format
            );
        }

        if !self.listen_addr.contains(':') {
            anyhow::bail!(
                "LISTEN must be in format 'host:port', got '{}'",
                self.listen_addr
            );
        }

        let hostname = self.service_hostname.trim();
        if hostname.is_empty() || hostname.contains("://") || hostname.contains('/') {
            anyhow::bail!(
                "SERVICE_HOSTNAME must be a bare 'host' or 'host:port', got '{}'",
                self.service_hostname
            );
        }

        self.code_generator()?;

        if !(1..=60).contains(&self.metadata_timeout_secs) {
            anyhow::bail!(
                "METADATA_TIMEOUT must be between 1 and 60 seconds, got {}",
                self.metadata_timeout_secs
            );
        }

        if self.rate_limit_period_secs == 0 {
            anyhow::bail!("RATE_LIMIT_PERIOD_SECS must be greater than 0");
        }
        if self.rate_limit_burst == 0 {
            anyhow::bail!("RATE_LIMIT_BURST must be greater than 0");
        }

        if self.db_max_connections == 0 {
            anyhow::bail!("DB_MAX_CONNECTIONS must be at least 1");
        }

        Ok(())
    }

    /// Builds the short code generator described by `CODE_ALPHABET` and `CODE_LENGTH`.
    pub fn code_generator(&self) -> Result<CodeGenerator> {
        CodeGenerator::new(&self.code_alphabet, self.code_length)
            .context("Invalid CODE_ALPHABET / CODE_LENGTH")
    }

    pub fn storage_options(&self) -> StorageOptions {
        StorageOptions {
            backend: self.storage_backend,
            db_path: self.db_path.clone(),
            data_path: self.data_path.clone(),
            db_max_connections: self.db_max_connections,
        }
    }

    pub fn metadata_timeout(&self) -> Duration {
        Duration::from_secs(self.metadata_timeout_secs)
    }

    /// Prints configuration summary.
    pub fn print_summary(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Listen address: {}", self.listen_addr);
        tracing::info!("  Service hostname: {}", self.service_hostname);

        match self.storage_backend {
            StorageBackend::Memory => tracing::info!("  Storage: memory (not persisted)"),
            StorageBackend::File => {
                tracing::info!("  Storage: file ({})", self.data_path.display())
            }
            StorageBackend::Sqlite => {
                tracing::info!("  Storage: sqlite ({})", self.db_path.display())
            }
        }

        tracing::info!("  Static dir: {}", self.static_dir.display());
        tracing::info!(
            "  Codes: {} chars over {} symbols",
            self.code_length,
            self.code_alphabet.chars().count()
        );

        if self.metadata_fetch {
            tracing::info!(
                "  Metadata fetch: enabled ({}s timeout)",
                self.metadata_timeout_secs
            );
        } else {
            tracing::info!("  Metadata fetch: disabled");
        }

        if self.rate_limit_enabled {
            tracing::info!(
                "  Rate limit: 1 per {}s, burst {}{}",
                self.rate_limit_period_secs,
                self.rate_limit_burst,
                if self.behind_proxy { " (behind proxy)" } else { "" }
            );
        } else {
            tracing::info!("  Rate limit: disabled");
        }

        tracing::info!("  Log level: {}", self.log_level);
        tracing::info!("  Log format: {}", self.log_format);
    }
}

/// Reads and parses `key`, falling back to `default` when unset or unparsable.
fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Reads a boolean flag. `true`/`1`/`yes`/`on` enable, anything else disables.
fn env_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .map(|v| {
            let v = v.trim();
            v.eq_ignore_ascii_case("true")
                || v == "1"
                || v.eq_ignore_ascii_case("yes")
                || v.eq_ignore_ascii_case("on")
        })
        .unwrap_or(default)
}

/// Loads and validates configuration from environment variables.
///
/// # Errors
///
/// Returns an error if a variable is malformed or validation fails.
///
/// # Note
///
/// This function expects environment variables to be already loaded
/// (e.g., via `dotenvy::dotenv()` in `main.rs`).
pub fn load_from_env() -> Result<Config> {
    let config = Config::from_env()?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "LISTEN",
        "SERVICE_HOSTNAME",
        "STORAGE_BACKEND",
        "DB_PATH",
        "DATA_PATH",
        "CODE_LENGTH",
        "CODE_ALPHABET",
        "METADATA_FETCH",
        "METADATA_TIMEOUT",
        "RATE_LIMIT_ENABLED",
        "RATE_LIMIT_PERIOD_SECS",
        "RATE_LIMIT_BURST",
        "DB_MAX_CONNECTIONS",
        "STATIC_DIR",
        "BEHIND_PROXY",
        "LOG_FORMAT",
    ];

    fn clear_env() {
        // SAFETY: Tests touching the environment are run serially
        unsafe {
            for var in VARS {
                env::remove_var(var);
            }
        }
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.log_format = "invalid".to_string();
        assert!(config.validate().is_err());
        config.log_format = "json".to_string();
        assert!(config.validate().is_ok());

        config.listen_addr = "3000".to_string();
        assert!(config.validate().is_err());
        config.listen_addr = "0.0.0.0:3000".to_string();

        config.service_hostname = "https://short.io".to_string();
        assert!(config.validate().is_err());
        config.service_hostname = "short.io:8080".to_string();
        assert!(config.validate().is_ok());

        config.code_length = 0;
        assert!(config.validate().is_err());
        config.code_length = 33;
        assert!(config.validate().is_err());
        config.code_length = 8;

        config.code_alphabet = "abc!".to_string();
        assert!(config.validate().is_err());
        config.code_alphabet = "aab".to_string();
        assert!(config.validate().is_err());
        config.code_alphabet = "ab-_".to_string();
        assert!(config.validate().is_ok());

        config.metadata_timeout_secs = 0;
        assert!(config.validate().is_err());
        config.metadata_timeout_secs = 61;
        assert!(config.validate().is_err());
        config.metadata_timeout_secs = 60;

        config.rate_limit_burst = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_defaults_from_empty_env() {
        clear_env();

        let config = Config::from_env().unwrap();

        assert_eq!(config.listen_addr, "0.0.0.0:3000");
        assert_eq!(config.storage_backend, StorageBackend::Sqlite);
        assert_eq!(config.code_length, 6);
        assert_eq!(config.code_alphabet, DEFAULT_ALPHABET);
        assert!(config.metadata_fetch);
        assert!(!config.behind_proxy);
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_overrides() {
        clear_env();
        // SAFETY: Tests are run serially due to #[serial]
        unsafe {
            env::set_var("STORAGE_BACKEND", "file");
            env::set_var("DATA_PATH", "/tmp/links.json");
            env::set_var("CODE_LENGTH", "8");
            env::set_var("METADATA_FETCH", "false");
            env::set_var("BEHIND_PROXY", "1");
            env::set_var("SERVICE_HOSTNAME", "short.io");
        }

        let config = Config::from_env().unwrap();

        assert_eq!(config.storage_backend, StorageBackend::File);
        assert_eq!(config.data_path, PathBuf::from("/tmp/links.json"));
        assert_eq!(config.code_length, 8);
        assert!(!config.metadata_fetch);
        assert!(config.behind_proxy);
        assert_eq!(config.service_hostname, "short.io");

        clear_env();
    }

    #[test]
    #[serial]
    fn test_unknown_backend_fails() {
        clear_env();
        // SAFETY: Tests are run serially due to #[serial]
        unsafe {
            env::set_var("STORAGE_BACKEND", "postgres");
        }

        assert!(Config::from_env().is_err());

        clear_env();
    }

    #[test]
    #[serial]
    fn test_load_from_env_validates() {
        clear_env();
        // SAFETY: Tests are run serially due to #[serial]
        unsafe {
            env::set_var("CODE_ALPHABET", "a b");
        }

        assert!(load_from_env().is_err());

        clear_env();
    }
}
