//! Process configuration, constructed once at startup and passed into
//! each adapter explicitly. No global mutable state.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "cardioplan";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8420";
const DEFAULT_GENERATIVE_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_GENERATIVE_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_GENERATIVE_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("GEMINI_API_KEY is not set")]
    MissingApiKey,

    #[error("invalid {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Connection settings for the external generative-text service.
#[derive(Debug, Clone)]
pub struct GenerativeConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

/// Full application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_path: PathBuf,
    pub generative: GenerativeConfig,
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// `GEMINI_API_KEY` is required; everything else falls back to a
    /// sensible default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind_addr = env_or("CARDIOPLAN_ADDR", DEFAULT_BIND_ADDR);
        let bind_addr = bind_addr.parse().map_err(|_| ConfigError::Invalid {
            name: "CARDIOPLAN_ADDR",
            value: bind_addr,
        })?;

        let database_path = std::env::var("CARDIOPLAN_DB")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_database_path());

        let api_key = std::env::var("GEMINI_API_KEY").map_err(|_| ConfigError::MissingApiKey)?;

        let timeout = env_or(
            "GEMINI_TIMEOUT_SECS",
            &DEFAULT_GENERATIVE_TIMEOUT_SECS.to_string(),
        );
        let timeout_secs = timeout.parse().map_err(|_| ConfigError::Invalid {
            name: "GEMINI_TIMEOUT_SECS",
            value: timeout,
        })?;

        Ok(Self {
            bind_addr,
            database_path,
            generative: GenerativeConfig {
                api_key,
                base_url: env_or("GEMINI_BASE_URL", DEFAULT_GENERATIVE_BASE_URL),
                model: env_or("GEMINI_MODEL", DEFAULT_GENERATIVE_MODEL),
                timeout_secs,
            },
        })
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Get the application data directory (~/Cardioplan/).
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Cardioplan")
}

/// Default location of the SQLite database.
pub fn default_database_path() -> PathBuf {
    app_data_dir().join("cardioplan.db")
}
