use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};

use crate::ws::RoomSettings;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Environment (dev, staging, prod)
    #[serde(default = "default_environment")]
    pub environment: String,

    /// CORS allowed origins, comma separated, `*` for any
    pub cors_origins: Option<String>,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Database URL; without it room content lives in memory only
    pub db_url: Option<String>,

    /// The single room every connection joins
    #[serde(default = "default_room_id")]
    pub room_id: String,

    /// Path reserved for the websocket upgrade
    #[serde(default = "default_ws_path")]
    pub ws_path: String,

    /// Outbound frames buffered per session
    #[serde(default = "default_session_buffer")]
    pub session_buffer: usize,

    /// Seconds an empty room stays active before it is disposed
    #[serde(default = "default_room_idle_timeout_secs")]
    pub room_idle_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables or app.env file
    pub fn load() -> Result<Self, ConfigError> {
        // Try to load from app.env file first
        if std::path::Path::new("app.env").exists() {
            dotenvy::from_filename("app.env").ok();
        } else {
            dotenvy::dotenv().ok();
        }

        match envy::from_env::<Config>() {
            Ok(config) => {
                let config = config.normalized()?;
                info!("Configuration loaded successfully");
                Ok(config)
            }
            Err(e) => {
                error!("Failed to load configuration: {}", e);
                Err(ConfigError::EnvError(e))
            }
        }
    }

    fn normalized(mut self) -> Result<Self, ConfigError> {
        if !self.ws_path.starts_with('/') {
            self.ws_path = format!("/{}", self.ws_path);
        }
        if self.room_id.trim().is_empty() {
            return Err(ConfigError::Invalid("ROOM_ID must not be empty".to_string()));
        }
        if self.session_buffer == 0 {
            return Err(ConfigError::Invalid("SESSION_BUFFER must be at least 1".to_string()));
        }
        Ok(self)
    }

    /// Get the full server address
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if running in development mode
    pub fn is_development(&self) -> bool {
        self.environment.to_lowercase() == "dev" || self.environment.to_lowercase() == "development"
    }

    pub fn room_settings(&self) -> RoomSettings {
        RoomSettings {
            session_buffer: self.session_buffer,
            idle_timeout: Duration::from_secs(self.room_idle_timeout_secs),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: default_environment(),
            log_level: default_log_level(),
            cors_origins: None,
            db_url: None,
            room_id: default_room_id(),
            ws_path: default_ws_path(),
            session_buffer: default_session_buffer(),
            room_idle_timeout_secs: default_room_idle_timeout_secs(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Environment variable error: {0}")]
    EnvError(#[from] envy::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_room_id() -> String {
    "shared-terminal".to_string()
}

fn default_ws_path() -> String {
    "/ws/shared-terminal".to_string()
}

fn default_session_buffer() -> usize {
    64
}

fn default_room_idle_timeout_secs() -> u64 {
    300
}
