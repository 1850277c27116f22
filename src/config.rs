use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port, shared by the REST API and the /ws channel
    #[serde(default = "default_port")]
    pub port: u16,

    /// Environment (dev, staging, prod)
    #[serde(default = "default_environment")]
    pub environment: String,

    /// CORS allowed origins, comma separated
    pub cors_origins: Option<String>,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Backing file holding the shared document
    #[serde(default = "default_text_file")]
    pub text_file: PathBuf,

    /// Host name clients use to reach this server
    #[serde(default = "default_public_host")]
    pub public_host: String,

    /// Per-frame write timeout for a session's socket writer
    #[serde(default = "default_send_timeout_ms")]
    pub send_timeout_ms: u64,

    /// Interval of the periodic user count broadcast (0 disables it)
    #[serde(default = "default_presence_interval_secs")]
    pub presence_interval_secs: u64,
}

impl Config {
    /// Load configuration from environment variables or app.env file
    pub fn load() -> Result<Self, ConfigError> {
        // Try to load from app.env file first
        if std::path::Path::new("app.env").exists() {
            dotenvy::from_filename("app.env").ok();
        } else {
            // Fallback to .env file
            dotenvy::dotenv().ok();
        }

        // Load from environment variables using envy
        envy::from_env::<Config>().map_err(ConfigError::EnvError)
    }

    /// Get the full server address
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// URL clients use for REST calls
    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.public_host, self.port)
    }

    /// URL clients use for the realtime channel
    pub fn websocket_url(&self) -> String {
        format!("ws://{}:{}/ws", self.public_host, self.port)
    }

    pub fn api_docs_url(&self) -> String {
        format!("{}/docs", self.server_url())
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }

    /// `None` when periodic presence updates are disabled
    pub fn presence_interval(&self) -> Option<Duration> {
        match self.presence_interval_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Parsed list of allowed CORS origins, empty when unrestricted
    pub fn cors_origin_list(&self) -> Vec<String> {
        self.cors_origins
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect()
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
            text_file: default_text_file(),
            public_host: default_public_host(),
            send_timeout_ms: default_send_timeout_ms(),
            presence_interval_secs: default_presence_interval_secs(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    EnvError(envy::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::EnvError(e) => write!(f, "Environment variable error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    1133
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_text_file() -> PathBuf {
    PathBuf::from("shared_text.txt")
}

fn default_public_host() -> String {
    "localhost".to_string()
}

fn default_send_timeout_ms() -> u64 {
    5_000
}

fn default_presence_interval_secs() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.server_address(), "0.0.0.0:1133");
        assert_eq!(config.text_file, PathBuf::from("shared_text.txt"));
        assert_eq!(config.websocket_url(), "ws://localhost:1133/ws");
        assert_eq!(config.api_docs_url(), "http://localhost:1133/docs");
        assert_eq!(config.send_timeout(), Duration::from_secs(5));
        assert_eq!(config.presence_interval(), Some(Duration::from_secs(30)));
        assert_eq!(config.environment, "development");
    }

    #[test]
    fn zero_presence_interval_disables_ticker() {
        let config = Config { presence_interval_secs: 0, ..Config::default() };
        assert_eq!(config.presence_interval(), None);
    }

    #[test]
    fn cors_origins_are_split_and_trimmed() {
        let config = Config {
            cors_origins: Some("http://a.test, http://b.test,,".to_string()),
            ..Config::default()
        };
        assert_eq!(config.cors_origin_list(), vec!["http://a.test", "http://b.test"]);
        assert!(Config::default().cors_origin_list().is_empty());
    }
}
