//! Configuration module for EMSA.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the backend, as consumed by the client
    pub api_url: String,
    /// Address the mock server binds to
    pub bind_addr: SocketAddr,
    /// Path of the durable session file (the localStorage analog)
    pub session_path: PathBuf,
    /// Interval between poll cycles
    pub poll_interval: Duration,
    /// Whether to seed the demo user and groups at startup
    pub seed_demo: bool,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let api_url = env::var("EMSA_API_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8000".to_string());

        let bind_addr = env::var("EMSA_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8000".to_string())
            .parse()
            .expect("Invalid EMSA_BIND_ADDR format");

        let session_path = env::var("EMSA_SESSION_PATH")
            .unwrap_or_else(|_| "./data/session.json".to_string())
            .into();

        let poll_interval = env::var("EMSA_POLL_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(10));

        let seed_demo = env::var("EMSA_SEED_DEMO")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let log_level = env::var("EMSA_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Self {
            api_url,
            bind_addr,
            session_path,
            poll_interval,
            seed_demo,
            log_level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        // Clear any existing env vars
        env::remove_var("EMSA_API_URL");
        env::remove_var("EMSA_BIND_ADDR");
        env::remove_var("EMSA_SESSION_PATH");
        env::remove_var("EMSA_POLL_INTERVAL_SECS");
        env::remove_var("EMSA_SEED_DEMO");
        env::remove_var("EMSA_LOG_LEVEL");

        let config = Config::from_env();

        assert_eq!(config.api_url, "http://127.0.0.1:8000");
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8000");
        assert_eq!(config.session_path, PathBuf::from("./data/session.json"));
        assert_eq!(config.poll_interval, Duration::from_secs(10));
        assert!(!config.seed_demo);
        assert_eq!(config.log_level, "info");
    }
}
