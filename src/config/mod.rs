//! Configuration module for the site backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::errors::AppError;

/// Which table store backs the resource stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayKind {
    /// Local SQLite file
    Sqlite,
    /// Hosted PostgREST-style table service
    Rest,
}

impl GatewayKind {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Some(GatewayKind::Sqlite),
            "rest" => Some(GatewayKind::Rest),
            _ => None,
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Table store backend
    pub gateway: GatewayKind,
    /// Path to SQLite database file (sqlite gateway)
    pub db_path: PathBuf,
    /// Base URL of the hosted table service (rest gateway)
    pub rest_url: Option<String>,
    /// API key of the hosted table service (rest gateway)
    pub rest_key: Option<String>,
    /// Path to the local key/value state file
    pub local_state_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let gateway_raw = env::var("UBG_GATEWAY").unwrap_or_else(|_| "sqlite".to_string());
        let gateway = GatewayKind::from_str(&gateway_raw).ok_or_else(|| {
            AppError::BadRequest(format!("Invalid UBG_GATEWAY value: {}", gateway_raw))
        })?;

        let db_path = env::var("UBG_DB_PATH")
            .unwrap_or_else(|_| "./data/site.sqlite".to_string())
            .into();

        let rest_url = env::var("UBG_REST_URL").ok();
        let rest_key = env::var("UBG_REST_KEY").ok();

        if gateway == GatewayKind::Rest && (rest_url.is_none() || rest_key.is_none()) {
            return Err(AppError::BadRequest(
                "UBG_REST_URL and UBG_REST_KEY are required when UBG_GATEWAY=rest".to_string(),
            ));
        }

        let local_state_path = env::var("UBG_LOCAL_STATE_PATH")
            .unwrap_or_else(|_| "./data/local-state.json".to_string())
            .into();

        let bind_raw = env::var("UBG_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let bind_addr = bind_raw
            .parse()
            .map_err(|_| AppError::BadRequest(format!("Invalid UBG_BIND_ADDR format: {}", bind_raw)))?;

        let log_level = env::var("UBG_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            gateway,
            db_path,
            rest_url,
            rest_key,
            local_state_path,
            bind_addr,
            log_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Both cases touch the same variables, so they run in one test.
    #[test]
    fn test_config_from_env() {
        for var in [
            "UBG_GATEWAY",
            "UBG_DB_PATH",
            "UBG_REST_URL",
            "UBG_REST_KEY",
            "UBG_LOCAL_STATE_PATH",
            "UBG_BIND_ADDR",
            "UBG_LOG_LEVEL",
        ] {
            env::remove_var(var);
        }

        let config = Config::from_env().unwrap();

        assert_eq!(config.gateway, GatewayKind::Sqlite);
        assert_eq!(config.db_path, PathBuf::from("./data/site.sqlite"));
        assert_eq!(
            config.local_state_path,
            PathBuf::from("./data/local-state.json")
        );
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "info");
        assert!(config.rest_url.is_none());

        env::set_var("UBG_GATEWAY", "rest");
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        env::remove_var("UBG_GATEWAY");
    }

    #[test]
    fn test_gateway_kind_parsing() {
        assert_eq!(GatewayKind::from_str("SQLite"), Some(GatewayKind::Sqlite));
        assert_eq!(GatewayKind::from_str(" rest "), Some(GatewayKind::Rest));
        assert_eq!(GatewayKind::from_str("postgres"), None);
    }
}
