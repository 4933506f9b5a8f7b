use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use thiserror::Error;

use crate::gate::RouteTable;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub security: SecurityConfig,
    pub backend: BackendConfig,
    pub routes: RoutesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub session_cookie: String,
    pub session_expiry_hours: u64,
    pub secure_cookies: bool,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoutesConfig {
    /// YAML route tables replacing the built-in defaults
    pub file: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid route table YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid route table: {0}")]
    InvalidRouteTable(String),

    #[error("invalid matcher pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("HIIMART_BIND_HOST") {
            self.server.bind_host = v;
        }
        if let Some(port) = env::var("HIIMART_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.server.port = port;
        }

        // Security overrides
        if let Ok(v) = env::var("AUTH_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SESSION_COOKIE_NAME") {
            if !v.trim().is_empty() {
                self.security.session_cookie = v.trim().to_string();
            }
        }
        if let Ok(v) = env::var("SESSION_EXPIRY_HOURS") {
            self.security.session_expiry_hours = v.parse().unwrap_or(self.security.session_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_SECURE_COOKIES") {
            self.security.secure_cookies = v.parse().unwrap_or(self.security.secure_cookies);
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        // Backend overrides
        if let Ok(v) = env::var("BACKEND_URL") {
            self.backend.base_url = v;
        }
        if let Ok(v) = env::var("BACKEND_TIMEOUT_SECS") {
            self.backend.timeout_secs = v.parse().unwrap_or(self.backend.timeout_secs);
        }

        // Route table override
        if let Ok(v) = env::var("GATE_ROUTES_FILE") {
            if !v.trim().is_empty() {
                self.routes.file = Some(PathBuf::from(v.trim()));
            }
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                bind_host: "127.0.0.1".to_string(),
                port: 3000,
            },
            security: SecurityConfig {
                jwt_secret: "hiimart-development-secret".to_string(),
                session_cookie: "hiimart.session-token".to_string(),
                session_expiry_hours: 24 * 7, // 1 week
                secure_cookies: false,
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:8080".to_string()],
            },
            backend: BackendConfig {
                base_url: "http://localhost:8080".to_string(),
                timeout_secs: 30,
            },
            routes: RoutesConfig::default(),
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                bind_host: "0.0.0.0".to_string(),
                port: 3000,
            },
            security: SecurityConfig {
                // Must come from AUTH_SECRET outside development
                jwt_secret: String::new(),
                session_cookie: "__Secure-hiimart.session-token".to_string(),
                session_expiry_hours: 24,
                secure_cookies: true,
                enable_cors: true,
                cors_origins: vec!["https://staging.hiimart.example".to_string()],
            },
            backend: BackendConfig {
                base_url: "https://api.staging.hiimart.example".to_string(),
                timeout_secs: 10,
            },
            routes: RoutesConfig::default(),
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                bind_host: "0.0.0.0".to_string(),
                port: 3000,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                session_cookie: "__Secure-hiimart.session-token".to_string(),
                session_expiry_hours: 24,
                secure_cookies: true,
                enable_cors: true,
                cors_origins: vec!["https://hiimart.example".to_string()],
            },
            backend: BackendConfig {
                base_url: "https://api.hiimart.example".to_string(),
                timeout_secs: 5,
            },
            routes: RoutesConfig::default(),
        }
    }

    /// Route tables in effect: the configured YAML file, or the defaults.
    pub fn route_table(&self) -> Result<RouteTable, ConfigError> {
        match &self.routes.file {
            Some(path) => RouteTable::load(path),
            None => Ok(RouteTable::default()),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.bind_host, self.server.port)
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_production {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Production)
    };
}
