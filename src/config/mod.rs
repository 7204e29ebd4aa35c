use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while assembling configuration at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid backend URL: {0}")]
    InvalidBackendUrl(String),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub backend: BackendConfig,
    pub server: ServerConfig,
    pub session: SessionConfig,
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

/// Hosted backend (data API + auth API) coordinates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub url: String,
    #[serde(skip_serializing)]
    pub anon_key: String,
    /// No timeout is applied unless one is configured
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub static_dir: PathBuf,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub secure_cookie: bool,
    /// Used when the token carries no usable expiry
    pub default_max_age_secs: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    pub recent_naps_limit: u32,
    pub catalog_path: Option<PathBuf>,
}

impl AppConfig {
    /// Build configuration from the process environment.
    ///
    /// The backend URL and public key are required; everything else falls
    /// back to the preset selected by `APP_ENV`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        let backend = BackendConfig::from_lookup(&lookup)?;

        let preset = match environment {
            Environment::Production => Self::production(backend),
            Environment::Staging => Self::staging(backend),
            Environment::Development => Self::development(backend),
        };

        preset.with_overrides(&lookup)
    }

    fn with_overrides<F>(mut self, lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server overrides
        if let Some(v) = lookup("BABYZOOM_PORT").or_else(|| lookup("PORT")) {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Some(v) = lookup("BABYZOOM_STATIC_DIR") {
            self.server.static_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("API_ENABLE_REQUEST_LOGGING") {
            self.server.enable_request_logging = v.parse().unwrap_or(self.server.enable_request_logging);
        }

        // Session overrides
        if let Some(v) = lookup("SESSION_COOKIE_NAME") {
            if !v.trim().is_empty() {
                self.session.cookie_name = v.trim().to_string();
            }
        }
        if let Some(v) = lookup("SESSION_COOKIE_SECURE") {
            self.session.secure_cookie = v.parse().unwrap_or(self.session.secure_cookie);
        }
        if let Some(v) = lookup("SESSION_DEFAULT_MAX_AGE_SECS") {
            self.session.default_max_age_secs = v.parse().unwrap_or(self.session.default_max_age_secs);
        }

        // Dashboard overrides
        if let Some(v) = lookup("RECENT_NAPS_LIMIT") {
            self.dashboard.recent_naps_limit = match v.trim().parse::<u32>() {
                Ok(limit) if limit >= 1 => limit,
                _ => return Err(ConfigError::Invalid { key: "RECENT_NAPS_LIMIT", value: v }),
            };
        }
        if let Some(v) = lookup("BABYZOOM_CATALOG_PATH") {
            self.dashboard.catalog_path = Some(PathBuf::from(v));
        }

        // Backend overrides
        if let Some(v) = lookup("BACKEND_TIMEOUT_SECS") {
            self.backend.timeout_secs = v.parse().ok();
        }

        Ok(self)
    }

    fn development(backend: BackendConfig) -> Self {
        Self {
            environment: Environment::Development,
            backend,
            server: ServerConfig {
                port: 3000,
                static_dir: PathBuf::from("static"),
                enable_request_logging: true,
            },
            session: SessionConfig {
                cookie_name: "sb-access-token".to_string(),
                secure_cookie: false,
                default_max_age_secs: 60 * 60,
            },
            dashboard: DashboardConfig {
                recent_naps_limit: 5,
                catalog_path: None,
            },
        }
    }

    fn staging(backend: BackendConfig) -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                port: 8080,
                ..Self::development(backend.clone()).server
            },
            session: SessionConfig {
                secure_cookie: true,
                ..Self::development(backend.clone()).session
            },
            ..Self::development(backend)
        }
    }

    fn production(backend: BackendConfig) -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                port: 8080,
                static_dir: PathBuf::from("static"),
                enable_request_logging: false,
            },
            session: SessionConfig {
                cookie_name: "sb-access-token".to_string(),
                secure_cookie: true,
                default_max_age_secs: 60 * 60,
            },
            ..Self::development(backend)
        }
    }

    pub fn is_development(&self) -> bool {
        matches!(self.environment, Environment::Development)
    }
}

impl BackendConfig {
    fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup("SUPABASE_URL")
            .or_else(|| lookup("NEXT_PUBLIC_SUPABASE_URL"))
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("SUPABASE_URL"))?;

        let anon_key = lookup("SUPABASE_ANON_KEY")
            .or_else(|| lookup("NEXT_PUBLIC_SUPABASE_ANON_KEY"))
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("SUPABASE_ANON_KEY"))?;

        let url = url.trim().trim_end_matches('/').to_string();
        url::Url::parse(&url).map_err(|_| ConfigError::InvalidBackendUrl(url.clone()))?;

        Ok(Self {
            url,
            anon_key: anon_key.trim().to_string(),
            timeout_secs: None,
        })
    }
}
