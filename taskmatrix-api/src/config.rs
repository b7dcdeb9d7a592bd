//! Configuration management for the API server
//!
//! This module loads configuration from environment variables and provides
//! a type-safe configuration struct.
//!
//! # Environment Variables
//!
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `DATABASE_MAX_CONNECTIONS`: pool size (default: 10)
//! - `API_HOST`: Host to bind to (default: 0.0.0.0)
//! - `API_PORT`: Port to bind to (default: 8000)
//! - `HASH_SECRET`: key for the password digest, at least 16 characters (required)
//! - `SESSION_TTL_SECONDS`: session lifetime (default: 86400)
//! - `SESSION_MAX_ENTRIES`: maximum live sessions (default: 10000)
//! - `REQUEST_TIMEOUT_SECONDS`: deadline for store calls made by one request (default: 10)
//! - `RATE_LIMIT_PER_MINUTE`: per-client request budget (default: 100)
//! - `CORS_ORIGINS`: comma-separated origins, `*` for any (default: *)
//! - `ENVIRONMENT`: `production` enables HSTS and skips `.env` loading
//! - `LOG_FORMAT`: `pretty` or `json` (default: pretty)
//!
//! # Example
//!
//! ```no_run
//! use taskmatrix_api::config::Config;
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! println!("Server will listen on {}", config.bind_address());
//! # Ok(())
//! # }
//! ```

use std::env;
use std::fmt;
use std::time::Duration;

use anyhow::Context;
use taskmatrix_shared::auth::digest::MIN_KEY_LEN;
use taskmatrix_shared::auth::session::SessionConfig;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Digest and session configuration
    pub auth: AuthConfig,

    /// Log output format
    pub log_format: LogFormat,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// Allowed CORS origins; `*` means any
    pub cors_origins: Vec<String>,

    /// Production mode (HSTS on)
    pub production: bool,

    /// Deadline for the store calls of a single request
    pub request_timeout_seconds: u64,

    /// Requests allowed per client per minute
    pub rate_limit_per_minute: u32,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// Digest key and session bounds
#[derive(Clone)]
pub struct AuthConfig {
    /// Key for the password digest; never logged
    pub hash_secret: String,

    pub session_ttl_seconds: u64,
    pub session_max_entries: usize,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("hash_secret", &"<redacted>")
            .field("session_ttl_seconds", &self.session_ttl_seconds)
            .field("session_max_entries", &self.session_max_entries)
            .finish()
    }
}

impl AuthConfig {
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            ttl: Duration::from_secs(self.session_ttl_seconds),
            max_entries: self.session_max_entries,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// Outside production a `.env` file is loaded first, if present.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing
    /// - Environment variables have invalid values
    pub fn from_env() -> anyhow::Result<Self> {
        let production = is_production(env::var("ENVIRONMENT").ok().as_deref());
        if !production {
            dotenvy::dotenv().ok();
        }

        Self::from_vars(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source
    pub fn from_vars<F>(var: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = var("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or(&var, "API_PORT", 8000u16)?;

        let database_url = var("DATABASE_URL")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;
        let max_connections = parse_or(&var, "DATABASE_MAX_CONNECTIONS", 10u32)?;

        let hash_secret = var("HASH_SECRET")
            .ok_or_else(|| anyhow::anyhow!("HASH_SECRET environment variable is required"))?;
        if hash_secret.len() < MIN_KEY_LEN {
            anyhow::bail!("HASH_SECRET must be at least {} characters long", MIN_KEY_LEN);
        }

        let session_ttl_seconds = parse_or(&var, "SESSION_TTL_SECONDS", 86_400u64)?;
        let session_max_entries = parse_or(&var, "SESSION_MAX_ENTRIES", 10_000usize)?;
        if session_max_entries == 0 {
            anyhow::bail!("SESSION_MAX_ENTRIES must be greater than zero");
        }

        let request_timeout_seconds = parse_or(&var, "REQUEST_TIMEOUT_SECONDS", 10u64)?;
        if request_timeout_seconds == 0 {
            anyhow::bail!("REQUEST_TIMEOUT_SECONDS must be greater than zero");
        }

        let rate_limit_per_minute = parse_or(&var, "RATE_LIMIT_PER_MINUTE", 100u32)?;
        if rate_limit_per_minute == 0 {
            anyhow::bail!("RATE_LIMIT_PER_MINUTE must be greater than zero");
        }

        let cors_origins = var("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();

        let log_format = match var("LOG_FORMAT").as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => anyhow::bail!("LOG_FORMAT must be 'pretty' or 'json', got '{}'", other),
        };

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                cors_origins,
                production: is_production(var("ENVIRONMENT").as_deref()),
                request_timeout_seconds,
                rate_limit_per_minute,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            auth: AuthConfig {
                hash_secret,
                session_ttl_seconds,
                session_max_entries,
            },
            log_format,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.request_timeout_seconds)
    }
}

fn is_production(environment: Option<&str>) -> bool {
    matches!(environment, Some(e) if e.eq_ignore_ascii_case("production"))
}

fn parse_or<F, T>(var: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{} has an invalid value: '{}'", key, raw)),
        None => Ok(default),
    }
}
