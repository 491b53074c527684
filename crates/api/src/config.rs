use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Context;
use reelhouse_core::audit::RETENTION_DAYS;
use reelhouse_core::pagination::{LimitBounds, PaginationLimits, DEFAULT_LIMIT, MAX_LIMIT};

use crate::auth::jwt::JwtConfig;

/// Default upload body limit: 5 MiB.
pub const DEFAULT_UPLOAD_MAX_BYTES: usize = 5 * 1024 * 1024;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
    /// Page size bounds shared by every list endpoint.
    pub pagination: PaginationLimits,
    /// Root directory for uploaded posters and avatars.
    pub upload_dir: PathBuf,
    /// Largest accepted request body, in bytes.
    pub upload_max_bytes: usize,
    /// History entries older than this many days are purged.
    pub audit_retention_days: i64,
}

fn env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        Err(_) => Ok(default),
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default                 |
    /// |----------------------------|-------------------------|
    /// | `HOST`                     | `0.0.0.0`               |
    /// | `PORT`                     | `3000`                  |
    /// | `CORS_ORIGINS`             | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`     | `30`                    |
    /// | `PAGINATION_MIN_LIMIT`     | `1`                     |
    /// | `PAGINATION_MAX_LIMIT`     | `50`                    |
    /// | `PAGINATION_DEFAULT_LIMIT` | `20`                    |
    /// | `UPLOAD_DIR`               | `storage/uploads`       |
    /// | `UPLOAD_MAX_BYTES`         | `5242880`               |
    /// | `AUDIT_RETENTION_DAYS`     | `180`                   |
    pub fn from_env() -> anyhow::Result<Self> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = env_or("PORT", 3000)?;

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = env_or("REQUEST_TIMEOUT_SECS", 30)?;

        let pagination = PaginationLimits {
            limit: LimitBounds {
                min: env_or("PAGINATION_MIN_LIMIT", 1)?,
                max: env_or("PAGINATION_MAX_LIMIT", MAX_LIMIT)?,
                default: env_or("PAGINATION_DEFAULT_LIMIT", DEFAULT_LIMIT)?,
            },
            start_default: 0,
        };

        let upload_dir =
            PathBuf::from(std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "storage/uploads".into()));
        let upload_max_bytes: usize = env_or("UPLOAD_MAX_BYTES", DEFAULT_UPLOAD_MAX_BYTES)?;
        let audit_retention_days: i64 = env_or("AUDIT_RETENTION_DAYS", RETENTION_DAYS)?;

        let jwt = JwtConfig::from_env()?;

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt,
            pagination,
            upload_dir,
            upload_max_bytes,
            audit_retention_days,
        })
    }
}
