use std::path::PathBuf;

use crate::auth::jwt::JwtConfig;

/// A missing or malformed configuration value.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
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
    /// Time allowed for background tasks to drain after the listener closes.
    pub shutdown_timeout_secs: u64,
    /// Root directory for uploaded asset documents.
    pub document_storage_dir: PathBuf,
    /// Largest accepted document upload, in bytes.
    pub max_upload_bytes: usize,
    /// Public base URL used in outbound links.
    pub app_url: String,
    /// Apply migrations at startup (default: `true`).
    pub run_migrations: bool,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                    |
    /// |-------------------------|----------------------------|
    /// | `HOST`                  | `0.0.0.0`                  |
    /// | `PORT`                  | `3000`                     |
    /// | `CORS_ORIGINS`          | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `30`                       |
    /// | `DOCUMENT_STORAGE_DIR`  | `./storage/documents`      |
    /// | `MAX_UPLOAD_BYTES`      | `10485760` (10 MiB)        |
    /// | `APP_URL`               | `http://localhost:5173`    |
    /// | `RUN_MIGRATIONS`        | `true`                     |
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = parse_env("PORT", 3000u16)?;

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs: parse_env("REQUEST_TIMEOUT_SECS", 30u64)?,
            shutdown_timeout_secs: parse_env("SHUTDOWN_TIMEOUT_SECS", 30u64)?,
            document_storage_dir: std::env::var("DOCUMENT_STORAGE_DIR")
                .unwrap_or_else(|_| "./storage/documents".into())
                .into(),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 10 * 1024 * 1024usize)?,
            app_url: std::env::var("APP_URL").unwrap_or_else(|_| "http://localhost:5173".into()),
            run_migrations: parse_env("RUN_MIGRATIONS", true)?,
            jwt: JwtConfig::from_env()?,
        })
    }
}

/// Read and parse `name`, falling back to `default` when unset.
pub(crate) fn parse_env<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_env_falls_back_when_unset() {
        std::env::remove_var("ASSETDESK_TEST_UNSET");
        assert_eq!(parse_env("ASSETDESK_TEST_UNSET", 42u16).unwrap(), 42);
    }

    #[test]
    fn parse_env_rejects_garbage() {
        std::env::set_var("ASSETDESK_TEST_GARBAGE", "forty");
        let err = parse_env("ASSETDESK_TEST_GARBAGE", 1u16).unwrap_err();
        assert!(err.to_string().contains("ASSETDESK_TEST_GARBAGE"));
    }
}
