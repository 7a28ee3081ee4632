//! Configuration for the server binary.
//!
//! All configuration is loaded from environment variables. Only the
//! database URL is required; everything else has a default.

use std::time::Duration;

use agentdesk_api::ServerConfig;
use agentdesk_db::PostgresConfig;

use crate::error::AppError;

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Complete server configuration loaded from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `PostgreSQL` connection URL.
    pub database_url: String,
    /// Bind host (e.g. `0.0.0.0`).
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Maximum pooled database connections.
    pub db_max_connections: u32,
    /// Time allowed to acquire a database connection.
    pub db_connect_timeout: Duration,
    /// Whether `GET /ws/chat` is served.
    pub chat_ws_enabled: bool,
    /// Log output format.
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Required variables:
    /// - `DATABASE_URL` -- `PostgreSQL` connection string
    ///
    /// Optional variables:
    /// - `HOST` -- bind address (default `0.0.0.0`)
    /// - `PORT` -- bind port (default `3000`)
    /// - `DB_MAX_CONNECTIONS` -- pool size (default 10)
    /// - `DB_CONNECT_TIMEOUT_SECS` -- acquire timeout (default 5)
    /// - `CHAT_WS_ENABLED` -- serve the chat `WebSocket` (default `true`)
    /// - `LOG_FORMAT` -- `pretty` or `json` (default `pretty`)
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.is_empty())
            .ok_or_else(|| AppError::Config(String::from("missing required env var DATABASE_URL")))?;

        let host = lookup("HOST").unwrap_or_else(|| String::from("0.0.0.0"));
        let port: u16 = parse_var(&lookup, "PORT", "3000")?;
        let db_max_connections: u32 = parse_var(&lookup, "DB_MAX_CONNECTIONS", "10")?;
        let db_connect_timeout_secs: u64 = parse_var(&lookup, "DB_CONNECT_TIMEOUT_SECS", "5")?;
        let chat_ws_enabled: bool = parse_var(&lookup, "CHAT_WS_ENABLED", "true")?;

        let log_format = match lookup("LOG_FORMAT").as_deref() {
            None | Some("" | "pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(AppError::Config(format!(
                    "invalid LOG_FORMAT: {other} (expected pretty or json)"
                )));
            }
        };

        Ok(Self {
            database_url,
            host,
            port,
            db_max_connections,
            db_connect_timeout: Duration::from_secs(db_connect_timeout_secs),
            chat_ws_enabled,
            log_format,
        })
    }

    /// Database pool settings.
    pub fn postgres(&self) -> PostgresConfig {
        PostgresConfig::new(&self.database_url)
            .with_max_connections(self.db_max_connections)
            .with_connect_timeout(self.db_connect_timeout)
    }

    /// HTTP listener settings.
    pub fn server(&self) -> ServerConfig {
        ServerConfig {
            host: self.host.clone(),
            port: self.port,
        }
    }
}

/// Read and parse an optional variable, falling back to `default`.
fn parse_var<F, T>(lookup: &F, name: &str, default: &str) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    lookup(name)
        .unwrap_or_else(|| default.to_owned())
        .parse()
        .map_err(|e| AppError::Config(format!("invalid {name}: {e}")))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, AppError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        AppConfig::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn defaults_with_only_database_url() {
        let config = load(&[("DATABASE_URL", "postgresql://localhost/agentdesk")]).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.db_max_connections, 10);
        assert_eq!(config.db_connect_timeout, Duration::from_secs(5));
        assert!(config.chat_ws_enabled);
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn database_url_is_required() {
        assert!(matches!(load(&[]), Err(AppError::Config(_))));
        assert!(matches!(load(&[("DATABASE_URL", "")]), Err(AppError::Config(_))));
    }

    #[test]
    fn overrides_are_parsed() {
        let config = load(&[
            ("DATABASE_URL", "postgresql://db/agentdesk"),
            ("HOST", "127.0.0.1"),
            ("PORT", "8081"),
            ("DB_MAX_CONNECTIONS", "25"),
            ("DB_CONNECT_TIMEOUT_SECS", "2"),
            ("CHAT_WS_ENABLED", "false"),
            ("LOG_FORMAT", "json"),
        ])
        .unwrap();

        assert_eq!(config.server().socket_addr().unwrap().to_string(), "127.0.0.1:8081");
        assert!(!config.chat_ws_enabled);
        assert_eq!(config.log_format, LogFormat::Json);

        let pg = config.postgres();
        assert_eq!(pg.url, "postgresql://db/agentdesk");
        assert_eq!(pg.max_connections, 25);
        assert_eq!(pg.connect_timeout, Duration::from_secs(2));
    }

    #[test]
    fn malformed_values_are_config_errors() {
        for (name, value) in [
            ("PORT", "http"),
            ("PORT", "70000"),
            ("DB_MAX_CONNECTIONS", "-1"),
            ("CHAT_WS_ENABLED", "yes"),
            ("LOG_FORMAT", "xml"),
        ] {
            let result = load(&[("DATABASE_URL", "postgresql://db/x"), (name, value)]);
            let err = result.unwrap_err();
            assert!(matches!(err, AppError::Config(_)), "{name}={value}");
            assert!(err.to_string().contains(name), "{err}");
        }
    }
}
