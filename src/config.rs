//! Configuration management for the stored procedure MCP server.
//!
//! Configuration is loaded from environment variables following the 12-factor app pattern.

use crate::constants::{
    DEFAULT_APPLICATION_NAME, DEFAULT_CONNECTION_TIMEOUT, DEFAULT_CONNECTION_TIMEOUT_SECS,
    DEFAULT_IDLE_TIMEOUT, DEFAULT_IDLE_TIMEOUT_SECS, DEFAULT_MAX_CONNECTIONS,
    DEFAULT_MIN_CONNECTIONS, DEFAULT_PORT,
};
use crate::error::ServerError;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection configuration
    pub database: DatabaseConfig,
}

/// Database connection configuration.
#[derive(Clone)]
pub struct DatabaseConfig {
    /// Where and how to connect
    pub target: ConnectionTarget,

    /// Connection pool configuration
    pub pool: PoolConfig,
}

/// Either a caller-supplied connection string or discrete settings.
#[derive(Clone)]
pub enum ConnectionTarget {
    /// ADO.NET-style connection string, used verbatim.
    ConnectionString(String),

    /// Settings assembled into a connection string.
    Server(ServerSettings),
}

/// Discrete connection settings.
#[derive(Clone)]
pub struct ServerSettings {
    /// SQL Server hostname or IP address
    pub host: String,

    /// SQL Server port (default: 1433)
    pub port: u16,

    /// Database name (server default when absent)
    pub database: Option<String>,

    /// SQL Server authentication credentials
    pub username: String,
    pub password: String,

    /// Enable TLS encryption
    pub encrypt: bool,

    /// Trust server certificate (for self-signed certs)
    pub trust_server_certificate: bool,

    /// Application name sent to SQL Server
    pub application_name: String,
}

/// Connection pool configuration.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Minimum number of connections in the pool
    pub min_connections: u32,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Connection timeout
    pub connection_timeout: Duration,

    /// Idle connection timeout
    pub idle_timeout: Duration,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// # Environment Variables
    ///
    /// ## Connection (one of)
    /// - `MSSQL_CONNECTION_STRING`: full connection string, used verbatim
    /// - `MSSQL_HOST` + `MSSQL_USER` + `MSSQL_PASSWORD`
    ///
    /// ## Optional
    /// - `MSSQL_PORT`: Port number (default: 1433)
    /// - `MSSQL_DATABASE`: Database name
    /// - `MSSQL_ENCRYPT`: Enable TLS (default: true)
    /// - `MSSQL_TRUST_CERT`: Trust server certificate (default: false)
    /// - `MSSQL_POOL_MIN`: Minimum pool connections (default: 1)
    /// - `MSSQL_POOL_MAX`: Maximum pool connections (default: 10)
    /// - `MSSQL_CONNECT_TIMEOUT`: Connection timeout in seconds (default: 30)
    /// - `MSSQL_IDLE_TIMEOUT`: Idle connection timeout in seconds (default: 300)
    pub fn from_env() -> Result<Self, ServerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an explicit variable map.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ServerError> {
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ServerError> {
        let target = match get("MSSQL_CONNECTION_STRING").filter(|s| !s.trim().is_empty()) {
            Some(connection_string) => ConnectionTarget::ConnectionString(connection_string),
            None => ConnectionTarget::Server(ServerSettings::from_lookup(&get)?),
        };

        let min_connections = parse_or(&get, "MSSQL_POOL_MIN", DEFAULT_MIN_CONNECTIONS);
        let max_connections = parse_or(&get, "MSSQL_POOL_MAX", DEFAULT_MAX_CONNECTIONS);
        if min_connections > max_connections {
            return Err(ServerError::config(format!(
                "MSSQL_POOL_MIN ({}) cannot exceed MSSQL_POOL_MAX ({})",
                min_connections, max_connections
            )));
        }

        let connection_timeout_secs = parse_or(
            &get,
            "MSSQL_CONNECT_TIMEOUT",
            DEFAULT_CONNECTION_TIMEOUT_SECS,
        );
        let idle_timeout_secs = parse_or(&get, "MSSQL_IDLE_TIMEOUT", DEFAULT_IDLE_TIMEOUT_SECS);

        Ok(Config {
            database: DatabaseConfig {
                target,
                pool: PoolConfig {
                    min_connections,
                    max_connections,
                    connection_timeout: Duration::from_secs(connection_timeout_secs),
                    idle_timeout: Duration::from_secs(idle_timeout_secs),
                },
            },
        })
    }
}

impl ServerSettings {
    fn from_lookup(get: &impl Fn(&str) -> Option<String>) -> Result<Self, ServerError> {
        let host = get("MSSQL_HOST").ok_or_else(|| {
            ServerError::config("MSSQL_HOST or MSSQL_CONNECTION_STRING environment variable is required")
        })?;

        let (username, password) = match (get("MSSQL_USER"), get("MSSQL_PASSWORD")) {
            (Some(u), Some(p)) => (u, p),
            (Some(_), None) => {
                return Err(ServerError::config(
                    "MSSQL_PASSWORD is required when MSSQL_USER is set",
                ))
            }
            (None, Some(_)) => {
                return Err(ServerError::config(
                    "MSSQL_USER is required when MSSQL_PASSWORD is set",
                ))
            }
            (None, None) => {
                return Err(ServerError::config(
                    "Authentication required: set MSSQL_USER and MSSQL_PASSWORD",
                ))
            }
        };

        Ok(Self {
            host,
            port: parse_or(get, "MSSQL_PORT", DEFAULT_PORT),
            database: get("MSSQL_DATABASE").filter(|d| !d.trim().is_empty()),
            username,
            password,
            encrypt: get("MSSQL_ENCRYPT").map(|v| is_truthy(&v)).unwrap_or(true),
            trust_server_certificate: get("MSSQL_TRUST_CERT")
                .map(|v| is_truthy(&v))
                .unwrap_or(false),
            application_name: DEFAULT_APPLICATION_NAME.to_string(),
        })
    }

    fn connection_string(&self, password: &str) -> String {
        let mut parts = vec![
            format!("Server=tcp:{},{}", self.host, self.port),
            format!("User Id={}", quote_value(&self.username)),
            format!("Password={}", password),
        ];
        if let Some(ref database) = self.database {
            parts.push(format!("Database={}", quote_value(database)));
        }
        parts.push(format!("Encrypt={}", self.encrypt));
        parts.push(format!(
            "TrustServerCertificate={}",
            self.trust_server_certificate
        ));
        parts.push(format!("Application Name={}", self.application_name));
        parts.join(";")
    }
}

impl DatabaseConfig {
    /// The connection string handed to the driver.
    pub fn connection_string(&self) -> String {
        match &self.target {
            ConnectionTarget::ConnectionString(s) => s.clone(),
            ConnectionTarget::Server(settings) => {
                settings.connection_string(&quote_value(&settings.password))
            }
        }
    }

    /// A short description of the server for log lines; never contains secrets.
    pub fn server_label(&self) -> String {
        match &self.target {
            ConnectionTarget::ConnectionString(_) => "server from MSSQL_CONNECTION_STRING".to_string(),
            ConnectionTarget::Server(s) => format!("{}:{}", s.host, s.port),
        }
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let target = match &self.target {
            ConnectionTarget::ConnectionString(_) => "<connection string>".to_string(),
            ConnectionTarget::Server(s) => s.connection_string("***"),
        };
        f.debug_struct("DatabaseConfig")
            .field("target", &target)
            .field("pool", &self.pool)
            .finish()
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            min_connections: DEFAULT_MIN_CONNECTIONS,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            connection_timeout: DEFAULT_CONNECTION_TIMEOUT,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }
}

fn parse_or<T: std::str::FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    get(key).and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

fn is_truthy(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value == "1"
}

/// Brace-quote a connection string value containing `;`, `=` or braces.
fn quote_value(value: &str) -> String {
    if value.contains([';', '=', '{', '}']) || value.trim() != value {
        format!("{{{}}}", value.replace('}', "}}"))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_pool_config_defaults() {
        let config = PoolConfig::default();
        assert_eq!(config.min_connections, 1);
        assert_eq!(config.max_connections, 10);
    }

    #[test]
    fn test_connection_string_is_used_verbatim() {
        let cs = "Server=tcp:db.example.com,1433;Database=app;User Id=sa;Password=x";
        let config = Config::from_vars(&vars(&[("MSSQL_CONNECTION_STRING", cs)])).unwrap();
        assert_eq!(config.database.connection_string(), cs);
    }

    #[test]
    fn test_discrete_settings() {
        let config = Config::from_vars(&vars(&[
            ("MSSQL_HOST", "localhost"),
            ("MSSQL_PORT", "14333"),
            ("MSSQL_DATABASE", "sales"),
            ("MSSQL_USER", "sa"),
            ("MSSQL_PASSWORD", "p;w"),
            ("MSSQL_TRUST_CERT", "1"),
            ("MSSQL_POOL_MAX", "4"),
        ]))
        .unwrap();

        let cs = config.database.connection_string();
        assert!(cs.starts_with("Server=tcp:localhost,14333;"));
        assert!(cs.contains("Password={p;w}"));
        assert!(cs.contains("Database=sales"));
        assert!(cs.contains("Encrypt=true"));
        assert!(cs.contains("TrustServerCertificate=true"));
        assert_eq!(config.database.pool.max_connections, 4);
        assert_eq!(config.database.server_label(), "localhost:14333");
    }

    #[test]
    fn test_missing_host_is_an_error() {
        let err = Config::from_vars(&vars(&[("MSSQL_USER", "sa")])).unwrap_err();
        assert!(err.to_string().contains("MSSQL_HOST"));
    }

    #[test]
    fn test_credentials_must_be_paired() {
        let err = Config::from_vars(&vars(&[("MSSQL_HOST", "h"), ("MSSQL_USER", "sa")]))
            .unwrap_err();
        assert!(err.to_string().contains("MSSQL_PASSWORD"));
    }

    #[test]
    fn test_pool_bounds_are_checked() {
        let err = Config::from_vars(&vars(&[
            ("MSSQL_CONNECTION_STRING", "Server=x"),
            ("MSSQL_POOL_MIN", "5"),
            ("MSSQL_POOL_MAX", "2"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("MSSQL_POOL_MIN"));
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = Config::from_vars(&vars(&[
            ("MSSQL_HOST", "h"),
            ("MSSQL_USER", "sa"),
            ("MSSQL_PASSWORD", "hunter2"),
        ]))
        .unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("Password=***"));
    }
}
