use std::collections::HashMap;
use std::env;
use std::time::Duration;

use thiserror::Error;

use crate::repository::dialect::Dialect;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DB_HOST: &str = "localhost";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{name} is not a valid number: {value}")]
    InvalidNumber { name: &'static str, value: String },

    #[error("unsupported database type: {0}")]
    UnsupportedDatabase(String),

    #[error("CORS_ORIGINS must contain at least one origin")]
    NoOrigins,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseKind {
    MySql,
    Postgres,
    Memory,
}

impl DatabaseKind {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mysql" => Ok(DatabaseKind::MySql),
            "postgres" | "postgresql" => Ok(DatabaseKind::Postgres),
            "memory" => Ok(DatabaseKind::Memory),
            _ => Err(ConfigError::UnsupportedDatabase(value.to_string())),
        }
    }

    pub fn dialect(&self) -> Option<Dialect> {
        match self {
            DatabaseKind::MySql => Some(Dialect::MySql),
            DatabaseKind::Postgres => Some(Dialect::Postgres),
            DatabaseKind::Memory => None,
        }
    }

    fn default_port(&self) -> u16 {
        match self {
            DatabaseKind::MySql => 3306,
            DatabaseKind::Postgres => 5432,
            DatabaseKind::Memory => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub dialect: Dialect,
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    /// `None` selects the in-memory backend.
    pub database: Option<DatabaseConfig>,
    pub cors_origins: Vec<String>,
    pub shutdown_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_map(vars: &HashMap<&str, &str>) -> Result<Self, ConfigError> {
        Self::from_lookup(|name| vars.get(name).map(|v| v.to_string()))
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values count as unset.
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let require = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let port = match get("PORT") {
            Some(value) => parse_number("PORT", &value)?,
            None => DEFAULT_PORT,
        };

        let kind = DatabaseKind::parse(&require("DB_TYPE")?)?;
        let database = match kind.dialect() {
            Some(dialect) => {
                let port = match get("DB_PORT") {
                    Some(value) => parse_number("DB_PORT", &value)?,
                    None => kind.default_port(),
                };
                let max_connections = match get("DB_MAX_CONNECTIONS") {
                    Some(value) => parse_number("DB_MAX_CONNECTIONS", &value)?,
                    None => DEFAULT_MAX_CONNECTIONS,
                };
                Some(DatabaseConfig {
                    dialect,
                    host: get("DB_HOST").unwrap_or_else(|| DEFAULT_DB_HOST.to_string()),
                    port,
                    name: require("DB_NAME")?,
                    user: require("DB_USER")?,
                    password: require("DB_PASSWORD")?,
                    max_connections,
                })
            }
            None => None,
        };

        let cors_origins: Vec<String> = require("CORS_ORIGINS")?
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();
        if cors_origins.is_empty() {
            return Err(ConfigError::NoOrigins);
        }

        let shutdown_timeout = match get("SHUTDOWN_TIMEOUT_SECS") {
            Some(value) => Duration::from_secs(parse_number("SHUTDOWN_TIMEOUT_SECS", &value)?),
            None => Duration::from_secs(DEFAULT_SHUTDOWN_TIMEOUT_SECS),
        };

        Ok(Config {
            port,
            database,
            cors_origins,
            shutdown_timeout,
        })
    }
}

fn parse_number<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        name,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mysql_vars() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("DB_TYPE", "mysql"),
            ("DB_NAME", "todo"),
            ("DB_USER", "app"),
            ("DB_PASSWORD", "secret"),
            ("CORS_ORIGINS", "http://localhost:3000, https://example.com"),
        ])
    }

    #[test]
    fn applies_defaults_for_mysql() {
        let config = Config::from_map(&mysql_vars()).unwrap();
        let database = config.database.unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(database.dialect, Dialect::MySql);
        assert_eq!(database.host, "localhost");
        assert_eq!(database.port, 3306);
        assert_eq!(database.max_connections, 5);
        assert_eq!(
            config.cors_origins,
            vec!["http://localhost:3000".to_string(), "https://example.com".to_string()]
        );
        assert_eq!(config.shutdown_timeout, Duration::from_secs(30));
    }

    #[test]
    fn postgres_aliases_and_default_port() {
        for name in ["postgres", "postgresql"] {
            let mut vars = mysql_vars();
            vars.insert("DB_TYPE", name);
            let database = Config::from_map(&vars).unwrap().database.unwrap();
            assert_eq!(database.dialect, Dialect::Postgres);
            assert_eq!(database.port, 5432);
        }
    }

    #[test]
    fn memory_backend_needs_no_credentials() {
        let vars = HashMap::from([("DB_TYPE", "memory"), ("CORS_ORIGINS", "*")]);
        let config = Config::from_map(&vars).unwrap();
        assert!(config.database.is_none());
        assert_eq!(config.cors_origins, vec!["*".to_string()]);
    }

    #[test]
    fn reports_missing_and_invalid_values() {
        let mut vars = mysql_vars();
        vars.remove("DB_PASSWORD");
        assert_eq!(Config::from_map(&vars), Err(ConfigError::Missing("DB_PASSWORD")));

        let mut vars = mysql_vars();
        vars.insert("PORT", "eighty");
        assert!(matches!(
            Config::from_map(&vars),
            Err(ConfigError::InvalidNumber { name: "PORT", .. })
        ));

        let mut vars = mysql_vars();
        vars.insert("DB_TYPE", "sqlite");
        assert_eq!(
            Config::from_map(&vars),
            Err(ConfigError::UnsupportedDatabase("sqlite".to_string()))
        );

        let mut vars = mysql_vars();
        vars.insert("CORS_ORIGINS", " , ");
        assert_eq!(Config::from_map(&vars), Err(ConfigError::NoOrigins));
    }
}
