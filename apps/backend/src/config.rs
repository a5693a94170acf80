//! Environment-driven server configuration.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Server configuration.
///
/// Read from the environment (after loading `.env`):
/// - DATABASE_URL: SQLite URL, defaults to `sqlite://repertoire.db`
/// - HOST / PORT: listen address, defaults to `0.0.0.0:3000`
/// - SEED_OPENINGS: seed the built-in openings at startup, defaults to true
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub seed_openings: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| "sqlite://repertoire.db".to_string());
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let port = match lookup("PORT") {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid { name: "PORT", value })?,
            None => 3000,
        };

        let seed_openings = match lookup("SEED_OPENINGS") {
            Some(value) => parse_flag(&value).ok_or(ConfigError::Invalid {
                name: "SEED_OPENINGS",
                value,
            })?,
            None => true,
        };

        Ok(Self {
            database_url,
            host,
            port,
            seed_openings,
        })
    }

    /// Listen address in `host:port` form.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
