//! Runtime configuration from the environment (and `.env`, when present).

use crate::error::{UnionError, Result};
use std::path::PathBuf;

pub const DEFAULT_SCHEMA: &str = "public";
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_url: Option<String>,
    pub schema: String,
    pub data_dir: PathBuf,
    pub max_connections: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            schema: DEFAULT_SCHEMA.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl Config {
    /// Load `.env` (if any) and read configuration from the process environment
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset or blank keys take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let max_connections = match get("UNIONABLE_MAX_CONNECTIONS") {
            Some(raw) => raw.trim().parse::<u32>().map_err(|_| {
                UnionError::Config(format!(
                    "UNIONABLE_MAX_CONNECTIONS must be a positive integer, got '{}'",
                    raw
                ))
            })?,
            None => defaults.max_connections,
        };
        if max_connections == 0 {
            return Err(UnionError::Config(
                "UNIONABLE_MAX_CONNECTIONS must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            database_url: get("DATABASE_URL"),
            schema: get("UNIONABLE_SCHEMA").unwrap_or(defaults.schema),
            data_dir: get("UNIONABLE_DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir),
            max_connections,
        })
    }

    /// The database URL, or a configuration error naming the variable
    pub fn require_database_url(&self) -> Result<&str> {
        self.database_url
            .as_deref()
            .ok_or_else(|| UnionError::Config("DATABASE_URL must be set".to_string()))
    }
}
