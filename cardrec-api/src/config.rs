//! Server configuration from environment variables

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration for the API server
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// CSV file holding the card corpus
    pub corpus_path: PathBuf,
    /// SQLite file caching card and category embeddings
    pub embedding_db_path: PathBuf,
    pub embedding_model: String,
    pub embedding_dimension: usize,
    pub chat_model: String,
    /// Bound on each language model call
    pub generation_timeout: Duration,
    /// Used when a request omits `top_n`
    pub default_top_n: i64,
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            corpus_path: PathBuf::from("data/cards.csv"),
            embedding_db_path: PathBuf::from("data/embeddings.db"),
            embedding_model: "text-embedding-3-small".to_string(),
            embedding_dimension: 1536,
            chat_model: "gpt-4o-mini".to_string(),
            generation_timeout: Duration::from_secs(60),
            default_top_n: 5,
            port: 8080,
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment
    ///
    /// Unset variables fall back to defaults; set but unparsable numbers are
    /// errors.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, which returns a variable's value if set
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let parse_number = |key: &str| -> Result<Option<u64>, ConfigError> {
            lookup(key)
                .map(|value| {
                    value.trim().parse::<u64>().map_err(|_| ConfigError::InvalidNumber {
                        field: key.to_string(),
                        value,
                    })
                })
                .transpose()
        };

        let default_top_n = match parse_number("DEFAULT_TOP_N")? {
            Some(0) => {
                return Err(ConfigError::InvalidNumber {
                    field: "DEFAULT_TOP_N".to_string(),
                    value: "0".to_string(),
                })
            }
            Some(n) => i64::try_from(n).unwrap_or(i64::MAX),
            None => defaults.default_top_n,
        };

        let port = match parse_number("SERVER_PORT")? {
            Some(p) => u16::try_from(p).map_err(|_| ConfigError::InvalidNumber {
                field: "SERVER_PORT".to_string(),
                value: p.to_string(),
            })?,
            None => defaults.port,
        };

        Ok(Self {
            corpus_path: lookup("CARD_CORPUS_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.corpus_path),
            embedding_db_path: lookup("EMBEDDING_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.embedding_db_path),
            embedding_model: lookup("EMBEDDING_MODEL").unwrap_or(defaults.embedding_model),
            embedding_dimension: parse_number("EMBEDDING_DIMENSION")?
                .map(|d| d as usize)
                .unwrap_or(defaults.embedding_dimension),
            chat_model: lookup("CHAT_MODEL").unwrap_or(defaults.chat_model),
            generation_timeout: parse_number("GENERATION_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.generation_timeout),
            default_top_n,
            port,
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid number in {field}: {value}")]
    InvalidNumber { field: String, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("CARD_CORPUS_PATH", "/srv/cards.csv"),
            ("EMBEDDING_MODEL", "text-embedding-3-large"),
            ("EMBEDDING_DIMENSION", "3072"),
            ("GENERATION_TIMEOUT_SECS", "15"),
            ("DEFAULT_TOP_N", "3"),
            ("SERVER_PORT", "3001"),
        ]))
        .unwrap();

        assert_eq!(config.corpus_path, PathBuf::from("/srv/cards.csv"));
        assert_eq!(config.embedding_model, "text-embedding-3-large");
        assert_eq!(config.embedding_dimension, 3072);
        assert_eq!(config.generation_timeout, Duration::from_secs(15));
        assert_eq!(config.default_top_n, 3);
        assert_eq!(config.port, 3001);
    }

    #[test]
    fn test_invalid_numbers() {
        assert!(AppConfig::from_lookup(lookup(&[("SERVER_PORT", "eighty")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("SERVER_PORT", "70000")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("DEFAULT_TOP_N", "0")])).is_err());
    }
}
