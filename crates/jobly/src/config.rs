//! Database configuration.
//!
//! Two sources are supported:
//! - the environment (and a `.env` file, if present) via [`DatabaseConfig::from_env`]
//! - a TOML file via [`DatabaseConfig::load`]:
//!
//! ```toml
//! [database]
//! url = "postgres://${PGUSER}@localhost/jobly"
//! max_pool_size = 8
//! ```

use crate::error::{JoblyError, JoblyResult};
use serde::Deserialize;
use std::path::Path;

/// Default maximum number of pooled connections.
pub const DEFAULT_POOL_SIZE: usize = 16;

const SOCKET_DIR: &str = "/var/run/postgresql";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_pool_size")]
    pub max_pool_size: usize,
}

fn default_pool_size() -> usize {
    DEFAULT_POOL_SIZE
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    database: DatabaseConfig,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_pool_size: DEFAULT_POOL_SIZE,
        }
    }

    /// Resolve from the environment.
    ///
    /// `DATABASE_URL` wins. Otherwise `JOBLY_ENV=test` selects the `jobly_test`
    /// database and anything else `jobly`, both over the local Unix socket.
    /// `JOBLY_POOL_SIZE` overrides the pool size.
    pub fn from_env() -> JoblyResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> JoblyResult<Self> {
        let url = match lookup("DATABASE_URL").filter(|u| !u.is_empty()) {
            Some(url) => url,
            None => {
                let db = match lookup("JOBLY_ENV").as_deref() {
                    Some("test") => "jobly_test",
                    _ => "jobly",
                };
                format!("postgresql:///{db}?host={SOCKET_DIR}")
            }
        };

        let max_pool_size = match lookup("JOBLY_POOL_SIZE") {
            Some(raw) => parse_pool_size(&raw)?,
            None => DEFAULT_POOL_SIZE,
        };

        Ok(Self { url, max_pool_size })
    }

    /// Load the `[database]` table of a TOML config file.
    ///
    /// `${VAR}` references in the URL are expanded from the environment.
    pub fn load(path: impl AsRef<Path>) -> JoblyResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            JoblyError::Config(format!("failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&raw).map_err(|e| match e {
            JoblyError::Config(msg) => JoblyError::Config(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    pub fn from_toml_str(raw: &str) -> JoblyResult<Self> {
        Self::from_toml_with(raw, |key| std::env::var(key).ok())
    }

    fn from_toml_with(raw: &str, lookup: impl Fn(&str) -> Option<String>) -> JoblyResult<Self> {
        let file: ConfigFile = toml::from_str(raw)
            .map_err(|e| JoblyError::Config(format!("failed to parse config: {e}")))?;
        let mut config = file.database;
        config.url = expand_env_vars(&config.url, &lookup)?;
        if config.max_pool_size == 0 {
            return Err(JoblyError::Config("max_pool_size must be at least 1".into()));
        }
        Ok(config)
    }
}

fn parse_pool_size(raw: &str) -> JoblyResult<usize> {
    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(JoblyError::Config(format!(
            "JOBLY_POOL_SIZE must be a positive integer, got '{raw}'"
        ))),
    }
}

fn expand_env_vars(input: &str, lookup: &impl Fn(&str) -> Option<String>) -> JoblyResult<String> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'

            let mut key = String::new();
            let mut closed = false;
            for ch in chars.by_ref() {
                if ch == '}' {
                    closed = true;
                    break;
                }
                key.push(ch);
            }

            if !closed {
                return Err(JoblyError::Config(format!(
                    "unterminated env var reference: ${{{key}}}"
                )));
            }
            if key.is_empty() {
                return Err(JoblyError::Config("invalid env var reference: ${}".into()));
            }

            let v = lookup(&key).ok_or_else(|| {
                JoblyError::Config(format!("missing env var for config expansion: {key}"))
            })?;
            out.push_str(&v);
        } else {
            out.push(c);
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn database_url_wins() {
        let cfg = DatabaseConfig::from_lookup(env(&[
            ("DATABASE_URL", "postgres://u@h/db"),
            ("JOBLY_ENV", "test"),
        ]))
        .unwrap();
        assert_eq!(cfg.url, "postgres://u@h/db");
        assert_eq!(cfg.max_pool_size, DEFAULT_POOL_SIZE);
    }

    #[test]
    fn test_env_selects_test_database() {
        let cfg = DatabaseConfig::from_lookup(env(&[("JOBLY_ENV", "test")])).unwrap();
        assert_eq!(cfg.url, "postgresql:///jobly_test?host=/var/run/postgresql");
    }

    #[test]
    fn default_database_is_jobly() {
        let cfg = DatabaseConfig::from_lookup(env(&[])).unwrap();
        assert_eq!(cfg.url, "postgresql:///jobly?host=/var/run/postgresql");
    }

    #[test]
    fn pool_size_override() {
        let cfg = DatabaseConfig::from_lookup(env(&[("JOBLY_POOL_SIZE", "4")])).unwrap();
        assert_eq!(cfg.max_pool_size, 4);

        let err = DatabaseConfig::from_lookup(env(&[("JOBLY_POOL_SIZE", "0")])).unwrap_err();
        assert!(matches!(err, JoblyError::Config(_)));
    }

    #[test]
    fn toml_expands_env_refs() {
        let raw = r#"
            [database]
            url = "postgres://${PGUSER}@localhost/jobly"
            max_pool_size = 8
        "#;
        let cfg = DatabaseConfig::from_toml_with(raw, env(&[("PGUSER", "alice")])).unwrap();
        assert_eq!(cfg.url, "postgres://alice@localhost/jobly");
        assert_eq!(cfg.max_pool_size, 8);
    }

    #[test]
    fn toml_pool_size_defaults() {
        let raw = "[database]\nurl = \"postgres://localhost/jobly\"\n";
        let cfg = DatabaseConfig::from_toml_with(raw, env(&[])).unwrap();
        assert_eq!(cfg.max_pool_size, DEFAULT_POOL_SIZE);
    }

    #[test]
    fn toml_missing_env_ref_errors() {
        let raw = "[database]\nurl = \"postgres://${NOPE}@localhost/jobly\"\n";
        let err = DatabaseConfig::from_toml_with(raw, env(&[])).unwrap_err();
        assert!(err.to_string().contains("NOPE"));
    }

    #[test]
    fn toml_unterminated_ref_errors() {
        let raw = "[database]\nurl = \"postgres://${PGUSER@localhost/jobly\"\n";
        assert!(DatabaseConfig::from_toml_with(raw, env(&[])).is_err());
    }
}
