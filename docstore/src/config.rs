use std::time::Duration;

use crate::error::{StoreError, StoreResult};

#[derive(Clone, Debug)]
pub struct DbConfig {
    /// Database connection string, e.g. `sqlite://adapter.db?mode=rwc`.
    pub database_url: String,

    /// Upper bound on pooled connections.
    pub max_connections: u32,

    /// How long to wait for a free connection before failing the call.
    ///
    /// This is the only timeout on any store operation; the adapter itself
    /// never cancels a round trip.
    pub connect_timeout: Duration,

    /// Maximum number of deletes in flight during a batch session delete.
    pub delete_concurrency: usize,
}

impl DbConfig {
    pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
    pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5_000;
    pub const DEFAULT_DELETE_CONCURRENCY: usize = 16;

    /// Read configuration from the process environment.
    ///
    /// `DATABASE_URL` is required; the tuning knobs fall back to defaults.
    pub fn from_env() -> StoreResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`DbConfig::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> StoreResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| StoreError::Config("DATABASE_URL is not set".to_string()))?;

        let max_connections = parse_or(
            &lookup,
            "DATABASE_MAX_CONNECTIONS",
            Self::DEFAULT_MAX_CONNECTIONS,
        )?;
        let connect_timeout_ms = parse_or(
            &lookup,
            "DATABASE_CONNECT_TIMEOUT_MS",
            Self::DEFAULT_CONNECT_TIMEOUT_MS,
        )?;
        let delete_concurrency = parse_or(
            &lookup,
            "SESSION_DELETE_CONCURRENCY",
            Self::DEFAULT_DELETE_CONCURRENCY,
        )?;

        if max_connections == 0 || delete_concurrency == 0 {
            return Err(StoreError::Config(
                "connection and delete limits must be positive".to_string(),
            ));
        }

        Ok(Self {
            database_url,
            max_connections,
            connect_timeout: Duration::from_millis(connect_timeout_ms),
            delete_concurrency,
        })
    }

    /// Private in-memory SQLite database, one connection.
    ///
    /// A single connection keeps the database alive for the pool's lifetime.
    pub fn in_memory() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            max_connections: 1,
            connect_timeout: Duration::from_millis(Self::DEFAULT_CONNECT_TIMEOUT_MS),
            delete_concurrency: Self::DEFAULT_DELETE_CONCURRENCY,
        }
    }
}

fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> StoreResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| StoreError::Config(format!("{name} has invalid value {raw:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn missing_database_url_is_an_error() {
        let err = DbConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));

        let err = DbConfig::from_lookup(lookup_from(&[("DATABASE_URL", "  ")])).unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }

    #[test]
    fn defaults_apply_when_knobs_are_absent() {
        let cfg = DbConfig::from_lookup(lookup_from(&[("DATABASE_URL", "sqlite://x.db")])).unwrap();
        assert_eq!(cfg.database_url, "sqlite://x.db");
        assert_eq!(cfg.max_connections, DbConfig::DEFAULT_MAX_CONNECTIONS);
        assert_eq!(cfg.connect_timeout, Duration::from_millis(5_000));
        assert_eq!(cfg.delete_concurrency, DbConfig::DEFAULT_DELETE_CONCURRENCY);
    }

    #[test]
    fn knobs_are_parsed() {
        let cfg = DbConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite://x.db"),
            ("DATABASE_MAX_CONNECTIONS", "2"),
            ("DATABASE_CONNECT_TIMEOUT_MS", "250"),
            ("SESSION_DELETE_CONCURRENCY", " 4 "),
        ]))
        .unwrap();
        assert_eq!(cfg.max_connections, 2);
        assert_eq!(cfg.connect_timeout, Duration::from_millis(250));
        assert_eq!(cfg.delete_concurrency, 4);
    }

    #[test]
    fn bad_or_zero_knobs_are_rejected() {
        let err = DbConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite://x.db"),
            ("DATABASE_MAX_CONNECTIONS", "many"),
        ]))
        .unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));

        let err = DbConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite://x.db"),
            ("SESSION_DELETE_CONCURRENCY", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }
}
