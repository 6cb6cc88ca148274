//! Store configuration passed explicitly to pool construction.

use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_MAX_CONNECTIONS: u32 = 50;
const DEFAULT_MIN_IDLE: u32 = 10;
const DEFAULT_MAX_LIFETIME: Duration = Duration::from_secs(30 * 60);
const DEFAULT_CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Where the SQLite database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbLocation {
    File(PathBuf),
    /// Private in-memory database, alive for as long as the pool is.
    Memory,
}

/// Connection and pool settings for a store.
///
/// # Invariants
/// - `min_idle` is clamped to `max_connections` when the pool is built.
/// - `DbLocation::Memory` ignores pool sizing and lifetime: the pool keeps
///   exactly one connection that is never recycled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub location: DbLocation,
    pub max_connections: u32,
    pub min_idle: Option<u32>,
    /// `None` keeps connections for the pool lifetime.
    pub max_lifetime: Option<Duration>,
    /// How long a caller waits to check out a pooled connection.
    pub connection_timeout: Duration,
    /// SQLite `busy_timeout` applied to every pooled connection.
    pub busy_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            location: DbLocation::File(PathBuf::from("newsdesk.db")),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_idle: Some(DEFAULT_MIN_IDLE),
            max_lifetime: Some(DEFAULT_MAX_LIFETIME),
            connection_timeout: DEFAULT_CONNECTION_TIMEOUT,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }
}

impl StoreConfig {
    /// File-backed store with default pool settings.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            location: DbLocation::File(path.into()),
            ..Self::default()
        }
    }

    /// In-memory store, mostly useful for tests and one-off tools.
    pub fn in_memory() -> Self {
        Self {
            location: DbLocation::Memory,
            ..Self::default()
        }
    }

    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    pub fn with_min_idle(mut self, min_idle: Option<u32>) -> Self {
        self.min_idle = min_idle;
        self
    }

    pub fn with_max_lifetime(mut self, max_lifetime: Option<Duration>) -> Self {
        self.max_lifetime = max_lifetime;
        self
    }

    pub fn with_connection_timeout(mut self, connection_timeout: Duration) -> Self {
        self.connection_timeout = connection_timeout;
        self
    }

    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }

    pub(crate) fn mode(&self) -> &'static str {
        match self.location {
            DbLocation::File(_) => "file",
            DbLocation::Memory => "memory",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DbLocation, StoreConfig};
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn defaults_match_pool_limits() {
        let config = StoreConfig::default();
        assert_eq!(config.max_connections, 50);
        assert_eq!(config.min_idle, Some(10));
        assert_eq!(config.max_lifetime, Some(Duration::from_secs(1800)));
    }

    #[test]
    fn builders_override_single_fields() {
        let config = StoreConfig::file("/tmp/newsdesk-test.db")
            .with_max_connections(4)
            .with_min_idle(None)
            .with_max_lifetime(None);

        assert_eq!(
            config.location,
            DbLocation::File(PathBuf::from("/tmp/newsdesk-test.db"))
        );
        assert_eq!(config.max_connections, 4);
        assert_eq!(config.min_idle, None);
        assert_eq!(config.max_lifetime, None);
        assert_eq!(config.mode(), "file");
        assert_eq!(StoreConfig::in_memory().mode(), "memory");
    }
}
