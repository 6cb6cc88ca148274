//! Pooled SQLite store implementing both repository contracts.

use crate::db::{migrations, open_pool, ConnectionPool, PooledConnection, StoreConfig};
use crate::repo::error::RepoResult;

/// SQLite-backed store for articles and newsrooms.
///
/// Holds no state besides the connection pool, so clones share connections
/// and can be moved across threads freely.
#[derive(Clone)]
pub struct SqliteStore {
    pool: ConnectionPool,
}

impl SqliteStore {
    /// Opens a pool for `config` and applies pending migrations.
    pub fn open(config: &StoreConfig) -> RepoResult<Self> {
        let pool = open_pool(config)?;
        Ok(Self { pool })
    }

    /// Opens a private in-memory store.
    pub fn open_in_memory() -> RepoResult<Self> {
        Self::open(&StoreConfig::in_memory())
    }

    /// Wraps an existing pool so callers can share connections between stores.
    ///
    /// Pending migrations are applied before the store is returned.
    pub fn with_pool(pool: ConnectionPool) -> RepoResult<Self> {
        let mut conn = pool.get()?;
        migrations::apply_migrations(&mut conn)?;
        drop(conn);
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    pub(crate) fn conn(&self) -> RepoResult<PooledConnection> {
        Ok(self.pool.get()?)
    }
}
