//! Connection pool bootstrap for SQLite.
//!
//! # Responsibility
//! - Build an `r2d2` pool of file or in-memory SQLite connections.
//! - Configure connection pragmas required by core behavior.
//! - Trigger schema migrations before returning a usable pool.
//!
//! # Invariants
//! - Every pooled connection has `foreign_keys=ON` and the configured busy timeout.
//! - Returned pools point at a fully migrated database.

use super::config::{DbLocation, StoreConfig};
use super::migrations::apply_migrations;
use super::DbResult;
use log::{error, info};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use std::time::{Duration, Instant};

pub type ConnectionPool = Pool<SqliteConnectionManager>;
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Builds a connection pool for `config` and applies all pending migrations.
///
/// # Side effects
/// - Opens `min_idle` connections eagerly (one for in-memory stores).
/// - Emits `db_open` logging events with duration and status.
pub fn open_pool(config: &StoreConfig) -> DbResult<ConnectionPool> {
    let started_at = Instant::now();
    let mode = config.mode();
    info!("event=db_open module=db status=start mode={mode}");

    let pool = match build_pool(config) {
        Ok(pool) => pool,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_pool_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err);
        }
    };

    match migrate_pool(&pool) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode={mode} duration_ms={} max_connections={}",
                started_at.elapsed().as_millis(),
                pool.max_size()
            );
            Ok(pool)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_bootstrap_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn migrate_pool(pool: &ConnectionPool) -> DbResult<()> {
    let mut conn = pool.get()?;
    apply_migrations(&mut conn)
}

fn build_pool(config: &StoreConfig) -> DbResult<ConnectionPool> {
    let busy_timeout = config.busy_timeout;
    let manager = match &config.location {
        DbLocation::File(path) => SqliteConnectionManager::file(path),
        DbLocation::Memory => SqliteConnectionManager::memory(),
    }
    .with_init(move |conn| bootstrap_connection(conn, busy_timeout));

    let builder = ConnectionPool::builder().connection_timeout(config.connection_timeout);
    let builder = match config.location {
        // Each in-memory connection is its own database, so the pool must
        // never open a second one or recycle the first.
        DbLocation::Memory => builder
            .max_size(1)
            .min_idle(Some(1))
            .max_lifetime(None)
            .idle_timeout(None),
        DbLocation::File(_) => {
            let max_size = config.max_connections.max(1);
            builder
                .max_size(max_size)
                .min_idle(config.min_idle.map(|idle| idle.min(max_size)))
                .max_lifetime(config.max_lifetime)
        }
    };

    Ok(builder.build(manager)?)
}

fn bootstrap_connection(conn: &mut Connection, busy_timeout: Duration) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(busy_timeout)?;
    Ok(())
}
