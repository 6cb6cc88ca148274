//! Data-access layer for newsrooms and the articles they publish.
//! Maps domain records onto SQLite rows with JSON-typed columns.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;

pub use db::{DbError, DbLocation, DbResult, StoreConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::article::{
    Article, ArticleId, ArticleMetadata, BlockReceipt, Contributor, Image, ReceiptLog,
};
pub use model::newsroom::{Newsroom, NewsroomId, NewsroomMeta};
pub use repo::article_repo::ArticleRepository;
pub use repo::article_row::ArticleRow;
pub use repo::error::{RepoError, RepoResult};
pub use repo::newsroom_repo::NewsroomRepository;
pub use repo::store::SqliteStore;

/// Minimal health-check API for linkage checks.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
