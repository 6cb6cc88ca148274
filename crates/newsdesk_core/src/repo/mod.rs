//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for articles and newsrooms.
//! - Isolate SQLite query details and JSON column handling from callers.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`, `DuplicateAddress`,
//!   `NoArticles`) in addition to DB transport errors.
//! - Article rows are always mapped through `ArticleRow`.

pub mod article_repo;
pub mod article_row;
pub mod error;
pub mod newsroom_repo;
pub mod store;
