//! Domain model for articles and the newsrooms that publish them.
//!
//! # Responsibility
//! - Define plain data structures used by callers and repositories.
//! - Stay free of persistence concerns; storage shapes live in `repo`.

pub mod article;
pub mod newsroom;
