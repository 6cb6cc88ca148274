//! Repository error taxonomy shared by article and newsroom persistence.

use crate::db::DbError;
use crate::model::article::ArticleId;
use crate::model::newsroom::NewsroomId;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug)]
pub enum RepoError {
    /// Transport, pool or SQL failure from the backing store.
    Db(DbError),
    NotFound {
        entity: &'static str,
        key: String,
    },
    /// Another newsroom already owns this address.
    DuplicateAddress(String),
    /// The newsroom exists but has no associated articles.
    NoArticles(NewsroomId),
    /// A value could not be serialized for storage.
    Encoding {
        field: &'static str,
        message: String,
    },
    /// Persisted data failed a strict read.
    InvalidData(String),
}

impl RepoError {
    pub fn article_not_found(id: ArticleId) -> Self {
        Self::NotFound {
            entity: "article",
            key: id.to_string(),
        }
    }

    pub fn newsroom_not_found(key: impl ToString) -> Self {
        Self::NotFound {
            entity: "newsroom",
            key: key.to_string(),
        }
    }

    pub(crate) fn encoding(field: &'static str, err: impl Display) -> Self {
        Self::Encoding {
            field,
            message: err.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "store error: {err}"),
            Self::NotFound { entity, key } => write!(f, "{entity} not found: {key}"),
            Self::DuplicateAddress(address) => {
                write!(f, "newsroom address already exists: {address}")
            }
            Self::NoArticles(id) => write!(f, "no articles found for newsroom {id}"),
            Self::Encoding { field, message } => write!(f, "failed to encode {field}: {message}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound { .. }
            | Self::DuplicateAddress(_)
            | Self::NoArticles(_)
            | Self::Encoding { .. }
            | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<r2d2::Error> for RepoError {
    fn from(value: r2d2::Error) -> Self {
        Self::Db(DbError::Pool(value))
    }
}

/// Returns whether `err` is a SQLite `UNIQUE` constraint failure.
pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == rusqlite::ErrorCode::ConstraintViolation
                && failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}
