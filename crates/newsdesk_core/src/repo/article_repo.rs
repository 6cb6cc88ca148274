//! Article repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/read/update APIs over the `articles` table.
//! - Route every row through `ArticleRow` so JSON handling lives in one place.
//!
//! # Invariants
//! - Updates overwrite every mapped column and never insert.
//! - Soft-deleted rows are invisible to every read and update.

use crate::model::article::{Article, ArticleId};
use crate::repo::article_row::{ArticleRow, ARTICLE_SELECT_SQL};
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::store::SqliteStore;
use rusqlite::{params, Connection, OptionalExtension};

/// Repository interface for article persistence.
pub trait ArticleRepository {
    /// Inserts `article` and writes the generated id back onto it.
    fn create_article(&self, article: &mut Article) -> RepoResult<ArticleId>;
    /// Loads one article; `NotFound` when no live row has `id`.
    fn article_by_id(&self, id: ArticleId) -> RepoResult<Article>;
    /// Replaces the stored row for `article.id` with `article`.
    fn update_article(&self, article: &Article) -> RepoResult<()>;
}

impl ArticleRepository for SqliteStore {
    fn create_article(&self, article: &mut Article) -> RepoResult<ArticleId> {
        let row = ArticleRow::from_article(article)?;
        let conn = self.conn()?;
        let id = insert_article_row(&conn, &row)?;
        article.id = id;
        Ok(id)
    }

    fn article_by_id(&self, id: ArticleId) -> RepoResult<Article> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "{ARTICLE_SELECT_SQL}
             WHERE id = ?1
               AND deleted_at IS NULL;"
        ))?;

        let row = stmt.query_row([id], ArticleRow::from_sql_row).optional()?;
        row.map(ArticleRow::into_article)
            .ok_or_else(|| RepoError::article_not_found(id))
    }

    fn update_article(&self, article: &Article) -> RepoResult<()> {
        let row = ArticleRow::from_article(article)?;
        let conn = self.conn()?;

        let changed = conn.execute(
            "UPDATE articles
             SET
                block_data = ?1,
                article_metadata = ?2,
                newsroom_address = ?3,
                indexed_timestamp = ?4,
                raw_json = ?5,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?6
               AND deleted_at IS NULL;",
            params![
                row.block_data.as_deref(),
                row.article_metadata.as_str(),
                row.newsroom_address.as_str(),
                row.indexed_timestamp,
                row.raw_json.as_str(),
                row.id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::article_not_found(row.id));
        }

        Ok(())
    }
}

/// Inserts a mapped row, ignoring `row.id`, and returns the generated id.
pub(crate) fn insert_article_row(conn: &Connection, row: &ArticleRow) -> RepoResult<ArticleId> {
    conn.execute(
        "INSERT INTO articles (
            block_data,
            article_metadata,
            newsroom_address,
            indexed_timestamp,
            raw_json
        ) VALUES (?1, ?2, ?3, ?4, ?5);",
        params![
            row.block_data.as_deref(),
            row.article_metadata.as_str(),
            row.newsroom_address.as_str(),
            row.indexed_timestamp,
            row.raw_json.as_str(),
        ],
    )?;

    Ok(conn.last_insert_rowid())
}

/// Loads live articles matching `filter`, which follows the `FROM articles` clause.
pub(crate) fn select_articles<P: rusqlite::Params>(
    conn: &Connection,
    filter: &str,
    params: P,
) -> RepoResult<Vec<Article>> {
    let mut stmt = conn.prepare(&format!("{ARTICLE_SELECT_SQL} {filter}"))?;
    let mut rows = stmt.query(params)?;
    let mut articles = Vec::new();

    while let Some(row) = rows.next()? {
        articles.push(ArticleRow::from_sql_row(row)?.into_article());
    }

    Ok(articles)
}
