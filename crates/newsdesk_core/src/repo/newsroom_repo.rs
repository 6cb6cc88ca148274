//! Newsroom repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over the `newsrooms` table.
//! - Resolve the newsroom → articles association by address.
//!
//! # Invariants
//! - Addresses are compared exactly; case is never normalized here.
//! - A duplicate address surfaces as `RepoError::DuplicateAddress`.
//! - Listing skips rows with undecodable meta; single lookups reject them.
//! - Articles attach by `newsroom_address`, never by newsroom id.

use crate::model::article::{Article, ArticleId};
use crate::model::newsroom::{Newsroom, NewsroomId, NewsroomMeta};
use crate::repo::article_repo::{insert_article_row, select_articles};
use crate::repo::article_row::ArticleRow;
use crate::repo::error::{is_unique_violation, RepoError, RepoResult};
use crate::repo::store::SqliteStore;
use chrono::{DateTime, Utc};
use log::{info, warn};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};

const NEWSROOM_SELECT_SQL: &str = "SELECT
    id,
    name,
    address,
    meta
FROM newsrooms";

// Rows without a parseable revision date sort last.
const LATEST_ARTICLE_FILTER: &str = "WHERE newsroom_address = ?1
   AND deleted_at IS NULL
 ORDER BY julianday(
     CASE WHEN json_valid(article_metadata)
          THEN json_extract(article_metadata, '$.revision_date')
     END
 ) DESC, id DESC
 LIMIT 1;";

/// Repository interface for newsrooms and their articles.
pub trait NewsroomRepository {
    /// Inserts `newsroom` and writes the generated id back onto it.
    fn create_newsroom(&self, newsroom: &mut Newsroom) -> RepoResult<NewsroomId>;
    /// Overwrites name, address and meta of the row with `newsroom.id`.
    fn update_newsroom(&self, newsroom: &Newsroom) -> RepoResult<()>;
    /// Attaches a new article to the newsroom with `newsroom_id`.
    ///
    /// The article's `newsroom_address` is set to the newsroom's address and
    /// its generated id is written back.
    fn add_article(&self, newsroom_id: NewsroomId, article: &mut Article)
        -> RepoResult<ArticleId>;
    /// Lists every newsroom whose meta decodes, ordered by id.
    fn newsrooms(&self) -> RepoResult<Vec<Newsroom>>;
    fn newsroom_by_id(&self, id: NewsroomId) -> RepoResult<Newsroom>;
    fn newsroom_by_address(&self, address: &str) -> RepoResult<Newsroom>;
    fn articles_for_newsroom(&self, id: NewsroomId) -> RepoResult<Vec<Article>>;
    /// Articles whose `indexed_timestamp` is at or after `since`.
    fn articles_for_newsroom_indexed_since(
        &self,
        id: NewsroomId,
        since: DateTime<Utc>,
    ) -> RepoResult<Vec<Article>>;
    /// The article with the most recent metadata revision date.
    ///
    /// Returns `RepoError::NoArticles` when the newsroom has none.
    fn latest_article_for_newsroom(&self, id: NewsroomId) -> RepoResult<Article>;
}

impl NewsroomRepository for SqliteStore {
    fn create_newsroom(&self, newsroom: &mut Newsroom) -> RepoResult<NewsroomId> {
        let meta = encode_meta(newsroom.meta.as_ref())?;
        let conn = self.conn()?;

        conn.execute(
            "INSERT INTO newsrooms (name, address, meta) VALUES (?1, ?2, ?3);",
            params![newsroom.name.as_str(), newsroom.address.as_str(), meta],
        )
        .map_err(|err| address_conflict(err, &newsroom.address))?;

        let id = conn.last_insert_rowid();
        newsroom.id = id;
        info!("event=newsroom_create module=repo status=ok newsroom_id={id}");
        Ok(id)
    }

    fn update_newsroom(&self, newsroom: &Newsroom) -> RepoResult<()> {
        let meta = encode_meta(newsroom.meta.as_ref())?;
        let conn = self.conn()?;

        let changed = conn
            .execute(
                "UPDATE newsrooms
                 SET
                    name = ?1,
                    address = ?2,
                    meta = ?3,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?4
                   AND deleted_at IS NULL;",
                params![
                    newsroom.name.as_str(),
                    newsroom.address.as_str(),
                    meta,
                    newsroom.id,
                ],
            )
            .map_err(|err| address_conflict(err, &newsroom.address))?;

        if changed == 0 {
            return Err(RepoError::newsroom_not_found(newsroom.id));
        }

        Ok(())
    }

    fn add_article(
        &self,
        newsroom_id: NewsroomId,
        article: &mut Article,
    ) -> RepoResult<ArticleId> {
        let mut row = ArticleRow::from_article(article)?;
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let address = newsroom_address(&tx, newsroom_id)?
            .ok_or_else(|| RepoError::newsroom_not_found(newsroom_id))?;
        row.newsroom_address = address.clone();
        let id = insert_article_row(&tx, &row)?;
        tx.commit()?;

        article.id = id;
        article.newsroom_address = address;
        Ok(id)
    }

    fn newsrooms(&self) -> RepoResult<Vec<Newsroom>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "{NEWSROOM_SELECT_SQL}
             WHERE deleted_at IS NULL
             ORDER BY id ASC;"
        ))?;

        let mut rows = stmt.query([])?;
        let mut newsrooms = Vec::new();
        while let Some(row) = rows.next()? {
            let record = NewsroomRow::from_sql_row(row)?;
            let id = record.id;
            match record.into_newsroom() {
                Ok(newsroom) => newsrooms.push(newsroom),
                Err(err) => warn!(
                    "event=newsroom_meta_decode module=repo status=skipped newsroom_id={id} error={err}"
                ),
            }
        }

        Ok(newsrooms)
    }

    fn newsroom_by_id(&self, id: NewsroomId) -> RepoResult<Newsroom> {
        let conn = self.conn()?;
        let record = load_newsroom_row(&conn, "id = ?1", id)?
            .ok_or_else(|| RepoError::newsroom_not_found(id))?;
        decode_strict(record)
    }

    fn newsroom_by_address(&self, address: &str) -> RepoResult<Newsroom> {
        let conn = self.conn()?;
        let record = load_newsroom_row(&conn, "address = ?1", address)?
            .ok_or_else(|| RepoError::newsroom_not_found(address))?;
        decode_strict(record)
    }

    fn articles_for_newsroom(&self, id: NewsroomId) -> RepoResult<Vec<Article>> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let address =
            newsroom_address(&tx, id)?.ok_or_else(|| RepoError::newsroom_not_found(id))?;
        let articles = select_articles(
            &tx,
            "WHERE newsroom_address = ?1
               AND deleted_at IS NULL
             ORDER BY id ASC;",
            [address.as_str()],
        )?;
        tx.commit()?;

        Ok(articles)
    }

    fn articles_for_newsroom_indexed_since(
        &self,
        id: NewsroomId,
        since: DateTime<Utc>,
    ) -> RepoResult<Vec<Article>> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let address =
            newsroom_address(&tx, id)?.ok_or_else(|| RepoError::newsroom_not_found(id))?;
        let Some(since_nanos) = since_bound(since) else {
            return Ok(Vec::new());
        };
        let articles = select_articles(
            &tx,
            "WHERE newsroom_address = ?1
               AND indexed_timestamp >= ?2
               AND deleted_at IS NULL
             ORDER BY id ASC;",
            params![address.as_str(), since_nanos],
        )?;
        tx.commit()?;

        Ok(articles)
    }

    fn latest_article_for_newsroom(&self, id: NewsroomId) -> RepoResult<Article> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let address =
            newsroom_address(&tx, id)?.ok_or_else(|| RepoError::newsroom_not_found(id))?;
        let latest = select_articles(&tx, LATEST_ARTICLE_FILTER, [address.as_str()])?;
        tx.commit()?;

        latest.into_iter().next().ok_or(RepoError::NoArticles(id))
    }
}

struct NewsroomRow {
    id: NewsroomId,
    name: String,
    address: String,
    meta: Option<String>,
}

impl NewsroomRow {
    fn from_sql_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            address: row.get("address")?,
            meta: row.get("meta")?,
        })
    }

    /// `NULL` and JSON `null` both decode to `meta: None`.
    fn into_newsroom(self) -> Result<Newsroom, serde_json::Error> {
        let meta = match self.meta.as_deref() {
            Some(json) => serde_json::from_str::<Option<NewsroomMeta>>(json)?,
            None => None,
        };

        Ok(Newsroom {
            id: self.id,
            name: self.name,
            address: self.address,
            meta,
        })
    }
}

/// Lower filter bound in Unix nanoseconds.
///
/// Bounds before the representable range match every article; bounds after
/// it match none and yield `None`.
fn since_bound(since: DateTime<Utc>) -> Option<i64> {
    match since.timestamp_nanos_opt() {
        Some(nanos) => Some(nanos),
        None if since < DateTime::UNIX_EPOCH => Some(i64::MIN),
        None => None,
    }
}

fn encode_meta(meta: Option<&NewsroomMeta>) -> RepoResult<Option<String>> {
    meta.map(serde_json::to_string)
        .transpose()
        .map_err(|err| RepoError::encoding("meta", err))
}

fn decode_strict(record: NewsroomRow) -> RepoResult<Newsroom> {
    let id = record.id;
    record.into_newsroom().map_err(|err| {
        RepoError::InvalidData(format!("newsroom {id} has malformed meta: {err}"))
    })
}

fn load_newsroom_row<P: rusqlite::ToSql>(
    conn: &Connection,
    predicate: &str,
    key: P,
) -> RepoResult<Option<NewsroomRow>> {
    let mut stmt = conn.prepare(&format!(
        "{NEWSROOM_SELECT_SQL}
         WHERE {predicate}
           AND deleted_at IS NULL;"
    ))?;
    let record = stmt.query_row([key], NewsroomRow::from_sql_row).optional()?;
    Ok(record)
}

fn newsroom_address(conn: &Connection, id: NewsroomId) -> RepoResult<Option<String>> {
    let address = conn
        .query_row(
            "SELECT address FROM newsrooms WHERE id = ?1 AND deleted_at IS NULL;",
            [id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(address)
}

fn address_conflict(err: rusqlite::Error, address: &str) -> RepoError {
    if is_unique_violation(&err) {
        warn!("event=newsroom_address_conflict module=repo status=rejected");
        return RepoError::DuplicateAddress(address.to_string());
    }
    err.into()
}
