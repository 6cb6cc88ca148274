//! Storage row for articles and its mapping to the domain model.
//!
//! # Responsibility
//! - Encode nested article fields into JSON columns (`from_article`).
//! - Decode rows back into `Article` without ever failing (`into_article`).
//!
//! # Invariants
//! - Metadata encoding failures are fatal; decoding failures are not.
//! - Placeholder receipts are never written: `block_data` stays `NULL`.
//! - `raw_json` is copied verbatim in both directions.
//! - `into_article(from_article(a)) == a` whenever `a.block_data` is `None`
//!   or carries a real transaction hash.

use crate::model::article::{Article, ArticleId, ArticleMetadata, BlockReceipt};
use crate::repo::error::{RepoError, RepoResult};
use chrono::{DateTime, Utc};
use log::debug;
use rusqlite::Row;
use serde::de::DeserializeOwned;

pub(crate) const ARTICLE_SELECT_SQL: &str = "SELECT
    id,
    block_data,
    article_metadata,
    newsroom_address,
    indexed_timestamp,
    raw_json
FROM articles";

/// Flat, storage-shaped article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRow {
    pub id: ArticleId,
    /// JSON-encoded `BlockReceipt`, `None` when no transaction is known.
    pub block_data: Option<String>,
    /// JSON-encoded `ArticleMetadata`.
    pub article_metadata: String,
    pub newsroom_address: String,
    /// Unix epoch nanoseconds.
    pub indexed_timestamp: i64,
    pub raw_json: String,
}

impl ArticleRow {
    /// Maps a domain article onto its storage row.
    ///
    /// # Errors
    /// - `RepoError::Encoding` when metadata or block data cannot be
    ///   serialized, or the indexed timestamp is outside the nanosecond range.
    pub fn from_article(article: &Article) -> RepoResult<Self> {
        let article_metadata = serde_json::to_string(&article.article_metadata)
            .map_err(|err| RepoError::encoding("article_metadata", err))?;

        let block_data = match article.block_data.as_ref() {
            Some(receipt) if !receipt.is_placeholder() => Some(
                serde_json::to_string(receipt)
                    .map_err(|err| RepoError::encoding("block_data", err))?,
            ),
            _ => None,
        };

        Ok(Self {
            id: article.id,
            block_data,
            article_metadata,
            newsroom_address: article.newsroom_address.clone(),
            indexed_timestamp: timestamp_to_nanos("indexed_timestamp", article.indexed_timestamp)?,
            raw_json: article.raw_json.clone(),
        })
    }

    /// Maps a storage row back onto a domain article.
    ///
    /// Malformed `block_data` decodes as `None` and malformed
    /// `article_metadata` as `ArticleMetadata::default()`; older or
    /// partially-written rows must stay loadable.
    pub fn into_article(self) -> Article {
        let block_data = self
            .block_data
            .as_deref()
            .and_then(|json| decode_tolerant::<BlockReceipt>(self.id, "block_data", json))
            .filter(|receipt| !receipt.is_placeholder());
        let article_metadata =
            decode_tolerant::<ArticleMetadata>(self.id, "article_metadata", &self.article_metadata)
                .unwrap_or_default();

        Article {
            id: self.id,
            block_data,
            article_metadata,
            newsroom_address: self.newsroom_address,
            indexed_timestamp: DateTime::from_timestamp_nanos(self.indexed_timestamp),
            raw_json: self.raw_json,
        }
    }

    pub(crate) fn from_sql_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            block_data: row.get("block_data")?,
            article_metadata: row
                .get::<_, Option<String>>("article_metadata")?
                .unwrap_or_default(),
            newsroom_address: row.get("newsroom_address")?,
            indexed_timestamp: row.get("indexed_timestamp")?,
            raw_json: row.get::<_, Option<String>>("raw_json")?.unwrap_or_default(),
        })
    }
}

/// Converts a timestamp to Unix nanoseconds for storage.
fn timestamp_to_nanos(field: &'static str, value: DateTime<Utc>) -> RepoResult<i64> {
    value.timestamp_nanos_opt().ok_or_else(|| RepoError::Encoding {
        field,
        message: format!("timestamp {value} is outside the nanosecond range"),
    })
}

fn decode_tolerant<T: DeserializeOwned>(id: ArticleId, field: &str, json: &str) -> Option<T> {
    match serde_json::from_str(json) {
        Ok(value) => Some(value),
        Err(err) => {
            debug!(
                "event=article_decode module=repo status=skipped article_id={id} field={field} error={err}"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ArticleRow;
    use crate::model::article::{
        Article, ArticleMetadata, BlockReceipt, Contributor, Image, ReceiptLog,
    };
    use chrono::{DateTime, TimeZone, Utc};

    fn sample_receipt() -> BlockReceipt {
        BlockReceipt {
            tx_hash: "0x5f2b1c3a9e8d7f6a5b4c3d2e1f0a9b8c7d6e5f4a3b2c1d0e9f8a7b6c5d4e3f2a"
                .to_string(),
            block_hash: "0x01".to_string(),
            block_number: 4_200_117,
            transaction_index: 3,
            status: 1,
            cumulative_gas_used: 90_000,
            gas_used: 21_000,
            contract_address: None,
            logs: vec![ReceiptLog {
                address: "0x8c722B8AC728aDd7780a66017e8daDBa530EE261".to_string(),
                topics: vec!["0xdead".to_string()],
                data: "0x".to_string(),
            }],
        }
    }

    fn sample_article() -> Article {
        Article {
            id: 42,
            block_data: Some(sample_receipt()),
            article_metadata: ArticleMetadata {
                title: "new stufff".to_string(),
                canonical_url: "https://newstuff.bz/newarticle".to_string(),
                contributors: vec![Contributor {
                    role: "author".to_string(),
                    name: "Pat Doe".to_string(),
                }],
                images: vec![Image {
                    url: "https://newstuff.bz/cover.png".to_string(),
                    hash: "0xbeef".to_string(),
                    width: 640,
                    height: 480,
                }],
                tags: vec!["politics".to_string(), "local".to_string()],
                primary_tag: "politics".to_string(),
                revision_date: Some(Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()),
                original_publish_date: Some(
                    Utc.with_ymd_and_hms(2024, 2, 28, 8, 0, 0).unwrap(),
                ),
                opinion: true,
                schema_version: "1.0.0".to_string(),
                ..ArticleMetadata::default()
            },
            newsroom_address: "0x8c722B8AC728aDd7780a66017e8daDBa530EE261".to_string(),
            indexed_timestamp: DateTime::from_timestamp_nanos(1_714_560_000_123_456_789),
            raw_json: r#"{ "title" : "new stufff",  "spacing": "kept" }"#.to_string(),
        }
    }

    #[test]
    fn article_survives_row_mapping() {
        let article = sample_article();
        let row = ArticleRow::from_article(&article).unwrap();

        assert_eq!(row.id, 42);
        assert_eq!(row.indexed_timestamp, 1_714_560_000_123_456_789);
        assert_eq!(row.raw_json, article.raw_json);
        assert_eq!(row.into_article(), article);
    }

    #[test]
    fn article_without_block_data_survives_row_mapping() {
        let mut article = sample_article();
        article.block_data = None;

        let row = ArticleRow::from_article(&article).unwrap();
        assert!(row.block_data.is_none());
        assert_eq!(row.into_article(), article);
    }

    #[test]
    fn placeholder_receipt_is_not_encoded() {
        let mut article = sample_article();
        article.block_data = Some(BlockReceipt::default());

        let row = ArticleRow::from_article(&article).unwrap();
        assert!(row.block_data.is_none());
        assert!(row.into_article().block_data.is_none());
    }

    #[test]
    fn malformed_json_columns_decode_to_defaults() {
        let row = ArticleRow {
            id: 7,
            block_data: Some("{\"transactionHash\":".to_string()),
            article_metadata: "not json at all".to_string(),
            newsroom_address: "0xabc".to_string(),
            indexed_timestamp: 0,
            raw_json: "{broken".to_string(),
        };

        let article = row.into_article();
        assert_eq!(article.id, 7);
        assert!(article.block_data.is_none());
        assert_eq!(article.article_metadata, ArticleMetadata::default());
        assert_eq!(article.raw_json, "{broken");
        assert_eq!(article.indexed_timestamp.timestamp(), 0);
    }

    #[test]
    fn partial_metadata_fills_missing_fields_with_defaults() {
        let row = ArticleRow {
            id: 8,
            block_data: None,
            article_metadata: r#"{"title": "Worlds Greatest Article"}"#.to_string(),
            newsroom_address: "0xabc".to_string(),
            indexed_timestamp: 0,
            raw_json: String::new(),
        };

        let metadata = row.into_article().article_metadata;
        assert_eq!(metadata.title, "Worlds Greatest Article");
        assert!(metadata.tags.is_empty());
        assert!(metadata.revision_date.is_none());
    }

    #[test]
    fn out_of_range_indexed_timestamp_is_an_encoding_error() {
        let mut article = sample_article();
        article.indexed_timestamp = Utc.with_ymd_and_hms(2300, 1, 1, 0, 0, 0).unwrap();

        let err = ArticleRow::from_article(&article).unwrap_err();
        assert!(matches!(
            err,
            crate::repo::error::RepoError::Encoding {
                field: "indexed_timestamp",
                ..
            }
        ));
    }
}
