//! Article domain model.
//!
//! # Responsibility
//! - Define the canonical article record and its structured metadata.
//! - Keep the original payload next to its parsed projection.
//!
//! # Invariants
//! - `id == 0` means the article has not been persisted yet.
//! - `raw_json` is never rewritten; `article_metadata` and `block_data` are
//!   derived views that may be empty when the source was malformed.

use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// Store-assigned surrogate key. `0` is reserved for "not persisted".
pub type ArticleId = i64;

/// Someone who took part in creating an article.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Contributor {
    pub role: String,
    pub name: String,
}

/// Image referenced by an article, with an optional content hash for verification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Image {
    pub url: String,
    pub hash: String,
    pub width: u32,
    pub height: u32,
}

/// Indexed information about an article revision.
///
/// Serialized with snake_case keys matching the field names. Every field
/// defaults when missing so partially-populated payloads still load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArticleMetadata {
    pub title: String,
    pub revision_content_hash: String,
    pub revision_content_url: String,
    pub canonical_url: String,
    pub slug: String,
    pub description: String,
    pub contributors: Vec<Contributor>,
    pub images: Vec<Image>,
    pub tags: Vec<String>,
    pub primary_tag: String,
    pub revision_date: Option<DateTime<Utc>>,
    pub original_publish_date: Option<DateTime<Utc>>,
    pub opinion: bool,
    pub schema_version: String,
}

/// One log entry emitted while a ledger transaction executed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiptLog {
    pub address: String,
    pub topics: Vec<String>,
    pub data: String,
}

/// Ledger receipt for the transaction that published an article revision.
///
/// Keys follow the ledger's camelCase receipt layout. Numeric quantities are
/// written as JSON numbers and read from either numbers or `0x` hex strings,
/// so receipts copied straight from a node decode too.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BlockReceipt {
    #[serde(rename = "transactionHash")]
    pub tx_hash: String,
    pub block_hash: String,
    #[serde(deserialize_with = "quantity")]
    pub block_number: u64,
    #[serde(deserialize_with = "quantity")]
    pub transaction_index: u32,
    #[serde(deserialize_with = "quantity")]
    pub status: u64,
    #[serde(deserialize_with = "quantity")]
    pub cumulative_gas_used: u64,
    #[serde(deserialize_with = "quantity")]
    pub gas_used: u64,
    pub contract_address: Option<String>,
    pub logs: Vec<ReceiptLog>,
}

impl BlockReceipt {
    /// Returns whether this receipt carries no transaction.
    ///
    /// An empty or all-zero transaction hash marks a placeholder value that
    /// must never be written to storage.
    pub fn is_placeholder(&self) -> bool {
        let hash = self.tx_hash.trim();
        let digits = hash
            .strip_prefix("0x")
            .or_else(|| hash.strip_prefix("0X"))
            .unwrap_or(hash);
        digits.chars().all(|c| c == '0')
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Quantity {
    Number(u64),
    Text(String),
}

fn quantity<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<u64>,
{
    let value = match Quantity::deserialize(deserializer)? {
        Quantity::Number(value) => value,
        Quantity::Text(text) => {
            let trimmed = text.trim();
            let parsed = match trimmed
                .strip_prefix("0x")
                .or_else(|| trimmed.strip_prefix("0X"))
            {
                Some(hex) => u64::from_str_radix(hex, 16),
                None => trimmed.parse(),
            };
            parsed.map_err(|_| D::Error::custom(format!("invalid quantity `{text}`")))?
        }
    };
    T::try_from(value)
        .map_err(|_| D::Error::custom(format!("quantity {value} is out of range")))
}

/// Top-level article record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub id: ArticleId,
    /// `None` until the publishing transaction is known.
    pub block_data: Option<BlockReceipt>,
    pub article_metadata: ArticleMetadata,
    /// Address of the owning newsroom; matched by value, not by newsroom id.
    pub newsroom_address: String,
    /// When this system recorded the article, distinct from publish dates.
    pub indexed_timestamp: DateTime<Utc>,
    /// Original payload, kept byte-for-byte.
    pub raw_json: String,
}

impl Article {
    /// Creates an unpersisted article indexed now.
    pub fn new(newsroom_address: impl Into<String>, article_metadata: ArticleMetadata) -> Self {
        Self {
            id: 0,
            block_data: None,
            article_metadata,
            newsroom_address: newsroom_address.into(),
            indexed_timestamp: Utc::now(),
            raw_json: String::new(),
        }
    }

    /// Builds an article from an incoming payload.
    ///
    /// The payload is projected onto `ArticleMetadata` tolerantly: malformed
    /// JSON yields default metadata, and `raw_json` keeps the text as given.
    pub fn from_raw_json(
        newsroom_address: impl Into<String>,
        raw_json: impl Into<String>,
        indexed_timestamp: DateTime<Utc>,
    ) -> Self {
        let raw_json = raw_json.into();
        let article_metadata: ArticleMetadata =
            serde_json::from_str(&raw_json).unwrap_or_default();
        Self {
            id: 0,
            block_data: None,
            article_metadata,
            newsroom_address: newsroom_address.into(),
            indexed_timestamp,
            raw_json,
        }
    }

    /// Returns whether the store has assigned an id.
    pub fn is_persisted(&self) -> bool {
        self.id != 0
    }
}

#[cfg(test)]
mod tests {
    use super::{Article, ArticleMetadata, BlockReceipt};
    use chrono::{TimeZone, Utc};

    #[test]
    fn zero_and_empty_hashes_are_placeholders() {
        let mut receipt = BlockReceipt::default();
        assert!(receipt.is_placeholder());

        receipt.tx_hash = format!("0x{}", "0".repeat(64));
        assert!(receipt.is_placeholder());

        receipt.tx_hash = format!("0x{}1", "0".repeat(63));
        assert!(!receipt.is_placeholder());
    }

    #[test]
    fn receipt_accepts_hex_quantities_from_node_output() {
        let json = r#"{
            "transactionHash": "0x5f2b1c3a",
            "blockHash": "0x01",
            "blockNumber": "0x4016b5",
            "transactionIndex": "0x3",
            "status": "0x1",
            "cumulativeGasUsed": "0x15f90",
            "gasUsed": "0x5208",
            "contractAddress": null,
            "logs": []
        }"#;

        let receipt: BlockReceipt = serde_json::from_str(json).unwrap();
        assert_eq!(receipt.block_number, 4_200_117);
        assert_eq!(receipt.transaction_index, 3);
        assert_eq!(receipt.status, 1);
        assert_eq!(receipt.cumulative_gas_used, 90_000);
        assert_eq!(receipt.gas_used, 21_000);

        let stored: BlockReceipt =
            serde_json::from_str(&serde_json::to_string(&receipt).unwrap()).unwrap();
        assert_eq!(stored, receipt);
    }

    #[test]
    fn receipt_rejects_unparseable_quantities() {
        let json = r#"{"transactionHash": "0x01", "blockNumber": "0xzz"}"#;
        assert!(serde_json::from_str::<BlockReceipt>(json).is_err());

        let json = r#"{"transactionHash": "0x01", "transactionIndex": "0x100000000"}"#;
        assert!(serde_json::from_str::<BlockReceipt>(json).is_err());
    }

    #[test]
    fn from_raw_json_projects_known_fields_and_keeps_payload() {
        let raw = r#"{"title":"Worlds Greatest Article","opinion":true,"extra":{"a":1}}"#;
        let indexed_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        let article = Article::from_raw_json("0xabc", raw, indexed_at);

        assert_eq!(article.article_metadata.title, "Worlds Greatest Article");
        assert!(article.article_metadata.opinion);
        assert_eq!(article.raw_json, raw);
        assert_eq!(article.indexed_timestamp, indexed_at);
        assert!(!article.is_persisted());
    }

    #[test]
    fn from_raw_json_tolerates_malformed_payload() {
        let article = Article::from_raw_json("0xabc", "{not json", Utc::now());

        assert_eq!(article.article_metadata, ArticleMetadata::default());
        assert_eq!(article.raw_json, "{not json");
    }
}
