//! # JSON Snapshots
//!
//! Reading and writing whole collections as one JSON array per file.
//!
//! ## Fail-Closed Loading
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  zoo-sales.json                                                         │
//! │       │                                                                 │
//! │       ├── missing ───────────────────────────────► []                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  serde_json → Vec<T>  ── not an array / wrong shape ──┐                 │
//! │       │                                               │                 │
//! │       ▼                                               ▼                 │
//! │  T::check() per record ── invariant broken ──► warn!, remove file, []   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Vec<T>                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A corrupt collection is treated as absent: nothing partial is ever kept.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, warn};
use zoo_core::{FinanceOrder, Sale, ValidationError};

use crate::error::{DbError, DbResult};

/// A record that can live in a snapshot file.
pub trait Snapshot: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Collection name used in logs.
    const COLLECTION: &'static str;

    /// Invariants every stored record must hold.
    fn check(&self) -> Result<(), ValidationError>;
}

impl Snapshot for Sale {
    const COLLECTION: &'static str = "sales";

    fn check(&self) -> Result<(), ValidationError> {
        self.validate()
    }
}

impl Snapshot for FinanceOrder {
    const COLLECTION: &'static str = "finance_orders";

    fn check(&self) -> Result<(), ValidationError> {
        self.validate()
    }
}

/// Decodes and checks a JSON array of records.
///
/// ## Errors
/// - [`DbError::Serialization`] when the bytes are not an array of `T`
/// - [`DbError::Corrupt`] when a record breaks its invariants
pub fn decode_records<T: Snapshot>(bytes: &[u8]) -> DbResult<Vec<T>> {
    let records: Vec<T> = serde_json::from_slice(bytes)?;
    for (index, record) in records.iter().enumerate() {
        record
            .check()
            .map_err(|e| DbError::Corrupt(format!("{}[{}]: {}", T::COLLECTION, index, e)))?;
    }
    Ok(records)
}

/// Loads a snapshot file, failing closed.
///
/// Missing files and corrupt contents both yield an empty collection; a
/// corrupt file is removed. Only I/O failures other than "not found" are
/// returned as errors.
pub async fn decode_snapshot<T: Snapshot>(path: &Path) -> DbResult<Vec<T>> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), collection = T::COLLECTION, "No snapshot file, starting empty");
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };

    match decode_records::<T>(&bytes) {
        Ok(records) => {
            debug!(collection = T::COLLECTION, count = records.len(), "Snapshot loaded");
            Ok(records)
        }
        Err(e) => {
            warn!(
                path = %path.display(),
                collection = T::COLLECTION,
                error = %e,
                "Discarding corrupt snapshot"
            );
            match tokio::fs::remove_file(path).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
            Ok(Vec::new())
        }
    }
}

/// Rewrites the whole collection.
///
/// Writes a sibling temporary file first and renames it over the target, so
/// a crash mid-write leaves the previous snapshot intact.
pub async fn write_snapshot<T: Snapshot>(path: &Path, records: &[T]) -> DbResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let bytes = serde_json::to_vec_pretty(records)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await?;

    debug!(collection = T::COLLECTION, count = records.len(), "Snapshot written");
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use zoo_core::{TicketSheet, TicketType, VisitorCategory};

    fn recorded_sale() -> Sale {
        let now = Utc.with_ymd_and_hms(2025, 3, 12, 9, 30, 0).unwrap();
        let mut sheet = TicketSheet::standard(now);
        sheet.set_quantity(VisitorCategory::National, TicketType::Adult, 2);
        sheet.set_client_name("Famille Mbala");
        sheet.checkout(now).unwrap()
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let sales: Vec<Sale> = decode_snapshot(&dir.path().join("zoo-sales.json")).await.unwrap();
        assert!(sales.is_empty());
    }

    #[tokio::test]
    async fn test_write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("zoo-sales.json");
        let sale = recorded_sale();

        write_snapshot(&path, std::slice::from_ref(&sale)).await.unwrap();
        let loaded: Vec<Sale> = decode_snapshot(&path).await.unwrap();
        assert_eq!(loaded, vec![sale]);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_string_instead_of_array_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zoo-sales.json");
        tokio::fs::write(&path, "\"not an array\"").await.unwrap();

        let loaded: Vec<Sale> = decode_snapshot(&path).await.unwrap();
        assert!(loaded.is_empty());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_broken_invariant_discards_everything() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zoo-sales.json");

        let good = recorded_sale();
        let mut bad = recorded_sale();
        bad.net_amount = bad.gross_amount + zoo_core::Money::from_francs(1);
        write_snapshot(&path, &[good, bad]).await.unwrap();

        let loaded: Vec<Sale> = decode_snapshot(&path).await.unwrap();
        assert!(loaded.is_empty());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_overflowing_amounts_are_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zoo-sales.json");

        // quantity × unit price does not fit in i64
        let mut record = serde_json::to_value(recorded_sale()).unwrap();
        record["lines"][0]["unitPrice"] = serde_json::json!(5_000_000_000_000_000_000i64);
        record["lines"][0]["lineTotal"] = serde_json::json!(1);
        tokio::fs::write(&path, serde_json::to_vec(&vec![record]).unwrap())
            .await
            .unwrap();

        let loaded: Vec<Sale> = decode_snapshot(&path).await.unwrap();
        assert!(loaded.is_empty());
        assert!(!path.exists());

        // Each line fits, their sum does not
        let big = i64::MAX / 2 + 1;
        let mut record = serde_json::to_value(recorded_sale()).unwrap();
        let line = serde_json::json!({
            "visitorCategory": "national",
            "ticketType": "adult",
            "quantity": 1,
            "unitPrice": big,
            "lineTotal": big,
        });
        record["lines"] = serde_json::json!([line.clone(), line]);
        record["visitorCount"] = serde_json::json!(2);
        tokio::fs::write(&path, serde_json::to_vec(&vec![record]).unwrap())
            .await
            .unwrap();

        let loaded: Vec<Sale> = decode_snapshot(&path).await.unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_decode_records_reports_index() {
        let mut sale = recorded_sale();
        sale.client_name = "   ".to_string();
        let bytes = serde_json::to_vec(&vec![recorded_sale(), sale]).unwrap();

        match decode_records::<Sale>(&bytes) {
            Err(DbError::Corrupt(msg)) => assert!(msg.starts_with("sales[1]"), "{msg}"),
            other => panic!("expected corrupt error, got {other:?}"),
        }
        assert!(matches!(
            decode_records::<Sale>(b"{}"),
            Err(DbError::Serialization(_))
        ));
    }
}
