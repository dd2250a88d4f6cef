//! # Snapshot Store
//!
//! A collection kept in memory and, optionally, mirrored to a JSON file.
//!
//! ```text
//! SnapshotStore<T>
//! ├── records: Mutex<Vec<T>>      insertion order
//! └── path: Option<PathBuf>       None = memory only
//!
//! mutation: clone → change → write file → swap in
//! ```
//!
//! Every change rewrites the whole array. If the write fails the in-memory
//! collection is left as it was.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};
use zoo_core::{FinanceOrder, Sale};

use super::{OrderRepository, SaleRepository};
use crate::error::{DbError, DbResult};
use crate::snapshot::{decode_snapshot, write_snapshot, Snapshot};

#[derive(Debug)]
pub struct SnapshotStore<T> {
    path: Option<PathBuf>,
    records: Mutex<Vec<T>>,
}

impl<T: Snapshot + Clone> SnapshotStore<T> {
    pub fn in_memory() -> Self {
        SnapshotStore {
            path: None,
            records: Mutex::new(Vec::new()),
        }
    }

    /// Loads `path` through the fail-closed decoder.
    pub async fn open(path: impl Into<PathBuf>) -> DbResult<Self> {
        let path = path.into();
        let records = decode_snapshot::<T>(&path).await?;
        info!(
            path = %path.display(),
            collection = T::COLLECTION,
            count = records.len(),
            "Snapshot store opened"
        );
        Ok(SnapshotStore {
            path: Some(path),
            records: Mutex::new(records),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    async fn snapshot(&self) -> Vec<T> {
        self.records.lock().await.clone()
    }

    /// Applies `change` to a copy, persists it, then commits.
    async fn mutate<R>(&self, change: impl FnOnce(&mut Vec<T>) -> DbResult<R>) -> DbResult<R> {
        let mut records = self.records.lock().await;
        let mut next = records.clone();
        let result = change(&mut next)?;

        if let Some(path) = &self.path {
            write_snapshot(path, &next).await?;
        }
        *records = next;
        Ok(result)
    }
}

// =============================================================================
// Sale Ledger
// =============================================================================

#[async_trait]
impl SaleRepository for SnapshotStore<Sale> {
    async fn append(&self, sale: &Sale) -> DbResult<()> {
        debug!(sale_id = %sale.id, invoice = %sale.invoice_number, "Appending sale");
        self.mutate(|sales| {
            if sales.iter().any(|s| s.id == sale.id) {
                return Err(DbError::duplicate("sales.id", &sale.id));
            }
            if sales.iter().any(|s| s.invoice_number == sale.invoice_number) {
                return Err(DbError::duplicate("sales.invoice_number", &sale.invoice_number));
            }
            sales.push(sale.clone());
            Ok(())
        })
        .await
    }

    async fn list(&self) -> DbResult<Vec<Sale>> {
        Ok(self.snapshot().await)
    }

    async fn get(&self, id: &str) -> DbResult<Option<Sale>> {
        Ok(self.records.lock().await.iter().find(|s| s.id == id).cloned())
    }

    async fn clear(&self) -> DbResult<u64> {
        self.mutate(|sales| {
            let removed = sales.len() as u64;
            sales.clear();
            Ok(removed)
        })
        .await
    }
}

// =============================================================================
// Finance Orders
// =============================================================================

#[async_trait]
impl OrderRepository for SnapshotStore<FinanceOrder> {
    async fn insert(&self, order: &FinanceOrder) -> DbResult<()> {
        debug!(order_id = %order.id, "Inserting finance order");
        self.mutate(|orders| {
            if orders.iter().any(|o| o.id == order.id) {
                return Err(DbError::duplicate("finance_orders.id", &order.id));
            }
            orders.push(order.clone());
            Ok(())
        })
        .await
    }

    async fn insert_all(&self, batch: &[FinanceOrder]) -> DbResult<()> {
        debug!(count = batch.len(), "Inserting finance orders");
        self.mutate(|orders| {
            for order in batch {
                if orders.iter().any(|o| o.id == order.id) {
                    return Err(DbError::duplicate("finance_orders.id", &order.id));
                }
                orders.push(order.clone());
            }
            Ok(())
        })
        .await
    }

    async fn list(&self) -> DbResult<Vec<FinanceOrder>> {
        Ok(self.snapshot().await)
    }

    async fn get(&self, id: &str) -> DbResult<Option<FinanceOrder>> {
        Ok(self.records.lock().await.iter().find(|o| o.id == id).cloned())
    }

    async fn update(&self, order: &FinanceOrder) -> DbResult<()> {
        self.mutate(|orders| {
            let slot = orders
                .iter_mut()
                .find(|o| o.id == order.id)
                .ok_or_else(|| DbError::not_found("FinanceOrder", &order.id))?;
            *slot = order.clone();
            Ok(())
        })
        .await
    }

    async fn delete(&self, id: &str) -> DbResult<()> {
        self.mutate(|orders| {
            let before = orders.len();
            orders.retain(|o| o.id != id);
            if orders.len() == before {
                return Err(DbError::not_found("FinanceOrder", id));
            }
            Ok(())
        })
        .await
    }

    async fn clear(&self) -> DbResult<u64> {
        self.mutate(|orders| {
            let removed = orders.len() as u64;
            orders.clear();
            Ok(removed)
        })
        .await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
