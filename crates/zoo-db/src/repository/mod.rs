//! # Repository Module
//!
//! Storage traits for the two collections of the cash desk, and their
//! backends.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Command (sell, orders approve, report daily...)                        │
//! │       │                                                                 │
//! │       │  repos.sales.append(&sale)                                      │
//! │       ▼                                                                 │
//! │  dyn SaleRepository / dyn OrderRepository                               │
//! │       │                                                                 │
//! │       ├──► SqliteSaleRepository / SqliteOrderRepository   (sqlx)        │
//! │       └──► SnapshotStore<Sale> / SnapshotStore<FinanceOrder>            │
//! │                 ├── in memory                                           │
//! │                 └── JSON file (zoo-sales.json, zoo-finance-orders.json) │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`SaleRepository`] - Append-only sale ledger
//! - [`OrderRepository`] - Finance orders waiting for approval

pub mod order;
pub mod sale;
pub mod snapshot_store;

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use zoo_core::{FinanceOrder, Sale};

use crate::error::DbResult;
use crate::pool::Database;
use snapshot_store::SnapshotStore;

/// File name of the sale ledger snapshot.
pub const SALES_FILE: &str = "zoo-sales.json";

/// File name of the finance order snapshot.
pub const ORDERS_FILE: &str = "zoo-finance-orders.json";

// =============================================================================
// Traits
// =============================================================================

/// The sale ledger. Sales are immutable once appended.
#[async_trait]
pub trait SaleRepository: Send + Sync {
    /// Appends a sale.
    ///
    /// ## Errors
    /// [`crate::DbError::UniqueViolation`] if the sale id or invoice number
    /// is already in the ledger.
    async fn append(&self, sale: &Sale) -> DbResult<()>;

    /// All sales in insertion order.
    async fn list(&self) -> DbResult<Vec<Sale>>;

    async fn get(&self, id: &str) -> DbResult<Option<Sale>>;

    /// The sale recorded for an approved finance order, if any.
    async fn find_by_order(&self, order_id: &str) -> DbResult<Option<Sale>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .find(|s| s.order_id.as_deref() == Some(order_id)))
    }

    /// Empties the ledger and returns how many sales were removed.
    async fn clear(&self) -> DbResult<u64>;
}

/// Finance orders produced by the reservation flow.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// ## Errors
    /// [`crate::DbError::UniqueViolation`] if the id is taken.
    async fn insert(&self, order: &FinanceOrder) -> DbResult<()>;

    /// Inserts every order or none of them.
    ///
    /// ## Errors
    /// [`crate::DbError::UniqueViolation`] if any id is taken; nothing is
    /// stored then.
    async fn insert_all(&self, orders: &[FinanceOrder]) -> DbResult<()>;

    /// All orders in insertion order.
    async fn list(&self) -> DbResult<Vec<FinanceOrder>>;

    async fn list_pending(&self) -> DbResult<Vec<FinanceOrder>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(FinanceOrder::is_pending)
            .collect())
    }

    async fn get(&self, id: &str) -> DbResult<Option<FinanceOrder>>;

    /// Replaces the stored order with the same id.
    ///
    /// ## Errors
    /// [`crate::DbError::NotFound`] if no order has that id.
    async fn update(&self, order: &FinanceOrder) -> DbResult<()>;

    /// ## Errors
    /// [`crate::DbError::NotFound`] if no order has that id.
    async fn delete(&self, id: &str) -> DbResult<()>;

    async fn clear(&self) -> DbResult<u64>;
}

// =============================================================================
// Repository Set
// =============================================================================

/// Both collections behind one handle, whatever the backend.
#[derive(Clone)]
pub struct Repositories {
    pub sales: Arc<dyn SaleRepository>,
    pub orders: Arc<dyn OrderRepository>,
    /// Set for SQLite, where both collections share one database.
    db: Option<Database>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        Repositories {
            sales: Arc::new(SnapshotStore::<Sale>::in_memory()),
            orders: Arc::new(SnapshotStore::<FinanceOrder>::in_memory()),
            db: None,
        }
    }

    /// Opens the two JSON snapshot files in `data_dir`. Corrupt files are
    /// discarded.
    pub async fn json(data_dir: &Path) -> DbResult<Self> {
        let sales = SnapshotStore::<Sale>::open(data_dir.join(SALES_FILE)).await?;
        let orders = SnapshotStore::<FinanceOrder>::open(data_dir.join(ORDERS_FILE)).await?;
        Ok(Repositories {
            sales: Arc::new(sales),
            orders: Arc::new(orders),
            db: None,
        })
    }

    pub fn sqlite(db: &Database) -> Self {
        Repositories {
            sales: Arc::new(db.sales()),
            orders: Arc::new(db.orders()),
            db: Some(db.clone()),
        }
    }

    /// Stores an approval: the order's sale goes into the ledger and the
    /// order is replaced by its processed version.
    ///
    /// SQLite writes both in one transaction. The snapshot backends keep
    /// two files, so the sale is written first; an interrupted approval is
    /// recognised afterwards through [`SaleRepository::find_by_order`].
    pub async fn record_approval(&self, sale: &Sale, order: &FinanceOrder) -> DbResult<()> {
        match &self.db {
            Some(db) => db.record_approval(sale, order).await,
            None => {
                self.sales.append(sale).await?;
                self.orders.update(order).await
            }
        }
    }
}

impl std::fmt::Debug for Repositories {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repositories").finish_non_exhaustive()
    }
}
