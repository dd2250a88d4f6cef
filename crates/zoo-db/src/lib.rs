//! # zoo-db: Storage Layer for the Zoo Cashier
//!
//! Keeps the sale ledger and the finance orders behind two repository
//! traits, with three interchangeable backends.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Zoo Cashier Data Flow                            │
//! │                                                                         │
//! │  CLI command (sell, orders approve, report daily)                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     zoo-db (THIS CRATE)                         │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐   ┌─────────────────┐   ┌──────────────┐   │   │
//! │  │   │   Database    │   │  Repositories   │   │  Snapshots   │   │   │
//! │  │   │   (pool.rs)   │◄──│ SaleRepository  │──►│  JSON files  │   │   │
//! │  │   │  SqlitePool   │   │ OrderRepository │   │  fail-closed │   │   │
//! │  │   └───────────────┘   └─────────────────┘   └──────────────┘   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                   │                             │
//! │       ▼                                   ▼                             │
//! │  zoo-cashier.db (WAL)          zoo-sales.json, zoo-finance-orders.json  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - SQLite connection pool and configuration
//! - [`migrations`] - Embedded schema migrations
//! - [`snapshot`] - JSON snapshot decoding and writing
//! - [`repository`] - Repository traits and backends
//! - [`error`] - Storage error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use zoo_db::{Database, DbConfig, Repositories};
//!
//! let db = Database::new(DbConfig::new("zoo-cashier.db")).await?;
//! let repos = Repositories::sqlite(&db);
//! repos.sales.append(&sale).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod snapshot;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::order::SqliteOrderRepository;
pub use repository::sale::SqliteSaleRepository;
pub use repository::snapshot_store::SnapshotStore;
pub use repository::{OrderRepository, Repositories, SaleRepository, ORDERS_FILE, SALES_FILE};
pub use snapshot::{decode_records, decode_snapshot, write_snapshot, Snapshot};
