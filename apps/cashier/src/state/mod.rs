//! # State Module
//!
//! Everything a command needs, opened once per invocation.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  CashierConfig ──► AppState::open()                                     │
//! │                         │                                               │
//! │       ┌─────────────────┼──────────────────┬─────────────────┐          │
//! │       ▼                 ▼                  ▼                 ▼          │
//! │  ┌──────────┐   ┌──────────────┐   ┌──────────────┐  ┌────────────┐    │
//! │  │  config  │   │ Repositories │   │  PriceTable  │  │ PrintSpool │    │
//! │  │ (store,  │   │ sales+orders │   │  Discount    │  │ print dir  │    │
//! │  │  paths)  │   │ sqlite/json/ │   │  Policy      │  │            │    │
//! │  │          │   │ memory       │   │              │  │            │    │
//! │  └──────────┘   └──────────────┘   └──────────────┘  └────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;

use chrono::{DateTime, Utc};
use tracing::info;
use zoo_core::{DiscountPolicy, PriceTable, TicketSheet};
use zoo_db::{Database, DbConfig, DbError, Repositories};

use crate::error::ApiResult;
use crate::print::PrintSpool;
use config::{CashierConfig, StorageBackend};

/// Opened storage plus the tariff, for one command.
#[derive(Debug)]
pub struct AppState {
    pub config: CashierConfig,
    pub repos: Repositories,
    pub table: PriceTable,
    pub policy: DiscountPolicy,
    pub spool: PrintSpool,
    /// Kept to close the pool on shutdown.
    db: Option<Database>,
}

impl AppState {
    /// Opens the backend named in `config.storage`.
    ///
    /// The data directory is created if needed. JSON snapshots that fail
    /// to decode are discarded by the store itself.
    pub async fn open(config: CashierConfig) -> ApiResult<Self> {
        let backend = config.storage.backend;
        let (repos, db) = match backend {
            StorageBackend::Memory => (Repositories::in_memory(), None),
            StorageBackend::Json => {
                let dir = config.data_dir();
                tokio::fs::create_dir_all(&dir).await.map_err(DbError::from)?;
                (Repositories::json(&dir).await?, None)
            }
            StorageBackend::Sqlite => {
                let path = config.database_path();
                if let Some(parent) = path.parent() {
                    tokio::fs::create_dir_all(parent).await.map_err(DbError::from)?;
                }
                let db = Database::new(DbConfig::new(path)).await?;
                (Repositories::sqlite(&db), Some(db))
            }
        };

        info!(%backend, data_dir = %config.data_dir().display(), "Storage opened");
        Ok(Self::with_repositories(config, repos, db))
    }

    /// State over a fresh in-memory backend, whatever the config says.
    pub fn in_memory(config: CashierConfig) -> Self {
        Self::with_repositories(config, Repositories::in_memory(), None)
    }

    fn with_repositories(config: CashierConfig, repos: Repositories, db: Option<Database>) -> Self {
        let spool = PrintSpool::new(config.print_dir());
        AppState {
            config,
            repos,
            table: PriceTable::standard(),
            policy: DiscountPolicy::standard(),
            spool,
            db,
        }
    }

    /// An empty ticket sheet priced with this state's tariff.
    pub fn sheet(&self, now: DateTime<Utc>) -> TicketSheet {
        TicketSheet::new(self.table.clone(), self.policy, now)
    }

    /// Currency suffix for amounts in output and documents.
    pub fn currency(&self) -> &str {
        &self.config.store.currency
    }

    pub async fn close(self) {
        if let Some(db) = self.db {
            db.close().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_each_backend() {
        let dir = tempfile::tempdir().unwrap();

        for backend in [StorageBackend::Memory, StorageBackend::Json, StorageBackend::Sqlite] {
            let config = CashierConfig::under(&dir.path().join(backend.to_string()), backend);
            let state = AppState::open(config).await.unwrap();
            assert!(state.repos.sales.list().await.unwrap().is_empty());
            assert_eq!(state.currency(), "FC");
            state.close().await;
        }

        assert!(dir.path().join("sqlite").join(super::config::DATABASE_FILE).exists());
    }

    #[tokio::test]
    async fn test_sheet_uses_state_tariff() {
        let state = AppState::in_memory(CashierConfig::default());
        let mut sheet = state.sheet(Utc::now());
        sheet.set_quantity(
            zoo_core::VisitorCategory::National,
            zoo_core::TicketType::Adult,
            2,
        );
        assert_eq!(sheet.totals().gross_amount.francs(), 5_000);
    }
}
