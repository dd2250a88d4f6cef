//! # Cashier Commands
//!
//! One function per CLI action. Commands take the opened [`AppState`],
//! do their work through `zoo-core` and the repositories, and hand back a
//! serializable result that `output` renders as a table or JSON.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs      ◄─── You are here (exports)
//! ├── sale.rs     ◄─── sell, quote, ledger, invoice
//! ├── order.rs    ◄─── finance orders: list, add, import, approve, reject
//! ├── report.rs   ◄─── daily cash report, visitor stats and documents
//! └── config.rs   ◄─── tariff and configuration display
//! ```
//!
//! ## Command Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  zoo-cashier sell --client "Famille Mbala" --add national:adult=2       │
//! │         │                                                               │
//! │         ▼  (clap)                                                       │
//! │  commands::sale::sell(&state, request, now)                             │
//! │         │                                                               │
//! │         ├── TicketSheet::checkout()   (zoo-core, pure)                  │
//! │         ├── repos.sales.append()      (zoo-db)                          │
//! │         └── spool.spool(receipt)      (print)                           │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Result<SaleRecorded, ApiError> ──► table / --json                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`AppState`]: crate::state::AppState

pub mod config;
pub mod order;
pub mod report;
pub mod sale;

use serde::Serialize;
use std::path::PathBuf;

/// A document written to the print directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Printed {
    pub kind: String,
    pub path: PathBuf,
}

impl Printed {
    pub(crate) fn new(kind: crate::print::DocumentKind, path: PathBuf) -> Self {
        Printed {
            kind: kind.slug().to_string(),
            path,
        }
    }
}
