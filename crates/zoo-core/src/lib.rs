//! # zoo-core: Pure Business Logic for the Zoo Cash Desk
//!
//! Everything the cash desk computes lives here as pure functions with zero
//! I/O: ticket prices, the group discount, the cashier's working sheet, sale
//! construction, pending-order approval and visitor statistics.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Zoo Cashier Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 apps/cashier (zoo-cashier CLI)                  │   │
//! │  │    sell ──► receipt      orders approve ──► ledger              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ zoo-core (THIS CRATE) ★                         │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐          │   │
//! │  │   │ pricing  │ │  sheet   │ │  order   │ │  stats   │          │   │
//! │  │   │PriceTable│ │TicketShee│ │ approve  │ │ filters  │          │   │
//! │  │   │ Discount │ │ checkout │ │          │ │ totals   │          │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────┘          │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    zoo-db (Storage Layer)                       │   │
//! │  │        sale ledger + finance orders (SQLite / JSON / memory)    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (categories, Sale, FinanceOrder)
//! - [`money`] - Money type with integer arithmetic (centimes)
//! - [`pricing`] - Price table, group discount, sale assembly
//! - [`sheet`] - The cashier's working ticket sheet and checkout
//! - [`order`] - Pending finance order approval
//! - [`stats`] - Visitor filters and statistics
//! - [`ids`] - Sale id and invoice number generation
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::Utc;
//! use zoo_core::{TicketSheet, TicketType, VisitorCategory};
//!
//! let mut sheet = TicketSheet::standard(Utc::now());
//! sheet.set_quantity(VisitorCategory::National, TicketType::Adult, 100);
//! sheet.set_quantity(VisitorCategory::National, TicketType::Child, 20);
//! sheet.set_client_name("École Saint-Joseph");
//!
//! let sale = sheet.checkout(Utc::now()).unwrap();
//! assert_eq!(sale.visitor_count, 120);
//! assert_eq!(sale.net_amount.francs(), 243_000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod ids;
pub mod money;
pub mod order;
pub mod pricing;
pub mod sheet;
pub mod stats;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use order::{approve_order, Approval};
pub use pricing::{DiscountPolicy, PriceTable, SaleTotals};
pub use sheet::TicketSheet;
pub use stats::{CategoryStat, Period, SaleFilter, VisitorStats};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Visitor count from which a sale earns the group discount (inclusive).
pub const GROUP_DISCOUNT_THRESHOLD: i64 = 100;

/// Group discount in basis points (1000 = 10%).
pub const GROUP_DISCOUNT_BPS: u32 = 1000;

/// Maximum quantity on a single sheet line.
///
/// Keeps `quantity × unit price` far away from `i64` overflow.
pub const MAX_LINE_QUANTITY: i64 = 99_999;

/// Maximum length of a client name, in characters.
pub const MAX_CLIENT_NAME_LEN: usize = 120;
