//! # Identifier Generation
//!
//! Sale ids and invoice numbers.
//!
//! ## Formats
//! ```text
//! Sale id:         SALE-1718000000000-k3j9x0a1b
//!                       └ unix millis ┘ └ 9 base36 ┘
//!
//! Invoice number:  FAC-20240610-000000-7qz1
//!                      └ date ┘ └ms%1e6┘ └4 base36┘
//! ```
//!
//! Uniqueness is best-effort: a timestamp plus random base-36 characters.
//! The SQLite ledger carries UNIQUE constraints so a collision surfaces as
//! an error instead of an overwrite.

use chrono::{DateTime, Utc};
use uuid::Uuid;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generates a sale id for a sale started at `now`.
pub fn sale_id(now: DateTime<Utc>) -> String {
    format!("SALE-{}-{}", now.timestamp_millis(), random_base36(9))
}

/// Generates an invoice number for a sale recorded at `now`.
pub fn invoice_number(now: DateTime<Utc>) -> String {
    format!(
        "FAC-{}-{:06}-{}",
        now.format("%Y%m%d"),
        now.timestamp_millis().rem_euclid(1_000_000),
        random_base36(4)
    )
}

/// Generates an order id for orders entered by hand at the desk.
pub fn order_id(now: DateTime<Utc>) -> String {
    format!("ORD-{}-{}", now.timestamp_millis(), random_base36(6))
}

/// `len` random base-36 characters drawn from a v4 UUID.
fn random_base36(len: usize) -> String {
    let mut bits = Uuid::new_v4().as_u128();
    (0..len)
        .map(|_| {
            let digit = (bits % 36) as usize;
            bits /= 36;
            BASE36[digit] as char
        })
        .collect()
}
