//! # Validation Module
//!
//! Input validation for cashier-entered values.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Command line (clap)                                          │
//! │  └── Shape of arguments (CATEGORY:TYPE=QTY, dates)                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Client names, quantities, prices                                  │
//! │  └── Free-text quantity parsing                                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Record invariants (Sale::validate, FinanceOrder::validate)   │
//! │  └── Applied again when persisted data is loaded                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::{MAX_CLIENT_NAME_LEN, MAX_LINE_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a client name and returns it trimmed.
///
/// ```rust
/// use zoo_core::validation::validate_client_name;
///
/// assert_eq!(validate_client_name("  Ilunga ").unwrap(), "Ilunga");
/// assert!(validate_client_name("   ").is_err());
/// ```
pub fn validate_client_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::required("client"));
    }

    if name.chars().count() > MAX_CLIENT_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "client".to_string(),
            max: MAX_CLIENT_NAME_LEN,
        });
    }

    Ok(name.to_string())
}

/// Validates a visitor search query.
///
/// Empty is allowed (no filtering). Returns the trimmed query.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "recherche".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Parses a quantity typed into a sheet field.
///
/// Reads an optional sign followed by the leading digits and ignores the
/// rest. Anything without leading digits counts as zero. The result is
/// clamped to `0..=MAX_LINE_QUANTITY`.
///
/// ```rust
/// use zoo_core::validation::parse_quantity_input;
///
/// assert_eq!(parse_quantity_input("12"), 12);
/// assert_eq!(parse_quantity_input(" 7 visiteurs"), 7);
/// assert_eq!(parse_quantity_input("-4"), 0);
/// assert_eq!(parse_quantity_input("abc"), 0);
/// assert_eq!(parse_quantity_input(""), 0);
/// ```
pub fn parse_quantity_input(input: &str) -> i64 {
    let s = input.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let leading: String = digits.chars().take_while(|c| c.is_ascii_digit()).collect();
    if leading.is_empty() || negative {
        return 0;
    }

    // More digits than an i64 holds is still "a lot"
    leading
        .parse::<i64>()
        .unwrap_or(MAX_LINE_QUANTITY)
        .clamp(0, MAX_LINE_QUANTITY)
}

/// Validates a sheet line quantity.
///
/// Zero is valid on the sheet (it just means "none of these").
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if !(0..=MAX_LINE_QUANTITY).contains(&qty) {
        return Err(ValidationError::OutOfRange {
            field: "quantité".to_string(),
            min: 0,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a ticket price in centimes. Zero is allowed (free entry).
pub fn validate_price_centimes(centimes: i64) -> ValidationResult<()> {
    if centimes < 0 {
        return Err(ValidationError::OutOfRange {
            field: "prix".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a finance order payment token.
pub fn validate_token(token: &str) -> ValidationResult<()> {
    if token.trim().is_empty() {
        return Err(ValidationError::required("token"));
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
