//! # Error Types
//!
//! Domain-specific error types for zoo-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  zoo-core errors (this file)                                           │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  zoo-db errors (separate crate)                                        │
//! │  └── DbError          - Storage failures                               │
//! │                                                                         │
//! │  cashier errors (in app)                                               │
//! │  └── ApiError         - What the cashier sees                          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → terminal               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Messages are the French sentences shown to the cashier.

use thiserror::Error;

use crate::types::VisitorCategory;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// Checkout attempted with every quantity at zero.
    ///
    /// ## User Workflow
    /// ```text
    /// Cashier clicks "Enregistrer la vente"
    ///      │
    ///      ▼
    /// visitor_count == 0 ?
    ///      │
    ///      ▼
    /// NoVisitors → alert, sheet untouched
    /// ```
    #[error("Veuillez ajouter au moins un visiteur")]
    NoVisitors,

    /// Checkout attempted with a blank client name.
    #[error("Veuillez saisir le nom du client")]
    ClientNameRequired,

    /// Receipt printed before a client name was typed.
    #[error("Veuillez saisir le nom du client avant d'imprimer le reçu")]
    ReceiptClientRequired,

    /// A printable document was requested with nothing to put in it.
    #[error("{0}")]
    NothingToPrint(String),

    /// Sale not found in the ledger.
    #[error("Vente introuvable : {0}")]
    SaleNotFound(String),

    /// Finance order not found.
    #[error("Commande introuvable : {0}")]
    OrderNotFound(String),

    /// Approval of an order that is no longer pending.
    #[error("Commande déjà traitée : {0}")]
    OrderAlreadyProcessed(String),

    /// A price table tried to charge a free category.
    #[error("La catégorie {category} est gratuite et ne peut pas avoir de prix")]
    FreeCategoryPriced { category: VisitorCategory },

    /// Line quantity exceeds the sheet maximum.
    #[error("La quantité {requested} dépasse le maximum autorisé ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Validation error (wraps ValidationError).
    #[error("{0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Shorthand for [`CoreError::NothingToPrint`].
    pub fn nothing_to_print(message: impl Into<String>) -> Self {
        CoreError::NothingToPrint(message.into())
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("Le champ {field} est obligatoire")]
    Required { field: String },

    /// Field value is too long.
    #[error("Le champ {field} ne doit pas dépasser {max} caractères")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("Le champ {field} doit être compris entre {min} et {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("Le champ {field} doit être positif")]
    MustBePositive { field: String },

    /// Invalid format (unknown category, malformed date, ...).
    #[error("Le champ {field} est invalide : {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("Le champ {field} doit être l'une des valeurs : {}", .allowed.join(", "))]
    NotAllowed { field: String, allowed: Vec<String> },

    /// A stored record breaks one of the sale / order invariants.
    #[error("Enregistrement incohérent ({record}) : {reason}")]
    Inconsistent { record: String, reason: String },
}

impl ValidationError {
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    pub fn inconsistent(record: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::Inconsistent {
            record: record.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkout_messages() {
        assert_eq!(
            CoreError::NoVisitors.to_string(),
            "Veuillez ajouter au moins un visiteur"
        );
        assert_eq!(
            CoreError::ClientNameRequired.to_string(),
            "Veuillez saisir le nom du client"
        );
        assert_eq!(
            CoreError::nothing_to_print("Aucune vente à imprimer").to_string(),
            "Aucune vente à imprimer"
        );
    }

    #[test]
    fn test_free_category_message_uses_label() {
        let err = CoreError::FreeCategoryPriced {
            category: VisitorCategory::Diplomatic,
        };
        assert_eq!(
            err.to_string(),
            "La catégorie Diplomatique est gratuite et ne peut pas avoir de prix"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        assert_eq!(
            ValidationError::required("client").to_string(),
            "Le champ client est obligatoire"
        );
        let err = ValidationError::NotAllowed {
            field: "période".to_string(),
            allowed: vec!["day".to_string(), "week".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Le champ période doit être l'une des valeurs : day, week"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::required("token").into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
