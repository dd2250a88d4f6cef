//! # API Error Type
//!
//! Unified error type returned by every cashier command.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Cashier                            │
//! │                                                                         │
//! │  Command Function: Result<T, ApiError>                                  │
//! │         │                                                               │
//! │         ├── CoreError   (no visitors, order already processed...)       │
//! │         ├── DbError     (storage, logged and replaced by a generic msg) │
//! │         ├── ConfigError (bad TOML, unknown backend)                     │
//! │         └── print spool failure                                         │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ApiError { code, message } ──► main prints `message`, exits non-zero   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Messages are the French texts the cashier sees. `code` is stable and
//! goes into `--json` output.

use serde::Serialize;
use zoo_core::CoreError;
use zoo_db::DbError;

use crate::state::config::ConfigError;

/// Error returned from cashier commands.
///
/// ## Serialization
/// ```json
/// { "code": "NOT_FOUND", "message": "Vente introuvable : SALE-1" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Message shown to the cashier
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Sale or order does not exist
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Request is well-formed but not allowed in the current state
    BusinessLogic,

    /// Storage operation failed
    DatabaseError,

    /// Configuration could not be loaded
    ConfigError,

    /// The print document could not be written
    PrintFailed,

    Internal,
}

impl ErrorCode {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorCode::ValidationError | ErrorCode::BusinessLogic | ErrorCode::NotFound => 1,
            ErrorCode::ConfigError => 2,
            ErrorCode::PrintFailed => 3,
            ErrorCode::DatabaseError | ErrorCode::Internal => 4,
        }
    }
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// The print window analogue could not be opened.
    pub fn print_failed() -> Self {
        ApiError::new(
            ErrorCode::PrintFailed,
            "Impossible d'ouvrir le document d'impression",
        )
    }
}

/// Converts storage errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => {
                ApiError::new(ErrorCode::NotFound, format!("{} introuvable : {}", entity, id))
            }
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::ValidationError,
                format!("Doublon pour {} : '{}' existe déjà", field, value),
            ),
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Connexion à la base de données impossible")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Database migration failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Mise à jour de la base de données impossible")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Base de données occupée")
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::new(ErrorCode::DatabaseError, "Référence invalide")
            }
            other => {
                // Log the actual error but return a generic message
                tracing::error!(error = %other, "Storage operation failed");
                ApiError::new(ErrorCode::DatabaseError, "Erreur d'enregistrement des données")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::SaleNotFound(_) | CoreError::OrderNotFound(_) => ErrorCode::NotFound,
            CoreError::OrderAlreadyProcessed(_) | CoreError::NothingToPrint(_) => {
                ErrorCode::BusinessLogic
            }
            CoreError::NoVisitors
            | CoreError::ClientNameRequired
            | CoreError::ReceiptClientRequired
            | CoreError::FreeCategoryPriced { .. }
            | CoreError::QuantityTooLarge { .. }
            | CoreError::Validation(_) => ErrorCode::ValidationError,
        };
        ApiError::new(code, err.to_string())
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::new(ErrorCode::ConfigError, err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_errors_keep_cashier_message() {
        let err = ApiError::from(CoreError::NoVisitors);
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "Veuillez ajouter au moins un visiteur");

        let err = ApiError::from(CoreError::OrderAlreadyProcessed("ORD-1".into()));
        assert_eq!(err.code, ErrorCode::BusinessLogic);
        assert!(err.message.contains("ORD-1"));
    }

    #[test]
    fn test_internal_storage_errors_are_generic() {
        let err = ApiError::from(DbError::Internal("disk I/O error at page 7".into()));
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.message.contains("page 7"));

        let err = ApiError::from(DbError::not_found("FinanceOrder", "ORD-9"));
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_string(&ApiError::print_failed()).unwrap();
        assert_eq!(
            json,
            r#"{"code":"PRINT_FAILED","message":"Impossible d'ouvrir le document d'impression"}"#
        );
    }
}
