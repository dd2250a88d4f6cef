//! # Sale Commands
//!
//! Recording sales at the desk, quoting without recording, and browsing
//! the ledger.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, info, warn};

use zoo_core::validation::parse_quantity_input;
use zoo_core::{
    CoreError, Sale, SaleLineItem, SaleTotals, TicketSheet, TicketType, ValidationError,
    VisitorCategory,
};

use super::Printed;
use crate::error::{ApiError, ApiResult};
use crate::print::{receipt, DocumentKind};
use crate::state::AppState;

// =============================================================================
// Ticket Spec
// =============================================================================

/// One `CATEGORY:TYPE=QTY` argument, e.g. `national:adult=3`.
///
/// The quantity is read like the sheet's quantity field: text that is not
/// a number counts as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TicketSpec {
    pub category: VisitorCategory,
    pub ticket_type: TicketType,
    pub quantity: i64,
}

impl FromStr for TicketSpec {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidFormat {
            field: "billets".to_string(),
            reason: format!("'{}' au lieu de CATÉGORIE:TYPE=QTÉ", s),
        };

        let (kind, quantity) = s.split_once('=').ok_or_else(invalid)?;
        let (category, ticket_type) = kind.split_once(':').ok_or_else(invalid)?;

        Ok(TicketSpec {
            category: category.parse()?,
            ticket_type: ticket_type.parse()?,
            quantity: parse_quantity_input(quantity),
        })
    }
}

/// A sheet priced with the state's tariff and filled from `tickets`.
fn fill_sheet(
    state: &AppState,
    tickets: &[TicketSpec],
    now: DateTime<Utc>,
) -> ApiResult<TicketSheet> {
    let mut sheet = state.sheet(now);
    for spec in tickets {
        sheet.add_visitors(spec.category, spec.ticket_type, spec.quantity)?;
    }
    Ok(sheet)
}

// =============================================================================
// Sell
// =============================================================================

#[derive(Debug, Clone)]
pub struct SellRequest {
    pub client: String,
    pub tickets: Vec<TicketSpec>,
    /// Spool a receipt after recording.
    pub receipt: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleRecorded {
    pub sale: Sale,
    pub receipt: Option<Printed>,
}

/// Checks out a sheet and appends the sale to the ledger.
///
/// ## Errors
/// - no visitors, then blank client (nothing is recorded)
/// - storage failure
/// - print failure when a receipt was asked for; the sale stays recorded
pub async fn sell(
    state: &AppState,
    request: SellRequest,
    now: DateTime<Utc>,
) -> ApiResult<SaleRecorded> {
    let mut sheet = fill_sheet(state, &request.tickets, now)?;
    sheet.set_client_name(request.client);

    let sale = sheet.checkout(now)?;
    state.repos.sales.append(&sale).await?;

    info!(
        sale_id = %sale.id,
        visitors = sale.visitor_count,
        net = %sale.net_amount,
        "Sale recorded"
    );

    let receipt = if request.receipt {
        let doc = receipt::receipt(&sale, &state.config.store, &state.policy);
        let path = state.spool.spool(&doc).await.inspect_err(|_| {
            warn!(sale_id = %sale.id, "Sale recorded but its receipt could not be printed");
        })?;
        Some(Printed::new(DocumentKind::Receipt, path))
    } else {
        None
    };

    Ok(SaleRecorded { sale, receipt })
}

// =============================================================================
// Quote
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Lines with at least one visitor.
    pub lines: Vec<SaleLineItem>,
    pub totals: SaleTotals,
    pub receipt: Option<Printed>,
}

/// Prices tickets without touching the ledger.
///
/// With `receipt`, a preview receipt is spooled; that needs visitors and a
/// client name exactly like a checkout.
pub async fn quote(
    state: &AppState,
    tickets: &[TicketSpec],
    client: Option<String>,
    receipt: bool,
    now: DateTime<Utc>,
) -> ApiResult<Quote> {
    let mut sheet = fill_sheet(state, tickets, now)?;
    if let Some(client) = client {
        sheet.set_client_name(client);
    }

    let totals = sheet.totals();
    debug!(visitors = totals.visitor_count, net = %totals.net_amount, "Quote computed");

    let receipt = if receipt {
        let preview = sheet.receipt_preview(now)?;
        let doc = receipt::receipt(&preview, &state.config.store, &state.policy);
        Some(Printed::new(DocumentKind::Receipt, state.spool.spool(&doc).await?))
    } else {
        None
    };

    Ok(Quote {
        lines: sheet.lines().iter().filter(|l| l.quantity > 0).cloned().collect(),
        totals,
        receipt,
    })
}

// =============================================================================
// Ledger
// =============================================================================

/// Every recorded sale, oldest first.
pub async fn ledger_list(state: &AppState) -> ApiResult<Vec<Sale>> {
    Ok(state.repos.sales.list().await?)
}

pub async fn ledger_show(state: &AppState, id: &str) -> ApiResult<Sale> {
    state
        .repos
        .sales
        .get(id)
        .await?
        .ok_or_else(|| CoreError::SaleNotFound(id.to_string()).into())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerCleared {
    pub removed: u64,
}

/// Empties the ledger. Refused unless `confirmed`.
pub async fn ledger_clear(state: &AppState, confirmed: bool) -> ApiResult<LedgerCleared> {
    if !confirmed {
        return Err(ApiError::validation(
            "Effacer toutes les ventes ? Relancez avec --yes pour confirmer",
        ));
    }
    let removed = state.repos.sales.clear().await?;
    warn!(removed, "Sale ledger cleared");
    Ok(LedgerCleared { removed })
}

/// Spools the FACTURE of a recorded sale.
pub async fn invoice(state: &AppState, sale_id: &str) -> ApiResult<Printed> {
    let sale = ledger_show(state, sale_id).await?;
    let doc = receipt::invoice(&sale, &state.config.store, &state.policy);
    let path: PathBuf = state.spool.spool(&doc).await?;
    info!(sale_id = %sale.id, invoice = %sale.invoice_number, "Invoice printed");
    Ok(Printed::new(DocumentKind::Invoice, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::state::config::{CashierConfig, StorageBackend};

    fn spec(s: &str) -> TicketSpec {
        s.parse().unwrap()
    }

    fn state_in(dir: &std::path::Path) -> AppState {
        AppState::in_memory(CashierConfig::under(dir, StorageBackend::Memory))
    }

    #[test]
    fn test_ticket_spec_parsing() {
        assert_eq!(
            spec("national:adult=3"),
            TicketSpec {
                category: VisitorCategory::National,
                ticket_type: TicketType::Adult,
                quantity: 3,
            }
        );
        assert_eq!(spec("Expatrié:Enfant=2").category, VisitorCategory::Expatriate);
        // Unparsable quantities count as zero, like the sheet field
        assert_eq!(spec("diplomatic:child=beaucoup").quantity, 0);
        assert!("national-adult=3".parse::<TicketSpec>().is_err());
        assert!("tourist:adult=3".parse::<TicketSpec>().is_err());
    }

    #[tokio::test]
    async fn test_sell_records_and_prints() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_in(dir.path());

        let recorded = sell(
            &state,
            SellRequest {
                client: "École Saint-Joseph".to_string(),
                tickets: vec![spec("national:adult=100"), spec("national:child=20")],
                receipt: true,
            },
            Utc::now(),
        )
        .await
        .unwrap();

        assert_eq!(recorded.sale.visitor_count, 120);
        assert_eq!(recorded.sale.net_amount.francs(), 243_000);
        let printed = recorded.receipt.unwrap();
        assert!(printed.path.starts_with(dir.path().join("prints")));
        assert!(printed.path.exists());

        let ledger = ledger_list(&state).await.unwrap();
        assert_eq!(ledger, vec![recorded.sale.clone()]);
        assert_eq!(ledger_show(&state, &recorded.sale.id).await.unwrap(), recorded.sale);
    }

    #[tokio::test]
    async fn test_sell_rejections_leave_ledger_empty() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_in(dir.path());

        let err = sell(
            &state,
            SellRequest {
                client: "Famille Mbala".to_string(),
                tickets: vec![spec("national:adult=0")],
                receipt: false,
            },
            Utc::now(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.message, "Veuillez ajouter au moins un visiteur");

        let err = sell(
            &state,
            SellRequest {
                client: "   ".to_string(),
                tickets: vec![spec("national:adult=2")],
                receipt: false,
            },
            Utc::now(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.message, "Veuillez saisir le nom du client");

        assert!(ledger_list(&state).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_quote_does_not_record() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_in(dir.path());

        let quote = quote(&state, &[spec("national:adult=40")], None, false, Utc::now())
            .await
            .unwrap();
        assert_eq!(quote.totals.visitor_count, 40);
        assert_eq!(quote.totals.gross_amount.francs(), 100_000);
        assert!(quote.totals.discount_amount.is_zero());
        assert_eq!(quote.lines.len(), 1);
        assert!(ledger_list(&state).await.unwrap().is_empty());

        // A preview receipt needs a client
        let err = super::quote(&state, &[spec("national:adult=1")], None, true, Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "Veuillez saisir le nom du client avant d'imprimer le reçu");
    }

    #[tokio::test]
    async fn test_receipt_for_empty_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_in(dir.path());

        let err = quote(
            &state,
            &[spec("national:adult=0")],
            Some("Famille Mbala".to_string()),
            true,
            Utc::now(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);
        assert_eq!(err.message, "Aucune vente à imprimer");
        assert!(!dir.path().join("prints").exists());
    }

    #[tokio::test]
    async fn test_ledger_clear_needs_confirmation() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_in(dir.path());
        sell(
            &state,
            SellRequest {
                client: "Famille Kasongo".to_string(),
                tickets: vec![spec("expatriate:child=2")],
                receipt: false,
            },
            Utc::now(),
        )
        .await
        .unwrap();

        assert!(ledger_clear(&state, false).await.is_err());
        assert_eq!(ledger_list(&state).await.unwrap().len(), 1);
        assert_eq!(ledger_clear(&state, true).await.unwrap().removed, 1);
        assert!(ledger_list(&state).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invoice_for_unknown_sale() {
        let dir = tempfile::tempdir().unwrap();
        let err = invoice(&state_in(dir.path()), "SALE-0-missing").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert!(err.message.contains("SALE-0-missing"));
    }
}
