//! # Report Commands
//!
//! The daily cash report and the visitor page: statistics on screen,
//! visitor list and detailed report on paper.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::info;

use zoo_core::validation::validate_search_query;
use zoo_core::{CoreError, Period, Sale, SaleFilter, VisitorCategory, VisitorStats};

use super::Printed;
use crate::error::ApiResult;
use crate::print::report;
use crate::state::AppState;

/// Visitor page criteria as typed on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterRequest {
    pub period: Period,
    /// Defaults to today (UTC).
    pub date: Option<NaiveDate>,
    pub category: Option<VisitorCategory>,
    pub search: Option<String>,
}

impl FilterRequest {
    /// Builds the filter, rejecting a search text over 100 characters.
    pub fn to_filter(&self, now: DateTime<Utc>) -> ApiResult<SaleFilter> {
        let search = self
            .search
            .as_deref()
            .map(validate_search_query)
            .transpose()
            .map_err(CoreError::from)?;
        Ok(
            SaleFilter::new(self.period, self.date.unwrap_or_else(|| now.date_naive()))
                .with_category(self.category)
                .with_search(search),
        )
    }
}

/// Prints the RAPPORT JOURNALIER DE CAISSE of `date` (today by default).
///
/// ## Errors
/// "Aucune vente enregistrée aujourd'hui" when the day has no sale.
pub async fn daily(
    state: &AppState,
    date: Option<NaiveDate>,
    now: DateTime<Utc>,
) -> ApiResult<Printed> {
    let date = date.unwrap_or_else(|| now.date_naive());
    let ledger = state.repos.sales.list().await?;
    let day = SaleFilter::new(Period::Day, date).apply(&ledger);

    let doc = report::daily_report(date, &day, &state.config.store, now)?;
    let path = state.spool.spool(&doc).await?;
    info!(%date, sales = day.len(), "Daily report printed");
    Ok(Printed::new(doc.kind, path))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorSummary {
    pub period: String,
    pub category: String,
    pub stats: VisitorStats,
    pub sales: Vec<Sale>,
}

/// Figures of the visitor page for the selected sales.
pub async fn stats(
    state: &AppState,
    request: &FilterRequest,
    now: DateTime<Utc>,
) -> ApiResult<VisitorSummary> {
    let filter = request.to_filter(now)?;
    let ledger = state.repos.sales.list().await?;
    let selected = filter.apply(&ledger);

    Ok(VisitorSummary {
        period: filter.period_label(),
        category: filter.category_label().to_string(),
        stats: VisitorStats::from_sales(selected.iter().copied()),
        sales: selected.into_iter().cloned().collect(),
    })
}

/// Which visitor document to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitorDocument {
    List,
    Detailed,
}

/// Prints the visitor list or the detailed report for the selection.
///
/// ## Errors
/// "Aucune donnée à imprimer pour les critères sélectionnés" when nothing
/// matches.
pub async fn print_visitors(
    state: &AppState,
    request: &FilterRequest,
    document: VisitorDocument,
    now: DateTime<Utc>,
) -> ApiResult<Printed> {
    let filter = request.to_filter(now)?;
    let ledger = state.repos.sales.list().await?;
    let selected = filter.apply(&ledger);

    let doc = match document {
        VisitorDocument::List => {
            report::visitor_list(&filter, &selected, &state.config.store, now)?
        }
        VisitorDocument::Detailed => {
            report::detailed_report(&filter, &selected, &state.config.store, now)?
        }
    };
    let path = state.spool.spool(&doc).await?;
    info!(
        kind = doc.kind.slug(),
        period = %filter.period,
        sales = selected.len(),
        "Visitor document printed"
    );
    Ok(Printed::new(doc.kind, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::state::config::{CashierConfig, StorageBackend};
    use chrono::TimeZone;
    use zoo_core::{TicketSheet, TicketType};

    async fn seeded(dir: &std::path::Path) -> AppState {
        let state = AppState::in_memory(CashierConfig::under(dir, StorageBackend::Memory));
        let sales = [
            ((12, 9), "Famille Mbala", VisitorCategory::National, 3),
            ((12, 15), "Ambassade de France", VisitorCategory::Diplomatic, 4),
            ((20, 10), "Famille Kasongo", VisitorCategory::Expatriate, 1),
        ];
        for ((day, hour), client, category, qty) in sales {
            let at = Utc.with_ymd_and_hms(2025, 3, day, hour, 0, 0).unwrap();
            let mut sheet = TicketSheet::standard(at);
            sheet.set_quantity(category, TicketType::Adult, qty);
            sheet.set_client_name(client);
            state.repos.sales.append(&sheet.checkout(at).unwrap()).await.unwrap();
        }
        state
    }

    fn evening() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 12, 19, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_daily_report_for_today() {
        let dir = tempfile::tempdir().unwrap();
        let state = seeded(dir.path()).await;

        let printed = daily(&state, None, evening()).await.unwrap();
        assert_eq!(printed.kind, "rapport-journalier");
        let html = std::fs::read_to_string(&printed.path).unwrap();
        assert!(html.contains("<strong>Total des ventes:</strong> 2"));
        assert!(html.contains("<strong>Total des visiteurs:</strong> 7"));
    }

    #[tokio::test]
    async fn test_daily_report_for_empty_day() {
        let dir = tempfile::tempdir().unwrap();
        let state = seeded(dir.path()).await;

        let err = daily(&state, NaiveDate::from_ymd_opt(2025, 3, 13), evening())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);
        assert_eq!(err.message, "Aucune vente enregistrée le 13/03/2025");
    }

    #[tokio::test]
    async fn test_stats_with_search_and_category() {
        let dir = tempfile::tempdir().unwrap();
        let state = seeded(dir.path()).await;

        let month = FilterRequest {
            period: Period::Month,
            ..FilterRequest::default()
        };
        let summary = stats(&state, &month, evening()).await.unwrap();
        assert_eq!(summary.period, "mars 2025");
        assert_eq!(summary.stats.total_sales, 3);
        assert_eq!(summary.stats.total_visitors, 8);
        // 7 500 + 0 + 5 000
        assert_eq!(summary.stats.total_revenue.francs(), 12_500);

        let search = FilterRequest {
            period: Period::All,
            search: Some("  FAMILLE ".to_string()),
            ..FilterRequest::default()
        };
        assert_eq!(stats(&state, &search, evening()).await.unwrap().sales.len(), 2);

        let rambling = FilterRequest {
            period: Period::All,
            search: Some("x".repeat(101)),
            ..FilterRequest::default()
        };
        let err = stats(&state, &rambling, evening()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        let err = print_visitors(&state, &rambling, VisitorDocument::List, evening())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let diplomats = FilterRequest {
            period: Period::All,
            category: Some(VisitorCategory::Diplomatic),
            ..FilterRequest::default()
        };
        let summary = stats(&state, &diplomats, evening()).await.unwrap();
        assert_eq!(summary.category, "Diplomatique");
        assert_eq!(summary.stats.total_visitors, 4);
        assert!(summary.stats.total_revenue.is_zero());
    }

    #[tokio::test]
    async fn test_print_visitors() {
        let dir = tempfile::tempdir().unwrap();
        let state = seeded(dir.path()).await;

        let week = FilterRequest {
            period: Period::Week,
            ..FilterRequest::default()
        };
        let printed = print_visitors(&state, &week, VisitorDocument::Detailed, evening())
            .await
            .unwrap();
        assert_eq!(printed.kind, "rapport-detaille");
        assert!(printed.path.exists());

        let nobody = FilterRequest {
            period: Period::Day,
            date: NaiveDate::from_ymd_opt(2024, 1, 1),
            ..FilterRequest::default()
        };
        let err = print_visitors(&state, &nobody, VisitorDocument::List, evening())
            .await
            .unwrap_err();
        assert_eq!(err.message, "Aucune donnée à imprimer pour les critères sélectionnés");
    }
}
