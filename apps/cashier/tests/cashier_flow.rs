//! A day at the cash desk, end to end, on the JSON backend.

use chrono::{NaiveDate, TimeZone, Utc};

use zoo_cashier::commands::order::{self, NewOrder};
use zoo_cashier::commands::report::{self, FilterRequest, VisitorDocument};
use zoo_cashier::commands::sale::{self, SellRequest};
use zoo_cashier::error::ErrorCode;
use zoo_cashier::state::config::{CashierConfig, StorageBackend};
use zoo_cashier::state::AppState;
use zoo_core::{OrderStatus, Period, TicketType, VisitorCategory};
use zoo_db::SALES_FILE;

fn tickets(specs: &[&str]) -> Vec<sale::TicketSpec> {
    specs.iter().map(|s| s.parse().unwrap()).collect()
}

#[tokio::test]
async fn test_sales_and_orders_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let config = CashierConfig::under(dir.path(), StorageBackend::Json);
    let morning = Utc.with_ymd_and_hms(2025, 6, 14, 9, 30, 0).unwrap();

    let state = AppState::open(config.clone()).await.unwrap();

    let recorded = sale::sell(
        &state,
        SellRequest {
            client: "Famille Mbala".to_string(),
            tickets: tickets(&["national:adult=2", "national:child=3"]),
            receipt: true,
        },
        morning,
    )
    .await
    .unwrap();
    // 2 × 2 500 + 3 × 1 000, below the group threshold
    assert_eq!(recorded.sale.net_amount.francs(), 8_000);
    assert!(recorded.receipt.unwrap().path.exists());

    let school = order::add(
        &state,
        NewOrder {
            reservation_id: "RES-2025-061".to_string(),
            visitor_name: "Lycée Bosangani".to_string(),
            category: VisitorCategory::National,
            ticket_type: TicketType::Child,
            quantity: 150,
            visit_date: NaiveDate::from_ymd_opt(2025, 6, 14).unwrap(),
            token: "tok-bosangani".to_string(),
        },
        morning,
    )
    .await
    .unwrap();
    state.close().await;

    // Next invocation sees both
    let state = AppState::open(config.clone()).await.unwrap();
    assert_eq!(sale::ledger_list(&state).await.unwrap(), vec![recorded.sale.clone()]);

    let approved = order::approve(&state, &school.id, morning).await.unwrap();
    // 150 × 1 000 minus 10%
    assert_eq!(approved.sale.net_amount.francs(), 135_000);
    assert_eq!(approved.order.status, OrderStatus::Processed);
    state.close().await;

    let state = AppState::open(config).await.unwrap();
    assert_eq!(sale::ledger_list(&state).await.unwrap().len(), 2);
    assert!(order::list(&state, false).await.unwrap().is_empty());

    let today = FilterRequest::default();
    let summary = report::stats(&state, &today, morning).await.unwrap();
    assert_eq!(summary.stats.total_sales, 2);
    assert_eq!(summary.stats.total_visitors, 155);
    assert_eq!(summary.stats.total_revenue.francs(), 143_000);

    let daily = report::daily(&state, None, morning).await.unwrap();
    let html = std::fs::read_to_string(&daily.path).unwrap();
    assert!(html.contains("Lycée Bosangani"));
    assert!(html.contains("Famille Mbala"));

    let year = FilterRequest {
        period: Period::Year,
        ..FilterRequest::default()
    };
    let printed = report::print_visitors(&state, &year, VisitorDocument::List, morning)
        .await
        .unwrap();
    assert_eq!(printed.kind, "liste-visiteurs");
    state.close().await;
}

#[tokio::test]
async fn test_corrupt_ledger_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(SALES_FILE), "{ not a ledger").unwrap();

    let config = CashierConfig::under(dir.path(), StorageBackend::Json);
    let state = AppState::open(config).await.unwrap();
    assert!(sale::ledger_list(&state).await.unwrap().is_empty());

    // The desk keeps working
    let recorded = sale::sell(
        &state,
        SellRequest {
            client: "M. Kabila".to_string(),
            tickets: tickets(&["expatriate:adult=1"]),
            receipt: false,
        },
        Utc::now(),
    )
    .await
    .unwrap();
    assert_eq!(sale::ledger_list(&state).await.unwrap(), vec![recorded.sale]);
}

#[tokio::test]
async fn test_rejected_checkout_records_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let state = AppState::open(CashierConfig::under(dir.path(), StorageBackend::Memory))
        .await
        .unwrap();

    let err = sale::sell(
        &state,
        SellRequest {
            client: "Famille Mbala".to_string(),
            tickets: tickets(&["national:adult=0"]),
            receipt: false,
        },
        Utc::now(),
    )
    .await
    .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);
    assert_eq!(err.message, "Veuillez ajouter au moins un visiteur");

    let err = sale::sell(
        &state,
        SellRequest {
            client: "   ".to_string(),
            tickets: tickets(&["national:adult=1"]),
            receipt: false,
        },
        Utc::now(),
    )
    .await
    .unwrap_err();
    assert_eq!(err.message, "Veuillez saisir le nom du client");
    assert!(sale::ledger_list(&state).await.unwrap().is_empty());
}
