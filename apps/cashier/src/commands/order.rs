//! # Finance Order Commands
//!
//! Orders come from the reservation flow and wait for the cashier.
//!
//! ```text
//! orders add / orders import ──► Pending ──approve──► Processed + Sale in ledger
//!                                   │
//!                                   └──reject──► deleted
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, warn};

use zoo_core::{
    approve_order, ids, CoreError, FinanceOrder, Money, OrderStatus, Sale, TicketType,
    ValidationError, VisitorCategory,
};
use zoo_db::{decode_records, DbError};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Orders, pending only unless `all`.
pub async fn list(state: &AppState, all: bool) -> ApiResult<Vec<FinanceOrder>> {
    let orders = if all {
        state.repos.orders.list().await?
    } else {
        state.repos.orders.list_pending().await?
    };
    Ok(orders)
}

async fn find(state: &AppState, id: &str) -> ApiResult<FinanceOrder> {
    state
        .repos
        .orders
        .get(id)
        .await?
        .ok_or_else(|| CoreError::OrderNotFound(id.to_string()).into())
}

// =============================================================================
// Intake
// =============================================================================

/// An order typed in at the desk on behalf of the reservation flow.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub reservation_id: String,
    pub visitor_name: String,
    pub category: VisitorCategory,
    pub ticket_type: TicketType,
    pub quantity: i64,
    pub visit_date: NaiveDate,
    pub token: String,
}

/// Creates a pending order. Its announced total is the tariff price, so
/// the cashier sees what approval will charge.
pub async fn add(state: &AppState, new: NewOrder, now: DateTime<Utc>) -> ApiResult<FinanceOrder> {
    let line = state.table.line(new.category, new.ticket_type, new.quantity);
    let discount = state.policy.discount_for(new.quantity, line.line_total);
    let total_amount: Money = line.line_total - discount;

    let order = FinanceOrder {
        id: ids::order_id(now),
        reservation_id: new.reservation_id.trim().to_string(),
        visitor_name: new.visitor_name.trim().to_string(),
        category: new.category,
        ticket_type: new.ticket_type,
        quantity: new.quantity,
        total_amount,
        visit_date: new.visit_date,
        status: OrderStatus::Pending,
        token: new.token.trim().to_string(),
        transfer_date: Some(now),
    };
    if order.visitor_name.is_empty() {
        return Err(CoreError::ClientNameRequired.into());
    }
    order.validate().map_err(CoreError::from)?;

    state.repos.orders.insert(&order).await?;
    info!(order_id = %order.id, reservation = %order.reservation_id, "Finance order added");
    Ok(order)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Imported {
    pub imported: usize,
    pub ids: Vec<String>,
}

/// Imports a JSON array of orders exported by the reservation flow.
///
/// The file is all or nothing: one undecodable, nameless, non-pending or
/// duplicate record rejects the whole file, and the accepted orders are
/// stored in one write.
pub async fn import(state: &AppState, file: &Path) -> ApiResult<Imported> {
    let bytes = tokio::fs::read(file).await.map_err(|e| {
        ApiError::validation(format!("Lecture de {} impossible : {}", file.display(), e))
    })?;

    let orders: Vec<FinanceOrder> = decode_records(&bytes).map_err(|e| match e {
        DbError::Corrupt(reason) => ApiError::validation(format!("Fichier rejeté : {}", reason)),
        DbError::Serialization(e) => {
            ApiError::validation(format!("Fichier rejeté : JSON invalide ({})", e))
        }
        other => ApiError::from(other),
    })?;

    let mut seen = HashSet::new();
    for order in &orders {
        if !order.is_pending() {
            return Err(CoreError::OrderAlreadyProcessed(order.id.clone()).into());
        }
        if !seen.insert(order.id.as_str()) || state.repos.orders.get(&order.id).await?.is_some() {
            return Err(ApiError::from(DbError::duplicate("id", &order.id)));
        }
    }
    if orders.is_empty() {
        return Err(CoreError::Validation(ValidationError::required("commandes")).into());
    }

    state.repos.orders.insert_all(&orders).await?;
    debug!(ids = ?orders.iter().map(|o| o.id.as_str()).collect::<Vec<_>>(), "Finance orders stored");

    info!(count = orders.len(), file = %file.display(), "Finance orders imported");
    Ok(Imported {
        imported: orders.len(),
        ids: orders.into_iter().map(|o| o.id).collect(),
    })
}

// =============================================================================
// Approval
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Approved {
    pub order: FinanceOrder,
    pub sale: Sale,
}

/// Approves a pending order: the matching sale goes into the ledger and
/// the order is stored as processed with the computed net.
///
/// ## Errors
/// - unknown id: not found, nothing changes
/// - already processed: "Commande déjà traitée", nothing changes
/// - pending, but the ledger already holds its sale (an approval cut short
///   between the two writes): the order is marked processed with that
///   sale's net and "Commande déjà traitée" is returned, no second sale
pub async fn approve(state: &AppState, id: &str, now: DateTime<Utc>) -> ApiResult<Approved> {
    let order = find(state, id).await?;

    if order.is_pending() {
        if let Some(existing) = state.repos.sales.find_by_order(&order.id).await? {
            warn!(
                order_id = %order.id,
                sale_id = %existing.id,
                "Order still pending but its sale is in the ledger, completing it"
            );
            let mut repaired = order.clone();
            repaired.status = OrderStatus::Processed;
            repaired.total_amount = existing.net_amount;
            state.repos.orders.update(&repaired).await?;
            return Err(CoreError::OrderAlreadyProcessed(order.id).into());
        }
    }

    let approval = approve_order(&order, &state.table, &state.policy, now)?;
    state
        .repos
        .record_approval(&approval.sale, &approval.order)
        .await?;

    info!(
        order_id = %approval.order.id,
        sale_id = %approval.sale.id,
        visitors = approval.sale.visitor_count,
        net = %approval.sale.net_amount,
        "Finance order approved"
    );

    Ok(Approved {
        order: approval.order,
        sale: approval.sale,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rejected {
    pub order_id: String,
}

/// Deletes the order. No sale is created and nothing else is kept.
pub async fn reject(state: &AppState, id: &str) -> ApiResult<Rejected> {
    match state.repos.orders.delete(id).await {
        Ok(()) => {
            info!(order_id = %id, "Finance order rejected and deleted");
            Ok(Rejected {
                order_id: id.to_string(),
            })
        }
        Err(e) if e.is_not_found() => Err(CoreError::OrderNotFound(id.to_string()).into()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::state::config::{CashierConfig, StorageBackend};

    fn state_in(dir: &Path) -> AppState {
        AppState::in_memory(CashierConfig::under(dir, StorageBackend::Memory))
    }

    fn new_order(name: &str, category: VisitorCategory, quantity: i64) -> NewOrder {
        NewOrder {
            reservation_id: "RES-0001".to_string(),
            visitor_name: name.to_string(),
            category,
            ticket_type: TicketType::Child,
            quantity,
            visit_date: NaiveDate::from_ymd_opt(2025, 7, 5).unwrap(),
            token: "tok-123".to_string(),
        }
    }

    #[tokio::test]
    async fn test_add_and_approve() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_in(dir.path());
        let now = Utc::now();

        let order = add(&state, new_order("Lycée Bosangani", VisitorCategory::National, 120), now)
            .await
            .unwrap();
        // 120 × 1 000, minus 10%
        assert_eq!(order.total_amount.francs(), 108_000);
        assert_eq!(list(&state, false).await.unwrap().len(), 1);

        let approved = approve(&state, &order.id, now).await.unwrap();
        assert_eq!(approved.order.status, OrderStatus::Processed);
        assert_eq!(approved.sale.visitor_count, 120);
        assert_eq!(approved.sale.net_amount, approved.order.total_amount);
        assert_eq!(approved.sale.order_id.as_deref(), Some(order.id.as_str()));
        assert_eq!(approved.sale.client_name, "Lycée Bosangani");

        assert_eq!(state.repos.sales.list().await.unwrap(), vec![approved.sale.clone()]);
        assert!(list(&state, false).await.unwrap().is_empty());
        assert_eq!(list(&state, true).await.unwrap(), vec![approved.order.clone()]);

        // Second approval changes nothing
        let err = approve(&state, &order.id, now).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);
        assert_eq!(state.repos.sales.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_reject_deletes_without_sale() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_in(dir.path());
        let order = add(&state, new_order("Mme Smith", VisitorCategory::Expatriate, 2), Utc::now())
            .await
            .unwrap();

        assert_eq!(reject(&state, &order.id).await.unwrap().order_id, order.id);
        assert!(list(&state, true).await.unwrap().is_empty());
        assert!(state.repos.sales.list().await.unwrap().is_empty());

        let err = reject(&state, &order.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        let err = approve(&state, "ORD-0-none", Utc::now()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_add_requires_visitor_name() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_in(dir.path());
        let err = add(&state, new_order("  ", VisitorCategory::National, 1), Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(list(&state, true).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_interrupted_approval_is_not_charged_twice() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_in(dir.path());
        let now = Utc::now();
        let order = add(&state, new_order("Famille Ilunga", VisitorCategory::National, 4), now)
            .await
            .unwrap();

        // The sale reached the ledger, the order update did not
        let approval = approve_order(&order, &state.table, &state.policy, now).unwrap();
        state.repos.sales.append(&approval.sale).await.unwrap();

        let err = approve(&state, &order.id, now).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);
        assert!(err.message.starts_with("Commande déjà traitée"));
        assert_eq!(state.repos.sales.list().await.unwrap(), vec![approval.sale.clone()]);

        let stored = state.repos.orders.get(&order.id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Processed);
        assert_eq!(stored.total_amount, approval.sale.net_amount);

        // And again, still one sale
        assert!(approve(&state, &order.id, now).await.is_err());
        assert_eq!(state.repos.sales.list().await.unwrap().len(), 1);
    }

    fn order_json(id: &str, status: &str, quantity: i64) -> String {
        format!(
            r#"{{"id":"{id}","reservationId":"RES-{id}","visitorName":"Famille Ilunga",
                "category":"national","ticketType":"child","quantity":{quantity},
                "totalAmount":400000,"visitDate":"2025-07-05","status":"{status}",
                "token":"tok-{id}"}}"#
        )
    }

    #[tokio::test]
    async fn test_import_is_all_or_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_in(dir.path());
        let file = dir.path().join("orders.json");

        // One processed record rejects the file
        let body = format!(
            "[{},{}]",
            order_json("ORD-1", "pending", 4),
            order_json("ORD-2", "processed", 4)
        );
        std::fs::write(&file, body).unwrap();
        assert!(import(&state, &file).await.is_err());
        assert!(list(&state, true).await.unwrap().is_empty());

        // Zero quantity too
        std::fs::write(&file, format!("[{}]", order_json("ORD-3", "pending", 0))).unwrap();
        let err = import(&state, &file).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        // A record nobody could approve
        let nameless = order_json("ORD-4", "pending", 4).replace("Famille Ilunga", "  ");
        std::fs::write(&file, format!("[{},{}]", order_json("ORD-5", "pending", 4), nameless))
            .unwrap();
        let err = import(&state, &file).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(list(&state, true).await.unwrap().is_empty());

        // Not an array
        std::fs::write(&file, r#""ORD-1""#).unwrap();
        assert!(import(&state, &file).await.is_err());

        let body = format!(
            "[{},{}]",
            order_json("ORD-1", "pending", 4),
            order_json("ORD-2", "pending", 150)
        );
        std::fs::write(&file, &body).unwrap();
        let imported = import(&state, &file).await.unwrap();
        assert_eq!(imported.imported, 2);
        assert_eq!(imported.ids, vec!["ORD-1".to_string(), "ORD-2".to_string()]);

        // Same file again: duplicates
        let err = import(&state, &file).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(list(&state, false).await.unwrap().len(), 2);
    }
}
