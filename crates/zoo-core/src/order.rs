//! # Finance Order Approval
//!
//! Turns a pending reservation payment into a recorded sale.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  FinanceOrder { Pending, 120 × National/Adulte }                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  approve_order() ← THIS MODULE                                          │
//! │       │                                                                 │
//! │       ├──► Sale   { client = visitor_name, 1 line, same discount rule } │
//! │       └──► Order  { Processed, total_amount = sale net }                │
//! │                                                                         │
//! │  The caller appends the sale and stores the order.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};

use crate::error::{CoreError, CoreResult};
use crate::ids;
use crate::pricing::{assemble_sale, DiscountPolicy, PriceTable, SaleStamp};
use crate::types::{FinanceOrder, OrderStatus, Sale};

/// Result of approving an order: the sale to append and the order as it
/// must be stored afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Approval {
    pub sale: Sale,
    pub order: FinanceOrder,
}

/// Approves a pending order.
///
/// Prices the order with `table` and `policy` exactly like a desk sale.
///
/// ## Errors
/// - [`CoreError::OrderAlreadyProcessed`] if the order is not pending
/// - [`CoreError::ClientNameRequired`] if the order has no visitor name
/// - validation errors from [`FinanceOrder::validate`]
pub fn approve_order(
    order: &FinanceOrder,
    table: &PriceTable,
    policy: &DiscountPolicy,
    now: DateTime<Utc>,
) -> CoreResult<Approval> {
    if !order.is_pending() {
        return Err(CoreError::OrderAlreadyProcessed(order.id.clone()));
    }
    if order.visitor_name.trim().is_empty() {
        return Err(CoreError::ClientNameRequired);
    }
    order.validate()?;

    let line = table.line(order.category, order.ticket_type, order.quantity);
    let stamp = SaleStamp {
        id: ids::sale_id(now),
        invoice_number: ids::invoice_number(now),
        timestamp: now,
        order_id: Some(order.id.clone()),
    };
    let sale = assemble_sale(stamp, &order.visitor_name, &[line], policy)?;

    let mut processed = order.clone();
    processed.status = OrderStatus::Processed;
    processed.total_amount = sale.net_amount;

    Ok(Approval {
        sale,
        order: processed,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::{TicketType, VisitorCategory};
    use chrono::{NaiveDate, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 3, 11, 0, 0).unwrap()
    }

    fn order(category: VisitorCategory, ticket_type: TicketType, quantity: i64) -> FinanceOrder {
        FinanceOrder {
            id: "ORD-42".to_string(),
            reservation_id: "ZK-042".to_string(),
            visitor_name: "Famille Kasongo".to_string(),
            category,
            ticket_type,
            quantity,
            total_amount: Money::from_francs(1),
            visit_date: NaiveDate::from_ymd_opt(2025, 7, 5).unwrap(),
            status: OrderStatus::Pending,
            token: "pay-tok-42".to_string(),
            transfer_date: Some(now()),
        }
    }

    #[test]
    fn test_approve_small_order() {
        let pending = order(VisitorCategory::Expatriate, TicketType::Adult, 3);
        let approval =
            approve_order(&pending, &PriceTable::standard(), &DiscountPolicy::standard(), now())
                .unwrap();

        assert_eq!(approval.sale.visitor_count, 3);
        assert_eq!(approval.sale.net_amount.francs(), 15_000);
        assert_eq!(approval.sale.client_name, "Famille Kasongo");
        assert_eq!(approval.sale.order_id.as_deref(), Some("ORD-42"));
        assert_eq!(approval.sale.lines.len(), 1);
        assert_eq!(approval.order.status, OrderStatus::Processed);
        assert_eq!(approval.order.total_amount, approval.sale.net_amount);
        assert_eq!(approval.order.token, pending.token);
    }

    #[test]
    fn test_approve_applies_group_discount() {
        let pending = order(VisitorCategory::National, TicketType::Adult, 120);
        let approval =
            approve_order(&pending, &PriceTable::standard(), &DiscountPolicy::standard(), now())
                .unwrap();

        assert_eq!(approval.sale.gross_amount.francs(), 300_000);
        assert_eq!(approval.sale.discount_amount.francs(), 30_000);
        assert_eq!(approval.sale.net_amount.francs(), 270_000);
        assert_eq!(approval.order.total_amount.francs(), 270_000);
        assert!(approval.sale.validate().is_ok());
    }

    #[test]
    fn test_approve_free_category() {
        let pending = order(VisitorCategory::Scientific, TicketType::Adult, 4);
        let approval =
            approve_order(&pending, &PriceTable::standard(), &DiscountPolicy::standard(), now())
                .unwrap();
        assert!(approval.sale.net_amount.is_zero());
        assert!(approval.order.total_amount.is_zero());
    }

    #[test]
    fn test_approve_processed_order_is_rejected() {
        let mut processed = order(VisitorCategory::National, TicketType::Child, 2);
        processed.status = OrderStatus::Processed;
        let err = approve_order(
            &processed,
            &PriceTable::standard(),
            &DiscountPolicy::standard(),
            now(),
        )
        .unwrap_err();
        assert_eq!(err, CoreError::OrderAlreadyProcessed("ORD-42".to_string()));
    }

    #[test]
    fn test_approve_requires_visitor_name() {
        let mut nameless = order(VisitorCategory::National, TicketType::Child, 2);
        nameless.visitor_name = " ".to_string();
        let err = approve_order(
            &nameless,
            &PriceTable::standard(),
            &DiscountPolicy::standard(),
            now(),
        )
        .unwrap_err();
        assert_eq!(err, CoreError::ClientNameRequired);
    }
}
