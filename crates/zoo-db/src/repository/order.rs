//! # SQLite Finance Orders

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use zoo_core::{FinanceOrder, Money, OrderStatus, TicketType, VisitorCategory};

use super::OrderRepository;
use crate::error::{DbError, DbResult};

/// Repository for finance orders in SQLite.
#[derive(Debug, Clone)]
pub struct SqliteOrderRepository {
    pool: SqlitePool,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: String,
    reservation_id: String,
    visitor_name: String,
    category: VisitorCategory,
    ticket_type: TicketType,
    quantity: i64,
    total_centimes: i64,
    visit_date: NaiveDate,
    status: OrderStatus,
    token: String,
    transfer_date: Option<DateTime<Utc>>,
}

impl From<OrderRow> for FinanceOrder {
    fn from(row: OrderRow) -> Self {
        FinanceOrder {
            id: row.id,
            reservation_id: row.reservation_id,
            visitor_name: row.visitor_name,
            category: row.category,
            ticket_type: row.ticket_type,
            quantity: row.quantity,
            total_amount: Money::from_centimes(row.total_centimes),
            visit_date: row.visit_date,
            status: row.status,
            token: row.token,
            transfer_date: row.transfer_date,
        }
    }
}

const SELECT_ORDER: &str = r#"
    SELECT id, reservation_id, visitor_name, category, ticket_type, quantity,
           total_centimes, visit_date, status, token, transfer_date
    FROM finance_orders
"#;

impl SqliteOrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteOrderRepository { pool }
    }
}

async fn insert_order(conn: &mut SqliteConnection, order: &FinanceOrder) -> DbResult<()> {
    debug!(order_id = %order.id, reservation = %order.reservation_id, "Inserting finance order");

    sqlx::query(
        r#"
        INSERT INTO finance_orders (
            id, reservation_id, visitor_name, category, ticket_type, quantity,
            total_centimes, visit_date, status, token, transfer_date
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        "#,
    )
    .bind(&order.id)
    .bind(&order.reservation_id)
    .bind(&order.visitor_name)
    .bind(order.category)
    .bind(order.ticket_type)
    .bind(order.quantity)
    .bind(order.total_amount.centimes())
    .bind(order.visit_date)
    .bind(order.status)
    .bind(&order.token)
    .bind(order.transfer_date)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Rewrites the stored order with the same id on `conn`.
///
/// ## Errors
/// [`DbError::NotFound`] if no order has that id.
pub(crate) async fn update_order(conn: &mut SqliteConnection, order: &FinanceOrder) -> DbResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE finance_orders SET
            reservation_id = ?2,
            visitor_name = ?3,
            category = ?4,
            ticket_type = ?5,
            quantity = ?6,
            total_centimes = ?7,
            visit_date = ?8,
            status = ?9,
            token = ?10,
            transfer_date = ?11
        WHERE id = ?1
        "#,
    )
    .bind(&order.id)
    .bind(&order.reservation_id)
    .bind(&order.visitor_name)
    .bind(order.category)
    .bind(order.ticket_type)
    .bind(order.quantity)
    .bind(order.total_amount.centimes())
    .bind(order.visit_date)
    .bind(order.status)
    .bind(&order.token)
    .bind(order.transfer_date)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("FinanceOrder", &order.id));
    }
    debug!(order_id = %order.id, status = ?order.status, "Finance order updated");
    Ok(())
}

#[async_trait]
impl OrderRepository for SqliteOrderRepository {
    async fn insert(&self, order: &FinanceOrder) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        insert_order(&mut *conn, order).await
    }

    async fn insert_all(&self, orders: &[FinanceOrder]) -> DbResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        for order in orders {
            insert_order(&mut *tx, order).await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        Ok(())
    }

    async fn list(&self) -> DbResult<Vec<FinanceOrder>> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!("{SELECT_ORDER} ORDER BY seq"))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_pending(&self) -> DbResult<Vec<FinanceOrder>> {
        let rows: Vec<OrderRow> =
            sqlx::query_as(&format!("{SELECT_ORDER} WHERE status = ?1 ORDER BY seq"))
                .bind(OrderStatus::Pending)
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get(&self, id: &str) -> DbResult<Option<FinanceOrder>> {
        let row: Option<OrderRow> = sqlx::query_as(&format!("{SELECT_ORDER} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn update(&self, order: &FinanceOrder) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        update_order(&mut *conn, order).await
    }

    async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM finance_orders WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("FinanceOrder", id));
        }
        debug!(order_id = %id, "Finance order deleted");
        Ok(())
    }

    async fn clear(&self) -> DbResult<u64> {
        let removed = sqlx::query("DELETE FROM finance_orders")
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(removed)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
