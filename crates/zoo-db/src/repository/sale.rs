//! # SQLite Sale Ledger
//!
//! ```text
//! sales            one row per sale, `seq` keeps ledger order
//!   └── sale_lines one row per line with quantity > 0, ordered by position
//! ```
//!
//! A sale and its lines are written in one transaction. Rows read back are
//! checked against the sale invariants; a row that breaks them surfaces as
//! [`DbError::Corrupt`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::HashMap;
use tracing::debug;
use zoo_core::{Money, Sale, SaleLineItem, TicketType, VisitorCategory};

use super::SaleRepository;
use crate::error::{DbError, DbResult};

/// Repository for the sale ledger in SQLite.
#[derive(Debug, Clone)]
pub struct SqliteSaleRepository {
    pool: SqlitePool,
}

#[derive(Debug, sqlx::FromRow)]
struct SaleRow {
    id: String,
    invoice_number: String,
    timestamp: DateTime<Utc>,
    client_name: String,
    gross_centimes: i64,
    visitor_count: i64,
    discount_centimes: i64,
    net_centimes: i64,
    order_id: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct LineRow {
    sale_id: String,
    visitor_category: VisitorCategory,
    ticket_type: TicketType,
    quantity: i64,
    unit_price_centimes: i64,
    line_total_centimes: i64,
}

impl From<LineRow> for SaleLineItem {
    fn from(row: LineRow) -> Self {
        SaleLineItem {
            visitor_category: row.visitor_category,
            ticket_type: row.ticket_type,
            quantity: row.quantity,
            unit_price: Money::from_centimes(row.unit_price_centimes),
            line_total: Money::from_centimes(row.line_total_centimes),
        }
    }
}

impl SaleRow {
    fn into_sale(self, lines: Vec<SaleLineItem>) -> DbResult<Sale> {
        let sale = Sale {
            id: self.id,
            timestamp: self.timestamp,
            client_name: self.client_name,
            lines,
            gross_amount: Money::from_centimes(self.gross_centimes),
            visitor_count: self.visitor_count,
            discount_amount: Money::from_centimes(self.discount_centimes),
            net_amount: Money::from_centimes(self.net_centimes),
            invoice_number: self.invoice_number,
            order_id: self.order_id,
        };
        sale.validate()
            .map_err(|e| DbError::Corrupt(format!("sales.{}: {}", sale.id, e)))?;
        Ok(sale)
    }
}

const SELECT_SALE: &str = r#"
    SELECT id, invoice_number, timestamp, client_name,
           gross_centimes, visitor_count, discount_centimes, net_centimes,
           order_id
    FROM sales
"#;

const SELECT_LINES: &str = r#"
    SELECT sale_id, visitor_category, ticket_type, quantity,
           unit_price_centimes, line_total_centimes
    FROM sale_lines
"#;

impl SqliteSaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteSaleRepository { pool }
    }

    async fn with_own_lines(&self, row: SaleRow) -> DbResult<Sale> {
        let lines: Vec<LineRow> = sqlx::query_as(&format!(
            "{SELECT_LINES} WHERE sale_id = ?1 ORDER BY position"
        ))
        .bind(&row.id)
        .fetch_all(&self.pool)
        .await?;

        row.into_sale(lines.into_iter().map(Into::into).collect())
    }

    async fn attach_lines(&self, rows: Vec<SaleRow>) -> DbResult<Vec<Sale>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let lines: Vec<LineRow> = sqlx::query_as(&format!(
            "{SELECT_LINES} ORDER BY sale_id, position"
        ))
        .fetch_all(&self.pool)
        .await?;

        let mut by_sale: HashMap<String, Vec<SaleLineItem>> = HashMap::new();
        for line in lines {
            by_sale
                .entry(line.sale_id.clone())
                .or_default()
                .push(line.into());
        }

        rows.into_iter()
            .map(|row| {
                let lines = by_sale.remove(&row.id).unwrap_or_default();
                row.into_sale(lines)
            })
            .collect()
    }
}

/// Inserts a sale and its lines on `conn`, inside the caller's transaction.
pub(crate) async fn insert_sale(conn: &mut SqliteConnection, sale: &Sale) -> DbResult<()> {
    debug!(
        sale_id = %sale.id,
        invoice = %sale.invoice_number,
        visitors = sale.visitor_count,
        net = %sale.net_amount,
        "Inserting sale"
    );

    sqlx::query(
        r#"
        INSERT INTO sales (
            id, invoice_number, timestamp, client_name,
            gross_centimes, visitor_count, discount_centimes, net_centimes,
            order_id
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&sale.id)
    .bind(&sale.invoice_number)
    .bind(sale.timestamp)
    .bind(&sale.client_name)
    .bind(sale.gross_amount.centimes())
    .bind(sale.visitor_count)
    .bind(sale.discount_amount.centimes())
    .bind(sale.net_amount.centimes())
    .bind(&sale.order_id)
    .execute(&mut *conn)
    .await?;

    for (position, line) in sale.lines.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO sale_lines (
                sale_id, position, visitor_category, ticket_type,
                quantity, unit_price_centimes, line_total_centimes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&sale.id)
        .bind(position as i64)
        .bind(line.visitor_category)
        .bind(line.ticket_type)
        .bind(line.quantity)
        .bind(line.unit_price.centimes())
        .bind(line.line_total.centimes())
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

#[async_trait]
impl SaleRepository for SqliteSaleRepository {
    async fn append(&self, sale: &Sale) -> DbResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        insert_sale(&mut *tx, sale).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        Ok(())
    }

    async fn list(&self) -> DbResult<Vec<Sale>> {
        let rows: Vec<SaleRow> = sqlx::query_as(&format!("{SELECT_SALE} ORDER BY seq"))
            .fetch_all(&self.pool)
            .await?;

        self.attach_lines(rows).await
    }

    async fn get(&self, id: &str) -> DbResult<Option<Sale>> {
        let row: Option<SaleRow> = sqlx::query_as(&format!("{SELECT_SALE} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => self.with_own_lines(row).await.map(Some),
            None => Ok(None),
        }
    }

    async fn find_by_order(&self, order_id: &str) -> DbResult<Option<Sale>> {
        let row: Option<SaleRow> =
            sqlx::query_as(&format!("{SELECT_SALE} WHERE order_id = ?1 ORDER BY seq LIMIT 1"))
                .bind(order_id)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some(row) => self.with_own_lines(row).await.map(Some),
            None => Ok(None),
        }
    }

    async fn clear(&self) -> DbResult<u64> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        sqlx::query("DELETE FROM sale_lines").execute(&mut *tx).await?;
        let removed = sqlx::query("DELETE FROM sales")
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        debug!(removed, "Sale ledger cleared");
        Ok(removed)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::TimeZone;
    use zoo_core::TicketSheet;

    async fn repo() -> SqliteSaleRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().sales()
    }

    fn sale_at(hour: u32, client: &str, adults: i64, diplomats: i64) -> Sale {
        let now = Utc.with_ymd_and_hms(2025, 3, 12, hour, 0, 0).unwrap();
        let mut sheet = TicketSheet::standard(now);
        sheet.set_quantity(VisitorCategory::National, TicketType::Adult, adults);
        sheet.set_quantity(VisitorCategory::Diplomatic, TicketType::Child, diplomats);
        sheet.set_client_name(client);
        sheet.checkout(now).unwrap()
    }

    #[tokio::test]
    async fn test_append_and_get_round_trip() {
        let repo = repo().await;
        let sale = sale_at(9, "Ambassade de Belgique", 100, 20);

        repo.append(&sale).await.unwrap();

        let loaded = repo.get(&sale.id).await.unwrap().unwrap();
        assert_eq!(loaded, sale);
        assert_eq!(loaded.discount_amount.francs(), 25_000);
        assert_eq!(loaded.lines.len(), 2);
        assert!(repo.get("SALE-404").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_in_ledger_order() {
        let repo = repo().await;
        // Appended out of chronological order on purpose
        let late = sale_at(15, "Après-midi", 1, 0);
        let early = sale_at(8, "Matin", 2, 0);
        repo.append(&late).await.unwrap();
        repo.append(&early).await.unwrap();

        let ids: Vec<_> = repo.list().await.unwrap().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![late.id, early.id]);
    }

    #[tokio::test]
    async fn test_find_by_order() {
        let repo = repo().await;
        let mut from_order = sale_at(11, "Lycée Bosangani", 3, 0);
        from_order.order_id = Some("ORD-7".to_string());
        repo.append(&sale_at(9, "Comptoir", 1, 0)).await.unwrap();
        repo.append(&from_order).await.unwrap();

        assert_eq!(repo.find_by_order("ORD-7").await.unwrap(), Some(from_order));
        assert!(repo.find_by_order("ORD-8").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_invoice_is_unique_violation() {
        let repo = repo().await;
        let first = sale_at(9, "Premier", 1, 0);
        let mut second = sale_at(10, "Second", 1, 0);
        second.invoice_number = first.invoice_number.clone();

        repo.append(&first).await.unwrap();
        let err = repo.append(&second).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }), "{err:?}");

        // The failed transaction left no orphan lines or row behind
        assert_eq!(repo.list().await.unwrap(), vec![first]);
    }

    #[tokio::test]
    async fn test_clear_empties_ledger() {
        let repo = repo().await;
        repo.append(&sale_at(9, "A", 1, 0)).await.unwrap();
        repo.append(&sale_at(10, "B", 0, 3)).await.unwrap();

        assert_eq!(repo.clear().await.unwrap(), 2);
        assert!(repo.list().await.unwrap().is_empty());
    }
}
