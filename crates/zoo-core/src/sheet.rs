//! # Ticket Sheet
//!
//! The cashier's working state for the sale in progress: one line per
//! (category, ticket type), a client name and the identity the sale will
//! carry once recorded.
//!
//! ## Cash Desk Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Cashier Action          Sheet Operation           State Change         │
//! │  ──────────────          ───────────────           ────────────         │
//! │                                                                         │
//! │  Click [+] ─────────────► increment() ───────────► qty + 1              │
//! │  Click [−] ─────────────► decrement() ───────────► max(0, qty − 1)      │
//! │  Type "40" ─────────────► set_quantity_input() ──► 40                   │
//! │  Type client ───────────► set_client_name()                             │
//! │  Print receipt ─────────► preview() ─────────────► (read only)          │
//! │  Record sale ───────────► checkout() ────────────► Sale, then reset     │
//! │                                                                         │
//! │  Quantities never go below zero, whatever the input.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};

use crate::error::{CoreError, CoreResult};
use crate::ids;
use crate::pricing::{assemble_sale, DiscountPolicy, PriceTable, SaleStamp, SaleTotals};
use crate::types::{Sale, SaleLineItem, TicketType, VisitorCategory};
use crate::validation::parse_quantity_input;
use crate::MAX_LINE_QUANTITY;

/// Shown when a receipt is asked for an empty sheet.
pub const NO_SALE_TO_PRINT: &str = "Aucune vente à imprimer";

/// The sale being prepared at the desk.
///
/// ## Invariants
/// - exactly one line per (category, ticket type), in price table order
/// - every quantity in `0..=MAX_LINE_QUANTITY`
/// - every line priced from the sheet's table
#[derive(Debug, Clone)]
pub struct TicketSheet {
    table: PriceTable,
    policy: DiscountPolicy,
    lines: Vec<SaleLineItem>,
    client_name: String,
    pending_sale_id: String,
    pending_invoice: String,
}

impl TicketSheet {
    /// Creates an empty sheet; `now` seeds the pending sale identity.
    pub fn new(table: PriceTable, policy: DiscountPolicy, now: DateTime<Utc>) -> Self {
        let lines = table
            .entries()
            .map(|(category, ticket_type, price)| SaleLineItem::new(category, ticket_type, 0, price))
            .collect();

        TicketSheet {
            table,
            policy,
            lines,
            client_name: String::new(),
            pending_sale_id: ids::sale_id(now),
            pending_invoice: ids::invoice_number(now),
        }
    }

    /// A sheet with the standard tariff and discount.
    pub fn standard(now: DateTime<Utc>) -> Self {
        TicketSheet::new(PriceTable::standard(), DiscountPolicy::standard(), now)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn lines(&self) -> &[SaleLineItem] {
        &self.lines
    }

    pub fn client_name(&self) -> &str {
        &self.client_name
    }

    /// Id the next recorded sale will carry (also printed on the pre-checkout
    /// receipt).
    pub fn pending_sale_id(&self) -> &str {
        &self.pending_sale_id
    }

    pub fn table(&self) -> &PriceTable {
        &self.table
    }

    pub fn policy(&self) -> &DiscountPolicy {
        &self.policy
    }

    pub fn quantity(&self, category: VisitorCategory, ticket_type: TicketType) -> i64 {
        self.lines[slot(category, ticket_type)].quantity
    }

    pub fn totals(&self) -> SaleTotals {
        SaleTotals::compute(&self.lines, &self.policy)
    }

    // =========================================================================
    // Updates
    // =========================================================================

    /// Adds one visitor to a line. Returns the new quantity.
    pub fn increment(&mut self, category: VisitorCategory, ticket_type: TicketType) -> i64 {
        let current = self.quantity(category, ticket_type);
        self.set_quantity(category, ticket_type, current.saturating_add(1))
    }

    /// Removes one visitor from a line, stopping at zero.
    pub fn decrement(&mut self, category: VisitorCategory, ticket_type: TicketType) -> i64 {
        let current = self.quantity(category, ticket_type);
        self.set_quantity(category, ticket_type, current - 1)
    }

    /// Sets a line quantity, clamped to `0..=MAX_LINE_QUANTITY`.
    pub fn set_quantity(
        &mut self,
        category: VisitorCategory,
        ticket_type: TicketType,
        quantity: i64,
    ) -> i64 {
        let quantity = quantity.clamp(0, MAX_LINE_QUANTITY);
        let line = &mut self.lines[slot(category, ticket_type)];
        line.quantity = quantity;
        line.line_total = line.unit_price.multiply_quantity(quantity);
        quantity
    }

    /// Sets a line quantity from the text typed into the field.
    ///
    /// See [`parse_quantity_input`]: unparsable text counts as zero.
    pub fn set_quantity_input(
        &mut self,
        category: VisitorCategory,
        ticket_type: TicketType,
        input: &str,
    ) -> i64 {
        self.set_quantity(category, ticket_type, parse_quantity_input(input))
    }

    /// Adds `quantity` visitors to a line (used when loading a quote).
    ///
    /// ## Errors
    /// [`CoreError::QuantityTooLarge`] when the line would exceed the maximum.
    pub fn add_visitors(
        &mut self,
        category: VisitorCategory,
        ticket_type: TicketType,
        quantity: i64,
    ) -> CoreResult<i64> {
        let requested = self.quantity(category, ticket_type).saturating_add(quantity.max(0));
        if requested > MAX_LINE_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested,
                max: MAX_LINE_QUANTITY,
            });
        }
        Ok(self.set_quantity(category, ticket_type, requested))
    }

    pub fn set_client_name(&mut self, name: impl Into<String>) {
        self.client_name = name.into();
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// The sale [`checkout`](Self::checkout) would record, without recording
    /// it.
    ///
    /// ## Errors
    /// Same as checkout: [`CoreError::NoVisitors`] then
    /// [`CoreError::ClientNameRequired`].
    pub fn preview(&self, now: DateTime<Utc>) -> CoreResult<Sale> {
        assemble_sale(self.stamp(now), &self.client_name, &self.lines, &self.policy)
    }

    /// The sale to print on the pre-checkout receipt.
    ///
    /// ## Errors
    /// The print-side wording of the checkout rejections:
    /// "Aucune vente à imprimer" for an empty sheet, then
    /// [`CoreError::ReceiptClientRequired`].
    pub fn receipt_preview(&self, now: DateTime<Utc>) -> CoreResult<Sale> {
        self.preview(now).map_err(|e| match e {
            CoreError::NoVisitors => CoreError::nothing_to_print(NO_SALE_TO_PRINT),
            CoreError::ClientNameRequired => CoreError::ReceiptClientRequired,
            other => other,
        })
    }

    /// Produces the sale to append to the ledger and resets the sheet.
    ///
    /// On error the sheet is left untouched.
    ///
    /// ## User Workflow
    /// ```text
    /// Enregistrer la vente
    ///      │
    ///      ▼
    /// checkout(now) ← THIS FUNCTION
    ///      │
    ///      ├── visitors == 0 ? → NoVisitors
    ///      ├── client blank ?  → ClientNameRequired
    ///      │
    ///      ▼
    /// Sale (lines with qty > 0) ──► ledger.append()
    ///      │
    ///      ▼
    /// Sheet back to zero, fresh sale id
    /// ```
    pub fn checkout(&mut self, now: DateTime<Utc>) -> CoreResult<Sale> {
        let sale = self.preview(now)?;
        self.reset(now);
        Ok(sale)
    }

    /// Zeroes every line, clears the client and draws a new sale identity.
    pub fn reset(&mut self, now: DateTime<Utc>) {
        for line in &mut self.lines {
            line.quantity = 0;
            line.line_total = crate::Money::zero();
        }
        self.client_name.clear();
        self.pending_sale_id = ids::sale_id(now);
        self.pending_invoice = ids::invoice_number(now);
    }

    fn stamp(&self, now: DateTime<Utc>) -> SaleStamp {
        SaleStamp {
            id: self.pending_sale_id.clone(),
            invoice_number: self.pending_invoice.clone(),
            timestamp: now,
            order_id: None,
        }
    }
}

/// Position of a (category, type) line; matches `PriceTable::entries` order.
#[inline]
fn slot(category: VisitorCategory, ticket_type: TicketType) -> usize {
    category.index() * TicketType::ALL.len() + ticket_type.index()
}

// =============================================================================
// Unit Tests
// =============================================================================
