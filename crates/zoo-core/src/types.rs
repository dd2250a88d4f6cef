//! # Domain Types
//!
//! Core domain types used throughout the cash desk.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ VisitorCategory │   │      Sale       │   │  FinanceOrder   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  National       │   │  id (SALE-...)  │   │  id             │       │
//! │  │  Expatriate     │   │  invoice_number │   │  reservation_id │       │
//! │  │  Diplomatic  $0 │   │  client_name    │   │  status         │       │
//! │  │  Scientific  $0 │   │  lines ─────────┼─┐ │  token          │       │
//! │  └─────────────────┘   │  gross/discount │ │ └─────────────────┘       │
//! │                        │  net            │ │                            │
//! │  ┌─────────────────┐   └─────────────────┘ │ ┌─────────────────┐       │
//! │  │   TicketType    │                       └►│  SaleLineItem   │       │
//! │  │  Adult | Child  │                         │  qty × unit     │       │
//! │  └─────────────────┘                         └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Shape
//! Structs serialize with camelCase keys, enums as lowercase English
//! identifiers. The French labels of the cash desk are accepted on input.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::money::Money;
use crate::validation::{validate_client_name, ValidationResult};
use crate::MAX_LINE_QUANTITY;

// =============================================================================
// Visitor Category
// =============================================================================

/// The tariff category of a visitor.
///
/// Diplomatic and Scientific visitors enter for free but still count toward
/// the group discount threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum VisitorCategory {
    #[serde(alias = "National")]
    National,
    #[serde(alias = "Expatrié", alias = "expatrie")]
    Expatriate,
    #[serde(alias = "Diplomatique", alias = "diplomatique")]
    Diplomatic,
    #[serde(alias = "Scientifique", alias = "scientifique")]
    Scientific,
}

impl VisitorCategory {
    /// All categories, in cash desk order.
    pub const ALL: [VisitorCategory; 4] = [
        VisitorCategory::National,
        VisitorCategory::Expatriate,
        VisitorCategory::Diplomatic,
        VisitorCategory::Scientific,
    ];

    /// French label printed on receipts and reports.
    pub const fn label(&self) -> &'static str {
        match self {
            VisitorCategory::National => "National",
            VisitorCategory::Expatriate => "Expatrié",
            VisitorCategory::Diplomatic => "Diplomatique",
            VisitorCategory::Scientific => "Scientifique",
        }
    }

    /// Whether visitors of this category always pay nothing.
    pub const fn is_free(&self) -> bool {
        matches!(self, VisitorCategory::Diplomatic | VisitorCategory::Scientific)
    }

    pub(crate) const fn index(&self) -> usize {
        match self {
            VisitorCategory::National => 0,
            VisitorCategory::Expatriate => 1,
            VisitorCategory::Diplomatic => 2,
            VisitorCategory::Scientific => 3,
        }
    }

    /// Lowercase identifier used in storage and on the command line.
    pub const fn as_str(&self) -> &'static str {
        match self {
            VisitorCategory::National => "national",
            VisitorCategory::Expatriate => "expatriate",
            VisitorCategory::Diplomatic => "diplomatic",
            VisitorCategory::Scientific => "scientific",
        }
    }
}

impl fmt::Display for VisitorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for VisitorCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match fold_label(s).as_str() {
            "national" | "nat" => Ok(VisitorCategory::National),
            "expatriate" | "expatrie" | "expat" => Ok(VisitorCategory::Expatriate),
            "diplomatic" | "diplomatique" | "diplo" => Ok(VisitorCategory::Diplomatic),
            "scientific" | "scientifique" | "sci" => Ok(VisitorCategory::Scientific),
            _ => Err(ValidationError::NotAllowed {
                field: "catégorie".to_string(),
                allowed: VisitorCategory::ALL
                    .iter()
                    .map(|c| c.as_str().to_string())
                    .collect(),
            }),
        }
    }
}

// =============================================================================
// Ticket Type
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum TicketType {
    #[serde(alias = "Adulte", alias = "adulte")]
    Adult,
    #[serde(alias = "Enfant", alias = "enfant")]
    Child,
}

impl TicketType {
    pub const ALL: [TicketType; 2] = [TicketType::Adult, TicketType::Child];

    pub const fn label(&self) -> &'static str {
        match self {
            TicketType::Adult => "Adulte",
            TicketType::Child => "Enfant",
        }
    }

    pub(crate) const fn index(&self) -> usize {
        match self {
            TicketType::Adult => 0,
            TicketType::Child => 1,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            TicketType::Adult => "adult",
            TicketType::Child => "child",
        }
    }
}

impl fmt::Display for TicketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TicketType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match fold_label(s).as_str() {
            "adult" | "adulte" | "a" => Ok(TicketType::Adult),
            "child" | "enfant" | "kid" | "e" => Ok(TicketType::Child),
            _ => Err(ValidationError::NotAllowed {
                field: "type de billet".to_string(),
                allowed: TicketType::ALL.iter().map(|t| t.as_str().to_string()).collect(),
            }),
        }
    }
}

/// Lowercases and strips the French accents the cash desk labels use.
fn fold_label(s: &str) -> String {
    s.trim()
        .chars()
        .map(|c| match c {
            'é' | 'è' | 'ê' | 'É' | 'È' | 'Ê' => 'e',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}

// =============================================================================
// Sale Line Item
// =============================================================================

/// One (category, ticket type) row of a sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleLineItem {
    pub visitor_category: VisitorCategory,
    pub ticket_type: TicketType,
    pub quantity: i64,
    pub unit_price: Money,
    /// Always `quantity × unit_price`.
    pub line_total: Money,
}

impl SaleLineItem {
    /// Creates a line with its total computed from quantity and price.
    pub fn new(
        visitor_category: VisitorCategory,
        ticket_type: TicketType,
        quantity: i64,
        unit_price: Money,
    ) -> Self {
        SaleLineItem {
            visitor_category,
            ticket_type,
            quantity,
            unit_price,
            line_total: unit_price.multiply_quantity(quantity),
        }
    }

    /// "National - Adulte"
    pub fn label(&self) -> String {
        format!("{} - {}", self.visitor_category.label(), self.ticket_type.label())
    }

    fn validate(&self, record: &str) -> ValidationResult<()> {
        if self.quantity < 0 || self.quantity > MAX_LINE_QUANTITY {
            return Err(ValidationError::inconsistent(
                record,
                format!("quantité {} hors limites", self.quantity),
            ));
        }
        if self.unit_price.is_negative() {
            return Err(ValidationError::inconsistent(record, "prix unitaire négatif"));
        }
        if self.visitor_category.is_free() && !self.unit_price.is_zero() {
            return Err(ValidationError::inconsistent(
                record,
                format!("la catégorie {} doit être gratuite", self.visitor_category),
            ));
        }
        if self.unit_price.checked_multiply_quantity(self.quantity) != Some(self.line_total) {
            return Err(ValidationError::inconsistent(
                record,
                format!("total de ligne incorrect pour {}", self.label()),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A recorded sale. Immutable once appended to the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    /// `SALE-<unix millis>-<base36>`
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub client_name: String,
    /// Only lines with a quantity above zero.
    pub lines: Vec<SaleLineItem>,
    pub gross_amount: Money,
    pub visitor_count: i64,
    pub discount_amount: Money,
    pub net_amount: Money,
    /// `FAC-<YYYYMMDD>-<millis>-<base36>`
    pub invoice_number: String,
    /// Set when the sale comes from an approved finance order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
}

impl Sale {
    /// Whether the sale has at least one line of `category`.
    pub fn has_category(&self, category: VisitorCategory) -> bool {
        self.lines.iter().any(|l| l.visitor_category == category)
    }

    /// Visitors of `category` in this sale.
    pub fn visitors_in(&self, category: VisitorCategory) -> i64 {
        self.lines
            .iter()
            .filter(|l| l.visitor_category == category)
            .map(|l| l.quantity)
            .sum()
    }

    /// Checks every invariant a recorded sale must hold.
    ///
    /// ```text
    /// line_total  = quantity × unit_price   (per line)
    /// gross       = Σ line_total
    /// visitors    = Σ quantity  > 0
    /// net         = gross − discount ≥ 0
    /// free categories carry unit_price = 0
    /// ```
    ///
    /// Used by the snapshot loader to reject corrupt ledgers.
    pub fn validate(&self) -> ValidationResult<()> {
        let record = format!("vente {}", self.id);

        if self.id.trim().is_empty() {
            return Err(ValidationError::required("id"));
        }
        if self.invoice_number.trim().is_empty() {
            return Err(ValidationError::inconsistent(&record, "numéro de facture manquant"));
        }
        validate_client_name(&self.client_name)?;

        if self.lines.is_empty() {
            return Err(ValidationError::inconsistent(&record, "aucune ligne"));
        }
        for line in &self.lines {
            line.validate(&record)?;
            if line.quantity == 0 {
                return Err(ValidationError::inconsistent(&record, "ligne à quantité nulle"));
            }
        }

        let gross = self
            .lines
            .iter()
            .try_fold(Money::zero(), |acc, l| acc.checked_add(l.line_total));
        if gross != Some(self.gross_amount) {
            return Err(ValidationError::inconsistent(&record, "montant brut incorrect"));
        }
        let visitors: i64 = self.lines.iter().map(|l| l.quantity).sum();
        if visitors != self.visitor_count || visitors <= 0 {
            return Err(ValidationError::inconsistent(&record, "nombre de visiteurs incorrect"));
        }
        if self.discount_amount.is_negative() || self.discount_amount > self.gross_amount {
            return Err(ValidationError::inconsistent(&record, "réduction hors limites"));
        }
        if self.net_amount != self.gross_amount - self.discount_amount {
            return Err(ValidationError::inconsistent(&record, "montant net incorrect"));
        }
        Ok(())
    }
}

// =============================================================================
// Finance Order
// =============================================================================

/// Lifecycle state of a finance order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Created by the reservation flow, waiting for a cashier.
    #[default]
    Pending,
    /// Approved; a matching sale is in the ledger.
    Processed,
}

impl OrderStatus {
    pub const fn label(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "En attente",
            OrderStatus::Processed => "Traitée",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A reservation payment waiting for cashier approval.
///
/// ## Lifecycle
/// ```text
/// reservation flow ──► Pending ──approve──► Processed (+ Sale in ledger)
///                         │
///                         └──reject──► deleted
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceOrder {
    pub id: String,
    pub reservation_id: String,
    pub visitor_name: String,
    pub category: VisitorCategory,
    pub ticket_type: TicketType,
    pub quantity: i64,
    /// Amount announced by the reservation; replaced by the computed net on
    /// approval.
    pub total_amount: Money,
    pub visit_date: NaiveDate,
    #[serde(default)]
    pub status: OrderStatus,
    /// Opaque payment token from the reservation flow.
    pub token: String,
    #[serde(default)]
    pub transfer_date: Option<DateTime<Utc>>,
}

impl FinanceOrder {
    pub fn is_pending(&self) -> bool {
        self.status == OrderStatus::Pending
    }

    /// Checks the invariants of a stored or imported order.
    pub fn validate(&self) -> ValidationResult<()> {
        let record = format!("commande {}", self.id);

        if self.id.trim().is_empty() {
            return Err(ValidationError::required("id"));
        }
        if self.reservation_id.trim().is_empty() {
            return Err(ValidationError::required("reservationId"));
        }
        if self.visitor_name.trim().is_empty() {
            return Err(ValidationError::required("visitorName"));
        }
        if self.token.trim().is_empty() {
            return Err(ValidationError::required("token"));
        }
        if self.quantity <= 0 || self.quantity > MAX_LINE_QUANTITY {
            return Err(ValidationError::inconsistent(
                &record,
                format!("quantité {} hors limites", self.quantity),
            ));
        }
        if self.total_amount.is_negative() {
            return Err(ValidationError::inconsistent(&record, "montant négatif"));
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
