//! # Pricing
//!
//! The ticket price table, the group discount rule and the one place a
//! [`Sale`] is assembled from priced lines.
//!
//! ## Computation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  lines ──► line_total = qty × unit_price                                │
//! │       │                                                                 │
//! │       ├──► gross    = Σ line_total                                      │
//! │       ├──► visitors = Σ qty                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  visitors ≥ 100 ?  ──yes──► discount = 10% of gross                     │
//! │       │no                                                               │
//! │       ▼                                                                 │
//! │  discount = 0                                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  net = gross − discount                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Sale, SaleLineItem, TicketType, VisitorCategory};
use crate::validation::{validate_client_name, validate_price_centimes};
use crate::{GROUP_DISCOUNT_BPS, GROUP_DISCOUNT_THRESHOLD};

// =============================================================================
// Price Table
// =============================================================================

/// Unit price per (visitor category, ticket type).
///
/// Free categories are pinned at zero: [`PriceTable::with_price`] refuses to
/// give them a price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceTable {
    prices: [[Money; 2]; 4],
}

impl PriceTable {
    /// The cash desk tariff.
    ///
    /// | Category   | Adulte   | Enfant   |
    /// |------------|----------|----------|
    /// | National   | 2 500 FC | 1 000 FC |
    /// | Expatrié   | 5 000 FC | 2 000 FC |
    /// | Diplomatique | 0      | 0        |
    /// | Scientifique | 0      | 0        |
    pub fn standard() -> Self {
        let mut prices = [[Money::zero(); 2]; 4];
        prices[VisitorCategory::National.index()] =
            [Money::from_francs(2_500), Money::from_francs(1_000)];
        prices[VisitorCategory::Expatriate.index()] =
            [Money::from_francs(5_000), Money::from_francs(2_000)];
        PriceTable { prices }
    }

    /// Returns a copy with one paying price replaced.
    ///
    /// ## Errors
    /// - [`CoreError::FreeCategoryPriced`] for a non-zero price on a free
    ///   category
    /// - validation error for a negative price
    pub fn with_price(
        mut self,
        category: VisitorCategory,
        ticket_type: TicketType,
        price: Money,
    ) -> CoreResult<Self> {
        validate_price_centimes(price.centimes())?;
        if category.is_free() && !price.is_zero() {
            return Err(CoreError::FreeCategoryPriced { category });
        }
        self.prices[category.index()][ticket_type.index()] = price;
        Ok(self)
    }

    #[inline]
    pub fn unit_price(&self, category: VisitorCategory, ticket_type: TicketType) -> Money {
        self.prices[category.index()][ticket_type.index()]
    }

    /// Every (category, type, price) in cash desk order:
    /// National/Adulte, National/Enfant, Expatrié/Adulte, ...
    pub fn entries(&self) -> impl Iterator<Item = (VisitorCategory, TicketType, Money)> + '_ {
        VisitorCategory::ALL.into_iter().flat_map(move |category| {
            TicketType::ALL
                .into_iter()
                .map(move |ticket_type| (category, ticket_type, self.unit_price(category, ticket_type)))
        })
    }

    /// A priced line for `quantity` visitors.
    pub fn line(
        &self,
        category: VisitorCategory,
        ticket_type: TicketType,
        quantity: i64,
    ) -> SaleLineItem {
        SaleLineItem::new(category, ticket_type, quantity, self.unit_price(category, ticket_type))
    }
}

impl Default for PriceTable {
    fn default() -> Self {
        PriceTable::standard()
    }
}

// =============================================================================
// Discount Policy
// =============================================================================

/// Percentage discount granted from a visitor-count threshold upward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountPolicy {
    /// Inclusive: exactly `threshold` visitors qualifies.
    pub threshold: i64,
    /// Discount in basis points (1000 = 10%).
    pub bps: u32,
}

impl DiscountPolicy {
    /// 10% from 100 visitors.
    pub const fn standard() -> Self {
        DiscountPolicy {
            threshold: GROUP_DISCOUNT_THRESHOLD,
            bps: GROUP_DISCOUNT_BPS,
        }
    }

    /// Discount owed on `gross` for a sale of `visitor_count` visitors.
    pub fn discount_for(&self, visitor_count: i64, gross: Money) -> Money {
        if visitor_count >= self.threshold {
            gross.percentage(self.bps)
        } else {
            Money::zero()
        }
    }

    /// Whole-percent value for labels ("Réduction 10%").
    pub fn percent_label(&self) -> String {
        if self.bps % 100 == 0 {
            format!("{}%", self.bps / 100)
        } else {
            format!("{},{:02}%", self.bps / 100, self.bps % 100)
        }
    }
}

impl Default for DiscountPolicy {
    fn default() -> Self {
        DiscountPolicy::standard()
    }
}

// =============================================================================
// Totals
// =============================================================================

/// Totals of a set of lines under a discount policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleTotals {
    pub gross_amount: Money,
    pub visitor_count: i64,
    pub discount_amount: Money,
    pub net_amount: Money,
}

impl SaleTotals {
    pub fn compute(lines: &[SaleLineItem], policy: &DiscountPolicy) -> Self {
        let gross_amount: Money = lines.iter().map(|l| l.line_total).sum();
        let visitor_count: i64 = lines.iter().map(|l| l.quantity).sum();
        let discount_amount = policy.discount_for(visitor_count, gross_amount);

        SaleTotals {
            gross_amount,
            visitor_count,
            discount_amount,
            net_amount: gross_amount - discount_amount,
        }
    }
}

// =============================================================================
// Sale Assembly
// =============================================================================

/// Identity of a sale about to be assembled.
#[derive(Debug, Clone)]
pub struct SaleStamp {
    pub id: String,
    pub invoice_number: String,
    pub timestamp: DateTime<Utc>,
    pub order_id: Option<String>,
}

/// Builds a [`Sale`] from priced lines.
///
/// Zero-quantity lines are dropped. Rejects (in this order) a sale without
/// visitors, then a blank client name.
pub fn assemble_sale(
    stamp: SaleStamp,
    client_name: &str,
    lines: &[SaleLineItem],
    policy: &DiscountPolicy,
) -> CoreResult<Sale> {
    let lines: Vec<SaleLineItem> = lines.iter().filter(|l| l.quantity > 0).cloned().collect();
    let totals = SaleTotals::compute(&lines, policy);

    if totals.visitor_count == 0 {
        return Err(CoreError::NoVisitors);
    }
    let client_name = validate_client_name(client_name).map_err(|e| match e {
        crate::ValidationError::Required { .. } => CoreError::ClientNameRequired,
        other => CoreError::Validation(other),
    })?;

    Ok(Sale {
        id: stamp.id,
        timestamp: stamp.timestamp,
        client_name,
        lines,
        gross_amount: totals.gross_amount,
        visitor_count: totals.visitor_count,
        discount_amount: totals.discount_amount,
        net_amount: totals.net_amount,
        invoice_number: stamp.invoice_number,
        order_id: stamp.order_id,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
