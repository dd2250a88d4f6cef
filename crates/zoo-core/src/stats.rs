//! # Visitor Statistics
//!
//! Filters over the sale ledger and the figures shown on the visitor page
//! and in the printed reports.
//!
//! ## Filter Pipeline
//! ```text
//! ledger ──► period (day | week | month | year | all, around a date)
//!        ──► category (sales with at least one line of it)
//!        ──► search (client name or sale id, case-insensitive)
//!        ──► VisitorStats
//! ```
//!
//! Dates are calendar dates in UTC; every range is inclusive.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{Sale, VisitorCategory};

// =============================================================================
// Period
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    Day,
    /// Sunday to Saturday.
    Week,
    Month,
    Year,
    All,
}

impl Period {
    /// Inclusive date range of the period containing `date`.
    /// `None` means unbounded.
    pub fn range(&self, date: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        match self {
            Period::Day => Some((date, date)),
            Period::Week => {
                let start = date - Duration::days(date.weekday().num_days_from_sunday() as i64);
                Some((start, start + Duration::days(6)))
            }
            Period::Month => {
                let start = date.with_day(1)?;
                let next = if date.month() == 12 {
                    NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)?
                } else {
                    NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)?
                };
                Some((start, next - Duration::days(1)))
            }
            Period::Year => Some((
                NaiveDate::from_ymd_opt(date.year(), 1, 1)?,
                NaiveDate::from_ymd_opt(date.year(), 12, 31)?,
            )),
            Period::All => None,
        }
    }

    pub fn contains(&self, anchor: NaiveDate, day: NaiveDate) -> bool {
        match self.range(anchor) {
            Some((start, end)) => start <= day && day <= end,
            None => true,
        }
    }

    /// Human label for report headers.
    ///
    /// `15/03/2025`, `Semaine du 09/03/2025 au 15/03/2025`, `mars 2025`,
    /// `2025`, `Toutes périodes`.
    pub fn label(&self, date: NaiveDate) -> String {
        match (self, self.range(date)) {
            (Period::Day, _) => date.format("%d/%m/%Y").to_string(),
            (Period::Week, Some((start, end))) => format!(
                "Semaine du {} au {}",
                start.format("%d/%m/%Y"),
                end.format("%d/%m/%Y")
            ),
            (Period::Month, _) => format!("{} {}", month_name(date.month()), date.year()),
            (Period::Year, _) => date.year().to_string(),
            _ => "Toutes périodes".to_string(),
        }
    }
}

fn month_name(month: u32) -> &'static str {
    const MONTHS: [&str; 12] = [
        "janvier", "février", "mars", "avril", "mai", "juin", "juillet", "août", "septembre",
        "octobre", "novembre", "décembre",
    ];
    MONTHS[(month.clamp(1, 12) - 1) as usize]
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Period::Day => "day",
            Period::Week => "week",
            Period::Month => "month",
            Period::Year => "year",
            Period::All => "all",
        };
        f.write_str(name)
    }
}

impl FromStr for Period {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" | "jour" | "today" => Ok(Period::Day),
            "week" | "semaine" => Ok(Period::Week),
            "month" | "mois" => Ok(Period::Month),
            "year" | "année" | "annee" => Ok(Period::Year),
            "all" | "tout" | "toutes" => Ok(Period::All),
            _ => Err(ValidationError::NotAllowed {
                field: "période".to_string(),
                allowed: ["day", "week", "month", "year", "all"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            }),
        }
    }
}

// =============================================================================
// Sale Filter
// =============================================================================

/// Selection criteria of the visitor page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleFilter {
    pub period: Period,
    /// Anchor date the period is taken around.
    pub date: NaiveDate,
    pub category: Option<VisitorCategory>,
    pub search: Option<String>,
}

impl SaleFilter {
    pub fn new(period: Period, date: NaiveDate) -> Self {
        SaleFilter {
            period,
            date,
            category: None,
            search: None,
        }
    }

    pub fn with_category(mut self, category: Option<VisitorCategory>) -> Self {
        self.category = category;
        self
    }

    /// Blank searches are dropped.
    pub fn with_search(mut self, search: Option<String>) -> Self {
        self.search = search
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());
        self
    }

    pub fn matches(&self, sale: &Sale) -> bool {
        if !self.period.contains(self.date, sale.timestamp.date_naive()) {
            return false;
        }
        if let Some(category) = self.category {
            if !sale.has_category(category) {
                return false;
            }
        }
        if let Some(needle) = &self.search {
            let needle = needle.to_lowercase();
            if !sale.client_name.to_lowercase().contains(&needle)
                && !sale.id.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        true
    }

    /// Matching sales, in ledger order.
    pub fn apply<'a>(&self, sales: &'a [Sale]) -> Vec<&'a Sale> {
        sales.iter().filter(|s| self.matches(s)).collect()
    }

    pub fn period_label(&self) -> String {
        self.period.label(self.date)
    }

    /// "Tout" when no category is selected.
    pub fn category_label(&self) -> &'static str {
        self.category.map(|c| c.label()).unwrap_or("Tout")
    }
}

// =============================================================================
// Visitor Stats
// =============================================================================

/// Per-category figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStat {
    pub category: VisitorCategory,
    pub visitors: i64,
    /// Net amount of every sale containing the category. A mixed sale
    /// counts in each of its categories.
    pub revenue: Money,
}

impl CategoryStat {
    /// Share of `total` visitors, one decimal: `"12,5%"`.
    pub fn share_label(&self, total: i64) -> String {
        if total <= 0 {
            return "0,0%".to_string();
        }
        let tenths = (self.visitors * 2000 + total) / (2 * total);
        format!("{},{}%", tenths / 10, tenths % 10)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorStats {
    pub total_sales: usize,
    pub total_visitors: i64,
    pub gross_revenue: Money,
    pub total_discount: Money,
    /// Σ net amount.
    pub total_revenue: Money,
    pub average_per_sale: Money,
    /// One entry per category, in cash desk order.
    pub categories: Vec<CategoryStat>,
}

impl VisitorStats {
    pub fn from_sales<'a, I>(sales: I) -> Self
    where
        I: IntoIterator<Item = &'a Sale>,
    {
        let mut stats = VisitorStats {
            categories: VisitorCategory::ALL
                .iter()
                .map(|&category| CategoryStat {
                    category,
                    visitors: 0,
                    revenue: Money::zero(),
                })
                .collect(),
            ..VisitorStats::default()
        };

        for sale in sales {
            stats.total_sales += 1;
            stats.total_visitors += sale.visitor_count;
            stats.gross_revenue += sale.gross_amount;
            stats.total_discount += sale.discount_amount;
            stats.total_revenue += sale.net_amount;

            for entry in &mut stats.categories {
                if sale.has_category(entry.category) {
                    entry.visitors += sale.visitors_in(entry.category);
                    entry.revenue += sale.net_amount;
                }
            }
        }

        stats.average_per_sale = stats.total_revenue.average_over(stats.total_sales as i64);
        stats
    }

    pub fn category(&self, category: VisitorCategory) -> Option<&CategoryStat> {
        self.categories.iter().find(|c| c.category == category)
    }

    pub fn is_empty(&self) -> bool {
        self.total_sales == 0
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
