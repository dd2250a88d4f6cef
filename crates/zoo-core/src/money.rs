//! # Money Module
//!
//! Provides the `Money` type for ticket prices and sale amounts.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  gross × 0.1 in floating point can land on 26999.999999999996           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer centimes (1 FC = 100 centimes)                   │
//! │    27 000 000 centimes × 1000 bps / 10 000 = 2 700 000 centimes         │
//! │    Exact for every whole-franc amount                                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use zoo_core::money::Money;
//!
//! let adult = Money::from_francs(2_500);
//! let line = adult.multiply_quantity(4);
//! assert_eq!(line.francs(), 10_000);
//! assert_eq!(line.to_string(), "10 000 FC");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in centimes of Congolese franc.
///
/// Serialized as a bare integer of centimes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from centimes (the smallest currency unit).
    #[inline]
    pub const fn from_centimes(centimes: i64) -> Self {
        Money(centimes)
    }

    /// Creates a Money value from whole francs.
    ///
    /// ```rust
    /// use zoo_core::money::Money;
    ///
    /// assert_eq!(Money::from_francs(2_500).centimes(), 250_000);
    /// ```
    #[inline]
    pub const fn from_francs(francs: i64) -> Self {
        Money(francs * 100)
    }

    /// Returns the value in centimes.
    #[inline]
    pub const fn centimes(&self) -> i64 {
        self.0
    }

    /// Returns the whole-franc portion (truncated toward zero).
    #[inline]
    pub const fn francs(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the centime portion (always 0-99).
    #[inline]
    pub const fn centimes_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity.
    ///
    /// ## User Workflow
    /// ```text
    /// National / Adulte: 2 500 FC
    /// Quantity: 40
    ///      │
    ///      ▼
    /// multiply_quantity(40) ← THIS FUNCTION
    ///      │
    ///      ▼
    /// Line Total: 100 000 FC
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// `multiply_quantity` for amounts read back from storage; `None` on
    /// overflow.
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    /// Returns `bps` basis points of this amount, rounded half-up to the
    /// centime.
    ///
    /// Uses integer math: `(amount * bps + 5000) / 10000`.
    ///
    /// ```rust
    /// use zoo_core::money::Money;
    ///
    /// let gross = Money::from_francs(270_000);
    /// assert_eq!(gross.percentage(1000).francs(), 27_000);
    /// ```
    pub fn percentage(&self, bps: u32) -> Money {
        let part = (self.0 as i128 * bps as i128 + 5000) / 10000;
        Money(part as i64)
    }

    /// Divides evenly across `parts`, rounding half-up to the centime.
    ///
    /// Returns zero when `parts` is zero (an empty selection has no average).
    pub fn average_over(&self, parts: i64) -> Money {
        if parts <= 0 {
            return Money::zero();
        }
        let numerator = self.0 as i128 * 2 + parts as i128;
        Money((numerator / (parts as i128 * 2)) as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows francs with space-grouped thousands and the `FC` suffix.
///
/// Centimes are only printed when present: `2 500 FC`, `12,50 FC`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_with(DEFAULT_SYMBOL))
    }
}

/// Currency suffix of the cash desk.
pub const DEFAULT_SYMBOL: &str = "FC";

impl Money {
    /// Same layout as `Display` with another currency suffix.
    ///
    /// ```rust
    /// use zoo_core::money::Money;
    ///
    /// assert_eq!(Money::from_francs(270_000).format_with("CDF"), "270 000 CDF");
    /// ```
    pub fn format_with(&self, symbol: &str) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let grouped = group_thousands(self.francs().unsigned_abs());
        let centimes = self.centimes_part().unsigned_abs();
        if centimes == 0 {
            format!("{}{} {}", sign, grouped, symbol)
        } else {
            format!("{}{},{:02} {}", sign, grouped, centimes, symbol)
        }
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(ch);
    }
    out
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_francs_and_centimes() {
        let money = Money::from_francs(2_500);
        assert_eq!(money.centimes(), 250_000);
        assert_eq!(money.francs(), 2_500);
        assert_eq!(money.centimes_part(), 0);

        let odd = Money::from_centimes(1_250);
        assert_eq!(odd.francs(), 12);
        assert_eq!(odd.centimes_part(), 50);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_francs(270_000).to_string(), "270 000 FC");
        assert_eq!(Money::from_francs(2_500).to_string(), "2 500 FC");
        assert_eq!(Money::from_francs(999).to_string(), "999 FC");
        assert_eq!(Money::zero().to_string(), "0 FC");
        assert_eq!(Money::from_centimes(1_250).to_string(), "12,50 FC");
        assert_eq!(Money::from_francs(-27_000).to_string(), "-27 000 FC");
        assert_eq!(Money::from_francs(1_234_567).to_string(), "1 234 567 FC");
    }

    #[test]
    fn test_checked_arithmetic() {
        let adult = Money::from_francs(2_500);
        assert_eq!(adult.checked_multiply_quantity(4), Some(Money::from_francs(10_000)));
        assert_eq!(Money::from_centimes(i64::MAX / 2).checked_multiply_quantity(3), None);
        assert_eq!(Money::from_centimes(i64::MAX).checked_add(Money::from_centimes(1)), None);
        assert_eq!(adult.checked_add(adult), Some(Money::from_francs(5_000)));
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_francs(1_000);
        let b = Money::from_francs(500);

        assert_eq!((a + b).francs(), 1_500);
        assert_eq!((a - b).francs(), 500);
        assert_eq!((a * 3).francs(), 3_000);

        let total: Money = [a, b, b].iter().sum();
        assert_eq!(total.francs(), 2_000);
    }

    #[test]
    fn test_percentage_is_exact_on_whole_francs() {
        assert_eq!(Money::from_francs(270_000).percentage(1000), Money::from_francs(27_000));
        assert_eq!(Money::from_francs(2_500).percentage(1000), Money::from_francs(250));
        assert_eq!(Money::from_francs(1).percentage(1000), Money::from_centimes(10));
    }

    #[test]
    fn test_percentage_rounds_half_up() {
        // 5 centimes × 10% = 0.5 centime → 1
        assert_eq!(Money::from_centimes(5).percentage(1000).centimes(), 1);
        assert_eq!(Money::from_centimes(4).percentage(1000).centimes(), 0);
    }

    #[test]
    fn test_average_over() {
        let revenue = Money::from_francs(10_000);
        assert_eq!(revenue.average_over(4), Money::from_francs(2_500));
        assert_eq!(revenue.average_over(0), Money::zero());
        // 1 centime over 2 parts rounds half-up
        assert_eq!(Money::from_centimes(1).average_over(2).centimes(), 1);
        assert_eq!(Money::from_centimes(100).average_over(3).centimes(), 33);
    }

    #[test]
    fn test_serializes_as_integer_centimes() {
        let json = serde_json::to_string(&Money::from_francs(25)).unwrap();
        assert_eq!(json, "2500");
        let back: Money = serde_json::from_str("2500").unwrap();
        assert_eq!(back.francs(), 25);
    }
}
