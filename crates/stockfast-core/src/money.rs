//! # Money Module
//!
//! Provides the `Money` type for prices and inventory value.
//!
//! ## Integer Amounts
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  stockFast prices in Central African CFA francs (XAF).                 │
//! │  XAF has no subunit in circulation, so one minor unit = one franc.     │
//! │                                                                         │
//! │    purchase_price = 500000   →  "500 000 FCFA"                         │
//! │    selling_price  = 650000   →  "650 000 FCFA"                         │
//! │                                                                         │
//! │  Amounts are stored and computed as i64. Floats never enter the        │
//! │  pipeline: a form value like "650000.5" is rejected at validation.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockfast_core::money::Money;
//!
//! let price = Money::from_minor(650_000);
//! let stock_value = price.times(3);
//! assert_eq!(stock_value.minor(), 1_950_000);
//! assert_eq!(price.to_string(), "650 000 FCFA");
//! assert_eq!(price.checked_times(i64::MAX), None);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// Signed so that differences (margins, negative adjustments) stay in-type.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    #[inline]
    pub const fn from_minor(amount: i64) -> Self {
        Money(amount)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Multiplies by a unit count, saturating instead of overflowing.
    /// Used for reporting values such as stock on hand.
    #[inline]
    pub const fn times(&self, quantity: i64) -> Self {
        Money(self.0.saturating_mul(quantity))
    }

    /// Multiplies by a unit count. `None` on overflow; amounts that are
    /// persisted go through this.
    #[inline]
    pub const fn checked_times(&self, quantity: i64) -> Option<Self> {
        match self.0.checked_mul(quantity) {
            Some(amount) => Some(Money(amount)),
            None => None,
        }
    }

    #[inline]
    pub const fn saturating_add(&self, other: Money) -> Self {
        Money(self.0.saturating_add(other.0))
    }

    /// Profit margin of selling over purchase in basis points of the
    /// purchase price (2500 = 25%).
    ///
    /// Returns `None` for a non-positive purchase price.
    ///
    /// ```rust
    /// use stockfast_core::money::Money;
    ///
    /// let margin = Money::margin_bps(Money::from_minor(500_000), Money::from_minor(650_000));
    /// assert_eq!(margin, Some(3000));
    /// ```
    pub fn margin_bps(purchase: Money, selling: Money) -> Option<i64> {
        if purchase.0 <= 0 {
            return None;
        }
        Some(selling.0.saturating_sub(purchase.0).saturating_mul(10_000) / purchase.0)
    }
}

/// Display groups thousands with spaces and appends the currency symbol,
/// the way prices are shown on the shop floor.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(' ');
            }
            grouped.push(ch);
        }
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{sign}{grouped} FCFA")
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
