//! # Money Module
//!
//! Integer money and the flat VAT policy.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │    0.1 + 0.2 = 0.30000000000000004                                      │
//! │                                                                         │
//! │  A sale total is Σ price × quantity. If any of those terms is a float, │
//! │  the persisted total can drift from the sum of its lines.              │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    1999 cents × 3 = 5997 cents, exactly, every time                    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use gestpro_core::money::{Money, FLAT_VAT_RATE};
//!
//! let price = Money::from_cents(19999); // 199.99 €
//! let line = price.multiply_quantity(2);
//! assert_eq!(line.cents(), 39998);
//!
//! // VAT share of a tax-inclusive total
//! let vat = line.vat_share(FLAT_VAT_RATE);
//! assert_eq!(vat.cents(), 8000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01% = 1/10000, so 2000 bps = 20%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

/// The single VAT rate the store applies: 20%.
///
/// Receipts and reports show it as a share *of* the tax-inclusive total,
/// never added on top of it.
pub const FLAT_VAT_RATE: TaxRate = TaxRate::from_bps(2000);

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                                                                         │
/// │  Product.selling_price ──► CartItem.line_total ──► Cart.total          │
/// │                                                      │                  │
/// │                                                      ▼                  │
/// │                               Transaction.total (computed at commit)   │
/// │                                                      │                  │
/// │                                 ┌────────────────────┴──────────┐       │
/// │                                 ▼                               ▼       │
/// │                          Receipt (VAT share)          Reports (revenue) │
/// │                                                                         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-euro portion.
    #[inline]
    pub const fn euros(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the cents portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies a unit price by a quantity.
    ///
    /// ```rust
    /// use gestpro_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299);
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 897);
    /// ```
    ///
    /// Saturates at the `i64` bounds. Amounts that get persisted go through
    /// [`Money::checked_multiply_quantity`] instead.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// `None` when the product does not fit in an `i64`.
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// `None` when the sum does not fit in an `i64`.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// The share of this (tax-inclusive) amount attributed to `rate`.
    ///
    /// Computed as `amount × rate`, rounded half-up on the cent, which is how
    /// the store has always printed VAT on its tickets.
    ///
    /// ```rust
    /// use gestpro_core::money::{Money, FLAT_VAT_RATE};
    ///
    /// // 10.01 € × 20% = 2.002 € → 2.00 €
    /// assert_eq!(Money::from_cents(1001).vat_share(FLAT_VAT_RATE).cents(), 200);
    /// ```
    pub fn vat_share(&self, rate: TaxRate) -> Money {
        // i128 so large report totals cannot overflow mid-computation
        let cents = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(cents as i64)
    }

    /// The amount left once the VAT share is taken out.
    pub fn net_of(&self, rate: TaxRate) -> Money {
        *self - self.vat_share(rate)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows money the way the tickets print it: `12.34 €`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02} €", sign, self.euros().abs(), self.cents_part())
    }
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

/// Saturating, so a display total can never wrap to a negative amount.
impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| Money(acc.0.saturating_add(m.0)))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(19999);
        assert_eq!(money.cents(), 19999);
        assert_eq!(money.euros(), 199);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "10.99 €");
        assert_eq!(Money::from_cents(500).to_string(), "5.00 €");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50 €");
        assert_eq!(Money::zero().to_string(), "0.00 €");
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);

        let total: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(total.cents(), 2000);
    }

    #[test]
    fn test_flat_vat_share() {
        // 100.00 € inclusive → 20.00 € VAT, 80.00 € net
        let total = Money::from_cents(10000);
        assert_eq!(total.vat_share(FLAT_VAT_RATE).cents(), 2000);
        assert_eq!(total.net_of(FLAT_VAT_RATE).cents(), 8000);
    }

    #[test]
    fn test_vat_share_rounds_half_up() {
        // 0.03 € × 20% = 0.006 € → 0.01 €
        assert_eq!(Money::from_cents(3).vat_share(FLAT_VAT_RATE).cents(), 1);
        // 0.02 € × 20% = 0.004 € → 0.00 €
        assert_eq!(Money::from_cents(2).vat_share(FLAT_VAT_RATE).cents(), 0);
    }

    #[test]
    fn test_tax_rate_percentage() {
        assert!((FLAT_VAT_RATE.percentage() - 20.0).abs() < 0.001);
    }

    #[test]
    fn test_checked_arithmetic_reports_overflow() {
        let price = Money::from_cents(i64::MAX / 2 + 1);
        assert_eq!(price.checked_multiply_quantity(2), None);
        assert_eq!(price.checked_add(price), None);
        assert_eq!(Money::from_cents(299).checked_multiply_quantity(3), Some(Money::from_cents(897)));

        // display arithmetic saturates instead of wrapping negative
        assert_eq!(price.multiply_quantity(2).cents(), i64::MAX);
        let total: Money = vec![price, price].into_iter().sum();
        assert_eq!(total.cents(), i64::MAX);
    }
}
