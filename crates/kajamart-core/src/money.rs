//! # Money Module
//!
//! Provides the `Money` type and the currency formatter used for display.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004                                      │
//! │                                                                         │
//! │  A return that refunds 2 × $229.99 and charges 1 × $459.98 must net    │
//! │  to exactly zero, not to a stray fraction that shows up as "$ -0".      │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units                                      │
//! │    Pesos have no minor unit in practice, so 35500 means $ 35.500.       │
//! │    Currencies with cents store cents (1099 = $10.99).                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use kajamart_core::money::{CurrencyFormat, Money};
//!
//! let price = Money::from_minor(35500);
//! let line = price * 2;
//! assert_eq!(line.minor(), 71000);
//!
//! assert_eq!(CurrencyFormat::default().format(line), "$ 71.000");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul, Neg, Sub};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary amount in the smallest currency unit.
///
/// ## Design Decisions
/// - **i64 (signed)**: intermediate settlement deltas can be negative
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Newtype serde**: travels as a plain JSON number
/// - **Saturating arithmetic**: results past the i64 range stick at
///   `i64::MAX` / `i64::MIN` instead of wrapping or panicking
///
/// ## Where Money Flows
/// ```text
/// SaleLine.unit_price ──► ReturnedLineItem.unit_price ──┐
///                                                        ├─► line_total ─► SettlementResult
/// ProductRecord.price ──► ReplacementLineItem.unit_price ┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    ///
    /// ```rust
    /// use kajamart_core::money::Money;
    ///
    /// assert_eq!(Money::from_minor(22999).minor(), 22999);
    /// ```
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
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

    /// Checks if the value is strictly positive.
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is strictly negative.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns `self` if positive, otherwise zero.
    ///
    /// ```rust
    /// use kajamart_core::money::Money;
    ///
    /// assert_eq!(Money::from_minor(-500).positive_part(), Money::zero());
    /// assert_eq!(Money::from_minor(500).positive_part().minor(), 500);
    /// ```
    #[inline]
    pub const fn positive_part(&self) -> Self {
        if self.0 > 0 {
            Money(self.0)
        } else {
            Money(0)
        }
    }

    /// Multiplies a unit price by a quantity.
    ///
    /// ## User Workflow
    /// ```text
    /// Product: Arroz Diana 5kg  $ 22.999
    /// Returned: 2
    ///      │
    ///      ▼
    /// multiply_quantity(2) ← THIS FUNCTION
    ///      │
    ///      ▼
    /// Line Total: $ 45.998
    /// ```
    ///
    /// Saturates at the i64 range for absurd quantities.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        // i128 holds any i64 × i64 product exactly
        let product = self.0 as i128 * qty as i128;
        if product > i64::MAX as i128 {
            Money(i64::MAX)
        } else if product < i64::MIN as i128 {
            Money(i64::MIN)
        } else {
            Money(product as i64)
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display uses the default (peso) format.
///
/// Use a configured [`CurrencyFormat`] for anything the user sees.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&CurrencyFormat::default().format(*self))
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
        Money(self.0.saturating_add(other.0))
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(self.0.saturating_neg())
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Currency Formatter
// =============================================================================

/// Most minor-unit digits a [`CurrencyFormat`] renders.
pub const MAX_DECIMALS: u8 = 4;

/// Rendering rules for currency text.
///
/// The default matches how the store prints prices: Colombian pesos,
/// no decimals, dot as thousands separator (`$ 35.500`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CurrencyFormat {
    /// Symbol placed before the amount.
    pub symbol: String,

    /// Number of minor-unit digits (0 for COP, 2 for USD).
    /// Values above [`MAX_DECIMALS`] are rendered as `MAX_DECIMALS`.
    pub decimals: u8,

    /// Grouping separator for thousands.
    pub thousands_separator: char,

    /// Separator between major and minor units.
    pub decimal_separator: char,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        CurrencyFormat {
            symbol: "$".to_string(),
            decimals: 0,
            thousands_separator: '.',
            decimal_separator: ',',
        }
    }
}

impl CurrencyFormat {
    /// Formats an amount.
    ///
    /// ```rust
    /// use kajamart_core::money::{CurrencyFormat, Money};
    ///
    /// let cop = CurrencyFormat::default();
    /// assert_eq!(cop.format(Money::from_minor(1234567)), "$ 1.234.567");
    /// assert_eq!(cop.format(Money::from_minor(-500)), "-$ 500");
    ///
    /// let usd = CurrencyFormat {
    ///     symbol: "$".into(),
    ///     decimals: 2,
    ///     thousands_separator: ',',
    ///     decimal_separator: '.',
    /// };
    /// assert_eq!(usd.format(Money::from_minor(123456)), "$ 1,234.56");
    /// ```
    pub fn format(&self, amount: Money) -> String {
        let decimals = self.decimals.min(MAX_DECIMALS);
        let divisor = 10_u64.pow(decimals as u32);
        // unsigned_abs so i64::MIN does not overflow
        let magnitude = amount.minor().unsigned_abs();
        let whole = magnitude / divisor;
        let frac = magnitude % divisor;

        let mut out = String::new();
        if amount.is_negative() {
            out.push('-');
        }
        out.push_str(&self.symbol);
        out.push(' ');
        out.push_str(&group_thousands(whole, self.thousands_separator));

        if decimals > 0 {
            out.push(self.decimal_separator);
            out.push_str(&format!("{:0width$}", frac, width = decimals as usize));
        }

        out
    }
}

fn group_thousands(value: u64, separator: char) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(ch);
    }

    grouped
}

// =============================================================================
// Unit Tests
// =============================================================================
