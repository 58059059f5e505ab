//! Pricing
//!
//! Conversions between decimal amounts and minor units, and inversion of the tax relation so a
//! tax-inclusive target can be searched for as an exact pre-tax subtotal.

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, USD},
};
use thiserror::Error;
use tracing::warn;

/// Errors that can occur while converting amounts or inverting the tax relation.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// No whole number of minor units, once taxed and rounded, lands on the target.
    #[error("Target {target} is not possible for tax {tax:.2}%")]
    InfeasibleTarget {
        /// Requested tax-inclusive target
        target: Decimal,
        /// Tax rate in percent points
        tax: Decimal,
    },

    /// Target rounds to zero (or less) minor units.
    #[error("target must be positive, got {0}")]
    NonPositiveTarget(Decimal),

    /// Tax rates below zero are not supported.
    #[error("tax must not be negative, got {0}%")]
    NegativeTax(Decimal),

    /// Amount overflowed while converting to or from minor units.
    #[error("amount {0} cannot be represented in minor units")]
    NotRepresentable(Decimal),

    /// Currency code is not one of the supported two-decimal currencies.
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),
}

/// Looks up one of the supported currencies by its ISO code.
///
/// Only currencies with two decimal places are supported, since every amount is handled in
/// hundredths of the major unit.
///
/// # Errors
///
/// Returns [`PricingError::UnknownCurrency`] for any other code.
pub fn currency_by_code(code: &str) -> Result<&'static Currency, PricingError> {
    match code.trim().to_ascii_uppercase().as_str() {
        "GBP" => Ok(GBP),
        "USD" => Ok(USD),
        "EUR" => Ok(EUR),
        _ => Err(PricingError::UnknownCurrency(code.to_string())),
    }
}

/// Converts a decimal amount into minor units, rounding half away from zero.
///
/// # Errors
///
/// Returns [`PricingError::NotRepresentable`] if the amount overflows an `i64`.
pub fn to_minor_units(amount: Decimal) -> Result<i64, PricingError> {
    amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .map(|value| value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|value| value.to_i64())
        .ok_or(PricingError::NotRepresentable(amount))
}

/// Converts minor units back into a decimal amount with two decimal places.
pub fn from_minor_units(minor_units: i64) -> Decimal {
    Decimal::new(minor_units, 2)
}

/// Sales tax rate, held in percent points (`2.5` means 2.5%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaxRate {
    points: Decimal,
}

impl TaxRate {
    /// No tax.
    pub const ZERO: TaxRate = TaxRate {
        points: Decimal::ZERO,
    };

    /// Create a tax rate from percent points.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::NegativeTax`] if `points` is below zero.
    pub fn from_points(points: Decimal) -> Result<Self, PricingError> {
        if points.is_sign_negative() && !points.is_zero() {
            return Err(PricingError::NegativeTax(points));
        }

        Ok(Self { points })
    }

    /// Rate in percent points.
    #[must_use]
    pub fn points(&self) -> Decimal {
        self.points
    }

    /// Rate as a fraction (`2.5%` is `0.025`).
    #[must_use]
    pub fn fraction(&self) -> Percentage {
        Percentage::from(self.points / Decimal::ONE_HUNDRED)
    }

    /// Factor that turns a pre-tax amount into a tax-inclusive one.
    #[must_use]
    pub fn multiplier(&self) -> Decimal {
        Decimal::ONE + self.fraction() * Decimal::ONE
    }

    /// Receipt label for the tax line, e.g. `Sales Tax 2.50%`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("Sales Tax {:.2}%", self.points)
    }

    /// Tax due on a pre-tax amount, rounded half up to the nearest minor unit.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::NotRepresentable`] if the tax overflows.
    pub fn tax_on<'a>(
        &self,
        subtotal: &Money<'a, Currency>,
    ) -> Result<Money<'a, Currency>, PricingError> {
        let subtotal_minor = Decimal::from(subtotal.to_minor_units());

        let tax_minor = (self.fraction() * Decimal::ONE)
            .checked_mul(subtotal_minor)
            .map(|value| value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
            .and_then(|value| value.to_i64())
            .ok_or(PricingError::NotRepresentable(subtotal_minor))?;

        Ok(Money::from_minor(tax_minor, subtotal.currency()))
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        Self::ZERO
    }
}

/// Finds the pre-tax subtotal, in minor units, whose taxed amount rounds to `target`.
///
/// With the target `T` in minor units and multiplier `m = 1 + tax / 100`, any subtotal `s` with
/// `(T - 0.5) / m <= s < (T + 0.5) / m` rounds back to `T` once taxed. The smallest whole `s` in
/// that window is returned; when the window holds no whole number the target is infeasible.
///
/// # Errors
///
/// - [`PricingError::NonPositiveTarget`]: the target is zero or negative.
/// - [`PricingError::InfeasibleTarget`]: no whole subtotal reproduces the target.
/// - [`PricingError::NotRepresentable`]: arithmetic overflowed.
pub fn subtotal_target(target: &Money<'_, Currency>, tax: TaxRate) -> Result<u64, PricingError> {
    let target_minor = target.to_minor_units();
    let target_amount = from_minor_units(target_minor);

    if target_minor <= 0 {
        return Err(PricingError::NonPositiveTarget(target_amount));
    }

    let integer_target = Decimal::from(target_minor);
    let half = Decimal::new(5, 1);
    let multiplier = tax.multiplier();

    let lower = (integer_target - half)
        .checked_div(multiplier)
        .ok_or(PricingError::NotRepresentable(target_amount))?;

    let upper = (integer_target + half)
        .checked_div(multiplier)
        .ok_or(PricingError::NotRepresentable(target_amount))?;

    let candidate = lower.ceil();

    if candidate >= upper {
        warn!(target = %target_amount, tax = %tax.points(), "target has no whole pre-tax subtotal");

        return Err(PricingError::InfeasibleTarget {
            target: target_amount,
            tax: tax.points(),
        });
    }

    candidate
        .to_u64()
        .ok_or(PricingError::NotRepresentable(target_amount))
}
