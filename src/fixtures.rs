//! Fixtures
//!
//! YAML problem definitions, used by the CLI and tests:
//!
//! ```yaml
//! target: "51.25 USD"
//! tax: "2.5%"
//! items:
//!   - name: Coffee
//!     price: "2.50 USD"
//!     category: drinks
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use serde::Deserialize;
use thiserror::Error;

use crate::{
    items::Item,
    pricing::{TaxRate, currency_by_code, to_minor_units},
    solvers::Problem,
};

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid percentage format
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Currency mismatch between the target and an item
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),
}

/// Item as written in a fixture file.
#[derive(Debug, Deserialize)]
pub struct ItemFixture {
    /// Item name
    pub name: String,

    /// Price string (e.g., "2.50 USD")
    pub price: String,

    /// Category name
    pub category: String,
}

/// Problem as written in a fixture file.
#[derive(Debug, Deserialize)]
pub struct ProblemFixture {
    /// Tax-inclusive target (e.g., "51.25 USD")
    pub target: String,

    /// Tax rate in percent (e.g., "2.5%"), no tax when absent
    #[serde(default)]
    pub tax: Option<String>,

    /// Items that may make up the target
    pub items: Vec<ItemFixture>,
}

impl TryFrom<ProblemFixture> for Problem<'static> {
    type Error = FixtureError;

    fn try_from(fixture: ProblemFixture) -> Result<Self, Self::Error> {
        let (target_minor, currency) = parse_price(&fixture.target)?;

        let tax = fixture
            .tax
            .as_deref()
            .map(parse_tax)
            .transpose()?
            .unwrap_or_default();

        let items = fixture
            .items
            .into_iter()
            .map(|item| {
                let (minor_units, item_currency) = parse_price(&item.price)?;

                if item_currency != currency {
                    return Err(FixtureError::CurrencyMismatch(
                        currency.iso_alpha_code.to_string(),
                        item_currency.iso_alpha_code.to_string(),
                    ));
                }

                Ok(Item::new(
                    item.name,
                    Money::from_minor(minor_units, currency),
                    item.category,
                ))
            })
            .collect::<Result<Vec<_>, FixtureError>>()?;

        Ok(Problem::new(
            Money::from_minor(target_minor, currency),
            tax,
            items,
        ))
    }
}

/// Loads problems from a directory of `<name>.yml` files.
#[derive(Debug, Clone)]
pub struct Fixture {
    base_path: PathBuf,
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

impl Fixture {
    /// Fixture loader rooted at `./fixtures`
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Fixture loader rooted at a custom path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Directory fixtures are loaded from
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Load the problem in `<base_path>/<name>.yml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or holds an invalid amount.
    pub fn load(&self, name: &str) -> Result<Problem<'static>, FixtureError> {
        Self::from_path(self.base_path.join(format!("{name}.yml")))
    }

    /// Load a problem from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or holds an invalid amount.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Problem<'static>, FixtureError> {
        Self::from_yaml(&fs::read_to_string(path)?)
    }

    /// Parse a problem from YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or holds an invalid amount.
    pub fn from_yaml(contents: &str) -> Result<Problem<'static>, FixtureError> {
        let fixture: ProblemFixture = serde_norway::from_str(contents)?;

        fixture.try_into()
    }
}

/// Parse a price string like `"2.99 GBP"` into minor units and currency.
///
/// # Errors
///
/// Returns an error if the string is not an amount followed by a supported currency code.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), Some(code), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(FixtureError::InvalidPrice(s.to_string()));
    };

    let amount =
        Decimal::from_str(amount).map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let currency =
        currency_by_code(code).map_err(|_err| FixtureError::UnknownCurrency(code.to_string()))?;

    let minor_units =
        to_minor_units(amount).map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    Ok((minor_units, currency))
}

/// Parse a tax rate like `"2.5%"` (or a bare `"2.5"`) as percent points.
///
/// # Errors
///
/// Returns an error if the string is not a non-negative number.
pub fn parse_tax(s: &str) -> Result<TaxRate, FixtureError> {
    let trimmed = s.trim();
    let number = trimmed.strip_suffix('%').unwrap_or(trimmed).trim_end();

    Decimal::from_str(number)
        .ok()
        .and_then(|points| TaxRate::from_points(points).ok())
        .ok_or_else(|| FixtureError::InvalidPercentage(s.to_string()))
}
