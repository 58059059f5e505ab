//! Wire Format
//!
//! JSON request and response messages for a single solve.
//!
//! A request names the tax-inclusive target, the tax rate in percent points and the items:
//!
//! ```json
//! {
//!   "target": 1.83,
//!   "tax": 0,
//!   "items": [
//!     { "name": "A", "unitPrice": 0.78, "category": "x" },
//!     { "name": "B", "unitPrice": 1.05, "category": "y" }
//!   ]
//! }
//! ```
//!
//! The response is either `{ "solutions": [...], "solutionCount": n, "exhaustive": bool }` or
//! `{ "error": "..." }`. Each solution lists its purchased lines followed by a tax line and a
//! `Total` line.

use rust_decimal::Decimal;
use rusty_money::Money;
use serde::{Deserialize, Serialize};

use crate::{
    items::Item,
    pricing::{PricingError, TaxRate, currency_by_code, from_minor_units, to_minor_units},
    receipt::Receipt,
    solvers::{Problem, Solver, SolverError, SolverResult},
};

/// Currency assumed when a request does not name one.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Name of the last line of every solution.
pub const TOTAL_LINE: &str = "Total";

/// An item as sent by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestItem {
    /// Unique item name
    pub name: String,

    /// Price of one unit
    pub unit_price: Decimal,

    /// Category used for balance scoring and receipt grouping
    pub category: String,
}

/// Request to find combinations of items that hit a target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveRequest {
    /// Tax-inclusive target
    pub target: Decimal,

    /// Tax rate in percent points
    pub tax: Decimal,

    /// Items that may make up the target
    pub items: Vec<RequestItem>,

    /// ISO currency code, `USD` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

impl SolveRequest {
    /// Convert the request into a problem a [`Solver`] can take.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] for an unknown currency, a negative tax rate or an amount that
    /// cannot be represented in minor units. Item validation happens when the problem is solved.
    pub fn to_problem(&self) -> Result<Problem<'static>, PricingError> {
        let currency = currency_by_code(self.currency.as_deref().unwrap_or(DEFAULT_CURRENCY))?;

        let items = self
            .items
            .iter()
            .map(|item| {
                Ok(Item::new(
                    item.name.clone(),
                    Money::from_minor(to_minor_units(item.unit_price)?, currency),
                    item.category.clone(),
                ))
            })
            .collect::<Result<Vec<_>, PricingError>>()?;

        Ok(Problem::new(
            Money::from_minor(to_minor_units(self.target)?, currency),
            TaxRate::from_points(self.tax)?,
            items,
        ))
    }
}

/// One line of a solution.
///
/// Tax and total lines carry neither a category nor a quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseLine {
    /// Item name, tax label or `Total`
    pub name: String,

    /// Item category
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Units bought
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u64>,

    /// Line amount
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
}

impl ResponseLine {
    fn summary(name: impl Into<String>, total_price: Decimal) -> Self {
        Self {
            name: name.into(),
            category: None,
            quantity: None,
            total_price,
        }
    }

    /// Lines for a receipt: purchased items, then tax, then total.
    pub fn from_receipt(receipt: &Receipt<'_>) -> Vec<Self> {
        let mut lines: Vec<Self> = receipt
            .lines()
            .iter()
            .map(|line| Self {
                name: line.name().to_string(),
                category: Some(line.category().to_string()),
                quantity: Some(line.quantity()),
                total_price: from_minor_units(line.total_price().to_minor_units()),
            })
            .collect();

        lines.push(Self::summary(
            receipt.tax_label(),
            from_minor_units(receipt.tax().to_minor_units()),
        ));

        lines.push(Self::summary(
            TOTAL_LINE,
            from_minor_units(receipt.total().to_minor_units()),
        ));

        lines
    }
}

/// Successful solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveSuccess {
    /// Best solutions, best first
    pub solutions: Vec<Vec<ResponseLine>>,

    /// Exact solutions visited. A lower bound when `exhaustive` is false.
    pub solution_count: u64,

    /// Whether the search visited every solution
    pub exhaustive: bool,
}

/// Failed solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveFailure {
    /// Human-readable reason
    pub error: String,
}

/// Response to a [`SolveRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SolveResponse {
    /// Solutions were searched for; the list may be empty.
    Success(SolveSuccess),

    /// The request could not be searched.
    Failure(SolveFailure),
}

impl SolveResponse {
    /// Response for a finished solve.
    pub fn from_result(result: &SolverResult<'_>) -> Self {
        SolveResponse::Success(SolveSuccess {
            solutions: result
                .solutions
                .iter()
                .map(|scored| ResponseLine::from_receipt(&scored.receipt))
                .collect(),
            solution_count: result.solution_count(),
            exhaustive: result.stats.is_exhaustive(),
        })
    }

    /// Response for an error, surfacing its message verbatim.
    pub fn from_error(error: &impl ToString) -> Self {
        SolveResponse::Failure(SolveFailure {
            error: error.to_string(),
        })
    }

    /// Response for the outcome of a solve.
    pub fn from_outcome(outcome: &Result<SolverResult<'_>, SolverError>) -> Self {
        match outcome {
            Ok(result) => Self::from_result(result),
            Err(error) => Self::from_error(error),
        }
    }

    /// Whether this is a failure.
    pub fn is_error(&self) -> bool {
        matches!(self, SolveResponse::Failure(_))
    }
}

/// Solve a request, turning every error into a failure response.
pub fn respond(request: &SolveRequest, solver: &mut impl Solver) -> SolveResponse {
    match request.to_problem() {
        Ok(problem) => SolveResponse::from_outcome(&solver.solve(&problem)),
        Err(error) => SolveResponse::from_error(&error),
    }
}
