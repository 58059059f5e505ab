//! Solvers for exact-total combinations

use std::time::Duration;

use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::{
    items::{Item, catalog::CatalogError},
    pricing::{PricingError, TaxRate},
    receipt::{Receipt, ReceiptError},
    table::TableError,
};

pub mod exact;

/// Solver Errors
#[derive(Debug, Error)]
pub enum SolverError {
    /// Wrapped catalog validation error
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Wrapped target or tax error
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Wrapped reachability table error
    #[error(transparent)]
    Table(TableError),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// Wrapped receipt assembly error
    #[error(transparent)]
    Receipt(#[from] ReceiptError),

    /// Subtotal target is too large to index a table column.
    #[error("target of {minor_units} minor units is too large to search")]
    TargetTooLarge {
        /// Subtotal target in minor units
        minor_units: u64,
    },

    /// The solve was cancelled before it finished.
    #[error("solve was cancelled")]
    Cancelled,

    /// Internal solver invariant was violated (this is a bug).
    #[error("solver invariant violated: {message}")]
    InvariantViolation {
        /// What invariant was violated
        message: &'static str,
    },
}

impl From<TableError> for SolverError {
    fn from(error: TableError) -> Self {
        match error {
            TableError::Interrupted => SolverError::Cancelled,
            error => SolverError::Table(error),
        }
    }
}

/// One request: a tax-inclusive target, a tax rate and the items that may make it up.
#[derive(Debug, Clone, PartialEq)]
pub struct Problem<'a> {
    target: Money<'a, Currency>,
    tax: TaxRate,
    items: Vec<Item<'a>>,
}

impl<'a> Problem<'a> {
    /// Create a problem. Items are validated when solved.
    pub fn new(target: Money<'a, Currency>, tax: TaxRate, items: Vec<Item<'a>>) -> Self {
        Self { target, tax, items }
    }

    /// Tax-inclusive target
    pub fn target(&self) -> &Money<'a, Currency> {
        &self.target
    }

    /// Tax rate applied to the subtotal
    pub fn tax(&self) -> TaxRate {
        self.tax
    }

    /// Items in input order
    pub fn items(&self) -> &[Item<'a>] {
        &self.items
    }
}

/// Counters describing how a search went.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Exact solutions visited. A lower bound unless the search was exhaustive.
    pub solutions: u64,

    /// Internal frames expanded
    pub expanded: u64,

    /// Internal frames skipped while thinning
    pub thinned: u64,

    /// Whether the deadline stopped the search
    pub expired: bool,

    /// Time spent enumerating
    pub elapsed: Duration,
}

impl SearchStats {
    /// Whether every solution was visited, so [`SearchStats::solutions`] is exact.
    pub fn is_exhaustive(&self) -> bool {
        !self.expired && self.thinned == 0
    }
}

/// A receipt with the score it was ranked by.
#[derive(Debug, Clone)]
pub struct ScoredReceipt<'a> {
    /// Weighted balance score, higher is better
    pub score: f64,

    /// Assembled receipt
    pub receipt: Receipt<'a>,
}

/// Best solutions found for a problem, best first.
#[derive(Debug, Clone)]
pub struct SolverResult<'a> {
    /// Retained solutions, sorted by descending score
    pub solutions: Vec<ScoredReceipt<'a>>,

    /// Pre-tax subtotal every solution adds up to
    pub subtotal_target: Money<'a, Currency>,

    /// Search counters
    pub stats: SearchStats,
}

impl SolverResult<'_> {
    /// Number of exact solutions visited.
    pub fn solution_count(&self) -> u64 {
        self.stats.solutions
    }
}

/// Trait for finding combinations of items that hit a target
pub trait Solver {
    /// Solve the given problem
    ///
    /// # Errors
    ///
    /// Returns a [`SolverError`] if the input is invalid, the target is infeasible, or the
    /// solve is cancelled. Finding no solutions is not an error.
    fn solve<'a>(&mut self, problem: &Problem<'a>) -> Result<SolverResult<'a>, SolverError>;
}
