//! Tally prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    config::{ConfigError, SearchConfig},
    fixtures::{Fixture, FixtureError},
    items::{
        Item,
        catalog::{CalculatedItem, Catalog, CatalogError},
    },
    pricing::{PricingError, TaxRate, subtotal_target},
    receipt::{LineItem, Receipt, ReceiptError},
    scoring::{
        ScoreBreakdown, ScoreWeights, Scorer,
        ranking::{Ranked, Ranking},
    },
    session::{Session, SessionError},
    solvers::{
        Problem, ScoredReceipt, SearchStats, Solver, SolverError, SolverResult,
        exact::{
            ExactSumSolver,
            budget::{CancellationToken, Clock, MonotonicClock, TimeBudget},
        },
    },
    table::{ReachabilityTable, TableError},
    wire::{SolveRequest, SolveResponse, respond},
};
