//! Exact Sum Solver

use rand::{Rng, SeedableRng, rngs::StdRng};
use rusty_money::Money;
use smallvec::SmallVec;
use tracing::{Span, debug, info};

use crate::{
    config::SearchConfig,
    items::catalog::Catalog,
    pricing::subtotal_target,
    receipt::Receipt,
    scoring::{Scorer, ranking::Ranking},
    solvers::{
        Problem, ScoredReceipt, SearchStats, Solver, SolverError, SolverResult,
        exact::{
            budget::{CancellationToken, Clock, MonotonicClock},
            enumerator::{Enumerator, Quantities},
        },
    },
    table::ReachabilityTable,
};

pub mod budget;
pub mod enumerator;

/// Solver that enumerates every combination whose taxed total rounds to the target, within a
/// time budget, and keeps the best-balanced ones.
///
/// The random source and clock are injectable so thinning and expiry can be reproduced.
#[derive(Debug)]
pub struct ExactSumSolver<R = StdRng, C = MonotonicClock> {
    config: SearchConfig,
    rng: R,
    clock: C,
    cancel: CancellationToken,
}

impl ExactSumSolver {
    /// Create a solver with an entropy-seeded random source and the system clock.
    pub fn new(config: SearchConfig) -> Self {
        Self::with_parts(config, StdRng::from_entropy(), MonotonicClock::default())
    }

    /// Create a solver whose thinning decisions are reproducible for a given seed.
    pub fn seeded(config: SearchConfig, seed: u64) -> Self {
        Self::with_parts(config, StdRng::seed_from_u64(seed), MonotonicClock::default())
    }
}

impl<R: Rng, C: Clock> ExactSumSolver<R, C> {
    /// Create a solver from its parts.
    pub fn with_parts(config: SearchConfig, rng: R, clock: C) -> Self {
        Self {
            config,
            rng,
            clock,
            cancel: CancellationToken::new(),
        }
    }

    /// Stop when `cancel` fires instead of the solver's own token.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Search configuration
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Token that cancels solves run by this solver.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }
}

impl<R: Rng, C: Clock> Solver for ExactSumSolver<R, C> {
    #[tracing::instrument(
        name = "solvers.exact.solve",
        skip(self, problem),
        fields(
            target = %problem.target(),
            tax = %problem.tax().points(),
            items = problem.items().len(),
            subtotal_target = tracing::field::Empty
        ),
        err
    )]
    fn solve<'a>(&mut self, problem: &Problem<'a>) -> Result<SolverResult<'a>, SolverError> {
        let currency = problem.target().currency();
        let catalog = Catalog::new(problem.items().iter().cloned(), currency)?;

        let target_minor = subtotal_target(problem.target(), problem.tax())?;

        Span::current().record("subtotal_target", target_minor);

        let subtotal = Money::from_minor(
            i64::try_from(target_minor).map_err(|_err| SolverError::TargetTooLarge {
                minor_units: target_minor,
            })?,
            currency,
        );

        let target = usize::try_from(target_minor).map_err(|_err| SolverError::TargetTooLarge {
            minor_units: target_minor,
        })?;

        let prices = catalog
            .iter()
            .map(|item| usize::try_from(item.integer_price()))
            .collect::<Result<SmallVec<[usize; 16]>, _>>()
            .map_err(|_err| SolverError::InvariantViolation {
                message: "item price does not fit a table index",
            })?;

        let cancel = self.cancel.clone();
        let table = ReachabilityTable::build_until(target, &prices, || !cancel.is_cancelled())?;

        debug!(
            rows = table.rows(),
            columns = table.columns(),
            solvable = table.is_solvable(),
            "built reachability table"
        );

        if !table.is_solvable() {
            info!(subtotal_target = target_minor, "no combination reaches the target");

            return Ok(SolverResult {
                solutions: Vec::new(),
                subtotal_target: subtotal,
                stats: SearchStats::default(),
            });
        }

        let scorer = Scorer::new(&catalog, target_minor, self.config.weights);
        let mut ranking: Ranking<Quantities> = Ranking::new(self.config.keep);

        let stats = Enumerator::new(
            &table,
            &prices,
            self.config.budget(),
            &mut self.rng,
            &self.clock,
            &self.cancel,
        )
        .run(|quantities| {
            ranking.offer_with(scorer.score(quantities), || {
                quantities.iter().copied().collect()
            });
        })?;

        let solutions = ranking
            .into_vec()
            .into_iter()
            .map(|ranked| {
                Ok(ScoredReceipt {
                    score: ranked.score,
                    receipt: Receipt::from_quantities(&catalog, &ranked.value, problem.tax())?,
                })
            })
            .collect::<Result<Vec<_>, SolverError>>()?;

        info!(
            solutions = stats.solutions,
            kept = solutions.len(),
            expanded = stats.expanded,
            thinned = stats.thinned,
            expired = stats.expired,
            elapsed_ms = stats.elapsed.as_millis(),
            "search finished"
        );

        Ok(SolverResult {
            solutions,
            subtotal_target: subtotal,
            stats,
        })
    }
}
