//! Enumerator
//!
//! Depth-first reconstruction of every quantity vector the reachability table allows.

use rand::Rng;
use smallvec::{SmallVec, smallvec};
use tracing::warn;

use crate::{
    solvers::{
        SearchStats, SolverError,
        exact::budget::{CancellationToken, Clock, Pace, TimeBudget},
    },
    table::ReachabilityTable,
};

/// Quantity of each catalog item, in catalog order.
pub type Quantities = SmallVec<[usize; 16]>;

/// Pending search state: the first `row` items still have to make `remaining`.
#[derive(Debug)]
struct Frame {
    row: usize,
    remaining: usize,
    quantities: Quantities,
}

/// Walks a reachability table, reporting each exact solution it visits.
///
/// Item quantities are decided from the most expensive item down. A frame at row `0` with
/// nothing remaining is a complete solution.
#[derive(Debug)]
pub struct Enumerator<'s, R, C> {
    table: &'s ReachabilityTable,
    prices: &'s [usize],
    budget: TimeBudget,
    rng: &'s mut R,
    clock: &'s C,
    cancel: &'s CancellationToken,
}

impl<'s, R: Rng, C: Clock> Enumerator<'s, R, C> {
    /// Create an enumerator over `table`, built from `prices` in the same order.
    pub fn new(
        table: &'s ReachabilityTable,
        prices: &'s [usize],
        budget: TimeBudget,
        rng: &'s mut R,
        clock: &'s C,
        cancel: &'s CancellationToken,
    ) -> Self {
        Self {
            table,
            prices,
            budget,
            rng,
            clock,
            cancel,
        }
    }

    /// Visit solutions until the stack is exhausted or the budget expires.
    ///
    /// Once the budget starts thinning, internal frames are skipped at random, so the reported
    /// solution count becomes a lower bound. [`SearchStats::is_exhaustive`] tells the two apart.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::Cancelled`] if the cancellation token fires, and
    /// [`SolverError::InvariantViolation`] if the table and prices disagree.
    pub fn run(self, mut on_solution: impl FnMut(&[usize])) -> Result<SearchStats, SolverError> {
        if self.table.rows() != self.prices.len() + 1 {
            return Err(SolverError::InvariantViolation {
                message: "reachability table rows do not match item count",
            });
        }

        let started = self.clock.now();
        let mut stats = SearchStats::default();

        let mut stack = vec![Frame {
            row: self.prices.len(),
            remaining: self.table.target(),
            quantities: smallvec![0; self.prices.len()],
        }];

        while let Some(frame) = stack.pop() {
            if self.cancel.is_cancelled() {
                return Err(SolverError::Cancelled);
            }

            if frame.row == 0 {
                if frame.remaining == 0 {
                    stats.solutions += 1;
                    on_solution(frame.quantities.as_slice());
                }

                continue;
            }

            let elapsed = self.clock.now().saturating_sub(started);

            match self.budget.pace(elapsed) {
                Pace::Expired => {
                    warn!(
                        elapsed_ms = elapsed.as_millis(),
                        solutions = stats.solutions,
                        "search deadline expired"
                    );
                    stats.expired = true;
                    break;
                }
                Pace::Thinning if self.rng.r#gen::<f64>() < self.budget.thinning_rate() => {
                    stats.thinned += 1;
                    continue;
                }
                Pace::Thinning | Pace::Exhaustive => {}
            }

            stats.expanded += 1;

            let item = frame.row - 1;
            let price = *self
                .prices
                .get(item)
                .ok_or(SolverError::InvariantViolation {
                    message: "frame row outside price list",
                })?;

            for count in 0..=frame.remaining / price {
                let rest = frame.remaining - count * price;

                if !self.table.is_reachable(item, rest) {
                    continue;
                }

                let mut quantities = frame.quantities.clone();

                if let Some(quantity) = quantities.get_mut(item) {
                    *quantity = count;
                }

                stack.push(Frame {
                    row: item,
                    remaining: rest,
                    quantities,
                });
            }
        }

        stats.elapsed = self.clock.now().saturating_sub(started);

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, time::Duration};

    use rand::{SeedableRng, rngs::StdRng};
    use testresult::TestResult;

    use super::*;

    /// Clock that advances by a fixed step every time it is read.
    struct SteppingClock {
        now: Cell<Duration>,
        step: Duration,
    }

    impl SteppingClock {
        fn new(step: Duration) -> Self {
            Self {
                now: Cell::new(Duration::ZERO),
                step,
            }
        }
    }

    impl Clock for SteppingClock {
        fn now(&self) -> Duration {
            let now = self.now.get();
            self.now.set(now + self.step);
            now
        }
    }

    fn collect(
        target: usize,
        prices: &[usize],
        budget: TimeBudget,
        clock: &impl Clock,
    ) -> TestResult<(Vec<Vec<usize>>, SearchStats)> {
        let table = ReachabilityTable::build(target, prices)?;
        let mut rng = StdRng::seed_from_u64(7);
        let cancel = CancellationToken::new();
        let mut found = Vec::new();

        let stats = Enumerator::new(&table, prices, budget, &mut rng, clock, &cancel)
            .run(|quantities| found.push(quantities.to_vec()))?;

        Ok((found, stats))
    }

    #[test]
    fn finds_every_combination() -> TestResult {
        let clock = SteppingClock::new(Duration::ZERO);
        let (mut found, stats) = collect(4, &[1, 2], TimeBudget::unlimited(), &clock)?;

        found.sort();

        assert_eq!(found, [vec![0, 2], vec![2, 1], vec![4, 0]]);
        assert_eq!(stats.solutions, 3);
        assert!(stats.is_exhaustive());

        Ok(())
    }

    #[test]
    fn largest_counts_of_the_priciest_item_come_first() -> TestResult {
        let clock = SteppingClock::new(Duration::ZERO);
        let (found, _) = collect(4, &[1, 2], TimeBudget::unlimited(), &clock)?;

        assert_eq!(found.first(), Some(&vec![0, 2]));

        Ok(())
    }

    #[test]
    fn quantities_reproduce_the_target() -> TestResult {
        let prices = [3, 5, 7];
        let clock = SteppingClock::new(Duration::ZERO);
        let (found, _) = collect(30, &prices, TimeBudget::unlimited(), &clock)?;

        assert!(!found.is_empty());

        for quantities in found {
            let total: usize = quantities.iter().zip(prices).map(|(q, p)| q * p).sum();

            assert_eq!(total, 30, "{quantities:?} does not sum to the target");
        }

        Ok(())
    }

    #[test]
    fn expired_budget_stops_with_partial_results() -> TestResult {
        // Every read moves the clock past the deadline.
        let clock = SteppingClock::new(Duration::from_secs(11));
        let budget = TimeBudget::new(Duration::from_secs(5), Duration::from_secs(10), 0.2);

        let (found, stats) = collect(4, &[1, 2], budget, &clock)?;

        assert!(found.is_empty());
        assert!(stats.expired);
        assert!(!stats.is_exhaustive());

        Ok(())
    }

    #[test]
    fn thinning_skips_frames() -> TestResult {
        // First check lands between thresholds; with a rate of 1 every frame is skipped.
        let clock = SteppingClock::new(Duration::from_secs(6));
        let budget = TimeBudget::new(Duration::from_secs(5), Duration::from_secs(100), 1.0);

        let (found, stats) = collect(4, &[1, 2], budget, &clock)?;

        assert!(found.is_empty());
        assert_eq!(stats.thinned, 1);
        assert_eq!(stats.expanded, 0);
        assert!(!stats.expired);
        assert!(!stats.is_exhaustive());

        Ok(())
    }

    #[test]
    fn zero_thinning_rate_still_expands_everything() -> TestResult {
        let clock = SteppingClock::new(Duration::from_secs(6));
        let budget = TimeBudget::new(Duration::from_secs(5), Duration::MAX, 0.0);

        let (found, stats) = collect(4, &[1, 2], budget, &clock)?;

        assert_eq!(found.len(), 3);
        assert_eq!(stats.thinned, 0);

        Ok(())
    }

    #[test]
    fn cancellation_stops_the_search() -> TestResult {
        let table = ReachabilityTable::build(4, &[1, 2])?;
        let mut rng = StdRng::seed_from_u64(7);
        let clock = SteppingClock::new(Duration::ZERO);
        let cancel = CancellationToken::new();

        cancel.cancel();

        let result = Enumerator::new(
            &table,
            &[1, 2],
            TimeBudget::unlimited(),
            &mut rng,
            &clock,
            &cancel,
        )
        .run(|_| {});

        assert!(matches!(result, Err(SolverError::Cancelled)));

        Ok(())
    }

    #[test]
    fn mismatched_prices_are_an_invariant_violation() -> TestResult {
        let table = ReachabilityTable::build(4, &[1, 2])?;
        let mut rng = StdRng::seed_from_u64(7);
        let clock = SteppingClock::new(Duration::ZERO);
        let cancel = CancellationToken::new();

        let result = Enumerator::new(
            &table,
            &[1],
            TimeBudget::unlimited(),
            &mut rng,
            &clock,
            &cancel,
        )
        .run(|_| {});

        assert!(matches!(
            result,
            Err(SolverError::InvariantViolation { .. })
        ));

        Ok(())
    }
}
