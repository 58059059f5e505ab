//! Cross-checks the enumerator against a brute-force count of exact multisets

use rand::{Rng, SeedableRng, rngs::StdRng};
use rusty_money::{Money, iso::USD};
use testresult::TestResult;

use tally::{
    config::SearchConfig,
    items::Item,
    pricing::TaxRate,
    solvers::{Problem, Solver, exact::ExactSumSolver},
    table::ReachabilityTable,
};

/// Number of ways to make `target` from `prices`, each used any number of times.
fn brute_force(prices: &[u64], target: u64) -> u64 {
    let Some((&price, rest)) = prices.split_first() else {
        return u64::from(target == 0);
    };

    (0..=target / price)
        .map(|count| brute_force(rest, target - count * price))
        .sum()
}

fn problem(prices: &[u64], target: u64) -> TestResult<Problem<'static>> {
    let items = prices
        .iter()
        .enumerate()
        .map(|(idx, &price)| {
            Ok(Item::new(
                format!("item-{idx}"),
                Money::from_minor(i64::try_from(price)?, USD),
                format!("category-{}", idx % 2),
            ))
        })
        .collect::<TestResult<Vec<_>>>()?;

    Ok(Problem::new(
        Money::from_minor(i64::try_from(target)?, USD),
        TaxRate::ZERO,
        items,
    ))
}

fn assert_counts_match(prices: &[u64], target: u64) -> TestResult {
    let expected = brute_force(prices, target);
    let result = ExactSumSolver::seeded(SearchConfig::default(), 5).solve(&problem(prices, target)?)?;

    assert!(result.stats.is_exhaustive(), "search for {prices:?} -> {target} was cut short");
    assert_eq!(
        result.solution_count(),
        expected,
        "solution count for {prices:?} -> {target}"
    );
    assert_eq!(
        result.solutions.len(),
        usize::try_from(expected)?.min(25),
        "kept solutions for {prices:?} -> {target}"
    );

    Ok(())
}

#[test]
fn small_catalogs_match_brute_force() -> TestResult {
    assert_counts_match(&[78, 105], 183)?;
    assert_counts_match(&[1, 2], 4)?;
    assert_counts_match(&[5, 10, 25], 100)?;
    assert_counts_match(&[3, 7, 11, 13], 250)?;
    assert_counts_match(&[25, 40, 65, 80, 95], 500)?;
    assert_counts_match(&[7, 9], 20)?;

    Ok(())
}

#[test]
fn random_catalogs_match_brute_force() -> TestResult {
    let mut rng = StdRng::seed_from_u64(2024);

    for _ in 0..20 {
        let len = rng.gen_range(1..=5);
        let mut prices: Vec<u64> = (0..len).map(|_| rng.gen_range(5..=120)).collect();

        prices.sort_unstable();
        prices.dedup();

        let target = rng.gen_range(1..=500);

        assert_counts_match(&prices, target)?;
    }

    Ok(())
}

#[test]
fn table_base_row_invariant_holds() -> TestResult {
    let table = ReachabilityTable::build(50, &[3, 8, 13])?;

    assert!(table.is_reachable(0, 0));
    assert!((1..=50).all(|subtotal| !table.is_reachable(0, subtotal)));

    Ok(())
}

#[test]
fn unsolvable_table_means_no_solutions() -> TestResult {
    let table = ReachabilityTable::build(11, &[4, 6])?;

    assert!(!table.is_solvable());

    let result = ExactSumSolver::seeded(SearchConfig::default(), 5).solve(&problem(&[4, 6], 11)?)?;

    assert_eq!(result.solution_count(), 0);
    assert!(result.solutions.is_empty());

    Ok(())
}
