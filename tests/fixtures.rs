//! Solves the bundled YAML fixtures

use std::path::PathBuf;

use testresult::TestResult;

use tally::{
    config::SearchConfig,
    fixtures::{Fixture, FixtureError},
    pricing::PricingError,
    solvers::{Solver, SolverError, exact::ExactSumSolver},
};

fn fixtures() -> Fixture {
    Fixture::with_base_path(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures"))
}

#[test]
fn cafe_fixture_solves_exhaustively() -> TestResult {
    let problem = fixtures().load("cafe")?;
    let result = ExactSumSolver::seeded(SearchConfig::default(), 1).solve(&problem)?;

    assert_eq!(result.subtotal_target.to_minor_units(), 5000);
    assert_eq!(result.solution_count(), 474);
    assert_eq!(result.solutions.len(), 25);

    Ok(())
}

#[test]
fn pair_fixture_has_one_solution() -> TestResult {
    let problem = fixtures().load("pair")?;
    let result = ExactSumSolver::seeded(SearchConfig::default(), 1).solve(&problem)?;

    assert_eq!(result.solution_count(), 1);

    Ok(())
}

#[test]
fn infeasible_fixture_is_rejected() -> TestResult {
    let problem = fixtures().load("infeasible")?;
    let outcome = ExactSumSolver::seeded(SearchConfig::default(), 1).solve(&problem);

    assert!(matches!(
        outcome,
        Err(SolverError::Pricing(PricingError::InfeasibleTarget { .. }))
    ));

    Ok(())
}

#[test]
fn unknown_fixture_is_an_io_error() {
    assert!(matches!(
        fixtures().load("no-such-fixture"),
        Err(FixtureError::Io(_))
    ));
}
