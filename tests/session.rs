//! Background solves through a session

use std::time::Duration;

use serde_json::json;
use testresult::TestResult;

use tally::{
    config::SearchConfig,
    session::Session,
    wire::{SolveRequest, SolveResponse},
};

const WAIT: Duration = Duration::from_secs(60);

fn request(value: serde_json::Value) -> TestResult<SolveRequest> {
    Ok(serde_json::from_value(value)?)
}

#[test]
fn latest_submission_wins() -> TestResult {
    let mut session = Session::new(SearchConfig::default()).with_seed(8);

    let busy = request(json!({
        "target": 45.00,
        "tax": 0,
        "items": [
            { "name": "a", "unitPrice": 0.01, "category": "x" },
            { "name": "b", "unitPrice": 0.02, "category": "y" },
            { "name": "c", "unitPrice": 0.03, "category": "z" },
            { "name": "d", "unitPrice": 0.04, "category": "x" },
            { "name": "e", "unitPrice": 0.05, "category": "y" }
        ]
    }))?;

    let quick = request(json!({
        "target": 1.83,
        "tax": 0,
        "items": [
            { "name": "A", "unitPrice": 0.78, "category": "x" },
            { "name": "B", "unitPrice": 1.05, "category": "y" }
        ]
    }))?;

    session.submit(busy)?;
    session.submit(quick)?;

    let SolveResponse::Success(success) = session.recv_timeout(WAIT)? else {
        return Err("expected a success response".into());
    };

    assert_eq!(success.solution_count, 1);
    assert!(success.exhaustive);

    Ok(())
}

#[test]
fn errors_come_back_as_failure_responses() -> TestResult {
    let mut session = Session::new(SearchConfig::default());

    session.submit(request(json!({
        "target": 1.01,
        "tax": 100,
        "items": [{ "name": "Penny", "unitPrice": 0.01, "category": "change" }]
    }))?)?;

    let response = session.recv_timeout(WAIT)?;

    assert!(response.is_error());

    Ok(())
}
