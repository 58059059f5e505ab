//! Tally CLI
//!
//! Finds combinations of items whose tax-inclusive total hits a target exactly, then prints the
//! best-balanced receipts.
//!
//! Use `-f` to load a fixture by name, or `-r` to read a JSON request (`-` for stdin).
//! Use `--json` to print the JSON response instead of receipts.

use std::{
    fs,
    io::{self, Write},
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use humanize_duration::{Truncate, prelude::DurationExt};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Registry,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use tally::{
    config::{LogFormat, LoggingConfig, SearchArgs, SearchConfig},
    fixtures::Fixture,
    solvers::{Problem, Solver, SolverResult, exact::ExactSumSolver},
    wire::{SolveRequest, SolveResponse},
};

/// Find item combinations whose tax-inclusive total hits an exact target
#[derive(Debug, Parser)]
#[command(name = "tally", version, about)]
#[command(group(ArgGroup::new("input").required(true).args(["fixture", "request"])))]
struct Cli {
    /// Fixture to load from the fixtures directory
    #[arg(short, long)]
    fixture: Option<String>,

    /// Directory fixtures are loaded from
    #[arg(long, default_value = "./fixtures")]
    fixtures_dir: PathBuf,

    /// JSON request file, or `-` for stdin
    #[arg(short, long)]
    request: Option<PathBuf>,

    /// YAML search config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the JSON response instead of receipts
    #[arg(long)]
    json: bool,

    /// Number of receipts to print, best first
    #[arg(short, long, default_value_t = 1)]
    show: usize,

    /// Seed for the random source used while thinning
    #[arg(long)]
    seed: Option<u64>,

    #[command(flatten)]
    search: SearchArgs,

    #[command(flatten)]
    logging: LoggingConfig,
}

/// Tally entry point
pub fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.logging)?;

    let config = match &cli.config {
        Some(path) => SearchConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SearchConfig::default(),
    };

    let config = cli.search.apply(config).validate()?;
    let problem = load_problem(&cli)?;

    let mut solver = match cli.seed {
        Some(seed) => ExactSumSolver::seeded(config, seed),
        None => ExactSumSolver::new(config),
    };

    let start = Instant::now();
    let outcome = solver.solve(&problem);
    let elapsed = start.elapsed();

    info!(elapsed_ms = elapsed.as_millis(), "solve finished");

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if cli.json {
        serde_json::to_writer_pretty(&mut out, &SolveResponse::from_outcome(&outcome))?;
        writeln!(out)?;

        return Ok(());
    }

    write_results(&mut out, &outcome?, cli.show, elapsed)
}

fn init_logging(logging: &LoggingConfig) -> Result<()> {
    match logging.log_format {
        LogFormat::Compact => init_with_layer(
            logging,
            tracing_subscriber::fmt::layer()
                .compact()
                .with_target(true)
                .with_writer(io::stderr),
        ),
        LogFormat::Json => init_with_layer(
            logging,
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_target(true)
                .with_writer(io::stderr),
        ),
    }
}

fn init_with_layer<L>(logging: &LoggingConfig, fmt_layer: L) -> Result<()>
where
    L: Layer<Registry> + Send + Sync + 'static,
{
    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&logging.log_level)),
        )
        .try_init()?;

    Ok(())
}

fn load_problem(cli: &Cli) -> Result<Problem<'static>> {
    if let Some(name) = cli.fixture.as_deref() {
        return Fixture::with_base_path(&cli.fixtures_dir)
            .load(name)
            .with_context(|| format!("loading fixture {name}"));
    }

    let Some(path) = cli.request.as_deref() else {
        anyhow::bail!("either --fixture or --request is required");
    };

    let contents = if path.as_os_str() == "-" {
        io::read_to_string(io::stdin()).context("reading request from stdin")?
    } else {
        fs::read_to_string(path).with_context(|| format!("reading request {}", path.display()))?
    };

    let request: SolveRequest = serde_json::from_str(&contents).context("parsing request")?;

    Ok(request.to_problem()?)
}

fn write_results(
    out: &mut impl Write,
    result: &SolverResult<'_>,
    show: usize,
    elapsed: Duration,
) -> Result<()> {
    let kept = result.solutions.len();

    for (rank, scored) in result.solutions.iter().take(show).enumerate() {
        writeln!(
            out,
            "\nSolution {} of {kept} (score {:.3})",
            rank + 1,
            scored.score
        )?;

        scored.receipt.write_to(&mut *out)?;
    }

    let count = result.solution_count();

    if result.stats.is_exhaustive() {
        writeln!(out, "\nSolutions: {count}")?;
    } else {
        writeln!(
            out,
            "\nSolutions: at least {count} (search stopped early, {} frames skipped)",
            result.stats.thinned
        )?;
    }

    writeln!(out, "Subtotal target: {}", result.subtotal_target)?;
    writeln!(out, "Solved in: {}", elapsed.human(Truncate::Nano))?;

    Ok(())
}
