//! Session
//!
//! Runs one solve at a time off the caller's thread. Submitting a new request supersedes the one
//! in flight: its token is cancelled and any reply it still sends is discarded.

use std::{
    io,
    sync::mpsc::{self, Receiver, RecvTimeoutError},
    thread,
    time::Duration,
};

use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::{
    config::SearchConfig,
    solvers::exact::{ExactSumSolver, budget::CancellationToken},
    wire::{SolveRequest, SolveResponse, respond},
};

/// Errors raised while waiting on a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Nothing has been submitted since the last reply or cancellation.
    #[error("no solve is pending")]
    Idle,

    /// The pending solve did not reply in time.
    #[error("timed out waiting for a reply")]
    Timeout,

    /// The worker thread ended without replying.
    #[error("solve ended without a reply")]
    Disconnected,

    /// The worker thread could not be started.
    #[error("failed to start solve: {0}")]
    Spawn(#[from] io::Error),
}

/// Owner of at most one in-flight solve.
///
/// Every submission gets its own reply channel. Superseding a solve drops the old receiver, so
/// only the latest solve can ever be received, and a worker that dies disconnects its channel.
#[derive(Debug)]
pub struct Session {
    config: SearchConfig,
    seed: Option<u64>,
    generation: u64,
    cancel: CancellationToken,
    reply: Option<Receiver<SolveResponse>>,
}

impl Session {
    /// Create an idle session that solves with `config`.
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            seed: None,
            generation: 0,
            cancel: CancellationToken::new(),
            reply: None,
        }
    }

    /// Seed every solve's random source, making thinning reproducible.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Generation of the most recent submission, `0` before the first.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a reply is still expected.
    pub fn is_pending(&self) -> bool {
        self.reply.is_some()
    }

    /// Start solving `request`, superseding any solve in flight. Returns its generation.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Spawn`] if the worker thread cannot be started.
    pub fn submit(&mut self, request: SolveRequest) -> Result<u64, SessionError> {
        self.cancel();

        let generation = self.generation;
        let cancel = CancellationToken::new();

        let solver = match self.seed {
            Some(seed) => ExactSumSolver::seeded(self.config.clone(), seed),
            None => ExactSumSolver::new(self.config.clone()),
        };

        let mut solver = solver.with_cancellation(cancel.clone());

        self.reply = Some(spawn_worker(generation, move || {
            respond(&request, &mut solver)
        })?);
        self.cancel = cancel;

        debug!(generation, "submitted solve");

        Ok(generation)
    }

    /// Cancel the solve in flight, if any. Its reply will be discarded.
    pub fn cancel(&mut self) {
        if self.reply.take().is_some() {
            debug!(generation = self.generation, "cancelling solve");
        }

        self.cancel.cancel();
        self.generation = self.generation.saturating_add(1);
    }

    /// Block until the current solve replies.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Idle`] if no reply is expected, or
    /// [`SessionError::Disconnected`] if the worker ended without replying.
    pub fn recv(&mut self) -> Result<SolveResponse, SessionError> {
        let reply = self.reply.take().ok_or(SessionError::Idle)?;

        reply.recv().map_err(|error| {
            warn!(generation = self.generation, %error, "solve ended without a reply");
            SessionError::Disconnected
        })
    }

    /// Wait up to `timeout` for the current solve to reply.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Idle`] if no reply is expected, [`SessionError::Timeout`] if
    /// none arrived in time, or [`SessionError::Disconnected`] if the worker ended without
    /// replying. A timed-out solve keeps running and can still be received.
    pub fn recv_timeout(&mut self, timeout: Duration) -> Result<SolveResponse, SessionError> {
        let reply = self.reply.as_ref().ok_or(SessionError::Idle)?;

        match reply.recv_timeout(timeout) {
            Ok(response) => {
                self.reply = None;
                Ok(response)
            }
            Err(RecvTimeoutError::Timeout) => Err(SessionError::Timeout),
            Err(RecvTimeoutError::Disconnected) => {
                warn!(generation = self.generation, "solve ended without a reply");
                self.reply = None;
                Err(SessionError::Disconnected)
            }
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Run `job` on a named thread that holds the only sender of the returned channel.
fn spawn_worker(
    generation: u64,
    job: impl FnOnce() -> SolveResponse + Send + 'static,
) -> Result<Receiver<SolveResponse>, SessionError> {
    let (sender, receiver) = mpsc::channel();

    thread::Builder::new()
        .name(format!("tally-solve-{generation}"))
        .spawn(move || {
            if sender.send(job()).is_err() {
                trace!(generation, "reply dropped, solve was superseded");
            }
        })?;

    Ok(receiver)
}
