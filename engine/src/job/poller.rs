use std::time::Duration;

use log::{debug, info, warn};

use crate::{
    config::PollConfig,
    error::{GenerationError, Result},
    image_model::PredictionApiRef,
};

use super::{ClockRef, JobHandle, JobStatus, StatusReporter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Terminal(JobStatus),
    Exhausted,
}

/// What the driver of a [`PollSession`] has to do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStep {
    Query,
    Wait(Duration),
    Done(PollOutcome),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PollState {
    Ready,
    Waiting,
    Finished(PollOutcome),
}

/// Attempt bookkeeping for a single job. Performs no I/O itself: the driver
/// asks for the next step, executes it and feeds query results back in.
#[derive(Debug)]
pub struct PollSession {
    handle: JobHandle,
    attempts_made: u32,
    max_attempts: u32,
    interval: Duration,
    state: PollState,
}

impl PollSession {
    pub fn new(handle: JobHandle, config: &PollConfig) -> Self {
        let state = if config.max_attempts == 0 {
            PollState::Finished(PollOutcome::Exhausted)
        } else {
            PollState::Ready
        };
        Self {
            handle,
            attempts_made: 0,
            max_attempts: config.max_attempts,
            interval: config.interval(),
            state,
        }
    }

    pub fn handle(&self) -> &JobHandle {
        &self.handle
    }

    pub fn attempts_made(&self) -> u32 {
        self.attempts_made
    }

    pub fn attempts_remaining(&self) -> u32 {
        self.max_attempts - self.attempts_made
    }

    pub fn next_step(&mut self) -> PollStep {
        match &self.state {
            PollState::Ready => PollStep::Query,
            PollState::Waiting => {
                self.state = PollState::Ready;
                PollStep::Wait(self.interval)
            }
            PollState::Finished(outcome) => PollStep::Done(outcome.clone()),
        }
    }

    /// Records the result of one status query and returns the attempts left.
    /// A failed query still uses up its attempt. Once finished, the session
    /// ignores further results.
    pub fn record(&mut self, result: Result<JobStatus>) -> u32 {
        if matches!(self.state, PollState::Finished(_)) {
            return self.attempts_remaining();
        }

        self.attempts_made += 1;
        self.state = match result {
            Ok(status) if status.is_terminal() => {
                PollState::Finished(PollOutcome::Terminal(status))
            }
            _ if self.attempts_made >= self.max_attempts => {
                PollState::Finished(PollOutcome::Exhausted)
            }
            _ => PollState::Waiting,
        };
        self.attempts_remaining()
    }
}

pub struct JobPoller {
    api: PredictionApiRef,
    clock: ClockRef,
    config: PollConfig,
}

impl JobPoller {
    pub fn new(api: PredictionApiRef, clock: ClockRef, config: PollConfig) -> Self {
        Self { api, clock, config }
    }

    /// One status query, errors included.
    pub async fn status(&self, handle: &JobHandle) -> Result<JobStatus> {
        let prediction = self.api.get(handle.id()).await?;
        Ok(JobStatus::from(prediction))
    }

    /// Queries until the job reaches a terminal status or the attempt budget
    /// runs out. Returns `Timeout` in the latter case.
    pub async fn poll_until_done(
        &self,
        handle: &JobHandle,
        reporter: &mut (dyn StatusReporter + Send),
    ) -> Result<JobStatus> {
        let mut session = PollSession::new(handle.clone(), &self.config);
        info!(
            "Polling {handle} (at most {} attempts, every {:?})",
            self.config.max_attempts,
            self.config.interval()
        );

        loop {
            match session.next_step() {
                PollStep::Query => {
                    let result = self.status(session.handle()).await;
                    match &result {
                        Ok(status) => debug!(
                            "{handle} attempt {}: {}",
                            session.attempts_made() + 1,
                            status.label()
                        ),
                        Err(e) => warn!(
                            "{handle} attempt {} failed: {e}",
                            session.attempts_made() + 1
                        ),
                    }
                    let remaining = session.record(result);
                    reporter.on_progress(remaining);
                }
                PollStep::Wait(interval) => self.clock.sleep(interval).await,
                PollStep::Done(PollOutcome::Terminal(status)) => {
                    info!(
                        "{handle} is {} after {} attempts",
                        status.label(),
                        session.attempts_made()
                    );
                    return Ok(status);
                }
                PollStep::Done(PollOutcome::Exhausted) => {
                    warn!("{handle} gave up after {} attempts", session.attempts_made());
                    return Err(GenerationError::Timeout {
                        attempts: session.attempts_made(),
                    });
                }
            }
        }
    }
}
