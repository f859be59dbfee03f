use log::info;

/// Receives the number of attempts left after every status query, before the
/// poller starts waiting for the next one.
pub trait StatusReporter {
    fn on_progress(&mut self, attempts_remaining: u32);
}

impl<F: FnMut(u32)> StatusReporter for F {
    fn on_progress(&mut self, attempts_remaining: u32) {
        self(attempts_remaining)
    }
}

#[derive(Debug, Default)]
pub struct NoProgress;

impl StatusReporter for NoProgress {
    fn on_progress(&mut self, _: u32) {}
}

/// Writes progress to the log.
#[derive(Debug)]
pub struct LogProgress {
    job: String,
}

impl LogProgress {
    pub fn new(job: impl Into<String>) -> Self {
        Self { job: job.into() }
    }
}

impl StatusReporter for LogProgress {
    fn on_progress(&mut self, attempts_remaining: u32) {
        info!("{}: {attempts_remaining} attempts left", self.job);
    }
}
