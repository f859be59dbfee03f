use std::fmt;

use serde::{Deserialize, Serialize};

use crate::image_model::Prediction;

pub mod clock;
pub mod poller;
pub mod reporter;
pub mod submitter;

pub use clock::{Clock, ClockRef, TokioClock};
pub use poller::{JobPoller, PollOutcome, PollSession, PollStep};
pub use reporter::{LogProgress, NoProgress, StatusReporter};
pub use submitter::JobSubmitter;

/// Provider assigned id of a running prediction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobHandle {
    id: String,
}

impl JobHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Running,
    Succeeded(Vec<String>),
    Failed(String),
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Succeeded(_) | JobStatus::Failed(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            JobStatus::Pending => "starting",
            JobStatus::Running => "processing",
            JobStatus::Succeeded(_) => "succeeded",
            JobStatus::Failed(_) => "failed",
        }
    }
}

/// `failed` and `canceled` end the job; polling stops on them just like on
/// `succeeded`.
impl From<Prediction> for JobStatus {
    fn from(prediction: Prediction) -> Self {
        match prediction.status.as_str() {
            "succeeded" => JobStatus::Succeeded(
                prediction
                    .output
                    .map(|o| o.into_urls())
                    .unwrap_or_default(),
            ),
            "failed" | "canceled" => JobStatus::Failed(prediction.error_message()),
            "starting" => JobStatus::Pending,
            // anything we don't know keeps the job alive
            _ => JobStatus::Running,
        }
    }
}

/// Outcome of creating a prediction: either a job to poll, or the finished
/// artifacts when the provider completed it within the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Pending(JobHandle),
    Immediate(Vec<String>),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prediction(json: &str) -> Prediction {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn status_mapping() {
        assert_eq!(
            JobStatus::from(prediction(r#"{"id":"a","status":"starting"}"#)),
            JobStatus::Pending
        );
        assert_eq!(
            JobStatus::from(prediction(r#"{"id":"a","status":"processing"}"#)),
            JobStatus::Running
        );
        assert_eq!(
            JobStatus::from(prediction(r#"{"id":"a","status":"queued_somewhere_new"}"#)),
            JobStatus::Running
        );
        assert_eq!(
            JobStatus::from(prediction(
                r#"{"id":"a","status":"succeeded","output":["https://cdn/x.png"]}"#
            )),
            JobStatus::Succeeded(vec!["https://cdn/x.png".into()])
        );
        assert_eq!(
            JobStatus::from(prediction(r#"{"id":"a","status":"succeeded","output":null}"#)),
            JobStatus::Succeeded(vec![])
        );
        assert_eq!(
            JobStatus::from(prediction(r#"{"id":"a","status":"canceled"}"#)),
            JobStatus::Failed("prediction canceled".into())
        );
        assert_eq!(
            JobStatus::from(prediction(r#"{"id":"a","status":"failed","error":"boom"}"#)),
            JobStatus::Failed("boom".into())
        );
    }

    #[test]
    fn terminal_states() {
        assert!(!JobStatus::Pending.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
        assert!(JobStatus::Succeeded(vec![]).is_terminal());
        assert!(JobStatus::Failed("x".into()).is_terminal());
    }
}
