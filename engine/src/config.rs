use std::{collections::BTreeMap, time::Duration};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::subject::{ModelRef, Subject};

pub const REPLICATE_BASE_URL: &str = "https://api.replicate.com/v1";
pub const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const OPENAI_MODEL: &str = "gpt-4";

/// Everything the engine needs, handed in explicitly by the front end.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub replicate: ReplicateConfig,
    pub openai: OpenAIConfig,
    pub polling: PollConfig,
    pub submit_mode: SubmitMode,
    /// Replaces the built-in model of a subject.
    pub models: BTreeMap<Subject, ModelRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplicateConfig {
    pub api_key: Option<String>,
    pub base_url: String,
}

impl Default for ReplicateConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: REPLICATE_BASE_URL.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAIConfig {
    pub api_key: Option<String>,
    pub url: String,
    pub model: String,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            url: OPENAI_CHAT_URL.into(),
            model: OPENAI_MODEL.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    pub max_attempts: u32,
    pub interval_ms: u64,
}

impl PollConfig {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 30;
    pub const DEFAULT_INTERVAL_MS: u64 = 10_000;

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            interval_ms: Self::DEFAULT_INTERVAL_MS,
        }
    }
}

/// How a prediction is created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmitMode {
    /// Return as soon as the prediction is queued.
    #[default]
    Async,
    /// Ask the provider to hold the response for up to `seconds` so fast
    /// predictions come back already finished.
    Wait { seconds: u32 },
}

impl SubmitMode {
    /// Replicate holds a create request for at most this long.
    pub const MAX_WAIT_SECONDS: u32 = 60;

    /// `Prefer` header value, with the wait clamped to `1..=MAX_WAIT_SECONDS`.
    pub fn prefer_header(&self) -> Option<String> {
        match *self {
            SubmitMode::Async => None,
            SubmitMode::Wait { seconds } => {
                let clamped = seconds.clamp(1, Self::MAX_WAIT_SECONDS);
                if clamped != seconds {
                    warn!("Submit wait of {seconds}s is out of range, using {clamped}s");
                }
                Some(format!("wait={clamped}"))
            }
        }
    }
}
