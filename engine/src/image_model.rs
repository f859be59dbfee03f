use std::{pin::Pin, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{config::SubmitMode, error::Result};

pub mod replicate;

pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;
pub type PredictionApiRef = Arc<dyn PredictionApi + Send + Sync>;

/// The two calls the image provider offers. Each call is exactly one request.
pub trait PredictionApi {
    fn create<'a>(
        &'a self,
        request: &'a CreatePrediction,
        mode: SubmitMode,
    ) -> ApiFuture<'a, Prediction>;

    fn get<'a>(&'a self, id: &'a str) -> ApiFuture<'a, Prediction>;
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatePrediction {
    pub version: String,
    pub input: PredictionInput,
}

/// Generation parameters. Only the prompt is chosen by the user.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionInput {
    pub model: &'static str,
    pub prompt: String,
    pub lora_scale: f64,
    pub num_outputs: u32,
    pub aspect_ratio: &'static str,
    pub output_format: &'static str,
    pub guidance_scale: f64,
    pub output_quality: u32,
    pub prompt_strength: f64,
    pub extra_lora_scale: f64,
    pub num_inference_steps: u32,
}

impl PredictionInput {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            model: "dev",
            prompt: prompt.into(),
            lora_scale: 1.0,
            num_outputs: 1,
            aspect_ratio: "16:9",
            output_format: "png",
            guidance_scale: 3.5,
            output_quality: 40,
            prompt_strength: 0.8,
            extra_lora_scale: 1.0,
            num_inference_steps: 28,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Prediction {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub output: Option<PredictionOutput>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

/// Some models answer with a list of files, others with a single one.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PredictionOutput {
    Many(Vec<String>),
    One(String),
}

impl PredictionOutput {
    pub fn into_urls(self) -> Vec<String> {
        match self {
            PredictionOutput::Many(urls) => urls,
            PredictionOutput::One(url) => vec![url],
        }
    }
}

impl Prediction {
    pub fn error_message(&self) -> String {
        match &self.error {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Null) | None => format!("prediction {}", self.status),
            Some(other) => other.to_string(),
        }
    }
}
