pub mod config;
pub mod error;
pub mod image_model;
pub mod job;
pub mod llm;
pub mod orchestrator;
pub mod service;
pub mod subject;

#[cfg(test)]
mod testing;

pub use error::{GenerationError, Result};
pub use orchestrator::{GenerationRequest, Orchestrator};
