use std::sync::Arc;

use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    config::EngineConfig,
    error::{GenerationError, Result},
    image_model::replicate::ReplicateApi,
    job::{JobPoller, JobStatus, JobSubmitter, StatusReporter, Submission, TokioClock},
    llm::{OpenAIChat, PromptBrief, PromptGeneratorRef},
    subject::ModelCatalog,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub subject_id: String,
    pub prompt_text: String,
}

impl GenerationRequest {
    pub fn new(subject_id: impl Into<String>, prompt_text: impl Into<String>) -> Self {
        Self {
            subject_id: subject_id.into(),
            prompt_text: prompt_text.into(),
        }
    }
}

/// Runs prompt generation, submission and polling in order. Any failure ends
/// the run; retrying means calling again.
pub struct Orchestrator {
    submitter: JobSubmitter,
    poller: JobPoller,
    prompts: Option<PromptGeneratorRef>,
}

impl Orchestrator {
    pub fn new(
        submitter: JobSubmitter,
        poller: JobPoller,
        prompts: Option<PromptGeneratorRef>,
    ) -> Self {
        Self {
            submitter,
            poller,
            prompts,
        }
    }

    /// Wires the real providers. Prompt generation is only available when an
    /// OpenAI key is configured.
    pub fn from_config(cfg: &EngineConfig) -> Result<Self> {
        let api = Arc::new(ReplicateApi::from_config(&cfg.replicate)?);
        let prompts: Option<PromptGeneratorRef> = match OpenAIChat::from_config(&cfg.openai) {
            Ok(chat) => Some(Arc::new(chat)),
            Err(GenerationError::MissingApiKey(_)) => None,
            Err(e) => return Err(e),
        };

        Ok(Self::new(
            JobSubmitter::new(
                api.clone(),
                ModelCatalog::with_overrides(&cfg.models),
                cfg.submit_mode,
            ),
            JobPoller::new(api, Arc::new(TokioClock), cfg.polling),
            prompts,
        ))
    }

    pub fn submitter(&self) -> &JobSubmitter {
        &self.submitter
    }

    pub fn poller(&self) -> &JobPoller {
        &self.poller
    }

    pub async fn generate_prompt(&self, brief: &PromptBrief) -> Result<String> {
        brief.validate()?;
        let generator = self
            .prompts
            .as_ref()
            .ok_or(GenerationError::MissingApiKey("OpenAI"))?;

        let prompt = generator.generate(brief).await?;
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(GenerationError::PromptGenerationFailed(
                "model returned an empty prompt".into(),
            ));
        }
        Ok(prompt.to_string())
    }

    pub async fn generate_thumbnail(
        &self,
        request: &GenerationRequest,
        reporter: &mut (dyn StatusReporter + Send),
    ) -> Result<String> {
        let submission = self
            .submitter
            .submit(&request.subject_id, &request.prompt_text)
            .await?;

        let urls = match submission {
            Submission::Immediate(urls) => urls,
            Submission::Pending(handle) => {
                match self.poller.poll_until_done(&handle, reporter).await? {
                    JobStatus::Succeeded(urls) => urls,
                    JobStatus::Failed(reason) => return Err(GenerationError::JobFailed(reason)),
                    other => {
                        return Err(GenerationError::JobFailed(format!(
                            "polling stopped while the job was {}",
                            other.label()
                        )));
                    }
                }
            }
        };

        let url = urls
            .into_iter()
            .next()
            .ok_or(GenerationError::EmptyArtifactList)?;
        info!("Thumbnail ready: {url}");
        Ok(url)
    }

    /// Like [`Self::generate_thumbnail`], with the prompt written by the
    /// prompt generator first.
    pub async fn generate_from_brief(
        &self,
        subject_id: &str,
        brief: &PromptBrief,
        reporter: &mut (dyn StatusReporter + Send),
    ) -> Result<String> {
        self.submitter.catalog().resolve(subject_id)?;
        let prompt_text = self.generate_prompt(brief).await?;
        info!("Prompt: {prompt_text}");
        self.generate_thumbnail(&GenerationRequest::new(subject_id, prompt_text), reporter)
            .await
    }
}
