use log::{debug, info};

use crate::{
    config::SubmitMode,
    error::{GenerationError, Result},
    image_model::{CreatePrediction, PredictionApiRef, PredictionInput},
    subject::ModelCatalog,
};

use super::{JobHandle, JobStatus, Submission};

pub struct JobSubmitter {
    api: PredictionApiRef,
    catalog: ModelCatalog,
    mode: SubmitMode,
}

impl JobSubmitter {
    pub fn new(api: PredictionApiRef, catalog: ModelCatalog, mode: SubmitMode) -> Self {
        Self { api, catalog, mode }
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    /// Validates the input and creates one prediction. Nothing is sent when
    /// validation fails, and a failed request is never retried here.
    pub async fn submit(&self, subject_id: &str, prompt_text: &str) -> Result<Submission> {
        let (subject, model) = self.catalog.resolve(subject_id)?;
        let prompt = prompt_text.trim();
        if prompt.is_empty() {
            return Err(GenerationError::InvalidInput(
                "Prompt must not be empty".into(),
            ));
        }

        let request = CreatePrediction {
            version: model.version.clone(),
            input: PredictionInput::new(prompt),
        };
        info!("Creating prediction for {subject} with {model}");
        debug!("Prompt: {prompt}");

        let prediction = self.api.create(&request, self.mode).await?;
        let handle = JobHandle::new(prediction.id.clone());

        match JobStatus::from(prediction) {
            JobStatus::Succeeded(urls) => {
                info!("Prediction {handle} finished during submission");
                Ok(Submission::Immediate(urls))
            }
            JobStatus::Failed(reason) => Err(GenerationError::JobFailed(reason)),
            JobStatus::Pending | JobStatus::Running => {
                if handle.id().is_empty() {
                    return Err(GenerationError::Transport(
                        "Provider returned a prediction without an id".into(),
                    ));
                }
                info!("Prediction {handle} queued");
                Ok(Submission::Pending(handle))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;

    fn submitter(api: &std::sync::Arc<ScriptedApi>, mode: SubmitMode) -> JobSubmitter {
        JobSubmitter::new(api.clone(), ModelCatalog::default(), mode)
    }

    #[tokio::test]
    async fn queued_prediction_yields_handle() {
        let api = ScriptedApi::new().on_create(Ok(prediction("abc123", "starting")));
        let submission = submitter(&api, SubmitMode::Async)
            .submit("WILLYREX_AVATAR", "a hero at dawn")
            .await
            .unwrap();

        assert_eq!(submission, Submission::Pending(JobHandle::new("abc123")));

        let created = api.created.lock().unwrap();
        let (request, mode) = &created[0];
        assert_eq!(
            request.version,
            "cf3f35c9fc7c495596ff94b6a1e0b8ec263b46c9be0610d33088d65a5dbc3471"
        );
        assert_eq!(request.input.prompt, "a hero at dawn");
        assert_eq!(*mode, SubmitMode::Async);
    }

    #[tokio::test]
    async fn finished_prediction_is_immediate() {
        let api =
            ScriptedApi::new().on_create(Ok(succeeded("abc123", &["https://cdn/x.png"])));
        let submission = submitter(&api, SubmitMode::Wait { seconds: 30 })
            .submit("MARCURGELL_AVATAR", "  a hero at dawn ")
            .await
            .unwrap();

        assert_eq!(
            submission,
            Submission::Immediate(vec!["https://cdn/x.png".into()])
        );
        let created = api.created.lock().unwrap();
        assert_eq!(created[0].0.input.prompt, "a hero at dawn");
        assert_eq!(created[0].1, SubmitMode::Wait { seconds: 30 });
    }

    #[tokio::test]
    async fn unknown_subject_is_rejected_offline() {
        let api = ScriptedApi::new();
        let err = submitter(&api, SubmitMode::Async)
            .submit("SOMEONE_ELSE", "a hero at dawn")
            .await
            .unwrap_err();

        assert!(matches!(err, GenerationError::UnknownSubject(id) if id == "SOMEONE_ELSE"));
        assert_eq!(api.create_calls(), 0);
    }

    #[tokio::test]
    async fn empty_prompt_is_rejected_offline() {
        let api = ScriptedApi::new();
        for prompt in ["", "   \n"] {
            let err = submitter(&api, SubmitMode::Async)
                .submit("WILLYREX_AVATAR", prompt)
                .await
                .unwrap_err();
            assert!(matches!(err, GenerationError::InvalidInput(_)));
        }
        assert_eq!(api.create_calls(), 0);
    }

    #[tokio::test]
    async fn provider_errors_surface_unchanged() {
        let api = ScriptedApi::new().on_create(Err(http_error(500)));
        let err = submitter(&api, SubmitMode::Async)
            .submit("WILLYREX_AVATAR", "a hero at dawn")
            .await
            .unwrap_err();

        assert!(matches!(err, GenerationError::ProviderError { status: 500, .. }));
        assert_eq!(api.create_calls(), 1);
    }

    #[tokio::test]
    async fn failed_during_submission() {
        let api = ScriptedApi::new().on_create(Ok(failed("abc123", "NSFW content detected")));
        let err = submitter(&api, SubmitMode::Wait { seconds: 30 })
            .submit("WILLYREX_AVATAR", "a hero at dawn")
            .await
            .unwrap_err();

        assert!(matches!(err, GenerationError::JobFailed(r) if r == "NSFW content detected"));
    }
}
