//! The operations a front end calls, answered the way an HTTP handler would:
//! a status class plus a JSON body. Validation problems are client errors,
//! everything else that goes wrong is a server error.

use log::{error, warn};
use serde::Serialize;

use crate::{
    error::{GenerationError, Result},
    job::{JobHandle, JobStatus, StatusReporter, Submission},
    llm::PromptBrief,
    orchestrator::{GenerationRequest, Orchestrator},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Ok,
    ClientError,
    ServerError,
}

impl StatusClass {
    pub fn http_code(&self) -> u16 {
        match self {
            StatusClass::Ok => 200,
            StatusClass::ClientError => 400,
            StatusClass::ServerError => 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged, rename_all_fields = "camelCase")]
pub enum ResponseBody {
    Started {
        prediction_id: String,
    },
    Image {
        image_url: String,
    },
    Status {
        status: &'static str,
        #[serde(skip_serializing_if = "Option::is_none")]
        image_url: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    Prompt {
        generated_prompt: String,
    },
    Error {
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub class: StatusClass,
    pub body: ResponseBody,
}

impl Response {
    fn ok(body: ResponseBody) -> Self {
        Self {
            class: StatusClass::Ok,
            body,
        }
    }

    fn from_result(result: Result<ResponseBody>) -> Self {
        match result {
            Ok(body) => Self::ok(body),
            Err(e) => Self::from(e),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.class == StatusClass::Ok
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.body).unwrap_or_else(|e| format!(r#"{{"message":"{e}"}}"#))
    }
}

impl From<GenerationError> for Response {
    fn from(e: GenerationError) -> Self {
        let class = if e.is_client_error() {
            warn!("Rejected request: {e}");
            StatusClass::ClientError
        } else {
            error!("Request failed: {e}");
            StatusClass::ServerError
        };
        Self {
            class,
            body: ResponseBody::Error {
                message: e.to_string(),
            },
        }
    }
}

pub struct ThumbnailService {
    orchestrator: Orchestrator,
}

impl ThumbnailService {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self { orchestrator }
    }

    /// Creates the prediction and answers with its id, or with the image when
    /// the provider finished it right away.
    pub async fn start_generation(&self, subject_id: &str, prompt_text: &str) -> Response {
        let result = self
            .orchestrator
            .submitter()
            .submit(subject_id, prompt_text)
            .await
            .and_then(|submission| match submission {
                Submission::Pending(handle) => Ok(ResponseBody::Started {
                    prediction_id: handle.id().to_string(),
                }),
                Submission::Immediate(urls) => first_url(urls),
            });
        Response::from_result(result)
    }

    /// Queries the prediction once.
    pub async fn check_status(&self, prediction_id: &str) -> Response {
        let prediction_id = prediction_id.trim();
        if prediction_id.is_empty() {
            return GenerationError::InvalidInput("Prediction ID is required".into()).into();
        }

        let result = self
            .orchestrator
            .poller()
            .status(&JobHandle::new(prediction_id))
            .await
            .and_then(|status| match status {
                JobStatus::Succeeded(urls) => {
                    let image_url = urls
                        .into_iter()
                        .next()
                        .ok_or(GenerationError::EmptyArtifactList)?;
                    Ok(ResponseBody::Status {
                        status: "succeeded",
                        image_url: Some(image_url),
                        message: None,
                    })
                }
                JobStatus::Failed(reason) => Ok(ResponseBody::Status {
                    status: "failed",
                    image_url: None,
                    message: Some(reason),
                }),
                other => Ok(ResponseBody::Status {
                    status: other.label(),
                    image_url: None,
                    message: None,
                }),
            });
        Response::from_result(result)
    }

    /// Writes the image prompt for `subject_id`. The subject must be known,
    /// even though only the brief reaches the prompt generator.
    pub async fn generate_prompt(&self, subject_id: &str, brief: &PromptBrief) -> Response {
        if let Err(e) = self.orchestrator.submitter().catalog().resolve(subject_id) {
            return e.into();
        }
        let result = self
            .orchestrator
            .generate_prompt(brief)
            .await
            .map(|generated_prompt| ResponseBody::Prompt { generated_prompt });
        Response::from_result(result)
    }

    /// Submits and waits for the finished image.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
        reporter: &mut (dyn StatusReporter + Send),
    ) -> Response {
        let result = self
            .orchestrator
            .generate_thumbnail(request, reporter)
            .await
            .map(|image_url| ResponseBody::Image { image_url });
        Response::from_result(result)
    }
}

fn first_url(urls: Vec<String>) -> Result<ResponseBody> {
    urls.into_iter()
        .next()
        .map(|image_url| ResponseBody::Image { image_url })
        .ok_or(GenerationError::EmptyArtifactList)
}
