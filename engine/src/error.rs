use thiserror::Error;

/// Everything that can end a thumbnail generation.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown subject: {0}")]
    UnknownSubject(String),

    #[error("Missing API key for {0}")]
    MissingApiKey(&'static str),

    /// The provider answered with a non-success status code.
    #[error("Provider error ({status}): {message}")]
    ProviderError { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Prompt generation failed: {0}")]
    PromptGenerationFailed(String),

    #[error("Prediction failed: {0}")]
    JobFailed(String),

    #[error("Prediction succeeded without any output")]
    EmptyArtifactList,

    #[error("Prediction did not complete after {attempts} attempts")]
    Timeout { attempts: u32 },
}

impl GenerationError {
    /// Errors caused by the caller's input rather than by a provider.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::UnknownSubject(_))
    }

    pub(crate) fn from_response(status: reqwest::StatusCode, body: String) -> Self {
        let message = if body.trim().is_empty() {
            status
                .canonical_reason()
                .unwrap_or("no response body")
                .to_string()
        } else {
            body
        };
        Self::ProviderError {
            status: status.as_u16(),
            message,
        }
    }
}

impl From<reqwest::Error> for GenerationError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => Self::ProviderError {
                status: status.as_u16(),
                message: e.to_string(),
            },
            None => Self::Transport(e.to_string()),
        }
    }
}

impl From<serde_json::Error> for GenerationError {
    fn from(e: serde_json::Error) -> Self {
        Self::Transport(format!("malformed response body: {e}"))
    }
}

pub type Result<T> = std::result::Result<T, GenerationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors() {
        assert!(GenerationError::InvalidInput("empty prompt".into()).is_client_error());
        assert!(GenerationError::UnknownSubject("NOBODY".into()).is_client_error());

        assert!(!GenerationError::Timeout { attempts: 30 }.is_client_error());
        assert!(!GenerationError::EmptyArtifactList.is_client_error());
        assert!(!GenerationError::Transport("reset".into()).is_client_error());
        assert!(
            !GenerationError::ProviderError {
                status: 500,
                message: "boom".into()
            }
            .is_client_error()
        );
    }

    #[test]
    fn empty_body_falls_back_to_reason() {
        let err = GenerationError::from_response(reqwest::StatusCode::BAD_GATEWAY, "  ".into());
        assert_eq!(err.to_string(), "Provider error (502): Bad Gateway");
    }
}
