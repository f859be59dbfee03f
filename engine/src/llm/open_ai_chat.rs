use log::{debug, info};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{
    config::OpenAIConfig,
    error::{GenerationError, Result},
    image_model::ApiFuture,
};

use super::{PromptBrief, PromptGenerator, SYSTEM_PROMPT};

#[derive(Debug, Clone)]
pub struct OpenAIChat {
    client: Client,
    api_key: String,
    url: String,
    model: String,
}

impl OpenAIChat {
    pub fn new(api_key: String, url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            url: url.into(),
            model: model.into(),
        }
    }

    pub fn from_config(cfg: &OpenAIConfig) -> Result<Self> {
        let key = cfg
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or(GenerationError::MissingApiKey("OpenAI"))?;
        Ok(Self::new(key, cfg.url.clone(), cfg.model.clone()))
    }

    fn request_body(&self, brief: &PromptBrief) -> OpenAIChatRequest {
        OpenAIChatRequest {
            model: self.model.clone(),
            messages: vec![
                OpenAIMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                OpenAIMessage {
                    role: "user",
                    content: brief.user_message(),
                },
            ],
        }
    }
}

impl PromptGenerator for OpenAIChat {
    fn generate<'a>(&'a self, brief: &'a PromptBrief) -> ApiFuture<'a, String> {
        Box::pin(async move {
            brief.validate()?;
            let body = self.request_body(brief);

            let res = self
                .client
                .post(&self.url)
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await?;

            let status = res.status();
            let text = res.text().await?;
            if !status.is_success() {
                return Err(GenerationError::from_response(status, text));
            }
            debug!("OpenAI response:\n{text}");

            let prompt = extract_prompt(&text)?;
            info!("Generated prompt with {} characters", prompt.len());
            Ok(prompt)
        })
    }
}

fn extract_prompt(body: &str) -> Result<String> {
    let response: OpenAIChatResponse = serde_json::from_str(body)
        .map_err(|e| GenerationError::PromptGenerationFailed(format!("malformed response: {e}")))?;

    let prompt = response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|c| c.trim().to_string())
        .unwrap_or_default();

    if prompt.is_empty() {
        Err(GenerationError::PromptGenerationFailed(
            "model returned an empty prompt".into(),
        ))
    } else {
        Ok(prompt)
    }
}

//
// ===== OpenAI wire types =====
//

#[derive(Serialize)]
struct OpenAIChatRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
}

#[derive(Serialize)]
struct OpenAIMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct OpenAIChatResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Deserialize)]
struct OpenAIResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::tests::brief;

    #[test]
    fn request_serialization() {
        let chat = OpenAIChat::new("key".into(), "http://localhost", "gpt-4");
        let body = serde_json::to_value(chat.request_body(&brief())).unwrap();

        assert_eq!(body["model"], "gpt-4");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], SYSTEM_PROMPT);
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], brief().user_message());
        assert_eq!(body.as_object().unwrap().len(), 2);
    }

    #[test]
    fn extracts_trimmed_content() {
        let body = r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"  Willyrex storming a castle \n"}}]}"#;
        assert_eq!(extract_prompt(body).unwrap(), "Willyrex storming a castle");
    }

    #[test]
    fn empty_or_malformed_responses_fail() {
        for body in [
            r#"{"choices":[]}"#,
            r#"{"choices":[{"message":{"content":"   "}}]}"#,
            r#"{"choices":[{"message":{"content":null}}]}"#,
            r#"{"error":"nope"}"#,
            "not json",
        ] {
            assert!(
                matches!(
                    extract_prompt(body),
                    Err(GenerationError::PromptGenerationFailed(_))
                ),
                "{body}"
            );
        }
    }

    #[tokio::test]
    async fn invalid_brief_fails_before_sending() {
        // nothing listens on this port, so reaching the network would be a Transport error
        let chat = OpenAIChat::new("key".into(), "http://127.0.0.1:9", "gpt-4");
        let err = chat.generate(&PromptBrief::default()).await.unwrap_err();
        assert!(matches!(err, GenerationError::InvalidInput(_)));
    }

    #[test]
    fn missing_key() {
        assert!(matches!(
            OpenAIChat::from_config(&OpenAIConfig::default()),
            Err(GenerationError::MissingApiKey("OpenAI"))
        ));
    }
}
