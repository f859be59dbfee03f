use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    error::{GenerationError, Result},
    image_model::ApiFuture,
};

mod open_ai_chat;
pub use open_ai_chat::OpenAIChat;

pub type PromptGeneratorRef = Arc<dyn PromptGenerator + Send + Sync>;

/// Turns a thumbnail brief into an image prompt.
pub trait PromptGenerator {
    fn generate<'a>(&'a self, brief: &'a PromptBrief) -> ApiFuture<'a, String>;
}

pub const SYSTEM_PROMPT: &str = indoc::indoc! {"
    You are an expert in generating visually striking image generation prompts specifically for YouTube thumbnails.
    Your task is to take various parameters, such as a subject, art style, scene type, lighting, mood, and additional details, along with a video description, and craft a highly descriptive prompt for creating an engaging YouTube thumbnail.

    The subject provided should always be the central figure and protagonist of the thumbnail. Make sure to:
    - Highlight the subject as the main focus of the image, ensuring it is visually dominant and instantly recognizable.
    - Ensure that the art style, lighting, scene, and mood complement and emphasize the subject.
    - The prompt should create a sense of visual impact and clarity, with a strong composition where the subject stands out.
    - The thumbnail should be eye-catching, suitable for YouTube, and compelling enough to attract clicks.
    - The subject's name must be used exactly as provided.
    - Only return the prompt, do not add any additional information or explanations.
    - The face of the subject should be clearly visible.

    Your goal is to create a prompt that results in a visually powerful thumbnail where the subject is the undeniable star of the image."
};

/// What the user filled in about the video and the look they want.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptBrief {
    pub video_description: String,
    pub art_style: String,
    pub subject: String,
    pub scene_type: String,
    pub lighting_type: String,
    pub mood: String,
    #[serde(default)]
    pub additional_details: Option<String>,
    #[serde(default)]
    pub extra_details: Option<String>,
}

impl PromptBrief {
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("video description", &self.video_description),
            ("art style", &self.art_style),
            ("subject", &self.subject),
            ("scene type", &self.scene_type),
            ("lighting type", &self.lighting_type),
            ("mood", &self.mood),
        ];
        let missing: Vec<_> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(GenerationError::InvalidInput(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )))
        }
    }

    pub fn user_message(&self) -> String {
        fn optional(s: &Option<String>) -> &str {
            s.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or("None")
        }

        format!(
            "Generate a YouTube thumbnail image prompt where the subject is the main protagonist, \
             based on the following details:\n\
             Video description: {}\n\
             Art style: {}\n\
             Subject: {}\n\
             Scene type: {}\n\
             Lighting type: {}\n\
             Mood: {}\n\
             Additional details: {}\n\
             Extra details: {}",
            self.video_description.trim(),
            self.art_style.trim(),
            self.subject.trim(),
            self.scene_type.trim(),
            self.lighting_type.trim(),
            self.mood.trim(),
            optional(&self.additional_details),
            optional(&self.extra_details),
        )
    }
}
