use std::path::PathBuf;

use engine::llm::PromptBrief;

#[derive(Debug, clap::Parser)]
#[command(name = "thumbnail-studio", about = "Generate YouTube thumbnails with Replicate")]
pub struct Cli {
    /// Overrides the Replicate key from the config file
    #[arg(long, global = true)]
    pub replicate_key: Option<String>,

    /// Overrides the OpenAI key from the config file
    #[arg(long, global = true)]
    pub openai_key: Option<String>,

    /// Config file to use instead of the default location
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Generate a thumbnail and wait until the image is ready
    Generate(Generate),
    /// Create a prediction without waiting for it
    Start(Start),
    /// Query a prediction once
    Status { prediction_id: String },
    /// Only write the image prompt for a brief
    Prompt(PromptOnly),
    /// List the known subjects and their models
    Subjects,
    /// Write the effective configuration to the config file
    InitConfig,
}

#[derive(Debug, clap::Args)]
pub struct Generate {
    #[arg(long)]
    pub subject: String,

    /// Use this prompt as is. Without it, the prompt is written from the brief.
    #[arg(long)]
    pub prompt: Option<String>,

    #[command(flatten)]
    pub brief: Brief,
}

#[derive(Debug, clap::Args)]
pub struct PromptOnly {
    #[arg(long)]
    pub subject: String,

    #[command(flatten)]
    pub brief: Brief,
}

#[derive(Debug, clap::Args)]
pub struct Start {
    #[arg(long)]
    pub subject: String,

    #[arg(long)]
    pub prompt: String,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Brief {
    /// What the video is about
    #[arg(long)]
    pub description: Option<String>,

    /// Subject name used in the generated prompt, defaults to the subject id
    #[arg(long)]
    pub protagonist: Option<String>,

    #[arg(long, default_value = "ignore")]
    pub art_style: String,

    #[arg(long, default_value = "ignore")]
    pub scene: String,

    #[arg(long, default_value = "ignore")]
    pub lighting: String,

    #[arg(long, default_value = "ignore")]
    pub mood: String,

    #[arg(long)]
    pub details: Option<String>,

    #[arg(long)]
    pub extra: Option<String>,
}

impl Brief {
    pub fn to_prompt_brief(&self, subject: &str) -> PromptBrief {
        PromptBrief {
            video_description: self.description.clone().unwrap_or_default(),
            art_style: self.art_style.clone(),
            subject: self.protagonist.clone().unwrap_or_else(|| subject.to_string()),
            scene_type: self.scene.clone(),
            lighting_type: self.lighting.clone(),
            mood: self.mood.clone(),
            additional_details: self.details.clone(),
            extra_details: self.extra.clone(),
        }
    }
}
