use clap::Parser;
use color_eyre::Result;
use engine::{
    GenerationRequest, Orchestrator,
    config::{EngineConfig, PollConfig, SubmitMode},
    job::LogProgress,
    subject::Subject,
};

#[derive(clap::Parser)]
struct Arg {
    key: String,
    subject: Subject,
    prompt: String,
    /// Let Replicate hold the create request for up to this many seconds
    #[arg(long)]
    wait: Option<u32>,
    #[arg(long, default_value_t = PollConfig::DEFAULT_INTERVAL_MS)]
    interval_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    pretty_env_logger::init();
    color_eyre::install()?;
    let Arg {
        key,
        subject,
        prompt,
        wait,
        interval_ms,
    } = Arg::parse();

    let mut cfg = EngineConfig::default();
    cfg.replicate.api_key = Some(key);
    cfg.polling.interval_ms = interval_ms;
    cfg.submit_mode = wait.map_or(SubmitMode::Async, |seconds| SubmitMode::Wait { seconds });

    let orchestrator = Orchestrator::from_config(&cfg)?;
    let url = orchestrator
        .generate_thumbnail(
            &GenerationRequest::new(subject.to_string(), prompt),
            &mut LogProgress::new(subject.to_string()),
        )
        .await?;
    println!("{url}");

    Ok(())
}
