use std::{
    fs,
    io::{Write, stderr},
    path::{Path, PathBuf},
};

use color_eyre::{
    Result,
    eyre::{WrapErr as _, bail, eyre},
};
use engine::{
    GenerationRequest, Orchestrator,
    config::EngineConfig,
    service::{Response, ThumbnailService},
    subject::ModelCatalog,
};
use log::info;
use serde::{Serialize, de::DeserializeOwned};

use crate::cli::{Cli, Command};

pub mod cli;

pub const CONFIG_FILE_NAME: &str = "thumbnail_studio.ron";

pub fn load_ron_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let src = fs::read_to_string(path)?;
    Ok(ron::from_str(&src)?)
}

pub fn save_ron_file<T: Serialize>(path: &Path, x: &T) -> Result<()> {
    let pretty = ron::ser::PrettyConfig::default();
    Ok(fs::write(path, ron::ser::to_string_pretty(x, pretty)?)?)
}

pub fn config_path() -> Result<PathBuf> {
    Ok(dirs::config_local_dir()
        .ok_or(eyre!("Couldn't get config dir"))?
        .join(CONFIG_FILE_NAME))
}

pub fn load_config(path: &Path) -> Result<Option<EngineConfig>> {
    if !path.exists() {
        Ok(None)
    } else {
        load_ron_file(path)
            .map(Some)
            .with_context(|| format!("reading config {}", path.display()))
    }
}

pub fn save_config(path: &Path, cfg: &EngineConfig) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    save_ron_file(path, cfg)
}

/// Config file contents, with keys given on the command line taking precedence.
pub fn effective_config(cli: &Cli) -> Result<(PathBuf, EngineConfig)> {
    let path = match &cli.config {
        Some(p) => p.clone(),
        None => config_path()?,
    };
    let mut cfg = load_config(&path)?.unwrap_or_default();
    if let Some(key) = &cli.replicate_key {
        cfg.replicate.api_key = Some(key.clone());
    }
    if let Some(key) = &cli.openai_key {
        cfg.openai.api_key = Some(key.clone());
    }
    Ok((path, cfg))
}

pub async fn run(cli: Cli) -> Result<()> {
    let (path, cfg) = effective_config(&cli)?;

    match cli.command {
        Command::Subjects => {
            for (subject, model) in ModelCatalog::with_overrides(&cfg.models).subjects() {
                println!("{subject}\t{model}");
            }
            Ok(())
        }

        Command::InitConfig => {
            save_config(&path, &cfg)?;
            println!("Wrote {}", path.display());
            Ok(())
        }

        Command::Start(start) => {
            let service = service(&cfg)?;
            print_response(service.start_generation(&start.subject, &start.prompt).await)
        }

        Command::Status { prediction_id } => {
            let service = service(&cfg)?;
            print_response(service.check_status(&prediction_id).await)
        }

        Command::Prompt(args) => {
            let service = service(&cfg)?;
            let brief = args.brief.to_prompt_brief(&args.subject);
            print_response(service.generate_prompt(&args.subject, &brief).await)
        }

        Command::Generate(generate) => {
            let orchestrator = Orchestrator::from_config(&cfg)?;
            let mut progress = |remaining: u32| {
                eprint!("\rWaiting for the image, {remaining} attempts left ");
                _ = stderr().flush();
            };

            let url = match generate.prompt {
                Some(prompt) => {
                    orchestrator
                        .generate_thumbnail(
                            &GenerationRequest::new(generate.subject, prompt),
                            &mut progress,
                        )
                        .await
                }
                None => {
                    let brief = generate.brief.to_prompt_brief(&generate.subject);
                    orchestrator
                        .generate_from_brief(&generate.subject, &brief, &mut progress)
                        .await
                }
            };
            eprintln!();

            let url = url?;
            info!("Generated {url}");
            println!("{url}");
            Ok(())
        }
    }
}

fn service(cfg: &EngineConfig) -> Result<ThumbnailService> {
    Ok(ThumbnailService::new(Orchestrator::from_config(cfg)?))
}

fn print_response(resp: Response) -> Result<()> {
    println!("{}", resp.to_json());
    if !resp.is_ok() {
        bail!("request failed with status {}", resp.class.http_code());
    }
    Ok(())
}
