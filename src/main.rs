use anyhow::{Context, Result, bail};
use clap::Parser;
use earshot::cli::{Cli, Commands, ConfigAction};
use earshot::config::Config;
use earshot::defaults;
use earshot::feed::{FeatureFeed, FeedEvent};
use earshot::model::OnlineModelManager;
use earshot::pipeline::assembler::{FrameAssembler, FrameProgress};
use earshot::status::{NullStatus, StatusSink, StderrStatus};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => {
            let config = load_config(cli.config.as_deref())?;
            run_tap(config, None, Vec::new(), cli.quiet).await?;
        }
        Some(Commands::Tap { command, arg }) => {
            let config = load_config(cli.config.as_deref())?;
            run_tap(config, command, arg, cli.quiet).await?;
        }
        Some(Commands::CheckModel { url }) => {
            let config = load_config(cli.config.as_deref())?;
            check_model(config, url).await?;
        }
        Some(Commands::Config { action }) => {
            handle_config_command(action, cli.config.as_deref())?;
        }
    }

    Ok(())
}

fn config_path(path: Option<&Path>) -> PathBuf {
    path.map(Path::to_path_buf)
        .unwrap_or_else(Config::default_path)
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = config_path(path);
    let config = Config::load_or_default(&path)
        .with_context(|| format!("loading config from {}", path.display()))?
        .with_env_overrides();
    config.validate()?;
    Ok(config)
}

/// Run the feature feed and print frame metadata without classifying.
///
/// This drives the real framing path against the real extractor, which is
/// what breaks first when the producer is not chunk-aligned.
async fn run_tap(
    mut config: Config,
    command: Option<String>,
    args: Vec<String>,
    quiet: bool,
) -> Result<()> {
    if let Some(command) = command {
        config.feed.command = command;
        config.feed.args = args;
    }

    let status: Arc<dyn StatusSink> = if quiet {
        Arc::new(NullStatus)
    } else {
        Arc::new(StderrStatus)
    };

    let mut assembler = FrameAssembler::new(config.feed.frame_bytes)?;
    let (mut feed, mut events) = FeatureFeed::spawn(&config.feed.command, &config.feed.args)?;
    if let Some(pid) = feed.pid() {
        status.warn(&format!("started feature extractor (pid {pid})"));
    }

    let mut frames = 0u64;
    loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    Some(FeedEvent::Chunk(chunk)) => match assembler.consume(&chunk) {
                        FrameProgress::Pending => {}
                        FrameProgress::Overflow => status.warn("frame buffer overfull, resetting"),
                        FrameProgress::Complete(frame) => {
                            frames += 1;
                            println!(
                                "frame {frames}: doa {:.1} rms {:.3} ({} payload values)",
                                frame.direction_of_arrival,
                                frame.rms,
                                frame.payload.len()
                            );
                        }
                    },
                    Some(FeedEvent::Stderr(line)) => status.warn(&format!("extractor: {line}")),
                    Some(FeedEvent::Closed) => status.warn("feature feed closed"),
                    None => break,
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    feed.shutdown().await;
    Ok(())
}

/// Fetch the model documents and validate them against the frame size.
async fn check_model(config: Config, url: Option<String>) -> Result<()> {
    let url = url.unwrap_or_else(|| config.model.url.clone());
    if url.is_empty() {
        bail!("no model URL given and model.url is empty in the config");
    }

    let documents = OnlineModelManager::new().fetch(&url).await?;
    println!("labels ({}):", documents.labels.len());
    for label in &documents.labels {
        println!("  {label}");
    }
    println!("model input length: {}", documents.input_len);

    let frame_payload =
        config.feed.frame_bytes / size_of::<f32>() - defaults::FRAME_METADATA_FLOATS;
    if documents.input_len != frame_payload {
        bail!(
            "frame size {} bytes carries {} payload values, but the model expects {}",
            config.feed.frame_bytes,
            frame_payload,
            documents.input_len
        );
    }
    println!(
        "frame size {} bytes matches the model input",
        config.feed.frame_bytes
    );
    Ok(())
}

fn handle_config_command(action: ConfigAction, path: Option<&Path>) -> Result<()> {
    let path = config_path(path);
    match action {
        ConfigAction::Init => {
            if path.exists() {
                bail!("config file already exists at {}", path.display());
            }
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, Config::default().to_toml()?)?;
            println!("wrote {}", path.display());
        }
        ConfigAction::Path => {
            println!("{}", path.display());
        }
        ConfigAction::Show => {
            let config = Config::load_or_default(&path)?.with_env_overrides();
            print!("{}", config.to_toml()?);
        }
    }
    Ok(())
}
