use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use voicevox_narrator::cli::{Cli, MIN_SCRIPT_BYTES};
use voicevox_narrator::domain::script::ScriptSegmenter;
use voicevox_narrator::domain::synthesis::SynthesisEngine;
use voicevox_narrator::error::{AppError, AppResult};
use voicevox_narrator::infrastructure::config::{Config, LogFormat};
use voicevox_narrator::infrastructure::http::build_client;
use voicevox_narrator::infrastructure::repositories::{
    LocalFileWriter, VoiceTableLoader, VoicevoxClient,
};
use voicevox_narrator::infrastructure::webhook::WebhookPoster;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let code = match run(cli).await {
        Ok(()) => 0,
        Err(err) => {
            tracing::error!(error = %err, "voicevox-narrator failed");
            eprintln!("Error: {err}");
            err.exit_code()
        }
    };

    std::process::exit(code);
}

async fn run(cli: Cli) -> AppResult<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config, cli.verbose);

    let script = read_script(&cli)
        .await
        .map_err(|e| AppError::InvalidInput(format!("{e:#}")))?;
    if script.len() < MIN_SCRIPT_BYTES {
        return Err(AppError::InvalidInput(format!(
            "script is too short (at least {} bytes required)",
            MIN_SCRIPT_BYTES
        )));
    }

    tracing::info!(
        engine = %config.voicevox_api_url,
        output = %cli.output,
        script_bytes = script.len(),
        "Starting voicevox-narrator"
    );

    let http = build_client(config.http_timeout)
        .map_err(|e| AppError::Internal(format!("failed to build HTTP client: {e}")))?;

    // === DEPENDENCY INJECTION SETUP ===
    let client = Arc::new(VoicevoxClient::new(
        http.clone(),
        config.voicevox_api_url.clone(),
        config.max_response_bytes,
    ));
    let table = Arc::new(client.load().await?);

    let segmenter = ScriptSegmenter::new(config.segmenter_config())
        .map_err(|e| AppError::Internal(format!("failed to build segmenter: {e}")))?;
    let engine = SynthesisEngine::new(
        client,
        Arc::new(LocalFileWriter::new()),
        segmenter,
        config.engine_config(),
    );

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling synthesis");
            ctrl_c.cancel();
        }
    });

    let report = engine.execute(&script, &cli.output, table, &cancel).await?;
    tracing::info!(
        segments = report.segments,
        output_bytes = report.output_bytes,
        output = %cli.output,
        "Narration written"
    );

    if cli.post_api {
        post_script(&config, http, &cli, &script).await;
    }

    Ok(())
}

async fn read_script(cli: &Cli) -> anyhow::Result<String> {
    let raw = match cli.script_path() {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read script file {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buffer)
                .await
                .context("failed to read script from stdin")?;
            buffer
        }
    };

    Ok(raw.trim().to_string())
}

async fn post_script(config: &Config, http: reqwest::Client, cli: &Cli, script: &str) {
    let Some(url) = &config.post_api_url else {
        tracing::info!("POST_API_URL is not set, skipping webhook");
        return;
    };

    let poster = WebhookPoster::new(http, url.clone());
    if let Err(err) = poster.post(&cli.title(), &cli.mode, script).await {
        tracing::warn!(error = %err, "Failed to post script to webhook");
    }
}

fn init_logging(config: &Config, verbose: bool) {
    let default_filter = if verbose {
        "voicevox_narrator=debug"
    } else {
        "voicevox_narrator=info"
    };

    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| default_filter.into()),
            )
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| default_filter.into()),
            )
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
