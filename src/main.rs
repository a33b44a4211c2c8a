use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use voice_coach::audio::wav;
use voice_coach::{
    create_router, AppConfig, AppState, AudioBackendFactory, HttpScorer, LiveClient,
    ReviewClient, SessionManager, TtsClient,
};

/// Voice practice coach: simulated customer conversations with per-turn scoring
#[derive(Parser, Debug)]
#[command(name = "voice-coach", version)]
struct Cli {
    /// Path to configuration file (extension optional)
    #[arg(long, global = true, value_name = "PATH", default_value = "config/voice-coach")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP control API with the local microphone and speakers
    Serve,

    /// Synthesize text to a WAV file
    Speak {
        /// Text to read aloud
        #[arg(long)]
        text: String,

        /// Voice name (defaults to the configured TTS voice)
        #[arg(long)]
        voice: Option<String>,

        /// Speaking style, e.g. 温和 or 专业
        #[arg(long)]
        style: Option<String>,

        /// Output WAV path
        #[arg(long, value_name = "FILE")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = AppConfig::load(&cli.config)?;

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Serve => serve(cfg).await,
        Commands::Speak {
            text,
            voice,
            style,
            out,
        } => speak(cfg, &text, voice, style, out).await,
    }
}

async fn serve(cfg: AppConfig) -> Result<()> {
    let http = reqwest::Client::new();
    let audio = cfg.audio.backend();

    let microphone =
        AudioBackendFactory::microphone(&audio).context("Failed to create microphone")?;
    let output = AudioBackendFactory::output(&audio).context("Failed to create audio output")?;

    let connector = Arc::new(LiveClient::new(cfg.provider.clone(), http.clone()));
    let scorer = Arc::new(HttpScorer::new(
        http.clone(),
        cfg.scoring.endpoint.clone(),
        Duration::from_secs(cfg.scoring.timeout_secs),
    ));

    let manager = SessionManager::new(
        connector,
        scorer,
        microphone,
        output,
        audio.playback_sample_rate,
        audio.channels,
    );
    let mut state = AppState::new(manager);
    match &cfg.review {
        Some(review) => {
            state = state.with_reviewer(ReviewClient::new(
                http,
                review.endpoint.clone(),
                review.model.clone(),
                Duration::from_secs(review.timeout_secs),
            ));
        }
        None => info!("No review endpoint configured, /session/review disabled"),
    }
    let app = create_router(state.clone());

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("HTTP API listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown requested");
        })
        .await
        .context("HTTP server failed")?;

    state
        .session
        .lock()
        .await
        .close()
        .await
        .context("Failed to close session on shutdown")?;

    Ok(())
}

async fn speak(
    cfg: AppConfig,
    text: &str,
    voice: Option<String>,
    style: Option<String>,
    out: PathBuf,
) -> Result<()> {
    let client = TtsClient::new(reqwest::Client::new(), cfg.tts.endpoint.clone());
    let voice = voice.unwrap_or(cfg.tts.default_voice);

    let clip = client
        .synthesize(text, &voice, style.as_deref())
        .await
        .context("Speech synthesis failed")?;

    let chunk = clip.decode().context("Invalid audio in TTS response")?;
    let file = wav::pcm16_to_wav(&chunk.data, chunk.sample_rate, chunk.channels)?;

    tokio::fs::write(&out, file)
        .await
        .with_context(|| format!("Failed to write {}", out.display()))?;

    info!(
        "Wrote {:.1}s of audio to {}",
        chunk.duration_secs(),
        out.display()
    );

    Ok(())
}
