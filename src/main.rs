use anyhow::{Context, Result};
use clap::Parser;
use std::time::Duration;
use tracing::info;
use voicechat::tui::{self, AppEvent, EventHandler};
use voicechat::{
    CaptureConfig, ChatApi, ChatController, Config, HttpApi, Recorder, SpeechEngine, SystemSpeech,
};

#[derive(Debug, Parser)]
#[command(name = "voicechat", about = "Terminal voice chat client")]
struct Args {
    /// Configuration file (TOML), without extension or with
    #[arg(short, long, default_value = "config/voicechat")]
    config: String,

    /// Override the backend base URL from the config file
    #[arg(short, long)]
    server: Option<String>,

    /// Check microphone and backend readiness, then exit
    #[arg(long)]
    probe: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut cfg = Config::load(&args.config)?;
    if let Some(server) = args.server {
        cfg.server.base_url = server;
    }

    if args.probe {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter(&cfg.log.filter))
            .init();
        return run_probe(&cfg).await;
    }

    // The TUI owns the terminal, so logs go to a file
    let log_file = std::fs::File::create(&cfg.log.file)
        .with_context(|| format!("failed to create log file: {}", cfg.log.file))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(&cfg.log.filter))
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false)
        .init();

    info!("voicechat v{}", env!("CARGO_PKG_VERSION"));
    info!("backend: {}", cfg.server.base_url);

    let api = HttpApi::new(&cfg.server)?;
    let speech = SystemSpeech::new(&cfg.speech)
        .map_err(|e| anyhow::anyhow!("failed to open speech engine: {e}"))?;
    let recorder = Recorder::new(CaptureConfig::from_audio_config(&cfg.audio));
    let mut controller =
        ChatController::new(api, speech, recorder, cfg.speech.language.clone());

    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let result = run(&mut controller, &mut terminal, &cfg).await;

    tui::restore()?;
    result
}

async fn run<A: ChatApi, S: SpeechEngine>(
    controller: &mut ChatController<A, S>,
    terminal: &mut tui::Tui,
    cfg: &Config,
) -> Result<()> {
    controller.startup().await;

    let mut events = EventHandler::new(Duration::from_millis(cfg.ui.tick_ms));

    loop {
        controller.app.tick(std::time::Instant::now());
        controller.update_timer();
        terminal.draw(|frame| voicechat::ui::draw(frame, &controller.app))?;

        if controller.app.should_quit {
            break;
        }

        // A queued send runs here so the processing overlay drawn above
        // stays visible for the duration of the call.
        if controller.has_pending_send() {
            controller.process_pending().await;
            continue;
        }

        match events.next().await {
            Some(AppEvent::Key(key)) => controller.handle_key(key).await,
            Some(AppEvent::Tick) => {}
            None => break,
        }
    }

    Ok(())
}

/// Readiness check without entering the TUI: open and release the
/// microphone, then hit the backend health endpoint.
async fn run_probe(cfg: &Config) -> Result<()> {
    let recorder = Recorder::new(CaptureConfig::from_audio_config(&cfg.audio));
    match recorder.probe().await {
        Ok(()) => println!("microphone: ready"),
        Err(e) => println!("microphone: error ({e})"),
    }

    match SystemSpeech::new(&cfg.speech) {
        Ok(speech) => println!("speech:     ready ({} voices)", speech.voices().len()),
        Err(e) => println!("speech:     error ({e})"),
    }

    let api = HttpApi::new(&cfg.server)?;
    match api.health().await {
        Ok(()) => println!("backend:    ready ({})", cfg.server.base_url),
        Err(e) => println!("backend:    error ({e})"),
    }

    Ok(())
}

fn env_filter(default: &str) -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default))
}
