use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

mod capabilities;
mod config;
mod dictionary;
mod error;
mod events;
mod services;

use config::Config;
use dictionary::{FileSource, ReplacementDictionary, ReplacementSource, StaticSource};
use events::KeyInput;
use services::Engine;

#[derive(Parser, Debug)]
#[command(name = "retext")]
#[command(about = "Background text-expansion engine")]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "retext.toml")]
    config: String,

    /// Dry-run mode (in-memory capabilities, scripted input, no real actions)
    #[arg(long)]
    dry_run: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_tracing(&args.log_level)?;

    info!("Starting retext v{}", env!("CARGO_PKG_VERSION"));

    let config = Arc::new(Config::load(&args.config)?);
    info!("Configuration loaded from: {}", args.config);

    if args.dry_run {
        warn!("Dry-run mode - real clipboard and keyboard are not touched");
    }

    let clipboard = capabilities::create_clipboard(args.dry_run)?;
    let injector = capabilities::create_injector(args.dry_run)?;
    let source: Arc<dyn ReplacementSource> = if args.dry_run {
        Arc::new(StaticSource::new(dry_run_dictionary()))
    } else {
        Arc::new(FileSource::new(&config.replacement.source))
    };

    // Startup load failure is fatal: the engine does not start monitoring.
    let engine = Arc::new(Engine::new(&config, clipboard, injector, source)?);

    // The platform keyboard/pointer hooks are external collaborators; they
    // feed these channels. The senders stay alive for the whole run so the
    // event-driven loops keep waiting for input.
    let (key_tx, key_rx) = mpsc::channel(256);
    let (pointer_tx, pointer_rx) = mpsc::channel(256);

    engine.start(key_rx, pointer_rx)?;
    info!("All monitors running");

    let feeder = if args.dry_run {
        Some(tokio::spawn(dry_run_feeder(key_tx.clone())))
    } else {
        None
    };

    // SIGUSR1 toggles pause, SIGHUP reloads the dictionary from the source.
    #[cfg(unix)]
    let control = tokio::spawn(control_signals(engine.clone()));

    match signal::ctrl_c().await {
        Ok(()) => info!("Received shutdown signal (Ctrl+C)"),
        Err(err) => error!("Failed to wait for shutdown signal: {}", err),
    }

    info!("Shutting down...");

    if let Some(feeder) = feeder {
        feeder.abort();
    }
    #[cfg(unix)]
    control.abort();
    engine.stop().await;
    drop((key_tx, pointer_tx));

    info!("retext stopped");
    Ok(())
}

/// Sample dictionary for dry-run mode.
fn dry_run_dictionary() -> ReplacementDictionary {
    ReplacementDictionary::from_pairs([
        ("brb", "be right back"),
        ("omw", "on my way"),
        ("sig", "Regards,\nretext"),
    ])
}

/// Periodically types a trigger word so the log shows the full replacement
/// path end to end.
async fn dry_run_feeder(key_tx: mpsc::Sender<KeyInput>) {
    let mut ticker = tokio::time::interval(tokio::time::Duration::from_secs(5));
    ticker.tick().await;

    loop {
        ticker.tick().await;
        info!("Dry-run: typing 'brb '");
        for name in ["b", "r", "b", "space"] {
            if key_tx.send(KeyInput::down(name)).await.is_err() {
                return;
            }
            if key_tx.send(KeyInput::up(name)).await.is_err() {
                return;
            }
        }
    }
}

#[cfg(unix)]
async fn control_signals(engine: Arc<Engine>) {
    use tokio::signal::unix::{signal, SignalKind};

    let mut pause = match signal(SignalKind::user_defined1()) {
        Ok(stream) => stream,
        Err(e) => {
            error!("Failed to install SIGUSR1 handler: {}", e);
            return;
        }
    };
    let mut reload = match signal(SignalKind::hangup()) {
        Ok(stream) => stream,
        Err(e) => {
            error!("Failed to install SIGHUP handler: {}", e);
            return;
        }
    };

    loop {
        tokio::select! {
            _ = pause.recv() => {
                engine.set_paused(!engine.is_paused());
            }
            _ = reload.recv() => engine.reload_from_source(),
        }
    }
}

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().compact())
        .init();

    Ok(())
}
