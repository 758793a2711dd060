//! Beeper Entry Point
//!
//! Subscribes to a Jetstream endpoint, beeps on every watched commit and
//! shows the last ten seconds of notifications.
//!
//! Usage:
//!   beeper [OPTIONS]
//!
//! Options:
//!   --endpoint <URL>            Jetstream websocket endpoint
//!   --sound <FILE>              Alert sound (WAV)
//!   --cursor <POLICY>           fixed | advance
//!   --reconnect-delay-ms <MS>   First reconnect delay (0 = immediate)
//!   --log-file <FILE>           Where logs go (the terminal belongs to the UI)
//!
//! Every option falls back to its environment variable (`JS_SERVER_ADDR`,
//! `BEEPER_SOUND`, `BEEPER_CURSOR`, `BEEPER_RECONNECT_DELAY_MS`,
//! `BEEPER_LOG`), then to the built-in default. A malformed value given on
//! the command line or through one of those variables is rejected by clap;
//! the remaining `BEEPER_*` settings are read by `BeeperConfig::from_env`.
//!
//! # Signals
//!
//! - `q` / Ctrl-C in the UI: exit
//! - `SIGTERM` / `SIGINT`: stop the event stream (the UI stays up)

use std::fs;
use std::io::{self, IsTerminal};
use std::panic;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use beeper_core::{
    ui_channel, AlertSound, BeeperConfig, CursorPolicy, NotificationSystem, ReconnectLoop,
    StreamCursor, UiReceiver, WebSocketSource,
};
use beeper_tui::speaker::open_player;
use beeper_tui::ticker::spawn_ticker;
use beeper_tui::App;

/// How long the consume loop gets to close its connection after the UI exits
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Beeper - beeps when watched Jetstream records are written
#[derive(Parser, Debug)]
#[command(name = "beeper")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Jetstream websocket endpoint
    #[arg(short = 'e', long, env = "JS_SERVER_ADDR", value_name = "URL")]
    endpoint: Option<String>,

    /// Alert sound (WAV)
    #[arg(short = 's', long, env = "BEEPER_SOUND", value_name = "FILE")]
    sound: Option<PathBuf>,

    /// Reconnect cursor policy (fixed, advance)
    #[arg(long, env = "BEEPER_CURSOR", value_name = "POLICY")]
    cursor: Option<CursorPolicy>,

    /// Delay before the first reconnect attempt, in milliseconds
    #[arg(long, env = "BEEPER_RECONNECT_DELAY_MS", value_name = "MS")]
    reconnect_delay_ms: Option<u64>,

    /// Log file path
    #[arg(long, env = "BEEPER_LOG", value_name = "FILE")]
    log_file: Option<PathBuf>,
}

impl Args {
    /// Layer command-line overrides on top of `config`
    fn apply(self, mut config: BeeperConfig) -> BeeperConfig {
        if let Some(endpoint) = self.endpoint {
            config.endpoint = endpoint;
        }
        if let Some(sound) = self.sound {
            config.sound_path = sound;
        }
        if let Some(cursor) = self.cursor {
            config.cursor_policy = cursor;
        }
        if let Some(delay) = self.reconnect_delay_ms {
            config.reconnect.initial_delay_ms = delay;
        }
        if let Some(log_file) = self.log_file {
            config.log_path = Some(log_file);
        }
        config
    }
}

/// Send logs to `path`; `RUST_LOG` overrides the default filter
fn init_logging(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {parent:?}"))?;
    }
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file: {path:?}"))?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("beeper=info,beeper_core=info,beeper_tui=info"));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Arc::new(file))
                .with_ansi(false)
                .with_target(true),
        )
        .with(filter)
        .init();

    Ok(())
}

/// Run the reconnect loop until `shutdown` fires
fn spawn_consumer(
    config: &BeeperConfig,
    notifier: NotificationSystem,
    shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    let source = WebSocketSource::new(config.endpoint.clone(), config.collections.clone());
    let mut cursor = StreamCursor::backfill_from_now(config.backfill(), config.cursor_policy);
    let policy = config.reconnect.clone();

    tokio::spawn(async move {
        let mut consume = ReconnectLoop::new(source, policy);
        let stats = consume.run(&mut cursor, &notifier, shutdown).await;
        info!(
            sessions = stats.sessions,
            failures = stats.failures,
            closes = stats.closes,
            processed = cursor.processed(),
            "Consume loop stopped"
        );
    })
}

/// Flip `shutdown` on SIGTERM / SIGINT
fn spawn_signal_handler(shutdown: watch::Sender<bool>) -> JoinHandle<()> {
    tokio::spawn(async move {
        wait_for_signal().await;
        let _ = shutdown.send(true);
    })
}

async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => info!("Received SIGTERM, stopping event stream"),
                    _ = interrupt() => {}
                }
                return;
            }
            Err(e) => warn!(error = %e, "Failed to install SIGTERM handler"),
        }
    }
    interrupt().await;
}

async fn interrupt() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received SIGINT, stopping event stream"),
        Err(e) => {
            warn!(error = %e, "Failed to install SIGINT handler");
            std::future::pending::<()>().await;
        }
    }
}

/// Take over the terminal, run the UI loop, give the terminal back
async fn run_ui(config: &BeeperConfig, inbox: UiReceiver) -> Result<()> {
    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut app = App::new(inbox, config);
    let result = app.run(&mut terminal).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = args.apply(BeeperConfig::from_env());

    init_logging(&config.log_file())?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        endpoint = %config.endpoint,
        cursor = %config.cursor_policy,
        "Beeper starting"
    );

    // Audio problems are fatal and must surface before the UI takes over
    let sound = AlertSound::load(&config.sound_path)
        .with_context(|| format!("Failed to load alert sound {:?}", config.sound_path))?;
    let (_audio, player) = open_player(sound).context("Failed to initialize audio output")?;

    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        anyhow::bail!("beeper requires a terminal (TTY); stdin/stdout look redirected");
    }

    let (ui_tx, ui_rx) = ui_channel();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let ticker = spawn_ticker(ui_tx.clone(), config.tick_interval());
    let consumer = spawn_consumer(
        &config,
        NotificationSystem::new(player, ui_tx),
        shutdown_rx,
    );
    let signals = spawn_signal_handler(shutdown_tx.clone());

    let result = run_ui(&config, ui_rx).await;

    // UI is gone: stop producing
    let _ = shutdown_tx.send(true);
    ticker.abort();
    signals.abort();
    if tokio::time::timeout(SHUTDOWN_GRACE, consumer).await.is_err() {
        warn!("Consume loop did not stop in time");
    }

    match result {
        Ok(()) => {
            info!("Beeper stopped cleanly");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Beeper stopped with error");
            Err(e)
        }
    }
}
