use anyhow::{Context, Result, bail};
use chatpane::events::AppEvent;
use chatpane::llm::{ChatTransport, LlmClient};
use chatpane::terminal::{self, TerminalGuard};
use chatpane::ui::{self, conversation::{ConversationAction, ConversationManager}};
use chatpane::{Config, ViewState};
use clap::{Parser, Subcommand};
use crossterm::event;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::fs::{self, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "chatpane")]
#[command(version)]
#[command(about = "Terminal chat client for a remote chat endpoint", long_about = None)]
struct Cli {
    /// Use this config file instead of ~/.chatpane/config.toml
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Override the chat endpoint for this run
    #[arg(long, global = true, value_name = "URL")]
    endpoint: Option<String>,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one message and print the reply
    Ask { message: String },
    /// Print the effective configuration
    Config,
}

fn init_tracing(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // The terminal UI owns stdout, so logs go to a file.
    let log_dir = Config::home_dir()?;
    fs::create_dir_all(&log_dir).context("Failed to create .chatpane directory")?;
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("chatpane.log"))
        .context("Failed to open log file")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let (config, config_path) = match cli.config {
        Some(path) => (Config::load_from(&path)?, path),
        None => {
            let path = Config::default_path()?;
            (Config::load_or_init(&path)?, path)
        }
    };
    let config = config.with_endpoint(cli.endpoint);

    match cli.command {
        None => run_tui(config).await,
        Some(Commands::Ask { message }) => ask(config, &message).await,
        Some(Commands::Config) => {
            println!("# {}", config_path.display());
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

/// One exchange through the same view transitions the TUI uses
async fn ask(config: Config, message: &str) -> Result<()> {
    let client = LlmClient::new(&config)?;
    let mut state = ViewState::new();
    state.set_input(message);

    let request = state.begin_submit().context("Nothing to send: message is empty")?;
    let reply = client.send(&request).await;
    state.finish_submit(reply);

    if let Some(reply) = state.messages().last() {
        println!("{}", reply.text());
    }
    if let Some(error) = state.error() {
        bail!("{error}");
    }
    Ok(())
}

async fn run_tui(config: Config) -> Result<()> {
    let client = LlmClient::new(&config)?;
    info!(endpoint = client.endpoint(), "starting chat view");
    let mut manager = ConversationManager::new(Arc::new(client), config.ui.clone());

    // Setup terminal for TUI; the guard restores it on every exit path
    terminal::install_panic_hook();
    let _guard = TerminalGuard::enter()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    let tick_rate = Duration::from_millis(config.ui.tick_rate_ms.max(1));
    run_app(&mut terminal, &mut manager, tick_rate).await
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    manager: &mut ConversationManager,
    tick_rate: Duration,
) -> Result<()> {
    let mut ticker = tokio::time::interval(tick_rate);

    loop {
        manager.process_replies();
        terminal.draw(|frame| ui::draw(frame, manager))?;

        // Drain pending input without blocking the runtime
        while event::poll(Duration::ZERO)? {
            let Some(app_event) = AppEvent::from_terminal(event::read()?) else {
                continue;
            };
            if manager.handle_event(app_event) == ConversationAction::Exit {
                return Ok(());
            }
        }

        ticker.tick().await;
        manager.handle_event(AppEvent::Tick);
    }
}
