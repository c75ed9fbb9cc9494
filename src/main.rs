//! cmddeck - launcher for saved shell commands

mod app;
mod constants;
mod runner;
mod store;
mod ui;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::App;
use runner::{RunOutcome, RunnerMessage};
use store::CommandStore;

/// Launcher for saved shell commands
#[derive(Parser)]
#[command(name = "cmddeck")]
#[command(version)]
#[command(about = "Store shell commands, run them on demand, watch output inline")]
struct Cli {
    /// Data directory holding the command database (defaults to the
    /// platform data dir)
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the saved commands
    List,
    /// Save a new command
    Add {
        /// Display name
        name: String,
        /// Shell command line to store
        command: String,
    },
    /// Run a saved command by name, streaming output to stdout
    Run {
        /// Name of the saved command
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let data_dir = cli.data_dir.clone().unwrap_or_else(constants::data_dir);

    // Set up logging to file; the terminal belongs to the TUI
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;
    let file_appender = tracing_appender::rolling::daily(&data_dir, "cmddeck.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    tracing::info!("cmddeck starting");

    // Without durable storage there is nothing to do; the store reports the
    // failure and the application layer decides it is fatal.
    let store = CommandStore::open(&data_dir)
        .with_context(|| format!("Failed to open command store in {}", data_dir.display()))?;

    match cli.command {
        Some(Commands::List) => list_commands(&store),
        Some(Commands::Add { name, command }) => add_command(&store, name, command),
        Some(Commands::Run { name }) => run_headless(&store, &name).await,
        None => run_tui(store).await,
    }
}

fn list_commands(store: &CommandStore) -> Result<()> {
    let commands = store.list_commands()?;
    if commands.is_empty() {
        println!("No commands saved.");
        return Ok(());
    }
    for command in commands {
        println!(
            "{:>4}  {:24}  {}",
            command.id.unwrap_or_default(),
            command.name,
            command.command
        );
    }
    Ok(())
}

fn add_command(store: &CommandStore, name: String, command: String) -> Result<()> {
    anyhow::ensure!(!name.trim().is_empty(), "name cannot be empty");
    anyhow::ensure!(!command.trim().is_empty(), "command cannot be empty");

    let saved = store.insert_command(store::Command::new(name, command))?;
    println!(
        "Saved '{}' (id {})",
        saved.name,
        saved.id.unwrap_or_default()
    );
    Ok(())
}

/// Run one stored command without the TUI, forwarding output to stdout and
/// exiting with the child's status.
async fn run_headless(store: &CommandStore, name: &str) -> Result<()> {
    let commands = store.list_commands()?;
    let command = commands
        .iter()
        .find(|c| c.name == name)
        .with_context(|| format!("No command named '{}'", name))?;
    let shell = store.settings()?.shell;

    let (tx, mut rx) = mpsc::channel(constants::RUNNER_CHANNEL_SIZE);
    let _handle = runner::spawn_run(tx, 1, &shell, &command.command);

    use std::io::Write;
    let mut stdout = io::stdout();
    while let Some(msg) = rx.recv().await {
        match msg {
            RunnerMessage::Chunk { text, .. } => {
                stdout.write_all(text.as_bytes())?;
                stdout.flush()?;
            }
            RunnerMessage::Exit { outcome, .. } => match outcome {
                RunOutcome::Exited { code: Some(0) } => return Ok(()),
                RunOutcome::Exited { code } => std::process::exit(code.unwrap_or(1)),
                RunOutcome::Killed => std::process::exit(130),
                RunOutcome::Failed { error } => anyhow::bail!(error),
            },
        }
    }
    Ok(())
}

async fn run_tui(store: CommandStore) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app state and the channel runs report back on
    let mut app = App::new(store);
    let (runner_tx, mut runner_rx) =
        mpsc::channel::<RunnerMessage>(constants::RUNNER_CHANNEL_SIZE);
    app.set_runner_sender(runner_tx);

    // Run the app
    let result = run_app(&mut terminal, &mut app, &mut runner_rx).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
        return Err(err);
    }

    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    runner_rx: &mut mpsc::Receiver<RunnerMessage>,
) -> Result<()> {
    // Create async event stream for responsive input
    let mut event_stream = EventStream::new();

    loop {
        // Draw UI
        terminal.draw(|frame| ui::draw(frame, app))?;

        let timeout = Duration::from_millis(constants::EVENT_POLL_TIMEOUT_MS);

        tokio::select! {
            biased;  // Prioritize in order: keys, runner output, timeout

            // Terminal key events (instant response)
            Some(Ok(event)) = event_stream.next() => {
                if let Event::Key(key) = event {
                    if key.kind == KeyEventKind::Press {
                        app.handle_key(key.code);
                    }
                }
            }
            // Output and exits from running commands
            Some(msg) = runner_rx.recv() => {
                app.handle_runner_message(msg);
            }
            // Timeout for spinner animation and redraw
            _ = tokio::time::sleep(timeout) => {}
        }

        // Update spinner animation
        app.tick();

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
