//! formdraft - login and signup forms in the terminal
//!
//! Validates fields as you type and keeps a draft of the configured fields
//! so an interrupted session picks up where it left off.

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use formdraft::app::App;
use formdraft::config::FormsConfig;
use formdraft::draft::{DraftStorage, FileStorage, MemoryStorage};
use formdraft::state::FormKind;
use formdraft::ui;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Frame interval while idle
const TICK: Duration = Duration::from_millis(16);

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Keep drafts in memory only
    #[arg(long)]
    ephemeral: bool,

    /// Draft storage file (overrides config and FORMDRAFT_STORAGE_PATH)
    #[arg(long)]
    storage: Option<PathBuf>,

    /// Start on the signup form
    #[arg(long)]
    signup: bool,
}

fn open_storage(args: &Args, config: &FormsConfig) -> Arc<dyn DraftStorage> {
    if args.ephemeral {
        tracing::info!("Using in-memory draft storage");
        return Arc::new(MemoryStorage::new());
    }
    match args.storage.clone().or_else(|| config.storage_path()) {
        Some(path) => {
            tracing::info!("Using draft storage at {}", path.display());
            Arc::new(FileStorage::new(path))
        }
        None => {
            tracing::warn!("No data directory available, drafts will not outlive this session");
            Arc::new(MemoryStorage::new())
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "formdraft=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = FormsConfig::load().context("failed to load config")?;
    let storage = open_storage(&args, &config);

    let mut app = App::new(storage, config);
    if args.signup {
        app.open(FormKind::Signup);
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Handle any errors
    if let Err(err) = result {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }

    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|frame| ui::draw(frame, app))?;

        // Pending async rules get one frame to show as pending
        if app.form.controls().has_pending() {
            app.settle_validation().await;
            continue;
        }

        // Never block the runtime; the draft observer runs on this thread
        if event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key).await?;
                }
            }
        } else {
            tokio::time::sleep(TICK).await;
        }

        if app.should_quit() {
            return Ok(());
        }
    }
}
