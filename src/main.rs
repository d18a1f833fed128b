mod app;
mod components;
mod event;
mod handler;
mod theme;
mod tui;
mod ui;

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use clap::Parser;
use tracing::Level;

use instrument_tree::config::{AppConfig, FeedConfig, LogConfig, TreeConfig};
use instrument_tree::error::Result;
use instrument_tree::instruments;

use crate::app::App;
use crate::event::{Event, EventHandler};
use crate::tui::{install_panic_hook, Tui};

/// A terminal viewer for collapsible instrument trees.
#[derive(Parser, Debug)]
#[command(name = "itree", version, about)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Load the tree from a JSON file instead of generating instruments
    #[arg(long)]
    data: Option<PathBuf>,

    /// Start with every branch collapsed
    #[arg(long)]
    collapsed: bool,

    /// Start with streaming refresh enabled
    #[arg(long)]
    stream: bool,

    /// Use fuzzy matching for search
    #[arg(long)]
    fuzzy: bool,

    /// Refresh interval in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Write logs to this file
    #[arg(long)]
    log_file: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    /// Config values given on the command line.
    fn overrides(&self) -> AppConfig {
        AppConfig {
            tree: TreeConfig {
                collapse_by_default: self.collapsed.then_some(true),
                fuzzy: self.fuzzy.then_some(true),
                ..Default::default()
            },
            feed: FeedConfig {
                enabled: self.stream.then_some(true),
                interval_ms: self.interval_ms,
                ..Default::default()
            },
            log: LogConfig {
                file: self.log_file.clone(),
                level: self.log_level.clone(),
            },
            ..Default::default()
        }
    }
}

/// Send logs to the configured file; the terminal belongs to the UI.
fn init_logging(config: &AppConfig) -> Result<()> {
    let Some(path) = config.log_file() else {
        return Ok(());
    };
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let level = config.log_level().parse::<Level>().unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_max_level(level)
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref(), Some(&cli.overrides()));
    init_logging(&config)?;

    let data = cli
        .data
        .as_deref()
        .map(instruments::load_json)
        .transpose()?;
    let theme = theme::resolve_theme(config.theme_scheme());
    let mut app = App::new(&config, data)?;

    install_panic_hook();

    let mut tui = Tui::new()?;
    let mut events = EventHandler::new(
        Duration::from_millis(16),
        Duration::from_millis(config.interval_ms()),
    );

    loop {
        tui.terminal_mut().draw(|frame| {
            ui::render(&mut app, &theme, frame);
        })?;

        match events.next().await? {
            Event::Key(key) => handler::handle_key_event(&mut app, key),
            Event::Tick => app.clear_expired_status(),
            Event::Resize(_, _) => {}
            Event::Refresh => app.handle_refresh(),
        }

        if app.should_quit {
            break;
        }
    }

    app.tree.dispose();
    tui.restore()?;
    Ok(())
}
