mod render;

use std::process::ExitCode;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use telly_core::config::AppConfig;
use telly_core::error::CoreError;
use telly_runtime::{EngineHandle, Runtime, RuntimeError, ViewState};

#[derive(Parser, Debug)]
#[command(author, version, about = "telly: browse the TVmaze catalog and keep favorites")]
struct Cli {
    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,

    /// Use this database file instead of the configured one.
    #[arg(long)]
    db: Option<String>,

    /// Override the catalog API base URL.
    #[arg(long)]
    api: Option<String>,

    /// Write the effective settings to the user config file and exit.
    #[arg(long)]
    save_config: bool,
}

impl Cli {
    fn has_overrides(&self) -> bool {
        self.db.is_some() || self.api.is_some()
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "telly=debug" } else { "telly=info" })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.save_config {
        return match effective_config(&cli).and_then(|config| config.save()) {
            Ok(path) => {
                println!("saved {}", path.display());
                ExitCode::SUCCESS
            }
            Err(e) => {
                tracing::error!("failed to save config: {e}");
                ExitCode::FAILURE
            }
        };
    }

    let started = if cli.has_overrides() {
        effective_config(&cli)
            .map_err(|e| RuntimeError::Config(e.to_string()))
            .and_then(Runtime::with_config)
    } else {
        Runtime::start()
    };
    let runtime = match started {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("failed to start: {e}");
            return ExitCode::FAILURE;
        }
    };
    println!("catalog: {}", runtime.config().api.base_url);

    let engine = runtime.engine().clone();
    tokio::spawn(watch_view(engine.clone()));
    engine.browse_or_refresh();

    match repl(&engine).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("stdin: {e}");
            ExitCode::FAILURE
        }
    }
}

/// The user config with command-line overrides applied.
fn effective_config(cli: &Cli) -> Result<AppConfig, CoreError> {
    let mut config = AppConfig::load()?;
    if let Some(db) = &cli.db {
        config.storage.db_file = db.clone();
    }
    if let Some(api) = &cli.api {
        config.api.base_url = api.clone();
    }
    Ok(config)
}

/// Print a line for each notable change in the published state.
async fn watch_view(engine: EngineHandle) {
    let mut rx = engine.subscribe();
    let mut last = rx.borrow_and_update().clone();
    while rx.changed().await.is_ok() {
        let view = rx.borrow_and_update().clone();
        render::changes(&last, &view);
        last = view;
    }
}

async fn repl(engine: &EngineHandle) -> std::io::Result<()> {
    render::help();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (cmd, arg) = match line.split_once(char::is_whitespace) {
            Some((cmd, arg)) => (cmd, arg.trim()),
            None => (line, ""),
        };

        match cmd {
            "" => {}
            "browse" | "refresh" => engine.browse_or_refresh(),
            "type" => engine.input_changed(arg),
            "search" => engine.submit_search(arg),
            "genre" => engine.select_genre((!arg.is_empty()).then(|| arg.to_string())),
            "list" | "ls" => render::catalog(&engine.view()),
            "genres" => render::genres(&engine.view()),
            "favorites" | "favs" => render::favorites(&engine.view()),
            "fav" => toggle(engine, arg),
            "detail" | "show" => match parse_id(arg) {
                Some(id) => engine.open_detail(id),
                None => println!("usage: detail <id>"),
            },
            "close" => engine.close_detail(),
            "clear" => engine.clear_error(),
            "help" | "?" => render::help(),
            "quit" | "exit" | "q" => break,
            other => println!("unknown command: {other} (try `help`)"),
        }
    }
    Ok(())
}

/// Toggle the favorite state of an item visible in any view.
fn toggle(engine: &EngineHandle, arg: &str) {
    let Some(id) = parse_id(arg) else {
        println!("usage: fav <id>");
        return;
    };
    let view: ViewState = engine.view();
    match view.find_item(id) {
        Some(item) => engine.toggle_favorite(item.clone()),
        None => println!("no show {id} on screen"),
    }
}

fn parse_id(arg: &str) -> Option<i64> {
    arg.parse().ok()
}
