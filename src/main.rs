// replterm: interactive session manager for sandboxed language runtimes

use std::fs;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;

use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use replterm::config::Config;
use replterm::interpreter::process::ProcessInterpreter;
use replterm::logging;
use replterm::session::Session;
use replterm::ui::App;

/// Interactive session manager for a sandboxed language runtime.
#[derive(Parser)]
#[command(name = "replterm", version, about)]
struct Cli {
    /// Source file to preload into the editor.
    file: Option<PathBuf>,

    /// Configuration file (default: <config dir>/replterm/config.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Package to install and attach at startup, overriding the configuration.
    #[arg(short, long)]
    package: Option<String>,

    /// Skip installing the package; only attach it.
    #[arg(long)]
    no_install: bool,

    /// Directory for the log file (default: <cache dir>/replterm).
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let log_dir = cli.log_dir.clone().unwrap_or_else(|| {
        dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("replterm")
    });
    let _log_guard = logging::init(&log_dir)?;

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(package) = cli.package {
        config.bootstrap.package = Some(package);
        config.bootstrap.install = true;
    }
    if cli.no_install {
        config.bootstrap.install = false;
    }

    let source = match &cli.file {
        Some(path) => fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {}", path.display(), e))?,
        None => String::new(),
    };

    tracing::info!(program = %config.runtime.program, "starting replterm");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let local = tokio::task::LocalSet::new();

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = local.block_on(&runtime, async {
        let interpreter = ProcessInterpreter::new(config.runtime.clone());
        let session = Rc::new(Session::new(interpreter, config.graphics));

        // Bootstrap in the background so the status bar can show each stage
        let bootstrap_session = Rc::clone(&session);
        let bootstrap = config.bootstrap.clone();
        tokio::task::spawn_local(async move {
            // Failures are recorded in the session status and output log
            let _ = bootstrap_session.bootstrap(&bootstrap).await;
        });

        let mut app = App::new(session, &source);
        app.run(&mut terminal).await
    });

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}
