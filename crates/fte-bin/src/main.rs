//! fte entrypoint.
use anyhow::Result;
use clap::Parser;
use core_config::{ScreenContext, load_from};
use core_input::ReadSource;
use core_render::CrosstermDisplay;
use core_terminal::{CrosstermBackend, TerminalBackend};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Once;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;

mod session;

use session::Session;

const LOG_FILE: &str = "fte.log";

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "fte", version, about = "Foenix text editor")]
struct Args {
    /// Optional configuration file path (overrides discovery of `fte.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
}

struct AppStartup {
    backend: CrosstermBackend,
    log_guard: Option<WorkerGuard>,
}

impl AppStartup {
    fn new() -> Self {
        Self {
            backend: CrosstermBackend::new(),
            log_guard: None,
        }
    }

    fn configure_logging(&mut self) -> Result<()> {
        let log_dir = Path::new(".");
        let log_path = log_dir.join(LOG_FILE);
        if log_path.exists() {
            let _ = std::fs::remove_file(&log_path);
        }

        let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
        let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
        if tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(nb_writer)
            .try_init()
            .is_ok()
        {
            self.log_guard = Some(guard);
        }
        Ok(())
    }

    fn install_panic_hook() {
        static HOOK: Once = Once::new();
        HOOK.call_once(|| {
            let default_panic = std::panic::take_hook();
            std::panic::set_hook(Box::new(move |info| {
                tracing::error!(target: "runtime.panic", ?info, "panic");
                default_panic(info);
            }));
        });
    }

    /// Everything that needs the terminal. The guard restores it on the way
    /// out, error or not.
    fn run_editor(&mut self, args: &Args) -> Result<()> {
        let mut config = load_from(args.config.clone())?;
        self.backend.set_title("fte")?;
        let mut guard = self.backend.enter_guard()?;
        let size = guard.backend().size();
        config.apply_context(ScreenContext::new(size.width, size.height));
        info!(
            target: "runtime",
            config = ?config.path,
            config_override = args.config.is_some(),
            arena_bytes = config.effective_arena_bytes,
            "bootstrap_complete"
        );

        let source = ReadSource::new(std::io::stdin().lock());
        let mut session = Session::start(&config, size, CrosstermDisplay::new(), source)?;
        let result = session.run();
        info!(
            target: "runtime",
            lines = session.state().document().line_count(),
            free_bytes = session.state().document().arena().free_bytes(),
            "session_closed"
        );
        result
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    let mut startup = AppStartup::new();
    if let Err(e) = startup.configure_logging() {
        eprintln!("fte: logging unavailable: {e:#}");
    }
    AppStartup::install_panic_hook();
    info!(target: "runtime", "startup");

    match startup.run_editor(&args) {
        Ok(()) => {
            info!(target: "runtime", "shutdown");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(target: "runtime", error = %format!("{e:#}"), "fatal");
            eprintln!("fte: {e:#}");
            ExitCode::FAILURE
        }
    }
}
