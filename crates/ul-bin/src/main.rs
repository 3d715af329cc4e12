//! undoline entrypoint: reads a directive script from a file or stdin and
//! writes print output to stdout.
use anyhow::{Context, Result};
use clap::Parser;
use core_actions::{DirectiveReader, Dispatcher, RunSummary};
use core_config::{Config, load_from};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Once;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "undoline", version, about = "Line editor with undo/redo driven by a directive stream")]
struct Args {
    /// Directive script to execute. Reads stdin when omitted.
    pub path: Option<PathBuf>,
    /// Optional configuration file path (overrides discovery of `undoline.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
}

struct AppStartup {
    config: Config,
    log_guard: Option<WorkerGuard>,
}

impl AppStartup {
    fn new(args: &Args) -> Result<Self> {
        let config = load_from(args.config.clone())?;
        Ok(Self {
            config,
            log_guard: None,
        })
    }

    fn configure_logging(&mut self) -> Result<()> {
        let log = &self.config.file.log;
        if !log.enabled {
            return Ok(());
        }
        std::fs::create_dir_all(&log.directory)
            .with_context(|| format!("creating log directory {}", log.directory.display()))?;
        let log_path = self.config.log_path();
        if log_path.exists() {
            let _ = std::fs::remove_file(&log_path);
        }

        let file_appender = tracing_appender::rolling::never(&log.directory, &log.file);
        let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
        match tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_ansi(false)
            .with_writer(nb_writer)
            .try_init()
        {
            Ok(_) => {
                self.log_guard = Some(guard);
            }
            Err(_err) => {
                // Global tracing subscriber already installed; drop guard so writer shuts down.
            }
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
}

fn open_input(path: Option<&PathBuf>) -> Result<Box<dyn BufRead>> {
    match path {
        Some(p) => {
            let file = File::open(p).with_context(|| format!("opening script {}", p.display()))?;
            tracing::debug!(target: "io", file = %p.display(), "script_open_ok");
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(BufReader::new(io::stdin().lock()))),
    }
}

fn execute(config: &Config, input: Box<dyn BufRead>) -> Result<(RunSummary, core_state::HistoryStats)> {
    let mut dispatcher = Dispatcher::from_config(config);
    let mut reader = DirectiveReader::new(input);
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let summary = dispatcher
        .run(&mut reader, &mut out)
        .context("processing directives")?;
    out.flush().context("flushing output")?;
    Ok((summary, dispatcher.state().stats()))
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut startup = AppStartup::new(&args)?;
    startup.configure_logging()?;
    AppStartup::install_panic_hook();

    let script_str = args.path.as_ref().map(|p| p.display().to_string());
    let config_str = startup
        .config
        .source
        .as_ref()
        .map(|p| p.display().to_string());
    info!(
        target: "runtime",
        script = script_str.as_deref(),
        config = config_str.as_deref(),
        "startup"
    );

    let input = open_input(args.path.as_ref())?;
    let (summary, stats) = execute(&startup.config, input)?;
    info!(
        target: "runtime",
        directives = summary.directives,
        skipped = summary.skipped,
        printed = summary.printed,
        quit = summary.quit,
        changes = stats.changes,
        deletes = stats.deletes,
        reconstructions = stats.reconstructions,
        replayed_changes = stats.replayed_changes,
        wiped_entries = stats.wiped_entries,
        "session_complete"
    );
    Ok(())
}
