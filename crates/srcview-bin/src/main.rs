//! srcview entrypoint: a headless driver for the source-view engine.
//!
//! Opens a source file, applies the requested expansions, markers and search,
//! answers disassembly requests from a listing file and prints the resulting
//! display rows.
use anyhow::{Context, Result, bail};
use clap::Parser;
use core_actions::{FindDirection, SourceView, ViewSettings};
use core_events::{
    Address, BreakpointInfo, DISASSEMBLY_REQUESTS, DebuggerEvent, NOTIFICATION_SEND_FAILURES,
    NOTIFICATIONS_SENT, SourceNotification,
};
use std::io::stdout;
use std::path::{Path, PathBuf};
use std::sync::Once;
use std::sync::atomic::Ordering;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;

mod dump;
mod listing;

use dump::RowPrinter;
use listing::{Listing, parse_address};

const LOG_FILE: &str = "srcview.log";

/// CLI arguments. Line numbers are 1-based.
#[derive(Parser, Debug)]
#[command(name = "srcview", version, about = "Source view with inline disassembly")]
struct Args {
    /// Source file to display.
    pub path: PathBuf,
    /// Configuration file path (overrides discovery of `srcview.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Disassembly listing answering expansion requests (`LINE ADDRESS TEXT` per line).
    #[arg(long = "disasm")]
    pub disasm: Option<PathBuf>,
    /// Expand a line (repeatable).
    #[arg(long = "expand", value_name = "LINE")]
    pub expand: Vec<usize>,
    /// Expand every line present in the listing.
    #[arg(long = "expand-all")]
    pub expand_all: bool,
    /// Set a breakpoint marker on a line (repeatable).
    #[arg(long = "break", value_name = "LINE")]
    pub breakpoints: Vec<usize>,
    /// Program counter of the innermost frame: `LINE` or `LINE:ADDRESS`.
    #[arg(long = "pc", value_name = "LINE[:ADDRESS]", value_parser = parse_pc)]
    pub pc: Option<(usize, Option<Address>)>,
    /// Select the first match of TEXT after the cursor.
    #[arg(long = "find", value_name = "TEXT")]
    pub find: Option<String>,
    /// Match case when searching (default comes from the config file).
    #[arg(long = "case-sensitive")]
    pub case_sensitive: bool,
    /// Ignore case when searching, even if the config file enables it.
    #[arg(long = "ignore-case", conflicts_with = "case_sensitive")]
    pub ignore_case: bool,
    #[arg(long = "backward")]
    pub backward: bool,
    /// Print only a viewport of this many rows around the cursor.
    #[arg(long = "height")]
    pub height: Option<usize>,
    #[arg(long = "tab-width")]
    pub tab_width: Option<usize>,
    #[arg(long = "no-color")]
    pub no_color: bool,
}

impl Args {
    /// Case sensitivity requested on the command line, if any.
    fn case_override(&self) -> Option<bool> {
        if self.case_sensitive {
            Some(true)
        } else if self.ignore_case {
            Some(false)
        } else {
            None
        }
    }
}

fn parse_pc(value: &str) -> Result<(usize, Option<Address>)> {
    let (line, address) = match value.split_once(':') {
        Some((line, addr)) => (line, Some(parse_address(addr)?)),
        None => (value, None),
    };
    let line: usize = line.parse().with_context(|| format!("bad line number {line:?}"))?;
    Ok((line, address))
}

fn zero_based(line: usize) -> Result<usize> {
    match line.checked_sub(1) {
        Some(l) => Ok(l),
        None => bail!("line numbers start at 1"),
    }
}

fn configure_logging() -> Option<WorkerGuard> {
    let log_dir = Path::new(".");
    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(nb_writer)
        .with_ansi(false)
        .try_init()
    {
        Ok(_) => Some(guard),
        // Subscriber already installed; dropping the guard shuts the writer down.
        Err(_) => None,
    }
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

/// Stand-in for the debugger: answers each disassembly request from the
/// listing. Clicks and expansion notices are only logged.
fn spawn_responder(
    listing: Listing,
    mut notes: mpsc::UnboundedReceiver<SourceNotification>,
    events: mpsc::UnboundedSender<DebuggerEvent>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(note) = notes.recv().await {
            match note {
                SourceNotification::DisassembleRequested(line) => {
                    let code = listing.block(line);
                    if events.send(DebuggerEvent::Disassembled { line, code }).is_err() {
                        break;
                    }
                }
                other => tracing::debug!(target: "runtime.events", ?other, "notification"),
            }
        }
    })
}

/// Flush the view's notifications until every disassembly request has been answered.
async fn settle(
    view: &mut SourceView,
    notes: &mut mpsc::UnboundedSender<SourceNotification>,
    events: &mut mpsc::UnboundedReceiver<DebuggerEvent>,
) -> Result<()> {
    loop {
        let requests = view
            .pending_notifications()
            .iter()
            .filter(|n| matches!(n, SourceNotification::DisassembleRequested(_)))
            .count();
        view.flush_notifications(notes);
        if requests == 0 {
            return Ok(());
        }
        for _ in 0..requests {
            let Some(event) = events.recv().await else {
                bail!("disassembly responder stopped");
            };
            view.handle_debugger_event(event);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = configure_logging();
    install_panic_hook();
    info!(target: "runtime", "startup");

    let config = core_config::load_from(args.config.clone())?;
    let text = std::fs::read_to_string(&args.path)
        .with_context(|| format!("failed to read {}", args.path.display()))?;
    let listing = match &args.disasm {
        Some(path) => Listing::load(path)?,
        None => Listing::default(),
    };

    let height = args.height.unwrap_or(24);
    let settings = ViewSettings::from_config(&config, height);
    let file_name = args.path.to_string_lossy().into_owned();
    let mut view = SourceView::new(file_name.clone(), &text, settings)?;
    if let Some(width) = args.tab_width {
        view.set_tab_width(width);
    }
    info!(
        target: "runtime.startup",
        file = file_name.as_str(),
        lines = view.line_count(),
        config = ?config.path,
        "bootstrap_complete"
    );

    let (mut note_tx, note_rx) = mpsc::unbounded_channel();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let mut targets: Vec<usize> = Vec::new();
    if args.expand_all {
        targets.extend(listing.lines());
    }
    for line in &args.expand {
        targets.push(zero_based(*line)?);
    }
    let responder = spawn_responder(listing, note_rx, event_tx);
    for line in targets {
        view.expand(line);
    }
    settle(&mut view, &mut note_tx, &mut event_rx).await?;

    let breakpoints = args
        .breakpoints
        .iter()
        .map(|&line| Ok(BreakpointInfo::new(file_name.clone(), zero_based(line)?)))
        .collect::<Result<Vec<_>>>()?;
    view.handle_debugger_event(DebuggerEvent::Breakpoints(breakpoints));
    if let Some((line, address)) = args.pc {
        let line = zero_based(line)?;
        view.handle_debugger_event(DebuggerEvent::ProgramCounter {
            line,
            address,
            frame: 0,
            set: true,
        });
        view.scroll_to(line, address);
    }

    if let Some(needle) = &args.find {
        let direction = if args.backward {
            FindDirection::Backward
        } else {
            FindDirection::Forward
        };
        let case_sensitive = args.case_override().unwrap_or(view.settings().case_sensitive);
        if view.find(needle, case_sensitive, direction).is_none() {
            warn!(target: "runtime", needle = needle.as_str(), "pattern_not_found");
            eprintln!("srcview: pattern not found: {needle}");
        }
    }

    let rows = match args.height {
        Some(_) => {
            let viewport = view.viewport();
            viewport.rows().start..viewport.rows().end.min(view.row_count())
        }
        None => 0..view.row_count(),
    };
    let printer = RowPrinter::new(&view, !args.no_color);
    printer.write_rows(&mut stdout().lock(), &view, rows)?;

    drop(note_tx);
    responder.await.context("responder task failed")?;
    info!(
        target: "runtime",
        sent = NOTIFICATIONS_SENT.load(Ordering::Relaxed),
        failures = NOTIFICATION_SEND_FAILURES.load(Ordering::Relaxed),
        disassembly_requests = DISASSEMBLY_REQUESTS.load(Ordering::Relaxed),
        "shutdown"
    );
    Ok(())
}
