//! Previewsync diagnostic entrypoint.
//!
//! Loads a JSON layout snapshot of a rendered preview, then reports the line
//! map and the scroll offset each requested source line resolves to, applying
//! the scrolls in order the way a host would on "cursor moved to line N".
use anyhow::{Context, Result};
use clap::Parser;
use core_config::{Config, load_from};
use core_document::{Edge, RenderedDocument, SnapshotDocument, measure};
use core_linemap::{LineMapper, LineMapperOptions, Resolution, ResolutionKind};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "previewsync", version, about = "Preview scroll sync diagnostics")]
struct Args {
    /// JSON layout snapshot of the rendered preview.
    pub snapshot: PathBuf,
    /// Source line to scroll to (repeatable, applied in order).
    #[arg(long = "line", short = 'l')]
    pub lines: Vec<u32>,
    /// Print the line map before resolving lines.
    #[arg(long = "dump-map")]
    pub dump_map: bool,
    /// Optional configuration file path (overrides discovery of `previewsync.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
}

fn open_log_appender(log_dir: &Path, file_name: &str) -> Result<RollingFileAppender> {
    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(log_dir)
        .with_context(|| format!("opening log file {}", log_dir.join(file_name).display()))
}

/// File logging is best effort: when the log file can't be opened the run
/// continues without a subscriber and the reason goes to stderr.
fn configure_logging(log_dir: &Path, file_name: &str) -> Option<WorkerGuard> {
    let file_appender = match open_log_appender(log_dir, file_name) {
        Ok(appender) => appender,
        Err(e) => {
            eprintln!("previewsync: file logging disabled: {e:#}");
            return None;
        }
    };
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_ansi(false)
        .with_writer(nb_writer)
        .try_init()
    {
        Ok(_) => Some(guard),
        // Global tracing subscriber already installed; drop guard so writer shuts down.
        Err(_err) => None,
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

fn describe(kind: ResolutionKind) -> String {
    match kind {
        ResolutionKind::Exact => "exact".to_string(),
        ResolutionKind::Interpolated { prev, next } => format!("interpolated({prev}..{next})"),
        ResolutionKind::Nearest { line } => format!("nearest({line})"),
    }
}

fn dump_map<D: RenderedDocument, W: Write>(mapper: &LineMapper<D>, out: &mut W) -> Result<()> {
    writeln!(out, "# line\telement\ttop")?;
    for (line, element) in mapper.line_map().iter() {
        match measure(mapper.document(), element, Edge::Top) {
            Some(top) => writeln!(out, "{line}\t{element}\t{top}")?,
            None => writeln!(out, "{line}\t{element}\t-")?,
        }
    }
    Ok(())
}

fn sync_lines<D: RenderedDocument, W: Write>(
    mapper: &mut LineMapper<D>,
    lines: &[u32],
    out: &mut W,
) -> Result<()> {
    for &line in lines {
        match mapper.resolve(line) {
            Some(Resolution { position, kind }) => {
                mapper.scroll_to_position(position);
                writeln!(
                    out,
                    "{line}\t{position}\t{}\t{}",
                    describe(kind),
                    mapper.document().scroll_y()
                )?;
            }
            None => {
                warn!(target: "runtime", line, "line_not_resolved");
                writeln!(out, "{line}\tnot-found\t-\t{}", mapper.document().scroll_y())?;
            }
        }
    }
    Ok(())
}

fn run<W: Write>(args: &Args, config: &Config, out: &mut W) -> Result<()> {
    let document = SnapshotDocument::load(&args.snapshot)?;
    let mut mapper = LineMapper::with_options(document, LineMapperOptions::from(config));

    info!(
        target: "runtime",
        snapshot = %args.snapshot.display(),
        attribute = mapper.options().attribute.as_str(),
        interpolate = mapper.options().interpolate,
        mapped_lines = mapper.line_map().len(),
        "snapshot_loaded"
    );

    if args.dump_map {
        dump_map(&mapper, out)?;
    }
    sync_lines(&mut mapper, &args.lines, out)?;
    out.flush().context("flushing output")?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_from(args.config.clone())?;
    let _log_guard = configure_logging(Path::new("."), config.log_file());
    install_panic_hook();
    let config_path = config.source.as_ref().map(|p| p.display().to_string());
    info!(target: "runtime", config = config_path.as_deref(), "startup");
    // Parse failures happen before the subscriber exists; report them now.
    if let Some(error) = config.parse_error.as_deref() {
        warn!(target: "config", error, "config_parse_failed_using_defaults");
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let result = run(&args, &config, &mut out);
    if let Err(e) = &result {
        tracing::error!(target: "runtime", error = %format!("{e:#}"), "run_failed");
    }
    info!(target: "runtime", "shutdown");
    result
}
