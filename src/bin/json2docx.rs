//! CLI binary for edgequake-json2docx.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and writes the package to a file or stdout.

use anyhow::{bail, Context, Result};
use clap::Parser;
use edgequake_json2docx::convert::write_atomic;
use edgequake_json2docx::{
    convert, BlockOutcome, ConversionConfig, ConversionProgressCallback, ConversionStats,
    InlineMode, ProgressCallback,
};
use serde::Serialize;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback ────────────────────────────────────────────────────

/// Reports skipped blocks on stderr as they happen; the document itself may
/// be going to stdout.
struct CliProgressCallback {
    skipped: AtomicUsize,
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_block_skipped(&self, index: usize, total: usize, error: &str) {
        self.skipped.fetch_add(1, Ordering::SeqCst);

        // Truncate very long error messages to keep output tidy.
        let msg: String = if error.chars().count() > 100 {
            let head: String = error.chars().take(99).collect();
            format!("{head}\u{2026}")
        } else {
            error.to_string()
        };
        eprintln!(
            "  {} Block {:>3}/{:<3}  {}",
            red("✗"),
            index + 1,
            total,
            red(&msg)
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # File in, file out
  json2docx note.json -o note.docx

  # Inline JSON, DOCX bytes on stdout
  json2docx '{"blocks":[{"type":"paragraph","data":{"text":"Hi <b>there</b>"}}]}' > hi.docx

  # Read the document from stdin
  cat note.json | json2docx - -o note.docx

  # Fail if any block had to be skipped, print a JSON report
  json2docx --strict --json note.json -o note.docx

INPUT:
  An object with a "blocks" array. Each block is {"type": ..., "data": {...}}.
  Supported types: header, paragraph, list, checklist, quote, warning, code,
  delimiter, table, image (data:image/... URLs only).

ENVIRONMENT VARIABLES:
  JSON2DOCX_OUTPUT          Default output path
  JSON2DOCX_INLINE_MODE     last-tag-wins (default) or nested
  JSON2DOCX_IMAGE_WIDTH     Image box width in inches (default 6)
  JSON2DOCX_IMAGE_HEIGHT    Image box height in inches (default 8)
  JSON2DOCX_FALLBACK_DPI    Resolution for images without one (default 96)
  RUST_LOG                  Overrides --verbose / --quiet log filtering
"#;

/// Convert block-structured JSON documents to DOCX.
#[derive(Parser, Debug)]
#[command(
    name = "json2docx",
    version,
    about = "Convert block-structured JSON documents (Editor.js style) to DOCX",
    long_about = "Convert a block-structured JSON document (headers, paragraphs, lists, \
checklists, quotes, warnings, code, tables, images) to a Word document. Inline <b>, <i>, <u>, \
<code>, <mark> and <a href> markup is preserved as formatting and working hyperlinks.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Inline JSON, a path to a JSON file, or `-` for stdin.
    input: String,

    /// Write the DOCX to this file instead of stdout.
    #[arg(short, long, env = "JSON2DOCX_OUTPUT")]
    output: Option<PathBuf>,

    /// How overlapping inline tags combine.
    #[arg(long, env = "JSON2DOCX_INLINE_MODE", value_enum, default_value = "last-tag-wins")]
    inline_mode: InlineModeArg,

    /// Maximum image width in inches.
    #[arg(long, env = "JSON2DOCX_IMAGE_WIDTH", default_value_t = 6.0)]
    image_width: f64,

    /// Maximum image height in inches.
    #[arg(long, env = "JSON2DOCX_IMAGE_HEIGHT", default_value_t = 8.0)]
    image_height: f64,

    /// Resolution assumed for images that declare none (1–2400).
    #[arg(long, env = "JSON2DOCX_FALLBACK_DPI", default_value_t = 96.0)]
    fallback_dpi: f64,

    /// Do not bold the first row of tables marked `withHeadings`.
    #[arg(long, env = "JSON2DOCX_NO_TABLE_HEADINGS")]
    no_table_headings: bool,

    /// Exit with an error, and write nothing, if any block was skipped.
    #[arg(long, env = "JSON2DOCX_STRICT")]
    strict: bool,

    /// Print a JSON report (stats and per-block outcomes) to stdout.
    #[arg(long, env = "JSON2DOCX_JSON", requires = "output")]
    json: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "JSON2DOCX_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "JSON2DOCX_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum InlineModeArg {
    LastTagWins,
    Nested,
}

impl From<InlineModeArg> for InlineMode {
    fn from(v: InlineModeArg) -> Self {
        match v {
            InlineModeArg::LastTagWins => InlineMode::LastTagWins,
            InlineModeArg::Nested => InlineMode::Nested,
        }
    }
}

/// Shape of the `--json` report.
#[derive(Serialize)]
struct Report<'a> {
    output: &'a PathBuf,
    stats: &'a ConversionStats,
    blocks: &'a [BlockOutcome],
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    if cli.output.is_none() && io::stdout().is_terminal() {
        bail!("Refusing to write binary DOCX data to a terminal; use -o <FILE> or redirect stdout");
    }

    // ── Build config ─────────────────────────────────────────────────────
    let reporter = Arc::new(CliProgressCallback {
        skipped: AtomicUsize::new(0),
    });
    let progress_cb: Option<ProgressCallback> = if cli.quiet {
        None
    } else {
        Some(reporter.clone() as Arc<dyn ConversionProgressCallback>)
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Run conversion ───────────────────────────────────────────────────
    let output = convert(&cli.input, &config).context("Conversion failed")?;
    let output = if cli.strict {
        output
            .into_result()
            .context("Strict mode: no output written")?
    } else {
        output
    };

    if let Some(ref output_path) = cli.output {
        write_atomic(output_path, &output.bytes)
            .with_context(|| format!("Failed to write {}", output_path.display()))?;

        if cli.json {
            let report = Report {
                output: output_path,
                stats: &output.stats,
                blocks: &output.blocks,
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("Failed to serialise report")?
            );
        }
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(&output.bytes)
            .and_then(|_| handle.flush())
            .context("Failed to write to stdout")?;
    }

    // ── Summary ──────────────────────────────────────────────────────────
    if !cli.quiet {
        let stats = &output.stats;
        let target = cli
            .output
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "stdout".into());
        eprintln!(
            "{}  {}/{} blocks  {}  {}ms  →  {}",
            if stats.skipped_blocks == 0 {
                green("✔")
            } else {
                cyan("⚠")
            },
            stats.rendered_blocks,
            stats.total_blocks,
            dim(&format!("{} images", stats.images_embedded)),
            stats.duration_ms,
            bold(&target),
        );
        let seen = reporter.skipped.load(Ordering::SeqCst);
        if seen > 0 {
            eprintln!("   {} blocks skipped", red(&seen.to_string()));
        }
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .inline_mode(cli.inline_mode.into())
        .image_box(cli.image_width, cli.image_height)
        .fallback_dpi(cli.fallback_dpi)
        .table_headings(!cli.no_table_headings);

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
