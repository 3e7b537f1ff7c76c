//! CLI binary for photoroster.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `RosterConfig` and prints a summary.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use photoroster::{
    build_roster, CompilerConfig, ProgressCallback, RosterConfig, RosterProgressCallback,
    SortKey, StudentRecord,
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers ──────────────────────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
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

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress: one bar tick per input document, one log line per
/// document with the number of students found.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Students found in the current document.
    current: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  [{bar:32.green/238}] {pos}/{len} files  {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ")
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_prefix("Extracting");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self {
            bar,
            current: AtomicUsize::new(0),
        })
    }
}

impl RosterProgressCallback for CliProgressCallback {
    fn on_run_start(&self, total_documents: usize) {
        self.bar.set_length(total_documents as u64);
    }

    fn on_document_start(&self, _index: usize, _total: usize, path: &Path) {
        self.current.store(0, Ordering::SeqCst);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.bar.set_message(name);
    }

    fn on_record_extracted(&self, record: &StudentRecord) {
        let n = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.bar.set_message(format!("{n} students · {}", record.name));
    }

    fn on_document_complete(&self, index: usize, total: usize, records: usize) {
        self.bar.println(format!(
            "  {} File {:>2}/{:<2}  {}",
            if records > 0 { green("✓") } else { cyan("⚠") },
            index,
            total,
            dim(&format!("{records} students")),
        ));
        self.bar.inc(1);
    }

    fn on_run_complete(&self, records: usize, pages: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} students laid out on {} page(s); compiling…",
            cyan("◆"),
            bold(&records.to_string()),
            pages
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # One page with everyone, sorted by given name
  photoroster roster.pdf

  # Two sections, surname order, at most 30 photos per page
  photoroster --sort-lastname --max-per-page 30 sec1.pdf sec2.pdf -o class.pdf

  # Spread over 3 pages and keep the .tex and photos for editing
  photoroster --n-pages 3 --save-files roster.pdf

  # Machine-readable summary
  photoroster --json roster.pdf > roster.json

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH         Path to libpdfium (file or directory)
  RUST_LOG                Override log filter, e.g. photoroster=debug

REQUIREMENTS:
  pdfium shared library   https://github.com/bblanchon/pdfium-binaries
  lualatex or pdflatex    TeX Live, MiKTeX or MacTeX
"#;

/// Generate a printable photo roster from class-roster PDF exports.
#[derive(Parser, Debug)]
#[command(
    name = "photoroster",
    version,
    about = "Generate student roster from PDF files",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Input PDF files.
    #[arg(required = true, num_args = 1..)]
    pdf_files: Vec<PathBuf>,

    /// Number of pages for output.
    #[arg(long = "n-pages", visible_alias = "n_pages", env = "PHOTOROSTER_PAGES",
          default_value_t = 1, allow_negative_numbers = true)]
    n_pages: i64,

    /// Maximum photos per page (overrides --n-pages).
    #[arg(long, env = "PHOTOROSTER_MAX_PER_PAGE", allow_negative_numbers = true)]
    max_per_page: Option<i64>,

    /// Sort by last name instead of first name.
    #[arg(long, env = "PHOTOROSTER_SORT_LASTNAME")]
    sort_lastname: bool,

    /// Save photos and the .tex file in the current directory instead of a temp dir.
    #[arg(long, env = "PHOTOROSTER_SAVE_FILES")]
    save_files: bool,

    /// Output PDF filename.
    #[arg(short, long, env = "PHOTOROSTER_OUTPUT", default_value = "./student_roster.pdf")]
    output: PathBuf,

    /// Only accept email addresses at this domain.
    #[arg(long, env = "PHOTOROSTER_EMAIL_DOMAIN")]
    email_domain: Option<String>,

    /// LaTeX compiler to use (path or program name); skips discovery and fails if missing.
    #[arg(long, env = "PHOTOROSTER_COMPILER")]
    compiler: Option<PathBuf>,

    /// Extra location to look for a LaTeX compiler (repeatable).
    #[arg(long = "tex-fallback", value_name = "PATH")]
    tex_fallbacks: Vec<PathBuf>,

    /// pdfium shared library (file or directory).
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// Print the result (records, pages, stats) as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PHOTOROSTER_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PHOTOROSTER_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PHOTOROSTER_QUIET")]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level library logs.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn RosterProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Run ──────────────────────────────────────────────────────────────
    let output = build_roster(&cli.pdf_files, &config).context("Roster generation failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&output).context("Failed to serialise output")?
        );
    }

    if !cli.quiet {
        eprintln!(
            "{} Successfully generated roster at: {}",
            green("✔"),
            bold(&output.output_path.display().to_string())
        );
        match config.page_policy {
            photoroster::PagePolicy::MaxPerPage(m) => eprintln!(
                "Generated {} pages with up to {} students per page",
                output.pages, m
            ),
            photoroster::PagePolicy::Count(_) => eprintln!("Generated {} pages", output.pages),
        }
        if cli.save_files {
            eprintln!(
                "   {}",
                dim("photos in ./extracted_students, markup in ./student_roster.tex")
            );
        }
    }

    Ok(())
}

/// Map CLI args to `RosterConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<RosterConfig> {
    let compiler = CompilerConfig {
        explicit: cli.compiler.clone(),
        ..CompilerConfig::default()
    }
    .with_fallbacks(cli.tex_fallbacks.iter().cloned());

    let mut builder = RosterConfig::builder()
        .pages(cli.n_pages)
        .sort_key(if cli.sort_lastname {
            SortKey::Surname
        } else {
            SortKey::GivenName
        })
        .output_path(&cli.output)
        .keep_intermediates(cli.save_files)
        .compiler(compiler);

    if let Some(m) = cli.max_per_page {
        builder = builder.max_per_page(m);
    }
    if let Some(ref domain) = cli.email_domain {
        builder = builder.email_domain(domain);
    }
    if let Some(ref lib) = cli.pdfium_lib {
        builder = builder.pdfium_library(lib);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
