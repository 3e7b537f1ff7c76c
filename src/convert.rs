//! End-to-end roster generation.
//!
//! [`build_roster`] runs the whole pipeline. The two halves are public too:
//! [`extract_documents`] needs pdfium, while [`generate_markup`] only needs
//! extracted records and can be driven without any PDF at all.

use crate::config::RosterConfig;
use crate::error::RosterError;
use crate::pipeline::extract::{PdfExtractor, RosterPatterns};
use crate::pipeline::input::{self, Workspace};
use crate::pipeline::{compile, layout, markup};
use crate::roster::{self, StudentRecord};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Result of a successful run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterOutput {
    /// The compiled roster.
    pub output_path: PathBuf,
    /// Number of pages in the roster, including empty trailing pages.
    pub pages: usize,
    /// Sorted roster, in print order.
    pub records: Vec<StudentRecord>,
    pub stats: RosterStats,
}

/// Counters and timings for one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RosterStats {
    pub documents: usize,
    pub records: usize,
    pub pages: usize,
    /// Mean width/height of all photos.
    pub average_aspect_ratio: f64,
    pub extract_duration_ms: u64,
    pub compile_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// Markup produced from extracted records.
#[derive(Debug, Clone)]
pub struct MarkupOutput {
    pub markup_path: PathBuf,
    pub records: Vec<StudentRecord>,
    pub pages: usize,
    pub average_aspect_ratio: f64,
}

/// Turn roster PDFs into a compiled photo roster at `config.output_path`.
///
/// # Errors
/// Fatal on the first problem: a missing or non-PDF input, pdfium being
/// unavailable, no records at all, an unreadable photo, or the LaTeX step.
/// When no records are found nothing is written besides extracted photos.
pub fn build_roster(
    inputs: &[impl AsRef<Path>],
    config: &RosterConfig,
) -> Result<RosterOutput, RosterError> {
    let total_start = Instant::now();
    if inputs.is_empty() {
        return Err(RosterError::InvalidConfiguration(
            "at least one input PDF is required".into(),
        ));
    }

    // ── Step 1: Validate inputs ──────────────────────────────────────────
    for path in inputs {
        input::check_pdf(path.as_ref())?;
    }

    // ── Step 2: Extract records ──────────────────────────────────────────
    let workspace = Workspace::open(config.keep_intermediates, ".")?;
    let extract_start = Instant::now();
    let batches = extract_documents(inputs, &workspace.image_dir(), config)?;
    let extract_duration_ms = extract_start.elapsed().as_millis() as u64;

    // ── Step 3: Sort, lay out, write markup ──────────────────────────────
    let generated = generate_markup(batches, &workspace.markup_path(), config)?;

    // ── Step 4: Compile ──────────────────────────────────────────────────
    let compile_start = Instant::now();
    let output_path = compile::compile(
        &generated.markup_path,
        &config.output_path,
        &config.compiler,
    )?;
    let compile_duration_ms = compile_start.elapsed().as_millis() as u64;

    let stats = RosterStats {
        documents: inputs.len(),
        records: generated.records.len(),
        pages: generated.pages,
        average_aspect_ratio: generated.average_aspect_ratio,
        extract_duration_ms,
        compile_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };
    info!(
        "Roster complete: {} students on {} pages, {}ms total",
        stats.records, stats.pages, stats.total_duration_ms
    );

    Ok(RosterOutput {
        output_path,
        pages: generated.pages,
        records: generated.records,
        stats,
    })
}

/// Extract records from each input, in order, writing photos to `image_dir`.
///
/// Returns one batch per input document.
pub fn extract_documents(
    inputs: &[impl AsRef<Path>],
    image_dir: &Path,
    config: &RosterConfig,
) -> Result<Vec<Vec<StudentRecord>>, RosterError> {
    let patterns = RosterPatterns::new(config.email_domain.as_deref());
    let extractor = PdfExtractor::bind(config.pdfium_library.as_deref())?;
    let progress = config.progress_callback.as_deref();
    let total = inputs.len();

    if let Some(cb) = progress {
        cb.on_run_start(total);
    }

    let mut batches = Vec::with_capacity(total);
    for (idx, path) in inputs.iter().enumerate() {
        let path = path.as_ref();
        info!("Processing {} ({}/{})", path.display(), idx + 1, total);
        if let Some(cb) = progress {
            cb.on_document_start(idx + 1, total, path);
        }

        let records = extractor.extract(path, image_dir, &patterns, progress)?;
        debug!("{}: {} records", path.display(), records.len());

        if let Some(cb) = progress {
            cb.on_document_complete(idx + 1, total, records.len());
        }
        batches.push(records);
    }
    Ok(batches)
}

/// Merge, sort and lay out `batches`, then write the markup to `markup_path`.
///
/// # Errors
/// [`RosterError::NoRecordsExtracted`] when every batch is empty; the
/// markup file is not created in that case.
pub fn generate_markup(
    batches: Vec<Vec<StudentRecord>>,
    markup_path: &Path,
    config: &RosterConfig,
) -> Result<MarkupOutput, RosterError> {
    let records = roster::assemble(batches, config.sort_key)?;
    let ratio = layout::average_aspect_ratio(&records)?;
    debug!("Average aspect ratio {:.4} over {} photos", ratio, records.len());

    let pages = layout::plan_pages(&records, config.page_policy, ratio);
    markup::write_markup(&pages, markup_path)?;
    let page_count = pages.len();

    if let Some(cb) = config.progress_callback.as_deref() {
        cb.on_run_complete(records.len(), page_count);
    }

    Ok(MarkupOutput {
        markup_path: markup_path.to_path_buf(),
        records,
        pages: page_count,
        average_aspect_ratio: ratio,
    })
}
