//! Error type for the photoroster library.
//!
//! Every failure is fatal for the run: there is no per-page or per-record
//! error channel. Images, names or emails that cannot be paired are dropped
//! silently by the extractor rather than reported here.
//!
//! Variants are grouped by the pipeline stage that raises them so the CLI
//! can print a message that tells the user what to fix.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the photoroster library.
#[derive(Debug, Error)]
pub enum RosterError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// A named source file does not exist.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    InputNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed (non-positive cap or page count).
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    // ── Extraction errors ─────────────────────────────────────────────────
    /// pdfium could not open the document.
    #[error("PDF '{path}' could not be opened: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Install libpdfium system-wide, or point PDFIUM_LIB_PATH (--pdfium-lib) at\n\
an existing copy. Pre-built libraries are available from\n\
https://github.com/bblanchon/pdfium-binaries/releases"
    )]
    PdfiumBindingFailed(String),

    /// Every source document yielded zero (name, email, image) pairings.
    #[error("No student data extracted from {documents} PDF file(s)")]
    NoRecordsExtracted { documents: usize },

    /// An extracted photo could not be decoded when measuring its size.
    #[error("Cannot read image '{path}': {detail}")]
    ImageUnreadable { path: PathBuf, detail: String },

    // ── Compiler errors ───────────────────────────────────────────────────
    /// No LaTeX compiler on PATH or at any fallback location.
    #[error(
        "No LaTeX compiler found.\nSearched PATH for {programs} and these locations:\n{locations}\n\
Install TeX Live or MiKTeX, or pass --compiler /path/to/pdflatex."
    )]
    CompileToolUnavailable { programs: String, locations: String },

    /// The compiler ran and exited unsuccessfully.
    #[error("Error compiling LaTeX ({status}): see log file at '{log_path}'\nCompiler output: {output}")]
    CompileFailed {
        status: String,
        log_path: PathBuf,
        output: String,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output file (image, markup, final PDF).
    #[error("Failed to write '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RosterError {
    /// Wrap an I/O failure on `path`.
    pub(crate) fn write_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RosterError::OutputWriteFailed {
            path: path.into(),
            source,
        }
    }
}
