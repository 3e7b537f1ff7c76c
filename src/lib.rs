//! # photoroster
//!
//! Turn the class-roster PDFs exported by a student information system into
//! a printable photo roster: every student's photo on a grid, captioned with
//! their name linked to their email address.
//!
//! ## Pipeline Overview
//!
//! ```text
//! roster PDFs
//!  │
//!  ├─ 1. Extract  page text + embedded photos via pdfium; pair by position
//!  ├─ 2. Sort     merge all documents, order by given name or surname
//!  ├─ 3. Layout   split into pages, near-square grid from the photo shape
//!  ├─ 4. Markup   LaTeX/TikZ document with one picture per page
//!  └─ 5. Compile  lualatex / pdflatex → final PDF
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use photoroster::{build_roster, RosterConfig, SortKey};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RosterConfig::builder()
//!         .max_per_page(30)
//!         .sort_key(SortKey::Surname)
//!         .output_path("class_roster.pdf")
//!         .build()?;
//!     let output = build_roster(&["section1.pdf", "section2.pdf"], &config)?;
//!     eprintln!("{} students on {} pages", output.records.len(), output.pages);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `photoroster` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! ## Runtime requirements
//!
//! A pdfium shared library (system-wide, or via `PDFIUM_LIB_PATH`) and a
//! LaTeX distribution providing `lualatex` or `pdflatex`.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod pipeline;
pub mod progress;
pub mod roster;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{CompilerConfig, PagePolicy, RosterConfig, RosterConfigBuilder};
pub use convert::{
    build_roster, extract_documents, generate_markup, MarkupOutput, RosterOutput, RosterStats,
};
pub use error::RosterError;
pub use progress::{NoopProgressCallback, ProgressCallback, RosterProgressCallback};
pub use roster::{SortKey, StudentRecord};
