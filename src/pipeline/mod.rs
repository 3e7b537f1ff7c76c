//! Pipeline stages for roster generation.
//!
//! Each submodule implements exactly one transformation step, run in
//! sequence on a single thread.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ (roster) ──▶ layout ──▶ markup ──▶ compile
//! (paths)   (pdfium)    (sort)       (grid)     (TikZ)     (LaTeX)
//! ```
//!
//! 1. [`input`]   — validate source paths; choose the working directory
//! 2. [`extract`] — pair page images with names and emails, save photos
//! 3. [`layout`]  — split the sorted roster into pages and size each grid
//! 4. [`markup`]  — write the LaTeX document
//! 5. [`compile`] — locate and run the LaTeX compiler, tidy its outputs
//!
//! Sorting lives in [`crate::roster`] since it works on records alone.

pub mod compile;
pub mod extract;
pub mod input;
pub mod layout;
pub mod markup;
