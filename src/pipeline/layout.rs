//! Page partitioning and grid geometry.
//!
//! One aspect ratio, the mean width/height of every photo in the roster,
//! drives every page's grid. Given `n` photos on a page the grid has
//! `round(sqrt(ratio * n))` columns, which keeps cells close to the photos'
//! own shape on a 20 × 25 cm drawing area.

use crate::config::PagePolicy;
use crate::error::RosterError;
use crate::roster::StudentRecord;
use tracing::debug;

/// Drawing area width in cm (letter paper minus 1 cm margins, rounded).
pub const PAGE_WIDTH: f64 = 20.0;
/// Drawing area height in cm.
pub const PAGE_HEIGHT: f64 = 25.0;
/// Horizontal gap between cells in cm.
pub const COL_GAP: f64 = 0.2;
/// Vertical gap between cells in cm; leaves room for the caption.
pub const ROW_GAP: f64 = 1.5;
/// Photos use this share of the cell width.
const WIDTH_FILL: f64 = 0.95;

/// One output page: its records plus the grid they are drawn on.
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout<'a> {
    pub students: &'a [StudentRecord],
    pub columns: usize,
    pub rows: usize,
    pub cell_width: f64,
    pub cell_height: f64,
}

impl PageLayout<'_> {
    /// Top-left corner of the `idx`-th cell, in TikZ coordinates (y up).
    pub fn position(&self, idx: usize) -> (f64, f64) {
        let row = idx / self.columns;
        let col = idx % self.columns;
        let x = col as f64 * (self.cell_width + COL_GAP);
        // `+ 0.0` turns -0.0 into 0.0 for the first row.
        let y = -(row as f64) * (self.cell_height + ROW_GAP) + 0.0;
        (x, y)
    }
}

/// Split `roster` into consecutive page slices according to `policy`.
///
/// With [`PagePolicy::MaxPerPage`] every page but the last is full. With
/// [`PagePolicy::Count`] exactly that many pages are returned, each holding
/// `ceil(total / n)` records, so trailing pages may be empty.
pub fn partition(roster: &[StudentRecord], policy: PagePolicy) -> Vec<&[StudentRecord]> {
    let total = roster.len();
    let (pages, per_page) = match policy {
        PagePolicy::MaxPerPage(m) => {
            let m = m.max(1);
            (total.div_ceil(m), m)
        }
        PagePolicy::Count(n) => {
            let n = n.max(1);
            (n, total.div_ceil(n))
        }
    };

    (0..pages)
        .map(|i| {
            let start = (i * per_page).min(total);
            let end = (start + per_page).min(total);
            &roster[start..end]
        })
        .collect()
}

/// Grid dimensions for `num_students` photos of average shape `aspect_ratio`.
///
/// Columns round half to even and are never below 1; rows are never below
/// 1 either, so empty pages still get finite cell sizes.
pub fn grid(aspect_ratio: f64, num_students: usize) -> (usize, usize) {
    let columns = (aspect_ratio * num_students as f64)
        .sqrt()
        .round_ties_even();
    let columns = if columns.is_finite() && columns >= 1.0 {
        columns as usize
    } else {
        1
    };
    let rows = num_students.div_ceil(columns).max(1);
    (columns, rows)
}

/// Lay out one page slice.
pub fn layout_page(students: &[StudentRecord], aspect_ratio: f64) -> PageLayout<'_> {
    let (columns, rows) = grid(aspect_ratio, students.len());
    let cell_width = (PAGE_WIDTH - (columns - 1) as f64 * COL_GAP) / columns as f64 * WIDTH_FILL;
    let cell_height = (PAGE_HEIGHT - (rows - 1) as f64 * ROW_GAP) / rows as f64;
    debug!(
        "Page layout: {} photos → {}x{} grid, cell {:.3}x{:.3} cm",
        students.len(),
        columns,
        rows,
        cell_width,
        cell_height
    );
    PageLayout {
        students,
        columns,
        rows,
        cell_width,
        cell_height,
    }
}

/// Partition `roster` and lay out every page with one shared aspect ratio.
pub fn plan_pages(
    roster: &[StudentRecord],
    policy: PagePolicy,
    aspect_ratio: f64,
) -> Vec<PageLayout<'_>> {
    partition(roster, policy)
        .into_iter()
        .map(|students| layout_page(students, aspect_ratio))
        .collect()
}

/// Mean width/height over every photo in `roster`, read from image headers.
///
/// # Errors
/// [`RosterError::ImageUnreadable`] if a photo is missing, undecodable or
/// has zero height; [`RosterError::NoRecordsExtracted`] for an empty roster.
pub fn average_aspect_ratio(roster: &[StudentRecord]) -> Result<f64, RosterError> {
    if roster.is_empty() {
        return Err(RosterError::NoRecordsExtracted { documents: 0 });
    }

    let mut sum = 0.0;
    for record in roster {
        let (w, h) = image::image_dimensions(&record.image_path).map_err(|e| {
            RosterError::ImageUnreadable {
                path: record.image_path.clone(),
                detail: e.to_string(),
            }
        })?;
        if h == 0 {
            return Err(RosterError::ImageUnreadable {
                path: record.image_path.clone(),
                detail: "zero height".into(),
            });
        }
        sum += w as f64 / h as f64;
    }
    Ok(sum / roster.len() as f64)
}
