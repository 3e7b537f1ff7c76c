//! Record extraction: pair each embedded photo with a name and email.
//!
//! Pairing is purely positional. On every page the Kth image is matched
//! with the Kth name and the Kth email found in the page text, for K up to
//! the shortest of the three lists; anything beyond that is dropped. Roster
//! exports print one (photo, name, email) row per student, so index order
//! is the only linkage the input offers. An image pdfium cannot decode keeps
//! its slot: that one student is skipped and the rows after it stay aligned.
//!
//! The pdfium backend ([`PdfExtractor`]) only turns pages into
//! [`SourcePage`] values; [`extract_page`] holds the pairing rules and can
//! be driven with synthetic pages.

use crate::error::RosterError;
use crate::progress::RosterProgressCallback;
use crate::roster::StudentRecord;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};
use once_cell::sync::Lazy;
use pdfium_render::prelude::*;
use regex::Regex;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Name followed by a 9-digit student ID in parentheses; group 1 is the name.
static RE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Za-z ,.'\-]+) \(\d{9}\)").unwrap());

static RE_EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[\w.\-]+@[\w.\-]+\.\w+\b").unwrap());

/// Quality for photos pdfium hands back decoded from a DCT stream.
const JPEG_QUALITY: u8 = 95;

/// Raw contents of one PDF page.
#[derive(Debug, Clone, Default)]
pub struct SourcePage {
    /// Page text in reading order.
    pub text: String,
    /// Embedded images in page order; `None` where decoding failed.
    pub images: Vec<Option<EmbeddedImage>>,
}

/// An encoded image pulled out of a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedImage {
    pub bytes: Vec<u8>,
    /// File extension without the dot, e.g. `"jpeg"` or `"png"`.
    pub extension: String,
}

impl EmbeddedImage {
    /// Encode `image` as `format` and remember the matching extension.
    pub fn encode(image: &DynamicImage, format: ImageFormat) -> Result<Self, image::ImageError> {
        let extension = match format {
            ImageFormat::Jpeg => "jpeg",
            _ => "png",
        };
        let format = if extension == "png" { ImageFormat::Png } else { format };

        let mut bytes = Vec::new();
        if format == ImageFormat::Jpeg {
            // JPEG has no alpha channel.
            DynamicImage::ImageRgb8(image.to_rgb8())
                .write_with_encoder(JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY))?;
        } else {
            image.write_to(&mut Cursor::new(&mut bytes), format)?;
        }
        Ok(Self {
            bytes,
            extension: extension.to_string(),
        })
    }
}

// ── Patterns ─────────────────────────────────────────────────────────────

/// Name and email matchers applied to page text.
#[derive(Debug, Clone, Default)]
pub struct RosterPatterns {
    /// Lower-cased domain every accepted address must belong to.
    email_domain: Option<String>,
}

impl RosterPatterns {
    /// Patterns accepting any email address, or only those whose domain
    /// is exactly `email_domain` (ASCII case-insensitive).
    pub fn new(email_domain: Option<&str>) -> Self {
        Self {
            email_domain: email_domain
                .map(|d| d.trim().trim_start_matches('@').to_ascii_lowercase()),
        }
    }

    /// Candidate names in text order, trimmed.
    pub fn names(&self, text: &str) -> Vec<String> {
        RE_NAME
            .captures_iter(text)
            .map(|caps| caps[1].trim().to_string())
            .collect()
    }

    /// Candidate emails in text order.
    ///
    /// Whole addresses are matched before the domain check, so
    /// `ann@school.edu.example.com` never shrinks to `ann@school.edu`.
    pub fn emails(&self, text: &str) -> Vec<String> {
        RE_EMAIL
            .find_iter(text)
            .map(|m| m.as_str())
            .filter(|email| match &self.email_domain {
                Some(domain) => email
                    .rsplit_once('@')
                    .is_some_and(|(_, d)| d.eq_ignore_ascii_case(domain)),
                None => true,
            })
            .map(str::to_string)
            .collect()
    }
}

/// File stem for a student's photo: spaces become underscores.
pub fn sanitize_name(name: &str) -> String {
    name.trim().replace(' ', "_")
}

// ── Pairing ──────────────────────────────────────────────────────────────

/// Pair the images of one page with its names and emails, writing each
/// paired image into `output_dir`.
///
/// Considers the first `min(images, names, emails)` slots, in image order,
/// and produces one record for each slot whose image decoded.
pub fn extract_page(
    page: &SourcePage,
    page_num: usize,
    output_dir: &Path,
    patterns: &RosterPatterns,
    progress: Option<&dyn RosterProgressCallback>,
) -> Result<Vec<StudentRecord>, RosterError> {
    let names = patterns.names(&page.text);
    let emails = patterns.emails(&page.text);
    let count = page.images.len().min(names.len()).min(emails.len());
    debug!(
        "Page {}: {} images, {} names, {} emails → {} records",
        page_num,
        page.images.len(),
        names.len(),
        emails.len(),
        count
    );

    let mut records = Vec::with_capacity(count);
    for ((image, name), email) in page.images.iter().zip(names).zip(emails) {
        let Some(image) = image else {
            warn!("Page {}: no photo for {} (image could not be decoded)", page_num, name);
            continue;
        };
        let file_name = format!("{}.{}", sanitize_name(&name), image.extension);
        let image_path = output_dir.join(&file_name);
        std::fs::write(&image_path, &image.bytes)
            .map_err(|e| RosterError::write_failed(&image_path, e))?;

        info!(
            "Extracted: Name: {}, Email: {}, Image: {}",
            name, email, file_name
        );
        let record = StudentRecord {
            name,
            email,
            image_path,
        };
        if let Some(cb) = progress {
            cb.on_record_extracted(&record);
        }
        records.push(record);
    }

    Ok(records)
}

/// Run [`extract_page`] over a sequence of pages, creating `output_dir`
/// first.
pub fn extract_pages<'p>(
    pages: impl IntoIterator<Item = &'p SourcePage>,
    output_dir: &Path,
    patterns: &RosterPatterns,
    progress: Option<&dyn RosterProgressCallback>,
) -> Result<Vec<StudentRecord>, RosterError> {
    std::fs::create_dir_all(output_dir).map_err(|e| RosterError::write_failed(output_dir, e))?;

    let mut records = Vec::new();
    for (idx, page) in pages.into_iter().enumerate() {
        records.extend(extract_page(page, idx + 1, output_dir, patterns, progress)?);
    }
    Ok(records)
}

// ── pdfium backend ───────────────────────────────────────────────────────

/// Reads roster PDFs through pdfium.
pub struct PdfExtractor {
    pdfium: Pdfium,
}

impl PdfExtractor {
    /// Bind to pdfium: `library` if given, else `PDFIUM_LIB_PATH`, else the
    /// system library search path.
    ///
    /// A directory is accepted in place of a file; the platform library
    /// name is appended.
    pub fn bind(library: Option<&Path>) -> Result<Self, RosterError> {
        let explicit = library
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os("PDFIUM_LIB_PATH").map(PathBuf::from));

        let bindings = match explicit {
            Some(path) => {
                let path = if path.is_dir() {
                    Pdfium::pdfium_platform_library_name_at_path(&path)
                } else {
                    path
                };
                debug!("Binding pdfium from {}", path.display());
                Pdfium::bind_to_library(&path)
            }
            None => Pdfium::bind_to_system_library(),
        }
        .map_err(|e| RosterError::PdfiumBindingFailed(format!("{e:?}")))?;

        Ok(Self {
            pdfium: Pdfium::new(bindings),
        })
    }

    /// Extract every record from `pdf_path`, writing photos to `output_dir`.
    ///
    /// # Errors
    /// [`RosterError::CorruptPdf`] if pdfium cannot open the document; any
    /// failure writing a photo.
    pub fn extract(
        &self,
        pdf_path: &Path,
        output_dir: &Path,
        patterns: &RosterPatterns,
        progress: Option<&dyn RosterProgressCallback>,
    ) -> Result<Vec<StudentRecord>, RosterError> {
        let document = self
            .pdfium
            .load_pdf_from_file(pdf_path, None)
            .map_err(|e| RosterError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail: format!("{e:?}"),
            })?;

        std::fs::create_dir_all(output_dir).map_err(|e| RosterError::write_failed(output_dir, e))?;

        let pages = document.pages();
        info!("{}: {} pages", pdf_path.display(), pages.len());

        let mut records = Vec::new();
        for (idx, page) in pages.iter().enumerate() {
            let source = read_page(&page, idx + 1);
            records.extend(extract_page(&source, idx + 1, output_dir, patterns, progress)?);
        }
        Ok(records)
    }
}

/// Collect the text and images of one page.
fn read_page(page: &PdfPage, page_num: usize) -> SourcePage {
    let text = match page.text() {
        Ok(text) => text.all(),
        Err(e) => {
            warn!("Page {}: text extraction failed: {:?}", page_num, e);
            String::new()
        }
    };

    let mut images = Vec::new();
    for object in page.objects().iter() {
        let Some(image) = object.as_image_object() else {
            continue;
        };
        match read_image(image) {
            Ok(img) => images.push(Some(img)),
            Err(detail) => {
                warn!("Page {}: unreadable image #{}: {}", page_num, images.len() + 1, detail);
                images.push(None);
            }
        }
    }

    SourcePage { text, images }
}

/// Decode an image object, keeping JPEG for DCT-compressed photos.
///
/// pdfium hands back decoded pixels, so JPEG photos are re-encoded at
/// [`JPEG_QUALITY`] rather than copied byte for byte.
fn read_image(image: &PdfPageImageObject) -> Result<EmbeddedImage, String> {
    let is_jpeg = image
        .filters()
        .iter()
        .any(|f| f.name() == "DCTDecode");
    let raw = image.get_raw_image().map_err(|e| format!("{e:?}"))?;
    let format = if is_jpeg {
        ImageFormat::Jpeg
    } else {
        ImageFormat::Png
    };
    EmbeddedImage::encode(&raw, format).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn png(w: u32, h: u32) -> EmbeddedImage {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb([200, 10, 10])));
        EmbeddedImage::encode(&img, ImageFormat::Png).unwrap()
    }

    fn page(text: &str, images: usize) -> SourcePage {
        SourcePage {
            text: text.to_string(),
            images: (0..images).map(|_| Some(png(3, 4))).collect(),
        }
    }

    #[test]
    fn single_student_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let p = page("Doe, Jane (123456789)\njane.doe@example.edu\n", 1);

        let records =
            extract_page(&p, 1, dir.path(), &RosterPatterns::default(), None).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Doe, Jane");
        assert_eq!(records[0].email, "jane.doe@example.edu");
        assert_eq!(records[0].image_path, dir.path().join("Doe,_Jane.png"));
        let expected = p.images[0].as_ref().unwrap();
        assert_eq!(std::fs::read(&records[0].image_path).unwrap(), expected.bytes);
    }

    #[test]
    fn count_is_min_of_images_names_emails() {
        let dir = tempfile::tempdir().unwrap();
        let text = "Ann Lee (111111111)\nann@x.edu\n\
                    Bob Ray (222222222)\nbob@x.edu\n\
                    Cy Moe (333333333)\n";
        let patterns = RosterPatterns::default();

        for (images, expected) in [(0, 0), (1, 1), (2, 2), (5, 2)] {
            let p = page(text, images);
            let records = extract_page(&p, 1, dir.path(), &patterns, None).unwrap();
            assert_eq!(records.len(), expected, "{images} images");
        }
    }

    #[test]
    fn pairing_is_positional() {
        let dir = tempfile::tempdir().unwrap();
        let p = page(
            "Ann Lee (111111111)\nBob Ray (222222222)\nann@x.edu bob@x.edu",
            2,
        );
        let records =
            extract_page(&p, 1, dir.path(), &RosterPatterns::default(), None).unwrap();
        assert_eq!(records[0].name, "Ann Lee");
        assert_eq!(records[0].email, "ann@x.edu");
        assert_eq!(records[1].name, "Bob Ray");
        assert_eq!(records[1].email, "bob@x.edu");
        assert!(dir.path().join("Bob_Ray.png").exists());
    }

    #[test]
    fn name_requires_nine_digit_id() {
        let patterns = RosterPatterns::default();
        let names = patterns.names("Ann Lee (12345678)\nBob O'Neil-Ray (987654321)");
        assert_eq!(names, vec!["Bob O'Neil-Ray"]);
    }

    #[test]
    fn name_capture_is_trimmed() {
        let patterns = RosterPatterns::default();
        assert_eq!(patterns.names("Student:  Jo Park (123456789)"), vec!["Jo Park"]);
    }

    #[test]
    fn undecodable_image_keeps_its_slot() {
        let dir = tempfile::tempdir().unwrap();
        let first = png(3, 4);
        let third = png(5, 4);
        let p = SourcePage {
            text: "Ann Lee (111111111) ann@x.edu\n\
                   Bob Ray (222222222) bob@x.edu\n\
                   Cy Moe (333333333) cy@x.edu\n"
                .into(),
            images: vec![Some(first.clone()), None, Some(third.clone())],
        };

        let records =
            extract_page(&p, 1, dir.path(), &RosterPatterns::default(), None).unwrap();

        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Ann Lee", "Cy Moe"]);
        assert_eq!(records[1].email, "cy@x.edu");
        assert_eq!(std::fs::read(&records[1].image_path).unwrap(), third.bytes);
        assert_eq!(std::fs::read(&records[0].image_path).unwrap(), first.bytes);
        assert!(!dir.path().join("Bob_Ray.png").exists());
    }

    #[test]
    fn domain_constraint_filters_emails() {
        let patterns = RosterPatterns::new(Some("school.edu"));
        let emails = patterns.emails("a@gmail.com b.c@school.edu d@school.edu.evil.com");
        assert_eq!(emails, vec!["b.c@school.edu"]);
    }

    #[test]
    fn domain_constraint_never_truncates_other_domains() {
        let patterns = RosterPatterns::new(Some("school.edu"));
        let emails = patterns
            .emails("ann@school.edu.evil.com bob@school.edu-mail.org cy@School.EDU");
        assert_eq!(emails, vec!["cy@School.EDU"]);
    }

    #[test]
    fn domain_accepts_leading_at() {
        let patterns = RosterPatterns::new(Some("@x.org"));
        assert_eq!(patterns.emails("me@x.org"), vec!["me@x.org"]);
    }

    #[test]
    fn sanitize_replaces_spaces() {
        assert_eq!(sanitize_name(" Mary Ann Smith "), "Mary_Ann_Smith");
        assert_eq!(sanitize_name("Doe, Jane"), "Doe,_Jane");
    }

    #[test]
    fn jpeg_encoding_uses_jpeg_extension() {
        let img = DynamicImage::ImageRgba8(image::RgbaImage::new(4, 4));
        let e = EmbeddedImage::encode(&img, ImageFormat::Jpeg).unwrap();
        assert_eq!(e.extension, "jpeg");
        assert_eq!(&e.bytes[..2], &[0xFF, 0xD8]);
        assert_eq!(image::load_from_memory(&e.bytes).unwrap().width(), 4);
    }

    #[test]
    fn extract_pages_creates_dir_and_keeps_page_order() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("photos");
        let pages = vec![
            page("Zed Ames (111111111) zed@x.edu", 1),
            page("Amy Bell (222222222) amy@x.edu", 1),
        ];
        let records =
            extract_pages(&pages, &out, &RosterPatterns::default(), None).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Zed Ames");
        assert_eq!(records[1].name, "Amy Bell");
        assert!(out.join("Amy_Bell.png").exists());
    }
}
