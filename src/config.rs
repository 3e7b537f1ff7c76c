//! Configuration types for roster generation.
//!
//! All behaviour is controlled through [`RosterConfig`], built via its
//! [`RosterConfigBuilder`]. The config is created once at the entry point
//! and passed by reference through every stage; nothing in the library
//! reads process-wide state except the compiler's `PATH` lookup.

use crate::error::RosterError;
use crate::progress::ProgressCallback;
use crate::roster::SortKey;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Default location of the finished roster.
pub const DEFAULT_OUTPUT: &str = "./student_roster.pdf";

/// Configuration for one roster run.
///
/// # Example
/// ```rust
/// use photoroster::{PagePolicy, RosterConfig, SortKey};
///
/// let config = RosterConfig::builder()
///     .max_per_page(30)
///     .sort_key(SortKey::Surname)
///     .output_path("class.pdf")
///     .build()
///     .unwrap();
/// assert_eq!(config.page_policy, PagePolicy::MaxPerPage(30));
/// ```
#[derive(Clone)]
pub struct RosterConfig {
    /// How records are split across output pages. Default: one page.
    pub page_policy: PagePolicy,

    /// Name token the roster is ordered by. Default: given name.
    pub sort_key: SortKey,

    /// Where the compiled roster is written. Default: `./student_roster.pdf`.
    pub output_path: PathBuf,

    /// Keep extracted photos and the `.tex` file in the current directory
    /// instead of a temporary one. Default: false.
    pub keep_intermediates: bool,

    /// Only accept emails at this domain (e.g. `"example.edu"`).
    /// If None, any address matches.
    pub email_domain: Option<String>,

    /// How the LaTeX compiler is located.
    pub compiler: CompilerConfig,

    /// Explicit pdfium shared library. If None, `PDFIUM_LIB_PATH` and then
    /// the system library search path are tried.
    pub pdfium_library: Option<PathBuf>,

    /// Optional per-document progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            page_policy: PagePolicy::default(),
            sort_key: SortKey::default(),
            output_path: PathBuf::from(DEFAULT_OUTPUT),
            keep_intermediates: false,
            email_domain: None,
            compiler: CompilerConfig::default(),
            pdfium_library: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for RosterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RosterConfig")
            .field("page_policy", &self.page_policy)
            .field("sort_key", &self.sort_key)
            .field("output_path", &self.output_path)
            .field("keep_intermediates", &self.keep_intermediates)
            .field("email_domain", &self.email_domain)
            .field("compiler", &self.compiler)
            .field("pdfium_library", &self.pdfium_library)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn RosterProgressCallback>"),
            )
            .finish()
    }
}

impl RosterConfig {
    /// Create a new builder for `RosterConfig`.
    pub fn builder() -> RosterConfigBuilder {
        RosterConfigBuilder {
            config: Self::default(),
            page_count: 1,
            max_per_page: None,
        }
    }
}

/// Builder for [`RosterConfig`].
///
/// Page settings are taken as signed integers so that user input such as
/// `--max-per-page -1` is rejected by [`build`](Self::build) rather than
/// wrapping around.
#[derive(Debug)]
pub struct RosterConfigBuilder {
    config: RosterConfig,
    page_count: i64,
    max_per_page: Option<i64>,
}

impl RosterConfigBuilder {
    /// Target number of output pages. Ignored when a cap is set.
    pub fn pages(mut self, n: i64) -> Self {
        self.page_count = n;
        self
    }

    /// Maximum photos per page; overrides [`pages`](Self::pages).
    pub fn max_per_page(mut self, m: i64) -> Self {
        self.max_per_page = Some(m);
        self
    }

    pub fn sort_key(mut self, key: SortKey) -> Self {
        self.config.sort_key = key;
        self
    }

    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output_path = path.into();
        self
    }

    pub fn keep_intermediates(mut self, v: bool) -> Self {
        self.config.keep_intermediates = v;
        self
    }

    pub fn email_domain(mut self, domain: impl Into<String>) -> Self {
        self.config.email_domain = Some(domain.into());
        self
    }

    pub fn compiler(mut self, compiler: CompilerConfig) -> Self {
        self.config.compiler = compiler;
        self
    }

    pub fn pdfium_library(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_library = Some(path.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating page settings.
    pub fn build(mut self) -> Result<RosterConfig, RosterError> {
        self.config.page_policy = match self.max_per_page {
            Some(m) if m <= 0 => {
                return Err(RosterError::InvalidConfiguration(format!(
                    "--max-per-page must be a positive integer, got {m}"
                )));
            }
            Some(m) => PagePolicy::MaxPerPage(to_usize(m)?),
            None if self.page_count <= 0 => {
                return Err(RosterError::InvalidConfiguration(format!(
                    "--n-pages must be a positive integer, got {}",
                    self.page_count
                )));
            }
            None => PagePolicy::Count(to_usize(self.page_count)?),
        };
        if let Some(domain) = &self.config.email_domain {
            if domain.trim().trim_start_matches('@').is_empty() {
                return Err(RosterError::InvalidConfiguration(
                    "email domain must not be empty".into(),
                ));
            }
        }
        Ok(self.config)
    }
}

fn to_usize(n: i64) -> Result<usize, RosterError> {
    usize::try_from(n)
        .map_err(|_| RosterError::InvalidConfiguration(format!("{n} is out of range")))
}

// ── Page policy ──────────────────────────────────────────────────────────

/// How the sorted roster is split into output pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PagePolicy {
    /// Exactly this many pages, filled evenly from the front.
    Count(usize),
    /// As many pages as needed with at most this many photos each.
    MaxPerPage(usize),
}

impl Default for PagePolicy {
    fn default() -> Self {
        PagePolicy::Count(1)
    }
}

// ── Compiler discovery ───────────────────────────────────────────────────

/// Where to look for a LaTeX compiler.
///
/// Discovery order: [`explicit`](Self::explicit), then each of
/// [`programs`](Self::programs) on `PATH`, then
/// [`fallback_paths`](Self::fallback_paths) that exist on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// Use this executable (path or program name) and skip discovery;
    /// compilation fails if it cannot be found.
    pub explicit: Option<PathBuf>,
    /// Program names searched on `PATH`, in preference order.
    pub programs: Vec<String>,
    /// Install locations checked when nothing is on `PATH`.
    pub fallback_paths: Vec<PathBuf>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            explicit: None,
            programs: vec!["lualatex".into(), "pdflatex".into()],
            fallback_paths: [
                r"C:\texlive\2024\bin\windows\pdflatex.exe",
                r"C:\texlive\2023\bin\windows\pdflatex.exe",
                r"C:\texlive\2022\bin\win32\pdflatex.exe",
                r"C:\texlive\bin\win32\pdflatex.exe",
                r"C:\miktex\bin\pdflatex.exe",
                "/Library/TeX/texbin/pdflatex",
                "/usr/local/texlive/2024/bin/x86_64-linux/pdflatex",
                "/usr/local/texlive/2024/bin/aarch64-linux/pdflatex",
            ]
            .into_iter()
            .map(PathBuf::from)
            .collect(),
        }
    }
}

impl CompilerConfig {
    /// Prepend extra fallback locations (searched before the defaults).
    pub fn with_fallbacks(mut self, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        let mut extra: Vec<PathBuf> = paths.into_iter().collect();
        extra.append(&mut self.fallback_paths);
        self.fallback_paths = extra;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = RosterConfig::builder().build().unwrap();
        assert_eq!(c.page_policy, PagePolicy::Count(1));
        assert_eq!(c.sort_key, SortKey::GivenName);
        assert_eq!(c.output_path, PathBuf::from("./student_roster.pdf"));
        assert!(!c.keep_intermediates);
        assert_eq!(c.compiler.programs, vec!["lualatex", "pdflatex"]);
    }

    #[test]
    fn cap_overrides_page_count() {
        let c = RosterConfig::builder().pages(4).max_per_page(12).build().unwrap();
        assert_eq!(c.page_policy, PagePolicy::MaxPerPage(12));
    }

    #[test]
    fn negative_cap_rejected() {
        let err = RosterConfig::builder().max_per_page(-1).build().unwrap_err();
        assert!(matches!(err, RosterError::InvalidConfiguration(_)));
    }

    #[test]
    fn zero_cap_rejected() {
        assert!(RosterConfig::builder().max_per_page(0).build().is_err());
    }

    #[test]
    fn zero_pages_rejected() {
        assert!(RosterConfig::builder().pages(0).build().is_err());
    }

    #[test]
    fn blank_domain_rejected() {
        assert!(RosterConfig::builder().email_domain("  ").build().is_err());
        assert!(RosterConfig::builder().email_domain("@").build().is_err());
    }

    #[test]
    fn extra_fallbacks_come_first() {
        let c = CompilerConfig::default().with_fallbacks([PathBuf::from("/opt/tex/pdflatex")]);
        assert_eq!(c.fallback_paths[0], PathBuf::from("/opt/tex/pdflatex"));
        assert!(c.fallback_paths.len() > 1);
    }

    #[test]
    fn debug_hides_callback() {
        use crate::progress::NoopProgressCallback;
        use std::sync::Arc;
        let c = RosterConfig::builder()
            .progress_callback(Arc::new(NoopProgressCallback))
            .build()
            .unwrap();
        assert!(format!("{c:?}").contains("<dyn RosterProgressCallback>"));
    }
}
