//! Input validation and the working directory for intermediate files.
//!
//! Extracted photos and the `.tex` file live either in a [`TempDir`] that is
//! removed when the [`Workspace`] is dropped (on success, error or panic),
//! or in the current directory when the caller wants to keep them.

use crate::error::RosterError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

/// Directory name for extracted photos.
pub const IMAGE_DIR: &str = "extracted_students";

/// File name of the generated markup.
pub const MARKUP_FILE: &str = "student_roster.tex";

/// Validate that `path` exists, is readable and starts with `%PDF`.
pub fn check_pdf(path: &Path) -> Result<(), RosterError> {
    if !path.exists() {
        return Err(RosterError::InputNotFound {
            path: path.to_path_buf(),
        });
    }

    match std::fs::File::open(path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                return Err(RosterError::NotAPdf {
                    path: path.to_path_buf(),
                    magic,
                });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(RosterError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(_) => {
            return Err(RosterError::InputNotFound {
                path: path.to_path_buf(),
            });
        }
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(())
}

/// Where intermediate artifacts are written.
pub enum Workspace {
    /// Files kept under a caller-chosen directory.
    Persistent(PathBuf),
    /// Files written to a temporary directory.
    /// The `TempDir` is kept alive until the workspace is dropped.
    Transient { root: PathBuf, _temp_dir: TempDir },
}

impl Workspace {
    /// Open a workspace: `root` if `keep` is set, else a fresh temp dir.
    pub fn open(keep: bool, root: impl Into<PathBuf>) -> Result<Self, RosterError> {
        if keep {
            return Ok(Workspace::Persistent(root.into()));
        }
        let temp_dir = tempfile::Builder::new()
            .prefix("photoroster-")
            .tempdir()
            .map_err(|e| RosterError::Internal(format!("tempdir: {e}")))?;
        debug!("Transient workspace: {}", temp_dir.path().display());
        Ok(Workspace::Transient {
            root: temp_dir.path().to_path_buf(),
            _temp_dir: temp_dir,
        })
    }

    /// Root directory of the workspace.
    pub fn root(&self) -> &Path {
        match self {
            Workspace::Persistent(p) => p,
            Workspace::Transient { root, .. } => root,
        }
    }

    /// Directory that receives extracted photos.
    pub fn image_dir(&self) -> PathBuf {
        self.root().join(IMAGE_DIR)
    }

    /// Path of the generated markup file.
    pub fn markup_path(&self) -> PathBuf {
        self.root().join(MARKUP_FILE)
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, Workspace::Transient { .. })
    }
}
