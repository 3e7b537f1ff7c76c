//! LaTeX compiler adapter.
//!
//! [`discover`] resolves a compiler from [`CompilerConfig`]; [`compile`]
//! runs it in the markup file's directory, moves the produced PDF to the
//! requested location and removes the build intermediates.

use crate::config::CompilerConfig;
use crate::error::RosterError;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::io::ErrorKind;
use tracing::{debug, info};

/// Build artifacts removed after a successful run.
const INTERMEDIATE_EXTENSIONS: &[&str] = &["aux", "log", "out"];

/// Find a compiler: explicit path, then `PATH`, then fallback locations.
///
/// An explicit compiler that cannot be found is an error; the search does
/// not fall back to the default programs.
pub fn discover(config: &CompilerConfig) -> Result<PathBuf, RosterError> {
    if let Some(explicit) = &config.explicit {
        if explicit.exists() {
            return Ok(explicit.clone());
        }
        // A bare program name such as "xelatex".
        return which::which(explicit).map_err(|_| unavailable(explicit));
    }

    for program in &config.programs {
        if let Ok(found) = which::which(program) {
            debug!("Found {} on PATH: {}", program, found.display());
            return Ok(found);
        }
    }

    if let Some(found) = config.fallback_paths.iter().find(|p| p.exists()) {
        debug!("Using fallback compiler {}", found.display());
        return Ok(found.clone());
    }

    Err(RosterError::CompileToolUnavailable {
        programs: config.programs.join(", "),
        locations: config
            .fallback_paths
            .iter()
            .map(|p| format!("  {}", p.display()))
            .collect::<Vec<_>>()
            .join("\n"),
    })
}

fn unavailable(compiler: &Path) -> RosterError {
    RosterError::CompileToolUnavailable {
        programs: compiler.display().to_string(),
        locations: format!("  {} (configured compiler)", compiler.display()),
    }
}

/// Compile `markup_path` with the discovered compiler and move the PDF to
/// `output_pdf`. Returns the final document path.
pub fn compile(
    markup_path: &Path,
    output_pdf: &Path,
    config: &CompilerConfig,
) -> Result<PathBuf, RosterError> {
    let compiler = discover(config)?;
    compile_with(&compiler, markup_path, output_pdf)
}

/// [`compile`] with an already-resolved compiler executable.
pub fn compile_with(
    compiler: &Path,
    markup_path: &Path,
    output_pdf: &Path,
) -> Result<PathBuf, RosterError> {
    let tex_dir = match markup_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let stem = markup_path
        .file_stem()
        .ok_or_else(|| RosterError::Internal(format!("bad markup path {}", markup_path.display())))?
        .to_string_lossy()
        .into_owned();

    info!("Compiling {} with {}", markup_path.display(), compiler.display());
    let output = Command::new(compiler)
        .args(["-interaction=nonstopmode", "-halt-on-error", stem.as_str()])
        .current_dir(&tex_dir)
        .output()
        .map_err(|e| match e.kind() {
            ErrorKind::NotFound | ErrorKind::PermissionDenied => unavailable(compiler),
            _ => RosterError::CompileFailed {
                status: "failed to start".into(),
                log_path: tex_dir.join(format!("{stem}.log")),
                output: e.to_string(),
            },
        })?;

    if !output.status.success() {
        let mut text = String::from_utf8_lossy(&output.stderr).into_owned();
        if text.trim().is_empty() {
            text = tail(&String::from_utf8_lossy(&output.stdout), 20);
        }
        return Err(RosterError::CompileFailed {
            status: output.status.to_string(),
            log_path: tex_dir.join(format!("{stem}.log")),
            output: text,
        });
    }

    let built = tex_dir.join(format!("{stem}.pdf"));
    move_file(&built, output_pdf)?;

    for ext in INTERMEDIATE_EXTENSIONS {
        let path = tex_dir.join(format!("{stem}.{ext}"));
        if let Err(e) = std::fs::remove_file(&path) {
            debug!("Not removing {}: {}", path.display(), e);
        }
    }

    info!("Roster written to {}", output_pdf.display());
    Ok(output_pdf.to_path_buf())
}

/// Rename, falling back to copy + remove across filesystems.
fn move_file(from: &Path, to: &Path) -> Result<(), RosterError> {
    if let Some(parent) = to.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| RosterError::write_failed(parent, e))?;
        }
    }
    if std::fs::rename(from, to).is_ok() {
        return Ok(());
    }
    std::fs::copy(from, to).map_err(|e| RosterError::write_failed(to, e))?;
    if let Err(e) = std::fs::remove_file(from) {
        debug!("Leaving {} behind: {}", from.display(), e);
    }
    Ok(())
}

/// Last `n` lines of `s`.
fn tail(s: &str, n: usize) -> String {
    let lines: Vec<&str> = s.lines().collect();
    lines[lines.len().saturating_sub(n)..].join("\n")
}
