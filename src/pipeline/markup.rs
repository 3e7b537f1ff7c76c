//! LaTeX/TikZ rendering of the planned pages.
//!
//! Each page becomes one centred `tikzpicture`. A photo node is anchored
//! at its cell's top-left corner and sized to the cell with
//! `keepaspectratio`, so photos shrink to fit but are never stretched. The
//! caption node sits just below the photo and links the name to a
//! `mailto:` URL.

use crate::error::RosterError;
use crate::pipeline::layout::PageLayout;
use std::fmt::Write as _;
use std::path::Path;
use tracing::info;

const PREAMBLE: &str = r"\documentclass[letterpaper]{article}
\usepackage[margin=1cm]{geometry}
\usepackage{graphicx}
\usepackage{tikz}
\usetikzlibrary{positioning}
\usepackage[colorlinks,urlcolor=blue!25!black]{hyperref}
\pagestyle{empty}
\begin{document}
";

/// Render the full document for `pages`.
///
/// Image paths under `base_dir` are written relative to it; the compiler
/// runs from that directory.
pub fn render_markup(pages: &[PageLayout<'_>], base_dir: &Path) -> String {
    let mut tex = String::from(PREAMBLE);

    for page in pages {
        tex.push_str("\n\\centerline{\n\\begin{tikzpicture}[node distance=1ex and 1ex]");
        for (idx, student) in page.students.iter().enumerate() {
            let (x, y) = page.position(idx);
            let image = tex_path(&student.image_path, base_dir);
            // `write!` into a String cannot fail.
            let _ = write!(
                tex,
                "\n\\node[anchor=north west] (img{idx}) at ({x:.4}, {y:.4}) \
                 {{\\includegraphics[width={w:.4}cm,height={h:.4}cm,keepaspectratio]{{{image}}}}};\
                 \n\\node[below=0.1cm of img{idx}] {{\\href{{mailto:{email}}}{{{name}}}}};",
                w = page.cell_width,
                h = page.cell_height,
                email = student.email,
                name = student.name,
            );
        }
        tex.push_str("\n\\end{tikzpicture}\n}");
    }

    tex.push_str("\n\\end{document}\n");
    tex
}

/// Render `pages` and write the result to `path`.
pub fn write_markup(pages: &[PageLayout<'_>], path: &Path) -> Result<(), RosterError> {
    let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
    let tex = render_markup(pages, base_dir);
    if !base_dir.as_os_str().is_empty() {
        std::fs::create_dir_all(base_dir).map_err(|e| RosterError::write_failed(base_dir, e))?;
    }
    std::fs::write(path, tex).map_err(|e| RosterError::write_failed(path, e))?;
    info!("Wrote {} ({} pages)", path.display(), pages.len());
    Ok(())
}

/// Path as LaTeX expects it: relative to `base_dir` when possible, with
/// forward slashes.
fn tex_path(path: &Path, base_dir: &Path) -> String {
    let rel = path.strip_prefix(base_dir).unwrap_or(path);
    rel.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::layout::layout_page;
    use crate::roster::StudentRecord;
    use std::path::PathBuf;

    fn student(name: &str, dir: &Path) -> StudentRecord {
        StudentRecord {
            name: name.to_string(),
            email: format!("{}@example.edu", name.split(' ').next().unwrap().to_lowercase()),
            image_path: dir.join("extracted_students").join(format!("{}.png", name.replace(' ', "_"))),
        }
    }

    #[test]
    fn document_structure() {
        let base = PathBuf::from("/work");
        let s = vec![student("Ann Lee", &base), student("Bob Ray", &base)];
        let pages = vec![layout_page(&s[..1], 1.0), layout_page(&s[1..], 1.0)];
        let tex = render_markup(&pages, &base);

        assert!(tex.starts_with("\\documentclass[letterpaper]{article}"));
        assert!(tex.trim_end().ends_with("\\end{document}"));
        assert_eq!(tex.matches("\\begin{tikzpicture}").count(), 2);
        assert_eq!(tex.matches("\\end{tikzpicture}").count(), 2);
        assert!(tex.contains("\\usepackage[colorlinks,urlcolor=blue!25!black]{hyperref}"));
    }

    #[test]
    fn photo_and_caption_nodes() {
        let base = PathBuf::from("/work");
        let s = vec![student("Ann Lee", &base)];
        let pages = vec![layout_page(&s, 1.0)];
        let tex = render_markup(&pages, &base);

        assert!(tex.contains(
            "\\node[anchor=north west] (img0) at (0.0000, 0.0000) \
             {\\includegraphics[width=19.0000cm,height=25.0000cm,keepaspectratio]\
             {extracted_students/Ann_Lee.png}};"
        ));
        assert!(tex.contains(
            "\\node[below=0.1cm of img0] {\\href{mailto:ann@example.edu}{Ann Lee}};"
        ));
    }

    #[test]
    fn second_row_moves_down() {
        let base = PathBuf::from("/w");
        let s: Vec<StudentRecord> = ["A a", "B b", "C c"].iter().map(|n| student(n, &base)).collect();
        // ratio 1, 3 photos → 2 columns, 2 rows; img2 starts row 1.
        let page = layout_page(&s, 1.0);
        let tex = render_markup(std::slice::from_ref(&page), &base);
        let y = -(page.cell_height + 1.5);
        assert!(tex.contains(&format!("(img2) at (0.0000, {y:.4})")), "{tex}");
    }

    #[test]
    fn empty_page_renders_empty_canvas() {
        let pages = vec![layout_page(&[], 1.0)];
        let tex = render_markup(&pages, Path::new("/w"));
        assert!(tex.contains("\\begin{tikzpicture}[node distance=1ex and 1ex]\n\\end{tikzpicture}"));
        assert!(!tex.contains("\\node"));
    }

    #[test]
    fn paths_outside_base_stay_absolute() {
        assert_eq!(
            tex_path(Path::new("/photos/A.png"), Path::new("/work")),
            "/photos/A.png"
        );
        assert_eq!(tex_path(Path::new("/work/x/A.png"), Path::new("/work")), "x/A.png");
    }

    #[test]
    fn write_markup_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let s = vec![student("Ann Lee", dir.path())];
        let pages = vec![layout_page(&s, 0.75)];
        let path = dir.path().join("student_roster.tex");
        write_markup(&pages, &path).unwrap();
        let tex = std::fs::read_to_string(&path).unwrap();
        assert!(tex.contains("{extracted_students/Ann_Lee.png}"));
    }
}
