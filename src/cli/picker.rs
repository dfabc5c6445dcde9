//! Interactive page picker.
//!
//! Kept separate from clap parsing: clap handles flags, the picker provides the
//! "run `sentchart` and choose a page" flow. It searches for `*.html` files under
//! the current working directory.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::error::AppError;

/// Default directory recursion depth for finding pages.
const DEFAULT_SEARCH_DEPTH: usize = 4;

/// Prompt the user to select a page from the current directory tree.
///
/// Accepts a number from the list or an explicit path; `q` cancels.
pub fn prompt_for_page_path() -> Result<PathBuf, AppError> {
    let files = discover_pages(Path::new("."));
    if files.is_empty() {
        return Err(AppError::new(
            2,
            "No .html files found. Provide one with `sentchart render --page <file.html>`.",
        ));
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    choose_page(&files, &mut stdin.lock(), &mut stdout.lock())
}

fn choose_page<R: BufRead, W: Write>(files: &[PathBuf], input: &mut R, out: &mut W) -> Result<PathBuf, AppError> {
    let write_err = |e: io::Error| AppError::new(2, format!("Failed to write prompt: {e}"));

    writeln!(out, "Found {} page(s):", files.len()).map_err(write_err)?;
    for (idx, path) in files.iter().enumerate() {
        writeln!(out, "{:>3}) {}", idx + 1, pretty_path(path)).map_err(write_err)?;
    }

    loop {
        write!(out, "Select a page by number (1-{}) or type a path (q to quit): ", files.len())
            .map_err(write_err)?;
        out.flush().map_err(write_err)?;

        let mut line = String::new();
        let bytes = input
            .read_line(&mut line)
            .map_err(|e| AppError::new(2, format!("Failed to read input: {e}")))?;
        if bytes == 0 {
            return Err(AppError::new(
                2,
                "No input received. Provide a page with `sentchart render --page <file.html>`.",
            ));
        }

        let line = line.trim();
        if line.eq_ignore_ascii_case("q") {
            return Err(AppError::new(2, "Canceled."));
        }

        if let Ok(choice) = line.parse::<usize>() {
            if (1..=files.len()).contains(&choice) {
                return validate_page_path(&files[choice - 1]);
            }
            writeln!(out, "Invalid choice: {choice}. Enter a number between 1 and {}.", files.len())
                .map_err(write_err)?;
            continue;
        }

        match validate_page_path(Path::new(line)) {
            Ok(path) => return Ok(path),
            Err(err) => writeln!(out, "{err}").map_err(write_err)?,
        }
    }
}

/// Validate the path points to an existing `.html`/`.htm` file.
pub fn validate_page_path(path: &Path) -> Result<PathBuf, AppError> {
    if !path.exists() {
        return Err(AppError::new(2, format!("Page not found: {}", path.display())));
    }
    if path.is_dir() {
        return Err(AppError::new(
            2,
            format!("Expected a file, got a directory: {}", path.display()),
        ));
    }
    if !is_html(path) {
        return Err(AppError::new(
            2,
            format!("Expected an .html file (got: {}).", path.display()),
        ));
    }
    Ok(path.to_path_buf())
}

/// Discover pages under `root` (deterministic order).
pub fn discover_pages(root: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    find_pages_inner(root, 0, DEFAULT_SEARCH_DEPTH, &mut out);
    out.sort_by_key(|p| pretty_path(p));
    out
}

fn find_pages_inner(root: &Path, depth: usize, max_depth: usize, out: &mut Vec<PathBuf>) {
    if depth > max_depth {
        return;
    }

    let Ok(entries) = fs::read_dir(root) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };

        if file_type.is_dir() {
            if !should_skip_dir(&path) {
                find_pages_inner(&path, depth + 1, max_depth, out);
            }
        } else if file_type.is_file() && is_html(&path) {
            out.push(path);
        }
    }
}

fn is_html(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"))
}

fn should_skip_dir(path: &Path) -> bool {
    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
    matches!(name, ".git" | "target" | "node_modules")
}

fn pretty_path(path: &Path) -> String {
    let stripped = path.strip_prefix("./").unwrap_or(path);
    stripped.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("b")).unwrap();
        fs::create_dir_all(dir.path().join("target")).unwrap();
        fs::write(dir.path().join("b").join("nvda.html"), "").unwrap();
        fs::write(dir.path().join("a.htm"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        fs::write(dir.path().join("target").join("skip.html"), "").unwrap();
        dir
    }

    #[test]
    fn discovers_html_pages_sorted_and_skips_build_dirs() {
        let dir = site();
        let found = discover_pages(dir.path());
        let names: Vec<_> = found
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, ["a.htm", "b/nvda.html"]);
    }

    #[test]
    fn choice_by_number_after_invalid_input() {
        let dir = site();
        let files = discover_pages(dir.path());
        let mut input = io::Cursor::new("7\nnope.html\n2\n");
        let mut out = Vec::new();
        let picked = choose_page(&files, &mut input, &mut out).unwrap();
        assert!(picked.ends_with("nvda.html"));

        let shown = String::from_utf8(out).unwrap();
        assert!(shown.contains("Found 2 page(s):"));
        assert!(shown.contains("Invalid choice: 7."));
        assert!(shown.contains("Page not found: nope.html"));
    }

    #[test]
    fn quit_and_eof_cancel() {
        let files = vec![PathBuf::from("x.html")];
        let mut out = Vec::new();
        let err = choose_page(&files, &mut io::Cursor::new("q\n"), &mut out).unwrap_err();
        assert_eq!(err.to_string(), "Canceled.");
        assert!(choose_page(&files, &mut io::Cursor::new(""), &mut out).is_err());
    }

    #[test]
    fn rejects_non_html_files() {
        let dir = site();
        let err = validate_page_path(&dir.path().join("notes.txt")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
