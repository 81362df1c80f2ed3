//! Interactive CSV picker.
//!
//! Used when no source was given on the command line or in the environment:
//! lists `*.csv` files under the working directory and lets the user choose.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::error::AppError;

/// Directory recursion depth when looking for CSV files.
const DEFAULT_SEARCH_DEPTH: usize = 3;

/// Prompt on stdin/stdout for a CSV file from the current directory tree.
///
/// Accepts a list number or an explicit path; `q` cancels.
pub fn prompt_for_csv_path() -> Result<PathBuf, AppError> {
    let files = discover_csv_files(Path::new("."));
    if files.is_empty() {
        return Err(AppError::new(
            2,
            "No data source given and no .csv files found. Pass one with `--source <file.csv|url>`.",
        ));
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    choose_from(&files, stdin.lock(), stdout.lock())
}

/// Run the selection dialogue over arbitrary input/output streams.
pub fn choose_from<R: BufRead, W: Write>(files: &[PathBuf], mut input: R, mut output: W) -> Result<PathBuf, AppError> {
    let io_err = |e: io::Error| AppError::new(2, format!("Prompt I/O failed: {e}"));

    writeln!(output, "Found {} CSV file(s):", files.len()).map_err(io_err)?;
    for (idx, path) in files.iter().enumerate() {
        writeln!(output, "{:>3}) {}", idx + 1, pretty_path(path)).map_err(io_err)?;
    }

    loop {
        write!(output, "Select a file (1-{}), type a path, or q to quit: ", files.len()).map_err(io_err)?;
        output.flush().map_err(io_err)?;

        let mut line = String::new();
        if input.read_line(&mut line).map_err(io_err)? == 0 {
            return Err(AppError::new(2, "No selection made."));
        }

        let answer = line.trim();
        if answer.eq_ignore_ascii_case("q") {
            return Err(AppError::new(2, "Canceled."));
        }

        if let Ok(choice) = answer.parse::<usize>() {
            if (1..=files.len()).contains(&choice) {
                return Ok(files[choice - 1].clone());
            }
            writeln!(output, "No file numbered {choice}.").map_err(io_err)?;
            continue;
        }

        match validate_csv_path(Path::new(answer)) {
            Ok(path) => return Ok(path),
            Err(err) => writeln!(output, "{err}").map_err(io_err)?,
        }
    }
}

/// Validate the provided path points to an existing `.csv` file.
pub fn validate_csv_path(path: &Path) -> Result<PathBuf, AppError> {
    if !path.exists() {
        return Err(AppError::new(2, format!("CSV file not found: {}", path.display())));
    }
    if path.is_dir() {
        return Err(AppError::new(
            2,
            format!("Expected a file, got a directory: {}", path.display()),
        ));
    }
    if !has_csv_extension(path) {
        return Err(AppError::new(2, format!("Expected a .csv file, got: {}", path.display())));
    }
    Ok(path.to_path_buf())
}

/// `*.csv` files under `root` (depth-limited, deterministic order).
pub fn discover_csv_files(root: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    find_csv_files_inner(root, 0, DEFAULT_SEARCH_DEPTH, &mut out);
    out.sort_by_key(|p| pretty_path(p));
    out
}

fn find_csv_files_inner(root: &Path, depth: usize, max_depth: usize, out: &mut Vec<PathBuf>) {
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
                find_csv_files_inner(&path, depth + 1, max_depth, out);
            }
        } else if file_type.is_file() && has_csv_extension(&path) {
            out.push(path);
        }
    }
}

fn has_csv_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
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

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "Date,TICKER,Close_Price_Raw\n").unwrap();
    }

    #[test]
    fn discovers_csv_files_and_skips_build_dirs() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("b.csv"));
        touch(&dir.path().join("nested/a.CSV"));
        touch(&dir.path().join("target/skip.csv"));
        fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let found = discover_csv_files(dir.path());
        let names: Vec<_> = found
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, vec!["b.csv", "nested/a.CSV"]);
    }

    #[test]
    fn choose_by_number_after_bad_input() {
        let files = vec![PathBuf::from("one.csv"), PathBuf::from("two.csv")];
        let mut out = Vec::new();
        let picked = choose_from(&files, "9\n2\n".as_bytes(), &mut out).unwrap();
        assert_eq!(picked, PathBuf::from("two.csv"));
        assert!(String::from_utf8(out).unwrap().contains("No file numbered 9."));
    }

    #[test]
    fn quit_and_eof_cancel() {
        let files = vec![PathBuf::from("one.csv")];
        assert!(choose_from(&files, "q\n".as_bytes(), Vec::new()).is_err());
        assert!(choose_from(&files, "".as_bytes(), Vec::new()).is_err());
    }

    #[test]
    fn validate_rejects_non_csv() {
        let dir = tempfile::tempdir().unwrap();
        let txt = dir.path().join("x.txt");
        fs::write(&txt, "x").unwrap();
        assert!(validate_csv_path(&txt).is_err());
        assert!(validate_csv_path(dir.path()).is_err());
        assert!(validate_csv_path(&dir.path().join("missing.csv")).is_err());
    }
}
