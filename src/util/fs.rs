//! Filesystem utilities.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::{glob, Pattern};

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Read a file to string, with nice error messages.
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read file: {}", path.display()))
}

/// Write a string to a file, creating parent directories if needed.
pub fn write_string(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, contents).with_context(|| format!("failed to write file: {}", path.display()))
}

/// Find entries (files or directories) matching a glob pattern inside `dir`.
///
/// `dir` is matched literally; only `pattern` is interpreted as a glob.
/// Results are sorted so repeated scans of an unchanged tree agree.
pub fn glob_paths(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let full_pattern = Path::new(&Pattern::escape(&dir.to_string_lossy())).join(pattern);
    let pattern_str = full_pattern.to_string_lossy();

    let mut results = Vec::new();
    for entry in glob(&pattern_str).with_context(|| format!("invalid glob pattern: {}", pattern))? {
        match entry {
            Ok(path) => results.push(path),
            Err(e) => tracing::warn!("glob error: {}", e),
        }
    }

    results.sort();
    Ok(results)
}

/// The first directory in `dirs` holding an entry that matches `pattern`.
pub fn first_dir_containing(dirs: &[PathBuf], pattern: &str) -> Result<Option<PathBuf>> {
    for dir in dirs {
        if !glob_paths(dir, pattern)?.is_empty() {
            return Ok(Some(dir.clone()));
        }
    }
    Ok(None)
}

/// Make a path absolute and resolve symlinks.
///
/// Returns the absolute path as-is if canonicalization fails.
pub fn absolute_path(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };
    absolute.canonicalize().unwrap_or(absolute)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_glob_paths_sorted_and_includes_dirs() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("Makefile.tau-pdt"), "").unwrap();
        fs::write(tmp.path().join("Makefile.tau"), "").unwrap();
        fs::create_dir(tmp.path().join("Makefile.tau-mpi")).unwrap();
        fs::write(tmp.path().join("README"), "").unwrap();

        let found = glob_paths(tmp.path(), "Makefile.tau*").unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["Makefile.tau", "Makefile.tau-mpi", "Makefile.tau-pdt"]);
    }

    #[test]
    fn test_glob_paths_literal_directory() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("tau[2024]*?");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("Makefile.tau-pdt"), "").unwrap();

        let found = glob_paths(&dir, "Makefile.tau*").unwrap();
        assert_eq!(found, vec![dir.join("Makefile.tau-pdt")]);
    }

    #[test]
    fn test_first_dir_containing() {
        let tmp = TempDir::new().unwrap();
        let empty = tmp.path().join("empty");
        let with_header = tmp.path().join("include");
        fs::create_dir_all(&empty).unwrap();
        fs::create_dir_all(&with_header).unwrap();
        fs::write(with_header.join("mpi.h"), "").unwrap();

        let dirs = vec![empty.clone(), with_header.clone()];
        assert_eq!(first_dir_containing(&dirs, "mpi.h").unwrap(), Some(with_header));
        assert_eq!(first_dir_containing(&[empty], "mpi.h").unwrap(), None);
    }

    #[test]
    fn test_write_string_creates_parents() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a/b/c.txt");
        write_string(&path, "hello").unwrap();
        assert_eq!(read_to_string(&path).unwrap(), "hello");
    }
}
