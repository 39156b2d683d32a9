//! Benchmark file targets
//!
//! The [`PathProvider`] maps logical filenames to paths under one working
//! directory and owns file creation for the write direction: ensure the
//! directory exists, drop any stale file at the name, then create either the
//! plain named file or a uniquely-named temporary with the name as prefix.
//! Lookup (`get_file`) performs no checks at all - the read direction relies
//! on a prior write having populated the path.

use crate::Result;
use anyhow::Context;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Default working directory for benchmark files
pub const DEFAULT_DIRECTORY: &str = "dir";

/// Maps logical filenames to filesystem paths under one directory
#[derive(Debug, Clone)]
pub struct PathProvider {
    root: PathBuf,
}

impl PathProvider {
    /// Provider rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The provider's working directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create a fresh backing file for `filename`
    ///
    /// Ensures the working directory exists (single level, no recursion),
    /// deletes any pre-existing file at `root/filename`, then creates either
    /// the plain named file or - when `temporary` is set - a uniquely-named
    /// temporary file inside the directory using `filename` as prefix.
    ///
    /// # Errors
    ///
    /// Propagates any filesystem error that makes creation impossible.
    pub fn create_file(&self, filename: &str, temporary: bool) -> Result<PathBuf> {
        if !self.root.exists() {
            fs::create_dir(&self.root)
                .with_context(|| format!("failed to create directory {}", self.root.display()))?;
        }

        let path = self.root.join(filename);
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to delete stale file {}", path.display()));
            }
        }

        if temporary {
            let temp = tempfile::Builder::new()
                .prefix(filename)
                .tempfile_in(&self.root)
                .with_context(|| {
                    format!("failed to create temporary file in {}", self.root.display())
                })?;
            // Detach from drop-time deletion; benchmark files must survive
            // until the read phase consumes them.
            let kept = temp
                .into_temp_path()
                .keep()
                .context("failed to persist temporary file")?;
            Ok(kept)
        } else {
            fs::File::create(&path)
                .with_context(|| format!("failed to create file {}", path.display()))?;
            Ok(path)
        }
    }

    /// Resolve `filename` under the working directory, with no existence
    /// check or creation
    pub fn get_file(&self, filename: &str) -> PathBuf {
        self.root.join(filename)
    }
}

impl Default for PathProvider {
    fn default() -> Self {
        Self::new(DEFAULT_DIRECTORY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_file_makes_directory_and_file() {
        let temp_dir = TempDir::new().unwrap();
        let provider = PathProvider::new(temp_dir.path().join("bench"));

        let path = provider.create_file("file.txt", false).unwrap();
        assert!(path.exists());
        assert_eq!(path, provider.root().join("file.txt"));
    }

    #[test]
    fn test_create_file_replaces_existing() {
        let temp_dir = TempDir::new().unwrap();
        let provider = PathProvider::new(temp_dir.path().join("bench"));

        let path = provider.create_file("file.txt", false).unwrap();
        std::fs::write(&path, b"stale contents").unwrap();

        let recreated = provider.create_file("file.txt", false).unwrap();
        assert_eq!(recreated, path);
        assert_eq!(std::fs::metadata(&recreated).unwrap().len(), 0);
    }

    #[test]
    fn test_create_temporary_uses_prefix() {
        let temp_dir = TempDir::new().unwrap();
        let provider = PathProvider::new(temp_dir.path().join("bench"));

        let a = provider.create_file("scratch", true).unwrap();
        let b = provider.create_file("scratch", true).unwrap();

        assert!(a.exists());
        assert!(b.exists());
        assert_ne!(a, b);
        for path in [&a, &b] {
            let name = path.file_name().unwrap().to_str().unwrap();
            assert!(name.starts_with("scratch"), "unexpected name {}", name);
        }
    }

    #[test]
    fn test_get_file_does_not_create() {
        let temp_dir = TempDir::new().unwrap();
        let provider = PathProvider::new(temp_dir.path().join("bench"));

        let path = provider.get_file("nothing.dat");
        assert_eq!(path, provider.root().join("nothing.dat"));
        assert!(!path.exists());
        assert!(!provider.root().exists());
    }
}
