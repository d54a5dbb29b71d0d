//! Download destination handling.

use std::path::{Path, PathBuf};

use crate::error::Result;

/// An open download destination directory.
///
/// Opened from a path or locator string by the download entry point and
/// shared read-mostly with the worker pool. Opening creates the directory
/// if it does not exist.
#[derive(Debug, Clone)]
pub struct Destination {
    root: PathBuf,
}

impl Destination {
    /// Open (and if needed create) the destination directory.
    pub fn open(locator: impl AsRef<Path>) -> Result<Self> {
        let root = locator.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// The destination's root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of an artifact inside the destination.
    pub fn path_of(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Whether the destination already contains the named artifact.
    pub fn contains(&self, name: &str) -> bool {
        self.path_of(name).exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("nested/dest");
        let dest = Destination::open(&target).unwrap();

        assert!(target.is_dir());
        assert_eq!(dest.root(), target);
    }

    #[test]
    fn test_contains_checks_files() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = Destination::open(tmp.path()).unwrap();

        assert!(!dest.contains("a.jpg"));
        std::fs::write(dest.path_of("a.jpg"), b"x").unwrap();
        assert!(dest.contains("a.jpg"));
    }
}
