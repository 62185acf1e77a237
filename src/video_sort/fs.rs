//! Filesystem operations used when sorting.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

/// The file operations the sorter needs.
pub trait FileSystem {
    fn exists(&self, path: &Path) -> bool;

    fn file_size(&self, path: &Path) -> Result<u64>;

    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Move a file, replacing nothing.
    fn rename(&self, from: &Path, to: &Path) -> Result<()>;

    fn remove_file(&self, path: &Path) -> Result<()>;

    fn remove_dir_all(&self, path: &Path) -> Result<()>;

    /// Paths of the direct children of a directory, sorted by name.
    fn list_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;

    /// All files under a directory, sorted by name within each directory.
    ///
    /// Entries that cannot be read are returned as errors in place,
    /// so the remaining files can still be processed.
    fn walk_files(&self, root: &Path) -> Vec<Result<PathBuf>>;
}

/// [`FileSystem`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl FileSystem for LocalFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn file_size(&self, path: &Path) -> Result<u64> {
        Ok(fs::metadata(path)
            .with_context(|| format!("Failed to read metadata: {}", path.display()))?
            .len())
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).with_context(|| format!("Failed to create directory: {}", path.display()))
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            // Rename does not work across filesystems
            Err(error) if error.kind() == io::ErrorKind::CrossesDevices => {
                fs::copy(from, to)
                    .with_context(|| format!("Failed to copy {} to {}", from.display(), to.display()))?;
                fs::remove_file(from).with_context(|| format!("Failed to remove file: {}", from.display()))
            }
            Err(error) => Err(error).with_context(|| format!("Failed to move {} to {}", from.display(), to.display())),
        }
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        fs::remove_file(path).with_context(|| format!("Failed to remove file: {}", path.display()))
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        fs::remove_dir_all(path).with_context(|| format!("Failed to remove directory: {}", path.display()))
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let mut paths = fs::read_dir(path)
            .with_context(|| format!("Failed to read directory: {}", path.display()))?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<io::Result<Vec<_>>>()
            .with_context(|| format!("Failed to read directory entry in {}", path.display()))?;
        paths.sort();
        Ok(paths)
    }

    fn walk_files(&self, root: &Path) -> Vec<Result<PathBuf>> {
        WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) if entry.file_type().is_file() => Some(Ok(entry.into_path())),
                Ok(_) => None,
                Err(error) => Some(Err(error).with_context(|| format!("Failed to walk {}", root.display()))),
            })
            .collect()
    }
}

#[cfg(test)]
mod local_file_system_tests {
    use super::*;

    use std::fs::File;
    use std::io::Write;

    use tempfile::tempdir;

    #[test]
    fn rename_creates_target() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("a.mkv");
        File::create(&source).unwrap();
        let target = dir.path().join("b.mkv");

        LocalFileSystem.rename(&source, &target).unwrap();
        assert!(!source.exists());
        assert!(target.exists());
    }

    #[test]
    fn file_size_reads_length() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("file.bin");
        File::create(&path).unwrap().write_all(&[0u8; 42]).unwrap();
        assert_eq!(LocalFileSystem.file_size(&path).unwrap(), 42);
    }

    #[test]
    fn missing_file_size_is_error() {
        let dir = tempdir().unwrap();
        assert!(LocalFileSystem.file_size(&dir.path().join("missing")).is_err());
    }

    #[test]
    fn list_dir_is_sorted() {
        let dir = tempdir().unwrap();
        for name in ["c.txt", "a.txt", "b.txt"] {
            File::create(dir.path().join(name)).unwrap();
        }
        let names: Vec<String> = LocalFileSystem
            .list_dir(dir.path())
            .unwrap()
            .iter()
            .map(|path| crate::path_to_filename_string(path))
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "c.txt"]);
    }

    #[test]
    fn walk_files_skips_directories() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("sub/empty")).unwrap();
        File::create(dir.path().join("sub/b.mkv")).unwrap();
        File::create(dir.path().join("a.mkv")).unwrap();

        let files: Vec<PathBuf> = LocalFileSystem
            .walk_files(dir.path())
            .into_iter()
            .map(Result::unwrap)
            .collect();
        assert_eq!(files, vec![dir.path().join("a.mkv"), dir.path().join("sub/b.mkv")]);
    }

    #[test]
    fn walk_missing_root_is_error() {
        let dir = tempdir().unwrap();
        let entries = LocalFileSystem.walk_files(&dir.path().join("missing"));
        assert_eq!(entries.len(), 1);
        assert!(entries[0].is_err());
    }
}
