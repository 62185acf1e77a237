//! Collision handling for destination paths.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::video_sort::fs::FileSystem;

/// Source and destination paths committed during one run.
///
/// Includes simulated moves in preview mode,
/// so later files see every earlier decision.
#[derive(Debug, Clone, Default)]
pub struct MoveRecords {
    moves: Vec<(PathBuf, PathBuf)>,
    sources: HashSet<PathBuf>,
    destinations: HashSet<PathBuf>,
}

/// Outcome of resolving a desired destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Nothing occupies the path.
    Free(PathBuf),
    /// An existing file from before this run should be replaced.
    Overwrite(PathBuf),
}

/// Finds a destination that does not collide with existing files or earlier moves.
#[derive(Debug)]
pub struct DuplicateResolver<'a, F: FileSystem> {
    fs: &'a F,
    overwrite: bool,
    separator: char,
}

impl MoveRecords {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, source: &Path, destination: &Path) {
        self.sources.insert(source.to_path_buf());
        self.destinations.insert(destination.to_path_buf());
        self.moves.push((source.to_path_buf(), destination.to_path_buf()));
    }

    #[must_use]
    pub fn contains_source(&self, path: &Path) -> bool {
        self.sources.contains(path)
    }

    #[must_use]
    pub fn contains_destination(&self, path: &Path) -> bool {
        self.destinations.contains(path)
    }

    /// All recorded moves in the order they were made.
    #[must_use]
    pub fn moves(&self) -> &[(PathBuf, PathBuf)] {
        &self.moves
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.moves.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}

impl Resolution {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Free(path) | Self::Overwrite(path) => path,
        }
    }

    #[must_use]
    pub fn into_path(self) -> PathBuf {
        match self {
            Self::Free(path) | Self::Overwrite(path) => path,
        }
    }
}

impl<'a, F: FileSystem> DuplicateResolver<'a, F> {
    #[must_use]
    pub const fn new(fs: &'a F, overwrite: bool, separator: char) -> Self {
        Self { fs, overwrite, separator }
    }

    /// Resolve the final destination for a desired path.
    ///
    /// A taken path becomes `<stem><separator>(n)<ext>` with the first free `n` from 2 upwards,
    /// unless overwrite is enabled and the existing file was not placed by this run.
    #[must_use]
    pub fn resolve(&self, desired: &Path, records: &MoveRecords) -> Resolution {
        if !self.is_taken(desired, records) {
            return Resolution::Free(desired.to_path_buf());
        }
        if self.overwrite && !records.contains_destination(desired) {
            return Resolution::Overwrite(desired.to_path_buf());
        }

        let mut number: u64 = 2;
        loop {
            let candidate = self.numbered_path(desired, number);
            if !self.is_taken(&candidate, records) {
                return Resolution::Free(candidate);
            }
            number += 1;
        }
    }

    fn is_taken(&self, path: &Path, records: &MoveRecords) -> bool {
        self.fs.exists(path) || records.contains_destination(path)
    }

    fn numbered_path(&self, path: &Path, number: u64) -> PathBuf {
        let suffix = format!("{}({number})", self.separator);
        crate::insert_suffix_before_extension(path, &suffix)
    }
}

#[cfg(test)]
mod duplicate_resolver_tests {
    use super::*;

    use std::fs::File;

    use tempfile::tempdir;

    use crate::video_sort::fs::LocalFileSystem;

    #[test]
    fn free_path_is_kept() {
        let dir = tempdir().unwrap();
        let desired = dir.path().join("Movie (2010).mkv");
        let resolver = DuplicateResolver::new(&LocalFileSystem, false, ' ');
        assert_eq!(resolver.resolve(&desired, &MoveRecords::new()), Resolution::Free(desired));
    }

    #[test]
    fn existing_file_gets_suffix() {
        let dir = tempdir().unwrap();
        let desired = dir.path().join("Movie (2010).mkv");
        File::create(&desired).unwrap();
        let resolver = DuplicateResolver::new(&LocalFileSystem, false, ' ');
        assert_eq!(
            resolver.resolve(&desired, &MoveRecords::new()),
            Resolution::Free(dir.path().join("Movie (2010) (2).mkv"))
        );
    }

    #[test]
    fn existing_file_overwritten_when_enabled() {
        let dir = tempdir().unwrap();
        let desired = dir.path().join("Movie.mkv");
        File::create(&desired).unwrap();
        let resolver = DuplicateResolver::new(&LocalFileSystem, true, ' ');
        assert_eq!(
            resolver.resolve(&desired, &MoveRecords::new()),
            Resolution::Overwrite(desired)
        );
    }

    #[test]
    fn in_run_destination_never_overwritten() {
        let dir = tempdir().unwrap();
        let desired = dir.path().join("Movie.mkv");
        let mut records = MoveRecords::new();
        records.record(&dir.path().join("source.mkv"), &desired);
        let resolver = DuplicateResolver::new(&LocalFileSystem, true, '.');
        assert_eq!(
            resolver.resolve(&desired, &records),
            Resolution::Free(dir.path().join("Movie.(2).mkv"))
        );
    }

    #[test]
    fn many_collisions_are_numbered_in_order() {
        let dir = tempdir().unwrap();
        let desired = dir.path().join("Show_S01E01.mkv");
        let resolver = DuplicateResolver::new(&LocalFileSystem, false, '_');
        let mut records = MoveRecords::new();
        let mut results = Vec::new();
        for index in 0..5 {
            let resolved = resolver.resolve(&desired, &records).into_path();
            records.record(&dir.path().join(format!("source{index}.mkv")), &resolved);
            results.push(crate::path_to_filename_string(&resolved));
        }
        assert_eq!(
            results,
            vec![
                "Show_S01E01.mkv",
                "Show_S01E01_(2).mkv",
                "Show_S01E01_(3).mkv",
                "Show_S01E01_(4).mkv",
                "Show_S01E01_(5).mkv",
            ]
        );
    }

    #[test]
    fn skips_numbers_taken_on_disk() {
        let dir = tempdir().unwrap();
        let desired = dir.path().join("Movie.mkv");
        File::create(&desired).unwrap();
        File::create(dir.path().join("Movie (2).mkv")).unwrap();
        let resolver = DuplicateResolver::new(&LocalFileSystem, false, ' ');
        assert_eq!(
            resolver.resolve(&desired, &MoveRecords::new()).path(),
            dir.path().join("Movie (3).mkv")
        );
    }

    #[test]
    fn records_track_sources() {
        let mut records = MoveRecords::new();
        assert!(records.is_empty());
        records.record(Path::new("/src/a.mkv"), Path::new("/dst/a.mkv"));
        assert!(records.contains_source(Path::new("/src/a.mkv")));
        assert!(records.contains_destination(Path::new("/dst/a.mkv")));
        assert!(!records.contains_source(Path::new("/dst/a.mkv")));
        assert_eq!(records.len(), 1);
    }
}
