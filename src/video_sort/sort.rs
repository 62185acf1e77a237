//! Sorting a download directory into the movie and series libraries.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::video_sort::config::VideoSortConfig;
use crate::video_sort::dupe::{DuplicateResolver, MoveRecords, Resolution};
use crate::video_sort::fs::{FileSystem, LocalFileSystem};
use crate::video_sort::guess::{Classifier, MediaCategory, SceneNameClassifier};
use crate::video_sort::specifier::{SourceNames, SpecifierMapper};
use crate::video_sort::template::PathTemplate;
use crate::video_sort::text::{TextEncoding, TextNormalizer};

pub const PREVIEW_BANNER: &str = "*** PREVIEW MODE ON - NO CHANGES TO FILE SYSTEM ***";

/// Final status of a sorting run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Nothing was moved.
    Nothing,
    /// At least one file was moved without errors.
    Success,
    /// At least one file failed.
    Failure,
}

/// Sorts the video files of one download directory.
pub struct VideoSort<C: Classifier, F: FileSystem> {
    config: VideoSortConfig,
    classifier: C,
    fs: F,
    normalizer: TextNormalizer,
    records: MoveRecords,
    files_moved: bool,
    errors: bool,
}

impl RunOutcome {
    /// Process exit code understood by NZBGet.
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        match self {
            Self::Success => 93,
            Self::Failure => 94,
            Self::Nothing => 95,
        }
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Nothing => "nothing to do",
            Self::Success => "success",
            Self::Failure => "failure",
        };
        write!(f, "{name}")
    }
}

impl VideoSort<SceneNameClassifier, LocalFileSystem> {
    /// Sorter using the scene name classifier, the local filesystem and the system locale.
    #[must_use]
    pub fn with_defaults(config: VideoSortConfig) -> Self {
        let encoding = TextEncoding::detect();
        Self::new(config, SceneNameClassifier::new(encoding), LocalFileSystem, encoding)
    }
}

impl<C: Classifier, F: FileSystem> VideoSort<C, F> {
    #[must_use]
    pub fn new(config: VideoSortConfig, classifier: C, fs: F, encoding: TextEncoding) -> Self {
        let normalizer = TextNormalizer::new(encoding, &config.lower_words, &config.upper_words);
        Self {
            config,
            classifier,
            fs,
            normalizer,
            records: MoveRecords::new(),
            files_moved: false,
            errors: false,
        }
    }

    /// Moves made during the run, including simulated ones in preview mode.
    #[must_use]
    pub const fn records(&self) -> &MoveRecords {
        &self.records
    }

    /// Process every video file in the source directory and clean up afterwards.
    ///
    /// Errors for single files, including unreadable directory entries,
    /// are logged and reflected in the returned outcome.
    pub fn run(&mut self) -> RunOutcome {
        if !self.fs.exists(&self.config.source) {
            crate::print_info!("Source directory doesn't exist, exiting: {}", self.config.source.display());
            return RunOutcome::Nothing;
        }
        if self.config.preview {
            crate::print_warning!("{PREVIEW_BANNER}");
        }
        if self.config.verbose {
            println!("{}", self.config);
            println!("  encoding:   {:?}", self.normalizer.encoding());
        }

        for entry in self.fs.walk_files(&self.config.source) {
            let path = match entry {
                Ok(path) => path,
                Err(error) => {
                    self.errors = true;
                    crate::print_error!("{error:#}");
                    continue;
                }
            };
            if self.records.contains_source(&path) {
                continue;
            }
            match self.process_file(&path) {
                Ok(moved) => self.files_moved |= moved,
                Err(error) => {
                    self.errors = true;
                    crate::print_error!("Failed: {}", crate::path_to_filename_string(&path));
                    crate::print_error!("{error:#}");
                }
            }
        }

        if self.config.cleanup
            && self.files_moved
            && !self.errors
            && let Err(error) = self.cleanup()
        {
            self.errors = true;
            crate::print_error!("{error:#}");
        }

        self.outcome()
    }

    const fn outcome(&self) -> RunOutcome {
        if self.errors {
            RunOutcome::Failure
        } else if self.files_moved {
            RunOutcome::Success
        } else {
            RunOutcome::Nothing
        }
    }

    /// Sort a single file. Returns true if it was moved.
    fn process_file(&mut self, path: &Path) -> Result<bool> {
        let extension = path
            .extension()
            .map(|ext| self.normalizer.decode(ext))
            .unwrap_or_default();
        if !self.config.is_video_extension(&extension) {
            return Ok(false);
        }
        if self.fs.file_size(path)? < self.config.min_size {
            return Ok(false);
        }

        let guess = self.classifier.classify(path);
        let Some(category) = guess.category() else {
            if self.config.verbose {
                println!(
                    "Skipping {}: could not determine content type",
                    crate::path_to_filename_string(path)
                );
            }
            return Ok(false);
        };
        if self.config.verbose {
            println!("{} ({}): {guess}", crate::path_to_filename_string(path), category.label());
        }

        let names = SourceNames::new(&self.config.source, path, &self.normalizer);
        let mapping = SpecifierMapper::new(&self.normalizer).build(&category, &guess, &names);
        let (root, format) = match category {
            MediaCategory::Movie { .. } => (&self.config.movies_dir, &self.config.movies_format),
            MediaCategory::DatedShow { .. } => (&self.config.dated_dir, &self.config.dated_format),
            MediaCategory::SeasonedShow { .. } => (&self.config.series_dir, &self.config.series_format),
        };
        let template = PathTemplate::new(format);
        let destination = template.destination(root, &mapping);
        if self.config.verbose {
            println!("Destination: {}", destination.display());
        }

        let separator = template.dupe_separator();
        let destination = self.move_file(path, &destination, separator)?;
        self.move_satellites(path, &destination, separator)?;
        Ok(true)
    }

    /// Move a file to the desired destination, resolving collisions first.
    /// Returns the final destination.
    fn move_file(&mut self, source: &Path, desired: &Path, separator: char) -> Result<PathBuf> {
        let resolution =
            DuplicateResolver::new(&self.fs, self.config.overwrite, separator).resolve(desired, &self.records);
        self.records.record(source, resolution.path());

        match resolution {
            Resolution::Overwrite(destination) => {
                if !self.config.preview {
                    self.fs.remove_file(&destination)?;
                    self.fs.rename(source, &destination)?;
                }
                crate::print_info!("Overwrote: {}", destination.display());
                Ok(destination)
            }
            Resolution::Free(destination) => {
                if !self.config.preview {
                    if let Some(parent) = destination.parent() {
                        self.fs.create_dir_all(parent)?;
                    }
                    self.fs.rename(source, &destination)?;
                }
                crate::print_info!("Moved: {}", destination.display());
                Ok(destination)
            }
        }
    }

    /// Move files next to the video that share its name, such as subtitles.
    fn move_satellites(&mut self, video: &Path, destination: &Path, separator: char) -> Result<()> {
        if self.config.satellite_extensions.is_empty() {
            return Ok(());
        }
        let Some(directory) = video.parent() else {
            return Ok(());
        };
        if self.config.verbose {
            println!("Move satellites for {}", video.display());
        }

        let video_stem = crate::path_to_file_stem_string(video).to_lowercase();
        let destination_stem = destination.with_extension("");
        for path in self.fs.list_dir(directory)? {
            if path == video || self.records.contains_source(&path) {
                continue;
            }
            let Some(extension) = path.extension() else {
                continue;
            };
            if !self.config.is_satellite_extension(&self.normalizer.decode(extension))
                || crate::path_to_file_stem_string(&path).to_lowercase() != video_stem
            {
                continue;
            }

            let target = crate::append_extension_to_path(destination_stem.clone(), extension);
            if self.config.verbose {
                println!("Satellite: {}", crate::path_to_filename_string(&target));
            }
            self.move_file(&path, &target, separator)?;
        }
        Ok(())
    }

    /// Delete the source directory unless large files remain in it.
    fn cleanup(&self) -> Result<()> {
        if self.config.verbose {
            println!("Cleanup");
        }

        let files = self
            .fs
            .walk_files(&self.config.source)
            .into_iter()
            .collect::<Result<Vec<_>>>()?;
        for path in &files {
            if self.config.preview && self.records.contains_source(path) {
                continue;
            }
            if self.fs.file_size(path)? >= self.config.min_size {
                crate::print_warning!("Skipping clean up due to large files remaining in the directory");
                return Ok(());
            }
        }

        for path in &files {
            if self.config.preview && self.records.contains_source(path) {
                continue;
            }
            if !self.config.preview {
                self.fs.remove_file(path)?;
            }
            crate::print_info!("Deleted: {}", path.display());
        }
        if !self.config.preview {
            self.fs.remove_dir_all(&self.config.source)?;
        }
        crate::print_info!("Deleted: {}", self.config.source.display());
        Ok(())
    }
}
