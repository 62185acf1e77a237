//! Video sort module for moving finished downloads into a media library.
//!
//! Each video file in a download directory is classified as a movie,
//! a seasoned series episode or a dated show, and moved to a path rendered
//! from a user-defined format string such as `%sn/Season %s/%sn - S%0sE%0e - %en`.
//! Subtitles and other satellite files follow their video,
//! and the download directory can be removed afterwards.

mod config;
mod dupe;
mod fs;
mod guess;
mod sort;
mod specifier;
mod template;
mod text;

pub use config::{
    DEFAULT_DATED_FORMAT, DEFAULT_MIN_SIZE_MB, DEFAULT_MOVIES_FORMAT, DEFAULT_SERIES_FORMAT, SortConfig,
    VideoSortConfig,
};
pub use dupe::{DuplicateResolver, MoveRecords, Resolution};
pub use fs::{FileSystem, LocalFileSystem};
pub use guess::{Classifier, FALLBACK_MOVIE_YEAR, MediaCategory, MediaGuess, MediaKind, SceneNameClassifier};
pub use sort::{PREVIEW_BANNER, RunOutcome, VideoSort};
pub use specifier::{SourceNames, SpecifierMapper, SpecifierMapping};
pub use template::PathTemplate;
pub use text::{TextEncoding, TextNormalizer, TitleVariants};
