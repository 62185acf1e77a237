//! Configuration for video sorting.

use std::path::{Path, PathBuf};
use std::{fmt, fs};

use anyhow::Context;
use itertools::Itertools;
use serde::Deserialize;

pub const VIDEO_EXTENSIONS: [&str; 11] = [
    "mkv", "avi", "divx", "xvid", "mov", "wmv", "mp4", "mpg", "mpeg", "vob", "iso",
];
pub const SATELLITE_EXTENSIONS: [&str; 2] = ["srt", "sub"];
pub const LOWER_WORDS: [&str; 13] = [
    "the", "of", "and", "at", "vs", "a", "an", "but", "nor", "for", "on", "so", "yet",
];
pub const UPPER_WORDS: [&str; 3] = ["III", "II", "IV"];

pub const DEFAULT_MIN_SIZE_MB: u64 = 100;
pub const DEFAULT_MOVIES_FORMAT: &str = "%t (%y)";
pub const DEFAULT_SERIES_FORMAT: &str = "%sn/Season %s/%sn - S%0sE%0e - %en";
pub const DEFAULT_DATED_FORMAT: &str = "%sn/%sn - %y-%0m-%0d";

/// Config from the user config file.
#[derive(Debug, Default, Deserialize)]
pub struct SortConfig {
    #[serde(default)]
    pub destination: Option<PathBuf>,
    #[serde(default)]
    pub movies_dir: Option<PathBuf>,
    #[serde(default)]
    pub series_dir: Option<PathBuf>,
    #[serde(default)]
    pub dated_dir: Option<PathBuf>,
    #[serde(default)]
    pub video_extensions: Option<Vec<String>>,
    #[serde(default)]
    pub satellite_extensions: Option<Vec<String>>,
    /// Minimum video size in megabytes.
    #[serde(default)]
    pub min_size: Option<u64>,
    #[serde(default)]
    pub movies_format: Option<String>,
    #[serde(default)]
    pub series_format: Option<String>,
    #[serde(default)]
    pub dated_format: Option<String>,
    #[serde(default)]
    pub lower_words: Option<Vec<String>>,
    #[serde(default)]
    pub upper_words: Option<Vec<String>>,
    #[serde(default)]
    pub overwrite: bool,
    #[serde(default = "default_true")]
    pub cleanup: bool,
    #[serde(default)]
    pub preview: bool,
    #[serde(default)]
    pub verbose: bool,
}

/// Wrapper needed for parsing the config section.
#[derive(Debug, Default, Deserialize)]
struct UserConfig {
    #[serde(default)]
    video_sort: Option<SortConfig>,
}

/// Final config created from CLI arguments and user config file.
#[derive(Debug, Clone, Default)]
pub struct VideoSortConfig {
    /// Download directory to sort.
    pub source: PathBuf,
    pub movies_dir: PathBuf,
    pub series_dir: PathBuf,
    pub dated_dir: PathBuf,
    /// Lowercase extensions without the leading dot.
    pub video_extensions: Vec<String>,
    /// Lowercase extensions without the leading dot.
    pub satellite_extensions: Vec<String>,
    /// Minimum video size in bytes.
    pub min_size: u64,
    pub movies_format: String,
    pub series_format: String,
    pub dated_format: String,
    pub lower_words: Vec<String>,
    pub upper_words: Vec<String>,
    pub overwrite: bool,
    pub cleanup: bool,
    pub preview: bool,
    pub verbose: bool,
}

impl SortConfig {
    /// Try to read user config from the file if it exists.
    /// Otherwise, fall back to default config.
    ///
    /// # Errors
    /// Returns an error if config file exists but cannot be read or parsed.
    pub fn get_user_config() -> anyhow::Result<Self> {
        let Some(path) = crate::config_path() else {
            return Ok(Self::with_defaults());
        };
        Self::read_from_file(path)
    }

    /// Read the config section from the given file.
    /// A missing file gives the default config.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn read_from_file(path: &Path) -> anyhow::Result<Self> {
        match fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse config file {}:\n{e}", path.display())),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(Self::with_defaults()),
            Err(error) => Err(anyhow::anyhow!(
                "Failed to read config file {}: {error}",
                path.display()
            )),
        }
    }

    /// Parse config from a TOML string.
    ///
    /// # Errors
    /// Returns an error if the TOML string is invalid.
    pub fn from_toml_str(toml_str: &str) -> anyhow::Result<Self> {
        toml::from_str::<UserConfig>(toml_str)
            .map(|config| config.video_sort.unwrap_or_else(Self::with_defaults))
            .context("Failed to parse video_sort config TOML")
    }

    /// Config with the same defaults as an empty `[video_sort]` section.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            cleanup: true,
            ..Default::default()
        }
    }
}

impl VideoSortConfig {
    /// Resolve the final config for sorting the given source directory.
    ///
    /// Category directories default to `movies`, `series` and `tv` under `destination`.
    ///
    /// # Errors
    /// Returns an error if a category directory cannot be determined
    /// or the minimum size does not fit in bytes.
    pub fn new(source: PathBuf, user_config: SortConfig) -> anyhow::Result<Self> {
        let destination = user_config.destination;
        let category_dir = |dir: Option<PathBuf>, name: &str| -> anyhow::Result<PathBuf> {
            dir.or_else(|| destination.as_ref().map(|root| root.join(name)))
                .with_context(|| format!("Destination directory for {name} is not set"))
        };

        let min_size_mb = user_config.min_size.unwrap_or(DEFAULT_MIN_SIZE_MB);
        let min_size = min_size_mb
            .checked_mul(1 << 20)
            .with_context(|| format!("Minimum size is too large: {min_size_mb} MB"))?;

        Ok(Self {
            source,
            movies_dir: category_dir(user_config.movies_dir, "movies")?,
            series_dir: category_dir(user_config.series_dir, "series")?,
            dated_dir: category_dir(user_config.dated_dir, "tv")?,
            video_extensions: normalize_extensions(user_config.video_extensions, &VIDEO_EXTENSIONS),
            satellite_extensions: normalize_extensions(user_config.satellite_extensions, &SATELLITE_EXTENSIONS),
            min_size,
            movies_format: user_config
                .movies_format
                .unwrap_or_else(|| DEFAULT_MOVIES_FORMAT.to_string()),
            series_format: user_config
                .series_format
                .unwrap_or_else(|| DEFAULT_SERIES_FORMAT.to_string()),
            dated_format: user_config
                .dated_format
                .unwrap_or_else(|| DEFAULT_DATED_FORMAT.to_string()),
            lower_words: user_config.lower_words.unwrap_or_else(|| to_strings(&LOWER_WORDS)),
            upper_words: user_config.upper_words.unwrap_or_else(|| to_strings(&UPPER_WORDS)),
            overwrite: user_config.overwrite,
            cleanup: user_config.cleanup,
            preview: user_config.preview,
            verbose: user_config.verbose,
        })
    }

    /// Check if the file extension is in the video allow-list.
    #[must_use]
    pub fn is_video_extension(&self, extension: &str) -> bool {
        contains_extension(&self.video_extensions, extension)
    }

    /// Check if the file extension is in the satellite allow-list.
    #[must_use]
    pub fn is_satellite_extension(&self, extension: &str) -> bool {
        contains_extension(&self.satellite_extensions, extension)
    }
}

impl fmt::Display for VideoSortConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Config:")?;
        writeln!(f, "  source:     {}", self.source.display())?;
        writeln!(f, "  movies:     {}", self.movies_dir.display())?;
        writeln!(f, "  series:     {}", self.series_dir.display())?;
        writeln!(f, "  dated:      {}", self.dated_dir.display())?;
        writeln!(f, "  videos:     {}", self.video_extensions.iter().join(", "))?;
        writeln!(f, "  satellites: {}", self.satellite_extensions.iter().join(", "))?;
        writeln!(f, "  min size:   {}", crate::format_size(self.min_size))?;
        writeln!(f, "  movies format: \"{}\"", self.movies_format)?;
        writeln!(f, "  series format: \"{}\"", self.series_format)?;
        writeln!(f, "  dated format:  \"{}\"", self.dated_format)?;
        writeln!(f, "  lower words: [{}]", self.lower_words.iter().join(", "))?;
        writeln!(f, "  upper words: [{}]", self.upper_words.iter().join(", "))?;
        writeln!(f, "  overwrite:  {}", crate::colorize_bool(self.overwrite))?;
        writeln!(f, "  cleanup:    {}", crate::colorize_bool(self.cleanup))?;
        writeln!(f, "  preview:    {}", crate::colorize_bool(self.preview))?;
        write!(f, "  verbose:    {}", crate::colorize_bool(self.verbose))
    }
}

fn contains_extension(extensions: &[String], extension: &str) -> bool {
    let extension = extension.trim_start_matches('.').to_lowercase();
    !extension.is_empty() && extensions.iter().any(|e| *e == extension)
}

fn normalize_extensions(extensions: Option<Vec<String>>, defaults: &[&str]) -> Vec<String> {
    extensions
        .unwrap_or_else(|| to_strings(defaults))
        .into_iter()
        .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
        .filter(|ext| !ext.is_empty())
        .unique()
        .collect()
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

const fn default_true() -> bool {
    true
}
