//! Structured metadata guessed from a video filename.

use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;

use crate::video_sort::text::TextEncoding;

/// Year assigned to episodes without an episode number that get handled as movies.
pub const FALLBACK_MOVIE_YEAR: i32 = 1900;

static RE_EPISODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)\bS(?P<season>\d{1,2})[ ._-]?E(?P<episode>\d{1,3})\b",
        r"|\b(?P<season_x>\d{1,2})x(?P<episode_x>\d{2,3})\b"
    ))
    .expect("Failed to compile episode regex")
});

static RE_SEASON_ONLY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:S|Season[ ._-]?)(?P<season>\d{1,2})\b").expect("Failed to compile season regex")
});

static RE_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?P<year>(?:19|20)\d{2})[ ._-](?P<month>\d{2})[ ._-](?P<day>\d{2})\b")
        .expect("Failed to compile date regex")
});

static RE_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?P<year>(?:19|20)\d{2})\b").expect("Failed to compile year regex"));

static RE_SCREEN_SIZE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?P<size>\d{3,4}[pi]|4K|UHD)\b").expect("Failed to compile screen size regex"));

static RE_FORMAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)\b(?P<format>HDTV|PDTV|SDTV|BluRay|Blu-Ray|BDRip|BRRip|DVDRip|DVD",
        r"|WEB-DL|WEBDL|WEBRip|WEB|HDRip|VHS)\b"
    ))
    .expect("Failed to compile format regex")
});

static RE_VIDEO_CODEC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?P<codec>[xh]\.?26[45]|HEVC|AVC|XviD|DivX)\b").expect("Failed to compile video codec regex")
});

static RE_AUDIO_CODEC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)\b(?P<codec>DTS(?:-HD)?|TrueHD|AC3|E-?AC-?3|DDP?|AAC|MP3|FLAC)",
        r"(?:[ .]?(?P<channels>[1-7][ .][01]))?\b"
    ))
    .expect("Failed to compile audio codec regex")
});

static RE_RELEASE_GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-(?P<group>[A-Za-z0-9]+)$").expect("Failed to compile release group regex"));

/// Content type reported by a classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaKind {
    Movie,
    Episode,
    #[default]
    Unknown,
}

/// Metadata guessed from a single filename.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaGuess {
    pub kind: MediaKind,
    /// Movie title, or episode title for episodes.
    pub title: Option<String>,
    pub series: Option<String>,
    pub season: Option<u32>,
    pub episode_number: Option<u32>,
    pub year: Option<i32>,
    pub date: Option<NaiveDate>,
    pub format: Option<String>,
    pub screen_size: Option<String>,
    pub video_codec: Option<String>,
    pub audio_codec: Option<String>,
    pub audio_channels: Option<String>,
    pub release_group: Option<String>,
}

/// Formatting category a guess resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaCategory {
    Movie {
        title: String,
        year: Option<i32>,
    },
    DatedShow {
        name: String,
        date: NaiveDate,
    },
    SeasonedShow {
        series: String,
        season: Option<u32>,
        episode: u32,
        episode_title: Option<String>,
    },
}

/// Turns a file path into a [`MediaGuess`].
pub trait Classifier {
    fn classify(&self, path: &Path) -> MediaGuess;
}

/// Reads scene-style release names such as `Show.Name.S02E05.720p.HDTV.x264-GROUP`.
///
/// Only matches explicit tokens. There is no fuzzy matching or lookup of any kind.
/// File names are decoded with the run's text encoding before matching.
#[derive(Debug, Clone, Copy, Default)]
pub struct SceneNameClassifier {
    encoding: TextEncoding,
}

impl MediaGuess {
    /// Resolve the formatting category.
    ///
    /// An episode without an episode number is handled as a movie named after the series,
    /// with year 1900.
    /// Returns `None` when the content type could not be determined.
    #[must_use]
    pub fn category(&self) -> Option<MediaCategory> {
        match self.kind {
            MediaKind::Episode => match self.episode_number {
                Some(episode) => Some(MediaCategory::SeasonedShow {
                    series: self.series.clone().unwrap_or_default(),
                    season: self.season,
                    episode,
                    episode_title: self.title.clone().filter(|title| !title.is_empty()),
                }),
                None => Some(MediaCategory::Movie {
                    title: self.series.clone().unwrap_or_default(),
                    year: Some(FALLBACK_MOVIE_YEAR),
                }),
            },
            MediaKind::Movie => match self.date {
                Some(date) => Some(MediaCategory::DatedShow {
                    name: self
                        .title
                        .clone()
                        .or_else(|| self.series.clone())
                        .unwrap_or_default(),
                    date,
                }),
                None => Some(MediaCategory::Movie {
                    title: self.title.clone().unwrap_or_default(),
                    year: self.year,
                }),
            },
            MediaKind::Unknown => None,
        }
    }
}

impl MediaCategory {
    /// Short name used in log output.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Movie { .. } => "movie",
            Self::DatedShow { .. } => "dated show",
            Self::SeasonedShow { .. } => "seasoned show",
        }
    }
}

impl Classifier for SceneNameClassifier {
    fn classify(&self, path: &Path) -> MediaGuess {
        let stem = path.file_stem().map(|stem| self.encoding.decode(stem)).unwrap_or_default();
        Self::classify_name(&stem)
    }
}

impl SceneNameClassifier {
    #[must_use]
    pub const fn new(encoding: TextEncoding) -> Self {
        Self { encoding }
    }

    /// Guess metadata from a file name without extension.
    #[must_use]
    pub fn classify_name(name: &str) -> MediaGuess {
        let name = name.trim();
        if name.is_empty() {
            return MediaGuess::default();
        }

        let mut guess = MediaGuess::default();
        // Title text ends where the first recognized token starts
        let mut title_end = name.len();

        if let Some(caps) = RE_SCREEN_SIZE.captures(name) {
            guess.screen_size = Some(caps["size"].to_string());
            title_end = title_end.min(caps.get(0).map_or(title_end, |m| m.start()));
        }
        let mut format_end = 0;
        if let Some(caps) = RE_FORMAT.captures(name) {
            guess.format = Some(caps["format"].to_string());
            title_end = title_end.min(caps.get(0).map_or(title_end, |m| m.start()));
            format_end = caps.get(0).map_or(0, |m| m.end());
        }
        if let Some(caps) = RE_VIDEO_CODEC.captures(name) {
            guess.video_codec = Some(caps["codec"].to_string());
            title_end = title_end.min(caps.get(0).map_or(title_end, |m| m.start()));
        }
        if let Some(caps) = RE_AUDIO_CODEC.captures(name) {
            guess.audio_codec = Some(caps["codec"].to_string());
            guess.audio_channels = caps.name("channels").map(|m| m.as_str().replace(' ', "."));
            title_end = title_end.min(caps.get(0).map_or(title_end, |m| m.start()));
        }
        // A trailing "WEB-DL" is a format, not a release group
        if let Some(caps) = RE_RELEASE_GROUP.captures(name)
            && caps.get(0).is_some_and(|m| m.start() >= format_end)
        {
            guess.release_group = Some(caps["group"].to_string());
            title_end = title_end.min(caps.get(0).map_or(title_end, |m| m.start()));
        }

        if let Some(caps) = RE_EPISODE.captures(name) {
            let season = caps.name("season").or_else(|| caps.name("season_x"));
            let episode = caps.name("episode").or_else(|| caps.name("episode_x"));
            let start = caps.get(0).map_or(0, |m| m.start());
            let end = caps.get(0).map_or(0, |m| m.end());
            guess.kind = MediaKind::Episode;
            guess.series = clean_title(&name[..start]);
            guess.season = season.and_then(|m| m.as_str().parse().ok());
            guess.episode_number = episode.and_then(|m| m.as_str().parse().ok());
            if end < title_end {
                guess.title = clean_title(&name[end..title_end]);
            }
            return guess;
        }

        if let Some(caps) = RE_DATE.captures(name) {
            let year = caps["year"].parse::<i32>().ok();
            let month = caps["month"].parse::<u32>().ok();
            let day = caps["day"].parse::<u32>().ok();
            if let (Some(year), Some(month), Some(day)) = (year, month, day)
                && let Some(date) = NaiveDate::from_ymd_opt(year, month, day)
            {
                let start = caps.get(0).map_or(0, |m| m.start());
                guess.kind = MediaKind::Movie;
                guess.title = clean_title(&name[..start]);
                guess.year = Some(date.year());
                guess.date = Some(date);
                return guess;
            }
        }

        if let Some(caps) = RE_SEASON_ONLY.captures(name) {
            let start = caps.get(0).map_or(0, |m| m.start());
            if start > 0 {
                guess.kind = MediaKind::Episode;
                guess.series = clean_title(&name[..start]);
                guess.season = caps["season"].parse().ok();
                return guess;
            }
        }

        // The last year-like number wins so titles such as "2001 A Space Odyssey 1968" work
        if let Some(caps) = RE_YEAR
            .captures_iter(name)
            .filter(|caps| caps.get(0).is_some_and(|m| m.start() > 0))
            .last()
        {
            let start = caps.get(0).map_or(0, |m| m.start());
            guess.year = caps["year"].parse().ok();
            title_end = title_end.min(start);
        }

        guess.title = clean_title(&name[..title_end]);
        if guess.title.is_some() {
            guess.kind = MediaKind::Movie;
        }
        guess
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Movie => "movie",
            Self::Episode => "episode",
            Self::Unknown => "unknown",
        };
        write!(f, "{name}")
    }
}

impl fmt::Display for MediaGuess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type: {}", self.kind)?;
        let fields: [(&str, Option<String>); 12] = [
            ("title", self.title.clone()),
            ("series", self.series.clone()),
            ("season", self.season.map(|v| v.to_string())),
            ("episodeNumber", self.episode_number.map(|v| v.to_string())),
            ("year", self.year.map(|v| v.to_string())),
            ("date", self.date.map(|v| v.to_string())),
            ("format", self.format.clone()),
            ("screenSize", self.screen_size.clone()),
            ("videoCodec", self.video_codec.clone()),
            ("audioCodec", self.audio_codec.clone()),
            ("audioChannels", self.audio_channels.clone()),
            ("releaseGroup", self.release_group.clone()),
        ];
        for (name, value) in fields {
            if let Some(value) = value {
                write!(f, ", {name}: {value}")?;
            }
        }
        Ok(())
    }
}

fn clean_title(text: &str) -> Option<String> {
    let title = text
        .replace(['.', '_'], " ")
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, '-' | '(' | '[' | ')' | ']'))
        .to_string();
    if title.is_empty() { None } else { Some(title) }
}
