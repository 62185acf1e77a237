//! Placeholder tokens and their values for one file.

use std::path::Path;

use chrono::Datelike;
use chrono::NaiveDate;

use crate::video_sort::guess::{MediaCategory, MediaGuess};
use crate::video_sort::text::{TextNormalizer, TitleVariants, title_case};

/// Ordered `(token, value)` pairs used for template substitution.
///
/// Tokens are tried in insertion order,
/// so a token must never be a prefix of a token added after it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecifierMapping {
    entries: Vec<(&'static str, String)>,
}

/// Names taken from the source file for the common tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceNames {
    /// Name of the download directory being sorted.
    pub dir_name: String,
    /// File name without extension.
    pub file_stem: String,
    /// Extension including the leading dot, or empty.
    pub extension: String,
}

/// Builds the specifier mapping for a classified file.
#[derive(Debug, Clone, Copy)]
pub struct SpecifierMapper<'a> {
    normalizer: &'a TextNormalizer,
}

impl SpecifierMapping {
    #[must_use]
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn push(&mut self, token: &'static str, value: impl Into<String>) {
        self.entries.push((token, value.into()));
    }

    #[must_use]
    pub fn entries(&self) -> &[(&'static str, String)] {
        &self.entries
    }

    /// Value of the first entry with exactly this token.
    #[must_use]
    pub fn get(&self, token: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| *key == token)
            .map(|(_, value)| value.as_str())
    }

    fn push_variants(&mut self, tokens: [&'static str; 3], variants: TitleVariants) {
        let [spaced, dotted, underscored] = tokens;
        self.push(spaced, variants.spaced);
        self.push(dotted, variants.dotted);
        self.push(underscored, variants.underscored);
    }
}

impl SourceNames {
    /// Collect names for a file inside the given download directory.
    #[must_use]
    pub fn new(download_dir: &Path, file: &Path, normalizer: &TextNormalizer) -> Self {
        let dir_name = download_dir
            .file_name()
            .map(|name| normalizer.decode(name))
            .unwrap_or_default();
        let file_stem = file.file_stem().map(|stem| normalizer.decode(stem)).unwrap_or_default();
        let extension = file
            .extension()
            .map(|ext| format!(".{}", normalizer.decode(ext)))
            .unwrap_or_default();
        Self {
            dir_name,
            file_stem,
            extension,
        }
    }
}

impl<'a> SpecifierMapper<'a> {
    #[must_use]
    pub const fn new(normalizer: &'a TextNormalizer) -> Self {
        Self { normalizer }
    }
}

impl SpecifierMapper<'_> {
    /// Build the full mapping: common tokens first, then the category tokens.
    #[must_use]
    pub fn build(&self, category: &MediaCategory, guess: &MediaGuess, names: &SourceNames) -> SpecifierMapping {
        let mut mapping = SpecifierMapping::new();
        Self::add_common(&mut mapping, guess, names);
        match category {
            MediaCategory::Movie { title, year } => {
                self.add_movie(&mut mapping, title, year.map(|y| y.to_string()).unwrap_or_default().as_str());
            }
            MediaCategory::DatedShow { name, date } => self.add_dated(&mut mapping, name, *date),
            MediaCategory::SeasonedShow {
                series,
                season,
                episode,
                episode_title,
            } => self.add_series(&mut mapping, series, *season, *episode, episode_title.as_deref()),
        }
        mapping
    }

    fn add_common(mapping: &mut SpecifierMapping, guess: &MediaGuess, names: &SourceNames) {
        mapping.push("%dn", names.dir_name.as_str());
        mapping.push("%fn", names.file_stem.as_str());
        mapping.push("%ext", names.extension.as_str());
        mapping.push("%EXT", names.extension.to_uppercase());
        mapping.push("%Ext", title_case(&names.extension));

        mapping.push("%qf", guess.format.clone().unwrap_or_default());
        mapping.push("%qss", guess.screen_size.clone().unwrap_or_default());
        mapping.push("%qvc", guess.video_codec.clone().unwrap_or_default());
        mapping.push("%qac", guess.audio_codec.clone().unwrap_or_default());
        mapping.push("%qah", guess.audio_channels.clone().unwrap_or_default());
        mapping.push("%qrg", guess.release_group.clone().unwrap_or_default());
    }

    /// Title tokens shared by movies and dated shows.
    fn add_title_names(&self, mapping: &mut SpecifierMapping, name: &str) {
        let titled = self.normalizer.derive_variants(name, true);
        let original = self.normalizer.derive_variants(name, false);

        mapping.push_variants(["%title", "%.title", "%_title"], titled.clone());
        mapping.push_variants(["%tT", "%t.T", "%t_T"], original.clone());
        mapping.push_variants(["%t", "%.t", "%_t"], titled.clone());
        mapping.push_variants(["%sn", "%s.n", "%s_n"], titled);
        mapping.push_variants(["%sN", "%s.N", "%s_N"], original);
    }

    fn add_movie(&self, mapping: &mut SpecifierMapping, title: &str, year: &str) {
        self.add_title_names(mapping, title);

        mapping.push("%y", year);
        let (decade, full_decade) = decades(year);
        mapping.push("%decade", decade);
        mapping.push("%0decade", full_decade);
    }

    fn add_series(
        &self,
        mapping: &mut SpecifierMapping,
        series: &str,
        season: Option<u32>,
        episode: u32,
        episode_title: Option<&str>,
    ) {
        mapping.push_variants(["%sn", "%s.n", "%s_n"], self.normalizer.derive_variants(series, true));
        mapping.push_variants(["%sN", "%s.N", "%s_N"], self.normalizer.derive_variants(series, false));

        let season = season.map(|s| s.to_string()).unwrap_or_default();
        mapping.push("%s", season.as_str());
        mapping.push("%0s", zero_pad(&season));

        match episode_title {
            Some(title) => {
                mapping.push_variants(["%en", "%e.n", "%e_n"], self.normalizer.derive_variants(title, true));
                mapping.push_variants(["%eN", "%e.N", "%e_N"], self.normalizer.derive_variants(title, false));
            }
            None => {
                mapping.push_variants(["%en", "%e.n", "%e_n"], TitleVariants::default());
                mapping.push_variants(["%eN", "%e.N", "%e_N"], TitleVariants::default());
            }
        }

        let episode = episode.to_string();
        mapping.push("%e", episode.as_str());
        mapping.push("%0e", zero_pad(&episode));
    }

    fn add_dated(&self, mapping: &mut SpecifierMapping, name: &str, date: NaiveDate) {
        self.add_title_names(mapping, name);

        // Dated shows never carry an episode description
        mapping.push("%desc", "");
        mapping.push("%.desc", "");
        mapping.push("%_desc", "");

        let year = date.year().to_string();
        mapping.push("%year", year.as_str());
        mapping.push("%y", year.as_str());
        let (decade, full_decade) = decades(&year);
        mapping.push("%decade", decade);
        mapping.push("%0decade", full_decade);

        let month = date.month().to_string();
        mapping.push("%m", month.as_str());
        mapping.push("%0m", zero_pad(&month));

        let day = date.day().to_string();
        mapping.push("%d", day.as_str());
        mapping.push("%0d", zero_pad(&day));
    }
}

/// Two-digit and four-digit decade of a year string, e.g. "10" and "2010" for "2014".
///
/// Both are empty when the year is empty.
#[must_use]
pub fn decades(year: &str) -> (String, String) {
    if year.is_empty() {
        return (String::new(), String::new());
    }
    let decade: String = year.chars().skip(2).take(1).chain(std::iter::once('0')).collect();
    let full_decade: String = year.chars().take(3).chain(std::iter::once('0')).collect();
    (decade, full_decade)
}

/// Left-pad a number string with zeros to two characters. Empty stays empty.
fn zero_pad(value: &str) -> String {
    if value.is_empty() {
        String::new()
    } else {
        format!("{value:0>2}")
    }
}

#[cfg(test)]
mod specifier_tests {
    use super::*;
    use crate::video_sort::guess::MediaKind;
    use crate::video_sort::text::TextEncoding;

    fn normalizer() -> TextNormalizer {
        let lower: Vec<String> = ["the", "of", "and"].iter().map(ToString::to_string).collect();
        TextNormalizer::new(TextEncoding::Utf8, &lower, &[])
    }

    fn names() -> SourceNames {
        SourceNames {
            dir_name: "Release.Dir".to_string(),
            file_stem: "release.file".to_string(),
            extension: ".mkv".to_string(),
        }
    }

    fn assert_no_shadowing(mapping: &SpecifierMapping) {
        let entries = mapping.entries();
        for (index, (earlier, _)) in entries.iter().enumerate() {
            for (later, _) in &entries[index + 1..] {
                assert!(
                    !(later.starts_with(earlier) && later != earlier),
                    "{earlier} shadows {later}"
                );
            }
        }
    }

    #[test]
    fn source_names_from_path() {
        let names = SourceNames::new(
            Path::new("/downloads/Some.Release"),
            Path::new("/downloads/Some.Release/sub/video.file.MKV"),
            &normalizer(),
        );
        assert_eq!(names.dir_name, "Some.Release");
        assert_eq!(names.file_stem, "video.file");
        assert_eq!(names.extension, ".MKV");
    }

    #[test]
    fn common_tokens() {
        let guess = MediaGuess {
            kind: MediaKind::Movie,
            format: Some("BluRay".to_string()),
            screen_size: Some("1080p".to_string()),
            ..Default::default()
        };
        let category = guess.category().unwrap();
        let normalizer = normalizer();
        let mapping = SpecifierMapper::new(&normalizer).build(&category, &guess, &names());
        assert_eq!(mapping.get("%dn"), Some("Release.Dir"));
        assert_eq!(mapping.get("%fn"), Some("release.file"));
        assert_eq!(mapping.get("%ext"), Some(".mkv"));
        assert_eq!(mapping.get("%EXT"), Some(".MKV"));
        assert_eq!(mapping.get("%Ext"), Some(".Mkv"));
        assert_eq!(mapping.get("%qf"), Some("BluRay"));
        assert_eq!(mapping.get("%qss"), Some("1080p"));
        assert_eq!(mapping.get("%qvc"), Some(""));
        assert_eq!(mapping.get("%qrg"), Some(""));
    }

    #[test]
    fn movie_tokens() {
        let guess = MediaGuess {
            kind: MediaKind::Movie,
            title: Some("the lord of the rings".to_string()),
            year: Some(2001),
            ..Default::default()
        };
        let normalizer = normalizer();
        let mapping = SpecifierMapper::new(&normalizer).build(&guess.category().unwrap(), &guess, &names());
        assert_eq!(mapping.get("%t"), Some("The Lord of the Rings"));
        assert_eq!(mapping.get("%.t"), Some("The.Lord.of.the.Rings"));
        assert_eq!(mapping.get("%_t"), Some("The_Lord_of_the_Rings"));
        assert_eq!(mapping.get("%tT"), Some("the lord of the rings"));
        assert_eq!(mapping.get("%sN"), Some("the lord of the rings"));
        assert_eq!(mapping.get("%y"), Some("2001"));
        assert_eq!(mapping.get("%decade"), Some("00"));
        assert_eq!(mapping.get("%0decade"), Some("2000"));
        assert_no_shadowing(&mapping);
    }

    #[test]
    fn series_tokens() {
        let guess = MediaGuess {
            kind: MediaKind::Episode,
            series: Some("show name".to_string()),
            title: Some("pilot episode".to_string()),
            season: Some(2),
            episode_number: Some(5),
            ..Default::default()
        };
        let normalizer = normalizer();
        let mapping = SpecifierMapper::new(&normalizer).build(&guess.category().unwrap(), &guess, &names());
        assert_eq!(mapping.get("%sn"), Some("Show Name"));
        assert_eq!(mapping.get("%s.N"), Some("show.name"));
        assert_eq!(mapping.get("%s"), Some("2"));
        assert_eq!(mapping.get("%0s"), Some("02"));
        assert_eq!(mapping.get("%en"), Some("Pilot Episode"));
        assert_eq!(mapping.get("%e_N"), Some("pilot_episode"));
        assert_eq!(mapping.get("%e"), Some("5"));
        assert_eq!(mapping.get("%0e"), Some("05"));
        assert_no_shadowing(&mapping);
    }

    #[test]
    fn series_without_episode_title() {
        let guess = MediaGuess {
            kind: MediaKind::Episode,
            series: Some("Show".to_string()),
            season: Some(11),
            episode_number: Some(123),
            ..Default::default()
        };
        let normalizer = normalizer();
        let mapping = SpecifierMapper::new(&normalizer).build(&guess.category().unwrap(), &guess, &names());
        assert_eq!(mapping.get("%en"), Some(""));
        assert_eq!(mapping.get("%e.N"), Some(""));
        assert_eq!(mapping.get("%0s"), Some("11"));
        assert_eq!(mapping.get("%0e"), Some("123"));
    }

    #[test]
    fn dated_tokens() {
        let guess = MediaGuess {
            kind: MediaKind::Movie,
            title: Some("daily show".to_string()),
            date: NaiveDate::from_ymd_opt(1994, 3, 7),
            ..Default::default()
        };
        let normalizer = normalizer();
        let mapping = SpecifierMapper::new(&normalizer).build(&guess.category().unwrap(), &guess, &names());
        assert_eq!(mapping.get("%sn"), Some("Daily Show"));
        assert_eq!(mapping.get("%year"), Some("1994"));
        assert_eq!(mapping.get("%y"), Some("1994"));
        assert_eq!(mapping.get("%decade"), Some("90"));
        assert_eq!(mapping.get("%0decade"), Some("1990"));
        assert_eq!(mapping.get("%m"), Some("3"));
        assert_eq!(mapping.get("%0m"), Some("03"));
        assert_eq!(mapping.get("%d"), Some("7"));
        assert_eq!(mapping.get("%0d"), Some("07"));
        assert_eq!(mapping.get("%desc"), Some(""));
        assert_no_shadowing(&mapping);
    }

    #[test]
    fn episode_without_number_maps_as_1900_movie() {
        let guess = MediaGuess {
            kind: MediaKind::Episode,
            series: Some("Some Show".to_string()),
            ..Default::default()
        };
        let normalizer = normalizer();
        let mapping = SpecifierMapper::new(&normalizer).build(&guess.category().unwrap(), &guess, &names());
        assert_eq!(mapping.get("%t"), Some("Some Show"));
        assert_eq!(mapping.get("%y"), Some("1900"));
    }

    #[test]
    fn decades_of_year() {
        assert_eq!(decades("2014"), ("10".to_string(), "2010".to_string()));
        assert_eq!(decades("1999"), ("90".to_string(), "1990".to_string()));
        assert_eq!(decades(""), (String::new(), String::new()));
    }
}
