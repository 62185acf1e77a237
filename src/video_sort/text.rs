//! Casing, stripping and path cleanup helpers shared by the mapper and the template engine.

use std::env;
use std::ffi::OsStr;
use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Characters stripped from both ends of every path segment.
const STRIP_AFTER: [char; 3] = ['_', '.', '-'];

/// Matches two or more consecutive dots.
static RE_CONSECUTIVE_DOTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.{2,}").expect("Failed to create regex pattern for consecutive dots"));

/// Matches two or more consecutive underscores.
static RE_CONSECUTIVE_UNDERSCORES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_{2,}").expect("Failed to create regex pattern for consecutive underscores"));

/// How raw filename bytes are turned into text.
///
/// Resolved once at startup and handed to [`TextNormalizer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextEncoding {
    /// Names are expected to be UTF-8, with a Latin-1 fallback for invalid bytes.
    #[default]
    Utf8,
    /// Names are decoded as Latin-1 with replacement characters.
    Latin1,
}

/// Target case for word exceptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordCase {
    Lower,
    Upper,
}

/// The three spacing styles of a title.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleVariants {
    /// Words separated with spaces.
    pub spaced: String,
    /// Words separated with dots.
    pub dotted: String,
    /// Words separated with underscores.
    pub underscored: String,
}

/// Title casing with configurable lower and upper case word exceptions.
#[derive(Debug, Clone, Default)]
pub struct TextNormalizer {
    encoding: TextEncoding,
    lower_words: Vec<String>,
    upper_words: Vec<String>,
}

impl TextEncoding {
    /// Resolve the encoding from the environment locale.
    ///
    /// macOS file names are always UTF-8.
    /// Elsewhere the first non-empty of `LC_ALL`, `LC_CTYPE` and `LANG` decides.
    /// An unset locale is treated as UTF-8.
    #[must_use]
    pub fn detect() -> Self {
        if cfg!(target_os = "macos") {
            return Self::Utf8;
        }
        let locale = ["LC_ALL", "LC_CTYPE", "LANG"]
            .iter()
            .filter_map(|name| env::var(name).ok())
            .find(|value| !value.trim().is_empty());

        locale.map_or(Self::Utf8, |value| Self::from_locale(&value))
    }

    /// Map a locale string such as `en_US.UTF-8` to an encoding.
    #[must_use]
    pub fn from_locale(locale: &str) -> Self {
        let locale = locale.to_lowercase();
        if locale.contains("utf") {
            Self::Utf8
        } else {
            Self::Latin1
        }
    }

    /// Decode raw name bytes into NFC-normalized text.
    #[must_use]
    pub fn decode(self, raw: &OsStr) -> String {
        let bytes = raw.as_encoded_bytes();
        let text = match self {
            Self::Utf8 => std::str::from_utf8(bytes).map_or_else(|_| decode_latin1(bytes), ToString::to_string),
            Self::Latin1 => decode_latin1(bytes),
        };
        text.nfc().collect()
    }
}

impl TextNormalizer {
    #[must_use]
    pub fn new(encoding: TextEncoding, lower_words: &[String], upper_words: &[String]) -> Self {
        Self {
            encoding,
            lower_words: clean_word_list(lower_words),
            upper_words: clean_word_list(upper_words),
        }
    }

    #[must_use]
    pub const fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    /// Decode a raw file or directory name with the configured encoding.
    #[must_use]
    pub fn decode(&self, raw: &OsStr) -> String {
        self.encoding.decode(raw)
    }

    /// Produce the spaced, dotted and underscored forms of a title.
    ///
    /// With `titleize`, the spaced form is title-cased,
    /// lower and upper word exceptions are applied,
    /// and the first character is always uppercase.
    #[must_use]
    pub fn derive_variants(&self, raw: &str, titleize: bool) -> TitleVariants {
        // Combining marks are not cased and would restart a word in title casing
        let base = raw.nfc().collect::<String>().replace(['.', '_'], " ");
        let mut title = base
            .trim_matches(|c: char| c.is_whitespace() || matches!(c, '(' | ')' | '_' | '-'))
            .to_string();

        if titleize {
            title = title_case(&title);
            // Apostrophe counts as a word boundary in title casing
            title = title.replace("'S", "'s");
            title = apply_word_case_exceptions(&title, &self.lower_words, WordCase::Lower);
            title = apply_word_case_exceptions(&title, &self.upper_words, WordCase::Upper);
            title = uppercase_first(&title);
        }

        let dotted = title.replace(" - ", "-").replace([' ', '_', '(', ')'], ".");
        let dotted = collapse_consecutive_dots(&dotted).trim_end_matches('.').to_string();

        let underscored = title.replace([' ', '.'], "_");
        let underscored = RE_CONSECUTIVE_UNDERSCORES
            .replace_all(&underscored, "_")
            .trim_end_matches('_')
            .to_string();

        TitleVariants {
            spaced: title,
            dotted,
            underscored,
        }
    }
}

/// Capitalize each word.
///
/// A cased letter is uppercased when the previous character is not a cased letter,
/// and lowercased otherwise, so digits and punctuation start a new word.
#[must_use]
pub fn title_case(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut previous_cased = false;
    for c in text.chars() {
        let cased = c.is_lowercase() || c.is_uppercase();
        if cased {
            if previous_cased {
                result.extend(c.to_lowercase());
            } else {
                result.extend(c.to_uppercase());
            }
        } else {
            result.push(c);
        }
        previous_cased = cased;
    }
    result
}

/// Replace whole-word occurrences of each exception word with its literal lower or upper case form.
///
/// Matching is case-insensitive and respects word boundaries,
/// so "and" never touches "Andrew".
#[must_use]
pub fn apply_word_case_exceptions(text: &str, words: &[String], case: WordCase) -> String {
    let mut result = text.to_string();
    for word in words {
        let word = word.trim();
        if word.is_empty() {
            continue;
        }
        let Ok(re) = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(word))) else {
            continue;
        };
        let replacement = match case {
            WordCase::Lower => word.to_lowercase(),
            WordCase::Upper => word.to_uppercase(),
        };
        result = re.replace_all(&result, regex::NoExpand(&replacement)).into_owned();
    }
    result
}

/// Strip leading and trailing `_`, `.`, `-` and whitespace from every path segment,
/// then normalize the path.
///
/// A path starting with a slash stays absolute.
#[must_use]
pub fn strip_path_segments(path: &str) -> String {
    let mut segments: Vec<String> = path.trim_matches('/').split('/').map(strip_segment).collect();

    if path.trim().starts_with(['/', '\\']) {
        segments.insert(0, String::new());
    }

    normalize_path(&segments.join("/"))
}

/// Strip until nothing changes, since removing one character can expose another.
fn strip_segment(segment: &str) -> String {
    let mut current = segment.to_string();
    loop {
        let mut stripped = current.clone();
        for strip_char in STRIP_AFTER {
            stripped = stripped.trim().trim_matches(strip_char).to_string();
        }
        if stripped == current {
            return stripped;
        }
        current = stripped;
    }
}

/// Normalize a `/` separated path the way POSIX `normpath` does.
///
/// Collapses empty and `.` segments and resolves `..` against preceding segments.
/// An empty result becomes `.`.
#[must_use]
pub fn normalize_path(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }
    let absolute = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|last| *last != "..") {
                    parts.pop();
                } else if !absolute {
                    parts.push(part);
                }
            }
            _ => parts.push(part),
        }
    }
    let joined = parts.join("/");
    if absolute {
        format!("/{joined}")
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

/// Split a `/` separated path into the part before the extension and the extension with its dot.
///
/// Leading dots of the file name do not start an extension.
#[must_use]
pub fn split_extension(path: &str) -> (&str, &str) {
    let name_start = path.rfind('/').map_or(0, |index| index + 1);
    let name = &path[name_start..];
    match name.rfind('.') {
        Some(dot) if name[..dot].chars().any(|c| c != '.') => path.split_at(name_start + dot),
        _ => (path, ""),
    }
}

/// Collapse runs of consecutive dots into a single dot.
#[must_use]
pub fn collapse_consecutive_dots(text: &str) -> String {
    RE_CONSECUTIVE_DOTS.replace_all(text, ".").into_owned()
}

fn uppercase_first(text: &str) -> String {
    let mut chars = text.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

fn decode_latin1(bytes: &[u8]) -> String {
    let (text, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    text.into_owned()
}

fn clean_word_list(words: &[String]) -> Vec<String> {
    words
        .iter()
        .map(|word| word.replace(' ', ""))
        .filter(|word| !word.is_empty())
        .collect()
}
