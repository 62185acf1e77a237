//! Turns a format string and a specifier mapping into a clean relative destination path.
//!
//! Rendering runs these steps in order:
//! 1. make sure the format ends with an extension token
//! 2. substitute placeholder tokens
//! 3. collapse artifacts left by empty values
//! 4. apply `{{upper}}` and `{lower}` case blocks
//! 5. strip and normalize every path segment

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::video_sort::specifier::SpecifierMapping;
use crate::video_sort::text::{normalize_path, split_extension, strip_path_segments};

/// Token appended when the format has no extension token.
pub const EXTENSION_SPECIFIER: &str = ".%ext";

const EXTENSION_SPECIFIERS: [&str; 3] = [".%ext", ".%Ext", ".%EXT"];

/// Literal replacements applied until nothing changes.
const REPLACE_AFTER: [(&str, &str); 6] = [
    ("()", ""),
    ("..", "."),
    ("__", "_"),
    ("  ", " "),
    ("//", "/"),
    (" - - ", " - "),
];

static RE_UPPERCASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([^{]*)\}\}").expect("Failed to create regex pattern for uppercase block"));

static RE_LOWERCASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^{]*)\}").expect("Failed to create regex pattern for lowercase block"));

/// A user format string for one content category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    format: String,
}

impl PathTemplate {
    #[must_use]
    pub fn new(format: &str) -> Self {
        Self {
            format: format.to_string(),
        }
    }

    /// Separator placed before the `(n)` suffix of duplicate names.
    #[must_use]
    pub fn dupe_separator(&self) -> char {
        select_dupe_separator(&self.format)
    }

    /// The format with an extension token and forward slashes, as used for substitution.
    #[must_use]
    pub fn effective_format(&self) -> String {
        ensure_extension_specifier(&self.format).replace('\\', "/")
    }

    /// Render the relative destination path for the given mapping.
    #[must_use]
    pub fn render(&self, mapping: &SpecifierMapping) -> String {
        let format = self.effective_format();
        let path = substitute(&format, mapping);
        let path = collapse_artifacts(&path);
        let path = apply_case_blocks(&path);
        normalize_segments(&path)
    }

    /// Render and join onto the destination root.
    #[must_use]
    pub fn destination(&self, root: &Path, mapping: &SpecifierMapping) -> PathBuf {
        root.join(self.render(mapping))
    }
}

/// Pick the duplicate suffix separator from the file name part of the format.
///
/// Dotted title tokens give `.`, underscored ones `_`, anything else a space.
#[must_use]
pub fn select_dupe_separator(format: &str) -> char {
    let file_name = format.rsplit('/').next().unwrap_or(format);
    if ["%.t", "%s.n", "%s.N"].iter().any(|token| file_name.contains(token)) {
        '.'
    } else if ["%_t", "%s_n", "%s_N"].iter().any(|token| file_name.contains(token)) {
        '_'
    } else {
        ' '
    }
}

/// Append `.%ext` unless the format already ends with an extension token.
///
/// Trailing case block braces are ignored when checking.
#[must_use]
pub fn ensure_extension_specifier(format: &str) -> String {
    let trimmed = format.trim_end_matches('}');
    if EXTENSION_SPECIFIERS.iter().any(|ext| trimmed.ends_with(ext)) {
        format.to_string()
    } else {
        format!("{format}{EXTENSION_SPECIFIER}")
    }
}

/// Replace placeholder tokens with their values in a single left-to-right scan.
///
/// At each `%` the mapping entries are tried in order and the first match is consumed.
/// A `%` that starts no known token is copied as is.
#[must_use]
pub fn substitute(format: &str, mapping: &SpecifierMapping) -> String {
    let mut result = String::with_capacity(format.len() * 2);
    let mut index = 0;
    while index < format.len() {
        let rest = &format[index..];
        if rest.starts_with('%')
            && let Some((token, value)) = mapping.entries().iter().find(|(token, _)| rest.starts_with(token))
        {
            result.push_str(value);
            index += token.len();
            continue;
        }
        let c = rest.chars().next().unwrap_or_default();
        result.push(c);
        index += c.len_utf8().max(1);
    }
    result
}

/// Apply the artifact replacement table until the text no longer changes.
#[must_use]
pub fn collapse_artifacts(path: &str) -> String {
    let mut current = path.to_string();
    loop {
        let mut next = current.clone();
        for (pattern, replacement) in REPLACE_AFTER {
            next = next.replace(pattern, replacement);
        }
        if next == current {
            return next;
        }
        current = next;
    }
}

/// Uppercase `{{...}}` blocks, then lowercase `{...}` blocks, then drop any stray braces.
#[must_use]
pub fn apply_case_blocks(path: &str) -> String {
    let mut path = path.to_string();
    while let Some(caps) = RE_UPPERCASE.captures(&path) {
        let Some(block) = caps.get(0) else { break };
        let replaced = format!("{}{}{}", &path[..block.start()], caps[1].to_uppercase(), &path[block.end()..]);
        path = replaced;
    }
    while let Some(caps) = RE_LOWERCASE.captures(&path) {
        let Some(block) = caps.get(0) else { break };
        let replaced = format!("{}{}{}", &path[..block.start()], caps[1].to_lowercase(), &path[block.end()..]);
        path = replaced;
    }
    path.replace(['{', '}'], "")
}

/// Strip every segment of the path without touching the extension, then normalize.
#[must_use]
pub fn normalize_segments(path: &str) -> String {
    let (stem, extension) = split_extension(path);
    let stripped = strip_path_segments(stem);
    normalize_path(&format!("{stripped}{extension}"))
}

#[cfg(test)]
mod dupe_separator_tests {
    use super::*;

    #[test]
    fn dotted_tokens() {
        assert_eq!(select_dupe_separator("%.t.%y"), '.');
        assert_eq!(select_dupe_separator("%sn/%s.n.S%0sE%0e"), '.');
        assert_eq!(select_dupe_separator("%s.N"), '.');
    }

    #[test]
    fn underscored_tokens() {
        assert_eq!(select_dupe_separator("%_t_%y"), '_');
        assert_eq!(select_dupe_separator("%sn/%s_N"), '_');
    }

    #[test]
    fn default_is_space() {
        assert_eq!(select_dupe_separator("%t (%y)"), ' ');
    }

    #[test]
    fn only_file_name_counts() {
        assert_eq!(select_dupe_separator("%s.n/%sn - %0e"), ' ');
    }
}


#[cfg(test)]
mod substitute_tests {
    use super::*;

    fn mapping(pairs: &[(&'static str, &str)]) -> SpecifierMapping {
        let mut mapping = SpecifierMapping::new();
        for &(token, value) in pairs {
            mapping.push(token, value);
        }
        mapping
    }

    #[test]
    fn replaces_tokens() {
        let mapping = mapping(&[("%sn", "Show"), ("%s", "2"), ("%0e", "05")]);
        assert_eq!(substitute("%sn/Season %s/E%0e", &mapping), "Show/Season 2/E05");
    }

    #[test]
    fn order_decides_match() {
        let longer_first = mapping(&[("%sn", "Show"), ("%s", "2")]);
        assert_eq!(substitute("%sn", &longer_first), "Show");
        let shorter_first = mapping(&[("%s", "2"), ("%sn", "Show")]);
        assert_eq!(substitute("%sn", &shorter_first), "2n");
    }

    #[test]
    fn unknown_percent_copied() {
        let mapping = mapping(&[("%t", "Title")]);
        assert_eq!(substitute("100% %x %t%", &mapping), "100% %x Title%");
    }

    #[test]
    fn values_are_not_rescanned() {
        let mapping = mapping(&[("%t", "%y"), ("%y", "2010")]);
        assert_eq!(substitute("%t", &mapping), "%y");
    }

    #[test]
    fn unicode_literals() {
        let mapping = mapping(&[("%t", "Amélie")]);
        assert_eq!(substitute("Films/%t – ñ", &mapping), "Films/Amélie – ñ");
    }

    #[test]
    fn no_known_token_remains() {
        let mapping = mapping(&[("%title", "A"), ("%t", "B"), ("%y", "C"), ("%ext", ".mkv")]);
        let result = substitute("%title %t %y%ext", &mapping);
        assert_eq!(result, "A B C.mkv");
        for (token, _) in mapping.entries() {
            assert!(!result.contains(token));
        }
    }
}



#[cfg(test)]
mod render_tests {
    use super::*;

    fn mapping(pairs: &[(&'static str, &str)]) -> SpecifierMapping {
        let mut mapping = SpecifierMapping::new();
        for &(token, value) in pairs {
            mapping.push(token, value);
        }
        mapping
    }

    #[test]
    fn series_path() {
        let mapping = mapping(&[
            ("%ext", ".mkv"),
            ("%sn", "Show Name"),
            ("%s", "2"),
            ("%0s", "02"),
            ("%en", ""),
            ("%e", "5"),
            ("%0e", "05"),
        ]);
        let template = PathTemplate::new("%sn/Season %s/%sn - S%0sE%0e - %en");
        assert_eq!(template.render(&mapping), "Show Name/Season 2/Show Name - S02E05.mkv");
    }

    #[test]
    fn empty_year_leaves_no_artifacts() {
        let mapping = mapping(&[("%ext", ".avi"), ("%t", "Movie"), ("%y", "")]);
        assert_eq!(PathTemplate::new("%t (%y)").render(&mapping), "Movie.avi");
    }

    #[test]
    fn dotted_path_with_case_block() {
        let mapping = mapping(&[("%ext", ".mkv"), ("%.t", "Movie.Title"), ("%y", "2010")]);
        assert_eq!(PathTemplate::new("{%.t}.%y").render(&mapping), "movie.title.2010.mkv");
    }

    #[test]
    fn backslashes_become_slashes() {
        let mapping = mapping(&[("%ext", ".mkv"), ("%t", "Movie")]);
        assert_eq!(PathTemplate::new(r"Films\%t").render(&mapping), "Films/Movie.mkv");
    }

    #[test]
    fn strips_segment_edges() {
        let mapping = mapping(&[("%ext", ".mkv"), ("%sn", "Show"), ("%en", "")]);
        assert_eq!(PathTemplate::new("_%sn_/%sn - %en").render(&mapping), "Show/Show.mkv");
    }

    #[test]
    fn destination_joins_root() {
        let mapping = mapping(&[("%ext", ".mkv"), ("%t", "Movie Title"), ("%y", "2010")]);
        let dest = PathTemplate::new("%t (%y)").destination(Path::new("/media/movies"), &mapping);
        assert_eq!(dest, PathBuf::from("/media/movies/Movie Title (2010).mkv"));
    }
}
