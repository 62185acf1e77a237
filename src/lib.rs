pub mod config;
pub mod video_sort;

use std::env;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Command;
use clap_complete::Shell;
use colored::{ColoredString, Colorize};

pub use config::config_path;

/// Log line severity, printed as a `[TAG]` prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Info => "[INFO]",
            Self::Warning => "[WARNING]",
            Self::Error => "[ERROR]",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Append an extension to `PathBuf`, which is missing from the standard lib :(
pub fn append_extension_to_path(path: PathBuf, extension: impl AsRef<OsStr>) -> PathBuf {
    let mut os_string: OsString = path.into();
    os_string.push(".");
    os_string.push(extension);
    os_string.into()
}

/// Format bool value as a coloured string.
#[must_use]
pub fn colorize_bool(value: bool) -> ColoredString {
    if value { "true".green() } else { "false".red() }
}

/// Insert a suffix before the file extension.
///
/// Takes a path and inserts the given suffix string between the file stem and the file extension.
/// If the file has no extension, the suffix is appended to the end.
///
/// ```rust
/// use std::path::Path;
/// use video_sort::insert_suffix_before_extension;
///
/// let path = Path::new("Movie Title (2010).mkv");
/// let result = insert_suffix_before_extension(path, " (2)");
/// assert_eq!(result.to_str().unwrap(), "Movie Title (2010) (2).mkv");
///
/// let path = Path::new("Show Name/Show_Name_S01E01.mkv");
/// let result = insert_suffix_before_extension(path, "_(3)");
/// assert_eq!(result, Path::new("Show Name/Show_Name_S01E01_(3).mkv"));
///
/// let path = Path::new("README");
/// let result = insert_suffix_before_extension(path, ".(2)");
/// assert_eq!(result.to_str().unwrap(), "README.(2)");
/// ```
#[must_use]
pub fn insert_suffix_before_extension(path: &Path, suffix: &str) -> PathBuf {
    let parent = path.parent().unwrap_or_else(|| Path::new(""));
    let stem = path.file_stem().map(os_str_to_string).unwrap_or_default();
    let extension = path.extension().map(os_str_to_string).unwrap_or_default();

    let new_name = if extension.is_empty() {
        format!("{stem}{suffix}")
    } else {
        format!("{stem}{suffix}.{extension}")
    };

    if parent.as_os_str().is_empty() {
        PathBuf::from(new_name)
    } else {
        parent.join(new_name)
    }
}

/// Resolve the download directory to sort.
///
/// If `path` is `None` or blank, the current working directory is used.
/// Existing paths are made absolute. A missing path is returned as given,
/// so the caller can report that there is nothing to do.
pub fn resolve_source_path(path: Option<&Path>) -> Result<PathBuf> {
    let input_path = path.map(path_to_string).unwrap_or_default().trim().to_string();

    let source = if input_path.is_empty() {
        env::current_dir().context("Failed to get current working directory")?
    } else {
        PathBuf::from(input_path)
    };
    if !source.exists() {
        return Ok(source);
    }

    let absolute_path = dunce::canonicalize(&source)
        .with_context(|| format!("Failed to resolve path: {}", source.display()))?;

    // Canonicalize fails for network drives on Windows :(
    if path_to_string(&absolute_path).starts_with(r"\\?") && !path_to_string(&source).starts_with(r"\\?") {
        Ok(source)
    } else {
        Ok(absolute_path)
    }
}

/// Convert `OsStr` to String with invalid Unicode handling.
pub fn os_str_to_string(name: &OsStr) -> String {
    name.to_str().map_or_else(
        || name.to_string_lossy().replace('\u{FFFD}', ""),
        std::string::ToString::to_string,
    )
}

/// Convert given path to string with invalid Unicode handling.
pub fn path_to_string(path: &Path) -> String {
    path.to_str().map_or_else(
        || path.to_string_lossy().to_string().replace('\u{FFFD}', ""),
        std::string::ToString::to_string,
    )
}

/// Convert given path to filename string with invalid Unicode handling.
#[must_use]
pub fn path_to_filename_string(path: &Path) -> String {
    os_str_to_string(path.file_name().unwrap_or_default())
}

/// Convert given path to file stem string with invalid Unicode handling.
#[must_use]
pub fn path_to_file_stem_string(path: &Path) -> String {
    os_str_to_string(path.file_stem().unwrap_or_default())
}

/// Format a log line with its severity tag.
#[must_use]
pub fn format_log_line(severity: Severity, message: &str) -> String {
    format!("{severity} {message}")
}

#[inline]
pub fn print_info(message: &str) {
    println!("{}", format_log_line(Severity::Info, message));
}

#[macro_export]
macro_rules! print_info {
    ($($arg:tt)*) => {
        $crate::print_info(&format!($($arg)*))
    };
}

#[inline]
pub fn print_error(message: &str) {
    eprintln!("{}", format_log_line(Severity::Error, message).red());
}

#[macro_export]
macro_rules! print_error {
    ($($arg:tt)*) => {
        $crate::print_error(&format!($($arg)*))
    };
}

#[inline]
pub fn print_warning(message: &str) {
    eprintln!("{}", format_log_line(Severity::Warning, message).yellow());
}

#[macro_export]
macro_rules! print_warning {
    ($($arg:tt)*) => {
        $crate::print_warning(&format!($($arg)*))
    };
}

/// Format bytes as human-readable size
#[must_use]
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    }
}

/// Generate a shell completion script for the given shell.
pub fn generate_shell_completion(shell: Shell, mut command: Command, install: bool, command_name: &str) -> Result<()> {
    if install {
        let out_dir = get_shell_completion_dir(shell, command_name)?;
        let path = clap_complete::generate_to(shell, &mut command, command_name, out_dir)?;
        println!("Completion file generated to: {}", path.display());
    } else {
        clap_complete::generate(shell, &mut command, command_name, &mut std::io::stdout());
    }
    Ok(())
}

/// Determine the directory for storing shell completions.
///
/// Uses the user-specific directory if it exists,
/// then the global directory, and otherwise creates the user-specific one.
fn get_shell_completion_dir(shell: Shell, name: &str) -> Result<PathBuf> {
    let home = dirs::home_dir().context("Failed to get home directory")?;

    // Oh-my-zsh custom "plugin", which will then have to be loaded in .zshrc
    if shell == Shell::Zsh {
        let omz_plugins = home.join(".oh-my-zsh/custom/plugins");
        if omz_plugins.exists() {
            let plugin_dir = omz_plugins.join(name);
            std::fs::create_dir_all(&plugin_dir)?;
            return Ok(plugin_dir);
        }
    }

    let (user_dir, global_dir) = match shell {
        Shell::Bash => (home.join(".bash_completion.d"), PathBuf::from("/etc/bash_completion.d")),
        Shell::Fish => (
            home.join(".config/fish/completions"),
            PathBuf::from("/usr/share/fish/completions"),
        ),
        Shell::Zsh => (home.join(".zsh/completions"), PathBuf::from("/usr/share/zsh/site-functions")),
        Shell::Elvish => (home.join(".elvish"), home.join(".elvish")),
        Shell::PowerShell => {
            let dir = if cfg!(windows) {
                home.join(r"Documents\PowerShell\completions")
            } else {
                home.join(".config/powershell/completions")
            };
            (dir.clone(), dir)
        }
        _ => anyhow::bail!("Unsupported shell"),
    };

    if user_dir.exists() {
        return Ok(user_dir);
    }
    if global_dir.exists() {
        return Ok(global_dir);
    }

    std::fs::create_dir_all(&user_dir)?;
    Ok(user_dir)
}
