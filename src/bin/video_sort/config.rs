use video_sort::video_sort::{SortConfig, VideoSortConfig};

use crate::Args;

/// Create the final config from CLI arguments and the user config file.
/// Arguments take precedence over config file values.
///
/// # Errors
/// Returns an error if the config file is invalid or a destination is missing.
pub fn from_args(args: Args) -> anyhow::Result<VideoSortConfig> {
    let source = video_sort::resolve_source_path(args.path.as_deref())?;
    let user_config = SortConfig::get_user_config()?;
    VideoSortConfig::new(source, apply_args(user_config, args))
}

/// Override user config values with the ones given on the command line.
fn apply_args(mut user_config: SortConfig, args: Args) -> SortConfig {
    if args.destination.is_some() {
        user_config.destination = args.destination;
    }
    if args.movies_dir.is_some() {
        user_config.movies_dir = args.movies_dir;
    }
    if args.series_dir.is_some() {
        user_config.series_dir = args.series_dir;
    }
    if args.dated_dir.is_some() {
        user_config.dated_dir = args.dated_dir;
    }
    if args.movies_format.is_some() {
        user_config.movies_format = args.movies_format;
    }
    if args.series_format.is_some() {
        user_config.series_format = args.series_format;
    }
    if args.dated_format.is_some() {
        user_config.dated_format = args.dated_format;
    }
    if args.min_size.is_some() {
        user_config.min_size = args.min_size;
    }
    user_config.overwrite |= args.force;
    user_config.cleanup &= !args.keep;
    user_config.preview |= args.preview;
    user_config.verbose |= args.verbose;
    user_config
}

#[cfg(test)]
mod config_tests {
    use super::*;

    use std::path::PathBuf;

    use clap::Parser;

    fn parse(args: &[&str]) -> Args {
        Args::parse_from(std::iter::once("vsort").chain(args.iter().copied()))
    }

    #[test]
    fn flags_override_user_config() {
        let args = parse(&["/downloads/x", "--force", "--keep", "--preview", "--verbose"]);
        let config = apply_args(SortConfig::with_defaults(), args);
        assert!(config.overwrite);
        assert!(!config.cleanup);
        assert!(config.preview);
        assert!(config.verbose);
    }

    #[test]
    fn missing_flags_keep_user_config() {
        let user = SortConfig {
            overwrite: true,
            preview: true,
            destination: Some(PathBuf::from("/media")),
            min_size: Some(10),
            ..SortConfig::with_defaults()
        };
        let config = apply_args(user, parse(&[]));
        assert!(config.overwrite);
        assert!(config.preview);
        assert!(config.cleanup);
        assert_eq!(config.destination, Some(PathBuf::from("/media")));
        assert_eq!(config.min_size, Some(10));
    }

    #[test]
    fn directory_and_format_options_override() {
        let args = parse(&[
            "-d",
            "/library",
            "--movies-dir",
            "/films",
            "--series-format",
            "%sn/%sn.S%0sE%0e",
            "-m",
            "5",
        ]);
        let user = SortConfig {
            destination: Some(PathBuf::from("/media")),
            ..SortConfig::with_defaults()
        };
        let config = apply_args(user, args);
        assert_eq!(config.destination, Some(PathBuf::from("/library")));
        assert_eq!(config.movies_dir, Some(PathBuf::from("/films")));
        assert_eq!(config.series_format.as_deref(), Some("%sn/%sn.S%0sE%0e"));
        assert_eq!(config.min_size, Some(5));
        assert!(config.movies_format.is_none());
    }
}
