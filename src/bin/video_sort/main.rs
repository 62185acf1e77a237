mod config;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use clap_complete::Shell;

use video_sort::print_error;
use video_sort::video_sort::{RunOutcome, VideoSort};

#[derive(Parser)]
#[command(
    author,
    version,
    name = env!("CARGO_BIN_NAME"),
    about = "Sort downloaded movies and TV shows into a media library"
)]
pub struct Args {
    /// Download directory to sort
    #[arg(value_hint = clap::ValueHint::DirPath)]
    path: Option<PathBuf>,

    /// Base destination directory for all categories
    #[arg(short, long, value_hint = clap::ValueHint::DirPath, value_name = "DIR")]
    destination: Option<PathBuf>,

    /// Destination directory for movies
    #[arg(long, value_hint = clap::ValueHint::DirPath, value_name = "DIR")]
    movies_dir: Option<PathBuf>,

    /// Destination directory for seasoned series
    #[arg(long, value_hint = clap::ValueHint::DirPath, value_name = "DIR")]
    series_dir: Option<PathBuf>,

    /// Destination directory for dated shows
    #[arg(long, value_hint = clap::ValueHint::DirPath, value_name = "DIR")]
    dated_dir: Option<PathBuf>,

    /// Format string for movies
    #[arg(long, value_name = "FORMAT")]
    movies_format: Option<String>,

    /// Format string for seasoned series
    #[arg(long, value_name = "FORMAT")]
    series_format: Option<String>,

    /// Format string for dated shows
    #[arg(long, value_name = "FORMAT")]
    dated_format: Option<String>,

    /// Minimum video file size in megabytes
    #[arg(short, long, value_name = "MB")]
    min_size: Option<u64>,

    /// Overwrite existing files
    #[arg(short, long)]
    force: bool,

    /// Keep the download directory after sorting
    #[arg(short, long)]
    keep: bool,

    /// Only print changes without moving or deleting anything
    #[arg(short, long)]
    preview: bool,

    /// Create shell completion
    #[arg(short = 'l', long, name = "SHELL")]
    completion: Option<Shell>,

    /// Print verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    if let Some(ref shell) = args.completion {
        return match video_sort::generate_shell_completion(*shell, Args::command(), true, env!("CARGO_BIN_NAME")) {
            Ok(()) => ExitCode::SUCCESS,
            Err(error) => {
                print_error!("{error:#}");
                ExitCode::FAILURE
            }
        };
    }

    let outcome = run(args).unwrap_or_else(|error| {
        print_error!("{error:#}");
        RunOutcome::Failure
    });
    ExitCode::from(outcome.exit_code())
}

fn run(args: Args) -> anyhow::Result<RunOutcome> {
    let config = config::from_args(args)?;
    Ok(VideoSort::with_defaults(config).run())
}
