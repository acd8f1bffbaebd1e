use std::path::PathBuf;

use clap::Parser;

macro_rules! arg_env {
    ($v:literal) => {
        concat!("YOINK_", $v)
    };
}

/// Wrapper-tool around `yt-dlp` and `ffmpeg`.
/// Download videos and optionally convert them to another format.
#[derive(Parser, Debug)]
#[command(version)]
pub struct Args {
    /// The URLs of the videos or playlists to download
    pub urls: Vec<String>,

    /// The path to the output directory.
    /// Defaults to the last one used, then to the current directory
    #[arg(long, env = arg_env!("OUT"))]
    pub out: Option<PathBuf>,

    /// The file extension to convert the downloaded files to (e.g. `mp3`, `.mkv`).
    /// `default` keeps the files as downloaded
    #[arg(long, env = arg_env!("EXT"))]
    pub ext: Option<String>,

    /// Extra arguments for the downloader, as JSON.
    ///
    /// Either an array of arguments (`["-f", "bestaudio"]`),
    /// a string split on whitespace (`"-f bestaudio"`)
    /// or an object (`{"-f": "bestaudio", "--no-playlist": null}`)
    #[arg(long, env = arg_env!("DL_PARAMS"), allow_hyphen_values = true)]
    pub dl_params: Option<String>,

    /// Extra arguments for the converter applied to the input file, as JSON.
    /// Same format as `--dl-params`
    #[arg(long, env = arg_env!("INPUT_PARAMS"), allow_hyphen_values = true)]
    pub input_params: Option<String>,

    /// Extra arguments for the converter applied to the output file, as JSON.
    /// Same format as `--dl-params`
    #[arg(long, env = arg_env!("OUTPUT_PARAMS"), allow_hyphen_values = true)]
    pub output_params: Option<String>,

    /// Instead of downloading, convert the files of the output directory whose
    /// name matches this glob pattern (e.g. `*.webm`) to `--ext`.
    /// Subdirectories are left alone
    #[arg(long, env = arg_env!("CONVERT"), conflicts_with = "urls")]
    pub convert: Option<String>,

    /// The path to the preferences file remembering the last used values
    #[arg(long, env = arg_env!("PREFS"))]
    pub prefs: Option<PathBuf>,

    /// Neither read nor write the preferences file
    #[arg(long, env = arg_env!("NO_PREFS"), conflicts_with = "prefs")]
    pub no_prefs: bool,

    /// The maximum level of the logs
    #[arg(long, default_value_t = tracing::Level::INFO, env = arg_env!("LOG_LEVEL"))]
    pub log_level: tracing::Level,
}
