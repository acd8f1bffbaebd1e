use std::{
    ffi::OsStr,
    fmt::Debug,
    path::Path,
    process::{Command, Output},
};

use super::command::{assert_success_command, check_status, run_command, Capture, YT_DL, YT_DLP};
use crate::{
    result::{bail, Error, Result},
    types::Options,
};

/// Output file naming given to the downloader: media title and native extension
pub const OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";

/// Interface for downloading media into a directory
pub trait MediaDownloader: Send + Sync + Debug {
    /// Download the media behind `url` into `dir`, each file being named
    /// after [`OUTPUT_TEMPLATE`].
    ///
    /// A playlist URL may produce several files.
    /// Blocks until the download is over.
    fn download(&self, url: &str, dir: &Path, options: &Options) -> Result<()>;
}

/// Interface for the [youtube-dl](https://github.com/ytdl-org/youtube-dl) program
/// or its [yt-dlp](https://github.com/yt-dlp/yt-dlp) fork
#[derive(Debug)]
pub struct Ytdl {
    program: &'static str,
}

impl Ytdl {
    /// Verify that the `yt-dlp` or `youtube-dl` binaries are reachable
    pub fn new() -> Result<Self> {
        // Check `yt-dlp`
        if assert_success_command(YT_DLP, |cmd| cmd.arg("--version")).is_ok() {
            Ok(Self { program: YT_DLP })
        } else if assert_success_command(YT_DL, |cmd| cmd.arg("--version")).is_ok() {
            // Check `youtube-dl`
            Ok(Self { program: YT_DL })
        } else {
            bail("Neither yt-dlp nor youtube-dl found")
        }
    }

    /// Assume `yt-dlp` is there without checking, for runs that download nothing
    pub fn unchecked() -> Self {
        Self { program: YT_DLP }
    }

    /// Run the command and check if it failed with saying the stream is unavailable.
    /// In that case, return [`Error::UnavailableStream`].
    ///
    /// In other cases, return the output handle.
    pub fn run_check_availability<F>(&self, f: F, capture: Capture) -> Result<Output>
    where
        F: FnOnce(&mut Command) -> &mut Command,
    {
        let res = run_command(self.program, f, capture | Capture::STDERR)?;

        if is_unavailable(&String::from_utf8_lossy(&res.stderr)) {
            Err(Error::UnavailableStream)
        } else {
            Ok(res)
        }
    }
}

fn is_unavailable(stderr: &str) -> bool {
    stderr
        .lines()
        .any(|line| line.starts_with("ERROR:") && line.to_lowercase().contains("unavailable"))
}

impl MediaDownloader for Ytdl {
    fn download(&self, url: &str, dir: &Path, options: &Options) -> Result<()> {
        let template = dir.join(OUTPUT_TEMPLATE);

        let res = self.run_check_availability(
            |cmd| {
                cmd.arg("-q")
                    .args([OsStr::new("-o"), template.as_os_str()])
                    .args(options.iter())
                    .arg("--")
                    .arg(url)
            },
            Capture::empty(),
        )?;

        check_status(self.program, &res)
    }
}
