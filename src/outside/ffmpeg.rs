use std::{ffi::OsString, fmt::Debug, path::Path};

use crate::{result::Result, types::Options};

use super::command::{
    assert_success_command, check_status, run_command, Capture, FFMPEG, FFXXX_DEFAULT_ARGS,
};

pub trait MediaConverter: Send + Sync + Debug {
    /// Convert the input file into the output file.
    /// The output format is deduced from the output path extension.
    ///
    /// `input_options` apply to the input file, `output_options` to the output file.
    fn convert(
        &self,
        input: &Path,
        output: &Path,
        input_options: &Options,
        output_options: &Options,
    ) -> Result<()>;
}

/// Interface for the [ffmpeg](https://ffmpeg.org) program
#[derive(Debug, Default)]
pub struct Ffmpeg;

impl Ffmpeg {
    /// Verify that the `ffmpeg` binary is reachable
    pub fn new() -> Result<Self> {
        assert_success_command(FFMPEG, |cmd| cmd.arg("-version"))?;

        Ok(Self)
    }
}

/// Arguments of a single file conversion, in the order ffmpeg expects them
fn conversion_args(
    input: &Path,
    output: &Path,
    input_options: &Options,
    output_options: &Options,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = FFXXX_DEFAULT_ARGS.iter().map(OsString::from).collect();
    args.push("-y".into());
    args.extend(input_options.iter().map(OsString::from));
    args.push("-i".into());
    args.push(input.as_os_str().to_owned());
    args.extend(output_options.iter().map(OsString::from));
    args.push(output.as_os_str().to_owned());
    args
}

impl MediaConverter for Ffmpeg {
    fn convert(
        &self,
        input: &Path,
        output: &Path,
        input_options: &Options,
        output_options: &Options,
    ) -> Result<()> {
        let args = conversion_args(input, output, input_options, output_options);
        let res = run_command(
            FFMPEG,
            |cmd| cmd.args(args.iter().map(OsString::as_os_str)),
            Capture::STDERR,
        )?;

        check_status(FFMPEG, &res)
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::OsStr;

    use super::*;

    #[test]
    fn options_surround_the_input() {
        let args = conversion_args(
            Path::new("/tmp/scratch/Song.webm"),
            Path::new("/music/Song.mp3"),
            &Options::from_json(r#"["-ss", "10"]"#).unwrap(),
            &Options::from_json(r#""-b:a 192k""#).unwrap(),
        );

        let args: Vec<&OsStr> = args.iter().map(OsString::as_os_str).collect();
        assert_eq!(
            args,
            [
                "-hide_banner",
                "-loglevel",
                "error",
                "-y",
                "-ss",
                "10",
                "-i",
                "/tmp/scratch/Song.webm",
                "-b:a",
                "192k",
                "/music/Song.mp3",
            ]
            .map(OsStr::new)
        );
    }
}
