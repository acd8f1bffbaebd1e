use std::path::{Path, PathBuf};

use globset::{Glob, GlobMatcher};

use crate::{
    result::{config_err, Result},
    types::{Extension, Options},
};

/// One download-then-convert request
#[derive(Debug, Clone, Default)]
pub struct Job {
    pub urls: Vec<String>,
    pub download_options: Options,
    /// Convert the downloaded files to this extension. Move them as-is if `None`
    pub extension: Option<Extension>,
    pub input_options: Options,
    pub output_options: Options,
    pub destination: PathBuf,
}

impl Job {
    pub fn new<P: Into<PathBuf>>(urls: Vec<String>, destination: P) -> Self {
        Self {
            urls,
            destination: destination.into(),
            ..Self::default()
        }
    }

    /// Split a block of text into URLs, one per non-empty line
    pub fn parse_urls(text: &str) -> Vec<String> {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect()
    }

    /// Check that the destination is an existing directory and return its absolute path
    pub fn check_destination(&self) -> Result<PathBuf> {
        check_directory(&self.destination)
    }
}

/// Conversion of files already present in a directory, in place
#[derive(Debug, Clone)]
pub struct Conversion {
    pub directory: PathBuf,
    /// Only the files whose name matches are converted
    pub pattern: GlobMatcher,
    pub extension: Extension,
    pub input_options: Options,
    pub output_options: Options,
}

impl Conversion {
    pub fn new<P: Into<PathBuf>>(directory: P, pattern: &str, extension: Extension) -> Result<Self> {
        let matcher = Glob::new(pattern)
            .map_err(|err| config_err(format!("Invalid file pattern '{pattern}': {err}")))?
            .compile_matcher();

        Ok(Self {
            directory: directory.into(),
            pattern: matcher,
            extension,
            input_options: Options::default(),
            output_options: Options::default(),
        })
    }

    /// Check that the directory exists and return its absolute path
    pub fn check_directory(&self) -> Result<PathBuf> {
        check_directory(&self.directory)
    }
}

fn check_directory(dir: &Path) -> Result<PathBuf> {
    if !dir.is_dir() {
        return Err(config_err(format!(
            "{} is not an existing directory",
            dir.display()
        )));
    }

    dir.canonicalize()
        .map_err(|err| config_err(format!("Could not resolve {}: {err}", dir.display())))
}
