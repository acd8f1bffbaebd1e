//! In-memory stand-ins for the external programs, recording how they are called.

use std::{
    collections::{HashMap, HashSet},
    path::{Path, PathBuf},
    sync::Mutex,
};

use super::{MediaConverter, MediaDownloader};
use crate::{
    result::{bail, Result},
    types::Options,
};

#[derive(Debug, Clone)]
enum StubSource {
    Files(Vec<(String, Vec<u8>)>),
    /// Leave these files behind, then fail
    Fail(Vec<String>),
}

#[derive(Debug, Default)]
pub struct StubDownloader {
    sources: HashMap<String, StubSource>,
    calls: Mutex<Vec<(String, PathBuf, Options)>>,
}

impl StubDownloader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `url` produce the given files
    pub fn with_files(mut self, url: &str, files: &[(&str, &[u8])]) -> Self {
        let files = files
            .iter()
            .map(|(name, data)| (name.to_string(), data.to_vec()))
            .collect();
        self.sources.insert(url.to_owned(), StubSource::Files(files));
        self
    }

    /// Make `url` fail after writing the given files
    pub fn failing(mut self, url: &str, leftovers: &[&str]) -> Self {
        let leftovers = leftovers.iter().map(|name| name.to_string()).collect();
        self.sources.insert(url.to_owned(), StubSource::Fail(leftovers));
        self
    }

    /// Every `(url, directory, options)` the downloader was called with, in order
    pub fn calls(&self) -> Vec<(String, PathBuf, Options)> {
        self.calls.lock().unwrap().clone()
    }
}

impl MediaDownloader for StubDownloader {
    fn download(&self, url: &str, dir: &Path, options: &Options) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_owned(), dir.to_path_buf(), options.clone()));

        match self.sources.get(url) {
            Some(StubSource::Files(files)) => {
                for (name, data) in files {
                    std::fs::write(dir.join(name), data)?;
                }
                Ok(())
            }
            Some(StubSource::Fail(leftovers)) => {
                for name in leftovers {
                    std::fs::write(dir.join(name), b"partial")?;
                }
                bail(format!("ERROR: unable to download {url}"))
            }
            None => bail(format!("ERROR: unsupported URL {url}")),
        }
    }
}

#[derive(Debug, Default)]
pub struct StubConverter {
    failing: HashSet<String>,
    calls: Mutex<Vec<(PathBuf, PathBuf)>>,
}

impl StubConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the conversion of the file named `name` fail, leaving a partial output
    pub fn failing(mut self, name: &str) -> Self {
        self.failing.insert(name.to_owned());
        self
    }

    /// Every `(input, output)` the converter was called with, in order
    pub fn calls(&self) -> Vec<(PathBuf, PathBuf)> {
        self.calls.lock().unwrap().clone()
    }

    /// Content written for a converted input
    pub fn converted(input: &[u8]) -> Vec<u8> {
        [b"converted:".as_slice(), input].concat()
    }
}

impl MediaConverter for StubConverter {
    fn convert(
        &self,
        input: &Path,
        output: &Path,
        _input_options: &Options,
        _output_options: &Options,
    ) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push((input.to_path_buf(), output.to_path_buf()));

        let name = input
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        if self.failing.contains(&name) {
            std::fs::write(output, b"partial")?;
            return bail("ffmpeg did run but was not successful (exit status: 1)");
        }

        let data = std::fs::read(input)?;
        std::fs::write(output, Self::converted(&data))?;
        Ok(())
    }
}
