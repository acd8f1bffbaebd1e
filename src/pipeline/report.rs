use std::{fmt::Display, path::PathBuf};

/// Outcome of a job that ran to its end, with the per-item failures it went through
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct JobReport {
    /// Result files written to the destination
    pub produced: Vec<PathBuf>,
    /// URLs that could not be downloaded, with the reason
    pub failed_urls: Vec<(String, String)>,
    /// Downloaded files that could not be converted or moved, with the reason
    pub failed_files: Vec<(PathBuf, String)>,
    /// The job was stopped before processing everything
    pub cancelled: bool,
}

impl JobReport {
    pub fn is_success(&self) -> bool {
        self.failed_urls.is_empty() && self.failed_files.is_empty() && !self.cancelled
    }

    pub fn failure_count(&self) -> usize {
        self.failed_urls.len() + self.failed_files.len()
    }
}

impl Display for JobReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} file(s) produced, {} URL(s) failed, {} file(s) failed",
            self.produced.len(),
            self.failed_urls.len(),
            self.failed_files.len()
        )?;
        if self.cancelled {
            write!(f, " (cancelled)")?;
        }
        Ok(())
    }
}
