use tracing::{debug, error, info, warn};

use super::JobReport;
use crate::{
    cancel::CancelToken,
    io::ScratchArea,
    outside::MediaDownloader,
    result::{Error, Result},
    types::Options,
};

/// Download every URL into the scratch area, one after the other.
///
/// A URL that fails is recorded in the report and its unfinished files are
/// removed from the scratch area. Files it completed, like the good items of
/// a playlist, are kept. Only scratch area failures abort the step.
pub fn acquire(
    stream_dl: &dyn MediaDownloader,
    urls: &[String],
    options: &Options,
    scratch: &ScratchArea,
    cancel: &CancelToken,
    report: &mut JobReport,
) -> Result<()> {
    for url in urls {
        if cancel.is_cancelled() {
            warn!("Cancelled before downloading {url}");
            report.cancelled = true;
            return Ok(());
        }

        let before = scratch.entries()?;

        info!("Downloading {url}");
        match stream_dl.download(url, scratch.path(), options) {
            Ok(()) => {
                let count = scratch.entries()?.difference(&before).count();
                info!("Downloaded {count} file(s) from {url}");
            }
            Err(err) => {
                match &err {
                    Error::UnavailableStream => error!("{url} is unavailable. Skipping it"),
                    err => error!("Could not download {url}: {}", err.to_reason()),
                }

                let removed = scratch.discard_partial_entries(&before)?;
                if removed > 0 {
                    debug!("Removed {removed} unfinished file(s) of {url}");
                }

                report.failed_urls.push((url.clone(), err.to_reason()));
            }
        }
    }

    Ok(())
}
