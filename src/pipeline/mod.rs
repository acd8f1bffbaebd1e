mod acquire;
mod report;
mod transform;

use tracing::{debug, info, warn};

use acquire::acquire;
pub use report::JobReport;
use transform::{transform, Transform};

use crate::{
    cancel::CancelToken,
    io::ScratchArea,
    job::{Conversion, Job},
    outside::{MediaConverter, MediaDownloader},
    result::Result,
};

/// Run a whole job: download every URL into a fresh scratch area, then
/// convert or move the downloaded files into the destination.
///
/// The scratch area is removed whatever happens. Per-URL and per-file
/// failures end up in the returned report; only configuration and
/// scratch area failures are returned as errors.
pub fn run_job(
    job: &Job,
    stream_dl: &dyn MediaDownloader,
    stream_tsf: &dyn MediaConverter,
    cancel: &CancelToken,
) -> Result<JobReport> {
    let destination = job.check_destination()?;
    let mut report = JobReport::default();

    if job.urls.is_empty() {
        info!("No URL to download");
        return Ok(report);
    }

    let scratch = ScratchArea::create()?;

    let res = acquire(
        stream_dl,
        &job.urls,
        &job.download_options,
        &scratch,
        cancel,
        &mut report,
    )
    .and_then(|()| {
        if report.cancelled {
            debug!("Skipping the conversion of a cancelled job");
            return Ok(());
        }

        transform(
            stream_tsf,
            scratch.path(),
            &destination,
            Transform {
                pattern: None,
                extension: job.extension.as_ref(),
                input_options: &job.input_options,
                output_options: &job.output_options,
            },
            cancel,
            &mut report,
        )
    });

    let closed = scratch.close();
    match (res, closed) {
        (Ok(()), Ok(())) => Ok(report),
        (Err(err), Ok(())) => Err(err),
        (Ok(()), Err(err)) => Err(err),
        (Err(err), Err(close_err)) => {
            warn!("{}", close_err.to_reason());
            Err(err)
        }
    }
}

/// Convert, next to themselves, the files of a directory matching a pattern.
///
/// Subdirectories are skipped. Like for a job, failed files end up in the report.
pub fn run_conversion(
    conversion: &Conversion,
    stream_tsf: &dyn MediaConverter,
    cancel: &CancelToken,
) -> Result<JobReport> {
    let directory = conversion.check_directory()?;
    let mut report = JobReport::default();

    transform(
        stream_tsf,
        &directory,
        &directory,
        Transform {
            pattern: Some(&conversion.pattern),
            extension: Some(&conversion.extension),
            input_options: &conversion.input_options,
            output_options: &conversion.output_options,
        },
        cancel,
        &mut report,
    )?;

    Ok(report)
}
