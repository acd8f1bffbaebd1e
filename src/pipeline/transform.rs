use std::path::Path;

use globset::GlobMatcher;
use tracing::{debug, error, info, warn};

use super::JobReport;
use crate::{
    cancel::CancelToken,
    io::{move_file, remove_existing},
    outside::MediaConverter,
    result::{Error, Result},
    types::{Extension, Options},
};

/// What to do with every file of the source directory
#[derive(Debug, Clone, Copy)]
pub struct Transform<'a> {
    /// Only process the files whose name matches. Every file if `None`
    pub pattern: Option<&'a GlobMatcher>,
    pub extension: Option<&'a Extension>,
    pub input_options: &'a Options,
    pub output_options: &'a Options,
}

/// Convert or move every file of `source` into `destination`, one at a time.
///
/// Directories and files not matching the pattern are skipped, as are files
/// already named like their result. A file that fails is recorded in the
/// report and the remaining files are still processed.
pub fn transform(
    stream_tsf: &dyn MediaConverter,
    source: &Path,
    destination: &Path,
    plan: Transform<'_>,
    cancel: &CancelToken,
    report: &mut JobReport,
) -> Result<()> {
    let listing = source.read_dir().map_err(|err| {
        Error::from(err)
            .wrap_err_with(|| format!("Could not list {}", source.display()))
            .into_resource()
    })?;

    // Listed up front as results may be written next to their sources
    let mut entries = Vec::new();
    for entry in listing {
        entries.push(entry.map_err(|err| Error::from(err).into_resource())?);
    }

    for entry in entries {
        if entry.file_type().map_or(false, |t| t.is_dir()) {
            debug!("Skipping directory {}", entry.path().display());
            continue;
        }

        let name = entry.file_name();
        if let Some(pattern) = plan.pattern {
            if !pattern.is_match(&name) {
                debug!("Skipping {}, not matching the pattern", entry.path().display());
                continue;
            }
        }

        if cancel.is_cancelled() {
            warn!("Cancelled before processing {}", entry.path().display());
            report.cancelled = true;
            return Ok(());
        }

        let input = entry.path();
        let output = destination.join(Extension::result_name(&name, plan.extension));
        if output == input {
            info!("{} already has the target extension", input.display());
            continue;
        }

        match transform_file(stream_tsf, &input, &output, plan) {
            Ok(()) => {
                info!("Wrote {}", output.display());
                report.produced.push(output);
            }
            Err(err) => {
                error!("Could not process {}: {}", input.display(), err.to_reason());
                report.failed_files.push((input, err.to_reason()));
            }
        }
    }

    Ok(())
}

fn transform_file(
    stream_tsf: &dyn MediaConverter,
    input: &Path,
    output: &Path,
    plan: Transform<'_>,
) -> Result<()> {
    if remove_existing(output)? {
        debug!("Replaced existing {}", output.display());
    }

    if plan.extension.is_none() {
        return move_file(input, output)
            .map_err(|err| err.wrap_err_with(|| format!("Could not move to {}", output.display())));
    }

    info!("Converting {} into {}", input.display(), output.display());
    let res = stream_tsf.convert(
        input,
        output,
        plan.input_options,
        plan.output_options,
    );

    if let Err(err) = res {
        // Do not leave a half-written result behind
        if let Err(rm_err) = remove_existing(output) {
            warn!("{}", rm_err.to_reason());
        }
        return Err(err.wrap_err_with(|| "Conversion failed"));
    }

    Ok(())
}
