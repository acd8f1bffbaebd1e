mod cancel;
mod cli;
mod io;
mod job;
mod logging;
mod outside;
mod pipeline;
mod preferences;
mod result;
mod types;
mod worker;

use std::{
    path::Path,
    sync::Arc,
    time::{Duration, Instant},
};

use clap::Parser;
use miette::IntoDiagnostic;
use tracing::{debug, error, info, warn};

use crate::{
    cli::Args,
    logging::init_logging,
    outside::{Ffmpeg, Ytdl},
    pipeline::JobReport,
    preferences::Preferences,
    result::{err_msg, Result},
    worker::{Task, Worker},
};

/// Interval between two "still working" messages
const HEARTBEAT: Duration = Duration::from_secs(30);

fn main() -> miette::Result<()> {
    // Initialize the CLI & logging
    let args = Args::parse();
    init_logging(args.log_level)?;

    let prefs_path = if args.no_prefs {
        None
    } else {
        args.prefs.clone().or_else(Preferences::default_path)
    };
    let saved = prefs_path
        .as_deref()
        .map(Preferences::load)
        .unwrap_or_default();
    let prefs = saved.merge_args(&args);

    // Reject invalid values before running anything
    let task = prepare_task(&prefs, args.convert.as_deref())?;
    run_then_save(&prefs, prefs_path.as_deref(), || run_task(task))?;
    Ok(())
}

/// Run the task, then save the preferences whatever its outcome
fn run_then_save<F>(prefs: &Preferences, prefs_path: Option<&Path>, run: F) -> Result<()>
where
    F: FnOnce() -> Result<()>,
{
    let res = run();

    if let Some(path) = prefs_path {
        if let Err(err) = prefs.save(path) {
            error!("Could not save the preferences: {err:?}");
        }
    }

    res
}

/// Build and validate what to run
fn prepare_task(prefs: &Preferences, convert: Option<&str>) -> Result<Task> {
    match convert {
        Some(pattern) => {
            let conversion = prefs.to_conversion(pattern)?;
            conversion.check_directory()?;
            Ok(conversion.into())
        }
        None => {
            let job = prefs.to_job()?;
            job.check_destination()?;
            Ok(job.into())
        }
    }
}

fn run_task(task: Task) -> Result<()> {
    debug!("Task: {task:?}");

    let (download, convert) = match &task {
        Task::Download(job) if job.urls.is_empty() => {
            warn!("No URL given, nothing to do");
            return Ok(());
        }
        Task::Download(job) => {
            info!(
                "{} URL(s) to download into {}",
                job.urls.len(),
                job.destination.display()
            );
            (true, job.extension.is_some())
        }
        Task::Convert(conversion) => {
            info!(
                "Converting the files of {} to {}",
                conversion.directory.display(),
                conversion.extension
            );
            (false, true)
        }
    };

    let (stream_dl, stream_tsf) = load_external_components(download, convert)?;
    let worker = Worker::spawn(Arc::new(stream_dl), Arc::new(stream_tsf))?;
    let handle = worker.submit(task)?;

    info!("Working...");
    let started = Instant::now();
    let res = loop {
        match handle.wait_timeout(HEARTBEAT) {
            Some(res) => break res,
            None => info!("Still working ({}s)", started.elapsed().as_secs()),
        }
    };
    drop(worker);

    log_report(&res?);
    Ok(())
}

/// Load the external components.
///
/// Each program is only verified when it will be used.
fn load_external_components(download: bool, convert: bool) -> Result<(Ytdl, Ffmpeg)> {
    // Check the programs concurrently as executing an external program
    // is not instantaneous
    let ytdl_thread = std::thread::Builder::new()
        .name("check".to_owned())
        .spawn(move || if download { Ytdl::new() } else { Ok(Ytdl::unchecked()) })
        .into_diagnostic()?;

    let ffmpeg = if convert {
        Ffmpeg::new().map_err(|err| err.wrap_err_with(|| "ffmpeg is required to convert files"))?
    } else {
        Ffmpeg::default()
    };

    let ytdl = ytdl_thread
        .join()
        .map_err(|_| err_msg("Could not join thread"))??;

    Ok((ytdl, ffmpeg))
}

fn log_report(report: &JobReport) {
    if report.is_success() {
        info!("All done: {report}");
        return;
    }

    warn!("Done with {} failure(s): {report}", report.failure_count());
    for (url, reason) in &report.failed_urls {
        warn!("Download of {url} failed: {reason}");
    }
    for (file, reason) in &report.failed_files {
        warn!("Processing of {} failed: {reason}", file.display());
    }
}
