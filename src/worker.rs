use std::{
    sync::Arc,
    thread::{self, JoinHandle},
    time::Duration,
};

use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender};
use tracing::{debug, error, info};

use crate::{
    cancel::CancelToken,
    job::{Conversion, Job},
    outside::{MediaConverter, MediaDownloader},
    pipeline::{run_conversion, run_job, JobReport},
    result::{err_msg, Result},
};

/// Work the worker can be given
#[derive(Debug)]
pub enum Task {
    Download(Job),
    Convert(Conversion),
}

impl From<Job> for Task {
    fn from(job: Job) -> Self {
        Task::Download(job)
    }
}

impl From<Conversion> for Task {
    fn from(conversion: Conversion) -> Self {
        Task::Convert(conversion)
    }
}

struct Submission {
    task: Task,
    cancel: CancelToken,
    done: Sender<Result<JobReport>>,
}

/// Background thread running the submitted tasks one after the other
pub struct Worker {
    input: Option<Sender<Submission>>,
    thread: Option<JoinHandle<()>>,
}

/// Pending result of a submitted task. Resolves exactly once.
///
/// Dropping the handle before it resolves cancels the task.
pub struct JobHandle {
    cancel: CancelToken,
    done: Receiver<Result<JobReport>>,
}

impl Worker {
    pub fn spawn(
        stream_dl: Arc<dyn MediaDownloader>,
        stream_tsf: Arc<dyn MediaConverter>,
    ) -> Result<Self> {
        let (input, receive_channel) = unbounded::<Submission>();

        let thread = thread::Builder::new()
            .name("worker".to_owned())
            .spawn(move || {
                debug!("Worker started, waiting for a job");

                for Submission { task, cancel, done } in receive_channel {
                    let res = match &task {
                        Task::Download(job) => {
                            info!("Starting job of {} URL(s)", job.urls.len());
                            run_job(job, stream_dl.as_ref(), stream_tsf.as_ref(), &cancel)
                        }
                        Task::Convert(conversion) => {
                            info!("Starting conversion in {}", conversion.directory.display());
                            run_conversion(conversion, stream_tsf.as_ref(), &cancel)
                        }
                    };

                    if done.send(res).is_err() {
                        debug!("Job handle dropped before the job completed");
                    }
                    debug!("Job completed. Waiting for next job");
                }

                debug!("All jobs completed. Stopping the worker.");
            })?;

        Ok(Self {
            input: Some(input),
            thread: Some(thread),
        })
    }

    /// Queue a task. It starts once the previous ones are done.
    pub fn submit(&self, task: impl Into<Task>) -> Result<JobHandle> {
        let cancel = CancelToken::new();
        let (done, receive) = bounded(1);

        self.input
            .as_ref()
            .ok_or_else(|| err_msg("Worker is stopped"))?
            .send(Submission {
                task: task.into(),
                cancel: cancel.clone(),
                done,
            })
            .map_err(|_| err_msg("Worker is not running anymore"))?;

        Ok(JobHandle {
            cancel,
            done: receive,
        })
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        // Closing the input lets the thread finish the queued jobs then stop
        drop(self.input.take());

        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                error!("Worker thread panicked");
            }
        }
    }
}

impl JobHandle {
    /// Ask the job to stop before its next download or file
    #[cfg(test)]
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Block until the job is done
    #[cfg(test)]
    pub fn wait(self) -> Result<JobReport> {
        self.done
            .recv()
            .map_err(|_| err_msg("Worker stopped before completing the job"))?
    }

    /// Wait for the job result for at most `timeout`.
    /// Return `None` if the job is still running.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Result<JobReport>> {
        match self.done.recv_timeout(timeout) {
            Ok(res) => Some(res),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                Some(Err(err_msg("Worker stopped before completing the job")))
            }
        }
    }
}

impl Drop for JobHandle {
    fn drop(&mut self) {
        // No-op once the task is done
        self.cancel.cancel();
    }
}
