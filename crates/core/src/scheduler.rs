//! Fire-and-forget job queue: a fixed worker pool over an unbounded
//! channel. Submission never blocks the caller; each job runs in its
//! own task so a panic or error stays contained to that job.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

struct Job {
    label: String,
    fut: Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>,
}

pub struct TaskScheduler {
    tx: mpsc::UnboundedSender<Job>,
    workers: Vec<JoinHandle<()>>,
}

impl TaskScheduler {
    pub fn start(workers: usize) -> Self {
        let (tx, rx) = mpsc::unbounded_channel::<Job>();
        let rx = Arc::new(Mutex::new(rx));
        let handles = (0..workers.max(1))
            .map(|worker| {
                let rx = Arc::clone(&rx);
                tokio::spawn(async move {
                    loop {
                        let job = { rx.lock().await.recv().await };
                        let Some(job) = job else { break };
                        debug!(worker, job = %job.label, "job started");
                        // Own task per job: a panic kills the job, not the worker.
                        match tokio::spawn(job.fut).await {
                            Ok(Ok(())) => debug!(job = %job.label, "job finished"),
                            Ok(Err(e)) => warn!(job = %job.label, "job failed: {e:#}"),
                            Err(e) => warn!(job = %job.label, "job panicked: {e}"),
                        }
                    }
                })
            })
            .collect();
        Self {
            tx,
            workers: handles,
        }
    }

    /// Enqueues a job and returns immediately. No ordering guarantee
    /// between jobs, no retry: a failed job logs and terminates.
    pub fn submit<F>(&self, label: impl Into<String>, fut: F)
    where
        F: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let job = Job {
            label: label.into(),
            fut: Box::pin(fut),
        };
        if self.tx.send(job).is_err() {
            warn!("scheduler queue closed, dropping job");
        }
    }

    /// Closes the queue and waits until every submitted job has run.
    pub async fn join(self) {
        drop(self.tx);
        for handle in self.workers {
            let _ = handle.await;
        }
    }
}
