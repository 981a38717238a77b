//! Post-send tag pipeline
//!
//! `send_message` hands a [`TagJob`] to a bounded queue and returns. A single
//! [`TagWorker`] drains the queue, giving every job its own context with a
//! per-job timeout. Nothing here can fail a send.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::ports::{TagJob, TagProcessor};
use crate::request_context::{CancellationToken, RequestContext};

/// Build a connected queue/worker pair
pub fn tag_pipeline(
    processor: Arc<dyn TagProcessor>,
    capacity: usize,
    job_timeout: Duration,
) -> (TagQueue, TagWorker) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let worker = TagWorker {
        rx,
        processor,
        job_timeout,
        shutdown: CancellationToken::new(),
    };
    (TagQueue { tx }, worker)
}

/// Producer side, cloned into the service context
#[derive(Debug, Clone)]
pub struct TagQueue {
    tx: mpsc::Sender<TagJob>,
}

impl TagQueue {
    /// Enqueue without waiting. Returns `false` when the job was dropped.
    pub fn enqueue(&self, job: TagJob) -> bool {
        match self.tx.try_send(job) {
            Ok(()) => true,
            Err(TrySendError::Full(job)) => {
                warn!(message_id = %job.message_id, "Tag queue full, dropping job");
                false
            }
            Err(TrySendError::Closed(job)) => {
                warn!(message_id = %job.message_id, "Tag worker stopped, dropping job");
                false
            }
        }
    }
}

/// Consumer side; owns the processor
pub struct TagWorker {
    rx: mpsc::Receiver<TagJob>,
    processor: Arc<dyn TagProcessor>,
    job_timeout: Duration,
    shutdown: CancellationToken,
}

impl TagWorker {
    /// Cancel this token to stop the worker after its current job
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Drain the queue until shutdown or until every producer is dropped
    pub async fn run(mut self) {
        info!("Tag worker started");
        loop {
            let next = tokio::select! {
                biased;
                () = self.shutdown.cancelled() => None,
                job = self.rx.recv() => job,
            };
            let Some(job) = next else { break };
            self.handle(job).await;
        }
        info!("Tag worker stopped");
    }

    #[instrument(skip(self, job), fields(message_id = %job.message_id))]
    async fn handle(&self, job: TagJob) {
        let cx = RequestContext::background().with_timeout(self.job_timeout);
        match cx.run(self.processor.process(&cx, &job)).await {
            Ok(Ok(())) => debug!("Tag job processed"),
            Ok(Err(e)) => warn!(error = %e, "Tag job failed"),
            Err(e) => warn!(error = %e, "Tag job aborted"),
        }
    }
}

impl std::fmt::Debug for TagWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TagWorker")
            .field("job_timeout", &self.job_timeout)
            .field("processor", &"...")
            .finish()
    }
}
