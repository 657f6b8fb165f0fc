//! Worker pool that pushes submissions through the rate limiter.
//!
//! Submissions are queued in FIFO order and drained by `workers` tasks. Each
//! worker handles one submission at a time: acquire a permit, sign, send. With a
//! single worker, results therefore complete in submission order; with more,
//! they may complete out of order.

mod handle;

use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use uuid::Uuid;

pub use handle::SubmissionHandle;

use crate::Result;
use crate::client::ShutdownPolicy;
use crate::error::{CancelReason, Error, Kind};
use crate::limiter::RateLimiter;
use crate::sign::Sign;
use crate::transport::{Response, SubmissionRequest, Transport};

struct Job {
    id: Uuid,
    payload: Vec<u8>,
    signer: Box<dyn Sign>,
    deadline: Option<Instant>,
    cancel: CancellationToken,
    reply: oneshot::Sender<Result<Response>>,
}

type Queue = Arc<Mutex<mpsc::UnboundedReceiver<Job>>>;

pub struct SubmissionExecutor {
    queue: mpsc::UnboundedSender<Job>,
    limiter: RateLimiter,
    closing: CancellationToken,
    shutdown: CancellationToken,
    workers: TaskTracker,
    runtime: Handle,
}

impl SubmissionExecutor {
    /// Spawns `workers` worker tasks on the current tokio runtime.
    pub fn start(
        limiter: RateLimiter,
        transport: Arc<dyn Transport>,
        workers: NonZeroUsize,
    ) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|e| Error::with_source(Kind::Internal, e))?;
        let (sender, receiver) = mpsc::unbounded_channel();
        let receiver: Queue = Arc::new(Mutex::new(receiver));
        let closing = CancellationToken::new();
        let shutdown = CancellationToken::new();
        let tracker = TaskTracker::new();

        let worker = Arc::new(Worker {
            limiter: limiter.clone(),
            transport,
            shutdown: shutdown.clone(),
        });
        for index in 0..workers.get() {
            tracker.spawn_on(
                run_worker(
                    index,
                    Arc::clone(&worker),
                    Arc::clone(&receiver),
                    closing.clone(),
                ),
                &runtime,
            );
        }

        Ok(Self {
            queue: sender,
            limiter,
            closing,
            shutdown,
            workers: tracker,
            runtime,
        })
    }

    /// Queues an encoded document for signing and sending.
    ///
    /// `deadline` bounds how long the submission may wait for a permit.
    pub fn submit(
        &self,
        payload: Vec<u8>,
        signer: Box<dyn Sign>,
        deadline: Option<Instant>,
    ) -> SubmissionHandle {
        let id = Uuid::now_v7();
        if self.is_closed() {
            return SubmissionHandle::failed(id, Error::closed());
        }

        let (reply, receiver) = oneshot::channel();
        let cancel = self.shutdown.child_token();
        let handle = SubmissionHandle::pending(id, receiver, cancel.clone(), self.shutdown.clone());

        let job = Job {
            id,
            payload,
            signer,
            deadline,
            cancel,
            reply,
        };
        // A send racing with shutdown drops the job; its handle then resolves
        // to `ClientClosed`.
        if self.queue.send(job).is_ok() {
            #[cfg(feature = "tracing")]
            tracing::debug!(submission_id = %id, "submission queued");
        }

        handle
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closing.is_cancelled()
    }

    #[must_use]
    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Stops accepting submissions and winds the workers down per `policy`.
    ///
    /// With [`ShutdownPolicy::Drain`] queued work still completes and the
    /// limiter stops once the last worker exits. With [`ShutdownPolicy::Cancel`]
    /// every pending submission resolves to `Cancelled` and the limiter stops
    /// immediately.
    pub fn shutdown(&self, policy: ShutdownPolicy) {
        if self.closing.is_cancelled() {
            return;
        }
        #[cfg(feature = "tracing")]
        tracing::info!(%policy, "shutting down submission executor");

        self.closing.cancel();
        self.workers.close();

        match policy {
            ShutdownPolicy::Cancel => {
                self.shutdown.cancel();
                self.limiter.stop();
            }
            ShutdownPolicy::Drain => {
                let workers = self.workers.clone();
                let limiter = self.limiter.clone();
                self.runtime.spawn(async move {
                    workers.wait().await;
                    limiter.stop();
                });
            }
        }
    }

    /// Resolves once shutdown was requested and every worker has exited.
    pub async fn closed(&self) {
        self.closing.cancelled().await;
        self.workers.wait().await;
    }
}

impl fmt::Debug for SubmissionExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubmissionExecutor")
            .field("limiter", &self.limiter)
            .field("closed", &self.is_closed())
            .field("workers", &self.workers.len())
            .finish_non_exhaustive()
    }
}

struct Worker {
    limiter: RateLimiter,
    transport: Arc<dyn Transport>,
    shutdown: CancellationToken,
}

impl Worker {
    async fn process(&self, job: Job) {
        let Job {
            id,
            payload,
            signer,
            deadline,
            cancel,
            reply,
        } = job;

        #[cfg(feature = "tracing")]
        tracing::debug!(submission_id = %id, "submission started");

        let result = self
            .execute(id, payload, signer.as_ref(), deadline, &cancel)
            .await;

        #[cfg(feature = "tracing")]
        match &result {
            Ok(response) => {
                tracing::debug!(submission_id = %id, status = %response.status, "submission completed");
            }
            Err(e) => tracing::debug!(submission_id = %id, error = %e, "submission failed"),
        }

        if reply.send(result).is_err() {
            #[cfg(feature = "tracing")]
            tracing::trace!(submission_id = %id, "submission handle dropped before result");
        }
    }

    async fn execute(
        &self,
        id: Uuid,
        payload: Vec<u8>,
        signer: &dyn Sign,
        deadline: Option<Instant>,
        cancel: &CancellationToken,
    ) -> Result<Response> {
        if cancel.is_cancelled() {
            return Err(self.cancelled());
        }

        let acquire = async {
            match deadline {
                Some(deadline) => self.limiter.acquire_until(deadline).await,
                None => self.limiter.acquire().await,
            }
        };
        #[cfg_attr(
            not(feature = "tracing"),
            expect(unused_variables, reason = "only read for logging")
        )]
        let permit = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(self.cancelled()),
            permit = acquire => permit?,
        };

        #[cfg(feature = "tracing")]
        tracing::trace!(
            submission_id = %id,
            window = permit.window(),
            sequence = permit.sequence(),
            "permit acquired"
        );

        let body = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(self.cancelled()),
            signed = signer.sign(&payload) => signed.map_err(Error::signing)?,
        };

        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(self.cancelled()),
            response = self.transport.send(SubmissionRequest::new(id, body)) => response,
        }
    }

    fn cancelled(&self) -> Error {
        let reason = if self.shutdown.is_cancelled() {
            CancelReason::Shutdown
        } else {
            CancelReason::Caller
        };
        Error::cancelled(reason)
    }
}

async fn run_worker(
    #[cfg_attr(
        not(feature = "tracing"),
        expect(unused_variables, reason = "only read for logging")
    )]
    index: usize,
    worker: Arc<Worker>,
    queue: Queue,
    closing: CancellationToken,
) {
    #[cfg(feature = "tracing")]
    tracing::debug!(worker = index, "submission worker started");

    loop {
        let job = {
            let mut receiver = queue.lock().await;
            tokio::select! {
                biased;
                job = receiver.recv() => job,
                () = closing.cancelled() => {
                    // Refuse new sends but keep draining what is buffered.
                    receiver.close();
                    receiver.recv().await
                }
            }
        };

        let Some(job) = job else {
            break;
        };
        worker.process(job).await;
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(worker = index, "submission worker exited");
}
