//! Public entry point: encode, rate-limit, sign and send documents.

mod config;

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use uuid::Uuid;

pub use config::{Config, ShutdownPolicy};

use crate::Result;
use crate::document::{self, Document};
use crate::error::Error;
use crate::executor::{SubmissionExecutor, SubmissionHandle};
use crate::limiter::RateLimiter;
use crate::sign::Sign;
use crate::transport::{HttpTransport, Transport};

/// Rate-limited client for the document submission endpoint.
///
/// Each client owns its own rate window, reset timer and workers; nothing is
/// shared between instances. Must be created inside a tokio runtime.
#[derive(Debug)]
pub struct DocumentClient {
    executor: SubmissionExecutor,
    shutdown_policy: ShutdownPolicy,
}

impl DocumentClient {
    /// Creates a client admitting `limit` requests per `interval` over HTTP.
    pub fn new(interval: Duration, limit: u32) -> Result<Self> {
        Self::with_config(Config::new(interval, limit))
    }

    pub fn with_config(config: Config) -> Result<Self> {
        Self::with_transport(config, HttpTransport::new()?)
    }

    pub fn with_transport<T: Transport + 'static>(config: Config, transport: T) -> Result<Self> {
        config.validate()?;

        let limiter = RateLimiter::new(config.interval, config.limit)?;
        let executor = SubmissionExecutor::start(limiter, Arc::new(transport), config.workers)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            limit = config.limit,
            interval = ?config.interval,
            workers = config.workers.get(),
            "document client started"
        );

        Ok(Self {
            executor,
            shutdown_policy: config.shutdown_policy,
        })
    }

    /// Encodes `document` and queues it for submission.
    ///
    /// Every failure, including a closed client, is reported through the handle.
    pub fn submit<S: Sign + 'static>(&self, document: &Document, sign: S) -> SubmissionHandle {
        self.enqueue(document, Box::new(sign), None)
    }

    /// Like [`DocumentClient::submit`], but gives up waiting for a permit at
    /// `deadline`; the handle then resolves to `Cancelled` without using quota.
    pub fn submit_with_deadline<S: Sign + 'static>(
        &self,
        document: &Document,
        sign: S,
        deadline: Instant,
    ) -> SubmissionHandle {
        self.enqueue(document, Box::new(sign), Some(deadline))
    }

    fn enqueue(
        &self,
        document: &Document,
        sign: Box<dyn Sign>,
        deadline: Option<Instant>,
    ) -> SubmissionHandle {
        if self.executor.is_closed() {
            return SubmissionHandle::failed(Uuid::now_v7(), Error::closed());
        }

        match document::encode(document) {
            Ok(payload) => self.executor.submit(payload, sign, deadline),
            Err(e) => SubmissionHandle::failed(Uuid::now_v7(), e),
        }
    }

    /// Stops accepting submissions. Later submits resolve to `ClientClosed`.
    ///
    /// Work already accepted is drained or cancelled according to the configured
    /// [`ShutdownPolicy`]. Calling this more than once has no further effect.
    pub fn shutdown(&self) {
        self.executor.shutdown(self.shutdown_policy);
    }

    /// Resolves once [`DocumentClient::shutdown`] was called and all workers exited.
    pub async fn closed(&self) {
        self.executor.closed().await;
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.executor.is_closed()
    }

    #[must_use]
    pub fn limiter(&self) -> &RateLimiter {
        self.executor.limiter()
    }
}
