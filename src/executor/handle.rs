use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::FutureExt as _;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::Result;
use crate::error::{CancelReason, Error};
use crate::transport::Response;

/// Pending result of one submission.
///
/// Await the handle to get the endpoint's response. Dropping it before it resolves
/// cancels the submission; if it was still waiting for a permit, no quota is used.
#[must_use = "dropping a submission handle cancels the submission"]
#[derive(Debug)]
pub struct SubmissionHandle {
    id: Uuid,
    receiver: oneshot::Receiver<Result<Response>>,
    cancel: CancellationToken,
    shutdown: CancellationToken,
    resolved: bool,
}

impl SubmissionHandle {
    pub(crate) fn pending(
        id: Uuid,
        receiver: oneshot::Receiver<Result<Response>>,
        cancel: CancellationToken,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            id,
            receiver,
            cancel,
            shutdown,
            resolved: false,
        }
    }

    /// A handle that is already resolved with `error`.
    pub(crate) fn failed(id: Uuid, error: Error) -> Self {
        let (sender, receiver) = oneshot::channel();
        // The receiver is held right here, so the send cannot fail.
        drop(sender.send(Err(error)));

        Self::pending(id, receiver, CancellationToken::new(), CancellationToken::new())
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Abandons the submission. Awaiting the handle afterwards yields
    /// [`Kind::Cancelled`](crate::error::Kind::Cancelled) unless a result was
    /// already delivered.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Future for SubmissionHandle {
    type Output = Result<Response>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let output = match self.receiver.poll_unpin(cx) {
            Poll::Ready(Ok(result)) => result,
            // The job was dropped unprocessed: the queue closed under it.
            Poll::Ready(Err(_recv)) => Err(Error::closed()),
            Poll::Pending if self.cancel.is_cancelled() => {
                let reason = if self.shutdown.is_cancelled() {
                    CancelReason::Shutdown
                } else {
                    CancelReason::Caller
                };
                Err(Error::cancelled(reason))
            }
            Poll::Pending => return Poll::Pending,
        };

        self.resolved = true;
        Poll::Ready(output)
    }
}

impl Drop for SubmissionHandle {
    fn drop(&mut self) {
        if !self.resolved {
            self.cancel.cancel();
        }
    }
}
