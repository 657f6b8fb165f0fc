//! Fixed-window rate limiter.
//!
//! At most `limit` permits are issued per window. A background task opens a new
//! window every `interval`, whether or not anyone is waiting, and that reset is
//! the only event that releases blocked callers. There is no carry-over between
//! windows: a full burst of `limit` permits is available right after each reset.

mod window;

use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::Notify;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::Result;
use crate::error::{CancelReason, Error, Kind};
use crate::limiter::window::FixedWindow;

/// The right to issue one request within a window.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Permit {
    window: u32,
    sequence: u32,
}

impl Permit {
    /// Index of the window the permit was issued in. Wraps at `u32::MAX`.
    #[must_use]
    pub fn window(&self) -> u32 {
        self.window
    }

    /// 1-based position of the permit within its window.
    #[must_use]
    pub fn sequence(&self) -> u32 {
        self.sequence
    }
}

#[derive(Debug)]
struct Shared {
    window: FixedWindow,
    interval: Duration,
    reset: Notify,
    stop: CancellationToken,
}

#[derive(Clone, Debug)]
pub struct RateLimiter {
    shared: Arc<Shared>,
}

impl RateLimiter {
    /// Creates a limiter and starts its reset timer on the current tokio runtime.
    ///
    /// The first window closes one `interval` after construction.
    pub fn new(interval: Duration, limit: u32) -> Result<Self> {
        if limit == 0 {
            return Err(Error::validation("rate limit must be greater than zero"));
        }
        if interval.is_zero() {
            return Err(Error::validation("rate interval must be greater than zero"));
        }
        let runtime = Handle::try_current().map_err(|e| Error::with_source(Kind::Internal, e))?;

        let shared = Arc::new(Shared {
            window: FixedWindow::new(limit),
            interval,
            reset: Notify::new(),
            stop: CancellationToken::new(),
        });
        let first_reset = Instant::now() + interval;
        runtime.spawn(run_resets(
            Arc::downgrade(&shared),
            shared.stop.clone(),
            first_reset,
            interval,
        ));

        Ok(Self { shared })
    }

    #[must_use]
    pub fn limit(&self) -> u32 {
        self.shared.window.limit()
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.shared.interval
    }

    /// Permits issued in the current window.
    #[must_use]
    pub fn issued(&self) -> u32 {
        self.shared.window.snapshot().1
    }

    /// Index of the current window; increments on every reset.
    #[must_use]
    pub fn window(&self) -> u32 {
        self.shared.window.snapshot().0
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.shared.stop.is_cancelled()
    }

    /// Issues a permit if the current window still has room.
    pub fn try_acquire(&self) -> Option<Permit> {
        if self.is_stopped() {
            return None;
        }

        let (window, sequence) = self.shared.window.try_issue()?;
        #[cfg(feature = "tracing")]
        tracing::trace!(window, issued = sequence, limit = self.limit(), "permit issued");

        Some(Permit { window, sequence })
    }

    /// Waits until the current window has room, then issues a permit.
    ///
    /// Dropping the returned future before it completes issues nothing. Fails with
    /// [`Kind::Cancelled`] only once the limiter has been stopped.
    pub async fn acquire(&self) -> Result<Permit> {
        let shared = &*self.shared;
        loop {
            // Register for the next reset before checking, so a reset that lands
            // between the check and the wait still wakes us.
            let notified = shared.reset.notified();
            let mut notified = std::pin::pin!(notified);
            notified.as_mut().enable();

            if shared.stop.is_cancelled() {
                return Err(Error::cancelled(CancelReason::Shutdown));
            }
            if let Some(permit) = self.try_acquire() {
                return Ok(permit);
            }

            tokio::select! {
                () = shared.stop.cancelled() => {
                    return Err(Error::cancelled(CancelReason::Shutdown));
                }
                () = notified => {}
            }
        }
    }

    /// Like [`RateLimiter::acquire`], giving up at `deadline`.
    ///
    /// A missed deadline fails with [`Kind::Cancelled`] and issues nothing.
    pub async fn acquire_until(&self, deadline: Instant) -> Result<Permit> {
        match time::timeout_at(deadline, self.acquire()).await {
            Ok(permit) => permit,
            Err(_elapsed) => Err(Error::cancelled(CancelReason::Deadline)),
        }
    }

    /// Stops the reset timer and fails every pending and future `acquire`.
    pub fn stop(&self) {
        if !self.shared.stop.is_cancelled() {
            #[cfg(feature = "tracing")]
            tracing::debug!(window = self.window(), "stopping rate limiter");
            self.shared.stop.cancel();
        }
    }
}

async fn run_resets(
    weak: Weak<Shared>,
    stop: CancellationToken,
    first_reset: Instant,
    interval: Duration,
) {
    let mut ticker = time::interval_at(first_reset, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = stop.cancelled() => break,
            _ = ticker.tick() => {}
        }

        // Every limiter handle is gone, nobody can wait on this window anymore.
        let Some(shared) = weak.upgrade() else {
            break;
        };

        #[cfg_attr(
            not(feature = "tracing"),
            expect(unused_variables, reason = "only read for logging")
        )]
        let (window, closed_with) = shared.window.reset();
        #[cfg(feature = "tracing")]
        tracing::debug!(window, previous_issued = closed_with, "rate window reset");

        shared.reset.notify_waiters();
    }
}
