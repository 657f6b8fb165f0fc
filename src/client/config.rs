use std::num::NonZeroUsize;
use std::time::Duration;

use bon::Builder;
use strum_macros::Display;

use crate::Result;
use crate::error::Error;

/// What happens to queued and in-flight submissions on shutdown.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default, Display, Eq, PartialEq)]
pub enum ShutdownPolicy {
    /// Finish everything already accepted, then stop the rate limiter.
    #[default]
    Drain,
    /// Resolve everything still pending to `Cancelled` and stop at once.
    Cancel,
}

/// Client configuration.
///
/// `limit` requests are admitted per `interval`. One worker keeps responses in
/// submission order; more workers trade ordering for parallel sends.
#[derive(Builder, Clone, Copy, Debug)]
pub struct Config {
    pub interval: Duration,
    pub limit: u32,
    #[builder(default = NonZeroUsize::MIN)]
    pub workers: NonZeroUsize,
    #[builder(default)]
    pub shutdown_policy: ShutdownPolicy,
}

impl Config {
    #[must_use]
    pub fn new(interval: Duration, limit: u32) -> Self {
        Self::builder().interval(interval).limit(limit).build()
    }

    pub fn validate(&self) -> Result<()> {
        if self.limit == 0 {
            return Err(Error::validation("limit must be greater than zero"));
        }
        if self.interval.is_zero() {
            return Err(Error::validation("interval must be greater than zero"));
        }
        Ok(())
    }
}
