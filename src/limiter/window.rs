use std::sync::atomic::{AtomicU64, Ordering};

const ISSUED_BITS: u32 = 32;
const ISSUED_MASK: u64 = (1 << ISSUED_BITS) - 1;

/// Fixed-window admission counter.
///
/// The window index and the issued count share one atomic word, so a permit
/// claim and a reset can never interleave: every claim lands in exactly one
/// window and every reset zeroes exactly the count it replaced.
#[derive(Debug)]
pub(crate) struct FixedWindow {
    limit: u32,
    state: AtomicU64,
}

impl FixedWindow {
    pub(crate) fn new(limit: u32) -> Self {
        Self {
            limit,
            state: AtomicU64::new(0),
        }
    }

    pub(crate) fn limit(&self) -> u32 {
        self.limit
    }

    /// Claims one slot in the current window.
    ///
    /// Returns the window index and the 1-based position of the claim, or `None`
    /// once `limit` slots were handed out.
    pub(crate) fn try_issue(&self) -> Option<(u32, u32)> {
        self.state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |state| {
                let (window, issued) = unpack(state);
                (issued < self.limit).then(|| pack(window, issued + 1))
            })
            .ok()
            .map(|previous| {
                let (window, issued) = unpack(previous);
                (window, issued + 1)
            })
    }

    /// Opens the next window. Returns the new window index and the count the
    /// closed window ended with.
    pub(crate) fn reset(&self) -> (u32, u32) {
        let mut current = self.state.load(Ordering::Acquire);
        loop {
            let (window, issued) = unpack(current);
            let next = window.wrapping_add(1);
            match self.state.compare_exchange_weak(
                current,
                pack(next, 0),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return (next, issued),
                Err(actual) => current = actual,
            }
        }
    }

    pub(crate) fn snapshot(&self) -> (u32, u32) {
        unpack(self.state.load(Ordering::Acquire))
    }
}

fn pack(window: u32, issued: u32) -> u64 {
    (u64::from(window) << ISSUED_BITS) | u64::from(issued)
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "both halves are masked to 32 bits before the cast"
)]
fn unpack(state: u64) -> (u32, u32) {
    ((state >> ISSUED_BITS) as u32, (state & ISSUED_MASK) as u32)
}
