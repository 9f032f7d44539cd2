//! The clock seam.
//!
//! Every time-dependent rule takes "now" from a [`Clock`] so tests can swap in
//! a deterministic implementation.

use crate::Timestamp;

/// A source of the current time.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// The wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}
