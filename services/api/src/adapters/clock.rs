//! services/api/src/adapters/clock.rs
//!
//! The concrete implementation of the `Clock` port. This is the only place
//! the ambient system clock is read; everything downstream receives time
//! through the port so tests can pin it.

use chrono::{DateTime, FixedOffset, Local};
use page_tracker_core::ports::Clock;

/// A clock that reports the host's current local time and offset.
#[derive(Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}
