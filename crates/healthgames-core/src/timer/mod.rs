//! Clock and timer primitives shared by every game machine.
//!
//! Nothing here spawns threads. Machines hold [`Interval`]s and
//! [`Scheduled`] transitions and the caller drives them by polling with the
//! current time from a [`Clock`].

mod clock;
mod interval;

pub use clock::{now_ms, Clock, ManualClock, SystemClock};
pub use interval::{Interval, Scheduled};
