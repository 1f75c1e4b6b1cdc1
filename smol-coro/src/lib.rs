// smol-coro: minimal no_std cooperative routine scheduler.
// clock:    monotonic millisecond clock trait (platform supplies the impl)
// routine:  per-routine cadence state machine, run-to-completion workers
// registry: growable set of routine borrows, swept once per pass

#![no_std]

extern crate alloc;

pub mod clock;
pub mod registry;
pub mod routine;

pub use clock::{Clock, ManualClock, Millis};
pub use registry::Registry;
pub use routine::{Cadence, Control, Resumable, Routine, Worker};
