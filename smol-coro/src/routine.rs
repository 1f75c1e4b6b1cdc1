// Cooperative routine: a user worker plus cadence bookkeeping.
//
// resume() is a pure check-and-run step, never a wait. The driving loop
// calls it as often as it likes; the worker only fires once the due
// time has passed, runs to completion, and reports when it next wants
// to run (or that it should go dormant). There is no saved
// continuation: a suspended routine restarts from its worker's own
// state when awakened.
//
// All state sits behind shared borrows (Cell/RefCell) so the registry
// and the embedding application can each hold a handle to the same
// routine. Single control thread only; Routine is !Sync by
// construction.

use core::cell::{Cell, RefCell};

use crate::clock::{Clock, Millis};

/// What a worker wants the scheduler to do after a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Run again after this many milliseconds. 0 means as soon as
    /// possible, i.e. on the very next sweep.
    AgainIn(u32),
    /// Do not run again until someone calls [`Routine::awake`].
    Suspend,
}

/// How the next due time is derived after a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cadence {
    /// Accumulate from the previous due time. A worker asking for
    /// 100ms every run fires at t=100, 200, 300... even when an
    /// individual sweep dispatches it late, so the long-run average
    /// period stays exact. An overloaded loop falls behind real time
    /// instead of stretching the period.
    #[default]
    FromSchedule,
    /// Count from the moment the worker returned. The worker's own run
    /// time lands inside the delay, so the period stretches with load
    /// and never backs up.
    FromCompletion,
}

/// A unit of periodic work. The single extension point of this crate.
///
/// `work` is invoked with no arguments once the routine is due, runs to
/// completion, and must not touch the routine or registry driving it
/// (the interior `RefCell` turns such reentrancy into a panic). Put any
/// per-task state in the implementing type.
///
/// The scheduler assumes workers return. One that blocks forever stalls
/// every other routine; there is no watchdog here.
pub trait Worker {
    fn work(&mut self) -> Control;
}

/// Object-safe view of a routine, the seam the registry sweeps through.
pub trait Resumable {
    /// One scheduling step against the sweep's shared clock sample.
    fn resume_at(&self, now: Millis, clock: &dyn Clock);

    fn is_suspended(&self) -> bool;
}

/// A worker with its scheduling state: suspended flag, next due time,
/// cadence. Owned by the embedding application (typically a static);
/// the registry only ever borrows it.
pub struct Routine<W> {
    worker: RefCell<W>,
    cadence: Cadence,
    suspended: Cell<bool>,
    // None means "never run yet": the next resume fires immediately
    // and seeds the schedule from that moment.
    due: Cell<Option<Millis>>,
}

impl<W: Worker> Routine<W> {
    /// Schedule-relative routine ([`Cadence::FromSchedule`]).
    pub const fn new(worker: W) -> Self {
        Self::with_cadence(worker, Cadence::FromSchedule)
    }

    pub const fn with_cadence(worker: W, cadence: Cadence) -> Self {
        Self {
            worker: RefCell::new(worker),
            cadence,
            suspended: Cell::new(false),
            due: Cell::new(None),
        }
    }

    /// Give the routine a time slot. Runs the worker if it is due,
    /// otherwise returns immediately. Samples the clock once up front;
    /// a [`Cadence::FromCompletion`] routine samples it a second time
    /// after the worker returns.
    pub fn resume(&self, clock: &dyn Clock) {
        self.resume_at(clock.now(), clock);
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended.get()
    }

    /// Wake a suspended routine. The next resume runs the worker
    /// immediately, regardless of the clock, and the schedule re-seeds
    /// from that run. No-op when not suspended.
    pub fn awake(&self) {
        if self.suspended.get() {
            self.suspended.set(false);
            self.due.set(None);
        }
    }

    /// Suspend unconditionally, whether or not the worker ever ran.
    /// The stale due time is irrelevant while suspended; `awake`
    /// resets it.
    pub fn suspend(&self) {
        self.suspended.set(true);
    }

    /// Next due time, or None while the routine has never run.
    pub fn scheduled_at(&self) -> Option<Millis> {
        self.due.get()
    }
}

impl<W: Worker> Resumable for Routine<W> {
    fn resume_at(&self, now: Millis, clock: &dyn Clock) {
        if self.suspended.get() {
            return;
        }
        if let Some(due) = self.due.get() {
            if now < due {
                return;
            }
        }

        match self.worker.borrow_mut().work() {
            Control::Suspend => self.suspended.set(true),
            Control::AgainIn(ms) => {
                let ms = Millis::from(ms);
                let next = match self.cadence {
                    Cadence::FromCompletion => clock.now().saturating_add(ms),
                    Cadence::FromSchedule => match self.due.get() {
                        // First run: seed from the sweep's sample.
                        None => now.saturating_add(ms),
                        Some(due) => due.saturating_add(ms),
                    },
                };
                self.due.set(Some(next));
            }
        }
    }

    fn is_suspended(&self) -> bool {
        self.suspended.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    // Worker returning a fixed delay, counting its runs through a
    // shared cell so the test can observe without peeking at state.
    struct Every<'a> {
        delay: u32,
        runs: &'a Cell<u32>,
    }

    impl Worker for Every<'_> {
        fn work(&mut self) -> Control {
            self.runs.set(self.runs.get() + 1);
            Control::AgainIn(self.delay)
        }
    }

    // Worker that burns simulated time before returning.
    struct Busy<'a> {
        clock: &'a ManualClock,
        busy_ms: u64,
        delay: u32,
        runs: &'a Cell<u32>,
    }

    impl Worker for Busy<'_> {
        fn work(&mut self) -> Control {
            self.clock.advance(self.busy_ms);
            self.runs.set(self.runs.get() + 1);
            Control::AgainIn(self.delay)
        }
    }

    struct SuspendNow<'a> {
        runs: &'a Cell<u32>,
    }

    impl Worker for SuspendNow<'_> {
        fn work(&mut self) -> Control {
            self.runs.set(self.runs.get() + 1);
            Control::Suspend
        }
    }

    #[test]
    fn first_resume_runs_immediately() {
        let clock = ManualClock::new();
        clock.set(1234);
        let runs = Cell::new(0);
        let r = Routine::new(Every {
            delay: 100,
            runs: &runs,
        });

        r.resume(&clock);
        assert_eq!(runs.get(), 1);
        assert_eq!(r.scheduled_at(), Some(1334));

        // Same instant again: not due.
        r.resume(&clock);
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn schedule_cadence_accumulates_despite_jitter() {
        let clock = ManualClock::new();
        let runs = Cell::new(0);
        let r = Routine::new(Every {
            delay: 100,
            runs: &runs,
        });

        r.resume(&clock); // t=0: first run
        assert_eq!(runs.get(), 1);

        clock.set(50);
        r.resume(&clock); // not due
        assert_eq!(runs.get(), 1);

        clock.set(100);
        r.resume(&clock); // on time
        assert_eq!(runs.get(), 2);

        clock.set(250);
        r.resume(&clock); // 150ms late
        assert_eq!(runs.get(), 3);
        // Next due accumulates from the schedule, not from the late
        // dispatch: 300, not 350.
        assert_eq!(r.scheduled_at(), Some(300));

        clock.set(299);
        r.resume(&clock);
        assert_eq!(runs.get(), 3);

        clock.set(300);
        r.resume(&clock);
        assert_eq!(runs.get(), 4);
    }

    #[test]
    fn schedule_cadence_seeds_from_first_run() {
        let clock = ManualClock::new();
        clock.set(500);
        let runs = Cell::new(0);
        let r = Routine::new(Every {
            delay: 100,
            runs: &runs,
        });

        r.resume(&clock);
        assert_eq!(r.scheduled_at(), Some(600));
    }

    #[test]
    fn completion_cadence_counts_from_worker_exit() {
        let clock = ManualClock::new();
        let runs = Cell::new(0);
        let r = Routine::with_cadence(
            Busy {
                clock: &clock,
                busy_ms: 30,
                delay: 100,
                runs: &runs,
            },
            Cadence::FromCompletion,
        );

        r.resume(&clock); // runs at t=0, returns at t=30
        assert_eq!(runs.get(), 1);
        assert_eq!(r.scheduled_at(), Some(130));

        clock.set(100);
        r.resume(&clock);
        assert_eq!(runs.get(), 1);

        clock.set(130);
        r.resume(&clock); // returns at t=160, due 260
        assert_eq!(runs.get(), 2);
        assert_eq!(r.scheduled_at(), Some(260));
    }

    #[test]
    fn zero_delay_runs_every_sweep() {
        let clock = ManualClock::new();
        clock.set(5);
        let runs = Cell::new(0);
        let r = Routine::new(Every {
            delay: 0,
            runs: &runs,
        });

        r.resume(&clock);
        r.resume(&clock);
        r.resume(&clock);
        assert_eq!(runs.get(), 3);
    }

    #[test]
    fn suspend_blocks_until_awake() {
        let clock = ManualClock::new();
        let runs = Cell::new(0);
        let r = Routine::new(Every {
            delay: 100,
            runs: &runs,
        });

        r.suspend();
        clock.set(10_000);
        r.resume(&clock);
        assert_eq!(runs.get(), 0);
        assert!(r.is_suspended());

        r.awake();
        assert!(!r.is_suspended());
        r.resume(&clock);
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn awake_forces_immediate_next_run() {
        let clock = ManualClock::new();
        let runs = Cell::new(0);
        let r = Routine::new(Every {
            delay: 1000,
            runs: &runs,
        });

        r.resume(&clock); // due 1000
        assert_eq!(runs.get(), 1);

        r.suspend();
        r.awake();

        // Clock has not moved; the stale due time must not hold the
        // routine back after a wake.
        r.resume(&clock);
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn awake_is_a_noop_while_running() {
        let clock = ManualClock::new();
        let runs = Cell::new(0);
        let r = Routine::new(Every {
            delay: 100,
            runs: &runs,
        });

        r.resume(&clock); // due 100
        r.awake(); // not suspended: must not reset the schedule
        r.resume(&clock);
        assert_eq!(runs.get(), 1);
        assert_eq!(r.scheduled_at(), Some(100));
    }

    #[test]
    fn worker_can_suspend_itself() {
        let clock = ManualClock::new();
        let runs = Cell::new(0);
        let r = Routine::new(SuspendNow { runs: &runs });

        r.resume(&clock);
        assert_eq!(runs.get(), 1);
        assert!(r.is_suspended());

        clock.set(9999);
        r.resume(&clock);
        assert_eq!(runs.get(), 1);
    }
}
