//! Pure stopwatch logic with no platform dependencies.
//! Testable on host; the app supplies the time source and the tick pump.

use std::fmt;

mod ledger;
mod stopwatch;

pub use ledger::{LapExtremes, LapLedger, LapRow, LedgerEvent};
pub use stopwatch::{Action, Button, Controls, Stopwatch};

/// Display refresh period while the clock is running.
pub const DEFAULT_TICK_MS: u64 = 100;

/// Repeating-timer facility the clock engine arms while running.
///
/// Handles are owned exclusively by the [`ClockEngine`] that requested them
/// and are handed back through [`TickScheduler::cancel`] on every exit from
/// [`ClockState::Running`], including when the engine itself is dropped.
pub trait TickScheduler {
    type Handle;

    fn schedule_every(&mut self, period_ms: u64) -> Self::Handle;

    fn cancel(&mut self, handle: Self::Handle);
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ClockState {
    Idle,
    Running,
    Stopped,
}

/// Tracks the current lap boundary and the latest observed time.
///
/// Elapsed time here is always measured from the most recent boundary
/// (`start`, `lap` or `resume`). Time from closed intervals lives in the
/// [`LapLedger`], never in the clock.
pub struct ClockEngine<S: TickScheduler> {
    state: ClockState,
    start_epoch: u64,
    now_epoch: u64,
    period_ms: u64,
    scheduler: S,
    ticker: Option<S::Handle>,
}

impl<S: TickScheduler> ClockEngine<S> {
    pub fn new(scheduler: S, period_ms: u64) -> Self {
        Self {
            state: ClockState::Idle,
            start_epoch: 0,
            now_epoch: 0,
            period_ms: period_ms.max(1),
            scheduler,
            ticker: None,
        }
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == ClockState::Running
    }

    pub fn period_ms(&self) -> u64 {
        self.period_ms
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Time since the last boundary. Frozen while stopped, zero when idle.
    pub fn elapsed_ms(&self) -> u64 {
        self.now_epoch.saturating_sub(self.start_epoch)
    }

    pub fn start(&mut self, now_ms: u64) -> bool {
        if self.state != ClockState::Idle {
            return false;
        }
        self.start_epoch = now_ms;
        self.now_epoch = now_ms;
        self.arm();
        self.state = ClockState::Running;
        true
    }

    /// Advance the observed time. Ticks outside `Running` are stale and ignored.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        if self.state != ClockState::Running {
            return false;
        }
        // Never step backwards, even if the source does.
        self.now_epoch = self.now_epoch.max(now_ms);
        true
    }

    /// Close the current interval and open a new one at `now_ms`.
    /// Returns the committed elapsed-since-boundary amount.
    pub fn lap(&mut self, now_ms: u64) -> Option<u64> {
        if !self.tick(now_ms) {
            return None;
        }
        let committed = self.elapsed_ms();
        self.start_epoch = self.now_epoch;
        Some(committed)
    }

    pub fn stop(&mut self, now_ms: u64) -> Option<u64> {
        if !self.tick(now_ms) {
            return None;
        }
        self.disarm();
        self.state = ClockState::Stopped;
        Some(self.elapsed_ms())
    }

    pub fn resume(&mut self, now_ms: u64) -> bool {
        if self.state != ClockState::Stopped {
            return false;
        }
        self.start_epoch = now_ms;
        self.now_epoch = now_ms;
        self.arm();
        self.state = ClockState::Running;
        true
    }

    pub fn reset(&mut self) -> bool {
        if self.state != ClockState::Stopped {
            return false;
        }
        self.start_epoch = 0;
        self.now_epoch = 0;
        self.state = ClockState::Idle;
        true
    }

    fn arm(&mut self) {
        let handle = self.scheduler.schedule_every(self.period_ms);
        if let Some(stale) = self.ticker.replace(handle) {
            log::warn!("replacing a tick schedule that was never cancelled");
            self.scheduler.cancel(stale);
        }
    }

    fn disarm(&mut self) {
        if let Some(handle) = self.ticker.take() {
            self.scheduler.cancel(handle);
        }
    }
}

impl<S: TickScheduler> Drop for ClockEngine<S> {
    fn drop(&mut self) {
        self.disarm();
    }
}

/// A duration split into display fields, truncated rather than rounded.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Readout {
    pub minutes: u64,
    pub seconds: u64,
    pub centiseconds: u64,
}

impl Readout {
    pub fn from_ms(ms: u64) -> Self {
        Self {
            minutes: ms / 60_000,
            seconds: (ms / 1000) % 60,
            centiseconds: (ms % 1000) / 10,
        }
    }
}

impl fmt::Display for Readout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}.{:02}", self.minutes, self.seconds, self.centiseconds)
    }
}

/// Format milliseconds as "MM:SS.CC". Minutes do not wrap at the hour.
pub fn format_mm_ss_cs(ms: u64) -> String {
    Readout::from_ms(ms).to_string()
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use super::TickScheduler;

    #[derive(Default)]
    struct Counters {
        next_id: Cell<u64>,
        live: Cell<usize>,
        scheduled: Cell<usize>,
        cancelled: RefCell<Vec<u64>>,
        periods: RefCell<Vec<u64>>,
    }

    /// Scheduler that never fires; it only counts what was armed and cancelled.
    /// Clones share counters so a test can keep a probe after handing one off.
    #[derive(Clone, Default)]
    pub struct RecordingScheduler {
        counters: Rc<Counters>,
    }

    #[derive(Debug)]
    pub struct Ticket(pub u64);

    impl RecordingScheduler {
        pub fn live(&self) -> usize {
            self.counters.live.get()
        }

        pub fn scheduled(&self) -> usize {
            self.counters.scheduled.get()
        }

        pub fn cancelled(&self) -> Vec<u64> {
            self.counters.cancelled.borrow().clone()
        }

        pub fn periods(&self) -> Vec<u64> {
            self.counters.periods.borrow().clone()
        }
    }

    impl TickScheduler for RecordingScheduler {
        type Handle = Ticket;

        fn schedule_every(&mut self, period_ms: u64) -> Ticket {
            let c = &self.counters;
            c.next_id.set(c.next_id.get() + 1);
            c.live.set(c.live.get() + 1);
            c.scheduled.set(c.scheduled.get() + 1);
            c.periods.borrow_mut().push(period_ms);
            Ticket(c.next_id.get())
        }

        fn cancel(&mut self, handle: Ticket) {
            let c = &self.counters;
            c.live.set(c.live.get() - 1);
            c.cancelled.borrow_mut().push(handle.0);
        }
    }
}
