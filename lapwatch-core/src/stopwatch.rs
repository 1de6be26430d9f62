use crate::{ClockEngine, ClockState, LapLedger, LapRow, LedgerEvent, TickScheduler};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Action {
    Start,
    Lap,
    Stop,
    Reset,
    Resume,
}

impl Action {
    pub fn label(&self) -> &'static str {
        match self {
            Action::Start => "Start",
            Action::Lap => "Lap",
            Action::Stop => "Stop",
            Action::Reset => "Reset",
            Action::Resume => "Resume",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Button {
    pub action: Action,
    pub enabled: bool,
}

/// The two buttons offered for the current state.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Controls {
    pub left: Button,
    pub right: Button,
}

/// Clock engine and lap ledger moved together, one transition per action.
pub struct Stopwatch<S: TickScheduler> {
    clock: ClockEngine<S>,
    ledger: LapLedger,
}

impl<S: TickScheduler> Stopwatch<S> {
    pub fn new(scheduler: S, tick_ms: u64) -> Self {
        Self {
            clock: ClockEngine::new(scheduler, tick_ms),
            ledger: LapLedger::new(),
        }
    }

    pub fn state(&self) -> ClockState {
        self.clock.state()
    }

    pub fn clock(&self) -> &ClockEngine<S> {
        &self.clock
    }

    pub fn ledger(&self) -> &LapLedger {
        &self.ledger
    }

    pub fn start(&mut self, now_ms: u64) -> bool {
        if !self.clock.start(now_ms) {
            return self.ignored(Action::Start);
        }
        log::debug!("started at {}ms", now_ms);
        self.transition(LedgerEvent::Start);
        true
    }

    pub fn lap(&mut self, now_ms: u64) -> bool {
        let Some(committed) = self.clock.lap(now_ms) else {
            return self.ignored(Action::Lap);
        };
        log::debug!("lap {} closed after {}ms", self.ledger.len(), committed);
        self.transition(LedgerEvent::Lap { committed });
        true
    }

    pub fn stop(&mut self, now_ms: u64) -> bool {
        let Some(committed) = self.clock.stop(now_ms) else {
            return self.ignored(Action::Stop);
        };
        log::debug!("stopped at {}ms", now_ms);
        self.transition(LedgerEvent::Stop { committed });
        true
    }

    pub fn resume(&mut self, now_ms: u64) -> bool {
        if !self.clock.resume(now_ms) {
            return self.ignored(Action::Resume);
        }
        log::debug!("resumed at {}ms", now_ms);
        self.transition(LedgerEvent::Resume);
        true
    }

    pub fn reset(&mut self) -> bool {
        if !self.clock.reset() {
            return self.ignored(Action::Reset);
        }
        log::debug!("reset");
        self.transition(LedgerEvent::Reset);
        true
    }

    pub fn tick(&mut self, now_ms: u64) -> bool {
        self.clock.tick(now_ms)
    }

    pub fn dispatch(&mut self, action: Action, now_ms: u64) -> bool {
        match action {
            Action::Start => self.start(now_ms),
            Action::Lap => self.lap(now_ms),
            Action::Stop => self.stop(now_ms),
            Action::Reset => self.reset(),
            Action::Resume => self.resume(now_ms),
        }
    }

    /// Main readout: every committed lap plus live time since the boundary.
    pub fn total_elapsed_ms(&self) -> u64 {
        let live = if self.clock.is_running() { self.clock.elapsed_ms() } else { 0 };
        self.ledger.committed_ms() + live
    }

    pub fn laps(&self) -> Vec<LapRow> {
        self.ledger.rows(self.clock.elapsed_ms(), self.clock.is_running())
    }

    pub fn controls(&self) -> Controls {
        let (left, right) = match self.clock.state() {
            ClockState::Idle => ((Action::Lap, false), (Action::Start, true)),
            ClockState::Running => ((Action::Lap, true), (Action::Stop, true)),
            ClockState::Stopped => ((Action::Reset, true), (Action::Resume, true)),
        };
        Controls {
            left: Button { action: left.0, enabled: left.1 },
            right: Button { action: right.0, enabled: right.1 },
        }
    }

    fn transition(&mut self, event: LedgerEvent) {
        let ledger = std::mem::take(&mut self.ledger);
        self.ledger = ledger.apply(event);
    }

    fn ignored(&self, action: Action) -> bool {
        log::debug!("ignoring {:?} while {:?}", action, self.clock.state());
        false
    }
}
