use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use flume::{Receiver, RecvTimeoutError, Sender};
use lapwatch_core::TickScheduler;

use crate::error::AppError;
use crate::AppMsg;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PumpOp {
    Start { generation: u64, interval_ms: u64 },
    Stop { generation: u64 },
    Quit,
}

/// Owns the tick thread. Ticks reach the event loop as [`AppMsg::Pump`].
pub struct Pump {
    ctl: Sender<PumpOp>,
    thread: Option<JoinHandle<()>>,
}

impl Pump {
    pub fn spawn(main_conn: Sender<AppMsg>) -> Result<Self, AppError> {
        let (ctl, ops) = flume::unbounded();
        let thread = thread::Builder::new()
            .name("pump".into())
            .spawn(move || pump_thread(ops, main_conn))
            .map_err(|source| AppError::Spawn { name: "pump", source })?;
        Ok(Self {
            ctl,
            thread: Some(thread),
        })
    }

    pub fn scheduler(&self) -> PumpScheduler {
        PumpScheduler {
            ctl: self.ctl.clone(),
            generation: 0,
        }
    }

    pub fn shutdown(mut self) {
        self.quit();
    }

    fn quit(&mut self) {
        if let Some(thread) = self.thread.take() {
            self.ctl.send(PumpOp::Quit).ok();
            if thread.join().is_err() {
                log::error!("pump thread panicked");
            }
        }
    }
}

impl Drop for Pump {
    fn drop(&mut self) {
        self.quit();
    }
}

/// Tick schedule on the pump thread. Only the newest schedule is live; a
/// cancel carrying an older generation is dropped by the pump.
pub struct PumpScheduler {
    ctl: Sender<PumpOp>,
    generation: u64,
}

#[derive(Debug)]
pub struct PumpTicket {
    generation: u64,
}

impl TickScheduler for PumpScheduler {
    type Handle = PumpTicket;

    fn schedule_every(&mut self, period_ms: u64) -> PumpTicket {
        self.generation += 1;
        let op = PumpOp::Start {
            generation: self.generation,
            interval_ms: period_ms,
        };
        if self.ctl.send(op).is_err() {
            log::warn!("pump is gone; display will not refresh");
        }
        PumpTicket {
            generation: self.generation,
        }
    }

    fn cancel(&mut self, handle: PumpTicket) {
        self.ctl
            .send(PumpOp::Stop {
                generation: handle.generation,
            })
            .ok();
    }
}

fn pump_thread(ops: Receiver<PumpOp>, main_conn: Sender<AppMsg>) {
    let mut active: Option<(u64, Duration)> = None;
    let mut next_at = Instant::now();

    loop {
        // Block while idle, otherwise wait for control messages until the next tick is due.
        let op = match active {
            Some((_, period)) => match ops.recv_deadline(next_at) {
                Ok(op) => op,
                Err(RecvTimeoutError::Timeout) => {
                    if main_conn.send(AppMsg::Pump).is_err() {
                        break;
                    }
                    next_at += period;
                    // after a suspend, take one late tick rather than a burst
                    let now = Instant::now();
                    if next_at < now {
                        next_at = now + period;
                    }
                    continue;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            },
            None => match ops.recv() {
                Ok(op) => op,
                Err(_) => break,
            },
        };

        match op {
            PumpOp::Start {
                generation,
                interval_ms,
            } => {
                let period = Duration::from_millis(interval_ms.max(1));
                active = Some((generation, period));
                next_at = Instant::now() + period;
            }
            PumpOp::Stop { generation } => {
                if active.map(|(live, _)| live) == Some(generation) {
                    active = None;
                }
            }
            PumpOp::Quit => break,
        }
    }
    log::debug!("pump thread exiting");
}
