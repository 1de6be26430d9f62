mod clock;
mod config;
mod error;
mod pump;
mod ui;

use std::io::{self, BufRead, Write};
use std::thread;

use clap::Parser;
use flume::Sender;
use lapwatch_core::{Button, ClockState, Stopwatch, TickScheduler};

use crate::clock::{MonotonicClock, TimeSource};
use crate::config::Config;
use crate::error::AppError;
use crate::pump::Pump;

const APP_NAME: &str = "lapwatch";

const KEY_LEFT: char = 'l';
const KEY_RIGHT: char = 's';
const KEY_HELP: char = 'h';
const KEY_QUIT: char = 'q';

/// Everything the event loop reacts to, in arrival order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMsg {
    Key(char),
    Pump,
    Quit,
}

struct LapwatchApp<T: TimeSource, S: TickScheduler, W: Write> {
    clock: T,
    stopwatch: Stopwatch<S>,
    out: W,
    plain: bool,
    help_visible: bool,
}

impl<T: TimeSource, S: TickScheduler, W: Write> LapwatchApp<T, S, W> {
    fn new(clock: T, scheduler: S, tick_ms: u64, out: W, plain: bool) -> Self {
        Self {
            clock,
            stopwatch: Stopwatch::new(scheduler, tick_ms),
            out,
            plain,
            help_visible: false,
        }
    }

    fn redraw(&mut self) -> Result<(), AppError> {
        if !self.plain {
            ui::clear_screen(&mut self.out)?;
        }
        if self.help_visible {
            ui::draw_help(&mut self.out)?;
        }
        ui::draw_stopwatch(&mut self.out, &self.stopwatch)?;
        self.out.flush()?;
        Ok(())
    }

    /// Returns `false` once the user asks to quit.
    fn handle_key(&mut self, key: char) -> Result<bool, AppError> {
        let controls = self.stopwatch.controls();
        match key.to_ascii_lowercase() {
            KEY_LEFT => self.press(controls.left)?,
            KEY_RIGHT | ' ' | '\n' => self.press(controls.right)?,
            KEY_HELP | '?' => {
                self.help_visible = !self.help_visible;
                self.redraw()?;
            }
            KEY_QUIT => return Ok(false),
            _ => log::debug!("unbound key {:?}", key),
        }
        Ok(true)
    }

    fn press(&mut self, button: Button) -> Result<(), AppError> {
        if !button.enabled {
            return Ok(());
        }
        let now = self.clock.now_ms();
        if self.stopwatch.dispatch(button.action, now) {
            self.redraw()?;
        }
        Ok(())
    }

    fn handle_pump(&mut self) -> Result<(), AppError> {
        let now = self.clock.now_ms();
        // ticks queued before a stop arrive late and change nothing
        if self.stopwatch.tick(now) {
            self.redraw()?;
        }
        Ok(())
    }
}

/// Posts one key per character of each line, ENTER alone as `'\n'`, and
/// `Quit` at end of input.
fn input_thread<R: BufRead>(input: R, main_conn: Sender<AppMsg>) {
    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                log::error!("can't read stdin: {}", e);
                break;
            }
        };
        let mut keys: Vec<char> = line.chars().collect();
        if keys.is_empty() {
            keys.push('\n');
        }
        for key in keys {
            if main_conn.send(AppMsg::Key(key)).is_err() {
                return;
            }
        }
    }
    main_conn.send(AppMsg::Quit).ok();
}

fn main() -> Result<(), AppError> {
    let config = Config::parse();
    env_logger::Builder::new()
        .filter_level(config.log_level.into())
        .parse_default_env()
        .init();
    log::info!("{} PID is {}, tick every {}ms", APP_NAME, std::process::id(), config.tick_ms);

    let (main_conn, inbox) = flume::unbounded();
    let pump = Pump::spawn(main_conn.clone())?;

    // Blocks on stdin for the life of the process, so it is never joined.
    let input_conn = main_conn.clone();
    thread::Builder::new()
        .name("input".into())
        .spawn(move || input_thread(io::stdin().lock(), input_conn))
        .map_err(|source| AppError::Spawn { name: "input", source })?;
    drop(main_conn);

    let mut app = LapwatchApp::new(
        MonotonicClock::new(),
        pump.scheduler(),
        config.tick_ms,
        io::stdout(),
        config.plain,
    );
    app.redraw()?;

    loop {
        let msg = inbox.recv().map_err(|_| AppError::Disconnected)?;
        match msg {
            AppMsg::Key(key) => {
                if !app.handle_key(key)? {
                    break;
                }
            }
            AppMsg::Pump => app.handle_pump()?,
            AppMsg::Quit => break,
        }
    }

    if app.stopwatch.state() == ClockState::Running {
        log::info!("quitting with the stopwatch running");
    }
    // Dropping the stopwatch cancels its tick schedule before the pump goes away.
    drop(app);
    pump.shutdown();
    log::info!("{} exiting", APP_NAME);
    Ok(())
}
