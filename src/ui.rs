use std::io::{self, Write};

use lapwatch_core::{format_mm_ss_cs, Button, LapRow, Stopwatch, TickScheduler};

const CLEAR: &str = "\x1b[2J\x1b[H";
const FOOTER: &str = "l=lap/reset  s=start/stop/resume  q=quit";

pub const HELP_TEXT: &str = "\
Lapwatch
Keys are read a line at a time; press ENTER after each.
  s or space   start, stop, resume
  l            lap while running, reset while stopped
  q            quit
Fastest and slowest completed laps are marked once
there are at least two of them.";

pub fn clear_screen<W: Write>(out: &mut W) -> io::Result<()> {
    out.write_all(CLEAR.as_bytes())
}

pub fn draw_stopwatch<W: Write, S: TickScheduler>(out: &mut W, stopwatch: &Stopwatch<S>) -> io::Result<()> {
    writeln!(out, "STOPWATCH")?;
    writeln!(out)?;
    writeln!(out, "      {}", format_mm_ss_cs(stopwatch.total_elapsed_ms()))?;
    writeln!(out)?;

    let controls = stopwatch.controls();
    writeln!(out, "  {:<16}{}", button_label(controls.left), button_label(controls.right))?;
    writeln!(out)?;

    for lap in stopwatch.laps() {
        writeln!(out, "{}", lap_line(&lap))?;
    }

    writeln!(out)?;
    writeln!(out, "{}", FOOTER)
}

pub fn draw_help<W: Write>(out: &mut W) -> io::Result<()> {
    for line in HELP_TEXT.lines() {
        writeln!(out, "{}", line)?;
    }
    writeln!(out)
}

fn button_label(button: Button) -> String {
    if button.enabled {
        format!("[ {} ]", button.action.label())
    } else {
        format!("( {} )", button.action.label())
    }
}

fn lap_line(lap: &LapRow) -> String {
    let marker = match (lap.is_fastest, lap.is_slowest) {
        (true, true) => "fastest/slowest",
        (true, false) => "fastest",
        (false, true) => "slowest",
        (false, false) => "",
    };
    format!("  Lap {:>2}  {:<15} {}", lap.number, marker, format_mm_ss_cs(lap.interval_ms))
}
