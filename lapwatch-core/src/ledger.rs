use std::collections::VecDeque;

/// Input to [`LapLedger::apply`]. `committed` is the clock's
/// elapsed-since-boundary amount at the moment of the action.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LedgerEvent {
    Start,
    Lap { committed: u64 },
    Stop { committed: u64 },
    Resume,
    Reset,
}

/// Lap durations in milliseconds, newest first.
///
/// Position 0 is the in-progress (or, once stopped, most recently closed)
/// lap; every later position is finalized.
#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub struct LapLedger {
    laps: VecDeque<u64>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct LapExtremes {
    pub fastest_ms: u64,
    pub slowest_ms: u64,
}

impl LapExtremes {
    /// (fastest, slowest) flags for a finalized lap. When every finalized lap
    /// is equal, each one carries both flags.
    pub fn marks(&self, lap_ms: u64) -> (bool, bool) {
        (lap_ms == self.fastest_ms, lap_ms == self.slowest_ms)
    }
}

/// One line of the lap table as the presentation layer shows it.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct LapRow {
    pub number: usize,
    pub interval_ms: u64,
    pub is_fastest: bool,
    pub is_slowest: bool,
}

impl LapLedger {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn apply(mut self, event: LedgerEvent) -> Self {
        match event {
            LedgerEvent::Start => {
                self.laps.clear();
                self.laps.push_back(0);
            }
            LedgerEvent::Lap { committed } => {
                let closed = self.laps.pop_front().unwrap_or(0) + committed;
                self.laps.push_front(closed);
                self.laps.push_front(0);
            }
            LedgerEvent::Stop { committed } => {
                if let Some(current) = self.laps.front_mut() {
                    *current += committed;
                }
            }
            LedgerEvent::Resume => {}
            LedgerEvent::Reset => self.laps.clear(),
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.laps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.laps.len()
    }

    /// Stored values, newest first.
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.laps.iter().copied()
    }

    /// Sum of every stored value, the in-progress baseline included.
    pub fn committed_ms(&self) -> u64 {
        self.laps.iter().sum()
    }

    /// Fastest and slowest over finalized laps, once there are at least two.
    pub fn extremes(&self) -> Option<LapExtremes> {
        let mut finalized = self.laps.iter().skip(1).copied();
        let first = finalized.next()?;
        let (mut fastest_ms, mut slowest_ms, mut count) = (first, first, 1usize);
        for lap in finalized {
            fastest_ms = fastest_ms.min(lap);
            slowest_ms = slowest_ms.max(lap);
            count += 1;
        }
        if count < 2 {
            return None;
        }
        Some(LapExtremes { fastest_ms, slowest_ms })
    }

    /// Project stored laps into display rows. While running, the in-progress
    /// row shows its committed baseline plus `current_ms`.
    pub fn rows(&self, current_ms: u64, running: bool) -> Vec<LapRow> {
        let total = self.laps.len();
        let extremes = self.extremes();
        self.laps
            .iter()
            .enumerate()
            .map(|(i, &stored)| {
                let interval_ms = if i == 0 && running { stored + current_ms } else { stored };
                let (is_fastest, is_slowest) = match extremes {
                    Some(e) if i > 0 => e.marks(stored),
                    _ => (false, false),
                };
                LapRow {
                    number: total - i,
                    interval_ms,
                    is_fastest,
                    is_slowest,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn ledger_of(laps: &[u64]) -> LapLedger {
        LapLedger {
            laps: laps.iter().copied().collect(),
        }
    }

    fn row(number: usize, interval_ms: u64, is_fastest: bool, is_slowest: bool) -> LapRow {
        LapRow { number, interval_ms, is_fastest, is_slowest }
    }

    #[test]
    fn test_start_opens_single_lap() {
        let ledger = LapLedger::new().apply(LedgerEvent::Start);
        assert_eq!(ledger.iter().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn test_lap_rotates_front() {
        let ledger = ledger_of(&[40, 300, 100]).apply(LedgerEvent::Lap { committed: 60 });
        assert_eq!(ledger.iter().collect::<Vec<_>>(), vec![0, 100, 300, 100]);
    }

    #[test]
    fn test_stop_commits_in_place() {
        let ledger = ledger_of(&[0, 250]).apply(LedgerEvent::Stop { committed: 150 });
        assert_eq!(ledger.iter().collect::<Vec<_>>(), vec![150, 250]);

        let ledger = ledger.apply(LedgerEvent::Resume);
        assert_eq!(ledger.iter().collect::<Vec<_>>(), vec![150, 250]);

        let ledger = ledger.apply(LedgerEvent::Stop { committed: 50 });
        assert_eq!(ledger.iter().collect::<Vec<_>>(), vec![200, 250]);
    }

    #[test]
    fn test_reset_clears_from_any_history() {
        let histories: [&[u64]; 3] = [&[], &[0], &[10, 20, 30]];
        for laps in histories {
            let ledger = ledger_of(laps).apply(LedgerEvent::Reset);
            assert!(ledger.is_empty());
            assert_eq!(ledger.committed_ms(), 0);
        }
    }

    #[test]
    fn test_extremes_need_two_finalized_laps() {
        assert_eq!(ledger_of(&[]).extremes(), None);
        assert_eq!(ledger_of(&[500]).extremes(), None);
        assert_eq!(ledger_of(&[0, 250]).extremes(), None);
        assert_eq!(
            ledger_of(&[0, 100, 50, 200]).extremes(),
            Some(LapExtremes { fastest_ms: 50, slowest_ms: 200 })
        );
    }

    #[test]
    fn test_extremes_ignore_in_progress_lap() {
        assert_eq!(
            ledger_of(&[1, 300, 400]).extremes(),
            Some(LapExtremes { fastest_ms: 300, slowest_ms: 400 })
        );
    }

    #[test]
    fn test_rows_numbering_and_live_interval() {
        let ledger = ledger_of(&[20, 250]);
        assert_eq!(ledger.rows(130, true), vec![row(2, 150, false, false), row(1, 250, false, false)]);
        assert_eq!(ledger.rows(130, false), vec![row(2, 20, false, false), row(1, 250, false, false)]);
    }

    #[test]
    fn test_rows_mark_fastest_and_slowest() {
        // laps recorded oldest to newest: 300, 100, 500
        let ledger = ledger_of(&[0, 500, 100, 300]);
        assert_eq!(
            ledger.rows(0, true),
            vec![
                row(4, 0, false, false),
                row(3, 500, false, true),
                row(2, 100, true, false),
                row(1, 300, false, false),
            ]
        );
    }

    #[test]
    fn test_rows_ties() {
        let ledger = ledger_of(&[0, 100, 200, 100]);
        let rows = ledger.rows(0, true);
        assert_eq!(rows[1], row(3, 100, true, false));
        assert_eq!(rows[2], row(2, 200, false, true));
        assert_eq!(rows[3], row(1, 100, true, false));

        let flat = ledger_of(&[0, 100, 100]);
        let rows = flat.rows(0, true);
        assert_eq!(rows[0], row(3, 0, false, false));
        assert!(rows[1..].iter().all(|r| r.is_fastest && r.is_slowest));
    }
}
