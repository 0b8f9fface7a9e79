//! Diagnostic histograms, guarded by their own lock.
//!
//! Kept separate from the room lock so that reading the histograms never
//! contends with admission decisions.

use std::sync::Mutex;

use serde::Serialize;

use crate::admission::AdmissionError;
use crate::class::Class;

/// Accumulated per-entry diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Histograms {
    /// `occupancy[class][n]` counts entries that brought the room to `n` occupants.
    occupancy: [Vec<u64>; 2],
    /// `waiting[t]` counts entries that waited `t` ticks.
    waiting: Vec<u64>,
    /// Entries that waited at least `waiting.len()` ticks.
    overflow: u64,
}

impl Histograms {
    pub fn new(max_occupancy: usize, waiting_buckets: usize) -> Self {
        Self {
            occupancy: [vec![0; max_occupancy + 1], vec![0; max_occupancy + 1]],
            waiting: vec![0; waiting_buckets],
            overflow: 0,
        }
    }

    pub(crate) fn record_entry(&mut self, class: Class, occupancy: usize, waited: u64) {
        if let Some(count) = self.occupancy[class.index()].get_mut(occupancy) {
            *count += 1;
        }

        match usize::try_from(waited)
            .ok()
            .and_then(|t| self.waiting.get_mut(t))
        {
            Some(bucket) => *bucket += 1,
            None => self.overflow += 1,
        }
    }

    /// Times `class` held the room with exactly `occupants` inside.
    pub fn occupancy(&self, class: Class, occupants: usize) -> u64 {
        self.occupancy[class.index()]
            .get(occupants)
            .copied()
            .unwrap_or(0)
    }

    /// Entries recorded for `class`, across every occupancy level.
    pub fn occupancy_total(&self, class: Class) -> u64 {
        self.occupancy[class.index()].iter().sum()
    }

    pub fn max_occupancy(&self) -> usize {
        self.occupancy[0].len().saturating_sub(1)
    }

    pub fn waiting(&self) -> &[u64] {
        &self.waiting
    }

    /// `(ticks, count)` for every non-empty waiting bucket, in tick order.
    pub fn waiting_nonzero(&self) -> impl Iterator<Item = (usize, u64)> + '_ {
        self.waiting
            .iter()
            .enumerate()
            .filter(|(_, count)| **count > 0)
            .map(|(ticks, count)| (ticks, *count))
    }

    pub fn overflow(&self) -> u64 {
        self.overflow
    }

    /// Every recorded entry: waiting buckets plus overflow.
    pub fn total_entries(&self) -> u64 {
        self.waiting.iter().sum::<u64>() + self.overflow
    }
}

/// Lock-guarded [`Histograms`] shared by every worker.
#[derive(Debug)]
pub struct Stats {
    inner: Mutex<Histograms>,
}

impl Stats {
    pub fn new(max_occupancy: usize, waiting_buckets: usize) -> Self {
        Self {
            inner: Mutex::new(Histograms::new(max_occupancy, waiting_buckets)),
        }
    }

    pub(crate) fn record_entry(
        &self,
        class: Class,
        occupancy: usize,
        waited: u64,
    ) -> Result<(), AdmissionError> {
        self.inner.lock()?.record_entry(class, occupancy, waited);
        Ok(())
    }

    pub fn snapshot(&self) -> Result<Histograms, AdmissionError> {
        Ok(self.inner.lock()?.clone())
    }

    /// Poison the histogram lock, as a worker panicking mid-update would.
    #[cfg(test)]
    pub(crate) fn poison(&self) {
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = self.inner.lock();
            panic!("histogram update panicked");
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_occupancy_by_class() {
        let mut histograms = Histograms::new(3, 10);
        histograms.record_entry(Class::A, 1, 0);
        histograms.record_entry(Class::A, 2, 0);
        histograms.record_entry(Class::A, 2, 0);
        histograms.record_entry(Class::B, 3, 0);

        assert_eq!(histograms.occupancy(Class::A, 1), 1);
        assert_eq!(histograms.occupancy(Class::A, 2), 2);
        assert_eq!(histograms.occupancy(Class::B, 3), 1);
        assert_eq!(histograms.occupancy(Class::B, 1), 0);
        assert_eq!(histograms.occupancy_total(Class::A), 3);
        assert_eq!(histograms.max_occupancy(), 3);
    }

    #[test]
    fn long_waits_overflow() {
        let mut histograms = Histograms::new(3, 4);
        histograms.record_entry(Class::A, 1, 3);
        histograms.record_entry(Class::A, 1, 4);
        histograms.record_entry(Class::B, 1, 400);

        assert_eq!(histograms.waiting(), &[0, 0, 0, 1]);
        assert_eq!(histograms.overflow(), 2);
    }

    #[test]
    fn total_entries_counts_buckets_and_overflow() {
        let mut histograms = Histograms::new(3, 5);
        for waited in [0, 0, 1, 4, 5, 9] {
            histograms.record_entry(Class::A, 1, waited);
        }
        assert_eq!(histograms.total_entries(), 6);
        assert_eq!(
            histograms.waiting_nonzero().collect::<Vec<_>>(),
            vec![(0, 2), (1, 1), (4, 1)]
        );
    }

    #[test]
    fn stats_snapshot_is_a_copy() {
        let stats = Stats::new(3, 5);
        stats.record_entry(Class::B, 2, 1).unwrap();
        let before = stats.snapshot().unwrap();
        stats.record_entry(Class::B, 2, 1).unwrap();

        assert_eq!(before.occupancy(Class::B, 2), 1);
        assert_eq!(stats.snapshot().unwrap().occupancy(Class::B, 2), 2);
    }

    #[test]
    fn poisoned_stats_report_poisoned() {
        let stats = Stats::new(3, 5);
        stats.poison();
        assert_eq!(stats.snapshot().unwrap_err(), AdmissionError::Poisoned);
        assert_eq!(
            stats.record_entry(Class::A, 1, 0).unwrap_err(),
            AdmissionError::Poisoned
        );
    }
}
