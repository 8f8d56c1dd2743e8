//! # Channel History Store
//!
//! Per-channel rings of the most recent raw samples, all sharing one cycle
//! index. The completion handler is the only writer; display, telemetry and
//! control code read through the accessors here.
//!
//! ## Alignment
//!
//! Every completed scan cycle writes one sample per scanned channel at the
//! current cycle index, then advances the index once. So position `i` of
//! any two channels' rings holds samples taken in the same hardware cycle.
//!
//! ## Masking
//!
//! The store lives in an embassy [`blocking_mutex::Mutex`] over a
//! [`CriticalSectionRawMutex`]: on a single-core target every read and the
//! whole per-cycle write run with interrupts masked. A reader can therefore
//! never see the index advanced with only some channels written, nor a
//! sample torn by the completion interrupt. Reads copy out what they need,
//! so the masked section stays short.
//!
//! [`blocking_mutex::Mutex`]: embassy_sync::blocking_mutex::Mutex

use core::cell::RefCell;

use embassy_sync::blocking_mutex::{raw::CriticalSectionRawMutex, Mutex};

use crate::config::{ChannelId, HISTORY_DEPTH, MAX_CHANNELS};

struct Rings<const D: usize> {
    samples: [[u16; D]; MAX_CHANNELS],
    /// Slot the next cycle is written to.
    index: usize,
    /// Completed cycles since start, wrapping.
    cycles: u32,
    /// The index has wrapped at least once.
    filled: bool,
    /// Bit `n` set once input `An` has been recorded.
    channels: u16,
    overruns: u32,
}

impl<const D: usize> Rings<D> {
    const fn new() -> Self {
        Self {
            samples: [[0; D]; MAX_CHANNELS],
            index: 0,
            cycles: 0,
            filled: false,
            channels: 0,
            overruns: 0,
        }
    }

    fn has(&self, channel: ChannelId) -> bool {
        (channel as usize) < MAX_CHANNELS && self.channels & (1u16 << channel) != 0
    }

    /// Number of ring positions holding samples.
    fn valid(&self) -> usize {
        if self.filled {
            D
        } else {
            self.index
        }
    }

    fn latest(&self, channel: ChannelId) -> Option<u16> {
        if !self.has(channel) || self.valid() == 0 {
            return None;
        }
        Some(self.samples[channel as usize][(self.index + D - 1) % D])
    }
}

/// Shared per-channel sample history, `D` samples deep.
///
/// Meant to live in a `static`:
///
/// ```rust
/// use ai_scanner::{HistoryStore, HISTORY_DEPTH};
///
/// static HISTORY: HistoryStore<HISTORY_DEPTH> = HistoryStore::new();
/// assert_eq!(HISTORY.latest(0), None);
/// ```
pub struct HistoryStore<const D: usize = HISTORY_DEPTH> {
    rings: Mutex<CriticalSectionRawMutex, RefCell<Rings<D>>>,
}

impl<const D: usize> HistoryStore<D> {
    pub const fn new() -> Self {
        assert!(D > 0, "history depth must be non-zero");
        Self {
            rings: Mutex::new(RefCell::new(Rings::new())),
        }
    }

    /// Records one completed cycle and advances the shared index.
    ///
    /// All of `cycle` is written before the index moves, in a single masked
    /// section.
    pub(crate) fn record(&self, cycle: &[(ChannelId, u16)]) {
        self.rings.lock(|rings| {
            let mut rings = rings.borrow_mut();
            let index = rings.index;
            for &(channel, sample) in cycle {
                rings.samples[channel as usize][index] = sample;
                rings.channels |= 1u16 << channel;
            }
            rings.index = (index + 1) % D;
            if rings.index == 0 {
                rings.filled = true;
            }
            rings.cycles = rings.cycles.wrapping_add(1);
        });
    }

    pub(crate) fn note_overrun(&self) {
        self.rings.lock(|rings| {
            let mut rings = rings.borrow_mut();
            rings.overruns = rings.overruns.wrapping_add(1);
        });
    }

    /// Forgets all history. Called when scanning (re)starts.
    pub(crate) fn reset(&self) {
        self.rings.lock(|rings| *rings.borrow_mut() = Rings::new());
    }

    /// Most recent sample of `channel`, or `None` before its first cycle.
    pub fn latest(&self, channel: ChannelId) -> Option<u16> {
        self.rings.lock(|rings| rings.borrow().latest(channel))
    }

    /// The recorded samples of `channel`, oldest first.
    ///
    /// Holds `min(cycles, D)` samples. Positions not yet written since start
    /// are never included.
    pub fn window(&self, channel: ChannelId) -> Option<Window<D>> {
        self.rings.lock(|rings| {
            let rings = rings.borrow();
            if !rings.has(channel) {
                return None;
            }
            let len = rings.valid();
            Some(Window {
                ring: rings.samples[channel as usize],
                start: (rings.index + D - len) % D,
                len,
            })
        })
    }

    /// Completed cycles since start. Wraps at `u32::MAX`.
    pub fn cycles(&self) -> u32 {
        self.rings.lock(|rings| rings.borrow().cycles)
    }

    /// Whether every ring position has been written at least once.
    pub fn filled(&self) -> bool {
        self.rings.lock(|rings| rings.borrow().filled)
    }

    /// Converter overruns seen since start.
    pub fn overruns(&self) -> u32 {
        self.rings.lock(|rings| rings.borrow().overruns)
    }

    /// Inputs recorded since start, ascending.
    pub fn channels(&self) -> impl Iterator<Item = ChannelId> {
        let mask = self.rings.lock(|rings| rings.borrow().channels);
        (0..MAX_CHANNELS as ChannelId).filter(move |ch| mask & (1u16 << *ch) != 0)
    }

    /// Latest sample of every channel together with the cycle count, read
    /// in one masked section.
    pub fn snapshot(&self) -> Snapshot {
        self.rings.lock(|rings| {
            let rings = rings.borrow();
            let mut latest = [None; MAX_CHANNELS];
            for (channel, slot) in latest.iter_mut().enumerate() {
                *slot = rings.latest(channel as ChannelId);
            }
            Snapshot {
                cycles: rings.cycles,
                filled: rings.filled,
                latest,
            }
        })
    }
}

impl<const D: usize> Default for HistoryStore<D> {
    fn default() -> Self {
        Self::new()
    }
}

/// Chronological copy of one channel's ring.
///
/// Iterating is lazy and can be restarted with another call to
/// [`iter`](Self::iter).
#[derive(Debug, Clone, Copy)]
pub struct Window<const D: usize> {
    ring: [u16; D],
    start: usize,
    len: usize,
}

impl<const D: usize> Window<D> {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The `i`-th oldest sample.
    pub fn get(&self, i: usize) -> Option<u16> {
        (i < self.len).then(|| self.ring[(self.start + i) % D])
    }

    pub fn newest(&self) -> Option<u16> {
        self.len.checked_sub(1).and_then(|i| self.get(i))
    }

    pub fn iter(
        &self,
    ) -> impl ExactSizeIterator<Item = u16> + DoubleEndedIterator + Clone + '_ {
        (0..self.len).map(move |i| self.ring[(self.start + i) % D])
    }
}

impl<const D: usize> PartialEq for Window<D> {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}

impl<const D: usize> Eq for Window<D> {}

/// Every channel's latest sample at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    /// Completed cycles at the time of the snapshot.
    pub cycles: u32,
    pub filled: bool,
    latest: [Option<u16>; MAX_CHANNELS],
}

impl Snapshot {
    pub fn get(&self, channel: ChannelId) -> Option<u16> {
        self.latest.get(channel as usize).copied().flatten()
    }

    /// `(channel, sample)` for every recorded channel, ascending.
    pub fn iter(&self) -> impl Iterator<Item = (ChannelId, u16)> + '_ {
        self.latest
            .iter()
            .enumerate()
            .filter_map(|(channel, sample)| sample.map(|s| (channel as ChannelId, s)))
    }

    /// Cycles completed between `earlier` and this snapshot. Zero if
    /// nothing new was recorded.
    ///
    /// Only meaningful while both snapshots come from the same run: a
    /// restart resets the counter, which shows up as `self.cycles` being
    /// lower than `earlier.cycles`.
    pub fn cycles_since(&self, earlier: &Snapshot) -> u32 {
        self.cycles.wrapping_sub(earlier.cycles)
    }

    /// Cycles completed after `earlier` and before this snapshot's cycle,
    /// i.e. cycles a poller taking both snapshots never saw as latest.
    pub fn missed_since(&self, earlier: &Snapshot) -> u32 {
        self.cycles_since(earlier).saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cycle(store: &HistoryStore<4>, base: u16) {
        store.record(&[(0, base), (3, base + 1000)]);
    }

    #[test]
    fn empty_store_exposes_nothing() {
        let store: HistoryStore<4> = HistoryStore::new();
        assert_eq!(store.latest(0), None);
        assert_eq!(store.window(0), None);
        assert_eq!(store.cycles(), 0);
        assert!(!store.filled());
        assert_eq!(store.channels().count(), 0);
    }

    #[test]
    fn partial_ring_in_order() {
        let store: HistoryStore<4> = HistoryStore::new();
        cycle(&store, 1);
        cycle(&store, 2);

        let window = store.window(3).unwrap();
        assert_eq!(window.len(), 2);
        assert_eq!(window.iter().collect::<Vec<_>>(), [1001, 1002]);
        assert_eq!(window.newest(), Some(1002));
        assert_eq!(store.latest(0), Some(2));
        assert!(!store.filled());
        assert_eq!(store.channels().collect::<Vec<_>>(), [0, 3]);
    }

    #[test]
    fn window_is_restartable() {
        let store: HistoryStore<4> = HistoryStore::new();
        for n in 1..=3 {
            cycle(&store, n);
        }
        let window = store.window(0).unwrap();
        let first: Vec<u16> = window.iter().collect();
        let second: Vec<u16> = window.iter().collect();
        assert_eq!(first, second);
        assert_eq!(window.iter().rev().collect::<Vec<_>>(), [3, 2, 1]);
        assert_eq!(window.get(3), None);
    }

    #[test]
    fn wraparound_drops_oldest() {
        let store: HistoryStore<4> = HistoryStore::new();
        for n in 1..=6 {
            cycle(&store, n);
        }
        assert!(store.filled());
        assert_eq!(store.cycles(), 6);
        assert_eq!(
            store.window(0).unwrap().iter().collect::<Vec<_>>(),
            [3, 4, 5, 6]
        );
        assert_eq!(store.latest(3), Some(1006));
    }

    #[test]
    fn unrecorded_channel_is_absent() {
        let store: HistoryStore<4> = HistoryStore::new();
        cycle(&store, 1);
        assert_eq!(store.latest(1), None);
        assert_eq!(store.window(1), None);
        assert_eq!(store.latest(200), None);
    }

    #[test]
    fn snapshot_reports_missed_cycles() {
        let store: HistoryStore<4> = HistoryStore::new();
        cycle(&store, 1);
        let before = store.snapshot();
        for n in 2..=5 {
            cycle(&store, n);
        }
        let after = store.snapshot();
        assert_eq!(after.cycles, 5);
        assert_eq!(after.missed_since(&before), 3);
        assert_eq!(after.get(0), Some(5));
        assert_eq!(after.get(1), None);
        assert_eq!(after.iter().collect::<Vec<_>>(), [(0, 5), (3, 1005)]);
    }

    #[test]
    fn unchanged_store_shows_no_progress() {
        let store: HistoryStore<4> = HistoryStore::new();
        cycle(&store, 1);
        let first = store.snapshot();
        let again = store.snapshot();
        assert_eq!(again.cycles_since(&first), 0);

        cycle(&store, 2);
        let next = store.snapshot();
        assert_eq!(next.cycles_since(&first), 1);
        assert_eq!(next.missed_since(&first), 0);
    }

    #[test]
    fn reset_restarts_cycle_count() {
        let store: HistoryStore<4> = HistoryStore::new();
        for n in 1..=3 {
            cycle(&store, n);
        }
        let before = store.snapshot();
        store.reset();
        cycle(&store, 9);
        let after = store.snapshot();
        assert!(after.cycles < before.cycles);
        assert_eq!(after.cycles, 1);
        assert_eq!(after.get(0), Some(9));
    }

    #[test]
    fn reset_clears_history() {
        let store: HistoryStore<4> = HistoryStore::new();
        for n in 1..=5 {
            cycle(&store, n);
        }
        store.note_overrun();
        store.reset();
        assert_eq!(store.cycles(), 0);
        assert_eq!(store.overruns(), 0);
        assert!(!store.filled());
        assert_eq!(store.latest(0), None);
    }
}
