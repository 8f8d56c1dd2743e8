//! # Display Module
//!
//! RTT console view of the channel history. Polls the store, and whenever
//! at least one new cycle has completed prints every channel's latest
//! sample followed by its window, oldest first:
//!
//! ```text
//! cycle 1234 (+24)
//! A0:  2047 |  2040  2043  2047  2047  2046  2047  2047  2047
//! A1:   448 |   336   352   368   384   400   416   432   448
//! ...
//! ```
use crate::*;

/// Polled console consumer of a [`HistoryStore`].
pub struct Display {
    store: &'static HistoryStore,
    period: Duration,
    /// Snapshot printed last, if any.
    last: Option<Snapshot>,
}

impl Display {
    pub fn new(store: &'static HistoryStore, period: Duration) -> Self {
        Self {
            store,
            period,
            last: None,
        }
    }

    /// Prints `snapshot`, `advanced` cycles after the previous one.
    ///
    /// Windows are read after the snapshot and may already include one more
    /// cycle than its latest values.
    fn show(&self, snapshot: &Snapshot, advanced: u32) {
        rprintln!();
        rprintln!("cycle {} (+{})", snapshot.cycles, advanced);
        for (channel, sample) in snapshot.iter() {
            rprint!("A{}: {:5} |", channel, sample);
            if let Some(window) = self.store.window(channel) {
                for value in window.iter() {
                    rprint!(" {:5}", value);
                }
            }
            rprintln!();
        }
        let overruns = self.store.overruns();
        if overruns > 0 {
            rprintln!("overruns: {}", overruns);
        }
    }

    /// Main display loop. Never returns.
    pub async fn run(&mut self) -> ! {
        loop {
            let snapshot = self.store.snapshot();
            if self.last.is_some_and(|last| snapshot.cycles < last.cycles) {
                // Scanning restarted and the store was cleared.
                self.last = None;
            }
            let advanced = match self.last {
                Some(last) => snapshot.cycles_since(&last),
                None => snapshot.cycles,
            };
            if advanced > 0 {
                self.show(&snapshot, advanced);
                self.last = Some(snapshot);
            }
            Timer::after(self.period).await;
        }
    }
}
