//! # Conversion Controller
//!
//! Binds a [`SequenceTable`] to the converter and owns the scan state
//! machine:
//!
//! ```text
//! Idle --configure()--> Configured --start()--> Scanning
//!   ^                     |    ^                   |
//!   +--failed configure---+    +------stop()-------+
//! ```
//!
//! Once scanning, the converter walks every slot on its own and raises one
//! completion per cycle at the terminal slot; the completion handler
//! (see [`handle_completion`](ConversionController::handle_completion)) is
//! the only code that runs per cycle.

use rtt_target::rprintln;

use crate::config::{AcquisitionConfig, HISTORY_DEPTH};
use crate::converter::{ConversionMode, Converter};
use crate::error::{Error, Result};
use crate::history::HistoryStore;
use crate::sequence::SequenceTable;

/// Scan state of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// No accepted configuration.
    Idle,
    /// Converter programmed, not triggered.
    Configured,
    /// Repeated-sequence conversions running.
    Scanning,
}

/// Drives a [`Converter`] through a round-robin scan into a
/// [`HistoryStore`].
pub struct ConversionController<'a, C, const D: usize = HISTORY_DEPTH> {
    pub(crate) converter: C,
    config: AcquisitionConfig,
    pub(crate) store: &'a HistoryStore<D>,
    pub(crate) table: SequenceTable,
    /// Memory slot that ends the sequence.
    pub(crate) terminal: u8,
    pub(crate) state: State,
}

impl<'a, C: Converter, const D: usize> ConversionController<'a, C, D> {
    /// Creates an idle controller. The converter must already be powered,
    /// clocked and have its inputs routed.
    pub fn new(converter: C, config: AcquisitionConfig, store: &'a HistoryStore<D>) -> Self {
        Self {
            converter,
            config,
            store,
            table: SequenceTable::empty(),
            terminal: 0,
            state: State::Idle,
        }
    }

    /// Validates `table` against the board and programs the converter:
    /// sample/hold timing first, then one memory control word per slot in
    /// slot order.
    ///
    /// A rejected table leaves the controller idle, so [`start`](Self::start)
    /// fails until a valid table is configured.
    pub fn configure(&mut self, table: &SequenceTable) -> Result<()> {
        if self.state == State::Scanning {
            return Err(Error::Scanning);
        }
        self.state = State::Idle;

        let terminal = table.validate(self.config.variant).map_err(|err| {
            rprintln!("ADC: sequence rejected: {}", err);
            err
        })?;

        self.converter.set_sampling_timer(&self.config.timing);
        for slot in table {
            self.converter.configure_memory(slot);
        }

        self.table = table.clone();
        self.terminal = terminal;
        self.state = State::Configured;
        rprintln!(
            "ADC: {} slots configured for {} board",
            table.len(),
            self.config.variant
        );
        Ok(())
    }

    /// Arms the terminal-slot interrupt and triggers repeated-sequence
    /// conversion from the first slot. Clears the history store.
    ///
    /// Does nothing if already scanning.
    pub fn start(&mut self) -> Result<()> {
        match self.state {
            State::Idle => return Err(Error::NotConfigured),
            State::Scanning => return Ok(()),
            State::Configured => {}
        }

        self.store.reset();
        self.converter.clear_overflow();
        for slot in &self.table {
            self.converter.clear_interrupt(slot.slot_index);
        }
        self.converter.enable_interrupt(self.terminal);
        self.converter.start_conversion(0, ConversionMode::RepeatedSequence);
        self.state = State::Scanning;
        rprintln!("ADC: scanning {} inputs", self.table.len());
        Ok(())
    }

    /// Disarms the completion interrupt and halts triggering. The history
    /// store keeps its contents.
    pub fn stop(&mut self) {
        if self.state != State::Scanning {
            return;
        }
        self.converter.disable_interrupt(self.terminal);
        self.converter.disable_conversions();
        self.state = State::Configured;
        rprintln!("ADC: stopped after {} cycles", self.store.cycles());
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn config(&self) -> &AcquisitionConfig {
        &self.config
    }

    /// The accepted table. Empty while idle.
    pub fn table(&self) -> &SequenceTable {
        &self.table
    }

    pub fn store(&self) -> &'a HistoryStore<D> {
        self.store
    }

    pub fn converter(&self) -> &C {
        &self.converter
    }

    pub fn converter_mut(&mut self) -> &mut C {
        &mut self.converter
    }
}
