//! # Completion Handler
//!
//! Runs once per converter interrupt. On the terminal-slot completion it
//! drains every slot's result latch and records the cycle in the history
//! store; the converter has already started the next cycle by itself, so
//! nothing is re-armed here.
//!
//! The handler must not be re-entered. On target it is called from the
//! converter's interrupt (or a task woken by it) and the converter never
//! raises the next completion before this one has been serviced.

use heapless::Vec;

use crate::config::{ChannelId, MAX_CHANNELS};
use crate::controller::{ConversionController, State};
use crate::converter::{Converter, Interrupt};

/// What a single handler invocation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// A full cycle was recorded.
    Cycle,
    /// A completion from some other slot. Its flag is cleared and its
    /// result left unread.
    Ignored(u8),
    /// The converter overwrote an unread result or was retriggered too
    /// early. Counted, not an error.
    Overrun,
    /// Nothing pending, or not scanning.
    Idle,
}

impl<'a, C: Converter, const D: usize> ConversionController<'a, C, D> {
    /// Services one converter interrupt.
    ///
    /// ```rust
    /// use ai_scanner::{
    ///     emul::EmulConverter, AcquisitionConfig, BoardVariant, Completion,
    ///     ConversionController, HistoryStore, SequenceTable,
    /// };
    ///
    /// let store: HistoryStore = HistoryStore::new();
    /// let config = AcquisitionConfig::for_variant(BoardVariant::TwelveChannel);
    /// let mut adc = ConversionController::new(EmulConverter::new(), config, &store);
    /// adc.configure(&SequenceTable::for_variant(config.variant)).unwrap();
    /// adc.start().unwrap();
    ///
    /// adc.converter_mut().set_input(3, 1234);
    /// adc.converter_mut().convert_cycle();
    /// assert_eq!(adc.handle_completion(), Completion::Cycle);
    /// assert_eq!(store.latest(3), Some(1234));
    /// ```
    pub fn handle_completion(&mut self) -> Completion {
        if self.state != State::Scanning {
            return Completion::Idle;
        }
        match self.converter.interrupt_vector() {
            Interrupt::Slot(slot) if slot == self.terminal => {
                self.record_cycle();
                Completion::Cycle
            }
            Interrupt::Slot(slot) => {
                self.converter.clear_interrupt(slot);
                Completion::Ignored(slot)
            }
            Interrupt::Overflow | Interrupt::TimeOverflow => {
                self.store.note_overrun();
                Completion::Overrun
            }
            Interrupt::None => Completion::Idle,
        }
    }

    /// Reads each slot once, in slot order, then commits the whole cycle.
    fn record_cycle(&mut self) {
        let mut cycle: Vec<(ChannelId, u16), MAX_CHANNELS> = Vec::new();
        let converter = &mut self.converter;
        cycle.extend(
            self.table
                .iter()
                .map(|slot| (slot.channel_id, converter.result(slot.slot_index))),
        );
        self.store.record(&cycle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AcquisitionConfig, BoardVariant, HISTORY_DEPTH};
    use crate::emul::EmulConverter;
    use crate::history::HistoryStore;
    use crate::sequence::{ChannelSlot, SequenceTable};

    fn scanning<'a>(
        store: &'a HistoryStore<HISTORY_DEPTH>,
        table: &SequenceTable,
    ) -> ConversionController<'a, EmulConverter> {
        let config = AcquisitionConfig::for_variant(BoardVariant::SixteenChannel);
        let mut ctl = ConversionController::new(EmulConverter::new(), config, store);
        ctl.configure(table).unwrap();
        ctl.start().unwrap();
        ctl
    }

    #[test]
    fn terminal_completion_records_cycle() {
        let store = HistoryStore::new();
        let table = SequenceTable::for_variant(BoardVariant::SixteenChannel);
        let mut ctl = scanning(&store, &table);
        for ch in 0..16 {
            ctl.converter_mut().set_input(ch, 100 + ch as u16);
        }
        ctl.converter_mut().convert_cycle();

        assert_eq!(ctl.handle_completion(), Completion::Cycle);
        assert_eq!(store.cycles(), 1);
        for ch in 0..16 {
            assert_eq!(store.latest(ch), Some(100 + ch as u16));
        }
        // Every latch was read, nothing left pending.
        assert!(!ctl.converter().pending());
        assert_eq!(ctl.handle_completion(), Completion::Idle);
        assert_eq!(store.cycles(), 1);
    }

    #[test]
    fn other_slot_completion_ignored() {
        let store = HistoryStore::new();
        let table = SequenceTable::for_variant(BoardVariant::SixteenChannel);
        let mut ctl = scanning(&store, &table);
        ctl.converter_mut().enable_interrupt(4);
        ctl.converter_mut().convert_cycle();

        assert_eq!(ctl.handle_completion(), Completion::Ignored(4));
        assert_eq!(store.cycles(), 0);
    }

    #[test]
    fn stray_slot_does_not_block_next_cycle() {
        let store = HistoryStore::new();
        let table = SequenceTable::for_variant(BoardVariant::SixteenChannel);
        let mut ctl = scanning(&store, &table);
        ctl.converter_mut().enable_interrupt(4);
        ctl.converter_mut().set_input(2, 55);
        ctl.converter_mut().convert_cycle();

        assert_eq!(ctl.handle_completion(), Completion::Ignored(4));
        assert_eq!(ctl.handle_completion(), Completion::Cycle);
        assert_eq!(ctl.handle_completion(), Completion::Idle);
        assert_eq!(store.cycles(), 1);
        assert_eq!(store.latest(2), Some(55));
    }

    #[test]
    fn early_trigger_counts_as_overrun() {
        let store = HistoryStore::new();
        let table = SequenceTable::for_variant(BoardVariant::SixteenChannel);
        let mut ctl = scanning(&store, &table);
        ctl.converter_mut().convert_cycle();
        ctl.converter_mut().retrigger();

        assert_eq!(ctl.handle_completion(), Completion::Overrun);
        assert_eq!(ctl.handle_completion(), Completion::Cycle);
        assert_eq!(store.overruns(), 1);
        assert_eq!(store.cycles(), 1);
    }

    #[test]
    fn unserviced_cycle_counts_as_overrun() {
        let store = HistoryStore::new();
        let table = SequenceTable::for_variant(BoardVariant::SixteenChannel);
        let mut ctl = scanning(&store, &table);
        ctl.converter_mut().set_input(0, 7);
        ctl.converter_mut().convert_cycle();
        ctl.converter_mut().set_input(0, 8);
        ctl.converter_mut().convert_cycle();

        assert_eq!(ctl.handle_completion(), Completion::Overrun);
        assert_eq!(ctl.handle_completion(), Completion::Cycle);
        assert_eq!(store.overruns(), 1);
        assert_eq!(store.cycles(), 1);
        assert_eq!(store.latest(0), Some(8));
    }

    #[test]
    fn stopped_controller_records_nothing() {
        let store = HistoryStore::new();
        let table = SequenceTable::for_variant(BoardVariant::SixteenChannel);
        let mut ctl = scanning(&store, &table);
        ctl.stop();
        assert!(!ctl.converter_mut().convert_cycle());
        assert_eq!(ctl.handle_completion(), Completion::Idle);
        assert_eq!(store.cycles(), 0);
    }

    #[test]
    fn samples_follow_table_mapping() {
        // Inputs scanned out of order: slot n converts A(9 - n).
        let slots: std::vec::Vec<ChannelSlot> =
            (0..4).map(|n| ChannelSlot::new(n, 9 - n, n == 3)).collect();
        let table = SequenceTable::from_slots(&slots).unwrap();
        let store = HistoryStore::new();
        let mut ctl = scanning(&store, &table);
        for ch in 6..=9 {
            ctl.converter_mut().set_input(ch, ch as u16 * 10);
        }
        ctl.converter_mut().convert_cycle();
        assert_eq!(ctl.handle_completion(), Completion::Cycle);

        assert_eq!(store.channels().collect::<std::vec::Vec<_>>(), [6, 7, 8, 9]);
        for ch in 6..=9 {
            assert_eq!(store.latest(ch), Some(ch as u16 * 10));
        }
    }
}
