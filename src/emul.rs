//! Software model of the sequencing converter.
//!
//! Behaves like the real part as far as the engine can observe: memory
//! control words, per-slot result latches and flags, interrupt enables,
//! overflow when a latched result is overwritten unread, conversion-time
//! overflow on an early trigger, and a sequence without an end marker never
//! completing.
//!
//! The analog side is a bank of input levels set with
//! [`set_input`](EmulConverter::set_input). Nothing converts on its own:
//! whoever stands in for the conversion clock calls
//! [`convert_cycle`](EmulConverter::convert_cycle) once per scan period.

use crate::config::{
    ChannelId, ReferenceConfig, SampleTiming, MAX_CHANNELS, MEMORY_SLOTS, RESULT_MASK,
};
use crate::converter::{ConversionMode, Converter, Interrupt};
use crate::sequence::ChannelSlot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MemoryControl {
    input: ChannelId,
    reference: ReferenceConfig,
    end_of_sequence: bool,
}

#[derive(Debug)]
pub struct EmulConverter {
    timing: Option<SampleTiming>,
    memory: [Option<MemoryControl>; MEMORY_SLOTS],
    results: [u16; MEMORY_SLOTS],
    /// Completion flag per memory slot.
    flags: u32,
    /// Interrupt enable per memory slot.
    enables: u32,
    overflow: bool,
    time_overflow: bool,
    /// Start slot and mode while conversions are enabled.
    running: Option<(u8, ConversionMode)>,
    inputs: [u16; MAX_CHANNELS],
    clocks: u32,
}

impl EmulConverter {
    pub const fn new() -> Self {
        Self {
            timing: None,
            memory: [None; MEMORY_SLOTS],
            results: [0; MEMORY_SLOTS],
            flags: 0,
            enables: 0,
            overflow: false,
            time_overflow: false,
            running: None,
            inputs: [0; MAX_CHANNELS],
            clocks: 0,
        }
    }

    /// Sets the level presented on input `An`.
    pub fn set_input(&mut self, channel: ChannelId, level: u16) {
        if let Some(input) = self.inputs.get_mut(channel as usize) {
            *input = level;
        }
    }

    /// Input and reference programmed into memory slot `slot`.
    pub fn memory(&self, slot: u8) -> Option<(ChannelId, ReferenceConfig)> {
        self.memory
            .get(slot as usize)
            .copied()
            .flatten()
            .map(|control| (control.input, control.reference))
    }

    /// Whether a start trigger is in effect.
    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Whether the completion of memory slot `slot` would interrupt.
    pub fn interrupt_enabled(&self, slot: u8) -> bool {
        self.enables & bit(slot) != 0
    }

    /// Whether any enabled slot completion is waiting to be serviced.
    pub fn pending(&self) -> bool {
        self.overflow || self.time_overflow || self.flags & self.enables != 0
    }

    /// A start trigger arriving while the sequence is still converting.
    /// The trigger is lost and a conversion-time overflow is flagged.
    /// Does nothing while conversions are disabled.
    pub fn retrigger(&mut self) {
        if self.running.is_some() {
            self.time_overflow = true;
        }
    }

    /// Sample/hold clock cycles spent by the last sequence.
    pub fn hold_clocks(&self) -> u32 {
        self.clocks
    }

    /// Converts one pass of the sequence, starting at the start slot and
    /// stopping after the end-of-sequence slot.
    ///
    /// Returns `true` if the pass reached an end-of-sequence slot. Without
    /// multiple-sample mode only the first slot converts per trigger. In
    /// single-sequence mode conversions stop after the pass.
    pub fn convert_cycle(&mut self) -> bool {
        let Some((first, mode)) = self.running else {
            return false;
        };
        let timing = self.timing.unwrap_or_default();

        self.clocks = 0;
        let mut slot = first as usize;
        let mut completed = false;
        for _ in 0..MEMORY_SLOTS {
            let Some(control) = self.memory[slot] else {
                break;
            };
            self.clocks += timing.hold_for(slot as u8).cycles();
            self.latch(slot as u8, self.inputs[control.input as usize] & RESULT_MASK);
            if control.end_of_sequence {
                completed = true;
                break;
            }
            if !timing.multiple_samples {
                break;
            }
            slot = (slot + 1) % MEMORY_SLOTS;
        }

        if completed && mode == ConversionMode::Sequence {
            self.running = None;
        }
        completed
    }

    fn latch(&mut self, slot: u8, value: u16) {
        if self.flags & bit(slot) != 0 {
            self.overflow = true;
        }
        self.results[slot as usize] = value;
        self.flags |= bit(slot);
    }
}

impl Default for EmulConverter {
    fn default() -> Self {
        Self::new()
    }
}

fn bit(slot: u8) -> u32 {
    1u32 << (slot as usize % MEMORY_SLOTS)
}

impl Converter for EmulConverter {
    fn set_sampling_timer(&mut self, timing: &SampleTiming) {
        self.timing = Some(*timing);
    }

    fn configure_memory(&mut self, slot: &ChannelSlot) {
        if let Some(control) = self.memory.get_mut(slot.slot_index as usize) {
            *control = Some(MemoryControl {
                input: slot.channel_id,
                reference: slot.reference,
                end_of_sequence: slot.is_sequence_end,
            });
        }
    }

    fn clear_interrupt(&mut self, slot: u8) {
        self.flags &= !bit(slot);
    }

    fn clear_overflow(&mut self) {
        self.overflow = false;
        self.time_overflow = false;
    }

    fn enable_interrupt(&mut self, slot: u8) {
        self.enables |= bit(slot);
    }

    fn disable_interrupt(&mut self, slot: u8) {
        self.enables &= !bit(slot);
    }

    fn start_conversion(&mut self, first_slot: u8, mode: ConversionMode) {
        self.running = Some((first_slot, mode));
    }

    fn disable_conversions(&mut self) {
        self.running = None;
    }

    fn interrupt_vector(&mut self) -> Interrupt {
        if self.overflow {
            self.overflow = false;
            return Interrupt::Overflow;
        }
        if self.time_overflow {
            self.time_overflow = false;
            return Interrupt::TimeOverflow;
        }
        let active = self.flags & self.enables;
        if active == 0 {
            Interrupt::None
        } else {
            Interrupt::Slot(active.trailing_zeros() as u8)
        }
    }

    fn result(&mut self, slot: u8) -> u16 {
        self.flags &= !bit(slot);
        self.results
            .get(slot as usize)
            .copied()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HoldCycles;

    fn programmed(slots: &[ChannelSlot]) -> EmulConverter {
        let mut adc = EmulConverter::new();
        adc.set_sampling_timer(&SampleTiming::default());
        for slot in slots {
            adc.configure_memory(slot);
        }
        adc
    }

    #[test]
    fn idle_converter_does_nothing() {
        let mut adc = programmed(&[ChannelSlot::new(0, 0, true)]);
        assert!(!adc.convert_cycle());
        assert_eq!(adc.interrupt_vector(), Interrupt::None);
    }

    #[test]
    fn sequence_latches_every_slot() {
        let mut adc = programmed(&[
            ChannelSlot::new(0, 4, false),
            ChannelSlot::new(1, 9, true),
        ]);
        adc.set_input(4, 0x123);
        adc.set_input(9, 0xfabc);
        adc.enable_interrupt(1);
        adc.start_conversion(0, ConversionMode::RepeatedSequence);

        assert!(adc.convert_cycle());
        assert_eq!(adc.interrupt_vector(), Interrupt::Slot(1));
        assert_eq!(adc.result(0), 0x123);
        // 12-bit converter.
        assert_eq!(adc.result(1), 0xabc);
        assert_eq!(adc.interrupt_vector(), Interrupt::None);
        assert!(adc.is_running());
    }

    #[test]
    fn only_enabled_slots_interrupt() {
        let mut adc = programmed(&[
            ChannelSlot::new(0, 0, false),
            ChannelSlot::new(1, 1, true),
        ]);
        adc.start_conversion(0, ConversionMode::RepeatedSequence);
        adc.convert_cycle();
        assert!(!adc.pending());
        assert_eq!(adc.interrupt_vector(), Interrupt::None);

        adc.enable_interrupt(1);
        assert!(adc.pending());
        adc.disable_interrupt(1);
        assert!(!adc.pending());
    }

    #[test]
    fn unread_result_overflows() {
        let mut adc = programmed(&[ChannelSlot::new(0, 0, true)]);
        adc.enable_interrupt(0);
        adc.start_conversion(0, ConversionMode::RepeatedSequence);
        adc.convert_cycle();
        adc.convert_cycle();
        assert_eq!(adc.interrupt_vector(), Interrupt::Overflow);
        assert_eq!(adc.interrupt_vector(), Interrupt::Slot(0));
    }

    #[test]
    fn early_trigger_flags_time_overflow() {
        let mut adc = programmed(&[ChannelSlot::new(0, 0, true)]);
        adc.retrigger();
        assert!(!adc.pending());

        adc.enable_interrupt(0);
        adc.start_conversion(0, ConversionMode::RepeatedSequence);
        adc.convert_cycle();
        adc.convert_cycle();
        adc.retrigger();
        assert_eq!(adc.interrupt_vector(), Interrupt::Overflow);
        assert_eq!(adc.interrupt_vector(), Interrupt::TimeOverflow);
        assert_eq!(adc.interrupt_vector(), Interrupt::Slot(0));
    }

    #[test]
    fn clear_overflow_drops_both_conditions() {
        let mut adc = programmed(&[ChannelSlot::new(0, 0, true)]);
        adc.start_conversion(0, ConversionMode::RepeatedSequence);
        adc.convert_cycle();
        adc.convert_cycle();
        adc.retrigger();
        adc.clear_overflow();
        assert_eq!(adc.interrupt_vector(), Interrupt::None);
    }

    #[test]
    fn sequence_without_end_never_completes() {
        let mut adc = programmed(&[
            ChannelSlot::new(0, 0, false),
            ChannelSlot::new(1, 1, false),
        ]);
        adc.enable_interrupt(1);
        adc.start_conversion(0, ConversionMode::RepeatedSequence);
        assert!(!adc.convert_cycle());
    }

    #[test]
    fn single_sequence_stops_after_one_pass() {
        let mut adc = programmed(&[ChannelSlot::new(0, 0, true)]);
        adc.start_conversion(0, ConversionMode::Sequence);
        assert!(adc.convert_cycle());
        assert!(!adc.is_running());
        assert!(!adc.convert_cycle());
    }

    #[test]
    fn hold_time_follows_slot_group() {
        let slots: Vec<ChannelSlot> = (0..10).map(|n| ChannelSlot::new(n, n, n == 9)).collect();
        let mut adc = programmed(&slots);
        adc.set_sampling_timer(&SampleTiming {
            hold_low: HoldCycles::Cycles32,
            hold_high: HoldCycles::Cycles8,
            multiple_samples: true,
        });
        adc.start_conversion(0, ConversionMode::RepeatedSequence);
        adc.convert_cycle();
        assert_eq!(adc.hold_clocks(), 8 * 32 + 2 * 8);
    }
}
