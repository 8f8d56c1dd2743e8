//! Converter hardware interface.
//!
//! The acquisition engine drives a sequencing SAR converter with numbered
//! conversion memory slots: each slot has a control word (input, reference,
//! end-of-sequence) and a result latch with its own interrupt flag. Reading
//! a result clears that slot's flag.
//!
//! [`Converter`] is the register-level seam. The engine only ever talks to
//! the hardware through it; [`crate::emul::EmulConverter`] is the software
//! implementation used by the tests and the bench firmware.

use crate::config::SampleTiming;
use crate::sequence::ChannelSlot;

/// How far a single start trigger carries the converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionMode {
    /// Convert the sequence once and stop.
    Sequence,
    /// Convert the sequence, then start over at the first slot, forever.
    RepeatedSequence,
}

/// Highest-priority pending converter interrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    None,
    /// A result latch was overwritten before it was read.
    Overflow,
    /// A new trigger arrived before the previous conversion finished.
    TimeOverflow,
    /// The conversion into memory slot `n` completed.
    Slot(u8),
}

/// Register-level access to the converter.
///
/// Implementations must not block; [`interrupt_vector`](Self::interrupt_vector)
/// and [`result`](Self::result) are called from the completion handler.
pub trait Converter {
    /// Programs the sample/hold timers and multiple-sample mode.
    fn set_sampling_timer(&mut self, timing: &SampleTiming);

    /// Programs the memory control word for `slot.slot_index`.
    fn configure_memory(&mut self, slot: &ChannelSlot);

    /// Clears the pending completion flag of memory slot `slot`.
    fn clear_interrupt(&mut self, slot: u8);

    /// Clears pending overflow and conversion-time overflow conditions.
    fn clear_overflow(&mut self);

    fn enable_interrupt(&mut self, slot: u8);

    fn disable_interrupt(&mut self, slot: u8);

    /// Enables conversions and issues the start trigger at `first_slot`.
    fn start_conversion(&mut self, first_slot: u8, mode: ConversionMode);

    /// Stops triggering. A sequence in progress is abandoned.
    fn disable_conversions(&mut self);

    /// Reads and acknowledges the interrupt vector.
    ///
    /// Overflow conditions are cleared by this read. Slot completions are
    /// reported only for slots with their interrupt enabled, and stay
    /// pending until the slot's result is read.
    fn interrupt_vector(&mut self) -> Interrupt;

    /// Reads the result latch of memory slot `slot`, clearing its flag.
    fn result(&mut self, slot: u8) -> u16;
}
