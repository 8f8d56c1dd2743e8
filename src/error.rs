//! Error types for the acquisition engine.
//!
//! Everything here is a configuration error, reported synchronously by the
//! conversion controller. Once scanning, nothing in the completion path can
//! fail, and ring overwrite is normal operation.

use core::fmt;

use crate::config::{BoardVariant, ChannelId};

/// Errors reported by [`ConversionController`](crate::ConversionController)
/// and [`SequenceTable`](crate::SequenceTable).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The table has no slots
    EmptySequence,
    /// More slots than the board has inputs
    TooManySlots {
        /// Number of slots offered
        count: usize,
        /// Largest table the converter accepts
        max: usize,
    },
    /// Slot indices do not run `0..N-1` in order
    NonContiguousSlot {
        /// Position in the table
        position: usize,
        /// Index found at that position
        slot_index: u8,
    },
    /// No slot terminates the sequence
    MissingSequenceEnd,
    /// More than one slot terminates the sequence
    MultipleSequenceEnds {
        /// First terminating slot
        first: u8,
        /// Second terminating slot
        second: u8,
    },
    /// The terminating slot is not the last one
    MisplacedSequenceEnd {
        /// The terminating slot
        slot_index: u8,
        /// Index of the last slot
        last: u8,
    },
    /// Two slots scan the same input
    DuplicateChannel {
        /// The repeated input
        channel: ChannelId,
    },
    /// The input is not routed to the converter on this board
    ChannelUnavailable {
        /// The missing input
        channel: ChannelId,
        /// Board being configured
        variant: BoardVariant,
    },
    /// `start()` without an accepted configuration
    NotConfigured,
    /// Reconfiguration attempted while scanning
    Scanning,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySequence => write!(f, "sequence table is empty"),
            Self::TooManySlots { count, max } => {
                write!(f, "sequence table has {count} slots, at most {max} allowed")
            }
            Self::NonContiguousSlot {
                position,
                slot_index,
            } => write!(f, "slot {slot_index} found at position {position}"),
            Self::MissingSequenceEnd => write!(f, "no slot ends the sequence"),
            Self::MultipleSequenceEnds { first, second } => {
                write!(f, "slots {first} and {second} both end the sequence")
            }
            Self::MisplacedSequenceEnd { slot_index, last } => {
                write!(f, "slot {slot_index} ends the sequence, expected slot {last}")
            }
            Self::DuplicateChannel { channel } => write!(f, "input A{channel} scanned twice"),
            Self::ChannelUnavailable { channel, variant } => {
                write!(f, "input A{channel} not available on {variant} board")
            }
            Self::NotConfigured => write!(f, "converter not configured"),
            Self::Scanning => write!(f, "converter is scanning"),
        }
    }
}

/// Result type for acquisition operations.
pub type Result<T> = core::result::Result<T, Error>;
