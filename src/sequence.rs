//! # Channel Sequence Table
//!
//! Declares, for a board variant, the ordered list of converter slots to
//! scan. Slot `k` of the table is programmed into converter memory slot `k`
//! and the last slot carries the end-of-sequence marker, which is what makes
//! the converter raise one completion per scan cycle.
//!
//! Building a table never touches hardware. Checking a table against a board
//! is done by [`SequenceTable::validate`], which the conversion controller
//! runs before programming anything.

use heapless::Vec;

use crate::config::{BoardVariant, ChannelId, ReferenceConfig, MAX_CHANNELS};
use crate::error::{Error, Result};

/// One entry in the scan sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelSlot {
    /// Position in hardware scan order.
    pub slot_index: u8,
    /// Analog input converted in this slot.
    pub channel_id: ChannelId,
    pub reference: ReferenceConfig,
    /// Set on the last slot only.
    pub is_sequence_end: bool,
}

impl ChannelSlot {
    pub const fn new(slot_index: u8, channel_id: ChannelId, is_sequence_end: bool) -> Self {
        Self {
            slot_index,
            channel_id,
            reference: ReferenceConfig::AvccAvss,
            is_sequence_end,
        }
    }
}

/// Ordered scan sequence for one board configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceTable {
    slots: Vec<ChannelSlot, MAX_CHANNELS>,
}

impl SequenceTable {
    /// A table with no slots. Never passes validation.
    pub const fn empty() -> Self {
        Self { slots: Vec::new() }
    }

    /// The standard table for `variant`: input `An` in slot `n`, for every
    /// input the board routes to the converter.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ai_scanner::{BoardVariant, SequenceTable};
    ///
    /// let table = SequenceTable::for_variant(BoardVariant::TwelveChannel);
    /// assert_eq!(table.len(), 12);
    /// assert_eq!(table.terminal().map(|s| s.slot_index), Some(11));
    /// ```
    pub fn for_variant(variant: BoardVariant) -> Self {
        let count = variant.channel_count();
        let slots = (0..count)
            .map(|n| ChannelSlot::new(n as u8, n as ChannelId, n + 1 == count))
            .collect();
        Self { slots }
    }

    /// Builds a table from explicit slots. Only the length is checked here;
    /// the slot invariants are checked by [`validate`](Self::validate).
    pub fn from_slots(slots: &[ChannelSlot]) -> Result<Self> {
        let slots = Vec::from_slice(slots).map_err(|_| Error::TooManySlots {
            count: slots.len(),
            max: MAX_CHANNELS,
        })?;
        Ok(Self { slots })
    }

    pub fn slots(&self) -> &[ChannelSlot] {
        &self.slots
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChannelSlot> {
        self.slots.iter()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The last slot, if it is marked as the end of the sequence.
    pub fn terminal(&self) -> Option<&ChannelSlot> {
        self.slots.last().filter(|slot| slot.is_sequence_end)
    }

    /// Checks the table against `variant` and returns the index of the
    /// terminating slot.
    ///
    /// Slot indices must run `0..N-1` in table order, every input must be
    /// available on the board and scanned once, and exactly one slot, the
    /// last, must end the sequence.
    pub fn validate(&self, variant: BoardVariant) -> Result<u8> {
        if self.slots.is_empty() {
            return Err(Error::EmptySequence);
        }

        let mut seen: u16 = 0;
        let mut end: Option<u8> = None;
        for (position, slot) in self.slots.iter().enumerate() {
            if slot.slot_index as usize != position {
                return Err(Error::NonContiguousSlot {
                    position,
                    slot_index: slot.slot_index,
                });
            }
            if !variant.is_available(slot.channel_id) {
                return Err(Error::ChannelUnavailable {
                    channel: slot.channel_id,
                    variant,
                });
            }
            let bit = 1u16 << slot.channel_id;
            if seen & bit != 0 {
                return Err(Error::DuplicateChannel {
                    channel: slot.channel_id,
                });
            }
            seen |= bit;
            if slot.is_sequence_end {
                if let Some(first) = end {
                    return Err(Error::MultipleSequenceEnds {
                        first,
                        second: slot.slot_index,
                    });
                }
                end = Some(slot.slot_index);
            }
        }

        let last = (self.slots.len() - 1) as u8;
        match end {
            None => Err(Error::MissingSequenceEnd),
            Some(slot_index) if slot_index != last => {
                Err(Error::MisplacedSequenceEnd { slot_index, last })
            }
            Some(slot_index) => Ok(slot_index),
        }
    }
}

impl<'a> IntoIterator for &'a SequenceTable {
    type Item = &'a ChannelSlot;
    type IntoIter = core::slice::Iter<'a, ChannelSlot>;

    fn into_iter(self) -> Self::IntoIter {
        self.slots.iter()
    }
}
