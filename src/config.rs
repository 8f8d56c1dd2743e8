//! # Acquisition Configuration
//!
//! Process-wide settings chosen once at startup: which board variant is
//! being scanned, the converter's sample/hold timing and the reference
//! pairing used by every slot.
//!
//! The board variant is a build-time choice. Building with the
//! `twelve-channel` feature selects the 12-input board, otherwise the
//! 16-input board is assumed.

use core::fmt;

/// Number of samples kept per channel.
pub const HISTORY_DEPTH: usize = 8;

/// Largest number of analog inputs any board variant exposes.
pub const MAX_CHANNELS: usize = 16;

/// Number of conversion memory slots in the converter.
pub const MEMORY_SLOTS: usize = 32;

/// Converter results are 12 bits wide, stored in a 16-bit cell.
pub const RESULT_MASK: u16 = 0x0fff;

/// Logical analog input identifier, `A0` through `A15`.
pub type ChannelId = u8;

/// Board variant, selecting which analog inputs are electrically available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardVariant {
    /// Inputs `A0`–`A11`.
    TwelveChannel,
    /// Inputs `A0`–`A15`.
    SixteenChannel,
}

impl BoardVariant {
    /// The variant this firmware was built for.
    #[cfg(feature = "twelve-channel")]
    pub const ACTIVE: Self = Self::TwelveChannel;
    /// The variant this firmware was built for.
    #[cfg(not(feature = "twelve-channel"))]
    pub const ACTIVE: Self = Self::SixteenChannel;

    /// Number of analog inputs scanned on this variant.
    pub const fn channel_count(self) -> usize {
        match self {
            Self::TwelveChannel => 12,
            Self::SixteenChannel => 16,
        }
    }

    /// Whether input `channel` is routed to the converter on this variant.
    pub const fn is_available(self, channel: ChannelId) -> bool {
        (channel as usize) < self.channel_count()
    }
}

impl fmt::Display for BoardVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-channel", self.channel_count())
    }
}

/// Reference voltage pairing for a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferenceConfig {
    /// `V+ = AVCC`, `V- = AVSS`.
    #[default]
    AvccAvss,
}

/// Sample/hold time, in converter clock cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldCycles {
    Cycles4,
    Cycles8,
    Cycles16,
    Cycles32,
    Cycles64,
    Cycles96,
    Cycles128,
    Cycles192,
    Cycles256,
    Cycles384,
    Cycles512,
}

impl HoldCycles {
    pub const fn cycles(self) -> u32 {
        match self {
            Self::Cycles4 => 4,
            Self::Cycles8 => 8,
            Self::Cycles16 => 16,
            Self::Cycles32 => 32,
            Self::Cycles64 => 64,
            Self::Cycles96 => 96,
            Self::Cycles128 => 128,
            Self::Cycles192 => 192,
            Self::Cycles256 => 256,
            Self::Cycles384 => 384,
            Self::Cycles512 => 512,
        }
    }
}

/// Sample/hold timing for the converter's two slot groups.
///
/// Memory slots 0–7 and 24–31 form the low group and use `hold_low`.
/// Slots 8–23 form the high group and use `hold_high`. The analog front
/// end on the low inputs settles slower, hence the longer default hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleTiming {
    pub hold_low: HoldCycles,
    pub hold_high: HoldCycles,
    /// Convert the whole sequence from a single trigger, repeating it in
    /// repeated-sequence mode.
    pub multiple_samples: bool,
}

impl SampleTiming {
    /// Hold time applied to memory slot `slot`.
    pub const fn hold_for(&self, slot: u8) -> HoldCycles {
        match slot {
            8..=23 => self.hold_high,
            _ => self.hold_low,
        }
    }
}

impl Default for SampleTiming {
    fn default() -> Self {
        Self {
            hold_low: HoldCycles::Cycles16,
            hold_high: HoldCycles::Cycles4,
            multiple_samples: true,
        }
    }
}

/// Everything the conversion controller needs besides the sequence table.
///
/// Fixed once scanning starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcquisitionConfig {
    pub variant: BoardVariant,
    pub timing: SampleTiming,
}

impl AcquisitionConfig {
    pub fn for_variant(variant: BoardVariant) -> Self {
        Self {
            variant,
            ..Self::default()
        }
    }
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            variant: BoardVariant::ACTIVE,
            timing: SampleTiming::default(),
        }
    }
}
