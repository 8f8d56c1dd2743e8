//! # Analog Input Scanner
//!
//! Continuous multi-channel acquisition for a sequencing SAR converter.
//! The converter walks an ordered sequence of analog inputs on its own,
//! one sample per input per cycle, and raises one completion per cycle.
//! Each completion drains every result into per-channel rings that share a
//! single cycle index, so all channels' histories stay aligned by cycle.
//!
//! ## Pieces
//!
//! - [`SequenceTable`]: which input is converted in which slot, and which
//!   slot ends the sequence, per [`BoardVariant`].
//! - [`ConversionController`]: programs the converter from a table and
//!   starts or stops repeated-sequence scanning.
//! - [`ConversionController::handle_completion`]: the per-cycle interrupt
//!   work.
//! - [`HistoryStore`]: the rings, read by everything else through
//!   [`latest`](HistoryStore::latest), [`window`](HistoryStore::window) and
//!   [`snapshot`](HistoryStore::snapshot).
//!
//! Samples are raw converter counts. Nothing here scales or filters them.
#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod controller;
pub mod converter;
pub mod emul;
pub mod error;
pub mod handler;
pub mod history;
pub mod sequence;

pub use config::{
    AcquisitionConfig, BoardVariant, ChannelId, HoldCycles, ReferenceConfig, SampleTiming,
    HISTORY_DEPTH, MAX_CHANNELS,
};
pub use controller::{ConversionController, State};
pub use converter::{ConversionMode, Converter, Interrupt};
pub use error::{Error, Result};
pub use handler::Completion;
pub use history::{HistoryStore, Snapshot, Window};
pub use sequence::{ChannelSlot, SequenceTable};
