//! # Scan Driver
//!
//! Stands in for the converter's conversion clock and interrupt line on the
//! bench. Every scan period it presents fresh levels on the converter
//! inputs, lets the converter run one pass of its sequence and, when the
//! terminal slot completes, services the completion the way the interrupt
//! would.
//!
//! ## Inputs
//!
//! - **A0**: the knob
//! - **A1 and up**: a sawtooth per input, offset by input number, so every
//!   channel is distinguishable in the history
//!
//! ## Controls
//!
//! - **Button A**: stop scanning, or start it again (which clears the
//!   history)
use crate::*;

/// Controller for the bench converter, recording into the global history.
pub type Controller = ConversionController<'static, EmulConverter>;

/// Sawtooth step per scan cycle.
const RAMP_STEP: u16 = 16;
/// Sawtooth offset between neighbouring inputs.
const RAMP_SPACING: u16 = 256;

pub struct Scan {
    adc: Controller,
    knob: Knob,
    button_a: Button,
    ticker: Ticker,
    /// Scan periods elapsed.
    tick: u16,
    /// Button A state on the previous tick.
    was_pressed: bool,
}

impl Scan {
    /// Creates the driver for an already configured and started controller.
    pub fn new(adc: Controller, knob: Knob, button_a: Button, period: Duration) -> Self {
        Self {
            adc,
            knob,
            button_a,
            ticker: Ticker::every(period),
            tick: 0,
            was_pressed: false,
        }
    }

    fn drive_inputs(&mut self, knob: u16) {
        let channels = self.adc.config().variant.channel_count() as ChannelId;
        let ramp = self.tick.wrapping_mul(RAMP_STEP);
        let converter = self.adc.converter_mut();
        converter.set_input(0, knob);
        for ch in 1..channels {
            let level = ramp.wrapping_add(ch as u16 * RAMP_SPACING) & RESULT_MASK;
            converter.set_input(ch, level);
        }
    }

    fn toggle(&mut self) {
        match self.adc.state() {
            State::Scanning => self.adc.stop(),
            _ => {
                if let Err(err) = self.adc.start() {
                    rprintln!("scan: cannot restart: {}", err);
                }
            }
        }
    }

    /// Runs the completion handler until the converter has nothing left
    /// for it.
    fn service(&mut self) {
        loop {
            match self.adc.handle_completion() {
                Completion::Cycle | Completion::Ignored(_) => {}
                Completion::Overrun => rprintln!("scan: converter overrun"),
                Completion::Idle => break,
            }
        }
    }

    /// Main scan loop. Never returns.
    pub async fn run(mut self) -> ! {
        loop {
            let pressed = self.button_a.is_low();
            if pressed && !self.was_pressed {
                self.toggle();
            }
            self.was_pressed = pressed;

            let level = self.knob.measure().await;
            self.drive_inputs(level);
            if self.adc.converter_mut().convert_cycle() {
                self.service();
            }
            self.tick = self.tick.wrapping_add(1);
            self.ticker.next().await;
        }
    }
}
