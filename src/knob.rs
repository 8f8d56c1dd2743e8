//! # Knob Input Module
//!
//! Live signal for the bench: the potentiometer on edge pin P2, read
//! through the nRF52's SAADC (Successive Approximation ADC) peripheral.
//! Its reading is presented on input A0 of the scanned converter, so one
//! channel of the history follows a real voltage.
use crate::*;

/// Type alias for a single-channel SAADC configuration.
///
/// Represents the SAADC peripheral configured to read from one analog input channel.
pub type Adc = saadc::Saadc<'static, 1>;

/// Potentiometer read as raw converter counts.
pub struct Knob(Adc);
impl Knob {
    /// Creates a new knob reader and calibrates the ADC.
    ///
    /// # Arguments
    ///
    /// * `adc` - SAADC peripheral configured for 12-bit resolution
    pub async fn new(adc: Adc) -> Self {
        adc.calibrate().await;
        Self(adc)
    }
    /// Samples the knob once.
    ///
    /// # Returns
    ///
    /// A 12-bit count, 0 at ground to 4095 at the supply rail. Small
    /// negative readings near ground are clamped to 0.
    pub async fn measure(&mut self) -> u16 {
        let mut buf = [0];
        self.0.sample(&mut buf).await;
        buf[0].clamp(0, RESULT_MASK as i16) as u16
    }
}
