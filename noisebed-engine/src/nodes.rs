//! Modulation building blocks shared by the noise generators.
//!
//! Everything here is zero-allocation and cheap per sample; generators embed
//! these by value.

use noisebed_core::dsp::{fast_sin, TAU};

/// Free-running sine LFO. Frequency is **Hz**; `next_*` expects the current
/// **sample rate** when stepping.
///
/// Not anti-aliased — this is for sub-audio modulation (breathing, wind),
/// not audible oscillation.
#[derive(Copy, Clone, Debug)]
pub struct Lfo {
    phase: f32, // [0,1)
    rate: f32,  // Hz
}

impl Lfo {
    #[inline]
    pub fn sine(rate_hz: f32) -> Self {
        Self { phase: 0.0, rate: rate_hz.max(0.0) }
    }

    #[inline]
    pub fn set_rate(&mut self, hz: f32) { self.rate = hz.max(0.0); }

    #[inline]
    pub fn reset_phase(&mut self) { self.phase = 0.0; }

    /// Next LFO value in **[-1,1]**.
    #[inline]
    pub fn next_norm(&mut self, sr: f32) -> f32 {
        self.phase = (self.phase + self.rate / sr.max(1.0)) % 1.0;
        fast_sin(TAU * self.phase)
    }

    /// Next LFO value remapped to **[0,1]**.
    #[inline]
    pub fn next01(&mut self, sr: f32) -> f32 {
        0.5 * (self.next_norm(sr) + 1.0)
    }
}

// ------------------------------------ Tests --------------------------------------
