//! Envelope and ramp primitives for gating, fades and parameter slewing.
//!
//! Provided:
//! - `DecayEnv`        : multiplicative per-sample decay for sparse impulses
//! - `LinearFade`      : fixed-length linear ramp between two gain values
//! - `OnePoleSmoother` : one-pole slew for control signals (gain, volume)
//!
//! All of these are `no_std` friendly and avoid heap allocations.
//! Each exposes a `next()`/`process()` style per-sample tick.

use crate::dsp::one_pole_coeff_ms;
use core::fmt::Debug;

// ------------------------------- Decay envelope ----------------------------------

/// Impulse decay envelope: `level *= factor` once per sample.
///
/// `trigger(amp)` restarts the envelope at `amp`; with `factor = 0.9` the
/// level falls below 1e-3 of the trigger amplitude in ~66 samples.
#[derive(Copy, Clone, Debug)]
pub struct DecayEnv {
    factor: f32,
    level: f32,
}

impl DecayEnv {
    #[inline]
    pub fn new(factor: f32) -> Self {
        Self { factor: factor.clamp(0.0, 1.0), level: 0.0 }
    }

    #[inline]
    pub fn trigger(&mut self, amp: f32) { self.level = amp; }

    /// Advance one sample and return the level *before* the decay step, so a
    /// fresh trigger is audible at full amplitude on the same sample.
    #[inline]
    pub fn next(&mut self) -> f32 {
        let out = self.level;
        self.level *= self.factor;
        if self.level < 1e-9 { self.level = 0.0; }
        out
    }

    #[inline] pub fn value(&self) -> f32 { self.level }
    #[inline] pub fn is_quiet(&self) -> bool { self.level == 0.0 }
}

// -------------------------------- Linear fade ------------------------------------

/// Fixed-length linear ramp between two gains. Used for crossfades and the
/// stop fade; `done()` reports when the target is reached.
#[derive(Copy, Clone, Debug)]
pub struct LinearFade {
    current: f32,
    target: f32,
    step: f32,
}

impl LinearFade {
    /// Start at `from`, holding it until `fade_to` is called.
    #[inline]
    pub fn new(from: f32) -> Self {
        Self { current: from, target: from, step: 0.0 }
    }

    /// Ramp from the current value to `target` over `samples` steps.
    #[inline]
    pub fn fade_to(&mut self, target: f32, samples: usize) {
        self.target = target;
        if samples == 0 {
            self.current = target;
            self.step = 0.0;
        } else {
            self.step = (target - self.current) / samples as f32;
        }
    }

    /// Jump immediately, cancelling any ramp in progress.
    #[inline]
    pub fn snap_to(&mut self, value: f32) {
        self.current = value;
        self.target = value;
        self.step = 0.0;
    }

    /// Advance one sample and return the gain for this sample.
    #[inline]
    pub fn next(&mut self) -> f32 {
        if self.step != 0.0 {
            self.current += self.step;
            let overshot = (self.step > 0.0 && self.current >= self.target)
                || (self.step < 0.0 && self.current <= self.target);
            if overshot {
                self.current = self.target;
                self.step = 0.0;
            }
        }
        self.current
    }

    #[inline] pub fn value(&self) -> f32 { self.current }
    #[inline] pub fn done(&self) -> bool { self.step == 0.0 }
}

// ------------------------------ One-pole smoother --------------------------------

/// One-pole parameter smoother: `y += (x - y) * (1 - a)`, with `a = exp(-1/(tau*sr))`.
#[derive(Copy, Clone, Debug)]
pub struct OnePoleSmoother {
    a: f32, // alpha (closer to 1 → slower)
    y: f32,
}

impl OnePoleSmoother {
    #[inline]
    pub fn new_ms(t_ms: f32, sr: f32) -> Self {
        Self { a: one_pole_coeff_ms(t_ms, sr), y: 0.0 }
    }

    #[inline]
    pub fn set_time_ms(&mut self, t_ms: f32, sr: f32) {
        self.a = one_pole_coeff_ms(t_ms, sr);
    }

    #[inline]
    pub fn reset(&mut self, y0: f32) { self.y = y0; }

    #[inline]
    pub fn process(&mut self, x: f32) -> f32 {
        self.y += (x - self.y) * (1.0 - self.a);
        self.y
    }

    #[inline] pub fn value(&self) -> f32 { self.y }
}

// ------------------------------------ Tests --------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decay_env_dies_out() {
        let mut env = DecayEnv::new(0.9);
        env.trigger(0.5);
        assert!((env.next() - 0.5).abs() < 1e-6);
        for _ in 0..500 {
            env.next();
        }
        assert!(env.is_quiet());
    }

    #[test]
    fn decay_env_retrigger_wins() {
        let mut env = DecayEnv::new(0.9);
        env.trigger(0.3);
        for _ in 0..10 { env.next(); }
        env.trigger(0.6);
        assert!((env.next() - 0.6).abs() < 1e-6);
    }

    #[test]
    fn linear_fade_reaches_target() {
        let mut fade = LinearFade::new(1.0);
        fade.fade_to(0.0, 10);
        let mut last = 1.0;
        for _ in 0..10 {
            let v = fade.next();
            assert!(v <= last + 1e-6);
            last = v;
        }
        assert!(fade.done());
        assert_eq!(fade.value(), 0.0);
        // further ticks hold
        assert_eq!(fade.next(), 0.0);
    }

    #[test]
    fn linear_fade_midpoint_is_half() {
        let mut fade = LinearFade::new(0.0);
        fade.fade_to(1.0, 100);
        let mut v = 0.0;
        for _ in 0..50 { v = fade.next(); }
        assert!((v - 0.5).abs() < 0.02, "v={v}");
    }

    #[test]
    fn slew_moves_towards_target() {
        let sr = 48000.0;
        let mut s = OnePoleSmoother::new_ms(50.0, sr);
        for _ in 0..(sr as usize) { s.process(1.0); }
        assert!(s.value() > 0.9);
    }
}
