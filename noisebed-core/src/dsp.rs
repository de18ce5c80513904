//! Generic DSP utilities and math helpers.
//!
//! Design goals:
//! - `no_std` ready (guarded by the crate feature `no-std`)
//! - Math backend selection that works in both `std` and `no_std` contexts
//! - Optional `fast-math` approximations for hot paths
//! - Clean, side-effect free helpers that are easy to test
//!
//! Conventions:
//! - All functions are `#[inline]` where useful to help the optimizer.
//! - Argument and return domains are documented per function.

#![allow(clippy::excessive_precision)]

use core::f32::consts::PI;

use cfg_if::cfg_if;

// ----------------------------- Math backend selection -----------------------------

cfg_if! {
    // libm (C math) in no_std
    if #[cfg(feature = "no-std")] {
        #[inline] #[allow(dead_code)] pub(crate) fn m_sin(x: f32) -> f32 { libm::sinf(x) }
        #[inline] pub(crate) fn m_cos(x: f32) -> f32 { libm::cosf(x) }
        #[inline] pub(crate) fn m_exp(x: f32) -> f32 { libm::expf(x) }
        #[inline] pub(crate) fn m_ln(x: f32) -> f32 { libm::logf(x) }
        #[inline] #[allow(dead_code)] pub(crate) fn m_round(x: f32) -> f32 { libm::roundf(x) }
    // std backend
    } else {
        #[inline] #[allow(dead_code)] pub(crate) fn m_sin(x: f32) -> f32 { x.sin() }
        #[inline] pub(crate) fn m_cos(x: f32) -> f32 { x.cos() }
        #[inline] pub(crate) fn m_exp(x: f32) -> f32 { x.exp() }
        #[inline] pub(crate) fn m_ln(x: f32) -> f32 { x.ln() }
        #[inline] #[allow(dead_code)] pub(crate) fn m_round(x: f32) -> f32 { x.round() }
    }
}

// --------------------------------- Constants -------------------------------------

/// 2π (commonly useful)
pub const TAU: f32 = 2.0 * PI;

/// A very small epsilon used in denormal handling and safe divisions.
pub const EPS_SMALL: f32 = 1.0e-20;

// --------------------------------- Utilities -------------------------------------

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Kill denormal/subnormal values. Returns 0.0 if |x| < EPS_SMALL.
#[inline]
pub fn kill_denormals(x: f32) -> f32 {
    if x.abs() < EPS_SMALL { 0.0 } else { x }
}

// --------------------------------- dB / linear -----------------------------------

/// Convert dB to linear gain: lin = 10^(db/20).
#[inline]
pub fn db_to_lin(db: f32) -> f32 {
    if db <= -120.0 { 0.0 } else { m_exp(0.11512925464970229_f32 * db) } // ln(10)/20 ≈ 0.115129...
}

/// Convert linear gain to dB: db = 20*log10(lin).
#[inline]
pub fn lin_to_db(lin: f32) -> f32 {
    if lin <= EPS_SMALL { -120.0 }
    else { 8.685889638065036553_f32 * m_ln(lin) } // 20/ln(10)
}

// --------------------------------- Fast trig -------------------------------------

/// Fast sine with range reduction into [-π, π] and a 5th-order odd polynomial.
/// Max abs error ~1e-3 when `fast-math` is enabled; falls back to exact otherwise.
/// Plenty for LFO-rate modulators; do not use for audible oscillators.
#[inline]
pub fn fast_sin(x: f32) -> f32 {
    cfg_if! {
        if #[cfg(feature = "fast-math")] {
            let mut xr = x;
            let k = m_round(xr / TAU);
            xr -= k * TAU;

            // sin(x) ≈ x * (a + b x^2 + c x^4)
            let x2 = xr * xr;
            xr * (0.999_979_313_3 + x2 * (-0.166_624_432_0 + x2 * 0.008_308_978_98))
        } else {
            m_sin(x)
        }
    }
}

// --------------------------------- Exponentials / smoothing ----------------------

/// One-pole smoothing coefficient for a time constant `t_ms` (milliseconds).
///
/// The discrete one-pole form: `y[n] += (x[n] - y[n]) * (1 - a)`
/// where `a = exp(-1/(tau * sr))` for first-order lag with time constant `tau`.
///
/// We interpret `t_ms` as the time to reach ~63% (1 - 1/e). Common for parameter smoothing.
#[inline]
pub fn one_pole_coeff_ms(t_ms: f32, sr: f32) -> f32 {
    if t_ms <= 0.0 { return 0.0; }
    let tau = t_ms * 0.001;
    m_exp(-1.0 / (tau * sr))
}

// --------------------------------- Simple meters ---------------------------------

/// Running RMS meter (windowed via exponential smoothing). Call once per sample.
///
/// `alpha` is the smoothing factor in [0,1]; a good choice is
/// `alpha = 1 - one_pole_coeff_ms(50, sr)`.
#[derive(Copy, Clone, Debug)]
pub struct Rms {
    pub alpha: f32,
    state: f32,
}
impl Rms {
    #[inline]
    pub fn new(alpha: f32) -> Self { Self { alpha, state: 0.0 } }

    #[inline]
    pub fn reset(&mut self) { self.state = 0.0; }

    #[inline]
    pub fn tick(&mut self, x: f32) -> f32 {
        let x2 = x * x;
        self.state += self.alpha * (x2 - self.state);
        self.state.sqrt()
    }
}

// --------------------------------- Tests (std only) ------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_lin_roundtrip() {
        for db in [-60.0, -20.0, -6.0, 0.0, 6.0, 12.0, 24.0] {
            let lin = db_to_lin(db);
            let back = lin_to_db(lin);
            assert!((db - back).abs() < 0.1, "db={}, back={}", db, back);
        }
    }

    #[test]
    fn lerp_hits_endpoints() {
        assert_eq!(lerp(-1.0, 3.0, 0.0), -1.0);
        assert_eq!(lerp(-1.0, 3.0, 1.0), 3.0);
        assert!((lerp(0.0, 2.0, 0.5) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn fast_sin_tracks_sin() {
        for i in 0..64 {
            let x = (i as f32) * 0.2 - 6.4;
            assert!((fast_sin(x) - x.sin()).abs() < 2e-3, "x={x}");
        }
    }

    #[test]
    fn rms_decreases_to_zero() {
        let mut rms = Rms::new(1.0 - one_pole_coeff_ms(10.0, 48000.0));
        let mut v = 0.0;
        for _ in 0..10000 {
            v = rms.tick(0.0);
        }
        assert!(v < 1e-3);
    }
}
