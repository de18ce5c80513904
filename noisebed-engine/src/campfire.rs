//! Campfire: multi-band resonant pop synthesis with organic randomization.
//!
//! Layers, all modulated by a 0.2 Hz breathing LFO:
//! - rumble : white noise through a one-pole whose pole tracks `rumble_smooth`
//! - texture: squared-sign noise (`n·|n|`) through a `texture_smooth` one-pole
//! - sizzle : the high residue of the texture path, gated to the LFO peaks
//! - woody pops: sparse impulses ("dust" plus countdown-spaced bursts) exciting
//!   three 2-pole resonators whose resonance and center frequency are
//!   re-randomized on every impulse
//! - snaps  : isolated unfiltered clicks
//!
//! Event probabilities scale with 1/sample-rate so perceived density does not
//! change when the device renegotiates the rate; the test at the bottom pins
//! that property.
//!
//! The tuning knobs are a private [`CampfireParams`] snapshot copied in at
//! construction/retune time — the render thread never reads the shared store.

use crate::graph::Generator;
use crate::nodes::Lfo;
use crate::params::CampfireParams;
use noisebed_core::filters::{OnePole, Resonator};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

const BREATH_HZ: f32 = 0.2;
const BREATH_DEPTH: f32 = 0.15; // intensity swings over [0.85, 1.15]

// Per-band impulse gains and resonance jitter spans.
const BAND_GAIN: [f32; 3] = [0.4, 0.5, 0.3];
const BAND_JITTER: [f32; 3] = [0.03, 0.05, 0.02];
const BAND_MIX: [f32; 3] = [0.35, 0.40, 0.25];

const BURST_GAP_MIN: u32 = 500;
const BURST_GAP_MAX: u32 = 2000;

#[derive(Clone, Debug)]
pub struct CampfireGen {
    sr: f32,
    params: CampfireParams,
    rng: SmallRng,
    breath: Lfo,
    rumble: OnePole,
    texture: OnePole,
    bands: [Resonator; 3],
    burst_countdown: u32,
    bursts_left: u8,
    strikes: u64,
}

impl CampfireGen {
    pub fn new(params: &CampfireParams, sr: f32) -> Self {
        Self::with_rng(SmallRng::from_entropy(), params, sr)
    }

    pub fn seeded(seed: u64, params: &CampfireParams, sr: f32) -> Self {
        Self::with_rng(SmallRng::seed_from_u64(seed), params, sr)
    }

    fn with_rng(rng: SmallRng, params: &CampfireParams, sr: f32) -> Self {
        let params = params.clamped();
        let mut gen = Self {
            sr: sr.max(1.0),
            params,
            rng,
            breath: Lfo::sine(BREATH_HZ),
            rumble: OnePole::new(0.0),
            texture: OnePole::new(0.0),
            bands: [
                Resonator::new(BAND_GAIN[0]),
                Resonator::new(BAND_GAIN[1]),
                Resonator::new(BAND_GAIN[2]),
            ],
            burst_countdown: 0,
            bursts_left: 0,
            strikes: 0,
        };
        gen.update_poles();
        gen
    }

    /// Apply a new tuning snapshot in place. Filter and resonator ring state
    /// survives, so live retuning is click-free.
    pub fn retune(&mut self, params: &CampfireParams) {
        self.params = params.clamped();
        self.update_poles();
    }

    /// Number of woody impulses fired so far (dust + burst). Used to verify
    /// the sample-rate invariance of event density.
    pub fn strike_count(&self) -> u64 {
        self.strikes
    }

    fn update_poles(&mut self) {
        // Both knobs map [0,1] onto a feedback pole; OnePole wants `1 - pole`.
        let rumble_pole = 0.95 + self.params.rumble_smooth * 0.049;
        let texture_pole = 0.4 + self.params.texture_smooth * 0.59;
        self.rumble.set_alpha(1.0 - rumble_pole);
        self.texture.set_alpha(1.0 - texture_pole);
    }

    /// Fire one woody impulse: pick its amplitude (random sign) and
    /// re-randomize all three resonator configurations.
    fn strike(&mut self, amp_lo: f32, amp_hi: f32) -> f32 {
        self.strikes += 1;
        let base_r = 0.80 + self.params.resonance * 0.19;
        let centers = [self.params.freq_low, self.params.freq_mid, self.params.freq_high];
        for i in 0..3 {
            let r = (base_r + self.rng.gen_range(-BAND_JITTER[i]..BAND_JITTER[i]))
                .clamp(0.8, 0.99);
            let mult = self.rng.gen_range(0.85..1.15);
            self.bands[i].tune(centers[i] * mult, r, self.sr);
        }
        let amp = self.rng.gen_range(amp_lo..amp_hi);
        if self.rng.gen::<bool>() { amp } else { -amp }
    }

    #[inline]
    fn burst_gap(&mut self) -> u32 {
        self.rng.gen_range(BURST_GAP_MIN..BURST_GAP_MAX)
    }
}

impl Generator for CampfireGen {
    fn reset(&mut self, sr: f32) {
        self.sr = sr.max(1.0);
        self.rumble.reset();
        self.texture.reset();
        for b in &mut self.bands {
            b.reset();
        }
        self.breath.reset_phase();
        self.burst_countdown = 0;
        self.bursts_left = 0;
    }

    fn next(&mut self) -> f32 {
        let p = self.params;
        let intensity = 1.0 + BREATH_DEPTH * self.breath.next_norm(self.sr);

        // Rumble: low-passed white, breathing with the LFO.
        let w = self.rng.gen::<f32>() * 2.0 - 1.0;
        let rumble = self.rumble.process(w) * 3.5 * intensity;

        // Texture: squared-sign noise emphasizes crackly asymmetry.
        let n = self.rng.gen::<f32>() * 2.0 - 1.0;
        let tex_lp = self.texture.process(n * n.abs());
        let texture = tex_lp * (0.8 + 0.2 * intensity);

        // Sizzle: the residue above the texture low-pass, audible only
        // near the LFO peaks.
        let sizzle = (n - tex_lp) * 0.5 * (intensity - 0.8).max(0.0);

        // Woody pops: steady dust plus occasional countdown-spaced bursts.
        let mut impulse = 0.0;
        let dust_prob = p.woody_density * 10.0 / self.sr;
        if self.rng.gen::<f32>() < dust_prob {
            impulse += self.strike(0.3, 0.9);
            if self.rng.gen::<f32>() < p.burst_prob {
                self.bursts_left = self.rng.gen_range(2..=3);
                self.burst_countdown = self.burst_gap();
            }
        }
        if self.bursts_left > 0 {
            if self.burst_countdown == 0 {
                impulse += self.strike(0.2, 0.7);
                self.bursts_left -= 1;
                self.burst_countdown = self.burst_gap();
            } else {
                self.burst_countdown -= 1;
            }
        }

        let mut woody = 0.0;
        for i in 0..3 {
            woody += BAND_MIX[i] * self.bands[i].process(impulse);
        }

        // Sharp snaps: isolated, unfiltered.
        let snap_prob = p.snap_density * 5.0 / self.sr;
        let snap = if self.rng.gen::<f32>() < snap_prob {
            let amp = self.rng.gen_range(0.4..0.8);
            if self.rng.gen::<bool>() { amp } else { -amp }
        } else {
            0.0
        };

        rumble * p.rumble_mix
            + texture * p.texture_mix
            + sizzle * (p.texture_mix * 0.5)
            + woody * p.woody_level
            + snap * p.snap_level
    }
}

// ------------------------------------ Tests --------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn dense_params() -> CampfireParams {
        CampfireParams {
            woody_density: 0.8,
            burst_prob: 0.3,
            ..CampfireParams::default()
        }
    }

    #[test]
    fn output_is_bounded_and_audible() {
        let mut gen = CampfireGen::seeded(11, &CampfireParams::default(), 48_000.0);
        let n = 200_000;
        let mut peak = 0.0f32;
        let mut sum_sq = 0.0f64;
        for _ in 0..n {
            let s = gen.next();
            peak = peak.max(s.abs());
            sum_sq += (s * s) as f64;
        }
        assert!(peak < 8.0, "peak={peak}");
        assert!((sum_sq / n as f64).sqrt() > 0.01);
    }

    #[test]
    fn event_density_is_sample_rate_invariant() {
        // Same wall-clock duration at two rates; events/second should agree.
        let seconds = 30.0;
        let mut per_sec = [0.0f64; 2];
        for (i, sr) in [24_000.0f32, 48_000.0].iter().enumerate() {
            let mut gen = CampfireGen::seeded(12, &dense_params(), *sr);
            for _ in 0..((*sr * seconds) as usize) {
                gen.next();
            }
            per_sec[i] = gen.strike_count() as f64 / seconds as f64;
        }
        assert!(per_sec[0] > 1.0, "too few events: {per_sec:?}");
        let ratio = per_sec[0] / per_sec[1];
        assert!((0.7..1.4).contains(&ratio), "per-second rates {per_sec:?}");
    }

    #[test]
    fn zero_densities_mean_no_strikes() {
        let params = CampfireParams {
            woody_density: 0.0,
            snap_density: 0.0,
            ..CampfireParams::default()
        };
        let mut gen = CampfireGen::seeded(13, &params, 48_000.0);
        for _ in 0..100_000 {
            gen.next();
        }
        assert_eq!(gen.strike_count(), 0);
    }

    #[test]
    fn retune_keeps_running_state() {
        let mut gen = CampfireGen::seeded(14, &dense_params(), 48_000.0);
        for _ in 0..50_000 {
            gen.next();
        }
        let strikes_before = gen.strike_count();
        assert!(strikes_before > 0);
        gen.retune(&CampfireParams { woody_level: 0.9, ..dense_params() });
        // A retune is not a reset: counters and ring state survive.
        assert_eq!(gen.strike_count(), strikes_before);
        let s = gen.next();
        assert!(s.is_finite());
    }

    #[test]
    fn bursts_add_events_over_dust_alone() {
        let seconds = 40.0;
        let sr = 24_000.0;
        let base = CampfireParams { burst_prob: 0.0, ..dense_params() };
        let bursty = CampfireParams { burst_prob: 1.0, ..dense_params() };

        let mut a = CampfireGen::seeded(15, &base, sr);
        let mut b = CampfireGen::seeded(15, &bursty, sr);
        for _ in 0..((sr * seconds) as usize) {
            a.next();
            b.next();
        }
        assert!(
            b.strike_count() > a.strike_count(),
            "bursty={} dust-only={}",
            b.strike_count(),
            a.strike_count()
        );
    }
}
