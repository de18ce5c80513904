//! Rain: four mixed layers over two noise sources.
//!
//! - rumble  : pink noise through a slow one-pole low-pass (coeff 0.05)
//! - hiss    : white noise band-limited to ~200–1000 Hz by a one-pole
//!             low-pass (0.15) followed by a one-pole high-pass (0.03)
//! - droplets: sparse impulses (p = 3e-4 per sample) with a ×0.9/sample decay
//!             envelope, remodulated by fresh white noise
//! - wind    : 0.3 Hz sine mapped to [0.8, 1.0], multiplying the whole mix

use crate::graph::Generator;
use crate::noise::PinkNoise;
use crate::nodes::Lfo;
use noisebed_core::envelopes::DecayEnv;
use noisebed_core::filters::OnePole;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

const RUMBLE_ALPHA: f32 = 0.05;
const HISS_LP_ALPHA: f32 = 0.15;
const HISS_HP_ALPHA: f32 = 0.03;
const DROPLET_PROB: f32 = 0.0003;
const DROPLET_DECAY: f32 = 0.9;
const WIND_HZ: f32 = 0.3;

#[derive(Clone, Debug)]
pub struct RainGen {
    sr: f32,
    rng: SmallRng,
    pink: PinkNoise,
    rumble: OnePole,
    hiss_lp: OnePole,
    hiss_hp: OnePole,
    droplet: DecayEnv,
    wind: Lfo,
}

impl RainGen {
    pub fn new(sr: f32) -> Self {
        Self::with_rngs(SmallRng::from_entropy(), PinkNoise::new(), sr)
    }

    pub fn seeded(seed: u64, sr: f32) -> Self {
        Self::with_rngs(SmallRng::seed_from_u64(seed), PinkNoise::seeded(seed ^ 0x9e37), sr)
    }

    fn with_rngs(rng: SmallRng, pink: PinkNoise, sr: f32) -> Self {
        Self {
            sr: sr.max(1.0),
            rng,
            pink,
            rumble: OnePole::new(RUMBLE_ALPHA),
            hiss_lp: OnePole::new(HISS_LP_ALPHA),
            hiss_hp: OnePole::new(HISS_HP_ALPHA),
            droplet: DecayEnv::new(DROPLET_DECAY),
            wind: Lfo::sine(WIND_HZ),
        }
    }
}

impl Generator for RainGen {
    fn reset(&mut self, sr: f32) {
        self.sr = sr.max(1.0);
        self.rumble.reset();
        self.hiss_lp.reset();
        self.hiss_hp.reset();
        self.wind.reset_phase();
    }

    #[inline]
    fn next(&mut self) -> f32 {
        // Low rumble from pink noise.
        let rumble = self.rumble.process(self.pink.next());

        // Hiss: LP then HP approximates a 200–1000 Hz band.
        let w = self.rng.gen::<f32>() * 2.0 - 1.0;
        let lp = self.hiss_lp.process(w);
        let hiss = lp - self.hiss_hp.process(lp);

        // Sparse droplets, decaying and remodulated by fresh white noise.
        if self.rng.gen::<f32>() < DROPLET_PROB {
            let amp = self.rng.gen_range(0.3..0.6);
            self.droplet.trigger(amp);
        }
        let mod_noise = self.rng.gen::<f32>() * 2.0 - 1.0;
        let droplet = self.droplet.next() * mod_noise * 0.5;

        // Slow wind swell over the whole mix.
        let wind = 0.9 + 0.1 * self.wind.next_norm(self.sr);

        (rumble * 5.0 * 0.70 + hiss * 0.20 + droplet * 0.10) * 2.0 * wind
    }
}

// ------------------------------------ Tests --------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rain_is_audible_and_bounded() {
        let mut gen = RainGen::seeded(7, 48_000.0);
        let n = 200_000;
        let mut sum_sq = 0.0f64;
        let mut peak = 0.0f32;
        for _ in 0..n {
            let s = gen.next();
            peak = peak.max(s.abs());
            sum_sq += (s * s) as f64;
        }
        let rms = (sum_sq / n as f64).sqrt();
        assert!(rms > 0.01, "rms={rms}");
        assert!(peak < 4.0, "peak={peak}");
    }

    #[test]
    fn rain_has_no_dc_bias() {
        let mut gen = RainGen::seeded(8, 48_000.0);
        let n = 500_000;
        let mut sum = 0.0f64;
        for _ in 0..n {
            sum += gen.next() as f64;
        }
        let mean = sum / n as f64;
        assert!(mean.abs() < 0.05, "mean={mean}");
    }

    #[test]
    fn rain_rumble_dominates_spectrum_low_end() {
        // The 0.05 low-pass over pink driven at ×5.0 gain should make slow
        // block averages move more than white noise block averages would.
        let mut gen = RainGen::seeded(9, 48_000.0);
        let block = 4800;
        let mut means = Vec::new();
        for _ in 0..40 {
            let mut acc = 0.0f64;
            for _ in 0..block {
                acc += gen.next() as f64;
            }
            means.push(acc / block as f64);
        }
        let spread = means
            .iter()
            .cloned()
            .fold(f64::MIN, f64::max)
            - means.iter().cloned().fold(f64::MAX, f64::min);
        assert!(spread > 1e-4, "spread={spread}");
    }
}
