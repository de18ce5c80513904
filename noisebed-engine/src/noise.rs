//! The three classical noise colors: white, pink, brown.
//!
//! Each generator is a small struct owning its RNG and filter state, stepped
//! one sample at a time through the [`Generator`](crate::graph::Generator)
//! trait. Determinism holds only up to the random source, so the tests below
//! check distributions and spectra, never exact sample values.
//!
//! Loudness: pink and brown are scaled ×3.5 to sit at roughly the same
//! perceived level as white, so switching beds does not need a gain ride.

use crate::graph::Generator;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Gain applied to pink/brown so they match white-noise loudness.
const LOUDNESS_MATCH: f32 = 3.5;

#[inline]
fn bipolar(rng: &mut SmallRng) -> f32 {
    rng.gen::<f32>() * 2.0 - 1.0
}

// --------------------------------- White -----------------------------------------

/// Uniform random samples in [-1, 1].
#[derive(Clone, Debug)]
pub struct WhiteNoise {
    rng: SmallRng,
}

impl WhiteNoise {
    pub fn new() -> Self {
        Self { rng: SmallRng::from_entropy() }
    }

    pub fn seeded(seed: u64) -> Self {
        Self { rng: SmallRng::seed_from_u64(seed) }
    }
}

impl Default for WhiteNoise {
    fn default() -> Self { Self::new() }
}

impl Generator for WhiteNoise {
    #[inline]
    fn reset(&mut self, _sr: f32) {}

    #[inline]
    fn next(&mut self) -> f32 {
        bipolar(&mut self.rng)
    }
}

// --------------------------------- Pink ------------------------------------------

/// Voss–McCartney pink noise with 16 persistent rows.
///
/// Per sample: advance a 16-bit row counter; the trailing-zero count of the
/// new counter value selects which row to refresh (row 0 when the counter
/// wraps to 0), and the running sum is updated incrementally so the per-sample
/// cost stays flat. Output is `(sum + fresh white) / 17`, loudness-matched.
#[derive(Clone, Debug)]
pub struct PinkNoise {
    rng: SmallRng,
    rows: [f32; 16],
    running_sum: f32,
    counter: u16,
}

impl PinkNoise {
    pub fn new() -> Self {
        Self::with_rng(SmallRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(SmallRng::seed_from_u64(seed))
    }

    fn with_rng(mut rng: SmallRng) -> Self {
        let mut rows = [0.0f32; 16];
        let mut running_sum = 0.0;
        for row in &mut rows {
            *row = bipolar(&mut rng);
            running_sum += *row;
        }
        Self { rng, rows, running_sum, counter: 0 }
    }
}

impl Default for PinkNoise {
    fn default() -> Self { Self::new() }
}

impl Generator for PinkNoise {
    #[inline]
    fn reset(&mut self, _sr: f32) {}

    #[inline]
    fn next(&mut self) -> f32 {
        self.counter = self.counter.wrapping_add(1);
        let z = if self.counter == 0 { 0 } else { self.counter.trailing_zeros() as usize };
        if z < 16 {
            let fresh = bipolar(&mut self.rng);
            self.running_sum += fresh - self.rows[z];
            self.rows[z] = fresh;
        }
        let white = bipolar(&mut self.rng);
        (self.running_sum + white) / 17.0 * LOUDNESS_MATCH
    }
}

// --------------------------------- Brown -----------------------------------------

/// Brownian (red) noise: a leaky integrator over white noise.
///
/// `out = (out + 0.02·white) / 1.02` — the 1.02 normalization bounds the walk
/// away from drift and clipping, so |out| never exceeds 1 and the scaled
/// sample never exceeds the loudness-match gain.
#[derive(Clone, Debug)]
pub struct BrownNoise {
    rng: SmallRng,
    last: f32,
}

impl BrownNoise {
    pub fn new() -> Self {
        Self { rng: SmallRng::from_entropy(), last: 0.0 }
    }

    pub fn seeded(seed: u64) -> Self {
        Self { rng: SmallRng::seed_from_u64(seed), last: 0.0 }
    }
}

impl Default for BrownNoise {
    fn default() -> Self { Self::new() }
}

impl Generator for BrownNoise {
    #[inline]
    fn reset(&mut self, _sr: f32) {}

    #[inline]
    fn next(&mut self) -> f32 {
        self.last = (self.last + 0.02 * bipolar(&mut self.rng)) / 1.02;
        self.last * LOUDNESS_MATCH
    }
}

// ------------------------------------ Tests --------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn white_is_bounded_and_centered() {
        let mut gen = WhiteNoise::seeded(1);
        let n = 100_000;
        let mut sum = 0.0f64;
        for _ in 0..n {
            let s = gen.next();
            assert!((-1.0..=1.0).contains(&s), "s={s}");
            sum += s as f64;
        }
        let mean = sum / n as f64;
        assert!(mean.abs() < 0.02, "mean={mean}");
    }

    #[test]
    fn pink_is_centered_and_sane() {
        let mut gen = PinkNoise::seeded(2);
        let n = 100_000;
        let mut sum = 0.0f64;
        let mut peak = 0.0f32;
        for _ in 0..n {
            let s = gen.next();
            peak = peak.max(s.abs());
            sum += s as f64;
        }
        assert!((sum / n as f64).abs() < 0.15);
        assert!(peak <= 3.5, "peak={peak}");
        assert!(peak > 0.1, "peak={peak}");
    }

    #[test]
    fn pink_spectrum_falls_about_3db_per_octave() {
        use rustfft::num_complex::Complex;
        use rustfft::FftPlanner;

        let n = 1 << 16;
        let mut gen = PinkNoise::seeded(3);
        let mut buf: Vec<Complex<f32>> = (0..n)
            .map(|_| Complex { re: gen.next(), im: 0.0 })
            .collect();

        FftPlanner::new().plan_fft_forward(n).process(&mut buf);

        // Mean power per bin inside successive octave bands. With pink noise
        // each step down in octave roughly doubles the per-bin power.
        let octaves = [128..256usize, 256..512, 512..1024, 1024..2048, 2048..4096];
        let band_power: Vec<f32> = octaves
            .iter()
            .map(|r| {
                let p: f32 = buf[r.clone()].iter().map(|c| c.norm_sqr()).sum();
                p / r.len() as f32
            })
            .collect();

        for w in band_power.windows(2) {
            let ratio = w[0] / w[1];
            // −3 dB/octave nominal; Voss–McCartney is approximate, allow ~1–5.5 dB.
            assert!((1.25..=3.6).contains(&ratio), "octave ratio {ratio}");
        }
        let overall = band_power[0] / band_power[4];
        assert!(overall > 8.0 && overall < 45.0, "overall={overall}");
    }

    #[test]
    fn brown_is_correlated_and_bounded() {
        let mut gen = BrownNoise::seeded(4);
        let n = 1_000_000;
        let mut prev = gen.next();
        let mut dot = 0.0f64;
        let mut norm = 0.0f64;
        for _ in 1..n {
            let s = gen.next();
            assert!(s.abs() <= 3.5, "s={s}");
            dot += (prev * s) as f64;
            norm += (prev * prev) as f64;
            prev = s;
        }
        let lag1 = dot / norm;
        assert!(lag1 > 0.95, "lag-1 autocorrelation {lag1}");
    }
}
