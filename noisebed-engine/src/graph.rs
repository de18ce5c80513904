//! Realtime synthesis core: the `Generator` trait, the `Engine` wrapper, and
//! the tagged union over the five noise algorithms.
//!
//! Design goals
//! - No dynamic allocations in the audio thread
//! - SR changes handled lazily (if the host reconfigures), with cheap branching
//! - One state struct per algorithm, each independently testable; the
//!   `NoiseGen` enum is the only place that knows all five

use crate::campfire::CampfireGen;
use crate::noise::{BrownNoise, PinkNoise, WhiteNoise};
use crate::params::{CampfireParams, GenConfig, NoiseType};
use crate::rain::RainGen;

/// Anything that can generate one sample at a time.
pub trait Generator {
    /// Called when the engine is (re)initialized or when the sample rate changes.
    fn reset(&mut self, sr: f32);

    /// Generate the next mono sample. Implementations should assume the sample
    /// rate has been communicated via `reset`.
    fn next(&mut self) -> f32;
}

/// Lightweight realtime engine that owns a generator.
///
/// The audio callback should call `next(sr)` for every output sample. If the
/// `sr` reported by the host changes, the engine will call `reset(sr)` on the
/// inner generator once and continue.
pub struct Engine<G: Generator> {
    sr: f32,
    gen: G,
}

impl<G: Generator> Engine<G> {
    /// Construct with an already-configured generator, communicating `sr`.
    #[inline]
    pub fn new(mut gen: G, sr: f32) -> Self {
        let sr = sr.max(1.0);
        gen.reset(sr);
        Self { sr, gen }
    }

    /// Produce **one** mono sample at the given sample rate.
    #[inline]
    pub fn next(&mut self, sr: f32) -> f32 {
        if sr != self.sr {
            self.sr = sr;
            self.gen.reset(sr);
        }
        self.gen.next()
    }

    /// Return the engine's current sample rate.
    #[inline] pub fn sample_rate(&self) -> f32 { self.sr }

    /// Get a mutable reference to the inner generator for live tweaks.
    #[inline]
    pub fn inner_mut(&mut self) -> &mut G { &mut self.gen }

    #[inline]
    pub fn inner(&self) -> &G { &self.gen }
}

/// One state struct per algorithm, as a tagged union. Cloning is cheap enough
/// for control-context bookkeeping; background builds construct their own
/// instance from a [`GenConfig`] snapshot instead of touching this one.
#[derive(Clone, Debug)]
pub enum NoiseGen {
    White(WhiteNoise),
    Pink(PinkNoise),
    Brown(BrownNoise),
    Rain(RainGen),
    Campfire(CampfireGen),
}

impl NoiseGen {
    pub fn new(ty: NoiseType, campfire: &CampfireParams, sr: f32) -> Self {
        match ty {
            NoiseType::White => Self::White(WhiteNoise::new()),
            NoiseType::Pink => Self::Pink(PinkNoise::new()),
            NoiseType::Brown => Self::Brown(BrownNoise::new()),
            NoiseType::Rain => Self::Rain(RainGen::new(sr)),
            NoiseType::Campfire => Self::Campfire(CampfireGen::new(campfire, sr)),
        }
    }

    /// Deterministic construction for tests and offline renders.
    pub fn seeded(seed: u64, ty: NoiseType, campfire: &CampfireParams, sr: f32) -> Self {
        match ty {
            NoiseType::White => Self::White(WhiteNoise::seeded(seed)),
            NoiseType::Pink => Self::Pink(PinkNoise::seeded(seed)),
            NoiseType::Brown => Self::Brown(BrownNoise::seeded(seed)),
            NoiseType::Rain => Self::Rain(RainGen::seeded(seed, sr)),
            NoiseType::Campfire => Self::Campfire(CampfireGen::seeded(seed, campfire, sr)),
        }
    }

    pub fn from_config(cfg: &GenConfig, sr: f32) -> Self {
        Self::new(cfg.noise_type, &cfg.campfire, sr)
    }

    #[inline]
    pub fn noise_type(&self) -> NoiseType {
        match self {
            Self::White(_) => NoiseType::White,
            Self::Pink(_) => NoiseType::Pink,
            Self::Brown(_) => NoiseType::Brown,
            Self::Rain(_) => NoiseType::Rain,
            Self::Campfire(_) => NoiseType::Campfire,
        }
    }

    /// Bring this generator in line with a new config. A same-type campfire
    /// change retunes in place (running filter/resonator state survives, so
    /// the edit is audible without a click); a type change swaps the variant.
    ///
    /// `seed` feeds the replacement variant's RNG. The render callback passes
    /// a value it derives locally — pulling OS entropy there would mean a
    /// syscall on the audio thread.
    pub fn apply(&mut self, ty: NoiseType, campfire: &CampfireParams, sr: f32, seed: u64) {
        match (self, ty) {
            (Self::Campfire(gen), NoiseType::Campfire) => gen.retune(campfire),
            (me, _) if me.noise_type() == ty => {}
            (me, _) => *me = Self::seeded(seed, ty, campfire, sr),
        }
    }
}

impl Generator for NoiseGen {
    #[inline]
    fn reset(&mut self, sr: f32) {
        match self {
            Self::White(g) => g.reset(sr),
            Self::Pink(g) => g.reset(sr),
            Self::Brown(g) => g.reset(sr),
            Self::Rain(g) => g.reset(sr),
            Self::Campfire(g) => g.reset(sr),
        }
    }

    #[inline]
    fn next(&mut self) -> f32 {
        match self {
            Self::White(g) => g.next(),
            Self::Pink(g) => g.next(),
            Self::Brown(g) => g.next(),
            Self::Rain(g) => g.next(),
            Self::Campfire(g) => g.next(),
        }
    }
}

// ------------------------------------ Tests --------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_swaps_variant_on_type_change() {
        let params = CampfireParams::default();
        let mut gen = NoiseGen::seeded(1, NoiseType::White, &params, 48_000.0);
        gen.apply(NoiseType::Rain, &params, 48_000.0, 99);
        assert_eq!(gen.noise_type(), NoiseType::Rain);
    }

    #[test]
    fn apply_same_type_campfire_is_in_place() {
        let params = CampfireParams { woody_density: 0.9, ..CampfireParams::default() };
        let mut gen = NoiseGen::seeded(2, NoiseType::Campfire, &params, 48_000.0);
        for _ in 0..50_000 {
            gen.next();
        }
        let strikes = match &gen {
            NoiseGen::Campfire(c) => c.strike_count(),
            _ => unreachable!(),
        };
        assert!(strikes > 0);

        gen.apply(
            NoiseType::Campfire,
            &CampfireParams { woody_level: 0.9, ..params },
            48_000.0,
            99,
        );
        // Still the same running instance, not a rebuilt one.
        match &gen {
            NoiseGen::Campfire(c) => assert_eq!(c.strike_count(), strikes),
            _ => unreachable!(),
        }
    }

    #[test]
    fn engine_resets_generator_on_sr_change() {
        let params = CampfireParams::default();
        let gen = NoiseGen::seeded(3, NoiseType::Brown, &params, 44_100.0);
        let mut engine = Engine::new(gen, 44_100.0);
        let _ = engine.next(44_100.0);
        let _ = engine.next(48_000.0);
        assert_eq!(engine.sample_rate(), 48_000.0);
    }
}
