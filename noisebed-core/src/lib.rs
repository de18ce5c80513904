#![cfg_attr(not(feature = "std"), no_std)]
//! Noisebed Core — no_std-ready DSP primitives for procedural noise synthesis.
//!
//! Features
//! - `std`      : (default) use the Rust standard library
//! - `no-std`   : build with `#![no_std]` and use `libm` as the math backend
//! - `fast-math`: enable approximations (polynomial sine) for LFO-rate trig
//!
//! Modules
//! - [`dsp`]       : math backend, utils (db/lin, smoothing coefficients, meters)
//! - [`envelopes`] : impulse decay, linear fades, one-pole slewing
//! - [`filters`]   : coefficient-form one-pole, 2-pole resonator
//!
//! Design
//! - No heap allocations; pure sample-by-sample stateful primitives
//! - Clear separation between math helpers and filter/envelope building blocks
//! - Friendly to embedded / real-time targets

pub mod dsp;
pub mod envelopes;
pub mod filters;

/// Commonly used types/functions for convenience:
pub mod prelude {
    pub use crate::dsp::{
        db_to_lin, fast_sin, kill_denormals, lerp, lin_to_db, one_pole_coeff_ms, Rms, TAU,
    };
    pub use crate::envelopes::{DecayEnv, LinearFade, OnePoleSmoother};
    pub use crate::filters::{OnePole, Resonator};
}

#[cfg(test)]
mod smoke {

    #[test]
    fn prelude_exists() {
        use crate::prelude::*;
        let _ = db_to_lin(-6.0);
        let _ = DecayEnv::new(0.9);
        let mut lp = OnePole::new(0.05);
        let _ = lp.process(0.1);
        let mut res = Resonator::new(0.5);
        res.tune(900.0, 0.9, 48000.0);
        let _ = res.process(1.0);
    }
}
