//! C ABI wrapper for the Noisebed engine.
//!
//! Exposes the control surface: create/destroy an engine, start/stop
//! playback, set volume, select the noise bed, and push campfire tuning.
//!
//! ABI notes
//! - All functions are `extern "C"` and `#[no_mangle]`.
//! - Opaque handle type: `NoisebedEngine` (heap-allocated; you own/delete it).
//! - Playback opens the host's default output device; the stream is mono
//!   internally and duplicated to the device's channel count.
//!
//! Threading
//! - The handle is NOT thread-safe; call all functions from the same thread.

use log::warn;
use noisebed_engine::{CampfireParams, NoiseEngine, NoiseType};

/// Opaque engine wrapper we hand to C.
pub struct NoisebedEngine {
    inner: NoiseEngine,
}

/// The 13 campfire tuning knobs, C layout. Unit-range knobs are clamped by
/// the engine; frequencies are positive Hz.
#[repr(C)]
#[derive(Copy, Clone)]
pub struct NoisebedCampfireParams {
    pub rumble_mix: f32,
    pub texture_mix: f32,
    pub woody_density: f32,
    pub woody_level: f32,
    pub snap_density: f32,
    pub snap_level: f32,
    pub rumble_smooth: f32,
    pub texture_smooth: f32,
    pub freq_low: f32,
    pub freq_mid: f32,
    pub freq_high: f32,
    pub resonance: f32,
    pub burst_prob: f32,
}

impl From<NoisebedCampfireParams> for CampfireParams {
    fn from(p: NoisebedCampfireParams) -> Self {
        Self {
            rumble_mix: p.rumble_mix,
            texture_mix: p.texture_mix,
            woody_density: p.woody_density,
            woody_level: p.woody_level,
            snap_density: p.snap_density,
            snap_level: p.snap_level,
            rumble_smooth: p.rumble_smooth,
            texture_smooth: p.texture_smooth,
            freq_low: p.freq_low,
            freq_mid: p.freq_mid,
            freq_high: p.freq_high,
            resonance: p.resonance,
            burst_prob: p.burst_prob,
        }
    }
}

// --- Creation / destruction -------------------------------------------------------

/// Create a new engine (stopped, white noise selected, volume 1.0).
/// Returns a non-null pointer on success.
#[no_mangle]
pub extern "C" fn noisebed_create() -> *mut NoisebedEngine {
    Box::into_raw(Box::new(NoisebedEngine { inner: NoiseEngine::new() }))
}

/// Destroy an engine previously returned by `noisebed_create`. Stops
/// playback first if needed.
#[no_mangle]
pub extern "C" fn noisebed_destroy(engine: *mut NoisebedEngine) {
    if !engine.is_null() {
        let mut boxed = unsafe { Box::from_raw(engine) };
        boxed.inner.stop();
        drop(boxed);
    }
}

// --- Transport --------------------------------------------------------------------

/// Start playback on the default output device.
/// Returns 0 on success (including when already playing), -1 on failure.
#[no_mangle]
pub extern "C" fn noisebed_play(engine: *mut NoisebedEngine) -> i32 {
    if engine.is_null() { return -1; }
    let e = unsafe { &mut *engine };
    match e.inner.play() {
        Ok(()) => 0,
        Err(err) => {
            warn!("noisebed_play failed: {err}");
            -1
        }
    }
}

/// Fade out and stop playback. No-op when already stopped. Blocks for the
/// duration of the stop fade (~0.5 s).
#[no_mangle]
pub extern "C" fn noisebed_stop(engine: *mut NoisebedEngine) {
    if engine.is_null() { return; }
    let e = unsafe { &mut *engine };
    e.inner.stop();
}

/// Whether the engine currently has a running session.
#[no_mangle]
pub extern "C" fn noisebed_is_playing(engine: *const NoisebedEngine) -> bool {
    if engine.is_null() { return false; }
    let e = unsafe { &*engine };
    e.inner.is_playing()
}

// --- Parameters -------------------------------------------------------------------

/// Set output volume in [0,1]; out-of-range values are clamped.
#[no_mangle]
pub extern "C" fn noisebed_set_volume(engine: *mut NoisebedEngine, volume: f32) {
    if engine.is_null() { return; }
    let e = unsafe { &mut *engine };
    e.inner.set_volume(volume);
}

/// Select the noise bed: 0=white 1=pink 2=brown 3=rain 4=campfire.
/// Returns 0 on success, -1 for an unknown index.
#[no_mangle]
pub extern "C" fn noisebed_set_noise_type(engine: *mut NoisebedEngine, noise_type: u32) -> i32 {
    if engine.is_null() { return -1; }
    let e = unsafe { &mut *engine };
    match NoiseType::from_index(noise_type) {
        Some(ty) => {
            e.inner.set_noise_type(ty);
            0
        }
        None => -1,
    }
}

/// Push a full campfire tuning bundle. Out-of-range knobs are clamped.
#[no_mangle]
pub extern "C" fn noisebed_set_campfire_params(
    engine: *mut NoisebedEngine,
    params: *const NoisebedCampfireParams,
) {
    if engine.is_null() || params.is_null() { return; }
    let e = unsafe { &mut *engine };
    let p = unsafe { *params };
    e.inner.set_campfire_params(p.into());
}
