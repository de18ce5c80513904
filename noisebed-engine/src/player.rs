//! Playback orchestrator: engine lifecycle, dual-path hot swap, fades.
//!
//! Two playback paths share one output stream:
//! - the **real-time path** synthesizes per sample inside the callback and is
//!   always available — it carries the first moments after `play()` and every
//!   parameter edit, so changes are audible within one device buffer;
//! - the **loop path** plays a pre-rendered one-minute buffer and takes over
//!   once a build matching the current generation is published, which lets
//!   the per-sample synthesis go idle in the steady state.
//!
//! All cross-thread traffic is lock-free: the generation clock and the
//! volume/fade cells are atomics, and the config snapshot and loop-buffer
//! cache are `arc-swap` cells replaced whole. The callback owns its generator
//! outright and allocates nothing.
//!
//! [`PathMixer`] holds the callback-side state as a plain struct so the whole
//! preview → crossfade → loop machinery is testable without an audio device.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use arc_swap::ArcSwap;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use log::{debug, info, warn};
use thiserror::Error;

use noisebed_core::dsp::lerp;
use noisebed_core::envelopes::{LinearFade, OnePoleSmoother};

use crate::graph::{Engine, NoiseGen};
use crate::loopbuf::{self, BufferCache, LoopBuffer, LOOP_SECONDS};
use crate::params::{CampfireParams, GenConfig, NoiseType};

/// Overlap window for the real-time → loop hand-off. A fixed heuristic kept
/// as a tunable rather than a timing contract.
pub const CROSSFADE_MS: f32 = 100.0;

const STOP_FADE_STEPS: u32 = 10;
const STOP_FADE_MS: u64 = 500;
const GAIN_SMOOTH_MS: f32 = 15.0;

/// Failures surfaced from [`NoiseEngine::play`]. None of these are fatal to
/// the process; the engine stays stopped and nothing is retried.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no default output device")]
    NoDevice,
    #[error("querying default output config: {0}")]
    DeviceConfig(#[from] cpal::DefaultStreamConfigError),
    #[error("building output stream: {0}")]
    StreamBuild(#[from] cpal::BuildStreamError),
    #[error("starting output stream: {0}")]
    StreamStart(#[from] cpal::PlayStreamError),
    #[error("unsupported device sample format: {0:?}")]
    UnsupportedFormat(cpal::SampleFormat),
}

// ----------------------------- Shared control cells -------------------------------

/// Everything that crosses between the control context, the builder threads
/// and the render callback. Nothing else is shared.
pub(crate) struct SharedControls {
    clock: Arc<AtomicU64>,
    config: ArcSwap<GenConfig>,
    cache: Arc<BufferCache>,
    volume_bits: AtomicU32,
    fade_bits: AtomicU32,
}

impl SharedControls {
    fn new(noise_type: NoiseType, campfire: CampfireParams) -> Self {
        Self {
            clock: Arc::new(AtomicU64::new(0)),
            config: ArcSwap::from_pointee(GenConfig::new(0, noise_type, campfire)),
            cache: Arc::new(BufferCache::empty()),
            volume_bits: AtomicU32::new(1.0f32.to_bits()),
            fade_bits: AtomicU32::new(1.0f32.to_bits()),
        }
    }

    #[inline]
    fn volume(&self) -> f32 {
        f32::from_bits(self.volume_bits.load(Ordering::Relaxed))
    }

    #[inline]
    fn set_volume(&self, v: f32) {
        self.volume_bits.store(v.to_bits(), Ordering::Relaxed);
    }

    #[inline]
    fn fade(&self) -> f32 {
        f32::from_bits(self.fade_bits.load(Ordering::Relaxed))
    }

    #[inline]
    fn set_fade(&self, v: f32) {
        self.fade_bits.store(v.to_bits(), Ordering::Relaxed);
    }

    /// Advance the generation clock, returning the new value.
    fn bump(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::AcqRel) + 1
    }
}

// ------------------------------- Callback-side state -------------------------------

/// Which path is currently feeding the output. Test-side introspection only;
/// the callback itself never needs the name of its state.
#[cfg(test)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum PlaybackPath {
    RealTimePreview,
    Crossfade,
    Loop,
}

/// The render callback's private world: the live generator, the adopted loop
/// buffer (if any), the crossfade ramp, and the smoothed output gain.
///
/// Owned exclusively by one callback; `sync` is the only place it looks at
/// the shared cells, once per device buffer.
pub(crate) struct PathMixer {
    sr: f32,
    engine: Engine<NoiseGen>,
    local_generation: u64,
    active: Option<Arc<LoopBuffer>>,
    pos: usize,
    /// 0 = all real-time, 1 = all loop.
    xfade: LinearFade,
    gain: OnePoleSmoother,
    vol_target: f32,
    previewed: bool,
    /// Local seed stream for variant swaps; the callback must not pull OS
    /// entropy, so it steps this instead.
    seed_state: u64,
}

impl PathMixer {
    fn new(shared: &SharedControls, sr: f32) -> Self {
        let cfg = shared.config.load_full();
        let mut gain = OnePoleSmoother::new_ms(GAIN_SMOOTH_MS, sr);
        gain.reset(0.0); // ride up from silence instead of clicking in
        Self {
            sr,
            engine: Engine::new(NoiseGen::from_config(&cfg, sr), sr),
            local_generation: cfg.generation,
            active: None,
            pos: 0,
            xfade: LinearFade::new(0.0),
            gain,
            vol_target: 0.0,
            previewed: false,
            seed_state: rand::random(),
        }
    }

    /// splitmix64 step; cheap and callback-safe.
    fn next_seed(&mut self) -> u64 {
        self.seed_state = self.seed_state.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = self.seed_state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }

    fn crossfade_samples(&self) -> usize {
        (self.sr * CROSSFADE_MS / 1000.0) as usize
    }

    /// Reconcile with the shared cells. Called once per device buffer, never
    /// per sample; every load here is lock-free.
    fn sync(&mut self, shared: &SharedControls) {
        let cfg = shared.config.load();
        if cfg.generation != self.local_generation {
            // A type/param edit: update the live state in place and force the
            // real-time path back in front for instant feedback.
            let seed = self.next_seed();
            self.engine.inner_mut().apply(cfg.noise_type, &cfg.campfire, self.sr, seed);
            self.local_generation = cfg.generation;
            self.active = None;
            self.pos = 0;
            self.xfade.snap_to(0.0);
        }

        if self.active.is_none() {
            if let Some(buf) = shared.cache.load_full() {
                let usable = buf.generation == cfg.generation
                    && buf.sample_rate == self.sr as u32
                    && buf.frames > 0;
                if usable {
                    self.active = Some(buf);
                    self.pos = 0;
                    if self.previewed {
                        self.xfade.fade_to(1.0, self.crossfade_samples());
                    } else {
                        // Hot start: nothing has been previewed yet, jump
                        // straight onto the loop path.
                        self.xfade.snap_to(1.0);
                    }
                }
            }
        }

        self.vol_target = shared.volume() * shared.fade();
    }

    #[inline]
    fn next_sample(&mut self) -> f32 {
        let t = self.xfade.next();

        // The live generator only runs while it is audible; once the
        // crossfade completes the per-sample synthesis goes idle.
        let live = if t < 1.0 {
            self.previewed = true;
            self.engine.next(self.sr)
        } else {
            0.0
        };

        let looped = match &self.active {
            Some(buf) => {
                let s = buf.samples[self.pos];
                self.pos += 1;
                if self.pos >= buf.frames {
                    self.pos = 0;
                }
                s
            }
            None => 0.0,
        };

        let g = self.gain.process(self.vol_target);
        (lerp(live, looped, t) * g).clamp(-1.0, 1.0)
    }

    /// Block render used by tests (the audio callback inlines the same loop
    /// so it can fan one mono sample out to N channels).
    #[cfg(test)]
    fn render(&mut self, shared: &SharedControls, out: &mut [f32]) {
        self.sync(shared);
        for s in out.iter_mut() {
            *s = self.next_sample();
        }
    }

    #[cfg(test)]
    fn path(&self) -> PlaybackPath {
        if self.active.is_none() {
            PlaybackPath::RealTimePreview
        } else if !self.xfade.done() {
            PlaybackPath::Crossfade
        } else {
            PlaybackPath::Loop
        }
    }
}

// ------------------------------- Control surface -----------------------------------

struct Session {
    // Held only to keep the stream alive; dropping it tears the graph down.
    _stream: cpal::Stream,
    sample_rate: u32,
}

/// The engine's control surface. Owns the parameter store and the session;
/// not `Send` (it owns a cpal stream) — callers drive it from one thread,
/// which is also what the FFI layer documents.
pub struct NoiseEngine {
    shared: Arc<SharedControls>,
    noise_type: NoiseType,
    campfire: CampfireParams,
    loop_seconds: f32,
    session: Option<Session>,
}

impl NoiseEngine {
    pub fn new() -> Self {
        let noise_type = NoiseType::White;
        let campfire = CampfireParams::default();
        Self {
            shared: Arc::new(SharedControls::new(noise_type, campfire)),
            noise_type,
            campfire,
            loop_seconds: LOOP_SECONDS,
            session: None,
        }
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.session.is_some()
    }

    #[inline]
    pub fn noise_type(&self) -> NoiseType {
        self.noise_type
    }

    #[inline]
    pub fn campfire_params(&self) -> CampfireParams {
        self.campfire
    }

    /// Set output volume in [0,1] (values outside are clamped). Applied at
    /// the shared gain stage, so it lands on whichever path is audible
    /// without a path switch.
    pub fn set_volume(&mut self, v: f32) {
        let v = if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 };
        self.shared.set_volume(v);
    }

    /// Select the noise bed. Accepted at any time; while playing this swaps
    /// the live path immediately and re-renders the loop in the background.
    pub fn set_noise_type(&mut self, ty: NoiseType) {
        if ty == self.noise_type {
            return;
        }
        self.noise_type = ty;
        self.bump_and_publish();
    }

    /// Replace the campfire tuning bundle (clamped silently). Bumps the
    /// generation clock even when another bed is selected — the clock tracks
    /// every parameter-store change, not just audible ones.
    pub fn set_campfire_params(&mut self, params: CampfireParams) {
        self.campfire = params.clamped();
        self.bump_and_publish();
    }

    fn bump_and_publish(&mut self) {
        let generation = self.shared.bump();
        let cfg = GenConfig::new(generation, self.noise_type, self.campfire);
        self.shared.config.store(Arc::new(cfg));
        // Whatever loop was cached no longer matches this generation.
        self.shared.cache.store(None);

        if let Some(session) = &self.session {
            debug!("change published (gen {generation}), rebuilding loop");
            loopbuf::spawn_build(
                Arc::new(cfg),
                session.sample_rate,
                self.loop_seconds,
                Arc::clone(&self.shared.clock),
                Arc::clone(&self.shared.cache),
            );
        }
    }

    /// Start playback. No-op when already playing. On failure the engine is
    /// left stopped; the caller decides whether to try again.
    pub fn play(&mut self) -> Result<(), EngineError> {
        if self.session.is_some() {
            return Ok(());
        }
        self.shared.set_fade(1.0);

        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(EngineError::NoDevice)?;
        let supported = device.default_output_config()?;
        let sample_format = supported.sample_format();
        let config: cpal::StreamConfig = supported.config();
        let sample_rate = config.sample_rate.0;

        let stream = match sample_format {
            cpal::SampleFormat::F32 => build_stream::<f32>(&device, &config, Arc::clone(&self.shared))?,
            cpal::SampleFormat::I16 => build_stream::<i16>(&device, &config, Arc::clone(&self.shared))?,
            cpal::SampleFormat::U16 => build_stream::<u16>(&device, &config, Arc::clone(&self.shared))?,
            other => return Err(EngineError::UnsupportedFormat(other)),
        };
        stream.play()?;

        let cfg = self.shared.config.load_full();
        let hot = self
            .shared
            .cache
            .load_full()
            .map_or(false, |b| b.generation == cfg.generation && b.sample_rate == sample_rate);
        if hot {
            info!("play: hot start, {} @ {sample_rate} Hz", cfg.noise_type);
        } else {
            info!("play: cold start, {} @ {sample_rate} Hz, building loop", cfg.noise_type);
            loopbuf::spawn_build(
                cfg,
                sample_rate,
                self.loop_seconds,
                Arc::clone(&self.shared.clock),
                Arc::clone(&self.shared.cache),
            );
        }

        self.session = Some(Session { _stream: stream, sample_rate });
        Ok(())
    }

    /// Fade out and tear the session down. No-op when stopped. The loop
    /// cache is deliberately kept so an unchanged `play()` hot-starts.
    pub fn stop(&mut self) {
        if self.session.is_none() {
            return;
        }
        info!("stop: fading out");
        let step_ms = STOP_FADE_MS / u64::from(STOP_FADE_STEPS);
        for step in (0..STOP_FADE_STEPS).rev() {
            self.shared.set_fade(step as f32 / STOP_FADE_STEPS as f32);
            thread::sleep(Duration::from_millis(step_ms));
        }
        self.session = None;
        self.shared.set_fade(1.0);
        info!("stopped");
    }
}

impl Default for NoiseEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    shared: Arc<SharedControls>,
) -> Result<cpal::Stream, EngineError>
where
    T: cpal::Sample + cpal::FromSample<f32> + cpal::SizedSample + Send + 'static,
{
    let sr = config.sample_rate.0 as f32;
    let channels = config.channels as usize;
    let mut mixer = PathMixer::new(&shared, sr);

    let err_fn = |e: cpal::StreamError| warn!("output stream error: {e}");

    let stream = device.build_output_stream(
        config,
        move |output: &mut [T], _| {
            mixer.sync(&shared);
            for frame in output.chunks_mut(channels) {
                let v: T = T::from_sample(mixer.next_sample());
                for ch in frame.iter_mut() {
                    *ch = v;
                }
            }
        },
        err_fn,
        None,
    )?;

    Ok(stream)
}

// ------------------------------------ Tests --------------------------------------
