//! Pre-rendered loop buffers and the background builder.
//!
//! A build renders one fixed-duration mono buffer from a private generator
//! built off the published config snapshot, then publishes it **only if** its
//! generation tag still matches the generation clock. There is no
//! cancellation: a superseded build runs to completion and its result is
//! discarded at publish time ("latest wins"). Renders are at most a minute of
//! audio, cheap relative to how often parameters change, and skipping
//! cancellation machinery keeps the hot paths lock-free.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use arc_swap::ArcSwapOption;
use log::{debug, info};

use crate::graph::{Generator, NoiseGen};
use crate::params::{GenConfig, NoiseType};

/// Steady-state loop length. One minute is long enough that the seam is
/// imperceptible for noise beds and short enough to render in well under the
/// crossfade-patience of a listener.
pub const LOOP_SECONDS: f32 = 60.0;

/// The published-buffer cell. Replaced whole, never mutated.
pub type BufferCache = ArcSwapOption<LoopBuffer>;

/// An immutable, pre-rendered mono loop tagged with what it was built for.
#[derive(Debug)]
pub struct LoopBuffer {
    pub sample_rate: u32,
    pub frames: usize,
    pub samples: Vec<f32>,
    pub noise_type: NoiseType,
    pub generation: u64,
}

/// Render `seconds` of the configured noise into a fresh [`LoopBuffer`].
///
/// Runs on whatever thread calls it; the builder thread and the CLI's offline
/// renderer both come through here.
pub fn render(cfg: &GenConfig, sample_rate: u32, seconds: f32) -> LoopBuffer {
    let frames = (sample_rate as f32 * seconds.max(0.0)) as usize;
    let mut gen = NoiseGen::from_config(cfg, sample_rate as f32);
    let mut samples = Vec::with_capacity(frames);
    for _ in 0..frames {
        samples.push(gen.next());
    }
    LoopBuffer {
        sample_rate,
        frames,
        samples,
        noise_type: cfg.noise_type,
        generation: cfg.generation,
    }
}

/// Deterministic render for tests and the CLI `--render` path.
pub fn render_seeded(seed: u64, cfg: &GenConfig, sample_rate: u32, seconds: f32) -> LoopBuffer {
    let frames = (sample_rate as f32 * seconds.max(0.0)) as usize;
    let mut gen = NoiseGen::seeded(seed, cfg.noise_type, &cfg.campfire, sample_rate as f32);
    let mut samples = Vec::with_capacity(frames);
    for _ in 0..frames {
        samples.push(gen.next());
    }
    LoopBuffer {
        sample_rate,
        frames,
        samples,
        noise_type: cfg.noise_type,
        generation: cfg.generation,
    }
}

/// Publish `buffer` into the cache iff its generation tag still matches the
/// clock. Returns whether it was published.
pub fn publish_if_current(buffer: LoopBuffer, clock: &AtomicU64, cache: &BufferCache) -> bool {
    if clock.load(Ordering::Acquire) == buffer.generation {
        cache.store(Some(Arc::new(buffer)));
        true
    } else {
        false
    }
}

/// Kick off a background build of one loop buffer for `cfg`.
///
/// The handle is returned for tests; the player lets builds detach.
pub fn spawn_build(
    cfg: Arc<GenConfig>,
    sample_rate: u32,
    seconds: f32,
    clock: Arc<AtomicU64>,
    cache: Arc<BufferCache>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        debug!(
            "loop build started: {} @ {} Hz (gen {})",
            cfg.noise_type, sample_rate, cfg.generation
        );
        let buffer = render(&cfg, sample_rate, seconds);
        let generation = buffer.generation;
        if publish_if_current(buffer, &clock, &cache) {
            info!("loop build published (gen {generation})");
        } else {
            debug!("loop build discarded, superseded (gen {generation})");
        }
    })
}

// ------------------------------------ Tests --------------------------------------
