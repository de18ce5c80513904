//! Noisebed CLI — real-time player and offline renderer for ambient noise beds.

use anyhow::{bail, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait};
use noisebed_core::dsp::{lin_to_db, Rms};
use noisebed_engine::{render, render_seeded, CampfireParams, GenConfig, NoiseEngine, NoiseType};
use std::time::Duration;

#[derive(Debug, Default)]
struct Args {
    list_devices: bool,
    noise: Option<NoiseType>,
    volume: Option<f32>,
    duration_sec: Option<u64>,
    render_path: Option<String>,
    render_seconds: Option<f32>,
    sample_rate: Option<u32>,
    seed: Option<u64>,
}

fn parse_args() -> Args {
    let mut a = Args::default();
    for s in std::env::args().skip(1) {
        if s == "--list-devices" { a.list_devices = true; continue; }
        if let Some(rest) = s.strip_prefix("--noise=")          { a.noise          = rest.parse().ok();      continue; }
        if let Some(rest) = s.strip_prefix("--volume=")         { a.volume         = rest.parse().ok();      continue; }
        if let Some(rest) = s.strip_prefix("--duration=")       { a.duration_sec   = rest.parse().ok();      continue; }
        if let Some(rest) = s.strip_prefix("--render=")         { a.render_path    = Some(rest.to_string()); continue; }
        if let Some(rest) = s.strip_prefix("--render-seconds=") { a.render_seconds = rest.parse().ok();      continue; }
        if let Some(rest) = s.strip_prefix("--sample-rate=")    { a.sample_rate    = rest.parse().ok();      continue; }
        if let Some(rest) = s.strip_prefix("--seed=")           { a.seed           = rest.parse().ok();      continue; }
        eprintln!("[warn] unknown arg: {s}");
    }
    a
}

fn list_output_devices() -> Result<()> {
    let host = cpal::default_host();
    println!("Available output devices:");
    for dev in host.output_devices()? {
        println!("- {}", dev.name()?);
    }
    Ok(())
}

/// Offline path: render the selected bed through the same code the background
/// builder uses and write a mono float WAV. No audio device required.
fn render_to_wav(
    path: &str,
    noise: NoiseType,
    sample_rate: u32,
    seconds: f32,
    seed: Option<u64>,
) -> Result<()> {
    let cfg = GenConfig::new(0, noise, CampfireParams::default());
    println!("Rendering {seconds} s of {noise} @ {sample_rate} Hz -> {path}");
    let buf = match seed {
        Some(seed) => render_seeded(seed, &cfg, sample_rate, seconds),
        None => render(&cfg, sample_rate, seconds),
    };

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer =
        hound::WavWriter::create(path, spec).with_context(|| format!("creating {path}"))?;
    for &s in &buf.samples {
        writer.write_sample(s)?;
    }
    writer.finalize()?;

    // Quick level report so a too-quiet render is obvious straight away.
    let mut rms = Rms::new(0.001);
    let mut level = 0.0;
    let mut peak = 0.0f32;
    for &s in &buf.samples {
        level = rms.tick(s);
        peak = peak.max(s.abs());
    }
    println!(
        "Done: {} frames | rms ~ {:.1} dBFS | peak ~ {:.1} dBFS",
        buf.frames,
        lin_to_db(level),
        lin_to_db(peak)
    );
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = parse_args();

    if args.list_devices {
        return list_output_devices();
    }

    let noise = args.noise.unwrap_or(NoiseType::Pink);

    if let Some(path) = &args.render_path {
        let sample_rate = args.sample_rate.unwrap_or(48_000);
        if sample_rate == 0 {
            bail!("--sample-rate must be positive");
        }
        let seconds = args.render_seconds.unwrap_or(10.0);
        return render_to_wav(path, noise, sample_rate, seconds, args.seed);
    }

    println!("noisebed-cli — ambient noise bed player\n");

    let mut engine = NoiseEngine::new();
    engine.set_noise_type(noise);
    engine.set_volume(args.volume.unwrap_or(0.8));
    engine.play().context("starting playback")?;

    println!("Noise: {noise}  | Volume: {:.2}", args.volume.unwrap_or(0.8));
    if let Some(d) = args.duration_sec {
        println!("Auto-stop after {d} seconds");
        std::thread::sleep(Duration::from_secs(d));
        engine.stop();
        return Ok(());
    }
    println!("Press Ctrl+C to stop…\n");

    loop {
        std::thread::sleep(Duration::from_millis(500));
    }
}
