//! Parameter store: noise selection, campfire tuning knobs, and the published
//! config snapshot handed to the render callback and to background builds.
//!
//! This is a plain value surface. Out-of-range inputs are clamped silently —
//! these knobs are turned continuously from a live control surface, so
//! rejecting a value would be worse than taming it.

use core::fmt;
use core::str::FromStr;

/// Which noise bed to synthesize.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NoiseType {
    White,
    Pink,
    Brown,
    Rain,
    Campfire,
}

impl NoiseType {
    /// Stable numbering for FFI and config surfaces.
    #[inline]
    pub fn from_index(i: u32) -> Option<Self> {
        match i {
            0 => Some(Self::White),
            1 => Some(Self::Pink),
            2 => Some(Self::Brown),
            3 => Some(Self::Rain),
            4 => Some(Self::Campfire),
            _ => None,
        }
    }

    #[inline]
    pub fn index(self) -> u32 {
        match self {
            Self::White => 0,
            Self::Pink => 1,
            Self::Brown => 2,
            Self::Rain => 3,
            Self::Campfire => 4,
        }
    }

    #[inline]
    pub fn name(self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Pink => "pink",
            Self::Brown => "brown",
            Self::Rain => "rain",
            Self::Campfire => "campfire",
        }
    }
}

impl fmt::Display for NoiseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NoiseType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "white" => Ok(Self::White),
            "pink" => Ok(Self::Pink),
            "brown" => Ok(Self::Brown),
            "rain" => Ok(Self::Rain),
            "campfire" | "fire" => Ok(Self::Campfire),
            _ => Err(()),
        }
    }
}

/// The 13 campfire tuning knobs.
///
/// Ranges: every `*_mix` / `*_density` / `*_level` / `*_smooth` knob plus
/// `resonance` and `burst_prob` lives in [0,1]; the three band centers are
/// positive Hz, conventionally ordered low < mid < high (not enforced).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CampfireParams {
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

impl Default for CampfireParams {
    fn default() -> Self {
        Self {
            rumble_mix: 0.6,
            texture_mix: 0.5,
            woody_density: 0.4,
            woody_level: 0.5,
            snap_density: 0.3,
            snap_level: 0.4,
            rumble_smooth: 0.5,
            texture_smooth: 0.5,
            freq_low: 300.0,
            freq_mid: 900.0,
            freq_high: 2500.0,
            resonance: 0.5,
            burst_prob: 0.3,
        }
    }
}

impl CampfireParams {
    /// Return a copy with every knob pulled into its documented range.
    #[must_use]
    pub fn clamped(&self) -> Self {
        let unit = |v: f32| if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 };
        let hz = |v: f32, fallback: f32| if v.is_finite() && v > 0.0 { v } else { fallback };
        Self {
            rumble_mix: unit(self.rumble_mix),
            texture_mix: unit(self.texture_mix),
            woody_density: unit(self.woody_density),
            woody_level: unit(self.woody_level),
            snap_density: unit(self.snap_density),
            snap_level: unit(self.snap_level),
            rumble_smooth: unit(self.rumble_smooth),
            texture_smooth: unit(self.texture_smooth),
            freq_low: hz(self.freq_low, 300.0),
            freq_mid: hz(self.freq_mid, 900.0),
            freq_high: hz(self.freq_high, 2500.0),
            resonance: unit(self.resonance),
            burst_prob: unit(self.burst_prob),
        }
    }
}

/// Immutable snapshot published to the render callback and to builders.
///
/// The whole struct is swapped atomically (never mutated in place); the
/// `generation` tag is the value of the generation clock at publish time and
/// is what invalidates superseded background builds.
#[derive(Copy, Clone, Debug)]
pub struct GenConfig {
    pub generation: u64,
    pub noise_type: NoiseType,
    pub campfire: CampfireParams,
}

impl GenConfig {
    pub fn new(generation: u64, noise_type: NoiseType, campfire: CampfireParams) -> Self {
        Self { generation, noise_type, campfire }
    }
}

// ------------------------------------ Tests --------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noise_type_index_roundtrip() {
        for i in 0..5 {
            let ty = NoiseType::from_index(i).unwrap();
            assert_eq!(ty.index(), i);
        }
        assert!(NoiseType::from_index(5).is_none());
    }

    #[test]
    fn noise_type_parses() {
        assert_eq!("campfire".parse::<NoiseType>(), Ok(NoiseType::Campfire));
        assert_eq!("PINK".parse::<NoiseType>(), Ok(NoiseType::Pink));
        assert!("surf".parse::<NoiseType>().is_err());
    }

    #[test]
    fn clamped_tames_out_of_range() {
        let p = CampfireParams {
            rumble_mix: 1.7,
            woody_density: -0.2,
            freq_low: -10.0,
            burst_prob: f32::NAN,
            ..CampfireParams::default()
        };
        let c = p.clamped();
        assert_eq!(c.rumble_mix, 1.0);
        assert_eq!(c.woody_density, 0.0);
        assert_eq!(c.freq_low, 300.0);
        assert_eq!(c.burst_prob, 0.0);
    }

    #[test]
    fn defaults_are_in_range() {
        let d = CampfireParams::default();
        assert_eq!(d, d.clamped());
        assert!(d.freq_low < d.freq_mid && d.freq_mid < d.freq_high);
    }
}
