//! Lunar phase computation for any number of configured moons.
//!
//! Each moon has its own cycle length and phase offset. The phase is the
//! world clock's position within the cycle, shifted by the offset and
//! mapped onto eight buckets with fixed, asymmetric boundaries:
//!
//! | Ratio            | Bucket          |
//! |------------------|-----------------|
//! | `[0.00, 0.06)`   | New             |
//! | `[0.06, 0.24)`   | Waxing Crescent |
//! | `[0.24, 0.26)`   | First Quarter   |
//! | `[0.26, 0.49)`   | Waxing Gibbous  |
//! | `[0.49, 0.51)`   | Full            |
//! | `[0.51, 0.74)`   | Waning Gibbous  |
//! | `[0.74, 0.76)`   | Last Quarter    |
//! | `[0.76, 0.94)`   | Waning Crescent |
//! | `[0.94, 1.00)`   | New             |

use grimoire_types::PhaseBucket;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::calendar::SECONDS_PER_DAY;
use crate::error::MoonError;

/// Seconds per day as a float, for cycle arithmetic.
const SECONDS_PER_DAY_F64: f64 = 86_400.0;

// Keep the float constant tied to the integer one.
const _: () = assert!(SECONDS_PER_DAY == 86_400);

/// One tracked celestial body.
///
/// Keys follow the overlay's JSON setting (`cycleDays`, `phaseOffset`);
/// snake-case aliases are accepted for YAML configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoonConfig {
    /// Display name.
    pub name: String,

    /// Length of one full phase cycle in days. Must be positive.
    #[serde(alias = "cycle_days")]
    pub cycle_days: f64,

    /// Opaque display colour hint, not read by the engine.
    #[serde(default = "default_color")]
    pub color: String,

    /// Shift applied to the cycle, as a fraction of a cycle in `[0, 1)`.
    #[serde(default, alias = "phase_offset")]
    pub phase_offset: f64,
}

impl MoonConfig {
    /// Create a moon with the default colour and no offset.
    pub fn new(name: impl Into<String>, cycle_days: f64) -> Self {
        Self {
            name: name.into(),
            cycle_days,
            color: default_color(),
            phase_offset: 0.0,
        }
    }

    /// Return a copy with the given phase offset.
    #[must_use]
    pub fn with_offset(mut self, phase_offset: f64) -> Self {
        self.phase_offset = phase_offset;
        self
    }

    /// Check that this moon can produce a phase.
    ///
    /// # Errors
    ///
    /// Returns [`MoonError::InvalidCycle`] for a cycle that is not a
    /// positive finite number of days (or overflows when converted to
    /// seconds), and [`MoonError::InvalidOffset`] for a non-finite offset.
    pub fn validate(&self) -> Result<(), MoonError> {
        let cycle_seconds = self.cycle_days * SECONDS_PER_DAY_F64;
        if !(cycle_seconds.is_finite() && cycle_seconds > 0.0) {
            return Err(MoonError::InvalidCycle {
                name: self.name.clone(),
                cycle_days: self.cycle_days,
            });
        }
        if !self.phase_offset.is_finite() {
            return Err(MoonError::InvalidOffset {
                name: self.name.clone(),
                phase_offset: self.phase_offset,
            });
        }
        Ok(())
    }
}

fn default_color() -> String {
    "#ffffff".to_owned()
}

/// A moon's phase at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseDescriptor {
    /// The phase bucket.
    pub bucket: PhaseBucket,
    /// Cycle progress in `[0, 1)` after the offset is applied.
    pub ratio: f64,
}

impl PhaseDescriptor {
    /// Bucket index in `[0, 7]`.
    pub const fn bucket_index(&self) -> u8 {
        self.bucket.index()
    }

    /// Phase name.
    pub const fn label(&self) -> &'static str {
        self.bucket.label()
    }
}

/// A configured moon together with its computed phase.
#[derive(Debug, Clone, PartialEq)]
pub struct MoonPhase {
    /// The moon's configuration.
    pub moon: MoonConfig,
    /// Its phase at the requested instant.
    pub phase: PhaseDescriptor,
}

/// Map a cycle ratio onto its phase bucket.
///
/// Ratios at or beyond 1.0 (and NaN) fall through to [`PhaseBucket::New`].
pub fn bucket_for_ratio(ratio: f64) -> PhaseBucket {
    if ratio < 0.06 {
        PhaseBucket::New
    } else if ratio < 0.24 {
        PhaseBucket::WaxingCrescent
    } else if ratio < 0.26 {
        PhaseBucket::FirstQuarter
    } else if ratio < 0.49 {
        PhaseBucket::WaxingGibbous
    } else if ratio < 0.51 {
        PhaseBucket::Full
    } else if ratio < 0.74 {
        PhaseBucket::WaningGibbous
    } else if ratio < 0.76 {
        PhaseBucket::LastQuarter
    } else if ratio < 0.94 {
        PhaseBucket::WaningCrescent
    } else {
        PhaseBucket::New
    }
}

/// Compute the phase of `moon` at `world_time_seconds`.
///
/// Returns `None` when the moon fails [`MoonConfig::validate`]; a bad cycle
/// never yields a NaN ratio. Negative clock values are folded into the
/// cycle with Euclidean remainder, so the phase keeps moving backward
/// smoothly before the epoch.
pub fn compute_moon_phase(world_time_seconds: i64, moon: &MoonConfig) -> Option<PhaseDescriptor> {
    moon.validate().ok()?;

    let cycle_seconds = moon.cycle_days * SECONDS_PER_DAY_F64;

    // World clocks stay far below 2^53 seconds, where i64 -> f64 is exact.
    #[allow(clippy::cast_precision_loss)]
    let seconds = world_time_seconds as f64;

    let raw_ratio = seconds.rem_euclid(cycle_seconds) / cycle_seconds;
    let mut ratio = (raw_ratio + moon.phase_offset).rem_euclid(1.0);
    // rem_euclid may round up to the divisor for inputs just below zero.
    if ratio >= 1.0 {
        ratio = 0.0;
    }

    Some(PhaseDescriptor {
        bucket: bucket_for_ratio(ratio),
        ratio,
    })
}

/// Compute phases for every valid moon, preserving configured order.
///
/// Invalid entries are skipped with a warning; the rest are still returned.
pub fn moon_phases(world_time_seconds: i64, moons: &[MoonConfig]) -> Vec<MoonPhase> {
    moons
        .iter()
        .filter_map(|moon| {
            if let Err(err) = moon.validate() {
                warn!(moon = %moon.name, error = %err, "skipping moon without phase data");
                return None;
            }
            compute_moon_phase(world_time_seconds, moon).map(|phase| MoonPhase {
                moon: moon.clone(),
                phase,
            })
        })
        .collect()
}

/// Drop moons that cannot produce a phase, logging each rejection.
///
/// Offsets outside `[0, 1)` are wrapped into range.
pub fn sanitize_moons(moons: Vec<MoonConfig>) -> Vec<MoonConfig> {
    moons
        .into_iter()
        .filter_map(|mut moon| {
            if let Err(err) = moon.validate() {
                warn!(moon = %moon.name, error = %err, "rejecting moon configuration entry");
                return None;
            }
            if !(0.0..1.0).contains(&moon.phase_offset) {
                let wrapped = moon.phase_offset.rem_euclid(1.0);
                warn!(
                    moon = %moon.name,
                    phase_offset = moon.phase_offset,
                    wrapped,
                    "phase offset outside [0, 1), wrapping"
                );
                moon.phase_offset = if wrapped >= 1.0 { 0.0 } else { wrapped };
            }
            Some(moon)
        })
        .collect()
}

/// Parse the JSON moon list stored by the settings store.
///
/// Input that is not a JSON array is treated as zero moons. Entries that do
/// not match the [`MoonConfig`] shape are skipped individually. Neither case
/// is an error.
pub fn parse_moon_config(json: &str) -> Vec<MoonConfig> {
    let value: serde_json::Value = match serde_json::from_str(json) {
        Ok(value) => value,
        Err(err) => {
            warn!(error = %err, "moon configuration is not valid JSON, showing no moons");
            return Vec::new();
        }
    };

    let Some(entries) = value.as_array() else {
        warn!("moon configuration is not a JSON array, showing no moons");
        return Vec::new();
    };

    entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            match serde_json::from_value::<MoonConfig>(entry.clone()) {
                Ok(moon) => Some(moon),
                Err(err) => {
                    warn!(index, error = %err, "skipping malformed moon entry");
                    None
                }
            }
        })
        .collect()
}
