//! Enumeration types for the Grimoire HUD.
//!
//! Phase buckets, lighting levels, overridable fields, visual themes and
//! the reason tags attached to recompute requests.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Lunar phases
// ---------------------------------------------------------------------------

/// One of eight named partitions of a moon's normalized cycle position.
///
/// The discriminant is the bucket index shown to renderers (0-7). The
/// partition itself is asymmetric: the four exact phases occupy narrow
/// bands while crescents and gibbous phases occupy wide ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum PhaseBucket {
    /// Dark moon, at the very start and very end of the cycle.
    New,
    /// Growing sliver.
    WaxingCrescent,
    /// Half lit, growing.
    FirstQuarter,
    /// More than half lit, growing.
    WaxingGibbous,
    /// Fully lit.
    Full,
    /// More than half lit, shrinking.
    WaningGibbous,
    /// Half lit, shrinking.
    LastQuarter,
    /// Shrinking sliver.
    WaningCrescent,
}

impl PhaseBucket {
    /// All buckets in index order.
    pub const ALL: [Self; 8] = [
        Self::New,
        Self::WaxingCrescent,
        Self::FirstQuarter,
        Self::WaxingGibbous,
        Self::Full,
        Self::WaningGibbous,
        Self::LastQuarter,
        Self::WaningCrescent,
    ];

    /// Return the bucket index in `[0, 7]`.
    pub const fn index(self) -> u8 {
        match self {
            Self::New => 0,
            Self::WaxingCrescent => 1,
            Self::FirstQuarter => 2,
            Self::WaxingGibbous => 3,
            Self::Full => 4,
            Self::WaningGibbous => 5,
            Self::LastQuarter => 6,
            Self::WaningCrescent => 7,
        }
    }

    /// Human-readable phase name.
    pub const fn label(self) -> &'static str {
        match self {
            Self::New => "New Moon",
            Self::WaxingCrescent => "Waxing Crescent",
            Self::FirstQuarter => "First Quarter",
            Self::WaxingGibbous => "Waxing Gibbous",
            Self::Full => "Full Moon",
            Self::WaningGibbous => "Waning Gibbous",
            Self::LastQuarter => "Last Quarter",
            Self::WaningCrescent => "Waning Crescent",
        }
    }
}

// ---------------------------------------------------------------------------
// Lighting
// ---------------------------------------------------------------------------

/// Ambient light bucket derived from the scene darkness level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum LightingLevel {
    /// Darkness below 0.25.
    Bright,
    /// Darkness between 0.25 and 0.75 inclusive.
    Dim,
    /// Darkness above 0.75.
    Dark,
}

impl LightingLevel {
    /// Bucket a darkness level in `[0, 1]`.
    ///
    /// Returns `None` for NaN or infinite input. Finite values outside the
    /// unit interval fall into the nearest end bucket.
    pub fn from_darkness(darkness: f64) -> Option<Self> {
        if !darkness.is_finite() {
            return None;
        }
        if darkness < 0.25 {
            Some(Self::Bright)
        } else if darkness > 0.75 {
            Some(Self::Dark)
        } else {
            Some(Self::Dim)
        }
    }

    /// Display label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Bright => "Bright",
            Self::Dim => "Dim",
            Self::Dark => "Dark",
        }
    }
}

// ---------------------------------------------------------------------------
// Overridable fields
// ---------------------------------------------------------------------------

/// A view-model field that callers may override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum HudField {
    /// Current scene or region name.
    Location,
    /// Calendar date, combat turn indicator, or flash message.
    Date,
    /// Weather label.
    Weather,
    /// Lighting label.
    Lighting,
    /// Now-playing track title.
    Music,
}

impl HudField {
    /// All overridable fields.
    pub const ALL: [Self; 5] = [
        Self::Location,
        Self::Date,
        Self::Weather,
        Self::Lighting,
        Self::Music,
    ];

    /// The string key used by the external control surface.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Location => "location",
            Self::Date => "date",
            Self::Weather => "weather",
            Self::Lighting => "lighting",
            Self::Music => "music",
        }
    }

    /// Look a field up by its control-surface key (case-insensitive).
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        Self::ALL
            .into_iter()
            .find(|field| field.key().eq_ignore_ascii_case(key))
    }
}

impl core::fmt::Display for HudField {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.key())
    }
}

// ---------------------------------------------------------------------------
// Theme
// ---------------------------------------------------------------------------

/// Visual theme selected in the client settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Theme {
    /// Mana glass (blue gradient).
    #[default]
    Glass,
    /// Old parchment (paper).
    Parchment,
    /// Solid contrast (black/white).
    Solid,
}

impl Theme {
    /// CSS class applied to the overlay root.
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Glass => "theme-glass",
            Self::Parchment => "theme-parchment",
            Self::Solid => "theme-solid",
        }
    }
}

// ---------------------------------------------------------------------------
// Recompute reasons
// ---------------------------------------------------------------------------

/// Why a recompute was requested.
///
/// Host triggers collapse into this one tag instead of a hook per event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum RecomputeReason {
    /// The world clock advanced.
    WorldTime,
    /// The active scene changed.
    Scene,
    /// A token was moved or (de)selected.
    Token,
    /// Combat started, ended, or the turn changed.
    Combat,
    /// The playlist changed.
    Playlist,
    /// Configuration was edited.
    Settings,
    /// An override was set or cleared.
    Override,
    /// A flash message was shown or expired.
    Flash,
    /// The overlay was minimized or expanded.
    Minify,
    /// Explicit refresh from an external caller.
    Manual,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_indices_follow_declaration_order() {
        for (expected, bucket) in PhaseBucket::ALL.into_iter().enumerate() {
            assert_eq!(usize::from(bucket.index()), expected);
        }
    }

    #[test]
    fn lighting_thresholds() {
        assert_eq!(LightingLevel::from_darkness(0.0), Some(LightingLevel::Bright));
        assert_eq!(LightingLevel::from_darkness(0.24), Some(LightingLevel::Bright));
        assert_eq!(LightingLevel::from_darkness(0.25), Some(LightingLevel::Dim));
        assert_eq!(LightingLevel::from_darkness(0.75), Some(LightingLevel::Dim));
        assert_eq!(LightingLevel::from_darkness(0.76), Some(LightingLevel::Dark));
        assert_eq!(LightingLevel::from_darkness(f64::NAN), None);
    }

    #[test]
    fn field_keys_round_trip() {
        for field in HudField::ALL {
            assert_eq!(HudField::from_key(field.key()), Some(field));
        }
        assert_eq!(HudField::from_key(" Date "), Some(HudField::Date));
        assert_eq!(HudField::from_key("mood"), None);
    }

    #[test]
    fn theme_deserializes_lowercase() {
        let theme: Theme = serde_json::from_str("\"parchment\"").unwrap_or_default();
        assert_eq!(theme, Theme::Parchment);
    }
}
