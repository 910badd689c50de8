//! Snapshot structs handed to the presentation layer.
//!
//! A [`ViewModel`] is produced fresh on every recompute and never mutated
//! afterwards. Renderers consume it as-is; the TypeScript bindings generated
//! by `ts-rs` keep the overlay script in sync with these definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{LightingLevel, PhaseBucket, Theme};
use crate::ids::FlashId;

/// The combatant whose turn it currently is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Combatant {
    /// Name shown in the turn indicator.
    pub display_name: String,
}

/// One moon's resolved phase, in configured display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MoonView {
    /// Moon name.
    pub name: String,
    /// Opaque display colour hint.
    pub color: String,
    /// Phase bucket.
    pub bucket: PhaseBucket,
    /// Bucket index in `[0, 7]`, used for icon lookup.
    pub bucket_index: u8,
    /// Phase name, e.g. "Waxing Gibbous".
    pub label: String,
    /// Cycle progress in `[0, 1)` after the phase offset is applied.
    pub ratio: f64,
}

/// Fully resolved snapshot of every displayable field.
///
/// Text fields are `None` when hidden by their show flag. `music` is also
/// `None` when nothing is playing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ViewModel {
    /// Location line.
    pub location: Option<String>,
    /// Date line: calendar date, combat turn indicator, or override.
    pub date: Option<String>,
    /// Weather line.
    pub weather: Option<String>,
    /// Lighting line.
    pub lighting: Option<String>,
    /// Lighting bucket computed from scene darkness, for icon lookup.
    /// `None` when hidden, overridden, or the darkness is unavailable.
    pub lighting_level: Option<LightingLevel>,
    /// Now-playing line.
    pub music: Option<String>,
    /// World title line.
    pub world_name: Option<String>,
    /// Moon phases; empty when hidden or none are configured.
    pub moons: Vec<MoonView>,
    /// Visual theme.
    pub theme: Theme,
    /// Whether compact mode is on.
    pub is_compact: bool,
    /// Whether the overlay is collapsed.
    pub is_minified: bool,
    /// Whether the host reports an active encounter.
    pub is_combat_active: bool,
}

/// Receipt for a flash message, carrying the handle needed to cancel its
/// pending expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct FlashTicket {
    /// Identifies this flash.
    pub id: FlashId,
    /// How long the message stays up, in milliseconds.
    pub duration_ms: u64,
    /// Wall-clock time at which the message is cleared.
    pub expires_at: DateTime<Utc>,
}
