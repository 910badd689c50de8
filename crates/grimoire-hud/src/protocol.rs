//! JSON-lines protocol spoken over stdin and stdout.
//!
//! Each stdin line is one [`DriverCommand`], tagged by `type`:
//!
//! ```text
//! {"type": "set_world_time", "seconds": 86400}
//! {"type": "set_scene", "scene": {"nav_name": "Waterdeep", "darkness": 0.3}}
//! {"type": "override", "field": "weather", "value": "Ash Storm"}
//! {"type": "flash", "text": "Session saved"}
//! ```
//!
//! Each published view model is written to stdout as one JSON object, or
//! `null` while the overlay is switched off.

use grimoire_core::host::SceneSnapshot;
use grimoire_core::location::TokenPosition;
use grimoire_types::{FlashId, RecomputeReason};
use serde::Deserialize;

/// One host event or control request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DriverCommand {
    /// Set the world clock.
    SetWorldTime {
        /// New clock value in seconds.
        seconds: i64,
    },
    /// Move the world clock forward (or back, if negative).
    AdvanceTime {
        /// Seconds to add.
        seconds: i64,
    },
    /// Replace the active scene. `null` leaves no scene active.
    SetScene {
        /// The new scene.
        #[serde(default)]
        scene: Option<SceneSnapshot>,
    },
    /// Move the controlled token. `null` releases control.
    MoveToken {
        /// New token position.
        #[serde(default)]
        token: Option<TokenPosition>,
    },
    /// Set the weather of the active scene.
    SetWeather {
        /// Weather label; `null` clears it.
        #[serde(default)]
        weather: Option<String>,
    },
    /// Set the darkness of the active scene.
    SetDarkness {
        /// Darkness in `[0, 1]`.
        darkness: f64,
    },
    /// Start, update or end an encounter.
    SetCombat {
        /// Whether the encounter is running.
        started: bool,
        /// Name of the combatant whose turn it is.
        #[serde(default)]
        combatant: Option<String>,
    },
    /// Set the playing track.
    SetMusic {
        /// Track name; `null` stops the music.
        #[serde(default)]
        track: Option<String>,
    },
    /// Set or clear a field override.
    Override {
        /// Field key: location, date, weather, lighting or music.
        field: String,
        /// Override text; `null` clears the override.
        #[serde(default)]
        value: Option<String>,
    },
    /// Flash a message on the date line.
    Flash {
        /// Message text.
        text: String,
        /// Display time; the configured default when absent.
        #[serde(default)]
        duration_ms: Option<u64>,
    },
    /// Keep a flash on screen instead of letting it expire.
    CancelFlash {
        /// Id from the flash ticket.
        id: FlashId,
    },
    /// Collapse or expand the overlay.
    ToggleMinified,
    /// Switch the overlay on or off.
    SetEnabled {
        /// New state.
        enabled: bool,
    },
    /// Recompute without changing anything.
    Refresh,
}

impl DriverCommand {
    /// The refresh reason a host-state command triggers, or `None` for
    /// commands that go straight to the session.
    pub const fn host_reason(&self) -> Option<RecomputeReason> {
        match self {
            Self::SetWorldTime { .. } | Self::AdvanceTime { .. } => {
                Some(RecomputeReason::WorldTime)
            }
            Self::SetScene { .. } | Self::SetWeather { .. } | Self::SetDarkness { .. } => {
                Some(RecomputeReason::Scene)
            }
            Self::MoveToken { .. } => Some(RecomputeReason::Token),
            Self::SetCombat { .. } => Some(RecomputeReason::Combat),
            Self::SetMusic { .. } => Some(RecomputeReason::Playlist),
            Self::Override { .. }
            | Self::Flash { .. }
            | Self::CancelFlash { .. }
            | Self::ToggleMinified
            | Self::SetEnabled { .. }
            | Self::Refresh => None,
        }
    }
}

/// How view models are written to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One JSON object per view model.
    #[default]
    Json,
    /// Rendered display lines, followed by a blank line.
    Text,
}

/// The `driver` section of `grimoire-config.yaml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DriverConfig {
    /// Output format.
    #[serde(default)]
    pub output: OutputFormat,

    /// World clock at startup, in seconds.
    #[serde(default)]
    pub initial_world_time: i64,

    /// World title reported by the host.
    #[serde(default)]
    pub world_title: Option<String>,

    /// Scene active at startup.
    #[serde(default)]
    pub initial_scene: Option<SceneSnapshot>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            output: OutputFormat::Json,
            initial_world_time: 0,
            world_title: None,
            initial_scene: None,
        }
    }
}
