//! Display state controller.
//!
//! The controller owns the per-viewer display state: field overrides, the
//! minified flag and the pending flash. [`DisplayController::request_recompute`]
//! turns that state, the host's current values and the active settings into
//! a fresh [`ViewModel`].
//!
//! # Date precedence
//!
//! The date line resolves as: override, then the combat turn indicator
//! (when combat display is on and an encounter is running), then the
//! external calendar date, then the computed calendar date. Combat only
//! replaces the base value; an override still wins over it.
//!
//! # Flash messages
//!
//! A flash writes the date override and records its [`FlashId`] as pending.
//! Only the pending flash may clear the override on expiry. Flashing again
//! replaces the pending id, so an earlier flash's expiry is ignored and
//! cannot wipe the newer message early.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use grimoire_calendar::{compute_calendar_date, moon_phases};
use grimoire_types::{FlashId, FlashTicket, HudField, LightingLevel, MoonView, ViewModel};
use tracing::{debug, warn};

use crate::config::HudSettings;
use crate::host::{HostProvider, ProviderError};
use crate::overrides::OverrideMap;

/// Placeholder for a value the host could not supply.
pub const UNKNOWN: &str = "Unknown";

/// Weather shown when the scene sets none.
pub const DEFAULT_WEATHER: &str = "Clear";

/// Date line during combat when nobody holds the turn.
pub const NO_COMBATANT: &str = "No combatant";

/// Flash duration used when none is configured.
pub const DEFAULT_FLASH_DURATION: Duration = Duration::from_millis(3000);

/// Errors returned by controller mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ControllerError {
    /// The override key does not name a displayable field.
    #[error("unknown override field: {key}")]
    UnknownField {
        /// The rejected key.
        key: String,
    },
}

/// Per-viewer display state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayController {
    overrides: OverrideMap,
    is_minified: bool,
    pending_flash: Option<FlashId>,
}

impl DisplayController {
    /// A controller with no overrides, expanded, and no flash pending.
    pub const fn new() -> Self {
        Self {
            overrides: OverrideMap::new(),
            is_minified: false,
            pending_flash: None,
        }
    }

    /// Active overrides.
    pub const fn overrides(&self) -> &OverrideMap {
        &self.overrides
    }

    /// Whether the overlay is collapsed.
    pub const fn is_minified(&self) -> bool {
        self.is_minified
    }

    /// The flash whose expiry is still armed, if any.
    pub const fn pending_flash(&self) -> Option<FlashId> {
        self.pending_flash
    }

    /// Build a fresh view model from the current state.
    ///
    /// Never fails: provider errors are logged and shown as [`UNKNOWN`].
    /// Equal inputs always produce equal view models.
    pub fn request_recompute(&self, host: &dyn HostProvider, settings: &HudSettings) -> ViewModel {
        let display = &settings.display;
        let clock = provided(host.world_clock_seconds(), "world clock");
        let is_combat_active =
            provided(host.is_combat_active(), "combat state").unwrap_or(false);

        let location = display.show_location.then(|| {
            self.overrides.resolve_with(HudField::Location, || {
                provided(host.current_location_name(), "location")
                    .unwrap_or_else(|| UNKNOWN.to_owned())
            })
        });

        let date = display.show_date.then(|| {
            self.overrides.resolve_with(HudField::Date, || {
                if display.show_combat && is_combat_active {
                    turn_indicator(host)
                } else {
                    calendar_line(host, settings, clock)
                }
            })
        });

        let weather = display.show_weather.then(|| {
            self.overrides.resolve_with(HudField::Weather, || {
                provided(host.current_weather_label(), "weather").map_or_else(
                    || UNKNOWN.to_owned(),
                    |label| label.unwrap_or_else(|| DEFAULT_WEATHER.to_owned()),
                )
            })
        });

        let (lighting, lighting_level) = if display.show_lighting {
            self.lighting(host)
        } else {
            (None, None)
        };

        let music = if display.show_music {
            self.music(host)
        } else {
            None
        };

        let world_name = if display.show_world_name {
            match host.world_title() {
                Ok(title) => title,
                Err(err) => {
                    warn!(error = %err, value = "world title", "host value unavailable");
                    Some(UNKNOWN.to_owned())
                }
            }
        } else {
            None
        };

        let moons = match clock {
            Some(world_time) if display.show_moons => moon_phases(world_time, &settings.moons)
                .into_iter()
                .map(|phase| MoonView {
                    name: phase.moon.name,
                    color: phase.moon.color,
                    bucket: phase.phase.bucket,
                    bucket_index: phase.phase.bucket_index(),
                    label: phase.phase.label().to_owned(),
                    ratio: phase.phase.ratio,
                })
                .collect(),
            _ => Vec::new(),
        };

        ViewModel {
            location,
            date,
            weather,
            lighting,
            lighting_level,
            music,
            world_name,
            moons,
            theme: display.theme,
            is_compact: display.compact_mode,
            is_minified: self.is_minified,
            is_combat_active,
        }
    }

    fn lighting(&self, host: &dyn HostProvider) -> (Option<String>, Option<LightingLevel>) {
        if let Some(text) = self.overrides.get(HudField::Lighting) {
            return (Some(text.to_owned()), None);
        }
        let level = provided(host.ambient_darkness_level(), "darkness")
            .and_then(LightingLevel::from_darkness);
        let text = level.map_or(UNKNOWN, LightingLevel::label);
        (Some(text.to_owned()), level)
    }

    fn music(&self, host: &dyn HostProvider) -> Option<String> {
        if let Some(text) = self.overrides.get(HudField::Music) {
            return Some(text.to_owned());
        }
        match host.active_music_track() {
            Ok(track) => track.filter(|name| !name.trim().is_empty()),
            Err(err) => {
                warn!(error = %err, value = "music", "host value unavailable");
                Some(UNKNOWN.to_owned())
            }
        }
    }

    /// Set (`Some`) or clear (`None`) the override for the field named `key`.
    ///
    /// Touching the `date` override disarms any pending flash expiry, so a
    /// value set here is never wiped by an older flash. Returns the
    /// previous override.
    pub fn set_override(
        &mut self,
        key: &str,
        value: Option<String>,
    ) -> Result<Option<String>, ControllerError> {
        let field = HudField::from_key(key).ok_or_else(|| ControllerError::UnknownField {
            key: key.to_owned(),
        })?;
        if field == HudField::Date {
            if let Some(flash) = self.pending_flash.take() {
                debug!(%flash, "date override set explicitly, flash expiry disarmed");
            }
        }
        debug!(%field, cleared = value.is_none(), "override updated");
        Ok(self.overrides.set(field, value))
    }

    /// Show `text` on the date line for `duration`.
    ///
    /// Any earlier pending flash is replaced. The caller is responsible
    /// for calling [`expire_flash`](Self::expire_flash) with the returned
    /// id once the duration has passed.
    pub fn flash_message(&mut self, text: impl Into<String>, duration: Duration) -> FlashTicket {
        let id = FlashId::new();
        if let Some(previous) = self.pending_flash.replace(id) {
            debug!(%previous, %id, "pending flash replaced");
        }
        self.overrides.set(HudField::Date, Some(text.into()));

        let expires_at = TimeDelta::from_std(duration)
            .ok()
            .and_then(|delta| Utc::now().checked_add_signed(delta))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        FlashTicket {
            id,
            duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
            expires_at,
        }
    }

    /// Clear the flash text if `id` is still the pending flash.
    ///
    /// Returns `false` (and changes nothing) for replaced or cancelled
    /// flashes.
    pub fn expire_flash(&mut self, id: FlashId) -> bool {
        if self.pending_flash != Some(id) {
            debug!(%id, "stale flash expiry ignored");
            return false;
        }
        self.pending_flash = None;
        self.overrides.set(HudField::Date, None);
        debug!(%id, "flash expired");
        true
    }

    /// Disarm the expiry of flash `id`, leaving its text pinned as an
    /// ordinary date override.
    pub fn cancel_flash(&mut self, id: FlashId) -> bool {
        if self.pending_flash == Some(id) {
            self.pending_flash = None;
            debug!(%id, "flash expiry cancelled");
            true
        } else {
            false
        }
    }

    /// Flip the minified flag and return the new value.
    pub const fn toggle_minified(&mut self) -> bool {
        self.is_minified = !self.is_minified;
        self.is_minified
    }
}

/// Log a provider failure and discard it.
fn provided<T>(result: Result<T, ProviderError>, what: &'static str) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(error = %err, value = what, "host value unavailable");
            None
        }
    }
}

fn turn_indicator(host: &dyn HostProvider) -> String {
    match provided(host.active_combatant(), "active combatant") {
        Some(Some(combatant)) => format!("Turn: {}", combatant.display_name),
        Some(None) => NO_COMBATANT.to_owned(),
        None => UNKNOWN.to_owned(),
    }
}

fn calendar_line(host: &dyn HostProvider, settings: &HudSettings, clock: Option<i64>) -> String {
    let Some(world_time) = clock else {
        return UNKNOWN.to_owned();
    };
    host.external_calendar_date(world_time).map_or_else(
        || compute_calendar_date(world_time, &settings.calendar),
        |date| date.to_string(),
    )
}
