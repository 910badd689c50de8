//! Host provider trait and in-memory implementations.
//!
//! The tabletop host owns the world clock, scenes, tokens, the combat
//! tracker and the audio mixer. The overlay only reads from them through
//! [`HostProvider`]. Every accessor can fail; the controller logs failures
//! and shows a placeholder instead of aborting the recompute.
//!
//! [`StaticHost`] is a plain snapshot of host state, used by tests and by
//! the headless driver. [`SharedHost`] wraps it for concurrent mutation
//! while a session reads it.

use core::fmt;
use std::sync::{Arc, RwLock};

use grimoire_types::Combatant;
use serde::{Deserialize, Serialize};

use crate::location::{self, Region, TokenPosition};

/// Errors reported by a host provider.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// The host cannot supply the requested value right now.
    #[error("host value unavailable: {what}")]
    Unavailable {
        /// Which value was requested.
        what: &'static str,
    },

    /// A lock around shared host state was poisoned.
    #[error("host state lock poisoned")]
    Poisoned,
}

/// A date supplied by an external calendar module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalDate {
    /// Month name as the external calendar spells it.
    pub month_name: String,
    /// Day of month.
    pub day: u32,
    /// Year.
    pub year: i64,
}

impl fmt::Display for ExternalDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}, {}", self.month_name, self.day, self.year)
    }
}

/// Read access to host state.
///
/// Implementations must be cheap to query; the controller calls every
/// accessor on each recompute.
pub trait HostProvider {
    /// Elapsed in-world seconds since the epoch.
    fn world_clock_seconds(&self) -> Result<i64, ProviderError>;

    /// Resolved location name for the viewer.
    fn current_location_name(&self) -> Result<String, ProviderError>;

    /// Weather label of the active scene, if it has one.
    fn current_weather_label(&self) -> Result<Option<String>, ProviderError>;

    /// Darkness of the active scene in `[0, 1]`.
    fn ambient_darkness_level(&self) -> Result<f64, ProviderError>;

    /// Whether an encounter is running.
    fn is_combat_active(&self) -> Result<bool, ProviderError>;

    /// The combatant whose turn it is, if any.
    fn active_combatant(&self) -> Result<Option<Combatant>, ProviderError>;

    /// Name of the playing track, if any.
    fn active_music_track(&self) -> Result<Option<String>, ProviderError>;

    /// Title of the world.
    fn world_title(&self) -> Result<Option<String>, ProviderError>;

    /// Date from an external calendar module, when one is installed.
    fn external_calendar_date(&self, _world_time_seconds: i64) -> Option<ExternalDate> {
        None
    }
}

/// The active scene as seen by the overlay.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneSnapshot {
    /// Internal scene name.
    #[serde(default)]
    pub name: Option<String>,
    /// Navigation name shown to players.
    #[serde(default)]
    pub nav_name: Option<String>,
    /// Weather label set on the scene.
    #[serde(default)]
    pub weather: Option<String>,
    /// Darkness in `[0, 1]`.
    #[serde(default)]
    pub darkness: f64,
    /// Named regions, in scene order.
    #[serde(default)]
    pub regions: Vec<Region>,
}

/// Encounter state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatSnapshot {
    /// Whether an encounter has started.
    pub started: bool,
    /// The combatant whose turn it is.
    #[serde(default)]
    pub combatant: Option<Combatant>,
}

/// In-memory snapshot of everything the overlay reads from the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaticHost {
    /// World clock in seconds.
    pub world_time: i64,
    /// World title.
    pub world_title: Option<String>,
    /// Active scene. `None` when no scene is viewed.
    pub scene: Option<SceneSnapshot>,
    /// Position of the viewer's controlled token.
    pub controlled_token: Option<TokenPosition>,
    /// Active encounter, if any.
    pub combat: Option<CombatSnapshot>,
    /// Playing track name.
    pub music: Option<String>,
    /// Date supplied by an external calendar module.
    pub external_date: Option<ExternalDate>,
}

impl StaticHost {
    /// A host with the clock at `world_time` and nothing else set.
    pub fn at(world_time: i64) -> Self {
        Self {
            world_time,
            ..Self::default()
        }
    }

    /// Wrap into a [`SharedHost`].
    pub fn shared(self) -> SharedHost {
        Arc::new(RwLock::new(self))
    }
}

impl HostProvider for StaticHost {
    fn world_clock_seconds(&self) -> Result<i64, ProviderError> {
        Ok(self.world_time)
    }

    fn current_location_name(&self) -> Result<String, ProviderError> {
        let Some(scene) = &self.scene else {
            return Ok(location::UNKNOWN_LOCATION.to_owned());
        };
        Ok(location::resolve_location(
            scene.nav_name.as_deref(),
            scene.name.as_deref(),
            self.controlled_token.as_ref(),
            &scene.regions,
        ))
    }

    fn current_weather_label(&self) -> Result<Option<String>, ProviderError> {
        Ok(self
            .scene
            .as_ref()
            .and_then(|scene| scene.weather.clone())
            .filter(|weather| !weather.trim().is_empty()))
    }

    fn ambient_darkness_level(&self) -> Result<f64, ProviderError> {
        self.scene
            .as_ref()
            .map(|scene| scene.darkness)
            .ok_or(ProviderError::Unavailable { what: "scene darkness" })
    }

    fn is_combat_active(&self) -> Result<bool, ProviderError> {
        Ok(self.combat.as_ref().is_some_and(|combat| combat.started))
    }

    fn active_combatant(&self) -> Result<Option<Combatant>, ProviderError> {
        Ok(self
            .combat
            .as_ref()
            .and_then(|combat| combat.combatant.clone()))
    }

    fn active_music_track(&self) -> Result<Option<String>, ProviderError> {
        Ok(self.music.clone())
    }

    fn world_title(&self) -> Result<Option<String>, ProviderError> {
        Ok(self.world_title.clone())
    }

    fn external_calendar_date(&self, _world_time_seconds: i64) -> Option<ExternalDate> {
        self.external_date.clone()
    }
}

/// A [`StaticHost`] that the driver mutates while a session reads it.
pub type SharedHost = Arc<RwLock<StaticHost>>;

fn read_host<T>(
    host: &SharedHost,
    read: impl FnOnce(&StaticHost) -> Result<T, ProviderError>,
) -> Result<T, ProviderError> {
    let guard = host.read().map_err(|_poison| ProviderError::Poisoned)?;
    read(&*guard)
}

impl HostProvider for SharedHost {
    fn world_clock_seconds(&self) -> Result<i64, ProviderError> {
        read_host(self, StaticHost::world_clock_seconds)
    }

    fn current_location_name(&self) -> Result<String, ProviderError> {
        read_host(self, StaticHost::current_location_name)
    }

    fn current_weather_label(&self) -> Result<Option<String>, ProviderError> {
        read_host(self, StaticHost::current_weather_label)
    }

    fn ambient_darkness_level(&self) -> Result<f64, ProviderError> {
        read_host(self, StaticHost::ambient_darkness_level)
    }

    fn is_combat_active(&self) -> Result<bool, ProviderError> {
        read_host(self, StaticHost::is_combat_active)
    }

    fn active_combatant(&self) -> Result<Option<Combatant>, ProviderError> {
        read_host(self, StaticHost::active_combatant)
    }

    fn active_music_track(&self) -> Result<Option<String>, ProviderError> {
        read_host(self, StaticHost::active_music_track)
    }

    fn world_title(&self) -> Result<Option<String>, ProviderError> {
        read_host(self, StaticHost::world_title)
    }

    fn external_calendar_date(&self, world_time_seconds: i64) -> Option<ExternalDate> {
        self.read()
            .ok()
            .and_then(|guard| guard.external_calendar_date(world_time_seconds))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::location::RegionShape;

    fn tavern_host() -> StaticHost {
        StaticHost {
            scene: Some(SceneSnapshot {
                name: Some("map-07".to_owned()),
                nav_name: Some("Waterdeep".to_owned()),
                weather: Some("Light Rain".to_owned()),
                darkness: 0.4,
                regions: vec![Region {
                    name: "Yawning Portal".to_owned(),
                    shapes: vec![RegionShape::Rectangle {
                        x: 0.0,
                        y: 0.0,
                        width: 100.0,
                        height: 100.0,
                    }],
                    elevation: location::ElevationRange::default(),
                }],
            }),
            ..StaticHost::at(3600)
        }
    }

    #[test]
    fn static_host_reports_scene_values() {
        let host = tavern_host();
        assert_eq!(host.world_clock_seconds().unwrap(), 3600);
        assert_eq!(host.current_location_name().unwrap(), "Waterdeep");
        assert_eq!(host.current_weather_label().unwrap().as_deref(), Some("Light Rain"));
        assert!((host.ambient_darkness_level().unwrap() - 0.4).abs() < f64::EPSILON);
        assert!(!host.is_combat_active().unwrap());
    }

    #[test]
    fn token_in_region_refines_location() {
        let mut host = tavern_host();
        host.controlled_token = Some(TokenPosition {
            x: 10.0,
            y: 10.0,
            elevation: 0.0,
        });
        assert_eq!(host.current_location_name().unwrap(), "Yawning Portal");
    }

    #[test]
    fn no_scene_means_unknown_location_and_no_darkness() {
        let host = StaticHost::at(0);
        assert_eq!(host.current_location_name().unwrap(), "Unknown");
        assert!(host.ambient_darkness_level().is_err());
        assert!(host.current_weather_label().unwrap().is_none());
    }

    #[test]
    fn blank_weather_is_treated_as_missing() {
        let mut host = tavern_host();
        if let Some(scene) = host.scene.as_mut() {
            scene.weather = Some("   ".to_owned());
        }
        assert!(host.current_weather_label().unwrap().is_none());
    }

    #[test]
    fn external_date_formats_month_first() {
        let date = ExternalDate {
            month_name: "Mirtul".to_owned(),
            day: 3,
            year: 1492,
        };
        assert_eq!(date.to_string(), "Mirtul 3, 1492");
    }

    #[test]
    fn shared_host_sees_mutations() {
        let shared = tavern_host().shared();
        shared.write().unwrap().world_time = 7200;
        assert_eq!(shared.world_clock_seconds().unwrap(), 7200);
    }

    #[test]
    fn poisoned_shared_host_reports_error() {
        let shared = tavern_host().shared();
        let clone = Arc::clone(&shared);
        let _ = std::thread::spawn(move || {
            let _guard = clone.write().unwrap();
            panic!("poison the lock");
        })
        .join();
        assert_eq!(shared.world_clock_seconds(), Err(ProviderError::Poisoned));
        assert!(shared.external_calendar_date(0).is_none());
    }
}
