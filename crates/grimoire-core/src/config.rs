//! Configuration loading and typed config structures for the Grimoire HUD.
//!
//! The configuration lives in `grimoire-config.yaml`. It mirrors the
//! overlay's settings store: world-scoped calendar and moon settings, and
//! client-scoped display toggles. [`HudConfig::into_settings`] validates
//! the raw file into the immutable [`HudSettings`] handed to every
//! recompute.
//!
//! Moons may be written either as a YAML list or as the JSON string the
//! settings store keeps. Month names may be a YAML list or a single
//! comma-separated string.

use std::path::Path;

use grimoire_calendar::{Calendar, CalendarConfig, CalendarError, MoonConfig};
use grimoire_types::Theme;
use serde::Deserialize;
use tracing::warn;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The calendar section does not describe a usable calendar.
    #[error("invalid calendar configuration: {source}")]
    Calendar {
        /// The underlying validation error.
        #[from]
        source: CalendarError,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level overlay configuration, as written in `grimoire-config.yaml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HudConfig {
    /// Calendar settings (world scope).
    #[serde(default)]
    pub calendar: CalendarSection,

    /// Moon list (world scope), as a YAML list or a JSON string.
    #[serde(default = "default_moons")]
    pub moons: serde_yml::Value,

    /// Display toggles (client scope).
    #[serde(default)]
    pub display: DisplayConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for HudConfig {
    fn default() -> Self {
        Self {
            calendar: CalendarSection::default(),
            moons: default_moons(),
            display: DisplayConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl HudConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `GRIMOIRE_LOG_LEVEL` overrides `logging.level` when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.logging.apply_env_overrides();
        Ok(config)
    }

    /// Resolve the moon list, skipping anything that cannot be used.
    ///
    /// A malformed moon setting degrades to zero moons rather than an error.
    pub fn moon_configs(&self) -> Vec<MoonConfig> {
        let raw = match &self.moons {
            serde_yml::Value::Null => Vec::new(),
            serde_yml::Value::String(json) => grimoire_calendar::parse_moon_config(json),
            serde_yml::Value::Sequence(entries) => entries
                .iter()
                .enumerate()
                .filter_map(|(index, entry)| {
                    match serde_yml::from_value::<MoonConfig>(entry.clone()) {
                        Ok(moon) => Some(moon),
                        Err(err) => {
                            warn!(index, error = %err, "skipping malformed moon entry");
                            None
                        }
                    }
                })
                .collect(),
            _ => {
                warn!("moons must be a list or a JSON string, showing no moons");
                Vec::new()
            }
        };
        grimoire_calendar::sanitize_moons(raw)
    }

    /// Validate into the settings used by every recompute.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Calendar`] if the calendar has no months or
    /// zero-length months. Moon problems are never fatal.
    pub fn into_settings(self) -> Result<HudSettings, ConfigError> {
        let moons = self.moon_configs();
        let calendar = Calendar::new(self.calendar.into_calendar_config())?;
        Ok(HudSettings {
            calendar,
            moons,
            display: self.display,
        })
    }
}

/// Validated, immutable settings for one recompute.
#[derive(Debug, Clone, PartialEq)]
pub struct HudSettings {
    /// The validated calendar.
    pub calendar: Calendar,
    /// Usable moons in display order.
    pub moons: Vec<MoonConfig>,
    /// Display toggles.
    pub display: DisplayConfig,
}

impl HudSettings {
    /// Settings built from the built-in defaults.
    ///
    /// # Errors
    ///
    /// Only fails if the built-in calendar were invalid.
    pub fn defaults() -> Result<Self, ConfigError> {
        HudConfig::parse("")?.into_settings()
    }
}

/// Month names as either a list or one comma-separated string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum MonthNames {
    /// One YAML entry per month.
    List(Vec<String>),
    /// `"Hammer, Alturiak, ..."`.
    CommaSeparated(String),
}

impl MonthNames {
    /// Split into individual month names (trimming happens in the engine).
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::List(names) => names,
            Self::CommaSeparated(joined) => joined.split(',').map(str::to_owned).collect(),
        }
    }
}

/// Calendar configuration section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CalendarSection {
    /// Year shown at world time zero.
    #[serde(default = "default_starting_year", alias = "current_year")]
    pub starting_year: i64,

    /// Era suffix appended to the year.
    #[serde(default = "default_era_suffix")]
    pub era_suffix: String,

    /// Month names in order.
    #[serde(default = "default_month_names")]
    pub month_names: MonthNames,

    /// Days in every month.
    #[serde(default = "default_days_per_month", alias = "days_in_month")]
    pub days_per_month: u32,
}

impl CalendarSection {
    /// Convert into the engine's raw calendar configuration.
    pub fn into_calendar_config(self) -> CalendarConfig {
        CalendarConfig {
            starting_year: self.starting_year,
            era_suffix: self.era_suffix,
            month_names: self.month_names.into_vec(),
            days_per_month: self.days_per_month,
        }
    }
}

impl Default for CalendarSection {
    fn default() -> Self {
        Self {
            starting_year: default_starting_year(),
            era_suffix: default_era_suffix(),
            month_names: default_month_names(),
            days_per_month: default_days_per_month(),
        }
    }
}

/// Display toggles and presentation options.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DisplayConfig {
    /// Master switch. When off, no view model is published.
    #[serde(default = "default_true", alias = "enable_hud")]
    pub enabled: bool,

    /// Visual theme.
    #[serde(default)]
    pub theme: Theme,

    /// Compact layout.
    #[serde(default)]
    pub compact_mode: bool,

    /// Show the world title line.
    #[serde(default)]
    pub show_world_name: bool,

    /// Show the location line.
    #[serde(default = "default_true")]
    pub show_location: bool,

    /// Show the date line.
    #[serde(default = "default_true")]
    pub show_date: bool,

    /// Show the weather line.
    #[serde(default = "default_true")]
    pub show_weather: bool,

    /// Show moon phases.
    #[serde(default = "default_true")]
    pub show_moons: bool,

    /// Replace the date with the turn indicator during combat.
    #[serde(default = "default_true")]
    pub show_combat: bool,

    /// Show the lighting line.
    #[serde(default = "default_true")]
    pub show_lighting: bool,

    /// Show the now-playing line.
    #[serde(default = "default_true")]
    pub show_music: bool,

    /// How long a flash message stays up, in milliseconds.
    #[serde(default = "default_flash_duration_ms")]
    pub flash_duration_ms: u64,

    /// Character limit for long fields outside compact mode.
    #[serde(default = "default_truncate_at")]
    pub truncate_at: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            theme: Theme::default(),
            compact_mode: false,
            show_world_name: false,
            show_location: true,
            show_date: true,
            show_weather: true,
            show_moons: true,
            show_combat: true,
            show_lighting: true,
            show_music: true,
            flash_duration_ms: default_flash_duration_ms(),
            truncate_at: default_truncate_at(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) or an `EnvFilter`
    /// directive string.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit log records as JSON lines instead of human-readable text.
    #[serde(default)]
    pub json: bool,
}

impl LoggingConfig {
    /// Override the level with `GRIMOIRE_LOG_LEVEL` when set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("GRIMOIRE_LOG_LEVEL") {
            self.level = val;
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

const fn default_starting_year() -> i64 {
    1492
}

fn default_era_suffix() -> String {
    "DR".to_owned()
}

fn default_month_names() -> MonthNames {
    MonthNames::CommaSeparated(
        "Hammer, Alturiak, Ches, Tarsakh, Mirtul, Kythorn, Flamerule, Eleasis, Eleint, Marpenoth, Uktar, Nightal"
            .to_owned(),
    )
}

const fn default_days_per_month() -> u32 {
    30
}

fn default_moons() -> serde_yml::Value {
    serde_yml::Value::String(
        r##"[
            { "name": "Luna",     "cycleDays": 29.5, "color": "#e0e0e0", "phaseOffset": 0 },
            { "name": "Celestia", "cycleDays": 7.0,  "color": "#aaffaa", "phaseOffset": 0.5 },
            { "name": "Umbra",    "cycleDays": 400,  "color": "#aa00ff", "phaseOffset": 0.25 }
        ]"##
        .to_owned(),
    )
}

const fn default_flash_duration_ms() -> u64 {
    3000
}

const fn default_truncate_at() -> usize {
    24
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_overlay_settings() {
        let settings = HudSettings::defaults().unwrap();
        assert_eq!(settings.calendar.starting_year(), 1492);
        assert_eq!(settings.calendar.era_suffix(), "DR");
        assert_eq!(settings.calendar.month_names().len(), 12);
        assert_eq!(settings.calendar.days_per_month(), 30);
        let names: Vec<&str> = settings.moons.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Luna", "Celestia", "Umbra"]);
        assert!(settings.display.enabled);
        assert!(!settings.display.show_world_name);
        assert_eq!(settings.display.flash_duration_ms, 3000);
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r##"
calendar:
  starting_year: 700
  era_suffix: "AE"
  month_names:
    - Frostfall
    - Thaw
    - Bloom
  days_per_month: 28

moons:
  - name: Sólas
    cycle_days: 14
    color: "#ffcc00"
  - name: Nox
    cycleDays: 3.5
    phaseOffset: 0.5

display:
  theme: parchment
  compact_mode: true
  show_world_name: true
  show_music: false
  flash_duration_ms: 1500

logging:
  level: debug
"##;
        let config = HudConfig::parse(yaml).unwrap();
        assert_eq!(config.calendar.starting_year, 700);
        assert_eq!(config.display.theme, Theme::Parchment);
        assert!(config.display.compact_mode);
        assert!(!config.display.show_music);

        let settings = config.into_settings().unwrap();
        assert_eq!(settings.calendar.days_per_year(), 84);
        assert_eq!(settings.moons.len(), 2);
        assert!((settings.moons.last().unwrap().phase_offset - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn month_names_accept_comma_separated_string() {
        let yaml = "calendar:\n  month_names: \"Hammer, Alturiak ,Ches\"\n";
        let settings = HudConfig::parse(yaml).unwrap().into_settings().unwrap();
        assert_eq!(
            settings.calendar.month_names(),
            ["Hammer".to_owned(), "Alturiak".to_owned(), "Ches".to_owned()]
        );
    }

    #[test]
    fn legacy_setting_names_are_accepted() {
        let yaml = "calendar:\n  current_year: 1372\n  days_in_month: 10\ndisplay:\n  enable_hud: false\n";
        let config = HudConfig::parse(yaml).unwrap();
        assert_eq!(config.calendar.starting_year, 1372);
        assert_eq!(config.calendar.days_per_month, 10);
        assert!(!config.display.enabled);
    }

    #[test]
    fn moons_as_json_string() {
        let yaml = "moons: '[{\"name\": \"Luna\", \"cycleDays\": 29.5}]'\n";
        let config = HudConfig::parse(yaml).unwrap();
        assert_eq!(config.moon_configs().len(), 1);
    }

    #[test]
    fn broken_moons_degrade_to_empty() {
        let config = HudConfig::parse("moons: '{not json'\n").unwrap();
        assert!(config.moon_configs().is_empty());

        let config = HudConfig::parse("moons: 42\n").unwrap();
        assert!(config.moon_configs().is_empty());

        let config = HudConfig::parse("moons:\n").unwrap();
        assert!(config.moon_configs().is_empty());
    }

    #[test]
    fn invalid_moon_entries_are_skipped() {
        let yaml = "moons:\n  - name: Luna\n    cycle_days: 29.5\n  - name: Dead\n    cycle_days: 0\n  - color: red\n";
        let config = HudConfig::parse(yaml).unwrap();
        let moons = config.moon_configs();
        assert_eq!(moons.len(), 1);
        assert_eq!(moons.first().unwrap().name, "Luna");
    }

    #[test]
    fn empty_month_list_fails_at_load() {
        let yaml = "calendar:\n  month_names: []\n";
        let result = HudConfig::parse(yaml).unwrap().into_settings();
        assert!(matches!(
            result,
            Err(ConfigError::Calendar {
                source: CalendarError::EmptyMonthList
            })
        ));
    }

    #[test]
    fn zero_days_per_month_fails_at_load() {
        let yaml = "calendar:\n  days_per_month: 0\n";
        let result = HudConfig::parse(yaml).unwrap().into_settings();
        assert!(result.is_err());
    }

    #[test]
    fn parse_empty_yaml() {
        assert!(HudConfig::parse("").is_ok());
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("grimoire-config.yaml");
        if path.exists() {
            let config = HudConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
            assert!(config.unwrap().into_settings().is_ok());
        }
    }
}
