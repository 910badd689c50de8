//! Calendar and lunar phase engine for the Grimoire HUD.
//!
//! Everything in this crate is a pure function of the world clock and the
//! supplied configuration. There is no state, no I/O, and no dependency on
//! the host application.
//!
//! # Modules
//!
//! - [`calendar`] -- Elapsed seconds to fantasy calendar date.
//! - [`moon`] -- Per-moon phase computation and moon configuration parsing.
//! - [`error`] -- Configuration validation errors.

pub mod calendar;
pub mod error;
pub mod moon;

pub use calendar::{
    Calendar, CalendarConfig, CalendarDate, SECONDS_PER_DAY, UNKNOWN_MONTH, calendar_date,
    compute_calendar_date,
};
pub use error::{CalendarError, MoonError};
pub use moon::{
    MoonConfig, MoonPhase, PhaseDescriptor, bucket_for_ratio, compute_moon_phase, moon_phases,
    parse_moon_config, sanitize_moons,
};
