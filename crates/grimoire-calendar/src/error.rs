//! Error types for the `grimoire-calendar` crate.

/// Errors raised while validating a calendar configuration.
///
/// These are load-time failures. Once a [`Calendar`](crate::Calendar) has
/// been built, date computation cannot fail.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalendarError {
    /// No month names were configured.
    #[error("calendar must define at least one month")]
    EmptyMonthList,

    /// Months were configured with zero days.
    #[error("days_per_month must be at least 1")]
    ZeroDaysPerMonth,

    /// The year length does not fit the day counter.
    #[error("year length overflow: {months} months of {days_per_month} days")]
    YearLengthOverflow {
        /// Number of configured months.
        months: usize,
        /// Configured days per month.
        days_per_month: u32,
    },
}

/// Reasons a single moon entry cannot produce phase data.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MoonError {
    /// The cycle length is zero, negative, or not a finite number.
    #[error("moon {name:?} has invalid cycle length {cycle_days}")]
    InvalidCycle {
        /// Moon name.
        name: String,
        /// The rejected cycle length in days.
        cycle_days: f64,
    },

    /// The phase offset is not a finite number.
    #[error("moon {name:?} has invalid phase offset {phase_offset}")]
    InvalidOffset {
        /// Moon name.
        name: String,
        /// The rejected offset.
        phase_offset: f64,
    },
}
