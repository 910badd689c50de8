//! Fantasy calendar date computation.
//!
//! Converts an elapsed-seconds world clock into a day, month and year under
//! a calendar of uniform months. There are no leap years and every month
//! has the same length.
//!
//! # Design Principles
//!
//! - The world clock is the only time input. Dates are never stored.
//! - Day and year boundaries use floor division (`div_euclid`), so time
//!   before the epoch walks backward into the previous year instead of
//!   truncating toward zero.
//! - Configuration is validated once in [`Calendar::new`]. Formatting a
//!   date cannot fail afterwards.

use core::fmt;

use crate::error::CalendarError;

/// Seconds in one in-world day.
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Label substituted when a month index has no configured name.
pub const UNKNOWN_MONTH: &str = "Unknown";

/// Raw calendar configuration as supplied by the settings store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarConfig {
    /// Year displayed at world time zero.
    pub starting_year: i64,
    /// Suffix appended to the year, e.g. "DR".
    pub era_suffix: String,
    /// Ordered month names.
    pub month_names: Vec<String>,
    /// Length of every month in days.
    pub days_per_month: u32,
}

/// A validated calendar.
///
/// Construction guarantees at least one month and a non-zero month length,
/// so the year length is always positive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Calendar {
    starting_year: i64,
    era_suffix: String,
    month_names: Vec<String>,
    days_per_month: u32,
    days_per_year: u32,
}

impl Calendar {
    /// Validate a configuration into a calendar.
    ///
    /// Month names are trimmed and blank names are dropped before the
    /// month count is checked.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::EmptyMonthList`] if no month names remain,
    /// [`CalendarError::ZeroDaysPerMonth`] for zero-length months, or
    /// [`CalendarError::YearLengthOverflow`] if the year length does not
    /// fit in a `u32`.
    pub fn new(config: CalendarConfig) -> Result<Self, CalendarError> {
        let month_names: Vec<String> = config
            .month_names
            .iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .map(str::to_owned)
            .collect();

        if month_names.is_empty() {
            return Err(CalendarError::EmptyMonthList);
        }
        if config.days_per_month == 0 {
            return Err(CalendarError::ZeroDaysPerMonth);
        }

        let overflow = || CalendarError::YearLengthOverflow {
            months: month_names.len(),
            days_per_month: config.days_per_month,
        };
        let month_count = u32::try_from(month_names.len()).map_err(|_err| overflow())?;
        let days_per_year = config
            .days_per_month
            .checked_mul(month_count)
            .ok_or_else(overflow)?;

        Ok(Self {
            starting_year: config.starting_year,
            era_suffix: config.era_suffix.trim().to_owned(),
            month_names,
            days_per_month: config.days_per_month,
            days_per_year,
        })
    }

    /// Year displayed at world time zero.
    pub const fn starting_year(&self) -> i64 {
        self.starting_year
    }

    /// Era suffix appended to the year.
    pub fn era_suffix(&self) -> &str {
        &self.era_suffix
    }

    /// Configured month names in order.
    pub fn month_names(&self) -> &[String] {
        &self.month_names
    }

    /// Days in every month.
    pub const fn days_per_month(&self) -> u32 {
        self.days_per_month
    }

    /// Days in one year (`days_per_month * month count`).
    pub const fn days_per_year(&self) -> u32 {
        self.days_per_year
    }

    /// Name of the month at `index`, or [`UNKNOWN_MONTH`] if out of range.
    pub fn month_name(&self, index: usize) -> &str {
        self.month_names
            .get(index)
            .map_or(UNKNOWN_MONTH, String::as_str)
    }

    /// Resolve the date shown at `world_time_seconds`.
    pub fn date_at(&self, world_time_seconds: i64) -> CalendarDate {
        let total_days = world_time_seconds
            .checked_div_euclid(SECONDS_PER_DAY)
            .unwrap_or(0);
        let days_per_year = i64::from(self.days_per_year);

        // Safe: days_per_year >= 1 by construction.
        let years_elapsed = total_days.checked_div_euclid(days_per_year).unwrap_or(0);
        let day_of_year = total_days.checked_rem_euclid(days_per_year).unwrap_or(0);

        // rem_euclid with a positive divisor lands in [0, days_per_year).
        let day_of_year = u32::try_from(day_of_year).unwrap_or(0);
        let month_index = day_of_year.checked_div(self.days_per_month).unwrap_or(0);
        let day_of_month = day_of_year
            .checked_rem(self.days_per_month)
            .unwrap_or(0)
            .saturating_add(1);
        let month_index = usize::try_from(month_index).unwrap_or(usize::MAX);

        CalendarDate {
            year: self.starting_year.saturating_add(years_elapsed),
            month_index,
            month_name: self.month_name(month_index).to_owned(),
            day_of_month,
            era_suffix: self.era_suffix.clone(),
        }
    }
}

/// A resolved calendar date.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDate {
    /// Calendar year, including the starting-year offset.
    pub year: i64,
    /// Zero-based month index.
    pub month_index: usize,
    /// Month name, or [`UNKNOWN_MONTH`].
    pub month_name: String,
    /// One-based day within the month.
    pub day_of_month: u32,
    /// Era suffix.
    pub era_suffix: String,
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}, {}", self.day_of_month, self.month_name, self.year)?;
        if !self.era_suffix.is_empty() {
            write!(f, " {}", self.era_suffix)?;
        }
        Ok(())
    }
}

/// Resolve the structured date at `world_time_seconds`.
pub fn calendar_date(world_time_seconds: i64, calendar: &Calendar) -> CalendarDate {
    calendar.date_at(world_time_seconds)
}

/// Format the date at `world_time_seconds` as
/// `"{day} {month}, {year} {era}"`.
pub fn compute_calendar_date(world_time_seconds: i64, calendar: &Calendar) -> String {
    calendar.date_at(world_time_seconds).to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const HARPTOS: [&str; 12] = [
        "Hammer",
        "Alturiak",
        "Ches",
        "Tarsakh",
        "Mirtul",
        "Kythorn",
        "Flamerule",
        "Eleasis",
        "Eleint",
        "Marpenoth",
        "Uktar",
        "Nightal",
    ];

    /// Helper to build the Harptos calendar used across tests.
    fn harptos() -> Calendar {
        Calendar::new(CalendarConfig {
            starting_year: 1492,
            era_suffix: "DR".to_owned(),
            month_names: HARPTOS.iter().map(|m| (*m).to_owned()).collect(),
            days_per_month: 30,
        })
        .unwrap()
    }

    const fn days(n: i64) -> i64 {
        n * SECONDS_PER_DAY
    }

    #[test]
    fn epoch_is_first_day_of_starting_year() {
        assert_eq!(compute_calendar_date(0, &harptos()), "1 Hammer, 1492 DR");
    }

    #[test]
    fn one_day_later() {
        assert_eq!(compute_calendar_date(days(1), &harptos()), "2 Hammer, 1492 DR");
    }

    #[test]
    fn partial_days_floor() {
        let cal = harptos();
        assert_eq!(compute_calendar_date(days(1) - 1, &cal), "1 Hammer, 1492 DR");
        assert_eq!(compute_calendar_date(days(1) + 1, &cal), "2 Hammer, 1492 DR");
    }

    #[test]
    fn month_rollover() {
        let cal = harptos();
        assert_eq!(compute_calendar_date(days(29), &cal), "30 Hammer, 1492 DR");
        assert_eq!(compute_calendar_date(days(30), &cal), "1 Alturiak, 1492 DR");
        assert_eq!(compute_calendar_date(days(359), &cal), "30 Nightal, 1492 DR");
    }

    #[test]
    fn full_year_rolls_over() {
        assert_eq!(compute_calendar_date(days(360), &harptos()), "1 Hammer, 1493 DR");
    }

    #[test]
    fn negative_time_walks_backward() {
        let cal = harptos();
        // One second before the epoch is the last day of the previous year.
        assert_eq!(compute_calendar_date(-1, &cal), "30 Nightal, 1491 DR");
        assert_eq!(compute_calendar_date(-days(1), &cal), "30 Nightal, 1491 DR");
        assert_eq!(compute_calendar_date(-days(1) - 1, &cal), "29 Nightal, 1491 DR");
        assert_eq!(compute_calendar_date(-days(360), &cal), "1 Hammer, 1491 DR");
        assert_eq!(compute_calendar_date(-days(361), &cal), "30 Nightal, 1490 DR");
    }

    #[test]
    fn structured_date_parts() {
        let date = calendar_date(days(45), &harptos());
        assert_eq!(date.year, 1492);
        assert_eq!(date.month_index, 1);
        assert_eq!(date.month_name, "Alturiak");
        assert_eq!(date.day_of_month, 16);
    }

    #[test]
    fn days_per_year_is_product() {
        assert_eq!(harptos().days_per_year(), 360);
    }

    #[test]
    fn month_names_are_trimmed_and_blanks_dropped() {
        let cal = Calendar::new(CalendarConfig {
            starting_year: 1,
            era_suffix: " AR ".to_owned(),
            month_names: vec![" Frost ".to_owned(), String::new(), "Thaw".to_owned()],
            days_per_month: 10,
        })
        .unwrap();
        assert_eq!(cal.month_names(), ["Frost".to_owned(), "Thaw".to_owned()]);
        assert_eq!(cal.days_per_year(), 20);
        assert_eq!(compute_calendar_date(days(10), &cal), "1 Thaw, 1 AR");
    }

    #[test]
    fn empty_era_suffix_has_no_trailing_space() {
        let cal = Calendar::new(CalendarConfig {
            starting_year: 7,
            era_suffix: String::new(),
            month_names: vec!["Only".to_owned()],
            days_per_month: 5,
        })
        .unwrap();
        assert_eq!(compute_calendar_date(0, &cal), "1 Only, 7");
    }

    #[test]
    fn out_of_range_month_uses_sentinel() {
        assert_eq!(harptos().month_name(12), UNKNOWN_MONTH);
    }

    #[test]
    fn empty_month_list_is_rejected() {
        let result = Calendar::new(CalendarConfig {
            starting_year: 1492,
            era_suffix: "DR".to_owned(),
            month_names: vec!["  ".to_owned()],
            days_per_month: 30,
        });
        assert_eq!(result, Err(CalendarError::EmptyMonthList));
    }

    #[test]
    fn zero_days_per_month_is_rejected() {
        let result = Calendar::new(CalendarConfig {
            starting_year: 1492,
            era_suffix: "DR".to_owned(),
            month_names: vec!["Hammer".to_owned()],
            days_per_month: 0,
        });
        assert_eq!(result, Err(CalendarError::ZeroDaysPerMonth));
    }

    #[test]
    fn extreme_clock_values_do_not_panic() {
        let cal = harptos();
        let _ = compute_calendar_date(i64::MAX, &cal);
        let _ = compute_calendar_date(i64::MIN, &cal);
    }
}
