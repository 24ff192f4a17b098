use chrono::{Datelike, NaiveDate, Weekday};

use crate::error::{CoreError, CoreResult};

/// Day-of-week index used by availability rules: 0 = Monday .. 6 = Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct DayOfWeek(i16);

impl DayOfWeek {
    /// ## Summary
    /// Builds a `DayOfWeek` from a raw index.
    ///
    /// ## Errors
    /// Returns a validation error if the index is outside `0..=6`.
    pub fn new(value: i16) -> CoreResult<Self> {
        if (0..=6).contains(&value) {
            Ok(Self(value))
        } else {
            Err(CoreError::ValidationError(format!(
                "day_of_week must be 0..=6, got {value}"
            )))
        }
    }

    /// Weekday index of a calendar date.
    #[must_use]
    pub fn of(date: NaiveDate) -> Self {
        Self::from(date.weekday())
    }

    #[must_use]
    pub const fn value(self) -> i16 {
        self.0
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(weekday: Weekday) -> Self {
        // num_days_from_monday is always 0..=6
        Self(i16::try_from(weekday.num_days_from_monday()).unwrap_or(0))
    }
}

impl std::fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self.0 {
            0 => "monday",
            1 => "tuesday",
            2 => "wednesday",
            3 => "thursday",
            4 => "friday",
            5 => "saturday",
            _ => "sunday",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monday_is_zero() {
        // 2026-08-24 is a Monday
        let date = NaiveDate::from_ymd_opt(2026, 8, 24).unwrap();
        assert_eq!(DayOfWeek::of(date).value(), 0);
    }

    #[test]
    fn sunday_is_six() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 23).unwrap();
        assert_eq!(DayOfWeek::of(date).value(), 6);
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(DayOfWeek::new(7).is_err());
        assert!(DayOfWeek::new(-1).is_err());
    }
}
