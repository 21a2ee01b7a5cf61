//! Calendar-free date and time values.
//!
//! The wire format transmits date and time parts independently and without a
//! zone, so these types store plain validated components instead of wrapping
//! a calendar library. Conversions to and from the [`time`] crate are
//! provided for values that fit its calendar.

/// Error for date or time components that cannot be represented.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum DateTimeError {
    /// A component is outside its valid range.
    #[error("{field} value {value} is out of range")]
    OutOfRange { field: &'static str, value: i128 },
    /// Hour 24 was combined with a non-zero minute, second, or subsecond.
    #[error("hour 24 is only valid at exact midnight")]
    NotMidnight,
    /// A conversion needed a date part that is not present.
    #[error("conversion requires a date part")]
    MissingDate,
    /// A conversion needed a time part that is not present.
    #[error("conversion requires a time part")]
    MissingTime,
    /// The value is valid on the wire but has no equivalent in the target
    /// type, like hour 24 without a date to roll over into.
    #[error("value cannot be represented in the target type")]
    Unrepresentable,
}

/// Largest year distance from 2000 that still fits a four-byte magnitude.
const YEAR_SPAN: u64 = (1 << 32) - 1;

/// A calendar date with no time or zone attached.
///
/// Only component ranges are checked; day 31 is accepted for every month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Date {
    year: i64,
    month: u8,
    day: u8,
}

impl Date {
    /// Creates a date from its components.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the month is not in `1..=12`, the day is not in
    /// `1..=31`, or the year is more than [`u32::MAX`] away from 2000.
    pub fn new(year: i64, month: u8, day: u8) -> Result<Self, DateTimeError> {
        if !(1..=12).contains(&month) {
            return Err(DateTimeError::OutOfRange {
                field: "month",
                value: i128::from(month),
            });
        }
        if !(1..=31).contains(&day) {
            return Err(DateTimeError::OutOfRange {
                field: "day",
                value: i128::from(day),
            });
        }
        let in_span = year
            .checked_sub(2000)
            .is_some_and(|delta| delta.unsigned_abs() <= YEAR_SPAN);
        if !in_span {
            return Err(DateTimeError::OutOfRange {
                field: "year",
                value: i128::from(year),
            });
        }
        Ok(Self { year, month, day })
    }

    pub fn year(self) -> i64 {
        self.year
    }

    pub fn month(self) -> u8 {
        self.month
    }

    pub fn day(self) -> u8 {
        self.day
    }
}

/// A time of day with nanosecond resolution and no zone attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Time {
    hour: u8,
    minute: u8,
    second: u8,
    nanosecond: u32,
}

impl Time {
    /// Creates a time from hours, minutes, and seconds.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if a component is out of range. Hour 24 is accepted
    /// to represent end-of-day midnight.
    pub fn new(hour: u8, minute: u8, second: u8) -> Result<Self, DateTimeError> {
        Self::with_nanos(hour, minute, second, 0)
    }

    /// Creates a time with a subsecond part.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if a component is out of range, or if hour 24 is
    /// combined with anything but exact midnight.
    pub fn with_nanos(
        hour: u8,
        minute: u8,
        second: u8,
        nanosecond: u32,
    ) -> Result<Self, DateTimeError> {
        if hour > 24 {
            return Err(DateTimeError::OutOfRange {
                field: "hour",
                value: i128::from(hour),
            });
        }
        if minute > 59 {
            return Err(DateTimeError::OutOfRange {
                field: "minute",
                value: i128::from(minute),
            });
        }
        if second > 59 {
            return Err(DateTimeError::OutOfRange {
                field: "second",
                value: i128::from(second),
            });
        }
        if nanosecond >= 1_000_000_000 {
            return Err(DateTimeError::OutOfRange {
                field: "nanosecond",
                value: i128::from(nanosecond),
            });
        }
        if hour == 24 && (minute != 0 || second != 0 || nanosecond != 0) {
            return Err(DateTimeError::NotMidnight);
        }
        Ok(Self {
            hour,
            minute,
            second,
            nanosecond,
        })
    }

    pub fn hour(self) -> u8 {
        self.hour
    }

    pub fn minute(self) -> u8 {
        self.minute
    }

    pub fn second(self) -> u8 {
        self.second
    }

    pub fn nanosecond(self) -> u32 {
        self.nanosecond
    }
}

/// A date, a time, both, or neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DateTime {
    date: Option<Date>,
    time: Option<Time>,
}

impl DateTime {
    /// Combines a date and a time.
    pub fn new(date: Date, time: Time) -> Self {
        Self {
            date: Some(date),
            time: Some(time),
        }
    }

    /// Builds a value from optional parts. Both may be absent.
    pub fn from_parts(date: Option<Date>, time: Option<Time>) -> Self {
        Self { date, time }
    }

    pub fn date(self) -> Option<Date> {
        self.date
    }

    pub fn time(self) -> Option<Time> {
        self.time
    }
}

/// Splits a nanosecond count into the coarsest unit that loses nothing.
///
/// Returns the 2-bit unit selector and the value in that unit: 0 for no
/// subseconds, 1 for milliseconds, 2 for microseconds, 3 for nanoseconds.
pub(crate) fn subsecond_parts(nanosecond: u32) -> (u8, u32) {
    if nanosecond == 0 {
        (0, 0)
    } else if nanosecond % 1_000_000 == 0 {
        (1, nanosecond / 1_000_000)
    } else if nanosecond % 1_000 == 0 {
        (2, nanosecond / 1_000)
    } else {
        (3, nanosecond)
    }
}

impl From<time::Date> for Date {
    fn from(value: time::Date) -> Self {
        Self {
            year: i64::from(value.year()),
            month: u8::from(value.month()),
            day: value.day(),
        }
    }
}

impl From<time::Time> for Time {
    fn from(value: time::Time) -> Self {
        Self {
            hour: value.hour(),
            minute: value.minute(),
            second: value.second(),
            nanosecond: value.nanosecond(),
        }
    }
}

impl From<time::PrimitiveDateTime> for DateTime {
    fn from(value: time::PrimitiveDateTime) -> Self {
        Self {
            date: Some(value.date().into()),
            time: Some(value.time().into()),
        }
    }
}

impl TryFrom<Date> for time::Date {
    type Error = DateTimeError;

    fn try_from(value: Date) -> Result<Self, Self::Error> {
        let year = i32::try_from(value.year).map_err(|_| DateTimeError::Unrepresentable)?;
        let month =
            time::Month::try_from(value.month).map_err(|_| DateTimeError::Unrepresentable)?;
        Self::from_calendar_date(year, month, value.day).map_err(|_| DateTimeError::Unrepresentable)
    }
}

impl TryFrom<Time> for time::Time {
    type Error = DateTimeError;

    fn try_from(value: Time) -> Result<Self, Self::Error> {
        // hour 24 only rolls over when a date is present
        if value.hour == 24 {
            return Err(DateTimeError::Unrepresentable);
        }
        Self::from_hms_nano(value.hour, value.minute, value.second, value.nanosecond)
            .map_err(|_| DateTimeError::Unrepresentable)
    }
}

impl TryFrom<DateTime> for time::PrimitiveDateTime {
    type Error = DateTimeError;

    fn try_from(value: DateTime) -> Result<Self, Self::Error> {
        let date = value.date.ok_or(DateTimeError::MissingDate)?;
        let time = value.time.ok_or(DateTimeError::MissingTime)?;
        let date = time::Date::try_from(date)?;
        if time.hour == 24 {
            let next = date.next_day().ok_or(DateTimeError::Unrepresentable)?;
            return Ok(Self::new(next, time::Time::MIDNIGHT));
        }
        Ok(Self::new(date, time.try_into()?))
    }
}

#[cfg(test)]
mod tests {
    use time::macros::{date, datetime, time};

    use super::*;

    #[test]
    fn component_ranges_are_checked() {
        Date::new(2024, 2, 29).expect("valid date");
        Time::new(23, 59, 59).expect("valid time");

        let rejected = [
            Date::new(2024, 0, 1),
            Date::new(2024, 13, 1),
            Date::new(2024, 1, 0),
            Date::new(2024, 1, 32),
            Date::new(-6_000_000_000, 1, 1),
        ];
        for date in rejected {
            assert!(
                matches!(date, Err(DateTimeError::OutOfRange { .. })),
                "rejected date: {date:?}"
            );
        }

        let rejected = [
            Time::new(25, 0, 0),
            Time::new(0, 60, 0),
            Time::new(0, 0, 60),
            Time::with_nanos(0, 0, 0, 1_000_000_000),
        ];
        for time in rejected {
            assert!(
                matches!(time, Err(DateTimeError::OutOfRange { .. })),
                "rejected time: {time:?}"
            );
        }
    }

    #[test]
    fn hour_24_must_be_midnight() {
        Time::new(24, 0, 0).expect("end-of-day midnight");
        assert_eq!(
            Time::new(24, 0, 1),
            Err(DateTimeError::NotMidnight),
            "second past midnight"
        );
        assert_eq!(
            Time::with_nanos(24, 0, 0, 1),
            Err(DateTimeError::NotMidnight),
            "nanosecond past midnight"
        );
    }

    #[test]
    fn subsecond_unit_is_coarsest_exact() {
        assert_eq!(subsecond_parts(0), (0, 0), "no subseconds");
        assert_eq!(subsecond_parts(25_000_000), (1, 25), "milliseconds");
        assert_eq!(subsecond_parts(25_000), (2, 25), "microseconds");
        assert_eq!(subsecond_parts(25), (3, 25), "nanoseconds");
        assert_eq!(subsecond_parts(1_000_001), (3, 1_000_001), "odd nanos");
    }

    #[test]
    fn calendar_conversions_round_trip() {
        let source = datetime!(2016-03-14 10:30:45.5);
        let value = DateTime::from(source);
        assert_eq!(value.date().map(Date::year), Some(2016), "year kept");
        assert_eq!(
            value.time().map(Time::nanosecond),
            Some(500_000_000),
            "nanos kept"
        );
        let back = time::PrimitiveDateTime::try_from(value).expect("fits the calendar");
        assert_eq!(back, source, "round trip");
    }

    #[test]
    fn hour_24_rolls_into_the_next_day() {
        let date = Date::from(date!(2023-12-31));
        let time = Time::new(24, 0, 0).expect("valid midnight");
        let combined = time::PrimitiveDateTime::try_from(DateTime::new(date, time))
            .expect("rolls over");
        assert_eq!(combined, datetime!(2024-01-01 0:00), "next day midnight");

        assert_eq!(
            time::Time::try_from(time),
            Err(DateTimeError::Unrepresentable),
            "no date to roll into"
        );
    }

    #[test]
    fn partial_values_refuse_calendar_conversion() {
        let date_only = DateTime::from_parts(Some(Date::from(date!(2020-01-01))), None);
        assert_eq!(
            time::PrimitiveDateTime::try_from(date_only),
            Err(DateTimeError::MissingTime),
            "missing time"
        );
        let time_only = DateTime::from_parts(None, Some(Time::from(time!(10:30))));
        assert_eq!(
            time::PrimitiveDateTime::try_from(time_only),
            Err(DateTimeError::MissingDate),
            "missing date"
        );
    }
}
