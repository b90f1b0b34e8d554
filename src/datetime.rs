//! Calendar value types and the RV-3028 time/date register image.
//!
//! [`Time`], [`Date`] and [`DateTime`] can only be built through validating
//! constructors, so an instance always holds an in-range value for the
//! RV-3028 calendar (years 2000 to 2099, 24-hour time).
//!
//! # Register Model
//!
//! The RV-3028 stores the clock in 7 consecutive BCD registers:
//! - Seconds, Minutes, Hours, Weekday, Date, Month, Year
//!
//! The time-stamp function keeps a count followed by 6 registers with the
//! same layout minus the weekday.
//!
//! # Error Handling
//!
//! Validation errors are reported via [`DateTimeError`].

use core::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};

use crate::bits::{decode_bcd, encode_bcd, BitFieldError};
use crate::registers::fields;

/// First year the RV-3028 calendar can hold.
pub const MIN_YEAR: u16 = 2000;
/// Last year the RV-3028 calendar can hold.
pub const MAX_YEAR: u16 = 2099;

const MONTH_DAYS: [u8; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Calendar field named in a [`DateTimeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Field {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
    Weekday,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Year => "year",
            Field::Month => "month",
            Field::Day => "day",
            Field::Hour => "hour",
            Field::Minute => "minute",
            Field::Second => "second",
            Field::Weekday => "weekday",
        };
        f.write_str(name)
    }
}

/// Errors that can occur during date/time validation or conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DateTimeError {
    /// A field is outside its legal range `min..=max`.
    OutOfRange {
        field: Field,
        value: i32,
        min: i32,
        max: i32,
    },
    /// chrono rejected the value (not representable)
    InvalidDateTime,
}

impl fmt::Display for DateTimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateTimeError::OutOfRange {
                field,
                value,
                min,
                max,
            } => write!(f, "{} {} out of range, must be in {}..={}", field, value, min, max),
            DateTimeError::InvalidDateTime => f.write_str("invalid date/time"),
        }
    }
}

fn check_range(field: Field, value: i32, min: i32, max: i32) -> Result<(), DateTimeError> {
    if value < min || value > max {
        error!("{} {} is out of range {}..={}", field, value, min, max);
        return Err(DateTimeError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

/// Gregorian leap year rule.
pub const fn is_leap_year(year: u16) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Number of days in `month` (1-12) of `year`, or 0 for an invalid month.
pub fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        2 if is_leap_year(year) => 29,
        1..=12 => MONTH_DAYS[usize::from(month - 1)],
        _ => 0,
    }
}

/// Checks hour (0-23), minute (0-59) and second (0-59).
///
/// # Errors
///
/// Returns [`DateTimeError::OutOfRange`] naming the first offending field.
pub fn validate_time(hour: u8, minute: u8, second: u8) -> Result<(), DateTimeError> {
    check_range(Field::Hour, hour.into(), 0, 23)?;
    check_range(Field::Minute, minute.into(), 0, 59)?;
    check_range(Field::Second, second.into(), 0, 59)
}

/// Checks year (2000-2099), month (1-12) and the day against the length of
/// that month, including February 29 in leap years.
///
/// # Errors
///
/// Returns [`DateTimeError::OutOfRange`] naming the first offending field,
/// checked in year, month, day order.
pub fn validate_date(year: u16, month: u8, day: u8) -> Result<(), DateTimeError> {
    check_range(Field::Year, year.into(), MIN_YEAR.into(), MAX_YEAR.into())?;
    check_range(Field::Month, month.into(), 1, 12)?;
    check_range(Field::Day, day.into(), 1, days_in_month(year, month).into())
}

/// Checks a weekday register value (0-6, 0 = Sunday).
pub fn validate_weekday(weekday: u8) -> Result<(), DateTimeError> {
    check_range(Field::Weekday, weekday.into(), 0, 6)
}

/// Time of day in 24-hour format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Time {
    hour: u8,
    minute: u8,
    second: u8,
}

impl Time {
    /// Creates a validated time of day.
    ///
    /// # Errors
    ///
    /// Returns [`DateTimeError::OutOfRange`] if any field is out of range.
    pub fn new(hour: u8, minute: u8, second: u8) -> Result<Self, DateTimeError> {
        validate_time(hour, minute, second)?;
        Ok(Self {
            hour,
            minute,
            second,
        })
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn second(&self) -> u8 {
        self.second
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.hour, self.minute, self.second)
    }
}

/// Calendar date between 2000-01-01 and 2099-12-31.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Date {
    year: u16,
    month: u8,
    day: u8,
}

impl Date {
    /// Creates a validated date.
    ///
    /// # Errors
    ///
    /// Returns [`DateTimeError::OutOfRange`] if any field is out of range.
    pub fn new(year: u16, month: u8, day: u8) -> Result<Self, DateTimeError> {
        validate_date(year, month, day)?;
        Ok(Self { year, month, day })
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn day(&self) -> u8 {
        self.day
    }

    /// Day of the week of this date.
    pub fn weekday(&self) -> Result<Weekday, DateTimeError> {
        NaiveDate::try_from(*self).map(|d| d.weekday())
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.year, self.month, self.day)
    }
}

/// Date and time of day, stored as six flat fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DateTime {
    year: u16,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
}

impl DateTime {
    /// Creates a validated date and time.
    ///
    /// # Errors
    ///
    /// Returns [`DateTimeError::OutOfRange`] if any field is out of range.
    pub fn new(
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> Result<Self, DateTimeError> {
        validate_date(year, month, day)?;
        validate_time(hour, minute, second)?;
        Ok(Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        })
    }

    /// Combines a date and a time. The fields are validated again.
    pub fn combine(date: &Date, time: &Time) -> Result<Self, DateTimeError> {
        Self::new(
            date.year(),
            date.month(),
            date.day(),
            time.hour(),
            time.minute(),
            time.second(),
        )
    }

    /// The date part.
    pub fn date(&self) -> Result<Date, DateTimeError> {
        Date::new(self.year, self.month, self.day)
    }

    /// The time-of-day part.
    pub fn time(&self) -> Result<Time, DateTimeError> {
        Time::new(self.hour, self.minute, self.second)
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn day(&self) -> u8 {
        self.day
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn second(&self) -> u8 {
        self.second
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

fn year_from_chrono(year: i32) -> Result<u16, DateTimeError> {
    check_range(Field::Year, year, MIN_YEAR.into(), MAX_YEAR.into())?;
    u16::try_from(year).map_err(|_| DateTimeError::InvalidDateTime)
}

// chrono hands out u32 fields that are always small; saturate instead of failing
fn small(value: u32) -> u8 {
    u8::try_from(value).unwrap_or(u8::MAX)
}

impl TryFrom<NaiveTime> for Time {
    type Error = DateTimeError;

    fn try_from(t: NaiveTime) -> Result<Self, Self::Error> {
        Time::new(small(t.hour()), small(t.minute()), small(t.second()))
    }
}

impl TryFrom<Time> for NaiveTime {
    type Error = DateTimeError;

    fn try_from(t: Time) -> Result<Self, Self::Error> {
        NaiveTime::from_hms_opt(t.hour.into(), t.minute.into(), t.second.into())
            .ok_or(DateTimeError::InvalidDateTime)
    }
}

impl TryFrom<NaiveDate> for Date {
    type Error = DateTimeError;

    fn try_from(d: NaiveDate) -> Result<Self, Self::Error> {
        Date::new(year_from_chrono(d.year())?, small(d.month()), small(d.day()))
    }
}

impl TryFrom<Date> for NaiveDate {
    type Error = DateTimeError;

    fn try_from(d: Date) -> Result<Self, Self::Error> {
        NaiveDate::from_ymd_opt(d.year.into(), d.month.into(), d.day.into())
            .ok_or(DateTimeError::InvalidDateTime)
    }
}

impl TryFrom<NaiveDateTime> for DateTime {
    type Error = DateTimeError;

    fn try_from(dt: NaiveDateTime) -> Result<Self, Self::Error> {
        let date = Date::try_from(dt.date())?;
        let time = Time::try_from(dt.time())?;
        DateTime::combine(&date, &time)
    }
}

impl TryFrom<DateTime> for NaiveDateTime {
    type Error = DateTimeError;

    fn try_from(dt: DateTime) -> Result<Self, Self::Error> {
        let date = NaiveDate::try_from(dt.date()?)?;
        let time = NaiveTime::try_from(dt.time()?)?;
        Ok(NaiveDateTime::new(date, time))
    }
}

/// Errors while converting between register bytes and calendar values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegisterImageError {
    BitField(BitFieldError),
    DateTime(DateTimeError),
}

impl From<BitFieldError> for RegisterImageError {
    fn from(e: BitFieldError) -> Self {
        RegisterImageError::BitField(e)
    }
}

impl From<DateTimeError> for RegisterImageError {
    fn from(e: DateTimeError) -> Self {
        RegisterImageError::DateTime(e)
    }
}

/// Internal image of the 7 clock registers, Seconds through Year.
///
/// Bytes are kept raw; decoding masks each register to its value bits and
/// validates through the calendar constructors.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) struct RV3028DateTime {
    seconds: u8,
    minutes: u8,
    hours: u8,
    weekday: u8,
    date: u8,
    month: u8,
    year: u8,
}

impl RV3028DateTime {
    pub(crate) fn from_datetime(datetime: &DateTime) -> Result<Self, DateTimeError> {
        let weekday = datetime.date()?.weekday()?;
        let raw = RV3028DateTime {
            seconds: encode_bcd(datetime.second()),
            minutes: encode_bcd(datetime.minute()),
            hours: encode_bcd(datetime.hour()),
            weekday: weekday.num_days_from_sunday() as u8,
            date: encode_bcd(datetime.day()),
            month: encode_bcd(datetime.month()),
            year: encode_bcd(year_offset(datetime.year())),
        };
        debug!("raw={:?}", raw);
        Ok(raw)
    }

    pub(crate) fn into_datetime(self) -> Result<DateTime, RegisterImageError> {
        let time = decode_time([self.seconds, self.minutes, self.hours])?;
        let date = decode_date([self.date, self.month, self.year])?;
        Ok(DateTime::combine(&date, &time)?)
    }
}

impl From<[u8; 7]> for RV3028DateTime {
    fn from(data: [u8; 7]) -> Self {
        RV3028DateTime {
            seconds: data[0],
            minutes: data[1],
            hours: data[2],
            weekday: data[3],
            date: data[4],
            month: data[5],
            year: data[6],
        }
    }
}

impl From<&RV3028DateTime> for [u8; 7] {
    fn from(dt: &RV3028DateTime) -> [u8; 7] {
        [
            dt.seconds,
            dt.minutes,
            dt.hours,
            dt.weekday,
            dt.date,
            dt.month,
            dt.year,
        ]
    }
}

pub(crate) fn year_offset(year: u16) -> u8 {
    (year - MIN_YEAR) as u8
}

/// Seconds, Minutes, Hours register bytes for `time`.
pub(crate) fn encode_time(time: &Time) -> [u8; 3] {
    [
        encode_bcd(time.second()),
        encode_bcd(time.minute()),
        encode_bcd(time.hour()),
    ]
}

/// Date, Month, Year register bytes for `date`.
pub(crate) fn encode_date(date: &Date) -> [u8; 3] {
    [
        encode_bcd(date.day()),
        encode_bcd(date.month()),
        encode_bcd(year_offset(date.year())),
    ]
}

/// Decodes Seconds, Minutes, Hours register bytes (24-hour mode).
pub(crate) fn decode_time(raw: [u8; 3]) -> Result<Time, RegisterImageError> {
    let second = decode_bcd(fields::SECONDS.read(raw[0])?);
    let minute = decode_bcd(fields::MINUTES.read(raw[1])?);
    let hour = decode_bcd(fields::HOURS_24.read(raw[2])?);
    Ok(Time::new(hour, minute, second)?)
}

/// Decodes Date, Month, Year register bytes.
pub(crate) fn decode_date(raw: [u8; 3]) -> Result<Date, RegisterImageError> {
    let day = decode_bcd(fields::DATE.read(raw[0])?);
    let month = decode_bcd(fields::MONTH.read(raw[1])?);
    let year = MIN_YEAR + u16::from(decode_bcd(fields::YEAR.read(raw[2])?));
    Ok(Date::new(year, month, day)?)
}
