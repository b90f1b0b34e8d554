//! Alarm configuration for the RV-3028-C7.
//!
//! The RV-3028 has a single alarm made of three registers: minutes, hours and
//! weekday/date. Bit 7 of each register (AE_M, AE_H, AE_WD) is set when that
//! field is *not* watched, so an alarm with every field unwatched never fires.
//! Whether the third register holds a weekday or a date is selected by the
//! WADA bit in Control 1.
//!
//! [`AlarmConfig`] expresses each field as an `Option`: `None` means the field
//! is ignored when matching.

use crate::bits::{decode_bcd, encode_bcd, BitFieldError, Flag};
use crate::registers::fields;

/// Error type for alarm configuration operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmError {
    /// Invalid time component value
    InvalidTime(&'static str),
    /// Invalid day of week (must be 0-6)
    InvalidDayOfWeek,
    /// Invalid date of month (must be 1-31)
    InvalidDateOfMonth,
    /// Register field access failed
    BitField(BitFieldError),
}

impl From<BitFieldError> for AlarmError {
    fn from(e: BitFieldError) -> Self {
        AlarmError::BitField(e)
    }
}

/// Day matched by the third alarm register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmDay {
    /// Day of week (0-6), with the same numbering as the weekday register
    Weekday(u8),
    /// Date of month (1-31)
    Date(u8),
}

/// Alarm match settings. A `None` field is not watched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmConfig {
    /// Minute to match (0-59)
    pub minute: Option<u8>,
    /// Hour to match (0-23)
    pub hour: Option<u8>,
    /// Weekday or date to match
    pub day: Option<AlarmDay>,
}

impl AlarmConfig {
    /// Validates the alarm configuration and returns any errors.
    ///
    /// # Errors
    ///
    /// Returns an error if any watched field is out of valid range.
    pub fn validate(&self) -> Result<(), AlarmError> {
        if matches!(self.minute, Some(m) if m > 59) {
            return Err(AlarmError::InvalidTime("minutes must be 0-59"));
        }
        if matches!(self.hour, Some(h) if h > 23) {
            return Err(AlarmError::InvalidTime("hours must be 0-23"));
        }
        match self.day {
            Some(AlarmDay::Weekday(d)) if d > 6 => Err(AlarmError::InvalidDayOfWeek),
            Some(AlarmDay::Date(d)) if !(1..=31).contains(&d) => {
                Err(AlarmError::InvalidDateOfMonth)
            }
            _ => Ok(()),
        }
    }
}

/// Raw contents of the three alarm registers.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) struct RV3028Alarm {
    minutes: u8,
    hours: u8,
    weekday_date: u8,
}

fn encode_field(value: Option<u8>) -> Result<u8, BitFieldError> {
    match value {
        Some(v) => fields::ALARM_DISABLED.write(encode_bcd(v), Flag::Clear as u8),
        None => fields::ALARM_DISABLED.write(0, Flag::Set as u8),
    }
}

fn decode_field(raw: u8) -> Result<Option<u8>, BitFieldError> {
    if fields::ALARM_DISABLED.read(raw)? == Flag::Set as u8 {
        return Ok(None);
    }
    Ok(Some(decode_bcd(fields::ALARM_VALUE.read(raw)?)))
}

impl RV3028Alarm {
    /// Encodes a validated configuration into register values.
    pub(crate) fn from_config(config: &AlarmConfig) -> Result<Self, AlarmError> {
        config.validate()?;
        let day = config.day.map(|d| match d {
            AlarmDay::Weekday(v) | AlarmDay::Date(v) => v,
        });
        Ok(RV3028Alarm {
            minutes: encode_field(config.minute)?,
            hours: encode_field(config.hour)?,
            weekday_date: encode_field(day)?,
        })
    }

    /// Decodes register values; `date_alarm` is the WADA bit of Control 1.
    pub(crate) fn to_config(&self, date_alarm: bool) -> Result<AlarmConfig, AlarmError> {
        let day = decode_field(self.weekday_date)?.map(|v| {
            if date_alarm {
                AlarmDay::Date(v)
            } else {
                AlarmDay::Weekday(v)
            }
        });
        let config = AlarmConfig {
            minute: decode_field(self.minutes)?,
            hour: decode_field(self.hours)?,
            day,
        };
        config.validate()?;
        Ok(config)
    }
}

impl From<[u8; 3]> for RV3028Alarm {
    fn from(data: [u8; 3]) -> Self {
        RV3028Alarm {
            minutes: data[0],
            hours: data[1],
            weekday_date: data[2],
        }
    }
}

impl From<&RV3028Alarm> for [u8; 3] {
    fn from(alarm: &RV3028Alarm) -> [u8; 3] {
        [alarm.minutes, alarm.hours, alarm.weekday_date]
    }
}

/// WADA value needed for `config`, or `None` to leave it unchanged.
pub(crate) fn date_alarm_select(config: &AlarmConfig) -> Option<Flag> {
    match config.day {
        Some(AlarmDay::Date(_)) => Some(Flag::Set),
        Some(AlarmDay::Weekday(_)) => Some(Flag::Clear),
        None => None,
    }
}
