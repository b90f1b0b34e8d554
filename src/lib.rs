//! A platform-agnostic driver for the Micro Crystal RV-3028-C7 real-time clock.
//!
//! The driver is built on the `embedded-hal` I2C traits and runs in `no_std`
//! environments. All calendar values pass through validating types
//! ([`Time`], [`Date`], [`DateTime`]), so a value that reaches the bus is
//! always one the RTC can represent.
//!
//! # Features
//!
//! - Time, date, weekday and the 32-bit UNIX time counter
//! - Minute/hour/weekday-or-date alarm with per-field enables
//! - Trickle charger configuration
//! - Event input (EVI) with time stamping
//! - Automatic backup switchover configuration and flag
//! - Optional async support (`async` feature)
//! - Optional logging through `log` or `defmt`
//!
//! # Example
//!
//! ```rust,ignore
//! use rv3028::{Date, DateTime, RV3028};
//!
//! let mut rtc = RV3028::new(i2c);
//!
//! let now = DateTime::new(2024, 3, 14, 15, 30, 0)?;
//! rtc.set_datetime(&now)?;
//!
//! let datetime = rtc.datetime()?;
//! ```
//!
//! # Register Access
//!
//! Every configuration change is a read-modify-write of a single register
//! through a [`BitField`] descriptor, so bits outside the field keep their
//! value. Typed views of the status and control registers are available with
//! [`RV3028::status`], [`RV3028::control2`] and friends.
//!
//! The driver assumes the clock runs in 24-hour mode (the power-on default).
#![cfg_attr(not(test), no_std)]

use cfg_if::cfg_if;

cfg_if! {
    if #[cfg(feature = "defmt")] {
        macro_rules! debug {
            ($($arg:tt)*) => { defmt::debug!($($arg)*) };
        }
        macro_rules! error {
            ($($arg:tt)*) => { defmt::error!($($arg)*) };
        }
    } else if #[cfg(feature = "log")] {
        macro_rules! debug {
            ($($arg:tt)*) => { log::debug!($($arg)*) };
        }
        macro_rules! error {
            ($($arg:tt)*) => { log::error!($($arg)*) };
        }
    } else {
        macro_rules! debug {
            ($($arg:tt)*) => {{ let _ = core::format_args!($($arg)*); }};
        }
        macro_rules! error {
            ($($arg:tt)*) => {{ let _ = core::format_args!($($arg)*); }};
        }
    }
}

mod alarm;
mod bits;
mod datetime;
mod registers;

#[cfg(feature = "async")]
pub mod asynch;

use embedded_hal::i2c::I2c;
use paste::paste;

pub use alarm::{AlarmConfig, AlarmDay, AlarmError};
use alarm::{date_alarm_select, RV3028Alarm};
pub use bits::{
    decode_bcd, encode_bcd, read_field, read_flag, write_field, write_flag, BitField,
    BitFieldError, Flag, REGISTER_BITS,
};
pub use datetime::{
    days_in_month, is_leap_year, validate_date, validate_time, validate_weekday, Date, DateTime,
    DateTimeError, Field, RegisterImageError, Time, MAX_YEAR, MIN_YEAR,
};
use datetime::{decode_date, decode_time, encode_date, encode_time, RV3028DateTime};
pub use registers::{
    fields, BackupSwitchoverMode, Control1, Control2, EepromBackup, EventControl, EventLevel, Reg,
    Status, TimestampSource, TrickleResistance,
};

/// Fixed 7-bit I2C address of the RV-3028-C7.
pub const RV3028_ADDRESS: u8 = 0x52;

/// Longest burst the driver transfers (the 7 clock registers).
pub const MAX_BURST: usize = 7;

/// Driver errors.
#[derive(Debug)]
pub enum RV3028Error<I2CE> {
    /// I2C bus error
    I2c(I2CE),
    /// Bit-field descriptor does not fit in a register
    BitField(BitFieldError),
    /// Date/time value out of range, or malformed clock registers
    DateTime(DateTimeError),
    /// Invalid alarm configuration or alarm registers
    Alarm(AlarmError),
    /// Burst write longer than [`MAX_BURST`]
    BurstTooLong(usize),
}

impl<I2CE> From<I2CE> for RV3028Error<I2CE> {
    fn from(e: I2CE) -> Self {
        RV3028Error::I2c(e)
    }
}

impl<I2CE> RV3028Error<I2CE> {
    pub(crate) fn from_image(e: RegisterImageError) -> Self {
        match e {
            RegisterImageError::BitField(e) => RV3028Error::BitField(e),
            RegisterImageError::DateTime(e) => RV3028Error::DateTime(e),
        }
    }
}

/// Contents of the time stamp registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EventTimestamp {
    /// Number of events since the last time stamp reset
    pub count: u8,
    /// Time of the first (or, with overwrite enabled, the last) event.
    /// `None` when no event has been recorded.
    pub datetime: Option<DateTime>,
}

/// Decodes Count, Seconds..Year of the time stamp block.
pub(crate) fn decode_timestamp(raw: [u8; 7]) -> Result<EventTimestamp, RegisterImageError> {
    let count = raw[0];
    if count == 0 {
        return Ok(EventTimestamp {
            count,
            datetime: None,
        });
    }
    let time = decode_time([raw[1], raw[2], raw[3]])?;
    let date = decode_date([raw[4], raw[5], raw[6]])?;
    Ok(EventTimestamp {
        count,
        datetime: Some(DateTime::combine(&date, &time)?),
    })
}

/// RV-3028-C7 Real-Time Clock driver.
pub struct RV3028<I2C: I2c> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> RV3028<I2C> {
    /// Creates a new driver on `i2c` at [`RV3028_ADDRESS`].
    pub fn new(i2c: I2C) -> Self {
        Self {
            i2c,
            address: RV3028_ADDRESS,
        }
    }

    /// Destroys the driver and returns the bus.
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Reads one register.
    pub fn read_register(&mut self, reg: Reg) -> Result<u8, RV3028Error<I2C::Error>> {
        let mut data = [0];
        self.i2c
            .write_read(self.address, &[reg.into()], &mut data)?;
        Ok(data[0])
    }

    /// Writes one register.
    pub fn write_register(&mut self, reg: Reg, value: u8) -> Result<(), RV3028Error<I2C::Error>> {
        self.i2c.write(self.address, &[reg.into(), value])?;
        Ok(())
    }

    /// Reads `buf.len()` consecutive registers starting at `reg`.
    pub fn read_registers(
        &mut self,
        reg: Reg,
        buf: &mut [u8],
    ) -> Result<(), RV3028Error<I2C::Error>> {
        self.i2c.write_read(self.address, &[reg.into()], buf)?;
        Ok(())
    }

    /// Writes `data` to consecutive registers starting at `reg`.
    ///
    /// # Errors
    ///
    /// [`RV3028Error::BurstTooLong`] if `data` is longer than [`MAX_BURST`].
    pub fn write_registers(&mut self, reg: Reg, data: &[u8]) -> Result<(), RV3028Error<I2C::Error>> {
        let mut buf = [0u8; MAX_BURST + 1];
        let frame = burst_frame(&mut buf, reg, data)?;
        self.i2c.write(self.address, frame)?;
        Ok(())
    }

    /// Replaces `field` of `reg` with `value`, keeping every other bit.
    pub fn update_field(
        &mut self,
        reg: Reg,
        field: BitField,
        value: u8,
    ) -> Result<(), RV3028Error<I2C::Error>> {
        field.mask().map_err(RV3028Error::BitField)?;
        let current = self.read_register(reg)?;
        let updated = field.write(current, value).map_err(RV3028Error::BitField)?;
        debug!("{:?}: {:?} -> {:?}", reg, current, updated);
        self.write_register(reg, updated)
    }

    /// Sets or clears the single-bit `field` of `reg`.
    pub fn set_flag(
        &mut self,
        reg: Reg,
        field: BitField,
        flag: Flag,
    ) -> Result<(), RV3028Error<I2C::Error>> {
        self.update_field(reg, field, flag as u8)
    }

    /// Reads the single-bit `field` of `reg`.
    pub fn flag(&mut self, reg: Reg, field: BitField) -> Result<bool, RV3028Error<I2C::Error>> {
        field.mask().map_err(RV3028Error::BitField)?;
        let value = self.read_register(reg)?;
        Ok(field.read(value).map_err(RV3028Error::BitField)? != 0)
    }

    /// Reads the time of day.
    pub fn time(&mut self) -> Result<Time, RV3028Error<I2C::Error>> {
        let mut data = [0; 3];
        self.read_registers(Reg::Seconds, &mut data)?;
        decode_time(data).map_err(RV3028Error::from_image)
    }

    /// Sets the time of day. The date is not touched.
    pub fn set_time(&mut self, time: &Time) -> Result<(), RV3028Error<I2C::Error>> {
        self.write_registers(Reg::Seconds, &encode_time(time))
    }

    /// Reads the calendar date.
    pub fn date(&mut self) -> Result<Date, RV3028Error<I2C::Error>> {
        let mut data = [0; 3];
        self.read_registers(Reg::Date, &mut data)?;
        decode_date(data).map_err(RV3028Error::from_image)
    }

    /// Sets the calendar date and the matching weekday.
    pub fn set_date(&mut self, date: &Date) -> Result<(), RV3028Error<I2C::Error>> {
        let weekday = date.weekday().map_err(RV3028Error::DateTime)?;
        self.write_registers(Reg::Date, &encode_date(date))?;
        self.set_weekday(weekday.num_days_from_sunday() as u8)
    }

    /// Reads the weekday register (0-6, 0 = Sunday).
    pub fn weekday(&mut self) -> Result<u8, RV3028Error<I2C::Error>> {
        let raw = self.read_register(Reg::Weekday)?;
        let weekday = fields::WEEKDAY.read(raw).map_err(RV3028Error::BitField)?;
        validate_weekday(weekday).map_err(RV3028Error::DateTime)?;
        Ok(weekday)
    }

    /// Writes the weekday register.
    ///
    /// # Errors
    ///
    /// [`RV3028Error::DateTime`] if `weekday` is above 6.
    pub fn set_weekday(&mut self, weekday: u8) -> Result<(), RV3028Error<I2C::Error>> {
        validate_weekday(weekday).map_err(RV3028Error::DateTime)?;
        self.write_register(Reg::Weekday, weekday)
    }

    /// Reads date and time in a single burst.
    pub fn datetime(&mut self) -> Result<DateTime, RV3028Error<I2C::Error>> {
        let mut data = [0; 7];
        self.read_registers(Reg::Seconds, &mut data)?;
        RV3028DateTime::from(data)
            .into_datetime()
            .map_err(RV3028Error::from_image)
    }

    /// Sets date, time and weekday in a single burst.
    pub fn set_datetime(&mut self, datetime: &DateTime) -> Result<(), RV3028Error<I2C::Error>> {
        let raw = RV3028DateTime::from_datetime(datetime).map_err(RV3028Error::DateTime)?;
        let data: [u8; 7] = (&raw).into();
        self.write_registers(Reg::Seconds, &data)
    }

    /// Reads the 32-bit UNIX time counter.
    pub fn unix_time(&mut self) -> Result<u32, RV3028Error<I2C::Error>> {
        let mut data = [0; 4];
        self.read_registers(Reg::UnixTime0, &mut data)?;
        Ok(u32::from_le_bytes(data))
    }

    /// Writes the 32-bit UNIX time counter. It is independent of the calendar.
    pub fn set_unix_time(&mut self, seconds: u32) -> Result<(), RV3028Error<I2C::Error>> {
        self.write_registers(Reg::UnixTime0, &seconds.to_le_bytes())
    }

    /// Programs the alarm.
    ///
    /// The alarm flag is cleared before and after the registers are written
    /// so a match against the old settings is not reported.
    pub fn set_alarm(&mut self, config: &AlarmConfig) -> Result<(), RV3028Error<I2C::Error>> {
        let alarm = RV3028Alarm::from_config(config).map_err(RV3028Error::Alarm)?;
        self.set_flag(Reg::Status, fields::status::ALARM, Flag::Clear)?;
        if let Some(wada) = date_alarm_select(config) {
            self.set_flag(Reg::Control1, fields::control1::WADA, wada)?;
        }
        let data: [u8; 3] = (&alarm).into();
        debug!("alarm registers: {:?}", data);
        self.write_registers(Reg::AlarmMinutes, &data)?;
        self.set_flag(Reg::Status, fields::status::ALARM, Flag::Clear)
    }

    /// Reads the alarm settings.
    pub fn alarm(&mut self) -> Result<AlarmConfig, RV3028Error<I2C::Error>> {
        let mut data = [0; 3];
        self.read_registers(Reg::AlarmMinutes, &mut data)?;
        let control1 = self.control1()?;
        RV3028Alarm::from(data)
            .to_config(control1.date_alarm())
            .map_err(RV3028Error::Alarm)
    }

    /// Returns whether the alarm fired, clearing the flag if it did.
    pub fn check_alarm(&mut self) -> Result<bool, RV3028Error<I2C::Error>> {
        let fired = self.status()?.alarm_flag();
        if fired {
            self.set_flag(Reg::Status, fields::status::ALARM, Flag::Clear)?;
        }
        Ok(fired)
    }

    /// Enables or disables the alarm interrupt on INT.
    pub fn set_alarm_interrupt(&mut self, enable: bool) -> Result<(), RV3028Error<I2C::Error>> {
        self.set_flag(
            Reg::Control2,
            fields::control2::ALARM_INT_ENABLE,
            enable.into(),
        )
    }

    /// Selects the series resistance, then enables the trickle charger.
    pub fn enable_trickle_charger(
        &mut self,
        resistance: TrickleResistance,
    ) -> Result<(), RV3028Error<I2C::Error>> {
        self.update_field(
            Reg::EepromBackup,
            fields::eeprom_backup::TRICKLE_CHARGE_RESISTANCE,
            resistance.into(),
        )?;
        self.set_flag(
            Reg::EepromBackup,
            fields::eeprom_backup::TRICKLE_CHARGE_ENABLE,
            Flag::Set,
        )
    }

    /// Disables the trickle charger.
    pub fn disable_trickle_charger(&mut self) -> Result<(), RV3028Error<I2C::Error>> {
        self.set_flag(
            Reg::EepromBackup,
            fields::eeprom_backup::TRICKLE_CHARGE_ENABLE,
            Flag::Clear,
        )
    }

    /// Configures the EVI input for time stamping.
    ///
    /// Enabling follows the application manual sequence: time stamping and the
    /// event interrupt are disabled, EVF is cleared, the active level is
    /// selected and the time stamp is reset before both are enabled again.
    pub fn configure_evi(
        &mut self,
        enable: bool,
        level: EventLevel,
    ) -> Result<(), RV3028Error<I2C::Error>> {
        let mut control2 = self.control2()?;
        control2.set_timestamp_enable(false);
        control2.set_event_int_enable(false);
        self.set_control2(control2)?;
        if !enable {
            return Ok(());
        }

        self.set_flag(Reg::Status, fields::status::EVENT, Flag::Clear)?;

        let mut event_control = self.event_control()?;
        event_control.set_event_level(level);
        // TSR self-clears
        event_control.set_timestamp_reset(true);
        debug!("event control: {:?}", event_control);
        self.set_event_control(event_control)?;

        control2.set_timestamp_enable(true);
        control2.set_event_int_enable(true);
        self.set_control2(control2)
    }

    /// Selects what triggers a time stamp capture.
    pub fn set_timestamp_source(
        &mut self,
        source: TimestampSource,
    ) -> Result<(), RV3028Error<I2C::Error>> {
        self.update_field(
            Reg::EventControl,
            fields::event_control::TIMESTAMP_SOURCE,
            source.into(),
        )
    }

    /// Keep the last event (true) or the first event (false) in the time stamp.
    pub fn set_timestamp_overwrite(
        &mut self,
        overwrite: bool,
    ) -> Result<(), RV3028Error<I2C::Error>> {
        self.set_flag(
            Reg::EventControl,
            fields::event_control::TIMESTAMP_OVERWRITE,
            overwrite.into(),
        )
    }

    /// Reads the event counter and time stamp in a single burst.
    pub fn event_timestamp(&mut self) -> Result<EventTimestamp, RV3028Error<I2C::Error>> {
        let mut data = [0; 7];
        self.read_registers(Reg::TimestampCount, &mut data)?;
        decode_timestamp(data).map_err(RV3028Error::from_image)
    }

    /// Returns whether an event was detected on EVI.
    pub fn is_event_flag_set(&mut self) -> Result<bool, RV3028Error<I2C::Error>> {
        self.flag(Reg::Status, fields::status::EVENT)
    }

    /// Clears the event flag.
    pub fn clear_event_flag(&mut self) -> Result<(), RV3028Error<I2C::Error>> {
        self.set_flag(Reg::Status, fields::status::EVENT, Flag::Clear)
    }

    /// Sets the switchover mode and the backup switchover interrupt enable.
    pub fn configure_backup_switchover(
        &mut self,
        mode: BackupSwitchoverMode,
        interrupt: bool,
    ) -> Result<(), RV3028Error<I2C::Error>> {
        let mut backup = self.eeprom_backup()?;
        backup.set_backup_switchover_mode(mode);
        backup.set_backup_switchover_int_enable(interrupt);
        debug!("eeprom backup: {:?}", backup);
        self.set_eeprom_backup(backup)
    }

    /// Returns whether a switchover to the backup supply happened.
    pub fn is_backup_switchover_occurred(&mut self) -> Result<bool, RV3028Error<I2C::Error>> {
        self.flag(Reg::Status, fields::status::BACKUP_SWITCH)
    }

    /// Clears the backup switchover flag.
    pub fn clear_backup_switchover_flag(&mut self) -> Result<(), RV3028Error<I2C::Error>> {
        self.set_flag(Reg::Status, fields::status::BACKUP_SWITCH, Flag::Clear)
    }
}

/// Builds `[reg, data...]` in `buf` for a burst write.
pub(crate) fn burst_frame<'a, E>(
    buf: &'a mut [u8; MAX_BURST + 1],
    reg: Reg,
    data: &[u8],
) -> Result<&'a [u8], RV3028Error<E>> {
    if data.len() > MAX_BURST {
        error!("burst of {} bytes exceeds {}", data.len(), MAX_BURST);
        return Err(RV3028Error::BurstTooLong(data.len()));
    }
    buf[0] = reg.into();
    buf[1..=data.len()].copy_from_slice(data);
    Ok(&buf[..=data.len()])
}

// Typed register view access
macro_rules! impl_register_access {
    ($(($name:ident, $regaddr:expr, $typ:ty)),+) => {
        impl<I2C: I2c> RV3028<I2C> {
            $(
                paste! {
                    #[doc = concat!("Reads the ", stringify!($typ), " register.")]
                    pub fn $name(&mut self) -> Result<$typ, RV3028Error<I2C::Error>> {
                        Ok($typ(self.read_register($regaddr)?))
                    }

                    #[doc = concat!("Writes the ", stringify!($typ), " register.")]
                    pub fn [<set_ $name>](&mut self, value: $typ) -> Result<(), RV3028Error<I2C::Error>> {
                        self.write_register($regaddr, value.into())
                    }
                }
            )+
        }
    }
}

impl_register_access!(
    (status, Reg::Status, Status),
    (control1, Reg::Control1, Control1),
    (control2, Reg::Control2, Control2),
    (event_control, Reg::EventControl, EventControl),
    (eeprom_backup, Reg::EepromBackup, EepromBackup)
);

#[cfg(test)]
mod tests {
    extern crate alloc;
    use super::*;
    use alloc::vec;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTrans};

    const DEVICE_ADDRESS: u8 = RV3028_ADDRESS;

    fn setup_mock(expectations: &[I2cTrans]) -> I2cMock {
        I2cMock::new(expectations)
    }

    #[test]
    fn test_set_and_get_time() {
        let mock = setup_mock(&[
            I2cTrans::write(DEVICE_ADDRESS, vec![Reg::Seconds as u8, 0x58, 0x59, 0x23]),
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![Reg::Seconds as u8],
                vec![0x58, 0x59, 0x23],
            ),
        ]);
        let mut dev = RV3028::new(mock);

        dev.set_time(&Time::new(23, 59, 58).unwrap()).unwrap();
        let time = dev.time().unwrap();
        assert_eq!(time.hour(), 23);
        assert_eq!(time.minute(), 59);
        assert_eq!(time.second(), 58);
        dev.i2c.done();
    }

    #[test]
    fn test_set_and_get_date() {
        let mock = setup_mock(&[
            I2cTrans::write(DEVICE_ADDRESS, vec![Reg::Date as u8, 0x31, 0x12, 0x21]),
            // 2021-12-31 is a Friday
            I2cTrans::write(DEVICE_ADDRESS, vec![Reg::Weekday as u8, 5]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![Reg::Date as u8], vec![0x31, 0x12, 0x21]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![Reg::Weekday as u8], vec![5]),
        ]);
        let mut dev = RV3028::new(mock);

        dev.set_date(&Date::new(2021, 12, 31).unwrap()).unwrap();
        let date = dev.date().unwrap();
        assert_eq!(date.year(), 2021);
        assert_eq!(date.month(), 12);
        assert_eq!(date.day(), 31);
        assert_eq!(dev.weekday().unwrap(), 5);
        dev.i2c.done();
    }

    #[test]
    fn test_set_weekday_rejects_out_of_range() {
        let mock = setup_mock(&[]);
        let mut dev = RV3028::new(mock);

        assert!(matches!(
            dev.set_weekday(7),
            Err(RV3028Error::DateTime(DateTimeError::OutOfRange {
                field: Field::Weekday,
                ..
            }))
        ));
        dev.i2c.done();
    }

    #[test]
    fn test_read_datetime() {
        // 2024-03-14 15:30:00
        let datetime_registers = [
            0x00, // seconds
            0x30, // minutes
            0x15, // hours
            0x04, // weekday (Thursday)
            0x14, // date
            0x03, // month
            0x24, // year
        ];
        let mock = setup_mock(&[I2cTrans::write_read(
            DEVICE_ADDRESS,
            vec![Reg::Seconds as u8],
            datetime_registers.to_vec(),
        )]);
        let mut dev = RV3028::new(mock);

        let dt = dev.datetime().unwrap();
        assert_eq!(dt, DateTime::new(2024, 3, 14, 15, 30, 0).unwrap());
        dev.i2c.done();
    }

    #[test]
    fn test_set_datetime() {
        let mock = setup_mock(&[I2cTrans::write(
            DEVICE_ADDRESS,
            vec![Reg::Seconds as u8, 0x00, 0x30, 0x15, 0x04, 0x14, 0x03, 0x24],
        )]);
        let mut dev = RV3028::new(mock);

        let dt = DateTime::new(2024, 3, 14, 15, 30, 0).unwrap();
        dev.set_datetime(&dt).unwrap();
        dev.i2c.done();
    }

    #[test]
    fn test_read_datetime_malformed_month() {
        let mock = setup_mock(&[I2cTrans::write_read(
            DEVICE_ADDRESS,
            vec![Reg::Seconds as u8],
            vec![0x00, 0x00, 0x00, 0x00, 0x01, 0x13, 0x24],
        )]);
        let mut dev = RV3028::new(mock);

        assert!(matches!(
            dev.datetime(),
            Err(RV3028Error::DateTime(DateTimeError::OutOfRange {
                field: Field::Month,
                value: 13,
                ..
            }))
        ));
        dev.i2c.done();
    }

    #[test]
    fn test_unix_time() {
        let mock = setup_mock(&[
            I2cTrans::write(
                DEVICE_ADDRESS,
                vec![Reg::UnixTime0 as u8, 0x78, 0x56, 0x34, 0x12],
            ),
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![Reg::UnixTime0 as u8],
                vec![0x78, 0x56, 0x34, 0x12],
            ),
        ]);
        let mut dev = RV3028::new(mock);

        dev.set_unix_time(0x1234_5678).unwrap();
        assert_eq!(dev.unix_time().unwrap(), 0x1234_5678);
        dev.i2c.done();
    }

    #[test]
    fn test_set_alarm() {
        let mock = setup_mock(&[
            // Clear AF
            I2cTrans::write_read(DEVICE_ADDRESS, vec![Reg::Status as u8], vec![0x04]),
            I2cTrans::write(DEVICE_ADDRESS, vec![Reg::Status as u8, 0x00]),
            // WADA cleared for a weekday alarm
            I2cTrans::write_read(DEVICE_ADDRESS, vec![Reg::Control1 as u8], vec![0x20]),
            I2cTrans::write(DEVICE_ADDRESS, vec![Reg::Control1 as u8, 0x00]),
            I2cTrans::write(
                DEVICE_ADDRESS,
                vec![Reg::AlarmMinutes as u8, 0x30, 0x14, 0x03],
            ),
            // Clear AF again
            I2cTrans::write_read(DEVICE_ADDRESS, vec![Reg::Status as u8], vec![0x00]),
            I2cTrans::write(DEVICE_ADDRESS, vec![Reg::Status as u8, 0x00]),
        ]);
        let mut dev = RV3028::new(mock);

        let config = AlarmConfig {
            minute: Some(30),
            hour: Some(14),
            day: Some(AlarmDay::Weekday(3)),
        };
        dev.set_alarm(&config).unwrap();
        dev.i2c.done();
    }

    #[test]
    fn test_set_alarm_minute_only_keeps_wada() {
        let mock = setup_mock(&[
            I2cTrans::write_read(DEVICE_ADDRESS, vec![Reg::Status as u8], vec![0x00]),
            I2cTrans::write(DEVICE_ADDRESS, vec![Reg::Status as u8, 0x00]),
            I2cTrans::write(
                DEVICE_ADDRESS,
                vec![Reg::AlarmMinutes as u8, 0x04, 0x80, 0x80],
            ),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![Reg::Status as u8], vec![0x00]),
            I2cTrans::write(DEVICE_ADDRESS, vec![Reg::Status as u8, 0x00]),
        ]);
        let mut dev = RV3028::new(mock);

        let config = AlarmConfig {
            minute: Some(4),
            ..Default::default()
        };
        dev.set_alarm(&config).unwrap();
        dev.i2c.done();
    }

    #[test]
    fn test_set_alarm_invalid_config_touches_nothing() {
        let mock = setup_mock(&[]);
        let mut dev = RV3028::new(mock);

        let config = AlarmConfig {
            hour: Some(24),
            ..Default::default()
        };
        assert!(matches!(
            dev.set_alarm(&config),
            Err(RV3028Error::Alarm(AlarmError::InvalidTime(_)))
        ));
        dev.i2c.done();
    }

    #[test]
    fn test_get_alarm() {
        let mock = setup_mock(&[
            // All fields disabled
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![Reg::AlarmMinutes as u8],
                vec![0x84, 0x85, 0x86],
            ),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![Reg::Control1 as u8], vec![0x00]),
            // Minute and hour watched
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![Reg::AlarmMinutes as u8],
                vec![0x04, 0x05, 0x80],
            ),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![Reg::Control1 as u8], vec![0x00]),
            // Date alarm on the 15th
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![Reg::AlarmMinutes as u8],
                vec![0x04, 0x05, 0x15],
            ),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![Reg::Control1 as u8], vec![0x20]),
        ]);
        let mut dev = RV3028::new(mock);

        assert_eq!(dev.alarm().unwrap(), AlarmConfig::default());
        assert_eq!(
            dev.alarm().unwrap(),
            AlarmConfig {
                minute: Some(4),
                hour: Some(5),
                day: None,
            }
        );
        assert_eq!(dev.alarm().unwrap().day, Some(AlarmDay::Date(15)));
        dev.i2c.done();
    }

    #[test]
    fn test_check_alarm() {
        let mock = setup_mock(&[
            I2cTrans::write_read(DEVICE_ADDRESS, vec![Reg::Status as u8], vec![0x04]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![Reg::Status as u8], vec![0x04]),
            I2cTrans::write(DEVICE_ADDRESS, vec![Reg::Status as u8, 0x00]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![Reg::Status as u8], vec![0x00]),
        ]);
        let mut dev = RV3028::new(mock);

        assert!(dev.check_alarm().unwrap());
        assert!(!dev.check_alarm().unwrap());
        dev.i2c.done();
    }

    #[test]
    fn test_set_alarm_interrupt() {
        let mock = setup_mock(&[
            I2cTrans::write_read(DEVICE_ADDRESS, vec![Reg::Control2 as u8], vec![0x00]),
            I2cTrans::write(DEVICE_ADDRESS, vec![Reg::Control2 as u8, 0x08]),
        ]);
        let mut dev = RV3028::new(mock);

        dev.set_alarm_interrupt(true).unwrap();
        dev.i2c.done();
    }

    #[test]
    fn test_enable_trickle_charger() {
        let mock = setup_mock(&[
            // TCR first
            I2cTrans::write_read(DEVICE_ADDRESS, vec![Reg::EepromBackup as u8], vec![0x00]),
            I2cTrans::write(DEVICE_ADDRESS, vec![Reg::EepromBackup as u8, 0x02]),
            // then TCE
            I2cTrans::write_read(DEVICE_ADDRESS, vec![Reg::EepromBackup as u8], vec![0x02]),
            I2cTrans::write(DEVICE_ADDRESS, vec![Reg::EepromBackup as u8, 0x22]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![Reg::EepromBackup as u8], vec![0x22]),
        ]);
        let mut dev = RV3028::new(mock);

        let resistance = TrickleResistance::from_ohms(9000).unwrap();
        dev.enable_trickle_charger(resistance).unwrap();
        let backup = dev.eeprom_backup().unwrap();
        assert!(backup.trickle_charge_enable());
        assert_eq!(backup.trickle_resistance(), TrickleResistance::R9k);
        dev.i2c.done();
    }

    #[test]
    fn test_disable_trickle_charger() {
        let mock = setup_mock(&[
            I2cTrans::write_read(DEVICE_ADDRESS, vec![Reg::EepromBackup as u8], vec![0x22]),
            I2cTrans::write(DEVICE_ADDRESS, vec![Reg::EepromBackup as u8, 0x02]),
        ]);
        let mut dev = RV3028::new(mock);

        dev.disable_trickle_charger().unwrap();
        dev.i2c.done();
    }

    #[test]
    fn test_configure_evi_enable() {
        let mock = setup_mock(&[
            // TSE and EIE off
            I2cTrans::write_read(DEVICE_ADDRESS, vec![Reg::Control2 as u8], vec![0x00]),
            I2cTrans::write(DEVICE_ADDRESS, vec![Reg::Control2 as u8, 0x00]),
            // Clear EVF
            I2cTrans::write_read(DEVICE_ADDRESS, vec![Reg::Status as u8], vec![0x02]),
            I2cTrans::write(DEVICE_ADDRESS, vec![Reg::Status as u8, 0x00]),
            // EHL high, TSR pulse
            I2cTrans::write_read(DEVICE_ADDRESS, vec![Reg::EventControl as u8], vec![0x00]),
            I2cTrans::write(DEVICE_ADDRESS, vec![Reg::EventControl as u8, 0x44]),
            // TSE and EIE on
            I2cTrans::write(DEVICE_ADDRESS, vec![Reg::Control2 as u8, 0x84]),
        ]);
        let mut dev = RV3028::new(mock);

        dev.configure_evi(true, EventLevel::High).unwrap();
        dev.i2c.done();
    }

    #[test]
    fn test_configure_evi_disable() {
        let mock = setup_mock(&[
            I2cTrans::write_read(DEVICE_ADDRESS, vec![Reg::Control2 as u8], vec![0x8C]),
            I2cTrans::write(DEVICE_ADDRESS, vec![Reg::Control2 as u8, 0x08]),
        ]);
        let mut dev = RV3028::new(mock);

        dev.configure_evi(false, EventLevel::High).unwrap();
        dev.i2c.done();
    }

    #[test]
    fn test_timestamp_settings() {
        let mock = setup_mock(&[
            I2cTrans::write_read(DEVICE_ADDRESS, vec![Reg::EventControl as u8], vec![0x40]),
            I2cTrans::write(DEVICE_ADDRESS, vec![Reg::EventControl as u8, 0x41]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![Reg::EventControl as u8], vec![0x41]),
            I2cTrans::write(DEVICE_ADDRESS, vec![Reg::EventControl as u8, 0x43]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![Reg::EventControl as u8], vec![0x43]),
        ]);
        let mut dev = RV3028::new(mock);

        dev.set_timestamp_source(TimestampSource::BackupSwitchover)
            .unwrap();
        dev.set_timestamp_overwrite(true).unwrap();
        let event_control = dev.event_control().unwrap();
        assert_eq!(
            event_control.timestamp_source(),
            TimestampSource::BackupSwitchover
        );
        assert!(event_control.timestamp_overwrite());
        assert_eq!(event_control.event_level(), EventLevel::High);
        dev.i2c.done();
    }

    #[test]
    fn test_event_timestamp() {
        let mock = setup_mock(&[
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![Reg::TimestampCount as u8],
                vec![0x01, 0x10, 0x20, 0x12, 0x25, 0x09, 0x21],
            ),
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![Reg::TimestampCount as u8],
                vec![0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
            ),
        ]);
        let mut dev = RV3028::new(mock);

        let ts = dev.event_timestamp().unwrap();
        assert_eq!(ts.count, 1);
        assert_eq!(
            ts.datetime,
            Some(DateTime::new(2021, 9, 25, 12, 20, 10).unwrap())
        );

        let ts = dev.event_timestamp().unwrap();
        assert_eq!(
            ts,
            EventTimestamp {
                count: 0,
                datetime: None
            }
        );
        dev.i2c.done();
    }

    #[test]
    fn test_event_flag() {
        let mock = setup_mock(&[
            I2cTrans::write_read(DEVICE_ADDRESS, vec![Reg::Status as u8], vec![0x02]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![Reg::Status as u8], vec![0x02]),
            I2cTrans::write(DEVICE_ADDRESS, vec![Reg::Status as u8, 0x00]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![Reg::Status as u8], vec![0x00]),
        ]);
        let mut dev = RV3028::new(mock);

        assert!(dev.is_event_flag_set().unwrap());
        dev.clear_event_flag().unwrap();
        assert!(!dev.is_event_flag_set().unwrap());
        dev.i2c.done();
    }

    #[test]
    fn test_configure_backup_switchover() {
        let mock = setup_mock(&[
            I2cTrans::write_read(DEVICE_ADDRESS, vec![Reg::EepromBackup as u8], vec![0x20]),
            I2cTrans::write(DEVICE_ADDRESS, vec![Reg::EepromBackup as u8, 0x64]),
        ]);
        let mut dev = RV3028::new(mock);

        dev.configure_backup_switchover(BackupSwitchoverMode::Direct, true)
            .unwrap();
        dev.i2c.done();
    }

    #[test]
    fn test_backup_switchover_flag() {
        let mock = setup_mock(&[
            I2cTrans::write_read(DEVICE_ADDRESS, vec![Reg::Status as u8], vec![0x21]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![Reg::Status as u8], vec![0x21]),
            I2cTrans::write(DEVICE_ADDRESS, vec![Reg::Status as u8, 0x01]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![Reg::Status as u8], vec![0x01]),
        ]);
        let mut dev = RV3028::new(mock);

        assert!(dev.is_backup_switchover_occurred().unwrap());
        dev.clear_backup_switchover_flag().unwrap();
        assert!(!dev.is_backup_switchover_occurred().unwrap());
        dev.i2c.done();
    }

    #[test]
    fn test_update_field_preserves_other_bits() {
        let mock = setup_mock(&[
            I2cTrans::write_read(DEVICE_ADDRESS, vec![Reg::EepromBackup as u8], vec![0xF0]),
            I2cTrans::write(DEVICE_ADDRESS, vec![Reg::EepromBackup as u8, 0xF3]),
        ]);
        let mut dev = RV3028::new(mock);

        dev.update_field(
            Reg::EepromBackup,
            fields::eeprom_backup::TRICKLE_CHARGE_RESISTANCE,
            0b11,
        )
        .unwrap();
        dev.i2c.done();
    }

    #[test]
    fn test_update_field_out_of_bounds() {
        let mock = setup_mock(&[]);
        let mut dev = RV3028::new(mock);

        assert!(matches!(
            dev.update_field(Reg::Control1, BitField::new(7, 2), 1),
            Err(RV3028Error::BitField(BitFieldError::OutOfBounds {
                position: 7,
                width: 2
            }))
        ));
        assert!(matches!(
            dev.flag(Reg::Status, BitField::flag(8)),
            Err(RV3028Error::BitField(_))
        ));
        dev.i2c.done();
    }

    #[test]
    fn test_register_views() {
        let mock = setup_mock(&[
            I2cTrans::write_read(DEVICE_ADDRESS, vec![Reg::Status as u8], vec![0x05]),
            I2cTrans::write(DEVICE_ADDRESS, vec![Reg::Control2 as u8, 0x80]),
        ]);
        let mut dev = RV3028::new(mock);

        let status = dev.status().unwrap();
        assert!(status.alarm_flag());
        assert!(status.power_on_reset_flag());
        assert!(!status.event_flag());

        let mut control2 = Control2::default();
        control2.set_timestamp_enable(true);
        dev.set_control2(control2).unwrap();
        dev.i2c.done();
    }

    #[test]
    fn test_write_registers_too_long() {
        let mock = setup_mock(&[]);
        let mut dev = RV3028::new(mock);

        assert!(matches!(
            dev.write_registers(Reg::Ram1, &[0; MAX_BURST + 1]),
            Err(RV3028Error::BurstTooLong(8))
        ));
        let mut mock = dev.release();
        mock.done();
    }
}
