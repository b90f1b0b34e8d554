//! Async implementation of the RV-3028 driver.
//!
//! This module provides an async interface to the RV-3028-C7 RTC using
//! `embedded-hal-async` traits. It is only available when the `async` feature
//! is enabled. Every operation issues the same bus transactions as its
//! blocking counterpart in [`crate::RV3028`].
//!
//! # Example
//!
//! ```rust,ignore
//! use rv3028::asynch::RV3028;
//!
//! let mut rtc = RV3028::new(i2c);
//!
//! let datetime = rtc.datetime().await?;
//! rtc.configure_evi(true, EventLevel::High).await?;
//! ```

use embedded_hal_async::i2c::I2c;
use paste::paste;

use crate::alarm::{date_alarm_select, RV3028Alarm};
use crate::datetime::{decode_date, decode_time, encode_date, encode_time, RV3028DateTime};
use crate::{
    burst_frame, decode_timestamp, fields, validate_weekday, AlarmConfig, BackupSwitchoverMode,
    BitField, Control1, Control2, Date, DateTime, EepromBackup, EventControl, EventLevel,
    EventTimestamp, Flag, RV3028Error, Reg, Status, Time, TimestampSource, TrickleResistance,
    MAX_BURST, RV3028_ADDRESS,
};

/// RV-3028-C7 Real-Time Clock async driver.
pub struct RV3028<I2C: I2c> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> RV3028<I2C> {
    /// Creates a new async driver on `i2c` at [`RV3028_ADDRESS`].
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
    pub async fn read_register(&mut self, reg: Reg) -> Result<u8, RV3028Error<I2C::Error>> {
        let mut data = [0];
        self.i2c
            .write_read(self.address, &[reg.into()], &mut data)
            .await?;
        Ok(data[0])
    }

    /// Writes one register.
    pub async fn write_register(
        &mut self,
        reg: Reg,
        value: u8,
    ) -> Result<(), RV3028Error<I2C::Error>> {
        self.i2c.write(self.address, &[reg.into(), value]).await?;
        Ok(())
    }

    /// Reads `buf.len()` consecutive registers starting at `reg`.
    pub async fn read_registers(
        &mut self,
        reg: Reg,
        buf: &mut [u8],
    ) -> Result<(), RV3028Error<I2C::Error>> {
        self.i2c.write_read(self.address, &[reg.into()], buf).await?;
        Ok(())
    }

    /// Writes `data` to consecutive registers starting at `reg`.
    pub async fn write_registers(
        &mut self,
        reg: Reg,
        data: &[u8],
    ) -> Result<(), RV3028Error<I2C::Error>> {
        let mut buf = [0u8; MAX_BURST + 1];
        let frame = burst_frame(&mut buf, reg, data)?;
        self.i2c.write(self.address, frame).await?;
        Ok(())
    }

    /// Replaces `field` of `reg` with `value`, keeping every other bit.
    pub async fn update_field(
        &mut self,
        reg: Reg,
        field: BitField,
        value: u8,
    ) -> Result<(), RV3028Error<I2C::Error>> {
        field.mask().map_err(RV3028Error::BitField)?;
        let current = self.read_register(reg).await?;
        let updated = field.write(current, value).map_err(RV3028Error::BitField)?;
        debug!("{:?}: {:?} -> {:?}", reg, current, updated);
        self.write_register(reg, updated).await
    }

    /// Sets or clears the single-bit `field` of `reg`.
    pub async fn set_flag(
        &mut self,
        reg: Reg,
        field: BitField,
        flag: Flag,
    ) -> Result<(), RV3028Error<I2C::Error>> {
        self.update_field(reg, field, flag as u8).await
    }

    /// Reads the single-bit `field` of `reg`.
    pub async fn flag(
        &mut self,
        reg: Reg,
        field: BitField,
    ) -> Result<bool, RV3028Error<I2C::Error>> {
        field.mask().map_err(RV3028Error::BitField)?;
        let value = self.read_register(reg).await?;
        Ok(field.read(value).map_err(RV3028Error::BitField)? != 0)
    }

    /// Reads the time of day.
    pub async fn time(&mut self) -> Result<Time, RV3028Error<I2C::Error>> {
        let mut data = [0; 3];
        self.read_registers(Reg::Seconds, &mut data).await?;
        decode_time(data).map_err(RV3028Error::from_image)
    }

    /// Sets the time of day.
    pub async fn set_time(&mut self, time: &Time) -> Result<(), RV3028Error<I2C::Error>> {
        self.write_registers(Reg::Seconds, &encode_time(time)).await
    }

    /// Reads the calendar date.
    pub async fn date(&mut self) -> Result<Date, RV3028Error<I2C::Error>> {
        let mut data = [0; 3];
        self.read_registers(Reg::Date, &mut data).await?;
        decode_date(data).map_err(RV3028Error::from_image)
    }

    /// Sets the calendar date and the matching weekday.
    pub async fn set_date(&mut self, date: &Date) -> Result<(), RV3028Error<I2C::Error>> {
        let weekday = date.weekday().map_err(RV3028Error::DateTime)?;
        self.write_registers(Reg::Date, &encode_date(date)).await?;
        self.set_weekday(weekday.num_days_from_sunday() as u8).await
    }

    /// Reads the weekday register (0-6, 0 = Sunday).
    pub async fn weekday(&mut self) -> Result<u8, RV3028Error<I2C::Error>> {
        let raw = self.read_register(Reg::Weekday).await?;
        let weekday = fields::WEEKDAY.read(raw).map_err(RV3028Error::BitField)?;
        validate_weekday(weekday).map_err(RV3028Error::DateTime)?;
        Ok(weekday)
    }

    /// Writes the weekday register.
    pub async fn set_weekday(&mut self, weekday: u8) -> Result<(), RV3028Error<I2C::Error>> {
        validate_weekday(weekday).map_err(RV3028Error::DateTime)?;
        self.write_register(Reg::Weekday, weekday).await
    }

    /// Reads date and time in a single burst.
    pub async fn datetime(&mut self) -> Result<DateTime, RV3028Error<I2C::Error>> {
        let mut data = [0; 7];
        self.read_registers(Reg::Seconds, &mut data).await?;
        RV3028DateTime::from(data)
            .into_datetime()
            .map_err(RV3028Error::from_image)
    }

    /// Sets date, time and weekday in a single burst.
    pub async fn set_datetime(
        &mut self,
        datetime: &DateTime,
    ) -> Result<(), RV3028Error<I2C::Error>> {
        let raw = RV3028DateTime::from_datetime(datetime).map_err(RV3028Error::DateTime)?;
        let data: [u8; 7] = (&raw).into();
        self.write_registers(Reg::Seconds, &data).await
    }

    /// Reads the 32-bit UNIX time counter.
    pub async fn unix_time(&mut self) -> Result<u32, RV3028Error<I2C::Error>> {
        let mut data = [0; 4];
        self.read_registers(Reg::UnixTime0, &mut data).await?;
        Ok(u32::from_le_bytes(data))
    }

    /// Writes the 32-bit UNIX time counter.
    pub async fn set_unix_time(&mut self, seconds: u32) -> Result<(), RV3028Error<I2C::Error>> {
        self.write_registers(Reg::UnixTime0, &seconds.to_le_bytes())
            .await
    }

    /// Programs the alarm, clearing the alarm flag before and after.
    pub async fn set_alarm(&mut self, config: &AlarmConfig) -> Result<(), RV3028Error<I2C::Error>> {
        let alarm = RV3028Alarm::from_config(config).map_err(RV3028Error::Alarm)?;
        self.set_flag(Reg::Status, fields::status::ALARM, Flag::Clear)
            .await?;
        if let Some(wada) = date_alarm_select(config) {
            self.set_flag(Reg::Control1, fields::control1::WADA, wada)
                .await?;
        }
        let data: [u8; 3] = (&alarm).into();
        debug!("alarm registers: {:?}", data);
        self.write_registers(Reg::AlarmMinutes, &data).await?;
        self.set_flag(Reg::Status, fields::status::ALARM, Flag::Clear)
            .await
    }

    /// Reads the alarm settings.
    pub async fn alarm(&mut self) -> Result<AlarmConfig, RV3028Error<I2C::Error>> {
        let mut data = [0; 3];
        self.read_registers(Reg::AlarmMinutes, &mut data).await?;
        let control1 = self.control1().await?;
        RV3028Alarm::from(data)
            .to_config(control1.date_alarm())
            .map_err(RV3028Error::Alarm)
    }

    /// Returns whether the alarm fired, clearing the flag if it did.
    pub async fn check_alarm(&mut self) -> Result<bool, RV3028Error<I2C::Error>> {
        let fired = self.status().await?.alarm_flag();
        if fired {
            self.set_flag(Reg::Status, fields::status::ALARM, Flag::Clear)
                .await?;
        }
        Ok(fired)
    }

    /// Enables or disables the alarm interrupt.
    pub async fn set_alarm_interrupt(&mut self, enable: bool) -> Result<(), RV3028Error<I2C::Error>> {
        self.set_flag(
            Reg::Control2,
            fields::control2::ALARM_INT_ENABLE,
            enable.into(),
        )
        .await
    }

    /// Selects the series resistance, then enables the trickle charger.
    pub async fn enable_trickle_charger(
        &mut self,
        resistance: TrickleResistance,
    ) -> Result<(), RV3028Error<I2C::Error>> {
        self.update_field(
            Reg::EepromBackup,
            fields::eeprom_backup::TRICKLE_CHARGE_RESISTANCE,
            resistance.into(),
        )
        .await?;
        self.set_flag(
            Reg::EepromBackup,
            fields::eeprom_backup::TRICKLE_CHARGE_ENABLE,
            Flag::Set,
        )
        .await
    }

    /// Disables the trickle charger.
    pub async fn disable_trickle_charger(&mut self) -> Result<(), RV3028Error<I2C::Error>> {
        self.set_flag(
            Reg::EepromBackup,
            fields::eeprom_backup::TRICKLE_CHARGE_ENABLE,
            Flag::Clear,
        )
        .await
    }

    /// Configures the EVI input for time stamping.
    pub async fn configure_evi(
        &mut self,
        enable: bool,
        level: EventLevel,
    ) -> Result<(), RV3028Error<I2C::Error>> {
        let mut control2 = self.control2().await?;
        control2.set_timestamp_enable(false);
        control2.set_event_int_enable(false);
        self.set_control2(control2).await?;
        if !enable {
            return Ok(());
        }

        self.set_flag(Reg::Status, fields::status::EVENT, Flag::Clear)
            .await?;

        let mut event_control = self.event_control().await?;
        event_control.set_event_level(level);
        event_control.set_timestamp_reset(true);
        debug!("event control: {:?}", event_control);
        self.set_event_control(event_control).await?;

        control2.set_timestamp_enable(true);
        control2.set_event_int_enable(true);
        self.set_control2(control2).await
    }

    /// Selects what triggers a time stamp capture.
    pub async fn set_timestamp_source(
        &mut self,
        source: TimestampSource,
    ) -> Result<(), RV3028Error<I2C::Error>> {
        self.update_field(
            Reg::EventControl,
            fields::event_control::TIMESTAMP_SOURCE,
            source.into(),
        )
        .await
    }

    /// Keep the last event (true) or the first event (false) in the time stamp.
    pub async fn set_timestamp_overwrite(
        &mut self,
        overwrite: bool,
    ) -> Result<(), RV3028Error<I2C::Error>> {
        self.set_flag(
            Reg::EventControl,
            fields::event_control::TIMESTAMP_OVERWRITE,
            overwrite.into(),
        )
        .await
    }

    /// Reads the event counter and time stamp in a single burst.
    pub async fn event_timestamp(&mut self) -> Result<EventTimestamp, RV3028Error<I2C::Error>> {
        let mut data = [0; 7];
        self.read_registers(Reg::TimestampCount, &mut data).await?;
        decode_timestamp(data).map_err(RV3028Error::from_image)
    }

    /// Returns whether an event was detected on EVI.
    pub async fn is_event_flag_set(&mut self) -> Result<bool, RV3028Error<I2C::Error>> {
        self.flag(Reg::Status, fields::status::EVENT).await
    }

    /// Clears the event flag.
    pub async fn clear_event_flag(&mut self) -> Result<(), RV3028Error<I2C::Error>> {
        self.set_flag(Reg::Status, fields::status::EVENT, Flag::Clear)
            .await
    }

    /// Sets the switchover mode and the backup switchover interrupt enable.
    pub async fn configure_backup_switchover(
        &mut self,
        mode: BackupSwitchoverMode,
        interrupt: bool,
    ) -> Result<(), RV3028Error<I2C::Error>> {
        let mut backup = self.eeprom_backup().await?;
        backup.set_backup_switchover_mode(mode);
        backup.set_backup_switchover_int_enable(interrupt);
        debug!("eeprom backup: {:?}", backup);
        self.set_eeprom_backup(backup).await
    }

    /// Returns whether a switchover to the backup supply happened.
    pub async fn is_backup_switchover_occurred(&mut self) -> Result<bool, RV3028Error<I2C::Error>> {
        self.flag(Reg::Status, fields::status::BACKUP_SWITCH).await
    }

    /// Clears the backup switchover flag.
    pub async fn clear_backup_switchover_flag(&mut self) -> Result<(), RV3028Error<I2C::Error>> {
        self.set_flag(Reg::Status, fields::status::BACKUP_SWITCH, Flag::Clear)
            .await
    }
}

// Register access implementations
macro_rules! impl_register_access {
    ($(($name:ident, $regaddr:expr, $typ:ty)),+) => {
        impl<I2C: I2c> RV3028<I2C> {
            $(
                paste! {
                    #[doc = concat!("Reads the ", stringify!($typ), " register.")]
                    pub async fn $name(&mut self) -> Result<$typ, RV3028Error<I2C::Error>> {
                        Ok($typ(self.read_register($regaddr).await?))
                    }

                    #[doc = concat!("Writes the ", stringify!($typ), " register.")]
                    pub async fn [<set_ $name>](&mut self, value: $typ) -> Result<(), RV3028Error<I2C::Error>> {
                        self.write_register($regaddr, value.into()).await
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
