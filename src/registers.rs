//! Register definitions and bitfield structures for the RV-3028-C7 RTC.
//!
//! This module contains the register address map, the field layout of each
//! configuration register as [`BitField`](crate::bits::BitField) descriptors (used for
//! read-modify-write access), and typed bitfield views of the configuration
//! registers for inspection.

use bitfield::bitfield;

/// Register addresses for the RV-3028-C7.
#[allow(unused)]
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reg {
    /// Seconds register (0-59)
    Seconds = 0x00,
    /// Minutes register (0-59)
    Minutes = 0x01,
    /// Hours register (0-23, or 1-12 + AM/PM)
    Hours = 0x02,
    /// Weekday register (0-6, user assigned)
    Weekday = 0x03,
    /// Date register (1-31)
    Date = 0x04,
    /// Month register (1-12)
    Month = 0x05,
    /// Year register (0-99 for 2000-2099)
    Year = 0x06,
    /// Minutes alarm register with AE_M bit
    AlarmMinutes = 0x07,
    /// Hours alarm register with AE_H bit
    AlarmHours = 0x08,
    /// Weekday or date alarm register with AE_WD bit, selected by WADA
    AlarmWeekdayDate = 0x09,
    /// Countdown timer value, low byte
    Timer0 = 0x0A,
    /// Countdown timer value, high nibble
    Timer1 = 0x0B,
    /// Countdown timer status, low byte (read only)
    TimerStatus0 = 0x0C,
    /// Countdown timer status, high nibble (read only)
    TimerStatus1 = 0x0D,
    /// Status register
    Status = 0x0E,
    /// Control 1 register
    Control1 = 0x0F,
    /// Control 2 register
    Control2 = 0x10,
    /// General purpose bits
    GpBits = 0x11,
    /// Clock interrupt mask register
    ClockIntMask = 0x12,
    /// Event control register
    EventControl = 0x13,
    /// Number of logged events (read only)
    TimestampCount = 0x14,
    /// Time stamp seconds (read only)
    TimestampSeconds = 0x15,
    /// Time stamp minutes (read only)
    TimestampMinutes = 0x16,
    /// Time stamp hours (read only)
    TimestampHours = 0x17,
    /// Time stamp date (read only)
    TimestampDate = 0x18,
    /// Time stamp month (read only)
    TimestampMonth = 0x19,
    /// Time stamp year (read only)
    TimestampYear = 0x1A,
    /// UNIX time counter, least significant byte
    UnixTime0 = 0x1B,
    UnixTime1 = 0x1C,
    UnixTime2 = 0x1D,
    /// UNIX time counter, most significant byte
    UnixTime3 = 0x1E,
    /// User RAM 1
    Ram1 = 0x1F,
    /// User RAM 2
    Ram2 = 0x20,
    /// EEPROM data
    EeData = 0x26,
    /// EEPROM command
    EeCommand = 0x27,
    /// Part and version ID (read only)
    Id = 0x28,
    /// RAM mirror of the EEPROM clock output configuration
    EepromClkout = 0x35,
    /// RAM mirror of the EEPROM frequency offset
    EepromOffset = 0x36,
    /// RAM mirror of the EEPROM backup configuration
    EepromBackup = 0x37,
}

impl From<Reg> for u8 {
    fn from(r: Reg) -> Self {
        r as u8
    }
}

/// Field layout of the RV-3028-C7 registers.
pub mod fields {
    use crate::bits::BitField;

    // Clock and time stamp value bits (unused high bits read as 0)
    pub const SECONDS: BitField = BitField::new(0, 7);
    pub const MINUTES: BitField = BitField::new(0, 7);
    pub const HOURS_24: BitField = BitField::new(0, 6);
    pub const WEEKDAY: BitField = BitField::new(0, 3);
    pub const DATE: BitField = BitField::new(0, 6);
    pub const MONTH: BitField = BitField::new(0, 5);
    pub const YEAR: BitField = BitField::new(0, 8);

    /// Alarm enable bit of the three alarm registers; 1 = field not watched
    pub const ALARM_DISABLED: BitField = BitField::flag(7);
    /// Alarm value bits below the AE bit
    pub const ALARM_VALUE: BitField = BitField::new(0, 7);

    /// Status register (0x0E)
    pub mod status {
        use crate::bits::BitField;

        pub const EEPROM_BUSY: BitField = BitField::flag(7);
        pub const CLOCK_OUTPUT: BitField = BitField::flag(6);
        pub const BACKUP_SWITCH: BitField = BitField::flag(5);
        pub const PERIODIC_UPDATE: BitField = BitField::flag(4);
        pub const PERIODIC_TIMER: BitField = BitField::flag(3);
        pub const ALARM: BitField = BitField::flag(2);
        pub const EVENT: BitField = BitField::flag(1);
        pub const POWER_ON_RESET: BitField = BitField::flag(0);
    }

    /// Control 1 register (0x0F)
    pub mod control1 {
        use crate::bits::BitField;

        pub const TIMER_REPEAT: BitField = BitField::flag(7);
        /// Weekday (0) or date (1) alarm
        pub const WADA: BitField = BitField::flag(5);
        pub const UPDATE_SELECT: BitField = BitField::flag(4);
        pub const EEPROM_REFRESH_DISABLE: BitField = BitField::flag(3);
        pub const TIMER_ENABLE: BitField = BitField::flag(2);
        pub const TIMER_CLOCK: BitField = BitField::new(0, 2);
    }

    /// Control 2 register (0x10)
    pub mod control2 {
        use crate::bits::BitField;

        pub const TIMESTAMP_ENABLE: BitField = BitField::flag(7);
        pub const CLOCK_INT_ENABLE: BitField = BitField::flag(6);
        pub const UPDATE_INT_ENABLE: BitField = BitField::flag(5);
        pub const TIMER_INT_ENABLE: BitField = BitField::flag(4);
        pub const ALARM_INT_ENABLE: BitField = BitField::flag(3);
        pub const EVENT_INT_ENABLE: BitField = BitField::flag(2);
        pub const TWELVE_HOUR: BitField = BitField::flag(1);
        pub const RESET: BitField = BitField::flag(0);
    }

    /// Event control register (0x13)
    pub mod event_control {
        use crate::bits::BitField;

        pub const EVENT_HIGH_LOW: BitField = BitField::flag(6);
        pub const EVENT_FILTER: BitField = BitField::new(4, 2);
        pub const TIMESTAMP_RESET: BitField = BitField::flag(2);
        pub const TIMESTAMP_OVERWRITE: BitField = BitField::flag(1);
        pub const TIMESTAMP_SOURCE: BitField = BitField::flag(0);
    }

    /// EEPROM backup register mirror (0x37)
    pub mod eeprom_backup {
        use crate::bits::BitField;

        pub const OFFSET_LSB: BitField = BitField::flag(7);
        pub const BACKUP_SWITCHOVER_INT_ENABLE: BitField = BitField::flag(6);
        pub const TRICKLE_CHARGE_ENABLE: BitField = BitField::flag(5);
        pub const FAST_EDGE_DETECTION: BitField = BitField::flag(4);
        pub const BACKUP_SWITCHOVER_MODE: BitField = BitField::new(2, 2);
        pub const TRICKLE_CHARGE_RESISTANCE: BitField = BitField::new(0, 2);
    }
}

/// Automatic backup switchover mode (BSM field).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BackupSwitchoverMode {
    /// Switchover disabled (default)
    Disabled = 0b00,
    /// Direct switching mode: switch when VDD < VBACKUP
    Direct = 0b01,
    /// Standby mode: only the backup supply is used
    Standby = 0b10,
    /// Level switching mode: switch when VDD < 2.0 V and VBACKUP > 2.0 V
    Level = 0b11,
}
impl From<u8> for BackupSwitchoverMode {
    /// Creates a `BackupSwitchoverMode` from a raw register value.
    ///
    /// # Panics
    /// Panics if the value is not 0b00, 0b01, 0b10, or 0b11.
    fn from(v: u8) -> Self {
        match v {
            0b00 => BackupSwitchoverMode::Disabled,
            0b01 => BackupSwitchoverMode::Direct,
            0b10 => BackupSwitchoverMode::Standby,
            0b11 => BackupSwitchoverMode::Level,
            _ => panic!("Invalid value for BackupSwitchoverMode: {}", v),
        }
    }
}
impl From<BackupSwitchoverMode> for u8 {
    fn from(v: BackupSwitchoverMode) -> Self {
        v as u8
    }
}

/// Trickle charger series resistance (TCR field).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TrickleResistance {
    /// 3 kΩ
    R3k = 0b00,
    /// 5 kΩ
    R5k = 0b01,
    /// 9 kΩ
    R9k = 0b10,
    /// 15 kΩ
    R15k = 0b11,
}
impl TrickleResistance {
    /// Maps a resistance in ohms to the matching setting.
    pub fn from_ohms(ohms: u32) -> Option<Self> {
        match ohms {
            3000 => Some(TrickleResistance::R3k),
            5000 => Some(TrickleResistance::R5k),
            9000 => Some(TrickleResistance::R9k),
            15000 => Some(TrickleResistance::R15k),
            _ => None,
        }
    }

    /// Resistance in ohms.
    pub fn ohms(self) -> u32 {
        match self {
            TrickleResistance::R3k => 3000,
            TrickleResistance::R5k => 5000,
            TrickleResistance::R9k => 9000,
            TrickleResistance::R15k => 15000,
        }
    }
}
impl From<u8> for TrickleResistance {
    /// Creates a `TrickleResistance` from a raw register value.
    ///
    /// # Panics
    /// Panics if the value is not 0b00, 0b01, 0b10, or 0b11.
    fn from(v: u8) -> Self {
        match v {
            0b00 => TrickleResistance::R3k,
            0b01 => TrickleResistance::R5k,
            0b10 => TrickleResistance::R9k,
            0b11 => TrickleResistance::R15k,
            _ => panic!("Invalid value for TrickleResistance: {}", v),
        }
    }
}
impl From<TrickleResistance> for u8 {
    fn from(v: TrickleResistance) -> Self {
        v as u8
    }
}

/// Level or edge of the EVI pin that counts as an event (EHL bit).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EventLevel {
    /// Low level or falling edge
    Low = 0,
    /// High level or rising edge
    High = 1,
}
impl From<u8> for EventLevel {
    /// # Panics
    /// Panics if the value is not 0 or 1.
    fn from(v: u8) -> Self {
        match v {
            0 => EventLevel::Low,
            1 => EventLevel::High,
            _ => panic!("Invalid value for EventLevel: {}", v),
        }
    }
}
impl From<EventLevel> for u8 {
    fn from(v: EventLevel) -> Self {
        v as u8
    }
}

/// Source of time stamp captures (TSS bit).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimestampSource {
    /// External event on the EVI pin (default)
    ExternalEvent = 0,
    /// Automatic backup switchover
    BackupSwitchover = 1,
}
impl From<u8> for TimestampSource {
    /// # Panics
    /// Panics if the value is not 0 or 1.
    fn from(v: u8) -> Self {
        match v {
            0 => TimestampSource::ExternalEvent,
            1 => TimestampSource::BackupSwitchover,
            _ => panic!("Invalid value for TimestampSource: {}", v),
        }
    }
}
impl From<TimestampSource> for u8 {
    fn from(v: TimestampSource) -> Self {
        v as u8
    }
}

// This macro generates the From<u8> and Into<u8> implementations for the
// register type
macro_rules! from_register_u8 {
    ($typ:ty) => {
        impl From<u8> for $typ {
            fn from(v: u8) -> Self {
                paste::paste!([< $typ >](v))
            }
        }
        impl From<$typ> for u8 {
            fn from(v: $typ) -> Self {
                v.0
            }
        }
    };
}

bitfield! {
    /// Status register: interrupt and event flags.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Status(u8);
    impl Debug;
    /// EEPROM memory transfer in progress
    pub eeprom_busy, set_eeprom_busy: 7;
    /// Clock output interrupt flag
    pub clock_output_flag, set_clock_output_flag: 6;
    /// Backup switchover flag
    pub backup_switch_flag, set_backup_switch_flag: 5;
    /// Periodic time update flag
    pub periodic_update_flag, set_periodic_update_flag: 4;
    /// Periodic countdown timer flag
    pub periodic_timer_flag, set_periodic_timer_flag: 3;
    /// Alarm flag
    pub alarm_flag, set_alarm_flag: 2;
    /// Event flag
    pub event_flag, set_event_flag: 1;
    /// Power on reset flag
    pub power_on_reset_flag, set_power_on_reset_flag: 0;
}
from_register_u8!(Status);

#[cfg(feature = "defmt")]
impl defmt::Format for Status {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Status(");
        if self.eeprom_busy() {
            defmt::write!(f, " EEbusy");
        }
        if self.clock_output_flag() {
            defmt::write!(f, " CLKF");
        }
        if self.backup_switch_flag() {
            defmt::write!(f, " BSF");
        }
        if self.periodic_update_flag() {
            defmt::write!(f, " UF");
        }
        if self.periodic_timer_flag() {
            defmt::write!(f, " TF");
        }
        if self.alarm_flag() {
            defmt::write!(f, " AF");
        }
        if self.event_flag() {
            defmt::write!(f, " EVF");
        }
        if self.power_on_reset_flag() {
            defmt::write!(f, " PORF");
        }
        defmt::write!(f, " )");
    }
}

bitfield! {
    /// Control 1 register: countdown timer and alarm mode.
    #[derive(Clone, Copy, Default, PartialEq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct Control1(u8);
    impl Debug;
    /// Countdown timer repeat mode
    pub timer_repeat, set_timer_repeat: 7;
    /// Weekday (false) or date (true) alarm
    pub date_alarm, set_date_alarm: 5;
    /// Periodic update every minute (true) or second (false)
    pub update_minute, set_update_minute: 4;
    /// Disable automatic EEPROM refresh
    pub eeprom_refresh_disable, set_eeprom_refresh_disable: 3;
    /// Countdown timer enable
    pub timer_enable, set_timer_enable: 2;
    /// Countdown timer clock frequency selection
    pub timer_clock, set_timer_clock: 1, 0;
}
from_register_u8!(Control1);

bitfield! {
    /// Control 2 register: interrupt enables and time stamp enable.
    #[derive(Clone, Copy, Default, PartialEq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct Control2(u8);
    impl Debug;
    /// Time stamp enable
    pub timestamp_enable, set_timestamp_enable: 7;
    /// Interrupt controlled clock output enable
    pub clock_int_enable, set_clock_int_enable: 6;
    /// Periodic time update interrupt enable
    pub update_int_enable, set_update_int_enable: 5;
    /// Periodic countdown timer interrupt enable
    pub timer_int_enable, set_timer_int_enable: 4;
    /// Alarm interrupt enable
    pub alarm_int_enable, set_alarm_int_enable: 3;
    /// Event interrupt enable
    pub event_int_enable, set_event_int_enable: 2;
    /// 12-hour mode
    pub twelve_hour, set_twelve_hour: 1;
    /// System reset
    pub reset, set_reset: 0;
}
from_register_u8!(Control2);

bitfield! {
    /// Event control register: EVI input and time stamp behavior.
    #[derive(Clone, Copy, Default, PartialEq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct EventControl(u8);
    impl Debug;
    /// Event level/edge selection
    pub from into EventLevel, event_level, set_event_level: 6, 6;
    /// Event filtering time
    pub event_filter, set_event_filter: 5, 4;
    /// Time stamp reset (always reads 0)
    pub timestamp_reset, set_timestamp_reset: 2;
    /// Overwrite the time stamp with the latest event
    pub timestamp_overwrite, set_timestamp_overwrite: 1;
    /// Time stamp source
    pub from into TimestampSource, timestamp_source, set_timestamp_source: 0, 0;
}
from_register_u8!(EventControl);

bitfield! {
    /// EEPROM backup register (RAM mirror): backup supply and trickle charger.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct EepromBackup(u8);
    impl Debug;
    /// Least significant bit of the frequency offset
    pub offset_lsb, set_offset_lsb: 7;
    /// Backup switchover interrupt enable
    pub backup_switchover_int_enable, set_backup_switchover_int_enable: 6;
    /// Trickle charger enable
    pub trickle_charge_enable, set_trickle_charge_enable: 5;
    /// Fast edge detection
    pub fast_edge_detection, set_fast_edge_detection: 4;
    /// Backup switchover mode
    pub from into BackupSwitchoverMode, backup_switchover_mode, set_backup_switchover_mode: 3, 2;
    /// Trickle charger series resistance
    pub from into TrickleResistance, trickle_resistance, set_trickle_resistance: 1, 0;
}
from_register_u8!(EepromBackup);

#[cfg(feature = "defmt")]
impl defmt::Format for EepromBackup {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "EepromBackup(bsm={}, bsie={}, tce={}, tcr={} ohm)",
            self.backup_switchover_mode(),
            self.backup_switchover_int_enable(),
            self.trickle_charge_enable(),
            self.trickle_resistance().ohms()
        );
    }
}
