//! Bit-level access to single-byte registers and BCD conversion.
//!
//! Every stateful operation of the driver is a read-modify-write of one
//! register byte: read the byte, replace one field with [`write_field`] (or
//! [`BitField::write`]), write the byte back. The helpers here are pure
//! byte-in/byte-out transforms; they never touch the bus.
//!
//! # Error Handling
//!
//! A field that does not fit inside an 8-bit register, or a flag value that
//! is neither set nor clear, is reported via [`BitFieldError`].

use core::fmt;

/// Width of every register on the bus, in bits.
pub const REGISTER_BITS: u8 = 8;

/// Errors raised by the bit-field helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BitFieldError {
    /// The field is empty or extends past bit 7 (`position + width > 8`).
    OutOfBounds {
        /// Lowest bit of the field
        position: u8,
        /// Number of bits in the field
        width: u8,
    },
    /// A flag value other than 0 (clear) or 1 (set).
    InvalidFlag(u8),
}

impl fmt::Display for BitFieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BitFieldError::OutOfBounds { position, width } => write!(
                f,
                "bit-field at position {} with width {} does not fit in an {}-bit register",
                position, width, REGISTER_BITS
            ),
            BitFieldError::InvalidFlag(v) => write!(f, "invalid flag value {}, expected 0 or 1", v),
        }
    }
}

/// State of a single-bit flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Flag {
    /// Bit is 0
    Clear = 0,
    /// Bit is 1
    Set = 1,
}

impl From<bool> for Flag {
    fn from(v: bool) -> Self {
        if v {
            Flag::Set
        } else {
            Flag::Clear
        }
    }
}

impl From<Flag> for bool {
    fn from(v: Flag) -> Self {
        v == Flag::Set
    }
}

impl TryFrom<u8> for Flag {
    type Error = BitFieldError;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(Flag::Clear),
            1 => Ok(Flag::Set),
            _ => Err(BitFieldError::InvalidFlag(v)),
        }
    }
}

/// Location of a field inside a register byte.
///
/// The descriptor itself is not checked on construction so that register
/// layouts can be declared as constants; every access validates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BitField {
    position: u8,
    width: u8,
}

impl BitField {
    /// Field of `width` bits whose lowest bit is `position`.
    pub const fn new(position: u8, width: u8) -> Self {
        Self { position, width }
    }

    /// Single-bit field at `position`.
    pub const fn flag(position: u8) -> Self {
        Self::new(position, 1)
    }

    /// Lowest bit of the field.
    pub const fn position(&self) -> u8 {
        self.position
    }

    /// Number of bits in the field.
    pub const fn width(&self) -> u8 {
        self.width
    }

    /// Mask of the field bits in register position.
    pub fn mask(&self) -> Result<u8, BitFieldError> {
        check_bounds(self.position, self.width)?;
        Ok(value_mask(self.width) << self.position)
    }

    /// Extracts this field from `register`, right-justified.
    pub fn read(&self, register: u8) -> Result<u8, BitFieldError> {
        read_field(register, self.position, self.width)
    }

    /// Returns `register` with this field replaced by `value`.
    pub fn write(&self, register: u8, value: u8) -> Result<u8, BitFieldError> {
        write_field(register, self.position, self.width, value)
    }
}

fn check_bounds(position: u8, width: u8) -> Result<(), BitFieldError> {
    if width == 0 || u16::from(position) + u16::from(width) > u16::from(REGISTER_BITS) {
        return Err(BitFieldError::OutOfBounds { position, width });
    }
    Ok(())
}

// Right-justified mask of `width` ones; width is already bounds checked.
fn value_mask(width: u8) -> u8 {
    ((1u16 << width) - 1) as u8
}

/// Converts a BCD register byte to its binary value.
///
/// Total over all inputs: nibbles above 9 produce values above 99, which the
/// caller has to reject.
pub const fn decode_bcd(value: u8) -> u8 {
    (value >> 4) * 10 + (value & 0x0F)
}

/// Converts a binary value in `0..=99` to a BCD register byte.
pub const fn encode_bcd(value: u8) -> u8 {
    ((value / 10) << 4) | (value % 10)
}

/// Extracts `width` bits starting at `position`, right-justified.
///
/// # Errors
///
/// Returns [`BitFieldError::OutOfBounds`] if the field does not fit in the register.
pub fn read_field(register: u8, position: u8, width: u8) -> Result<u8, BitFieldError> {
    check_bounds(position, width)?;
    Ok((register >> position) & value_mask(width))
}

/// Replaces `width` bits starting at `position` with `value`.
///
/// `value` is truncated to the field width; every bit outside the field is
/// preserved.
///
/// # Errors
///
/// Returns [`BitFieldError::OutOfBounds`] if the field does not fit in the register.
pub fn write_field(register: u8, position: u8, width: u8, value: u8) -> Result<u8, BitFieldError> {
    check_bounds(position, width)?;
    let mask = value_mask(width);
    Ok((register & !(mask << position)) | ((value & mask) << position))
}

/// Reads a single bit as a boolean.
pub fn read_flag(register: u8, bit: u8) -> Result<bool, BitFieldError> {
    read_field(register, bit, 1).map(|v| v != 0)
}

/// Sets or clears a single bit.
pub fn write_flag(register: u8, bit: u8, flag: Flag) -> Result<u8, BitFieldError> {
    write_field(register, bit, 1, flag as u8)
}
