// Copyright (c) 2017-2024 Rene van der Meer and the ad7124 contributors
//
// Permission is hereby granted, free of charge, to any person obtaining a
// copy of this software and associated documentation files (the "Software"),
// to deal in the Software without restriction, including without limitation
// the rights to use, copy, modify, merge, publish, distribute, sublicense,
// and/or sell copies of the Software, and to permit persons to whom the
// Software is furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL
// THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
// FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
// DEALINGS IN THE SOFTWARE.

//! AD7124 register map.
//!
//! Every register the part exposes is listed in [`REGISTERS`], indexed by
//! its [`RegisterId`]. Identifiers are contiguous from [`RegisterId::Status`]
//! up to, but excluding, [`REGISTER_COUNT`]. On the AD7124 the identifier
//! doubles as the 6-bit register address used in the communications byte.

use std::fmt;

/// Number of registers in the table. Valid identifiers are `0..REGISTER_COUNT`.
pub const REGISTER_COUNT: usize = 57;

/// The identifier passed to a lookup was outside the register table.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid register id: {0}")]
pub struct InvalidRegisterId(pub u8);

/// Register access mode.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Access {
    ReadOnly,
    ReadWrite,
}

/// Register identifiers, in address order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum RegisterId {
    /// Status register. Holds the inverted RDY flag.
    Status = 0x00,
    /// ADC control register.
    AdcControl = 0x01,
    /// Conversion result.
    Data = 0x02,
    IoCon1 = 0x03,
    IoCon2 = 0x04,
    /// Device identification.
    Id = 0x05,
    Error = 0x06,
    /// Error enable register. Also turns on SPI CRC checking.
    ErrorEn = 0x07,
    /// Master clock counter.
    MclkCount = 0x08,
    Channel0 = 0x09,
    Channel1 = 0x0A,
    Channel2 = 0x0B,
    Channel3 = 0x0C,
    Channel4 = 0x0D,
    Channel5 = 0x0E,
    Channel6 = 0x0F,
    Channel7 = 0x10,
    Channel8 = 0x11,
    Channel9 = 0x12,
    Channel10 = 0x13,
    Channel11 = 0x14,
    Channel12 = 0x15,
    Channel13 = 0x16,
    Channel14 = 0x17,
    Channel15 = 0x18,
    Config0 = 0x19,
    Config1 = 0x1A,
    Config2 = 0x1B,
    Config3 = 0x1C,
    Config4 = 0x1D,
    Config5 = 0x1E,
    Config6 = 0x1F,
    Config7 = 0x20,
    Filter0 = 0x21,
    Filter1 = 0x22,
    Filter2 = 0x23,
    Filter3 = 0x24,
    Filter4 = 0x25,
    Filter5 = 0x26,
    Filter6 = 0x27,
    Filter7 = 0x28,
    Offset0 = 0x29,
    Offset1 = 0x2A,
    Offset2 = 0x2B,
    Offset3 = 0x2C,
    Offset4 = 0x2D,
    Offset5 = 0x2E,
    Offset6 = 0x2F,
    Offset7 = 0x30,
    Gain0 = 0x31,
    Gain1 = 0x32,
    Gain2 = 0x33,
    Gain3 = 0x34,
    Gain4 = 0x35,
    Gain5 = 0x36,
    Gain6 = 0x37,
    Gain7 = 0x38,
}

impl RegisterId {
    /// Returns the descriptor for this register.
    pub fn register(self) -> &'static Register {
        &REGISTERS[self as usize]
    }

    /// Iterates over all registers, from `Status` up to the count sentinel.
    pub fn iter() -> impl Iterator<Item = RegisterId> {
        REGISTERS.iter().map(|register| register.id)
    }

    /// Channel mapping register `n` (0 to 15).
    pub fn channel(n: u8) -> Result<RegisterId, InvalidRegisterId> {
        numbered(RegisterId::Channel0, 16, n)
    }

    /// Setup configuration register `n` (0 to 7).
    pub fn config(n: u8) -> Result<RegisterId, InvalidRegisterId> {
        numbered(RegisterId::Config0, 8, n)
    }

    /// Setup filter register `n` (0 to 7).
    pub fn filter(n: u8) -> Result<RegisterId, InvalidRegisterId> {
        numbered(RegisterId::Filter0, 8, n)
    }

    /// Setup offset register `n` (0 to 7).
    pub fn offset(n: u8) -> Result<RegisterId, InvalidRegisterId> {
        numbered(RegisterId::Offset0, 8, n)
    }

    /// Setup gain register `n` (0 to 7).
    pub fn gain(n: u8) -> Result<RegisterId, InvalidRegisterId> {
        numbered(RegisterId::Gain0, 8, n)
    }
}

// Out of range numbers report the id they would have mapped to.
fn numbered(first: RegisterId, count: u8, n: u8) -> Result<RegisterId, InvalidRegisterId> {
    let raw = (first as u8).saturating_add(n);
    if n < count {
        RegisterId::try_from(raw)
    } else {
        Err(InvalidRegisterId(raw))
    }
}

impl TryFrom<u8> for RegisterId {
    type Error = InvalidRegisterId;

    fn try_from(id: u8) -> Result<RegisterId, InvalidRegisterId> {
        lookup(id).map(|register| register.id)
    }
}

impl From<RegisterId> for u8 {
    fn from(id: RegisterId) -> u8 {
        id as u8
    }
}

impl fmt::Display for RegisterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.register().name)
    }
}

/// Describes a single register.
#[derive(Debug, PartialEq, Eq)]
pub struct Register {
    /// Stable identifier.
    pub id: RegisterId,
    /// Human-readable name, as used in the datasheet.
    pub name: &'static str,
    /// Width in bytes.
    pub size: usize,
    pub access: Access,
    /// Value after power-on or reset.
    pub reset: u32,
}

impl Register {
    const fn new(
        id: RegisterId,
        name: &'static str,
        size: usize,
        access: Access,
        reset: u32,
    ) -> Register {
        Register {
            id,
            name,
            size,
            access,
            reset,
        }
    }

    /// 6-bit address used in the communications register.
    pub fn address(&self) -> u8 {
        self.id as u8
    }

    /// Width in bits.
    pub fn bits(&self) -> u32 {
        self.size as u32 * 8
    }

    /// Largest value the register can hold.
    pub fn mask(&self) -> u32 {
        if self.bits() >= 32 {
            u32::MAX
        } else {
            (1u32 << self.bits()) - 1
        }
    }

    pub fn is_writable(&self) -> bool {
        self.access == Access::ReadWrite
    }
}

/// The register table.
pub static REGISTERS: [Register; REGISTER_COUNT] = [
    Register::new(RegisterId::Status, "Status", 1, Access::ReadOnly, 0x00),
    Register::new(RegisterId::AdcControl, "ADC_Control", 2, Access::ReadWrite, 0x0000),
    Register::new(RegisterId::Data, "Data", 3, Access::ReadOnly, 0x000000),
    Register::new(RegisterId::IoCon1, "IOCon1", 3, Access::ReadWrite, 0x000000),
    Register::new(RegisterId::IoCon2, "IOCon2", 2, Access::ReadWrite, 0x0000),
    Register::new(RegisterId::Id, "ID", 1, Access::ReadOnly, 0x14),
    Register::new(RegisterId::Error, "Error", 3, Access::ReadOnly, 0x000000),
    Register::new(RegisterId::ErrorEn, "Error_En", 3, Access::ReadWrite, 0x000040),
    Register::new(RegisterId::MclkCount, "Mclk_Count", 1, Access::ReadOnly, 0x00),
    Register::new(RegisterId::Channel0, "Channel_0", 2, Access::ReadWrite, 0x8001),
    Register::new(RegisterId::Channel1, "Channel_1", 2, Access::ReadWrite, 0x0001),
    Register::new(RegisterId::Channel2, "Channel_2", 2, Access::ReadWrite, 0x0001),
    Register::new(RegisterId::Channel3, "Channel_3", 2, Access::ReadWrite, 0x0001),
    Register::new(RegisterId::Channel4, "Channel_4", 2, Access::ReadWrite, 0x0001),
    Register::new(RegisterId::Channel5, "Channel_5", 2, Access::ReadWrite, 0x0001),
    Register::new(RegisterId::Channel6, "Channel_6", 2, Access::ReadWrite, 0x0001),
    Register::new(RegisterId::Channel7, "Channel_7", 2, Access::ReadWrite, 0x0001),
    Register::new(RegisterId::Channel8, "Channel_8", 2, Access::ReadWrite, 0x0001),
    Register::new(RegisterId::Channel9, "Channel_9", 2, Access::ReadWrite, 0x0001),
    Register::new(RegisterId::Channel10, "Channel_10", 2, Access::ReadWrite, 0x0001),
    Register::new(RegisterId::Channel11, "Channel_11", 2, Access::ReadWrite, 0x0001),
    Register::new(RegisterId::Channel12, "Channel_12", 2, Access::ReadWrite, 0x0001),
    Register::new(RegisterId::Channel13, "Channel_13", 2, Access::ReadWrite, 0x0001),
    Register::new(RegisterId::Channel14, "Channel_14", 2, Access::ReadWrite, 0x0001),
    Register::new(RegisterId::Channel15, "Channel_15", 2, Access::ReadWrite, 0x0001),
    Register::new(RegisterId::Config0, "Config_0", 2, Access::ReadWrite, 0x0860),
    Register::new(RegisterId::Config1, "Config_1", 2, Access::ReadWrite, 0x0860),
    Register::new(RegisterId::Config2, "Config_2", 2, Access::ReadWrite, 0x0860),
    Register::new(RegisterId::Config3, "Config_3", 2, Access::ReadWrite, 0x0860),
    Register::new(RegisterId::Config4, "Config_4", 2, Access::ReadWrite, 0x0860),
    Register::new(RegisterId::Config5, "Config_5", 2, Access::ReadWrite, 0x0860),
    Register::new(RegisterId::Config6, "Config_6", 2, Access::ReadWrite, 0x0860),
    Register::new(RegisterId::Config7, "Config_7", 2, Access::ReadWrite, 0x0860),
    Register::new(RegisterId::Filter0, "Filter_0", 3, Access::ReadWrite, 0x060180),
    Register::new(RegisterId::Filter1, "Filter_1", 3, Access::ReadWrite, 0x060180),
    Register::new(RegisterId::Filter2, "Filter_2", 3, Access::ReadWrite, 0x060180),
    Register::new(RegisterId::Filter3, "Filter_3", 3, Access::ReadWrite, 0x060180),
    Register::new(RegisterId::Filter4, "Filter_4", 3, Access::ReadWrite, 0x060180),
    Register::new(RegisterId::Filter5, "Filter_5", 3, Access::ReadWrite, 0x060180),
    Register::new(RegisterId::Filter6, "Filter_6", 3, Access::ReadWrite, 0x060180),
    Register::new(RegisterId::Filter7, "Filter_7", 3, Access::ReadWrite, 0x060180),
    Register::new(RegisterId::Offset0, "Offset_0", 3, Access::ReadWrite, 0x800000),
    Register::new(RegisterId::Offset1, "Offset_1", 3, Access::ReadWrite, 0x800000),
    Register::new(RegisterId::Offset2, "Offset_2", 3, Access::ReadWrite, 0x800000),
    Register::new(RegisterId::Offset3, "Offset_3", 3, Access::ReadWrite, 0x800000),
    Register::new(RegisterId::Offset4, "Offset_4", 3, Access::ReadWrite, 0x800000),
    Register::new(RegisterId::Offset5, "Offset_5", 3, Access::ReadWrite, 0x800000),
    Register::new(RegisterId::Offset6, "Offset_6", 3, Access::ReadWrite, 0x800000),
    Register::new(RegisterId::Offset7, "Offset_7", 3, Access::ReadWrite, 0x800000),
    Register::new(RegisterId::Gain0, "Gain_0", 3, Access::ReadWrite, 0x500000),
    Register::new(RegisterId::Gain1, "Gain_1", 3, Access::ReadWrite, 0x500000),
    Register::new(RegisterId::Gain2, "Gain_2", 3, Access::ReadWrite, 0x500000),
    Register::new(RegisterId::Gain3, "Gain_3", 3, Access::ReadWrite, 0x500000),
    Register::new(RegisterId::Gain4, "Gain_4", 3, Access::ReadWrite, 0x500000),
    Register::new(RegisterId::Gain5, "Gain_5", 3, Access::ReadWrite, 0x500000),
    Register::new(RegisterId::Gain6, "Gain_6", 3, Access::ReadWrite, 0x500000),
    Register::new(RegisterId::Gain7, "Gain_7", 3, Access::ReadWrite, 0x500000),
];

/// Looks up the descriptor for a raw register identifier.
pub fn lookup(id: u8) -> Result<&'static Register, InvalidRegisterId> {
    REGISTERS.get(id as usize).ok_or(InvalidRegisterId(id))
}

/// Anything that names a register.
///
/// Implemented for [`RegisterId`], which always resolves, and for raw `u8`
/// identifiers, which are range-checked against the table.
pub trait IntoRegister {
    fn into_register(self) -> Result<&'static Register, InvalidRegisterId>;
}

impl IntoRegister for RegisterId {
    fn into_register(self) -> Result<&'static Register, InvalidRegisterId> {
        Ok(self.register())
    }
}

impl IntoRegister for u8 {
    fn into_register(self) -> Result<&'static Register, InvalidRegisterId> {
        lookup(self)
    }
}

impl IntoRegister for &'static Register {
    fn into_register(self) -> Result<&'static Register, InvalidRegisterId> {
        Ok(self)
    }
}
