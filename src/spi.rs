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

//! Linux `spidev` transport.
//!
//! The AD7124 is normally wired to one of the Raspberry Pi's SPI buses and
//! accessed through a `/dev/spidevB.C` device, where B is the bus and C the
//! Chip Enable (Slave Select) line. On a Pi 2 Click Shield, position 1 maps
//! to `/dev/spidev0.0` and position 2 to `/dev/spidev0.1`.
//!
//! SPI0 is disabled by default. Enable it through `sudo raspi-config`, or
//! by adding `dtparam=spi=on` to `/boot/config.txt`.
//!
//! The AD7124 samples data on the rising edge of SCLK with the clock idling
//! high, so it expects [`Mode::Mode3`]. Its SPI interface runs at up to
//! 5 MHz.
//!
//! ## Buffer size limits
//!
//! spidev handles up to 4096 bytes in a single transfer by default. Register
//! frames for this device never exceed 8 bytes.

use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::io::AsRawFd;
use std::result;

use crate::transport::{Configure, Transport};

mod ioctl;
mod segment;

use self::segment::Segment;

/// Longest frame [`Spi`] exchanges through the [`Transport`] trait. The
/// AD7124 reset sequence is the longest frame the driver sends.
pub const MAX_FRAME_LEN: usize = 8;

/// Errors that can occur when accessing the SPI peripheral.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// The specified number of bits per word is not supported.
    ///
    /// spidev on the Raspberry Pi only accepts 8 bit words (or 9 bits in
    /// LoSSI mode).
    #[error("Bits per word value not supported: {0}")]
    BitsPerWordNotSupported(u8),
    /// The specified bit order is not supported.
    #[error("Bit order value not supported: {0:?}")]
    BitOrderNotSupported(BitOrder),
    /// The specified clock speed is not supported.
    #[error("Clock speed value not supported: {0}")]
    ClockSpeedNotSupported(u32),
    /// The specified mode is not supported.
    #[error("Mode value not supported: {0:?}")]
    ModeNotSupported(Mode),
    /// The frame doesn't fit in the transfer buffer.
    #[error("Frame too long: {0} bytes")]
    FrameTooLong(usize),
}

/// Result type returned from methods that can have `spi::Error`s.
pub type Result<T> = result::Result<T, Error>;

/// SPI buses.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Bus {
    Spi0 = 0,
    Spi1 = 1,
    Spi2 = 2,
}

/// Slave Select (Chip Enable) lines.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum SlaveSelect {
    Ss0 = 0,
    Ss1 = 1,
    Ss2 = 2,
}

/// SPI modes.
///
/// Each mode sets the clock polarity (CPOL) and clock phase (CPHA):
///
/// * Mode0: CPOL 0, CPHA 0
/// * Mode1: CPOL 0, CPHA 1
/// * Mode2: CPOL 1, CPHA 0
/// * Mode3: CPOL 1, CPHA 1
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Mode {
    Mode0 = 0,
    Mode1 = 1,
    Mode2 = 2,
    Mode3 = 3,
}

/// Bit order.
///
/// The AD7124 shifts data most-significant bit first.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum BitOrder {
    MsbFirst = 0,
    LsbFirst = 1,
}

/// Path of the spidev device for the given bus and Slave Select line.
pub fn device_path(bus: Bus, slave_select: SlaveSelect) -> String {
    format!("/dev/spidev{}.{}", bus as u8, slave_select as u8)
}

/// Provides access to a `spidev` device.
#[derive(Debug)]
pub struct Spi {
    spidev: File,
}

impl Spi {
    /// Opens the spidev device for `bus` and `slave_select`.
    ///
    /// See [`open`] for the meaning of `clock_speed` and `mode`.
    ///
    /// [`open`]: #method.open
    pub fn new(bus: Bus, slave_select: SlaveSelect, clock_speed: u32, mode: Mode) -> Result<Spi> {
        Spi::open(&device_path(bus, slave_select), clock_speed, mode)
    }

    /// Opens the spidev device at `path`.
    ///
    /// `clock_speed` defines the maximum clock speed in Hz. The SPI driver
    /// selects the closest valid frequency.
    ///
    /// `mode` selects the clock polarity and phase.
    ///
    /// The device is released when the returned value is dropped, including
    /// when any of the configuration steps fail.
    pub fn open(path: &str, clock_speed: u32, mode: Mode) -> Result<Spi> {
        let spidev = OpenOptions::new().read(true).write(true).open(path)?;

        let spi = Spi { spidev };

        spi.set_mode(mode)?;
        spi.set_clock_speed(clock_speed)?;
        spi.set_bits_per_word(8)?;
        spi.set_bit_order(BitOrder::MsbFirst)?;

        Ok(spi)
    }

    /// Sets the order in which bits are shifted out and in.
    pub fn set_bit_order(&self, bit_order: BitOrder) -> Result<()> {
        match ioctl::set_lsb_first(self.spidev.as_raw_fd(), bit_order as u8) {
            Ok(_) => Ok(()),
            Err(ref e) if e.kind() == io::ErrorKind::InvalidInput => {
                Err(Error::BitOrderNotSupported(bit_order))
            }
            Err(e) => Err(Error::Io(e)),
        }
    }

    /// Sets the number of bits per word.
    pub fn set_bits_per_word(&self, bits_per_word: u8) -> Result<()> {
        match ioctl::set_bits_per_word(self.spidev.as_raw_fd(), bits_per_word) {
            Ok(_) => Ok(()),
            Err(ref e) if e.kind() == io::ErrorKind::InvalidInput => {
                Err(Error::BitsPerWordNotSupported(bits_per_word))
            }
            Err(e) => Err(Error::Io(e)),
        }
    }

    /// Sets the clock speed in hertz (Hz).
    pub fn set_clock_speed(&self, clock_speed: u32) -> Result<()> {
        match ioctl::set_clock_speed(self.spidev.as_raw_fd(), clock_speed) {
            Ok(_) => Ok(()),
            Err(ref e) if e.kind() == io::ErrorKind::InvalidInput => {
                Err(Error::ClockSpeedNotSupported(clock_speed))
            }
            Err(e) => Err(Error::Io(e)),
        }
    }

    /// Sets the SPI mode.
    pub fn set_mode(&self, mode: Mode) -> Result<()> {
        let mut new_mode: u8 = 0;
        ioctl::mode(self.spidev.as_raw_fd(), &mut new_mode)?;

        // Only replace the CPOL/CPHA bits
        new_mode = (new_mode & !(ioctl::MODE_CPOL | ioctl::MODE_CPHA)) | (mode as u8);

        match ioctl::set_mode(self.spidev.as_raw_fd(), new_mode) {
            Ok(_) => Ok(()),
            Err(ref e) if e.kind() == io::ErrorKind::InvalidInput => {
                Err(Error::ModeNotSupported(mode))
            }
            Err(e) => Err(Error::Io(e)),
        }
    }

    /// Sends `write_buffer` and stores incoming data in `read_buffer` in a
    /// single chip-select window.
    ///
    /// Only as many bytes as the shorter buffer holds are transferred.
    /// Returns that number.
    pub fn transfer(&self, read_buffer: &mut [u8], write_buffer: &[u8]) -> Result<usize> {
        let segment = Segment::new(read_buffer, write_buffer);

        ioctl::transfer(self.spidev.as_raw_fd(), &[segment])?;

        Ok(segment.len())
    }
}

impl Transport for Spi {
    type Error = Error;

    fn exchange(&mut self, buffer: &mut [u8]) -> Result<()> {
        let len = buffer.len();
        if len > MAX_FRAME_LEN {
            return Err(Error::FrameTooLong(len));
        }

        let mut write_buffer = [0u8; MAX_FRAME_LEN];
        write_buffer[..len].copy_from_slice(buffer);
        let transferred = self.transfer(buffer, &write_buffer[..len])?;

        if transferred != len {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "short SPI transfer",
            )));
        }

        Ok(())
    }
}

impl Configure for Spi {
    fn configure(path: &str, clock_speed: u32, mode: Mode) -> Result<Spi> {
        Spi::open(path, clock_speed, mode)
    }
}
