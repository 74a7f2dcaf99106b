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

//! Byte-exchange abstraction the AD7124 session is built on.
//!
//! The session only needs two capabilities from the bus: a way to open and
//! configure it ([`Configure`]), and a full-duplex exchange of a single
//! chip-select framed buffer ([`Transport`]). [`Spi`] implements both for
//! Linux `spidev` devices. The `hal` module provides adapters for
//! `embedded-hal` buses, which are configured by their owner and therefore
//! only implement [`Transport`].
//!
//! [`Spi`]: ../spi/struct.Spi.html

use crate::spi::Mode;

/// A full-duplex byte exchange with a single device.
pub trait Transport {
    /// Error reported by the underlying bus.
    type Error;

    /// Shifts out the contents of `buffer` while Slave Select is active,
    /// replacing each byte with the byte shifted in at the same position.
    fn exchange(&mut self, buffer: &mut [u8]) -> Result<(), Self::Error>;
}

/// A transport that can be opened from a device path.
pub trait Configure: Transport + Sized {
    /// Opens the device at `path` and applies the clock speed and mode.
    fn configure(path: &str, clock_speed: u32, mode: Mode) -> Result<Self, Self::Error>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    type Error = T::Error;

    fn exchange(&mut self, buffer: &mut [u8]) -> Result<(), Self::Error> {
        (**self).exchange(buffer)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    type Error = T::Error;

    fn exchange(&mut self, buffer: &mut [u8]) -> Result<(), Self::Error> {
        (**self).exchange(buffer)
    }
}
