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

//! Transports for `embedded-hal` SPI devices.
//!
//! [`HalTransport`] wraps any `embedded-hal` 1.0 [`SpiDevice`], and
//! [`Eh0Transport`] wraps an `embedded-hal` 0.2 blocking [`Transfer`]
//! implementation. The wrapped device is configured by its owner, so
//! these only implement [`Transport`], and sessions are created with
//! [`Ad7124::with_transport`].
//!
//! The AD7124 expects SPI mode 3 and a clock of at most 5 MHz.
//!
//! [`SpiDevice`]: embedded_hal::spi::SpiDevice
//! [`Transfer`]: embedded_hal_0::blocking::spi::Transfer
//! [`Transport`]: crate::transport::Transport
//! [`Ad7124::with_transport`]: crate::device::Ad7124::with_transport

use crate::transport::Transport;

/// `Transport` for an `embedded-hal` 1.0 SPI device.
///
/// Each exchange runs as a single transaction, so chip select stays
/// asserted for the whole frame.
#[cfg(feature = "embedded-hal")]
#[derive(Debug)]
pub struct HalTransport<D> {
    device: D,
}

#[cfg(feature = "embedded-hal")]
impl<D: embedded_hal::spi::SpiDevice> HalTransport<D> {
    pub fn new(device: D) -> HalTransport<D> {
        HalTransport { device }
    }

    /// Returns the wrapped device.
    pub fn into_inner(self) -> D {
        self.device
    }
}

#[cfg(feature = "embedded-hal")]
impl<D: embedded_hal::spi::SpiDevice> Transport for HalTransport<D> {
    type Error = D::Error;

    fn exchange(&mut self, buffer: &mut [u8]) -> Result<(), Self::Error> {
        self.device.transfer_in_place(buffer)
    }
}

/// `Transport` for an `embedded-hal` 0.2 blocking SPI bus.
///
/// 0.2 buses don't manage chip select. Use a bus that is dedicated to the
/// AD7124, or one that asserts chip select around each transfer.
#[cfg(feature = "embedded-hal-0")]
#[derive(Debug)]
pub struct Eh0Transport<S> {
    spi: S,
}

#[cfg(feature = "embedded-hal-0")]
impl<S: embedded_hal_0::blocking::spi::Transfer<u8>> Eh0Transport<S> {
    pub fn new(spi: S) -> Eh0Transport<S> {
        Eh0Transport { spi }
    }

    pub fn into_inner(self) -> S {
        self.spi
    }
}

#[cfg(feature = "embedded-hal-0")]
impl<S: embedded_hal_0::blocking::spi::Transfer<u8>> Transport for Eh0Transport<S> {
    type Error = S::Error;

    fn exchange(&mut self, buffer: &mut [u8]) -> Result<(), Self::Error> {
        self.spi.transfer(buffer)?;
        Ok(())
    }
}

#[cfg(all(test, feature = "embedded-hal"))]
mod eh1_tests {
    use super::*;
    use crate::config::Config;
    use crate::device::Ad7124;
    use crate::registers::RegisterId;
    use embedded_hal_mock::eh1::spi::{Mock, Transaction};
    use std::time::Duration;

    fn exchange(tx: &[u8], rx: &[u8]) -> [Transaction<u8>; 3] {
        [
            Transaction::transaction_start(),
            Transaction::transfer_in_place(tx.to_vec(), rx.to_vec()),
            Transaction::transaction_end(),
        ]
    }

    #[test]
    fn exchange_is_one_transaction() {
        let expectations = exchange(&[0x45, 0x00], &[0x00, 0x14]);
        let mut transport = HalTransport::new(Mock::new(&expectations));

        let mut buffer = [0x45, 0x00];
        transport.exchange(&mut buffer).unwrap();
        assert_eq!(buffer, [0x00, 0x14]);

        transport.into_inner().done();
    }

    #[test]
    fn session_over_spi_device() {
        let mut expectations = Vec::new();
        expectations.extend(exchange(&[0xff; 8], &[0x00; 8]));
        expectations.extend(exchange(&[0x40, 0x00], &[0x00, 0x00]));
        expectations.extend(exchange(&[0x45, 0x00], &[0x00, 0x16]));
        expectations.extend(exchange(&[0x09, 0x00, 0x01], &[0x00; 3]));
        expectations.extend(exchange(&[0x40, 0x00], &[0x00, 0x01]));
        expectations.extend(exchange(&[0x42, 0, 0, 0], &[0x00, 0x7f, 0xff, 0xff]));

        let mut config = Config::default();
        config.set_reset_delay(Duration::ZERO);

        let mut spi = Mock::new(&expectations);
        let mut device = Ad7124::with_transport(HalTransport::new(&mut spi), config).unwrap();
        assert_eq!(device.cached(RegisterId::Id), Some(0x16));

        device.wait_for_conversion_ready(1).unwrap();
        assert_eq!(device.read_sample().unwrap(), 0x7f_ffff);
        drop(device);

        spi.done();
    }
}

#[cfg(all(test, feature = "embedded-hal-0"))]
mod eh0_tests {
    use super::*;
    use embedded_hal_mock::eh0::spi::{Mock, Transaction};

    #[test]
    fn exchange_uses_blocking_transfer() {
        let expectations = [Transaction::transfer(vec![0x41, 0, 0], vec![0x00, 0x01, 0x80])];
        let mut transport = Eh0Transport::new(Mock::new(&expectations));

        let mut buffer = [0x41, 0, 0];
        transport.exchange(&mut buffer).unwrap();
        assert_eq!(buffer, [0x00, 0x01, 0x80]);

        transport.into_inner().done();
    }
}
