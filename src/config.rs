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

//! Session configuration.

use std::time::Duration;

use crate::checksum::ChecksumMode;
use crate::spi::{self, Bus, Mode, SlaveSelect};

/// Default spidev device: SPI0, Slave Select 1.
pub const DEFAULT_PATH: &str = "/dev/spidev0.1";
/// Highest SCLK frequency the AD7124 supports.
pub const DEFAULT_CLOCK_SPEED: u32 = 5_000_000;
/// Status polls allowed for the device to come out of reset.
pub const DEFAULT_POLL_LIMIT: u32 = 10;
/// Time the device is given to restart after a reset command.
pub const DEFAULT_RESET_DELAY: Duration = Duration::from_millis(1);

/// Settings used to open an [`Ad7124`] session.
///
/// Every transport setting carries an explicit default, so a session is
/// never opened against an unconfigured bus.
///
/// [`Ad7124`]: ../device/struct.Ad7124.html
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    path: String,
    clock_speed: u32,
    mode: Mode,
    poll_limit: u32,
    poll_interval: Duration,
    reset_delay: Duration,
    checksum: ChecksumMode,
    cache_reads: bool,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            path: DEFAULT_PATH.to_owned(),
            clock_speed: DEFAULT_CLOCK_SPEED,
            mode: Mode::Mode3,
            poll_limit: DEFAULT_POLL_LIMIT,
            poll_interval: Duration::ZERO,
            reset_delay: DEFAULT_RESET_DELAY,
            checksum: ChecksumMode::Off,
            cache_reads: true,
        }
    }
}

impl Config {
    /// Constructs a `Config` for the device at `path`, with defaults for
    /// everything else.
    pub fn new(path: impl Into<String>) -> Config {
        Config {
            path: path.into(),
            ..Config::default()
        }
    }

    /// Constructs a `Config` for the spidev device on `bus` and
    /// `slave_select`.
    pub fn with_bus(bus: Bus, slave_select: SlaveSelect) -> Config {
        Config::new(spi::device_path(bus, slave_select))
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn set_path(&mut self, path: impl Into<String>) -> &mut Config {
        self.path = path.into();
        self
    }

    /// Gets the maximum SCLK frequency in hertz (Hz).
    pub fn clock_speed(&self) -> u32 {
        self.clock_speed
    }

    pub fn set_clock_speed(&mut self, clock_speed: u32) -> &mut Config {
        self.clock_speed = clock_speed;
        self
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) -> &mut Config {
        self.mode = mode;
        self
    }

    /// Gets the number of status polls allowed while waiting for the device
    /// to acknowledge a reset.
    pub fn poll_limit(&self) -> u32 {
        self.poll_limit
    }

    /// Sets the reset acknowledgement poll limit. Must be positive.
    pub fn set_poll_limit(&mut self, poll_limit: u32) -> &mut Config {
        self.poll_limit = poll_limit;
        self
    }

    /// Gets the delay between consecutive status polls.
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Sets the delay between consecutive status polls.
    ///
    /// By default, `poll_interval` is zero and polls are issued back to back.
    pub fn set_poll_interval(&mut self, poll_interval: Duration) -> &mut Config {
        self.poll_interval = poll_interval;
        self
    }

    /// Gets the delay between the reset command and the first status poll.
    pub fn reset_delay(&self) -> Duration {
        self.reset_delay
    }

    pub fn set_reset_delay(&mut self, reset_delay: Duration) -> &mut Config {
        self.reset_delay = reset_delay;
        self
    }

    pub fn checksum(&self) -> ChecksumMode {
        self.checksum
    }

    /// Requests CRC protected frames. The session enables CRC checking on
    /// the device during setup.
    pub fn set_checksum(&mut self, checksum: ChecksumMode) -> &mut Config {
        self.checksum = checksum;
        self
    }

    pub fn cache_reads(&self) -> bool {
        self.cache_reads
    }

    /// Keeps the last value read from or written to each register.
    pub fn set_cache_reads(&mut self, cache_reads: bool) -> &mut Config {
        self.cache_reads = cache_reads;
        self
    }
}
