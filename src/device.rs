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

//! AD7124 device session.
//!
//! An [`Ad7124`] owns one transport and drives the register protocol over
//! it. Every frame starts with a communications byte: bit 7 must be zero,
//! bit 6 selects a read (1) or write (0), and bits 5:0 hold the register
//! address. Register contents follow, most-significant byte first. With CRC
//! protection enabled, a CRC-8 byte computed over the communications byte
//! and the data closes the frame.
//!
//! A session moves through the following states:
//!
//! * [`State::Ready`]: set up and idle. Register reads and writes are allowed.
//! * [`State::ConversionReady`]: a readiness wait succeeded, so the next
//!   [`read_sample`] returns a fresh conversion.
//! * [`State::Closed`]: the transport has been released. Every operation
//!   fails with [`Error::Closed`].
//!
//! [`read_sample`]: struct.Ad7124.html#method.read_sample

use std::result;

use tracing::{debug, info, trace, warn};

use crate::checksum::{crc8, ChecksumMode};
use crate::config::Config;
use crate::registers::{IntoRegister, InvalidRegisterId, Register, RegisterId, REGISTER_COUNT};
use crate::transport::{Configure, Transport};

mod settings;

pub use self::settings::{
    AdcControl, ChannelConfig, ClockSelect, FilterConfig, OperatingMode, PowerMode, SetupConfig,
    Status,
};

/// Communications byte flag selecting a register read.
const COMMS_READ: u8 = 0x40;
const COMMS_ADDRESS_MASK: u8 = 0x3f;
/// 64 consecutive ones reset the serial interface and all registers.
const RESET_FRAME: [u8; 8] = [0xff; 8];
/// Communications byte, three data bytes, status byte and CRC byte.
const MAX_FRAME: usize = 6;
/// Error_En bit that turns on CRC checking of SPI frames.
const SPI_CRC_ERR_EN: u32 = 1 << 18;
/// ADC_Control bit that appends the status register to data reads.
const DATA_STATUS: u32 = 1 << 10;

/// ID register values of the supported parts.
const KNOWN_IDS: [u8; 4] = [
    0x04, // AD7124-4
    0x06, // AD7124-4 rev B
    0x14, // AD7124-8
    0x16, // AD7124-8 rev B
];

/// Reasons a session could not be set up.
#[derive(Debug, thiserror::Error)]
pub enum SetupError<E> {
    /// The poll limit must allow at least one status poll.
    #[error("Poll limit must be positive")]
    InvalidPollLimit,
    /// The device path is empty.
    #[error("Device path is empty")]
    InvalidPath,
    /// The transport could not be configured, or failed during setup.
    #[error("Transport setup failed: {0}")]
    Transport(E),
    /// The device kept reporting a pending power-on reset.
    #[error("Device did not acknowledge reset after {attempts} polls")]
    PowerOnTimeout { attempts: u32 },
    /// The ID register holds a value that doesn't belong to an AD7124.
    #[error("Unknown device ID: {0:#04x}")]
    UnknownDevice(u8),
}

/// Errors that can occur during an AD7124 session.
#[derive(Debug, thiserror::Error)]
pub enum Error<E> {
    /// Setting up the session failed.
    #[error("Setup failed: {0}")]
    Setup(SetupError<E>),
    /// The register identifier is outside the register table.
    #[error("Invalid register id: {0}")]
    InvalidRegisterId(u8),
    /// The byte exchange with the device failed.
    #[error("Transport error: {0}")]
    Transport(E),
    /// No conversion became ready within the allowed number of polls.
    #[error("Conversion not ready after {attempts} polls")]
    Timeout { attempts: u32 },
    /// A sample was requested without a preceding successful readiness wait.
    #[error("No conversion is known to be ready")]
    ConversionNotReady,
    /// The register can't be written.
    #[error("Register {0} is read-only")]
    ReadOnlyRegister(RegisterId),
    /// The value doesn't fit in the register.
    #[error("Value {value:#x} doesn't fit in register {register}")]
    ValueOutOfRange { register: RegisterId, value: u32 },
    /// The CRC byte received from the device doesn't match the frame.
    #[error("CRC mismatch: expected {expected:#04x}, received {received:#04x}")]
    ChecksumMismatch { expected: u8, received: u8 },
    /// The session has been closed.
    #[error("Session is closed")]
    Closed,
}

impl<E> From<InvalidRegisterId> for Error<E> {
    fn from(err: InvalidRegisterId) -> Error<E> {
        Error::InvalidRegisterId(err.0)
    }
}

/// Result type returned from methods that can have `device::Error`s.
pub type Result<T, E> = result::Result<T, Error<E>>;

/// Session state.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum State {
    Ready,
    ConversionReady,
    Closed,
}

/// An open session with an AD7124.
///
/// The session exclusively owns its transport. The transport is released
/// when the session is closed or dropped, and when setup fails partway.
#[derive(Debug)]
pub struct Ad7124<T: Transport> {
    transport: Option<T>,
    config: Config,
    state: State,
    checksum: ChecksumMode,
    data_status: bool,
    cache: [Option<u32>; REGISTER_COUNT],
}

impl<T: Configure> Ad7124<T> {
    /// Configures the transport described by `config` and sets up the device.
    ///
    /// The configuration is validated before the transport is opened.
    pub fn open(config: Config) -> Result<Ad7124<T>, T::Error> {
        validate::<T::Error>(&config)?;

        debug!(
            "Opening {} at {} Hz, {:?}",
            config.path(),
            config.clock_speed(),
            config.mode()
        );

        let transport = T::configure(config.path(), config.clock_speed(), config.mode())
            .map_err(|e| Error::Setup(SetupError::Transport(e)))?;

        Ad7124::with_transport(transport, config)
    }
}

impl<T: Transport> Ad7124<T> {
    /// Sets up the device behind an already configured transport.
    ///
    /// The path, clock speed and mode in `config` are not applied. The
    /// transport is dropped if setup fails.
    pub fn with_transport(transport: T, config: Config) -> Result<Ad7124<T>, T::Error> {
        if config.poll_limit() == 0 {
            return Err(Error::Setup(SetupError::InvalidPollLimit));
        }

        let mut device = Ad7124 {
            transport: Some(transport),
            config,
            state: State::Ready,
            checksum: ChecksumMode::Off,
            data_status: false,
            cache: [None; REGISTER_COUNT],
        };

        device.reset()?;

        Ok(device)
    }

    /// Returns the configuration this session was opened with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn is_closed(&self) -> bool {
        self.state == State::Closed
    }

    /// Returns the checksum mode currently used for frames.
    pub fn checksum(&self) -> ChecksumMode {
        self.checksum
    }

    /// Resets the device and repeats the setup sequence.
    ///
    /// The device is reset, given time to restart, and polled until it
    /// acknowledges the power-on reset. The ID register is checked, channel 0
    /// (enabled at power-on) is disabled, and CRC checking is turned on if
    /// the configuration asks for it.
    pub fn reset(&mut self) -> Result<(), T::Error> {
        self.setup().map_err(|e| match e {
            Error::Transport(e) => Error::Setup(SetupError::Transport(e)),
            e => e,
        })
    }

    fn setup(&mut self) -> Result<(), T::Error> {
        let mut frame = RESET_FRAME;
        self.exchange(&mut frame)?;

        self.checksum = ChecksumMode::Off;
        self.data_status = false;
        self.state = State::Ready;
        self.cache = [None; REGISTER_COUNT];

        let reset_delay = self.config.reset_delay();
        if !reset_delay.is_zero() {
            spin_sleep::sleep(reset_delay);
        }

        self.wait_for_power_on()?;

        let id = self.read_register(RegisterId::Id)? as u8;
        if !KNOWN_IDS.contains(&id) {
            warn!("Unexpected device ID {:#04x}", id);
            return Err(Error::Setup(SetupError::UnknownDevice(id)));
        }

        // Channel 0 is enabled after reset. Default for the others is 0x0001.
        self.write_register(RegisterId::Channel0, 0x0001)?;

        if self.config.checksum() == ChecksumMode::Crc8 {
            let error_en = self.read_register(RegisterId::ErrorEn)?;
            self.write_register(RegisterId::ErrorEn, error_en | SPI_CRC_ERR_EN)?;
            self.checksum = ChecksumMode::Crc8;
        }

        info!("AD7124 ready (ID {:#04x}, checksum {:?})", id, self.checksum);

        Ok(())
    }

    fn wait_for_power_on(&mut self) -> Result<(), T::Error> {
        let limit = self.config.poll_limit();

        for attempt in 1..=limit {
            if !self.read_status()?.power_on_reset {
                debug!("Reset acknowledged after {} polls", attempt);
                return Ok(());
            }

            self.pause_between_polls(attempt, limit);
        }

        Err(Error::Setup(SetupError::PowerOnTimeout { attempts: limit }))
    }

    /// Reads a register and returns its raw value.
    ///
    /// The value is masked to the register width. Reading the Data register
    /// consumes a pending conversion, and skips the appended status byte if
    /// `data_status` is enabled.
    pub fn read_register<R: IntoRegister>(&mut self, register: R) -> Result<u32, T::Error> {
        self.transport()?;
        let register = register.into_register()?;

        let with_status = register.id == RegisterId::Data && self.data_status;
        let (value, _) = self.read_frame(register, with_status)?;

        if register.id == RegisterId::Data {
            self.state = State::Ready;
        }
        self.remember(register, value);

        Ok(value)
    }

    /// Writes `value` to a register.
    ///
    /// Fails for read-only registers and for values wider than the register.
    /// A pending conversion is no longer considered ready afterwards.
    pub fn write_register<R: IntoRegister>(
        &mut self,
        register: R,
        value: u32,
    ) -> Result<(), T::Error> {
        self.transport()?;
        let register = register.into_register()?;

        if !register.is_writable() {
            return Err(Error::ReadOnlyRegister(register.id));
        }
        if value > register.mask() {
            return Err(Error::ValueOutOfRange {
                register: register.id,
                value,
            });
        }

        let mut buffer = [0u8; MAX_FRAME];
        buffer[0] = register.address() & COMMS_ADDRESS_MASK;
        for (i, byte) in buffer[1..=register.size].iter_mut().enumerate() {
            *byte = (value >> (8 * (register.size - 1 - i))) as u8;
        }

        let mut len = 1 + register.size;
        if self.checksum == ChecksumMode::Crc8 {
            buffer[len] = crc8(&buffer[..len]);
            len += 1;
        }

        trace!("Write {} = {:#x}", register.name, value);
        self.exchange(&mut buffer[..len])?;

        if self.state == State::ConversionReady {
            self.state = State::Ready;
        }
        self.remember(register, value);

        Ok(())
    }

    /// Returns the last value read from or written to a register, if the
    /// read cache is enabled.
    pub fn cached<R: IntoRegister>(&self, register: R) -> Option<u32> {
        let register = register.into_register().ok()?;
        self.cache[register.id as usize]
    }

    /// Reads and decodes the status register.
    pub fn read_status(&mut self) -> Result<Status, T::Error> {
        let value = self.read_register(RegisterId::Status)?;
        Ok(Status::from(value as u8))
    }

    /// Polls the status register until a conversion is ready.
    ///
    /// At most `attempts` polls are issued. The configured poll interval is
    /// slept between polls. Fails with [`Error::Timeout`] when every poll
    /// reported the conversion as pending; `attempts == 0` fails without
    /// polling.
    ///
    /// [`Error::Timeout`]: enum.Error.html#variant.Timeout
    pub fn wait_for_conversion_ready(&mut self, attempts: u32) -> Result<(), T::Error> {
        self.transport()?;
        self.state = State::Ready;

        for attempt in 1..=attempts {
            let status = self.read_status()?;
            if status.ready {
                if status.error {
                    debug!("Conversion ready with error flag set");
                }
                trace!(
                    "Conversion ready on channel {} after {} polls",
                    status.active_channel,
                    attempt
                );
                self.state = State::ConversionReady;
                return Ok(());
            }

            self.pause_between_polls(attempt, attempts);
        }

        warn!("Conversion not ready after {} polls", attempts);

        Err(Error::Timeout { attempts })
    }

    /// Reads the conversion result.
    ///
    /// Only valid right after a successful [`wait_for_conversion_ready`].
    /// The result is the raw 24-bit code, and reading it consumes the
    /// conversion.
    ///
    /// [`wait_for_conversion_ready`]: #method.wait_for_conversion_ready
    pub fn read_sample(&mut self) -> Result<i32, T::Error> {
        self.take_conversion()?;

        let (value, _) = self.read_frame(RegisterId::Data.register(), self.data_status)?;
        self.remember(RegisterId::Data.register(), value);

        Ok(value as i32)
    }

    /// Reads the conversion result followed by the status byte.
    ///
    /// Requires the `data_status` bit of [`AdcControl`] to be set, which
    /// makes the device append the status register to every data read. The
    /// status identifies the channel the sample belongs to.
    ///
    /// [`AdcControl`]: struct.AdcControl.html
    pub fn read_sample_with_status(&mut self) -> Result<(i32, Status), T::Error> {
        self.take_conversion()?;

        let (value, status) = self.read_frame(RegisterId::Data.register(), true)?;
        self.remember(RegisterId::Data.register(), value);

        Ok((value as i32, Status::from(status.unwrap_or_default())))
    }

    fn take_conversion(&mut self) -> Result<(), T::Error> {
        self.transport()?;

        if self.state != State::ConversionReady {
            return Err(Error::ConversionNotReady);
        }
        // Reading Data clears RDY on the device, whatever the outcome here.
        self.state = State::Ready;

        Ok(())
    }

    /// Reads every register in table order, passing each value to `visit`.
    ///
    /// Stops at the first failed read and returns its error, so no further
    /// frames are sent to a device that stopped responding. Returns the
    /// number of registers read.
    pub fn read_all_registers<F>(&mut self, mut visit: F) -> Result<usize, T::Error>
    where
        F: FnMut(RegisterId, u32),
    {
        let mut count = 0;

        for id in RegisterId::iter() {
            let value = self.read_register(id)?;
            visit(id, value);
            count += 1;
        }

        Ok(count)
    }

    /// Writes a channel mapping register.
    pub fn set_channel(&mut self, channel: ChannelConfig) -> Result<(), T::Error> {
        let register = RegisterId::channel(channel.channel)?;
        RegisterId::config(channel.setup)?;
        self.write_register(register, channel.bits())
    }

    /// Writes the configuration register of a setup.
    pub fn set_setup_config(&mut self, config: SetupConfig) -> Result<(), T::Error> {
        let register = RegisterId::config(config.setup)?;
        self.write_register(register, config.bits())
    }

    /// Writes the filter register of a setup.
    pub fn set_setup_filter(&mut self, filter: FilterConfig) -> Result<(), T::Error> {
        let register = RegisterId::filter(filter.setup)?;
        self.write_register(register, filter.bits())
    }

    /// Writes the 24-bit offset calibration register of a setup.
    pub fn set_setup_offset(&mut self, setup: u8, offset: u32) -> Result<(), T::Error> {
        let register = RegisterId::offset(setup)?;
        self.write_register(register, offset)
    }

    /// Writes the 24-bit gain calibration register of a setup.
    pub fn set_setup_gain(&mut self, setup: u8, gain: u32) -> Result<(), T::Error> {
        let register = RegisterId::gain(setup)?;
        self.write_register(register, gain)
    }

    /// Writes the ADC control register.
    pub fn set_adc_control(&mut self, control: AdcControl) -> Result<(), T::Error> {
        self.write_register(RegisterId::AdcControl, control.bits())
    }

    /// Releases the transport. Calling `close` again has no effect.
    pub fn close(&mut self) {
        if let Some(transport) = self.transport.take() {
            drop(transport);
            debug!("Closed {}", self.config.path());
        }
        self.state = State::Closed;
    }

    fn transport(&mut self) -> Result<&mut T, T::Error> {
        self.transport.as_mut().ok_or(Error::Closed)
    }

    fn exchange(&mut self, frame: &mut [u8]) -> Result<(), T::Error> {
        trace!("Tx {:02x?}", frame);
        self.transport()?.exchange(frame).map_err(Error::Transport)?;
        trace!("Rx {:02x?}", frame);

        Ok(())
    }

    // Returns the register value and, if requested, the trailing status byte.
    fn read_frame(
        &mut self,
        register: &Register,
        with_status: bool,
    ) -> Result<(u32, Option<u8>), T::Error> {
        let payload = register.size + with_status as usize;
        let len = 1 + payload + self.checksum.overhead();

        let mut buffer = [0u8; MAX_FRAME];
        buffer[0] = COMMS_READ | (register.address() & COMMS_ADDRESS_MASK);
        let frame = &mut buffer[..len];

        self.exchange(frame)?;

        if self.checksum == ChecksumMode::Crc8 {
            // The CRC covers the communications byte we sent, not the byte
            // shifted in while sending it.
            frame[0] = COMMS_READ | register.address();
            let expected = crc8(&frame[..1 + payload]);
            let received = frame[1 + payload];
            if expected != received {
                warn!(
                    "CRC mismatch reading {}: expected {:#04x}, received {:#04x}",
                    register.name, expected, received
                );
                return Err(Error::ChecksumMismatch { expected, received });
            }
        }

        let value = frame[1..=register.size]
            .iter()
            .fold(0u32, |value, &byte| (value << 8) | u32::from(byte))
            & register.mask();
        let status = if with_status {
            Some(frame[1 + register.size])
        } else {
            None
        };

        trace!("Read {} = {:#x}", register.name, value);

        Ok((value, status))
    }

    fn remember(&mut self, register: &Register, value: u32) {
        if register.id == RegisterId::AdcControl {
            self.data_status = value & DATA_STATUS != 0;
        }
        if self.config.cache_reads() {
            self.cache[register.id as usize] = Some(value);
        }
    }

    fn pause_between_polls(&self, attempt: u32, limit: u32) {
        let interval = self.config.poll_interval();
        if attempt < limit && !interval.is_zero() {
            spin_sleep::sleep(interval);
        }
    }
}

fn validate<E>(config: &Config) -> Result<(), E> {
    if config.poll_limit() == 0 {
        return Err(Error::Setup(SetupError::InvalidPollLimit));
    }
    if config.path().is_empty() {
        return Err(Error::Setup(SetupError::InvalidPath));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::time::{Duration, Instant};

    #[derive(Debug, PartialEq)]
    struct BusFault;

    #[derive(Debug)]
    enum Step {
        Exchange { tx: Vec<u8>, rx: Vec<u8> },
        Fail { tx: Vec<u8> },
    }

    // Replays a fixed list of frames and checks every frame sent against it.
    #[derive(Debug)]
    struct ScriptedTransport {
        script: VecDeque<Step>,
    }

    impl ScriptedTransport {
        fn new(script: Vec<Step>) -> Self {
            Self {
                script: script.into(),
            }
        }
    }

    impl Transport for ScriptedTransport {
        type Error = BusFault;

        fn exchange(&mut self, buffer: &mut [u8]) -> result::Result<(), BusFault> {
            match self.script.pop_front() {
                Some(Step::Exchange { tx, rx }) => {
                    assert_eq!(buffer, &tx[..], "unexpected frame");
                    buffer.copy_from_slice(&rx);
                    Ok(())
                }
                Some(Step::Fail { tx }) => {
                    assert_eq!(buffer, &tx[..], "unexpected frame");
                    Err(BusFault)
                }
                None => panic!("unexpected exchange: {:02x?}", buffer),
            }
        }
    }

    impl Drop for ScriptedTransport {
        fn drop(&mut self) {
            if !std::thread::panicking() {
                assert!(self.script.is_empty(), "frames not sent: {:?}", self.script);
            }
        }
    }

    fn ok(tx: &[u8], rx: &[u8]) -> Step {
        Step::Exchange {
            tx: tx.to_vec(),
            rx: rx.to_vec(),
        }
    }

    fn config() -> Config {
        let mut config = Config::default();
        config.set_reset_delay(Duration::ZERO);
        config
    }

    fn setup_script() -> Vec<Step> {
        vec![
            ok(&RESET_FRAME, &[0; 8]),
            ok(&[0x40, 0x00], &[0x00, 0x10]),
            ok(&[0x40, 0x00], &[0x00, 0x00]),
            ok(&[0x45, 0x00], &[0x00, 0x14]),
            ok(&[0x09, 0x00, 0x01], &[0x00; 3]),
        ]
    }

    fn open_with(extra: Vec<Step>) -> Ad7124<ScriptedTransport> {
        let mut script = setup_script();
        script.extend(extra);
        Ad7124::with_transport(ScriptedTransport::new(script), config()).unwrap()
    }

    #[test]
    fn setup_resets_and_checks_id() {
        let device = open_with(vec![]);
        assert_eq!(device.state(), State::Ready);
        assert_eq!(device.cached(RegisterId::Id), Some(0x14));
        assert_eq!(device.cached(RegisterId::Channel0), Some(0x0001));
    }

    #[test]
    fn setup_rejects_zero_poll_limit_without_exchanges() {
        let mut config = config();
        config.set_poll_limit(0);
        let err = Ad7124::with_transport(ScriptedTransport::new(vec![]), config).unwrap_err();
        assert!(matches!(err, Error::Setup(SetupError::InvalidPollLimit)));
    }

    #[test]
    fn setup_times_out_when_reset_never_acknowledged() {
        let mut config = config();
        config.set_poll_limit(3);
        let script = vec![
            ok(&RESET_FRAME, &[0; 8]),
            ok(&[0x40, 0x00], &[0x00, 0x10]),
            ok(&[0x40, 0x00], &[0x00, 0x10]),
            ok(&[0x40, 0x00], &[0x00, 0x10]),
        ];
        let err = Ad7124::with_transport(ScriptedTransport::new(script), config).unwrap_err();
        assert!(matches!(
            err,
            Error::Setup(SetupError::PowerOnTimeout { attempts: 3 })
        ));
    }

    #[test]
    fn setup_rejects_unknown_id() {
        let script = vec![
            ok(&RESET_FRAME, &[0; 8]),
            ok(&[0x40, 0x00], &[0x00, 0x00]),
            ok(&[0x45, 0x00], &[0x00, 0x42]),
        ];
        let err = Ad7124::with_transport(ScriptedTransport::new(script), config()).unwrap_err();
        assert!(matches!(err, Error::Setup(SetupError::UnknownDevice(0x42))));
    }

    #[test]
    fn setup_maps_transport_failures() {
        let script = vec![Step::Fail {
            tx: RESET_FRAME.to_vec(),
        }];
        let err = Ad7124::with_transport(ScriptedTransport::new(script), config()).unwrap_err();
        assert!(matches!(err, Error::Setup(SetupError::Transport(BusFault))));
    }

    #[test]
    fn setup_enables_crc() {
        let mut config = config();
        config.set_checksum(ChecksumMode::Crc8);
        let mut script = setup_script();
        script.push(ok(&[0x47, 0, 0, 0], &[0x00, 0x00, 0x00, 0x40]));
        script.push(ok(&[0x07, 0x04, 0x00, 0x40], &[0; 4]));
        let crc = crc8(&[0x40, 0x00]);
        script.push(ok(&[0x40, 0x00, 0x00], &[0x00, 0x00, crc]));
        let mut device = Ad7124::with_transport(ScriptedTransport::new(script), config).unwrap();

        assert_eq!(device.checksum(), ChecksumMode::Crc8);
        assert_eq!(device.cached(RegisterId::ErrorEn), Some(0x04_0040));
        assert!(device.read_status().unwrap().ready);
    }

    #[test]
    fn crc_mismatch_is_reported() {
        let mut config = config();
        config.set_checksum(ChecksumMode::Crc8);
        let mut script = setup_script();
        script.push(ok(&[0x47, 0, 0, 0], &[0x00, 0x00, 0x00, 0x40]));
        script.push(ok(&[0x07, 0x04, 0x00, 0x40], &[0; 4]));
        script.push(ok(&[0x45, 0x00, 0x00], &[0x00, 0x14, 0x00]));
        let mut device = Ad7124::with_transport(ScriptedTransport::new(script), config).unwrap();

        let err = device.read_register(RegisterId::Id).unwrap_err();
        assert!(matches!(
            err,
            Error::ChecksumMismatch { received: 0x00, .. }
        ));
    }

    #[test]
    fn crc_write_appends_checksum() {
        let mut config = config();
        config.set_checksum(ChecksumMode::Crc8);
        let mut script = setup_script();
        script.push(ok(&[0x47, 0, 0, 0], &[0x00, 0x00, 0x00, 0x40]));
        script.push(ok(&[0x07, 0x04, 0x00, 0x40], &[0; 4]));
        let crc = crc8(&[0x01, 0x01, 0x80]);
        script.push(ok(&[0x01, 0x01, 0x80, crc], &[0; 4]));
        let mut device = Ad7124::with_transport(ScriptedTransport::new(script), config).unwrap();

        device.write_register(RegisterId::AdcControl, 0x0180).unwrap();
    }

    #[test]
    fn read_register_is_big_endian_and_sized() {
        let mut device = open_with(vec![ok(&[0x61, 0, 0, 0], &[0xff, 0x06, 0x01, 0x80])]);
        assert_eq!(device.read_register(RegisterId::Filter0).unwrap(), 0x06_0180);
        assert_eq!(device.cached(RegisterId::Filter0), Some(0x06_0180));
    }

    #[test]
    fn read_register_accepts_raw_ids() {
        let mut device = open_with(vec![ok(&[0x59, 0, 0], &[0x00, 0x08, 0x60])]);
        assert_eq!(device.read_register(0x19u8).unwrap(), 0x0860);

        let err = device.read_register(57u8).unwrap_err();
        assert!(matches!(err, Error::InvalidRegisterId(57)));
    }

    #[test]
    fn write_register_rejects_read_only_and_wide_values() {
        let mut device = open_with(vec![]);

        let err = device.write_register(RegisterId::Data, 0).unwrap_err();
        assert!(matches!(err, Error::ReadOnlyRegister(RegisterId::Data)));

        let err = device.write_register(RegisterId::AdcControl, 0x1_0000).unwrap_err();
        assert!(matches!(
            err,
            Error::ValueOutOfRange {
                register: RegisterId::AdcControl,
                value: 0x1_0000
            }
        ));
    }

    #[test]
    fn read_sample_requires_ready_conversion() {
        let mut device = open_with(vec![]);
        let err = device.read_sample().unwrap_err();
        assert!(matches!(err, Error::ConversionNotReady));
    }

    #[test]
    fn wait_then_read_sample() {
        let mut device = open_with(vec![
            ok(&[0x40, 0x00], &[0x00, 0x80]),
            ok(&[0x40, 0x00], &[0x00, 0x03]),
            ok(&[0x42, 0, 0, 0], &[0x00, 0x80, 0x00, 0x01]),
        ]);

        device.wait_for_conversion_ready(5).unwrap();
        assert_eq!(device.state(), State::ConversionReady);
        assert_eq!(device.read_sample().unwrap(), 0x80_0001);
        assert_eq!(device.state(), State::Ready);

        // The conversion has been consumed
        assert!(matches!(
            device.read_sample().unwrap_err(),
            Error::ConversionNotReady
        ));
    }

    #[test]
    fn wait_times_out_after_exact_attempts() {
        let mut device = open_with(vec![
            ok(&[0x40, 0x00], &[0x00, 0x80]),
            ok(&[0x40, 0x00], &[0x00, 0x80]),
            ok(&[0x40, 0x00], &[0x00, 0x80]),
        ]);

        let err = device.wait_for_conversion_ready(3).unwrap_err();
        assert!(matches!(err, Error::Timeout { attempts: 3 }));
        assert!(matches!(
            device.read_sample().unwrap_err(),
            Error::ConversionNotReady
        ));
    }

    // Setup where the reset is acknowledged on the first poll, so no poll
    // interval is slept while opening.
    fn open_polling_every(interval: Duration, extra: Vec<Step>) -> Ad7124<ScriptedTransport> {
        let mut script = vec![
            ok(&RESET_FRAME, &[0; 8]),
            ok(&[0x40, 0x00], &[0x00, 0x80]),
            ok(&[0x45, 0x00], &[0x00, 0x14]),
            ok(&[0x09, 0x00, 0x01], &[0x00; 3]),
        ];
        script.extend(extra);

        let mut config = config();
        config.set_poll_interval(interval);
        Ad7124::with_transport(ScriptedTransport::new(script), config).unwrap()
    }

    #[test]
    fn poll_interval_is_slept_between_polls() {
        let interval = Duration::from_millis(20);
        let mut device = open_polling_every(
            interval,
            vec![
                ok(&[0x40, 0x00], &[0x00, 0x80]),
                ok(&[0x40, 0x00], &[0x00, 0x80]),
                ok(&[0x40, 0x00], &[0x00, 0x80]),
                ok(&[0x40, 0x00], &[0x00, 0x80]),
            ],
        );

        let start = Instant::now();
        let err = device.wait_for_conversion_ready(4).unwrap_err();
        assert!(matches!(err, Error::Timeout { attempts: 4 }));
        assert!(start.elapsed() >= interval * 3);
    }

    #[test]
    fn poll_interval_is_not_slept_after_last_poll() {
        let interval = Duration::from_millis(500);
        let mut device = open_polling_every(
            interval,
            vec![
                ok(&[0x40, 0x00], &[0x00, 0x00]),
                ok(&[0x40, 0x00], &[0x00, 0x80]),
            ],
        );

        let start = Instant::now();
        device.wait_for_conversion_ready(1).unwrap();
        let err = device.wait_for_conversion_ready(1).unwrap_err();
        assert!(matches!(err, Error::Timeout { attempts: 1 }));
        assert!(start.elapsed() < interval);
    }

    #[test]
    fn reset_delay_follows_reset() {
        let mut config = config();
        config.set_reset_delay(Duration::from_millis(30));

        let start = Instant::now();
        Ad7124::with_transport(ScriptedTransport::new(setup_script()), config).unwrap();
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn wait_with_zero_attempts_does_not_poll() {
        let mut device = open_with(vec![]);
        let err = device.wait_for_conversion_ready(0).unwrap_err();
        assert!(matches!(err, Error::Timeout { attempts: 0 }));
    }

    #[test]
    fn write_clears_pending_conversion() {
        let mut device = open_with(vec![
            ok(&[0x40, 0x00], &[0x00, 0x00]),
            ok(&[0x01, 0x00, 0x80], &[0x00; 3]),
        ]);

        device.wait_for_conversion_ready(1).unwrap();
        device
            .set_adc_control(AdcControl {
                power_mode: PowerMode::Full,
                ..AdcControl::default()
            })
            .unwrap();
        assert_eq!(device.state(), State::Ready);
    }

    #[test]
    fn read_sample_with_status_reports_channel() {
        let mut device = open_with(vec![
            ok(&[0x40, 0x00], &[0x00, 0x02]),
            ok(&[0x42, 0, 0, 0, 0], &[0x00, 0x12, 0x34, 0x56, 0x02]),
        ]);

        device.wait_for_conversion_ready(1).unwrap();
        let (sample, status) = device.read_sample_with_status().unwrap();
        assert_eq!(sample, 0x12_3456);
        assert_eq!(status.active_channel, 2);
    }

    #[test]
    fn data_status_adds_status_byte_to_sample_reads() {
        let mut device = open_with(vec![
            ok(&[0x01, 0x04, 0x00], &[0x00; 3]),
            ok(&[0x40, 0x00], &[0x00, 0x01]),
            ok(&[0x42, 0, 0, 0, 0], &[0x00, 0x00, 0x00, 0x10, 0x01]),
        ]);

        device
            .set_adc_control(AdcControl {
                data_status: true,
                ..AdcControl::default()
            })
            .unwrap();
        device.wait_for_conversion_ready(1).unwrap();
        assert_eq!(device.read_sample().unwrap(), 0x10);
    }

    #[test]
    fn read_all_registers_stops_at_first_failure() {
        let mut device = open_with(vec![
            ok(&[0x40, 0x00], &[0x00, 0x00]),
            ok(&[0x41, 0x00, 0x00], &[0x00, 0x00, 0x00]),
            Step::Fail {
                tx: vec![0x42, 0, 0, 0],
            },
        ]);

        let mut seen = Vec::new();
        let err = device
            .read_all_registers(|id, value| seen.push((id, value)))
            .unwrap_err();

        assert!(matches!(err, Error::Transport(BusFault)));
        assert_eq!(
            seen,
            [(RegisterId::Status, 0), (RegisterId::AdcControl, 0)]
        );
    }

    #[test]
    fn set_channel_validates_numbers() {
        let mut device = open_with(vec![ok(&[0x0a, 0x90, 0x43], &[0x00; 3])]);

        let err = device
            .set_channel(ChannelConfig {
                channel: 16,
                enable: true,
                setup: 0,
                ainp: 0,
                ainm: 1,
            })
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRegisterId(_)));

        device
            .set_channel(ChannelConfig {
                channel: 1,
                enable: true,
                setup: 1,
                ainp: 2,
                ainm: 3,
            })
            .unwrap();
    }

    #[test]
    fn setup_registers_go_to_their_own_addresses() {
        let mut device = open_with(vec![
            ok(&[0x1a, 0x09, 0x60], &[0x00; 3]),
            ok(&[0x22, 0x00, 0x02, 0x00], &[0x00; 4]),
            ok(&[0x2a, 0x80, 0x00, 0x10], &[0x00; 4]),
            ok(&[0x32, 0x55, 0x55, 0x55], &[0x00; 4]),
        ]);

        device
            .set_setup_config(SetupConfig {
                setup: 1,
                ref_buf_p: true,
                ..SetupConfig::default()
            })
            .unwrap();
        device
            .set_setup_filter(FilterConfig {
                setup: 1,
                post_filter: 0,
                output_data_rate: 0x200,
                ..FilterConfig::default()
            })
            .unwrap();
        device.set_setup_offset(1, 0x80_0010).unwrap();
        device.set_setup_gain(1, 0x55_5555).unwrap();
    }

    #[test]
    fn close_is_idempotent_and_final() {
        let mut device = open_with(vec![]);

        device.close();
        device.close();

        assert!(device.is_closed());
        assert!(matches!(
            device.read_register(RegisterId::Status).unwrap_err(),
            Error::Closed
        ));
        assert!(matches!(
            device.write_register(RegisterId::AdcControl, 0).unwrap_err(),
            Error::Closed
        ));
        assert!(matches!(
            device.wait_for_conversion_ready(10).unwrap_err(),
            Error::Closed
        ));
        assert!(matches!(device.read_sample().unwrap_err(), Error::Closed));
    }

    #[test]
    fn cache_can_be_disabled() {
        let mut config = config();
        config.set_cache_reads(false);
        let device =
            Ad7124::with_transport(ScriptedTransport::new(setup_script()), config).unwrap();
        assert_eq!(device.cached(RegisterId::Id), None);
    }
}
