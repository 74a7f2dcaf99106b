//! `ad7124` provides register access and conversion-ready polling for the
//! Analog Devices AD7124-4 and AD7124-8 sigma-delta ADCs.
//!
//! A session ([`Ad7124`]) owns a transport, resets and identifies the device
//! when it's opened, and exposes raw register reads and writes, bounded
//! polling for conversion results, and helpers to configure channels and
//! setups. Register metadata lives in the [`registers`] table, and
//! [`conversion`] turns raw codes into voltages and temperatures.
//!
//! On Linux, sessions talk to the device through `spidev` ([`spi::Spi`]).
//! With the `embedded-hal` or `embedded-hal-0` feature enabled, any SPI
//! device implementing the corresponding traits can be used instead.
//!
//! Both `gnu` and `musl` libc targets are supported.
//!
//! [`Ad7124`]: device::Ad7124

#[macro_use]
mod macros;

pub mod checksum;
pub mod config;
pub mod conversion;
pub mod device;
#[cfg(any(feature = "embedded-hal", feature = "embedded-hal-0"))]
pub mod hal;
pub mod registers;
pub mod spi;
pub mod transport;

pub use crate::config::Config;
pub use crate::device::{Ad7124, Error, SetupError, State};
pub use crate::registers::RegisterId;
pub use crate::transport::{Configure, Transport};
