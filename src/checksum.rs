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

//! SPI CRC protection.
//!
//! When `SPI_CRC_ERR_EN` is set in the Error_En register, every frame
//! carries a trailing CRC-8 byte computed over the communications byte and
//! the data bytes. The polynomial is x^8 + x^2 + x + 1, with an initial
//! value of zero and no final XOR.

const POLYNOMIAL: u8 = 0x07;

/// Whether frames carry a CRC byte.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum ChecksumMode {
    #[default]
    Off,
    Crc8,
}

impl ChecksumMode {
    /// Number of extra bytes this mode adds to each frame.
    pub fn overhead(self) -> usize {
        match self {
            ChecksumMode::Off => 0,
            ChecksumMode::Crc8 => 1,
        }
    }
}

/// Computes the CRC-8 of `bytes`.
pub fn crc8(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |crc, &byte| {
        (0..8).fold(crc ^ byte, |crc, _| {
            if crc & 0x80 != 0 {
                (crc << 1) ^ POLYNOMIAL
            } else {
                crc << 1
            }
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_value() {
        assert_eq!(crc8(b"123456789"), 0xf4);
    }

    #[test]
    fn empty_input() {
        assert_eq!(crc8(&[]), 0);
    }

    #[test]
    fn appended_crc_yields_zero_remainder() {
        let mut frame = vec![0x45, 0x14];
        frame.push(crc8(&frame));
        assert_eq!(crc8(&frame), 0);
    }

    #[test]
    fn frame_overhead() {
        assert_eq!(ChecksumMode::Off.overhead(), 0);
        assert_eq!(ChecksumMode::Crc8.overhead(), 1);
    }
}
