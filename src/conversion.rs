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

//! Conversion of raw ADC codes into physical units.

/// Full scale of a 24-bit conversion.
const FULL_SCALE: f64 = 16_777_216.0;
/// Code that corresponds to 0 V in bipolar mode.
const MIDSCALE: f64 = 8_388_608.0;

/// Converts a raw code into a voltage.
///
/// `gain` is the PGA gain (1 to 128), `vref` the reference voltage and
/// `scale` a factor compensating for any external divider.
///
/// In bipolar mode 0x000000 is negative full scale, 0x800000 is 0 V and
/// 0xFFFFFF is positive full scale. In unipolar mode 0x000000 is 0 V.
pub fn to_voltage(code: i32, gain: f64, vref: f64, bipolar: bool, scale: f64) -> f64 {
    let code = f64::from(code);
    let normalized = if bipolar {
        code / MIDSCALE - 1.0
    } else {
        code / FULL_SCALE
    };

    normalized * vref / gain * scale
}

/// Converts a conversion of the internal temperature sensor into degrees
/// Celsius.
pub fn to_celsius(code: i32) -> f64 {
    (f64::from(code) - MIDSCALE) / 13_584.0 - 272.5
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn bipolar_midscale_is_zero() {
        assert!(close(to_voltage(0x80_0000, 1.0, 2.5, true, 1.0), 0.0));
        assert!(close(to_voltage(0, 1.0, 2.5, true, 1.0), -2.5));
    }

    #[test]
    fn unipolar_scales_with_gain_and_divider() {
        assert!(close(to_voltage(0x80_0000, 1.0, 2.5, false, 1.0), 1.25));
        assert!(close(to_voltage(0x80_0000, 2.0, 2.5, false, 4.0), 2.5));
    }

    #[test]
    fn temperature_offset() {
        assert!(close(to_celsius(0x80_0000), -272.5));
        assert!(close(to_celsius(0x80_0000 + 13_584 * 300), 27.5));
    }
}
