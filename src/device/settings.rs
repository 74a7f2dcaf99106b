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

//! Typed views of the status, control, channel and setup registers.

/// Decoded contents of the status register.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Status {
    /// A new conversion result is available. The device reports this as an
    /// active-low RDY bit, which is inverted here.
    pub ready: bool,
    /// One of the enabled error flags in the Error register is set.
    pub error: bool,
    /// The device has been reset and not yet acknowledged it.
    pub power_on_reset: bool,
    /// Channel the current (or last) conversion belongs to.
    pub active_channel: u8,
}

const STATUS_NOT_READY: u8 = 0x80;
const STATUS_ERROR: u8 = 0x40;
const STATUS_POR: u8 = 0x10;
const STATUS_CHANNEL: u8 = 0x0f;

impl From<u8> for Status {
    fn from(value: u8) -> Status {
        Status {
            ready: value & STATUS_NOT_READY == 0,
            error: value & STATUS_ERROR != 0,
            power_on_reset: value & STATUS_POR != 0,
            active_channel: value & STATUS_CHANNEL,
        }
    }
}

/// ADC power modes.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum PowerMode {
    #[default]
    Low = 0,
    Mid = 1,
    Full = 2,
}

/// ADC operating modes.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum OperatingMode {
    #[default]
    Continuous = 0,
    Single = 1,
    Standby = 2,
    PowerDown = 3,
    Idle = 4,
    InternalZeroScale = 5,
    InternalFullScale = 6,
    SystemZeroScale = 7,
    SystemFullScale = 8,
}

/// Master clock source.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum ClockSelect {
    #[default]
    Internal = 0,
    InternalWithOutput = 1,
    External = 2,
    ExternalDiv4 = 3,
}

/// ADC_Control register.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct AdcControl {
    pub dout_rdy_delay: bool,
    pub continuous_read: bool,
    /// Append the status byte to every data register read.
    pub data_status: bool,
    pub cs_enable: bool,
    /// Enable the internal 2.5 V reference.
    pub ref_enable: bool,
    pub power_mode: PowerMode,
    pub mode: OperatingMode,
    pub clock: ClockSelect,
}

impl AdcControl {
    pub fn bits(&self) -> u32 {
        let mut value = 0;
        if self.dout_rdy_delay {
            value |= 0x1000;
        }
        if self.continuous_read {
            value |= 0x0800;
        }
        if self.data_status {
            value |= 0x0400;
        }
        if self.cs_enable {
            value |= 0x0200;
        }
        if self.ref_enable {
            value |= 0x0100;
        }
        value |= (self.power_mode as u32 & 0x03) << 6;
        value |= (self.mode as u32 & 0x0f) << 2;
        value | (self.clock as u32 & 0x03)
    }
}

/// Channel mapping register.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ChannelConfig {
    /// Channel number, 0 to 15.
    pub channel: u8,
    pub enable: bool,
    /// Setup used for conversions on this channel, 0 to 7.
    pub setup: u8,
    /// Positive analog input.
    pub ainp: u8,
    /// Negative analog input.
    pub ainm: u8,
}

impl ChannelConfig {
    pub fn bits(&self) -> u32 {
        let mut value = 0;
        if self.enable {
            value |= 0x8000;
        }
        value |= (u32::from(self.setup) & 0x07) << 12;
        value |= (u32::from(self.ainp) & 0x1f) << 5;
        value | (u32::from(self.ainm) & 0x1f)
    }
}

/// Setup configuration register.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SetupConfig {
    /// Setup number, 0 to 7.
    pub setup: u8,
    pub bipolar: bool,
    pub burnout: u8,
    pub ref_buf_p: bool,
    pub ref_buf_m: bool,
    pub ain_buf_p: bool,
    pub ain_buf_m: bool,
    pub ref_sel: u8,
    /// PGA gain exponent: gain = 2^pga.
    pub pga: u8,
}

impl Default for SetupConfig {
    fn default() -> SetupConfig {
        SetupConfig {
            setup: 0,
            bipolar: true,
            burnout: 0,
            ref_buf_p: false,
            ref_buf_m: false,
            ain_buf_p: true,
            ain_buf_m: true,
            ref_sel: 0,
            pga: 0,
        }
    }
}

impl SetupConfig {
    pub fn bits(&self) -> u32 {
        let mut value = 0;
        if self.bipolar {
            value |= 0x0800;
        }
        value |= (u32::from(self.burnout) & 0x03) << 9;
        if self.ref_buf_p {
            value |= 0x0100;
        }
        if self.ref_buf_m {
            value |= 0x0080;
        }
        if self.ain_buf_p {
            value |= 0x0040;
        }
        if self.ain_buf_m {
            value |= 0x0020;
        }
        value |= (u32::from(self.ref_sel) & 0x03) << 3;
        value | (u32::from(self.pga) & 0x07)
    }

    /// PGA gain as a multiplier.
    pub fn gain(&self) -> f64 {
        f64::from(1u32 << (self.pga & 0x07))
    }
}

/// Setup filter register.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FilterConfig {
    /// Setup number, 0 to 7.
    pub setup: u8,
    pub filter_type: u8,
    pub rej60: bool,
    pub post_filter: u8,
    pub single_cycle: bool,
    /// Filter output data rate select, 1 to 2047.
    pub output_data_rate: u16,
}

impl Default for FilterConfig {
    fn default() -> FilterConfig {
        FilterConfig {
            setup: 0,
            filter_type: 0,
            rej60: false,
            post_filter: 3,
            single_cycle: false,
            output_data_rate: 0x180,
        }
    }
}

impl FilterConfig {
    pub fn bits(&self) -> u32 {
        let mut value = (u32::from(self.filter_type) & 0x07) << 21;
        if self.rej60 {
            value |= 0x10_0000;
        }
        value |= (u32::from(self.post_filter) & 0x07) << 17;
        if self.single_cycle {
            value |= 0x01_0000;
        }
        value | (u32::from(self.output_data_rate) & 0x7ff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::RegisterId;

    #[test]
    fn status_ready_is_active_low() {
        let status = Status::from(0x00);
        assert!(status.ready);
        assert!(!status.error);

        let status = Status::from(0x80 | 0x40 | 0x10 | 0x05);
        assert!(!status.ready);
        assert!(status.error);
        assert!(status.power_on_reset);
        assert_eq!(status.active_channel, 5);
    }

    #[test]
    fn defaults_match_reset_values() {
        assert_eq!(SetupConfig::default().bits(), RegisterId::Config0.register().reset);
        assert_eq!(FilterConfig::default().bits(), RegisterId::Filter0.register().reset);
        assert_eq!(AdcControl::default().bits(), RegisterId::AdcControl.register().reset);
    }

    #[test]
    fn filter_default_post_filter_bits() {
        let bits = FilterConfig::default().bits();
        assert_eq!((bits >> 17) & 0x07, 0b011);
        assert_eq!(bits, 0x06_0180);

        let fast = FilterConfig {
            post_filter: 0,
            output_data_rate: 0x200,
            ..FilterConfig::default()
        };
        assert_eq!(fast.bits(), 0x00_0200);
    }

    #[test]
    fn channel_bits() {
        let channel = ChannelConfig {
            channel: 1,
            enable: true,
            setup: 1,
            ainp: 2,
            ainm: 3,
        };
        assert_eq!(channel.bits(), 0x8000 | 0x1000 | (2 << 5) | 3);
    }

    #[test]
    fn adc_control_bits() {
        let control = AdcControl {
            data_status: true,
            ref_enable: true,
            power_mode: PowerMode::Full,
            mode: OperatingMode::Single,
            ..AdcControl::default()
        };
        assert_eq!(control.bits(), 0x0400 | 0x0100 | 0x80 | 0x04);
    }

    #[test]
    fn setup_gain() {
        let setup = SetupConfig {
            pga: 7,
            ..SetupConfig::default()
        };
        assert_eq!(setup.gain(), 128.0);
    }
}
