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

// voltmeter.rs - Continuously measures two input ranges, while handling any
// incoming SIGINT (Ctrl-C) and SIGTERM signals so the ADC can be put back
// into standby before the application exits.
//
// Channel 1 reads -7.5 V to +7.5 V on AIN2/AIN3, channel 2 reads 0 V to
// +10 V on AIN4/AIN5. Both inputs sit behind a resistor divider that brings
// the range down to the 2.5 V reference on REFIN1.

use std::error::Error;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use simple_signal::{self, Signal};

use ad7124::conversion::to_voltage;
use ad7124::device::{
    AdcControl, ChannelConfig, FilterConfig, OperatingMode, PowerMode, SetupConfig,
};
use ad7124::spi::Spi;
use ad7124::{Ad7124, Config};

// Reference voltage, fixed by the hardware.
const VREF: f64 = 2.5;
// Polls per conversion.
const READY_ATTEMPTS: u32 = 100;

struct Range {
    channel: u8,
    setup: u8,
    ainp: u8,
    ainm: u8,
    bipolar: bool,
    // Full-scale input voltage in front of the divider.
    span: f64,
}

const RANGES: [Range; 2] = [
    Range {
        channel: 1,
        setup: 1,
        ainp: 2,
        ainm: 3,
        bipolar: true,
        span: 7.5,
    },
    Range {
        channel: 2,
        setup: 2,
        ainp: 4,
        ainm: 5,
        bipolar: false,
        span: 10.0,
    },
];

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let mut config = Config::default();
    config.set_poll_interval(Duration::from_millis(1));

    let mut adc: Ad7124<Spi> = Ad7124::open(config)?;

    for range in RANGES.iter() {
        adc.set_setup_config(SetupConfig {
            setup: range.setup,
            bipolar: range.bipolar,
            ref_buf_p: true,
            ref_buf_m: true,
            ..SetupConfig::default()
        })?;
        // Fast rather than accurate: SINC4 without post filter.
        adc.set_setup_filter(FilterConfig {
            setup: range.setup,
            post_filter: 0,
            output_data_rate: 0x200,
            ..FilterConfig::default()
        })?;
        adc.set_channel(ChannelConfig {
            channel: range.channel,
            enable: true,
            setup: range.setup,
            ainp: range.ainp,
            ainm: range.ainm,
        })?;
    }

    // The status byte appended to each sample tells which channel it belongs to.
    adc.set_adc_control(AdcControl {
        data_status: true,
        power_mode: PowerMode::Full,
        ..AdcControl::default()
    })?;

    let running = Arc::new(AtomicBool::new(true));

    // When a SIGINT (Ctrl-C) or SIGTERM signal is caught, atomically set running to false.
    simple_signal::set_handler(&[Signal::Int, Signal::Term], {
        let running = running.clone();
        move |_| {
            running.store(false, Ordering::SeqCst);
        }
    });

    let start = Instant::now();
    let mut readings = 0u64;

    while running.load(Ordering::SeqCst) {
        adc.wait_for_conversion_ready(READY_ATTEMPTS)?;
        let (code, status) = adc.read_sample_with_status()?;

        let range = match RANGES.iter().find(|r| r.channel == status.active_channel) {
            Some(range) => range,
            None => continue,
        };

        let volts = to_voltage(code, 1.0, VREF, range.bipolar, range.span / VREF);
        println!("{}, {:+.6}", range.channel, volts);
        readings += 1;
    }

    let elapsed = start.elapsed().as_secs_f64();
    println!("Readings: {} ({:.1}/s)", readings, readings as f64 / elapsed);

    adc.set_adc_control(AdcControl {
        mode: OperatingMode::Standby,
        ..AdcControl::default()
    })?;

    Ok(())

    // The spidev device is released when adc goes out of scope.
}
