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

// ad7124-probe - Opens the AD7124 on /dev/spidev0.1, dumps every register,
// then waits for a conversion and prints the sample.
//
// Set RUST_LOG=ad7124=trace to see every SPI frame.

use std::error::Error;
use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::prelude::*;

use ad7124::registers::RegisterId;
use ad7124::spi::Spi;
use ad7124::{Ad7124, Config};

// Number of status polls before giving up on a conversion.
const READY_ATTEMPTS: u32 = 1000;

fn main() -> ExitCode {
    init_logging();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = Config::default();
    info!(
        "Probing {} at {} Hz, {:?}",
        config.path(),
        config.clock_speed(),
        config.mode()
    );

    let mut adc: Ad7124<Spi> = Ad7124::open(config)?;

    let mut read = 0;
    let result = adc.read_all_registers(|id, value| {
        println!("Register: {}, {:#x}", u8::from(id), value);
        read += 1;
    });

    if let Err(e) = result {
        // Reads stop at the first register that failed.
        if let Some(id) = RegisterId::iter().nth(read) {
            println!("Register: {}, {}", u8::from(id), e);
        }
        return Err(e.into());
    }

    adc.wait_for_conversion_ready(READY_ATTEMPTS)?;
    let sample = adc.read_sample()?;
    println!("Sample: {:#08x}", sample);

    adc.close();

    Ok(())
}

// Log to stderr, filtering according to RUST_LOG, with INFO as the default.
fn init_logging() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .with_env_var("RUST_LOG")
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
