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

use std::marker;

/// A single full-duplex transfer, laid out as the kernel's
/// `struct spi_ioc_transfer`.
///
/// Slave Select stays active for the whole segment, which keeps a
/// communications byte and the data that follows it in one frame.
// Fields are only read by the kernel.
#[allow(dead_code)]
#[derive(Copy, Clone)]
#[repr(C)]
pub(crate) struct Segment<'a, 'b> {
    // Pointer to write buffer.
    tx_buf: u64,
    // Pointer to read buffer.
    rx_buf: u64,
    // Number of bytes to transfer in this segment.
    len: u32,
    // Clock speed override for this segment. 0 uses the bus setting.
    speed_hz: u32,
    // Delay after this segment, before the (optional) SS change.
    delay_usecs: u16,
    // Bits per word override. 0 uses the bus setting.
    bits_per_word: u8,
    // Toggle SS between this segment and the next.
    cs_change: u8,
    // Dual/quad SPI lines. Unused.
    tx_nbits: u8,
    rx_nbits: u8,
    // Padding. Must be 0.
    pad: u16,
    read_buffer_lifetime: marker::PhantomData<&'a mut [u8]>,
    write_buffer_lifetime: marker::PhantomData<&'b [u8]>,
}

impl<'a, 'b> Segment<'a, 'b> {
    /// Transfers as many bytes as the shorter of the two buffers holds, using
    /// the bus clock speed and word size.
    pub(crate) fn new(read_buffer: &'a mut [u8], write_buffer: &'b [u8]) -> Segment<'a, 'b> {
        Segment {
            tx_buf: write_buffer.as_ptr() as u64,
            rx_buf: read_buffer.as_mut_ptr() as u64,
            len: read_buffer.len().min(write_buffer.len()) as u32,
            speed_hz: 0,
            delay_usecs: 0,
            bits_per_word: 0,
            cs_change: 0,
            tx_nbits: 0,
            rx_nbits: 0,
            pad: 0,
            read_buffer_lifetime: marker::PhantomData,
            write_buffer_lifetime: marker::PhantomData,
        }
    }

    /// Returns the number of bytes this segment transfers.
    pub(crate) fn len(&self) -> usize {
        self.len as usize
    }
}
