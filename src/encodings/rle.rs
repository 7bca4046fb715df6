// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Decoder for the RLE/bit-packed hybrid encoding.
//!
//! The stream is a sequence of runs, each introduced by an unsigned varint
//! header. A set low bit means `header >> 1` groups of 8 bit-packed values
//! (LSB-first at the current width) follow; a clear low bit means an RLE run
//! of `header >> 1` repetitions of the `ceil(width / 8)`-byte value that
//! follows.

use bytes::Bytes;

use crate::errors::{ParquetError, Result};
use crate::util::bit_util::{ceil, BitReader};

/// A decoder for the RLE/bit-packed hybrid encoding at a fixed bit width.
/// Values come out as `u64`; callers narrow to their own index/level types.
pub struct RleDecoder {
    bit_width: u8,
    data: Option<Bytes>,
    /// Byte position of the next run header.
    offset: usize,
    /// State of an in-progress RLE run.
    rle_left: u64,
    rle_value: u64,
    /// State of an in-progress bit-packed run.
    packed_left: u64,
    bit_reader: Option<BitReader>,
}

impl RleDecoder {
    pub fn new(bit_width: u8) -> Self {
        assert!(bit_width <= 64, "bit width {} out of range", bit_width);
        Self {
            bit_width,
            data: None,
            offset: 0,
            rle_left: 0,
            rle_value: 0,
            packed_left: 0,
            bit_reader: None,
        }
    }

    pub fn set_data(&mut self, data: Bytes) {
        self.data = Some(data);
        self.offset = 0;
        self.rle_left = 0;
        self.rle_value = 0;
        self.packed_left = 0;
        self.bit_reader = None;
    }

    /// Bytes of the input this decoder has taken so far. Runs are consumed
    /// whole when their header is read, so after decoding a stream's last
    /// value this is the position of whatever follows the stream.
    pub fn bytes_consumed(&self) -> usize {
        self.offset
    }

    /// Returns the next value, or `None` once the stream is exhausted.
    pub fn get(&mut self) -> Result<Option<u64>> {
        loop {
            if self.rle_left > 0 {
                self.rle_left -= 1;
                return Ok(Some(self.rle_value));
            }
            if self.packed_left > 0 {
                let reader = self
                    .bit_reader
                    .as_mut()
                    .expect("bit reader must exist while a packed run is open");
                let value = reader.get_value(self.bit_width as usize)?;
                self.packed_left -= 1;
                return Ok(Some(value));
            }
            if !self.reload()? {
                return Ok(None);
            }
        }
    }

    /// Fills `buffer` with decoded values, returning how many were written.
    pub fn get_batch(&mut self, buffer: &mut [u64]) -> Result<usize> {
        let mut filled = 0;
        while filled < buffer.len() {
            match self.get()? {
                Some(value) => {
                    buffer[filled] = value;
                    filled += 1;
                }
                None => break,
            }
        }
        Ok(filled)
    }

    /// Reads the next run header. Returns `false` at end of data.
    fn reload(&mut self) -> Result<bool> {
        let data = self.data.as_ref().expect("set_data should have been called");
        if self.offset >= data.len() {
            return Ok(false);
        }
        let header = self.read_header()?;
        let data = self.data.as_ref().unwrap();
        if header & 1 == 1 {
            // groups of 8 bit-packed values
            let groups = header >> 1;
            let run_bytes = (groups * self.bit_width as u64) as usize;
            if self.offset + run_bytes > data.len() {
                return Err(short_input_err!(
                    "bit-packed run of {} bytes overruns input",
                    run_bytes
                ));
            }
            self.bit_reader = Some(BitReader::new(
                data.slice(self.offset..self.offset + run_bytes),
            ));
            self.offset += run_bytes;
            self.packed_left = groups * 8;
        } else {
            let count = header >> 1;
            let value_bytes = ceil(self.bit_width as i64, 8) as usize;
            if self.offset + value_bytes > data.len() {
                return Err(short_input_err!("RLE run value truncated"));
            }
            let mut value: u64 = 0;
            for i in 0..value_bytes {
                value |= (data[self.offset + i] as u64) << (i * 8);
            }
            self.offset += value_bytes;
            self.rle_value = value;
            self.rle_left = count;
        }
        Ok(true)
    }

    fn read_header(&mut self) -> Result<u64> {
        let data = self.data.as_ref().unwrap();
        let mut value: u64 = 0;
        for i in 0..10 {
            if self.offset >= data.len() {
                return Err(short_input_err!("RLE run header truncated"));
            }
            let byte = data[self.offset];
            self.offset += 1;
            value |= ((byte & 0x7f) as u64) << (i * 7);
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(decode_err!("RLE run header varint too long"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(bit_width: u8, data: &'static [u8], count: usize) -> Result<Vec<u64>> {
        let mut decoder = RleDecoder::new(bit_width);
        decoder.set_data(Bytes::from_static(data));
        let mut out = vec![0u64; count];
        let filled = decoder.get_batch(&mut out)?;
        out.truncate(filled);
        Ok(out)
    }

    #[test]
    fn test_bit_packed_run() {
        // header 0x03: one group of 8 bit-packed values at width 3
        let values = decode_all(3, &[0x03, 0x88, 0xc6, 0xfa], 8).unwrap();
        assert_eq!(values, vec![0, 1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_rle_run() {
        // header 0x08: RLE run of 4, value 2 at width 3 (one value byte)
        let values = decode_all(3, &[0x08, 0x02], 4).unwrap();
        assert_eq!(values, vec![2, 2, 2, 2]);
    }

    #[test]
    fn test_mixed_runs() {
        // RLE run of 3 zeros, then one bit-packed group at width 1:
        // 0b01010101 -> 1,0,1,0,1,0,1,0 LSB-first
        let values = decode_all(1, &[0x06, 0x00, 0x03, 0x55], 11).unwrap();
        assert_eq!(values, vec![0, 0, 0, 1, 0, 1, 0, 1, 0, 1, 0]);
    }

    #[test]
    fn test_wide_rle_value() {
        // width 16 -> two-byte RLE value, little-endian
        let values = decode_all(16, &[0x04, 0x34, 0x12], 2).unwrap();
        assert_eq!(values, vec![0x1234, 0x1234]);
    }

    #[test]
    fn test_exhaustion_returns_none() {
        let mut decoder = RleDecoder::new(3);
        decoder.set_data(Bytes::from_static(&[0x04, 0x01]));
        let mut out = vec![0u64; 10];
        assert_eq!(decoder.get_batch(&mut out).unwrap(), 2);
        assert_eq!(decoder.get().unwrap(), None);
    }

    #[test]
    fn test_truncated_packed_run() {
        let mut decoder = RleDecoder::new(8);
        decoder.set_data(Bytes::from_static(&[0x03, 0x01]));
        let mut out = vec![0u64; 8];
        match decoder.get_batch(&mut out) {
            Err(ParquetError::ShortInput(_)) => {}
            other => panic!("expected ShortInput, got {:?}", other),
        }
    }

    #[test]
    fn test_partial_read_keeps_state() {
        let mut decoder = RleDecoder::new(3);
        decoder.set_data(Bytes::from_static(&[0x03, 0x88, 0xc6, 0xfa]));
        let mut first = vec![0u64; 3];
        assert_eq!(decoder.get_batch(&mut first).unwrap(), 3);
        assert_eq!(first, vec![0, 1, 2]);
        let mut rest = vec![0u64; 5];
        assert_eq!(decoder.get_batch(&mut rest).unwrap(), 5);
        assert_eq!(rest, vec![3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_zero_width() {
        // width 0 RLE run: value occupies zero bytes, decodes to zeros
        let values = decode_all(0, &[0x06], 3).unwrap();
        assert_eq!(values, vec![0, 0, 0]);
    }
}
