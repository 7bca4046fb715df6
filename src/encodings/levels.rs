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

//! Decoder for definition and repetition level streams.
//!
//! A data page v1 stores its levels as a bare RLE/bit-packed hybrid run (or
//! as the deprecated MSB-first BIT_PACKED form); nothing marks where the
//! stream ends, so its extent is discovered by decoding the page's level
//! count. A data page v2 level stream instead opens with its total byte
//! length as a 4-byte little-endian integer, the same framing RLE-encoded
//! boolean values use.

use bytes::Bytes;

use crate::basic::Encoding;
use crate::errors::{ParquetError, Result};
use crate::util::bit_util::{ceil, num_required_bits, BitReader};

use super::rle::RleDecoder;

/// One page's worth of decoded levels.
///
/// Levels are small and bounded by the page's value count, so the whole
/// stream is decoded up front; `get_batch` then hands out validated slices.
pub struct LevelDecoder {
    levels: Vec<i16>,
    cursor: usize,
}

impl LevelDecoder {
    /// Decodes the v1 level stream at the head of `buf`, returning the
    /// number of page bytes it occupied along with the decoder. For RLE that
    /// span is however many bytes yielding `num_values` levels consumed; for
    /// BIT_PACKED it is the fixed `ceil(num_values * width / 8)`.
    pub fn v1(
        encoding: Encoding,
        max_level: i16,
        num_values: usize,
        buf: Bytes,
    ) -> Result<(usize, LevelDecoder)> {
        let bit_width = num_required_bits(max_level as u64);
        match encoding {
            Encoding::RLE => {
                let mut rle = RleDecoder::new(bit_width);
                rle.set_data(buf);
                let mut levels = Vec::with_capacity(num_values);
                while levels.len() < num_values {
                    let raw = rle.get()?.ok_or_else(|| {
                        short_input_err!(
                            "level stream ended after {} of {} levels",
                            levels.len(),
                            num_values
                        )
                    })?;
                    levels.push(check_level(raw, max_level)?);
                }
                Ok((rle.bytes_consumed(), LevelDecoder { levels, cursor: 0 }))
            }
            Encoding::BIT_PACKED => {
                let span = ceil((num_values * bit_width as usize) as i64, 8) as usize;
                if buf.len() < span {
                    return Err(short_input_err!(
                        "BIT_PACKED level stream of {} bytes overruns page",
                        span
                    ));
                }
                let mut reader = BitReader::new_msb(buf.slice(..span));
                let mut levels = Vec::with_capacity(num_values);
                while levels.len() < num_values {
                    levels.push(check_level(reader.get_value(bit_width as usize)?, max_level)?);
                }
                Ok((span, LevelDecoder { levels, cursor: 0 }))
            }
            other => Err(metadata_err!("invalid level encoding: {}", other)),
        }
    }

    /// Decodes a v2 level stream: a 4-byte little-endian byte length, then
    /// that many bytes of RLE/bit-packed hybrid data.
    pub fn v2(max_level: i16, num_values: usize, buf: Bytes) -> Result<LevelDecoder> {
        if buf.len() < 4 {
            return Err(short_input_err!("v2 level stream missing its length"));
        }
        let byte_length = read_num_bytes!(u32, 4, buf.as_ref()) as usize;
        if buf.len() - 4 < byte_length {
            return Err(short_input_err!(
                "v2 level stream declares {} bytes, page holds {}",
                byte_length,
                buf.len() - 4
            ));
        }
        let mut rle = RleDecoder::new(num_required_bits(max_level as u64));
        rle.set_data(buf.slice(4..4 + byte_length));
        let mut levels = Vec::with_capacity(num_values);
        while levels.len() < num_values {
            let raw = rle.get()?.ok_or_else(|| {
                short_input_err!(
                    "level stream ended after {} of {} levels",
                    levels.len(),
                    num_values
                )
            })?;
            levels.push(check_level(raw, max_level)?);
        }
        Ok(LevelDecoder { levels, cursor: 0 })
    }

    /// Copies out up to `buffer.len()` of the remaining levels, returning
    /// how many were copied.
    pub fn get_batch(&mut self, buffer: &mut [i16]) -> Result<usize> {
        let available = self.levels.len() - self.cursor;
        let count = std::cmp::min(buffer.len(), available);
        buffer[..count].copy_from_slice(&self.levels[self.cursor..self.cursor + count]);
        self.cursor += count;
        Ok(count)
    }
}

fn check_level(value: u64, max_level: i16) -> Result<i16> {
    if value > max_level as u64 {
        return Err(decode_err!(
            "level {} exceeds maximum {}",
            value,
            max_level
        ));
    }
    Ok(value as i16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_v1_rle_levels_have_no_prefix() {
        // bare hybrid stream: an RLE run of 8 ones at width 1
        let buf = Bytes::from_static(&[0x10, 0x01]);
        let (consumed, mut decoder) = LevelDecoder::v1(Encoding::RLE, 1, 8, buf).unwrap();
        assert_eq!(consumed, 2);
        let mut levels = vec![0i16; 8];
        assert_eq!(decoder.get_batch(&mut levels).unwrap(), 8);
        assert_eq!(levels, vec![1; 8]);
    }

    #[test]
    fn test_v1_rle_span_stops_at_level_count() {
        // the stream is followed by value bytes; decoding 8 levels must
        // consume the two stream bytes and nothing more
        let buf = Bytes::from_static(&[0x10, 0x01, 0xde, 0xad]);
        let (consumed, _) = LevelDecoder::v1(Encoding::RLE, 1, 8, buf).unwrap();
        assert_eq!(consumed, 2);
    }

    #[test]
    fn test_v1_rle_partial_bit_packed_group() {
        // one bit-packed group of 8 at width 1, but only 4 levels in the
        // page: the group's byte is still consumed whole
        let buf = Bytes::from_static(&[0x03, 0x0f, 0x55]);
        let (consumed, mut decoder) = LevelDecoder::v1(Encoding::RLE, 1, 4, buf).unwrap();
        assert_eq!(consumed, 2);
        let mut levels = vec![0i16; 8];
        assert_eq!(decoder.get_batch(&mut levels).unwrap(), 4);
        assert_eq!(&levels[..4], &[1, 1, 1, 1]);
    }

    #[test]
    fn test_v1_bit_packed_levels() {
        // 5 levels at width 2, MSB-first: 0,1,2,1,0 -> 00 01 10 01 | 00 ...
        let buf = Bytes::from_static(&[0b0001_1001, 0b0000_0000]);
        let (consumed, mut decoder) =
            LevelDecoder::v1(Encoding::BIT_PACKED, 2, 5, buf).unwrap();
        assert_eq!(consumed, 2);
        let mut levels = vec![0i16; 5];
        assert_eq!(decoder.get_batch(&mut levels).unwrap(), 5);
        assert_eq!(levels, vec![0, 1, 2, 1, 0]);
    }

    #[test]
    fn test_v2_levels_carry_a_length() {
        let buf = Bytes::from_static(&[0x02, 0x00, 0x00, 0x00, 0x10, 0x01]);
        let mut decoder = LevelDecoder::v2(1, 8, buf).unwrap();
        let mut levels = vec![0i16; 8];
        assert_eq!(decoder.get_batch(&mut levels).unwrap(), 8);
        assert_eq!(levels, vec![1; 8]);
    }

    #[test]
    fn test_v2_declared_length_overruns_page() {
        let buf = Bytes::from_static(&[0xff, 0x00, 0x00, 0x00, 0x10]);
        match LevelDecoder::v2(1, 8, buf) {
            Err(ParquetError::ShortInput(_)) => {}
            other => panic!("expected ShortInput, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_level_above_max_rejected() {
        // RLE run of value 3 at width 2 with max_level 2
        let buf = Bytes::from_static(&[0x10, 0x03]);
        match LevelDecoder::v1(Encoding::RLE, 2, 8, buf) {
            Err(ParquetError::Decode(_)) => {}
            other => panic!("expected Decode, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_v1_stream_too_short() {
        // RLE run of 4, but 8 levels requested
        let buf = Bytes::from_static(&[0x08, 0x01]);
        match LevelDecoder::v1(Encoding::RLE, 1, 8, buf) {
            Err(ParquetError::ShortInput(_)) => {}
            other => panic!("expected ShortInput, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_invalid_level_encoding() {
        let buf = Bytes::from_static(&[0x00]);
        assert!(LevelDecoder::v1(Encoding::PLAIN, 1, 1, buf).is_err());
    }

    #[test]
    fn test_batches_resume_where_they_stopped() {
        let buf = Bytes::from_static(&[0x0c, 0x01]); // RLE run of 6 ones
        let (_, mut decoder) = LevelDecoder::v1(Encoding::RLE, 1, 6, buf).unwrap();
        let mut first = vec![0i16; 4];
        assert_eq!(decoder.get_batch(&mut first).unwrap(), 4);
        let mut second = vec![0i16; 4];
        assert_eq!(decoder.get_batch(&mut second).unwrap(), 2);
        assert_eq!(&second[..2], &[1, 1]);
    }
}
