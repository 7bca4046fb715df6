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

//! Contains codec implementations for page decompression.
//!
//! SNAPPY and both LZ4 flavours are decoded in-tree; GZIP and ZSTD are
//! backed by `flate2` and `zstd`. All codecs append to the caller's output
//! vector, which doubles as the back-reference window for the LZ77-style
//! formats.
//!
//! # Example
//!
//! ```no_run
//! use parq::basic::Compression;
//! use parq::compression::create_codec;
//!
//! let mut codec = create_codec(Compression::SNAPPY).unwrap().unwrap();
//! let mut output = Vec::new();
//! codec.decompress(&[0x00], &mut output).unwrap();
//! ```

use std::io::{self, Read};

use crate::basic::Compression;
use crate::errors::{ParquetError, Result};

/// Parquet compression codec interface.
pub trait Codec: Send {
    /// Decompresses data stored in slice `input_buf` and appends output to
    /// `output_buf`, returning the number of bytes appended.
    fn decompress(&mut self, input_buf: &[u8], output_buf: &mut Vec<u8>) -> Result<usize>;
}

/// Given the compression type `codec`, returns a codec used to decompress.
///
/// This returns `None` if the codec type `UNCOMPRESSED`.
pub fn create_codec(codec: Compression) -> Result<Option<Box<dyn Codec>>> {
    match codec {
        Compression::UNCOMPRESSED => Ok(None),
        Compression::SNAPPY => Ok(Some(Box::new(SnappyCodec::new()))),
        Compression::GZIP => Ok(Some(Box::new(GZipCodec::new()))),
        Compression::ZSTD => Ok(Some(Box::new(ZSTDCodec::new()))),
        Compression::LZ4 => Ok(Some(Box::new(Lz4HadoopCodec::new()))),
        Compression::LZ4_RAW => Ok(Some(Box::new(Lz4RawCodec::new()))),
        Compression::LZO | Compression::BROTLI => {
            Err(unsupported_err!("codec {} is not supported", codec))
        }
    }
}

// ----------------------------------------------------------------------
// SNAPPY

/// Codec for the Snappy raw block format.
pub struct SnappyCodec {}

impl SnappyCodec {
    pub(crate) fn new() -> Self {
        Self {}
    }
}

/// Reads the little-endian varint preamble, returning (value, bytes read).
fn read_uvarint(input: &[u8]) -> Result<(u64, usize)> {
    let mut value: u64 = 0;
    for (i, byte) in input.iter().enumerate().take(10) {
        value |= ((byte & 0x7f) as u64) << (i * 7);
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }
    Err(decode_err!("snappy length varint unterminated"))
}

/// Copies `len` bytes starting `offset` back from the end of `output`.
/// Byte-at-a-time on purpose: when `offset < len` the source repeats.
fn copy_within(output: &mut Vec<u8>, offset: usize, len: usize, window_start: usize) -> Result<()> {
    let produced = output.len() - window_start;
    if offset == 0 || offset > produced {
        return Err(decode_err!(
            "back-reference offset {} outside window of {} bytes",
            offset,
            produced
        ));
    }
    let mut src = output.len() - offset;
    for _ in 0..len {
        let byte = output[src];
        output.push(byte);
        src += 1;
    }
    Ok(())
}

impl Codec for SnappyCodec {
    fn decompress(&mut self, input_buf: &[u8], output_buf: &mut Vec<u8>) -> Result<usize> {
        let (decompressed_len, mut pos) = read_uvarint(input_buf)?;
        let decompressed_len = decompressed_len as usize;
        let window_start = output_buf.len();
        output_buf.reserve(decompressed_len);

        while pos < input_buf.len() {
            let tag = input_buf[pos];
            pos += 1;
            match tag & 0x03 {
                // literal
                0x00 => {
                    let mut len = (tag >> 2) as usize;
                    if len >= 60 {
                        let extra = len - 59;
                        if pos + extra > input_buf.len() {
                            return Err(decode_err!("snappy literal length truncated"));
                        }
                        len = 0;
                        for i in 0..extra {
                            len |= (input_buf[pos + i] as usize) << (i * 8);
                        }
                        pos += extra;
                    }
                    let len = len + 1;
                    if pos + len > input_buf.len() {
                        return Err(decode_err!(
                            "snappy literal of {} bytes overruns input",
                            len
                        ));
                    }
                    output_buf.extend_from_slice(&input_buf[pos..pos + len]);
                    pos += len;
                }
                // copy with 1-byte offset: 3-bit length, 11-bit offset
                0x01 => {
                    if pos >= input_buf.len() {
                        return Err(decode_err!("snappy copy tag truncated"));
                    }
                    let len = (((tag >> 2) & 0x07) + 4) as usize;
                    let offset = (((tag >> 5) as usize) << 8) | input_buf[pos] as usize;
                    pos += 1;
                    copy_within(output_buf, offset, len, window_start)?;
                }
                // copy with 2-byte offset
                0x02 => {
                    if pos + 2 > input_buf.len() {
                        return Err(decode_err!("snappy copy tag truncated"));
                    }
                    let len = ((tag >> 2) + 1) as usize;
                    let offset =
                        input_buf[pos] as usize | ((input_buf[pos + 1] as usize) << 8);
                    pos += 2;
                    copy_within(output_buf, offset, len, window_start)?;
                }
                // copy with 4-byte offset
                _ => {
                    if pos + 4 > input_buf.len() {
                        return Err(decode_err!("snappy copy tag truncated"));
                    }
                    let len = ((tag >> 2) + 1) as usize;
                    let offset = input_buf[pos] as usize
                        | ((input_buf[pos + 1] as usize) << 8)
                        | ((input_buf[pos + 2] as usize) << 16)
                        | ((input_buf[pos + 3] as usize) << 24);
                    pos += 4;
                    copy_within(output_buf, offset, len, window_start)?;
                }
            }
            if output_buf.len() - window_start > decompressed_len {
                return Err(decode_err!(
                    "snappy output exceeds declared length {}",
                    decompressed_len
                ));
            }
        }

        let produced = output_buf.len() - window_start;
        if produced != decompressed_len {
            return Err(decode_err!(
                "snappy stream ended after {} of {} declared bytes",
                produced,
                decompressed_len
            ));
        }
        Ok(produced)
    }
}

// ----------------------------------------------------------------------
// LZ4

/// Longest length a single 255-continuation chain may produce. Parquet
/// pages are bounded by `i32`, so anything longer marks a corrupt block.
const LZ4_MAX_RUN: usize = i32::MAX as usize;

/// Decodes one raw LZ4 block, appending to `output`. `window_start` marks
/// the first byte of the back-reference window inside `output`.
fn lz4_decompress_block(input: &[u8], output: &mut Vec<u8>, window_start: usize) -> Result<usize> {
    let produced_before = output.len();
    let mut pos = 0;

    while pos < input.len() {
        let token = input[pos];
        pos += 1;

        let mut literal_len = (token >> 4) as usize;
        if literal_len == 15 {
            loop {
                if pos >= input.len() {
                    return Err(decode_err!("lz4 literal length truncated"));
                }
                let byte = input[pos];
                pos += 1;
                literal_len += byte as usize;
                if literal_len > LZ4_MAX_RUN {
                    return Err(decode_err!("lz4 literal length continuation too large"));
                }
                if byte != 255 {
                    break;
                }
            }
        }
        if pos + literal_len > input.len() {
            return Err(decode_err!(
                "lz4 literal of {} bytes overruns input",
                literal_len
            ));
        }
        output.extend_from_slice(&input[pos..pos + literal_len]);
        pos += literal_len;

        // The final sequence carries no match part.
        if pos == input.len() {
            break;
        }

        if pos + 2 > input.len() {
            return Err(decode_err!("lz4 match offset truncated"));
        }
        let offset = input[pos] as usize | ((input[pos + 1] as usize) << 8);
        pos += 2;
        if offset == 0 {
            return Err(decode_err!("lz4 match offset of zero"));
        }

        let mut match_len = (token & 0x0f) as usize;
        if match_len == 15 {
            loop {
                if pos >= input.len() {
                    return Err(decode_err!("lz4 match length truncated"));
                }
                let byte = input[pos];
                pos += 1;
                match_len += byte as usize;
                if match_len > LZ4_MAX_RUN {
                    return Err(decode_err!("lz4 match length continuation too large"));
                }
                if byte != 255 {
                    break;
                }
            }
        }
        let match_len = match_len + 4;
        copy_within(output, offset, match_len, window_start)?;
    }

    Ok(output.len() - produced_before)
}

/// Codec for the raw LZ4 block format (`LZ4_RAW`).
pub struct Lz4RawCodec {}

impl Lz4RawCodec {
    pub(crate) fn new() -> Self {
        Self {}
    }
}

impl Codec for Lz4RawCodec {
    fn decompress(&mut self, input_buf: &[u8], output_buf: &mut Vec<u8>) -> Result<usize> {
        let window_start = output_buf.len();
        lz4_decompress_block(input_buf, output_buf, window_start)
    }
}

/// Codec for the Hadoop-framed LZ4 format (`LZ4`): repeated frames of
/// big-endian uncompressed/compressed lengths over raw blocks.
pub struct Lz4HadoopCodec {}

impl Lz4HadoopCodec {
    pub(crate) fn new() -> Self {
        Self {}
    }
}

impl Codec for Lz4HadoopCodec {
    fn decompress(&mut self, input_buf: &[u8], output_buf: &mut Vec<u8>) -> Result<usize> {
        let window_start = output_buf.len();
        let mut pos = 0;
        while pos < input_buf.len() {
            if pos + 8 > input_buf.len() {
                return Err(decode_err!("lz4 hadoop frame header truncated"));
            }
            let uncompressed_len =
                u32::from_be_bytes(input_buf[pos..pos + 4].try_into().unwrap()) as usize;
            let compressed_len =
                u32::from_be_bytes(input_buf[pos + 4..pos + 8].try_into().unwrap()) as usize;
            pos += 8;
            if pos + compressed_len > input_buf.len() {
                return Err(decode_err!(
                    "lz4 hadoop frame of {} bytes overruns input",
                    compressed_len
                ));
            }
            // each framed block is compressed independently, so its window
            // starts at its own first output byte
            let block_window_start = output_buf.len();
            let produced = lz4_decompress_block(
                &input_buf[pos..pos + compressed_len],
                output_buf,
                block_window_start,
            )?;
            if produced != uncompressed_len {
                return Err(decode_err!(
                    "lz4 hadoop frame declared {} bytes, produced {}",
                    uncompressed_len,
                    produced
                ));
            }
            pos += compressed_len;
        }
        Ok(output_buf.len() - window_start)
    }
}

// ----------------------------------------------------------------------
// GZIP / ZSTD adapters

/// Codec for GZip compression algorithm.
pub struct GZipCodec {}

impl GZipCodec {
    pub(crate) fn new() -> Self {
        Self {}
    }
}

impl Codec for GZipCodec {
    fn decompress(&mut self, input_buf: &[u8], output_buf: &mut Vec<u8>) -> Result<usize> {
        let mut decoder = flate2::read::GzDecoder::new(input_buf);
        let before = output_buf.len();
        decoder
            .read_to_end(output_buf)
            .map_err(|e| decode_err!("gzip stream: {}", e))?;
        Ok(output_buf.len() - before)
    }
}

/// Codec for Zstandard compression algorithm.
pub struct ZSTDCodec {}

impl ZSTDCodec {
    pub(crate) fn new() -> Self {
        Self {}
    }
}

impl Codec for ZSTDCodec {
    fn decompress(&mut self, input_buf: &[u8], output_buf: &mut Vec<u8>) -> Result<usize> {
        let before = output_buf.len();
        let mut decoder = zstd::stream::read::Decoder::new(input_buf)
            .map_err(|e| decode_err!("zstd stream: {}", e))?;
        io::copy(&mut decoder, output_buf).map_err(|e| decode_err!("zstd stream: {}", e))?;
        Ok(output_buf.len() - before)
    }
}
