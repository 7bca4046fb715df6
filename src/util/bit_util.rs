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

//! Utility functions and a bit-granular reader shared by the encodings.

use bytes::Bytes;

use crate::errors::{ParquetError, Result};

/// Reads `$size` little-endian bytes from `$src` into the integer type `$ty`,
/// zero-extending when `$size` is smaller than the type.
macro_rules! read_num_bytes {
    ($ty:ty, $size:expr, $src:expr) => {{
        debug_assert!($size <= $src.len(), "size too big: {} > {}", $size, $src.len());
        let mut buffer = <$ty as $crate::util::bit_util::FromBytes>::Buffer::default();
        buffer.as_mut()[..$size].copy_from_slice(&$src[..$size]);
        <$ty as $crate::util::bit_util::FromBytes>::from_le_bytes(buffer)
    }};
}

/// Scalar types that can be assembled from little-endian bytes.
pub trait FromBytes: Sized {
    type Buffer: AsMut<[u8]> + AsRef<[u8]> + Default;
    fn from_le_bytes(bs: Self::Buffer) -> Self;
}

macro_rules! from_le_bytes {
    ($($ty:ty),*) => {
        $(
            impl FromBytes for $ty {
                type Buffer = [u8; std::mem::size_of::<$ty>()];
                fn from_le_bytes(bs: Self::Buffer) -> Self {
                    <$ty>::from_le_bytes(bs)
                }
            }
        )*
    };
}

from_le_bytes! { u8, u16, u32, u64, i8, i16, i32, i64, f32, f64 }

/// Reads a value of type `T` from the head of `bytes`.
pub fn from_le_slice<T: FromBytes>(bytes: &[u8]) -> T {
    let mut buffer = T::Buffer::default();
    let size = buffer.as_ref().len();
    buffer.as_mut().copy_from_slice(&bytes[..size]);
    T::from_le_bytes(buffer)
}

/// Returns the ceiling of `value`/`divisor`.
#[inline]
pub fn ceil(value: i64, divisor: i64) -> i64 {
    value / divisor + ((value % divisor != 0) as i64)
}

/// Returns the minimum number of bits needed to represent `x`.
#[inline]
pub fn num_required_bits(x: u64) -> u8 {
    (64 - x.leading_zeros()) as u8
}

/// Returns the lowest `num_bits` bits of `v`.
#[inline]
pub fn trailing_bits(v: u64, num_bits: usize) -> u64 {
    if num_bits >= 64 {
        v
    } else {
        v & ((1 << num_bits) - 1)
    }
}

/// Bit order within a byte.
///
/// The RLE/bit-packed hybrid and PLAIN booleans consume bit 0 upward; the
/// deprecated BIT_PACKED level encoding consumes bit 7 downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitOrder {
    LsbFirst,
    MsbFirst,
}

/// Reads unsigned integers of up to 64 bits from a byte buffer, crossing
/// byte boundaries as needed.
///
/// Keeps at most one partially consumed byte of state; [`Self::byte_align`]
/// discards the unconsumed remainder of that byte when a bit-packed run ends.
pub struct BitReader {
    data: Bytes,
    /// Index of the next unread byte.
    byte_offset: usize,
    /// Bits already consumed from `data[byte_offset]`, in `0..8`.
    bit_offset: usize,
    order: BitOrder,
}

impl BitReader {
    /// Creates a reader consuming bits LSB-first.
    pub fn new(data: Bytes) -> Self {
        Self::new_with_order(data, BitOrder::LsbFirst)
    }

    /// Creates a reader consuming bits MSB-first.
    pub fn new_msb(data: Bytes) -> Self {
        Self::new_with_order(data, BitOrder::MsbFirst)
    }

    fn new_with_order(data: Bytes, order: BitOrder) -> Self {
        Self {
            data,
            byte_offset: 0,
            bit_offset: 0,
            order,
        }
    }

    /// Total number of bytes touched so far, counting a partially consumed
    /// byte as consumed.
    pub fn bytes_consumed(&self) -> usize {
        self.byte_offset + (self.bit_offset != 0) as usize
    }

    /// Discards any unconsumed bits of the current byte.
    pub fn byte_align(&mut self) {
        if self.bit_offset != 0 {
            self.bit_offset = 0;
            self.byte_offset += 1;
        }
    }

    /// Reads a single unsigned value of `num_bits` bits.
    ///
    /// `num_bits` must be in `[0, 64]`; a zero-width read returns 0 without
    /// consuming input. Running out of bytes yields `ShortInput`.
    pub fn get_value(&mut self, num_bits: usize) -> Result<u64> {
        assert!(num_bits <= 64, "bit width {} out of range", num_bits);
        if num_bits == 0 {
            return Ok(0);
        }
        let available = (self.data.len() - self.byte_offset) * 8 - self.bit_offset;
        if num_bits > available {
            return Err(short_input_err!(
                "requested {} bits with only {} left",
                num_bits,
                available
            ));
        }

        let mut v: u64 = 0;
        match self.order {
            BitOrder::LsbFirst => {
                let mut bits_read = 0;
                while bits_read < num_bits {
                    let byte = self.data[self.byte_offset] as u64;
                    let take = std::cmp::min(num_bits - bits_read, 8 - self.bit_offset);
                    let chunk = trailing_bits(byte >> self.bit_offset, take);
                    v |= chunk << bits_read;
                    bits_read += take;
                    self.advance(take);
                }
            }
            BitOrder::MsbFirst => {
                let mut remaining = num_bits;
                while remaining > 0 {
                    let byte = self.data[self.byte_offset] as u64;
                    let take = std::cmp::min(remaining, 8 - self.bit_offset);
                    let shift = 8 - self.bit_offset - take;
                    let chunk = trailing_bits(byte >> shift, take);
                    v = (v << take) | chunk;
                    remaining -= take;
                    self.advance(take);
                }
            }
        }
        Ok(v)
    }

    /// Reads `out.len()` values of `num_bits` bits each.
    pub fn get_batch(&mut self, out: &mut [u64], num_bits: usize) -> Result<()> {
        for slot in out.iter_mut() {
            *slot = self.get_value(num_bits)?;
        }
        Ok(())
    }

    #[inline]
    fn advance(&mut self, bits: usize) {
        self.bit_offset += bits;
        if self.bit_offset >= 8 {
            self.byte_offset += self.bit_offset / 8;
            self.bit_offset %= 8;
        }
    }
}
