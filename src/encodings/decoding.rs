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

//! Contains all supported decoders for Parquet.

use std::marker::PhantomData;

use bytes::Bytes;

use crate::basic::{Encoding, Type};
use crate::data_type::private::{ParquetValueType, PlainDecoderState};
use crate::data_type::{DataType, Int32Type};
use crate::errors::{ParquetError, Result};
use crate::util::bit_util::BitReader;

use super::rle::RleDecoder;

// ----------------------------------------------------------------------
// Decoders

/// A Parquet decoder for the data type `T`.
pub trait Decoder<T: DataType>: Send {
    /// Sets the data to decode to be `data`, which should contain `num_values` of values
    /// to decode.
    fn set_data(&mut self, data: Bytes, num_values: usize) -> Result<()>;

    /// Consumes values from this decoder and write the results to `buffer`. This will try
    /// to fill up `buffer`.
    ///
    /// Returns the actual number of values decoded, which should be equal to
    /// `buffer.len()` unless the remaining number of values is less than
    /// `buffer.len()`.
    fn get(&mut self, buffer: &mut [T::T]) -> Result<usize>;

    /// Returns the number of values left in this decoder stream.
    fn values_left(&self) -> usize;

    /// Returns the encoding for this decoder.
    fn encoding(&self) -> Encoding;
}

/// Gets a decoder for the column descriptor `descr` and encoding type `encoding`.
///
/// NOTE: the primitive type in `descr` MUST match the data type `T`, otherwise
/// disastrous consequence could occur.
pub fn get_decoder<T: DataType>(
    type_length: i32,
    encoding: Encoding,
) -> Result<Box<dyn Decoder<T>>> {
    let decoder: Box<dyn Decoder<T>> = match encoding {
        Encoding::PLAIN => Box::new(PlainDecoder::new(type_length)),
        Encoding::RLE => {
            if T::get_physical_type() != Type::BOOLEAN {
                return Err(unsupported_err!(
                    "RLE value encoding only applies to BOOLEAN, not {}",
                    T::get_physical_type()
                ));
            }
            Box::new(RleValueDecoder::new())
        }
        Encoding::DELTA_BINARY_PACKED => {
            if !matches!(T::get_physical_type(), Type::INT32 | Type::INT64) {
                return Err(unsupported_err!(
                    "DELTA_BINARY_PACKED only applies to INT32 and INT64, not {}",
                    T::get_physical_type()
                ));
            }
            Box::new(DeltaBitPackDecoder::new())
        }
        Encoding::DELTA_LENGTH_BYTE_ARRAY => {
            if T::get_physical_type() != Type::BYTE_ARRAY {
                return Err(unsupported_err!(
                    "DELTA_LENGTH_BYTE_ARRAY only applies to BYTE_ARRAY, not {}",
                    T::get_physical_type()
                ));
            }
            Box::new(DeltaLengthByteArrayDecoder::new())
        }
        Encoding::DELTA_BYTE_ARRAY => {
            if !matches!(
                T::get_physical_type(),
                Type::BYTE_ARRAY | Type::FIXED_LEN_BYTE_ARRAY
            ) {
                return Err(unsupported_err!(
                    "DELTA_BYTE_ARRAY only applies to byte arrays, not {}",
                    T::get_physical_type()
                ));
            }
            Box::new(DeltaByteArrayDecoder::new())
        }
        Encoding::BYTE_STREAM_SPLIT => {
            if !matches!(T::get_physical_type(), Type::FLOAT | Type::DOUBLE) {
                return Err(unsupported_err!(
                    "BYTE_STREAM_SPLIT only applies to FLOAT and DOUBLE, not {}",
                    T::get_physical_type()
                ));
            }
            Box::new(ByteStreamSplitDecoder::new())
        }
        Encoding::PLAIN_DICTIONARY | Encoding::RLE_DICTIONARY => {
            return Err(unsupported_err!(
                "dictionary encoding is resolved by the column reader, not get_decoder"
            ));
        }
        Encoding::BIT_PACKED => {
            return Err(unsupported_err!(
                "BIT_PACKED applies to levels only, not values"
            ));
        }
    };
    Ok(decoder)
}

// ----------------------------------------------------------------------
// PLAIN

/// Plain decoding that supports all types.
/// Values are encoded back to back. For native types, data is encoded as little endian.
/// Floating point types are encoded in IEEE.
/// Boolean values are bit-packed LSB-first, byte arrays carry a 4-byte
/// little-endian length prefix, fixed length byte arrays use the
/// schema-declared length.
pub struct PlainDecoder<T: DataType> {
    state: PlainDecoderState,
    type_length: i32,
    _phantom: PhantomData<T>,
}

impl<T: DataType> PlainDecoder<T> {
    pub fn new(type_length: i32) -> Self {
        Self {
            state: PlainDecoderState::default(),
            type_length,
            _phantom: PhantomData,
        }
    }
}

impl<T: DataType> Decoder<T> for PlainDecoder<T> {
    fn set_data(&mut self, data: Bytes, num_values: usize) -> Result<()> {
        self.state.set_data(data, num_values, self.type_length);
        Ok(())
    }

    fn get(&mut self, buffer: &mut [T::T]) -> Result<usize> {
        T::T::decode_plain(buffer, &mut self.state)
    }

    fn values_left(&self) -> usize {
        self.state.values_left()
    }

    fn encoding(&self) -> Encoding {
        Encoding::PLAIN
    }
}

// ----------------------------------------------------------------------
// RLE_DICTIONARY / PLAIN_DICTIONARY

/// Dictionary decoder.
/// The dictionary itself arrives in a dictionary page, PLAIN-decoded into a
/// vector of values; each data page then carries an index bit width byte
/// followed by an RLE/bit-packed hybrid stream of dictionary indices, which
/// are resolved against the dictionary as values materialise.
pub struct DictDecoder<T: DataType> {
    dictionary: Vec<T::T>,
    rle: Option<RleDecoder>,
    num_values: usize,
}

impl<T: DataType> DictDecoder<T> {
    pub fn new(dictionary: Vec<T::T>) -> Self {
        Self {
            dictionary,
            rle: None,
            num_values: 0,
        }
    }
}

impl<T: DataType> Decoder<T> for DictDecoder<T> {
    fn set_data(&mut self, data: Bytes, num_values: usize) -> Result<()> {
        if data.is_empty() {
            return Err(short_input_err!("dictionary index stream is empty"));
        }
        let bit_width = data[0];
        if bit_width > 32 {
            return Err(decode_err!(
                "dictionary index bit width {} out of range",
                bit_width
            ));
        }
        let mut rle = RleDecoder::new(bit_width);
        rle.set_data(data.slice(1..));
        self.rle = Some(rle);
        self.num_values = num_values;
        Ok(())
    }

    fn get(&mut self, buffer: &mut [T::T]) -> Result<usize> {
        let rle = self
            .rle
            .as_mut()
            .ok_or_else(|| decode_err!("set_data was not called on dictionary decoder"))?;
        let num_values = std::cmp::min(buffer.len(), self.num_values);
        for slot in buffer[..num_values].iter_mut() {
            let index = rle
                .get()?
                .ok_or_else(|| short_input_err!("dictionary index stream ran dry"))?
                as usize;
            *slot = self
                .dictionary
                .get(index)
                .ok_or_else(|| {
                    decode_err!(
                        "dictionary index {} out of bounds for dictionary of {}",
                        index,
                        self.dictionary.len()
                    )
                })?
                .clone();
        }
        self.num_values -= num_values;
        Ok(num_values)
    }

    fn values_left(&self) -> usize {
        self.num_values
    }

    fn encoding(&self) -> Encoding {
        Encoding::RLE_DICTIONARY
    }
}

// ----------------------------------------------------------------------
// RLE (boolean values)

/// RLE/Bit-Packing hybrid decoding for values.
/// Currently is used only for data pages v2 and supports boolean types; the
/// stream carries a 4-byte little-endian length prefix.
pub struct RleValueDecoder<T: DataType> {
    rle: Option<RleDecoder>,
    num_values: usize,
    _phantom: PhantomData<T>,
}

impl<T: DataType> RleValueDecoder<T> {
    pub fn new() -> Self {
        Self {
            rle: None,
            num_values: 0,
            _phantom: PhantomData,
        }
    }
}

impl<T: DataType> Default for RleValueDecoder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DataType> Decoder<T> for RleValueDecoder<T> {
    fn set_data(&mut self, data: Bytes, num_values: usize) -> Result<()> {
        if data.len() < 4 {
            return Err(short_input_err!("RLE value stream missing length prefix"));
        }
        let data_size = read_num_bytes!(u32, 4, data.as_ref()) as usize;
        if data.len() - 4 < data_size {
            return Err(short_input_err!(
                "RLE value stream of {} bytes overruns page",
                data_size
            ));
        }
        let mut rle = RleDecoder::new(1);
        rle.set_data(data.slice(4..4 + data_size));
        self.rle = Some(rle);
        self.num_values = num_values;
        Ok(())
    }

    fn get(&mut self, buffer: &mut [T::T]) -> Result<usize> {
        let rle = self
            .rle
            .as_mut()
            .ok_or_else(|| decode_err!("set_data was not called on RLE value decoder"))?;
        let num_values = std::cmp::min(buffer.len(), self.num_values);
        for slot in buffer[..num_values].iter_mut() {
            let bit = rle
                .get()?
                .ok_or_else(|| short_input_err!("RLE value stream ran dry"))?;
            *slot = T::T::try_from_bool(bit != 0)?;
        }
        self.num_values -= num_values;
        Ok(num_values)
    }

    fn values_left(&self) -> usize {
        self.num_values
    }

    fn encoding(&self) -> Encoding {
        Encoding::RLE
    }
}

// ----------------------------------------------------------------------
// DELTA_BINARY_PACKED

fn read_varint(data: &Bytes, offset: &mut usize) -> Result<u64> {
    let mut value: u64 = 0;
    for i in 0..10 {
        if *offset >= data.len() {
            return Err(short_input_err!("delta header varint truncated"));
        }
        let byte = data[*offset];
        *offset += 1;
        value |= ((byte & 0x7f) as u64) << (i * 7);
        if byte & 0x80 == 0 {
            return Ok(value);
        }
    }
    Err(decode_err!("delta header varint too long"))
}

fn read_zigzag(data: &Bytes, offset: &mut usize) -> Result<i64> {
    let unsigned = read_varint(data, offset)?;
    Ok((unsigned >> 1) as i64 ^ -((unsigned & 1) as i64))
}

/// Delta binary packed decoder.
/// Supports INT32 and INT64 types.
/// The stream is a header (block size, miniblocks per block, total count,
/// first value) followed by blocks of zig-zag min delta, per-miniblock bit
/// widths and bit-packed deltas; values reconstruct as
/// `previous + min_delta + delta` with wrapping arithmetic.
pub struct DeltaBitPackDecoder<T: DataType> {
    data: Option<Bytes>,
    /// Byte position of the next block header or miniblock.
    offset: usize,

    block_size: usize,
    num_miniblocks: usize,
    values_per_miniblock: usize,
    values_left: usize,

    /// True until the header's first value has been emitted.
    first_value_emitted: bool,
    first_value: i64,
    last_value: i64,

    min_delta: i64,
    /// Bit widths of the current block's miniblocks, in order.
    miniblock_widths: Vec<u8>,
    /// Index of the next miniblock to open within the current block.
    next_miniblock: usize,
    /// Reader over the current miniblock's packed deltas.
    miniblock_reader: Option<BitReader>,
    miniblock_values_left: usize,
    current_width: u8,

    _phantom: PhantomData<T>,
}

impl<T: DataType> DeltaBitPackDecoder<T> {
    pub fn new() -> Self {
        Self {
            data: None,
            offset: 0,
            block_size: 0,
            num_miniblocks: 0,
            values_per_miniblock: 0,
            values_left: 0,
            first_value_emitted: false,
            first_value: 0,
            last_value: 0,
            min_delta: 0,
            miniblock_widths: Vec::new(),
            next_miniblock: 0,
            miniblock_reader: None,
            miniblock_values_left: 0,
            current_width: 0,
            _phantom: PhantomData,
        }
    }

    /// Byte position just past the consumed part of the delta stream.
    /// After all values are read this is the start of whatever follows the
    /// stream (the concatenated byte payload for DELTA_LENGTH_BYTE_ARRAY).
    pub fn get_offset(&self) -> usize {
        self.offset
    }

    /// Reads a block header: zig-zag min delta plus one width byte per
    /// miniblock.
    fn init_block(&mut self) -> Result<()> {
        let data = self.data.clone().expect("set_data should have been called");
        self.min_delta = read_zigzag(&data, &mut self.offset)?;
        if self.offset + self.num_miniblocks > data.len() {
            return Err(short_input_err!("delta block widths truncated"));
        }
        self.miniblock_widths.clear();
        for i in 0..self.num_miniblocks {
            let width = data[self.offset + i];
            if width > 64 {
                return Err(decode_err!("delta miniblock bit width {} invalid", width));
            }
            self.miniblock_widths.push(width);
        }
        self.offset += self.num_miniblocks;
        self.next_miniblock = 0;
        Ok(())
    }

    /// Opens the next miniblock, reading a new block header when the current
    /// block is spent.
    fn open_miniblock(&mut self) -> Result<()> {
        if self.next_miniblock == self.miniblock_widths.len() {
            self.init_block()?;
        }
        let data = self.data.clone().expect("set_data should have been called");
        let width = self.miniblock_widths[self.next_miniblock];
        let miniblock_bytes = self.values_per_miniblock * width as usize / 8;
        let end = std::cmp::min(self.offset + miniblock_bytes, data.len());
        self.miniblock_reader = Some(BitReader::new(data.slice(self.offset..end)));
        self.current_width = width;
        // the offset moves past the whole miniblock even if fewer values are
        // consumed; a truncated final miniblock only fails if values from the
        // missing bytes are actually requested
        self.offset += miniblock_bytes;
        self.miniblock_values_left = self.values_per_miniblock;
        self.next_miniblock += 1;
        Ok(())
    }
}

impl<T: DataType> Default for DeltaBitPackDecoder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DataType> Decoder<T> for DeltaBitPackDecoder<T> {
    fn set_data(&mut self, data: Bytes, _num_values: usize) -> Result<()> {
        // header: <block size> <miniblocks per block> <total count> <first value>
        let mut offset = 0;
        let block_size = read_varint(&data, &mut offset)? as usize;
        let num_miniblocks = read_varint(&data, &mut offset)? as usize;
        let total_count = read_varint(&data, &mut offset)? as usize;
        let first_value = read_zigzag(&data, &mut offset)?;

        if block_size == 0 || block_size % 128 != 0 {
            return Err(decode_err!(
                "delta block size {} is not a positive multiple of 128",
                block_size
            ));
        }
        if num_miniblocks == 0 || block_size % num_miniblocks != 0 {
            return Err(decode_err!(
                "delta block size {} is not divisible into {} miniblocks",
                block_size,
                num_miniblocks
            ));
        }
        let values_per_miniblock = block_size / num_miniblocks;
        if values_per_miniblock % 32 != 0 {
            return Err(decode_err!(
                "delta miniblock of {} values is not a multiple of 32",
                values_per_miniblock
            ));
        }

        self.data = Some(data);
        self.offset = offset;
        self.block_size = block_size;
        self.num_miniblocks = num_miniblocks;
        self.values_per_miniblock = values_per_miniblock;
        self.values_left = total_count;
        self.first_value = first_value;
        self.first_value_emitted = false;
        self.last_value = first_value;
        self.miniblock_widths.clear();
        self.next_miniblock = 0;
        self.miniblock_reader = None;
        self.miniblock_values_left = 0;
        Ok(())
    }

    fn get(&mut self, buffer: &mut [T::T]) -> Result<usize> {
        let num_values = std::cmp::min(buffer.len(), self.values_left);
        for slot in buffer[..num_values].iter_mut() {
            if !self.first_value_emitted {
                self.first_value_emitted = true;
                *slot = T::T::try_from_i64(self.first_value)?;
                continue;
            }
            if self.miniblock_values_left == 0 {
                self.open_miniblock()?;
            }
            let delta = self
                .miniblock_reader
                .as_mut()
                .unwrap()
                .get_value(self.current_width as usize)?;
            self.miniblock_values_left -= 1;
            // all arithmetic wraps: overflowing deltas are part of the format
            let value = self
                .last_value
                .wrapping_add(self.min_delta)
                .wrapping_add(delta as i64);
            self.last_value = value;
            *slot = T::T::try_from_i64(value)?;
        }
        self.values_left -= num_values;
        Ok(num_values)
    }

    fn values_left(&self) -> usize {
        self.values_left
    }

    fn encoding(&self) -> Encoding {
        Encoding::DELTA_BINARY_PACKED
    }
}

// ----------------------------------------------------------------------
// DELTA_LENGTH_BYTE_ARRAY

/// Delta length byte array decoder.
/// Only applied to byte arrays.
///
/// The lengths are DELTA_BINARY_PACKED; the concatenated element bytes follow
/// immediately after the length stream.
pub struct DeltaLengthByteArrayDecoder<T: DataType> {
    data: Option<Bytes>,
    lengths: Vec<i32>,
    current: usize,
    /// Byte position of the next element's payload.
    position: usize,
    num_values: usize,
    _phantom: PhantomData<T>,
}

impl<T: DataType> DeltaLengthByteArrayDecoder<T> {
    pub fn new() -> Self {
        Self {
            data: None,
            lengths: Vec::new(),
            current: 0,
            position: 0,
            num_values: 0,
            _phantom: PhantomData,
        }
    }
}

impl<T: DataType> Default for DeltaLengthByteArrayDecoder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DataType> Decoder<T> for DeltaLengthByteArrayDecoder<T> {
    fn set_data(&mut self, data: Bytes, num_values: usize) -> Result<()> {
        let mut len_decoder = DeltaBitPackDecoder::<Int32Type>::new();
        len_decoder.set_data(data.clone(), num_values)?;
        let num_lengths = len_decoder.values_left();
        let mut lengths = vec![0i32; num_lengths];
        let decoded = len_decoder.get(&mut lengths)?;
        if decoded != num_lengths {
            return Err(short_input_err!(
                "length stream yielded {} of {} lengths",
                decoded,
                num_lengths
            ));
        }
        for length in &lengths {
            if *length < 0 {
                return Err(decode_err!("negative byte array length {}", length));
            }
        }
        self.position = len_decoder.get_offset();
        self.lengths = lengths;
        self.current = 0;
        self.num_values = std::cmp::min(num_values, num_lengths);
        self.data = Some(data);
        Ok(())
    }

    fn get(&mut self, buffer: &mut [T::T]) -> Result<usize> {
        let data = self
            .data
            .as_ref()
            .ok_or_else(|| decode_err!("set_data was not called on delta length decoder"))?;
        let num_values = std::cmp::min(buffer.len(), self.num_values);
        for slot in buffer[..num_values].iter_mut() {
            let length = self.lengths[self.current] as usize;
            if self.position + length > data.len() {
                return Err(short_input_err!(
                    "byte array payload of {} bytes overruns page",
                    length
                ));
            }
            *slot = T::T::try_from_bytes(data.slice(self.position..self.position + length))?;
            self.position += length;
            self.current += 1;
        }
        self.num_values -= num_values;
        Ok(num_values)
    }

    fn values_left(&self) -> usize {
        self.num_values
    }

    fn encoding(&self) -> Encoding {
        Encoding::DELTA_LENGTH_BYTE_ARRAY
    }
}

// ----------------------------------------------------------------------
// DELTA_BYTE_ARRAY

/// Delta byte array decoder.
/// Prefix lengths are DELTA_BINARY_PACKED; the suffixes form a
/// DELTA_LENGTH_BYTE_ARRAY stream right after the prefix stream. Element `i`
/// is the first `prefix_len[i]` bytes of element `i - 1` followed by
/// suffix `i`.
pub struct DeltaByteArrayDecoder<T: DataType> {
    prefix_lengths: Vec<i32>,
    current: usize,
    suffix_decoder: Option<DeltaLengthByteArrayDecoder<crate::data_type::ByteArrayType>>,
    previous: Vec<u8>,
    num_values: usize,
    _phantom: PhantomData<T>,
}

impl<T: DataType> DeltaByteArrayDecoder<T> {
    pub fn new() -> Self {
        Self {
            prefix_lengths: Vec::new(),
            current: 0,
            suffix_decoder: None,
            previous: Vec::new(),
            num_values: 0,
            _phantom: PhantomData,
        }
    }
}

impl<T: DataType> Default for DeltaByteArrayDecoder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DataType> Decoder<T> for DeltaByteArrayDecoder<T> {
    fn set_data(&mut self, data: Bytes, num_values: usize) -> Result<()> {
        let mut prefix_decoder = DeltaBitPackDecoder::<Int32Type>::new();
        prefix_decoder.set_data(data.clone(), num_values)?;
        let num_prefixes = prefix_decoder.values_left();
        let mut prefix_lengths = vec![0i32; num_prefixes];
        let decoded = prefix_decoder.get(&mut prefix_lengths)?;
        if decoded != num_prefixes {
            return Err(short_input_err!(
                "prefix stream yielded {} of {} lengths",
                decoded,
                num_prefixes
            ));
        }
        match prefix_lengths.first() {
            Some(first) if *first != 0 => {
                return Err(decode_err!(
                    "first element declares a prefix of {} bytes with no predecessor",
                    first
                ));
            }
            _ => {}
        }

        let mut suffix_decoder = DeltaLengthByteArrayDecoder::new();
        suffix_decoder.set_data(data.slice(prefix_decoder.get_offset()..), num_values)?;

        self.prefix_lengths = prefix_lengths;
        self.current = 0;
        self.suffix_decoder = Some(suffix_decoder);
        self.previous.clear();
        self.num_values = std::cmp::min(num_values, num_prefixes);
        Ok(())
    }

    fn get(&mut self, buffer: &mut [T::T]) -> Result<usize> {
        let suffix_decoder = self
            .suffix_decoder
            .as_mut()
            .ok_or_else(|| decode_err!("set_data was not called on delta byte array decoder"))?;
        let num_values = std::cmp::min(buffer.len(), self.num_values);
        let mut suffix = [crate::data_type::ByteArray::new()];
        for slot in buffer[..num_values].iter_mut() {
            if suffix_decoder.get(&mut suffix)? != 1 {
                return Err(short_input_err!("suffix stream ran dry"));
            }
            let prefix_length = self.prefix_lengths[self.current] as usize;
            if prefix_length > self.previous.len() {
                return Err(decode_err!(
                    "prefix of {} bytes exceeds previous element of {}",
                    prefix_length,
                    self.previous.len()
                ));
            }
            let mut value = Vec::with_capacity(prefix_length + suffix[0].len());
            value.extend_from_slice(&self.previous[..prefix_length]);
            value.extend_from_slice(suffix[0].data());
            self.previous = value.clone();
            *slot = T::T::try_from_bytes(value.into())?;
            self.current += 1;
        }
        self.num_values -= num_values;
        Ok(num_values)
    }

    fn values_left(&self) -> usize {
        self.num_values
    }

    fn encoding(&self) -> Encoding {
        Encoding::DELTA_BYTE_ARRAY
    }
}

// ----------------------------------------------------------------------
// BYTE_STREAM_SPLIT

/// Byte stream split decoder, for FLOAT and DOUBLE.
/// Byte `j` of element `i` lives at position `i + j * n` where `n` is the
/// element count of the page.
pub struct ByteStreamSplitDecoder<T: DataType> {
    data: Option<Bytes>,
    /// Element count of the page, which is also the stream stride.
    stride: usize,
    current: usize,
    num_values: usize,
    _phantom: PhantomData<T>,
}

impl<T: DataType> ByteStreamSplitDecoder<T> {
    pub fn new() -> Self {
        Self {
            data: None,
            stride: 0,
            current: 0,
            num_values: 0,
            _phantom: PhantomData,
        }
    }
}

impl<T: DataType> Default for ByteStreamSplitDecoder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DataType> Decoder<T> for ByteStreamSplitDecoder<T> {
    fn set_data(&mut self, data: Bytes, num_values: usize) -> Result<()> {
        let type_size = T::get_type_size();
        if data.len() % type_size != 0 {
            return Err(decode_err!(
                "byte stream split payload of {} bytes is not a multiple of {}",
                data.len(),
                type_size
            ));
        }
        let stride = data.len() / type_size;
        self.num_values = std::cmp::min(num_values, stride);
        self.stride = stride;
        self.current = 0;
        self.data = Some(data);
        Ok(())
    }

    fn get(&mut self, buffer: &mut [T::T]) -> Result<usize> {
        let data = self
            .data
            .as_ref()
            .ok_or_else(|| decode_err!("set_data was not called on byte stream split decoder"))?;
        let type_size = T::get_type_size();
        let num_values = std::cmp::min(buffer.len(), self.num_values);
        let mut gathered = [0u8; 8];
        for slot in buffer[..num_values].iter_mut() {
            for (j, byte) in gathered[..type_size].iter_mut().enumerate() {
                *byte = data[self.current + j * self.stride];
            }
            *slot = T::T::try_from_le_slice(&gathered[..type_size])?;
            self.current += 1;
        }
        self.num_values -= num_values;
        Ok(num_values)
    }

    fn values_left(&self) -> usize {
        self.num_values
    }

    fn encoding(&self) -> Encoding {
        Encoding::BYTE_STREAM_SPLIT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_type::{
        ByteArray, ByteArrayType, DoubleType, FloatType, Int64Type,
    };

    // -- helpers shared with the delta tests; mirror the block layout the
    //    format writer produces for block size 128 / 4 miniblocks

    fn zigzag(v: i64) -> u64 {
        ((v << 1) ^ (v >> 63)) as u64
    }

    fn push_varint(out: &mut Vec<u8>, mut v: u64) {
        loop {
            let byte = (v & 0x7f) as u8;
            v >>= 7;
            if v == 0 {
                out.push(byte);
                break;
            }
            out.push(byte | 0x80);
        }
    }

    /// Minimal DELTA_BINARY_PACKED writer used by the decoder tests.
    fn delta_encode(values: &[i64]) -> Vec<u8> {
        const BLOCK: usize = 128;
        const MINIBLOCKS: usize = 4;
        const PER_MINIBLOCK: usize = BLOCK / MINIBLOCKS;

        let mut out = Vec::new();
        push_varint(&mut out, BLOCK as u64);
        push_varint(&mut out, MINIBLOCKS as u64);
        push_varint(&mut out, values.len() as u64);
        push_varint(&mut out, zigzag(*values.first().unwrap_or(&0)));

        let deltas: Vec<i64> = values
            .windows(2)
            .map(|w| w[1].wrapping_sub(w[0]))
            .collect();
        for block in deltas.chunks(BLOCK) {
            let min_delta = *block.iter().min().unwrap();
            push_varint(&mut out, zigzag(min_delta));
            let adjusted: Vec<u64> = block
                .iter()
                .map(|d| d.wrapping_sub(min_delta) as u64)
                .collect();
            let mut widths = [0u8; MINIBLOCKS];
            for (i, mini) in adjusted.chunks(PER_MINIBLOCK).enumerate() {
                let max = mini.iter().copied().max().unwrap_or(0);
                widths[i] = crate::util::bit_util::num_required_bits(max);
            }
            out.extend_from_slice(&widths);
            for (i, width) in widths.iter().enumerate() {
                if *width == 0 {
                    continue;
                }
                let start = i * PER_MINIBLOCK;
                if start >= adjusted.len() {
                    // trailing miniblocks of the last block may be absent
                    continue;
                }
                let mut bit_buf: u64 = 0;
                let mut bit_count = 0;
                for j in 0..PER_MINIBLOCK {
                    let v = adjusted.get(start + j).copied().unwrap_or(0);
                    bit_buf |= v << bit_count;
                    bit_count += *width as usize;
                    while bit_count >= 8 {
                        out.push((bit_buf & 0xff) as u8);
                        bit_buf >>= 8;
                        bit_count -= 8;
                    }
                }
                if bit_count > 0 {
                    out.push((bit_buf & 0xff) as u8);
                }
            }
        }
        out
    }

    #[test]
    fn test_delta_sequential() {
        let values: Vec<i64> = (1..=1000).collect();
        let encoded = delta_encode(&values);
        let mut decoder = DeltaBitPackDecoder::<Int64Type>::new();
        decoder.set_data(encoded.into(), values.len()).unwrap();
        let mut out = vec![0i64; values.len()];
        assert_eq!(decoder.get(&mut out).unwrap(), values.len());
        assert_eq!(out, values);
        assert_eq!(decoder.values_left(), 0);
    }

    #[test]
    fn test_delta_negative_outlier() {
        let mut values: Vec<i64> = (1..=1000).collect();
        values[500] = -123_456;
        let encoded = delta_encode(&values);
        let mut decoder = DeltaBitPackDecoder::<Int64Type>::new();
        decoder.set_data(encoded.into(), values.len()).unwrap();
        let mut out = vec![0i64; values.len()];
        assert_eq!(decoder.get(&mut out).unwrap(), values.len());
        assert_eq!(out, values);
    }

    #[test]
    fn test_delta_int32_wrapping() {
        let values: Vec<i64> = vec![i32::MAX as i64, i32::MIN as i64, 0, -1];
        let encoded = delta_encode(&values);
        let mut decoder = DeltaBitPackDecoder::<Int32Type>::new();
        decoder.set_data(encoded.into(), values.len()).unwrap();
        let mut out = vec![0i32; values.len()];
        assert_eq!(decoder.get(&mut out).unwrap(), values.len());
        assert_eq!(out, vec![i32::MAX, i32::MIN, 0, -1]);
    }

    #[test]
    fn test_delta_partial_reads() {
        let values: Vec<i64> = (0..300).map(|i| i * 3).collect();
        let encoded = delta_encode(&values);
        let mut decoder = DeltaBitPackDecoder::<Int64Type>::new();
        decoder.set_data(encoded.into(), values.len()).unwrap();
        let mut out = Vec::new();
        let mut chunk = vec![0i64; 7];
        loop {
            let n = decoder.get(&mut chunk).unwrap();
            if n == 0 {
                break;
            }
            out.extend_from_slice(&chunk[..n]);
        }
        assert_eq!(out, values);
    }

    #[test]
    fn test_delta_bad_block_size() {
        // block size 100 is not a multiple of 128
        let mut bad = Vec::new();
        push_varint(&mut bad, 100);
        push_varint(&mut bad, 4);
        push_varint(&mut bad, 1);
        push_varint(&mut bad, zigzag(7));
        let mut decoder = DeltaBitPackDecoder::<Int64Type>::new();
        match decoder.set_data(bad.into(), 1) {
            Err(ParquetError::Decode(_)) => {}
            other => panic!("expected Decode, got {:?}", other),
        }
    }

    #[test]
    fn test_delta_single_value() {
        let encoded = delta_encode(&[42]);
        let mut decoder = DeltaBitPackDecoder::<Int64Type>::new();
        decoder.set_data(encoded.into(), 1).unwrap();
        let mut out = vec![0i64; 4];
        assert_eq!(decoder.get(&mut out).unwrap(), 1);
        assert_eq!(out[0], 42);
    }

    fn delta_length_encode(elements: &[&[u8]]) -> Vec<u8> {
        let lengths: Vec<i64> = elements.iter().map(|e| e.len() as i64).collect();
        let mut out = delta_encode(&lengths);
        for element in elements {
            out.extend_from_slice(element);
        }
        out
    }

    #[test]
    fn test_delta_length_byte_array() {
        let elements: Vec<&[u8]> = vec![b"hello", b"", b"parquet", b"x"];
        let encoded = delta_length_encode(&elements);
        let mut decoder = DeltaLengthByteArrayDecoder::<ByteArrayType>::new();
        decoder.set_data(encoded.into(), elements.len()).unwrap();
        let mut out = vec![ByteArray::new(); elements.len()];
        assert_eq!(decoder.get(&mut out).unwrap(), elements.len());
        for (decoded, expected) in out.iter().zip(elements) {
            assert_eq!(decoded.data(), expected);
        }
    }

    #[test]
    fn test_delta_length_truncated_payload() {
        let elements: Vec<&[u8]> = vec![b"hello", b"world"];
        let mut encoded = delta_length_encode(&elements);
        encoded.truncate(encoded.len() - 3);
        let mut decoder = DeltaLengthByteArrayDecoder::<ByteArrayType>::new();
        decoder.set_data(encoded.into(), elements.len()).unwrap();
        let mut out = vec![ByteArray::new(); elements.len()];
        match decoder.get(&mut out) {
            Err(ParquetError::ShortInput(_)) => {}
            other => panic!("expected ShortInput, got {:?}", other),
        }
    }

    fn delta_byte_array_encode(elements: &[&[u8]]) -> Vec<u8> {
        let mut prefix_lengths: Vec<i64> = Vec::new();
        let mut suffixes: Vec<Vec<u8>> = Vec::new();
        let mut previous: &[u8] = b"";
        for element in elements {
            let common = previous
                .iter()
                .zip(element.iter())
                .take_while(|(a, b)| a == b)
                .count();
            prefix_lengths.push(common as i64);
            suffixes.push(element[common..].to_vec());
            previous = element;
        }
        let mut out = delta_encode(&prefix_lengths);
        let suffix_refs: Vec<&[u8]> = suffixes.iter().map(|s| s.as_slice()).collect();
        out.extend_from_slice(&delta_length_encode(&suffix_refs));
        out
    }

    #[test]
    fn test_delta_byte_array() {
        let elements: Vec<&[u8]> = vec![b"apple", b"applesauce", b"banana", b"bandana"];
        let encoded = delta_byte_array_encode(&elements);
        let mut decoder = DeltaByteArrayDecoder::<ByteArrayType>::new();
        decoder.set_data(encoded.into(), elements.len()).unwrap();
        let mut out = vec![ByteArray::new(); elements.len()];
        assert_eq!(decoder.get(&mut out).unwrap(), elements.len());
        for (decoded, expected) in out.iter().zip(elements) {
            assert_eq!(decoded.data(), expected);
        }
    }

    #[test]
    fn test_delta_byte_array_nonzero_first_prefix_rejected() {
        // hand-build streams where the first prefix length is 3
        let mut encoded = delta_encode(&[3, 0]);
        encoded.extend_from_slice(&delta_length_encode(&[b"abc", b"de"]));
        let mut decoder = DeltaByteArrayDecoder::<ByteArrayType>::new();
        match decoder.set_data(encoded.into(), 2) {
            Err(ParquetError::Decode(_)) => {}
            other => panic!("expected Decode, got {:?}", other),
        }
    }

    #[test]
    fn test_byte_stream_split_float() {
        let values = [1.5f32, -2.25, 1000.0];
        let mut split = vec![0u8; 12];
        for (i, v) in values.iter().enumerate() {
            for (j, byte) in v.to_le_bytes().iter().enumerate() {
                split[i + j * values.len()] = *byte;
            }
        }
        let mut decoder = ByteStreamSplitDecoder::<FloatType>::new();
        decoder.set_data(split.into(), values.len()).unwrap();
        let mut out = vec![0f32; values.len()];
        assert_eq!(decoder.get(&mut out).unwrap(), values.len());
        assert_eq!(out, values);
    }

    #[test]
    fn test_byte_stream_split_double() {
        let values = [std::f64::consts::PI, f64::MIN, f64::MAX, 0.0];
        let mut split = vec![0u8; 32];
        for (i, v) in values.iter().enumerate() {
            for (j, byte) in v.to_le_bytes().iter().enumerate() {
                split[i + j * values.len()] = *byte;
            }
        }
        let mut decoder = ByteStreamSplitDecoder::<DoubleType>::new();
        decoder.set_data(split.into(), values.len()).unwrap();
        let mut out = vec![0f64; values.len()];
        assert_eq!(decoder.get(&mut out).unwrap(), values.len());
        assert_eq!(out, values);
    }

    #[test]
    fn test_byte_stream_split_ragged_length_rejected() {
        let mut decoder = ByteStreamSplitDecoder::<FloatType>::new();
        match decoder.set_data(vec![0u8; 7].into(), 2) {
            Err(ParquetError::Decode(_)) => {}
            other => panic!("expected Decode, got {:?}", other),
        }
    }

    #[test]
    fn test_dict_decoder() {
        let dictionary = vec![10i32, 20, 30, 40];
        let mut decoder = DictDecoder::<Int32Type>::new(dictionary);
        // width 2, one bit-packed group: indices 0,1,2,3,3,2,1,0
        let data: Vec<u8> = vec![2, 0x03, 0b1110_0100, 0b0001_1011];
        decoder.set_data(data.into(), 8).unwrap();
        let mut out = vec![0i32; 8];
        assert_eq!(decoder.get(&mut out).unwrap(), 8);
        assert_eq!(out, vec![10, 20, 30, 40, 40, 30, 20, 10]);
    }

    #[test]
    fn test_dict_decoder_index_out_of_bounds() {
        let dictionary = vec![10i32, 20];
        let mut decoder = DictDecoder::<Int32Type>::new(dictionary);
        // RLE run of 4 values of index 7
        let data: Vec<u8> = vec![3, 0x08, 0x07];
        decoder.set_data(data.into(), 4).unwrap();
        let mut out = vec![0i32; 4];
        match decoder.get(&mut out) {
            Err(ParquetError::Decode(_)) => {}
            other => panic!("expected Decode, got {:?}", other),
        }
    }

    #[test]
    fn test_rle_value_decoder_booleans() {
        use crate::data_type::BoolType;
        // length prefix 2, then RLE run of 5 ones at width 1
        let data: Vec<u8> = vec![2, 0, 0, 0, 0x0a, 0x01];
        let mut decoder = RleValueDecoder::<BoolType>::new();
        decoder.set_data(data.into(), 5).unwrap();
        let mut out = vec![false; 5];
        assert_eq!(decoder.get(&mut out).unwrap(), 5);
        assert_eq!(out, vec![true; 5]);
    }

    #[test]
    fn test_get_decoder_type_screening() {
        assert!(get_decoder::<FloatType>(0, Encoding::DELTA_BINARY_PACKED).is_err());
        assert!(get_decoder::<Int32Type>(0, Encoding::BYTE_STREAM_SPLIT).is_err());
        assert!(get_decoder::<Int32Type>(0, Encoding::RLE).is_err());
        assert!(get_decoder::<Int32Type>(0, Encoding::DELTA_LENGTH_BYTE_ARRAY).is_err());
        assert!(get_decoder::<ByteArrayType>(0, Encoding::DELTA_BYTE_ARRAY).is_ok());
        assert!(get_decoder::<Int32Type>(0, Encoding::PLAIN).is_ok());
        assert!(get_decoder::<Int32Type>(0, Encoding::RLE_DICTIONARY).is_err());
    }
}
