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

//! Data types that connect Parquet physical types with their Rust-native
//! representation.

use std::cmp::Ordering;
use std::fmt;
use std::mem;
use std::str::from_utf8;

use bytes::Bytes;

use crate::basic::Type;
use crate::errors::{ParquetError, Result};
use crate::util::bit_util::{from_le_slice, BitReader, FromBytes};

/// Rust representation for logical type INT96, value is backed by an array of `u32`.
/// The type only takes 12 bytes, without extra padding.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Int96 {
    value: [u32; 3],
}

impl Int96 {
    /// Creates new INT96 type struct with no data set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns underlying data as slice of [`u32`].
    pub fn data(&self) -> &[u32] {
        &self.value
    }

    /// Sets data for this INT96 type.
    pub fn set_data(&mut self, elem0: u32, elem1: u32, elem2: u32) {
        self.value = [elem0, elem1, elem2];
    }

    /// Converts this INT96 into an i64 representing the number of nanoseconds
    /// since the Unix epoch. The first 8 bytes hold nanoseconds within the
    /// Julian day stored in the last 4 bytes.
    pub fn to_nanos(&self) -> i64 {
        const JULIAN_DAY_OF_EPOCH: i64 = 2_440_588;
        const SECONDS_PER_DAY: i64 = 86_400;
        const NANOS_PER_SECOND: i64 = 1_000_000_000;

        let day = self.data()[2] as i64;
        let nanoseconds = ((self.data()[1] as i64) << 32) + self.data()[0] as i64;
        let seconds = (day - JULIAN_DAY_OF_EPOCH) * SECONDS_PER_DAY;
        seconds * NANOS_PER_SECOND + nanoseconds
    }
}

impl From<Vec<u32>> for Int96 {
    fn from(buf: Vec<u32>) -> Self {
        assert_eq!(buf.len(), 3);
        let mut result = Self::new();
        result.set_data(buf[0], buf[1], buf[2]);
        result
    }
}

impl fmt::Display for Int96 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self.data())
    }
}

/// Rust representation for BYTE_ARRAY and FIXED_LEN_BYTE_ARRAY Parquet physical types.
/// Value is backed by a byte buffer.
#[derive(Clone, Default)]
pub struct ByteArray {
    data: Option<Bytes>,
}

impl ByteArray {
    /// Creates new byte array with no data set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets length of the underlying byte buffer.
    pub fn len(&self) -> usize {
        assert!(self.data.is_some());
        self.data.as_ref().unwrap().len()
    }

    /// Checks if the underlying buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns slice of data.
    pub fn data(&self) -> &[u8] {
        self.data
            .as_ref()
            .expect("set_data should have been called")
    }

    /// Set data from another byte buffer.
    pub fn set_data(&mut self, data: Bytes) {
        self.data = Some(data);
    }

    /// Returns a view over `[start, start + len)` of this buffer, sharing the
    /// underlying allocation.
    pub fn slice(&self, start: usize, len: usize) -> Self {
        Self::from(
            self.data
                .as_ref()
                .expect("set_data should have been called")
                .slice(start..start + len),
        )
    }

    /// Interprets the content as UTF-8.
    pub fn as_utf8(&self) -> Result<&str> {
        self.data
            .as_ref()
            .map(|ptr| ptr.as_ref())
            .ok_or_else(|| decode_err!("can't convert empty byte array to utf8"))
            .and_then(|bytes| from_utf8(bytes).map_err(|e| e.into()))
    }
}

impl From<Vec<u8>> for ByteArray {
    fn from(buf: Vec<u8>) -> ByteArray {
        Self {
            data: Some(buf.into()),
        }
    }
}

impl<'a> From<&'a [u8]> for ByteArray {
    fn from(b: &'a [u8]) -> ByteArray {
        Self {
            data: Some(Bytes::copy_from_slice(b)),
        }
    }
}

impl<'a> From<&'a str> for ByteArray {
    fn from(s: &'a str) -> ByteArray {
        Self {
            data: Some(Bytes::copy_from_slice(s.as_bytes())),
        }
    }
}

impl From<Bytes> for ByteArray {
    fn from(data: Bytes) -> Self {
        Self { data: Some(data) }
    }
}

impl PartialEq for ByteArray {
    fn eq(&self, other: &ByteArray) -> bool {
        match (&self.data, &other.data) {
            (Some(d1), Some(d2)) => d1.as_ref() == d2.as_ref(),
            (None, None) => true,
            _ => false,
        }
    }
}

impl PartialOrd for ByteArray {
    fn partial_cmp(&self, other: &ByteArray) -> Option<Ordering> {
        match (&self.data, &other.data) {
            (Some(d1), Some(d2)) => d1.as_ref().partial_cmp(d2.as_ref()),
            (None, None) => Some(Ordering::Equal),
            (None, Some(_)) => Some(Ordering::Less),
            (Some(_), None) => Some(Ordering::Greater),
        }
    }
}

impl fmt::Debug for ByteArray {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ByteArray")
            .field("data", &self.data.as_ref().map(|d| d.as_ref()))
            .finish()
    }
}

impl fmt::Display for ByteArray {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.as_utf8() {
            Ok(s) => write!(f, "{}", s),
            Err(_) => write!(f, "{:?}", self.data.as_ref().map(|d| d.as_ref())),
        }
    }
}

/// Wrapper type for FIXED_LEN_BYTE_ARRAY.
///
/// A fixed length byte array is stored as a [`ByteArray`] whose length is the
/// schema-declared `type_length`; the wrapper keeps the two physical types
/// apart in generic code.
#[derive(Clone, Debug, Default, PartialEq, PartialOrd)]
pub struct FixedLenByteArray(ByteArray);

impl FixedLenByteArray {
    pub fn new() -> Self {
        Self::default()
    }
}

impl std::ops::Deref for FixedLenByteArray {
    type Target = ByteArray;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::ops::DerefMut for FixedLenByteArray {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<ByteArray> for FixedLenByteArray {
    fn from(other: ByteArray) -> Self {
        Self(other)
    }
}

impl From<Vec<u8>> for FixedLenByteArray {
    fn from(buf: Vec<u8>) -> Self {
        Self(ByteArray::from(buf))
    }
}

impl From<FixedLenByteArray> for ByteArray {
    fn from(other: FixedLenByteArray) -> Self {
        other.0
    }
}

impl fmt::Display for FixedLenByteArray {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Converts an instance of data type to a slice of bytes as `u8`.
pub trait AsBytes {
    /// Returns slice of bytes for this data type.
    fn as_bytes(&self) -> &[u8];
}

macro_rules! gen_as_bytes {
    ($source_ty:ident) => {
        impl AsBytes for $source_ty {
            #[allow(clippy::size_of_in_element_count)]
            fn as_bytes(&self) -> &[u8] {
                unsafe {
                    std::slice::from_raw_parts(
                        self as *const $source_ty as *const u8,
                        mem::size_of::<$source_ty>(),
                    )
                }
            }
        }
    };
}

gen_as_bytes!(i32);
gen_as_bytes!(i64);
gen_as_bytes!(f32);
gen_as_bytes!(f64);

impl AsBytes for bool {
    fn as_bytes(&self) -> &[u8] {
        unsafe { std::slice::from_raw_parts(self as *const bool as *const u8, 1) }
    }
}

impl AsBytes for Int96 {
    fn as_bytes(&self) -> &[u8] {
        unsafe { std::slice::from_raw_parts(self.data() as *const [u32] as *const u8, 12) }
    }
}

impl AsBytes for ByteArray {
    fn as_bytes(&self) -> &[u8] {
        self.data()
    }
}

impl AsBytes for FixedLenByteArray {
    fn as_bytes(&self) -> &[u8] {
        self.data()
    }
}

impl AsBytes for str {
    fn as_bytes(&self) -> &[u8] {
        (self as &str).as_bytes()
    }
}

impl AsBytes for [u8] {
    fn as_bytes(&self) -> &[u8] {
        self
    }
}

pub(crate) mod private {
    //! The sealed value-type trait: PLAIN decoding is defined per physical
    //! type here so that generic decoders stay free of type switches.

    use super::*;

    /// State shared by all PLAIN decoders: the page payload, the cursor into
    /// it, and (for BOOLEAN) the bit reader over the same buffer.
    #[derive(Default)]
    pub struct PlainDecoderState {
        pub(crate) data: Option<Bytes>,
        pub(crate) start: usize,
        pub(crate) num_values: usize,
        pub(crate) type_length: i32,
        pub(crate) bit_reader: Option<BitReader>,
    }

    impl PlainDecoderState {
        pub(crate) fn set_data(&mut self, data: Bytes, num_values: usize, type_length: i32) {
            self.start = 0;
            self.num_values = num_values;
            self.type_length = type_length;
            self.bit_reader = None;
            self.data = Some(data);
        }

        pub(crate) fn values_left(&self) -> usize {
            self.num_values
        }
    }

    /// A physical value type together with its PLAIN decoding rule.
    ///
    /// The `try_from_*` hooks are the seams the non-PLAIN decoders build on;
    /// each type implements only the ones its encodings use, and
    /// `get_decoder` screens encoding/type combinations before any hook can
    /// hit the rejecting default.
    pub trait ParquetValueType:
        PartialEq + fmt::Debug + fmt::Display + Default + Clone + Send
    {
        const PHYSICAL_TYPE: Type;

        /// Decodes at most `buffer.len()` PLAIN values into `buffer`,
        /// returning how many were decoded.
        fn decode_plain(buffer: &mut [Self], state: &mut PlainDecoderState) -> Result<usize>;

        /// Builds a value from a delta-decoded integer, wrapping on overflow.
        fn try_from_i64(_: i64) -> Result<Self> {
            Err(unsupported_err!(
                "integer encodings do not apply to {}",
                Self::PHYSICAL_TYPE
            ))
        }

        /// Builds a value from one RLE-decoded bit.
        fn try_from_bool(_: bool) -> Result<Self> {
            Err(unsupported_err!(
                "RLE value encoding does not apply to {}",
                Self::PHYSICAL_TYPE
            ))
        }

        /// Builds a value from a decoded byte slice.
        fn try_from_bytes(_: Bytes) -> Result<Self> {
            Err(unsupported_err!(
                "byte-array encodings do not apply to {}",
                Self::PHYSICAL_TYPE
            ))
        }

        /// Builds a value from gathered little-endian bytes.
        fn try_from_le_slice(_: &[u8]) -> Result<Self> {
            Err(unsupported_err!(
                "BYTE_STREAM_SPLIT does not apply to {}",
                Self::PHYSICAL_TYPE
            ))
        }
    }

    /// Decodes fixed-width little-endian scalars.
    fn decode_fixed_width<T: FromBytes + Default + Clone>(
        buffer: &mut [T],
        state: &mut PlainDecoderState,
    ) -> Result<usize> {
        let data = state
            .data
            .as_ref()
            .expect("set_data should have been called");
        let num_values = std::cmp::min(buffer.len(), state.num_values);
        let bytes_per_value = mem::size_of::<T>();
        let bytes_left = data.len() - state.start;
        let bytes_to_decode = bytes_per_value * num_values;
        if bytes_left < bytes_to_decode {
            return Err(short_input_err!(
                "plain data truncated: need {} bytes, have {}",
                bytes_to_decode,
                bytes_left
            ));
        }
        let raw = &data.as_ref()[state.start..state.start + bytes_to_decode];
        for (i, slot) in buffer[..num_values].iter_mut().enumerate() {
            *slot = from_le_slice(&raw[i * bytes_per_value..]);
        }
        state.start += bytes_to_decode;
        state.num_values -= num_values;
        Ok(num_values)
    }

    impl ParquetValueType for bool {
        const PHYSICAL_TYPE: Type = Type::BOOLEAN;

        fn try_from_bool(v: bool) -> Result<Self> {
            Ok(v)
        }

        fn decode_plain(buffer: &mut [Self], state: &mut PlainDecoderState) -> Result<usize> {
            if state.bit_reader.is_none() {
                let data = state
                    .data
                    .clone()
                    .expect("set_data should have been called");
                state.bit_reader = Some(BitReader::new(data.slice(state.start..)));
            }
            let bit_reader = state.bit_reader.as_mut().unwrap();
            let num_values = std::cmp::min(buffer.len(), state.num_values);
            for slot in buffer[..num_values].iter_mut() {
                *slot = bit_reader.get_value(1)? != 0;
            }
            state.num_values -= num_values;
            Ok(num_values)
        }
    }

    impl ParquetValueType for i32 {
        const PHYSICAL_TYPE: Type = Type::INT32;

        fn try_from_i64(v: i64) -> Result<Self> {
            Ok(v as i32)
        }

        fn decode_plain(buffer: &mut [Self], state: &mut PlainDecoderState) -> Result<usize> {
            decode_fixed_width(buffer, state)
        }
    }

    impl ParquetValueType for i64 {
        const PHYSICAL_TYPE: Type = Type::INT64;

        fn try_from_i64(v: i64) -> Result<Self> {
            Ok(v)
        }

        fn decode_plain(buffer: &mut [Self], state: &mut PlainDecoderState) -> Result<usize> {
            decode_fixed_width(buffer, state)
        }
    }

    impl ParquetValueType for f32 {
        const PHYSICAL_TYPE: Type = Type::FLOAT;

        fn try_from_le_slice(b: &[u8]) -> Result<Self> {
            Ok(from_le_slice(b))
        }

        fn decode_plain(buffer: &mut [Self], state: &mut PlainDecoderState) -> Result<usize> {
            decode_fixed_width(buffer, state)
        }
    }

    impl ParquetValueType for f64 {
        const PHYSICAL_TYPE: Type = Type::DOUBLE;

        fn try_from_le_slice(b: &[u8]) -> Result<Self> {
            Ok(from_le_slice(b))
        }

        fn decode_plain(buffer: &mut [Self], state: &mut PlainDecoderState) -> Result<usize> {
            decode_fixed_width(buffer, state)
        }
    }

    impl ParquetValueType for Int96 {
        const PHYSICAL_TYPE: Type = Type::INT96;

        fn decode_plain(buffer: &mut [Self], state: &mut PlainDecoderState) -> Result<usize> {
            let data = state
                .data
                .clone()
                .expect("set_data should have been called");
            let num_values = std::cmp::min(buffer.len(), state.num_values);
            let bytes_to_decode = 12 * num_values;
            if data.len() - state.start < bytes_to_decode {
                return Err(short_input_err!(
                    "plain INT96 data truncated: need {} bytes, have {}",
                    bytes_to_decode,
                    data.len() - state.start
                ));
            }
            for slot in buffer[..num_values].iter_mut() {
                let raw = &data.as_ref()[state.start..state.start + 12];
                slot.set_data(
                    from_le_slice(&raw[0..4]),
                    from_le_slice(&raw[4..8]),
                    from_le_slice(&raw[8..12]),
                );
                state.start += 12;
            }
            state.num_values -= num_values;
            Ok(num_values)
        }
    }

    impl ParquetValueType for ByteArray {
        const PHYSICAL_TYPE: Type = Type::BYTE_ARRAY;

        fn try_from_bytes(data: Bytes) -> Result<Self> {
            Ok(ByteArray::from(data))
        }

        fn decode_plain(buffer: &mut [Self], state: &mut PlainDecoderState) -> Result<usize> {
            let data = state
                .data
                .clone()
                .expect("set_data should have been called");
            let num_values = std::cmp::min(buffer.len(), state.num_values);
            for (count, slot) in buffer[..num_values].iter_mut().enumerate() {
                if data.len() - state.start < 4 {
                    // report how far we got so the caller's error names the
                    // right value index
                    return Err(short_input_err!(
                        "byte array length truncated at value {}",
                        count
                    ));
                }
                let len = read_num_bytes!(u32, 4, &data.as_ref()[state.start..]) as usize;
                state.start += 4;
                if data.len() - state.start < len {
                    return Err(short_input_err!(
                        "byte array payload truncated at value {}",
                        count
                    ));
                }
                slot.set_data(data.slice(state.start..state.start + len));
                state.start += len;
            }
            state.num_values -= num_values;
            Ok(num_values)
        }
    }

    impl ParquetValueType for FixedLenByteArray {
        const PHYSICAL_TYPE: Type = Type::FIXED_LEN_BYTE_ARRAY;

        fn try_from_bytes(data: Bytes) -> Result<Self> {
            Ok(FixedLenByteArray(ByteArray::from(data)))
        }

        fn decode_plain(buffer: &mut [Self], state: &mut PlainDecoderState) -> Result<usize> {
            let data = state
                .data
                .clone()
                .expect("set_data should have been called");
            let type_length = state.type_length as usize;
            let num_values = std::cmp::min(buffer.len(), state.num_values);
            let bytes_to_decode = type_length * num_values;
            if data.len() - state.start < bytes_to_decode {
                return Err(short_input_err!(
                    "fixed len byte array data truncated: need {} bytes, have {}",
                    bytes_to_decode,
                    data.len() - state.start
                ));
            }
            for slot in buffer[..num_values].iter_mut() {
                slot.set_data(data.slice(state.start..state.start + type_length));
                state.start += type_length;
            }
            state.num_values -= num_values;
            Ok(num_values)
        }
    }
}

/// Contains the Parquet physical type information as well as the Rust type
/// used to materialise values of that physical type.
pub trait DataType: 'static + Send {
    type T: private::ParquetValueType;

    /// Returns Parquet physical type.
    fn get_physical_type() -> Type {
        <Self::T as private::ParquetValueType>::PHYSICAL_TYPE
    }

    /// Returns size in bytes for Rust representation of the physical type.
    fn get_type_size() -> usize;

    fn get_column_reader(
        column_reader: crate::column::reader::ColumnReader,
    ) -> Option<crate::column::reader::ColumnReaderImpl<Self>>
    where
        Self: Sized;
}

macro_rules! make_type {
    ($name:ident, $reader_ident:ident, $native_ty:ty, $size:expr) => {
        #[derive(Clone)]
        pub struct $name {}

        impl DataType for $name {
            type T = $native_ty;

            fn get_type_size() -> usize {
                $size
            }

            fn get_column_reader(
                column_reader: crate::column::reader::ColumnReader,
            ) -> Option<crate::column::reader::ColumnReaderImpl<Self>> {
                match column_reader {
                    crate::column::reader::ColumnReader::$reader_ident(w) => Some(w),
                    _ => None,
                }
            }
        }
    };
}

make_type!(BoolType, BoolColumnReader, bool, 1);
make_type!(Int32Type, Int32ColumnReader, i32, 4);
make_type!(Int64Type, Int64ColumnReader, i64, 8);
make_type!(Int96Type, Int96ColumnReader, Int96, mem::size_of::<Int96>());
make_type!(FloatType, FloatColumnReader, f32, 4);
make_type!(DoubleType, DoubleColumnReader, f64, 8);
make_type!(
    ByteArrayType,
    ByteArrayColumnReader,
    ByteArray,
    mem::size_of::<ByteArray>()
);
make_type!(
    FixedLenByteArrayType,
    FixedLenByteArrayColumnReader,
    FixedLenByteArray,
    mem::size_of::<FixedLenByteArray>()
);
