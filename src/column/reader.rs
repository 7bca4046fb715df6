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

//! Contains column reader API.

use std::collections::HashMap;

use bytes::Bytes;

use super::page::{Page, PageReader};
use crate::basic::Encoding;
use crate::data_type::*;
use crate::encodings::decoding::{get_decoder, Decoder, DictDecoder, PlainDecoder};
use crate::encodings::levels::LevelDecoder;
use crate::errors::{ParquetError, Result};
use crate::file::reader::RowGroupReader;
use crate::schema::types::ColumnDescPtr;

/// One [`ColumnReaderImpl`] per physical type, chosen at runtime from the
/// column's metadata.
pub enum ColumnReader {
    BoolColumnReader(ColumnReaderImpl<BoolType>),
    Int32ColumnReader(ColumnReaderImpl<Int32Type>),
    Int64ColumnReader(ColumnReaderImpl<Int64Type>),
    Int96ColumnReader(ColumnReaderImpl<Int96Type>),
    FloatColumnReader(ColumnReaderImpl<FloatType>),
    DoubleColumnReader(ColumnReaderImpl<DoubleType>),
    ByteArrayColumnReader(ColumnReaderImpl<ByteArrayType>),
    FixedLenByteArrayColumnReader(ColumnReaderImpl<FixedLenByteArrayType>),
}

/// Wraps a page stream in the [`ColumnReader`] variant matching the
/// descriptor's physical type, for callers that only hold runtime metadata.
pub fn get_column_reader(
    col_descr: ColumnDescPtr,
    col_page_reader: Box<dyn PageReader>,
) -> ColumnReader {
    use crate::basic::Type as Physical;
    match col_descr.physical_type() {
        Physical::BOOLEAN => {
            ColumnReader::BoolColumnReader(ColumnReaderImpl::new(col_descr, col_page_reader))
        }
        Physical::INT32 => {
            ColumnReader::Int32ColumnReader(ColumnReaderImpl::new(col_descr, col_page_reader))
        }
        Physical::INT64 => {
            ColumnReader::Int64ColumnReader(ColumnReaderImpl::new(col_descr, col_page_reader))
        }
        Physical::INT96 => {
            ColumnReader::Int96ColumnReader(ColumnReaderImpl::new(col_descr, col_page_reader))
        }
        Physical::FLOAT => {
            ColumnReader::FloatColumnReader(ColumnReaderImpl::new(col_descr, col_page_reader))
        }
        Physical::DOUBLE => {
            ColumnReader::DoubleColumnReader(ColumnReaderImpl::new(col_descr, col_page_reader))
        }
        Physical::BYTE_ARRAY => {
            ColumnReader::ByteArrayColumnReader(ColumnReaderImpl::new(col_descr, col_page_reader))
        }
        Physical::FIXED_LEN_BYTE_ARRAY => ColumnReader::FixedLenByteArrayColumnReader(
            ColumnReaderImpl::new(col_descr, col_page_reader),
        ),
    }
}

/// Unwraps a [`ColumnReader`] into the typed reader for `T`.
///
/// Panics when the variant was built for another physical type; the
/// whole-chunk helpers below offer the checked route.
pub fn get_typed_column_reader<T: DataType>(col_reader: ColumnReader) -> ColumnReaderImpl<T> {
    T::get_column_reader(col_reader).unwrap_or_else(|| {
        panic!(
            "Failed to convert column reader into a typed column reader for `{}` type",
            T::get_physical_type()
        )
    })
}

/// Reads one primitive column chunk's values as `T`.
///
/// Pulls pages from a [`PageReader`] one at a time; for each open page it
/// holds the decoded level streams and a value decoder bound to the page's
/// encoding. Value decoders are cached per encoding across pages, and the
/// dictionary (once seen) lives inside the cached dictionary decoder.
pub struct ColumnReaderImpl<T: DataType> {
    descr: ColumnDescPtr,

    page_reader: Box<dyn PageReader>,

    /// Level slots the open page declares.
    page_value_count: u32,

    /// Level slots of the open page already handed to the caller.
    page_values_decoded: u32,

    /// Levels of the open page, present iff the column can be repeated or
    /// null.
    rep_decoder: Option<LevelDecoder>,
    def_decoder: Option<LevelDecoder>,

    /// Encoding of the open page's value stream, keying into `decoders`.
    current_encoding: Option<Encoding>,

    decoders: HashMap<Encoding, Box<dyn Decoder<T>>>,
}

impl<T: DataType> ColumnReaderImpl<T> {
    /// Builds a reader over one column chunk's page stream.
    pub fn new(descr: ColumnDescPtr, page_reader: Box<dyn PageReader>) -> Self {
        Self {
            descr,
            page_reader,
            page_value_count: 0,
            page_values_decoded: 0,
            rep_decoder: None,
            def_decoder: None,
            current_encoding: None,
            decoders: HashMap::new(),
        }
    }

    /// Decodes up to `batch_size` level slots of the chunk, with their
    /// non-null values.
    ///
    /// Each pass over the loop works one span of the open page: definition
    /// levels first (they say how many slots of the span actually hold a
    /// value), repetition levels alongside, then exactly the non-null count
    /// from the value stream. For a column that is neither optional nor
    /// repeated there are no level streams and the span is all values.
    ///
    /// Omitting a level buffer skips that stream entirely. That is only
    /// sound when the schema says the stream does not exist; for a nullable
    /// column it leaves the value stream out of step with the slots, which
    /// the stall check below surfaces as an error rather than a hang.
    ///
    /// Returns `(values decoded, level slots decoded)`; `(0, 0)` once the
    /// chunk is exhausted.
    #[inline]
    pub fn read_batch(
        &mut self,
        batch_size: usize,
        mut def_levels: Option<&mut [i16]>,
        mut rep_levels: Option<&mut [i16]>,
        values: &mut [T::T],
    ) -> Result<(usize, usize)> {
        // every provided buffer caps the batch
        let mut target = std::cmp::min(batch_size, values.len());
        if let Some(buffer) = &def_levels {
            target = std::cmp::min(target, buffer.len());
        }
        if let Some(buffer) = &rep_levels {
            target = std::cmp::min(target, buffer.len());
        }

        let mut values_done = 0;
        let mut levels_done = 0;
        while std::cmp::max(values_done, levels_done) < target {
            if !self.advance_page()? {
                break;
            }

            let span = [
                (self.page_value_count - self.page_values_decoded) as usize,
                target - values_done,
                target - levels_done,
            ]
            .into_iter()
            .min()
            .unwrap();

            let (defs, nulls) = match def_levels.as_mut() {
                Some(buffer) if self.descr.max_def_level() > 0 => {
                    let out = &mut buffer[levels_done..levels_done + span];
                    let decoded = self
                        .def_decoder
                        .as_mut()
                        .expect("opening the page set the definition decoder")
                        .get_batch(out)?;
                    let max_def_level = self.descr.max_def_level();
                    let nulls = out[..decoded]
                        .iter()
                        .filter(|&&level| level != max_def_level)
                        .count();
                    (decoded, nulls)
                }
                _ => (0, 0),
            };

            let reps = match rep_levels.as_mut() {
                Some(buffer) if self.descr.max_rep_level() > 0 => self
                    .rep_decoder
                    .as_mut()
                    .expect("opening the page set the repetition decoder")
                    .get_batch(&mut buffer[levels_done..levels_done + span])?,
                _ => 0,
            };
            // when both streams exist they describe the same slots
            if defs != 0 && reps != 0 && defs != reps {
                return Err(decode_err!(
                    "definition and repetition streams disagree: {} vs {} levels",
                    defs,
                    reps
                ));
            }

            let encoding = self
                .current_encoding
                .expect("opening the page set the value encoding");
            let decoder = self
                .decoders
                .get_mut(&encoding)
                .expect("opening the page bound the value decoder");
            let wanted = span - nulls;
            let got = decoder.get(&mut values[values_done..values_done + wanted])?;
            if defs != 0 && got != defs - nulls {
                return Err(decode_err!(
                    "value stream produced {} values for {} non-null slots",
                    got,
                    defs - nulls
                ));
            }

            let step = std::cmp::max(defs, reps);
            if step == 0 && got == 0 {
                // a page still claiming slots yielded neither levels nor
                // values: the streams are inconsistent
                return Err(decode_err!(
                    "page declared {} slots but decoding stalled at {}",
                    self.page_value_count,
                    self.page_values_decoded
                ));
            }
            self.page_values_decoded += std::cmp::max(step, got) as u32;
            levels_done += step;
            values_done += got;
        }

        Ok((values_done, levels_done))
    }

    /// Makes sure a page with undecoded slots is open, pulling dictionary
    /// and data pages off the stream as needed. Pages that declare zero
    /// slots are drained over. Returns `false` once the chunk has no pages
    /// left.
    fn advance_page(&mut self) -> Result<bool> {
        while self.page_value_count == self.page_values_decoded {
            match self.page_reader.get_next_page()? {
                None => return Ok(false),
                Some(Page::DictionaryPage {
                    buf,
                    num_values,
                    encoding,
                    ..
                }) => self.install_dictionary(buf, num_values, encoding)?,
                Some(Page::DataPage {
                    buf,
                    num_values,
                    encoding,
                    def_level_encoding,
                    rep_level_encoding,
                    ..
                }) => self.open_v1_page(
                    buf,
                    num_values,
                    encoding,
                    def_level_encoding,
                    rep_level_encoding,
                )?,
                Some(Page::DataPageV2 {
                    buf,
                    num_values,
                    encoding,
                    num_nulls,
                    def_levels_byte_len,
                    rep_levels_byte_len,
                    ..
                }) => self.open_v2_page(
                    buf,
                    num_values,
                    num_nulls,
                    encoding,
                    def_levels_byte_len,
                    rep_levels_byte_len,
                )?,
            }
        }
        Ok(true)
    }

    /// Opens a v1 data page. The payload is, in order: repetition levels,
    /// definition levels, values; the level streams carry no length marker,
    /// so each one's extent comes out of its own decode.
    fn open_v1_page(
        &mut self,
        buf: Bytes,
        num_values: u32,
        encoding: Encoding,
        def_level_encoding: Encoding,
        rep_level_encoding: Encoding,
    ) -> Result<()> {
        let mut rest = buf;

        self.rep_decoder = None;
        self.def_decoder = None;
        if self.descr.max_rep_level() > 0 {
            let (span, decoder) = LevelDecoder::v1(
                rep_level_encoding,
                self.descr.max_rep_level(),
                num_values as usize,
                rest.clone(),
            )?;
            rest = rest.slice(span..);
            self.rep_decoder = Some(decoder);
        }
        if self.descr.max_def_level() > 0 {
            let (span, decoder) = LevelDecoder::v1(
                def_level_encoding,
                self.descr.max_def_level(),
                num_values as usize,
                rest.clone(),
            )?;
            rest = rest.slice(span..);
            self.def_decoder = Some(decoder);
        }

        self.bind_value_decoder(encoding, rest, num_values as usize, None)?;
        self.page_value_count = num_values;
        self.page_values_decoded = 0;
        Ok(())
    }

    /// Opens a v2 data page. Both level streams sit uncompressed ahead of
    /// the values, bounded by the byte lengths from the page header, and are
    /// always the length-prefixed RLE form; the header also states the null
    /// count, so the value decoder can be sized to the non-null slots.
    fn open_v2_page(
        &mut self,
        buf: Bytes,
        num_values: u32,
        num_nulls: u32,
        encoding: Encoding,
        def_levels_byte_len: u32,
        rep_levels_byte_len: u32,
    ) -> Result<()> {
        if num_nulls > num_values {
            return Err(decode_err!(
                "page counts {} nulls among {} slots",
                num_nulls,
                num_values
            ));
        }
        let rep_len = rep_levels_byte_len as usize;
        let def_len = def_levels_byte_len as usize;
        if rep_len + def_len > buf.len() {
            return Err(short_input_err!(
                "level streams of {} bytes overrun page of {}",
                rep_len + def_len,
                buf.len()
            ));
        }

        self.rep_decoder = match self.descr.max_rep_level() {
            0 => None,
            max_rep_level => Some(LevelDecoder::v2(
                max_rep_level,
                num_values as usize,
                buf.slice(..rep_len),
            )?),
        };
        self.def_decoder = match self.descr.max_def_level() {
            0 => None,
            max_def_level => Some(LevelDecoder::v2(
                max_def_level,
                num_values as usize,
                buf.slice(rep_len..rep_len + def_len),
            )?),
        };

        self.bind_value_decoder(
            encoding,
            buf.slice(rep_len + def_len..),
            num_values as usize,
            Some((num_values - num_nulls) as usize),
        )?;
        self.page_value_count = num_values;
        self.page_values_decoded = 0;
        Ok(())
    }

    /// Points the reader at the page's value stream: picks the decoder for
    /// its encoding out of the cache (building it on first use) and hands it
    /// the stream bytes. Dictionary-encoded pages are only legal once a
    /// dictionary page has populated the cache.
    fn bind_value_decoder(
        &mut self,
        mut encoding: Encoding,
        data: Bytes,
        num_values: usize,
        num_non_null: Option<usize>,
    ) -> Result<()> {
        if encoding == Encoding::PLAIN_DICTIONARY {
            encoding = Encoding::RLE_DICTIONARY;
        }

        if encoding == Encoding::RLE_DICTIONARY {
            if !self.decoders.contains_key(&encoding) {
                return Err(ParquetError::MissingDictionary(format!(
                    "page uses {} but no dictionary page preceded it",
                    encoding
                )));
            }
        } else if let std::collections::hash_map::Entry::Vacant(entry) =
            self.decoders.entry(encoding)
        {
            entry.insert(get_decoder::<T>(self.descr.type_length(), encoding)?);
        }

        let decoder = self.decoders.get_mut(&encoding).unwrap();
        decoder.set_data(data, num_non_null.unwrap_or(num_values))?;
        self.current_encoding = Some(encoding);
        Ok(())
    }

    /// Decodes a PLAIN dictionary page and installs the dictionary decoder.
    fn install_dictionary(
        &mut self,
        buf: Bytes,
        num_values: u32,
        encoding: Encoding,
    ) -> Result<()> {
        if self.decoders.contains_key(&Encoding::RLE_DICTIONARY) {
            return Err(ParquetError::DuplicateDictionary(
                "a dictionary page was already read for this column chunk".to_owned(),
            ));
        }
        // The dictionary values themselves are always PLAIN; writers label the
        // page either PLAIN or the legacy PLAIN_DICTIONARY.
        if !matches!(encoding, Encoding::PLAIN | Encoding::PLAIN_DICTIONARY) {
            return Err(unsupported_err!(
                "unsupported dictionary page encoding {}",
                encoding
            ));
        }

        let mut plain = PlainDecoder::<T>::new(self.descr.type_length());
        plain.set_data(buf, num_values as usize)?;
        let mut dictionary = vec![T::T::default(); num_values as usize];
        let decoded = plain.get(&mut dictionary)?;
        if decoded != num_values as usize {
            return Err(short_input_err!(
                "dictionary page declared {} values, decoded {}",
                num_values,
                decoded
            ));
        }

        self.decoders.insert(
            Encoding::RLE_DICTIONARY,
            Box::new(DictDecoder::<T>::new(dictionary)),
        );
        Ok(())
    }
}

// ----------------------------------------------------------------------
// Whole-chunk helpers

/// Batch size used by the whole-chunk read helpers.
const READ_BATCH_SIZE: usize = 1024;

/// A fully materialised column chunk: dense non-null values plus the level
/// arrays needed to reconstruct nullability and nesting.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedColumn<V> {
    /// Non-null values, in order.
    pub values: Vec<V>,
    /// One definition level per value slot, present when the column's max
    /// definition level is greater than zero.
    pub def_levels: Option<Vec<i16>>,
    /// One repetition level per value slot, present when the column's max
    /// repetition level is greater than zero.
    pub rep_levels: Option<Vec<i16>>,
}

impl<V> TypedColumn<V> {
    /// Number of value slots (levels when present, else values).
    pub fn num_levels(&self) -> usize {
        match &self.def_levels {
            Some(levels) => levels.len(),
            None => self.values.len(),
        }
    }
}

/// Reads the whole column chunk at `column_index` as dense values together
/// with its definition and repetition level arrays.
pub fn read_column_with_levels<T: DataType>(
    row_group: &dyn RowGroupReader,
    column_index: usize,
) -> Result<TypedColumn<T::T>> {
    let meta = row_group.metadata().column(column_index);
    let descr = meta.column_descr_ptr();
    let column = descr.path().string();
    read_column_inner::<T>(row_group, column_index).map_err(|e| e.with_column_context(&column))
}

fn read_column_inner<T: DataType>(
    row_group: &dyn RowGroupReader,
    column_index: usize,
) -> Result<TypedColumn<T::T>> {
    let meta = row_group.metadata().column(column_index);
    let descr = meta.column_descr_ptr();

    if descr.physical_type() != T::get_physical_type() {
        return Err(type_mismatch_err!(
            "column has physical type {}, requested {}",
            descr.physical_type(),
            T::get_physical_type()
        ));
    }

    let total_values = meta.num_values() as usize;
    let max_def_level = descr.max_def_level();
    let max_rep_level = descr.max_rep_level();

    let page_reader = row_group.get_column_page_reader(column_index)?;
    let mut reader = ColumnReaderImpl::<T>::new(descr, page_reader);

    let mut values = vec![T::T::default(); total_values];
    let mut def_levels = (max_def_level > 0).then(|| vec![0i16; total_values]);
    let mut rep_levels = (max_rep_level > 0).then(|| vec![0i16; total_values]);

    let mut values_read = 0;
    let mut levels_read = 0;
    loop {
        let (batch_values, batch_levels) = reader.read_batch(
            READ_BATCH_SIZE,
            def_levels.as_mut().map(|levels| &mut levels[levels_read..]),
            rep_levels.as_mut().map(|levels| &mut levels[levels_read..]),
            &mut values[values_read..],
        )?;
        if batch_values == 0 && batch_levels == 0 {
            break;
        }
        values_read += batch_values;
        levels_read += batch_levels;
    }

    values.truncate(values_read);
    if let Some(levels) = def_levels.as_mut() {
        levels.truncate(levels_read);
    }
    if let Some(levels) = rep_levels.as_mut() {
        levels.truncate(levels_read);
    }

    Ok(TypedColumn {
        values,
        def_levels,
        rep_levels,
    })
}

/// Reads the whole column chunk at `column_index` as a dense value vector.
///
/// Fails with a type mismatch if the column actually contains nulls; those
/// columns read through [`read_optional_column`] or
/// [`read_column_with_levels`].
pub fn read_column<T: DataType>(
    row_group: &dyn RowGroupReader,
    column_index: usize,
) -> Result<Vec<T::T>> {
    let column = read_column_with_levels::<T>(row_group, column_index)?;
    if let Some(def_levels) = &column.def_levels {
        if column.values.len() != def_levels.len() {
            let path = row_group
                .metadata()
                .column(column_index)
                .column_descr_ptr()
                .path()
                .string();
            return Err(type_mismatch_err!(
                "column '{}' contains nulls; read it as optional",
                path
            ));
        }
    }
    Ok(column.values)
}

/// Reads the whole column chunk at `column_index` with nulls interleaved:
/// one entry per definition level, `Some` where the leaf value is present.
pub fn read_optional_column<T: DataType>(
    row_group: &dyn RowGroupReader,
    column_index: usize,
) -> Result<Vec<Option<T::T>>> {
    let meta = row_group.metadata().column(column_index);
    let max_def_level = meta.column_descr_ptr().max_def_level();
    let column = read_column_with_levels::<T>(row_group, column_index)?;
    match column.def_levels {
        None => Ok(column.values.into_iter().map(Some).collect()),
        Some(def_levels) => {
            let mut out = Vec::with_capacity(def_levels.len());
            let mut values = column.values.into_iter();
            for def_level in def_levels {
                if def_level == max_def_level {
                    let value = values.next().ok_or_else(|| {
                        decode_err!("definition levels promise more values than decoded")
                    })?;
                    out.push(Some(value));
                } else {
                    out.push(None);
                }
            }
            Ok(out)
        }
    }
}
