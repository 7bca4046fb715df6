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

//! The serialized readers: [`FileReader`], [`RowGroupReader`] and
//! [`PageReader`] over any [`ChunkReader`], with `ChunkReader` provided for
//! files on disk (buffered) and in-memory byte buffers.

use bytes::{Buf, Bytes};
use std::{convert::TryFrom, fs::File, io::Read, path::Path, sync::Arc};

use crate::basic::{Compression, Encoding, PageType, Type};
use crate::column::page::{Page, PageReader};
use crate::compression::{create_codec, Codec};
use crate::errors::{ParquetError, Result};
use crate::file::statistics::Statistics;
use crate::file::{footer, metadata::*, reader::*};
use crate::format;
use crate::thrift::ThriftCompactReader;
use crate::util::io::{FileSource, TryClone};

// ----------------------------------------------------------------------
// Implementations of traits facilitating the creation of a new reader

impl Length for File {
    fn len(&self) -> u64 {
        self.metadata().map(|m| m.len()).unwrap_or(0u64)
    }
}

impl ChunkReader for File {
    type T = FileSource<File>;

    fn get_read(&self, start: u64, length: usize) -> Result<Self::T> {
        Ok(FileSource::new(self, start, length)?)
    }
}

impl Length for Bytes {
    fn len(&self) -> u64 {
        self.len() as u64
    }
}

impl TryClone for Bytes {
    fn try_clone(&self) -> std::io::Result<Self> {
        Ok(self.clone())
    }
}

impl ChunkReader for Bytes {
    type T = bytes::buf::Reader<Bytes>;

    fn get_read(&self, start: u64, length: usize) -> Result<Self::T> {
        let start = start as usize;
        if start > self.len() || self.len() - start < length {
            return Err(short_input_err!(
                "requested range [{}, {}) of a buffer of {} bytes",
                start,
                start + length,
                self.len()
            ));
        }
        Ok(self.slice(start..start + length).reader())
    }
}

impl TryFrom<File> for SerializedFileReader<File> {
    type Error = ParquetError;

    fn try_from(file: File) -> Result<Self> {
        Self::new(file)
    }
}

impl<'a> TryFrom<&'a Path> for SerializedFileReader<File> {
    type Error = ParquetError;

    fn try_from(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::try_from(file)
    }
}

impl TryFrom<String> for SerializedFileReader<File> {
    type Error = ParquetError;

    fn try_from(path: String) -> Result<Self> {
        Self::try_from(Path::new(&path))
    }
}

impl<'a> TryFrom<&'a str> for SerializedFileReader<File> {
    type Error = ParquetError;

    fn try_from(path: &str) -> Result<Self> {
        Self::try_from(Path::new(&path))
    }
}

// ----------------------------------------------------------------------
// Implementations of file & row group readers

/// A [`FileReader`] over any [`ChunkReader`], parsing the footer once and
/// handing out row group readers against the same source.
pub struct SerializedFileReader<R: ChunkReader> {
    chunk_reader: Arc<R>,
    metadata: ParquetMetaData,
}

/// Builds [`ReadOptions`]. Accumulated row-group predicates are ANDed
/// together when the reader applies them.
#[derive(Default)]
pub struct ReadOptionsBuilder {
    predicates: Vec<Box<dyn FnMut(&RowGroupMetaData, usize) -> bool>>,
}

impl ReadOptionsBuilder {
    /// An empty builder: no filtering.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps only row groups the predicate accepts.
    pub fn with_predicate(
        mut self,
        predicate: Box<dyn FnMut(&RowGroupMetaData, usize) -> bool>,
    ) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Keeps only row groups whose byte-range midpoint falls in
    /// `[start, end)`.
    pub fn with_range(mut self, start: i64, end: i64) -> Self {
        assert!(start < end);
        let predicate = move |rg: &RowGroupMetaData, _: usize| {
            let mid = get_midpoint_offset(rg);
            mid >= start && mid < end
        };
        self.predicates.push(Box::new(predicate));
        self
    }

    /// Finalises the options.
    pub fn build(self) -> ReadOptions {
        ReadOptions {
            predicates: self.predicates,
        }
    }
}

/// Options applied while opening a file. Row-group filtering is the only
/// knob today.
pub struct ReadOptions {
    predicates: Vec<Box<dyn FnMut(&RowGroupMetaData, usize) -> bool>>,
}

impl<R: 'static + ChunkReader> SerializedFileReader<R> {
    /// Opens the Parquet data behind `chunk_reader`, parsing its footer.
    pub fn new(chunk_reader: R) -> Result<Self> {
        let metadata = footer::parse_metadata(&chunk_reader)?;
        Ok(Self {
            chunk_reader: Arc::new(chunk_reader),
            metadata,
        })
    }

    /// Opens the file and drops every row group the `options` predicates
    /// reject.
    pub fn new_with_options(chunk_reader: R, options: ReadOptions) -> Result<Self> {
        let metadata = footer::parse_metadata(&chunk_reader)?;
        let mut predicates = options.predicates;
        let row_groups = metadata.row_groups().to_vec();
        let mut filtered_row_groups = Vec::<RowGroupMetaData>::new();
        for (i, rg_meta) in row_groups.into_iter().enumerate() {
            let mut keep = true;
            for predicate in &mut predicates {
                if !predicate(&rg_meta, i) {
                    keep = false;
                    break;
                }
            }
            if keep {
                filtered_row_groups.push(rg_meta);
            }
        }

        Ok(Self {
            chunk_reader: Arc::new(chunk_reader),
            metadata: ParquetMetaData::new(
                metadata.file_metadata().clone(),
                filtered_row_groups,
            ),
        })
    }
}

/// Midpoint of a row group's byte span, the anchor for range predicates.
fn get_midpoint_offset(meta: &RowGroupMetaData) -> i64 {
    let col = meta.column(0);
    let mut offset = col.data_page_offset();
    if let Some(dic_offset) = col.dictionary_page_offset() {
        if offset > dic_offset {
            offset = dic_offset
        }
    };
    offset + meta.compressed_size() / 2
}

impl<R: 'static + ChunkReader> FileReader for SerializedFileReader<R> {
    fn metadata(&self) -> &ParquetMetaData {
        &self.metadata
    }

    fn num_row_groups(&self) -> usize {
        self.metadata.num_row_groups()
    }

    fn get_row_group(&self, i: usize) -> Result<Box<dyn RowGroupReader + '_>> {
        let row_group_metadata = self.metadata.row_group(i);
        Ok(Box::new(SerializedRowGroupReader::new(
            Arc::clone(&self.chunk_reader),
            row_group_metadata,
        )))
    }
}

/// A [`RowGroupReader`] for one row group of an open file.
pub struct SerializedRowGroupReader<'a, R: ChunkReader> {
    chunk_reader: Arc<R>,
    metadata: &'a RowGroupMetaData,
}

impl<'a, R: ChunkReader> SerializedRowGroupReader<'a, R> {
    fn new(chunk_reader: Arc<R>, metadata: &'a RowGroupMetaData) -> Self {
        Self {
            chunk_reader,
            metadata,
        }
    }
}

impl<'a, R: 'static + ChunkReader> RowGroupReader for SerializedRowGroupReader<'a, R> {
    fn metadata(&self) -> &RowGroupMetaData {
        self.metadata
    }

    fn num_columns(&self) -> usize {
        self.metadata.num_columns()
    }

    fn get_column_page_reader(&self, i: usize) -> Result<Box<dyn PageReader>> {
        let col = self.metadata.column(i);
        let (col_start, col_length) = col.byte_range();
        let file_chunk = self.chunk_reader.get_read(col_start, col_length as usize)?;
        let page_reader = SerializedPageReader::new(
            file_chunk,
            col.num_values(),
            col.compression(),
            col.column_descr().physical_type(),
        )?;
        Ok(Box::new(page_reader))
    }
}

/// Decodes the compact-protocol page header at the stream's position.
pub(crate) fn read_page_header<T: Read>(input: &mut T) -> Result<format::PageHeader> {
    let mut prot = ThriftCompactReader::new(input);
    format::PageHeader::read_from(&mut prot)
}

/// Decodes a [`Page`] out of `payload`, which holds exactly the page's
/// `compressed_page_size` bytes.
pub(crate) fn decode_page(
    page_header: format::PageHeader,
    payload: Bytes,
    decompressor: Option<&mut Box<dyn Codec>>,
) -> Result<Page> {
    // A v2 page keeps its level streams plain ahead of the values, so only
    // the payload's tail goes through the codec; every other page kind
    // compresses the payload whole. An absent is_compressed flag counts as
    // compressed.
    let (plain_prefix, values_compressed) = match &page_header.data_page_header_v2 {
        Some(header_v2) => (
            (header_v2.repetition_levels_byte_length + header_v2.definition_levels_byte_length)
                as usize,
            header_v2.is_compressed.unwrap_or(true),
        ),
        None => (0, true),
    };

    let buffer = match decompressor {
        Some(codec) if values_compressed => {
            if plain_prefix > payload.len() {
                return Err(short_input_err!(
                    "level streams of {} bytes overrun page of {}",
                    plain_prefix,
                    payload.len()
                ));
            }
            let expected_len = page_header.uncompressed_page_size as usize;
            let mut restored = Vec::with_capacity(expected_len);
            restored.extend_from_slice(&payload.as_ref()[..plain_prefix]);
            codec.decompress(&payload.as_ref()[plain_prefix..], &mut restored)?;
            if restored.len() != expected_len {
                return Err(decode_err!(
                    "page inflated to {} bytes, header promised {}",
                    restored.len(),
                    expected_len
                ));
            }
            Bytes::from(restored)
        }
        _ => payload,
    };

    let result = match PageType::try_from(page_header.type_)? {
        PageType::DICTIONARY_PAGE => {
            let dict_header = page_header.dictionary_page_header.as_ref().ok_or_else(|| {
                metadata_err!("missing dictionary page header in a DICTIONARY_PAGE")
            })?;
            let is_sorted = dict_header.is_sorted.unwrap_or(false);
            Page::DictionaryPage {
                buf: buffer,
                num_values: dict_header.num_values as u32,
                encoding: Encoding::try_from(dict_header.encoding)?,
                is_sorted,
            }
        }
        PageType::DATA_PAGE => {
            let header = page_header
                .data_page_header
                .ok_or_else(|| metadata_err!("missing data page header in a DATA_PAGE"))?;
            Page::DataPage {
                buf: buffer,
                num_values: header.num_values as u32,
                encoding: Encoding::try_from(header.encoding)?,
                def_level_encoding: Encoding::try_from(header.definition_level_encoding)?,
                rep_level_encoding: Encoding::try_from(header.repetition_level_encoding)?,
                statistics: Statistics::from_thrift(header.statistics),
            }
        }
        PageType::DATA_PAGE_V2 => {
            let header = page_header
                .data_page_header_v2
                .ok_or_else(|| metadata_err!("missing data page header in a DATA_PAGE_V2"))?;
            let is_compressed = header.is_compressed.unwrap_or(true);
            Page::DataPageV2 {
                buf: buffer,
                num_values: header.num_values as u32,
                encoding: Encoding::try_from(header.encoding)?,
                num_nulls: header.num_nulls as u32,
                num_rows: header.num_rows as u32,
                def_levels_byte_len: header.definition_levels_byte_length as u32,
                rep_levels_byte_len: header.repetition_levels_byte_length as u32,
                is_compressed,
                statistics: Statistics::from_thrift(header.statistics),
            }
        }
        PageType::INDEX_PAGE => {
            return Err(metadata_err!("index pages are skipped before decoding"))
        }
    };

    Ok(result)
}

/// A [`PageReader`] walking the pages of one column chunk in file order,
/// decompressing each payload as it goes.
pub struct SerializedPageReader<T: Read> {
    /// A stream spanning exactly the chunk's byte range.
    buf: T,

    /// Codec from the chunk metadata; `None` for UNCOMPRESSED.
    decompressor: Option<Box<dyn Codec>>,

    /// Level slots of data pages handed out so far; the chunk is done when
    /// this reaches the metadata's total.
    seen_num_values: i64,
    total_num_values: i64,

    /// Physical type of the chunk, carried for error context.
    physical_type: Type,
}

impl<T: Read> SerializedPageReader<T> {
    /// Builds a page reader over `buf`, which must span exactly the chunk's
    /// byte range.
    pub fn new(
        buf: T,
        total_num_values: i64,
        compression: Compression,
        physical_type: Type,
    ) -> Result<Self> {
        let decompressor = create_codec(compression)?;
        Ok(Self {
            buf,
            total_num_values,
            seen_num_values: 0,
            decompressor,
            physical_type,
        })
    }
}

impl<T: Read + Send> Iterator for SerializedPageReader<T> {
    type Item = Result<Page>;

    fn next(&mut self) -> Option<Self::Item> {
        self.get_next_page().transpose()
    }
}

impl<T: Read + Send> PageReader for SerializedPageReader<T> {
    fn get_next_page(&mut self) -> Result<Option<Page>> {
        loop {
            if self.seen_num_values >= self.total_num_values {
                return Ok(None);
            }

            let page_header = read_page_header(&mut self.buf)?;
            if page_header.compressed_page_size < 0 {
                return Err(metadata_err!(
                    "negative compressed page size {} in {} column chunk",
                    page_header.compressed_page_size,
                    self.physical_type
                ));
            }

            // Take the declared payload off the stream before looking at the
            // page at all: a page this reader skips, or one whose content
            // turns out malformed, must still account for its full size or
            // every later header would be read from the wrong position.
            let payload_len = page_header.compressed_page_size as usize;
            let mut payload = vec![0u8; payload_len];
            self.buf.read_exact(&mut payload)?;

            let page_type = PageType::try_from(page_header.type_)?;
            if page_type == PageType::INDEX_PAGE {
                // parsed for its size only; this crate does not use page
                // indexes
                continue;
            }

            let page = decode_page(page_header, payload.into(), self.decompressor.as_mut())?;
            if page_type != PageType::DICTIONARY_PAGE {
                self.seen_num_values += page.num_values() as i64;
            }
            return Ok(Some(page));
        }
    }
}
