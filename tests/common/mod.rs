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

//! A minimal reference writer used to build Parquet files for the reader
//! tests: a Compact Protocol output, encoders for the tested encodings, page
//! builders and whole-file assembly.

#![allow(dead_code)]

use std::io::Write;

// Physical type ids
pub const BOOLEAN: i32 = 0;
pub const INT32: i32 = 1;
pub const INT64: i32 = 2;
pub const INT96: i32 = 3;
pub const FLOAT: i32 = 4;
pub const DOUBLE: i32 = 5;
pub const BYTE_ARRAY: i32 = 6;
pub const FIXED_LEN_BYTE_ARRAY: i32 = 7;

// Repetition ids
pub const REQUIRED: i32 = 0;
pub const OPTIONAL: i32 = 1;
pub const REPEATED: i32 = 2;

// Encoding ids
pub const PLAIN: i32 = 0;
pub const PLAIN_DICTIONARY: i32 = 2;
pub const RLE: i32 = 3;
pub const DELTA_BINARY_PACKED: i32 = 5;
pub const DELTA_LENGTH_BYTE_ARRAY: i32 = 6;
pub const DELTA_BYTE_ARRAY: i32 = 7;
pub const RLE_DICTIONARY: i32 = 8;
pub const BYTE_STREAM_SPLIT: i32 = 9;

// Codec ids
pub const UNCOMPRESSED: i32 = 0;
pub const SNAPPY: i32 = 1;
pub const GZIP: i32 = 2;
pub const LZ4_HADOOP: i32 = 5;
pub const ZSTD: i32 = 6;
pub const LZ4_RAW: i32 = 7;

// ----------------------------------------------------------------------
// Thrift Compact Protocol output

const TYPE_BOOL_TRUE: u8 = 1;
const TYPE_BOOL_FALSE: u8 = 2;
const TYPE_I32: u8 = 5;
const TYPE_I64: u8 = 6;
const TYPE_BINARY: u8 = 8;
const TYPE_LIST: u8 = 9;
const TYPE_STRUCT: u8 = 12;

pub struct ThriftWriter {
    out: Vec<u8>,
    last_field_id: i16,
    stack: Vec<i16>,
}

impl ThriftWriter {
    pub fn new() -> Self {
        Self {
            out: Vec::new(),
            last_field_id: 0,
            stack: Vec::new(),
        }
    }

    pub fn finish(self) -> Vec<u8> {
        assert!(self.stack.is_empty(), "unbalanced struct nesting");
        self.out
    }

    fn write_varint(&mut self, mut v: u64) {
        loop {
            let byte = (v & 0x7f) as u8;
            v >>= 7;
            if v == 0 {
                self.out.push(byte);
                return;
            }
            self.out.push(byte | 0x80);
        }
    }

    fn write_zigzag(&mut self, v: i64) {
        self.write_varint(((v << 1) ^ (v >> 63)) as u64);
    }

    fn field_header(&mut self, field_id: i16, type_byte: u8) {
        let delta = field_id - self.last_field_id;
        if (1..=15).contains(&delta) {
            self.out.push(((delta as u8) << 4) | type_byte);
        } else {
            self.out.push(type_byte);
            self.write_zigzag(field_id as i64);
        }
        self.last_field_id = field_id;
    }

    pub fn i32_field(&mut self, field_id: i16, v: i32) {
        self.field_header(field_id, TYPE_I32);
        self.write_zigzag(v as i64);
    }

    pub fn i64_field(&mut self, field_id: i16, v: i64) {
        self.field_header(field_id, TYPE_I64);
        self.write_zigzag(v);
    }

    pub fn bool_field(&mut self, field_id: i16, v: bool) {
        let type_byte = if v { TYPE_BOOL_TRUE } else { TYPE_BOOL_FALSE };
        self.field_header(field_id, type_byte);
    }

    pub fn binary_field(&mut self, field_id: i16, v: &[u8]) {
        self.field_header(field_id, TYPE_BINARY);
        self.write_varint(v.len() as u64);
        self.out.extend_from_slice(v);
    }

    pub fn struct_field_begin(&mut self, field_id: i16) {
        self.field_header(field_id, TYPE_STRUCT);
        self.stack.push(self.last_field_id);
        self.last_field_id = 0;
    }

    pub fn struct_end(&mut self) {
        self.out.push(0x00);
        self.last_field_id = self.stack.pop().expect("struct_end without begin");
    }

    /// Opens a list field of structs; call the element serializer `len` times.
    pub fn struct_list_field_begin(&mut self, field_id: i16, len: usize) {
        self.field_header(field_id, TYPE_LIST);
        self.list_header(TYPE_STRUCT, len);
    }

    /// Starts one element of a struct list.
    pub fn list_struct_begin(&mut self) {
        self.stack.push(self.last_field_id);
        self.last_field_id = 0;
    }

    pub fn list_struct_end(&mut self) {
        self.out.push(0x00);
        self.last_field_id = self.stack.pop().expect("list_struct_end without begin");
    }

    pub fn i32_list_field(&mut self, field_id: i16, values: &[i32]) {
        self.field_header(field_id, TYPE_LIST);
        self.list_header(TYPE_I32, values.len());
        for v in values {
            self.write_zigzag(*v as i64);
        }
    }

    pub fn binary_list_field(&mut self, field_id: i16, values: &[Vec<u8>]) {
        self.field_header(field_id, TYPE_LIST);
        self.list_header(TYPE_BINARY, values.len());
        for v in values {
            self.write_varint(v.len() as u64);
            self.out.extend_from_slice(v);
        }
    }

    fn list_header(&mut self, element_type: u8, len: usize) {
        if len < 15 {
            self.out.push(((len as u8) << 4) | element_type);
        } else {
            self.out.push(0xf0 | element_type);
            self.write_varint(len as u64);
        }
    }
}

// ----------------------------------------------------------------------
// Value encoders

pub fn plain_i32(values: &[i32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

pub fn plain_i64(values: &[i64]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

pub fn plain_f32(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

pub fn plain_f64(values: &[f64]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

pub fn plain_bool(values: &[bool]) -> Vec<u8> {
    let mut out = vec![0u8; (values.len() + 7) / 8];
    for (i, v) in values.iter().enumerate() {
        if *v {
            out[i / 8] |= 1 << (i % 8);
        }
    }
    out
}

pub fn plain_byte_array(values: &[&[u8]]) -> Vec<u8> {
    let mut out = Vec::new();
    for v in values {
        out.extend_from_slice(&(v.len() as u32).to_le_bytes());
        out.extend_from_slice(v);
    }
    out
}

pub fn plain_fixed(values: &[&[u8]]) -> Vec<u8> {
    values.iter().flat_map(|v| v.iter().copied()).collect()
}

pub fn plain_int96(values: &[[u32; 3]]) -> Vec<u8> {
    values
        .iter()
        .flat_map(|v| v.iter().flat_map(|w| w.to_le_bytes()))
        .collect()
}

fn push_varint(out: &mut Vec<u8>, mut v: u64) {
    loop {
        let byte = (v & 0x7f) as u8;
        v >>= 7;
        if v == 0 {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}

/// RLE/bit-packed hybrid from plain RLE runs at the given width.
pub fn rle_hybrid(values: &[u64], bit_width: u8) -> Vec<u8> {
    let value_bytes = ((bit_width as usize) + 7) / 8;
    let mut out = Vec::new();
    let mut i = 0;
    while i < values.len() {
        let mut run = 1;
        while i + run < values.len() && values[i + run] == values[i] {
            run += 1;
        }
        push_varint(&mut out, (run as u64) << 1);
        for b in 0..value_bytes {
            out.push(((values[i] >> (b * 8)) & 0xff) as u8);
        }
        i += run;
    }
    out
}

pub fn level_bit_width(max_level: i16) -> u8 {
    (16 - (max_level as u16).leading_zeros()) as u8
}

/// v1 level stream: a bare RLE hybrid run with no length marker.
pub fn levels_v1(levels: &[i16], max_level: i16) -> Vec<u8> {
    let values: Vec<u64> = levels.iter().map(|l| *l as u64).collect();
    rle_hybrid(&values, level_bit_width(max_level))
}

/// v2 level stream: a 4-byte little-endian byte length, then the hybrid run.
pub fn levels_v2(levels: &[i16], max_level: i16) -> Vec<u8> {
    let body = levels_v1(levels, max_level);
    let mut out = (body.len() as u32).to_le_bytes().to_vec();
    out.extend_from_slice(&body);
    out
}

/// Dictionary index stream: leading bit-width byte plus the hybrid stream.
pub fn dict_indices(indices: &[u64], bit_width: u8) -> Vec<u8> {
    let mut out = vec![bit_width];
    out.extend_from_slice(&rle_hybrid(indices, bit_width));
    out
}

/// RLE-encoded boolean values: 4-byte length prefix plus hybrid at width 1.
pub fn rle_bool_values(values: &[bool]) -> Vec<u8> {
    let bits: Vec<u64> = values.iter().map(|v| *v as u64).collect();
    let body = rle_hybrid(&bits, 1);
    let mut out = (body.len() as u32).to_le_bytes().to_vec();
    out.extend_from_slice(&body);
    out
}

fn zigzag(v: i64) -> u64 {
    ((v << 1) ^ (v >> 63)) as u64
}

/// DELTA_BINARY_PACKED with block size 128 over 4 miniblocks.
pub fn delta_encode(values: &[i64]) -> Vec<u8> {
    const BLOCK: usize = 128;
    const MINIBLOCKS: usize = 4;
    const PER_MINIBLOCK: usize = BLOCK / MINIBLOCKS;

    let mut out = Vec::new();
    push_varint(&mut out, BLOCK as u64);
    push_varint(&mut out, MINIBLOCKS as u64);
    push_varint(&mut out, values.len() as u64);
    push_varint(&mut out, zigzag(*values.first().unwrap_or(&0)));

    let deltas: Vec<i64> = values.windows(2).map(|w| w[1].wrapping_sub(w[0])).collect();
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
            widths[i] = (64 - max.leading_zeros()) as u8;
        }
        out.extend_from_slice(&widths);
        for (i, width) in widths.iter().enumerate() {
            if *width == 0 || i * PER_MINIBLOCK >= adjusted.len() {
                continue;
            }
            let start = i * PER_MINIBLOCK;
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

pub fn delta_length_encode(elements: &[&[u8]]) -> Vec<u8> {
    let lengths: Vec<i64> = elements.iter().map(|e| e.len() as i64).collect();
    let mut out = delta_encode(&lengths);
    for element in elements {
        out.extend_from_slice(element);
    }
    out
}

pub fn delta_byte_array_encode(elements: &[&[u8]]) -> Vec<u8> {
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

pub fn byte_stream_split_f32(values: &[f32]) -> Vec<u8> {
    let mut out = vec![0u8; values.len() * 4];
    for (i, v) in values.iter().enumerate() {
        for (j, byte) in v.to_le_bytes().iter().enumerate() {
            out[i + j * values.len()] = *byte;
        }
    }
    out
}

pub fn byte_stream_split_f64(values: &[f64]) -> Vec<u8> {
    let mut out = vec![0u8; values.len() * 8];
    for (i, v) in values.iter().enumerate() {
        for (j, byte) in v.to_le_bytes().iter().enumerate() {
            out[i + j * values.len()] = *byte;
        }
    }
    out
}

// ----------------------------------------------------------------------
// Compression

/// A literal-only raw LZ4 block: valid output of any compliant compressor.
fn lz4_literal_block(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    let len = data.len();
    if len < 15 {
        out.push((len as u8) << 4);
    } else {
        out.push(0xf0);
        let mut rest = len - 15;
        while rest >= 255 {
            out.push(255);
            rest -= 255;
        }
        out.push(rest as u8);
    }
    out.extend_from_slice(data);
    out
}

pub fn compress(codec: i32, data: &[u8]) -> Vec<u8> {
    match codec {
        UNCOMPRESSED => data.to_vec(),
        SNAPPY => snap::raw::Encoder::new().compress_vec(data).unwrap(),
        GZIP => {
            let mut encoder =
                flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
            encoder.write_all(data).unwrap();
            encoder.finish().unwrap()
        }
        ZSTD => zstd::encode_all(data, 1).unwrap(),
        LZ4_RAW => lz4_literal_block(data),
        LZ4_HADOOP => {
            let block = lz4_literal_block(data);
            let mut out = (data.len() as u32).to_be_bytes().to_vec();
            out.extend_from_slice(&(block.len() as u32).to_be_bytes());
            out.extend_from_slice(&block);
            out
        }
        other => panic!("no test compressor for codec {}", other),
    }
}

// ----------------------------------------------------------------------
// Pages and chunks

pub struct ChunkBuilder {
    codec: i32,
    bytes: Vec<u8>,
    num_values: i64,
    encodings: Vec<i32>,
    dictionary_byte_len: Option<usize>,
}

impl ChunkBuilder {
    pub fn new(codec: i32) -> Self {
        Self {
            codec,
            bytes: Vec::new(),
            num_values: 0,
            encodings: vec![RLE],
            dictionary_byte_len: None,
        }
    }

    fn record_encoding(&mut self, encoding: i32) {
        if !self.encodings.contains(&encoding) {
            self.encodings.push(encoding);
        }
    }

    /// Appends a PLAIN dictionary page holding `plain_values`.
    pub fn dictionary_page(&mut self, plain_values: &[u8], num_values: i32) {
        assert!(self.bytes.is_empty(), "dictionary page must come first");
        let compressed = compress(self.codec, plain_values);

        let mut w = ThriftWriter::new();
        w.i32_field(1, 2); // DICTIONARY_PAGE
        w.i32_field(2, plain_values.len() as i32);
        w.i32_field(3, compressed.len() as i32);
        w.struct_field_begin(7);
        w.i32_field(1, num_values);
        w.i32_field(2, PLAIN);
        w.struct_end();
        let header = {
            let mut out = w.finish();
            out.push(0x00);
            out
        };

        self.record_encoding(PLAIN);
        self.bytes.extend_from_slice(&header);
        self.bytes.extend_from_slice(&compressed);
        self.dictionary_byte_len = Some(self.bytes.len());
    }

    /// Appends a v1 data page. Levels are RLE with the 4-byte prefix.
    pub fn data_page_v1(
        &mut self,
        num_values: i32,
        encoding: i32,
        rep_levels: Option<(&[i16], i16)>,
        def_levels: Option<(&[i16], i16)>,
        values: &[u8],
    ) {
        let mut payload = Vec::new();
        if let Some((levels, max_level)) = rep_levels {
            payload.extend_from_slice(&levels_v1(levels, max_level));
        }
        if let Some((levels, max_level)) = def_levels {
            payload.extend_from_slice(&levels_v1(levels, max_level));
        }
        payload.extend_from_slice(values);
        let compressed = compress(self.codec, &payload);

        let mut w = ThriftWriter::new();
        w.i32_field(1, 0); // DATA_PAGE
        w.i32_field(2, payload.len() as i32);
        w.i32_field(3, compressed.len() as i32);
        w.struct_field_begin(5);
        w.i32_field(1, num_values);
        w.i32_field(2, encoding);
        w.i32_field(3, RLE);
        w.i32_field(4, RLE);
        w.struct_end();
        let header = {
            let mut out = w.finish();
            out.push(0x00);
            out
        };

        self.record_encoding(encoding);
        self.num_values += num_values as i64;
        self.bytes.extend_from_slice(&header);
        self.bytes.extend_from_slice(&compressed);
    }

    /// Appends a v2 data page. Levels are prefix-free RLE and stay
    /// uncompressed; the values stream is compressed unless
    /// `is_compressed == Some(false)`.
    #[allow(clippy::too_many_arguments)]
    pub fn data_page_v2(
        &mut self,
        num_values: i32,
        num_nulls: i32,
        num_rows: i32,
        encoding: i32,
        rep_levels: Option<(&[i16], i16)>,
        def_levels: Option<(&[i16], i16)>,
        values: &[u8],
        is_compressed: Option<bool>,
    ) {
        let rep_bytes = rep_levels
            .map(|(levels, max_level)| levels_v2(levels, max_level))
            .unwrap_or_default();
        let def_bytes = def_levels
            .map(|(levels, max_level)| levels_v2(levels, max_level))
            .unwrap_or_default();

        let compress_values = is_compressed.unwrap_or(true);
        let value_bytes = if compress_values {
            compress(self.codec, values)
        } else {
            values.to_vec()
        };

        let uncompressed_size = rep_bytes.len() + def_bytes.len() + values.len();
        let compressed_size = rep_bytes.len() + def_bytes.len() + value_bytes.len();

        let mut w = ThriftWriter::new();
        w.i32_field(1, 3); // DATA_PAGE_V2
        w.i32_field(2, uncompressed_size as i32);
        w.i32_field(3, compressed_size as i32);
        w.struct_field_begin(8);
        w.i32_field(1, num_values);
        w.i32_field(2, num_nulls);
        w.i32_field(3, num_rows);
        w.i32_field(4, encoding);
        w.i32_field(5, def_bytes.len() as i32);
        w.i32_field(6, rep_bytes.len() as i32);
        if let Some(flag) = is_compressed {
            w.bool_field(7, flag);
        }
        w.struct_end();
        let header = {
            let mut out = w.finish();
            out.push(0x00);
            out
        };

        self.record_encoding(encoding);
        self.num_values += num_values as i64;
        self.bytes.extend_from_slice(&header);
        self.bytes.extend_from_slice(&rep_bytes);
        self.bytes.extend_from_slice(&def_bytes);
        self.bytes.extend_from_slice(&value_bytes);
    }

    pub fn finish(self, path: Vec<String>, physical_type: i32) -> FinishedChunk {
        FinishedChunk {
            path,
            physical_type,
            codec: self.codec,
            encodings: self.encodings,
            num_values: self.num_values,
            dictionary_byte_len: self.dictionary_byte_len,
            bytes: self.bytes,
        }
    }
}

pub struct FinishedChunk {
    pub path: Vec<String>,
    pub physical_type: i32,
    pub codec: i32,
    pub encodings: Vec<i32>,
    pub num_values: i64,
    pub dictionary_byte_len: Option<usize>,
    pub bytes: Vec<u8>,
}

// ----------------------------------------------------------------------
// Schema and file assembly

#[derive(Clone)]
pub struct SchemaElem {
    pub name: String,
    pub type_: Option<i32>,
    pub type_length: Option<i32>,
    pub repetition: Option<i32>,
    pub num_children: Option<i32>,
    pub converted_type: Option<i32>,
    pub scale: Option<i32>,
    pub precision: Option<i32>,
}

pub fn root(num_children: i32) -> SchemaElem {
    SchemaElem {
        name: "schema".to_string(),
        type_: None,
        type_length: None,
        repetition: None,
        num_children: Some(num_children),
        converted_type: None,
        scale: None,
        precision: None,
    }
}

pub fn leaf(name: &str, type_: i32, repetition: i32) -> SchemaElem {
    SchemaElem {
        name: name.to_string(),
        type_: Some(type_),
        type_length: None,
        repetition: Some(repetition),
        num_children: None,
        converted_type: None,
        scale: None,
        precision: None,
    }
}

pub fn fixed_leaf(name: &str, type_length: i32, repetition: i32) -> SchemaElem {
    SchemaElem {
        type_length: Some(type_length),
        ..leaf(name, FIXED_LEN_BYTE_ARRAY, repetition)
    }
}

pub fn group(name: &str, repetition: i32, num_children: i32) -> SchemaElem {
    SchemaElem {
        name: name.to_string(),
        type_: None,
        type_length: None,
        repetition: Some(repetition),
        num_children: Some(num_children),
        converted_type: None,
        scale: None,
        precision: None,
    }
}

pub struct RowGroupSpec {
    pub num_rows: i64,
    pub chunks: Vec<FinishedChunk>,
}

/// Assembles a complete Parquet file from a pre-order schema and row groups.
pub fn build_file(schema: Vec<SchemaElem>, row_groups: Vec<RowGroupSpec>) -> Vec<u8> {
    let mut out = b"PAR1".to_vec();

    // lay out the chunk payloads, recording absolute offsets
    struct ChunkOffsets {
        dictionary_page_offset: Option<i64>,
        data_page_offset: i64,
        total_compressed_size: i64,
    }
    let mut offsets: Vec<Vec<ChunkOffsets>> = Vec::new();
    for rg in &row_groups {
        let mut rg_offsets = Vec::new();
        for chunk in &rg.chunks {
            let base = out.len() as i64;
            let (dictionary_page_offset, data_page_offset) = match chunk.dictionary_byte_len {
                Some(dict_len) => (Some(base), base + dict_len as i64),
                None => (None, base),
            };
            out.extend_from_slice(&chunk.bytes);
            rg_offsets.push(ChunkOffsets {
                dictionary_page_offset,
                data_page_offset,
                total_compressed_size: chunk.bytes.len() as i64,
            });
        }
        offsets.push(rg_offsets);
    }

    let num_rows: i64 = row_groups.iter().map(|rg| rg.num_rows).sum();

    // footer
    let mut w = ThriftWriter::new();
    w.i32_field(1, 1); // version

    w.struct_list_field_begin(2, schema.len());
    for element in &schema {
        w.list_struct_begin();
        if let Some(t) = element.type_ {
            w.i32_field(1, t);
        }
        if let Some(l) = element.type_length {
            w.i32_field(2, l);
        }
        if let Some(r) = element.repetition {
            w.i32_field(3, r);
        }
        w.binary_field(4, element.name.as_bytes());
        if let Some(n) = element.num_children {
            w.i32_field(5, n);
        }
        if let Some(c) = element.converted_type {
            w.i32_field(6, c);
        }
        if let Some(s) = element.scale {
            w.i32_field(7, s);
        }
        if let Some(p) = element.precision {
            w.i32_field(8, p);
        }
        w.list_struct_end();
    }

    w.i64_field(3, num_rows);

    w.struct_list_field_begin(4, row_groups.len());
    for (rg, rg_offsets) in row_groups.iter().zip(offsets.iter()) {
        w.list_struct_begin();

        w.struct_list_field_begin(1, rg.chunks.len());
        let mut total_byte_size = 0;
        for (chunk, chunk_offsets) in rg.chunks.iter().zip(rg_offsets.iter()) {
            total_byte_size += chunk_offsets.total_compressed_size;
            w.list_struct_begin();
            w.i64_field(2, chunk_offsets.data_page_offset); // file_offset
            w.struct_field_begin(3);
            w.i32_field(1, chunk.physical_type);
            w.i32_list_field(2, &chunk.encodings);
            let path: Vec<Vec<u8>> = chunk.path.iter().map(|p| p.as_bytes().to_vec()).collect();
            w.binary_list_field(3, &path);
            w.i32_field(4, chunk.codec);
            w.i64_field(5, chunk.num_values);
            w.i64_field(6, chunk_offsets.total_compressed_size);
            w.i64_field(7, chunk_offsets.total_compressed_size);
            w.i64_field(9, chunk_offsets.data_page_offset);
            if let Some(dict) = chunk_offsets.dictionary_page_offset {
                w.i64_field(11, dict);
            }
            w.struct_end();
            w.list_struct_end();
        }

        w.i64_field(2, total_byte_size);
        w.i64_field(3, rg.num_rows);
        w.list_struct_end();
    }

    w.binary_field(6, b"parq test writer");
    let mut footer = w.finish();
    footer.push(0x00);

    out.extend_from_slice(&footer);
    out.extend_from_slice(&(footer.len() as u32).to_le_bytes());
    out.extend_from_slice(b"PAR1");
    out
}

/// Convenience wrapper: one row group over one column.
pub fn single_column_file(
    element: SchemaElem,
    num_rows: i64,
    chunk: FinishedChunk,
) -> Vec<u8> {
    build_file(
        vec![root(1), element],
        vec![RowGroupSpec {
            num_rows,
            chunks: vec![chunk],
        }],
    )
}
