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

//! Raw Parquet metadata structs as defined by `parquet.thrift`, with their
//! Compact Protocol readers.
//!
//! Every reader follows the same generated shape: loop over field headers,
//! match on the field id, verify the wire type, skip unknown ids, and check
//! required fields at the stop byte. Enum-typed fields are kept as raw `i32`
//! here; conversion to the typed enums in [`crate::basic`] happens in the
//! metadata layer where errors can carry column context.

use std::io::Read;

use crate::basic::{LogicalType, TimeUnit};
use crate::errors::{ParquetError, Result};
use crate::thrift::{FieldType, ThriftCompactReader};

macro_rules! required {
    ($field:ident, $struct_name:expr) => {
        $field.ok_or_else(|| {
            metadata_err!(
                concat!("required field ", $struct_name, ".", stringify!($field), " is missing")
            )
        })?
    };
}

fn check_struct(field_type: FieldType) -> Result<()> {
    if field_type != FieldType::Struct {
        return Err(metadata_err!("expected struct field, found {:?}", field_type));
    }
    Ok(())
}

fn read_struct_list<R: Read, T>(
    prot: &mut ThriftCompactReader<R>,
    field_type: FieldType,
    read_element: impl Fn(&mut ThriftCompactReader<R>) -> Result<T>,
) -> Result<Vec<T>> {
    if field_type != FieldType::List {
        return Err(metadata_err!("expected list field, found {:?}", field_type));
    }
    let (element_type, len) = prot.read_list_header()?;
    if element_type != FieldType::Struct {
        return Err(metadata_err!(
            "expected list of structs, found list of {:?}",
            element_type
        ));
    }
    let mut out = Vec::with_capacity(len.min(1024));
    for _ in 0..len {
        out.push(read_element(prot)?);
    }
    Ok(out)
}

fn read_i32_list<R: Read>(
    prot: &mut ThriftCompactReader<R>,
    field_type: FieldType,
) -> Result<Vec<i32>> {
    if field_type != FieldType::List {
        return Err(metadata_err!("expected list field, found {:?}", field_type));
    }
    let (element_type, len) = prot.read_list_header()?;
    if element_type != FieldType::I32 {
        return Err(metadata_err!(
            "expected list of i32, found list of {:?}",
            element_type
        ));
    }
    let mut out = Vec::with_capacity(len.min(1024));
    for _ in 0..len {
        let v = prot.read_zigzag()?;
        out.push(i32::try_from(v).map_err(|_| metadata_err!("i32 element out of range"))?);
    }
    Ok(out)
}

fn read_string_list<R: Read>(
    prot: &mut ThriftCompactReader<R>,
    field_type: FieldType,
) -> Result<Vec<String>> {
    if field_type != FieldType::List {
        return Err(metadata_err!("expected list field, found {:?}", field_type));
    }
    let (element_type, len) = prot.read_list_header()?;
    if element_type != FieldType::Binary {
        return Err(metadata_err!(
            "expected list of binary, found list of {:?}",
            element_type
        ));
    }
    let mut out = Vec::with_capacity(len.min(1024));
    for _ in 0..len {
        out.push(prot.read_string(FieldType::Binary)?);
    }
    Ok(out)
}

/// Consumes a struct whose content is irrelevant (empty union variants).
fn read_empty_struct<R: Read>(prot: &mut ThriftCompactReader<R>) -> Result<()> {
    prot.read_struct_begin();
    while let Some((_, field_type)) = prot.read_field_header()? {
        prot.skip(field_type)?;
    }
    prot.read_struct_end();
    Ok(())
}

// ----------------------------------------------------------------------
// Statistics

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statistics {
    pub max: Option<Vec<u8>>,
    pub min: Option<Vec<u8>>,
    pub null_count: Option<i64>,
    pub distinct_count: Option<i64>,
    pub max_value: Option<Vec<u8>>,
    pub min_value: Option<Vec<u8>>,
}

impl Statistics {
    pub fn read_from<R: Read>(prot: &mut ThriftCompactReader<R>) -> Result<Statistics> {
        let mut stats = Statistics::default();
        prot.read_struct_begin();
        while let Some((field_id, field_type)) = prot.read_field_header()? {
            match field_id {
                1 => stats.max = Some(prot.read_binary(field_type)?),
                2 => stats.min = Some(prot.read_binary(field_type)?),
                3 => stats.null_count = Some(prot.read_i64(field_type)?),
                4 => stats.distinct_count = Some(prot.read_i64(field_type)?),
                5 => stats.max_value = Some(prot.read_binary(field_type)?),
                6 => stats.min_value = Some(prot.read_binary(field_type)?),
                _ => prot.skip(field_type)?,
            }
        }
        prot.read_struct_end();
        Ok(stats)
    }
}

// ----------------------------------------------------------------------
// KeyValue / SortingColumn / PageEncodingStats

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: Option<String>,
}

impl KeyValue {
    pub fn read_from<R: Read>(prot: &mut ThriftCompactReader<R>) -> Result<KeyValue> {
        let mut key = None;
        let mut value = None;
        prot.read_struct_begin();
        while let Some((field_id, field_type)) = prot.read_field_header()? {
            match field_id {
                1 => key = Some(prot.read_string(field_type)?),
                2 => value = Some(prot.read_string(field_type)?),
                _ => prot.skip(field_type)?,
            }
        }
        prot.read_struct_end();
        Ok(KeyValue {
            key: required!(key, "KeyValue"),
            value,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortingColumn {
    pub column_idx: i32,
    pub descending: bool,
    pub nulls_first: bool,
}

impl SortingColumn {
    pub fn read_from<R: Read>(prot: &mut ThriftCompactReader<R>) -> Result<SortingColumn> {
        let mut column_idx = None;
        let mut descending = None;
        let mut nulls_first = None;
        prot.read_struct_begin();
        while let Some((field_id, field_type)) = prot.read_field_header()? {
            match field_id {
                1 => column_idx = Some(prot.read_i32(field_type)?),
                2 => descending = Some(prot.read_bool(field_type)?),
                3 => nulls_first = Some(prot.read_bool(field_type)?),
                _ => prot.skip(field_type)?,
            }
        }
        prot.read_struct_end();
        Ok(SortingColumn {
            column_idx: required!(column_idx, "SortingColumn"),
            descending: required!(descending, "SortingColumn"),
            nulls_first: required!(nulls_first, "SortingColumn"),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageEncodingStats {
    pub page_type: i32,
    pub encoding: i32,
    pub count: i32,
}

impl PageEncodingStats {
    pub fn read_from<R: Read>(prot: &mut ThriftCompactReader<R>) -> Result<PageEncodingStats> {
        let mut page_type = None;
        let mut encoding = None;
        let mut count = None;
        prot.read_struct_begin();
        while let Some((field_id, field_type)) = prot.read_field_header()? {
            match field_id {
                1 => page_type = Some(prot.read_i32(field_type)?),
                2 => encoding = Some(prot.read_i32(field_type)?),
                3 => count = Some(prot.read_i32(field_type)?),
                _ => prot.skip(field_type)?,
            }
        }
        prot.read_struct_end();
        Ok(PageEncodingStats {
            page_type: required!(page_type, "PageEncodingStats"),
            encoding: required!(encoding, "PageEncodingStats"),
            count: required!(count, "PageEncodingStats"),
        })
    }
}

// ----------------------------------------------------------------------
// LogicalType union

fn read_time_unit<R: Read>(prot: &mut ThriftCompactReader<R>) -> Result<TimeUnit> {
    let mut unit = None;
    prot.read_struct_begin();
    while let Some((field_id, field_type)) = prot.read_field_header()? {
        if field_type != FieldType::Struct {
            return Err(metadata_err!("TimeUnit variant must be a struct"));
        }
        read_empty_struct(prot)?;
        unit = Some(match field_id {
            1 => TimeUnit::MILLIS,
            2 => TimeUnit::MICROS,
            3 => TimeUnit::NANOS,
            other => return Err(metadata_err!("unknown TimeUnit variant {}", other)),
        });
    }
    prot.read_struct_end();
    unit.ok_or_else(|| metadata_err!("empty TimeUnit union"))
}

fn read_decimal_type<R: Read>(prot: &mut ThriftCompactReader<R>) -> Result<(i32, i32)> {
    let mut scale = None;
    let mut precision = None;
    prot.read_struct_begin();
    while let Some((field_id, field_type)) = prot.read_field_header()? {
        match field_id {
            1 => scale = Some(prot.read_i32(field_type)?),
            2 => precision = Some(prot.read_i32(field_type)?),
            _ => prot.skip(field_type)?,
        }
    }
    prot.read_struct_end();
    Ok((
        required!(scale, "DecimalType"),
        required!(precision, "DecimalType"),
    ))
}

fn read_time_type<R: Read>(prot: &mut ThriftCompactReader<R>) -> Result<(bool, TimeUnit)> {
    let mut is_adjusted_to_u_t_c = None;
    let mut unit = None;
    prot.read_struct_begin();
    while let Some((field_id, field_type)) = prot.read_field_header()? {
        match field_id {
            1 => is_adjusted_to_u_t_c = Some(prot.read_bool(field_type)?),
            2 => {
                check_struct(field_type)?;
                unit = Some(read_time_unit(prot)?)
            }
            _ => prot.skip(field_type)?,
        }
    }
    prot.read_struct_end();
    Ok((
        required!(is_adjusted_to_u_t_c, "TimeType"),
        required!(unit, "TimeType"),
    ))
}

fn read_int_type<R: Read>(prot: &mut ThriftCompactReader<R>) -> Result<(i8, bool)> {
    let mut bit_width = None;
    let mut is_signed = None;
    prot.read_struct_begin();
    while let Some((field_id, field_type)) = prot.read_field_header()? {
        match field_id {
            1 => bit_width = Some(prot.read_i8(field_type)?),
            2 => is_signed = Some(prot.read_bool(field_type)?),
            _ => prot.skip(field_type)?,
        }
    }
    prot.read_struct_end();
    Ok((required!(bit_width, "IntType"), required!(is_signed, "IntType")))
}

pub fn read_logical_type<R: Read>(prot: &mut ThriftCompactReader<R>) -> Result<LogicalType> {
    let mut logical = None;
    prot.read_struct_begin();
    while let Some((field_id, field_type)) = prot.read_field_header()? {
        if field_type != FieldType::Struct {
            return Err(metadata_err!("LogicalType variant must be a struct"));
        }
        logical = Some(match field_id {
            1 => {
                read_empty_struct(prot)?;
                LogicalType::String
            }
            2 => {
                read_empty_struct(prot)?;
                LogicalType::Map
            }
            3 => {
                read_empty_struct(prot)?;
                LogicalType::List
            }
            4 => {
                read_empty_struct(prot)?;
                LogicalType::Enum
            }
            5 => {
                let (scale, precision) = read_decimal_type(prot)?;
                LogicalType::Decimal { scale, precision }
            }
            6 => {
                read_empty_struct(prot)?;
                LogicalType::Date
            }
            7 => {
                let (is_adjusted_to_u_t_c, unit) = read_time_type(prot)?;
                LogicalType::Time {
                    is_adjusted_to_u_t_c,
                    unit,
                }
            }
            8 => {
                let (is_adjusted_to_u_t_c, unit) = read_time_type(prot)?;
                LogicalType::Timestamp {
                    is_adjusted_to_u_t_c,
                    unit,
                }
            }
            10 => {
                let (bit_width, is_signed) = read_int_type(prot)?;
                LogicalType::Integer {
                    bit_width,
                    is_signed,
                }
            }
            11 => {
                read_empty_struct(prot)?;
                LogicalType::Unknown
            }
            12 => {
                read_empty_struct(prot)?;
                LogicalType::Json
            }
            13 => {
                read_empty_struct(prot)?;
                LogicalType::Bson
            }
            14 => {
                read_empty_struct(prot)?;
                LogicalType::Uuid
            }
            15 => {
                read_empty_struct(prot)?;
                LogicalType::Float16
            }
            other => return Err(metadata_err!("unknown LogicalType variant {}", other)),
        });
    }
    prot.read_struct_end();
    logical.ok_or_else(|| metadata_err!("empty LogicalType union"))
}

// ----------------------------------------------------------------------
// SchemaElement

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaElement {
    pub type_: Option<i32>,
    pub type_length: Option<i32>,
    pub repetition_type: Option<i32>,
    pub name: String,
    pub num_children: Option<i32>,
    pub converted_type: Option<i32>,
    pub scale: Option<i32>,
    pub precision: Option<i32>,
    pub field_id: Option<i32>,
    pub logical_type: Option<LogicalType>,
}

impl SchemaElement {
    pub fn read_from<R: Read>(prot: &mut ThriftCompactReader<R>) -> Result<SchemaElement> {
        let mut element = SchemaElement::default();
        let mut name = None;
        prot.read_struct_begin();
        while let Some((field_id, field_type)) = prot.read_field_header()? {
            match field_id {
                1 => element.type_ = Some(prot.read_i32(field_type)?),
                2 => element.type_length = Some(prot.read_i32(field_type)?),
                3 => element.repetition_type = Some(prot.read_i32(field_type)?),
                4 => name = Some(prot.read_string(field_type)?),
                5 => element.num_children = Some(prot.read_i32(field_type)?),
                6 => element.converted_type = Some(prot.read_i32(field_type)?),
                7 => element.scale = Some(prot.read_i32(field_type)?),
                8 => element.precision = Some(prot.read_i32(field_type)?),
                9 => element.field_id = Some(prot.read_i32(field_type)?),
                10 => {
                    check_struct(field_type)?;
                    element.logical_type = Some(read_logical_type(prot)?)
                }
                _ => prot.skip(field_type)?,
            }
        }
        prot.read_struct_end();
        element.name = required!(name, "SchemaElement");
        Ok(element)
    }
}

// ----------------------------------------------------------------------
// ColumnMetaData / ColumnChunk / RowGroup

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMetaData {
    pub type_: i32,
    pub encodings: Vec<i32>,
    pub path_in_schema: Vec<String>,
    pub codec: i32,
    pub num_values: i64,
    pub total_uncompressed_size: i64,
    pub total_compressed_size: i64,
    pub key_value_metadata: Option<Vec<KeyValue>>,
    pub data_page_offset: i64,
    pub index_page_offset: Option<i64>,
    pub dictionary_page_offset: Option<i64>,
    pub statistics: Option<Statistics>,
    pub encoding_stats: Option<Vec<PageEncodingStats>>,
    pub bloom_filter_offset: Option<i64>,
    pub bloom_filter_length: Option<i32>,
}

impl ColumnMetaData {
    pub fn read_from<R: Read>(prot: &mut ThriftCompactReader<R>) -> Result<ColumnMetaData> {
        let mut type_ = None;
        let mut encodings = None;
        let mut path_in_schema = None;
        let mut codec = None;
        let mut num_values = None;
        let mut total_uncompressed_size = None;
        let mut total_compressed_size = None;
        let mut key_value_metadata = None;
        let mut data_page_offset = None;
        let mut index_page_offset = None;
        let mut dictionary_page_offset = None;
        let mut statistics = None;
        let mut encoding_stats = None;
        let mut bloom_filter_offset = None;
        let mut bloom_filter_length = None;
        prot.read_struct_begin();
        while let Some((field_id, field_type)) = prot.read_field_header()? {
            match field_id {
                1 => type_ = Some(prot.read_i32(field_type)?),
                2 => encodings = Some(read_i32_list(prot, field_type)?),
                3 => path_in_schema = Some(read_string_list(prot, field_type)?),
                4 => codec = Some(prot.read_i32(field_type)?),
                5 => num_values = Some(prot.read_i64(field_type)?),
                6 => total_uncompressed_size = Some(prot.read_i64(field_type)?),
                7 => total_compressed_size = Some(prot.read_i64(field_type)?),
                8 => {
                    key_value_metadata =
                        Some(read_struct_list(prot, field_type, KeyValue::read_from)?)
                }
                9 => data_page_offset = Some(prot.read_i64(field_type)?),
                10 => index_page_offset = Some(prot.read_i64(field_type)?),
                11 => dictionary_page_offset = Some(prot.read_i64(field_type)?),
                12 => {
                    check_struct(field_type)?;
                    statistics = Some(Statistics::read_from(prot)?)
                }
                13 => {
                    encoding_stats = Some(read_struct_list(
                        prot,
                        field_type,
                        PageEncodingStats::read_from,
                    )?)
                }
                14 => bloom_filter_offset = Some(prot.read_i64(field_type)?),
                15 => bloom_filter_length = Some(prot.read_i32(field_type)?),
                _ => prot.skip(field_type)?,
            }
        }
        prot.read_struct_end();
        Ok(ColumnMetaData {
            type_: required!(type_, "ColumnMetaData"),
            encodings: required!(encodings, "ColumnMetaData"),
            path_in_schema: required!(path_in_schema, "ColumnMetaData"),
            codec: required!(codec, "ColumnMetaData"),
            num_values: required!(num_values, "ColumnMetaData"),
            total_uncompressed_size: required!(total_uncompressed_size, "ColumnMetaData"),
            total_compressed_size: required!(total_compressed_size, "ColumnMetaData"),
            key_value_metadata,
            data_page_offset: required!(data_page_offset, "ColumnMetaData"),
            index_page_offset,
            dictionary_page_offset,
            statistics,
            encoding_stats,
            bloom_filter_offset,
            bloom_filter_length,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnChunk {
    pub file_path: Option<String>,
    pub file_offset: i64,
    pub meta_data: Option<ColumnMetaData>,
    pub offset_index_offset: Option<i64>,
    pub offset_index_length: Option<i32>,
    pub column_index_offset: Option<i64>,
    pub column_index_length: Option<i32>,
    /// Presence of column-level encryption; content is not interpreted.
    pub crypto_metadata: Option<()>,
}

impl ColumnChunk {
    pub fn read_from<R: Read>(prot: &mut ThriftCompactReader<R>) -> Result<ColumnChunk> {
        let mut file_path = None;
        let mut file_offset = None;
        let mut meta_data = None;
        let mut offset_index_offset = None;
        let mut offset_index_length = None;
        let mut column_index_offset = None;
        let mut column_index_length = None;
        let mut crypto_metadata = None;
        prot.read_struct_begin();
        while let Some((field_id, field_type)) = prot.read_field_header()? {
            match field_id {
                1 => file_path = Some(prot.read_string(field_type)?),
                2 => file_offset = Some(prot.read_i64(field_type)?),
                3 => {
                    check_struct(field_type)?;
                    meta_data = Some(ColumnMetaData::read_from(prot)?)
                }
                4 => offset_index_offset = Some(prot.read_i64(field_type)?),
                5 => offset_index_length = Some(prot.read_i32(field_type)?),
                6 => column_index_offset = Some(prot.read_i64(field_type)?),
                7 => column_index_length = Some(prot.read_i32(field_type)?),
                8 => {
                    check_struct(field_type)?;
                    read_empty_struct(prot)?;
                    crypto_metadata = Some(());
                }
                _ => prot.skip(field_type)?,
            }
        }
        prot.read_struct_end();
        Ok(ColumnChunk {
            file_path,
            file_offset: required!(file_offset, "ColumnChunk"),
            meta_data,
            offset_index_offset,
            offset_index_length,
            column_index_offset,
            column_index_length,
            crypto_metadata,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowGroup {
    pub columns: Vec<ColumnChunk>,
    pub total_byte_size: i64,
    pub num_rows: i64,
    pub sorting_columns: Option<Vec<SortingColumn>>,
    pub file_offset: Option<i64>,
    pub total_compressed_size: Option<i64>,
    pub ordinal: Option<i16>,
}

impl RowGroup {
    pub fn read_from<R: Read>(prot: &mut ThriftCompactReader<R>) -> Result<RowGroup> {
        let mut columns = None;
        let mut total_byte_size = None;
        let mut num_rows = None;
        let mut sorting_columns = None;
        let mut file_offset = None;
        let mut total_compressed_size = None;
        let mut ordinal = None;
        prot.read_struct_begin();
        while let Some((field_id, field_type)) = prot.read_field_header()? {
            match field_id {
                1 => columns = Some(read_struct_list(prot, field_type, ColumnChunk::read_from)?),
                2 => total_byte_size = Some(prot.read_i64(field_type)?),
                3 => num_rows = Some(prot.read_i64(field_type)?),
                4 => {
                    sorting_columns =
                        Some(read_struct_list(prot, field_type, SortingColumn::read_from)?)
                }
                5 => file_offset = Some(prot.read_i64(field_type)?),
                6 => total_compressed_size = Some(prot.read_i64(field_type)?),
                7 => ordinal = Some(prot.read_i16(field_type)?),
                _ => prot.skip(field_type)?,
            }
        }
        prot.read_struct_end();
        Ok(RowGroup {
            columns: required!(columns, "RowGroup"),
            total_byte_size: required!(total_byte_size, "RowGroup"),
            num_rows: required!(num_rows, "RowGroup"),
            sorting_columns,
            file_offset,
            total_compressed_size,
            ordinal,
        })
    }
}

// ----------------------------------------------------------------------
// ColumnOrder / FileMetaData

/// Reads one `ColumnOrder` union variant; only TYPE_ORDER (field 1) is known.
fn read_column_order<R: Read>(prot: &mut ThriftCompactReader<R>) -> Result<bool> {
    let mut type_defined = false;
    prot.read_struct_begin();
    while let Some((field_id, field_type)) = prot.read_field_header()? {
        if field_id == 1 && field_type == FieldType::Struct {
            read_empty_struct(prot)?;
            type_defined = true;
        } else {
            prot.skip(field_type)?;
        }
    }
    prot.read_struct_end();
    Ok(type_defined)
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileMetaData {
    pub version: i32,
    pub schema: Vec<SchemaElement>,
    pub num_rows: i64,
    pub row_groups: Vec<RowGroup>,
    pub key_value_metadata: Option<Vec<KeyValue>>,
    pub created_by: Option<String>,
    /// `true` per column whose order is TYPE_ORDER; unknown variants are `false`.
    pub column_orders: Option<Vec<bool>>,
    /// Presence of a footer encryption algorithm; content is not interpreted.
    pub encryption_algorithm: Option<()>,
    pub footer_signing_key_metadata: Option<Vec<u8>>,
}

impl FileMetaData {
    pub fn read_from<R: Read>(prot: &mut ThriftCompactReader<R>) -> Result<FileMetaData> {
        let mut version = None;
        let mut schema = None;
        let mut num_rows = None;
        let mut row_groups = None;
        let mut key_value_metadata = None;
        let mut created_by = None;
        let mut column_orders = None;
        let mut encryption_algorithm = None;
        let mut footer_signing_key_metadata = None;
        prot.read_struct_begin();
        while let Some((field_id, field_type)) = prot.read_field_header()? {
            match field_id {
                1 => version = Some(prot.read_i32(field_type)?),
                2 => schema = Some(read_struct_list(prot, field_type, SchemaElement::read_from)?),
                3 => num_rows = Some(prot.read_i64(field_type)?),
                4 => row_groups = Some(read_struct_list(prot, field_type, RowGroup::read_from)?),
                5 => {
                    key_value_metadata =
                        Some(read_struct_list(prot, field_type, KeyValue::read_from)?)
                }
                6 => created_by = Some(prot.read_string(field_type)?),
                7 => column_orders = Some(read_struct_list(prot, field_type, read_column_order)?),
                8 => {
                    check_struct(field_type)?;
                    read_empty_struct(prot)?;
                    encryption_algorithm = Some(());
                }
                9 => footer_signing_key_metadata = Some(prot.read_binary(field_type)?),
                _ => prot.skip(field_type)?,
            }
        }
        prot.read_struct_end();
        Ok(FileMetaData {
            version: required!(version, "FileMetaData"),
            schema: required!(schema, "FileMetaData"),
            num_rows: required!(num_rows, "FileMetaData"),
            row_groups: required!(row_groups, "FileMetaData"),
            key_value_metadata,
            created_by,
            column_orders,
            encryption_algorithm,
            footer_signing_key_metadata,
        })
    }
}

// ----------------------------------------------------------------------
// Page headers

#[derive(Debug, Clone, PartialEq)]
pub struct DataPageHeader {
    pub num_values: i32,
    pub encoding: i32,
    pub definition_level_encoding: i32,
    pub repetition_level_encoding: i32,
    pub statistics: Option<Statistics>,
}

impl DataPageHeader {
    pub fn read_from<R: Read>(prot: &mut ThriftCompactReader<R>) -> Result<DataPageHeader> {
        let mut num_values = None;
        let mut encoding = None;
        let mut definition_level_encoding = None;
        let mut repetition_level_encoding = None;
        let mut statistics = None;
        prot.read_struct_begin();
        while let Some((field_id, field_type)) = prot.read_field_header()? {
            match field_id {
                1 => num_values = Some(prot.read_i32(field_type)?),
                2 => encoding = Some(prot.read_i32(field_type)?),
                3 => definition_level_encoding = Some(prot.read_i32(field_type)?),
                4 => repetition_level_encoding = Some(prot.read_i32(field_type)?),
                5 => {
                    check_struct(field_type)?;
                    statistics = Some(Statistics::read_from(prot)?)
                }
                _ => prot.skip(field_type)?,
            }
        }
        prot.read_struct_end();
        Ok(DataPageHeader {
            num_values: required!(num_values, "DataPageHeader"),
            encoding: required!(encoding, "DataPageHeader"),
            definition_level_encoding: required!(definition_level_encoding, "DataPageHeader"),
            repetition_level_encoding: required!(repetition_level_encoding, "DataPageHeader"),
            statistics,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataPageHeaderV2 {
    pub num_values: i32,
    pub num_nulls: i32,
    pub num_rows: i32,
    pub encoding: i32,
    pub definition_levels_byte_length: i32,
    pub repetition_levels_byte_length: i32,
    pub is_compressed: Option<bool>,
    pub statistics: Option<Statistics>,
}

impl DataPageHeaderV2 {
    pub fn read_from<R: Read>(prot: &mut ThriftCompactReader<R>) -> Result<DataPageHeaderV2> {
        let mut num_values = None;
        let mut num_nulls = None;
        let mut num_rows = None;
        let mut encoding = None;
        let mut definition_levels_byte_length = None;
        let mut repetition_levels_byte_length = None;
        let mut is_compressed = None;
        let mut statistics = None;
        prot.read_struct_begin();
        while let Some((field_id, field_type)) = prot.read_field_header()? {
            match field_id {
                1 => num_values = Some(prot.read_i32(field_type)?),
                2 => num_nulls = Some(prot.read_i32(field_type)?),
                3 => num_rows = Some(prot.read_i32(field_type)?),
                4 => encoding = Some(prot.read_i32(field_type)?),
                5 => definition_levels_byte_length = Some(prot.read_i32(field_type)?),
                6 => repetition_levels_byte_length = Some(prot.read_i32(field_type)?),
                7 => is_compressed = Some(prot.read_bool(field_type)?),
                8 => {
                    check_struct(field_type)?;
                    statistics = Some(Statistics::read_from(prot)?)
                }
                _ => prot.skip(field_type)?,
            }
        }
        prot.read_struct_end();
        Ok(DataPageHeaderV2 {
            num_values: required!(num_values, "DataPageHeaderV2"),
            num_nulls: required!(num_nulls, "DataPageHeaderV2"),
            num_rows: required!(num_rows, "DataPageHeaderV2"),
            encoding: required!(encoding, "DataPageHeaderV2"),
            definition_levels_byte_length: required!(
                definition_levels_byte_length,
                "DataPageHeaderV2"
            ),
            repetition_levels_byte_length: required!(
                repetition_levels_byte_length,
                "DataPageHeaderV2"
            ),
            is_compressed,
            statistics,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DictionaryPageHeader {
    pub num_values: i32,
    pub encoding: i32,
    pub is_sorted: Option<bool>,
}

impl DictionaryPageHeader {
    pub fn read_from<R: Read>(prot: &mut ThriftCompactReader<R>) -> Result<DictionaryPageHeader> {
        let mut num_values = None;
        let mut encoding = None;
        let mut is_sorted = None;
        prot.read_struct_begin();
        while let Some((field_id, field_type)) = prot.read_field_header()? {
            match field_id {
                1 => num_values = Some(prot.read_i32(field_type)?),
                2 => encoding = Some(prot.read_i32(field_type)?),
                3 => is_sorted = Some(prot.read_bool(field_type)?),
                _ => prot.skip(field_type)?,
            }
        }
        prot.read_struct_end();
        Ok(DictionaryPageHeader {
            num_values: required!(num_values, "DictionaryPageHeader"),
            encoding: required!(encoding, "DictionaryPageHeader"),
            is_sorted,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageHeader {
    pub type_: i32,
    pub uncompressed_page_size: i32,
    pub compressed_page_size: i32,
    pub crc: Option<i32>,
    pub data_page_header: Option<DataPageHeader>,
    pub dictionary_page_header: Option<DictionaryPageHeader>,
    pub data_page_header_v2: Option<DataPageHeaderV2>,
}

impl PageHeader {
    pub fn read_from<R: Read>(prot: &mut ThriftCompactReader<R>) -> Result<PageHeader> {
        let mut type_ = None;
        let mut uncompressed_page_size = None;
        let mut compressed_page_size = None;
        let mut crc = None;
        let mut data_page_header = None;
        let mut dictionary_page_header = None;
        let mut data_page_header_v2 = None;
        prot.read_struct_begin();
        while let Some((field_id, field_type)) = prot.read_field_header()? {
            match field_id {
                1 => type_ = Some(prot.read_i32(field_type)?),
                2 => uncompressed_page_size = Some(prot.read_i32(field_type)?),
                3 => compressed_page_size = Some(prot.read_i32(field_type)?),
                4 => crc = Some(prot.read_i32(field_type)?),
                5 => {
                    check_struct(field_type)?;
                    data_page_header = Some(DataPageHeader::read_from(prot)?)
                }
                // field 6 is the empty index-page sub-header
                6 => {
                    check_struct(field_type)?;
                    read_empty_struct(prot)?
                }
                7 => {
                    check_struct(field_type)?;
                    dictionary_page_header = Some(DictionaryPageHeader::read_from(prot)?)
                }
                8 => {
                    check_struct(field_type)?;
                    data_page_header_v2 = Some(DataPageHeaderV2::read_from(prot)?)
                }
                _ => prot.skip(field_type)?,
            }
        }
        prot.read_struct_end();
        Ok(PageHeader {
            type_: required!(type_, "PageHeader"),
            uncompressed_page_size: required!(uncompressed_page_size, "PageHeader"),
            compressed_page_size: required!(compressed_page_size, "PageHeader"),
            crc,
            data_page_header,
            dictionary_page_header,
            data_page_header_v2,
        })
    }
}
