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

//! Module for working with Parquet file footers.

use std::io::Read;
use std::sync::Arc;

use crate::errors::{ParquetError, Result};
use crate::file::metadata::{
    column_orders_from_thrift, FileMetaData, ParquetMetaData, RowGroupMetaData,
};
use crate::file::reader::ChunkReader;
use crate::file::{FOOTER_SIZE, PARQUET_MAGIC, PARQUET_MAGIC_ENCRYPTED};
use crate::format;
use crate::schema::types::{self, SchemaDescriptor};
use crate::thrift::ThriftCompactReader;

/// Layout of Parquet file
/// +---------------------------+---+-----+
/// |      Rest of file         | B |  A  |
/// +---------------------------+---+-----+
/// where A: parquet footer, B: parquet metadata.
///
/// The reader first reads and validates both magics, then the 4-byte
/// little-endian footer length, and finally decodes the `FileMetaData`
/// Compact Protocol struct that the footer length locates.
pub fn parse_metadata<R: ChunkReader>(chunk_reader: &R) -> Result<ParquetMetaData> {
    let file_size = chunk_reader.len();

    // the shortest well-formed file is magic + empty footer + footer length + magic
    if file_size < (FOOTER_SIZE + PARQUET_MAGIC.len()) as u64 {
        return Err(malformed_err!(
            "file of {} bytes is smaller than the Parquet minimum of {}",
            file_size,
            FOOTER_SIZE + PARQUET_MAGIC.len()
        ));
    }

    let mut head_magic = [0u8; 4];
    chunk_reader.get_read(0, 4)?.read_exact(&mut head_magic)?;
    check_magic(&head_magic, "header")?;

    let mut footer = [0u8; FOOTER_SIZE];
    chunk_reader
        .get_read(file_size - FOOTER_SIZE as u64, FOOTER_SIZE)?
        .read_exact(&mut footer)?;
    let trailer_magic: [u8; 4] = footer[4..].try_into().unwrap();
    check_magic(&trailer_magic, "trailer")?;

    let metadata_len = u32::from_le_bytes(footer[..4].try_into().unwrap()) as u64;
    let footer_metadata_len = metadata_len + FOOTER_SIZE as u64;
    if footer_metadata_len + PARQUET_MAGIC.len() as u64 > file_size {
        return Err(malformed_err!(
            "footer of {} bytes does not fit a file of {} bytes",
            footer_metadata_len,
            file_size
        ));
    }

    let metadata_read =
        chunk_reader.get_read(file_size - footer_metadata_len, metadata_len as usize)?;
    let mut prot = ThriftCompactReader::new(metadata_read);
    let t_file_metadata = format::FileMetaData::read_from(&mut prot)?;

    if t_file_metadata.encryption_algorithm.is_some()
        || t_file_metadata.footer_signing_key_metadata.is_some()
    {
        return Err(unsupported_err!("file footer requests encryption"));
    }

    let schema = types::from_thrift(&t_file_metadata.schema)?;
    let schema_descr = Arc::new(SchemaDescriptor::new(schema));

    let mut row_groups = Vec::with_capacity(t_file_metadata.row_groups.len());
    for rg in t_file_metadata.row_groups {
        row_groups.push(RowGroupMetaData::from_thrift(schema_descr.clone(), rg)?);
    }
    let column_orders = column_orders_from_thrift(t_file_metadata.column_orders);
    if let Some(ref orders) = column_orders {
        if orders.len() != schema_descr.num_columns() {
            return Err(metadata_err!(
                "file lists {} column orders for {} columns",
                orders.len(),
                schema_descr.num_columns()
            ));
        }
    }

    let file_metadata = FileMetaData::new(
        t_file_metadata.version,
        t_file_metadata.num_rows,
        t_file_metadata.created_by,
        t_file_metadata.key_value_metadata,
        schema_descr,
        column_orders,
    );
    Ok(ParquetMetaData::new(file_metadata, row_groups))
}

fn check_magic(magic: &[u8; 4], position: &str) -> Result<()> {
    if *magic == PARQUET_MAGIC_ENCRYPTED {
        return Err(unsupported_err!(
            "file {} marks the footer as encrypted",
            position
        ));
    }
    if *magic != PARQUET_MAGIC {
        return Err(malformed_err!("file {} magic is not PAR1", position));
    }
    Ok(())
}
