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

//! Column reads dispatched on the physical type recorded in the footer, for
//! callers that do not know the column type at compile time.

use seq_macro::seq;

use crate::basic::Type;
use crate::column::reader::{read_column_with_levels, TypedColumn};
use crate::data_type::*;
use crate::errors::{ParquetError, Result};
use crate::file::reader::RowGroupReader;

seq!(W in 1..=16 {
    /// One decoded column chunk, tagged by its physical type.
    ///
    /// FIXED_LEN_BYTE_ARRAY columns surface as fixed-size byte arrays, one
    /// variant per supported width.
    #[derive(Debug, Clone, PartialEq)]
    pub enum DynColumn {
        Bool(TypedColumn<bool>),
        Int32(TypedColumn<i32>),
        Int64(TypedColumn<i64>),
        Int96(TypedColumn<Int96>),
        Float(TypedColumn<f32>),
        Double(TypedColumn<f64>),
        ByteArray(TypedColumn<ByteArray>),
        #(
            FixedLenByteArray~W(TypedColumn<[u8; W]>),
        )*
    }
});

impl DynColumn {
    /// Physical type of the decoded chunk.
    pub fn physical_type(&self) -> Type {
        seq!(W in 1..=16 {
            match self {
                DynColumn::Bool(_) => Type::BOOLEAN,
                DynColumn::Int32(_) => Type::INT32,
                DynColumn::Int64(_) => Type::INT64,
                DynColumn::Int96(_) => Type::INT96,
                DynColumn::Float(_) => Type::FLOAT,
                DynColumn::Double(_) => Type::DOUBLE,
                DynColumn::ByteArray(_) => Type::BYTE_ARRAY,
                #(
                    DynColumn::FixedLenByteArray~W(_) => Type::FIXED_LEN_BYTE_ARRAY,
                )*
            }
        })
    }

    /// Number of value slots in the chunk (levels when present, else values).
    pub fn num_levels(&self) -> usize {
        seq!(W in 1..=16 {
            match self {
                DynColumn::Bool(column) => column.num_levels(),
                DynColumn::Int32(column) => column.num_levels(),
                DynColumn::Int64(column) => column.num_levels(),
                DynColumn::Int96(column) => column.num_levels(),
                DynColumn::Float(column) => column.num_levels(),
                DynColumn::Double(column) => column.num_levels(),
                DynColumn::ByteArray(column) => column.num_levels(),
                #(
                    DynColumn::FixedLenByteArray~W(column) => column.num_levels(),
                )*
            }
        })
    }
}

/// Reads the column chunk at `column_index` using the physical type recorded
/// in the chunk metadata, wrapping the result in the matching [`DynColumn`]
/// variant.
pub fn read_column_dynamic(
    row_group: &dyn RowGroupReader,
    column_index: usize,
) -> Result<DynColumn> {
    let descr = row_group.metadata().column(column_index).column_descr_ptr();
    let result = match descr.physical_type() {
        Type::BOOLEAN => {
            DynColumn::Bool(read_column_with_levels::<BoolType>(row_group, column_index)?)
        }
        Type::INT32 => {
            DynColumn::Int32(read_column_with_levels::<Int32Type>(row_group, column_index)?)
        }
        Type::INT64 => {
            DynColumn::Int64(read_column_with_levels::<Int64Type>(row_group, column_index)?)
        }
        Type::INT96 => {
            DynColumn::Int96(read_column_with_levels::<Int96Type>(row_group, column_index)?)
        }
        Type::FLOAT => {
            DynColumn::Float(read_column_with_levels::<FloatType>(row_group, column_index)?)
        }
        Type::DOUBLE => {
            DynColumn::Double(read_column_with_levels::<DoubleType>(row_group, column_index)?)
        }
        Type::BYTE_ARRAY => DynColumn::ByteArray(read_column_with_levels::<ByteArrayType>(
            row_group,
            column_index,
        )?),
        Type::FIXED_LEN_BYTE_ARRAY => {
            let type_length = descr.type_length();
            let column =
                read_column_with_levels::<FixedLenByteArrayType>(row_group, column_index)?;
            seq!(W in 1..=16 {
                match type_length {
                    #(
                        W => DynColumn::FixedLenByteArray~W(fixed_width_column::<W>(column)?),
                    )*
                    other => {
                        return Err(unsupported_err!(
                            "FIXED_LEN_BYTE_ARRAY of length {} is outside the supported 1..=16",
                            other
                        ))
                    }
                }
            })
        }
    };
    Ok(result)
}

/// Copies variable representation fixed-length values into `[u8; W]` arrays.
fn fixed_width_column<const W: usize>(
    column: TypedColumn<FixedLenByteArray>,
) -> Result<TypedColumn<[u8; W]>> {
    let mut values = Vec::with_capacity(column.values.len());
    for value in &column.values {
        let data = value.data();
        let array: [u8; W] = data.try_into().map_err(|_| {
            decode_err!(
                "fixed len byte array of {} bytes does not match declared length {}",
                data.len(),
                W
            )
        })?;
        values.push(array);
    }
    Ok(TypedColumn {
        values,
        def_levels: column.def_levels,
        rep_levels: column.rep_levels,
    })
}
