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

//! Re-assembly of single-level LIST and MAP columns from definition and
//! repetition level arrays.
//!
//! These are thin passes over what [`read_column_with_levels`] already
//! produces, for the canonical shapes
//! `optional group (LIST) { repeated group list { <element> } }` and
//! `optional group (MAP) { repeated group key_value { required key; value } }`.
//! Deeper nesting (`max_rep_level > 1`) is left to the caller, who has the
//! level arrays to work from.

use crate::basic::Repetition;
use crate::column::reader::read_column_with_levels;
use crate::data_type::DataType;
use crate::errors::{ParquetError, Result};
use crate::file::reader::RowGroupReader;

/// Reads a single-level LIST column: one entry per row, `None` for a null
/// list, `Some` holding the elements (each `None` when the element itself is
/// null) otherwise.
pub fn read_list_column<T: DataType>(
    row_group: &dyn RowGroupReader,
    column_index: usize,
) -> Result<Vec<Option<Vec<Option<T::T>>>>> {
    let descr = row_group.metadata().column(column_index).column_descr_ptr();
    if descr.max_rep_level() != 1 {
        return Err(unsupported_err!(
            "column '{}' has repetition depth {}, list assembly handles exactly 1",
            descr.path(),
            descr.max_rep_level()
        ));
    }
    let max_def = descr.max_def_level();
    let element_optional =
        descr.self_type().get_basic_info().repetition() == Repetition::OPTIONAL;
    // definition level of an empty (but present) list; everything below it
    // marks the list itself as null
    let empty_list_def = max_def - 1 - (element_optional as i16);

    let column = read_column_with_levels::<T>(row_group, column_index)?;
    let def_levels = column
        .def_levels
        .ok_or_else(|| decode_err!("list column without definition levels"))?;
    let rep_levels = column
        .rep_levels
        .ok_or_else(|| decode_err!("list column without repetition levels"))?;

    let mut out: Vec<Option<Vec<Option<T::T>>>> = Vec::new();
    let mut values = column.values.into_iter();
    for (&def, &rep) in def_levels.iter().zip(rep_levels.iter()) {
        if rep == 0 {
            if def < empty_list_def {
                out.push(None);
                continue;
            }
            out.push(Some(Vec::new()));
            if def == empty_list_def {
                continue;
            }
        }
        let list = out
            .last_mut()
            .and_then(|list| list.as_mut())
            .ok_or_else(|| decode_err!("repetition level continues a list that never started"))?;
        if def == max_def {
            let value = values
                .next()
                .ok_or_else(|| decode_err!("levels promise more values than decoded"))?;
            list.push(Some(value));
        } else if element_optional && def == max_def - 1 {
            list.push(None);
        } else {
            return Err(decode_err!("unexpected definition level {} inside list", def));
        }
    }
    Ok(out)
}

/// Reads a single-level MAP column from its key and value leaf columns:
/// one entry per row, `None` for a null map, `Some` holding `(key, value)`
/// pairs otherwise.
pub fn read_map_column<K: DataType, V: DataType>(
    row_group: &dyn RowGroupReader,
    key_index: usize,
    value_index: usize,
) -> Result<Vec<Option<Vec<(K::T, Option<V::T>)>>>> {
    let key_descr = row_group.metadata().column(key_index).column_descr_ptr();
    let value_descr = row_group.metadata().column(value_index).column_descr_ptr();
    if key_descr.max_rep_level() != 1 || value_descr.max_rep_level() != 1 {
        return Err(unsupported_err!(
            "map assembly handles repetition depth 1, got {} for keys and {} for values",
            key_descr.max_rep_level(),
            value_descr.max_rep_level()
        ));
    }
    if key_descr.self_type().get_basic_info().repetition() != Repetition::REQUIRED {
        return Err(unsupported_err!(
            "map keys at '{}' must be required",
            key_descr.path()
        ));
    }

    let key_max_def = key_descr.max_def_level();
    let value_max_def = value_descr.max_def_level();
    let value_optional =
        value_descr.self_type().get_basic_info().repetition() == Repetition::OPTIONAL;
    let empty_map_def = key_max_def - 1;

    let key_column = read_column_with_levels::<K>(row_group, key_index)?;
    let value_column = read_column_with_levels::<V>(row_group, value_index)?;

    let key_defs = key_column
        .def_levels
        .ok_or_else(|| decode_err!("map key column without definition levels"))?;
    let key_reps = key_column
        .rep_levels
        .ok_or_else(|| decode_err!("map key column without repetition levels"))?;
    let value_defs = value_column
        .def_levels
        .ok_or_else(|| decode_err!("map value column without definition levels"))?;
    if key_defs.len() != value_defs.len() {
        return Err(decode_err!(
            "map key and value columns disagree on entry count: {} vs {}",
            key_defs.len(),
            value_defs.len()
        ));
    }

    let mut out: Vec<Option<Vec<(K::T, Option<V::T>)>>> = Vec::new();
    let mut keys = key_column.values.into_iter();
    let mut values = value_column.values.into_iter();
    for ((&key_def, &rep), &value_def) in
        key_defs.iter().zip(key_reps.iter()).zip(value_defs.iter())
    {
        if rep == 0 {
            if key_def < empty_map_def {
                out.push(None);
                continue;
            }
            out.push(Some(Vec::new()));
            if key_def == empty_map_def {
                continue;
            }
        }
        let map = out
            .last_mut()
            .and_then(|map| map.as_mut())
            .ok_or_else(|| decode_err!("repetition level continues a map that never started"))?;
        if key_def != key_max_def {
            return Err(decode_err!(
                "unexpected key definition level {} inside map",
                key_def
            ));
        }
        let key = keys
            .next()
            .ok_or_else(|| decode_err!("levels promise more keys than decoded"))?;
        let value = if value_def == value_max_def {
            Some(
                values
                    .next()
                    .ok_or_else(|| decode_err!("levels promise more values than decoded"))?,
            )
        } else if value_optional && value_def + 1 == value_max_def {
            None
        } else {
            return Err(decode_err!(
                "unexpected value definition level {} inside map",
                value_def
            ));
        };
        map.push((key, value));
    }
    Ok(out)
}
