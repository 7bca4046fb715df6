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

//! Thrift Compact Protocol input, sufficient for the Parquet metadata
//! structs in [`crate::format`].
//!
//! Only the types the Parquet Thrift IDL uses are readable: bool, i8..i64,
//! binary, list, struct (and unions, which are single-field structs).
//! Double, set, map and uuid fields are rejected rather than skipped, since
//! their presence means the footer is not Parquet metadata.

use std::io::Read;

use crate::errors::{ParquetError, Result};

/// Compact-protocol wire type of one field, from the low nibble of a field
/// header. Booleans carry their value in the type itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    BoolTrue,
    BoolFalse,
    Byte,
    I16,
    I32,
    I64,
    Double,
    Binary,
    List,
    Set,
    Map,
    Struct,
    Uuid,
}

impl FieldType {
    fn from_nibble(nibble: u8) -> Result<FieldType> {
        Ok(match nibble {
            1 => FieldType::BoolTrue,
            2 => FieldType::BoolFalse,
            3 => FieldType::Byte,
            4 => FieldType::I16,
            5 => FieldType::I32,
            6 => FieldType::I64,
            7 => FieldType::Double,
            8 => FieldType::Binary,
            9 => FieldType::List,
            10 => FieldType::Set,
            11 => FieldType::Map,
            12 => FieldType::Struct,
            13 => FieldType::Uuid,
            _ => return Err(metadata_err!("invalid compact type id {}", nibble)),
        })
    }

}

const STOP: u8 = 0x00;
const MAX_VARINT_BYTES: usize = 10;

/// A compact-protocol reader over any byte source.
///
/// Reentrant per stream: one reader decodes one footer or one page header at
/// a time, tracking the field-id delta chain across nested structs.
pub struct ThriftCompactReader<R: Read> {
    input: R,
    last_field_id: i16,
    field_id_stack: Vec<i16>,
}

impl<R: Read> ThriftCompactReader<R> {
    pub fn new(input: R) -> Self {
        Self {
            input,
            last_field_id: 0,
            field_id_stack: Vec::new(),
        }
    }

    /// Gives the underlying byte source back to the caller.
    pub fn into_inner(self) -> R {
        self.input
    }

    pub fn read_byte(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.input.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    /// Unsigned LEB128.
    pub fn read_varint(&mut self) -> Result<u64> {
        let mut result: u64 = 0;
        for shift_bytes in 0..MAX_VARINT_BYTES {
            let byte = self.read_byte()?;
            result |= ((byte & 0x7f) as u64) << (shift_bytes * 7);
            if byte & 0x80 == 0 {
                return Ok(result);
            }
        }
        Err(metadata_err!("varint longer than 10 bytes"))
    }

    /// Zig-zag decoded signed integer.
    pub fn read_zigzag(&mut self) -> Result<i64> {
        let unsigned = self.read_varint()?;
        Ok((unsigned >> 1) as i64 ^ -((unsigned & 1) as i64))
    }

    /// Rejects a field whose wire type does not match what the metadata
    /// schema declares for it.
    fn expect(&self, actual: FieldType, expected: FieldType) -> Result<()> {
        if actual != expected {
            return Err(metadata_err!(
                "expected {:?} field, found {:?}",
                expected,
                actual
            ));
        }
        Ok(())
    }

    pub fn read_i8(&mut self, field_type: FieldType) -> Result<i8> {
        self.expect(field_type, FieldType::Byte)?;
        Ok(self.read_byte()? as i8)
    }

    pub fn read_i16(&mut self, field_type: FieldType) -> Result<i16> {
        self.expect(field_type, FieldType::I16)?;
        let v = self.read_zigzag()?;
        i16::try_from(v).map_err(|_| metadata_err!("i16 field out of range: {}", v))
    }

    pub fn read_i32(&mut self, field_type: FieldType) -> Result<i32> {
        self.expect(field_type, FieldType::I32)?;
        let v = self.read_zigzag()?;
        i32::try_from(v).map_err(|_| metadata_err!("i32 field out of range: {}", v))
    }

    pub fn read_i64(&mut self, field_type: FieldType) -> Result<i64> {
        self.expect(field_type, FieldType::I64)?;
        self.read_zigzag()
    }

    pub fn read_bool(&mut self, field_type: FieldType) -> Result<bool> {
        match field_type {
            FieldType::BoolTrue => Ok(true),
            FieldType::BoolFalse => Ok(false),
            other => Err(metadata_err!("expected bool field, found {:?}", other)),
        }
    }

    pub fn read_binary(&mut self, field_type: FieldType) -> Result<Vec<u8>> {
        self.expect(field_type, FieldType::Binary)?;
        self.read_binary_body()
    }

    pub fn read_string(&mut self, field_type: FieldType) -> Result<String> {
        let bytes = self.read_binary(field_type)?;
        String::from_utf8(bytes).map_err(|e| metadata_err!("string field is not utf8: {}", e))
    }

    fn read_binary_body(&mut self) -> Result<Vec<u8>> {
        let len = self.read_varint()? as usize;
        let mut buf = vec![0u8; len];
        self.input.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Starts a nested struct; field-id deltas restart from zero inside.
    pub fn read_struct_begin(&mut self) {
        self.field_id_stack.push(self.last_field_id);
        self.last_field_id = 0;
    }

    pub fn read_struct_end(&mut self) {
        self.last_field_id = self.field_id_stack.pop().unwrap_or(0);
    }

    /// Returns the next field's id and wire type, or `None` at the stop byte.
    pub fn read_field_header(&mut self) -> Result<Option<(i16, FieldType)>> {
        let byte = self.read_byte()?;
        if byte == STOP {
            return Ok(None);
        }
        let field_type = FieldType::from_nibble(byte & 0x0f)?;
        let delta = (byte >> 4) as i16;
        let field_id = if delta != 0 {
            self.last_field_id
                .checked_add(delta)
                .ok_or_else(|| metadata_err!("field id overflow"))?
        } else {
            let v = self.read_zigzag()?;
            i16::try_from(v).map_err(|_| metadata_err!("impossible field id {}", v))?
        };
        if field_id < 1 {
            return Err(metadata_err!("impossible field id {}", field_id));
        }
        self.last_field_id = field_id;
        Ok(Some((field_id, field_type)))
    }

    /// Returns element type and length of a list.
    pub fn read_list_header(&mut self) -> Result<(FieldType, usize)> {
        let byte = self.read_byte()?;
        let element_type = FieldType::from_nibble(byte & 0x0f)?;
        let size_short = (byte >> 4) as usize;
        let size = if size_short == 15 {
            self.read_varint()? as usize
        } else {
            size_short
        };
        Ok((element_type, size))
    }

    /// Consumes a correctly sized payload for a field of the given type.
    /// Lists and structs recurse; the unsupported types fail rather than
    /// desync the stream.
    pub fn skip(&mut self, field_type: FieldType) -> Result<()> {
        match field_type {
            FieldType::BoolTrue | FieldType::BoolFalse => Ok(()),
            FieldType::Byte => self.read_byte().map(|_| ()),
            FieldType::I16 | FieldType::I32 | FieldType::I64 => {
                self.read_zigzag().map(|_| ())
            }
            FieldType::Binary => self.read_binary_body().map(|_| ()),
            FieldType::List => {
                let (element_type, size) = self.read_list_header()?;
                for _ in 0..size {
                    self.skip_list_element(element_type)?;
                }
                Ok(())
            }
            FieldType::Struct => {
                self.read_struct_begin();
                while let Some((_, nested_type)) = self.read_field_header()? {
                    self.skip(nested_type)?;
                }
                self.read_struct_end();
                Ok(())
            }
            FieldType::Double | FieldType::Set | FieldType::Map | FieldType::Uuid => Err(
                unsupported_err!("thrift type {:?} does not occur in Parquet metadata", field_type),
            ),
        }
    }

    /// List elements encode booleans as one byte rather than in a header.
    fn skip_list_element(&mut self, element_type: FieldType) -> Result<()> {
        match element_type {
            FieldType::BoolTrue | FieldType::BoolFalse => self.read_byte().map(|_| ()),
            other => self.skip(other),
        }
    }
}
