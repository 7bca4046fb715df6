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

//! Common Parquet errors and macros.

use std::{cell, io, result, str};

/// Errors surfaced while reading a Parquet file.
///
/// The variants are disjoint by cause: a file that fails the outer layout
/// checks is `MalformedFile`, a footer or page header that violates the
/// Thrift encoding or the metadata schema is `MalformedMetadata`, and so on
/// down to `ShortInput` for a byte source that ran dry mid-read.
#[derive(Debug)]
pub enum ParquetError {
    /// Magic missing, file too small, or footer length out of range.
    MalformedFile(String),
    /// Compact-protocol violation, wire-type mismatch against the metadata
    /// schema, missing required field, or impossible field id.
    MalformedMetadata(String),
    /// A feature the file requires but this crate does not implement
    /// (encryption, unknown codec or encoding, out-of-range fixed length,
    /// encoding applied to an incompatible physical type).
    Unsupported(String),
    /// Codec- or encoding-level payload corruption.
    Decode(String),
    /// Caller-requested type is incompatible with the column's physical type.
    TypeMismatch(String),
    /// A dictionary-encoded page arrived before any dictionary page.
    MissingDictionary(String),
    /// A second dictionary page arrived for the same column chunk.
    DuplicateDictionary(String),
    /// The underlying byte source returned fewer bytes than required.
    ShortInput(String),
    /// An error from the underlying reader that is not a plain short read.
    External(Box<dyn std::error::Error + Send + Sync>),
}

impl std::fmt::Display for ParquetError {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ParquetError::MalformedFile(message) => {
                write!(fmt, "Malformed Parquet file: {}", message)
            }
            ParquetError::MalformedMetadata(message) => {
                write!(fmt, "Malformed Parquet metadata: {}", message)
            }
            ParquetError::Unsupported(message) => {
                write!(fmt, "Unsupported Parquet feature: {}", message)
            }
            ParquetError::Decode(message) => write!(fmt, "Decode error: {}", message),
            ParquetError::TypeMismatch(message) => {
                write!(fmt, "Type mismatch: {}", message)
            }
            ParquetError::MissingDictionary(message) => {
                write!(fmt, "Missing dictionary page: {}", message)
            }
            ParquetError::DuplicateDictionary(message) => {
                write!(fmt, "Duplicate dictionary page: {}", message)
            }
            ParquetError::ShortInput(message) => {
                write!(fmt, "Unexpected end of input: {}", message)
            }
            ParquetError::External(e) => write!(fmt, "External error: {}", e),
        }
    }
}

impl std::error::Error for ParquetError {
    fn cause(&self) -> Option<&dyn std::error::Error> {
        match self {
            ParquetError::External(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<io::Error> for ParquetError {
    fn from(e: io::Error) -> ParquetError {
        match e.kind() {
            io::ErrorKind::UnexpectedEof => {
                ParquetError::ShortInput(format!("underlying reader: {}", e))
            }
            _ => ParquetError::External(Box::new(e)),
        }
    }
}

impl From<str::Utf8Error> for ParquetError {
    fn from(e: str::Utf8Error) -> ParquetError {
        ParquetError::MalformedMetadata(format!("underlying utf8 error: {}", e))
    }
}

impl From<cell::BorrowMutError> for ParquetError {
    fn from(e: cell::BorrowMutError) -> ParquetError {
        ParquetError::External(Box::new(e))
    }
}

/// A specialized `Result` for Parquet errors.
pub type Result<T, E = ParquetError> = result::Result<T, E>;

// ----------------------------------------------------------------------
// Conversion from `ParquetError` to `io::Error`.

impl From<ParquetError> for io::Error {
    fn from(e: ParquetError) -> Self {
        io::Error::new(io::ErrorKind::Other, e)
    }
}

// ----------------------------------------------------------------------
// Convenient macros for different errors.

macro_rules! malformed_err {
    ($fmt:expr) => (ParquetError::MalformedFile($fmt.to_owned()));
    ($fmt:expr, $($args:expr),*) => (ParquetError::MalformedFile(format!($fmt, $($args),*)));
}

macro_rules! metadata_err {
    ($fmt:expr) => (ParquetError::MalformedMetadata($fmt.to_owned()));
    ($fmt:expr, $($args:expr),*) => (ParquetError::MalformedMetadata(format!($fmt, $($args),*)));
}

macro_rules! unsupported_err {
    ($fmt:expr) => (ParquetError::Unsupported($fmt.to_owned()));
    ($fmt:expr, $($args:expr),*) => (ParquetError::Unsupported(format!($fmt, $($args),*)));
}

macro_rules! decode_err {
    ($fmt:expr) => (ParquetError::Decode($fmt.to_owned()));
    ($fmt:expr, $($args:expr),*) => (ParquetError::Decode(format!($fmt, $($args),*)));
}

macro_rules! type_mismatch_err {
    ($fmt:expr) => (ParquetError::TypeMismatch($fmt.to_owned()));
    ($fmt:expr, $($args:expr),*) => (ParquetError::TypeMismatch(format!($fmt, $($args),*)));
}

macro_rules! short_input_err {
    ($fmt:expr) => (ParquetError::ShortInput($fmt.to_owned()));
    ($fmt:expr, $($args:expr),*) => (ParquetError::ShortInput(format!($fmt, $($args),*)));
}

impl ParquetError {
    /// Prefixes the error message with the column path it occurred in, so a
    /// failure deep in a page decode still names the column.
    pub(crate) fn with_column_context(self, column: &str) -> Self {
        let tag = |message: String| format!("column '{}': {}", column, message);
        match self {
            ParquetError::MalformedFile(m) => ParquetError::MalformedFile(tag(m)),
            ParquetError::MalformedMetadata(m) => ParquetError::MalformedMetadata(tag(m)),
            ParquetError::Unsupported(m) => ParquetError::Unsupported(tag(m)),
            ParquetError::Decode(m) => ParquetError::Decode(tag(m)),
            ParquetError::TypeMismatch(m) => ParquetError::TypeMismatch(tag(m)),
            ParquetError::MissingDictionary(m) => ParquetError::MissingDictionary(tag(m)),
            ParquetError::DuplicateDictionary(m) => {
                ParquetError::DuplicateDictionary(tag(m))
            }
            ParquetError::ShortInput(m) => ParquetError::ShortInput(tag(m)),
            other => other,
        }
    }
}
