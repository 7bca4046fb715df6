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

//! A read-only decoder for the [Apache Parquet](https://parquet.apache.org)
//! columnar file format.
//!
//! The crate opens a Parquet file, parses its footer, exposes schema and row
//! group metadata, and materialises per-column values into typed vectors. The
//! Thrift Compact Protocol footer, the physical page encodings and the SNAPPY
//! and LZ4 decompressors are decoded in-tree; GZIP and ZSTD pages go through
//! `flate2` and `zstd`.
//!
//! # Example
//!
//! ```no_run
//! use parq::column::reader::read_column;
//! use parq::data_type::DoubleType;
//! use parq::file::reader::FileReader;
//! use parq::file::serialized_reader::SerializedFileReader;
//!
//! let reader = SerializedFileReader::try_from("data.parquet").unwrap();
//! let row_group = reader.get_row_group(0).unwrap();
//! let fares = read_column::<DoubleType>(&*row_group, 0).unwrap();
//! println!("{} values, first {:?}", fares.len(), fares.first());
//! ```

#[macro_use]
pub mod errors;
#[macro_use]
pub mod util;

pub mod basic;
pub mod column;
pub mod compression;
pub mod data_type;
pub mod encodings;
pub mod file;
pub mod format;
pub mod logical;
pub mod schema;
pub mod thrift;
