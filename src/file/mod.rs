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

//! Main entrypoint for working with Parquet API.
//!
//! Provides access to file and row group readers, file and column chunk
//! metadata, and statistics.
//!
//! See [`serialized_reader::SerializedFileReader`] for a starting reference.

pub mod footer;
pub mod metadata;
pub mod reader;
pub mod serialized_reader;
pub mod statistics;

pub const FOOTER_SIZE: usize = 8;
pub const PARQUET_MAGIC: [u8; 4] = *b"PAR1";
/// Magic of footer-encrypted files, recognised only to be rejected.
pub const PARQUET_MAGIC_ENCRYPTED: [u8; 4] = *b"PARE";
