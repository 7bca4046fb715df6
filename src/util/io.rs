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

//! Buffered positional reads over clone-able byte sources.

use std::io::{self, Read, Seek, SeekFrom};

/// Sources that can hand out an independent handle to the same underlying
/// bytes, e.g. `std::fs::File`.
pub trait TryClone: Sized {
    fn try_clone(&self) -> io::Result<Self>;
}

const DEFAULT_BUF_SIZE: usize = 8 * 1024;

/// A buffered [`Read`] over a window `[start, start + length)` of a seekable
/// source. Holds its own handle, so several sources over one file can be
/// read independently.
pub struct FileSource<R: Read + Seek> {
    reader: R,
    /// Bytes of the window not yet handed to the caller.
    remaining: u64,
    buf: Vec<u8>,
    buf_pos: usize,
    buf_len: usize,
}

impl<R: Read + Seek> FileSource<R> {
    /// Positions `reader` at `start` and serves at most `length` bytes.
    pub fn new(reader: &R, start: u64, length: usize) -> io::Result<Self>
    where
        R: TryClone,
    {
        let mut reader = reader.try_clone()?;
        reader.seek(SeekFrom::Start(start))?;
        Ok(Self {
            reader,
            remaining: length as u64,
            buf: vec![0u8; DEFAULT_BUF_SIZE],
            buf_pos: 0,
            buf_len: 0,
        })
    }

    fn refill(&mut self) -> io::Result<()> {
        let want = std::cmp::min(self.buf.len() as u64, self.remaining) as usize;
        let read = self.reader.read(&mut self.buf[..want])?;
        self.buf_pos = 0;
        self.buf_len = read;
        Ok(())
    }
}

impl<R: Read + Seek> Read for FileSource<R> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if self.remaining == 0 || out.is_empty() {
            return Ok(0);
        }
        if self.buf_pos == self.buf_len {
            self.refill()?;
            if self.buf_len == 0 {
                return Ok(0);
            }
        }
        let available = self.buf_len - self.buf_pos;
        let n = [available as u64, self.remaining, out.len() as u64]
            .into_iter()
            .min()
            .unwrap() as usize;
        out[..n].copy_from_slice(&self.buf[self.buf_pos..self.buf_pos + n]);
        self.buf_pos += n;
        self.remaining -= n as u64;
        Ok(n)
    }
}

impl TryClone for std::fs::File {
    fn try_clone(&self) -> io::Result<Self> {
        std::fs::File::try_clone(self)
    }
}
