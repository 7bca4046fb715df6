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

//! Per-chunk and per-page statistics, as carried in the footer and page
//! headers. Parsed and exposed, not interpreted: min/max stay in their
//! physical-type byte representation.

use crate::format;

/// Statistics for one column chunk or data page.
#[derive(Debug, Clone, PartialEq)]
pub struct Statistics {
    min_bytes: Option<Vec<u8>>,
    max_bytes: Option<Vec<u8>>,
    null_count: Option<i64>,
    distinct_count: Option<i64>,
}

impl Statistics {
    /// Converts Thrift definition into `Statistics`.
    ///
    /// The modern `min_value`/`max_value` fields take precedence over the
    /// deprecated signed-comparison `min`/`max` pair when both are present.
    pub fn from_thrift(thrift_stats: Option<format::Statistics>) -> Option<Statistics> {
        let stats = thrift_stats?;
        let min_bytes = stats.min_value.or(stats.min);
        let max_bytes = stats.max_value.or(stats.max);
        Some(Statistics {
            min_bytes,
            max_bytes,
            null_count: stats.null_count,
            distinct_count: stats.distinct_count,
        })
    }

    /// Returns the raw little-endian (or byte-array) encoded minimum value.
    pub fn min_bytes(&self) -> Option<&[u8]> {
        self.min_bytes.as_deref()
    }

    /// Returns the raw little-endian (or byte-array) encoded maximum value.
    pub fn max_bytes(&self) -> Option<&[u8]> {
        self.max_bytes.as_deref()
    }

    /// Returns the number of nulls recorded for the chunk or page.
    pub fn null_count(&self) -> Option<i64> {
        self.null_count
    }

    /// Returns the number of distinct values, when the writer recorded it.
    pub fn distinct_count(&self) -> Option<i64> {
        self.distinct_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_thrift_prefers_new_fields() {
        let thrift_stats = format::Statistics {
            max: Some(vec![9]),
            min: Some(vec![1]),
            null_count: Some(4),
            distinct_count: None,
            max_value: Some(vec![8]),
            min_value: Some(vec![2]),
        };
        let stats = Statistics::from_thrift(Some(thrift_stats)).unwrap();
        assert_eq!(stats.min_bytes(), Some(&[2u8][..]));
        assert_eq!(stats.max_bytes(), Some(&[8u8][..]));
        assert_eq!(stats.null_count(), Some(4));
        assert_eq!(stats.distinct_count(), None);
    }

    #[test]
    fn test_from_thrift_falls_back_to_deprecated_fields() {
        let thrift_stats = format::Statistics {
            max: Some(vec![9]),
            min: Some(vec![1]),
            null_count: None,
            distinct_count: None,
            max_value: None,
            min_value: None,
        };
        let stats = Statistics::from_thrift(Some(thrift_stats)).unwrap();
        assert_eq!(stats.min_bytes(), Some(&[1u8][..]));
        assert_eq!(stats.max_bytes(), Some(&[9u8][..]));
    }

    #[test]
    fn test_from_thrift_none() {
        assert!(Statistics::from_thrift(None).is_none());
    }
}
