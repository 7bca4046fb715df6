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

//! Adapters from physical arrays to their logical-type interpretation.
//!
//! Most logical types are reinterpretations of the physical bytes (dates,
//! times, timestamps, UUIDs, small-width integers, strings); DECIMAL is the
//! one real conversion, dividing the unscaled integer by `10^scale`.
//! Every scalar adapter has the same shape, so arrays (and optional arrays,
//! preserving nullability) convert through [`map_values`] and
//! [`map_optional_values`].

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use num::ToPrimitive;
use num_bigint::BigInt;

use crate::data_type::{ByteArray, FixedLenByteArray, Int96};
use crate::errors::{ParquetError, Result};

/// Applies a scalar adapter across a value slice.
pub fn map_values<T, U>(values: &[T], adapter: impl Fn(&T) -> Result<U>) -> Result<Vec<U>> {
    values.iter().map(adapter).collect()
}

/// Applies a scalar adapter across an optional value slice, preserving nulls.
pub fn map_optional_values<T, U>(
    values: &[Option<T>],
    adapter: impl Fn(&T) -> Result<U>,
) -> Result<Vec<Option<U>>> {
    values
        .iter()
        .map(|value| value.as_ref().map(&adapter).transpose())
        .collect()
}

// ----------------------------------------------------------------------
// Dates, times, timestamps

/// DATE: days since the Unix epoch.
pub fn date_from_days(days: &i32) -> Result<NaiveDate> {
    epoch_date()
        .checked_add_signed(Duration::days(*days as i64))
        .ok_or_else(|| decode_err!("DATE of {} days is out of range", days))
}

/// TIME (millis): milliseconds since midnight.
pub fn time_from_millis(millis: &i32) -> Result<NaiveTime> {
    if *millis < 0 {
        return Err(decode_err!("negative TIME {}", millis));
    }
    let seconds = (millis / 1000) as u32;
    let nanos = (millis % 1000) as u32 * 1_000_000;
    NaiveTime::from_num_seconds_from_midnight_opt(seconds, nanos)
        .ok_or_else(|| decode_err!("TIME of {} millis is out of range", millis))
}

/// TIME (micros): microseconds since midnight.
pub fn time_from_micros(micros: &i64) -> Result<NaiveTime> {
    if *micros < 0 {
        return Err(decode_err!("negative TIME {}", micros));
    }
    let seconds = (micros / 1_000_000) as u32;
    let nanos = (micros % 1_000_000) as u32 * 1_000;
    NaiveTime::from_num_seconds_from_midnight_opt(seconds, nanos)
        .ok_or_else(|| decode_err!("TIME of {} micros is out of range", micros))
}

/// TIMESTAMP (millis) since the Unix epoch.
pub fn timestamp_from_millis(millis: &i64) -> Result<NaiveDateTime> {
    timestamp(millis.div_euclid(1_000), millis.rem_euclid(1_000) as u32 * 1_000_000)
}

/// TIMESTAMP (micros) since the Unix epoch.
pub fn timestamp_from_micros(micros: &i64) -> Result<NaiveDateTime> {
    timestamp(micros.div_euclid(1_000_000), micros.rem_euclid(1_000_000) as u32 * 1_000)
}

/// TIMESTAMP (nanos) since the Unix epoch.
pub fn timestamp_from_nanos(nanos: &i64) -> Result<NaiveDateTime> {
    timestamp(nanos.div_euclid(1_000_000_000), nanos.rem_euclid(1_000_000_000) as u32)
}

/// Legacy INT96 timestamp: Julian day plus nanoseconds within the day.
pub fn timestamp_from_int96(value: &Int96) -> Result<NaiveDateTime> {
    timestamp_from_nanos(&value.to_nanos())
}

fn timestamp(seconds: i64, subsecond_nanos: u32) -> Result<NaiveDateTime> {
    NaiveDateTime::from_timestamp_opt(seconds, subsecond_nanos)
        .ok_or_else(|| decode_err!("TIMESTAMP of {} seconds is out of range", seconds))
}

fn epoch_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()
}

// ----------------------------------------------------------------------
// Strings and byte-backed types

/// UTF8 / ENUM / JSON: the byte array viewed as a string.
pub fn utf8(value: &ByteArray) -> Result<&str> {
    value.as_utf8()
}

/// UUID: FIXED_LEN_BYTE_ARRAY(16) in its canonical hyphenated form.
pub fn uuid_from_fixed(value: &FixedLenByteArray) -> Result<String> {
    let data = value.data();
    if data.len() != 16 {
        return Err(decode_err!("UUID must be 16 bytes, found {}", data.len()));
    }
    let hex: Vec<String> = data.iter().map(|byte| format!("{:02x}", byte)).collect();
    let hex = hex.concat();
    Ok(format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    ))
}

/// FLOAT16: FIXED_LEN_BYTE_ARRAY(2), little-endian IEEE half precision.
pub fn float16_from_fixed(value: &FixedLenByteArray) -> Result<f32> {
    let data = value.data();
    if data.len() != 2 {
        return Err(decode_err!("FLOAT16 must be 2 bytes, found {}", data.len()));
    }
    Ok(f16_bits_to_f32(u16::from_le_bytes([data[0], data[1]])))
}

fn f16_bits_to_f32(bits: u16) -> f32 {
    let sign = ((bits >> 15) as u32) << 31;
    let exponent = (bits >> 10) & 0x1f;
    let fraction = (bits & 0x3ff) as u32;
    match exponent {
        0 => {
            // signed zero or subnormal
            let magnitude = fraction as f32 * (-24f32).exp2();
            if sign == 0 {
                magnitude
            } else {
                -magnitude
            }
        }
        0x1f => {
            if fraction == 0 {
                f32::from_bits(sign | 0x7f80_0000)
            } else {
                f32::NAN
            }
        }
        _ => f32::from_bits(sign | ((exponent as u32 - 15 + 127) << 23) | (fraction << 13)),
    }
}

// ----------------------------------------------------------------------
// DECIMAL

/// A decimal value as its exact unscaled integer plus scale.
#[derive(Debug, Clone, PartialEq)]
pub struct Decimal {
    unscaled: BigInt,
    scale: i32,
}

impl Decimal {
    /// DECIMAL backed by INT32.
    pub fn from_i32(unscaled: i32, scale: i32) -> Self {
        Self {
            unscaled: BigInt::from(unscaled),
            scale,
        }
    }

    /// DECIMAL backed by INT64.
    pub fn from_i64(unscaled: i64, scale: i32) -> Self {
        Self {
            unscaled: BigInt::from(unscaled),
            scale,
        }
    }

    /// DECIMAL backed by BYTE_ARRAY or FIXED_LEN_BYTE_ARRAY: big-endian
    /// two's-complement unscaled value.
    pub fn from_bytes(unscaled_be: &[u8], scale: i32) -> Result<Self> {
        if unscaled_be.is_empty() {
            return Err(decode_err!("empty DECIMAL payload"));
        }
        Ok(Self {
            unscaled: BigInt::from_signed_bytes_be(unscaled_be),
            scale,
        })
    }

    /// The exact unscaled integer.
    pub fn unscaled(&self) -> &BigInt {
        &self.unscaled
    }

    /// The scale, i.e. the count of fractional decimal digits.
    pub fn scale(&self) -> i32 {
        self.scale
    }

    /// The value divided down by `10^scale`, as a double.
    pub fn to_f64(&self) -> f64 {
        let unscaled = self.unscaled.to_f64().unwrap_or(f64::NAN);
        unscaled / 10f64.powi(self.scale)
    }
}

impl std::fmt::Display for Decimal {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if self.scale <= 0 {
            return write!(f, "{}", &self.unscaled);
        }
        let negative = self.unscaled.sign() == num_bigint::Sign::Minus;
        let digits = self.unscaled.magnitude().to_string();
        let scale = self.scale as usize;
        let (integral, fraction) = if digits.len() > scale {
            let split = digits.len() - scale;
            (digits[..split].to_string(), digits[split..].to_string())
        } else {
            ("0".to_string(), format!("{:0>width$}", digits, width = scale))
        };
        write!(f, "{}{}.{}", if negative { "-" } else { "" }, integral, fraction)
    }
}

/// DECIMAL from an INT32 column at the given scale.
pub fn decimal_from_i32(scale: i32) -> impl Fn(&i32) -> Result<Decimal> {
    move |unscaled| Ok(Decimal::from_i32(*unscaled, scale))
}

/// DECIMAL from an INT64 column at the given scale.
pub fn decimal_from_i64(scale: i32) -> impl Fn(&i64) -> Result<Decimal> {
    move |unscaled| Ok(Decimal::from_i64(*unscaled, scale))
}

/// DECIMAL from a BYTE_ARRAY column at the given scale.
pub fn decimal_from_bytes(scale: i32) -> impl Fn(&ByteArray) -> Result<Decimal> {
    move |unscaled| Decimal::from_bytes(unscaled.data(), scale)
}

/// DECIMAL from a FIXED_LEN_BYTE_ARRAY column at the given scale.
pub fn decimal_from_fixed(scale: i32) -> impl Fn(&FixedLenByteArray) -> Result<Decimal> {
    move |unscaled| Decimal::from_bytes(unscaled.data(), scale)
}

// ----------------------------------------------------------------------
// Small-width integers

/// INT_8 / INTEGER(8, signed): the low byte of the INT32 representation.
pub fn int8(value: &i32) -> Result<i8> {
    Ok(*value as i8)
}

/// INT_16 / INTEGER(16, signed).
pub fn int16(value: &i32) -> Result<i16> {
    Ok(*value as i16)
}

/// UINT_8 / INTEGER(8, unsigned).
pub fn uint8(value: &i32) -> Result<u8> {
    Ok(*value as u8)
}

/// UINT_16 / INTEGER(16, unsigned).
pub fn uint16(value: &i32) -> Result<u16> {
    Ok(*value as u16)
}

/// UINT_32 / INTEGER(32, unsigned).
pub fn uint32(value: &i32) -> Result<u32> {
    Ok(*value as u32)
}

/// UINT_64 / INTEGER(64, unsigned).
pub fn uint64(value: &i64) -> Result<u64> {
    Ok(*value as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_from_days() {
        assert_eq!(
            date_from_days(&0).unwrap(),
            NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()
        );
        assert_eq!(
            date_from_days(&19_000).unwrap(),
            NaiveDate::from_ymd_opt(2022, 1, 8).unwrap()
        );
        assert_eq!(
            date_from_days(&-1).unwrap(),
            NaiveDate::from_ymd_opt(1969, 12, 31).unwrap()
        );
    }

    #[test]
    fn test_time_adapters() {
        let time = time_from_millis(&((2 * 3600 + 3 * 60 + 4) * 1000 + 567)).unwrap();
        assert_eq!(time, NaiveTime::from_hms_milli_opt(2, 3, 4, 567).unwrap());
        assert!(time_from_millis(&-1).is_err());

        let time = time_from_micros(&(1_000_000 * 59 + 5)).unwrap();
        assert_eq!(
            time,
            NaiveTime::from_num_seconds_from_midnight_opt(59, 5_000).unwrap()
        );
    }

    #[test]
    fn test_timestamp_adapters() {
        let expected = NaiveDate::from_ymd_opt(2001, 9, 9)
            .unwrap()
            .and_hms_milli_opt(1, 46, 40, 500)
            .unwrap();
        assert_eq!(timestamp_from_millis(&1_000_000_000_500).unwrap(), expected);
        assert_eq!(
            timestamp_from_micros(&1_000_000_000_500_000).unwrap(),
            expected
        );

        // negative timestamps land before the epoch
        let before_epoch = timestamp_from_millis(&-1).unwrap();
        assert_eq!(
            before_epoch,
            NaiveDateTime::from_timestamp_opt(-1, 999_000_000).unwrap()
        );
    }

    #[test]
    fn test_int96_timestamp() {
        let mut value = Int96::new();
        // epoch day, 1 nanosecond in
        value.set_data(1, 0, 2_440_588);
        assert_eq!(
            timestamp_from_int96(&value).unwrap(),
            NaiveDateTime::from_timestamp_opt(0, 1).unwrap()
        );
    }

    #[test]
    fn test_uuid() {
        let raw: Vec<u8> = (0u8..16).collect();
        let uuid = uuid_from_fixed(&FixedLenByteArray::from(raw)).unwrap();
        assert_eq!(uuid, "00010203-0405-0607-0809-0a0b0c0d0e0f");
        assert!(uuid_from_fixed(&FixedLenByteArray::from(vec![0u8; 4])).is_err());
    }

    #[test]
    fn test_float16() {
        let cases = [
            (0x3c00u16, 1.0f32),
            (0xc000, -2.0),
            (0x0000, 0.0),
            (0x7bff, 65504.0),
            (0x0001, 5.960_464_5e-8),
        ];
        for (bits, expected) in cases {
            let value = FixedLenByteArray::from(bits.to_le_bytes().to_vec());
            assert_eq!(float16_from_fixed(&value).unwrap(), expected);
        }
        let infinity = FixedLenByteArray::from(0x7c00u16.to_le_bytes().to_vec());
        assert_eq!(float16_from_fixed(&infinity).unwrap(), f32::INFINITY);
        let nan = FixedLenByteArray::from(0x7c01u16.to_le_bytes().to_vec());
        assert!(float16_from_fixed(&nan).unwrap().is_nan());
    }

    #[test]
    fn test_decimal_from_integers() {
        let decimal = Decimal::from_i32(12345, 2);
        assert_eq!(decimal.to_f64(), 123.45);
        assert_eq!(decimal.to_string(), "123.45");

        let decimal = Decimal::from_i64(-7, 3);
        assert_eq!(decimal.to_f64(), -0.007);
        assert_eq!(decimal.to_string(), "-0.007");
    }

    #[test]
    fn test_decimal_from_big_endian_bytes() {
        // 0x01e240 == 123456
        let decimal = Decimal::from_bytes(&[0x01, 0xe2, 0x40], 3).unwrap();
        assert_eq!(decimal.to_f64(), 123.456);

        // 0xff == -1 in two's complement
        let decimal = Decimal::from_bytes(&[0xff], 0).unwrap();
        assert_eq!(decimal.to_f64(), -1.0);

        assert!(Decimal::from_bytes(&[], 0).is_err());
    }

    #[test]
    fn test_adapters_preserve_nullability() {
        let values = vec![Some(0i32), None, Some(1)];
        let dates = map_optional_values(&values, date_from_days).unwrap();
        assert_eq!(
            dates,
            vec![
                Some(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()),
                None,
                Some(NaiveDate::from_ymd_opt(1970, 1, 2).unwrap())
            ]
        );
    }

    #[test]
    fn test_small_int_adapters() {
        assert_eq!(int8(&-1).unwrap(), -1i8);
        assert_eq!(int16(&0x7fff).unwrap(), i16::MAX);
        assert_eq!(uint8(&255).unwrap(), 255u8);
        assert_eq!(uint16(&65_535).unwrap(), u16::MAX);
        assert_eq!(uint32(&-1).unwrap(), u32::MAX);
        assert_eq!(uint64(&-1).unwrap(), u64::MAX);
    }
}
