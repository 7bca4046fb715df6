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

//! End-to-end scenarios over generated files: a wide taxi-trip shaped table,
//! the dynamic-dispatch sweep, and nested LIST/MAP assembly.

mod common;

use bytes::Bytes;
use common::*;

use parq::column::dynamic::read_column_dynamic;
use parq::column::nested::{read_list_column, read_map_column};
use parq::column::reader::{read_column, read_optional_column};
use parq::data_type::{ByteArrayType, DoubleType, Int32Type, Int64Type};
use parq::file::reader::{FileReader, RowGroupReader};
use parq::file::serialized_reader::SerializedFileReader;

const TAXI_ROWS: usize = 49_416;

fn taxi_fares() -> Vec<f64> {
    let mut fares = vec![5.8, 11.4, 10.0];
    fares.extend((3..TAXI_ROWS).map(|i| (i % 500) as f64 * 0.25));
    fares
}

/// Definition level and value (when present) for the optional
/// passenger_count column: every 11th row is null, the first rows hold 1.
fn taxi_passengers() -> (Vec<i16>, Vec<i64>) {
    let mut def_levels = Vec::with_capacity(TAXI_ROWS);
    let mut values = Vec::new();
    for i in 0..TAXI_ROWS {
        if i >= 3 && i % 11 == 10 {
            def_levels.push(0);
        } else {
            def_levels.push(1);
            values.push(if i < 3 { 1 } else { (i % 6 + 1) as i64 });
        }
    }
    (def_levels, values)
}

fn taxi_file() -> Vec<u8> {
    let fares = taxi_fares();
    let (passenger_defs, passenger_values) = taxi_passengers();

    // fare_amount: plain double, snappy, several pages
    let mut fare_chunk = ChunkBuilder::new(SNAPPY);
    for page in fares.chunks(10_000) {
        fare_chunk.data_page_v1(page.len() as i32, PLAIN, None, None, &plain_f64(page));
    }

    // passenger_count: optional int64 with nulls, one page per 20k levels
    let mut passenger_chunk = ChunkBuilder::new(SNAPPY);
    let mut consumed_values = 0;
    for def_page in passenger_defs.chunks(20_000) {
        let non_null = def_page.iter().filter(|&&def| def == 1).count();
        let page_values = &passenger_values[consumed_values..consumed_values + non_null];
        consumed_values += non_null;
        passenger_chunk.data_page_v1(
            def_page.len() as i32,
            PLAIN,
            None,
            Some((def_page, 1)),
            &plain_i64(page_values),
        );
    }

    // vendor: low-cardinality strings through a dictionary
    let vendors: [&[u8]; 3] = [b"CMT", b"VTS", b"DDS"];
    let vendor_indices: Vec<u64> = (0..TAXI_ROWS).map(|i| (i % 3) as u64).collect();
    let mut vendor_chunk = ChunkBuilder::new(SNAPPY);
    vendor_chunk.dictionary_page(&plain_byte_array(&vendors), vendors.len() as i32);
    vendor_chunk.data_page_v1(
        TAXI_ROWS as i32,
        RLE_DICTIONARY,
        None,
        None,
        &dict_indices(&vendor_indices, 2),
    );

    build_file(
        vec![
            root(3),
            leaf("fare_amount", DOUBLE, REQUIRED),
            leaf("passenger_count", INT64, OPTIONAL),
            leaf("vendor", BYTE_ARRAY, REQUIRED),
        ],
        vec![RowGroupSpec {
            num_rows: TAXI_ROWS as i64,
            chunks: vec![
                fare_chunk.finish(vec!["fare_amount".to_string()], DOUBLE),
                passenger_chunk.finish(vec!["passenger_count".to_string()], INT64),
                vendor_chunk.finish(vec!["vendor".to_string()], BYTE_ARRAY),
            ],
        }],
    )
}

#[test]
fn taxi_shaped_file_reads_back() {
    let reader = SerializedFileReader::new(Bytes::from(taxi_file())).unwrap();
    let metadata = reader.metadata();
    assert_eq!(metadata.file_metadata().num_rows(), TAXI_ROWS as i64);
    assert_eq!(metadata.num_row_groups(), 1);

    let row_group = reader.get_row_group(0).unwrap();

    let fares = read_column::<DoubleType>(&*row_group, 0).unwrap();
    assert_eq!(fares.len(), TAXI_ROWS);
    assert_eq!(&fares[..3], &[5.8, 11.4, 10.0]);

    let passengers = read_optional_column::<Int64Type>(&*row_group, 1).unwrap();
    assert_eq!(passengers.len(), TAXI_ROWS);
    assert_eq!(&passengers[..3], &[Some(1), Some(1), Some(1)]);
    assert!(passengers.iter().any(|p| p.is_none()));

    let vendors = read_column::<ByteArrayType>(&*row_group, 2).unwrap();
    assert_eq!(vendors.len(), TAXI_ROWS);
    assert_eq!(vendors[0].data(), b"CMT");
    assert_eq!(vendors[1].data(), b"VTS");

    // the expected content, independently recomputed
    let expected_fares = taxi_fares();
    assert_eq!(fares, expected_fares);
    let (expected_defs, _) = taxi_passengers();
    let recomputed_defs: Vec<i16> = passengers
        .iter()
        .map(|p| p.is_some() as i16)
        .collect();
    assert_eq!(recomputed_defs, expected_defs);
}

#[test]
fn dynamic_sweep_reads_every_column() {
    let reader = SerializedFileReader::new(Bytes::from(taxi_file())).unwrap();
    for rg in 0..reader.num_row_groups() {
        let row_group = reader.get_row_group(rg).unwrap();
        for column in 0..row_group.num_columns() {
            let num_values = row_group.metadata().column(column).num_values() as usize;
            let decoded = read_column_dynamic(&*row_group, column).unwrap();
            assert_eq!(decoded.num_levels(), num_values, "column {}", column);
        }
    }
}

#[test]
fn dynamic_read_of_fixed_len_column() {
    use parq::basic::Type;
    use parq::column::dynamic::DynColumn;

    let values: Vec<&[u8]> = vec![b"ab", b"cd", b"ef"];
    let mut chunk = ChunkBuilder::new(UNCOMPRESSED);
    chunk.data_page_v1(values.len() as i32, PLAIN, None, None, &plain_fixed(&values));
    let file = single_column_file(
        fixed_leaf("pair", 2, REQUIRED),
        values.len() as i64,
        chunk.finish(vec!["pair".to_string()], FIXED_LEN_BYTE_ARRAY),
    );
    let reader = SerializedFileReader::new(Bytes::from(file)).unwrap();
    let row_group = reader.get_row_group(0).unwrap();
    match read_column_dynamic(&*row_group, 0).unwrap() {
        DynColumn::FixedLenByteArray2(column) => {
            assert_eq!(column.values, vec![*b"ab", *b"cd", *b"ef"]);
        }
        other => panic!("expected width-2 variant, got {:?}", other.physical_type()),
    }

    // widths beyond 16 are refused in dynamic mode
    let wide: Vec<u8> = (0..17).collect();
    let mut chunk = ChunkBuilder::new(UNCOMPRESSED);
    chunk.data_page_v1(1, PLAIN, None, None, &wide);
    let file = single_column_file(
        fixed_leaf("wide", 17, REQUIRED),
        1,
        chunk.finish(vec!["wide".to_string()], FIXED_LEN_BYTE_ARRAY),
    );
    let reader = SerializedFileReader::new(Bytes::from(file)).unwrap();
    let row_group = reader.get_row_group(0).unwrap();
    assert!(read_column_dynamic(&*row_group, 0).is_err());
    assert_eq!(
        row_group.metadata().column(0).column_descr().physical_type(),
        Type::FIXED_LEN_BYTE_ARRAY
    );
}

#[test]
fn list_column_assembles_from_levels() {
    // rows: [1, null, 3] / null / [] / [7]
    let def_levels: Vec<i16> = vec![3, 2, 3, 0, 1, 3];
    let rep_levels: Vec<i16> = vec![0, 1, 1, 0, 0, 0];
    let values: Vec<i32> = vec![1, 3, 7];

    let mut chunk = ChunkBuilder::new(UNCOMPRESSED);
    chunk.data_page_v1(
        def_levels.len() as i32,
        PLAIN,
        Some((&rep_levels, 1)),
        Some((&def_levels, 3)),
        &plain_i32(&values),
    );
    let file = build_file(
        vec![
            root(1),
            group("ratings", OPTIONAL, 1),
            group("list", REPEATED, 1),
            leaf("element", INT32, OPTIONAL),
        ],
        vec![RowGroupSpec {
            num_rows: 4,
            chunks: vec![chunk.finish(
                vec![
                    "ratings".to_string(),
                    "list".to_string(),
                    "element".to_string(),
                ],
                INT32,
            )],
        }],
    );

    let reader = SerializedFileReader::new(Bytes::from(file)).unwrap();
    let (index, descr) = reader
        .metadata()
        .file_metadata()
        .find_schema_element("ratings.list.element")
        .unwrap();
    assert_eq!(index, 0);
    assert_eq!(descr.max_def_level(), 3);
    assert_eq!(descr.max_rep_level(), 1);

    let row_group = reader.get_row_group(0).unwrap();
    let lists = read_list_column::<Int32Type>(&*row_group, 0).unwrap();
    assert_eq!(
        lists,
        vec![
            Some(vec![Some(1), None, Some(3)]),
            None,
            Some(vec![]),
            Some(vec![Some(7)]),
        ]
    );
}

#[test]
fn map_column_assembles_from_levels() {
    // rows: {"a": 1, "b": null} / null / {} / {"c": 7}
    let key_defs: Vec<i16> = vec![2, 2, 0, 1, 2];
    let key_reps: Vec<i16> = vec![0, 1, 0, 0, 0];
    let keys: Vec<&[u8]> = vec![b"a", b"b", b"c"];
    let value_defs: Vec<i16> = vec![3, 2, 0, 1, 3];
    let value_reps: Vec<i16> = vec![0, 1, 0, 0, 0];
    let values: Vec<i32> = vec![1, 7];

    let mut key_chunk = ChunkBuilder::new(UNCOMPRESSED);
    key_chunk.data_page_v1(
        key_defs.len() as i32,
        PLAIN,
        Some((&key_reps, 1)),
        Some((&key_defs, 2)),
        &plain_byte_array(&keys),
    );
    let mut value_chunk = ChunkBuilder::new(UNCOMPRESSED);
    value_chunk.data_page_v1(
        value_defs.len() as i32,
        PLAIN,
        Some((&value_reps, 1)),
        Some((&value_defs, 3)),
        &plain_i32(&values),
    );

    let file = build_file(
        vec![
            root(1),
            group("tags", OPTIONAL, 1),
            group("key_value", REPEATED, 2),
            leaf("key", BYTE_ARRAY, REQUIRED),
            leaf("value", INT32, OPTIONAL),
        ],
        vec![RowGroupSpec {
            num_rows: 4,
            chunks: vec![
                key_chunk.finish(
                    vec![
                        "tags".to_string(),
                        "key_value".to_string(),
                        "key".to_string(),
                    ],
                    BYTE_ARRAY,
                ),
                value_chunk.finish(
                    vec![
                        "tags".to_string(),
                        "key_value".to_string(),
                        "value".to_string(),
                    ],
                    INT32,
                ),
            ],
        }],
    );

    let reader = SerializedFileReader::new(Bytes::from(file)).unwrap();
    let row_group = reader.get_row_group(0).unwrap();
    let maps = read_map_column::<ByteArrayType, Int32Type>(&*row_group, 0, 1).unwrap();

    let expected = vec![
        Some(vec![
            (parq::data_type::ByteArray::from("a"), Some(1)),
            (parq::data_type::ByteArray::from("b"), None),
        ]),
        None,
        Some(vec![]),
        Some(vec![(parq::data_type::ByteArray::from("c"), Some(7))]),
    ];
    assert_eq!(maps, expected);
}

#[test]
fn levels_survive_intermediate_optionality() {
    // optional group outer { optional int32 inner }: max_def 2, and level 1
    // (outer present, inner null) must be preserved verbatim
    let def_levels: Vec<i16> = vec![2, 1, 0, 2];
    let values: Vec<i32> = vec![10, 20];

    let mut chunk = ChunkBuilder::new(UNCOMPRESSED);
    chunk.data_page_v1(
        def_levels.len() as i32,
        PLAIN,
        None,
        Some((&def_levels, 2)),
        &plain_i32(&values),
    );
    let file = build_file(
        vec![
            root(1),
            group("outer", OPTIONAL, 1),
            leaf("inner", INT32, OPTIONAL),
        ],
        vec![RowGroupSpec {
            num_rows: 4,
            chunks: vec![chunk.finish(
                vec!["outer".to_string(), "inner".to_string()],
                INT32,
            )],
        }],
    );

    let reader = SerializedFileReader::new(Bytes::from(file)).unwrap();
    let row_group = reader.get_row_group(0).unwrap();

    let column =
        parq::column::reader::read_column_with_levels::<Int32Type>(&*row_group, 0).unwrap();
    assert_eq!(column.values, values);
    assert_eq!(column.def_levels, Some(def_levels));

    // only def == max_def marks a present leaf; intermediate levels are nulls
    let optional = read_optional_column::<Int32Type>(&*row_group, 0).unwrap();
    assert_eq!(optional, vec![Some(10), None, None, Some(20)]);
}
