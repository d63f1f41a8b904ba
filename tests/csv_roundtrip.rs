use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use std::str::FromStr;
use typedframe::*;

fn every_kind_table() -> Table {
    let when = NaiveDate::from_ymd_opt(2024, 2, 29)
        .unwrap()
        .and_hms_milli_opt(13, 45, 7, 250)
        .unwrap();

    Table::from_columns(vec![
        Column::new("flag", vec![Some(true), None, Some(false)]),
        Column::new("byte", vec![Some(255u8), Some(0), None]),
        Column::new("sbyte", vec![Some(-128i8), None, Some(127)]),
        Column::new("int16", vec![Some(i16::MIN), Some(0), Some(i16::MAX)]),
        Column::new("uint16", vec![None, Some(1u16), Some(u16::MAX)]),
        Column::new("int32", vec![Some(i32::MIN), Some(-1), None]),
        Column::new("uint32", vec![Some(u32::MAX), None, Some(7)]),
        Column::new("int64", vec![Some(i64::MIN), Some(i64::MAX), None]),
        Column::new("uint64", vec![Some(u64::MAX), Some(0), None]),
        Column::new("float32", vec![Some(0.1f32), Some(-3.4028235e38), None]),
        Column::new("float64", vec![Some(0.1f64 + 0.2), Some(1e-300), Some(f64::INFINITY)]),
        Column::new(
            "decimal",
            vec![
                Some(Decimal::from_str("79228162514264337593543950335").unwrap()),
                Some(Decimal::from_str("-0.0000000001").unwrap()),
                None,
            ],
        ),
        Column::new("char", vec![Some(Char16('x' as u16)), Some(Char16(',' as u16)), Some(Char16(0xD800))]),
        Column::new("when", vec![Some(when), None, Some(when.date().and_hms_opt(0, 0, 0).unwrap())]),
        Column::new(
            "text",
            vec![
                Some("plain".to_string()),
                Some("needs \"quotes\", commas\nand newlines".to_string()),
                Some(String::new()),
            ],
        ),
    ])
    .unwrap()
}

fn options_for(table: &Table) -> CsvOptions {
    CsvOptions {
        column_types: Some(table.columns().iter().map(|c| c.element_type()).collect()),
        ..CsvOptions::default()
    }
}

fn assert_same_rows(left: &Table, right: &Table) {
    assert_eq!(left.column_names(), right.column_names());
    assert_eq!(left.len(), right.len());
    for (a, b) in left.rows().zip(right.rows()) {
        assert_eq!(a, b);
    }
}

#[test]
fn test_every_kind_round_trips_with_explicit_types() {
    let table = every_kind_table();
    let options = options_for(&table);

    let text = to_csv_string(&table, &options).unwrap();
    let reloaded = load_csv_from_str(&text, &options).unwrap();

    assert_same_rows(&table, &reloaded);
    for column in reloaded.columns() {
        let original = table.column(column.name()).unwrap();
        assert_eq!(column.element_type(), original.element_type());
        assert_eq!(column.null_count(), original.null_count());
    }
}

#[test]
fn test_round_trip_through_bytes_and_other_separator() {
    let table = every_kind_table();
    let options = CsvOptions {
        separator: ';',
        decimal_separator: ',',
        ..options_for(&table)
    };

    let mut bytes = Vec::new();
    save_csv(&table, &mut bytes, &options).unwrap();
    let reloaded = load_csv(bytes.as_slice(), &options).unwrap();
    assert_same_rows(&table, &reloaded);
}

#[test]
fn test_quoted_strings_round_trip_byte_for_byte() {
    let awkward = vec![
        Some("  padded  ".to_string()),
        Some("null".to_string()),
        Some("\"".to_string()),
        Some("a\r\nb".to_string()),
        None,
        Some(String::new()),
    ];
    let table = Table::from_columns(vec![Column::new("s", awkward.clone())]).unwrap();
    let options = options_for(&table);

    let text = to_csv_string(&table, &options).unwrap();
    let reloaded = load_csv_from_str(&text, &options).unwrap();
    let column = reloaded.column("s").unwrap();
    let expected: Vec<ColumnValue> = awkward.into_iter().map(ColumnValue::from).collect();
    assert_eq!(column.iter().collect::<Vec<_>>(), expected);

    // the second write is identical to the first
    assert_eq!(to_csv_string(&reloaded, &options).unwrap(), text);
}

#[test]
fn test_file_round_trip() {
    let table = every_kind_table();
    let options = options_for(&table);
    let path = std::env::temp_dir().join(format!("typedframe_roundtrip_{}.csv", std::process::id()));

    save_csv_to_path(&table, &path, &options).unwrap();
    let reloaded = load_csv_from_path(&path, &options);
    std::fs::remove_file(&path).unwrap();

    assert_same_rows(&table, &reloaded.unwrap());
}

#[test]
fn test_decimal_separator_colliding_with_separator_rejected() {
    let table = every_kind_table();
    let options = CsvOptions {
        decimal_separator: ',',
        ..CsvOptions::default()
    };
    assert!(matches!(
        to_csv_string(&table, &options),
        Err(FrameError::Argument(ArgumentError::SeparatorCollision(',')))
    ));
    assert!(matches!(
        load_csv_from_str("a\n1\n", &options),
        Err(FrameError::Argument(ArgumentError::SeparatorCollision(',')))
    ));
}

#[test]
fn test_headerless_single_column_starting_with_nulls() {
    let table = Table::from_columns(vec![Column::new("Column0", vec![None, Some(1i32), Some(2)])]).unwrap();
    let options = CsvOptions {
        has_header: false,
        ..options_for(&table)
    };

    let text = to_csv_string(&table, &options).unwrap();
    let reloaded = load_csv_from_str(&text, &options).unwrap();
    assert_same_rows(&table, &reloaded);
    assert_eq!(reloaded.column("Column0").unwrap().null_count(), 1);
}
