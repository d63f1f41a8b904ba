//! CSV ingestion and export.
//!
//! The reader keeps track of whether each field was quoted: an unquoted empty
//! field or an unquoted `null` (any case) is a null cell, while quoted fields
//! are always literal text. The writer relies on this to round-trip empty
//! strings and the text `null`.
//!
//! Without explicit `column_types`, each column's kind is sniffed from the
//! first `guess_rows` data rows as one of `bool`, `float64`, `datetime` or
//! `string`.

use crate::column::{Column, ColumnData};
use crate::error::{ArgumentError, FrameError, Result, SchemaError};
use crate::options::CsvOptions;
use crate::table::Table;
use crate::value::{ColumnValue, ElementType};
use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, warn};
use rust_decimal::Decimal;
use std::borrow::Cow;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::str::FromStr;

/// Name of the row-number column added by `add_index_column`.
pub const INDEX_COLUMN_NAME: &str = "IndexColumn";

const DATETIME_OUTPUT_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

#[derive(Debug, Clone, PartialEq)]
struct Field {
    text: String,
    quoted: bool,
}

impl Field {
    fn is_null(&self) -> bool {
        !self.quoted && (self.text.is_empty() || self.text.eq_ignore_ascii_case("null"))
    }
}

#[derive(Debug)]
struct Record {
    /// 1-based line on which the record starts.
    line: usize,
    fields: Vec<Field>,
}

impl Record {
    fn is_blank(&self) -> bool {
        self.fields.len() == 1 && !self.fields[0].quoted && self.fields[0].text.is_empty()
    }
}

/// Split CSV text into records, honouring quoted fields with embedded
/// separators, doubled quotes and line breaks. Blank lines come back as
/// records holding one unquoted empty field.
fn parse_records(text: &str, separator: char) -> Vec<Record> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut in_quotes = false;
    let mut line = 1;
    let mut record_line = 1;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => {
                in_quotes = true;
                quoted = true;
            }
            c if c == separator && !in_quotes => {
                fields.push(Field {
                    text: std::mem::take(&mut field),
                    quoted,
                });
                quoted = false;
            }
            '\r' if !in_quotes => {
                // CRLF is handled on the '\n'; a lone CR also ends the record
                if chars.peek() != Some(&'\n') {
                    fields.push(Field {
                        text: std::mem::take(&mut field),
                        quoted,
                    });
                    quoted = false;
                    records.push(Record {
                        line: record_line,
                        fields: std::mem::take(&mut fields),
                    });
                    line += 1;
                    record_line = line;
                }
            }
            '\n' if !in_quotes => {
                fields.push(Field {
                    text: std::mem::take(&mut field),
                    quoted,
                });
                quoted = false;
                records.push(Record {
                    line: record_line,
                    fields: std::mem::take(&mut fields),
                });
                line += 1;
                record_line = line;
            }
            _ => {
                if c == '\n' {
                    line += 1;
                }
                field.push(c);
            }
        }
    }

    if !field.is_empty() || quoted || !fields.is_empty() {
        fields.push(Field { text: field, quoted });
        records.push(Record {
            line: record_line,
            fields,
        });
    }

    records
}

fn normalize_decimal(text: &str, decimal_separator: char) -> Cow<'_, str> {
    if decimal_separator == '.' || text.contains('.') {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.replace(decimal_separator, "."))
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    let t = text.trim();
    if t.eq_ignore_ascii_case("true") {
        Some(true)
    } else if t.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn parse_float(text: &str, decimal_separator: char) -> Option<f64> {
    normalize_decimal(text.trim(), decimal_separator).parse().ok()
}

/// Sniffing merges bool into float64, so `true`/`false` load as 1 and 0.
fn bool_as_float(text: &str) -> Option<f64> {
    parse_bool(text).map(|b| if b { 1.0 } else { 0.0 })
}

fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let t = text.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(t, f).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(t, f).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn parse_decimal(text: &str, decimal_separator: char) -> Option<Decimal> {
    let t = normalize_decimal(text.trim(), decimal_separator);
    Decimal::from_str(&t)
        .or_else(|_| Decimal::from_scientific(&t))
        .ok()
}

/// One UTF-16 code unit, or a `\uXXXX` escape for units that are not a
/// `char` on their own (lone surrogates).
fn parse_char16(text: &str) -> Option<u16> {
    let mut units = text.encode_utf16();
    match (units.next(), units.next()) {
        (Some(unit), None) => Some(unit),
        _ => {
            let hex = text.strip_prefix("\\u")?;
            if hex.len() != 4 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return None;
            }
            u16::from_str_radix(hex, 16).ok()
        }
    }
}

/// Typed value of a non-null field, or `None` when the text does not parse.
fn parse_value(text: &str, kind: ElementType, decimal_separator: char) -> Option<ColumnValue> {
    let t = text.trim();
    let value = match kind {
        ElementType::Bool => ColumnValue::Bool(parse_bool(t)?),
        ElementType::Byte => ColumnValue::Byte(t.parse().ok()?),
        ElementType::SByte => ColumnValue::SByte(t.parse().ok()?),
        ElementType::Int16 => ColumnValue::Int16(t.parse().ok()?),
        ElementType::UInt16 => ColumnValue::UInt16(t.parse().ok()?),
        ElementType::Int32 => ColumnValue::Int32(t.parse().ok()?),
        ElementType::UInt32 => ColumnValue::UInt32(t.parse().ok()?),
        ElementType::Int64 => ColumnValue::Int64(t.parse().ok()?),
        ElementType::UInt64 => ColumnValue::UInt64(t.parse().ok()?),
        ElementType::Float32 => ColumnValue::Float32(
            normalize_decimal(t, decimal_separator)
                .parse()
                .ok()
                .or_else(|| bool_as_float(t).map(|v| v as f32))?,
        ),
        ElementType::Float64 => ColumnValue::Float64(parse_float(t, decimal_separator).or_else(|| bool_as_float(t))?),
        ElementType::Decimal128 => ColumnValue::Decimal(parse_decimal(t, decimal_separator)?),
        ElementType::Char16 => ColumnValue::Char(parse_char16(text)?),
        ElementType::DateTime => ColumnValue::DateTime(parse_datetime(t)?),
        ElementType::String => ColumnValue::String(text.to_string()),
    };
    Some(value)
}

fn sniff_value(field: &Field, decimal_separator: char) -> ElementType {
    if field.quoted && field.text.trim().is_empty() {
        return ElementType::String;
    }
    if parse_bool(&field.text).is_some() {
        ElementType::Bool
    } else if parse_float(&field.text, decimal_separator).is_some() {
        ElementType::Float64
    } else if parse_datetime(&field.text).is_some() {
        ElementType::DateTime
    } else {
        ElementType::String
    }
}

fn merge_kinds(current: Option<ElementType>, next: ElementType) -> ElementType {
    use ElementType::*;
    match (current, next) {
        (None, k) => k,
        (Some(a), b) if a == b => a,
        (Some(Bool), Float64) | (Some(Float64), Bool) => Float64,
        _ => String,
    }
}

fn sniff_kinds(rows: &[Record], columns: usize, options: &CsvOptions) -> Vec<ElementType> {
    let mut kinds: Vec<Option<ElementType>> = vec![None; columns];
    for record in rows.iter().take(options.guess_rows) {
        for (kind, field) in kinds.iter_mut().zip(&record.fields) {
            if field.is_null() || *kind == Some(ElementType::String) {
                continue;
            }
            *kind = Some(merge_kinds(*kind, sniff_value(field, options.decimal_separator)));
        }
    }
    kinds
        .into_iter()
        .map(|k| k.unwrap_or(ElementType::String))
        .collect()
}

fn dedupe_names(names: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(names.len());
    let mut out = Vec::with_capacity(names.len());
    for name in names {
        let mut candidate = name.clone();
        let mut suffix = 1;
        while seen.contains(&candidate) {
            candidate = format!("{}.{}", name, suffix);
            suffix += 1;
        }
        if candidate != name {
            warn!("renamed duplicate column '{}' to '{}'", name, candidate);
        }
        seen.insert(candidate.clone());
        out.push(candidate);
    }
    out
}

fn check_width(record: &Record, expected: usize) -> Result<()> {
    let actual = record.fields.len();
    if actual < expected {
        return Err(SchemaError::LessColumnsThanExpected {
            line: record.line,
            expected,
            actual,
        }
        .into());
    }
    if actual > expected {
        return Err(SchemaError::MoreColumnsThanExpected {
            line: record.line,
            expected,
            actual,
        }
        .into());
    }
    Ok(())
}

/// Load a table from CSV text.
pub fn load_csv_from_str(text: &str, options: &CsvOptions) -> Result<Table> {
    options.validate()?;
    let mut records = parse_records(text, options.separator);
    if records.is_empty() {
        return Err(SchemaError::EmptyFile.into());
    }

    // Blank lines ahead of a header are padding; without a header they may
    // be null cells of a single-column file.
    let header = if options.has_header {
        let first = records
            .iter()
            .position(|r| !r.is_blank())
            .ok_or(SchemaError::EmptyFile)?;
        records.drain(..first);
        Some(records.remove(0))
    } else {
        None
    };

    let names: Vec<String> = match (&options.column_names, &header) {
        (Some(names), _) => names.clone(),
        (None, Some(h)) => h.fields.iter().map(|f| f.text.clone()).collect(),
        (None, None) => {
            let width = options
                .column_types
                .as_ref()
                .map(Vec::len)
                .unwrap_or_else(|| {
                    records
                        .iter()
                        .find(|r| !r.is_blank())
                        .map_or(1, |r| r.fields.len())
                });
            (0..width).map(|i| format!("Column{}", i)).collect()
        }
    };
    if let Some(h) = &header {
        check_width(h, names.len())?;
    }
    let names = if options.rename_duplicate_columns {
        dedupe_names(names)
    } else {
        names
    };

    // In a single-column file a blank line is a null cell
    if names.len() != 1 {
        records.retain(|r| !r.is_blank());
    }
    if let Some(max) = options.max_rows {
        records.truncate(max);
    }
    for record in &records {
        check_width(record, names.len())?;
    }

    let kinds = match &options.column_types {
        Some(kinds) => {
            if kinds.len() != names.len() {
                return Err(ArgumentError::MismatchedValueCount {
                    expected: names.len(),
                    actual: kinds.len(),
                }
                .into());
            }
            kinds.clone()
        }
        None => {
            let kinds = sniff_kinds(&records, names.len(), options);
            for (name, kind) in names.iter().zip(&kinds) {
                debug!("sniffed column '{}' as {}", name, kind);
            }
            kinds
        }
    };

    let chunk_size = options.storage.chunk_size;
    let mut data: Vec<ColumnData> = kinds
        .iter()
        .map(|k| ColumnData::empty(*k, chunk_size))
        .collect();

    for record in &records {
        for (i, field) in record.fields.iter().enumerate() {
            let value = if field.is_null() {
                ColumnValue::Null
            } else {
                parse_value(&field.text, kinds[i], options.decimal_separator).ok_or_else(|| {
                    FrameError::Parse {
                        text: field.text.clone(),
                        expected: kinds[i],
                        line: record.line,
                        column: names[i].clone(),
                    }
                })?
            };
            data[i].append(&value)?;
        }
    }

    let mut table = Table::with_options(options.storage)?;
    if options.add_index_column {
        let index = (0..records.len()).map(|i| Some(i as i32));
        table.add_column(Column::with_chunk_size(INDEX_COLUMN_NAME, chunk_size, index))?;
    }
    for (name, data) in names.into_iter().zip(data) {
        table.add_column(Column::from_data(name, data))?;
    }
    debug!(
        "loaded {} rows x {} columns from csv",
        table.len(),
        table.column_count()
    );
    Ok(table)
}

/// Decode `bytes` with the configured encoding; a UTF-8 byte order mark is dropped.
fn decode(bytes: &[u8], options: &CsvOptions) -> String {
    let (text, _, had_errors) = options.encoding.encoding().decode(bytes);
    if had_errors {
        warn!("csv input contained byte sequences invalid for {:?}", options.encoding);
    }
    text.into_owned()
}

/// Load a table from any byte stream.
///
/// The stream is read once from start to end and never rewound.
pub fn load_csv<R: Read>(mut reader: R, options: &CsvOptions) -> Result<Table> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    load_csv_from_str(&decode(&bytes, options), options)
}

pub fn load_csv_from_path<P: AsRef<Path>>(path: P, options: &CsvOptions) -> Result<Table> {
    let file = File::open(path)?;
    load_csv(BufReader::new(file), options)
}

fn needs_quotes(text: &str, separator: char) -> bool {
    text.is_empty()
        || text.eq_ignore_ascii_case("null")
        || text.starts_with(char::is_whitespace)
        || text.ends_with(char::is_whitespace)
        || text
            .chars()
            .any(|c| c == separator || c == '"' || c == '\r' || c == '\n')
}

fn push_text(out: &mut String, text: &str, separator: char) {
    if needs_quotes(text, separator) {
        out.push('"');
        out.push_str(&text.replace('"', "\"\""));
        out.push('"');
    } else {
        out.push_str(text);
    }
}

fn push_number(out: &mut String, text: String, decimal_separator: char) {
    if decimal_separator == '.' {
        out.push_str(&text);
    } else {
        out.push_str(&text.replace('.', &decimal_separator.to_string()));
    }
}

fn push_value(out: &mut String, value: &ColumnValue, options: &CsvOptions) {
    match value {
        ColumnValue::Null => {}
        ColumnValue::Float32(v) => push_number(out, v.to_string(), options.decimal_separator),
        ColumnValue::Float64(v) => push_number(out, v.to_string(), options.decimal_separator),
        ColumnValue::Decimal(v) => push_number(out, v.to_string(), options.decimal_separator),
        ColumnValue::DateTime(v) => out.push_str(&v.format(DATETIME_OUTPUT_FORMAT).to_string()),
        ColumnValue::String(s) => push_text(out, s, options.separator),
        ColumnValue::Char(_) => push_text(out, &value.to_string(), options.separator),
        other => out.push_str(&other.to_string()),
    }
}

/// Render a table as CSV text.
pub fn to_csv_string(table: &Table, options: &CsvOptions) -> Result<String> {
    options.validate()?;
    let mut out = String::new();
    if options.has_header {
        for (i, name) in table.column_names().iter().enumerate() {
            if i > 0 {
                out.push(options.separator);
            }
            push_text(&mut out, name, options.separator);
        }
        out.push('\n');
    }
    for row in table.rows() {
        for (i, value) in row.iter().enumerate() {
            if i > 0 {
                out.push(options.separator);
            }
            push_value(&mut out, value, options);
        }
        out.push('\n');
    }
    Ok(out)
}

/// Write a table as CSV in the configured encoding.
///
/// Text the encoding cannot represent is an error; nothing is written.
pub fn save_csv<W: Write>(table: &Table, mut writer: W, options: &CsvOptions) -> Result<()> {
    let text = to_csv_string(table, options)?;
    let encoding = options.encoding.encoding();
    let (bytes, _, had_unmappable) = encoding.encode(&text);
    if had_unmappable {
        let mut buf = [0u8; 4];
        let offending = text
            .chars()
            .find(|c| encoding.encode(c.encode_utf8(&mut buf)).2)
            .unwrap_or(char::REPLACEMENT_CHARACTER);
        return Err(ArgumentError::Invalid(format!(
            "character {:?} cannot be encoded as {}",
            offending,
            encoding.name()
        ))
        .into());
    }
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

pub fn save_csv_to_path<P: AsRef<Path>>(table: &Table, path: P, options: &CsvOptions) -> Result<()> {
    let file = File::create(path)?;
    save_csv(table, BufWriter::new(file), options)
}

impl Table {
    /// Load CSV text with default options.
    pub fn from_csv(text: &str) -> Result<Table> {
        load_csv_from_str(text, &CsvOptions::default())
    }

    /// Render as CSV text with default options.
    pub fn to_csv(&self) -> Result<String> {
        to_csv_string(self, &CsvOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::CsvEncoding;
    use crate::value::Char16;
    use pretty_assertions::assert_eq;

    fn column_values(table: &Table, name: &str) -> Vec<ColumnValue> {
        table.column(name).unwrap().iter().collect()
    }

    #[test]
    fn test_parse_records_quoting() {
        let records = parse_records("a,\"b,c\",\"say \"\"hi\"\"\"\n\"multi\nline\",,\"\"\n", ',');
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].fields[1].text, "b,c");
        assert_eq!(records[0].fields[2].text, "say \"hi\"");
        assert_eq!(records[1].fields[0].text, "multi\nline");
        assert!(records[1].fields[1].is_null());
        assert!(!records[1].fields[2].is_null());
        assert_eq!(records[1].line, 2);
    }

    #[test]
    fn test_crlf_and_blank_lines() {
        let records = parse_records("a,b\r\n\r\n1,2\r\n", ',');
        assert_eq!(records.len(), 3);
        assert!(records[1].is_blank());
        assert_eq!(records[2].fields[1].text, "2");
        assert_eq!(records[2].line, 3);

        let table = load_csv_from_str("\na,b\n\n1,2\n", &CsvOptions::default()).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_sniffing() {
        let table = load_csv_from_str(
            "a,b,c,d,e\n1,x,true,2024-01-02,\n,y,1.5,2024-01-03 04:05:06,NULL\n",
            &CsvOptions::default(),
        )
        .unwrap();
        let schema = table.schema();
        assert_eq!(schema.column_type("a"), Some(ElementType::Float64));
        assert_eq!(schema.column_type("b"), Some(ElementType::String));
        assert_eq!(schema.column_type("c"), Some(ElementType::Float64));
        assert_eq!(schema.column_type("d"), Some(ElementType::DateTime));
        assert_eq!(schema.column_type("e"), Some(ElementType::String));
        assert_eq!(
            column_values(&table, "a"),
            vec![ColumnValue::Float64(1.0), ColumnValue::Null]
        );
        assert_eq!(column_values(&table, "c")[0], ColumnValue::Float64(1.0));
    }

    #[test]
    fn test_datetime_mixed_with_number_is_string() {
        let table = load_csv_from_str("d\n2024-01-02\n7\n", &CsvOptions::default()).unwrap();
        assert_eq!(table.schema().column_type("d"), Some(ElementType::String));
    }

    #[test]
    fn test_guess_rows_limits_sniffing() {
        let options = CsvOptions {
            guess_rows: 1,
            ..CsvOptions::default()
        };
        let err = load_csv_from_str("n\n1\nabc\n", &options).unwrap_err();
        assert!(matches!(
            err,
            FrameError::Parse { line: 3, expected: ElementType::Float64, .. }
        ));
    }

    #[test]
    fn test_explicit_types_and_names() {
        let options = CsvOptions {
            has_header: false,
            column_names: Some(vec!["id".to_string(), "price".to_string()]),
            column_types: Some(vec![ElementType::Int64, ElementType::Decimal128]),
            ..CsvOptions::default()
        };
        let table = load_csv_from_str("1,2.50\n2,null\n", &options).unwrap();
        assert_eq!(
            column_values(&table, "id"),
            vec![ColumnValue::Int64(1), ColumnValue::Int64(2)]
        );
        assert_eq!(
            column_values(&table, "price"),
            vec![
                ColumnValue::Decimal(Decimal::from_str("2.50").unwrap()),
                ColumnValue::Null
            ]
        );
    }

    #[test]
    fn test_headerless_names_index_and_max_rows() {
        let options = CsvOptions {
            has_header: false,
            add_index_column: true,
            max_rows: Some(2),
            ..CsvOptions::default()
        };
        let table = load_csv_from_str("a,1\nb,2\nc,3\n", &options).unwrap();
        assert_eq!(table.column_names(), vec!["IndexColumn", "Column0", "Column1"]);
        assert_eq!(table.len(), 2);
        assert_eq!(
            column_values(&table, "IndexColumn"),
            vec![ColumnValue::Int32(0), ColumnValue::Int32(1)]
        );
    }

    #[test]
    fn test_duplicate_columns() {
        let options = CsvOptions {
            rename_duplicate_columns: true,
            ..CsvOptions::default()
        };
        let table = load_csv_from_str("x,x,x\n1,2,3\n", &options).unwrap();
        assert_eq!(table.column_names(), vec!["x", "x.1", "x.2"]);

        let kept = load_csv_from_str("x,x\n1,2\n", &CsvOptions::default()).unwrap();
        assert_eq!(kept.column_names(), vec!["x", "x"]);
    }

    #[test]
    fn test_ragged_rows() {
        let err = load_csv_from_str("a,b\n1\n", &CsvOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            FrameError::Schema(SchemaError::LessColumnsThanExpected { line: 2, expected: 2, actual: 1 })
        ));
        let err = load_csv_from_str("a,b\n1,2,3\n", &CsvOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            FrameError::Schema(SchemaError::MoreColumnsThanExpected { .. })
        ));
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(
            load_csv_from_str("", &CsvOptions::default()),
            Err(FrameError::Schema(SchemaError::EmptyFile))
        ));
        let header_only = load_csv_from_str("a,b\n", &CsvOptions::default()).unwrap();
        assert_eq!(header_only.len(), 0);
        assert_eq!(header_only.schema().column_type("a"), Some(ElementType::String));
    }

    #[test]
    fn test_decimal_separator() {
        let options = CsvOptions {
            separator: ';',
            decimal_separator: ',',
            ..CsvOptions::default()
        };
        let table = load_csv_from_str("v;w\n1,5;x\n", &options).unwrap();
        assert_eq!(column_values(&table, "v"), vec![ColumnValue::Float64(1.5)]);
        assert_eq!(to_csv_string(&table, &options).unwrap(), "v;w\n1,5;x\n");

        let clash = CsvOptions {
            decimal_separator: ',',
            ..CsvOptions::default()
        };
        assert!(matches!(
            load_csv_from_str("a\n1\n", &clash),
            Err(FrameError::Argument(ArgumentError::SeparatorCollision(',')))
        ));
        assert!(to_csv_string(&table, &clash).is_err());
    }

    #[test]
    fn test_writer_quotes_ambiguous_strings() {
        let table = Table::from_columns(vec![Column::new(
            "s",
            vec![
                Some("plain".to_string()),
                Some(String::new()),
                Some("null".to_string()),
                Some("a,b".to_string()),
                Some(" pad".to_string()),
                Some("q\"uote".to_string()),
                None,
            ],
        )])
        .unwrap();
        let text = table.to_csv().unwrap();
        assert_eq!(
            text,
            "s\nplain\n\"\"\n\"null\"\n\"a,b\"\n\" pad\"\n\"q\"\"uote\"\n\n"
        );

        let options = CsvOptions {
            column_types: Some(vec![ElementType::String]),
            ..CsvOptions::default()
        };
        let back = load_csv_from_str(&text, &options).unwrap();
        assert_eq!(column_values(&back, "s"), column_values(&table, "s"));
    }

    #[test]
    fn test_windows_1252_round_trip() {
        let options = CsvOptions {
            encoding: CsvEncoding::Windows1252,
            ..CsvOptions::default()
        };
        let table = load_csv(&b"name\ncaf\xe9\n"[..], &options).unwrap();
        assert_eq!(column_values(&table, "name"), vec![ColumnValue::from("café")]);

        let mut bytes = Vec::new();
        save_csv(&table, &mut bytes, &options).unwrap();
        assert_eq!(bytes, b"name\ncaf\xe9\n".to_vec());
    }

    #[test]
    fn test_windows_1252_rejects_unencodable_text() {
        let options = CsvOptions {
            encoding: CsvEncoding::Windows1252,
            ..CsvOptions::default()
        };
        let table = Table::from_columns(vec![Column::new("s", vec![Some("snow \u{2603}".to_string())])]).unwrap();
        let mut bytes = Vec::new();
        let err = save_csv(&table, &mut bytes, &options).unwrap_err();
        assert!(matches!(err, FrameError::Argument(ArgumentError::Invalid(_))));
        assert!(err.to_string().contains("windows-1252"));
        assert!(bytes.is_empty());
    }

    #[test]
    fn test_headerless_single_column_keeps_leading_nulls() {
        let options = CsvOptions {
            has_header: false,
            column_types: Some(vec![ElementType::Int32]),
            ..CsvOptions::default()
        };
        let table = Table::from_columns(vec![Column::new("Column0", vec![None, None, Some(1i32), Some(2)])]).unwrap();
        let text = to_csv_string(&table, &options).unwrap();
        assert_eq!(text, "\n\n1\n2\n");

        let back = load_csv_from_str(&text, &options).unwrap();
        assert_eq!(back.len(), 4);
        assert_eq!(column_values(&back, "Column0"), column_values(&table, "Column0"));

        // a header still skips the padding above it
        let padded = load_csv_from_str("\n\nn\n\n1\n", &CsvOptions::default()).unwrap();
        assert_eq!(column_values(&padded, "n"), vec![ColumnValue::Null, ColumnValue::Float64(1.0)]);
    }

    #[test]
    fn test_char16_escapes_lone_surrogates() {
        assert_eq!(parse_char16("x"), Some('x' as u16));
        assert_eq!(parse_char16("\\uD800"), Some(0xD800));
        assert_eq!(parse_char16("\\udc0f"), Some(0xDC0F));
        assert_eq!(parse_char16("\\u+FFF"), None);
        assert_eq!(parse_char16("xy"), None);

        let table = Table::from_columns(vec![Column::new(
            "c",
            vec![Some(Char16(0xD800)), Some(Char16('\\' as u16)), None],
        )])
        .unwrap();
        let text = table.to_csv().unwrap();
        assert_eq!(text, "c\n\\uD800\n\\\n\n");
        let options = CsvOptions {
            column_types: Some(vec![ElementType::Char16]),
            ..CsvOptions::default()
        };
        let back = load_csv_from_str(&text, &options).unwrap();
        assert_eq!(column_values(&back, "c"), column_values(&table, "c"));
    }

    #[test]
    fn test_utf8_bom_is_dropped() {
        let table = load_csv(&b"\xef\xbb\xbfid\n1\n"[..], &CsvOptions::default()).unwrap();
        assert_eq!(table.column_names(), vec!["id"]);
    }
}
