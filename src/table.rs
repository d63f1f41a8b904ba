//! Tables
//!
//! A `Table` is an ordered list of named columns that share one row count.
//! Rows are a derived view: row *i* is element *i* of every column, boxed as
//! `ColumnValue`.
//!
//! # Examples
//!
//! ```
//! use typedframe::{Column, ColumnValue, Table};
//!
//! let mut table = Table::from_columns(vec![
//!     Column::new("id", vec![Some(1i32), Some(2)]),
//!     Column::new("score", vec![Some(9.5f64), None]),
//! ])
//! .unwrap();
//!
//! table.append_row(vec![ColumnValue::Int32(3), ColumnValue::Float64(7.0)]).unwrap();
//! assert_eq!(table.len(), 3);
//! assert_eq!(table.get_value(1, "score").unwrap(), ColumnValue::Null);
//! ```

use crate::column::{coerce_value, mask_flags, Column, ColumnData};
use crate::engine::BinaryOperation;
use crate::error::{ArgumentError, FrameError, Result};
use crate::options::StorageOptions;
use crate::value::{ColumnValue, ElementType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::Deref;

/// Column names and kinds, in table order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Schema {
    columns: Vec<(String, ElementType)>,
}

impl Schema {
    pub fn new(columns: Vec<(String, ElementType)>) -> Self {
        Schema { columns }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|(n, _)| n == name)
    }

    pub fn column_info(&self, index: usize) -> Option<(&str, ElementType)> {
        self.columns.get(index).map(|(n, t)| (n.as_str(), *t))
    }

    pub fn column_type(&self, name: &str) -> Option<ElementType> {
        self.column_index(name).map(|i| self.columns[i].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ElementType)> + '_ {
        self.columns.iter().map(|(n, t)| (n.as_str(), *t))
    }
}

#[derive(Clone)]
pub struct Table {
    columns: Vec<Column>,
    row_count: usize,
    options: StorageOptions,
}

impl Default for Table {
    fn default() -> Self {
        Self::new()
    }
}

impl Table {
    pub fn new() -> Self {
        Table {
            columns: Vec::new(),
            row_count: 0,
            options: StorageOptions::default(),
        }
    }

    pub fn with_options(options: StorageOptions) -> Result<Self> {
        options.validate()?;
        Ok(Table {
            columns: Vec::new(),
            row_count: 0,
            options,
        })
    }

    /// Empty table with one column per schema entry.
    pub fn from_schema(schema: &Schema, options: StorageOptions) -> Result<Self> {
        let mut table = Self::with_options(options)?;
        for (name, kind) in schema.iter() {
            table.add_column(Column::from_data(name, ColumnData::empty(kind, options.chunk_size)))?;
        }
        Ok(table)
    }

    /// Fails with `MismatchedColumnLengths` unless every column has the same length.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self> {
        let options = columns
            .first()
            .map(|c| StorageOptions {
                chunk_size: c.chunk_size(),
            })
            .unwrap_or_default();
        let mut table = Self::with_options(options)?;
        for column in columns {
            table.add_column(column)?;
        }
        Ok(table)
    }

    pub fn options(&self) -> &StorageOptions {
        &self.options
    }

    pub fn len(&self) -> usize {
        self.row_count
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn schema(&self) -> Schema {
        Schema::new(
            self.columns
                .iter()
                .map(|c| (c.name().to_string(), c.element_type()))
                .collect(),
        )
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    /// Position of the first column called `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name() == name)
    }

    fn require_index(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| FrameError::ColumnNotFound(name.to_string()))
    }

    pub fn column(&self, name: &str) -> Result<&Column> {
        let idx = self.require_index(name)?;
        Ok(&self.columns[idx])
    }

    /// Writable access to a column, limited to operations that keep its length.
    pub fn column_mut(&mut self, name: &str) -> Result<ColumnMut<'_>> {
        let idx = self.require_index(name)?;
        Ok(ColumnMut {
            column: &mut self.columns[idx],
        })
    }

    /// Swap in a column of the same length, returning the old one.
    pub fn replace_column(&mut self, name: &str, column: Column) -> Result<Column> {
        let idx = self.require_index(name)?;
        if column.len() != self.row_count {
            return Err(ArgumentError::MismatchedColumnLengths {
                expected: self.row_count,
                actual: column.len(),
            }
            .into());
        }
        Ok(std::mem::replace(&mut self.columns[idx], column))
    }

    pub fn column_at(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    fn check_new_column(&self, column: &Column) -> Result<()> {
        if !self.columns.is_empty() && column.len() != self.row_count {
            return Err(ArgumentError::MismatchedColumnLengths {
                expected: self.row_count,
                actual: column.len(),
            }
            .into());
        }
        Ok(())
    }

    pub fn add_column(&mut self, column: Column) -> Result<()> {
        self.check_new_column(&column)?;
        self.row_count = column.len();
        self.columns.push(column);
        Ok(())
    }

    pub fn insert_column(&mut self, index: usize, column: Column) -> Result<()> {
        if index > self.columns.len() {
            return Err(FrameError::IndexOutOfRange {
                index,
                len: self.columns.len(),
            });
        }
        self.check_new_column(&column)?;
        self.row_count = column.len();
        self.columns.insert(index, column);
        Ok(())
    }

    pub fn remove_column(&mut self, name: &str) -> Result<Column> {
        let idx = self.require_index(name)?;
        let column = self.columns.remove(idx);
        if self.columns.is_empty() {
            self.row_count = 0;
        }
        Ok(column)
    }

    pub fn rename_column(&mut self, from: &str, to: impl Into<String>) -> Result<()> {
        let idx = self.require_index(from)?;
        self.columns[idx].set_name(to);
        Ok(())
    }

    // ========================================================================
    // Rows
    // ========================================================================

    /// Append one positional row.
    ///
    /// Every value is checked (and numerics converted) before any column is
    /// touched, so a failing row leaves the table unchanged.
    pub fn append_row(&mut self, values: Vec<ColumnValue>) -> Result<()> {
        if values.len() != self.columns.len() {
            return Err(ArgumentError::MismatchedValueCount {
                expected: self.columns.len(),
                actual: values.len(),
            }
            .into());
        }
        let converted = self
            .columns
            .iter()
            .zip(&values)
            .map(|(col, v)| coerce_value(v, col.element_type()))
            .collect::<Result<Vec<_>>>()?;
        for (col, v) in self.columns.iter_mut().zip(converted) {
            col.append(v)?;
        }
        self.row_count += 1;
        Ok(())
    }

    /// Append a row given by column name; absent columns get null.
    pub fn append_named_row(&mut self, mut values: HashMap<String, ColumnValue>) -> Result<()> {
        let mut row = Vec::with_capacity(self.columns.len());
        for col in &self.columns {
            row.push(values.remove(col.name()).unwrap_or(ColumnValue::Null));
        }
        if let Some(unknown) = values.into_keys().next() {
            return Err(FrameError::ColumnNotFound(unknown));
        }
        self.append_row(row)
    }

    pub fn append_rows<I>(&mut self, rows: I) -> Result<usize>
    where
        I: IntoIterator<Item = Vec<ColumnValue>>,
    {
        let mut count = 0;
        for row in rows {
            self.append_row(row)?;
            count += 1;
        }
        Ok(count)
    }

    fn check_row(&self, row: usize) -> Result<()> {
        if row >= self.row_count {
            return Err(FrameError::IndexOutOfRange {
                index: row,
                len: self.row_count,
            });
        }
        Ok(())
    }

    pub fn row(&self, row: usize) -> Result<Vec<ColumnValue>> {
        self.check_row(row)?;
        Ok(self.columns.iter().map(|c| c.data().get(row)).collect())
    }

    pub fn rows(&self) -> TableRowIterator<'_> {
        TableRowIterator {
            table: self,
            index: 0,
        }
    }

    pub fn get_value(&self, row: usize, column: &str) -> Result<ColumnValue> {
        self.column(column)?.get(row)
    }

    pub fn set_value(&mut self, row: usize, column: &str, value: impl Into<ColumnValue>) -> Result<()> {
        self.column_mut(column)?.set(row, value)
    }

    // ========================================================================
    // Selection
    // ========================================================================

    fn map_columns<F>(&self, row_count: usize, f: F) -> Table
    where
        F: Fn(&Column) -> Column,
    {
        Table {
            columns: self.columns.iter().map(f).collect(),
            row_count,
            options: self.options,
        }
    }

    /// Rows where `mask` is `true`; null mask entries drop the row.
    pub fn filter(&self, mask: &Column) -> Result<Table> {
        let keep = mask_flags(mask, self.row_count)?;
        let kept = keep.iter().filter(|k| **k).count();
        Ok(self.map_columns(kept, |c| {
            Column::from_data(c.name(), c.data().filter(&keep))
        }))
    }

    pub fn head(&self, n: usize) -> Table {
        let n = n.min(self.row_count);
        self.map_columns(n, |c| c.head(n))
    }

    pub fn tail(&self, n: usize) -> Table {
        let n = n.min(self.row_count);
        self.map_columns(n, |c| c.tail(n))
    }

    // ========================================================================
    // Serialization
    // ========================================================================

    /// Pretty-printed JSON array with one object per row.
    pub fn to_json(&self) -> Result<String> {
        let names = self.column_names();
        let rows: Vec<serde_json::Value> = self
            .rows()
            .map(|row| {
                let obj: serde_json::Map<String, serde_json::Value> = names
                    .iter()
                    .zip(row.iter())
                    .map(|(name, v)| (name.to_string(), json_value(v)))
                    .collect();
                serde_json::Value::Object(obj)
            })
            .collect();
        serde_json::to_string_pretty(&rows)
            .map_err(|e| FrameError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
    }
}

fn json_number(value: f64) -> serde_json::Value {
    serde_json::Number::from_f64(value)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

fn json_value(value: &ColumnValue) -> serde_json::Value {
    use serde_json::Value;
    match value {
        ColumnValue::Null => Value::Null,
        ColumnValue::Bool(b) => Value::Bool(*b),
        ColumnValue::Byte(n) => Value::from(*n),
        ColumnValue::SByte(n) => Value::from(*n),
        ColumnValue::Int16(n) => Value::from(*n),
        ColumnValue::UInt16(n) => Value::from(*n),
        ColumnValue::Int32(n) => Value::from(*n),
        ColumnValue::UInt32(n) => Value::from(*n),
        ColumnValue::Int64(n) => Value::from(*n),
        ColumnValue::UInt64(n) => Value::from(*n),
        ColumnValue::Float32(f) => json_number(*f as f64),
        ColumnValue::Float64(f) => json_number(*f),
        // Decimal and char values keep their exact text.
        ColumnValue::Decimal(_) | ColumnValue::Char(_) | ColumnValue::DateTime(_) => {
            Value::String(value.to_string())
        }
        ColumnValue::String(s) => Value::String(s.clone()),
    }
}

/// Writable handle on one column of a table.
///
/// Reads go through `Deref`; the only writes offered are the ones that keep
/// the column as long as its siblings (element updates, null filling and the
/// in-place operators).
pub struct ColumnMut<'a> {
    column: &'a mut Column,
}

macro_rules! forward_in_place {
    ($($name:ident($($arg:ident: $ty:ty),*)),+ $(,)?) => {
        $(
            pub fn $name(&mut self, $($arg: $ty),*) -> Result<()> {
                self.column.$name($($arg),*)
            }
        )+
    };
}

impl ColumnMut<'_> {
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.column.set_name(name);
    }

    forward_in_place! {
        set(index: usize, value: impl Into<ColumnValue>),
        fill_nulls_in_place(value: impl Into<ColumnValue>),
        binary_in_place(op: BinaryOperation, other: &Column),
        binary_scalar_in_place(op: BinaryOperation, value: &ColumnValue, reverse: bool),
        left_shift_in_place(amount: i32),
        right_shift_in_place(amount: i32),
        add_in_place(other: &Column),
        subtract_in_place(other: &Column),
        multiply_in_place(other: &Column),
        divide_in_place(other: &Column),
        modulo_in_place(other: &Column),
        and_in_place(other: &Column),
        or_in_place(other: &Column),
        xor_in_place(other: &Column),
        add_scalar_in_place(value: impl Into<ColumnValue>),
        subtract_scalar_in_place(value: impl Into<ColumnValue>),
        multiply_scalar_in_place(value: impl Into<ColumnValue>),
        divide_scalar_in_place(value: impl Into<ColumnValue>),
        modulo_scalar_in_place(value: impl Into<ColumnValue>),
        and_scalar_in_place(value: impl Into<ColumnValue>),
        or_scalar_in_place(value: impl Into<ColumnValue>),
        xor_scalar_in_place(value: impl Into<ColumnValue>),
        reverse_subtract_in_place(value: impl Into<ColumnValue>),
        reverse_divide_in_place(value: impl Into<ColumnValue>),
        reverse_modulo_in_place(value: impl Into<ColumnValue>),
    }
}

impl Deref for ColumnMut<'_> {
    type Target = Column;

    fn deref(&self) -> &Column {
        &*self.column
    }
}

pub struct TableRowIterator<'a> {
    table: &'a Table,
    index: usize,
}

impl<'a> Iterator for TableRowIterator<'a> {
    type Item = Vec<ColumnValue>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.table.row_count {
            None
        } else {
            let result = self.table.row(self.index).ok();
            self.index += 1;
            result
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.table.row_count.saturating_sub(self.index);
        (left, Some(left))
    }
}

impl std::fmt::Debug for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Table {{ columns: {:?}, rows: {} }}",
            self.column_names(),
            self.row_count
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn users() -> Table {
        Table::from_columns(vec![
            Column::new("id", vec![Some(1i32), Some(2), Some(3)]),
            Column::new(
                "name",
                vec![Some("Alice".to_string()), Some("Bob".to_string()), None],
            ),
            Column::new("age", vec![Some(30i64), None, Some(41)]),
        ])
        .unwrap()
    }

    #[test]
    fn test_table_basic() {
        let table = users();
        assert_eq!(table.len(), 3);
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.column_names(), vec!["id", "name", "age"]);
        assert_eq!(
            table.get_value(0, "name").unwrap().as_string(),
            Some("Alice")
        );
        assert!(matches!(
            table.get_value(0, "missing"),
            Err(FrameError::ColumnNotFound(_))
        ));
    }

    #[test]
    fn test_from_columns_checks_lengths() {
        let err = Table::from_columns(vec![
            Column::new("a", vec![Some(1i32)]),
            Column::new("b", vec![Some(1i32), Some(2)]),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            FrameError::Argument(ArgumentError::MismatchedColumnLengths { expected: 1, actual: 2 })
        ));
    }

    #[test]
    fn test_append_row_converts_and_is_atomic() {
        let mut table = users();
        table
            .append_row(vec![
                ColumnValue::Int16(4),
                ColumnValue::from("Dana"),
                ColumnValue::Int32(25),
            ])
            .unwrap();
        assert_eq!(table.len(), 4);
        assert_eq!(table.get_value(3, "age").unwrap(), ColumnValue::Int64(25));

        let err = table
            .append_row(vec![
                ColumnValue::Int32(5),
                ColumnValue::Int32(5),
                ColumnValue::Null,
            ])
            .unwrap_err();
        assert!(matches!(err, FrameError::TypeMismatch(_)));
        assert_eq!(table.len(), 4);
        for column in table.columns() {
            assert_eq!(column.len(), 4);
        }

        assert!(matches!(
            table.append_row(vec![ColumnValue::Null]),
            Err(FrameError::Argument(ArgumentError::MismatchedValueCount { expected: 3, actual: 1 }))
        ));
    }

    #[test]
    fn test_append_named_row() {
        let mut table = users();
        let mut row = HashMap::new();
        row.insert("id".to_string(), ColumnValue::Int32(9));
        table.append_named_row(row).unwrap();
        assert_eq!(
            table.row(3).unwrap(),
            vec![ColumnValue::Int32(9), ColumnValue::Null, ColumnValue::Null]
        );

        let mut bad = HashMap::new();
        bad.insert("nope".to_string(), ColumnValue::Int32(1));
        assert!(matches!(
            table.append_named_row(bad),
            Err(FrameError::ColumnNotFound(_))
        ));
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn test_column_management() {
        let mut table = users();
        table
            .insert_column(0, Column::new("flag", vec![Some(true), Some(false), Some(true)]))
            .unwrap();
        assert_eq!(table.column_at(0).unwrap().name(), "flag");
        assert!(table
            .add_column(Column::new("short", vec![Some(1u8)]))
            .is_err());

        table.rename_column("flag", "active").unwrap();
        assert_eq!(table.column_index("active"), Some(0));

        let removed = table.remove_column("active").unwrap();
        assert_eq!(removed.element_type(), ElementType::Bool);
        assert_eq!(table.column_count(), 3);
        assert_eq!(
            table.schema().column_type("age"),
            Some(ElementType::Int64)
        );
    }

    #[test]
    fn test_rows_filter_head_tail() {
        let table = users();
        let rows: Vec<_> = table.rows().collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1][1], ColumnValue::from("Bob"));

        let mask = table
            .column("age")
            .unwrap()
            .elementwise_greater_than_scalar(35i64)
            .unwrap();
        let old = table.filter(&mask).unwrap();
        assert_eq!(old.len(), 1);
        assert_eq!(old.get_value(0, "id").unwrap(), ColumnValue::Int32(3));

        assert_eq!(table.head(2).len(), 2);
        assert_eq!(table.tail(1).get_value(0, "id").unwrap(), ColumnValue::Int32(3));
        assert_eq!(table.head(10).len(), 3);
    }

    #[test]
    fn test_to_json() {
        let table = users();
        let json = table.to_json().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["name"], "Alice");
        assert_eq!(parsed[1]["age"], serde_json::Value::Null);
        assert_eq!(parsed[2]["id"], 3);
    }

    #[test]
    fn test_schema_round_trips_through_json() {
        let schema = users().schema();
        let text = serde_json::to_string(&schema).unwrap();
        let back: Schema = serde_json::from_str(&text).unwrap();
        assert_eq!(back, schema);
        assert_eq!(
            Table::from_schema(&back, StorageOptions::default())
                .unwrap()
                .column_names(),
            vec!["id", "name", "age"]
        );
    }

    #[test]
    fn test_column_mut_keeps_rows_aligned() {
        let mut table = users();
        {
            let mut age = table.column_mut("age").unwrap();
            age.add_scalar_in_place(1i64).unwrap();
            age.fill_nulls_in_place(0i64).unwrap();
            age.set(0, 50i64).unwrap();
            assert_eq!(age.len(), 3);
        }
        assert!(table.column_mut("id").unwrap().add_scalar_in_place(0.5f64).is_err());
        table.set_value(2, "name", "Carol").unwrap();

        let rows: Vec<_> = table.rows().collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(
            rows[2],
            vec![ColumnValue::Int32(3), ColumnValue::from("Carol"), ColumnValue::Int64(42)]
        );
        assert_eq!(table.get_value(0, "age").unwrap(), ColumnValue::Int64(50));
        assert_eq!(table.get_value(1, "age").unwrap(), ColumnValue::Int64(0));
    }

    #[test]
    fn test_replace_column_checks_length() {
        let mut table = users();
        let err = table
            .replace_column("id", Column::new("id", vec![Some(9i32)]))
            .unwrap_err();
        assert!(matches!(
            err,
            FrameError::Argument(ArgumentError::MismatchedColumnLengths { expected: 3, actual: 1 })
        ));
        assert_eq!(table.rows().count(), 3);

        let old = table
            .replace_column("id", Column::new("id", vec![Some(7u64), Some(8), Some(9)]))
            .unwrap();
        assert_eq!(old.element_type(), ElementType::Int32);
        assert_eq!(table.get_value(2, "id").unwrap(), ColumnValue::UInt64(9));
    }
}
