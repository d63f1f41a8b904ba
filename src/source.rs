//! Row-source bridging.
//!
//! A `RowSource` is a forward-only cursor over typed rows (a database reader,
//! a spreadsheet range, another table); a `RowSink` accepts columns and rows.
//! `Table` can be built from the former and drained into the latter.

use crate::column::{Column, ColumnData};
use crate::error::{ArgumentError, Result, TypeMismatch};
use crate::options::StorageOptions;
use crate::table::Table;
use crate::value::{ColumnValue, ElementType};
use log::debug;

/// Forward-only cursor over typed rows.
pub trait RowSource {
    fn field_count(&self) -> usize;

    fn field_name(&self, index: usize) -> String;

    fn field_type(&self, index: usize) -> ElementType;

    /// Next row, or `None` at the end.
    fn next_row(&mut self) -> Result<Option<Vec<ColumnValue>>>;
}

/// Destination for a table's columns and rows.
pub trait RowSink {
    fn column_count(&self) -> usize;

    fn column_name(&self, index: usize) -> String;

    fn column_type(&self, index: usize) -> ElementType;

    fn add_column(&mut self, name: &str, kind: ElementType) -> Result<()>;

    fn append_row(&mut self, row: Vec<ColumnValue>) -> Result<()>;
}

impl Table {
    /// Read every row of `source` into a new table.
    pub fn from_row_source<S: RowSource + ?Sized>(source: &mut S, options: StorageOptions) -> Result<Table> {
        let mut table = Table::with_options(options)?;
        for i in 0..source.field_count() {
            let data = ColumnData::empty(source.field_type(i), options.chunk_size);
            table.add_column(Column::from_data(source.field_name(i), data))?;
        }
        while let Some(row) = source.next_row()? {
            table.append_row(row)?;
        }
        debug!(
            "loaded {} rows x {} columns from row source",
            table.len(),
            table.column_count()
        );
        Ok(table)
    }

    /// Write all rows into `sink`.
    ///
    /// An empty sink receives this table's columns first; otherwise its
    /// column count and kinds must match.
    pub fn write_to_sink<S: RowSink + ?Sized>(&self, sink: &mut S) -> Result<()> {
        if sink.column_count() == 0 {
            for column in self.columns() {
                sink.add_column(column.name(), column.element_type())?;
            }
        } else {
            if sink.column_count() != self.column_count() {
                return Err(ArgumentError::MismatchedValueCount {
                    expected: sink.column_count(),
                    actual: self.column_count(),
                }
                .into());
            }
            for (i, column) in self.columns().iter().enumerate() {
                let expected = sink.column_type(i);
                if expected != column.element_type() {
                    return Err(TypeMismatch::MismatchedValueType {
                        expected,
                        actual: column.element_type(),
                    }
                    .into());
                }
            }
        }
        for row in self.rows() {
            sink.append_row(row)?;
        }
        Ok(())
    }
}

/// In-memory rows with a fixed schema; both a source and a sink.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    fields: Vec<(String, ElementType)>,
    rows: Vec<Vec<ColumnValue>>,
    cursor: usize,
}

impl RowSet {
    pub fn new(fields: Vec<(String, ElementType)>) -> Self {
        RowSet {
            fields,
            rows: Vec::new(),
            cursor: 0,
        }
    }

    pub fn with_rows(fields: Vec<(String, ElementType)>, rows: Vec<Vec<ColumnValue>>) -> Self {
        RowSet {
            fields,
            rows,
            cursor: 0,
        }
    }

    pub fn rows(&self) -> &[Vec<ColumnValue>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Restart iteration from the first row.
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }
}

impl RowSource for RowSet {
    fn field_count(&self) -> usize {
        self.fields.len()
    }

    fn field_name(&self, index: usize) -> String {
        self.fields[index].0.clone()
    }

    fn field_type(&self, index: usize) -> ElementType {
        self.fields[index].1
    }

    fn next_row(&mut self) -> Result<Option<Vec<ColumnValue>>> {
        let row = self.rows.get(self.cursor).cloned();
        if row.is_some() {
            self.cursor += 1;
        }
        Ok(row)
    }
}

impl RowSink for RowSet {
    fn column_count(&self) -> usize {
        self.fields.len()
    }

    fn column_name(&self, index: usize) -> String {
        self.fields[index].0.clone()
    }

    fn column_type(&self, index: usize) -> ElementType {
        self.fields[index].1
    }

    fn add_column(&mut self, name: &str, kind: ElementType) -> Result<()> {
        if !self.rows.is_empty() {
            return Err(ArgumentError::Invalid(format!(
                "cannot add column '{}' to a row set that already holds rows",
                name
            ))
            .into());
        }
        self.fields.push((name.to_string(), kind));
        Ok(())
    }

    fn append_row(&mut self, row: Vec<ColumnValue>) -> Result<()> {
        if row.len() != self.fields.len() {
            return Err(ArgumentError::MismatchedValueCount {
                expected: self.fields.len(),
                actual: row.len(),
            }
            .into());
        }
        self.rows.push(row);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FrameError;
    use pretty_assertions::assert_eq;

    fn people() -> RowSet {
        RowSet::with_rows(
            vec![
                ("id".to_string(), ElementType::Int32),
                ("name".to_string(), ElementType::String),
            ],
            vec![
                vec![ColumnValue::Int32(1), ColumnValue::from("Ann")],
                vec![ColumnValue::Int32(2), ColumnValue::Null],
            ],
        )
    }

    #[test]
    fn test_table_from_row_source() {
        let mut source = people();
        let table = Table::from_row_source(&mut source, StorageOptions::default()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.column_names(), vec!["id", "name"]);
        assert_eq!(table.get_value(1, "name").unwrap(), ColumnValue::Null);
    }

    #[test]
    fn test_write_to_empty_sink_adds_columns() {
        let mut source = people();
        let table = Table::from_row_source(&mut source, StorageOptions::default()).unwrap();

        let mut sink = RowSet::default();
        table.write_to_sink(&mut sink).unwrap();
        assert_eq!(sink.column_count(), 2);
        assert_eq!(sink.column_type(1), ElementType::String);
        assert_eq!(sink.rows(), people().rows());
    }

    #[test]
    fn test_write_to_sink_validates_schema() {
        let mut source = people();
        let table = Table::from_row_source(&mut source, StorageOptions::default()).unwrap();

        let mut narrow = RowSet::new(vec![("id".to_string(), ElementType::Int32)]);
        assert!(matches!(
            table.write_to_sink(&mut narrow),
            Err(FrameError::Argument(ArgumentError::MismatchedValueCount { .. }))
        ));

        let mut wrong_kind = RowSet::new(vec![
            ("id".to_string(), ElementType::Int64),
            ("name".to_string(), ElementType::String),
        ]);
        assert!(matches!(
            table.write_to_sink(&mut wrong_kind),
            Err(FrameError::TypeMismatch(TypeMismatch::MismatchedValueType { .. }))
        ));
        assert!(wrong_kind.is_empty());
    }
}
