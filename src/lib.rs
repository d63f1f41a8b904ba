//! TypedFrame - In-Memory Typed Columnar Tables
//!
//! Columns are chunked, null-aware typed containers with copy-on-write
//! sharing. Elementwise arithmetic and comparisons work across mismatched
//! numeric kinds using a fixed promotion policy (same kind stays native,
//! anything touching decimal becomes decimal, other mixes become float64),
//! with the type dispatch done once per call rather than once per element.

#[macro_use]
mod macros;

pub mod bitmap;
pub mod buffer;
pub mod column;
pub mod container;
pub mod convert;
pub mod csv;
pub mod engine;
pub mod error;
pub mod options;
pub mod source;
pub mod table;
pub mod value;

pub use bitmap::ValidityBitmap;
pub use buffer::Buffer;
pub use column::{Column, ColumnData};
pub use container::TypedContainer;
pub use convert::{convert, convert_value, NumericConvert};
pub use csv::{load_csv, load_csv_from_path, load_csv_from_str, save_csv, save_csv_to_path, to_csv_string};
pub use engine::{binary_result_type, comparison_type, BinaryOperation, ComparisonOperation, ShiftOperation};
pub use error::{ArgumentError, ArithmeticFault, FrameError, Result, SchemaError, TypeMismatch};
pub use options::{CsvEncoding, CsvOptions, StorageOptions, DEFAULT_CHUNK_SIZE};
pub use source::{RowSet, RowSink, RowSource};
pub use table::{ColumnMut, Schema, Table, TableRowIterator};
pub use value::{Char16, ColumnValue, Element, ElementType};
