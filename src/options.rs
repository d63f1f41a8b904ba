//! Storage and CSV configuration.

use crate::error::{ArgumentError, Result};
use crate::value::ElementType;
use serde::{Deserialize, Serialize};

/// Elements per column chunk unless configured otherwise.
pub const DEFAULT_CHUNK_SIZE: usize = 65_536;

/// Column storage settings shared by every column of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageOptions {
    /// Capacity of one buffer; must be positive.
    pub chunk_size: usize,
}

impl Default for StorageOptions {
    fn default() -> Self {
        StorageOptions {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl StorageOptions {
    pub fn with_chunk_size(chunk_size: usize) -> Result<Self> {
        let options = StorageOptions { chunk_size };
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(ArgumentError::Invalid("chunk_size must be positive".to_string()).into());
        }
        Ok(())
    }
}

/// Text encodings accepted by the CSV reader and writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CsvEncoding {
    #[default]
    Utf8,
    Windows1252,
}

impl CsvEncoding {
    pub(crate) fn encoding(&self) -> &'static encoding_rs::Encoding {
        match self {
            CsvEncoding::Utf8 => encoding_rs::UTF_8,
            CsvEncoding::Windows1252 => encoding_rs::WINDOWS_1252,
        }
    }
}

/// Options for loading and saving CSV text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvOptions {
    pub separator: char,
    pub has_header: bool,
    /// Overrides header names (or names a headerless file).
    pub column_names: Option<Vec<String>>,
    /// Skips type sniffing when given.
    pub column_types: Option<Vec<ElementType>>,
    pub max_rows: Option<usize>,
    /// Data rows scanned when sniffing column types.
    pub guess_rows: usize,
    pub add_index_column: bool,
    pub encoding: CsvEncoding,
    pub decimal_separator: char,
    pub rename_duplicate_columns: bool,
    pub storage: StorageOptions,
}

impl Default for CsvOptions {
    fn default() -> Self {
        CsvOptions {
            separator: ',',
            has_header: true,
            column_names: None,
            column_types: None,
            max_rows: None,
            guess_rows: 10,
            add_index_column: false,
            encoding: CsvEncoding::Utf8,
            decimal_separator: '.',
            rename_duplicate_columns: false,
            storage: StorageOptions::default(),
        }
    }
}

impl CsvOptions {
    pub fn validate(&self) -> Result<()> {
        if self.decimal_separator == self.separator {
            return Err(ArgumentError::SeparatorCollision(self.separator).into());
        }
        if matches!(self.separator, '"' | '\r' | '\n') {
            return Err(ArgumentError::Invalid(format!(
                "{:?} cannot be used as a separator",
                self.separator
            ))
            .into());
        }
        self.storage.validate()
    }
}
