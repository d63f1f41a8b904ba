//! Element kinds and boxed cell values.
//!
//! `ElementType` is the closed set of kinds a column can hold. `ColumnValue`
//! is the uniform "any primitive or null" representation used wherever values
//! cross column boundaries (rows, CSV, row sources). `Element` ties each Rust
//! storage type to its kind so generic code can be monomorphized per kind.

use crate::column::ColumnData;
use crate::container::TypedContainer;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Column element kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Bool,
    Byte,
    SByte,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
    Decimal128,
    Char16,
    DateTime,
    String,
}

impl ElementType {
    pub const ALL: [ElementType; 15] = [
        ElementType::Bool,
        ElementType::Byte,
        ElementType::SByte,
        ElementType::Int16,
        ElementType::UInt16,
        ElementType::Int32,
        ElementType::UInt32,
        ElementType::Int64,
        ElementType::UInt64,
        ElementType::Float32,
        ElementType::Float64,
        ElementType::Decimal128,
        ElementType::Char16,
        ElementType::DateTime,
        ElementType::String,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ElementType::Bool => "bool",
            ElementType::Byte => "byte",
            ElementType::SByte => "sbyte",
            ElementType::Int16 => "int16",
            ElementType::UInt16 => "uint16",
            ElementType::Int32 => "int32",
            ElementType::UInt32 => "uint32",
            ElementType::Int64 => "int64",
            ElementType::UInt64 => "uint64",
            ElementType::Float32 => "float32",
            ElementType::Float64 => "float64",
            ElementType::Decimal128 => "decimal128",
            ElementType::Char16 => "char16",
            ElementType::DateTime => "datetime",
            ElementType::String => "string",
        }
    }

    /// The eleven kinds covered by the conversion table.
    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_floating() || *self == ElementType::Decimal128
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            ElementType::Byte
                | ElementType::SByte
                | ElementType::Int16
                | ElementType::UInt16
                | ElementType::Int32
                | ElementType::UInt32
                | ElementType::Int64
                | ElementType::UInt64
        )
    }

    pub fn is_floating(&self) -> bool {
        matches!(self, ElementType::Float32 | ElementType::Float64)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ElementType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        ElementType::ALL
            .iter()
            .copied()
            .find(|t| t.name() == lowered)
            .ok_or_else(|| format!("Unknown element type: '{}'", s))
    }
}

/// A single boxed cell value
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    Null,
    Bool(bool),
    Byte(u8),
    SByte(i8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
    Decimal(Decimal),
    Char(u16),
    DateTime(NaiveDateTime),
    String(String),
}

impl ColumnValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ColumnValue::Null)
    }

    /// Kind of the value; `None` for `Null`, which has no kind of its own.
    pub fn element_type(&self) -> Option<ElementType> {
        let kind = match self {
            ColumnValue::Null => return None,
            ColumnValue::Bool(_) => ElementType::Bool,
            ColumnValue::Byte(_) => ElementType::Byte,
            ColumnValue::SByte(_) => ElementType::SByte,
            ColumnValue::Int16(_) => ElementType::Int16,
            ColumnValue::UInt16(_) => ElementType::UInt16,
            ColumnValue::Int32(_) => ElementType::Int32,
            ColumnValue::UInt32(_) => ElementType::UInt32,
            ColumnValue::Int64(_) => ElementType::Int64,
            ColumnValue::UInt64(_) => ElementType::UInt64,
            ColumnValue::Float32(_) => ElementType::Float32,
            ColumnValue::Float64(_) => ElementType::Float64,
            ColumnValue::Decimal(_) => ElementType::Decimal128,
            ColumnValue::Char(_) => ElementType::Char16,
            ColumnValue::DateTime(_) => ElementType::DateTime,
            ColumnValue::String(_) => ElementType::String,
        };
        Some(kind)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ColumnValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            ColumnValue::Int32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ColumnValue::Int64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            ColumnValue::Float32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ColumnValue::Float64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            ColumnValue::Decimal(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            ColumnValue::DateTime(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            ColumnValue::String(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for ColumnValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnValue::Null => f.write_str("null"),
            ColumnValue::Bool(v) => write!(f, "{}", v),
            ColumnValue::Byte(v) => write!(f, "{}", v),
            ColumnValue::SByte(v) => write!(f, "{}", v),
            ColumnValue::Int16(v) => write!(f, "{}", v),
            ColumnValue::UInt16(v) => write!(f, "{}", v),
            ColumnValue::Int32(v) => write!(f, "{}", v),
            ColumnValue::UInt32(v) => write!(f, "{}", v),
            ColumnValue::Int64(v) => write!(f, "{}", v),
            ColumnValue::UInt64(v) => write!(f, "{}", v),
            ColumnValue::Float32(v) => write!(f, "{}", v),
            ColumnValue::Float64(v) => write!(f, "{}", v),
            ColumnValue::Decimal(v) => write!(f, "{}", v),
            ColumnValue::Char(v) => match char::from_u32(*v as u32) {
                Some(c) => write!(f, "{}", c),
                None => write!(f, "\\u{:04X}", v),
            },
            ColumnValue::DateTime(v) => write!(f, "{}", v.format("%Y-%m-%d %H:%M:%S%.f")),
            ColumnValue::String(v) => f.write_str(v),
        }
    }
}

/// A Rust storage type that backs one `ElementType`.
///
/// Every generic kernel in the crate is written against this trait and
/// instantiated once per kind; `wrap`/`unwrap` move between the generic
/// container and the tagged `ColumnData` union.
pub trait Element: Clone + Default + PartialEq + fmt::Debug + 'static {
    const ELEMENT_TYPE: ElementType;

    fn into_value(self) -> ColumnValue;

    /// Exact-kind extraction; no conversion is attempted.
    fn from_value(value: &ColumnValue) -> Option<Self>;

    fn wrap(container: TypedContainer<Self>) -> ColumnData;

    fn unwrap(data: &ColumnData) -> Option<&TypedContainer<Self>>;

    fn unwrap_mut(data: &mut ColumnData) -> Option<&mut TypedContainer<Self>>;
}

macro_rules! impl_element {
    ($ty:ty, $kind:ident, $value:ident, $data:ident) => {
        impl Element for $ty {
            const ELEMENT_TYPE: ElementType = ElementType::$kind;

            #[inline]
            fn into_value(self) -> ColumnValue {
                ColumnValue::$value(self)
            }

            #[inline]
            fn from_value(value: &ColumnValue) -> Option<Self> {
                match value {
                    ColumnValue::$value(v) => Some(v.clone()),
                    _ => None,
                }
            }

            fn wrap(container: TypedContainer<Self>) -> ColumnData {
                ColumnData::$data(container)
            }

            fn unwrap(data: &ColumnData) -> Option<&TypedContainer<Self>> {
                match data {
                    ColumnData::$data(c) => Some(c),
                    _ => None,
                }
            }

            fn unwrap_mut(data: &mut ColumnData) -> Option<&mut TypedContainer<Self>> {
                match data {
                    ColumnData::$data(c) => Some(c),
                    _ => None,
                }
            }
        }

        impl From<$ty> for ColumnValue {
            fn from(v: $ty) -> Self {
                ColumnValue::$value(v)
            }
        }
    };
}

impl_element!(bool, Bool, Bool, Bool);
impl_element!(u8, Byte, Byte, Byte);
impl_element!(i8, SByte, SByte, SByte);
impl_element!(i16, Int16, Int16, Int16);
impl_element!(i32, Int32, Int32, Int32);
impl_element!(u32, UInt32, UInt32, UInt32);
impl_element!(i64, Int64, Int64, Int64);
impl_element!(u64, UInt64, UInt64, UInt64);
impl_element!(f32, Float32, Float32, Float32);
impl_element!(f64, Float64, Float64, Float64);
impl_element!(Decimal, Decimal128, Decimal, Decimal128);
impl_element!(NaiveDateTime, DateTime, DateTime, DateTime);
impl_element!(String, String, String, String);

// `u16` backs both `uint16` and `char16`; the character kind gets a newtype so
// that each Rust type maps to exactly one kind.
impl_element!(u16, UInt16, UInt16, UInt16);

/// A UTF-16 code unit stored in a `char16` column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Char16(pub u16);

impl Element for Char16 {
    const ELEMENT_TYPE: ElementType = ElementType::Char16;

    #[inline]
    fn into_value(self) -> ColumnValue {
        ColumnValue::Char(self.0)
    }

    #[inline]
    fn from_value(value: &ColumnValue) -> Option<Self> {
        match value {
            ColumnValue::Char(v) => Some(Char16(*v)),
            _ => None,
        }
    }

    fn wrap(container: TypedContainer<Self>) -> ColumnData {
        ColumnData::Char16(container)
    }

    fn unwrap(data: &ColumnData) -> Option<&TypedContainer<Self>> {
        match data {
            ColumnData::Char16(c) => Some(c),
            _ => None,
        }
    }

    fn unwrap_mut(data: &mut ColumnData) -> Option<&mut TypedContainer<Self>> {
        match data {
            ColumnData::Char16(c) => Some(c),
            _ => None,
        }
    }
}

impl From<Char16> for ColumnValue {
    fn from(v: Char16) -> Self {
        ColumnValue::Char(v.0)
    }
}

impl From<&str> for ColumnValue {
    fn from(v: &str) -> Self {
        ColumnValue::String(v.to_string())
    }
}

impl<T: Into<ColumnValue>> From<Option<T>> for ColumnValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(ColumnValue::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_type_names_round_trip() {
        for kind in ElementType::ALL {
            assert_eq!(kind.name().parse::<ElementType>().unwrap(), kind);
        }
        assert!("float128".parse::<ElementType>().is_err());
    }

    #[test]
    fn test_numeric_classification() {
        let numeric: Vec<_> = ElementType::ALL.iter().filter(|t| t.is_numeric()).collect();
        assert_eq!(numeric.len(), 11);
        assert!(!ElementType::Char16.is_numeric());
        assert!(!ElementType::Bool.is_numeric());
        assert!(ElementType::Decimal128.is_numeric());
        assert!(!ElementType::Decimal128.is_integer());
    }

    #[test]
    fn test_serde_uses_lowercase_names() {
        let json = serde_json::to_string(&ElementType::Decimal128).unwrap();
        assert_eq!(json, "\"decimal128\"");
        let back: ElementType = serde_json::from_str("\"uint16\"").unwrap();
        assert_eq!(back, ElementType::UInt16);
    }

    #[test]
    fn test_value_kind_and_accessors() {
        assert_eq!(ColumnValue::Null.element_type(), None);
        assert_eq!(ColumnValue::from(3i32).element_type(), Some(ElementType::Int32));
        assert_eq!(ColumnValue::from(Char16(65)).element_type(), Some(ElementType::Char16));
        assert_eq!(ColumnValue::from(Some(2.5f64)).as_f64(), Some(2.5));
        assert!(ColumnValue::from(None::<i32>).is_null());
        assert_eq!(ColumnValue::from("x").as_string(), Some("x"));
        assert_eq!(ColumnValue::Char(65).to_string(), "A");
    }
}
