//! Dispatch macros over the `ColumnData` tagged union.
//!
//! Each arm binds the concrete `TypedContainer<T>` and evaluates the same
//! body, so the body is compiled once per element kind. Type dispatch happens
//! here, once per call; the loops inside the body are fully monomorphized.

/// Bind the container of every variant.
macro_rules! with_container {
    ($data:expr, $c:ident => $body:expr) => {
        match $data {
            $crate::column::ColumnData::Bool($c) => $body,
            $crate::column::ColumnData::Byte($c) => $body,
            $crate::column::ColumnData::SByte($c) => $body,
            $crate::column::ColumnData::Int16($c) => $body,
            $crate::column::ColumnData::UInt16($c) => $body,
            $crate::column::ColumnData::Int32($c) => $body,
            $crate::column::ColumnData::UInt32($c) => $body,
            $crate::column::ColumnData::Int64($c) => $body,
            $crate::column::ColumnData::UInt64($c) => $body,
            $crate::column::ColumnData::Float32($c) => $body,
            $crate::column::ColumnData::Float64($c) => $body,
            $crate::column::ColumnData::Decimal128($c) => $body,
            $crate::column::ColumnData::Char16($c) => $body,
            $crate::column::ColumnData::DateTime($c) => $body,
            $crate::column::ColumnData::String($c) => $body,
        }
    };
}

/// Bind the container of the listed variants; anything else takes the fallback.
macro_rules! match_kinds {
    ($data:expr, [$($variant:ident),+ $(,)?], $c:ident => $body:expr, _ => $fallback:expr) => {
        match $data {
            $($crate::column::ColumnData::$variant($c) => $body,)+
            #[allow(unreachable_patterns)]
            _ => $fallback,
        }
    };
}

/// Bind both containers when two payloads share one of the listed variants.
macro_rules! match_kind_pairs {
    ($left:expr, $right:expr, [$($variant:ident),+ $(,)?], ($l:ident, $r:ident) => $body:expr, _ => $fallback:expr) => {
        match ($left, $right) {
            $(($crate::column::ColumnData::$variant($l), $crate::column::ColumnData::$variant($r)) => $body,)+
            #[allow(unreachable_patterns)]
            _ => $fallback,
        }
    };
}

/// Evaluate `body` with `$t` aliased to the storage type of a runtime kind.
macro_rules! with_element_type {
    ($kind:expr, $t:ident => $body:expr) => {
        match $kind {
            $crate::value::ElementType::Bool => { type $t = bool; $body }
            $crate::value::ElementType::Byte => { type $t = u8; $body }
            $crate::value::ElementType::SByte => { type $t = i8; $body }
            $crate::value::ElementType::Int16 => { type $t = i16; $body }
            $crate::value::ElementType::UInt16 => { type $t = u16; $body }
            $crate::value::ElementType::Int32 => { type $t = i32; $body }
            $crate::value::ElementType::UInt32 => { type $t = u32; $body }
            $crate::value::ElementType::Int64 => { type $t = i64; $body }
            $crate::value::ElementType::UInt64 => { type $t = u64; $body }
            $crate::value::ElementType::Float32 => { type $t = f32; $body }
            $crate::value::ElementType::Float64 => { type $t = f64; $body }
            $crate::value::ElementType::Decimal128 => { type $t = rust_decimal::Decimal; $body }
            $crate::value::ElementType::Char16 => { type $t = $crate::value::Char16; $body }
            $crate::value::ElementType::DateTime => { type $t = chrono::NaiveDateTime; $body }
            $crate::value::ElementType::String => { type $t = std::string::String; $body }
        }
    };
}
