//! Numeric Conversion Table
//!
//! `NumericConvert<To>` is implemented for every ordered pair of the eleven
//! numeric kinds, so `convert::<From, To>` resolves at compile time and the
//! per-element loop contains no type dispatch. The runtime entry points
//! (`convert_value`, `convert_container`) pick the pair once per call and then
//! run the monomorphized conversion over the whole input.
//!
//! Conversion rules:
//! - integer <-> integer and integer/float -> float use Rust `as` casts
//!   (wrapping between integers, nearest value for floats);
//! - float -> integer saturates at the target bounds, NaN becomes 0;
//! - anything -> decimal fails for NaN, infinities and out-of-range floats;
//! - decimal -> integer truncates toward zero and fails when out of range.

use crate::container::TypedContainer;
use crate::column::ColumnData;
use crate::error::{ArithmeticFault, FrameError, Result};
use crate::value::{ColumnValue, Element, ElementType};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

/// Conversion from `Self` into the numeric kind `To`.
///
/// `None` means the value has no representation in `To`.
pub trait NumericConvert<To>: Sized {
    fn convert(self) -> Option<To>;
}

#[inline]
pub fn convert<F, T>(value: F) -> Option<T>
where
    F: NumericConvert<T>,
{
    value.convert()
}

macro_rules! impl_cast_convert {
    ($from:ty => $($to:ty),+) => {
        $(
            impl NumericConvert<$to> for $from {
                #[inline]
                fn convert(self) -> Option<$to> {
                    Some(self as $to)
                }
            }
        )+
    };
}

impl_cast_convert!(u8 => u8, i8, i16, u16, i32, u32, i64, u64, f32, f64);
impl_cast_convert!(i8 => u8, i8, i16, u16, i32, u32, i64, u64, f32, f64);
impl_cast_convert!(i16 => u8, i8, i16, u16, i32, u32, i64, u64, f32, f64);
impl_cast_convert!(u16 => u8, i8, i16, u16, i32, u32, i64, u64, f32, f64);
impl_cast_convert!(i32 => u8, i8, i16, u16, i32, u32, i64, u64, f32, f64);
impl_cast_convert!(u32 => u8, i8, i16, u16, i32, u32, i64, u64, f32, f64);
impl_cast_convert!(i64 => u8, i8, i16, u16, i32, u32, i64, u64, f32, f64);
impl_cast_convert!(u64 => u8, i8, i16, u16, i32, u32, i64, u64, f32, f64);
impl_cast_convert!(f32 => u8, i8, i16, u16, i32, u32, i64, u64, f32, f64);
impl_cast_convert!(f64 => u8, i8, i16, u16, i32, u32, i64, u64, f32, f64);

macro_rules! impl_decimal_convert {
    ($($ty:ty => $from_fn:ident, $to_fn:ident);+ $(;)?) => {
        $(
            impl NumericConvert<Decimal> for $ty {
                #[inline]
                fn convert(self) -> Option<Decimal> {
                    Decimal::$from_fn(self)
                }
            }

            impl NumericConvert<$ty> for Decimal {
                #[inline]
                fn convert(self) -> Option<$ty> {
                    self.$to_fn()
                }
            }
        )+
    };
}

impl_decimal_convert! {
    u8 => from_u8, to_u8;
    i8 => from_i8, to_i8;
    i16 => from_i16, to_i16;
    u16 => from_u16, to_u16;
    i32 => from_i32, to_i32;
    u32 => from_u32, to_u32;
    i64 => from_i64, to_i64;
    u64 => from_u64, to_u64;
    f32 => from_f32, to_f32;
    f64 => from_f64, to_f64;
}

impl NumericConvert<Decimal> for Decimal {
    #[inline]
    fn convert(self) -> Option<Decimal> {
        Some(self)
    }
}

/// A numeric element kind that converts into every other numeric kind.
pub trait NumericElement:
    Element
    + Copy
    + PartialOrd
    + NumericConvert<u8>
    + NumericConvert<i8>
    + NumericConvert<i16>
    + NumericConvert<u16>
    + NumericConvert<i32>
    + NumericConvert<u32>
    + NumericConvert<i64>
    + NumericConvert<u64>
    + NumericConvert<f32>
    + NumericConvert<f64>
    + NumericConvert<Decimal>
{
}

impl NumericElement for u8 {}
impl NumericElement for i8 {}
impl NumericElement for i16 {}
impl NumericElement for u16 {}
impl NumericElement for i32 {}
impl NumericElement for u32 {}
impl NumericElement for i64 {}
impl NumericElement for u64 {}
impl NumericElement for f32 {}
impl NumericElement for f64 {}
impl NumericElement for Decimal {}

/// Convert one value, reporting unrepresentable results as a fault.
#[inline]
pub(crate) fn convert_or_fault<F, T>(value: F) -> Result<T>
where
    F: NumericConvert<T>,
    T: Element,
{
    value
        .convert()
        .ok_or_else(|| ArithmeticFault::Unrepresentable(T::ELEMENT_TYPE).into())
}

/// Widen (or narrow) every element of a container to `T`.
pub fn widen<F, T>(container: &TypedContainer<F>) -> Result<TypedContainer<T>>
where
    F: Element + Copy + NumericConvert<T>,
    T: Element,
{
    container.try_map(|v| convert_or_fault(*v))
}

fn convert_scalar<F: NumericElement>(value: F, to: ElementType) -> Result<ColumnValue> {
    let converted = match to {
        ElementType::Byte => convert::<F, u8>(value).map(ColumnValue::Byte),
        ElementType::SByte => convert::<F, i8>(value).map(ColumnValue::SByte),
        ElementType::Int16 => convert::<F, i16>(value).map(ColumnValue::Int16),
        ElementType::UInt16 => convert::<F, u16>(value).map(ColumnValue::UInt16),
        ElementType::Int32 => convert::<F, i32>(value).map(ColumnValue::Int32),
        ElementType::UInt32 => convert::<F, u32>(value).map(ColumnValue::UInt32),
        ElementType::Int64 => convert::<F, i64>(value).map(ColumnValue::Int64),
        ElementType::UInt64 => convert::<F, u64>(value).map(ColumnValue::UInt64),
        ElementType::Float32 => convert::<F, f32>(value).map(ColumnValue::Float32),
        ElementType::Float64 => convert::<F, f64>(value).map(ColumnValue::Float64),
        ElementType::Decimal128 => convert::<F, Decimal>(value).map(ColumnValue::Decimal),
        other => return Err(FrameError::not_supported("convert", F::ELEMENT_TYPE, other)),
    };
    converted.ok_or_else(|| ArithmeticFault::Unrepresentable(to).into())
}

/// Convert a boxed value to another kind.
///
/// Nulls stay null and identical kinds are returned unchanged; otherwise both
/// kinds must be numeric.
pub fn convert_value(value: &ColumnValue, to: ElementType) -> Result<ColumnValue> {
    let from = match value.element_type() {
        None => return Ok(ColumnValue::Null),
        Some(from) if from == to => return Ok(value.clone()),
        Some(from) => from,
    };
    match value {
        ColumnValue::Byte(v) => convert_scalar(*v, to),
        ColumnValue::SByte(v) => convert_scalar(*v, to),
        ColumnValue::Int16(v) => convert_scalar(*v, to),
        ColumnValue::UInt16(v) => convert_scalar(*v, to),
        ColumnValue::Int32(v) => convert_scalar(*v, to),
        ColumnValue::UInt32(v) => convert_scalar(*v, to),
        ColumnValue::Int64(v) => convert_scalar(*v, to),
        ColumnValue::UInt64(v) => convert_scalar(*v, to),
        ColumnValue::Float32(v) => convert_scalar(*v, to),
        ColumnValue::Float64(v) => convert_scalar(*v, to),
        ColumnValue::Decimal(v) => convert_scalar(*v, to),
        _ => Err(FrameError::not_supported("convert", from, to)),
    }
}

/// Convert a whole numeric container into a new column payload of kind `to`.
pub fn convert_container<F: NumericElement>(
    container: &TypedContainer<F>,
    to: ElementType,
) -> Result<ColumnData> {
    let data = match to {
        ElementType::Byte => ColumnData::Byte(widen(container)?),
        ElementType::SByte => ColumnData::SByte(widen(container)?),
        ElementType::Int16 => ColumnData::Int16(widen(container)?),
        ElementType::UInt16 => ColumnData::UInt16(widen(container)?),
        ElementType::Int32 => ColumnData::Int32(widen(container)?),
        ElementType::UInt32 => ColumnData::UInt32(widen(container)?),
        ElementType::Int64 => ColumnData::Int64(widen(container)?),
        ElementType::UInt64 => ColumnData::UInt64(widen(container)?),
        ElementType::Float32 => ColumnData::Float32(widen(container)?),
        ElementType::Float64 => ColumnData::Float64(widen(container)?),
        ElementType::Decimal128 => ColumnData::Decimal128(widen(container)?),
        other => return Err(FrameError::not_supported("convert", F::ELEMENT_TYPE, other)),
    };
    Ok(data)
}
