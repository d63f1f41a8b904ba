//! Columns
//!
//! `ColumnData` is the closed union of typed containers, one variant per
//! `ElementType`. `Column` pairs a payload with a mutable name and exposes the
//! named operator surface; every operator checks row counts once and then
//! hands the payloads to the engine.

use crate::container::TypedContainer;
use crate::convert::{convert, convert_container, convert_value, NumericConvert};
use crate::engine::{self, BinaryOperation, ComparisonOperation, ShiftOperation};
use crate::error::{ArgumentError, ArithmeticFault, FrameError, Result, TypeMismatch};
use crate::options::DEFAULT_CHUNK_SIZE;
use crate::value::{Char16, ColumnValue, Element, ElementType};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use std::cmp::Ordering;

/// Typed payload of a column
#[derive(Debug, Clone)]
pub enum ColumnData {
    Bool(TypedContainer<bool>),
    Byte(TypedContainer<u8>),
    SByte(TypedContainer<i8>),
    Int16(TypedContainer<i16>),
    UInt16(TypedContainer<u16>),
    Int32(TypedContainer<i32>),
    UInt32(TypedContainer<u32>),
    Int64(TypedContainer<i64>),
    UInt64(TypedContainer<u64>),
    Float32(TypedContainer<f32>),
    Float64(TypedContainer<f64>),
    Decimal128(TypedContainer<Decimal>),
    Char16(TypedContainer<Char16>),
    DateTime(TypedContainer<NaiveDateTime>),
    String(TypedContainer<String>),
}

/// Bring a boxed value to `kind`: nulls and same-kind values pass through,
/// numeric values go through the conversion table.
pub(crate) fn coerce_value(value: &ColumnValue, kind: ElementType) -> Result<ColumnValue> {
    match value.element_type() {
        None => Ok(ColumnValue::Null),
        Some(actual) if actual == kind => Ok(value.clone()),
        Some(actual) if actual.is_numeric() && kind.is_numeric() => convert_value(value, kind),
        Some(actual) => Err(TypeMismatch::MismatchedValueType {
            expected: kind,
            actual,
        }
        .into()),
    }
}

fn typed<T: Element>(value: &ColumnValue) -> Result<Option<T>> {
    let value = coerce_value(value, T::ELEMENT_TYPE)?;
    if value.is_null() {
        return Ok(None);
    }
    T::from_value(&value).map(Some).ok_or_else(|| {
        TypeMismatch::MismatchedValueType {
            expected: T::ELEMENT_TYPE,
            actual: value.element_type().unwrap_or(T::ELEMENT_TYPE),
        }
        .into()
    })
}

fn fill_container<T: Element>(container: &mut TypedContainer<T>, fill: T) {
    for chunk in 0..container.buffer_count() {
        if container.buffer(chunk).null_count() == 0 {
            continue;
        }
        let mut buffer = container.get_or_create_mutable_buffer(chunk);
        for i in 0..buffer.len() {
            if !buffer.is_valid(i) {
                buffer.set(i, Some(fill.clone()));
            }
        }
    }
}

fn sum_as_f64<T>(container: &TypedContainer<T>) -> Option<(f64, usize)>
where
    T: Element + Copy + NumericConvert<f64>,
{
    let mut total = 0.0;
    let mut count = 0;
    for v in container.iter().flatten() {
        total += convert::<T, f64>(*v).unwrap_or(f64::NAN);
        count += 1;
    }
    (count > 0).then_some((total, count))
}

fn sum_decimal(container: &TypedContainer<Decimal>) -> Result<Option<(Decimal, usize)>> {
    let mut total = Decimal::ZERO;
    let mut count = 0;
    for v in container.iter().flatten() {
        total = total
            .checked_add(*v)
            .ok_or(ArithmeticFault::Overflow(ElementType::Decimal128))?;
        count += 1;
    }
    Ok((count > 0).then_some((total, count)))
}

/// Smallest (`Ordering::Less`) or largest (`Ordering::Greater`) non-null value.
/// Values unordered against themselves (NaN) are skipped.
fn extreme<T: Element + PartialOrd>(container: &TypedContainer<T>, want: Ordering) -> Option<T> {
    let mut best: Option<&T> = None;
    for v in container.iter().flatten() {
        if v.partial_cmp(v).is_none() {
            continue;
        }
        match best {
            Some(b) if v.partial_cmp(b) != Some(want) => {}
            _ => best = Some(v),
        }
    }
    best.cloned()
}

impl ColumnData {
    pub fn empty(kind: ElementType, chunk_size: usize) -> Self {
        with_element_type!(kind, T => T::wrap(TypedContainer::<T>::new(chunk_size)))
    }

    /// A payload of `len` nulls.
    pub fn nulls(kind: ElementType, chunk_size: usize, len: usize) -> Self {
        with_element_type!(kind, T => T::wrap(TypedContainer::<T>::nulls(chunk_size, len)))
    }

    /// Build a payload of `kind` from boxed values, converting numerics.
    pub fn from_values(kind: ElementType, chunk_size: usize, values: &[ColumnValue]) -> Result<Self> {
        let mut data = Self::empty(kind, chunk_size);
        for v in values {
            data.append(v)?;
        }
        Ok(data)
    }

    pub fn element_type(&self) -> ElementType {
        with_container!(self, c => element_type_of(c))
    }

    pub fn len(&self) -> usize {
        with_container!(self, c => c.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn null_count(&self) -> usize {
        with_container!(self, c => c.null_count())
    }

    pub fn chunk_size(&self) -> usize {
        with_container!(self, c => c.chunk_size())
    }

    /// Boxed element; panics when out of range.
    pub fn get(&self, index: usize) -> ColumnValue {
        with_container!(self, c => c
            .get(index)
            .cloned()
            .map(Element::into_value)
            .unwrap_or(ColumnValue::Null))
    }

    pub fn is_valid(&self, index: usize) -> bool {
        with_container!(self, c => c.is_valid(index))
    }

    pub fn set(&mut self, index: usize, value: &ColumnValue) -> Result<()> {
        with_container!(self, c => {
            let v = typed(value)?;
            c.set(index, v);
        });
        Ok(())
    }

    pub fn append(&mut self, value: &ColumnValue) -> Result<()> {
        with_container!(self, c => {
            let v = typed(value)?;
            c.append(v);
        });
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = ColumnValue> + '_ {
        (0..self.len()).map(move |i| self.get(i))
    }

    pub fn slice(&self, start: usize, len: usize) -> Self {
        with_container!(self, c => Element::wrap(c.slice(start, len)))
    }

    pub fn filter(&self, keep: &[bool]) -> Self {
        with_container!(self, c => Element::wrap(c.filter(keep.iter().copied())))
    }

    pub fn rechunk(&self, chunk_size: usize) -> Self {
        with_container!(self, c => Element::wrap(c.rechunk(chunk_size)))
    }
}

fn element_type_of<T: Element>(_: &TypedContainer<T>) -> ElementType {
    T::ELEMENT_TYPE
}

/// A named, typed column
#[derive(Debug, Clone)]
pub struct Column {
    name: String,
    data: ColumnData,
}

macro_rules! binary_operators {
    ($(($op:ident, $name:ident, $in_place:ident, $scalar:ident, $scalar_in_place:ident, $reverse:ident, $reverse_in_place:ident)),+ $(,)?) => {
        $(
            pub fn $name(&self, other: &Column) -> Result<Column> {
                self.binary(BinaryOperation::$op, other)
            }

            pub fn $in_place(&mut self, other: &Column) -> Result<()> {
                self.binary_in_place(BinaryOperation::$op, other)
            }

            pub fn $scalar(&self, value: impl Into<ColumnValue>) -> Result<Column> {
                self.binary_scalar(BinaryOperation::$op, &value.into(), false)
            }

            pub fn $scalar_in_place(&mut self, value: impl Into<ColumnValue>) -> Result<()> {
                self.binary_scalar_in_place(BinaryOperation::$op, &value.into(), false)
            }

            /// Scalar on the left: `value op self[i]`.
            pub fn $reverse(&self, value: impl Into<ColumnValue>) -> Result<Column> {
                self.binary_scalar(BinaryOperation::$op, &value.into(), true)
            }

            pub fn $reverse_in_place(&mut self, value: impl Into<ColumnValue>) -> Result<()> {
                self.binary_scalar_in_place(BinaryOperation::$op, &value.into(), true)
            }
        )+
    };
}

macro_rules! comparison_operators {
    ($(($op:ident, $name:ident, $scalar:ident)),+ $(,)?) => {
        $(
            pub fn $name(&self, other: &Column) -> Result<Column> {
                self.compare(ComparisonOperation::$op, other)
            }

            pub fn $scalar(&self, value: impl Into<ColumnValue>) -> Result<Column> {
                self.compare_scalar(ComparisonOperation::$op, &value.into())
            }
        )+
    };
}

impl Column {
    /// Column of `T` values with the default chunk size.
    pub fn new<T, I>(name: impl Into<String>, values: I) -> Self
    where
        T: Element,
        I: IntoIterator<Item = Option<T>>,
    {
        Self::with_chunk_size(name, DEFAULT_CHUNK_SIZE, values)
    }

    pub fn with_chunk_size<T, I>(name: impl Into<String>, chunk_size: usize, values: I) -> Self
    where
        T: Element,
        I: IntoIterator<Item = Option<T>>,
    {
        Column {
            name: name.into(),
            data: T::wrap(TypedContainer::from_options(chunk_size, values)),
        }
    }

    pub fn from_data(name: impl Into<String>, data: ColumnData) -> Self {
        Column {
            name: name.into(),
            data,
        }
    }

    pub fn empty(name: impl Into<String>, kind: ElementType) -> Self {
        Self::from_data(name, ColumnData::empty(kind, DEFAULT_CHUNK_SIZE))
    }

    pub fn from_values(name: impl Into<String>, kind: ElementType, values: &[ColumnValue]) -> Result<Self> {
        Ok(Self::from_data(
            name,
            ColumnData::from_values(kind, DEFAULT_CHUNK_SIZE, values)?,
        ))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn rename(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn element_type(&self) -> ElementType {
        self.data.element_type()
    }

    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    pub fn into_data(self) -> ColumnData {
        self.data
    }

    /// The underlying container when the column holds `T`.
    pub fn typed<T: Element>(&self) -> Option<&TypedContainer<T>> {
        T::unwrap(&self.data)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn null_count(&self) -> usize {
        self.data.null_count()
    }

    pub fn chunk_size(&self) -> usize {
        self.data.chunk_size()
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.len() {
            return Err(FrameError::IndexOutOfRange {
                index,
                len: self.len(),
            });
        }
        Ok(())
    }

    pub fn get(&self, index: usize) -> Result<ColumnValue> {
        self.check_index(index)?;
        Ok(self.data.get(index))
    }

    pub fn is_null(&self, index: usize) -> Result<bool> {
        self.check_index(index)?;
        Ok(!self.data.is_valid(index))
    }

    pub fn set(&mut self, index: usize, value: impl Into<ColumnValue>) -> Result<()> {
        self.check_index(index)?;
        self.data.set(index, &value.into())
    }

    pub fn append(&mut self, value: impl Into<ColumnValue>) -> Result<()> {
        self.data.append(&value.into())
    }

    pub fn iter(&self) -> impl Iterator<Item = ColumnValue> + '_ {
        self.data.iter()
    }

    fn check_length(&self, other: &Column) -> Result<()> {
        if self.len() != other.len() {
            return Err(ArgumentError::MismatchedColumnLengths {
                expected: self.len(),
                actual: other.len(),
            }
            .into());
        }
        Ok(())
    }

    fn derived(&self, data: ColumnData) -> Column {
        Column {
            name: self.name.clone(),
            data,
        }
    }

    // ========================================================================
    // Operators
    // ========================================================================

    pub fn binary(&self, op: BinaryOperation, other: &Column) -> Result<Column> {
        self.check_length(other)?;
        Ok(self.derived(engine::binary(op, &self.data, &other.data)?))
    }

    pub fn binary_in_place(&mut self, op: BinaryOperation, other: &Column) -> Result<()> {
        self.check_length(other)?;
        engine::binary_in_place(op, &mut self.data, &other.data)
    }

    pub fn binary_scalar(&self, op: BinaryOperation, value: &ColumnValue, reverse: bool) -> Result<Column> {
        Ok(self.derived(engine::binary_scalar(op, &self.data, value, reverse)?))
    }

    pub fn binary_scalar_in_place(
        &mut self,
        op: BinaryOperation,
        value: &ColumnValue,
        reverse: bool,
    ) -> Result<()> {
        engine::binary_scalar_in_place(op, &mut self.data, value, reverse)
    }

    pub fn compare(&self, op: ComparisonOperation, other: &Column) -> Result<Column> {
        self.check_length(other)?;
        Ok(self.derived(engine::compare(op, &self.data, &other.data)?))
    }

    pub fn compare_scalar(&self, op: ComparisonOperation, value: &ColumnValue) -> Result<Column> {
        Ok(self.derived(engine::compare_scalar(op, &self.data, value)?))
    }

    binary_operators! {
        (Add, add, add_in_place, add_scalar, add_scalar_in_place, reverse_add, reverse_add_in_place),
        (Subtract, subtract, subtract_in_place, subtract_scalar, subtract_scalar_in_place, reverse_subtract, reverse_subtract_in_place),
        (Multiply, multiply, multiply_in_place, multiply_scalar, multiply_scalar_in_place, reverse_multiply, reverse_multiply_in_place),
        (Divide, divide, divide_in_place, divide_scalar, divide_scalar_in_place, reverse_divide, reverse_divide_in_place),
        (Modulo, modulo, modulo_in_place, modulo_scalar, modulo_scalar_in_place, reverse_modulo, reverse_modulo_in_place),
        (And, and, and_in_place, and_scalar, and_scalar_in_place, reverse_and, reverse_and_in_place),
        (Or, or, or_in_place, or_scalar, or_scalar_in_place, reverse_or, reverse_or_in_place),
        (Xor, xor, xor_in_place, xor_scalar, xor_scalar_in_place, reverse_xor, reverse_xor_in_place),
    }

    comparison_operators! {
        (Equals, elementwise_equals, elementwise_equals_scalar),
        (NotEquals, elementwise_not_equals, elementwise_not_equals_scalar),
        (GreaterThanOrEqual, elementwise_greater_than_or_equal, elementwise_greater_than_or_equal_scalar),
        (LessThanOrEqual, elementwise_less_than_or_equal, elementwise_less_than_or_equal_scalar),
        (GreaterThan, elementwise_greater_than, elementwise_greater_than_scalar),
        (LessThan, elementwise_less_than, elementwise_less_than_scalar),
    }

    pub fn left_shift(&self, amount: i32) -> Result<Column> {
        Ok(self.derived(engine::shift(ShiftOperation::LeftShift, &self.data, amount)?))
    }

    pub fn left_shift_in_place(&mut self, amount: i32) -> Result<()> {
        engine::shift_in_place(ShiftOperation::LeftShift, &mut self.data, amount)
    }

    pub fn right_shift(&self, amount: i32) -> Result<Column> {
        Ok(self.derived(engine::shift(ShiftOperation::RightShift, &self.data, amount)?))
    }

    pub fn right_shift_in_place(&mut self, amount: i32) -> Result<()> {
        engine::shift_in_place(ShiftOperation::RightShift, &mut self.data, amount)
    }

    // ========================================================================
    // Conversion, nulls and selection
    // ========================================================================

    /// New column of `kind` with every value converted.
    ///
    /// Only numeric kinds convert; asking for the column's own kind returns a
    /// shallow copy.
    pub fn clone_as(&self, kind: ElementType) -> Result<Column> {
        let from = self.element_type();
        if from == kind {
            return Ok(self.clone());
        }
        let data = match_kinds!(
            &self.data,
            [Byte, SByte, Int16, UInt16, Int32, UInt32, Int64, UInt64, Float32, Float64, Decimal128],
            c => convert_container(c, kind)?,
            _ => return Err(FrameError::not_supported("clone_as", from, kind))
        );
        Ok(self.derived(data))
    }

    pub fn elementwise_is_null(&self) -> Column {
        let chunk_size = self.chunk_size();
        let flags = with_container!(&self.data, c => TypedContainer::from_values(chunk_size, c.iter().map(|v| v.is_none())));
        self.derived(ColumnData::Bool(flags))
    }

    pub fn elementwise_is_not_null(&self) -> Column {
        let chunk_size = self.chunk_size();
        let flags = with_container!(&self.data, c => TypedContainer::from_values(chunk_size, c.iter().map(|v| v.is_some())));
        self.derived(ColumnData::Bool(flags))
    }

    pub fn fill_nulls(&self, value: impl Into<ColumnValue>) -> Result<Column> {
        let mut out = self.clone();
        out.fill_nulls_in_place(value)?;
        Ok(out)
    }

    /// Replace every null with `value`; a null fill value changes nothing.
    pub fn fill_nulls_in_place(&mut self, value: impl Into<ColumnValue>) -> Result<()> {
        let value = value.into();
        if self.null_count() == 0 {
            return Ok(());
        }
        with_container!(&mut self.data, c => {
            if let Some(fill) = typed(&value)? {
                fill_container(c, fill);
            }
        });
        Ok(())
    }

    /// Rows where `mask` is `true`; null mask entries drop the row.
    pub fn filter(&self, mask: &Column) -> Result<Column> {
        let keep = mask_flags(mask, self.len())?;
        Ok(self.derived(self.data.filter(&keep)))
    }

    pub fn head(&self, n: usize) -> Column {
        self.derived(self.data.slice(0, n.min(self.len())))
    }

    pub fn tail(&self, n: usize) -> Column {
        let n = n.min(self.len());
        self.derived(self.data.slice(self.len() - n, n))
    }

    pub fn slice(&self, start: usize, len: usize) -> Result<Column> {
        let end = start.saturating_add(len);
        if end > self.len() {
            return Err(FrameError::IndexOutOfRange {
                index: end,
                len: self.len(),
            });
        }
        Ok(self.derived(self.data.slice(start, len)))
    }

    // ========================================================================
    // Aggregates
    // ========================================================================

    /// Sum of non-null values: `float64`, or `decimal128` for decimal columns.
    pub fn sum(&self) -> Result<Option<ColumnValue>> {
        let kind = self.element_type();
        let total = match &self.data {
            ColumnData::Decimal128(c) => sum_decimal(c)?.map(|(s, _)| ColumnValue::Decimal(s)),
            data => match_kinds!(
                data,
                [Byte, SByte, Int16, UInt16, Int32, UInt32, Int64, UInt64, Float32, Float64],
                c => sum_as_f64(c).map(|(s, _)| ColumnValue::Float64(s)),
                _ => return Err(FrameError::not_supported("sum", kind, kind))
            ),
        };
        Ok(total)
    }

    pub fn mean(&self) -> Result<Option<ColumnValue>> {
        let kind = self.element_type();
        let mean = match &self.data {
            ColumnData::Decimal128(c) => match sum_decimal(c)? {
                Some((s, n)) => Some(ColumnValue::Decimal(
                    s.checked_div(Decimal::from(n))
                        .ok_or(ArithmeticFault::Overflow(ElementType::Decimal128))?,
                )),
                None => None,
            },
            data => match_kinds!(
                data,
                [Byte, SByte, Int16, UInt16, Int32, UInt32, Int64, UInt64, Float32, Float64],
                c => sum_as_f64(c).map(|(s, n)| ColumnValue::Float64(s / n as f64)),
                _ => return Err(FrameError::not_supported("mean", kind, kind))
            ),
        };
        Ok(mean)
    }

    pub fn min(&self) -> Result<Option<ColumnValue>> {
        self.extreme("min", Ordering::Less)
    }

    pub fn max(&self) -> Result<Option<ColumnValue>> {
        self.extreme("max", Ordering::Greater)
    }

    fn extreme(&self, operation: &str, want: Ordering) -> Result<Option<ColumnValue>> {
        let kind = self.element_type();
        if kind == ElementType::Bool {
            return Err(FrameError::not_supported(operation, kind, kind));
        }
        Ok(with_container!(&self.data, c => extreme(c, want).map(Element::into_value)))
    }
}

/// Keep-flags from a bool mask column of length `len`.
pub(crate) fn mask_flags(mask: &Column, len: usize) -> Result<Vec<bool>> {
    if mask.len() != len {
        return Err(ArgumentError::MismatchedColumnLengths {
            expected: len,
            actual: mask.len(),
        }
        .into());
    }
    match mask.typed::<bool>() {
        Some(flags) => Ok(flags.iter().map(|v| v == Some(&true)).collect()),
        None => Err(TypeMismatch::MismatchedValueType {
            expected: ElementType::Bool,
            actual: mask.element_type(),
        }
        .into()),
    }
}
