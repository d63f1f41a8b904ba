//! Arithmetic/Comparison Engine
//!
//! The engine decides the result kind of an elementwise operation (the
//! promotion policy below), brings the left operand into that kind and then
//! runs a chunk-by-chunk loop specialised for the concrete element types.
//!
//! # Promotion policy
//!
//! For arithmetic (`add`, `subtract`, `multiply`, `divide`, `modulo`):
//! 1. `bool` on either side is not supported.
//! 2. Identical kinds keep their kind and run on the native representation.
//! 3. Otherwise, if either side is `decimal128` the result is `decimal128`.
//! 4. Otherwise (two different non-decimal numeric kinds) the result is
//!    `float64`, even for `int64`/`uint64`, which can lose precision.
//!
//! Bitwise `and`/`or`/`xor` require identical `bool` or integer kinds. Shifts
//! apply to integer kinds only. `string + string` concatenates.
//!
//! Comparisons evaluate identical kinds natively, mixed numeric kinds in
//! `decimal128` when either side is decimal and in `float64` otherwise, and
//! always produce a `bool` payload. Ordering comparisons on `bool` are not
//! supported.
//!
//! A null on either side yields a null result, for every operator.

use crate::buffer::Buffer;
use crate::column::ColumnData;
use crate::container::TypedContainer;
use crate::convert::{convert, convert_container, convert_value, NumericConvert};
use crate::error::{ArithmeticFault, FrameError, Result, TypeMismatch};
use crate::value::{ColumnValue, Element, ElementType};
use log::debug;
use rust_decimal::Decimal;
use std::borrow::Cow;
use std::fmt;

type FaultResult<T> = std::result::Result<T, ArithmeticFault>;

/// Elementwise binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperation {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    And,
    Or,
    Xor,
}

impl BinaryOperation {
    pub fn name(&self) -> &'static str {
        match self {
            BinaryOperation::Add => "add",
            BinaryOperation::Subtract => "subtract",
            BinaryOperation::Multiply => "multiply",
            BinaryOperation::Divide => "divide",
            BinaryOperation::Modulo => "modulo",
            BinaryOperation::And => "and",
            BinaryOperation::Or => "or",
            BinaryOperation::Xor => "xor",
        }
    }

    pub fn is_arithmetic(&self) -> bool {
        !self.is_bitwise()
    }

    pub fn is_bitwise(&self) -> bool {
        matches!(
            self,
            BinaryOperation::And | BinaryOperation::Or | BinaryOperation::Xor
        )
    }
}

impl fmt::Display for BinaryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShiftOperation {
    LeftShift,
    RightShift,
}

impl ShiftOperation {
    pub fn name(&self) -> &'static str {
        match self {
            ShiftOperation::LeftShift => "left_shift",
            ShiftOperation::RightShift => "right_shift",
        }
    }
}

/// Elementwise comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOperation {
    Equals,
    NotEquals,
    GreaterThanOrEqual,
    LessThanOrEqual,
    GreaterThan,
    LessThan,
}

impl ComparisonOperation {
    pub fn name(&self) -> &'static str {
        match self {
            ComparisonOperation::Equals => "elementwise_equals",
            ComparisonOperation::NotEquals => "elementwise_not_equals",
            ComparisonOperation::GreaterThanOrEqual => "elementwise_greater_than_or_equal",
            ComparisonOperation::LessThanOrEqual => "elementwise_less_than_or_equal",
            ComparisonOperation::GreaterThan => "elementwise_greater_than",
            ComparisonOperation::LessThan => "elementwise_less_than",
        }
    }

    pub fn is_equality(&self) -> bool {
        matches!(
            self,
            ComparisonOperation::Equals | ComparisonOperation::NotEquals
        )
    }
}

impl fmt::Display for ComparisonOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Promotion policy
// ============================================================================

/// Result kind of `left op right`, or `NotSupported`.
pub fn binary_result_type(
    op: BinaryOperation,
    left: ElementType,
    right: ElementType,
) -> Result<ElementType> {
    use ElementType::*;

    let unsupported = || FrameError::not_supported(op.name(), left, right);
    let result = if op.is_bitwise() {
        if left == right && (left == Bool || left.is_integer()) {
            left
        } else {
            return Err(unsupported());
        }
    } else if op == BinaryOperation::Add && left == String && right == String {
        String
    } else if !left.is_numeric() || !right.is_numeric() {
        return Err(unsupported());
    } else if left == right {
        left
    } else if left == Decimal128 || right == Decimal128 {
        Decimal128
    } else {
        Float64
    };
    debug!("{}: {} x {} -> {}", op, left, right, result);
    Ok(result)
}

/// Kind in which `left op right` is compared, or `NotSupported`.
pub fn comparison_type(
    op: ComparisonOperation,
    left: ElementType,
    right: ElementType,
) -> Result<ElementType> {
    use ElementType::*;

    let kind = if left == right {
        if left == Bool && !op.is_equality() {
            return Err(FrameError::not_supported(op.name(), left, right));
        }
        left
    } else if left.is_numeric() && right.is_numeric() {
        if left == Decimal128 || right == Decimal128 {
            Decimal128
        } else {
            Float64
        }
    } else {
        return Err(FrameError::not_supported(op.name(), left, right));
    };
    debug!("{}: {} x {} compared as {}", op, left, right, kind);
    Ok(kind)
}

/// True when `op` can raise an arithmetic fault on `kind` data.
fn may_fault(op: BinaryOperation, kind: ElementType) -> bool {
    match kind {
        ElementType::Decimal128 => op.is_arithmetic(),
        k if k.is_integer() => matches!(op, BinaryOperation::Divide | BinaryOperation::Modulo),
        _ => false,
    }
}

// ============================================================================
// Kernels
// ============================================================================

/// Arithmetic on one numeric kind.
///
/// Integers wrap on overflow and fault on division by zero, floats follow
/// IEEE 754, decimals fault on overflow and division by zero.
pub trait ArithmeticElement: Element + Copy {
    fn add(self, rhs: Self) -> FaultResult<Self>;
    fn subtract(self, rhs: Self) -> FaultResult<Self>;
    fn multiply(self, rhs: Self) -> FaultResult<Self>;
    fn divide(self, rhs: Self) -> FaultResult<Self>;
    fn modulo(self, rhs: Self) -> FaultResult<Self>;
}

macro_rules! impl_integer_arithmetic {
    ($($ty:ty),+) => {
        $(
            impl ArithmeticElement for $ty {
                #[inline]
                fn add(self, rhs: Self) -> FaultResult<Self> {
                    Ok(self.wrapping_add(rhs))
                }

                #[inline]
                fn subtract(self, rhs: Self) -> FaultResult<Self> {
                    Ok(self.wrapping_sub(rhs))
                }

                #[inline]
                fn multiply(self, rhs: Self) -> FaultResult<Self> {
                    Ok(self.wrapping_mul(rhs))
                }

                #[inline]
                fn divide(self, rhs: Self) -> FaultResult<Self> {
                    if rhs == 0 {
                        return Err(ArithmeticFault::DivideByZero(Self::ELEMENT_TYPE));
                    }
                    Ok(self.wrapping_div(rhs))
                }

                #[inline]
                fn modulo(self, rhs: Self) -> FaultResult<Self> {
                    if rhs == 0 {
                        return Err(ArithmeticFault::DivideByZero(Self::ELEMENT_TYPE));
                    }
                    Ok(self.wrapping_rem(rhs))
                }
            }
        )+
    };
}

impl_integer_arithmetic!(u8, i8, i16, u16, i32, u32, i64, u64);

macro_rules! impl_float_arithmetic {
    ($($ty:ty),+) => {
        $(
            impl ArithmeticElement for $ty {
                #[inline]
                fn add(self, rhs: Self) -> FaultResult<Self> {
                    Ok(self + rhs)
                }

                #[inline]
                fn subtract(self, rhs: Self) -> FaultResult<Self> {
                    Ok(self - rhs)
                }

                #[inline]
                fn multiply(self, rhs: Self) -> FaultResult<Self> {
                    Ok(self * rhs)
                }

                #[inline]
                fn divide(self, rhs: Self) -> FaultResult<Self> {
                    Ok(self / rhs)
                }

                #[inline]
                fn modulo(self, rhs: Self) -> FaultResult<Self> {
                    Ok(self % rhs)
                }
            }
        )+
    };
}

impl_float_arithmetic!(f32, f64);

impl ArithmeticElement for Decimal {
    #[inline]
    fn add(self, rhs: Self) -> FaultResult<Self> {
        self.checked_add(rhs)
            .ok_or(ArithmeticFault::Overflow(ElementType::Decimal128))
    }

    #[inline]
    fn subtract(self, rhs: Self) -> FaultResult<Self> {
        self.checked_sub(rhs)
            .ok_or(ArithmeticFault::Overflow(ElementType::Decimal128))
    }

    #[inline]
    fn multiply(self, rhs: Self) -> FaultResult<Self> {
        self.checked_mul(rhs)
            .ok_or(ArithmeticFault::Overflow(ElementType::Decimal128))
    }

    #[inline]
    fn divide(self, rhs: Self) -> FaultResult<Self> {
        if rhs.is_zero() {
            return Err(ArithmeticFault::DivideByZero(ElementType::Decimal128));
        }
        self.checked_div(rhs)
            .ok_or(ArithmeticFault::Overflow(ElementType::Decimal128))
    }

    #[inline]
    fn modulo(self, rhs: Self) -> FaultResult<Self> {
        if rhs.is_zero() {
            return Err(ArithmeticFault::DivideByZero(ElementType::Decimal128));
        }
        self.checked_rem(rhs)
            .ok_or(ArithmeticFault::Overflow(ElementType::Decimal128))
    }
}

/// Bitwise logic on `bool` and the integer kinds.
pub trait BitwiseElement: Element + Copy {
    fn and(self, rhs: Self) -> Self;
    fn or(self, rhs: Self) -> Self;
    fn xor(self, rhs: Self) -> Self;
}

macro_rules! impl_bitwise {
    ($($ty:ty),+) => {
        $(
            impl BitwiseElement for $ty {
                #[inline]
                fn and(self, rhs: Self) -> Self {
                    self & rhs
                }

                #[inline]
                fn or(self, rhs: Self) -> Self {
                    self | rhs
                }

                #[inline]
                fn xor(self, rhs: Self) -> Self {
                    self ^ rhs
                }
            }
        )+
    };
}

impl_bitwise!(bool, u8, i8, i16, u16, i32, u32, i64, u64);

/// Shifts on the integer kinds.
///
/// Kinds narrower than 32 bits shift in 32-bit arithmetic and truncate back,
/// so the count is taken modulo 32 for them and modulo the bit width for the
/// wider kinds.
pub trait ShiftElement: Element + Copy {
    fn shift_left(self, amount: i32) -> Self;
    fn shift_right(self, amount: i32) -> Self;
}

macro_rules! impl_narrow_shift {
    ($($ty:ty),+) => {
        $(
            impl ShiftElement for $ty {
                #[inline]
                fn shift_left(self, amount: i32) -> Self {
                    ((self as i32) << (amount & 31)) as $ty
                }

                #[inline]
                fn shift_right(self, amount: i32) -> Self {
                    ((self as i32) >> (amount & 31)) as $ty
                }
            }
        )+
    };
}

macro_rules! impl_wide_shift {
    ($($ty:ty),+) => {
        $(
            impl ShiftElement for $ty {
                #[inline]
                fn shift_left(self, amount: i32) -> Self {
                    self.wrapping_shl(amount as u32)
                }

                #[inline]
                fn shift_right(self, amount: i32) -> Self {
                    self.wrapping_shr(amount as u32)
                }
            }
        )+
    };
}

impl_narrow_shift!(u8, i8, i16, u16);
impl_wide_shift!(i32, u32, i64, u64);

// ============================================================================
// Chunk loops
// ============================================================================

fn aligned<U: Element>(other: &TypedContainer<U>, chunk_size: usize) -> Cow<'_, TypedContainer<U>> {
    if other.chunk_size() == chunk_size {
        Cow::Borrowed(other)
    } else {
        Cow::Owned(other.rechunk(chunk_size))
    }
}

/// `target[i] = f(target[i], other[i])` for every position where both are valid.
///
/// Chunks of `target` are made exclusive before writing; positions where
/// `other` is null become null.
pub(crate) fn apply_binary<T, U, F>(
    target: &mut TypedContainer<T>,
    other: &TypedContainer<U>,
    mut f: F,
) -> Result<()>
where
    T: Element,
    U: Element,
    F: FnMut(&T, &U) -> FaultResult<T>,
{
    debug_assert_eq!(target.len(), other.len());
    let other = aligned(other, target.chunk_size());
    for chunk in 0..target.buffer_count() {
        let rhs = other.buffer(chunk);
        let mut lhs = target.get_or_create_mutable_buffer(chunk);
        let (values, validity) = lhs.parts_mut();

        if validity.null_count() == 0 && rhs.null_count() == 0 {
            for (l, r) in values.iter_mut().zip(rhs.values()) {
                *l = f(&*l, r)?;
            }
            continue;
        }

        for (i, (l, r)) in values.iter_mut().zip(rhs.values()).enumerate() {
            if !validity.get(i) {
                continue;
            }
            if rhs.is_valid(i) {
                *l = f(&*l, r)?;
            } else {
                *l = T::default();
            }
        }
        validity.and_inplace(rhs.validity());
    }
    Ok(())
}

/// `target[i] = f(target[i])` for every valid position; nulls stay null.
pub(crate) fn apply_unary<T, F>(target: &mut TypedContainer<T>, mut f: F) -> Result<()>
where
    T: Element,
    F: FnMut(&T) -> FaultResult<T>,
{
    for chunk in 0..target.buffer_count() {
        let mut buffer = target.get_or_create_mutable_buffer(chunk);
        let (values, validity) = buffer.parts_mut();
        if validity.null_count() == 0 {
            for v in values.iter_mut() {
                *v = f(&*v)?;
            }
        } else {
            for (i, v) in values.iter_mut().enumerate() {
                if validity.get(i) {
                    *v = f(&*v)?;
                }
            }
        }
    }
    Ok(())
}

/// Fresh bool container with `f(left[i], right[i])`, null where either is.
fn compare_containers<T, F>(
    left: &TypedContainer<T>,
    right: &TypedContainer<T>,
    mut f: F,
) -> TypedContainer<bool>
where
    T: Element,
    F: FnMut(&T, &T) -> bool,
{
    debug_assert_eq!(left.len(), right.len());
    let chunk_size = left.chunk_size();
    let right = aligned(right, chunk_size);
    let mut buffers = Vec::with_capacity(left.buffer_count());
    for (l, r) in left.buffers().zip(right.buffers()) {
        let mut validity = l.validity().clone();
        validity.and_inplace(r.validity());
        let mut values = Vec::with_capacity(l.len());
        for (a, b) in l.values().iter().zip(r.values()) {
            values.push(f(a, b));
        }
        buffers.push(Buffer::from_parts(values, validity, chunk_size));
    }
    TypedContainer::from_buffers(chunk_size, buffers)
}

/// Fresh bool container with `f(left[i])`, null where `left` is.
fn compare_each<T, F>(left: &TypedContainer<T>, mut f: F) -> TypedContainer<bool>
where
    T: Element,
    F: FnMut(&T) -> bool,
{
    let chunk_size = left.chunk_size();
    let mut buffers = Vec::with_capacity(left.buffer_count());
    for l in left.buffers() {
        let values: Vec<bool> = l.values().iter().map(&mut f).collect();
        buffers.push(Buffer::from_parts(values, l.validity().clone(), chunk_size));
    }
    TypedContainer::from_buffers(chunk_size, buffers)
}

// ============================================================================
// Typed operations
// ============================================================================

fn widen_one<U, T>(value: &U) -> FaultResult<T>
where
    U: Copy + NumericConvert<T>,
    T: Element,
{
    convert::<U, T>(*value).ok_or(ArithmeticFault::Unrepresentable(T::ELEMENT_TYPE))
}

fn arithmetic_with<T, U, F>(target: &mut TypedContainer<T>, right: &TypedContainer<U>, f: F) -> Result<()>
where
    T: ArithmeticElement,
    U: Element + Copy + NumericConvert<T>,
    F: Fn(T, T) -> FaultResult<T>,
{
    apply_binary(target, right, |a, b| f(*a, widen_one(b)?))
}

fn arithmetic_into<T, U>(
    op: BinaryOperation,
    target: &mut TypedContainer<T>,
    right: &TypedContainer<U>,
) -> Result<()>
where
    T: ArithmeticElement,
    U: Element + Copy + NumericConvert<T>,
{
    match op {
        BinaryOperation::Add => arithmetic_with(target, right, T::add),
        BinaryOperation::Subtract => arithmetic_with(target, right, T::subtract),
        BinaryOperation::Multiply => arithmetic_with(target, right, T::multiply),
        BinaryOperation::Divide => arithmetic_with(target, right, T::divide),
        BinaryOperation::Modulo => arithmetic_with(target, right, T::modulo),
        _ => Err(FrameError::not_supported(op.name(), T::ELEMENT_TYPE, U::ELEMENT_TYPE)),
    }
}

fn scalar_with<T, F>(target: &mut TypedContainer<T>, scalar: T, reverse: bool, f: F) -> Result<()>
where
    T: Element + Copy,
    F: Fn(T, T) -> FaultResult<T>,
{
    if reverse {
        apply_unary(target, |x| f(scalar, *x))
    } else {
        apply_unary(target, |x| f(*x, scalar))
    }
}

fn scalar_of<T: Element>(scalar: &ColumnValue) -> Result<T> {
    T::from_value(scalar).ok_or_else(|| {
        TypeMismatch::MismatchedValueType {
            expected: T::ELEMENT_TYPE,
            actual: scalar.element_type().unwrap_or(T::ELEMENT_TYPE),
        }
        .into()
    })
}

fn arithmetic_scalar<T: ArithmeticElement>(
    op: BinaryOperation,
    target: &mut TypedContainer<T>,
    scalar: &ColumnValue,
    reverse: bool,
) -> Result<()> {
    let s = scalar_of::<T>(scalar)?;
    match op {
        BinaryOperation::Add => scalar_with(target, s, reverse, T::add),
        BinaryOperation::Subtract => scalar_with(target, s, reverse, T::subtract),
        BinaryOperation::Multiply => scalar_with(target, s, reverse, T::multiply),
        BinaryOperation::Divide => scalar_with(target, s, reverse, T::divide),
        BinaryOperation::Modulo => scalar_with(target, s, reverse, T::modulo),
        _ => Err(FrameError::not_supported(op.name(), T::ELEMENT_TYPE, T::ELEMENT_TYPE)),
    }
}

fn bitwise_into<T: BitwiseElement>(
    op: BinaryOperation,
    target: &mut TypedContainer<T>,
    right: &TypedContainer<T>,
) -> Result<()> {
    match op {
        BinaryOperation::And => apply_binary(target, right, |a, b| Ok(T::and(*a, *b))),
        BinaryOperation::Or => apply_binary(target, right, |a, b| Ok(T::or(*a, *b))),
        BinaryOperation::Xor => apply_binary(target, right, |a, b| Ok(T::xor(*a, *b))),
        _ => Err(FrameError::not_supported(op.name(), T::ELEMENT_TYPE, T::ELEMENT_TYPE)),
    }
}

fn bitwise_scalar<T: BitwiseElement>(
    op: BinaryOperation,
    target: &mut TypedContainer<T>,
    scalar: &ColumnValue,
) -> Result<()> {
    let s = scalar_of::<T>(scalar)?;
    match op {
        BinaryOperation::And => apply_unary(target, |x| Ok(T::and(*x, s))),
        BinaryOperation::Or => apply_unary(target, |x| Ok(T::or(*x, s))),
        BinaryOperation::Xor => apply_unary(target, |x| Ok(T::xor(*x, s))),
        _ => Err(FrameError::not_supported(op.name(), T::ELEMENT_TYPE, T::ELEMENT_TYPE)),
    }
}

fn shift_with<T: ShiftElement>(op: ShiftOperation, target: &mut TypedContainer<T>, amount: i32) -> Result<()> {
    match op {
        ShiftOperation::LeftShift => apply_unary(target, |x| Ok(x.shift_left(amount))),
        ShiftOperation::RightShift => apply_unary(target, |x| Ok(x.shift_right(amount))),
    }
}

fn concat(left: &str, right: &str) -> String {
    let mut out = String::with_capacity(left.len() + right.len());
    out.push_str(left);
    out.push_str(right);
    out
}

fn compare_with<T: Element + PartialOrd>(
    op: ComparisonOperation,
    left: &TypedContainer<T>,
    right: &TypedContainer<T>,
) -> TypedContainer<bool> {
    match op {
        ComparisonOperation::Equals => compare_containers(left, right, |a, b| a == b),
        ComparisonOperation::NotEquals => compare_containers(left, right, |a, b| a != b),
        ComparisonOperation::GreaterThanOrEqual => compare_containers(left, right, |a, b| a >= b),
        ComparisonOperation::LessThanOrEqual => compare_containers(left, right, |a, b| a <= b),
        ComparisonOperation::GreaterThan => compare_containers(left, right, |a, b| a > b),
        ComparisonOperation::LessThan => compare_containers(left, right, |a, b| a < b),
    }
}

fn compare_scalar_with<T: Element + PartialOrd>(
    op: ComparisonOperation,
    left: &TypedContainer<T>,
    scalar: &ColumnValue,
) -> Result<TypedContainer<bool>> {
    let s = scalar_of::<T>(scalar)?;
    let result = match op {
        ComparisonOperation::Equals => compare_each(left, |a| *a == s),
        ComparisonOperation::NotEquals => compare_each(left, |a| *a != s),
        ComparisonOperation::GreaterThanOrEqual => compare_each(left, |a| *a >= s),
        ComparisonOperation::LessThanOrEqual => compare_each(left, |a| *a <= s),
        ComparisonOperation::GreaterThan => compare_each(left, |a| *a > s),
        ComparisonOperation::LessThan => compare_each(left, |a| *a < s),
    };
    Ok(result)
}

// ============================================================================
// Payload-level entry points
// ============================================================================

/// `data` as a payload of `kind`: shared when already that kind, converted otherwise.
fn retarget(data: &ColumnData, kind: ElementType) -> Result<Cow<'_, ColumnData>> {
    let from = data.element_type();
    if from == kind {
        return Ok(Cow::Borrowed(data));
    }
    let converted = match_kinds!(
        data,
        [Byte, SByte, Int16, UInt16, Int32, UInt32, Int64, UInt64, Float32, Float64, Decimal128],
        c => convert_container(c, kind)?,
        _ => return Err(FrameError::not_supported("convert", from, kind))
    );
    Ok(Cow::Owned(converted))
}

/// Run `op` into `target`, whose kind must already be the promoted result kind.
fn apply_into(op: BinaryOperation, target: &mut ColumnData, right: &ColumnData) -> Result<()> {
    let tk = target.element_type();
    let rk = right.element_type();
    let unsupported = || FrameError::not_supported(op.name(), tk, rk);

    if op.is_bitwise() {
        return match_kind_pairs!(
            target, right,
            [Bool, Byte, SByte, Int16, UInt16, Int32, UInt32, Int64, UInt64],
            (t, r) => bitwise_into(op, t, r),
            _ => Err(unsupported())
        );
    }

    if tk == ElementType::String {
        return match (target, right) {
            (ColumnData::String(t), ColumnData::String(r)) if op == BinaryOperation::Add => {
                apply_binary(t, r, |a, b| Ok(concat(a, b)))
            }
            _ => Err(unsupported()),
        };
    }

    if tk != rk {
        // Mixed kinds only reach here with a float64 or decimal128 target; the
        // right side is widened element by element inside the loop.
        return match target {
            ColumnData::Float64(t) => match_kinds!(
                right,
                [Byte, SByte, Int16, UInt16, Int32, UInt32, Int64, UInt64, Float32, Float64],
                r => arithmetic_into(op, t, r),
                _ => Err(unsupported())
            ),
            ColumnData::Decimal128(t) => match_kinds!(
                right,
                [Byte, SByte, Int16, UInt16, Int32, UInt32, Int64, UInt64, Float32, Float64, Decimal128],
                r => arithmetic_into(op, t, r),
                _ => Err(unsupported())
            ),
            _ => Err(unsupported()),
        };
    }

    match_kind_pairs!(
        target, right,
        [Byte, SByte, Int16, UInt16, Int32, UInt32, Int64, UInt64, Float32, Float64, Decimal128],
        (t, r) => arithmetic_into(op, t, r),
        _ => Err(unsupported())
    )
}

/// Run a scalar `op` into `target`, whose kind must be the promoted result kind.
fn apply_scalar_into(
    op: BinaryOperation,
    target: &mut ColumnData,
    scalar: &ColumnValue,
    reverse: bool,
) -> Result<()> {
    let tk = target.element_type();
    let sk = scalar.element_type().unwrap_or(tk);
    let unsupported = || FrameError::not_supported(op.name(), tk, sk);

    if op.is_bitwise() {
        return match_kinds!(
            target,
            [Bool, Byte, SByte, Int16, UInt16, Int32, UInt32, Int64, UInt64],
            t => bitwise_scalar(op, t, scalar),
            _ => Err(unsupported())
        );
    }

    if let ColumnData::String(t) = target {
        let s = scalar_of::<String>(scalar)?;
        if op != BinaryOperation::Add {
            return Err(unsupported());
        }
        return if reverse {
            apply_unary(t, |x| Ok(concat(&s, x)))
        } else {
            apply_unary(t, |x| Ok(concat(x, &s)))
        };
    }

    let scalar = convert_value(scalar, tk)?;
    match_kinds!(
        target,
        [Byte, SByte, Int16, UInt16, Int32, UInt32, Int64, UInt64, Float32, Float64, Decimal128],
        t => arithmetic_scalar(op, t, &scalar, reverse),
        _ => Err(unsupported())
    )
}

/// Commit `run` on `target` so that a failure leaves it unmodified.
///
/// Operations that cannot fault write straight into the target's chunks.
/// Fallible ones run on a shallow clone which replaces the target only on
/// success.
fn commit<F>(op: BinaryOperation, target: &mut ColumnData, run: F) -> Result<()>
where
    F: FnOnce(&mut ColumnData) -> Result<()>,
{
    if may_fault(op, target.element_type()) {
        let mut work = target.clone();
        run(&mut work)?;
        *target = work;
        Ok(())
    } else {
        run(target)
    }
}

fn require_in_place(op: BinaryOperation, target: ElementType, result: ElementType) -> Result<()> {
    if target != result {
        return Err(TypeMismatch::MismatchedColumnValueType {
            operation: op.name().to_string(),
            target,
            result,
        }
        .into());
    }
    Ok(())
}

/// `left op right` into a new payload of the promoted kind.
///
/// When no widening is needed the left payload is cloned shallowly and its
/// chunks are copied only as they are written.
pub fn binary(op: BinaryOperation, left: &ColumnData, right: &ColumnData) -> Result<ColumnData> {
    let result = binary_result_type(op, left.element_type(), right.element_type())?;
    let mut target = retarget(left, result)?.into_owned();
    apply_into(op, &mut target, right)?;
    Ok(target)
}

/// `target op= right`; fails with `MismatchedColumnValueType` when the
/// promoted kind differs from the target's kind.
pub fn binary_in_place(op: BinaryOperation, target: &mut ColumnData, right: &ColumnData) -> Result<()> {
    let result = binary_result_type(op, target.element_type(), right.element_type())?;
    require_in_place(op, target.element_type(), result)?;
    commit(op, target, |t| apply_into(op, t, right))
}

fn scalar_result_type(
    op: BinaryOperation,
    kind: ElementType,
    scalar: &ColumnValue,
    reverse: bool,
) -> Result<ElementType> {
    let sk = scalar.element_type().unwrap_or(kind);
    if reverse {
        binary_result_type(op, sk, kind)
    } else {
        binary_result_type(op, kind, sk)
    }
}

/// `left op scalar`, or `scalar op left` when `reverse` is set.
///
/// A null scalar yields an all-null payload of the column's own kind.
pub fn binary_scalar(
    op: BinaryOperation,
    left: &ColumnData,
    scalar: &ColumnValue,
    reverse: bool,
) -> Result<ColumnData> {
    let result = scalar_result_type(op, left.element_type(), scalar, reverse)?;
    if scalar.is_null() {
        return Ok(ColumnData::nulls(result, left.chunk_size(), left.len()));
    }
    let mut target = retarget(left, result)?.into_owned();
    apply_scalar_into(op, &mut target, scalar, reverse)?;
    Ok(target)
}

pub fn binary_scalar_in_place(
    op: BinaryOperation,
    target: &mut ColumnData,
    scalar: &ColumnValue,
    reverse: bool,
) -> Result<()> {
    let result = scalar_result_type(op, target.element_type(), scalar, reverse)?;
    require_in_place(op, target.element_type(), result)?;
    if scalar.is_null() {
        *target = ColumnData::nulls(result, target.chunk_size(), target.len());
        return Ok(());
    }
    commit(op, target, |t| apply_scalar_into(op, t, scalar, reverse))
}

pub fn shift(op: ShiftOperation, data: &ColumnData, amount: i32) -> Result<ColumnData> {
    let mut out = data.clone();
    shift_in_place(op, &mut out, amount)?;
    Ok(out)
}

pub fn shift_in_place(op: ShiftOperation, data: &mut ColumnData, amount: i32) -> Result<()> {
    let kind = data.element_type();
    match_kinds!(
        data,
        [Byte, SByte, Int16, UInt16, Int32, UInt32, Int64, UInt64],
        c => shift_with(op, c, amount),
        _ => Err(FrameError::not_supported(op.name(), kind, ElementType::Int32))
    )
}

/// Elementwise comparison into a fresh `bool` payload.
pub fn compare(op: ComparisonOperation, left: &ColumnData, right: &ColumnData) -> Result<ColumnData> {
    let (lk, rk) = (left.element_type(), right.element_type());
    let kind = comparison_type(op, lk, rk)?;
    let left = retarget(left, kind)?;
    let right = retarget(right, kind)?;
    let result = match_kind_pairs!(
        left.as_ref(), right.as_ref(),
        [Bool, Byte, SByte, Int16, UInt16, Int32, UInt32, Int64, UInt64, Float32, Float64,
         Decimal128, Char16, DateTime, String],
        (l, r) => compare_with(op, l, r),
        _ => return Err(FrameError::not_supported(op.name(), lk, rk))
    );
    Ok(ColumnData::Bool(result))
}

/// Compare every element against one scalar; a null scalar gives all nulls.
pub fn compare_scalar(op: ComparisonOperation, left: &ColumnData, scalar: &ColumnValue) -> Result<ColumnData> {
    let lk = left.element_type();
    let sk = scalar.element_type().unwrap_or(lk);
    let kind = comparison_type(op, lk, sk)?;
    if scalar.is_null() {
        return Ok(ColumnData::Bool(TypedContainer::nulls(left.chunk_size(), left.len())));
    }
    let left = retarget(left, kind)?;
    let scalar = convert_value(scalar, kind)?;
    let result = with_container!(left.as_ref(), l => compare_scalar_with(op, l, &scalar)?);
    Ok(ColumnData::Bool(result))
}
