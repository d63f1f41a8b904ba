use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use typedframe::*;

fn values(column: &Column) -> Vec<ColumnValue> {
    column.iter().collect()
}

#[test]
fn test_same_kind_add_keeps_nulls() {
    let a = Column::new("a", vec![Some(1i32), None, Some(3)]);
    let b = Column::new("b", vec![Some(10i32), Some(20), Some(30)]);

    let sum = a.add(&b).unwrap();
    assert_eq!(sum.element_type(), ElementType::Int32);
    assert_eq!(
        values(&sum),
        vec![ColumnValue::Int32(11), ColumnValue::Null, ColumnValue::Int32(33)]
    );
}

#[test]
fn test_int32_plus_float32_widens_to_float64() {
    let a = Column::new("a", (1..=3).map(Some));
    let b = Column::new("b", vec![Some(1.5f32), Some(2.5), Some(3.5)]);

    let sum = a.add(&b).unwrap();
    assert_eq!(sum.element_type(), ElementType::Float64);
    assert_eq!(
        values(&sum),
        vec![
            ColumnValue::Float64(2.5),
            ColumnValue::Float64(4.5),
            ColumnValue::Float64(6.5)
        ]
    );

    // operand order does not change the result kind
    assert_eq!(b.add(&a).unwrap().element_type(), ElementType::Float64);
}

#[test]
fn test_decimal_plus_int32_is_decimal() {
    let d = Column::new("d", vec![Some(Decimal::new(11, 1))]);
    let i = Column::new("i", vec![Some(2i32)]);

    let sum = d.add(&i).unwrap();
    assert_eq!(sum.element_type(), ElementType::Decimal128);
    assert_eq!(values(&sum), vec![ColumnValue::Decimal(Decimal::new(31, 1))]);
    assert_eq!(i.add(&d).unwrap().element_type(), ElementType::Decimal128);
}

#[test]
fn test_greater_than_scalar_propagates_null() {
    let column = Column::new("x", vec![Some(5i32), None]);
    let result = column.elementwise_greater_than_scalar(3i32).unwrap();
    assert_eq!(result.element_type(), ElementType::Bool);
    assert_eq!(values(&result), vec![ColumnValue::Bool(true), ColumnValue::Null]);
}

#[test]
fn test_csv_sniffing_with_two_guess_rows() {
    let options = CsvOptions {
        guess_rows: 2,
        ..CsvOptions::default()
    };
    let table = load_csv_from_str("a,b\n1,x\n,y\n", &options).unwrap();

    let a = table.column("a").unwrap();
    assert_eq!(a.element_type(), ElementType::Float64);
    assert_eq!(a.null_count(), 1);
    assert_eq!(a.get(0).unwrap(), ColumnValue::Float64(1.0));

    let b = table.column("b").unwrap();
    assert_eq!(b.element_type(), ElementType::String);
    assert_eq!(values(b), vec![ColumnValue::from("x"), ColumnValue::from("y")]);
}

#[test]
fn test_reverse_subtract() {
    let column = Column::new("x", (1..=3).map(Some));
    let result = column.reverse_subtract(5i32).unwrap();
    assert_eq!(
        values(&result),
        vec![ColumnValue::Int32(4), ColumnValue::Int32(3), ColumnValue::Int32(2)]
    );

    let forward = column.subtract_scalar(5i32).unwrap();
    assert_eq!(forward.get(0).unwrap(), ColumnValue::Int32(-4));
}

#[test]
fn test_int64_with_uint64_loses_precision_through_float64() {
    // 2^53 + 1 has no exact float64 representation.
    let big = Column::new("big", vec![Some(9_007_199_254_740_993i64)]);
    let zero = Column::new("zero", vec![Some(0u64)]);

    let sum = big.add(&zero).unwrap();
    assert_eq!(sum.element_type(), ElementType::Float64);
    assert_eq!(sum.get(0).unwrap(), ColumnValue::Float64(9_007_199_254_740_992.0));
}

#[test]
fn test_in_place_widening_is_rejected_and_target_unchanged() {
    let mut target = Column::new("t", vec![Some(1i32), Some(2)]);
    let other = Column::new("o", vec![Some(0.5f64), Some(1.5)]);

    let err = target.add_in_place(&other).unwrap_err();
    assert!(matches!(
        err,
        FrameError::TypeMismatch(TypeMismatch::MismatchedColumnValueType { .. })
    ));
    assert_eq!(values(&target), vec![ColumnValue::Int32(1), ColumnValue::Int32(2)]);

    // a float64 target already has the result kind
    let mut wide = Column::new("w", vec![Some(1.0f64), Some(2.0)]);
    wide.add_in_place(&Column::new("i", vec![Some(1i32), None])).unwrap();
    assert_eq!(values(&wide), vec![ColumnValue::Float64(2.0), ColumnValue::Null]);
}

#[test]
fn test_bool_arithmetic_not_supported() {
    let flags = Column::new("f", vec![Some(true), Some(false)]);
    let err = flags.add(&flags).unwrap_err();
    assert!(matches!(err, FrameError::NotSupported { .. }));

    let both = flags.and(&Column::new("g", vec![Some(true), None])).unwrap();
    assert_eq!(values(&both), vec![ColumnValue::Bool(true), ColumnValue::Null]);
}

#[test]
fn test_mismatched_lengths_rejected() {
    let a = Column::new("a", vec![Some(1i32)]);
    let b = Column::new("b", vec![Some(1i32), Some(2)]);
    assert!(matches!(
        a.add(&b),
        Err(FrameError::Argument(ArgumentError::MismatchedColumnLengths {
            expected: 1,
            actual: 2
        }))
    ));
}

#[test]
fn test_clone_then_mutate_leaves_original() {
    let original = Column::new("x", vec![Some(1i64), None, Some(3)]);
    let mut copy = original.clone();
    copy.multiply_scalar_in_place(10i64).unwrap();
    copy.set(1, 7i64).unwrap();

    assert_eq!(
        values(&original),
        vec![ColumnValue::Int64(1), ColumnValue::Null, ColumnValue::Int64(3)]
    );
    assert_eq!(original.null_count(), 1);
    assert_eq!(
        values(&copy),
        vec![ColumnValue::Int64(10), ColumnValue::Int64(7), ColumnValue::Int64(30)]
    );
    assert_eq!(copy.null_count(), 0);
}

#[test]
fn test_integer_divide_by_zero_is_an_error() {
    let mut column = Column::new("x", vec![Some(10i32), Some(20)]);
    let err = column.divide_scalar_in_place(0i32).unwrap_err();
    assert!(matches!(
        err,
        FrameError::Arithmetic(ArithmeticFault::DivideByZero(ElementType::Int32))
    ));
    assert_eq!(values(&column), vec![ColumnValue::Int32(10), ColumnValue::Int32(20)]);

    // float division follows IEEE
    let floats = Column::new("f", vec![Some(1.0f64)]);
    let result = floats.divide_scalar(0.0f64).unwrap();
    assert_eq!(result.get(0).unwrap(), ColumnValue::Float64(f64::INFINITY));
}
