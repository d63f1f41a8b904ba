use proptest::prelude::*;
use typedframe::*;

const ARITHMETIC: [BinaryOperation; 5] = [
    BinaryOperation::Add,
    BinaryOperation::Subtract,
    BinaryOperation::Multiply,
    BinaryOperation::Divide,
    BinaryOperation::Modulo,
];

const COMPARISONS: [ComparisonOperation; 6] = [
    ComparisonOperation::Equals,
    ComparisonOperation::NotEquals,
    ComparisonOperation::GreaterThan,
    ComparisonOperation::GreaterThanOrEqual,
    ComparisonOperation::LessThan,
    ComparisonOperation::LessThanOrEqual,
];

fn kind() -> impl Strategy<Value = ElementType> {
    prop::sample::select(ElementType::ALL.to_vec())
}

/// Two equal-length nullable i32 vectors.
fn paired_values() -> impl Strategy<Value = (Vec<Option<i32>>, Vec<Option<i32>>)> {
    (0usize..40).prop_flat_map(|len| {
        (
            prop::collection::vec(prop::option::of(any::<i32>()), len),
            prop::collection::vec(prop::option::of(any::<i32>()), len),
        )
    })
}

fn null_positions(column: &Column) -> Vec<bool> {
    column.iter().map(|v| v.is_null()).collect()
}

proptest! {
    #[test]
    fn prop_null_in_either_operand_gives_null(
        (left, right) in paired_values(),
        left_chunk in 1usize..8,
        right_chunk in 1usize..8,
    ) {
        let a = Column::with_chunk_size("a", left_chunk, left.clone());
        let b = Column::with_chunk_size("b", right_chunk, right.clone());
        let expected: Vec<bool> = left
            .iter()
            .zip(&right)
            .map(|(l, r)| l.is_none() || r.is_none())
            .collect();

        for op in [BinaryOperation::Add, BinaryOperation::Multiply, BinaryOperation::Xor] {
            prop_assert_eq!(null_positions(&a.binary(op, &b).unwrap()), expected.clone());
        }
        let widened = a.add(&b.clone_as(ElementType::Float64).unwrap()).unwrap();
        prop_assert_eq!(null_positions(&widened), expected.clone());
        for op in COMPARISONS {
            prop_assert_eq!(null_positions(&a.compare(op, &b).unwrap()), expected.clone());
        }
    }

    #[test]
    fn prop_result_kind_ignores_operand_order(left in kind(), right in kind()) {
        for op in ARITHMETIC {
            let forward = binary_result_type(op, left, right).ok();
            let backward = binary_result_type(op, right, left).ok();
            prop_assert_eq!(forward, backward);
        }
        for op in COMPARISONS {
            prop_assert_eq!(
                comparison_type(op, left, right).ok(),
                comparison_type(op, right, left).ok()
            );
        }
    }

    #[test]
    fn prop_mixed_numeric_kinds_follow_the_promotion_table(left in kind(), right in kind()) {
        let result = binary_result_type(BinaryOperation::Add, left, right).ok();
        let expected = if !left.is_numeric() || !right.is_numeric() {
            if left == ElementType::String && right == ElementType::String {
                Some(ElementType::String)
            } else {
                None
            }
        } else if left == right {
            Some(left)
        } else if left == ElementType::Decimal128 || right == ElementType::Decimal128 {
            Some(ElementType::Decimal128)
        } else {
            Some(ElementType::Float64)
        };
        prop_assert_eq!(result, expected);
    }

    #[test]
    fn prop_mutating_a_clone_leaves_the_original(
        values in prop::collection::vec(prop::option::of(-1000i64..1000), 1..50),
        chunk in 1usize..10,
        index in any::<prop::sample::Index>(),
    ) {
        let original = Column::with_chunk_size("x", chunk, values.clone());
        let before: Vec<ColumnValue> = original.iter().collect();
        let nulls = original.null_count();

        let mut copy = original.clone();
        copy.add_scalar_in_place(1i64).unwrap();
        copy.set(index.index(values.len()), ColumnValue::Null).unwrap();
        copy.fill_nulls_in_place(0i64).unwrap();

        prop_assert_eq!(original.iter().collect::<Vec<_>>(), before);
        prop_assert_eq!(original.null_count(), nulls);
        prop_assert_eq!(copy.null_count(), 0);
    }

    #[test]
    fn prop_reverse_subtract_negates_forward(
        values in prop::collection::vec(prop::option::of(-1_000_000i64..1_000_000), 0..30),
        scalar in -1_000_000i64..1_000_000,
    ) {
        let column = Column::new("x", values);
        let forward = column.subtract_scalar(scalar).unwrap();
        let reverse = column.reverse_subtract(scalar).unwrap();
        let negated = forward.reverse_subtract(0i64).unwrap();
        prop_assert_eq!(reverse.iter().collect::<Vec<_>>(), negated.iter().collect::<Vec<_>>());
    }

    #[test]
    fn prop_failed_in_place_widening_changes_nothing(
        values in prop::collection::vec(prop::option::of(any::<i16>()), 0..30),
        scalar in any::<f64>(),
    ) {
        let mut column = Column::new("x", values);
        let before: Vec<ColumnValue> = column.iter().collect();
        let result = column.add_scalar_in_place(scalar);
        let is_mismatch = matches!(
            result,
            Err(FrameError::TypeMismatch(TypeMismatch::MismatchedColumnValueType { .. }))
        );
        prop_assert!(is_mismatch);
        prop_assert_eq!(column.iter().collect::<Vec<_>>(), before);
    }
}
