use crate::expr::Operand;
use crate::operators::{Operator, OperatorClass};
use crate::promotion::{promote, resolve, sign_guards};
use crate::types::{IntegerType, ResultType, TypeLattice};
use crate::MatrixError;
use pretty_assertions::assert_eq;

use IntegerType::*;

#[test]
fn test_promotion_never_narrows() {
    for &left in TypeLattice::types() {
        for &right in TypeLattice::types() {
            if !TypeLattice::in_closure(left, right) {
                continue;
            }
            for op in Operator::ARITHMETIC.iter().chain(Operator::BITWISE.iter()) {
                let result = resolve(*op, Some(left), right).unwrap();
                let ty = result.as_integer().unwrap();
                assert!(
                    ty.bit_width() >= left.bit_width().max(right.bit_width()),
                    "{} {} {} -> {}",
                    left,
                    op,
                    right,
                    ty
                );
                assert!(ty == left || ty == right);
            }
        }
    }
}

#[test]
fn test_unsigned_wins_equal_width() {
    assert_eq!(promote(Int1, Uint1), Uint1);
    assert_eq!(promote(Uint1, Int1), Uint1);
    assert_eq!(promote(Int2, Uint2), Uint2);
    assert_eq!(promote(Uint8, Int8), Uint8);
}

#[test]
fn test_wider_wins_over_unsigned() {
    assert_eq!(promote(Uint1, Int2), Int2);
    assert_eq!(promote(Uint4, Int8), Int8);
    assert_eq!(promote(Int4, Uint2), Int4);
    assert_eq!(promote(Uint2, Uint4), Uint4);
}

#[test]
fn test_comparisons_are_boolean() {
    for op in Operator::COMPARISON {
        assert_eq!(op.class(), OperatorClass::Comparison);
        assert_eq!(resolve(op, Some(Uint8), Int1), Ok(ResultType::Boolean));
        assert_eq!(resolve(op, Some(Int2), Uint1), Ok(ResultType::Boolean));
    }
}

#[test]
fn test_shift_result_is_left_operand() {
    assert_eq!(
        resolve(Operator::Shl, Some(Uint1), Int4),
        Ok(ResultType::Integer(Uint1))
    );
    assert_eq!(
        resolve(Operator::Shr, Some(Uint8), Int4),
        Ok(ResultType::Integer(Uint8))
    );
}

#[test]
fn test_shift_amount_must_be_int4() {
    assert_eq!(
        resolve(Operator::Shl, Some(Uint1), Uint2),
        Err(MatrixError::InvalidShiftAmount(Uint2))
    );
}

#[test]
fn test_complement_keeps_type() {
    for &ty in TypeLattice::custom() {
        assert_eq!(
            resolve(Operator::BitNot, None, ty),
            Ok(ResultType::Integer(ty))
        );
    }
}

#[test]
fn test_arity_mismatch() {
    assert_eq!(
        resolve(Operator::BitNot, Some(Uint1), Uint1),
        Err(MatrixError::ArityMismatch {
            operator: Operator::BitNot,
            expected: 1
        })
    );
    assert_eq!(
        resolve(Operator::Add, None, Uint1),
        Err(MatrixError::ArityMismatch {
            operator: Operator::Add,
            expected: 2
        })
    );
}

#[test]
fn test_unary_operator_with_two_operands_is_an_error() {
    for op in Operator::UNARY {
        for (left, right) in [(Uint4, Uint4), (Int2, Int4), (Uint8, Int4)] {
            assert_eq!(
                resolve(op, Some(left), right),
                Err(MatrixError::ArityMismatch {
                    operator: op,
                    expected: 1
                })
            );
        }
    }
}

#[test]
fn test_native_pair_is_lookup_error() {
    assert_eq!(
        resolve(Operator::Add, Some(Int2), Int4),
        Err(MatrixError::OutsideClosure {
            left: Int2,
            right: Int4
        })
    );
    assert_eq!(
        resolve(Operator::Lt, Some(Int8), Int8),
        Err(MatrixError::OutsideClosure {
            left: Int8,
            right: Int8
        })
    );
}

#[test]
fn test_sign_guards_only_for_signed_into_unsigned() {
    let result = ResultType::Integer(Uint1);
    assert_eq!(
        sign_guards(Operator::Add, result, Some(Int1), Uint1),
        vec![Operand::Arg1]
    );
    assert_eq!(
        sign_guards(Operator::Mul, ResultType::Integer(Uint8), Some(Uint8), Int8),
        vec![Operand::Arg2]
    );
    assert!(sign_guards(Operator::Add, ResultType::Integer(Int2), Some(Uint1), Int2).is_empty());
    assert!(sign_guards(Operator::Lt, ResultType::Boolean, Some(Int1), Uint1).is_empty());
    assert!(sign_guards(Operator::Add, result, Some(Uint1), Uint1).is_empty());
}
