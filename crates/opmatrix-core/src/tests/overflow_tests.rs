use crate::definition::OperatorDefinition;
use crate::operators::Operator;
use crate::overflow::synthesize;
use crate::types::{IntegerType, ResultType, TypeLattice};
use crate::MatrixError;
use pretty_assertions::assert_eq;

use IntegerType::*;

fn predicate_of(op: Operator, left: IntegerType, right: IntegerType) -> Option<String> {
    OperatorDefinition::derive(op, Some(left), right)
        .unwrap()
        .overflow_predicate
        .map(|expr| expr.to_string())
}

#[test]
fn test_unsigned_addition() {
    assert_eq!(
        predicate_of(Operator::Add, Uint1, Uint1).as_deref(),
        Some("result < arg1 || result < arg2")
    );
    assert_eq!(
        predicate_of(Operator::Add, Uint2, Int1).as_deref(),
        Some("result < arg1 || result < arg2")
    );
}

#[test]
fn test_signed_addition() {
    assert_eq!(
        predicate_of(Operator::Add, Int1, Int1).as_deref(),
        Some("SAMESIGN(arg1, arg2) && !SAMESIGN(result, arg1)")
    );
    assert_eq!(
        predicate_of(Operator::Add, Uint1, Int2).as_deref(),
        Some("SAMESIGN(arg1, arg2) && !SAMESIGN(result, arg1)")
    );
}

#[test]
fn test_subtraction() {
    assert_eq!(
        predicate_of(Operator::Sub, Uint4, Uint1).as_deref(),
        Some("result > arg1")
    );
    assert_eq!(
        predicate_of(Operator::Sub, Int8, Uint4).as_deref(),
        Some("!SAMESIGN(arg1, arg2) && !SAMESIGN(result, arg1)")
    );
}

#[test]
fn test_narrow_multiplication_uses_wider_intermediate() {
    let def = OperatorDefinition::derive(Operator::Mul, Some(Uint1), Uint1).unwrap();
    assert_eq!(def.intermediate_type, Some(Uint2));
    assert_eq!(
        def.overflow_predicate.unwrap().to_string(),
        "(uint1) result != result"
    );

    let def = OperatorDefinition::derive(Operator::Mul, Some(Int1), Uint2).unwrap();
    assert_eq!(def.result_type, ResultType::Integer(Uint2));
    assert_eq!(def.intermediate_type, Some(Uint4));

    let def = OperatorDefinition::derive(Operator::Mul, Some(Int4), Uint1).unwrap();
    assert_eq!(def.intermediate_type, Some(Int8));
    assert_eq!(
        def.overflow_predicate.unwrap().to_string(),
        "(int4) result != result"
    );
}

#[test]
fn test_signed_64_bit_multiplication() {
    let def = OperatorDefinition::derive(Operator::Mul, Some(Int8), Uint1).unwrap();
    assert_eq!(def.intermediate_type, None);
    assert_eq!(
        def.overflow_predicate.unwrap().to_string(),
        "(arg1 != (int4) arg1 || arg2 != (int4) arg2) && arg2 != 0 && \
         ((arg2 == -1 && arg1 < 0 && result < 0) || result / arg2 != arg1)"
    );
}

#[test]
fn test_unsigned_64_bit_multiplication() {
    let def = OperatorDefinition::derive(Operator::Mul, Some(Uint8), Uint8).unwrap();
    assert_eq!(def.intermediate_type, None);
    assert_eq!(
        def.overflow_predicate.unwrap().to_string(),
        "(arg1 != (uint4) arg1 || arg2 != (uint4) arg2) && arg2 != 0 && result / arg2 != arg1"
    );
}

#[test]
fn test_operators_without_predicate() {
    for op in [Operator::Div, Operator::Mod] {
        assert_eq!(predicate_of(op, Uint2, Int1), None);
    }
    for op in Operator::COMPARISON {
        assert_eq!(predicate_of(op, Uint8, Int8), None);
    }
    for op in Operator::BITWISE {
        assert_eq!(predicate_of(op, Uint4, Uint4), None);
    }
    assert_eq!(predicate_of(Operator::Shl, Uint4, Int4), None);
}

#[test]
fn test_every_arithmetic_pair_synthesizes() {
    for &left in TypeLattice::types() {
        for &right in TypeLattice::types() {
            if !TypeLattice::in_closure(left, right) {
                continue;
            }
            for op in [Operator::Add, Operator::Sub, Operator::Mul] {
                let def = OperatorDefinition::derive(op, Some(left), right).unwrap();
                assert!(def.overflow_predicate.is_some(), "{}", def);
            }
        }
    }
}

#[test]
fn test_boolean_result_cannot_carry_a_check() {
    assert_eq!(
        synthesize(Operator::Add, ResultType::Boolean, Some(Uint1), Uint1),
        Err(MatrixError::ResultTypeMismatch {
            operator: Operator::Add,
            result: ResultType::Boolean
        })
    );
}
