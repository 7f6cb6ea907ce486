//! Arbitrary-precision cross-check of the synthesized predicates.
//!
//! [`exact_outcome`] computes what an operator must return without looking at
//! its overflow predicate, using `num-bigint` so 64-bit products are exact.
//! [`verify`] compares it against [`crate::eval::evaluate`] over a grid of
//! boundary values.

use crate::definition::{DefinitionKey, OperatorDefinition};
use crate::eval::{binary_left, check_operands, evaluate, integer_result, EvalError, Outcome, Value};
use crate::operators::{Operator, OperatorClass};
use crate::types::IntegerType;
use num_bigint::BigInt;
use num_traits::{One, Signed, ToPrimitive, Zero};
use std::cmp::Ordering;

pub fn exact_outcome(
    def: &OperatorDefinition,
    left: Option<i128>,
    right: i128,
) -> Result<Value, EvalError> {
    check_operands(def, left, right)?;
    let rhs = BigInt::from(right);

    match def.operator.class() {
        OperatorClass::Comparison => {
            let lhs = BigInt::from(binary_left(def, left)?);
            let ordering = lhs.cmp(&rhs);
            let holds = match def.operator {
                Operator::Lt => ordering == Ordering::Less,
                Operator::Le => ordering != Ordering::Greater,
                Operator::Eq => ordering == Ordering::Equal,
                Operator::Ne => ordering != Ordering::Equal,
                Operator::Ge => ordering != Ordering::Less,
                _ => ordering == Ordering::Greater,
            };
            Ok(Value::Bool(holds))
        }
        OperatorClass::Arithmetic => {
            let target = integer_result(def)?;
            let lhs = BigInt::from(binary_left(def, left)?);
            // Operands are coerced to the result type before anything else.
            if !fits(target, &lhs) || !fits(target, &rhs) {
                return Err(EvalError::OutOfRange);
            }
            let exact = match def.operator {
                Operator::Add => lhs + rhs,
                Operator::Sub => lhs - rhs,
                Operator::Mul => lhs * rhs,
                Operator::Div | Operator::Mod if rhs.is_zero() => {
                    return Err(EvalError::DivisionByZero)
                }
                Operator::Div => lhs / rhs,
                _ => lhs % rhs,
            };
            in_range(target, exact)
        }
        OperatorClass::Bitwise => {
            let target = integer_result(def)?;
            let lhs = BigInt::from(binary_left(def, left)?);
            let raw = match def.operator {
                Operator::BitAnd => lhs & rhs,
                Operator::BitOr => lhs | rhs,
                _ => lhs ^ rhs,
            };
            to_value(wrap(target, raw))
        }
        OperatorClass::Unary => {
            let target = integer_result(def)?;
            to_value(wrap(target, -rhs - BigInt::one()))
        }
        OperatorClass::Shift => {
            let target = integer_result(def)?;
            let lhs = BigInt::from(binary_left(def, left)?);
            if rhs.is_negative() {
                return Err(EvalError::OutOfRange);
            }
            // Past the width every shift has already settled.
            let amount = right.min(i128::from(target.bit_width()) + 1) as usize;
            let raw = match def.operator {
                Operator::Shl => lhs << amount,
                _ => lhs >> amount,
            };
            to_value(wrap(target, raw))
        }
    }
}

fn fits(ty: IntegerType, value: &BigInt) -> bool {
    *value >= BigInt::from(ty.min_value()) && *value <= BigInt::from(ty.max_value())
}

fn in_range(ty: IntegerType, value: BigInt) -> Result<Value, EvalError> {
    if fits(ty, &value) {
        to_value(value)
    } else {
        Err(EvalError::OutOfRange)
    }
}

fn wrap(ty: IntegerType, value: BigInt) -> BigInt {
    let modulus = BigInt::one() << ty.bit_width() as usize;
    let mut low = value % &modulus;
    if low.is_negative() {
        low += &modulus;
    }
    if ty.is_signed() && low >= (&modulus >> 1usize) {
        low - modulus
    } else {
        low
    }
}

fn to_value(value: BigInt) -> Result<Value, EvalError> {
    value
        .to_i128()
        .map(Value::Int)
        .ok_or(EvalError::OutOfRange)
}

/// Interesting operand values for `ty`: zero, small values, the extremes and
/// the half-width boundary where 64-bit products start to overflow.
pub fn boundary_values(ty: IntegerType) -> Vec<i128> {
    let max = i128::from(ty.max_value());
    let min = i128::from(ty.min_value());
    let half = 1i128 << (ty.bit_width() / 2);

    let mut values = vec![
        0,
        1,
        2,
        3,
        5,
        max,
        max - 1,
        max / 2,
        max / 2 + 1,
        half - 1,
        half,
        half + 1,
        min,
        min + 1,
        min / 2,
        -1,
        -2,
        -half,
        -half - 1,
    ];
    values.retain(|value| ty.contains(*value));
    values.sort_unstable();
    values.dedup();
    values
}

/// Shift amounts around every lattice width.
pub fn shift_amounts() -> Vec<i128> {
    vec![-1, 0, 1, 3, 7, 8, 9, 15, 16, 31, 32, 63, 64, 65, 1000]
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub key: DefinitionKey,
    pub left: Option<i128>,
    pub right: i128,
    pub evaluated: Outcome,
    pub expected: Outcome,
}

/// Every grid point where the generated semantics disagree with the exact
/// ones.
pub fn verify(def: &OperatorDefinition) -> Vec<Mismatch> {
    let lefts: Vec<Option<i128>> = match def.left_type {
        Some(ty) => boundary_values(ty).into_iter().map(Some).collect(),
        None => vec![None],
    };
    let rights = match def.operator.class() {
        OperatorClass::Shift => shift_amounts(),
        _ => boundary_values(def.right_type),
    };

    let mut mismatches = Vec::new();
    for &left in &lefts {
        for &right in &rights {
            let evaluated = Outcome::from(evaluate(def, left, right));
            let expected = Outcome::from(exact_outcome(def, left, right));
            if evaluated != expected {
                mismatches.push(Mismatch {
                    key: def.key(),
                    left,
                    right,
                    evaluated,
                    expected,
                });
            }
        }
    }
    mismatches
}
