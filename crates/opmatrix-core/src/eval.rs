//! Reference semantics of a generated operator.
//!
//! [`evaluate`] runs an [`OperatorDefinition`] the way the rendered native
//! function does: operands are widened to the result type, the raw result wraps
//! and the synthesized predicate decides whether the call fails.

use crate::definition::OperatorDefinition;
use crate::expr::{Expr, Operand, Term};
use crate::operators::{Operator, OperatorClass};
use crate::types::{IntegerType, ResultType};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("integer out of range")]
    OutOfRange,
    #[error("division by zero")]
    DivisionByZero,
    #[error("value {value} is not a valid {ty}")]
    OperandType { ty: IntegerType, value: i128 },
    #[error("operator {operator} expects {expected} operand(s)")]
    OperandCount { operator: Operator, expected: usize },
    #[error("invalid input syntax for type {ty}: \"{input}\"")]
    InvalidSyntax { ty: IntegerType, input: String },
    #[error("value \"{input}\" is out of range for type {ty}")]
    LiteralOutOfRange { ty: IntegerType, input: String },
    #[error("Malformed definition: {0}")]
    MalformedDefinition(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    Bool(bool),
    Int(i128),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(true) => f.write_str("t"),
            Value::Bool(false) => f.write_str("f"),
            Value::Int(value) => write!(f, "{}", value),
        }
    }
}

/// What a scenario line is expected to print.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Value(Value),
    Type(ResultType),
    Error(EvalError),
}

impl From<std::result::Result<Value, EvalError>> for Outcome {
    fn from(result: std::result::Result<Value, EvalError>) -> Self {
        match result {
            Ok(value) => Outcome::Value(value),
            Err(err) => Outcome::Error(err),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Value(value) => write!(f, "{}", value),
            Outcome::Type(ty) => write!(f, "{}", ty),
            Outcome::Error(err) => write!(f, "ERROR:  {}", err),
        }
    }
}

/// Values bound to the predicate's identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bindings {
    pub arg1: i128,
    pub arg2: i128,
    pub result: i128,
}

impl Bindings {
    pub fn get(&self, operand: Operand) -> i128 {
        match operand {
            Operand::Arg1 => self.arg1,
            Operand::Arg2 => self.arg2,
            Operand::Result => self.result,
        }
    }
}

pub fn eval_predicate(expr: &Expr, env: &Bindings) -> Result<bool, EvalError> {
    match expr {
        Expr::Compare(op, lhs, rhs) => Ok(op.apply(eval_term(lhs, env)?, eval_term(rhs, env)?)),
        Expr::SameSign(lhs, rhs) => Ok((env.get(*lhs) < 0) == (env.get(*rhs) < 0)),
        Expr::Not(inner) => Ok(!eval_predicate(inner, env)?),
        Expr::And(lhs, rhs) => Ok(eval_predicate(lhs, env)? && eval_predicate(rhs, env)?),
        Expr::Or(lhs, rhs) => Ok(eval_predicate(lhs, env)? || eval_predicate(rhs, env)?),
    }
}

fn eval_term(term: &Term, env: &Bindings) -> Result<i128, EvalError> {
    match term {
        Term::Operand(operand) => Ok(env.get(*operand)),
        Term::Literal(value) => Ok(i128::from(*value)),
        Term::Cast(ty, operand) => Ok(ty.wrap(env.get(*operand))),
        Term::Quotient(lhs, rhs) => {
            let divisor = env.get(*rhs);
            if divisor == 0 {
                return Err(EvalError::DivisionByZero);
            }
            env.get(*lhs)
                .checked_div(divisor)
                .ok_or(EvalError::OutOfRange)
        }
    }
}

pub(crate) fn check_operands(
    def: &OperatorDefinition,
    left: Option<i128>,
    right: i128,
) -> Result<(), EvalError> {
    match (def.left_type, left) {
        (Some(ty), Some(value)) if !ty.contains(value) => {
            return Err(EvalError::OperandType { ty, value })
        }
        (Some(_), Some(_)) | (None, None) => {}
        _ => {
            return Err(EvalError::OperandCount {
                operator: def.operator,
                expected: def.operator.arity().operand_count(),
            })
        }
    }
    if !def.right_type.contains(right) {
        return Err(EvalError::OperandType {
            ty: def.right_type,
            value: right,
        });
    }
    Ok(())
}

pub(crate) fn integer_result(def: &OperatorDefinition) -> Result<IntegerType, EvalError> {
    def.result_type
        .as_integer()
        .ok_or_else(|| EvalError::MalformedDefinition(def.to_string()))
}

pub(crate) fn binary_left(def: &OperatorDefinition, left: Option<i128>) -> Result<i128, EvalError> {
    left.ok_or(EvalError::OperandCount {
        operator: def.operator,
        expected: 2,
    })
}

/// Run `def` on concrete operand values.
pub fn evaluate(
    def: &OperatorDefinition,
    left: Option<i128>,
    right: i128,
) -> Result<Value, EvalError> {
    check_operands(def, left, right)?;

    match def.operator.class() {
        OperatorClass::Comparison => {
            let left = binary_left(def, left)?;
            Ok(Value::Bool(compare(def.operator, left, right)))
        }
        OperatorClass::Arithmetic => arithmetic(def, binary_left(def, left)?, right),
        OperatorClass::Bitwise => {
            let ty = integer_result(def)?;
            let left = binary_left(def, left)?;
            let raw = match def.operator {
                Operator::BitAnd => left & right,
                Operator::BitOr => left | right,
                _ => left ^ right,
            };
            Ok(Value::Int(ty.wrap(raw)))
        }
        OperatorClass::Unary => Ok(Value::Int(integer_result(def)?.wrap(!right))),
        OperatorClass::Shift => shift(def, binary_left(def, left)?, right),
    }
}

fn compare(op: Operator, left: i128, right: i128) -> bool {
    match op {
        Operator::Lt => left < right,
        Operator::Le => left <= right,
        Operator::Eq => left == right,
        Operator::Ne => left != right,
        Operator::Ge => left >= right,
        _ => left > right,
    }
}

fn arithmetic(def: &OperatorDefinition, left: i128, right: i128) -> Result<Value, EvalError> {
    let target = integer_result(def)?;

    for guard in &def.sign_guards {
        let value = match guard {
            Operand::Arg1 => left,
            Operand::Arg2 => right,
            Operand::Result => continue,
        };
        if value < 0 {
            return Err(EvalError::OutOfRange);
        }
    }
    if !target.contains(left) || !target.contains(right) {
        return Err(EvalError::MalformedDefinition(def.to_string()));
    }

    let raw = match def.operator {
        Operator::Add => target.wrap(left + right),
        Operator::Sub => target.wrap(left - right),
        Operator::Mul => match def.intermediate_type {
            Some(wide) => wide.wrap(left * right),
            None => target.wrap(left.wrapping_mul(right)),
        },
        Operator::Div => {
            if right == 0 {
                return Err(EvalError::DivisionByZero);
            }
            let quotient = left / right;
            return if target.contains(quotient) {
                Ok(Value::Int(quotient))
            } else {
                Err(EvalError::OutOfRange)
            };
        }
        Operator::Mod => {
            if right == 0 {
                return Err(EvalError::DivisionByZero);
            }
            return Ok(Value::Int(left % right));
        }
        _ => return Err(EvalError::MalformedDefinition(def.to_string())),
    };

    if let Some(predicate) = &def.overflow_predicate {
        let env = Bindings {
            arg1: left,
            arg2: right,
            result: raw,
        };
        if eval_predicate(predicate, &env)? {
            return Err(EvalError::OutOfRange);
        }
    }

    Ok(Value::Int(target.wrap(raw)))
}

fn shift(def: &OperatorDefinition, value: i128, amount: i128) -> Result<Value, EvalError> {
    let ty = integer_result(def)?;
    if amount < 0 {
        return Err(EvalError::OutOfRange);
    }
    let bits = i128::from(ty.bit_width());

    let shifted = match def.operator {
        Operator::Shl if amount >= bits => 0,
        Operator::Shl => ty.wrap(value.wrapping_shl(amount as u32)),
        Operator::Shr if amount >= bits => {
            if value < 0 {
                -1
            } else {
                0
            }
        }
        Operator::Shr => value >> amount,
        _ => return Err(EvalError::MalformedDefinition(def.to_string())),
    };
    Ok(Value::Int(shifted))
}
