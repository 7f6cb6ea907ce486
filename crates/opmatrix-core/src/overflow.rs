use crate::expr::{CmpOp, Expr, Term};
use crate::operators::Operator;
use crate::types::{IntegerType, ResultType, TypeLattice};
use crate::{MatrixError, Result};
use serde::{Deserialize, Serialize};

use crate::expr::Operand::{Arg1, Arg2, Result as Res};

/// Overflow check for one operator, plus the wider type the raw result must be
/// computed in when the check relies on one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Synthesis {
    pub predicate: Option<Expr>,
    pub intermediate: Option<IntegerType>,
}

impl Synthesis {
    fn none() -> Self {
        Self::default()
    }

    fn predicate(expr: Expr) -> Self {
        Self {
            predicate: Some(expr),
            intermediate: None,
        }
    }
}

/// Build the out-of-range check for `op` producing `result`.
///
/// `arg1`/`arg2` in the returned predicate hold the operands already widened to
/// the result type and `result` the raw computation, wrapped to the result type
/// (or to the intermediate type, when one is returned).
pub fn synthesize(
    op: Operator,
    result: ResultType,
    _left: Option<IntegerType>,
    _right: IntegerType,
) -> Result<Synthesis> {
    match op {
        Operator::Lt
        | Operator::Le
        | Operator::Eq
        | Operator::Ne
        | Operator::Ge
        | Operator::Gt
        | Operator::BitAnd
        | Operator::BitOr
        | Operator::BitXor
        | Operator::BitNot
        | Operator::Shl
        | Operator::Shr
        | Operator::Div
        | Operator::Mod => Ok(Synthesis::none()),
        Operator::Add => {
            let target = integer_result(op, result)?;
            Ok(Synthesis::predicate(addition_check(target)))
        }
        Operator::Sub => {
            let target = integer_result(op, result)?;
            Ok(Synthesis::predicate(subtraction_check(target)))
        }
        Operator::Mul => {
            let target = integer_result(op, result)?;
            multiplication_check(target)
        }
    }
}

fn integer_result(op: Operator, result: ResultType) -> Result<IntegerType> {
    result
        .as_integer()
        .ok_or(MatrixError::ResultTypeMismatch { operator: op, result })
}

fn addition_check(target: IntegerType) -> Expr {
    if target.is_signed() {
        Expr::same_sign(Arg1, Arg2).and(!Expr::same_sign(Res, Arg1))
    } else {
        Expr::compare(Res, CmpOp::Lt, Arg1).or(Expr::compare(Res, CmpOp::Lt, Arg2))
    }
}

fn subtraction_check(target: IntegerType) -> Expr {
    if target.is_signed() {
        (!Expr::same_sign(Arg1, Arg2)).and(!Expr::same_sign(Res, Arg1))
    } else {
        Expr::compare(Res, CmpOp::Gt, Arg1)
    }
}

fn multiplication_check(target: IntegerType) -> Result<Synthesis> {
    if target.bit_width() < 64 {
        let intermediate = TypeLattice::next_wider(target)?;
        return Ok(Synthesis {
            predicate: Some(Expr::compare(
                Term::Cast(target, Res),
                CmpOp::Ne,
                Res,
            )),
            intermediate: Some(intermediate),
        });
    }

    // No wider native type: products of two half-width values cannot overflow,
    // anything else is checked by dividing the wrapped result back.
    let half = target
        .half_width()
        .ok_or(MatrixError::NoNarrowerType(target))?;
    let exceeds_half = Expr::compare(Arg1, CmpOp::Ne, Term::Cast(half, Arg1))
        .or(Expr::compare(Arg2, CmpOp::Ne, Term::Cast(half, Arg2)));
    let divides_back = Expr::compare(Term::Quotient(Res, Arg2), CmpOp::Ne, Arg1);

    let wrapped = if target.is_signed() {
        // MIN * -1 wraps to MIN, and MIN / -1 must never be evaluated.
        let min_times_minus_one = Expr::compare(Arg2, CmpOp::Eq, -1i64)
            .and(Expr::compare(Arg1, CmpOp::Lt, 0i64))
            .and(Expr::compare(Res, CmpOp::Lt, 0i64));
        min_times_minus_one.or(divides_back)
    } else {
        divides_back
    };

    let nonzero = Expr::compare(Arg2, CmpOp::Ne, 0i64);
    Ok(Synthesis::predicate(exceeds_half.and(nonzero.and(wrapped))))
}
