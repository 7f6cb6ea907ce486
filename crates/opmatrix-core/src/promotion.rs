use crate::expr::Operand;
use crate::operators::{Arity, Operator, OperatorClass};
use crate::types::{IntegerType, ResultType, TypeLattice};
use crate::{MatrixError, Result};

/// Right operand type of every shift operator.
pub const SHIFT_AMOUNT_TYPE: IntegerType = IntegerType::Int4;

/// Wider operand wins; on equal width the unsigned one does.
pub fn promote(left: IntegerType, right: IntegerType) -> IntegerType {
    if right.promotion_rank() > left.promotion_rank() {
        right
    } else {
        left
    }
}

pub fn resolve(op: Operator, left: Option<IntegerType>, right: IntegerType) -> Result<ResultType> {
    let left = match (op.arity(), left) {
        (Arity::Unary, None) => return Ok(ResultType::Integer(right)),
        (Arity::Binary, Some(left)) => left,
        (arity, _) => {
            return Err(MatrixError::ArityMismatch {
                operator: op,
                expected: arity.operand_count(),
            })
        }
    };

    if !TypeLattice::in_closure(left, right) {
        return Err(MatrixError::OutsideClosure { left, right });
    }

    match op.class() {
        OperatorClass::Comparison => Ok(ResultType::Boolean),
        OperatorClass::Arithmetic | OperatorClass::Bitwise => {
            Ok(ResultType::Integer(promote(left, right)))
        }
        OperatorClass::Shift => {
            if right != SHIFT_AMOUNT_TYPE {
                return Err(MatrixError::InvalidShiftAmount(right));
            }
            Ok(ResultType::Integer(left))
        }
        OperatorClass::Unary => Err(MatrixError::ArityMismatch {
            operator: op,
            expected: Arity::Unary.operand_count(),
        }),
    }
}

/// Operands that have to be non-negative before they can be widened into
/// `result`. Only arithmetic widens its operands.
pub fn sign_guards(
    op: Operator,
    result: ResultType,
    left: Option<IntegerType>,
    right: IntegerType,
) -> Vec<Operand> {
    let target = match (op.class(), result) {
        (OperatorClass::Arithmetic, ResultType::Integer(target)) => target,
        _ => return Vec::new(),
    };
    if target.is_signed() {
        return Vec::new();
    }

    [(Operand::Arg1, left), (Operand::Arg2, Some(right))]
        .into_iter()
        .filter_map(|(operand, ty)| match ty {
            Some(ty) if ty.is_signed() => Some(operand),
            _ => None,
        })
        .collect()
}
