/*! Type lattice, promotion rules and overflow predicates for integer operator matrices.
 *
 * Adding a family of fixed-width integer types to a host that already has some means writing
 * hundreds of nearly identical operators, and the only hard part is getting every overflow check
 * right across mixed widths and signedness. This crate decides, for each operand pair and operator,
 * the result type and the exact out-of-range condition, and hands that to renderers as plain values.
 */

pub mod config;
pub mod definition;
pub mod eval;
pub mod expr;
pub mod literal;
pub mod matrix;
pub mod operators;
pub mod oracle;
pub mod overflow;
pub mod promotion;
pub mod scenario;
pub mod types;

pub use config::MatrixConfig;
pub use definition::{DefinitionKey, OperatorDefinition};
pub use eval::{evaluate, EvalError, Outcome, Value};
pub use expr::{CmpOp, Expr, Operand, Term};
pub use matrix::{DefinitionTable, OperatorMatrix, Triple};
pub use operators::{Arity, Operator, OperatorClass};
pub use overflow::{synthesize, Synthesis};
pub use promotion::{promote, resolve, SHIFT_AMOUNT_TYPE};
pub use scenario::{literal_pair_scenarios, scenarios_for, Literal, Probe, Scenario};
pub use types::{IntegerType, ResultType, TypeFamily, TypeLattice};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatrixError {
    #[error("No wider type than {0}")]
    NoWiderType(IntegerType),
    #[error("No narrower type than {0}")]
    NoNarrowerType(IntegerType),
    #[error("Pair ({left}, {right}) is outside the operator matrix")]
    OutsideClosure {
        left: IntegerType,
        right: IntegerType,
    },
    #[error("Operator {operator} expects {expected} operand(s)")]
    ArityMismatch { operator: Operator, expected: usize },
    #[error("Shift amount must be int4, got {0}")]
    InvalidShiftAmount(IntegerType),
    #[error("Operator {operator} cannot produce {result}")]
    ResultTypeMismatch {
        operator: Operator,
        result: ResultType,
    },
    #[error("Duplicate definition: {0}")]
    DuplicateDefinition(String),
    #[error("Unknown type: {0}")]
    UnknownType(String),
    #[error("Unknown operator: {0}")]
    UnknownOperator(String),
    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, MatrixError>;

#[cfg(test)]
mod tests;
