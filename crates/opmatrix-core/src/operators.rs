use crate::{MatrixError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperatorClass {
    Comparison,
    Arithmetic,
    Bitwise,
    Shift,
    Unary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Arity {
    Unary,
    Binary,
}

impl Arity {
    pub fn operand_count(&self) -> usize {
        match self {
            Arity::Unary => 1,
            Arity::Binary => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    Lt,
    Le,
    Eq,
    Ne,
    Ge,
    Gt,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    BitAnd,
    BitOr,
    BitXor,
    BitNot,
    Shl,
    Shr,
}

impl Operator {
    pub const COMPARISON: [Operator; 6] = [
        Operator::Lt,
        Operator::Le,
        Operator::Eq,
        Operator::Ne,
        Operator::Ge,
        Operator::Gt,
    ];

    pub const ARITHMETIC: [Operator; 5] = [
        Operator::Add,
        Operator::Sub,
        Operator::Mul,
        Operator::Div,
        Operator::Mod,
    ];

    pub const BITWISE: [Operator; 3] = [Operator::BitAnd, Operator::BitOr, Operator::BitXor];

    pub const UNARY: [Operator; 1] = [Operator::BitNot];

    pub const SHIFT: [Operator; 2] = [Operator::Shl, Operator::Shr];

    pub const ALL: [Operator; 17] = [
        Operator::Lt,
        Operator::Le,
        Operator::Eq,
        Operator::Ne,
        Operator::Ge,
        Operator::Gt,
        Operator::Add,
        Operator::Sub,
        Operator::Mul,
        Operator::Div,
        Operator::Mod,
        Operator::BitAnd,
        Operator::BitOr,
        Operator::BitXor,
        Operator::BitNot,
        Operator::Shl,
        Operator::Shr,
    ];

    /// SQL spelling.
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Eq => "=",
            Operator::Ne => "<>",
            Operator::Ge => ">=",
            Operator::Gt => ">",
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
            Operator::Mod => "%",
            Operator::BitAnd => "&",
            Operator::BitOr => "|",
            Operator::BitXor => "#",
            Operator::BitNot => "~",
            Operator::Shl => "<<",
            Operator::Shr => ">>",
        }
    }

    /// Suffix used to build native function names.
    pub fn word_code(&self) -> &'static str {
        match self {
            Operator::Lt => "lt",
            Operator::Le => "le",
            Operator::Eq => "eq",
            Operator::Ne => "ne",
            Operator::Ge => "ge",
            Operator::Gt => "gt",
            Operator::Add => "pl",
            Operator::Sub => "mi",
            Operator::Mul => "mul",
            Operator::Div => "div",
            Operator::Mod => "mod",
            Operator::BitAnd => "and",
            Operator::BitOr => "or",
            Operator::BitXor => "xor",
            Operator::BitNot => "not",
            Operator::Shl => "shl",
            Operator::Shr => "shr",
        }
    }

    pub fn class(&self) -> OperatorClass {
        match self {
            Operator::Lt
            | Operator::Le
            | Operator::Eq
            | Operator::Ne
            | Operator::Ge
            | Operator::Gt => OperatorClass::Comparison,
            Operator::Add | Operator::Sub | Operator::Mul | Operator::Div | Operator::Mod => {
                OperatorClass::Arithmetic
            }
            Operator::BitAnd | Operator::BitOr | Operator::BitXor => OperatorClass::Bitwise,
            Operator::BitNot => OperatorClass::Unary,
            Operator::Shl | Operator::Shr => OperatorClass::Shift,
        }
    }

    pub fn arity(&self) -> Arity {
        match self.class() {
            OperatorClass::Unary => Arity::Unary,
            _ => Arity::Binary,
        }
    }

    /// Operator that yields the same answer with the operands swapped.
    pub fn commutator(&self) -> Option<Operator> {
        match self {
            Operator::Lt => Some(Operator::Gt),
            Operator::Le => Some(Operator::Ge),
            Operator::Eq => Some(Operator::Eq),
            Operator::Ne => Some(Operator::Ne),
            Operator::Ge => Some(Operator::Le),
            Operator::Gt => Some(Operator::Lt),
            Operator::Add | Operator::Mul => Some(*self),
            Operator::BitAnd | Operator::BitOr | Operator::BitXor => Some(*self),
            Operator::Sub
            | Operator::Div
            | Operator::Mod
            | Operator::BitNot
            | Operator::Shl
            | Operator::Shr => None,
        }
    }

    /// Logical complement, defined for comparisons only.
    pub fn negator(&self) -> Option<Operator> {
        match self {
            Operator::Lt => Some(Operator::Ge),
            Operator::Le => Some(Operator::Gt),
            Operator::Eq => Some(Operator::Ne),
            Operator::Ne => Some(Operator::Eq),
            Operator::Ge => Some(Operator::Lt),
            Operator::Gt => Some(Operator::Le),
            _ => None,
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Operator> {
        Self::ALL.iter().copied().find(|op| op.symbol() == symbol)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Operator {
    type Err = MatrixError;

    fn from_str(s: &str) -> Result<Self> {
        Operator::from_symbol(s).ok_or_else(|| MatrixError::UnknownOperator(s.to_string()))
    }
}
