//! Boolean expressions over the operands and raw result of a generated operator.
//!
//! Only the shapes needed for overflow predicates exist here. Renderers walk the
//! tree to print it in their own syntax; [`fmt::Display`] gives a C-like form
//! with lattice type names in casts.

use crate::types::IntegerType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Not;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operand {
    Arg1,
    Arg2,
    Result,
}

impl Operand {
    pub fn name(&self) -> &'static str {
        match self {
            Operand::Arg1 => "arg1",
            Operand::Arg2 => "arg2",
            Operand::Result => "result",
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CmpOp {
    Lt,
    Le,
    Eq,
    Ne,
    Ge,
    Gt,
}

impl CmpOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
            CmpOp::Ge => ">=",
            CmpOp::Gt => ">",
        }
    }

    pub fn apply(&self, lhs: i128, rhs: i128) -> bool {
        match self {
            CmpOp::Lt => lhs < rhs,
            CmpOp::Le => lhs <= rhs,
            CmpOp::Eq => lhs == rhs,
            CmpOp::Ne => lhs != rhs,
            CmpOp::Ge => lhs >= rhs,
            CmpOp::Gt => lhs > rhs,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Term {
    Operand(Operand),
    Literal(i64),
    /// Operand converted to `ty`, wrapping modulo its width.
    Cast(IntegerType, Operand),
    /// Truncating division, as C does it.
    Quotient(Operand, Operand),
}

impl From<Operand> for Term {
    fn from(operand: Operand) -> Self {
        Term::Operand(operand)
    }
}

impl From<i64> for Term {
    fn from(value: i64) -> Self {
        Term::Literal(value)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Operand(operand) => write!(f, "{}", operand),
            Term::Literal(value) => write!(f, "{}", value),
            Term::Cast(ty, operand) => write!(f, "({}) {}", ty, operand),
            Term::Quotient(lhs, rhs) => write!(f, "{} / {}", lhs, rhs),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Expr {
    Compare(CmpOp, Term, Term),
    /// Both operands have the same sign bit.
    SameSign(Operand, Operand),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn compare(lhs: impl Into<Term>, op: CmpOp, rhs: impl Into<Term>) -> Self {
        Expr::Compare(op, lhs.into(), rhs.into())
    }

    pub fn same_sign(lhs: Operand, rhs: Operand) -> Self {
        Expr::SameSign(lhs, rhs)
    }

    pub fn and(self, other: Expr) -> Self {
        Expr::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Expr) -> Self {
        Expr::Or(Box::new(self), Box::new(other))
    }

    fn precedence(&self) -> u8 {
        match self {
            Expr::Or(..) => 1,
            Expr::And(..) => 2,
            Expr::Compare(..) => 3,
            Expr::Not(_) | Expr::SameSign(..) => 4,
        }
    }

    fn fmt_child(&self, child: &Expr, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mixed_junction =
            matches!(child, Expr::And(..) | Expr::Or(..)) && child.precedence() != self.precedence();
        if mixed_junction {
            write!(f, "({})", child)
        } else {
            write!(f, "{}", child)
        }
    }
}

impl Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        Expr::Not(Box::new(self))
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Compare(op, lhs, rhs) => write!(f, "{} {} {}", lhs, op.symbol(), rhs),
            Expr::SameSign(lhs, rhs) => write!(f, "SAMESIGN({}, {})", lhs, rhs),
            Expr::Not(inner) => {
                f.write_str("!")?;
                if inner.precedence() < 4 {
                    write!(f, "({})", inner)
                } else {
                    write!(f, "{}", inner)
                }
            }
            Expr::And(lhs, rhs) => {
                self.fmt_child(lhs, f)?;
                f.write_str(" && ")?;
                self.fmt_child(rhs, f)
            }
            Expr::Or(lhs, rhs) => {
                self.fmt_child(lhs, f)?;
                f.write_str(" || ")?;
                self.fmt_child(rhs, f)
            }
        }
    }
}
