use crate::expr::{Expr, Operand};
use crate::operators::{Operator, OperatorClass};
use crate::overflow::synthesize;
use crate::promotion::{resolve, sign_guards};
use crate::types::{IntegerType, ResultType};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Everything a renderer needs to produce one operator.
///
/// `left_type` is absent only for the prefix complement operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorDefinition {
    pub left_type: Option<IntegerType>,
    pub right_type: IntegerType,
    pub operator: Operator,
    pub result_type: ResultType,
    pub overflow_predicate: Option<Expr>,
    pub intermediate_type: Option<IntegerType>,
    pub sign_guards: Vec<Operand>,
}

impl OperatorDefinition {
    pub fn derive(
        operator: Operator,
        left_type: Option<IntegerType>,
        right_type: IntegerType,
    ) -> Result<Self> {
        let result_type = resolve(operator, left_type, right_type)?;
        let synthesis = synthesize(operator, result_type, left_type, right_type)?;
        let sign_guards = sign_guards(operator, result_type, left_type, right_type);

        Ok(Self {
            left_type,
            right_type,
            operator,
            result_type,
            overflow_predicate: synthesis.predicate,
            intermediate_type: synthesis.intermediate,
            sign_guards,
        })
    }

    pub fn key(&self) -> DefinitionKey {
        DefinitionKey {
            operator: self.operator,
            left: self.left_type,
            right: self.right_type,
        }
    }

    /// Native symbol name, e.g. `uint1int2pl` or `uint4not`.
    pub fn function_name(&self) -> String {
        format!(
            "{}{}{}",
            self.left_type.map(|ty| ty.name()).unwrap_or(""),
            self.right_type.name(),
            self.operator.word_code()
        )
    }

    pub fn argument_types(&self) -> Vec<IntegerType> {
        self.left_type
            .into_iter()
            .chain(std::iter::once(self.right_type))
            .collect()
    }

    /// Type `operand` holds while the predicate is evaluated.
    pub fn working_type(&self, operand: Operand) -> Option<IntegerType> {
        let declared = match operand {
            Operand::Arg1 => self.left_type,
            Operand::Arg2 => Some(self.right_type),
            Operand::Result => return self.intermediate_type.or(self.result_type.as_integer()),
        };
        match self.operator.class() {
            OperatorClass::Arithmetic => self.result_type.as_integer(),
            _ => declared,
        }
    }

    pub fn is_guarded(&self, operand: Operand) -> bool {
        self.sign_guards.contains(&operand)
    }
}

impl fmt::Display for OperatorDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.left_type {
            Some(left) => write!(
                f,
                "{} {} {} -> {}",
                left, self.operator, self.right_type, self.result_type
            ),
            None => write!(
                f,
                "{}{} -> {}",
                self.operator, self.right_type, self.result_type
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DefinitionKey {
    pub operator: Operator,
    pub left: Option<IntegerType>,
    pub right: IntegerType,
}

impl fmt::Display for DefinitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.left {
            Some(left) => write!(f, "{} {} {}", left, self.operator, self.right),
            None => write!(f, "{}{}", self.operator, self.right),
        }
    }
}
