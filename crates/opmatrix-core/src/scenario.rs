use crate::definition::{DefinitionKey, OperatorDefinition};
use crate::eval::{evaluate, EvalError, Outcome, Value};
use crate::operators::{Operator, OperatorClass};
use crate::types::IntegerType;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Literal {
    pub value: i128,
    pub ty: IntegerType,
    /// Written as a bare integer, which the host reads as `int4`.
    #[serde(default)]
    pub untyped: bool,
}

impl Literal {
    pub fn new(value: i128, ty: IntegerType) -> Self {
        Self {
            value,
            ty,
            untyped: false,
        }
    }

    pub fn untyped(value: i128) -> Self {
        Self {
            value,
            ty: IntegerType::Int4,
            untyped: true,
        }
    }

    pub fn max_of(ty: IntegerType) -> Self {
        Self::new(i128::from(ty.max_value()), ty)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Probe {
    /// The operator's value.
    Value,
    /// The operator's result type.
    ResultType,
}

/// One literal invocation of a generated operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub operator: Operator,
    pub left: Option<Literal>,
    pub right: Literal,
    pub probe: Probe,
}

impl Scenario {
    /// Expected output, computed with the reference semantics.
    pub fn expected(&self, def: &OperatorDefinition) -> Outcome {
        match self.probe {
            Probe::ResultType => Outcome::Type(def.result_type),
            Probe::Value => Outcome::from(self.run(def)),
        }
    }

    pub fn run(&self, def: &OperatorDefinition) -> Result<Value, EvalError> {
        evaluate(def, self.left.map(|l| l.value), self.right.value)
    }

    /// The definition this line invokes.
    pub fn key(&self) -> DefinitionKey {
        DefinitionKey {
            operator: self.operator,
            left: self.left.map(|l| l.ty),
            right: self.right.ty,
        }
    }
}

/// Fixed literal templates per operator class. For `+` and `*` the pair of
/// type maxima is added since it is the likeliest to overflow.
pub fn scenarios_for(def: &OperatorDefinition) -> impl Iterator<Item = Scenario> {
    let op = def.operator;
    let right_ty = def.right_type;
    let make = move |left: Option<Literal>, right: i128, probe: Probe| Scenario {
        operator: op,
        left,
        right: Literal::new(right, right_ty),
        probe,
    };

    let mut scenarios = Vec::new();
    match (op.class(), def.left_type) {
        (OperatorClass::Unary, _) | (_, None) => {
            scenarios.push(make(None, 6, Probe::Value));
        }
        (OperatorClass::Comparison, Some(left_ty)) => {
            for (l, r) in [(1, 1), (5, 2), (3, 4)] {
                scenarios.push(make(Some(Literal::new(l, left_ty)), r, Probe::Value));
            }
        }
        (OperatorClass::Arithmetic, Some(left_ty)) => {
            scenarios.push(make(Some(Literal::new(1, left_ty)), 1, Probe::ResultType));
            for (l, r) in [(1, 1), (3, 4), (5, 2)] {
                scenarios.push(make(Some(Literal::new(l, left_ty)), r, Probe::Value));
            }
            if matches!(op, Operator::Add | Operator::Mul) {
                scenarios.push(make(
                    Some(Literal::max_of(left_ty)),
                    i128::from(right_ty.max_value()),
                    Probe::Value,
                ));
            }
        }
        (OperatorClass::Bitwise, Some(left_ty)) => {
            for (l, r) in [(1, 1), (5, 2), (5, 4)] {
                scenarios.push(make(Some(Literal::new(l, left_ty)), r, Probe::Value));
            }
        }
        (OperatorClass::Shift, Some(left_ty)) => {
            for amount in [1, 3] {
                scenarios.push(Scenario {
                    operator: op,
                    left: Some(Literal::new(6, left_ty)),
                    right: Literal::untyped(amount),
                    probe: Probe::Value,
                });
            }
        }
    }
    scenarios.into_iter()
}

/// Lines pairing `ty` with a bare integer on either side, for every comparison
/// and arithmetic operator: `'2'::ty op 5`, `2 op '5'::ty`, `'5'::ty op 2` and
/// `5 op '2'::ty`. They exercise resolution of untyped literals against `ty`.
pub fn literal_pair_scenarios(ty: IntegerType) -> impl Iterator<Item = Scenario> {
    Operator::COMPARISON
        .into_iter()
        .chain(Operator::ARITHMETIC)
        .flat_map(move |operator| {
            let typed_left = move |l: i128, r: i128| Scenario {
                operator,
                left: Some(Literal::new(l, ty)),
                right: Literal::untyped(r),
                probe: Probe::Value,
            };
            let typed_right = move |l: i128, r: i128| Scenario {
                operator,
                left: Some(Literal::untyped(l)),
                right: Literal::new(r, ty),
                probe: Probe::Value,
            };
            [
                typed_left(2, 5),
                typed_right(2, 5),
                typed_left(5, 2),
                typed_right(5, 2),
            ]
        })
}
