use crate::config::MatrixConfig;
use crate::definition::{DefinitionKey, OperatorDefinition};
use crate::operators::Operator;
use crate::promotion::SHIFT_AMOUNT_TYPE;
use crate::types::{IntegerType, TypeLattice};
use crate::{MatrixError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// One candidate operator before resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple {
    pub operator: Operator,
    pub left: Option<IntegerType>,
    pub right: IntegerType,
}

impl Triple {
    fn binary(operator: Operator, left: IntegerType, right: IntegerType) -> Self {
        Self {
            operator,
            left: Some(left),
            right,
        }
    }

    fn prefix(operator: Operator, operand: IntegerType) -> Self {
        Self {
            operator,
            left: None,
            right: operand,
        }
    }
}

/// Deterministic cross product of the type lattice and the operator catalog.
#[derive(Debug, Clone, Default)]
pub struct OperatorMatrix {
    config: MatrixConfig,
}

impl OperatorMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: MatrixConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatrixConfig {
        &self.config
    }

    /// Candidate triples in emission order: every in-closure pair with the
    /// comparison then arithmetic operators, followed by the per-type bitwise,
    /// complement and shift operators of the custom types.
    pub fn triples(&self) -> impl Iterator<Item = Triple> + '_ {
        let pairs = TypeLattice::types().iter().flat_map(|&left| {
            TypeLattice::types().iter().filter_map(move |&right| {
                if TypeLattice::in_closure(left, right) {
                    Some((left, right))
                } else {
                    trace!(%left, %right, "pair covered by host operators, skipping");
                    None
                }
            })
        });

        let binary = pairs.flat_map(move |(left, right)| {
            self.pair_operators()
                .map(move |op| Triple::binary(op, left, right))
        });

        let per_type = TypeLattice::custom().iter().flat_map(move |&ty| {
            let bitwise = enabled(self.config.bitwise, &Operator::BITWISE)
                .map(move |op| Triple::binary(op, ty, ty));
            let complement = enabled(self.config.complement, &Operator::UNARY)
                .map(move |op| Triple::prefix(op, ty));
            let shifts = enabled(self.config.shifts, &Operator::SHIFT)
                .map(move |op| Triple::binary(op, ty, SHIFT_AMOUNT_TYPE));
            bitwise.chain(complement).chain(shifts)
        });

        binary.chain(per_type)
    }

    /// Lazily resolve every triple. A resolution failure is a catalog bug and
    /// is yielded as an error rather than skipped.
    pub fn emit_all(&self) -> impl Iterator<Item = Result<OperatorDefinition>> + '_ {
        self.triples()
            .map(|triple| OperatorDefinition::derive(triple.operator, triple.left, triple.right))
    }

    pub fn definitions(&self) -> Result<Vec<OperatorDefinition>> {
        let definitions = self.emit_all().collect::<Result<Vec<_>>>()?;
        debug!(count = definitions.len(), "resolved operator matrix");
        Ok(definitions)
    }

    pub fn table(&self) -> Result<DefinitionTable> {
        let mut table = DefinitionTable::new();
        for definition in self.emit_all() {
            table.insert(definition?)?;
        }
        Ok(table)
    }

    fn pair_operators(&self) -> impl Iterator<Item = Operator> + '_ {
        enabled(self.config.comparisons, &Operator::COMPARISON)
            .chain(enabled(self.config.arithmetic, &Operator::ARITHMETIC))
    }
}

fn enabled(on: bool, operators: &'static [Operator]) -> impl Iterator<Item = Operator> {
    let operators: &'static [Operator] = if on { operators } else { &[] };
    operators.iter().copied()
}

/// Definitions indexed by operator and operand types, in emission order.
#[derive(Debug, Clone, Default)]
pub struct DefinitionTable {
    definitions: IndexMap<DefinitionKey, OperatorDefinition>,
}

impl DefinitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, definition: OperatorDefinition) -> Result<()> {
        let key = definition.key();
        if self.definitions.contains_key(&key) {
            return Err(MatrixError::DuplicateDefinition(key.to_string()));
        }
        self.definitions.insert(key, definition);
        Ok(())
    }

    pub fn lookup(
        &self,
        operator: Operator,
        left: Option<IntegerType>,
        right: IntegerType,
    ) -> Option<&OperatorDefinition> {
        self.definitions.get(&DefinitionKey {
            operator,
            left,
            right,
        })
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OperatorDefinition> {
        self.definitions.values()
    }
}
