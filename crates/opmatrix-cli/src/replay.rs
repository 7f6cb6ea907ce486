//! Checks run over parsed scripts: registration consistency and scenario replay.

use opmatrix_core::{
    evaluate, DefinitionTable, EvalError, IntegerType, Operator, OperatorDefinition, Outcome,
    ResultType,
};
use opmatrix_parser::{FunctionDecl, LiteralText, OperatorDecl, Probe, Statement, StatementKind};
use std::collections::HashMap;
use std::str::FromStr;
use tracing::{debug, trace};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub line: usize,
    pub message: String,
}

impl Issue {
    fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub functions: usize,
    pub operators: usize,
    pub issues: Vec<Issue>,
}

fn known_type(name: &str) -> bool {
    name.eq_ignore_ascii_case(ResultType::Boolean.name()) || IntegerType::from_str(name).is_ok()
}

/// Every operator must name a declared procedure whose argument types match its
/// operand types, and every type named anywhere must be known.
pub fn validate_registration(statements: &[Statement], table: &DefinitionTable) -> ValidationReport {
    let mut report = ValidationReport::default();
    let mut functions: HashMap<&str, &FunctionDecl> = HashMap::new();

    for statement in statements {
        if let StatementKind::CreateFunction(decl) = &statement.kind {
            report.functions += 1;
            for ty in decl.arguments.iter().chain(std::iter::once(&decl.returns)) {
                if !known_type(ty) {
                    report
                        .issues
                        .push(Issue::new(statement.line, format!("unknown type {}", ty)));
                }
            }
            if functions.insert(decl.name.as_str(), decl).is_some() {
                report.issues.push(Issue::new(
                    statement.line,
                    format!("function {} declared twice", decl.name),
                ));
            }
        }
    }

    for statement in statements {
        if let StatementKind::CreateOperator(decl) = &statement.kind {
            report.operators += 1;
            check_operator(statement.line, decl, &functions, table, &mut report.issues);
        }
    }

    debug!(
        functions = report.functions,
        operators = report.operators,
        issues = report.issues.len(),
        "validated registration"
    );
    report
}

fn check_operator(
    line: usize,
    decl: &OperatorDecl,
    functions: &HashMap<&str, &FunctionDecl>,
    table: &DefinitionTable,
    issues: &mut Vec<Issue>,
) {
    let operands: Vec<&String> = decl.left.iter().chain(decl.right.iter()).collect();
    for ty in &operands {
        if !known_type(ty) {
            issues.push(Issue::new(line, format!("unknown type {}", ty)));
        }
    }

    let procedure = match &decl.procedure {
        Some(procedure) => procedure,
        None => {
            issues.push(Issue::new(
                line,
                format!("operator {} has no procedure", decl.symbol),
            ));
            return;
        }
    };
    let function = match functions.get(procedure.as_str()) {
        Some(function) => function,
        None => {
            issues.push(Issue::new(
                line,
                format!("procedure {} is not declared", procedure),
            ));
            return;
        }
    };

    let same_arguments = function.arguments.len() == operands.len()
        && function
            .arguments
            .iter()
            .zip(&operands)
            .all(|(declared, operand)| declared.eq_ignore_ascii_case(operand));
    if !same_arguments {
        issues.push(Issue::new(
            line,
            format!(
                "procedure {} takes ({}) but operator {} is declared on ({})",
                procedure,
                function.arguments.join(", "),
                decl.symbol,
                operands
                    .iter()
                    .map(|s| s.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        ));
        return;
    }

    // Against the matrix: the operator must exist there and agree on the result.
    let resolved = resolve_operator(&decl.symbol, decl.left.as_deref(), decl.right.as_deref());
    match resolved.and_then(|(op, left, right)| table.lookup(op, left, right)) {
        Some(def) if !def.result_type.name().eq_ignore_ascii_case(&function.returns) => {
            issues.push(Issue::new(
                line,
                format!(
                    "procedure {} returns {} but {} produces {}",
                    procedure, function.returns, def, def.result_type
                ),
            ));
        }
        Some(_) => {}
        None => issues.push(Issue::new(
            line,
            format!(
                "operator {} on ({}) is not part of the matrix",
                decl.symbol,
                function.arguments.join(", ")
            ),
        )),
    }
}

fn resolve_operator(
    symbol: &str,
    left: Option<&str>,
    right: Option<&str>,
) -> Option<(Operator, Option<IntegerType>, IntegerType)> {
    let op = Operator::from_symbol(symbol)?;
    let left = match left {
        Some(name) => Some(IntegerType::from_str(name).ok()?),
        None => None,
    };
    let right = IntegerType::from_str(right?).ok()?;
    Some((op, left, right))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayReport {
    pub probes: usize,
    pub compared: usize,
    pub failures: Vec<Issue>,
}

fn resolve_literal(literal: &LiteralText) -> Result<IntegerType, String> {
    let name = literal.type_name_or_default();
    IntegerType::from_str(name).map_err(|_| format!("unknown type {}", name))
}

/// Outcome of a probe, as the host would print it.
pub fn probe_outcome(probe: &Probe, table: &DefinitionTable) -> Result<Outcome, String> {
    let op = Operator::from_symbol(&probe.operator)
        .ok_or_else(|| format!("unknown operator {}", probe.operator))?;
    let left_ty = probe.left.as_ref().map(resolve_literal).transpose()?;
    let right_ty = resolve_literal(&probe.right)?;

    let def: &OperatorDefinition = table.lookup(op, left_ty, right_ty).ok_or_else(|| {
        match left_ty {
            Some(left) => format!("no operator {} {} {}", left, op, right_ty),
            None => format!("no operator {} {}", op, right_ty),
        }
    })?;

    let parse = |literal: &LiteralText, ty: IntegerType| -> Result<i128, EvalError> {
        ty.parse_literal(&literal.text)
    };
    let left = match (&probe.left, left_ty) {
        (Some(literal), Some(ty)) => match parse(literal, ty) {
            Ok(value) => Some(value),
            Err(err) => return Ok(Outcome::Error(err)),
        },
        _ => None,
    };
    let right = match parse(&probe.right, right_ty) {
        Ok(value) => value,
        Err(err) => return Ok(Outcome::Error(err)),
    };

    if probe.type_probe {
        return Ok(Outcome::Type(def.result_type));
    }
    Ok(Outcome::from(evaluate(def, left, right)))
}

/// Replay every probe and compare it with its `-->` annotation, if any.
pub fn replay(statements: &[Statement], table: &DefinitionTable) -> ReplayReport {
    let mut report = ReplayReport::default();

    for statement in statements {
        let probe = match &statement.kind {
            StatementKind::Select(probe) => probe,
            _ => continue,
        };
        report.probes += 1;

        let outcome = match probe_outcome(probe, table) {
            Ok(outcome) => outcome,
            Err(message) => {
                report.failures.push(Issue::new(statement.line, message));
                continue;
            }
        };
        trace!(line = statement.line, outcome = %outcome, "replayed probe");

        if let Some(expected) = &probe.expectation {
            report.compared += 1;
            let actual = outcome.to_string();
            if &actual != expected {
                report.failures.push(Issue::new(
                    statement.line,
                    format!("expected {:?}, evaluated {:?}", expected, actual),
                ));
            }
        }
    }

    debug!(
        probes = report.probes,
        compared = report.compared,
        failures = report.failures.len(),
        "replayed scenarios"
    );
    report
}
