//! Typed statements lowered from the parse tree.
//!
//! Type and operator names stay as written; resolving them against the type
//! lattice is left to the caller, so a script naming an unknown type still
//! parses and can be reported on.

use crate::{parse, Rule};
use pest::iterators::Pair;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AstError {
    #[error("{0}")]
    Grammar(#[from] Box<pest::error::Error<Rule>>),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line}: unexpected {found} while reading {context}")]
    Unexpected {
        line: usize,
        found: String,
        context: &'static str,
    },
}

pub type AstResult<T> = Result<T, AstError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub name: String,
    pub arguments: Vec<String>,
    pub returns: String,
    pub strict: bool,
    pub language: Option<String>,
    pub library: String,
    pub symbol: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorDecl {
    pub symbol: String,
    pub left: Option<String>,
    pub right: Option<String>,
    pub procedure: Option<String>,
    pub commutator: Option<String>,
    pub negator: Option<String>,
}

/// `'3'::uint1` or a bare integer, which the host reads as `int4`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiteralText {
    pub text: String,
    pub type_name: Option<String>,
}

impl LiteralText {
    pub fn type_name_or_default(&self) -> &str {
        self.type_name.as_deref().unwrap_or("int4")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Probe {
    pub type_probe: bool,
    pub operator: String,
    pub left: Option<LiteralText>,
    pub right: LiteralText,
    /// Text after `-->`, trimmed.
    pub expectation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatementKind {
    CreateFunction(FunctionDecl),
    CreateOperator(OperatorDecl),
    Select(Probe),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    pub line: usize,
    pub kind: StatementKind,
}

pub fn parse_script(input: &str) -> AstResult<Vec<Statement>> {
    let mut statements = Vec::new();
    for pair in parse(input)? {
        if pair.as_rule() != Rule::script {
            continue;
        }
        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::EOI => {}
                _ => statements.push(lower_statement(inner)?),
            }
        }
    }
    Ok(statements)
}

fn lower_statement(pair: Pair<Rule>) -> AstResult<Statement> {
    let line = pair.line_col().0;
    let kind = match pair.as_rule() {
        Rule::create_function => StatementKind::CreateFunction(lower_function(pair)?),
        Rule::create_operator => StatementKind::CreateOperator(lower_operator(pair)?),
        Rule::select => StatementKind::Select(lower_select(pair)?),
        _ => return Err(unexpected(&pair, "a statement")),
    };
    Ok(Statement { line, kind })
}

fn unexpected(pair: &Pair<Rule>, context: &'static str) -> AstError {
    AstError::Unexpected {
        line: pair.line_col().0,
        found: format!("{:?}", pair.as_rule()),
        context,
    }
}

fn string_value(pair: Pair<Rule>) -> String {
    pair.into_inner()
        .next()
        .map(|inner| inner.as_str().to_string())
        .unwrap_or_default()
}

fn lower_function(pair: Pair<Rule>) -> AstResult<FunctionDecl> {
    let mut identifiers = Vec::new();
    let mut strings = Vec::new();
    let mut arguments = Vec::new();
    let mut strict = false;
    let mut language = None;

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::identifier => identifiers.push(inner.as_str().to_string()),
            Rule::type_list => {
                arguments = inner
                    .into_inner()
                    .map(|ty| ty.as_str().to_string())
                    .collect();
            }
            Rule::function_option => {
                for option in inner.into_inner() {
                    match option.as_rule() {
                        Rule::strict => strict = true,
                        Rule::language => {
                            language = option.into_inner().next().map(|l| l.as_str().to_string());
                        }
                        _ => {}
                    }
                }
            }
            Rule::string => strings.push(string_value(inner)),
            _ => return Err(unexpected(&inner, "CREATE FUNCTION")),
        }
    }

    let mut identifiers = identifiers.into_iter();
    let mut strings = strings.into_iter();
    Ok(FunctionDecl {
        name: identifiers.next().unwrap_or_default(),
        returns: identifiers.next().unwrap_or_default(),
        arguments,
        strict,
        language,
        library: strings.next().unwrap_or_default(),
        symbol: strings.next().unwrap_or_default(),
    })
}

fn lower_operator(pair: Pair<Rule>) -> AstResult<OperatorDecl> {
    let mut decl = OperatorDecl {
        symbol: String::new(),
        left: None,
        right: None,
        procedure: None,
        commutator: None,
        negator: None,
    };

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::operator_symbol => decl.symbol = inner.as_str().to_string(),
            Rule::operator_clause => {
                let mut parts = inner.into_inner();
                let (key, value) = match (parts.next(), parts.next()) {
                    (Some(key), Some(value)) => (key, value),
                    _ => continue,
                };
                let value = Some(value.as_str().to_string());
                match key.as_str().to_ascii_uppercase().as_str() {
                    "LEFTARG" => decl.left = value,
                    "RIGHTARG" => decl.right = value,
                    "PROCEDURE" => decl.procedure = value,
                    "COMMUTATOR" => decl.commutator = value,
                    "NEGATOR" => decl.negator = value,
                    _ => return Err(unexpected(&key, "CREATE OPERATOR")),
                }
            }
            _ => return Err(unexpected(&inner, "CREATE OPERATOR")),
        }
    }
    Ok(decl)
}

fn lower_select(pair: Pair<Rule>) -> AstResult<Probe> {
    let mut type_probe = false;
    let mut expression = None;
    let mut expectation = None;

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::type_probe => {
                type_probe = true;
                expression = inner.into_inner().next();
            }
            Rule::expression => expression = Some(inner),
            Rule::expectation => {
                expectation = inner
                    .into_inner()
                    .next()
                    .map(|text| text.as_str().trim().to_string());
            }
            _ => return Err(unexpected(&inner, "SELECT")),
        }
    }

    let expression = expression.ok_or_else(|| AstError::Unexpected {
        line: 0,
        found: "nothing".to_string(),
        context: "SELECT",
    })?;
    let (operator, left, right) = lower_expression(expression)?;
    Ok(Probe {
        type_probe,
        operator,
        left,
        right,
        expectation,
    })
}

fn lower_expression(pair: Pair<Rule>) -> AstResult<(String, Option<LiteralText>, LiteralText)> {
    let shape = pair
        .into_inner()
        .next()
        .ok_or_else(|| AstError::Unexpected {
            line: 0,
            found: "nothing".to_string(),
            context: "an expression",
        })?;
    let line = shape.line_col().0;
    let rule = shape.as_rule();

    let mut operator = None;
    let mut operands = Vec::new();
    for inner in shape.into_inner() {
        match inner.as_rule() {
            Rule::operator_symbol => operator = Some(inner.as_str().to_string()),
            Rule::operand => operands.push(lower_operand(inner)?),
            _ => return Err(unexpected(&inner, "an expression")),
        }
    }

    let missing = |context| AstError::Unexpected {
        line,
        found: "end of expression".to_string(),
        context,
    };
    let operator = operator.ok_or_else(|| missing("an operator"))?;
    let right = operands.pop().ok_or_else(|| missing("an operand"))?;
    let left = match rule {
        Rule::binary_expression => Some(operands.pop().ok_or_else(|| missing("an operand"))?),
        _ => None,
    };
    Ok((operator, left, right))
}

fn lower_operand(pair: Pair<Rule>) -> AstResult<LiteralText> {
    let inner = pair
        .into_inner()
        .next()
        .ok_or_else(|| AstError::Unexpected {
            line: 0,
            found: "nothing".to_string(),
            context: "an operand",
        })?;
    match inner.as_rule() {
        Rule::integer => Ok(LiteralText {
            text: inner.as_str().to_string(),
            type_name: None,
        }),
        Rule::typed_literal => {
            let mut parts = inner.into_inner();
            let text = parts.next().map(string_value).unwrap_or_default();
            let type_name = parts.next().map(|ty| ty.as_str().to_string());
            Ok(LiteralText { text, type_name })
        }
        _ => Err(unexpected(&inner, "an operand")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_lower_function() {
        let statements = parse_script(
            "CREATE FUNCTION uint1int2pl(uint1, int2) RETURNS int2 IMMUTABLE STRICT LANGUAGE C AS '$libdir/uint', 'uint1int2pl';",
        )
        .unwrap();
        assert_eq!(
            statements,
            vec![Statement {
                line: 1,
                kind: StatementKind::CreateFunction(FunctionDecl {
                    name: "uint1int2pl".to_string(),
                    arguments: vec!["uint1".to_string(), "int2".to_string()],
                    returns: "int2".to_string(),
                    strict: true,
                    language: Some("C".to_string()),
                    library: "$libdir/uint".to_string(),
                    symbol: "uint1int2pl".to_string(),
                }),
            }]
        );
    }

    #[test]
    fn test_lower_operator() {
        let statements = parse_script(
            "CREATE OPERATOR <= (\n    LEFTARG = uint4,\n    RIGHTARG = int1,\n    PROCEDURE = uint4int1le,\n    COMMUTATOR = >=,\n    NEGATOR = >\n);",
        )
        .unwrap();
        match &statements[0].kind {
            StatementKind::CreateOperator(decl) => {
                assert_eq!(decl.symbol, "<=");
                assert_eq!(decl.left.as_deref(), Some("uint4"));
                assert_eq!(decl.right.as_deref(), Some("int1"));
                assert_eq!(decl.procedure.as_deref(), Some("uint4int1le"));
                assert_eq!(decl.commutator.as_deref(), Some(">="));
                assert_eq!(decl.negator.as_deref(), Some(">"));
            }
            other => panic!("expected an operator, got {:?}", other),
        }
    }

    #[test]
    fn test_lower_probes() {
        let script = "\
-- scenarios
SELECT pg_typeof('1'::uint1 + '1'::int2); --> int2
SELECT '255'::uint1 * '2'::uint1; --> ERROR:  integer out of range
SELECT ~ '6'::uint1;
SELECT '6'::int1 >> 3;
";
        let statements = parse_script(script).unwrap();
        assert_eq!(statements.len(), 4);

        let probes: Vec<&Probe> = statements
            .iter()
            .filter_map(|s| match &s.kind {
                StatementKind::Select(probe) => Some(probe),
                _ => None,
            })
            .collect();

        assert!(probes[0].type_probe);
        assert_eq!(probes[0].expectation.as_deref(), Some("int2"));
        assert_eq!(
            probes[1].expectation.as_deref(),
            Some("ERROR:  integer out of range")
        );
        assert_eq!(statements[1].line, 3);

        assert_eq!(probes[2].operator, "~");
        assert_eq!(probes[2].left, None);
        assert_eq!(probes[2].expectation, None);

        assert_eq!(probes[3].operator, ">>");
        assert_eq!(probes[3].right.type_name, None);
        assert_eq!(probes[3].right.type_name_or_default(), "int4");
        assert_eq!(probes[3].right.text, "3");
    }

    #[test]
    fn test_literal_text_is_kept_verbatim() {
        let statements = parse_script("SELECT ' 7 '::uint2 - '-1'::int1;").unwrap();
        match &statements[0].kind {
            StatementKind::Select(probe) => {
                let left = probe.left.as_ref().unwrap();
                assert_eq!(left.text, " 7 ");
                assert_eq!(probe.right.text, "-1");
                assert_eq!(probe.right.type_name.as_deref(), Some("int1"));
            }
            other => panic!("expected a probe, got {:?}", other),
        }
    }

    #[test]
    fn test_syntax_error_is_grammar_error() {
        let err = parse_script("SELECT '1'::uint1 +;").unwrap_err();
        assert!(matches!(err, AstError::Grammar(_)));
    }
}
