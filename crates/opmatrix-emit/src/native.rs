//! PostgreSQL V1 C functions, one per operator definition.
//!
//! Arithmetic operands are read into variables of the result type, so the
//! overflow predicate sees exactly the widened values it was synthesized for.
//! The generated code assumes two's-complement wrapping on signed overflow
//! (`-fwrapv`), as PostgreSQL itself is built.

use crate::config::EmitterConfig;
use crate::emitter::{section_title, CommentStyle, EmitContext, EmitHelper, EmitResult, Emitter};
use opmatrix_core::{
    Expr, IntegerType, Operand, Operator, OperatorClass, OperatorDefinition, ResultType, Term,
};
use std::io::Write;

const OUT_OF_RANGE: (&str, &str) = ("ERRCODE_NUMERIC_VALUE_OUT_OF_RANGE", "integer out of range");
const DIVISION_BY_ZERO: (&str, &str) = ("ERRCODE_DIVISION_BY_ZERO", "division by zero");

pub fn c_type(ty: IntegerType) -> &'static str {
    match ty {
        IntegerType::Int1 => "int8",
        IntegerType::Uint1 => "uint8",
        IntegerType::Uint2 => "uint16",
        IntegerType::Uint4 => "uint32",
        IntegerType::Uint8 => "uint64",
        IntegerType::Int2 => "int16",
        IntegerType::Int4 => "int32",
        IntegerType::Int8 => "int64",
    }
}

fn c_result_type(result: ResultType) -> &'static str {
    match result {
        ResultType::Boolean => "bool",
        ResultType::Integer(ty) => c_type(ty),
    }
}

fn unsigned_c_type(ty: IntegerType) -> String {
    format!("uint{}", ty.bit_width())
}

fn getarg(ty: IntegerType, index: usize) -> String {
    format!("PG_GETARG_{}({})", c_type(ty).to_uppercase(), index)
}

fn pg_return(result: ResultType, value: &str) -> String {
    format!("PG_RETURN_{}({});", c_result_type(result).to_uppercase(), value)
}

/// Render `expr` as a C condition over `arg1`, `arg2` and `result`.
pub fn c_expr(expr: &Expr) -> String {
    match expr {
        Expr::Compare(op, lhs, rhs) => format!("{} {} {}", c_term(lhs), op.symbol(), c_term(rhs)),
        Expr::SameSign(lhs, rhs) => format!("SAMESIGN({}, {})", lhs, rhs),
        Expr::Not(inner) => match inner.as_ref() {
            Expr::SameSign(..) | Expr::Not(_) => format!("!{}", c_expr(inner)),
            _ => format!("!({})", c_expr(inner)),
        },
        Expr::And(lhs, rhs) => format!(
            "{} && {}",
            c_junction_child(lhs, true),
            c_junction_child(rhs, true)
        ),
        Expr::Or(lhs, rhs) => format!(
            "{} || {}",
            c_junction_child(lhs, false),
            c_junction_child(rhs, false)
        ),
    }
}

fn c_junction_child(child: &Expr, parent_is_and: bool) -> String {
    match child {
        Expr::And(..) if !parent_is_and => format!("({})", c_expr(child)),
        Expr::Or(..) if parent_is_and => format!("({})", c_expr(child)),
        _ => c_expr(child),
    }
}

fn c_term(term: &Term) -> String {
    match term {
        Term::Operand(operand) => operand.name().to_string(),
        Term::Literal(value) => value.to_string(),
        Term::Cast(ty, operand) => format!("({}) {}", c_type(*ty), operand),
        Term::Quotient(lhs, rhs) => format!("{} / {}", lhs, rhs),
    }
}

/// Comparison between mixed-signedness operands that C's usual arithmetic
/// conversions would get wrong: a signed value against an unsigned one at
/// least 32 bits wide and no narrower than it.
fn sign_safe_comparison(op: Operator, left: IntegerType, right: IntegerType) -> Option<String> {
    let symbol = c_operator(op);
    let (signed, unsigned, signed_is_left) = match (left.is_signed(), right.is_signed()) {
        (true, false) => (left, right, true),
        (false, true) => (right, left, false),
        _ => return None,
    };
    if unsigned.bit_width() < 32 || signed.bit_width() > unsigned.bit_width() {
        return None;
    }

    let cast = c_type(unsigned);
    let (compare, negative_holds) = if signed_is_left {
        (
            format!("({}) arg1 {} arg2", cast, symbol),
            matches!(op, Operator::Lt | Operator::Le | Operator::Ne),
        )
    } else {
        (
            format!("arg1 {} ({}) arg2", symbol, cast),
            matches!(op, Operator::Gt | Operator::Ge | Operator::Ne),
        )
    };
    let signed_operand = if signed_is_left { "arg1" } else { "arg2" };

    Some(if negative_holds {
        format!("{} < 0 || {}", signed_operand, compare)
    } else {
        format!("{} >= 0 && {}", signed_operand, compare)
    })
}

fn c_operator(op: Operator) -> &'static str {
    match op {
        Operator::Eq => "==",
        Operator::Ne => "!=",
        Operator::BitXor => "^",
        _ => op.symbol(),
    }
}

pub struct NativeEmitter {
    config: EmitterConfig,
}

impl NativeEmitter {
    pub fn new(config: EmitterConfig) -> Self {
        Self { config }
    }

    pub fn emit_prologue<W: Write>(&self, writer: &mut W) -> EmitResult {
        writeln!(writer, "#include <postgres.h>")?;
        writeln!(writer, "#include <fmgr.h>")?;
        writeln!(writer)?;
        if let Some(header) = &self.config.header {
            writeln!(writer, "#include \"{}\"", header)?;
            writeln!(writer)?;
        }
        writeln!(writer, "#ifndef SAMESIGN")?;
        writeln!(writer, "#define SAMESIGN(a,b)\t(((a) < 0) == ((b) < 0))")?;
        writeln!(writer, "#endif")?;
        Ok(())
    }

    pub fn emit_definition<W: Write>(
        &self,
        def: &OperatorDefinition,
        writer: &mut W,
        context: &mut EmitContext,
    ) -> EmitResult {
        let name = def.function_name();

        writeln!(writer)?;
        if self.config.verbosity.should_print_signatures() {
            EmitHelper::write_comment(writer, context, &def.to_string())?;
        }
        if self.config.verbosity.should_print_predicates() {
            if let Some(predicate) = &def.overflow_predicate {
                EmitHelper::write_comment(writer, context, &format!("overflow: {}", predicate))?;
            }
        }
        EmitHelper::write_line(writer, context, &format!("PG_FUNCTION_INFO_V1({});", name))?;
        EmitHelper::write_line(writer, context, "Datum")?;
        EmitHelper::write_block(
            writer,
            context,
            &format!("{}(PG_FUNCTION_ARGS)", name),
            |w, ctx| match def.operator.class() {
                OperatorClass::Comparison => self.comparison_body(def, w, ctx),
                OperatorClass::Arithmetic => self.arithmetic_body(def, w, ctx),
                OperatorClass::Bitwise | OperatorClass::Unary => self.bitwise_body(def, w, ctx),
                OperatorClass::Shift => self.shift_body(def, w, ctx),
            },
        )
    }

    fn read_arguments<W: Write>(
        &self,
        def: &OperatorDefinition,
        writer: &mut W,
        context: &EmitContext,
    ) -> EmitResult {
        for (index, ty) in def.argument_types().into_iter().enumerate() {
            let line = format!("{} arg{} = {};", c_type(ty), index + 1, getarg(ty, index));
            EmitHelper::write_line(writer, context, &line)?;
        }
        Ok(())
    }

    fn comparison_body<W: Write>(
        &self,
        def: &OperatorDefinition,
        writer: &mut W,
        context: &mut EmitContext,
    ) -> EmitResult {
        self.read_arguments(def, writer, context)?;
        let condition = def
            .left_type
            .and_then(|left| sign_safe_comparison(def.operator, left, def.right_type))
            .unwrap_or_else(|| format!("arg1 {} arg2", c_operator(def.operator)));
        EmitHelper::write_line(writer, context, &format!("bool result = {};", condition))?;
        EmitHelper::write_line(writer, context, "")?;
        EmitHelper::write_line(writer, context, &pg_return(def.result_type, "result"))
    }

    fn arithmetic_body<W: Write>(
        &self,
        def: &OperatorDefinition,
        writer: &mut W,
        context: &mut EmitContext,
    ) -> EmitResult {
        let target = integer_result(def)?;
        let work = c_type(target);
        let operands = [(Operand::Arg1, def.left_type), (Operand::Arg2, Some(def.right_type))];

        for (index, (operand, declared)) in operands.iter().enumerate() {
            let declared = declared.ok_or_else(|| malformed(def))?;
            let line = if def.is_guarded(*operand) {
                format!("{} raw_{} = {};", c_type(declared), operand, getarg(declared, index))
            } else {
                format!("{} {} = {};", work, operand, getarg(declared, index))
            };
            EmitHelper::write_line(writer, context, &line)?;
        }
        for guarded in &def.sign_guards {
            EmitHelper::write_line(writer, context, &format!("{} {};", work, guarded))?;
        }
        let result_c_type = def.intermediate_type.map(c_type).unwrap_or(work);
        EmitHelper::write_line(writer, context, &format!("{} result;", result_c_type))?;
        EmitHelper::write_line(writer, context, "")?;

        for guarded in &def.sign_guards {
            let raw = format!("raw_{}", guarded);
            self.raise_if(writer, context, &format!("{} < 0", raw), OUT_OF_RANGE)?;
            EmitHelper::write_line(writer, context, &format!("{} = ({}) {};", guarded, work, raw))?;
        }

        let symbol = c_operator(def.operator);
        match def.operator {
            Operator::Div | Operator::Mod => {
                self.raise_if(writer, context, "arg2 == 0", DIVISION_BY_ZERO)?;
                if target.is_signed() {
                    if def.operator == Operator::Div {
                        let condition = format!("arg2 == -1 && arg1 == PG_INT{}_MIN", target.bit_width());
                        self.raise_if(writer, context, &condition, OUT_OF_RANGE)?;
                    } else {
                        EmitHelper::write_line(writer, context, "if (arg2 == -1)")?;
                        EmitHelper::write_line(
                            writer,
                            &context.nested(),
                            &pg_return(def.result_type, "0"),
                        )?;
                    }
                }
                EmitHelper::write_line(writer, context, &format!("result = arg1 {} arg2;", symbol))?;
            }
            _ => {
                let statement = match def.intermediate_type {
                    Some(wide) => format!(
                        "result = ({wide}) arg1 {symbol} ({wide}) arg2;",
                        wide = c_type(wide),
                        symbol = symbol
                    ),
                    None => format!("result = arg1 {} arg2;", symbol),
                };
                EmitHelper::write_line(writer, context, &statement)?;
                if let Some(predicate) = &def.overflow_predicate {
                    self.raise_if(writer, context, &c_expr(predicate), OUT_OF_RANGE)?;
                }
            }
        }

        EmitHelper::write_line(writer, context, "")?;
        let value = match def.intermediate_type {
            Some(_) => format!("({}) result", work),
            None => "result".to_string(),
        };
        EmitHelper::write_line(writer, context, &pg_return(def.result_type, &value))
    }

    fn bitwise_body<W: Write>(
        &self,
        def: &OperatorDefinition,
        writer: &mut W,
        context: &mut EmitContext,
    ) -> EmitResult {
        let target = integer_result(def)?;
        self.read_arguments(def, writer, context)?;
        let expression = match def.left_type {
            Some(_) => format!("arg1 {} arg2", c_operator(def.operator)),
            None => "~arg1".to_string(),
        };
        EmitHelper::write_line(
            writer,
            context,
            &format!("{} result = {};", c_type(target), expression),
        )?;
        EmitHelper::write_line(writer, context, "")?;
        EmitHelper::write_line(writer, context, &pg_return(def.result_type, "result"))
    }

    fn shift_body<W: Write>(
        &self,
        def: &OperatorDefinition,
        writer: &mut W,
        context: &mut EmitContext,
    ) -> EmitResult {
        let target = integer_result(def)?;
        let work = c_type(target);
        self.read_arguments(def, writer, context)?;
        EmitHelper::write_line(writer, context, &format!("{} result;", work))?;
        EmitHelper::write_line(writer, context, "")?;

        self.raise_if(writer, context, "arg2 < 0", OUT_OF_RANGE)?;
        let (saturated, shifted) = match (def.operator, target.is_signed()) {
            (Operator::Shl, true) => (
                "0".to_string(),
                format!("({}) (({}) arg1 << arg2)", work, unsigned_c_type(target)),
            ),
            (Operator::Shl, false) => ("0".to_string(), "arg1 << arg2".to_string()),
            (_, true) => ("arg1 < 0 ? -1 : 0".to_string(), "arg1 >> arg2".to_string()),
            (_, false) => ("0".to_string(), "arg1 >> arg2".to_string()),
        };
        let nested = context.nested();
        EmitHelper::write_line(writer, context, &format!("if (arg2 >= {})", target.bit_width()))?;
        EmitHelper::write_line(writer, &nested, &format!("result = {};", saturated))?;
        EmitHelper::write_line(writer, context, "else")?;
        EmitHelper::write_line(writer, &nested, &format!("result = {};", shifted))?;
        EmitHelper::write_line(writer, context, "")?;
        EmitHelper::write_line(writer, context, &pg_return(def.result_type, "result"))
    }

    fn raise_if<W: Write>(
        &self,
        writer: &mut W,
        context: &EmitContext,
        condition: &str,
        (errcode, message): (&str, &str),
    ) -> EmitResult {
        let body = context.nested();
        let detail = body.nested();
        EmitHelper::write_line(writer, context, &format!("if ({})", condition))?;
        EmitHelper::write_line(writer, &body, "ereport(ERROR,")?;
        EmitHelper::write_line(writer, &detail, &format!("(errcode({}),", errcode))?;
        EmitHelper::write_line(writer, &detail, &format!(" errmsg(\"{}\")));", message))
    }
}

fn integer_result(def: &OperatorDefinition) -> anyhow::Result<IntegerType> {
    def.result_type.as_integer().ok_or_else(|| malformed(def))
}

fn malformed(def: &OperatorDefinition) -> anyhow::Error {
    anyhow::anyhow!("cannot render {} as a native function", def)
}

impl Emitter for NativeEmitter {
    type Item = [OperatorDefinition];

    fn emit<W: Write>(
        &self,
        definitions: &[OperatorDefinition],
        writer: &mut W,
        context: &mut EmitContext,
    ) -> EmitResult {
        self.emit_prologue(writer)?;
        let mut current_section = None;
        for def in definitions {
            let title = section_title(def);
            if self.config.verbosity.should_print_sections()
                && current_section.as_ref() != Some(&title)
            {
                EmitHelper::write_section(writer, context, &title)?;
            }
            current_section = Some(title);
            self.emit_definition(def, writer, context)?;
        }
        Ok(())
    }

    fn context(&self) -> EmitContext {
        EmitContext::from_config(&self.config, CommentStyle::C)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opmatrix_core::IntegerType::*;

    fn render(op: Operator, left: Option<IntegerType>, right: IntegerType) -> String {
        let def = OperatorDefinition::derive(op, left, right).unwrap();
        let emitter = NativeEmitter::new(EmitterConfig {
            use_colors: false,
            ..EmitterConfig::default()
        });
        let mut buffer = Vec::new();
        let mut context = emitter.context();
        emitter.emit_definition(&def, &mut buffer, &mut context).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_c_types_follow_byte_width() {
        assert_eq!(c_type(Int1), "int8");
        assert_eq!(c_type(Uint8), "uint64");
        assert_eq!(c_type(Int8), "int64");
        assert_eq!(getarg(Uint2, 1), "PG_GETARG_UINT16(1)");
    }

    #[test]
    fn test_c_expr_uses_c_casts() {
        let def = OperatorDefinition::derive(Operator::Mul, Some(Uint8), Uint8).unwrap();
        assert_eq!(
            c_expr(def.overflow_predicate.as_ref().unwrap()),
            "(arg1 != (uint32) arg1 || arg2 != (uint32) arg2) && arg2 != 0 && result / arg2 != arg1"
        );
    }

    #[test]
    fn test_unsigned_addition_function() {
        let expected = "
PG_FUNCTION_INFO_V1(uint1uint1pl);
Datum
uint1uint1pl(PG_FUNCTION_ARGS)
{
\tuint8 arg1 = PG_GETARG_UINT8(0);
\tuint8 arg2 = PG_GETARG_UINT8(1);
\tuint8 result;

\tresult = arg1 + arg2;
\tif (result < arg1 || result < arg2)
\t\tereport(ERROR,
\t\t\t(errcode(ERRCODE_NUMERIC_VALUE_OUT_OF_RANGE),
\t\t\t errmsg(\"integer out of range\")));

\tPG_RETURN_UINT8(result);
}
";
        assert_eq!(render(Operator::Add, Some(Uint1), Uint1), expected);
    }

    #[test]
    fn test_guarded_operand_reads_raw_value() {
        let output = render(Operator::Add, Some(Int1), Uint1);
        assert!(output.contains("\tint8 raw_arg1 = PG_GETARG_INT8(0);\n"));
        assert!(output.contains("\tuint8 arg1;\n"));
        assert!(output.contains("\tif (raw_arg1 < 0)\n"));
        assert!(output.contains("\targ1 = (uint8) raw_arg1;\n"));
    }

    #[test]
    fn test_multiplication_uses_intermediate() {
        let output = render(Operator::Mul, Some(Uint1), Uint1);
        assert!(output.contains("\tuint16 result;\n"));
        assert!(output.contains("\tresult = (uint16) arg1 * (uint16) arg2;\n"));
        assert!(output.contains("\tif ((uint8) result != result)\n"));
        assert!(output.contains("\tPG_RETURN_UINT8((uint8) result);\n"));
    }

    #[test]
    fn test_signed_division_guards() {
        let output = render(Operator::Div, Some(Int1), Int1);
        assert!(output.contains("\tif (arg2 == 0)\n"));
        assert!(output.contains("ERRCODE_DIVISION_BY_ZERO"));
        assert!(output.contains("\tif (arg2 == -1 && arg1 == PG_INT8_MIN)\n"));

        let output = render(Operator::Mod, Some(Int2), Uint1);
        assert!(output.contains("\tif (arg2 == -1)\n\t\tPG_RETURN_INT16(0);\n"));
    }

    #[test]
    fn test_sign_safe_comparison() {
        let output = render(Operator::Lt, Some(Int1), Uint8);
        assert!(output.contains("\tbool result = arg1 < 0 || (uint64) arg1 < arg2;\n"));

        let output = render(Operator::Eq, Some(Uint4), Int4);
        assert!(output.contains("\tbool result = arg2 >= 0 && arg1 == (uint32) arg2;\n"));

        let output = render(Operator::Gt, Some(Uint1), Int2);
        assert!(output.contains("\tbool result = arg1 > arg2;\n"));
    }

    #[test]
    fn test_complement_and_shift() {
        let output = render(Operator::BitNot, None, Uint2);
        assert!(output.contains("\tuint16 arg1 = PG_GETARG_UINT16(0);\n"));
        assert!(output.contains("\tuint16 result = ~arg1;\n"));

        let output = render(Operator::Shl, Some(Int1), Int4);
        assert!(output.contains("\tint32 arg2 = PG_GETARG_INT32(1);\n"));
        assert!(output.contains("\tif (arg2 >= 8)\n\t\tresult = 0;\n"));
        assert!(output.contains("\t\tresult = (int8) ((uint8) arg1 << arg2);\n"));
    }

    #[test]
    fn test_prologue_includes_header() {
        let emitter = NativeEmitter::new(EmitterConfig::default());
        let mut buffer = Vec::new();
        emitter.emit_prologue(&mut buffer).unwrap();
        let output = String::from_utf8(buffer).unwrap();
        assert!(output.starts_with("#include <postgres.h>\n#include <fmgr.h>\n"));
        assert!(output.contains("#include \"uint.h\""));
        assert!(output.contains("#define SAMESIGN(a,b)"));
    }
}
