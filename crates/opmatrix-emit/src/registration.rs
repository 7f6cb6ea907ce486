use crate::config::EmitterConfig;
use crate::emitter::{section_title, CommentStyle, EmitContext, EmitHelper, EmitResult, Emitter};
use opmatrix_core::OperatorDefinition;
use std::io::Write;

/// `CREATE FUNCTION` / `CREATE OPERATOR` pairs binding each operator symbol
/// to its native function.
pub struct RegistrationEmitter {
    config: EmitterConfig,
}

impl RegistrationEmitter {
    pub fn new(config: EmitterConfig) -> Self {
        Self { config }
    }

    pub fn emit_definition<W: Write>(
        &self,
        def: &OperatorDefinition,
        writer: &mut W,
        context: &mut EmitContext,
    ) -> EmitResult {
        let name = def.function_name();
        let arguments: Vec<&str> = def.argument_types().iter().map(|ty| ty.name()).collect();

        writeln!(writer)?;
        EmitHelper::write_line(
            writer,
            context,
            &format!(
                "CREATE FUNCTION {}({}) RETURNS {} IMMUTABLE STRICT LANGUAGE C AS '$libdir/{}', '{}';",
                name,
                arguments.join(", "),
                def.result_type,
                self.config.module_name,
                name
            ),
        )?;
        writeln!(writer)?;

        let mut clauses = Vec::new();
        if let Some(left) = def.left_type {
            clauses.push(format!("LEFTARG = {}", left));
        }
        clauses.push(format!("RIGHTARG = {}", def.right_type));
        clauses.push(format!("PROCEDURE = {}", name));
        if self.config.emit_commutators {
            if let Some(commutator) = def.operator.commutator() {
                clauses.push(format!("COMMUTATOR = {}", commutator));
            }
            if let Some(negator) = def.operator.negator() {
                clauses.push(format!("NEGATOR = {}", negator));
            }
        }

        EmitHelper::write_line(writer, context, &format!("CREATE OPERATOR {} (", def.operator))?;
        let body = context.nested();
        let last = clauses.len() - 1;
        for (index, clause) in clauses.iter().enumerate() {
            let separator = if index == last { "" } else { "," };
            EmitHelper::write_line(writer, &body, &format!("{}{}", clause, separator))?;
        }
        EmitHelper::write_line(writer, context, ");")
    }
}

impl Emitter for RegistrationEmitter {
    type Item = [OperatorDefinition];

    fn emit<W: Write>(
        &self,
        definitions: &[OperatorDefinition],
        writer: &mut W,
        context: &mut EmitContext,
    ) -> EmitResult {
        EmitHelper::write_comment(
            writer,
            context,
            &format!("operators of module {}", self.config.module_name),
        )?;
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

    /// SQL bodies are always indented with four spaces.
    fn context(&self) -> EmitContext {
        let mut context = EmitContext::from_config(&self.config, CommentStyle::Sql);
        context.indent_chars = "    ".to_string();
        context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opmatrix_core::{IntegerType, Operator};
    use pretty_assertions::assert_eq;

    fn render(config: EmitterConfig, def: &OperatorDefinition) -> String {
        let emitter = RegistrationEmitter::new(config);
        let mut buffer = Vec::new();
        let mut context = emitter.context();
        emitter.emit_definition(def, &mut buffer, &mut context).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_comparison_registration() {
        let def =
            OperatorDefinition::derive(Operator::Lt, Some(IntegerType::Uint1), IntegerType::Int2)
                .unwrap();
        let expected = "
CREATE FUNCTION uint1int2lt(uint1, int2) RETURNS boolean IMMUTABLE STRICT LANGUAGE C AS '$libdir/uint', 'uint1int2lt';

CREATE OPERATOR < (
    LEFTARG = uint1,
    RIGHTARG = int2,
    PROCEDURE = uint1int2lt,
    COMMUTATOR = >,
    NEGATOR = >=
);
";
        assert_eq!(render(EmitterConfig::default(), &def), expected);
    }

    #[test]
    fn test_prefix_operator_has_no_leftarg() {
        let def = OperatorDefinition::derive(Operator::BitNot, None, IntegerType::Uint8).unwrap();
        let output = render(EmitterConfig::default(), &def);
        assert!(output.contains("CREATE FUNCTION uint8not(uint8) RETURNS uint8"));
        assert!(output.contains("CREATE OPERATOR ~ (\n    RIGHTARG = uint8,\n    PROCEDURE = uint8not\n);"));
    }

    #[test]
    fn test_commutators_can_be_disabled() {
        let def =
            OperatorDefinition::derive(Operator::Add, Some(IntegerType::Int1), IntegerType::Int4)
                .unwrap();
        let config = EmitterConfig {
            emit_commutators: false,
            module_name: "tinyint".to_string(),
            ..EmitterConfig::default()
        };
        let output = render(config, &def);
        assert!(output.contains("AS '$libdir/tinyint', 'int1int4pl';"));
        assert!(output.contains("    PROCEDURE = int1int4pl\n);"));
        assert!(!output.contains("COMMUTATOR"));
    }

    #[test]
    fn test_subtraction_has_no_commutator() {
        let def =
            OperatorDefinition::derive(Operator::Sub, Some(IntegerType::Uint2), IntegerType::Uint2)
                .unwrap();
        let output = render(EmitterConfig::default(), &def);
        assert!(!output.contains("COMMUTATOR"));
        assert!(!output.contains("NEGATOR"));
    }
}
