use crate::config::EmitterConfig;
use crate::emitter::{section_title, CommentStyle, EmitContext, EmitHelper, EmitResult, Emitter};
use opmatrix_core::{
    literal_pair_scenarios, scenarios_for, DefinitionKey, IntegerType, Literal, OperatorClass,
    OperatorDefinition, Probe, Scenario, TypeFamily,
};
use std::collections::{HashMap, HashSet};
use std::io::Write;

/// Marker separating a scenario statement from its expected output.
pub const EXPECTATION_MARKER: &str = "-->";

/// Regression script exercising every definition with literal operands.
pub struct ScenarioEmitter {
    config: EmitterConfig,
}

/// `'3'::uint1`, or a bare integer for an untyped literal.
pub fn render_literal(literal: &Literal) -> String {
    if literal.untyped {
        literal.value.to_string()
    } else {
        format!("'{}'::{}", literal.value, literal.ty)
    }
}

pub fn render_statement(scenario: &Scenario) -> String {
    let right = render_literal(&scenario.right);
    let expression = match &scenario.left {
        Some(left) => format!("{} {} {}", render_literal(left), scenario.operator, right),
        None => format!("{} {}", scenario.operator, right),
    };
    match scenario.probe {
        Probe::Value => format!("SELECT {};", expression),
        Probe::ResultType => format!("SELECT pg_typeof({});", expression),
    }
}

impl ScenarioEmitter {
    pub fn new(config: EmitterConfig) -> Self {
        Self { config }
    }

    fn write_scenario<W: Write>(
        &self,
        scenario: &Scenario,
        def: &OperatorDefinition,
        writer: &mut W,
        context: &EmitContext,
    ) -> EmitResult {
        let mut line = render_statement(scenario);
        if self.config.annotate_expected {
            line = format!("{} {} {}", line, EXPECTATION_MARKER, scenario.expected(def));
        }
        EmitHelper::write_line(writer, context, &line)
    }

    pub fn emit_definition<W: Write>(
        &self,
        def: &OperatorDefinition,
        writer: &mut W,
        context: &mut EmitContext,
    ) -> EmitResult {
        for scenario in scenarios_for(def) {
            self.write_scenario(&scenario, def, writer, context)?;
        }
        Ok(())
    }

    /// Untyped-literal lines for `ty`. Lines whose definition is not among
    /// `definitions` are left out, so a restricted matrix writes fewer.
    pub fn emit_literal_pairs<W: Write>(
        &self,
        ty: IntegerType,
        definitions: &HashMap<DefinitionKey, &OperatorDefinition>,
        writer: &mut W,
        context: &mut EmitContext,
    ) -> EmitResult {
        let lines: Vec<(Scenario, &OperatorDefinition)> = literal_pair_scenarios(ty)
            .filter_map(|scenario| {
                let def = definitions.get(&scenario.key())?;
                Some((scenario, *def))
            })
            .collect();
        if lines.is_empty() {
            return Ok(());
        }

        if self.config.verbosity.should_print_sections() {
            EmitHelper::write_section(writer, context, &format!("{} and untyped literals", ty))?;
        } else {
            writeln!(writer)?;
        }
        for (scenario, def) in &lines {
            self.write_scenario(scenario, def, writer, context)?;
        }
        Ok(())
    }
}

impl Emitter for ScenarioEmitter {
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
            &format!("regression scenarios for module {}", self.config.module_name),
        )?;

        let by_key: HashMap<DefinitionKey, &OperatorDefinition> =
            definitions.iter().map(|def| (def.key(), def)).collect();
        let mut literal_pairs_done = HashSet::new();
        let mut current_section = None;

        for def in definitions {
            // Ahead of the first pair of each custom left type.
            if let Some(left) = def.left_type {
                let pairwise = matches!(
                    def.operator.class(),
                    OperatorClass::Comparison | OperatorClass::Arithmetic
                );
                if pairwise
                    && left.family() == TypeFamily::Custom
                    && literal_pairs_done.insert(left)
                {
                    self.emit_literal_pairs(left, &by_key, writer, context)?;
                    current_section = None;
                }
            }

            let title = section_title(def);
            if current_section.as_ref() != Some(&title) {
                if self.config.verbosity.should_print_sections() {
                    EmitHelper::write_section(writer, context, &title)?;
                } else {
                    writeln!(writer)?;
                }
            }
            current_section = Some(title);
            self.emit_definition(def, writer, context)?;
        }
        Ok(())
    }

    fn context(&self) -> EmitContext {
        EmitContext::from_config(&self.config, CommentStyle::Sql)
    }
}
