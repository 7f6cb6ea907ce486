use crate::config::EmitterConfig;
use anyhow::Result;
use opmatrix_core::{OperatorClass, OperatorDefinition};
use std::io::Write;

pub type EmitResult = Result<()>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentStyle {
    /// `/* ... */`
    C,
    /// `-- ...`
    Sql,
}

impl CommentStyle {
    pub fn wrap(&self, text: &str) -> String {
        match self {
            CommentStyle::C => format!("/* {} */", text),
            CommentStyle::Sql => format!("-- {}", text),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EmitContext {
    pub indent_level: usize,
    pub indent_chars: String,
    pub use_colors: bool,
    pub comment_style: CommentStyle,
}

impl EmitContext {
    pub fn new() -> Self {
        Self {
            indent_level: 0,
            indent_chars: "    ".to_string(),
            use_colors: false,
            comment_style: CommentStyle::C,
        }
    }

    pub fn from_config(config: &EmitterConfig, comment_style: CommentStyle) -> Self {
        Self {
            indent_level: 0,
            indent_chars: config.indent_style.to_string(),
            use_colors: config.use_colors,
            comment_style,
        }
    }

    pub fn indent(&mut self) {
        self.indent_level += 1;
    }

    pub fn dedent(&mut self) {
        if self.indent_level > 0 {
            self.indent_level -= 1;
        }
    }

    pub fn get_indent(&self) -> String {
        self.indent_chars.repeat(self.indent_level)
    }

    pub fn nested(&self) -> Self {
        let mut ctx = self.clone();
        ctx.indent();
        ctx
    }
}

impl Default for EmitContext {
    fn default() -> Self {
        Self::new()
    }
}

pub trait Emitter {
    type Item: ?Sized;

    fn emit<W: Write>(
        &self,
        item: &Self::Item,
        writer: &mut W,
        context: &mut EmitContext,
    ) -> EmitResult;

    /// Context a fresh emission starts from.
    fn context(&self) -> EmitContext {
        EmitContext::new()
    }

    fn emit_to_string(&self, item: &Self::Item) -> Result<String> {
        let mut buffer = Vec::new();
        let mut context = self.context();
        self.emit(item, &mut buffer, &mut context)?;
        Ok(String::from_utf8(buffer)?)
    }
}

/// Heading shared by consecutive definitions: the operand pair for
/// comparisons and arithmetic, the type for its bit operators.
pub fn section_title(def: &OperatorDefinition) -> String {
    match (def.operator.class(), def.left_type) {
        (OperatorClass::Comparison | OperatorClass::Arithmetic, Some(left)) => {
            format!("{} and {}", left, def.right_type)
        }
        _ => format!("{} bit operators", def.left_type.unwrap_or(def.right_type)),
    }
}

pub struct EmitHelper;

impl EmitHelper {
    pub fn write_line<W: Write>(writer: &mut W, context: &EmitContext, text: &str) -> EmitResult {
        if text.is_empty() {
            writeln!(writer)?;
        } else {
            writeln!(writer, "{}{}", context.get_indent(), text)?;
        }
        Ok(())
    }

    pub fn write_colored_line<W: Write>(
        writer: &mut W,
        context: &EmitContext,
        text: &str,
        color: &str,
    ) -> EmitResult {
        if context.use_colors {
            use colored::Colorize;
            let colored_text = match color {
                "green" => text.green().to_string(),
                "cyan" => text.cyan().to_string(),
                _ => text.to_string(),
            };
            writeln!(writer, "{}{}", context.get_indent(), colored_text)?;
        } else {
            Self::write_line(writer, context, text)?;
        }
        Ok(())
    }

    pub fn write_comment<W: Write>(
        writer: &mut W,
        context: &EmitContext,
        comment: &str,
    ) -> EmitResult {
        let comment = context.comment_style.wrap(comment);
        Self::write_colored_line(writer, context, &comment, "green")
    }

    pub fn write_section<W: Write>(
        writer: &mut W,
        context: &EmitContext,
        title: &str,
    ) -> EmitResult {
        writeln!(writer)?;
        let banner = context.comment_style.wrap(&format!("=== {} ===", title));
        Self::write_colored_line(writer, context, &banner, "cyan")?;
        Ok(())
    }

    pub fn write_block<W: Write, F>(
        writer: &mut W,
        context: &mut EmitContext,
        header: &str,
        body: F,
    ) -> EmitResult
    where
        F: FnOnce(&mut W, &mut EmitContext) -> EmitResult,
    {
        Self::write_line(writer, context, header)?;
        Self::write_line(writer, context, "{")?;
        context.indent();
        body(writer, context)?;
        context.dedent();
        Self::write_line(writer, context, "}")?;
        Ok(())
    }
}
