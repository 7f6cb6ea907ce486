use anyhow::Result;
use opmatrix_core::{OperatorDefinition, ResultType};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
    Markdown,
}

impl OutputFormat {
    pub fn formatter(&self) -> Box<dyn OutputFormatter> {
        match self {
            OutputFormat::Text => Box::new(TextFormatter),
            OutputFormat::Json => Box::new(JsonFormatter),
            OutputFormat::Markdown => Box::new(MarkdownFormatter),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            other => anyhow::bail!("unknown output format: {}", other),
        }
    }
}

/// Flat, serializable view of one definition for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionRow {
    pub function: String,
    pub operator: String,
    pub left: Option<String>,
    pub right: String,
    pub result: String,
    pub overflow_check: Option<String>,
    pub intermediate: Option<String>,
    pub sign_guards: Vec<String>,
}

impl From<&OperatorDefinition> for DefinitionRow {
    fn from(def: &OperatorDefinition) -> Self {
        Self {
            function: def.function_name(),
            operator: def.operator.symbol().to_string(),
            left: def.left_type.map(|ty| ty.to_string()),
            right: def.right_type.to_string(),
            result: def.result_type.to_string(),
            overflow_check: def.overflow_predicate.as_ref().map(|p| p.to_string()),
            intermediate: def.intermediate_type.map(|ty| ty.to_string()),
            sign_guards: def.sign_guards.iter().map(|op| op.to_string()).collect(),
        }
    }
}

pub trait OutputFormatter {
    fn format_pair(&self, key: &str, value: &str) -> String;

    fn format_list(&self, items: &[String]) -> String;

    fn format_section(&self, title: &str) -> String;

    fn format_code(&self, code: &str, language: Option<&str>) -> String;

    fn format_definitions(&self, definitions: &[OperatorDefinition]) -> Result<String> {
        let items: Vec<String> = definitions
            .iter()
            .map(|def| match &def.overflow_predicate {
                Some(predicate) => format!("{}: {} [{}]", def.function_name(), def, predicate),
                None => format!("{}: {}", def.function_name(), def),
            })
            .collect();

        let mut out = self.format_section("Operators");
        out.push_str(&self.format_list(&items));
        out.push('\n');
        out.push_str(&self.format_pair("total", &definitions.len().to_string()));
        out.push('\n');
        Ok(out)
    }
}

pub struct TextFormatter;

impl OutputFormatter for TextFormatter {
    fn format_pair(&self, key: &str, value: &str) -> String {
        format!("{}: {}", key, value)
    }

    fn format_list(&self, items: &[String]) -> String {
        items
            .iter()
            .map(|item| format!("  - {}", item))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn format_section(&self, title: &str) -> String {
        format!("\n=== {} ===\n", title)
    }

    fn format_code(&self, code: &str, _language: Option<&str>) -> String {
        code.to_string()
    }
}

pub struct MarkdownFormatter;

impl OutputFormatter for MarkdownFormatter {
    fn format_pair(&self, key: &str, value: &str) -> String {
        format!("**{}**: {}", key, value)
    }

    fn format_list(&self, items: &[String]) -> String {
        items
            .iter()
            .map(|item| format!("- {}", item))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn format_section(&self, title: &str) -> String {
        format!("\n## {}\n", title)
    }

    fn format_code(&self, code: &str, language: Option<&str>) -> String {
        let lang = language.unwrap_or("sql");
        format!("```{}\n{}\n```", lang, code)
    }

    fn format_definitions(&self, definitions: &[OperatorDefinition]) -> Result<String> {
        let mut out = self.format_section("Operators");
        out.push_str("\n| function | signature | overflow check |\n");
        out.push_str("|---|---|---|\n");
        for def in definitions {
            let check = match (&def.overflow_predicate, def.result_type) {
                (Some(predicate), _) => format!("`{}`", predicate),
                (None, ResultType::Boolean) => String::new(),
                (None, ResultType::Integer(_)) => "none".to_string(),
            };
            out.push_str(&format!(
                "| `{}` | `{}` | {} |\n",
                def.function_name(),
                def,
                check.replace('|', "\\|")
            ));
        }
        out.push('\n');
        out.push_str(&self.format_pair("total", &definitions.len().to_string()));
        out.push('\n');
        Ok(out)
    }
}

pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format_pair(&self, key: &str, value: &str) -> String {
        serde_json::json!({ key: value }).to_string()
    }

    fn format_list(&self, items: &[String]) -> String {
        serde_json::json!(items).to_string()
    }

    fn format_section(&self, title: &str) -> String {
        serde_json::json!({ "section": title }).to_string()
    }

    fn format_code(&self, code: &str, language: Option<&str>) -> String {
        serde_json::json!({ "language": language, "code": code }).to_string()
    }

    fn format_definitions(&self, definitions: &[OperatorDefinition]) -> Result<String> {
        let rows: Vec<DefinitionRow> = definitions.iter().map(DefinitionRow::from).collect();
        let mut out = serde_json::to_string_pretty(&rows)?;
        out.push('\n');
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opmatrix_core::{IntegerType, Operator};
    use pretty_assertions::assert_eq;

    fn sample() -> Vec<OperatorDefinition> {
        vec![
            OperatorDefinition::derive(Operator::Eq, Some(IntegerType::Uint1), IntegerType::Uint1)
                .unwrap(),
            OperatorDefinition::derive(Operator::Sub, Some(IntegerType::Uint1), IntegerType::Uint1)
                .unwrap(),
        ]
    }

    #[test]
    fn test_parse_format() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("MD".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert!("html".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_text_listing() {
        let out = TextFormatter.format_definitions(&sample()).unwrap();
        assert_eq!(
            out,
            "\n=== Operators ===\n  - uint1uint1eq: uint1 = uint1 -> boolean\n  - uint1uint1mi: uint1 - uint1 -> uint1 [result > arg1]\ntotal: 2\n"
        );
    }

    #[test]
    fn test_markdown_escapes_pipes() {
        let defs = vec![OperatorDefinition::derive(
            Operator::Add,
            Some(IntegerType::Uint2),
            IntegerType::Uint2,
        )
        .unwrap()];
        let out = MarkdownFormatter.format_definitions(&defs).unwrap();
        assert!(out.contains("| `uint2uint2pl` | `uint2 + uint2 -> uint2` | `result < arg1 \\|\\| result < arg2` |"));
    }

    #[test]
    fn test_json_listing() {
        let out = JsonFormatter.format_definitions(&sample()).unwrap();
        let rows: Vec<DefinitionRow> = serde_json::from_str(&out).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].function, "uint1uint1mi");
        assert_eq!(rows[1].overflow_check.as_deref(), Some("result > arg1"));
        assert_eq!(rows[0].left.as_deref(), Some("uint1"));
    }
}
