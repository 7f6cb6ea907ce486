/*! Read registration and regression scripts back into structured data.
 *
 * The renderers write SQL that a database would load. Reading it back lets tools check that every
 * operator points at a declared function, and replay each regression probe against the evaluator
 * without a database at hand. Only the subset the renderers write is accepted.
 */

use pest::Parser;
use pest_derive::Parser;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub mod ast;

pub use ast::{
    parse_script, AstError, AstResult, FunctionDecl, LiteralText, OperatorDecl, Probe, Statement,
    StatementKind,
};

#[derive(Parser)]
#[grammar = "grammar.pest"]
pub struct ScriptParser;

pub type ParseResult<T> = Result<T, Box<pest::error::Error<Rule>>>;

pub fn parse(input: &str) -> ParseResult<pest::iterators::Pairs<'_, Rule>> {
    ScriptParser::parse(Rule::script, input).map_err(Box::new)
}

pub fn check(input: &str) -> bool {
    parse(input).is_ok()
}

pub fn parse_script_file<P: AsRef<Path>>(path: P) -> AstResult<Vec<Statement>> {
    let path = path.as_ref();
    let input = std::fs::read_to_string(path).map_err(|source| AstError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_script(&input)
}

/// Every `.sql` file under `root`, sorted. A file path is returned as is.
pub fn find_scripts<P: AsRef<Path>>(root: P) -> Vec<PathBuf> {
    let mut scripts: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "sql"))
        .collect();
    scripts.sort();
    scripts
}
