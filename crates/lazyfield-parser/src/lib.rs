/*! Parse text assembly into classes.
 *
 * The format is the one `lazyfield_core::format` prints: a `class` header, `field` lines and
 * `method` blocks holding one instruction, label or line number per line. Writing classes this way
 * is far easier than assembling them with the builders, so scenario tests and hand-written inputs
 * go through here.
 */

use lazyfield_core::{AnalysisError, Class};
use pest::Parser;
use pest_derive::Parser;
use std::path::Path;
use thiserror::Error;

mod lower;

#[derive(Parser)]
#[grammar = "grammar.pest"]
pub struct LazyfieldParser;

pub type ParseResult<T> = Result<T, Box<pest::error::Error<Rule>>>;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Syntax error: {0}")]
    Syntax(#[from] Box<pest::error::Error<Rule>>),
    #[error("line {line}: unknown opcode `{mnemonic}`")]
    UnknownOpcode { line: usize, mnemonic: String },
    #[error("line {line}: {message}")]
    Operand { line: usize, message: String },
    #[error("expected exactly one class, found {0}")]
    ClassCount(usize),
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),
}

pub fn parse(input: &str) -> ParseResult<pest::iterators::Pairs<'_, Rule>> {
    LazyfieldParser::parse(Rule::file, input).map_err(Box::new)
}

pub fn check(input: &str) -> bool {
    parse(input).is_ok()
}

pub fn parse_classes(input: &str) -> Result<Vec<Class>, ParseError> {
    let mut classes = Vec::new();
    for pair in parse(input)? {
        if pair.as_rule() != Rule::file {
            continue;
        }
        for decl in pair.into_inner() {
            if decl.as_rule() == Rule::class_decl {
                classes.push(lower::lower_class(decl)?);
            }
        }
    }
    Ok(classes)
}

pub fn parse_class(input: &str) -> Result<Class, ParseError> {
    let mut classes = parse_classes(input)?;
    match classes.len() {
        1 => Ok(classes.remove(0)),
        n => Err(ParseError::ClassCount(n)),
    }
}

pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Vec<Class>, ParseError> {
    let input = std::fs::read_to_string(path)?;
    parse_classes(&input)
}
