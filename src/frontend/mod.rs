//! Frontend module - Character stream, Lexer, Parser

pub mod lexer;
pub mod parser;
pub mod stream;
pub mod token;

use crate::utils::Result;
use lexer::Lexer;
use parser::Parser;
use std::io::BufRead;

/// Syntax-check a program read from any buffered stream
pub fn check_reader<R: BufRead>(reader: R) -> Result<()> {
    Parser::new(Lexer::new(reader)).parse()
}

/// Syntax-check an in-memory program
pub fn check_source(source: &str) -> Result<()> {
    Parser::new(Lexer::from_source(source)).parse()
}
