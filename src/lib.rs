//! MyPL front end
//!
//! Lexical scanner and recursive-descent syntax checker for MyPL, a small
//! imperative teaching language.

pub mod frontend;
pub mod utils;

pub use frontend::lexer::Lexer;
pub use frontend::parser::Parser;
pub use frontend::token::{Token, TokenKind};
pub use frontend::{check_reader, check_source};
pub use utils::{Diagnostic, Error, Phase, Position, Result};
