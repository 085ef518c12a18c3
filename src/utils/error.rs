//! Error handling for the MyPL front end

use crate::utils::Position;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// The stage that raised an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    Lexer,
    Parser,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Lexer => f.write_str("Lexer"),
            Phase::Parser => f.write_str("Parser"),
        }
    }
}

/// Front-end error. Both kinds are fatal: the first one aborts the run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // ==================== Lexer Errors ====================
    #[error("Lexer error: {message} at line {} column {}", .position.line, .position.column)]
    Lexical { message: String, position: Position },

    // ==================== Parser Errors ====================
    #[error("Parser error: {message} at line {} column {}", .position.line, .position.column)]
    Syntax { message: String, position: Position },
}

impl Error {
    pub fn lexical(message: impl Into<String>, position: Position) -> Self {
        Self::Lexical {
            message: message.into(),
            position,
        }
    }

    pub fn syntax(message: impl Into<String>, position: Position) -> Self {
        Self::Syntax {
            message: message.into(),
            position,
        }
    }

    pub fn phase(&self) -> Phase {
        match self {
            Self::Lexical { .. } => Phase::Lexer,
            Self::Syntax { .. } => Phase::Parser,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Lexical { message, .. } | Self::Syntax { message, .. } => message,
        }
    }

    /// Get the position associated with this error
    pub fn position(&self) -> Position {
        match self {
            Self::Lexical { position, .. } | Self::Syntax { position, .. } => *position,
        }
    }
}

/// Caller-facing error shape, suitable for structured output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub phase: Phase,
    pub message: String,
    pub line: u32,
    pub column: u32,
}

impl From<&Error> for Diagnostic {
    fn from(err: &Error) -> Self {
        let position = err.position();
        Self {
            phase: err.phase(),
            message: err.message().to_string(),
            line: position.line,
            column: position.column,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_phase_and_position() {
        let err = Error::syntax("expecting 'do', found 'set'", Position::new(1, 31));
        assert_eq!(
            err.to_string(),
            "Parser error: expecting 'do', found 'set' at line 1 column 31"
        );
    }

    #[test]
    fn test_diagnostic_from_error() {
        let err = Error::lexical("unexpected symbol '@'", Position::new(3, 7));
        let diag = Diagnostic::from(&err);
        assert_eq!(diag.phase, Phase::Lexer);
        assert_eq!(diag.message, "unexpected symbol '@'");
        assert_eq!((diag.line, diag.column), (3, 7));
    }

    #[test]
    fn test_diagnostic_serializes_phase_by_name() {
        let err = Error::lexical("empty character literal", Position::new(2, 1));
        let json = serde_json::to_value(Diagnostic::from(&err)).unwrap();
        assert_eq!(json["phase"], "Lexer");
        assert_eq!(json["line"], 2);
        assert_eq!(json["column"], 1);
    }
}
