//! Token definitions for MyPL

use crate::utils::Position;
use serde::{Serialize, Serializer};
use std::fmt;

/// A token produced by the lexer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text of the token; literals exclude their quotes
    pub lexeme: String,
    /// Position of the token's first character
    pub position: Position,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, position: Position) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            position,
        }
    }

    pub fn eos(position: Position) -> Self {
        Self::new(TokenKind::Eos, "", position)
    }

    pub fn line(&self) -> u32 {
        self.position.line
    }

    pub fn column(&self) -> u32 {
        self.position.column
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}' {}", self.kind, self.lexeme, self.position)
    }
}

/// Token kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // ============ Structural ============
    /// ,
    Comma,
    /// .
    Dot,
    /// (
    LParen,
    /// )
    RParen,
    /// :=
    Assign,

    // ============ Operators ============
    /// +
    Plus,
    /// -
    Minus,
    /// *
    Multiply,
    /// /
    Divide,
    /// %
    Modulo,
    /// =
    Equal,
    /// !=
    NotEqual,
    /// <
    LessThan,
    /// <=
    LessThanEqual,
    /// >
    GreaterThan,
    /// >=
    GreaterThanEqual,

    // ============ Literals ============
    IntVal,
    DoubleVal,
    BoolVal,
    CharVal,
    StringVal,

    // ============ Type Keywords ============
    /// int
    IntType,
    /// double
    DoubleType,
    /// bool
    BoolType,
    /// char
    CharType,
    /// string
    StringType,

    // ============ Keywords ============
    /// type
    Type,
    /// fun
    Fun,
    /// var
    Var,
    /// set
    Set,
    /// if
    If,
    /// then
    Then,
    /// elif
    Elif,
    /// else
    Else,
    /// end
    End,
    /// while
    While,
    /// for
    For,
    /// to
    To,
    /// do
    Do,
    /// return
    Return,
    /// new
    New,
    /// nil
    Nil,
    /// and
    And,
    /// or
    Or,
    /// not
    Not,
    /// neg
    Neg,

    // ============ Special ============
    /// Identifier
    Id,
    /// End of stream
    Eos,
}

/// Reserved words, matched exactly and case-sensitively
pub const KEYWORDS: [(&str, TokenKind); 25] = [
    ("int", TokenKind::IntType),
    ("bool", TokenKind::BoolType),
    ("double", TokenKind::DoubleType),
    ("char", TokenKind::CharType),
    ("string", TokenKind::StringType),
    ("type", TokenKind::Type),
    ("and", TokenKind::And),
    ("or", TokenKind::Or),
    ("not", TokenKind::Not),
    ("neg", TokenKind::Neg),
    ("while", TokenKind::While),
    ("for", TokenKind::For),
    ("to", TokenKind::To),
    ("do", TokenKind::Do),
    ("if", TokenKind::If),
    ("then", TokenKind::Then),
    ("else", TokenKind::Else),
    ("elif", TokenKind::Elif),
    ("end", TokenKind::End),
    ("fun", TokenKind::Fun),
    ("var", TokenKind::Var),
    ("set", TokenKind::Set),
    ("return", TokenKind::Return),
    ("new", TokenKind::New),
    ("nil", TokenKind::Nil),
];

/// Boolean literals are words but classify as values, not keywords
const BOOL_LITERALS: [&str; 2] = ["true", "false"];

impl TokenKind {
    /// Classify a scanned word: boolean literal, keyword, or identifier
    pub fn from_word(s: &str) -> TokenKind {
        if BOOL_LITERALS.contains(&s) {
            return TokenKind::BoolVal;
        }
        Self::keyword_from_str(s).unwrap_or(TokenKind::Id)
    }

    /// Try to convert an identifier to a keyword
    pub fn keyword_from_str(s: &str) -> Option<TokenKind> {
        KEYWORDS
            .iter()
            .find(|(lexeme, _)| *lexeme == s)
            .map(|&(_, kind)| kind)
    }

    /// One of the five builtin type keywords
    pub const fn is_builtin_type(self) -> bool {
        matches!(
            self,
            TokenKind::IntType
                | TokenKind::DoubleType
                | TokenKind::BoolType
                | TokenKind::CharType
                | TokenKind::StringType
        )
    }

    /// Can start a `dtype`
    pub const fn is_type(self) -> bool {
        self.is_builtin_type() || matches!(self, TokenKind::Id)
    }

    /// Binary operators; all share one precedence level
    pub const fn is_operator(self) -> bool {
        matches!(
            self,
            TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Divide
                | TokenKind::Multiply
                | TokenKind::Modulo
                | TokenKind::And
                | TokenKind::Or
                | TokenKind::Equal
                | TokenKind::LessThan
                | TokenKind::GreaterThan
                | TokenKind::LessThanEqual
                | TokenKind::GreaterThanEqual
                | TokenKind::NotEqual
        )
    }

    /// Literal value kinds (`pval`)
    pub const fn is_literal(self) -> bool {
        matches!(
            self,
            TokenKind::IntVal
                | TokenKind::DoubleVal
                | TokenKind::BoolVal
                | TokenKind::CharVal
                | TokenKind::StringVal
        )
    }

    /// Can start an `rvalue` or a parenthesized expression.
    /// Excludes `not`, which only [`TokenKind::is_bstmt_start`] admits.
    pub const fn is_expr_start(self) -> bool {
        self.is_literal()
            || matches!(
                self,
                TokenKind::Nil | TokenKind::New | TokenKind::Neg | TokenKind::Id | TokenKind::LParen
            )
    }

    /// Can start a `bstmt`
    pub const fn is_bstmt_start(self) -> bool {
        self.is_expr_start()
            || matches!(
                self,
                TokenKind::Var
                    | TokenKind::Set
                    | TokenKind::If
                    | TokenKind::While
                    | TokenKind::For
                    | TokenKind::Return
                    | TokenKind::Not
            )
    }

    /// Upper-case name of the kind, e.g. `NOT_EQUAL`
    pub const fn name(self) -> &'static str {
        match self {
            TokenKind::Comma => "COMMA",
            TokenKind::Dot => "DOT",
            TokenKind::LParen => "LPAREN",
            TokenKind::RParen => "RPAREN",
            TokenKind::Assign => "ASSIGN",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINUS",
            TokenKind::Multiply => "MULTIPLY",
            TokenKind::Divide => "DIVIDE",
            TokenKind::Modulo => "MODULO",
            TokenKind::Equal => "EQUAL",
            TokenKind::NotEqual => "NOT_EQUAL",
            TokenKind::LessThan => "LESS_THAN",
            TokenKind::LessThanEqual => "LESS_THAN_EQUAL",
            TokenKind::GreaterThan => "GREATER_THAN",
            TokenKind::GreaterThanEqual => "GREATER_THAN_EQUAL",
            TokenKind::IntVal => "INT_VAL",
            TokenKind::DoubleVal => "DOUBLE_VAL",
            TokenKind::BoolVal => "BOOL_VAL",
            TokenKind::CharVal => "CHAR_VAL",
            TokenKind::StringVal => "STRING_VAL",
            TokenKind::IntType => "INT_TYPE",
            TokenKind::DoubleType => "DOUBLE_TYPE",
            TokenKind::BoolType => "BOOL_TYPE",
            TokenKind::CharType => "CHAR_TYPE",
            TokenKind::StringType => "STRING_TYPE",
            TokenKind::Type => "TYPE",
            TokenKind::Fun => "FUN",
            TokenKind::Var => "VAR",
            TokenKind::Set => "SET",
            TokenKind::If => "IF",
            TokenKind::Then => "THEN",
            TokenKind::Elif => "ELIF",
            TokenKind::Else => "ELSE",
            TokenKind::End => "END",
            TokenKind::While => "WHILE",
            TokenKind::For => "FOR",
            TokenKind::To => "TO",
            TokenKind::Do => "DO",
            TokenKind::Return => "RETURN",
            TokenKind::New => "NEW",
            TokenKind::Nil => "NIL",
            TokenKind::And => "AND",
            TokenKind::Or => "OR",
            TokenKind::Not => "NOT",
            TokenKind::Neg => "NEG",
            TokenKind::Id => "ID",
            TokenKind::Eos => "EOS",
        }
    }
}

impl Serialize for TokenKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
