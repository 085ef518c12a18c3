//! Lexer for MyPL
//!
//! Pull-based scanner: each call to `next_token` consumes exactly one token
//! from the underlying stream. Once end of stream is reached every further
//! call returns EOS.

use crate::frontend::stream::CharStream;
use crate::frontend::token::{Token, TokenKind};
use crate::utils::{Error, Position, Result};
use log::trace;
use std::io::{self, BufRead};

/// The lexer state
pub struct Lexer<R> {
    stream: CharStream<R>,
    /// Set once EOS has been produced
    finished: bool,
}

impl<'a> Lexer<&'a [u8]> {
    /// Create a lexer over in-memory source text
    pub fn from_source(source: &'a str) -> Self {
        Self::new(source.as_bytes())
    }
}

impl<R: BufRead> Lexer<R> {
    /// Create a new lexer reading from the given stream
    pub fn new(reader: R) -> Self {
        Self {
            stream: CharStream::new(reader),
            finished: false,
        }
    }

    /// Get the next character without advancing
    fn peek(&mut self) -> Result<Option<char>> {
        let result = self.stream.peek();
        result.map_err(|e| self.read_error(e))
    }

    /// Advance to the next character
    fn advance(&mut self) -> Result<Option<char>> {
        let result = self.stream.read();
        result.map_err(|e| self.read_error(e))
    }

    /// Consume the next character if it is `expected`
    fn advance_if(&mut self, expected: char) -> Result<bool> {
        if self.peek()? == Some(expected) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn read_error(&self, err: io::Error) -> Error {
        Error::lexical(format!("read error: {err}"), self.stream.position())
    }

    /// Skip whitespace and `#` line comments
    fn skip_whitespace(&mut self) -> Result<()> {
        while let Some(c) = self.peek()? {
            match c {
                c if c.is_whitespace() => {
                    self.advance()?;
                }
                '#' => {
                    // The newline, if any, is left for the whitespace arm
                    while let Some(c) = self.peek()? {
                        if c == '\n' {
                            break;
                        }
                        self.advance()?;
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    /// Get the next token
    pub fn next_token(&mut self) -> Result<Token> {
        if self.finished {
            return Ok(Token::eos(self.stream.position()));
        }

        self.skip_whitespace()?;
        let start = self.stream.position();

        let Some(c) = self.peek()? else {
            self.finished = true;
            trace!("token EOS at {start}");
            return Ok(Token::eos(start));
        };

        let token = if c.is_alphabetic() {
            self.read_word(start)?
        } else if c.is_ascii_digit() {
            self.read_number(start)?
        } else if c == '"' {
            self.read_string(start)?
        } else if c == '\'' {
            self.read_char(start)?
        } else {
            self.read_symbol(start)?
        };

        trace!("token {token}");
        Ok(token)
    }

    /// Tokenize the remaining stream, EOS included
    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let is_eos = token.kind == TokenKind::Eos;
            tokens.push(token);
            if is_eos {
                return Ok(tokens);
            }
        }
    }

    /// Read an identifier, keyword or boolean literal
    fn read_word(&mut self, start: Position) -> Result<Token> {
        let mut text = String::new();
        while let Some(c) = self.peek()? {
            if c.is_alphabetic() || c.is_ascii_digit() || c == '_' {
                text.push(c);
                self.advance()?;
            } else {
                break;
            }
        }

        Ok(Token::new(TokenKind::from_word(&text), text, start))
    }

    fn read_digits(&mut self, text: &mut String) -> Result<()> {
        while let Some(c) = self.peek()? {
            if !c.is_ascii_digit() {
                break;
            }
            text.push(c);
            self.advance()?;
        }
        Ok(())
    }

    /// Read an integer or double literal
    fn read_number(&mut self, start: Position) -> Result<Token> {
        let mut text = String::new();
        self.read_digits(&mut text)?;

        if self.peek()? == Some('.') {
            text.push('.');
            self.advance()?;

            if !matches!(self.peek()?, Some(c) if c.is_ascii_digit()) {
                return Err(Error::lexical(
                    format!("missing digit in double '{text}'"),
                    self.stream.position(),
                ));
            }
            self.read_digits(&mut text)?;

            if self.peek()? == Some('.') {
                return Err(Error::lexical(
                    format!("too many decimal points in '{text}.'"),
                    self.stream.position(),
                ));
            }
            self.reject_trailing_letter(&text)?;
            return Ok(Token::new(TokenKind::DoubleVal, text, start));
        }

        self.reject_trailing_letter(&text)?;
        if text.len() > 1 && text.starts_with('0') {
            return Err(Error::lexical(format!("leading zero in '{text}'"), start));
        }
        Ok(Token::new(TokenKind::IntVal, text, start))
    }

    fn reject_trailing_letter(&mut self, text: &str) -> Result<()> {
        match self.peek()? {
            Some(c) if c.is_alphabetic() || c == '_' => Err(Error::lexical(
                format!("unexpected symbol '{c}' in number '{text}'"),
                self.stream.position(),
            )),
            _ => Ok(()),
        }
    }

    /// Read a string literal; the lexeme excludes the quotes
    fn read_string(&mut self, start: Position) -> Result<Token> {
        self.advance()?; // opening quote

        let mut value = String::new();
        loop {
            match self.peek()? {
                Some('"') => {
                    self.advance()?;
                    return Ok(Token::new(TokenKind::StringVal, value, start));
                }
                Some('\n') => {
                    return Err(Error::lexical(
                        "found newline within string",
                        self.stream.position(),
                    ));
                }
                Some(c) => {
                    value.push(c);
                    self.advance()?;
                }
                None => return Err(Error::lexical("unterminated string literal", start)),
            }
        }
    }

    /// Read a character literal; exactly one character between the quotes
    fn read_char(&mut self, start: Position) -> Result<Token> {
        self.advance()?; // opening quote

        let c = match self.peek()? {
            Some('\'') => return Err(Error::lexical("empty character literal", start)),
            Some('\n') | None => {
                return Err(Error::lexical("unterminated character literal", start))
            }
            Some(c) => c,
        };
        self.advance()?;

        match self.peek()? {
            Some('\'') => {
                self.advance()?;
                Ok(Token::new(TokenKind::CharVal, c.to_string(), start))
            }
            Some('\n') | None => Err(Error::lexical("unterminated character literal", start)),
            Some(_) => Err(Error::lexical(
                "too many characters in character literal",
                start,
            )),
        }
    }

    /// Read an operator or punctuation symbol
    fn read_symbol(&mut self, start: Position) -> Result<Token> {
        let Some(c) = self.advance()? else {
            return Err(Error::lexical("unexpected end of input", start));
        };

        let (kind, lexeme) = match c {
            ',' => (TokenKind::Comma, ","),
            '.' => (TokenKind::Dot, "."),
            '+' => (TokenKind::Plus, "+"),
            '-' => (TokenKind::Minus, "-"),
            '*' => (TokenKind::Multiply, "*"),
            '/' => (TokenKind::Divide, "/"),
            '%' => (TokenKind::Modulo, "%"),
            '(' => (TokenKind::LParen, "("),
            ')' => (TokenKind::RParen, ")"),
            '=' => (TokenKind::Equal, "="),
            '>' => {
                if self.advance_if('=')? {
                    (TokenKind::GreaterThanEqual, ">=")
                } else {
                    (TokenKind::GreaterThan, ">")
                }
            }
            '<' => {
                if self.advance_if('=')? {
                    (TokenKind::LessThanEqual, "<=")
                } else {
                    (TokenKind::LessThan, "<")
                }
            }
            '!' => {
                if !self.advance_if('=')? {
                    return Err(Error::lexical("expecting '=' after '!'", start));
                }
                (TokenKind::NotEqual, "!=")
            }
            ':' => {
                if !self.advance_if('=')? {
                    return Err(Error::lexical("expecting '=' after ':'", start));
                }
                (TokenKind::Assign, ":=")
            }
            _ => return Err(Error::lexical(format!("unexpected symbol '{c}'"), start)),
        };

        Ok(Token::new(kind, lexeme, start))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::from_source(source)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    fn single(source: &str) -> Token {
        let mut lexer = Lexer::from_source(source);
        let token = lexer.next_token().unwrap();
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Eos);
        token
    }

    fn lex_error(source: &str) -> Error {
        Lexer::from_source(source).tokenize().unwrap_err()
    }

    #[test]
    fn test_empty_input() {
        let mut lexer = Lexer::from_source("");
        let token = lexer.next_token().unwrap();
        assert_eq!(token.kind, TokenKind::Eos);
        assert_eq!(token.lexeme, "");
        assert_eq!(token.position, Position::start());
    }

    #[test]
    fn test_eos_is_sticky() {
        let mut lexer = Lexer::from_source("x ");
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Id);
        for _ in 0..3 {
            assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Eos);
        }
    }

    #[test]
    fn test_whitespace_and_comments_only() {
        assert_eq!(kinds("  \t\n\r\n  # a comment\n# another\n"), vec![TokenKind::Eos]);
    }

    #[test]
    fn test_comment_at_end_of_stream() {
        assert_eq!(kinds("x # trailing, no newline"), vec![TokenKind::Id, TokenKind::Eos]);
        assert_eq!(kinds("#"), vec![TokenKind::Eos]);
    }

    #[test]
    fn test_single_char_tokens() {
        assert_eq!(
            kinds(", . + - * / % ( ) ="),
            vec![
                TokenKind::Comma,
                TokenKind::Dot,
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Multiply,
                TokenKind::Divide,
                TokenKind::Modulo,
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::Equal,
                TokenKind::Eos,
            ]
        );
    }

    #[test]
    fn test_compound_operators() {
        assert_eq!(
            kinds("< <= > >= != :="),
            vec![
                TokenKind::LessThan,
                TokenKind::LessThanEqual,
                TokenKind::GreaterThan,
                TokenKind::GreaterThanEqual,
                TokenKind::NotEqual,
                TokenKind::Assign,
                TokenKind::Eos,
            ]
        );
        let assign = single(":=");
        assert_eq!(assign.lexeme, ":=");
    }

    #[test]
    fn test_compound_operators_without_spaces() {
        assert_eq!(
            kinds("x<=y>z"),
            vec![
                TokenKind::Id,
                TokenKind::LessThanEqual,
                TokenKind::Id,
                TokenKind::GreaterThan,
                TokenKind::Id,
                TokenKind::Eos,
            ]
        );
    }

    #[test]
    fn test_bang_and_colon_need_equals() {
        let err = lex_error("x ! y");
        assert_eq!(err.phase(), crate::utils::Phase::Lexer);
        assert_eq!(err.position(), Position::new(1, 3));

        let err = lex_error("x : y");
        assert_eq!(err.position(), Position::new(1, 3));
        assert!(lex_error("!").message().contains("'='"));
        assert!(lex_error(":").message().contains("'='"));
    }

    struct FailingReader;

    impl io::Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "boom"))
        }
    }

    #[test]
    fn test_stream_failure_is_lexical_error() {
        let mut lexer = Lexer::new(io::BufReader::new(FailingReader));
        let err = lexer.next_token().unwrap_err();
        assert_eq!(err.phase(), crate::utils::Phase::Lexer);
        assert_eq!(err.message(), "read error: boom");
        assert_eq!(err.position(), Position::start());
    }

    #[test]
    fn test_invalid_utf8_is_lexical_error() {
        let bytes: &[u8] = b"x \xff";
        let mut lexer = Lexer::new(bytes);
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Id);
        let err = lexer.next_token().unwrap_err();
        assert_eq!(err.phase(), crate::utils::Phase::Lexer);
        assert!(err.message().starts_with("read error:"), "{}", err.message());
        assert_eq!(err.position(), Position::new(1, 3));
    }

    #[test]
    fn test_symbol_at_end_of_input_is_an_error() {
        let mut lexer = Lexer::from_source("");
        let err = lexer.read_symbol(Position::start()).unwrap_err();
        assert_eq!(err.message(), "unexpected end of input");
        assert!(!lexer.finished);
    }

    #[test]
    fn test_unexpected_symbol() {
        let err = lex_error("var x := 1 @");
        assert_eq!(err.message(), "unexpected symbol '@'");
        assert_eq!(err.position(), Position::new(1, 12));
        assert!(Lexer::from_source("$").next_token().is_err());
    }

    #[test]
    fn test_columns_report_first_character() {
        let tokens = Lexer::from_source("a >= b\n  c := 'z' \"str\" 3.5")
            .tokenize()
            .unwrap();
        let positions: Vec<(TokenKind, u32, u32)> = tokens
            .iter()
            .map(|t| (t.kind, t.line(), t.column()))
            .collect();
        assert_eq!(
            positions,
            vec![
                (TokenKind::Id, 1, 1),
                (TokenKind::GreaterThanEqual, 1, 3),
                (TokenKind::Id, 1, 6),
                (TokenKind::Id, 2, 3),
                (TokenKind::Assign, 2, 5),
                (TokenKind::CharVal, 2, 8),
                (TokenKind::StringVal, 2, 12),
                (TokenKind::DoubleVal, 2, 18),
                (TokenKind::Eos, 2, 21),
            ]
        );
    }

    #[test]
    fn test_numbers() {
        let int = single("42");
        assert_eq!((int.kind, int.lexeme.as_str()), (TokenKind::IntVal, "42"));
        let zero = single("0");
        assert_eq!(zero.kind, TokenKind::IntVal);
        let double = single("3.14");
        assert_eq!((double.kind, double.lexeme.as_str()), (TokenKind::DoubleVal, "3.14"));
        let small = single("0.5");
        assert_eq!(small.kind, TokenKind::DoubleVal);
    }

    #[test]
    fn test_malformed_numbers() {
        let err = lex_error("007");
        assert_eq!(err.message(), "leading zero in '007'");
        assert_eq!(err.position(), Position::new(1, 1));

        let err = lex_error("3.");
        assert_eq!(err.position(), Position::new(1, 3));
        assert!(lex_error("3.x").message().starts_with("missing digit"));
        assert!(lex_error("1.2.3").message().starts_with("too many decimal points"));
        assert!(lex_error("12abc").message().starts_with("unexpected symbol 'a'"));
        assert!(lex_error("1.5e").message().starts_with("unexpected symbol 'e'"));
    }

    #[test]
    fn test_char_literals() {
        let token = single("'a'");
        assert_eq!((token.kind, token.lexeme.as_str()), (TokenKind::CharVal, "a"));
        assert_eq!(single("' '").lexeme, " ");

        assert_eq!(lex_error("''").message(), "empty character literal");
        assert_eq!(lex_error("'ab'").message(), "too many characters in character literal");
        assert_eq!(lex_error("'a").message(), "unterminated character literal");
        assert_eq!(lex_error("'\n'").message(), "unterminated character literal");
    }

    #[test]
    fn test_string_literals() {
        let token = single("\"hello\"");
        assert_eq!((token.kind, token.lexeme.as_str()), (TokenKind::StringVal, "hello"));
        assert_eq!(single("\"\"").lexeme, "");
        assert_eq!(single("\"a # not a comment\"").lexeme, "a # not a comment");

        assert_eq!(lex_error("\"hello").message(), "unterminated string literal");
        let err = lex_error("\"hel\nlo\"");
        assert_eq!(err.message(), "found newline within string");
        assert_eq!(err.position(), Position::new(1, 5));
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_eq!(
            kinds("while while1 While"),
            vec![TokenKind::While, TokenKind::Id, TokenKind::Id, TokenKind::Eos]
        );
        // identifiers must start with a letter
        assert_eq!(lex_error("_x").message(), "unexpected symbol '_'");
    }

    #[test]
    fn test_all_keywords() {
        for (lexeme, kind) in crate::frontend::token::KEYWORDS {
            let token = single(lexeme);
            assert_eq!(token.kind, kind, "keyword {lexeme}");
            assert_eq!(token.lexeme, lexeme);
        }
    }

    #[test]
    fn test_identifier_with_underscore_and_digits() {
        let token = single("point_2d");
        assert_eq!((token.kind, token.lexeme.as_str()), (TokenKind::Id, "point_2d"));
        assert_eq!(single("true").kind, TokenKind::BoolVal);
        assert_eq!(single("false").kind, TokenKind::BoolVal);
    }

    #[test]
    fn test_lexemes_reclassify_in_isolation() {
        let source = "type Node var int next := nil end fun int f(Node n) return n.next >= 10 end";
        for token in Lexer::from_source(source).tokenize().unwrap() {
            if token.kind == TokenKind::Eos {
                continue;
            }
            assert_eq!(single(&token.lexeme).kind, token.kind, "lexeme {}", token.lexeme);
        }
    }
}
