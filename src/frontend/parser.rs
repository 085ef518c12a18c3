//! Parser for MyPL
//!
//! Recursive descent syntax checker. Each grammar rule has one method; the
//! parser accepts or rejects the token stream and builds no tree. Decisions
//! use the current token only, except `vdecl`, which may peek one token
//! further.

use crate::frontend::lexer::Lexer;
use crate::frontend::token::{Token, TokenKind};
use crate::utils::{Error, Position, Result};
use log::{debug, trace};
use std::io::BufRead;

/// The parser
pub struct Parser<R> {
    lexer: Lexer<R>,
    current: Token,
    /// Second token of lookahead; holds at most one token
    lookahead: Option<Token>,
}

impl<R: BufRead> Parser<R> {
    /// Create a new parser over a lexer. No token is read until `parse`.
    pub fn new(lexer: Lexer<R>) -> Self {
        Self {
            lexer,
            current: Token::eos(Position::start()),
            lookahead: None,
        }
    }

    /// Check that the whole token stream is a syntactically valid program.
    /// The first lexical or syntax error aborts the parse.
    pub fn parse(mut self) -> Result<()> {
        debug!("parse started");
        self.advance()?;
        self.stmts()?;
        self.expect(TokenKind::Eos, "end of file")?;
        debug!("parse finished");
        Ok(())
    }

    // ==================== Helper Methods ====================

    fn current_kind(&self) -> TokenKind {
        self.current.kind
    }

    /// Kind of the token after the current one
    fn peek_kind(&mut self) -> Result<TokenKind> {
        let token = match self.lookahead.take() {
            Some(token) => token,
            None => self.lexer.next_token()?,
        };
        Ok(self.lookahead.insert(token).kind)
    }

    fn advance(&mut self) -> Result<()> {
        self.current = match self.lookahead.take() {
            Some(token) => token,
            None => self.lexer.next_token()?,
        };
        Ok(())
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    fn consume(&mut self, kind: TokenKind) -> Result<bool> {
        if self.check(kind) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<()> {
        if self.check(kind) {
            self.advance()
        } else {
            Err(self.error(what))
        }
    }

    fn error(&self, expected: &str) -> Error {
        let found = match self.current.kind {
            TokenKind::Eos => "end of file".to_string(),
            _ => format!("'{}'", self.current.lexeme),
        };
        Error::syntax(
            format!("expecting {expected}, found {found}"),
            self.current.position,
        )
    }

    // ==================== Statements ====================

    // <stmts> ::= <stmt> <stmts> | ε
    fn stmts(&mut self) -> Result<()> {
        trace!("<stmts>");
        while matches!(self.current_kind(), TokenKind::Type | TokenKind::Fun)
            || self.current_kind().is_bstmt_start()
        {
            self.stmt()?;
        }
        Ok(())
    }

    // <stmt> ::= <tdecl> | <fdecl> | <bstmt>
    fn stmt(&mut self) -> Result<()> {
        trace!("<stmt>");
        match self.current_kind() {
            TokenKind::Type => self.tdecl(),
            TokenKind::Fun => self.fdecl(),
            _ => self.bstmt(),
        }
    }

    // <bstmts> ::= <bstmt> <bstmts> | ε
    fn bstmts(&mut self) -> Result<()> {
        trace!("<bstmts>");
        while self.current_kind().is_bstmt_start() {
            self.bstmt()?;
        }
        Ok(())
    }

    // <bstmt> ::= <vdecl> | <assign> | <cond> | <while> | <for> | <exit> | <expr>
    fn bstmt(&mut self) -> Result<()> {
        trace!("<bstmt>");
        match self.current_kind() {
            TokenKind::Var => self.vdecl(),
            TokenKind::Set => self.assign(),
            TokenKind::If => self.cond(),
            TokenKind::While => self.whileloop(),
            TokenKind::For => self.forloop(),
            TokenKind::Return => self.exitstmt(),
            _ => self.expr(),
        }
    }

    // ==================== Declarations ====================

    // <tdecl> ::= TYPE ID <vdecls> END
    fn tdecl(&mut self) -> Result<()> {
        trace!("<tdecl>");
        self.expect(TokenKind::Type, "'type'")?;
        self.expect(TokenKind::Id, "a type name")?;
        self.vdecls()?;
        self.expect(TokenKind::End, "'end' after type fields")
    }

    // <vdecls> ::= <vdecl> <vdecls> | ε
    fn vdecls(&mut self) -> Result<()> {
        trace!("<vdecls>");
        while self.check(TokenKind::Var) {
            self.vdecl()?;
        }
        Ok(())
    }

    // <fdecl> ::= FUN (<dtype> | NIL) ID LPAREN <params> RPAREN <bstmts> END
    fn fdecl(&mut self) -> Result<()> {
        trace!("<fdecl>");
        self.expect(TokenKind::Fun, "'fun'")?;
        if !self.consume(TokenKind::Nil)? {
            self.dtype()?;
        }
        self.expect(TokenKind::Id, "a function name")?;
        self.expect(TokenKind::LParen, "'(' after function name")?;
        self.params()?;
        self.expect(TokenKind::RParen, "')' after parameters")?;
        self.bstmts()?;
        self.expect(TokenKind::End, "'end' after function body")
    }

    // <params> ::= <dtype> ID (COMMA <dtype> ID)* | ε
    fn params(&mut self) -> Result<()> {
        trace!("<params>");
        if !self.current_kind().is_type() {
            return Ok(());
        }
        self.dtype()?;
        self.expect(TokenKind::Id, "a parameter name")?;
        while self.consume(TokenKind::Comma)? {
            self.dtype()?;
            self.expect(TokenKind::Id, "a parameter name")?;
        }
        Ok(())
    }

    // <dtype> ::= INT_TYPE | DOUBLE_TYPE | BOOL_TYPE | CHAR_TYPE | STRING_TYPE | ID
    fn dtype(&mut self) -> Result<()> {
        trace!("<dtype>");
        if self.current_kind().is_type() {
            self.advance()
        } else {
            Err(self.error("a type"))
        }
    }

    // <vdecl> ::= VAR (ID ID | <dtype> ID | ID) ASSIGN <expr>
    fn vdecl(&mut self) -> Result<()> {
        trace!("<vdecl>");
        self.expect(TokenKind::Var, "'var'")?;

        if self.current_kind().is_builtin_type() {
            self.advance()?;
            self.expect(TokenKind::Id, "a variable name")?;
        } else if self.check(TokenKind::Id) {
            // `var Point p` names a user type; `var p` leaves the type inferred
            if self.peek_kind()? == TokenKind::Id {
                self.advance()?;
            }
            self.advance()?;
        } else {
            return Err(self.error("a type or variable name"));
        }

        self.expect(TokenKind::Assign, "':='")?;
        self.expr()
    }

    // ==================== Basic Statements ====================

    // <assign> ::= SET <lvalue> ASSIGN <expr>
    fn assign(&mut self) -> Result<()> {
        trace!("<assign>");
        self.expect(TokenKind::Set, "'set'")?;
        self.lvalue()?;
        self.expect(TokenKind::Assign, "':='")?;
        self.expr()
    }

    // <lvalue> ::= ID (DOT ID)*
    fn lvalue(&mut self) -> Result<()> {
        trace!("<lvalue>");
        self.expect(TokenKind::Id, "an identifier")?;
        while self.consume(TokenKind::Dot)? {
            self.expect(TokenKind::Id, "a field name after '.'")?;
        }
        Ok(())
    }

    // <cond> ::= IF <expr> THEN <bstmts> <condt> END
    fn cond(&mut self) -> Result<()> {
        trace!("<cond>");
        self.expect(TokenKind::If, "'if'")?;
        self.expr()?;
        self.expect(TokenKind::Then, "'then'")?;
        self.bstmts()?;
        self.condtail()?;
        self.expect(TokenKind::End, "'end' after if statement")
    }

    // <condt> ::= ELIF <expr> THEN <bstmts> <condt> | ELSE <bstmts> | ε
    fn condtail(&mut self) -> Result<()> {
        trace!("<condt>");
        while self.consume(TokenKind::Elif)? {
            self.expr()?;
            self.expect(TokenKind::Then, "'then'")?;
            self.bstmts()?;
        }
        if self.consume(TokenKind::Else)? {
            self.bstmts()?;
        }
        Ok(())
    }

    // <while> ::= WHILE <expr> DO <bstmts> END
    fn whileloop(&mut self) -> Result<()> {
        trace!("<while>");
        self.expect(TokenKind::While, "'while'")?;
        self.expr()?;
        self.expect(TokenKind::Do, "'do'")?;
        self.bstmts()?;
        self.expect(TokenKind::End, "'end' after while loop")
    }

    // <for> ::= FOR ID ASSIGN <expr> TO <expr> DO <bstmts> END
    fn forloop(&mut self) -> Result<()> {
        trace!("<for>");
        self.expect(TokenKind::For, "'for'")?;
        self.expect(TokenKind::Id, "a loop variable")?;
        self.expect(TokenKind::Assign, "':='")?;
        self.expr()?;
        self.expect(TokenKind::To, "'to'")?;
        self.expr()?;
        self.expect(TokenKind::Do, "'do'")?;
        self.bstmts()?;
        self.expect(TokenKind::End, "'end' after for loop")
    }

    // <exit> ::= RETURN (<expr> | ε)
    fn exitstmt(&mut self) -> Result<()> {
        trace!("<exit>");
        self.expect(TokenKind::Return, "'return'")?;
        if self.current_kind().is_expr_start() || self.check(TokenKind::Not) {
            self.expr()?;
        }
        Ok(())
    }

    // ==================== Expressions ====================

    // <expr> ::= NOT <expr> | LPAREN <expr> RPAREN | <rvalue> (<operator> <expr> | ε)
    //
    // One precedence level; only an rvalue takes an operator tail, and the
    // tail nests to the right.
    fn expr(&mut self) -> Result<()> {
        trace!("<expr>");
        loop {
            match self.current_kind() {
                TokenKind::Not => {
                    self.advance()?;
                    continue;
                }
                TokenKind::LParen => {
                    self.advance()?;
                    self.expr()?;
                    return self.expect(TokenKind::RParen, "')' to close expression");
                }
                _ => self.rvalue()?,
            }

            if !self.current_kind().is_operator() {
                return Ok(());
            }
            self.advance()?;
        }
    }

    // <rvalue> ::= NIL | NEW ID | NEG <expr> | <idrval> | <pval>
    fn rvalue(&mut self) -> Result<()> {
        trace!("<rvalue>");
        match self.current_kind() {
            TokenKind::Nil => self.advance(),
            TokenKind::New => {
                self.advance()?;
                self.expect(TokenKind::Id, "a type name after 'new'")
            }
            TokenKind::Neg => {
                self.advance()?;
                self.expr()
            }
            TokenKind::Id => self.idrval(),
            kind if kind.is_literal() => self.advance(),
            _ => Err(self.error("an expression")),
        }
    }

    // <idrval> ::= ID (LPAREN <exprlist> RPAREN | (DOT ID)*)
    fn idrval(&mut self) -> Result<()> {
        trace!("<idrval>");
        self.expect(TokenKind::Id, "an identifier")?;
        if self.consume(TokenKind::LParen)? {
            self.exprlist()?;
            return self.expect(TokenKind::RParen, "')' after arguments");
        }
        while self.consume(TokenKind::Dot)? {
            self.expect(TokenKind::Id, "a field name after '.'")?;
        }
        Ok(())
    }

    // <exprlist> ::= <expr> (COMMA <expr>)* | ε
    fn exprlist(&mut self) -> Result<()> {
        trace!("<exprlist>");
        if !(self.current_kind().is_expr_start() || self.check(TokenKind::Not)) {
            return Ok(());
        }
        self.expr()?;
        while self.consume(TokenKind::Comma)? {
            self.expr()?;
        }
        Ok(())
    }
}
