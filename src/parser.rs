//! Recursive-descent parser for the C subset
//!
//! Grammar:
//!   <comp_unit> ::= { <var_decl> | <func_def> }
//!   <func_def> ::= ("int" | "void" | "char") <identifier> "(" [ <params> ] ")" <block>
//!   <params> ::= <param> { "," <param> }
//!   <param> ::= "int" <identifier> [ "[" "]" { "[" <exp> "]" } ]
//!   <var_decl> ::= [ "const" ] "int" <var_def> { "," <var_def> } ";"
//!   <var_def> ::= <identifier> { "[" <exp> "]" } [ "=" <init_val> ]
//!   <init_val> ::= <exp> | "{" [ <init_val> { "," <init_val> } ] "}"
//!   <block> ::= "{" { <var_decl> | <statement> } "}"
//!   <statement> ::= ";" | <block>
//!                 | "while" "(" <cond> ")" <statement>
//!                 | "if" "(" <cond> ")" <statement> [ "else" <statement> ]
//!                 | "break" ";" | "continue" ";" | "return" [ <exp> ] ";"
//!                 | <lval> "=" <exp> ";"
//!                 | <exp> ";"
//!   <cond> ::= <logical_or>
//!   <exp> ::= <additive>
//!   <logical_or> ::= <logical_and> { "||" <logical_and> }
//!   <logical_and> ::= <equality> { "&&" <equality> }
//!   <equality> ::= <relational> { ("==" | "!=") <relational> }
//!   <relational> ::= <additive> { ("<" | ">" | "<=" | ">=") <additive> }
//!   <additive> ::= <multiplicative> { ("+" | "-") <multiplicative> }
//!   <multiplicative> ::= <unary> { ("*" | "/" | "%") <unary> }
//!   <unary> ::= "(" <exp> ")" | <int> | ("+" | "-" | "!") <unary>
//!             | <identifier> "(" [ <exp> { "," <exp> } ] ")"
//!             | <identifier> { "[" <exp> "]" }
//!
//! One token of lookahead, no backtracking. The first error aborts the parse.

mod decl;
mod expr;
mod stmt;

use crate::ast::{CompUnit, Dimension, FuncDef, FuncType, GlobalItem, Id, VarDecl};
use crate::cursor::{Cursor, TokenSource};
use crate::lexer::{Keyword, LexerError, TokenKind};
use derive_more::Display;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

/// Nesting limit used when none is configured. Each level costs a handful of stack frames.
pub const DEFAULT_MAX_DEPTH: usize = 128;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Display)]
pub enum ParserErrorKind {
    #[display("unexpected token")]
    UnexpectedToken,
    #[display("const declaration without initializer")]
    MissingConstInitializer,
    #[display("unsupported type")]
    UnsupportedType,
    #[display("nesting too deep")]
    NestingTooDeep,
    #[display("cancelled")]
    Cancelled,
    #[display("lexer error")]
    Lexer,
}

#[derive(Debug, PartialEq, Error)]
#[error("{rule}: expected {expected}, found {found}")]
pub struct ParserError {
    pub kind: ParserErrorKind,
    /// Grammar rule being parsed when the error occurred
    pub rule: &'static str,
    pub expected: String,
    pub found: String,
    /// Byte offset into the source
    pub offset: usize,
}

impl From<LexerError> for ParserError {
    fn from(error: LexerError) -> Self {
        ParserError {
            kind: ParserErrorKind::Lexer,
            rule: "token",
            expected: "valid token".to_string(),
            found: error.message,
            offset: error.offset,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Maximum nesting of expressions, statements, blocks and initializers.
    pub max_depth: usize,
    /// When set, the parse stops with `ParserErrorKind::Cancelled` at the next
    /// top-level item or block item.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            max_depth: DEFAULT_MAX_DEPTH,
            cancel: None,
        }
    }
}

pub(crate) struct Parser<S> {
    cursor: Cursor<S>,
    config: ParserConfig,
    depth: usize,
}

/// Parse a complete compilation unit from `source`.
pub fn parse<S: TokenSource>(source: S) -> Result<CompUnit, ParserError> {
    parse_with_config(source, &ParserConfig::default())
}

pub fn parse_with_config<S: TokenSource>(
    source: S,
    config: &ParserConfig,
) -> Result<CompUnit, ParserError> {
    let mut parser = Parser::new(source, config.clone())?;
    let comp_unit = parser.comp_unit()?;
    log::debug!("parsed {} top-level items", comp_unit.items.len());
    Ok(comp_unit)
}

impl<S: TokenSource> Parser<S> {
    pub(crate) fn new(source: S, config: ParserConfig) -> Result<Self, ParserError> {
        Ok(Parser {
            cursor: Cursor::new(source)?,
            config,
            depth: 0,
        })
    }

    /// Run `f` one nesting level deeper, failing once `max_depth` is exceeded.
    fn nested<T>(
        &mut self,
        rule: &'static str,
        f: impl FnOnce(&mut Self) -> Result<T, ParserError>,
    ) -> Result<T, ParserError> {
        if self.depth >= self.config.max_depth {
            return Err(self.cursor.error(
                ParserErrorKind::NestingTooDeep,
                rule,
                format!("at most {} levels of nesting", self.config.max_depth),
            ));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn check_cancelled(&self, rule: &'static str) -> Result<(), ParserError> {
        match &self.config.cancel {
            Some(flag) if flag.load(Ordering::Relaxed) => Err(self.cursor.error(
                ParserErrorKind::Cancelled,
                rule,
                "parse to continue",
            )),
            _ => Ok(()),
        }
    }

    pub(crate) fn comp_unit(&mut self) -> Result<CompUnit, ParserError> {
        const RULE: &str = "comp_unit";
        let mut items = Vec::new();

        while !self.cursor.is_done() {
            self.check_cancelled(RULE)?;
            let item = match self.cursor.peek_keyword() {
                Some(Keyword::Const) => GlobalItem::Decl(self.var_decl()?),
                Some(Keyword::Void | Keyword::Char) => GlobalItem::Func(self.func_def()?),
                Some(Keyword::Int) => self.int_item()?,
                _ => {
                    return Err(self
                        .cursor
                        .unexpected(RULE, "declaration or function definition"));
                }
            };
            log::trace!("parsed top-level item at offset {}", self.cursor.offset());
            items.push(item);
        }

        Ok(CompUnit { items })
    }

    // `int` opens either a function definition or a variable declaration;
    // the token after the name decides which.
    fn int_item(&mut self) -> Result<GlobalItem, ParserError> {
        const RULE: &str = "comp_unit";
        self.cursor.expect_keyword(Keyword::Int, RULE)?;
        let name = self.cursor.expect_identifier(RULE)?;

        if self.cursor.matches(&TokenKind::OpenParen) {
            let params = self.func_params()?;
            let body = self.block()?;
            return Ok(GlobalItem::Func(FuncDef {
                ret: FuncType::Int,
                name,
                params,
                body,
            }));
        }

        let mut defs = vec![self.var_def_named(name, false)?];
        while self.cursor.eat(&TokenKind::Comma)? {
            defs.push(self.var_def(false)?);
        }
        self.cursor.expect(TokenKind::Semicolon, "var_decl")?;

        Ok(GlobalItem::Decl(VarDecl {
            is_const: false,
            defs,
        }))
    }

    pub(crate) fn func_def(&mut self) -> Result<FuncDef, ParserError> {
        const RULE: &str = "func_def";
        let ret = match self.cursor.peek_keyword() {
            Some(Keyword::Int) => FuncType::Int,
            Some(Keyword::Void) => FuncType::Void,
            Some(Keyword::Char) => FuncType::Char,
            _ => return Err(self.cursor.unexpected(RULE, "return type")),
        };
        self.cursor.advance()?;
        let name = self.cursor.expect_identifier(RULE)?;
        let params = self.func_params()?;
        let body = self.block()?;
        Ok(FuncDef {
            ret,
            name,
            params,
            body,
        })
    }

    fn func_params(&mut self) -> Result<Vec<Id>, ParserError> {
        const RULE: &str = "func_params";
        self.cursor.expect(TokenKind::OpenParen, RULE)?;

        let mut params = Vec::new();
        if !self.cursor.matches(&TokenKind::CloseParen) {
            loop {
                params.push(self.func_param()?);
                if !self.cursor.eat(&TokenKind::Comma)? {
                    break;
                }
            }
        }

        self.cursor.expect(TokenKind::CloseParen, RULE)?;
        Ok(params)
    }

    // int name | int name[] | int name[][exp]...
    fn func_param(&mut self) -> Result<Id, ParserError> {
        const RULE: &str = "func_param";
        self.scalar_type(RULE)?;
        let name = self.cursor.expect_identifier(RULE)?;

        let mut dims = Vec::new();
        if self.cursor.eat(&TokenKind::OpenBracket)? {
            self.cursor.expect(TokenKind::CloseBracket, RULE)?;
            dims.push(Dimension::Unspecified);
            while self.cursor.eat(&TokenKind::OpenBracket)? {
                dims.push(Dimension::Sized(self.additive()?));
                self.cursor.expect(TokenKind::CloseBracket, RULE)?;
            }
        }

        Ok(Id {
            name,
            is_const: false,
            dims,
        })
    }

    /// Consume the only supported scalar type, `int`.
    fn scalar_type(&mut self, rule: &'static str) -> Result<(), ParserError> {
        match self.cursor.peek_keyword() {
            Some(Keyword::Int) => {
                self.cursor.advance()?;
                Ok(())
            }
            Some(Keyword::Void | Keyword::Char) => {
                Err(self
                    .cursor
                    .error(ParserErrorKind::UnsupportedType, rule, "type `int`"))
            }
            _ => Err(self.cursor.unexpected(rule, "type `int`")),
        }
    }
}
