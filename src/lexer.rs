//! Lexer for the C subset
//!
//! Tokens:
//!   keyword    ::= "int" | "void" | "char" | "const" | "if" | "else" | "while"
//!                | "break" | "continue" | "return"
//!   identifier ::= [A-Za-z_][A-Za-z0-9_]*
//!   constant   ::= decimal | "0" octal | ("0x" | "0X") hexadecimal
//!   punctuator ::= ( ) [ ] { } , ; = + - * / % ! < > <= >= == != && ||
//!
//! Whitespace, `// line` and `/* block */` comments separate tokens and are discarded.
//! The lexer is pulled one token at a time by the parser, see [`crate::TokenSource`].

use crate::cursor::TokenSource;
use derive_more::Display;
use std::ops::Range;
use thiserror::Error;
use winnow::ascii::{digit0, hex_digit1, multispace1, oct_digit1};
use winnow::combinator::{alt, not, preceded, repeat, terminated};
use winnow::prelude::*;
use winnow::token::{one_of, take_till, take_until, take_while};

pub type Identifier = String;

#[derive(Debug, PartialEq, Error)]
#[error("{message}")]
pub struct LexerError {
    pub message: String,
    pub offset: usize,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Range<usize>,
}

#[derive(Debug, PartialEq, Clone, Display)]
pub enum TokenKind {
    #[display("keyword `{_0}`")]
    Keyword(Keyword),
    #[display("identifier `{_0}`")]
    Identifier(Identifier),
    #[display("constant `{_0}`")]
    Constant(i64),
    #[display("`(`")]
    OpenParen,
    #[display("`)`")]
    CloseParen,
    #[display("`[`")]
    OpenBracket,
    #[display("`]`")]
    CloseBracket,
    #[display("`{{`")]
    OpenBrace,
    #[display("`}}`")]
    CloseBrace,
    #[display("`,`")]
    Comma,
    #[display("`;`")]
    Semicolon,
    #[display("`=`")]
    Assign,
    #[display("`+`")]
    Plus,
    #[display("`-`")]
    Minus,
    #[display("`*`")]
    Star,
    #[display("`/`")]
    Slash,
    #[display("`%`")]
    Percent,
    #[display("`!`")]
    Bang,
    #[display("`<`")]
    Less,
    #[display("`>`")]
    Greater,
    #[display("`<=`")]
    LessEqual,
    #[display("`>=`")]
    GreaterEqual,
    #[display("`==`")]
    EqualEqual,
    #[display("`!=`")]
    BangEqual,
    #[display("`&&`")]
    AndAnd,
    #[display("`||`")]
    OrOr,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Display)]
pub enum Keyword {
    #[display("int")]
    Int,
    #[display("void")]
    Void,
    #[display("char")]
    Char,
    #[display("const")]
    Const,
    #[display("if")]
    If,
    #[display("else")]
    Else,
    #[display("while")]
    While,
    #[display("break")]
    Break,
    #[display("continue")]
    Continue,
    #[display("return")]
    Return,
}

impl Keyword {
    fn from_word(word: &str) -> Option<Self> {
        let keyword = match word {
            "int" => Keyword::Int,
            "void" => Keyword::Void,
            "char" => Keyword::Char,
            "const" => Keyword::Const,
            "if" => Keyword::If,
            "else" => Keyword::Else,
            "while" => Keyword::While,
            "break" => Keyword::Break,
            "continue" => Keyword::Continue,
            "return" => Keyword::Return,
            _ => return None,
        };
        Some(keyword)
    }
}

/// Streaming token producer over a source string.
pub struct Lexer<'s> {
    input: &'s str,
    remaining: &'s str,
}

impl<'s> Lexer<'s> {
    pub fn new(input: &'s str) -> Self {
        Lexer {
            input,
            remaining: input,
        }
    }

    fn offset(&self) -> usize {
        self.input.len() - self.remaining.len()
    }

    /// Returns the next token, or `None` once the input is exhausted.
    pub fn next_token(&mut self) -> Result<Option<Token>, LexerError> {
        trivia
            .parse_next(&mut self.remaining)
            .map_err(|e| LexerError {
                message: format!("Lexer error: {e}"),
                offset: self.offset(),
            })?;

        if self.remaining.starts_with("/*") {
            return Err(LexerError {
                message: "Lexer error: unterminated block comment".to_string(),
                offset: self.offset(),
            });
        }

        if self.remaining.is_empty() {
            return Ok(None);
        }

        let start = self.offset();
        let before = self.remaining;
        let kind = token.parse_next(&mut self.remaining).map_err(|_| {
            let lexeme: String = before
                .chars()
                .take_while(|c| !c.is_whitespace())
                .take(16)
                .collect();
            LexerError {
                message: format!("Lexer error: invalid token starting at {lexeme:?}"),
                offset: start,
            }
        })?;

        let token = Token {
            kind,
            span: start..self.offset(),
        };
        log::trace!("token {} at {:?}", token.kind, token.span);
        Ok(Some(token))
    }
}

impl TokenSource for Lexer<'_> {
    fn next_token(&mut self) -> Result<Option<Token>, LexerError> {
        Lexer::next_token(self)
    }
}

/// Lex the whole input eagerly.
pub fn lex(input: &str) -> Result<Vec<Token>, LexerError> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token()? {
        tokens.push(token);
    }
    Ok(tokens)
}

fn trivia(input: &mut &str) -> winnow::Result<()> {
    repeat(0.., alt((multispace1.void(), line_comment, block_comment))).parse_next(input)
}

fn line_comment(input: &mut &str) -> winnow::Result<()> {
    ("//", take_till(0.., '\n')).void().parse_next(input)
}

fn block_comment(input: &mut &str) -> winnow::Result<()> {
    ("/*", take_until(0.., "*/"), "*/").void().parse_next(input)
}

fn token(input: &mut &str) -> winnow::Result<TokenKind> {
    alt((word, constant, punctuator)).parse_next(input)
}

fn word(input: &mut &str) -> winnow::Result<TokenKind> {
    (
        one_of(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., |c: char| c.is_ascii_alphanumeric() || c == '_'),
    )
        .take()
        .map(|w: &str| match Keyword::from_word(w) {
            Some(keyword) => TokenKind::Keyword(keyword),
            None => TokenKind::Identifier(w.to_string()),
        })
        .parse_next(input)
}

// A constant must end on a word boundary: `123abc` is not a constant followed by an identifier.
// A leading `0` makes it octal, so `09` is rejected rather than read as decimal.
fn constant(input: &mut &str) -> winnow::Result<TokenKind> {
    terminated(
        alt((
            preceded(alt(("0x", "0X")), hex_digit1)
                .try_map(|digits: &str| i64::from_str_radix(digits, 16)),
            preceded('0', oct_digit1).try_map(|digits: &str| i64::from_str_radix(digits, 8)),
            '0'.value(0),
            (one_of('1'..='9'), digit0)
                .take()
                .try_map(|digits: &str| digits.parse::<i64>()),
        )),
        not(one_of(|c: char| c.is_ascii_alphanumeric() || c == '_')),
    )
    .map(TokenKind::Constant)
    .parse_next(input)
}

fn punctuator(input: &mut &str) -> winnow::Result<TokenKind> {
    // two-character operators first so `<=` is never read as `<` `=`
    alt((
        alt((
            "<=".value(TokenKind::LessEqual),
            ">=".value(TokenKind::GreaterEqual),
            "==".value(TokenKind::EqualEqual),
            "!=".value(TokenKind::BangEqual),
            "&&".value(TokenKind::AndAnd),
            "||".value(TokenKind::OrOr),
        )),
        alt((
            '('.value(TokenKind::OpenParen),
            ')'.value(TokenKind::CloseParen),
            '['.value(TokenKind::OpenBracket),
            ']'.value(TokenKind::CloseBracket),
            '{'.value(TokenKind::OpenBrace),
            '}'.value(TokenKind::CloseBrace),
            ','.value(TokenKind::Comma),
            ';'.value(TokenKind::Semicolon),
            '='.value(TokenKind::Assign),
            '+'.value(TokenKind::Plus),
            '-'.value(TokenKind::Minus),
            '*'.value(TokenKind::Star),
            '/'.value(TokenKind::Slash),
            '%'.value(TokenKind::Percent),
            '!'.value(TokenKind::Bang),
            '<'.value(TokenKind::Less),
            '>'.value(TokenKind::Greater),
        )),
    ))
    .parse_next(input)
}
