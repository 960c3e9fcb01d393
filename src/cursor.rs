//! One-token lookahead over a token producer.

use crate::lexer::{Identifier, Keyword, LexerError, Token, TokenKind};
use crate::parser::{ParserError, ParserErrorKind};

/// A producer of tokens, pulled one at a time by the parser.
///
/// `Ok(None)` signals end-of-stream.
pub trait TokenSource {
    fn next_token(&mut self) -> Result<Option<Token>, LexerError>;
}

impl TokenSource for std::vec::IntoIter<Token> {
    fn next_token(&mut self) -> Result<Option<Token>, LexerError> {
        Ok(self.next())
    }
}

pub(crate) struct Cursor<S> {
    source: S,
    lookahead: Option<Token>,
    // end of the last consumed token, reported for errors at end-of-stream
    last_end: usize,
}

impl<S: TokenSource> Cursor<S> {
    pub(crate) fn new(mut source: S) -> Result<Self, ParserError> {
        let lookahead = source.next_token()?;
        Ok(Cursor {
            source,
            lookahead,
            last_end: 0,
        })
    }

    pub(crate) fn peek(&self) -> Option<&TokenKind> {
        self.lookahead.as_ref().map(|t| &t.kind)
    }

    pub(crate) fn peek_keyword(&self) -> Option<Keyword> {
        match self.peek() {
            Some(TokenKind::Keyword(keyword)) => Some(*keyword),
            _ => None,
        }
    }

    pub(crate) fn matches(&self, kind: &TokenKind) -> bool {
        self.peek() == Some(kind)
    }

    pub(crate) fn is_done(&self) -> bool {
        self.lookahead.is_none()
    }

    /// Discard the lookahead and pull the next token from the source.
    /// Returns the discarded token.
    pub(crate) fn advance(&mut self) -> Result<Option<Token>, ParserError> {
        let next = self.source.next_token()?;
        let consumed = std::mem::replace(&mut self.lookahead, next);
        if let Some(token) = &consumed {
            self.last_end = token.span.end;
        }
        Ok(consumed)
    }

    /// Consume the lookahead if it is `kind`.
    pub(crate) fn eat(&mut self, kind: &TokenKind) -> Result<bool, ParserError> {
        if self.matches(kind) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub(crate) fn expect(&mut self, kind: TokenKind, rule: &'static str) -> Result<(), ParserError> {
        if self.matches(&kind) {
            self.advance()?;
            Ok(())
        } else {
            Err(self.unexpected(rule, kind.to_string()))
        }
    }

    pub(crate) fn expect_keyword(
        &mut self,
        keyword: Keyword,
        rule: &'static str,
    ) -> Result<(), ParserError> {
        self.expect(TokenKind::Keyword(keyword), rule)
    }

    pub(crate) fn expect_identifier(&mut self, rule: &'static str) -> Result<Identifier, ParserError> {
        match self.peek() {
            Some(TokenKind::Identifier(name)) => {
                let name = name.clone();
                self.advance()?;
                Ok(name)
            }
            _ => Err(self.unexpected(rule, "identifier")),
        }
    }

    /// Byte offset of the lookahead, or of the end of input once the stream is exhausted.
    pub(crate) fn offset(&self) -> usize {
        self.lookahead
            .as_ref()
            .map(|t| t.span.start)
            .unwrap_or(self.last_end)
    }

    pub(crate) fn found(&self) -> String {
        self.peek()
            .map(|kind| kind.to_string())
            .unwrap_or("EOF".into())
    }

    pub(crate) fn unexpected(&self, rule: &'static str, expected: impl Into<String>) -> ParserError {
        self.error(ParserErrorKind::UnexpectedToken, rule, expected)
    }

    pub(crate) fn error(
        &self,
        kind: ParserErrorKind,
        rule: &'static str,
        expected: impl Into<String>,
    ) -> ParserError {
        ParserError {
            kind,
            rule,
            expected: expected.into(),
            found: self.found(),
            offset: self.offset(),
        }
    }
}
