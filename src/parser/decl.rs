use super::{Parser, ParserError, ParserErrorKind};
use crate::ast::{Dimension, Id, InitVal, VarDecl, VarDef};
use crate::cursor::TokenSource;
use crate::lexer::{Identifier, Keyword, TokenKind};

impl<S: TokenSource> Parser<S> {
    /// `[const] int <var_def> {, <var_def>} ;`
    pub(super) fn var_decl(&mut self) -> Result<VarDecl, ParserError> {
        const RULE: &str = "var_decl";
        let is_const = self.cursor.eat(&TokenKind::Keyword(Keyword::Const))?;
        self.scalar_type(RULE)?;

        let mut defs = vec![self.var_def(is_const)?];
        while self.cursor.eat(&TokenKind::Comma)? {
            defs.push(self.var_def(is_const)?);
        }
        self.cursor.expect(TokenKind::Semicolon, RULE)?;

        log::trace!("var_decl with {} definitions, const: {is_const}", defs.len());
        Ok(VarDecl { is_const, defs })
    }

    pub(super) fn var_def(&mut self, is_const: bool) -> Result<VarDef, ParserError> {
        let name = self.cursor.expect_identifier("var_def")?;
        self.var_def_named(name, is_const)
    }

    /// The rest of a definition once its name has been consumed.
    pub(super) fn var_def_named(
        &mut self,
        name: Identifier,
        is_const: bool,
    ) -> Result<VarDef, ParserError> {
        const RULE: &str = "var_def";

        let mut dims = Vec::new();
        while self.cursor.eat(&TokenKind::OpenBracket)? {
            dims.push(Dimension::Sized(self.additive()?));
            self.cursor.expect(TokenKind::CloseBracket, RULE)?;
        }

        let init = if self.cursor.eat(&TokenKind::Assign)? {
            Some(self.init_val()?)
        } else if is_const {
            return Err(self.cursor.error(
                ParserErrorKind::MissingConstInitializer,
                RULE,
                TokenKind::Assign.to_string(),
            ));
        } else {
            None
        };

        Ok(VarDef {
            is_const,
            target: Id {
                name,
                is_const,
                dims,
            },
            init,
        })
    }

    fn init_val(&mut self) -> Result<InitVal, ParserError> {
        const RULE: &str = "init_val";
        self.nested(RULE, |p| {
            if !p.cursor.eat(&TokenKind::OpenBrace)? {
                return Ok(InitVal::Scalar(p.additive()?));
            }

            let mut elements = Vec::new();
            if !p.cursor.matches(&TokenKind::CloseBrace) {
                loop {
                    elements.push(p.init_val()?);
                    if !p.cursor.eat(&TokenKind::Comma)? {
                        break;
                    }
                }
            }
            p.cursor.expect(TokenKind::CloseBrace, RULE)?;
            Ok(InitVal::Aggregate(elements))
        })
    }
}
