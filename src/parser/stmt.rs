use super::{Parser, ParserError};
use crate::ast::{Block, BlockItem, Control, Expression, Statement};
use crate::cursor::TokenSource;
use crate::lexer::{Keyword, TokenKind};

impl<S: TokenSource> Parser<S> {
    pub(super) fn block(&mut self) -> Result<Block, ParserError> {
        const RULE: &str = "block";
        self.nested(RULE, |p| {
            p.cursor.expect(TokenKind::OpenBrace, RULE)?;

            let mut items = Vec::new();
            loop {
                p.check_cancelled(RULE)?;
                match p.cursor.peek() {
                    Some(TokenKind::CloseBrace) => break,
                    None => return Err(p.cursor.unexpected(RULE, TokenKind::CloseBrace.to_string())),
                    Some(TokenKind::Keyword(
                        Keyword::Const | Keyword::Int | Keyword::Void | Keyword::Char,
                    )) => {
                        items.push(BlockItem::D(p.var_decl()?));
                    }
                    Some(_) => items.push(BlockItem::S(p.statement()?)),
                }
            }

            p.cursor.expect(TokenKind::CloseBrace, RULE)?;
            log::trace!("block with {} items", items.len());
            Ok(Block { items })
        })
    }

    pub(super) fn statement(&mut self) -> Result<Statement, ParserError> {
        const RULE: &str = "statement";
        self.nested(RULE, |p| match p.cursor.peek() {
            Some(TokenKind::Semicolon) => {
                p.cursor.advance()?;
                Ok(Statement::Empty)
            }
            Some(TokenKind::OpenBrace) => Ok(Statement::Compound(p.block()?)),
            Some(TokenKind::Keyword(Keyword::While)) => p.while_statement(),
            Some(TokenKind::Keyword(Keyword::If)) => p.if_statement(),
            Some(TokenKind::Keyword(Keyword::Break)) => {
                p.cursor.advance()?;
                p.cursor.expect(TokenKind::Semicolon, RULE)?;
                Ok(Statement::Control(Control::Break))
            }
            Some(TokenKind::Keyword(Keyword::Continue)) => {
                p.cursor.advance()?;
                p.cursor.expect(TokenKind::Semicolon, RULE)?;
                Ok(Statement::Control(Control::Continue))
            }
            Some(TokenKind::Keyword(Keyword::Return)) => {
                p.cursor.advance()?;
                if p.cursor.eat(&TokenKind::Semicolon)? {
                    return Ok(Statement::Control(Control::Return(None)));
                }
                let value = p.additive()?;
                p.cursor.expect(TokenKind::Semicolon, RULE)?;
                Ok(Statement::Control(Control::Return(Some(value))))
            }
            _ => p.expression_statement(),
        })
    }

    // Parse an expression first, then decide: an lvalue followed by `=` is an assignment,
    // anything else must end the statement.
    fn expression_statement(&mut self) -> Result<Statement, ParserError> {
        const RULE: &str = "statement";
        match self.additive()? {
            Expression::LVal(target) if self.cursor.matches(&TokenKind::Assign) => {
                self.cursor.advance()?;
                let value = self.additive()?;
                self.cursor.expect(TokenKind::Semicolon, RULE)?;
                Ok(Statement::Assign { target, value })
            }
            exp => {
                self.cursor.expect(TokenKind::Semicolon, RULE)?;
                Ok(Statement::Exp(exp))
            }
        }
    }

    fn condition(&mut self, rule: &'static str) -> Result<Expression, ParserError> {
        self.cursor.expect(TokenKind::OpenParen, rule)?;
        let condition = self.logical_or()?;
        self.cursor.expect(TokenKind::CloseParen, rule)?;
        Ok(condition)
    }

    fn while_statement(&mut self) -> Result<Statement, ParserError> {
        const RULE: &str = "while";
        self.cursor.expect_keyword(Keyword::While, RULE)?;
        let condition = self.condition(RULE)?;
        let body = self.statement()?;
        Ok(Statement::While {
            condition,
            body: Box::new(body),
        })
    }

    // A trailing `else` always belongs to the innermost `if`: the nested
    // statement() call sees it first.
    fn if_statement(&mut self) -> Result<Statement, ParserError> {
        const RULE: &str = "if";
        self.cursor.expect_keyword(Keyword::If, RULE)?;
        let condition = self.condition(RULE)?;
        let then = self.statement()?;
        let else_ = if self.cursor.eat(&TokenKind::Keyword(Keyword::Else))? {
            Some(Box::new(self.statement()?))
        } else {
            None
        };
        Ok(Statement::If {
            condition,
            then: Box::new(then),
            else_,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinaryOperator, Dimension, FuncCall, Id, LVal, VarDecl, VarDef};
    use crate::parser::ParserErrorKind;
    use crate::parser::tests::parser;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    fn stmt(input: &str) -> Statement {
        let mut p = parser(input);
        let statement = p.statement().unwrap();
        assert!(p.cursor.is_done(), "trailing input after {input:?}");
        statement
    }

    fn lval(name: &str) -> LVal {
        LVal {
            name: name.into(),
            indices: vec![],
        }
    }

    fn var(name: &str) -> Expression {
        Expression::LVal(lval(name))
    }

    #[test]
    fn test_dangling_else_binds_to_inner_if() {
        assert_eq!(
            stmt("if(a) if(b) s1; else s2;"),
            Statement::If {
                condition: var("a"),
                then: Box::new(Statement::If {
                    condition: var("b"),
                    then: Box::new(Statement::Exp(var("s1"))),
                    else_: Some(Box::new(Statement::Exp(var("s2")))),
                }),
                else_: None,
            }
        );
    }

    #[test]
    fn test_else_after_block_binds_to_outer_if() {
        assert_matches!(
            stmt("if(a) { if(b) s1; } else s2;"),
            Statement::If { else_: Some(_), .. }
        );
    }

    #[test]
    fn test_assignment() {
        assert_eq!(
            stmt("a=1;"),
            Statement::Assign {
                target: lval("a"),
                value: Expression::Num(1),
            }
        );
        assert_eq!(
            stmt("a[i][2] = a[i][1] + 1;"),
            Statement::Assign {
                target: LVal {
                    name: "a".into(),
                    indices: vec![var("i"), Expression::Num(2)],
                },
                value: Expression::Binary(
                    BinaryOperator::Add,
                    Box::new(Expression::LVal(LVal {
                        name: "a".into(),
                        indices: vec![var("i"), Expression::Num(1)],
                    })),
                    Box::new(Expression::Num(1)),
                ),
            }
        );
    }

    #[test]
    fn test_expression_statement() {
        assert_eq!(stmt("a;"), Statement::Exp(var("a")));
        assert_eq!(
            stmt("putint(1);"),
            Statement::Exp(Expression::Call(FuncCall {
                name: "putint".into(),
                args: vec![Expression::Num(1)],
            }))
        );
        assert_eq!(stmt("1 + a;").to_string(), "(1 + a);");
    }

    #[test]
    fn test_only_lvalues_are_assignable() {
        assert_matches!(
            parser("f() = 1;").statement(),
            Err(ParserError { rule: "statement", expected, found, .. })
                if expected == "`;`" && found == "`=`"
        );
        assert_matches!(
            parser("(a) + 1 = 2;").statement(),
            Err(ParserError { rule: "statement", .. })
        );
    }

    #[test]
    fn test_parenthesized_lvalue_is_assignable() {
        // parentheses are not kept in the tree, so `(a)` is the lvalue `a`
        assert_eq!(
            stmt("(a) = 2;"),
            Statement::Assign {
                target: lval("a"),
                value: Expression::Num(2),
            }
        );
    }

    #[test]
    fn test_control() {
        assert_eq!(stmt("break;"), Statement::Control(Control::Break));
        assert_eq!(stmt("continue;"), Statement::Control(Control::Continue));
        assert_eq!(stmt("return;"), Statement::Control(Control::Return(None)));
        assert_eq!(
            stmt("return a;"),
            Statement::Control(Control::Return(Some(var("a"))))
        );
        assert_matches!(
            parser("break 1;").statement(),
            Err(ParserError { expected, .. }) if expected == "`;`"
        );
        assert_matches!(
            parser("return 1").statement(),
            Err(ParserError { found, .. }) if found == "EOF"
        );
    }

    #[test]
    fn test_while() {
        assert_eq!(
            stmt("while (i < n) i = i + 1;").to_string(),
            "while ((i < n)) i = (i + 1);"
        );
        assert_matches!(
            parser("while i < n) ;").statement(),
            Err(ParserError { rule: "while", expected, .. }) if expected == "`(`"
        );
        assert_matches!(
            parser("while (1 ;").statement(),
            Err(ParserError { rule: "while", expected, .. }) if expected == "`)`"
        );
    }

    #[test]
    fn test_if_requires_parenthesized_condition() {
        assert_matches!(
            parser("if a ;").statement(),
            Err(ParserError { rule: "if", expected, .. }) if expected == "`(`"
        );
    }

    #[test]
    fn test_empty_statement() {
        assert_eq!(stmt(";"), Statement::Empty);
        assert_eq!(stmt("{}"), Statement::Compound(Block::default()));
    }

    #[test]
    fn test_block_with_declarations() {
        let mut p = parser("{ const int n = 2; int a[n]; a[0] = n; ; }");
        let block = p.block().unwrap();
        assert_eq!(block.items.len(), 4);
        assert_matches!(&block.items[0], BlockItem::D(VarDecl { is_const: true, .. }));
        assert_eq!(
            block.items[1],
            BlockItem::D(VarDecl {
                is_const: false,
                defs: vec![VarDef {
                    is_const: false,
                    target: Id {
                        name: "a".into(),
                        is_const: false,
                        dims: vec![Dimension::Sized(var("n"))],
                    },
                    init: None,
                }],
            })
        );
        assert_matches!(&block.items[2], BlockItem::S(Statement::Assign { .. }));
        assert_eq!(block.items[3], BlockItem::S(Statement::Empty));
    }

    #[test]
    fn test_block_scope_order_is_preserved() {
        let block = parser("{ a = 1; int a; a = 2; }").block().unwrap();
        assert_matches!(
            &block.items[..],
            [BlockItem::S(Statement::Assign { .. }), BlockItem::D(_), BlockItem::S(Statement::Assign { .. })]
        );
    }

    #[test]
    fn test_unclosed_block() {
        assert_matches!(
            parser("{ a = 1;").block(),
            Err(ParserError {
                kind: ParserErrorKind::UnexpectedToken,
                rule: "block",
                found,
                ..
            }) if found == "EOF"
        );
    }
}
