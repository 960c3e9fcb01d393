//! Precedence ladder, lowest precedence first:
//! `||`, `&&`, equality, relational, additive, multiplicative, unary/primary.
//! Every binary tier folds to the left, so `1 - 2 - 3` is `(1 - 2) - 3`.

use super::{Parser, ParserError};
use crate::ast::{BinaryOperator, Expression, FuncCall, LVal, UnaryOperator};
use crate::cursor::TokenSource;
use crate::lexer::TokenKind;

const LOGICAL_OR: &[BinaryOperator] = &[BinaryOperator::Or];
const LOGICAL_AND: &[BinaryOperator] = &[BinaryOperator::And];
const EQUALITY: &[BinaryOperator] = &[BinaryOperator::Equal, BinaryOperator::NotEqual];
const RELATIONAL: &[BinaryOperator] = &[
    BinaryOperator::LessThan,
    BinaryOperator::GreaterThan,
    BinaryOperator::LessOrEqual,
    BinaryOperator::GreaterOrEqual,
];
const ADDITIVE: &[BinaryOperator] = &[BinaryOperator::Add, BinaryOperator::Subtract];
const MULTIPLICATIVE: &[BinaryOperator] = &[
    BinaryOperator::Multiply,
    BinaryOperator::Divide,
    BinaryOperator::Remainder,
];

fn binary_operator(kind: &TokenKind) -> Option<BinaryOperator> {
    let op = match kind {
        TokenKind::OrOr => BinaryOperator::Or,
        TokenKind::AndAnd => BinaryOperator::And,
        TokenKind::EqualEqual => BinaryOperator::Equal,
        TokenKind::BangEqual => BinaryOperator::NotEqual,
        TokenKind::Less => BinaryOperator::LessThan,
        TokenKind::Greater => BinaryOperator::GreaterThan,
        TokenKind::LessEqual => BinaryOperator::LessOrEqual,
        TokenKind::GreaterEqual => BinaryOperator::GreaterOrEqual,
        TokenKind::Plus => BinaryOperator::Add,
        TokenKind::Minus => BinaryOperator::Subtract,
        TokenKind::Star => BinaryOperator::Multiply,
        TokenKind::Slash => BinaryOperator::Divide,
        TokenKind::Percent => BinaryOperator::Remainder,
        _ => return None,
    };
    Some(op)
}

fn unary_operator(kind: &TokenKind) -> Option<UnaryOperator> {
    match kind {
        TokenKind::Plus => Some(UnaryOperator::Plus),
        TokenKind::Minus => Some(UnaryOperator::Negate),
        TokenKind::Bang => Some(UnaryOperator::Not),
        _ => None,
    }
}

type Tier<S> = fn(&mut Parser<S>) -> Result<Expression, ParserError>;

impl<S: TokenSource> Parser<S> {
    /// Condition of `if` and `while`.
    pub(super) fn logical_or(&mut self) -> Result<Expression, ParserError> {
        self.binary_tier(LOGICAL_OR, Self::logical_and)
    }

    fn logical_and(&mut self) -> Result<Expression, ParserError> {
        self.binary_tier(LOGICAL_AND, Self::equality)
    }

    fn equality(&mut self) -> Result<Expression, ParserError> {
        self.binary_tier(EQUALITY, Self::relational)
    }

    fn relational(&mut self) -> Result<Expression, ParserError> {
        self.binary_tier(RELATIONAL, Self::additive)
    }

    /// Every expression outside a condition.
    pub(super) fn additive(&mut self) -> Result<Expression, ParserError> {
        self.binary_tier(ADDITIVE, Self::multiplicative)
    }

    fn multiplicative(&mut self) -> Result<Expression, ParserError> {
        self.binary_tier(MULTIPLICATIVE, Self::unary)
    }

    fn binary_tier(
        &mut self,
        ops: &[BinaryOperator],
        operand: Tier<S>,
    ) -> Result<Expression, ParserError> {
        let mut lhs = operand(self)?;
        while let Some(op) = self
            .cursor
            .peek()
            .and_then(binary_operator)
            .filter(|op| ops.contains(op))
        {
            self.cursor.advance()?;
            let rhs = operand(self)?;
            lhs = Expression::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expression, ParserError> {
        const RULE: &str = "unary";
        self.nested(RULE, |p| {
            if let Some(op) = p.cursor.peek().and_then(unary_operator) {
                p.cursor.advance()?;
                let operand = p.unary()?;
                return Ok(Expression::Unary(op, Box::new(operand)));
            }

            match p.cursor.peek() {
                Some(TokenKind::OpenParen) => {
                    p.cursor.advance()?;
                    let inner = p.additive()?;
                    p.cursor.expect(TokenKind::CloseParen, RULE)?;
                    Ok(inner)
                }
                Some(TokenKind::Constant(value)) => {
                    let value = *value;
                    p.cursor.advance()?;
                    Ok(Expression::Num(value))
                }
                Some(TokenKind::Identifier(name)) => {
                    let name = name.clone();
                    p.cursor.advance()?;
                    p.named(name)
                }
                _ => Err(p.cursor.unexpected(RULE, "expression")),
            }
        })
    }

    // After an identifier: call, indexed lvalue or plain lvalue.
    fn named(&mut self, name: String) -> Result<Expression, ParserError> {
        if self.cursor.eat(&TokenKind::OpenParen)? {
            let args = self.call_args()?;
            return Ok(Expression::Call(FuncCall { name, args }));
        }

        let mut indices = Vec::new();
        while self.cursor.eat(&TokenKind::OpenBracket)? {
            indices.push(self.additive()?);
            self.cursor.expect(TokenKind::CloseBracket, "lval")?;
        }
        Ok(Expression::LVal(LVal { name, indices }))
    }

    fn call_args(&mut self) -> Result<Vec<Expression>, ParserError> {
        const RULE: &str = "func_call";
        let mut args = Vec::new();
        if self.cursor.eat(&TokenKind::CloseParen)? {
            return Ok(args);
        }
        loop {
            args.push(self.additive()?);
            if !self.cursor.eat(&TokenKind::Comma)? {
                break;
            }
        }
        self.cursor.expect(TokenKind::CloseParen, RULE)?;
        Ok(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ParserErrorKind;
    use crate::parser::tests::parser;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    fn exp(input: &str) -> Expression {
        let mut p = parser(input);
        let exp = p.additive().unwrap();
        assert!(p.cursor.is_done(), "trailing input after {input:?}");
        exp
    }

    fn cond(input: &str) -> Expression {
        let mut p = parser(input);
        let exp = p.logical_or().unwrap();
        assert!(p.cursor.is_done(), "trailing input after {input:?}");
        exp
    }

    fn num(value: i64) -> Box<Expression> {
        Box::new(Expression::Num(value))
    }

    fn var(name: &str) -> Box<Expression> {
        Box::new(Expression::LVal(LVal {
            name: name.into(),
            indices: vec![],
        }))
    }

    #[test]
    fn test_multiplication_binds_tighter() {
        assert_eq!(
            exp("1+2*3"),
            Expression::Binary(
                BinaryOperator::Add,
                num(1),
                Box::new(Expression::Binary(BinaryOperator::Multiply, num(2), num(3)))
            )
        );
    }

    #[test]
    fn test_left_associative() {
        assert_eq!(
            exp("1-2-3"),
            Expression::Binary(
                BinaryOperator::Subtract,
                Box::new(Expression::Binary(BinaryOperator::Subtract, num(1), num(2))),
                num(3)
            )
        );
        assert_eq!(exp("8/4%3*2").to_string(), "(((8 / 4) % 3) * 2)");
    }

    #[test]
    fn test_parentheses() {
        assert_eq!(
            exp("(1+2)*3"),
            Expression::Binary(
                BinaryOperator::Multiply,
                Box::new(Expression::Binary(BinaryOperator::Add, num(1), num(2))),
                num(3)
            )
        );
        assert_eq!(exp("((7))"), Expression::Num(7));
    }

    #[test]
    fn test_unary() {
        assert_eq!(
            exp("--a"),
            Expression::Unary(
                UnaryOperator::Negate,
                Box::new(Expression::Unary(UnaryOperator::Negate, var("a")))
            )
        );
        assert_eq!(
            exp("-a*b"),
            Expression::Binary(
                BinaryOperator::Multiply,
                Box::new(Expression::Unary(UnaryOperator::Negate, var("a"))),
                var("b")
            )
        );
        assert_eq!(exp("+!x").to_string(), "(+(!x))");
    }

    #[test]
    fn test_condition_tiers() {
        assert_eq!(
            cond("a || b && c == d < e + f").to_string(),
            "(a || (b && (c == (d < (e + f)))))"
        );
        assert_eq!(cond("a<b>c<=d>=e").to_string(), "((((a < b) > c) <= d) >= e)");
        assert_eq!(cond("a != b == c").to_string(), "((a != b) == c)");
        assert_eq!(cond("a && b || c && d").to_string(), "((a && b) || (c && d))");
    }

    #[test]
    fn test_general_expression_stops_at_relational() {
        // outside a condition an expression is additive, the rest is left for the caller
        let mut p = parser("a < b");
        assert_eq!(p.additive().unwrap(), *var("a"));
        assert!(p.cursor.matches(&TokenKind::Less));
    }

    #[test]
    fn test_function_call() {
        assert_eq!(
            exp("f()"),
            Expression::Call(FuncCall {
                name: "f".into(),
                args: vec![]
            })
        );
        assert_eq!(
            exp("g(1, a+1, h())"),
            Expression::Call(FuncCall {
                name: "g".into(),
                args: vec![
                    Expression::Num(1),
                    Expression::Binary(BinaryOperator::Add, var("a"), num(1)),
                    Expression::Call(FuncCall {
                        name: "h".into(),
                        args: vec![]
                    }),
                ]
            })
        );
    }

    #[test]
    fn test_indexed_lval() {
        assert_eq!(
            exp("a[0]"),
            Expression::LVal(LVal {
                name: "a".into(),
                indices: vec![Expression::Num(0)]
            })
        );
        assert_eq!(exp("m[i+1][f(j)]").to_string(), "m[(i + 1)][f(j)]");
        assert_eq!(*var("a"), exp("a"));
    }

    #[test]
    fn test_expression_errors() {
        assert_matches!(
            parser("(1+2").additive(),
            Err(ParserError { rule: "unary", expected, found, .. })
                if expected == "`)`" && found == "EOF"
        );
        assert_matches!(
            parser("a[1").additive(),
            Err(ParserError { rule: "lval", expected, .. }) if expected == "`]`"
        );
        assert_matches!(
            parser("f(1,)").additive(),
            Err(ParserError { rule: "unary", expected, found, .. })
                if expected == "expression" && found == "`)`"
        );
        assert_matches!(
            parser("f(1 2)").additive(),
            Err(ParserError { rule: "func_call", expected, .. }) if expected == "`)`"
        );
        assert_matches!(
            parser("1 + * 2").additive(),
            Err(ParserError {
                kind: ParserErrorKind::UnexpectedToken,
                offset: 4,
                ..
            })
        );
        assert_matches!(
            parser("").additive(),
            Err(ParserError { found, .. }) if found == "EOF"
        );
    }
}
