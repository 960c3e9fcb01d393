//! AST for the C subset
//!
//! ASDL:
//!   comp_unit = CompUnit(global_item* items)
//!   global_item = Decl(var_decl) | Func(func_def)
//!   func_def = FuncDef(func_type ret, identifier name, id* params, block body)
//!   func_type = Int | Void | Char
//!   func_call = FuncCall(identifier name, exp* args)
//!   var_decl = VarDecl(bool is_const, var_def* defs)
//!   var_def = VarDef(bool is_const, id target, init_val? init)
//!   id = Id(identifier name, bool is_const, dimension* dims)
//!   dimension = Unspecified | Sized(exp)
//!   init_val = Scalar(exp) | Aggregate(init_val*)
//!   block = Block(block_item* items)
//!   block_item = D(var_decl) | S(statement)
//!   statement = Empty
//!             | Compound(block)
//!             | If(exp condition, statement then, statement? else)
//!             | While(exp condition, statement body)
//!             | Control(control)
//!             | Assign(lval target, exp value)
//!             | Exp(exp)
//!   control = Break | Continue | Return(exp?)
//!   exp = Num(int)
//!       | LVal(lval)
//!       | Call(func_call)
//!       | Unary(unary_operator, exp)
//!       | Binary(binary_operator, exp, exp)
//!   lval = LVal(identifier name, exp* indices)
//!   unary_operator = Plus | Negate | Not
//!   binary_operator = Add | Subtract | Multiply | Divide | Remainder
//!                   | LessThan | GreaterThan | LessOrEqual | GreaterOrEqual
//!                   | Equal | NotEqual | And | Or
//!
//! Every node is owned by its parent; the tree is built once by the parser and never mutated.
//! `Display` is a diagnostic rendering only, it is not guaranteed to re-parse.

use crate::lexer::Identifier;
use derive_more::Display;
use std::fmt::{self, Formatter};

#[derive(Debug, PartialEq, Clone)]
pub struct CompUnit {
    pub items: Vec<GlobalItem>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum GlobalItem {
    Decl(VarDecl),
    Func(FuncDef),
}

#[derive(Debug, PartialEq, Clone, Copy, Display)]
pub enum FuncType {
    #[display("int")]
    Int,
    #[display("void")]
    Void,
    #[display("char")]
    Char,
}

#[derive(Debug, PartialEq, Clone)]
pub struct FuncDef {
    pub ret: FuncType,
    pub name: Identifier,
    pub params: Vec<Id>,
    pub body: Block,
}

#[derive(Debug, PartialEq, Clone)]
pub struct FuncCall {
    pub name: Identifier,
    pub args: Vec<Expression>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct VarDecl {
    pub is_const: bool,
    pub defs: Vec<VarDef>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct VarDef {
    pub is_const: bool,
    pub target: Id,
    pub init: Option<InitVal>,
}

/// Whether a name refers to a single value or to an array.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Display)]
pub enum VarKind {
    #[display("scalar")]
    Scalar,
    #[display("array")]
    Array,
}

/// A declared name: variable, constant or function parameter.
#[derive(Debug, PartialEq, Clone)]
pub struct Id {
    pub name: Identifier,
    pub is_const: bool,
    pub dims: Vec<Dimension>,
}

impl Id {
    pub fn kind(&self) -> VarKind {
        if self.dims.is_empty() {
            VarKind::Scalar
        } else {
            VarKind::Array
        }
    }
}

/// One array dimension. Only the leading dimension of an array parameter
/// (`int a[]`) may be `Unspecified`.
#[derive(Debug, PartialEq, Clone)]
pub enum Dimension {
    Unspecified,
    Sized(Expression),
}

#[derive(Debug, PartialEq, Clone)]
pub enum InitVal {
    Scalar(Expression),
    Aggregate(Vec<InitVal>),
}

impl InitVal {
    pub fn kind(&self) -> VarKind {
        match self {
            InitVal::Scalar(_) => VarKind::Scalar,
            InitVal::Aggregate(_) => VarKind::Array,
        }
    }
}

#[derive(Debug, PartialEq, Clone, Default)]
pub struct Block {
    pub items: Vec<BlockItem>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum BlockItem {
    D(VarDecl),
    S(Statement),
}

#[derive(Debug, PartialEq, Clone)]
pub enum Statement {
    Empty,
    Compound(Block),
    If {
        condition: Expression,
        then: Box<Statement>,
        else_: Option<Box<Statement>>,
    },
    While {
        condition: Expression,
        body: Box<Statement>,
    },
    Control(Control),
    Assign {
        target: LVal,
        value: Expression,
    },
    Exp(Expression),
}

#[derive(Debug, PartialEq, Clone)]
pub enum Control {
    Break,
    Continue,
    Return(Option<Expression>),
}

#[derive(Debug, PartialEq, Clone)]
pub enum Expression {
    Num(i64),
    LVal(LVal),
    Call(FuncCall),
    Unary(UnaryOperator, Box<Expression>),
    Binary(BinaryOperator, Box<Expression>, Box<Expression>),
}

/// A reference to a variable, optionally indexed.
#[derive(Debug, PartialEq, Clone)]
pub struct LVal {
    pub name: Identifier,
    pub indices: Vec<Expression>,
}

impl LVal {
    pub fn kind(&self) -> VarKind {
        if self.indices.is_empty() {
            VarKind::Scalar
        } else {
            VarKind::Array
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Display)]
pub enum UnaryOperator {
    #[display("+")]
    Plus,
    #[display("-")]
    Negate,
    #[display("!")]
    Not,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Display)]
pub enum BinaryOperator {
    #[display("+")]
    Add,
    #[display("-")]
    Subtract,
    #[display("*")]
    Multiply,
    #[display("/")]
    Divide,
    #[display("%")]
    Remainder,
    #[display("<")]
    LessThan,
    #[display(">")]
    GreaterThan,
    #[display("<=")]
    LessOrEqual,
    #[display(">=")]
    GreaterOrEqual,
    #[display("==")]
    Equal,
    #[display("!=")]
    NotEqual,
    #[display("&&")]
    And,
    #[display("||")]
    Or,
}

// Diagnostic rendering

fn write_list<T: fmt::Display>(f: &mut Formatter<'_>, items: &[T], separator: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, "{separator}")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for CompUnit {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for item in &self.items {
            writeln!(f, "{item}")?;
        }
        Ok(())
    }
}

impl fmt::Display for GlobalItem {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            GlobalItem::Decl(decl) => write!(f, "{decl}"),
            GlobalItem::Func(func) => write!(f, "{func}"),
        }
    }
}

impl fmt::Display for FuncDef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}(", self.ret, self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "int {param}")?;
        }
        write!(f, ") {}", self.body)
    }
}

impl fmt::Display for FuncCall {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        write_list(f, &self.args, ", ")?;
        write!(f, ")")
    }
}

impl fmt::Display for VarDecl {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_const {
            write!(f, "const ")?;
        }
        write!(f, "int ")?;
        write_list(f, &self.defs, ", ")?;
        write!(f, ";")
    }
}

impl fmt::Display for VarDef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.init {
            Some(init) => write!(f, "{} = {init}", self.target),
            None => write!(f, "{}", self.target),
        }
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for dim in &self.dims {
            match dim {
                Dimension::Unspecified => write!(f, "[]")?,
                Dimension::Sized(exp) => write!(f, "[{exp}]")?,
            }
        }
        Ok(())
    }
}

impl fmt::Display for InitVal {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            InitVal::Scalar(exp) => write!(f, "{exp}"),
            InitVal::Aggregate(values) => {
                write!(f, "{{")?;
                write_list(f, values, ", ")?;
                write!(f, "}}")
            }
        }
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.items.is_empty() {
            return write!(f, "{{ }}");
        }
        write!(f, "{{ ")?;
        write_list(f, &self.items, " ")?;
        write!(f, " }}")
    }
}

impl fmt::Display for BlockItem {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            BlockItem::D(decl) => write!(f, "{decl}"),
            BlockItem::S(statement) => write!(f, "{statement}"),
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Empty => write!(f, ";"),
            Statement::Compound(block) => write!(f, "{block}"),
            Statement::If {
                condition,
                then,
                else_: Some(else_),
            } => write!(f, "if ({condition}) {then} else {else_}"),
            Statement::If {
                condition,
                then,
                else_: None,
            } => write!(f, "if ({condition}) {then}"),
            Statement::While { condition, body } => write!(f, "while ({condition}) {body}"),
            Statement::Control(control) => write!(f, "{control}"),
            Statement::Assign { target, value } => write!(f, "{target} = {value};"),
            Statement::Exp(exp) => write!(f, "{exp};"),
        }
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Control::Break => write!(f, "break;"),
            Control::Continue => write!(f, "continue;"),
            Control::Return(Some(exp)) => write!(f, "return {exp};"),
            Control::Return(None) => write!(f, "return;"),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Num(value) => write!(f, "{value}"),
            Expression::LVal(lval) => write!(f, "{lval}"),
            Expression::Call(call) => write!(f, "{call}"),
            Expression::Unary(op, operand) => write!(f, "({op}{operand})"),
            Expression::Binary(op, lhs, rhs) => write!(f, "({lhs} {op} {rhs})"),
        }
    }
}

impl fmt::Display for LVal {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for index in &self.indices {
            write!(f, "[{index}]")?;
        }
        Ok(())
    }
}
