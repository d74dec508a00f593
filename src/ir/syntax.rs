//! The abstract syntax of the flowscript IR.
//!
//! The tree is immutable by convention: passes never modify a node in
//! place, they build new nodes whose children may point at unchanged input
//! subtrees. Every expression carries a [NodeId]; the annotation maps of
//! the type oracle are keyed by it, so cloning a node preserves its
//! annotations while constructing a node gives it a blank slate.

use crate::pos::Pos;
use crate::shared::{Id, Param, Type};

/// Identity of an expression node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

/// Allocator of node identities, one per program.
#[derive(Default)]
pub struct NodeIdGen {
    next: u32,
}

impl NodeIdGen {
    pub fn fresh(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub id: NodeId,
    pub pos: Pos,
    pub kind: ExprKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Lit(Lit),
    /// reference to a named declaration
    Path(Id),
    Member(Box<Expr>, Id),
    Index(Box<Expr>, Box<Expr>),
    /// bit-slice `e[hi:lo]`; the bounds are compile-time constants
    Slice(Box<Expr>, u32, u32),
    Unary(UnOp, Box<Expr>),
    /// side-effect-free binary operators only; `&&` and `||` are [And] and
    /// [Or] because their right operand is evaluated conditionally
    ///
    /// [And]: ExprKind::And
    /// [Or]: ExprKind::Or
    Binary(BinOp, Box<Expr>, Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Mux(Box<Expr>, Box<Expr>, Box<Expr>),
    Call {
        callee: Box<Expr>,
        type_args: Vec<Type>,
        args: Vec<Expr>,
    },
    /// tuple of expressions; the selector of a multi-key `select`
    List(Vec<Expr>),
    Select {
        selector: Box<Expr>,
        cases: Vec<SelectCase>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lit {
    Bool(bool),
    Int { value: i64, width: Option<u32> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Not,
    Cmpl,
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Shl,
    Shr,
    BitAnd,
    BitOr,
    BitXor,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectCase {
    pub keyset: Keyset,
    pub state: Id,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Keyset {
    Value(Lit),
    Default,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub pos: Pos,
    pub kind: StmtKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Empty,
    Block(Vec<StmtOrDecl>),
    Assign(Box<Expr>, Box<Expr>),
    /// a call evaluated for its effects; the result, if any, is discarded
    MethodCall(Box<Expr>),
    Return(Option<Box<Expr>>),
    If(Box<Expr>, Box<Stmt>, Option<Box<Stmt>>),
    Switch(Box<Expr>, Vec<SwitchCase>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    pub label: SwitchLabel,
    /// absent for fall-through labels
    pub body: Option<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SwitchLabel {
    Name(Id),
    Default,
}

/// Blocks and parser states interleave statements with local declarations.
#[derive(Debug, Clone, PartialEq)]
pub enum StmtOrDecl {
    Stmt(Stmt),
    Decl(Declaration),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    Variable(VarDecl),
    Action(Action),
    Table(TableDecl),
}

impl Declaration {
    pub fn name(&self) -> &Id {
        match self {
            Declaration::Variable(v) => &v.name,
            Declaration::Action(a) => &a.name,
            Declaration::Table(t) => &t.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub name: Id,
    pub ty: Type,
    pub init: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableDecl {
    pub name: Id,
    pub actions: Vec<Id>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub objects: Vec<TopLevel>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TopLevel {
    Parser(Parser),
    Control(Control),
    Function(Function),
    Action(Action),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parser {
    pub name: Id,
    pub locals: Vec<Declaration>,
    pub states: Vec<ParserState>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParserState {
    pub name: Id,
    pub components: Vec<StmtOrDecl>,
    /// the transition: a select expression, a direct state reference, or
    /// absent for accept/reject states
    pub select: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Control {
    pub name: Id,
    pub locals: Vec<Declaration>,
    pub apply: Vec<StmtOrDecl>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    pub name: Id,
    pub params: Vec<Param>,
    pub body: Vec<StmtOrDecl>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: Id,
    pub ret: Type,
    pub params: Vec<Param>,
    pub body: Vec<StmtOrDecl>,
}
