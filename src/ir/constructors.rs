//! Constructor functions, that facilitate building IR in code.
//!
//! Every expression constructor takes the node-id allocator so the node it
//! builds has an identity of its own; annotations for it must be entered
//! in the type oracle separately.
use super::syntax::*;
use crate::pos::Pos;
use crate::shared::{Id, Type};

// Expressions

pub fn bool_(ids: &mut NodeIdGen, b: bool, s: Pos) -> Expr {
    lit_(ids, Lit::Bool(b), s)
}

pub fn int_(ids: &mut NodeIdGen, value: i64, width: Option<u32>, s: Pos) -> Expr {
    lit_(ids, Lit::Int { value, width }, s)
}

pub fn lit_(ids: &mut NodeIdGen, l: Lit, s: Pos) -> Expr {
    Expr {
        id: ids.fresh(),
        pos: s,
        kind: ExprKind::Lit(l),
    }
}

pub fn path_<I: Into<Id>>(ids: &mut NodeIdGen, name: I, s: Pos) -> Expr {
    Expr {
        id: ids.fresh(),
        pos: s,
        kind: ExprKind::Path(name.into()),
    }
}

pub fn member_<I: Into<Id>>(ids: &mut NodeIdGen, e: Expr, name: I, s: Pos) -> Expr {
    Expr {
        id: ids.fresh(),
        pos: s,
        kind: ExprKind::Member(Box::new(e), name.into()),
    }
}

pub fn index_(ids: &mut NodeIdGen, a: Expr, i: Expr, s: Pos) -> Expr {
    Expr {
        id: ids.fresh(),
        pos: s,
        kind: ExprKind::Index(Box::new(a), Box::new(i)),
    }
}

pub fn slice_(ids: &mut NodeIdGen, e: Expr, hi: u32, lo: u32, s: Pos) -> Expr {
    Expr {
        id: ids.fresh(),
        pos: s,
        kind: ExprKind::Slice(Box::new(e), hi, lo),
    }
}

pub fn unary_(ids: &mut NodeIdGen, op: UnOp, e: Expr, s: Pos) -> Expr {
    Expr {
        id: ids.fresh(),
        pos: s,
        kind: ExprKind::Unary(op, Box::new(e)),
    }
}

pub fn not_(ids: &mut NodeIdGen, e: Expr, s: Pos) -> Expr {
    unary_(ids, UnOp::Not, e, s)
}

pub fn binary_(ids: &mut NodeIdGen, op: BinOp, l: Expr, r: Expr, s: Pos) -> Expr {
    Expr {
        id: ids.fresh(),
        pos: s,
        kind: ExprKind::Binary(op, Box::new(l), Box::new(r)),
    }
}

pub fn and_(ids: &mut NodeIdGen, l: Expr, r: Expr, s: Pos) -> Expr {
    Expr {
        id: ids.fresh(),
        pos: s,
        kind: ExprKind::And(Box::new(l), Box::new(r)),
    }
}

pub fn or_(ids: &mut NodeIdGen, l: Expr, r: Expr, s: Pos) -> Expr {
    Expr {
        id: ids.fresh(),
        pos: s,
        kind: ExprKind::Or(Box::new(l), Box::new(r)),
    }
}

pub fn mux_(ids: &mut NodeIdGen, c: Expr, t: Expr, f: Expr, s: Pos) -> Expr {
    Expr {
        id: ids.fresh(),
        pos: s,
        kind: ExprKind::Mux(Box::new(c), Box::new(t), Box::new(f)),
    }
}

pub fn call_(ids: &mut NodeIdGen, callee: Expr, type_args: Vec<Type>, args: Vec<Expr>, s: Pos) -> Expr {
    Expr {
        id: ids.fresh(),
        pos: s,
        kind: ExprKind::Call {
            callee: Box::new(callee),
            type_args,
            args,
        },
    }
}

pub fn list_(ids: &mut NodeIdGen, es: Vec<Expr>, s: Pos) -> Expr {
    Expr {
        id: ids.fresh(),
        pos: s,
        kind: ExprKind::List(es),
    }
}

pub fn select_(ids: &mut NodeIdGen, selector: Expr, cases: Vec<SelectCase>, s: Pos) -> Expr {
    Expr {
        id: ids.fresh(),
        pos: s,
        kind: ExprKind::Select {
            selector: Box::new(selector),
            cases,
        },
    }
}

// Statements

pub fn empty_() -> Stmt {
    Stmt {
        pos: Pos::UNKNOWN,
        kind: StmtKind::Empty,
    }
}

pub fn assign_(lhs: Expr, rhs: Expr, s: Pos) -> Stmt {
    Stmt {
        pos: s,
        kind: StmtKind::Assign(Box::new(lhs), Box::new(rhs)),
    }
}

pub fn method_call_(call: Expr, s: Pos) -> Stmt {
    Stmt {
        pos: s,
        kind: StmtKind::MethodCall(Box::new(call)),
    }
}

pub fn return_(e: Option<Expr>, s: Pos) -> Stmt {
    Stmt {
        pos: s,
        kind: StmtKind::Return(e.map(Box::new)),
    }
}

pub fn if_(c: Expr, t: Stmt, e: Option<Stmt>, s: Pos) -> Stmt {
    Stmt {
        pos: s,
        kind: StmtKind::If(Box::new(c), Box::new(t), e.map(Box::new)),
    }
}

pub fn switch_(e: Expr, cases: Vec<SwitchCase>, s: Pos) -> Stmt {
    Stmt {
        pos: s,
        kind: StmtKind::Switch(Box::new(e), cases),
    }
}

pub fn block_(components: Vec<StmtOrDecl>, s: Pos) -> Stmt {
    Stmt {
        pos: s,
        kind: StmtKind::Block(components),
    }
}

/// a block of plain statements, as emitted by rewrites
pub fn stmt_block_(stmts: Vec<Stmt>, s: Pos) -> Stmt {
    block_(stmts.into_iter().map(StmtOrDecl::Stmt).collect(), s)
}

// Declarations

pub fn var_decl_<I: Into<Id>>(name: I, ty: Type, init: Option<Expr>) -> Declaration {
    Declaration::Variable(VarDecl {
        name: name.into(),
        ty,
        init,
    })
}
