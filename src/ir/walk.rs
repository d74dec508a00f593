//! Read-only traversal of the IR.
//!
//! The normalization pass itself recurses explicitly because it needs to
//! redirect its output mid-visit; this walker serves the analyses and the
//! tests, which only observe.

use super::syntax::*;

/// a visitor is passed to [Stmt::walk] or [Expr::walk] to describe what
/// happens when walking; each method defaults to doing nothing, so only
/// specify what you need
pub trait Visitor {
    /// called before recursing on a statement
    fn enter_stmt(&mut self, _stmt: &Stmt) {}
    /// called before recursing on an expression
    fn enter_expr(&mut self, _expr: &Expr) {}
}

fn walk_stmt(stmt: &Stmt, v: &mut impl Visitor) {
    use StmtKind::*;
    v.enter_stmt(stmt);
    match &stmt.kind {
        Empty => (),
        Block(components) => {
            for c in components {
                match c {
                    StmtOrDecl::Stmt(s) => walk_stmt(s, v),
                    StmtOrDecl::Decl(d) => walk_decl(d, v),
                }
            }
        }
        Assign(l, r) => {
            walk_expr(l, v);
            walk_expr(r, v);
        }
        MethodCall(e) => walk_expr(e, v),
        Return(e) => {
            if let Some(e) = e {
                walk_expr(e, v);
            }
        }
        If(c, t, f) => {
            walk_expr(c, v);
            walk_stmt(t, v);
            if let Some(f) = f {
                walk_stmt(f, v);
            }
        }
        Switch(e, cases) => {
            walk_expr(e, v);
            for case in cases {
                if let Some(body) = &case.body {
                    walk_stmt(body, v);
                }
            }
        }
    }
}

fn walk_decl(decl: &Declaration, v: &mut impl Visitor) {
    match decl {
        Declaration::Variable(var) => {
            if let Some(init) = &var.init {
                walk_expr(init, v);
            }
        }
        Declaration::Action(a) => {
            for c in &a.body {
                match c {
                    StmtOrDecl::Stmt(s) => walk_stmt(s, v),
                    StmtOrDecl::Decl(d) => walk_decl(d, v),
                }
            }
        }
        Declaration::Table(_) => (),
    }
}

fn walk_expr(expr: &Expr, v: &mut impl Visitor) {
    use ExprKind::*;
    v.enter_expr(expr);
    match &expr.kind {
        // 0
        Lit(_) | Path(_) => (),
        // 1xExpr
        Member(e, ..) | Slice(e, ..) | Unary(.., e) => walk_expr(e, v),
        // 2xExpr
        Index(a, b) | Binary(.., a, b) | And(a, b) | Or(a, b) => {
            walk_expr(a, v);
            walk_expr(b, v);
        }
        // 3xExpr
        Mux(a, b, c) => {
            walk_expr(a, v);
            walk_expr(b, v);
            walk_expr(c, v);
        }
        // 1xExpr, 1x[Expr]
        Call { callee, args, .. } => {
            walk_expr(callee, v);
            for a in args {
                walk_expr(a, v);
            }
        }
        // 1x[Expr]
        List(es) => {
            for e in es {
                walk_expr(e, v);
            }
        }
        // 1xExpr; the case list holds no expressions
        Select { selector, .. } => walk_expr(selector, v),
    }
}

impl Stmt {
    /// walk the tree, calling relevant visitor methods when appropriate;
    /// strictly depth-first, left to right
    pub fn walk(&self, v: &mut impl Visitor) {
        walk_stmt(self, v);
    }
}

impl Expr {
    /// like [Stmt::walk], but starting from an expression
    pub fn walk(&self, v: &mut impl Visitor) {
        walk_expr(self, v);
    }
}
