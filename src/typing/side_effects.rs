//! Conservative side-effect analysis.
//!
//! An expression has a side effect if evaluating it may change any state
//! observable after the evaluation. Only calls can: a call is
//! side-effect-free exactly when its signature is pure, it writes through
//! no parameter, and none of its arguments has side effects. A call that
//! cannot be resolved is assumed to have side effects.

use crate::ir::syntax::{Expr, ExprKind};
use crate::ir::walk::Visitor;
use crate::typing::{MethodCallDescription, TypeMap};

/// may evaluating `expr` have an observable side effect
pub fn check(expr: &Expr, types: &TypeMap) -> bool {
    let mut finder = Finder {
        types,
        found: false,
    };
    expr.walk(&mut finder);
    finder.found
}

struct Finder<'a> {
    types: &'a TypeMap,
    found: bool,
}

impl Visitor for Finder<'_> {
    fn enter_expr(&mut self, expr: &Expr) {
        if self.found || !matches!(expr.kind, ExprKind::Call { .. }) {
            return;
        }
        // arguments are visited by the walk; only judge the call itself
        match MethodCallDescription::resolve(expr, self.types) {
            Ok(desc) => {
                if !desc.method.pure
                    || desc.method.params.iter().any(|p| p.direction.is_written())
                {
                    self.found = true;
                }
            }
            Err(_) => self.found = true,
        }
    }
}
