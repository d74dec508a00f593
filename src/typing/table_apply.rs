//! Recognizers for the distinguished members of a table-apply result.
//!
//! `t.apply().hit` and `t.apply().action_run` must be handled specially by
//! rewrites: the result of `t.apply()` has no declarable type, so the call
//! can never be hoisted into a temporary.

use crate::ir::syntax::{Expr, ExprKind};
use crate::shared::{Id, Type};
use crate::typing::TypeMap;

pub const APPLY: &str = "apply";
pub const HIT: &str = "hit";
pub const ACTION_RUN: &str = "action_run";

/// if `expr` is `t.apply().hit` for a table `t`, the table's name
pub fn is_hit(expr: &Expr, types: &TypeMap) -> Option<Id> {
    applied_table(expr, HIT, types)
}

/// if `expr` is `t.apply().action_run` for a table `t`, the table's name
pub fn is_action_run(expr: &Expr, types: &TypeMap) -> Option<Id> {
    applied_table(expr, ACTION_RUN, types)
}

fn applied_table(expr: &Expr, selector: &str, types: &TypeMap) -> Option<Id> {
    let inner = match &expr.kind {
        ExprKind::Member(inner, member) if member.as_str() == selector => inner,
        _ => return None,
    };
    let callee = match &inner.kind {
        ExprKind::Call { callee, .. } => callee,
        _ => return None,
    };
    let target = match &callee.kind {
        ExprKind::Member(target, member) if member.as_str() == APPLY => target,
        _ => return None,
    };
    match types.try_type(target) {
        Some(Type::Table(t)) => Some(t.clone()),
        _ => None,
    }
}
