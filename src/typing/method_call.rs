//! Resolution of method calls to their signatures.

use crate::diagnostics::{InternalError, PassResult};
use crate::ir::syntax::{Expr, ExprKind};
use crate::shared::{Direction, Id, MethodType, Param, Type};
use crate::typing::table_apply;
use crate::typing::TypeMap;
use lazy_static::lazy_static;
use std::collections::HashMap;

/// A resolved call: the signature of the callee and the arguments matched
/// against it, in parameter declaration order.
#[derive(Debug)]
pub struct MethodCallDescription<'a> {
    pub method: MethodType,
    pub args: &'a [Expr],
}

impl<'a> MethodCallDescription<'a> {
    pub fn resolve(call: &'a Expr, types: &TypeMap) -> PassResult<Self> {
        let (callee, args) = match &call.kind {
            ExprKind::Call { callee, args, .. } => (callee.as_ref(), args.as_slice()),
            _ => return Err(InternalError::NotAMethod(call.pos)),
        };
        let method = match types.try_type(callee) {
            Some(Type::Method(mt)) => (**mt).clone(),
            _ => Self::builtin(callee, types).ok_or(InternalError::NotAMethod(callee.pos))?,
        };
        if method.params.len() != args.len() {
            return Err(InternalError::ArityMismatch {
                pos: call.pos,
                args: args.len(),
                params: method.params.len(),
            });
        }
        let method = instantiate(method, args, types)?;
        Ok(MethodCallDescription { method, args })
    }

    /// the parameter/argument pairs, in declaration order
    pub fn substitution(&self) -> impl Iterator<Item = (&Param, &Expr)> {
        self.method.params.iter().zip(self.args.iter())
    }

    fn builtin(callee: &Expr, types: &TypeMap) -> Option<MethodType> {
        let (target, member) = match &callee.kind {
            ExprKind::Member(target, member) => (target, member),
            _ => return None,
        };
        if member.as_str() == table_apply::APPLY {
            if let Some(Type::Table(t)) = types.try_type(target) {
                return Some(MethodType {
                    type_params: vec![],
                    params: vec![],
                    ret: Type::ApplyResult(t.clone()),
                    pure: false,
                });
            }
        }
        BUILTIN_METHODS.get(member.as_str()).cloned()
    }
}

/// Replace type-parameter placeholders in the parameter list with the
/// types of the matched arguments.
fn instantiate(mut method: MethodType, args: &[Expr], types: &TypeMap) -> PassResult<MethodType> {
    if method.type_params.is_empty() {
        return Ok(method);
    }
    let type_params = std::mem::take(&mut method.type_params);
    for (p, a) in method.params.iter_mut().zip(args) {
        let generic = matches!(&p.ty, Type::Named(n) if type_params.contains(n));
        if generic {
            p.ty = types.get_type(a)?.clone();
        }
    }
    Ok(method)
}

fn param(name: &str, direction: Direction, ty: Type) -> Param {
    Param {
        name: Id::from(name),
        direction,
        ty,
    }
}

/// Signatures of the extern methods every flowscript target provides.
/// `extract` and `emit` are generic in the header they move; `isValid` is
/// the one method the side-effect analysis may treat as pure.
fn builtin_methods() -> HashMap<&'static str, MethodType> {
    let header = || Type::Named(Id::from("H"));
    [
        (
            "isValid",
            MethodType {
                type_params: vec![],
                params: vec![],
                ret: Type::Bool,
                pure: true,
            },
        ),
        (
            "setValid",
            MethodType {
                type_params: vec![],
                params: vec![],
                ret: Type::Void,
                pure: false,
            },
        ),
        (
            "setInvalid",
            MethodType {
                type_params: vec![],
                params: vec![],
                ret: Type::Void,
                pure: false,
            },
        ),
        (
            "extract",
            MethodType {
                type_params: vec![Id::from("H")],
                params: vec![param("hdr", Direction::Out, header())],
                ret: Type::Void,
                pure: false,
            },
        ),
        (
            "emit",
            MethodType {
                type_params: vec![Id::from("H")],
                params: vec![param("hdr", Direction::In, header())],
                ret: Type::Void,
                pure: false,
            },
        ),
    ]
    .into_iter()
    .collect()
}

lazy_static! {
    pub static ref BUILTIN_METHODS: HashMap<&'static str, MethodType> = builtin_methods();
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ir::constructors::*;
    use crate::ir::syntax::NodeIdGen;
    use crate::pos::Pos;

    #[test]
    fn builtin_parameters_take_argument_types() {
        let mut ids = NodeIdGen::default();
        let mut types = TypeMap::default();
        let pkt = path_(&mut ids, "pkt", Pos::UNKNOWN);
        types.set_type(&pkt, Type::Named(Id::from("packet_in")));
        let callee = member_(&mut ids, pkt, "extract", Pos::UNKNOWN);
        let h = path_(&mut ids, "h", Pos::UNKNOWN);
        types.set_type(&h, Type::Named(Id::from("ethernet_t")));
        let call = call_(&mut ids, callee, vec![], vec![h], Pos::UNKNOWN);
        let desc = MethodCallDescription::resolve(&call, &types).unwrap();
        assert_eq!(desc.method.params[0].direction, Direction::Out);
        assert_eq!(desc.method.params[0].ty, Type::Named(Id::from("ethernet_t")));
        assert!(desc.method.ret.is_void());
    }

    #[test]
    fn arity_mismatches_are_fatal() {
        let mut ids = NodeIdGen::default();
        let mut types = TypeMap::default();
        let m = path_(&mut ids, "m", Pos::UNKNOWN);
        types.set_type(
            &m,
            Type::Method(Box::new(MethodType {
                type_params: vec![],
                params: vec![param("a", Direction::In, Type::Bool)],
                ret: Type::Void,
                pure: false,
            })),
        );
        let call = call_(&mut ids, m, vec![], vec![], Pos::UNKNOWN);
        let err = MethodCallDescription::resolve(&call, &types).unwrap_err();
        assert!(matches!(
            err,
            crate::diagnostics::InternalError::ArityMismatch { .. }
        ));
    }
}
