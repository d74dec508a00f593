//! Helpers for building annotated programs in tests.
//!
//! Real programs reach the rewrites resolved and typed; tests get the
//! same guarantees from this builder, which allocates node identities,
//! reserves declared names, and enters types in the oracle as it builds.

use crate::ir::constructors::*;
use crate::ir::syntax::*;
use crate::pos::Pos;
use crate::shared::{Direction, Id, MethodType, Param, ReferenceMap, Type};
use crate::typing::method_call::BUILTIN_METHODS;
use crate::typing::TypeMap;

pub struct ProgramBuilder {
    pub ids: NodeIdGen,
    pub types: TypeMap,
    pub refs: ReferenceMap,
}

pub fn param(name: &str, direction: Direction, ty: Type) -> Param {
    Param {
        name: Id::from(name),
        direction,
        ty,
    }
}

impl Default for ProgramBuilder {
    fn default() -> ProgramBuilder {
        ProgramBuilder::new()
    }
}

impl ProgramBuilder {
    pub fn new() -> ProgramBuilder {
        ProgramBuilder {
            ids: NodeIdGen::default(),
            types: TypeMap::default(),
            refs: ReferenceMap::default(),
        }
    }

    fn ty(&self, e: &Expr) -> Type {
        self.types.get_type(e).expect("builder left a node untyped").clone()
    }

    /// a reference to a declared variable: reserved, typed, a left-value
    pub fn var(&mut self, name: &str, ty: Type) -> Expr {
        self.refs.reserve(name);
        let e = path_(&mut self.ids, name, Pos::UNKNOWN);
        self.types.set_type(&e, ty);
        self.types.set_left_value(&e);
        e
    }

    pub fn bool_var(&mut self, name: &str) -> Expr {
        self.var(name, Type::Bool)
    }

    pub fn bits_var(&mut self, name: &str, width: u32) -> Expr {
        self.var(name, Type::bits(width))
    }

    pub fn lit_bool(&mut self, b: bool) -> Expr {
        let e = bool_(&mut self.ids, b, Pos::UNKNOWN);
        self.types.set_type(&e, Type::Bool);
        self.types.set_compile_time_constant(&e);
        e
    }

    pub fn lit_int(&mut self, value: i64, width: u32) -> Expr {
        let e = int_(&mut self.ids, value, Some(width), Pos::UNKNOWN);
        self.types.set_type(&e, Type::bits(width));
        self.types.set_compile_time_constant(&e);
        e
    }

    /// a field access; left-value when the target is one
    pub fn member(&mut self, target: Expr, name: &str, ty: Type) -> Expr {
        let lv = self.types.is_left_value(&target);
        let e = member_(&mut self.ids, target, name, Pos::UNKNOWN);
        self.types.set_type(&e, ty);
        if lv {
            self.types.set_left_value(&e);
        }
        e
    }

    pub fn index(&mut self, array: Expr, idx: Expr, ty: Type) -> Expr {
        let lv = self.types.is_left_value(&array);
        let e = index_(&mut self.ids, array, idx, Pos::UNKNOWN);
        self.types.set_type(&e, ty);
        if lv {
            self.types.set_left_value(&e);
        }
        e
    }

    /// a bit slice `e[hi:lo]`; left-value when the target is one
    pub fn slice(&mut self, target: Expr, hi: u32, lo: u32) -> Expr {
        let lv = self.types.is_left_value(&target);
        let e = slice_(&mut self.ids, target, hi, lo, Pos::UNKNOWN);
        self.types.set_type(&e, Type::bits(hi - lo + 1));
        if lv {
            self.types.set_left_value(&e);
        }
        e
    }

    pub fn not(&mut self, e: Expr) -> Expr {
        let r = not_(&mut self.ids, e, Pos::UNKNOWN);
        self.types.set_type(&r, Type::Bool);
        r
    }

    /// an arithmetic operation, typed like its left operand
    pub fn binary(&mut self, op: BinOp, l: Expr, r: Expr) -> Expr {
        let ty = self.ty(&l);
        let e = binary_(&mut self.ids, op, l, r, Pos::UNKNOWN);
        self.types.set_type(&e, ty);
        e
    }

    pub fn add(&mut self, l: Expr, r: Expr) -> Expr {
        self.binary(BinOp::Add, l, r)
    }

    pub fn eq(&mut self, l: Expr, r: Expr) -> Expr {
        let e = binary_(&mut self.ids, BinOp::Eq, l, r, Pos::UNKNOWN);
        self.types.set_type(&e, Type::Bool);
        e
    }

    pub fn and(&mut self, l: Expr, r: Expr) -> Expr {
        let e = and_(&mut self.ids, l, r, Pos::UNKNOWN);
        self.types.set_type(&e, Type::Bool);
        e
    }

    pub fn or(&mut self, l: Expr, r: Expr) -> Expr {
        let e = or_(&mut self.ids, l, r, Pos::UNKNOWN);
        self.types.set_type(&e, Type::Bool);
        e
    }

    /// a conditional expression, typed like its true branch
    pub fn mux(&mut self, c: Expr, t: Expr, f: Expr) -> Expr {
        let ty = self.ty(&t);
        let e = mux_(&mut self.ids, c, t, f, Pos::UNKNOWN);
        self.types.set_type(&e, ty);
        e
    }

    /// a named callable with the given signature
    pub fn method(&mut self, name: &str, params: Vec<Param>, ret: Type) -> Expr {
        self.refs.reserve(name);
        let e = path_(&mut self.ids, name, Pos::UNKNOWN);
        self.types.set_type(
            &e,
            Type::Method(Box::new(MethodType {
                type_params: vec![],
                params,
                ret,
                pure: false,
            })),
        );
        e
    }

    /// a call; the result type comes from the callee's signature
    pub fn call(&mut self, callee: Expr, args: Vec<Expr>) -> Expr {
        let ret = match self.ty(&callee) {
            Type::Method(mt) => mt.ret,
            other => panic!("callee has type {:?}, not a method", other),
        };
        let e = call_(&mut self.ids, callee, vec![], args, Pos::UNKNOWN);
        self.types.set_type(&e, ret);
        e
    }

    /// a call to a builtin extern method on `target`, e.g. `h.isValid()`
    pub fn extern_call(&mut self, target: Expr, name: &str, args: Vec<Expr>) -> Expr {
        let mt = BUILTIN_METHODS
            .get(name)
            .unwrap_or_else(|| panic!("{} is not a builtin method", name))
            .clone();
        let ret = mt.ret.clone();
        let callee = member_(&mut self.ids, target, name, Pos::UNKNOWN);
        self.types.set_type(&callee, Type::Method(Box::new(mt)));
        let e = call_(&mut self.ids, callee, vec![], args, Pos::UNKNOWN);
        self.types.set_type(&e, ret);
        e
    }

    /// a reference to a declared table
    pub fn table(&mut self, name: &str) -> Expr {
        self.refs.reserve(name);
        let e = path_(&mut self.ids, name, Pos::UNKNOWN);
        self.types.set_type(&e, Type::Table(Id::from(name)));
        e
    }

    /// `t.apply()`
    pub fn apply(&mut self, table: Expr) -> Expr {
        let tname = match self.ty(&table) {
            Type::Table(n) => n,
            other => panic!("apply target has type {:?}, not a table", other),
        };
        let callee = member_(&mut self.ids, table, "apply", Pos::UNKNOWN);
        self.types.set_type(
            &callee,
            Type::Method(Box::new(MethodType {
                type_params: vec![],
                params: vec![],
                ret: Type::ApplyResult(tname.clone()),
                pure: false,
            })),
        );
        let e = call_(&mut self.ids, callee, vec![], vec![], Pos::UNKNOWN);
        self.types.set_type(&e, Type::ApplyResult(tname));
        e
    }

    /// `t.apply().hit`
    pub fn apply_hit(&mut self, table: Expr) -> Expr {
        let call = self.apply(table);
        let e = member_(&mut self.ids, call, "hit", Pos::UNKNOWN);
        self.types.set_type(&e, Type::Bool);
        e
    }

    pub fn list(&mut self, elements: Vec<Expr>) -> Expr {
        let e = list_(&mut self.ids, elements, Pos::UNKNOWN);
        self.types.set_type(&e, Type::Named(Id::from("tuple")));
        e
    }

    pub fn select(&mut self, selector: Expr, cases: Vec<SelectCase>) -> Expr {
        let e = select_(&mut self.ids, selector, cases, Pos::UNKNOWN);
        self.types.set_type(&e, Type::State);
        e
    }

    pub fn function(&mut self, name: &str, ret: Type, body: Vec<Stmt>) -> Function {
        self.refs.reserve(name);
        Function {
            name: Id::from(name),
            ret,
            params: vec![],
            body: body.into_iter().map(StmtOrDecl::Stmt).collect(),
        }
    }
}
