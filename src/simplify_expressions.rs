//! Make the order of evaluation of sub-expressions explicit.
//!
//! An expression is rewritten into a sequence of temporary declarations,
//! followed by a sequence of statements (mostly assignments to the
//! temporaries, but also conditionals for short-circuit evaluation),
//! followed by a side-effect-free residual expression over the
//! temporaries. Statements are then rebuilt around the residuals, and the
//! declarations are spliced into the enclosing scope: parser and control
//! locals, or the front of an action or function body.
//!
//! `&&`, `||` and `?:` lower to `if` statements; calls copy `out` and
//! `inout` arguments through temporaries, in before the call and out
//! after it, which is what gives the language its call-by-copy argument
//! semantics in the emitted code.

use crate::diagnostics::{InternalError, PassResult};
use crate::ir::constructors::*;
use crate::ir::syntax::*;
use crate::pos::Pos;
use crate::shared::{Direction, Id, ReferenceMap, Type};
use crate::typing::{side_effects, table_apply, MethodCallDescription, TypeMap};
use log::{debug, trace};
use std::mem;

/// The in-progress result of dismantling one expression.
#[derive(Default)]
pub struct EvaluationOrder {
    /// fresh locals, in creation order
    pub temporaries: Vec<Declaration>,
    /// the evaluation of the original sub-expressions, left to right
    pub statements: Vec<Stmt>,
    /// what remains of the expression itself; empty only for a call whose
    /// result is discarded
    pub residual: Option<Expr>,
}

impl EvaluationOrder {
    pub fn new() -> EvaluationOrder {
        EvaluationOrder::default()
    }

    /// nothing was hoisted; the expression may stay where it was
    pub fn simple(&self) -> bool {
        self.temporaries.is_empty() && self.statements.is_empty()
    }

    fn create_temporary(&mut self, refs: &mut ReferenceMap, ty: &Type) -> Id {
        let tmp = refs.new_name("tmp");
        self.temporaries
            .push(var_decl_(tmp.clone(), ty.clone(), None));
        tmp
    }

    /// emit `var = expression` and return a fresh reference to `var`; the
    /// reference is a new node so the tree stays free of shared subtrees
    fn add_assignment(
        &mut self,
        ids: &mut NodeIdGen,
        types: &mut TypeMap,
        var: &Id,
        ty: &Type,
        expression: Expr,
        pos: Pos,
    ) -> Expr {
        let left = path_(ids, var.clone(), pos);
        types.set_type(&left, ty.clone());
        types.set_left_value(&left);
        self.statements.push(assign_(left, expression, pos));
        let result = path_(ids, var.clone(), pos);
        types.set_type(&result, ty.clone());
        result
    }
}

/// The recursive rewriter over one expression tree.
///
/// `left_value` and `result_not_used` are visit context, not node
/// properties: they are saved and restored around call boundaries, and
/// the short-circuit and conditional rules temporarily swap the statement
/// stream to collect a branch before emitting it.
pub struct DismantleExpression<'a> {
    refs: &'a mut ReferenceMap,
    types: &'a mut TypeMap,
    ids: &'a mut NodeIdGen,
    result: EvaluationOrder,
    /// the current expression occupies a storage-location position
    left_value: bool,
    /// the caller discards the result (method-call statements)
    result_not_used: bool,
    /// the parent is a `hit`/`action_run` member over this very call
    in_apply_member: bool,
}

impl<'a> DismantleExpression<'a> {
    pub fn new(
        refs: &'a mut ReferenceMap,
        types: &'a mut TypeMap,
        ids: &'a mut NodeIdGen,
    ) -> DismantleExpression<'a> {
        DismantleExpression {
            refs,
            types,
            ids,
            result: EvaluationOrder::new(),
            left_value: false,
            result_not_used: false,
            in_apply_member: false,
        }
    }

    /// Rewrite `expression`, accumulating into this dismantler; returns
    /// the residual. May be called more than once: an assignment
    /// dismantles both of its sides into one shared stream.
    pub fn dismantle(
        &mut self,
        expression: &Expr,
        is_left_value: bool,
        result_not_used: bool,
    ) -> PassResult<Option<Expr>> {
        debug!(
            "dismantling {} ({})",
            expression,
            if is_left_value { "left" } else { "right" }
        );
        self.left_value = is_left_value;
        self.result_not_used = result_not_used;
        self.in_apply_member = false;
        self.result.residual = None;
        self.visit(expression)?;
        Ok(self.result.residual.take())
    }

    pub fn into_parts(self) -> EvaluationOrder {
        self.result
    }

    fn take_residual(&mut self, pos: Pos) -> PassResult<Expr> {
        self.result
            .residual
            .take()
            .ok_or(InternalError::MissingResidual(pos))
    }

    fn visit(&mut self, expression: &Expr) -> PassResult<()> {
        trace!("visiting {}", expression);
        let pos = expression.pos;
        match &expression.kind {
            ExprKind::Lit(_) => {
                self.result.residual = Some(expression.clone());
            }
            ExprKind::Path(_) => {
                self.types.get_type(expression)?;
                self.result.residual = Some(expression.clone());
            }
            ExprKind::Member(inner, name) => {
                let ty = self.types.get_type(expression)?.clone();
                let apply_member = table_apply::is_hit(expression, self.types).is_some()
                    || table_apply::is_action_run(expression, self.types).is_some();
                let save = mem::replace(&mut self.in_apply_member, apply_member);
                self.visit(inner)?;
                self.in_apply_member = save;
                let left = self.take_residual(pos)?;
                let rebuilt = member_(self.ids, left, name.clone(), pos);
                self.types.set_type(&rebuilt, ty);
                if self.left_value {
                    self.types.set_left_value(&rebuilt);
                }
                if self.types.is_compile_time_constant(expression) {
                    // the flag belongs on the node that survives the rewrite
                    self.types.set_compile_time_constant(&rebuilt);
                }
                self.result.residual = Some(rebuilt);
            }
            ExprKind::Index(array, index) => {
                let ty = self.types.get_type(expression)?.clone();
                self.visit(array)?;
                let left = self.take_residual(pos)?;
                let save = self.left_value;
                self.left_value = false;
                self.visit(index)?;
                let right = self.take_residual(pos)?;
                self.left_value = save;
                let rebuilt = index_(self.ids, left, right, pos);
                self.types.set_type(&rebuilt, ty);
                if self.left_value {
                    self.types.set_left_value(&rebuilt);
                }
                if self.types.is_compile_time_constant(expression) {
                    self.types.set_compile_time_constant(&rebuilt);
                }
                self.result.residual = Some(rebuilt);
            }
            ExprKind::Slice(inner, hi, lo) => {
                let ty = self.types.get_type(expression)?.clone();
                self.visit(inner)?;
                let left = self.take_residual(pos)?;
                let rebuilt = slice_(self.ids, left, *hi, *lo, pos);
                self.types.set_type(&rebuilt, ty);
                if self.left_value {
                    self.types.set_left_value(&rebuilt);
                }
                if self.types.is_compile_time_constant(expression) {
                    self.types.set_compile_time_constant(&rebuilt);
                }
                self.result.residual = Some(rebuilt);
            }
            ExprKind::Unary(op, operand) => {
                let ty = self.types.get_type(expression)?.clone();
                let save = self.left_value;
                self.left_value = false;
                self.visit(operand)?;
                self.left_value = save;
                let inner = self.take_residual(pos)?;
                let rebuilt = unary_(self.ids, *op, inner, pos);
                self.types.set_type(&rebuilt, ty);
                self.result.residual = Some(rebuilt);
            }
            ExprKind::Binary(op, l, r) => {
                let ty = self.types.get_type(expression)?.clone();
                let save = self.left_value;
                self.left_value = false;
                self.visit(l)?;
                let left = self.take_residual(pos)?;
                self.visit(r)?;
                let right = self.take_residual(pos)?;
                self.left_value = save;
                let rebuilt = binary_(self.ids, *op, left, right, pos);
                self.types.set_type(&rebuilt, ty.clone());
                // every composition lands in a temporary of its own, so the
                // statement sequence spells out the evaluation order
                let tmp = self.result.create_temporary(self.refs, &ty);
                let residual =
                    self.result
                        .add_assignment(self.ids, self.types, &tmp, &ty, rebuilt, pos);
                self.result.residual = Some(residual);
            }
            ExprKind::And(l, r) => self.short_circuit(expression, true, l, r)?,
            ExprKind::Or(l, r) => self.short_circuit(expression, false, l, r)?,
            ExprKind::Mux(c, t, f) => self.mux(expression, c, t, f)?,
            ExprKind::Call {
                callee,
                type_args,
                args,
            } => self.method_call(expression, callee, type_args, args)?,
            ExprKind::List(elements) => {
                let ty = self.types.get_type(expression)?.clone();
                let mut parts = Vec::with_capacity(elements.len());
                for e in elements {
                    self.visit(e)?;
                    parts.push(self.take_residual(e.pos)?);
                }
                let rebuilt = list_(self.ids, parts, pos);
                self.types.set_type(&rebuilt, ty);
                self.result.residual = Some(rebuilt);
            }
            ExprKind::Select { selector, cases } => {
                let ty = self.types.get_type(expression)?.clone();
                self.visit(selector)?;
                let sel = self.take_residual(pos)?;
                let rebuilt = select_(self.ids, sel, cases.clone(), pos);
                self.types.set_type(&rebuilt, ty);
                self.result.residual = Some(rebuilt);
            }
        }
        Ok(())
    }

    /// `e1 && e2` becomes roughly
    /// `if (!e1') tmp = false; else { ...; tmp = e2'; }`
    /// and `e1 || e2` the same with the test not negated and `true` for
    /// the forced outcome.
    fn short_circuit(
        &mut self,
        expression: &Expr,
        land: bool,
        e1: &Expr,
        e2: &Expr,
    ) -> PassResult<()> {
        let pos = expression.pos;
        let ty = self.types.get_type(expression)?.clone();
        self.visit(e1)?;
        let cond = self.take_residual(pos)?;

        // the outcome e1 forces without evaluating e2
        let forced = bool_(self.ids, !land, pos);
        self.types.set_type(&forced, ty.clone());
        self.types.set_compile_time_constant(&forced);
        let tmp = self.result.create_temporary(self.refs, &ty);
        let target = path_(self.ids, tmp.clone(), pos);
        self.types.set_type(&target, ty.clone());
        self.types.set_left_value(&target);
        let if_true = assign_(target, forced, pos);

        // e2 evaluates in a stream of its own: the else branch
        let save = mem::take(&mut self.result.statements);
        self.visit(e2)?;
        let rhs = self.take_residual(pos)?;
        let residual = self
            .result
            .add_assignment(self.ids, self.types, &tmp, &ty, rhs, pos);
        let if_false = mem::replace(&mut self.result.statements, save);

        let tested = if land {
            let negated = not_(self.ids, cond, pos);
            self.types.set_type(&negated, ty);
            negated
        } else {
            cond
        };
        self.result.statements.push(if_(
            tested,
            if_true,
            Some(stmt_block_(if_false, pos)),
            pos,
        ));
        self.result.residual = Some(residual);
        Ok(())
    }

    /// `c ? e1 : e2` becomes `if (c') { ...; tmp = e1'; } else { ...; tmp = e2'; }`
    fn mux(&mut self, expression: &Expr, c: &Expr, e1: &Expr, e2: &Expr) -> PassResult<()> {
        let pos = expression.pos;
        let ty = self.types.get_type(expression)?.clone();
        self.visit(c)?;
        let cond = self.take_residual(pos)?;
        let tmp = self.result.create_temporary(self.refs, &ty);

        let save = mem::take(&mut self.result.statements);
        self.visit(e1)?;
        let rhs = self.take_residual(pos)?;
        self.result
            .add_assignment(self.ids, self.types, &tmp, &ty, rhs, pos);
        let if_true = mem::take(&mut self.result.statements);

        self.visit(e2)?;
        let rhs = self.take_residual(pos)?;
        let residual = self
            .result
            .add_assignment(self.ids, self.types, &tmp, &ty, rhs, pos);
        let if_false = mem::replace(&mut self.result.statements, save);

        self.result.statements.push(if_(
            cond,
            stmt_block_(if_true, pos),
            Some(stmt_block_(if_false, pos)),
            pos,
        ));
        self.result.residual = Some(residual);
        Ok(())
    }

    fn method_call(
        &mut self,
        expression: &Expr,
        callee: &Expr,
        type_args: &[Type],
        args: &[Expr],
    ) -> PassResult<()> {
        if self.left_value {
            return Err(InternalError::CallAsLeftValue(expression.pos));
        }
        let pos = expression.pos;
        let ty = self.types.get_type(expression)?.clone();
        if !side_effects::check(expression, self.types) {
            self.result.residual = Some(expression.clone());
            return Ok(());
        }

        let desc = MethodCallDescription::resolve(expression, self.types)?;
        let mut copy_back: Vec<Stmt> = Vec::new();
        let mut new_args: Vec<Expr> = Vec::new();
        let save_lv = self.left_value;
        let save_nu = self.result_not_used;
        // whether this call is the target of a hit/action_run member; the
        // flag must not leak into calls inside the arguments
        let apply_member = mem::replace(&mut self.in_apply_member, false);
        self.result_not_used = false;

        // one decision governs all arguments uniformly
        let use_temporaries = args.iter().any(|a| side_effects::check(a, self.types))
            || desc
                .method
                .params
                .iter()
                .any(|p| p.direction.is_written());

        self.left_value = false;
        self.visit(callee)?;
        let method = self.take_residual(pos)?;

        for (p, arg) in desc.substitution() {
            if p.direction == Direction::None {
                // compile-time argument; not evaluated at run time
                new_args.push(arg.clone());
                continue;
            }
            trace!("transforming {} for {}", arg, p.name);
            self.left_value = p.direction.is_written();
            self.visit(arg)?;
            let newarg = self.take_residual(arg.pos)?;

            if use_temporaries && !self.types.is_compile_time_constant(&newarg) {
                let tmp = self.result.create_temporary(self.refs, &p.ty);
                if p.direction != Direction::Out {
                    // copy the argument in before the call
                    self.result.add_assignment(
                        self.ids,
                        self.types,
                        &tmp,
                        &p.ty,
                        newarg.clone(),
                        pos,
                    );
                }
                if p.direction.is_written() {
                    // copy the result back out after the call
                    let from = path_(self.ids, tmp.clone(), pos);
                    self.types.set_type(&from, p.ty.clone());
                    debug!("will copy {} back into {}", tmp, newarg);
                    copy_back.push(assign_(newarg, from, pos));
                }
                let value = path_(self.ids, tmp.clone(), pos);
                self.types.set_type(&value, p.ty.clone());
                if p.direction.is_written() {
                    self.types.set_left_value(&value);
                }
                new_args.push(value);
            } else {
                new_args.push(newarg);
            }
        }
        self.left_value = save_lv;
        self.result_not_used = save_nu;

        let simplified = call_(self.ids, method, type_args.to_vec(), new_args, pos);
        self.types.set_type(&simplified, ty.clone());
        if !ty.is_void() && !apply_member && !self.result_not_used {
            let tmp = self.result.create_temporary(self.refs, &ty);
            let residual =
                self.result
                    .add_assignment(self.ids, self.types, &tmp, &ty, simplified, pos);
            debug!("call now reaches its context through {}", residual);
            self.result.residual = Some(residual);
        } else if apply_member {
            // the result of t.apply() has no declarable type; leave the
            // call under its hit/action_run member
            self.result.residual = Some(simplified);
        } else {
            self.result.statements.push(method_call_(simplified, pos));
            self.result.residual = None;
        }
        self.result.statements.append(&mut copy_back);
        Ok(())
    }
}

/// literals, variable references, and member/index/slice chains over
/// them: the shapes that may appear inside an already-rewritten statement
fn atomic(e: &Expr) -> bool {
    match &e.kind {
        ExprKind::Lit(_) | ExprKind::Path(_) => true,
        ExprKind::Member(inner, _) | ExprKind::Slice(inner, ..) => atomic(inner),
        ExprKind::Index(a, i) => atomic(a) && atomic(i),
        _ => false,
    }
}

/// right-hand sides the rewrite itself emits: an atom, one operation over
/// atoms, or a direct call that copies nothing back. A statement whose
/// slots all have this shape is left alone, which is what makes the pass
/// converge on its own output.
fn linear(e: &Expr, types: &TypeMap) -> bool {
    match &e.kind {
        ExprKind::Unary(_, x) => atomic(x),
        ExprKind::Binary(_, a, b) => atomic(a) && atomic(b),
        ExprKind::Call { callee, args, .. } => {
            atomic(callee)
                && args.iter().all(atomic)
                && match MethodCallDescription::resolve(e, types) {
                    Ok(desc) => !desc.method.params.iter().any(|p| p.direction.is_written()),
                    Err(_) => false,
                }
        }
        _ => atomic(e),
    }
}

/// The statement-level driver: rewrites each statement around the
/// residuals of its expression slots and buffers the produced
/// declarations until the enclosing scope closes over them.
pub struct SimplifyExpressions<'a> {
    refs: &'a mut ReferenceMap,
    types: &'a mut TypeMap,
    ids: &'a mut NodeIdGen,
    to_insert: Vec<Declaration>,
}

/// Rewrite every statement of `program` so that sub-expression evaluation
/// order is explicit.
pub fn simplify_program(
    program: &Program,
    refs: &mut ReferenceMap,
    types: &mut TypeMap,
    ids: &mut NodeIdGen,
) -> PassResult<Program> {
    SimplifyExpressions::new(refs, types, ids).simplify_program(program)
}

impl<'a> SimplifyExpressions<'a> {
    pub fn new(
        refs: &'a mut ReferenceMap,
        types: &'a mut TypeMap,
        ids: &'a mut NodeIdGen,
    ) -> SimplifyExpressions<'a> {
        SimplifyExpressions {
            refs,
            types,
            ids,
            to_insert: Vec::new(),
        }
    }

    pub fn simplify_program(&mut self, program: &Program) -> PassResult<Program> {
        let mut objects = Vec::with_capacity(program.objects.len());
        for object in &program.objects {
            objects.push(match object {
                TopLevel::Parser(p) => TopLevel::Parser(self.simplify_parser(p)?),
                TopLevel::Control(c) => TopLevel::Control(self.simplify_control(c)?),
                TopLevel::Function(f) => TopLevel::Function(self.simplify_function(f)?),
                TopLevel::Action(a) => TopLevel::Action(self.simplify_action(a)?),
            });
        }
        Ok(Program { objects })
    }

    pub fn simplify_parser(&mut self, parser: &Parser) -> PassResult<Parser> {
        let save = mem::take(&mut self.to_insert);
        let mut states = Vec::with_capacity(parser.states.len());
        for state in &parser.states {
            states.push(self.simplify_state(state)?);
        }
        let mut locals = mem::replace(&mut self.to_insert, save);
        locals.extend(parser.locals.iter().cloned());
        Ok(Parser {
            name: parser.name.clone(),
            locals,
            states,
        })
    }

    pub fn simplify_control(&mut self, control: &Control) -> PassResult<Control> {
        let save = mem::take(&mut self.to_insert);
        let mut locals = Vec::with_capacity(control.locals.len());
        for decl in &control.locals {
            locals.push(match decl {
                Declaration::Action(a) => Declaration::Action(self.simplify_action(a)?),
                other => other.clone(),
            });
        }
        let apply = self.simplify_components(&control.apply)?;
        let mut spliced = mem::replace(&mut self.to_insert, save);
        spliced.extend(locals);
        Ok(Control {
            name: control.name.clone(),
            locals: spliced,
            apply,
        })
    }

    pub fn simplify_function(&mut self, function: &Function) -> PassResult<Function> {
        let body = self.simplify_body(&function.body)?;
        Ok(Function {
            name: function.name.clone(),
            ret: function.ret.clone(),
            params: function.params.clone(),
            body,
        })
    }

    pub fn simplify_action(&mut self, action: &Action) -> PassResult<Action> {
        let body = self.simplify_body(&action.body)?;
        Ok(Action {
            name: action.name.clone(),
            params: action.params.clone(),
            body,
        })
    }

    /// a function or action body: pending declarations go to its front
    fn simplify_body(&mut self, body: &[StmtOrDecl]) -> PassResult<Vec<StmtOrDecl>> {
        let save = mem::take(&mut self.to_insert);
        let rewritten = self.simplify_components(body)?;
        let pending = mem::replace(&mut self.to_insert, save);
        let mut result: Vec<StmtOrDecl> = pending.into_iter().map(StmtOrDecl::Decl).collect();
        result.extend(rewritten);
        Ok(result)
    }

    fn simplify_state(&mut self, state: &ParserState) -> PassResult<ParserState> {
        let mut components = self.simplify_components(&state.components)?;
        let select = match &state.select {
            None => None,
            Some(sel) => {
                let mut dm = DismantleExpression::new(self.refs, self.types, self.ids);
                let residual = dm.dismantle(sel, false, false)?;
                let parts = dm.into_parts();
                if !parts.simple() {
                    self.to_insert.extend(parts.temporaries);
                    components.extend(parts.statements.into_iter().map(StmtOrDecl::Stmt));
                }
                residual
            }
        };
        Ok(ParserState {
            name: state.name.clone(),
            components,
            select,
        })
    }

    fn simplify_components(&mut self, components: &[StmtOrDecl]) -> PassResult<Vec<StmtOrDecl>> {
        let mut result = Vec::with_capacity(components.len());
        for c in components {
            result.push(match c {
                StmtOrDecl::Stmt(s) => StmtOrDecl::Stmt(self.simplify_stmt(s)?),
                StmtOrDecl::Decl(d) => StmtOrDecl::Decl(d.clone()),
            });
        }
        Ok(result)
    }

    fn simplify_stmt(&mut self, statement: &Stmt) -> PassResult<Stmt> {
        let pos = statement.pos;
        match &statement.kind {
            StmtKind::Empty => Ok(statement.clone()),
            StmtKind::Block(components) => {
                Ok(block_(self.simplify_components(components)?, pos))
            }
            StmtKind::Assign(l, r) => {
                if atomic(l) && linear(r, self.types) {
                    return Ok(statement.clone());
                }
                let mut dm = DismantleExpression::new(self.refs, self.types, self.ids);
                let left = dm
                    .dismantle(l, true, false)?
                    .ok_or(InternalError::MissingResidual(l.pos))?;
                let right = dm
                    .dismantle(r, false, false)?
                    .ok_or(InternalError::MissingResidual(r.pos))?;
                let mut parts = dm.into_parts();
                if parts.simple() {
                    return Ok(statement.clone());
                }
                self.to_insert.append(&mut parts.temporaries);
                parts.statements.push(assign_(left, right, pos));
                Ok(stmt_block_(parts.statements, pos))
            }
            StmtKind::MethodCall(call) => {
                if linear(call, self.types) {
                    return Ok(statement.clone());
                }
                let mut dm = DismantleExpression::new(self.refs, self.types, self.ids);
                dm.dismantle(call, false, true)?;
                let mut parts = dm.into_parts();
                if parts.simple() {
                    return Ok(statement.clone());
                }
                self.to_insert.append(&mut parts.temporaries);
                Ok(stmt_block_(mem::take(&mut parts.statements), pos))
            }
            StmtKind::Return(None) => Ok(statement.clone()),
            StmtKind::Return(Some(e)) => {
                let mut dm = DismantleExpression::new(self.refs, self.types, self.ids);
                let residual = dm.dismantle(e, false, false)?;
                let mut parts = dm.into_parts();
                if parts.simple() {
                    return Ok(statement.clone());
                }
                self.to_insert.append(&mut parts.temporaries);
                parts.statements.push(return_(residual, pos));
                Ok(stmt_block_(parts.statements, pos))
            }
            StmtKind::If(c, t, f) => {
                let if_true = self.simplify_stmt(t)?;
                let if_false = match f {
                    Some(f) => Some(self.simplify_stmt(f)?),
                    None => None,
                };
                let mut dm = DismantleExpression::new(self.refs, self.types, self.ids);
                let residual = dm
                    .dismantle(c, false, false)?
                    .ok_or(InternalError::MissingResidual(c.pos))?;
                let mut parts = dm.into_parts();
                if parts.simple() {
                    return Ok(if_(residual, if_true, if_false, pos));
                }
                self.to_insert.append(&mut parts.temporaries);
                parts.statements.push(if_(residual, if_true, if_false, pos));
                Ok(stmt_block_(parts.statements, pos))
            }
            StmtKind::Switch(e, cases) => {
                let mut rewritten = Vec::with_capacity(cases.len());
                for case in cases {
                    rewritten.push(SwitchCase {
                        label: case.label.clone(),
                        body: match &case.body {
                            Some(body) => Some(self.simplify_stmt(body)?),
                            None => None,
                        },
                    });
                }
                let mut dm = DismantleExpression::new(self.refs, self.types, self.ids);
                let residual = dm
                    .dismantle(e, false, false)?
                    .ok_or(InternalError::MissingResidual(e.pos))?;
                let mut parts = dm.into_parts();
                if parts.simple() {
                    return Ok(switch_(residual, rewritten, pos));
                }
                self.to_insert.append(&mut parts.temporaries);
                parts.statements.push(switch_(residual, rewritten, pos));
                Ok(stmt_block_(parts.statements, pos))
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ir::walk::Visitor;
    use crate::testing::{param, ProgramBuilder};

    fn simplify(b: &mut ProgramBuilder, f: &Function) -> Function {
        SimplifyExpressions::new(&mut b.refs, &mut b.types, &mut b.ids)
            .simplify_function(f)
            .expect("rewrite failed")
    }

    /// every expression node of the rewritten unit must be typed
    fn assert_all_typed(b: &ProgramBuilder, f: &Function) {
        struct Check<'a> {
            types: &'a TypeMap,
            missing: Vec<String>,
        }
        impl Visitor for Check<'_> {
            fn enter_expr(&mut self, e: &Expr) {
                if self.types.try_type(e).is_none() {
                    self.missing.push(e.to_string());
                }
            }
        }
        let mut check = Check {
            types: &b.types,
            missing: vec![],
        };
        for c in &f.body {
            if let StmtOrDecl::Stmt(s) = c {
                s.walk(&mut check);
            }
        }
        assert!(check.missing.is_empty(), "untyped nodes: {:?}", check.missing);
    }

    #[test]
    fn dismantling_a_variable_is_simple() {
        let mut b = ProgramBuilder::new();
        let x = b.bool_var("x");
        let mut dm = DismantleExpression::new(&mut b.refs, &mut b.types, &mut b.ids);
        let residual = dm.dismantle(&x, false, false).unwrap();
        let parts = dm.into_parts();
        assert!(parts.simple());
        assert_eq!(residual.unwrap().to_string(), "x");
    }

    #[test]
    fn call_in_left_position_is_a_bug() {
        let mut b = ProgramBuilder::new();
        let m = b.method("m", vec![], Type::bits(32));
        let call = b.call(m, vec![]);
        let mut dm = DismantleExpression::new(&mut b.refs, &mut b.types, &mut b.ids);
        let err = dm.dismantle(&call, true, false).unwrap_err();
        assert!(matches!(err, InternalError::CallAsLeftValue(_)));
    }

    #[test]
    fn untyped_nodes_are_fatal() {
        let mut b = ProgramBuilder::new();
        let ghost = path_(&mut b.ids, "ghost", Pos::UNKNOWN);
        let mut dm = DismantleExpression::new(&mut b.refs, &mut b.types, &mut b.ids);
        let err = dm.dismantle(&ghost, false, false).unwrap_err();
        assert!(matches!(err, InternalError::MissingType(_)));
    }

    #[test]
    fn short_circuit_and() {
        let mut b = ProgramBuilder::new();
        let x = b.bool_var("x");
        let a = b.method("a", vec![], Type::Bool);
        let bm = b.method("b", vec![], Type::Bool);
        let ca = b.call(a, vec![]);
        let cb = b.call(bm, vec![]);
        let cond = b.and(ca, cb);
        let t = b.lit_bool(true);
        let f = b.function(
            "run",
            Type::Void,
            vec![if_(cond, assign_(x, t, Pos::UNKNOWN), None, Pos::UNKNOWN)],
        );
        let out = simplify(&mut b, &f);
        let expected = "\
void run() {
  bool tmp_0;
  bool tmp_1;
  bool tmp_2;
  {
    tmp_0 = a();
    if (!tmp_0) tmp_1 = false; else {
      tmp_2 = b();
      tmp_1 = tmp_2;
    }
    if (tmp_1) x = true;
  }
}";
        assert_eq!(out.to_string(), expected);
        assert_all_typed(&b, &out);
        // a second run leaves the result alone
        let again = simplify(&mut b, &out);
        assert_eq!(again.to_string(), expected);
    }

    #[test]
    fn short_circuit_or() {
        let mut b = ProgramBuilder::new();
        let x = b.bool_var("x");
        let a = b.method("a", vec![], Type::Bool);
        let bm = b.method("b", vec![], Type::Bool);
        let ca = b.call(a, vec![]);
        let cb = b.call(bm, vec![]);
        let cond = b.or(ca, cb);
        let t = b.lit_bool(true);
        let f = b.function(
            "run",
            Type::Void,
            vec![if_(cond, assign_(x, t, Pos::UNKNOWN), None, Pos::UNKNOWN)],
        );
        let out = simplify(&mut b, &f);
        let expected = "\
void run() {
  bool tmp_0;
  bool tmp_1;
  bool tmp_2;
  {
    tmp_0 = a();
    if (tmp_0) tmp_1 = true; else {
      tmp_2 = b();
      tmp_1 = tmp_2;
    }
    if (tmp_1) x = true;
  }
}";
        assert_eq!(out.to_string(), expected);
    }

    #[test]
    fn nested_short_circuits() {
        let mut b = ProgramBuilder::new();
        let x = b.bool_var("x");
        let a = b.method("a", vec![], Type::Bool);
        let bm = b.method("b", vec![], Type::Bool);
        let d = b.method("d", vec![], Type::Bool);
        let ca = b.call(a, vec![]);
        let cb = b.call(bm, vec![]);
        let cd = b.call(d, vec![]);
        let both = b.and(ca, cb);
        let either = b.or(both, cd);
        let f = b.function(
            "run",
            Type::Void,
            vec![assign_(x, either, Pos::UNKNOWN)],
        );
        let out = simplify(&mut b, &f);
        let expected = "\
void run() {
  bool tmp_0;
  bool tmp_1;
  bool tmp_2;
  bool tmp_3;
  bool tmp_4;
  {
    tmp_0 = a();
    if (!tmp_0) tmp_1 = false; else {
      tmp_2 = b();
      tmp_1 = tmp_2;
    }
    if (tmp_1) tmp_3 = true; else {
      tmp_4 = d();
      tmp_3 = tmp_4;
    }
    x = tmp_3;
  }
}";
        assert_eq!(out.to_string(), expected);
        assert_all_typed(&b, &out);
    }

    #[test]
    fn mux_becomes_a_conditional() {
        let mut b = ProgramBuilder::new();
        let x = b.bits_var("x", 32);
        let c = b.bool_var("c");
        let fm = b.method("f", vec![], Type::bits(32));
        let g = b.method("g", vec![], Type::bits(32));
        let cf = b.call(fm, vec![]);
        let cg = b.call(g, vec![]);
        let m = b.mux(c, cf, cg);
        let f = b.function("run", Type::Void, vec![assign_(x, m, Pos::UNKNOWN)]);
        let out = simplify(&mut b, &f);
        let expected = "\
void run() {
  bit<32> tmp_0;
  bit<32> tmp_1;
  bit<32> tmp_2;
  {
    if (c) {
      tmp_1 = f();
      tmp_0 = tmp_1;
    } else {
      tmp_2 = g();
      tmp_0 = tmp_2;
    }
    x = tmp_0;
  }
}";
        assert_eq!(out.to_string(), expected);
        assert_all_typed(&b, &out);
        let again = simplify(&mut b, &out);
        assert_eq!(again.to_string(), expected);
    }

    #[test]
    fn inout_argument_copies_in_and_out() {
        let mut b = ProgramBuilder::new();
        let y = b.bits_var("y", 32);
        let m = b.method(
            "m",
            vec![param("a", Direction::InOut, Type::bits(32))],
            Type::Void,
        );
        let call = b.call(m, vec![y]);
        let f = b.function("run", Type::Void, vec![method_call_(call, Pos::UNKNOWN)]);
        let out = simplify(&mut b, &f);
        let expected = "\
void run() {
  bit<32> tmp_0;
  {
    tmp_0 = y;
    m(tmp_0);
    y = tmp_0;
  }
}";
        assert_eq!(out.to_string(), expected);
    }

    #[test]
    fn out_argument_copies_out_only() {
        let mut b = ProgramBuilder::new();
        let y = b.bits_var("y", 32);
        let m = b.method(
            "m_out",
            vec![param("a", Direction::Out, Type::bits(32))],
            Type::Void,
        );
        let call = b.call(m, vec![y]);
        let f = b.function("run", Type::Void, vec![method_call_(call, Pos::UNKNOWN)]);
        let out = simplify(&mut b, &f);
        let expected = "\
void run() {
  bit<32> tmp_0;
  {
    m_out(tmp_0);
    y = tmp_0;
  }
}";
        assert_eq!(out.to_string(), expected);
    }

    #[test]
    fn pure_binary_chain_is_linearized() {
        let mut b = ProgramBuilder::new();
        let y = b.bits_var("y", 32);
        let va = b.bits_var("a", 32);
        let vb = b.bits_var("b", 32);
        let vc = b.bits_var("c", 32);
        let s1 = b.add(va, vb);
        let s2 = b.add(s1, vc);
        let f = b.function("run", Type::Void, vec![assign_(y, s2, Pos::UNKNOWN)]);
        let out = simplify(&mut b, &f);
        let expected = "\
void run() {
  bit<32> tmp_0;
  bit<32> tmp_1;
  {
    tmp_0 = a + b;
    tmp_1 = tmp_0 + c;
    y = tmp_1;
  }
}";
        assert_eq!(out.to_string(), expected);
        assert_all_typed(&b, &out);
        let again = simplify(&mut b, &out);
        assert_eq!(again.to_string(), expected);
    }

    #[test]
    fn discarded_result_needs_no_temporary() {
        let mut b = ProgramBuilder::new();
        let poll = b.method("poll", vec![], Type::bits(32));
        let call = b.call(poll, vec![]);
        let f = b.function("run", Type::Void, vec![method_call_(call, Pos::UNKNOWN)]);
        let out = simplify(&mut b, &f);
        let expected = "\
void run() {
  poll();
}";
        assert_eq!(out.to_string(), expected);
    }

    #[test]
    fn named_call_results_stay_put() {
        let mut b = ProgramBuilder::new();
        let x = b.bits_var("x", 32);
        let poll = b.method("poll", vec![], Type::bits(32));
        let call = b.call(poll, vec![]);
        let f = b.function("run", Type::Void, vec![assign_(x, call, Pos::UNKNOWN)]);
        let out = simplify(&mut b, &f);
        let expected = "\
void run() {
  x = poll();
}";
        assert_eq!(out.to_string(), expected);
    }

    #[test]
    fn table_apply_hit_is_not_hoisted() {
        let mut b = ProgramBuilder::new();
        let y = b.bits_var("y", 32);
        let va = b.bits_var("a", 32);
        let t = b.table("t");
        let cond = b.apply_hit(t);
        let f = b.function(
            "run",
            Type::Void,
            vec![if_(cond, assign_(y, va, Pos::UNKNOWN), None, Pos::UNKNOWN)],
        );
        let out = simplify(&mut b, &f);
        let expected = "\
void run() {
  if (t.apply().hit) y = a;
}";
        assert_eq!(out.to_string(), expected);
    }

    #[test]
    fn fresh_names_avoid_program_names() {
        let mut b = ProgramBuilder::new();
        let y = b.bits_var("y", 32);
        let t0 = b.bits_var("tmp_0", 32);
        let vb = b.bits_var("b", 32);
        let vc = b.bits_var("c", 32);
        let s1 = b.add(t0, vb);
        let s2 = b.add(s1, vc);
        let f = b.function("run", Type::Void, vec![assign_(y, s2, Pos::UNKNOWN)]);
        let out = simplify(&mut b, &f);
        let expected = "\
void run() {
  bit<32> tmp_1;
  bit<32> tmp_2;
  {
    tmp_1 = tmp_0 + b;
    tmp_2 = tmp_1 + c;
    y = tmp_2;
  }
}";
        assert_eq!(out.to_string(), expected);
    }

    #[test]
    fn side_effecting_argument_makes_all_arguments_uniform() {
        let mut b = ProgramBuilder::new();
        let y = b.bits_var("y", 32);
        let a = b.method("a", vec![], Type::bits(32));
        let m = b.method(
            "m3",
            vec![
                param("p1", Direction::In, Type::bits(32)),
                param("p2", Direction::In, Type::bits(32)),
            ],
            Type::Void,
        );
        let ca = b.call(a, vec![]);
        let call = b.call(m, vec![ca, y]);
        let f = b.function("run", Type::Void, vec![method_call_(call, Pos::UNKNOWN)]);
        let out = simplify(&mut b, &f);
        let expected = "\
void run() {
  bit<32> tmp_0;
  bit<32> tmp_1;
  bit<32> tmp_2;
  {
    tmp_0 = a();
    tmp_1 = tmp_0;
    tmp_2 = y;
    m3(tmp_1, tmp_2);
  }
}";
        assert_eq!(out.to_string(), expected);
    }

    #[test]
    fn constant_arguments_bypass_temporaries() {
        let mut b = ProgramBuilder::new();
        let y = b.bits_var("y", 32);
        let five = b.lit_int(5, 8);
        let m = b.method(
            "m4",
            vec![
                param("p1", Direction::In, Type::bits(8)),
                param("p2", Direction::InOut, Type::bits(32)),
            ],
            Type::Void,
        );
        let call = b.call(m, vec![five, y]);
        let f = b.function("run", Type::Void, vec![method_call_(call, Pos::UNKNOWN)]);
        let out = simplify(&mut b, &f);
        let expected = "\
void run() {
  bit<32> tmp_0;
  {
    tmp_0 = y;
    m4(8w5, tmp_0);
    y = tmp_0;
  }
}";
        assert_eq!(out.to_string(), expected);
    }

    #[test]
    fn return_value_is_hoisted() {
        let mut b = ProgramBuilder::new();
        let va = b.bits_var("a", 32);
        let vb = b.bits_var("b", 32);
        let sum = b.add(va, vb);
        let f = b.function(
            "run",
            Type::bits(32),
            vec![return_(Some(sum), Pos::UNKNOWN)],
        );
        let out = simplify(&mut b, &f);
        let expected = "\
bit<32> run() {
  bit<32> tmp_0;
  {
    tmp_0 = a + b;
    return tmp_0;
  }
}";
        assert_eq!(out.to_string(), expected);
    }

    #[test]
    fn switch_selector_is_hoisted() {
        let mut b = ProgramBuilder::new();
        let x = b.bits_var("x", 32);
        let va = b.bits_var("a", 32);
        let poll = b.method("poll", vec![], Type::bits(32));
        let call = b.call(poll, vec![]);
        let cases = vec![
            SwitchCase {
                label: SwitchLabel::Name(Id::from("a1")),
                body: Some(assign_(x, va, Pos::UNKNOWN)),
            },
            SwitchCase {
                label: SwitchLabel::Default,
                body: None,
            },
        ];
        let f = b.function("run", Type::Void, vec![switch_(call, cases, Pos::UNKNOWN)]);
        let out = simplify(&mut b, &f);
        let expected = "\
void run() {
  bit<32> tmp_0;
  {
    tmp_0 = poll();
    switch (tmp_0) {
      a1: x = a;
      default:
    }
  }
}";
        assert_eq!(out.to_string(), expected);
    }

    #[test]
    fn select_statements_extend_the_state() {
        let mut b = ProgramBuilder::new();
        let va = b.bits_var("a", 8);
        let vb = b.bits_var("b", 8);
        let sum = b.add(va, vb);
        let sel = b.select(
            sum,
            vec![
                SelectCase {
                    keyset: Keyset::Value(Lit::Int {
                        value: 5,
                        width: Some(8),
                    }),
                    state: Id::from("next"),
                },
                SelectCase {
                    keyset: Keyset::Default,
                    state: Id::from("reject"),
                },
            ],
        );
        let parser = Parser {
            name: Id::from("p"),
            locals: vec![],
            states: vec![ParserState {
                name: Id::from("start"),
                components: vec![],
                select: Some(sel),
            }],
        };
        let out = SimplifyExpressions::new(&mut b.refs, &mut b.types, &mut b.ids)
            .simplify_parser(&parser)
            .expect("rewrite failed");
        let expected = "\
parser p() {
  bit<8> tmp_0;
  state start {
    tmp_0 = a + b;
    transition select (tmp_0) {
      8w5: next;
      default: reject;
    }
  }
}";
        assert_eq!(out.to_string(), expected);
    }

    #[test]
    fn scopes_splice_their_own_declarations() {
        let mut b = ProgramBuilder::new();
        let y = b.bits_var("y", 32);
        let va = b.bits_var("a", 32);
        let vb = b.bits_var("b", 32);
        let vc = b.bits_var("c", 32);
        let s1 = b.add(va, vb);
        let s2 = b.add(s1, vc);
        let action = Action {
            name: Id::from("a0"),
            params: vec![],
            body: vec![StmtOrDecl::Stmt(assign_(y, s2, Pos::UNKNOWN))],
        };
        let y2 = b.bits_var("y", 32);
        let m = b.method(
            "m",
            vec![param("p", Direction::InOut, Type::bits(32))],
            Type::Void,
        );
        let call = b.call(m, vec![y2]);
        let control = Control {
            name: Id::from("c0"),
            locals: vec![Declaration::Action(action)],
            apply: vec![StmtOrDecl::Stmt(method_call_(call, Pos::UNKNOWN))],
        };
        let out = SimplifyExpressions::new(&mut b.refs, &mut b.types, &mut b.ids)
            .simplify_control(&control)
            .expect("rewrite failed");
        let expected = "\
control c0() {
  bit<32> tmp_2;
  action a0() {
    bit<32> tmp_0;
    bit<32> tmp_1;
    {
      tmp_0 = a + b;
      tmp_1 = tmp_0 + c;
      y = tmp_1;
    }
  }
  apply {
    {
      tmp_2 = y;
      m(tmp_2);
      y = tmp_2;
    }
  }
}";
        assert_eq!(out.to_string(), expected);
    }

    #[test]
    fn extract_copies_the_header_out() {
        let mut b = ProgramBuilder::new();
        let pkt = b.var("pkt", Type::Named(Id::from("packet_in")));
        let h = b.var("h", Type::Named(Id::from("ethernet_t")));
        let call = b.extern_call(pkt, "extract", vec![h]);
        let f = b.function("run", Type::Void, vec![method_call_(call, Pos::UNKNOWN)]);
        let out = simplify(&mut b, &f);
        let expected = "\
void run() {
  ethernet_t tmp_0;
  {
    pkt.extract(tmp_0);
    h = tmp_0;
  }
}";
        assert_eq!(out.to_string(), expected);
    }

    #[test]
    fn slice_targets_stay_left_values() {
        let mut b = ProgramBuilder::new();
        let y = b.bits_var("y", 32);
        let sl = b.slice(y, 7, 0);
        let c = b.bool_var("c");
        let va = b.bits_var("a", 8);
        let vz = b.bits_var("z", 8);
        let m = b.mux(c, va, vz);
        let f = b.function("run", Type::Void, vec![assign_(sl, m, Pos::UNKNOWN)]);
        let out = simplify(&mut b, &f);
        let expected = "\
void run() {
  bit<8> tmp_0;
  {
    if (c) {
      tmp_0 = a;
    } else {
      tmp_0 = z;
    }
    y[7:0] = tmp_0;
  }
}";
        assert_eq!(out.to_string(), expected);
        assert_all_typed(&b, &out);
        let assigned = out
            .body
            .iter()
            .find_map(|c| match c {
                StmtOrDecl::Stmt(Stmt {
                    kind: StmtKind::Block(components),
                    ..
                }) => components.last(),
                _ => None,
            })
            .expect("no rewritten block");
        match assigned {
            StmtOrDecl::Stmt(Stmt {
                kind: StmtKind::Assign(lhs, _),
                ..
            }) => {
                assert!(matches!(lhs.kind, ExprKind::Slice(..)));
                assert!(b.types.is_left_value(lhs));
            }
            other => panic!("expected a final assignment, got {:?}", other),
        }
    }

    #[test]
    fn constant_slices_bypass_temporaries() {
        let mut b = ProgramBuilder::new();
        let y = b.bits_var("y", 32);
        let k = b.bits_var("k", 32);
        let sl = b.slice(k, 7, 0);
        b.types.set_compile_time_constant(&sl);
        let m = b.method(
            "m5",
            vec![
                param("p1", Direction::In, Type::bits(8)),
                param("p2", Direction::InOut, Type::bits(32)),
            ],
            Type::Void,
        );
        let call = b.call(m, vec![sl, y]);
        let f = b.function("run", Type::Void, vec![method_call_(call, Pos::UNKNOWN)]);
        let out = simplify(&mut b, &f);
        let expected = "\
void run() {
  bit<32> tmp_0;
  {
    tmp_0 = y;
    m5(k[7:0], tmp_0);
    y = tmp_0;
  }
}";
        assert_eq!(out.to_string(), expected);
    }

    #[test]
    fn member_targets_stay_left_values() {
        let mut b = ProgramBuilder::new();
        let h = b.var("h", Type::Named(Id::from("hdr_t")));
        let hf = b.member(h, "f", Type::bits(32));
        let c = b.bool_var("c");
        let y = b.bits_var("y", 32);
        let z = b.bits_var("z", 32);
        let m = b.mux(c, y, z);
        let f = b.function("run", Type::Void, vec![assign_(hf, m, Pos::UNKNOWN)]);
        let out = simplify(&mut b, &f);
        let assigned = out
            .body
            .iter()
            .find_map(|c| match c {
                StmtOrDecl::Stmt(Stmt {
                    kind: StmtKind::Block(components),
                    ..
                }) => components.last(),
                _ => None,
            })
            .expect("no rewritten block");
        match assigned {
            StmtOrDecl::Stmt(Stmt {
                kind: StmtKind::Assign(lhs, _),
                ..
            }) => {
                assert!(matches!(lhs.kind, ExprKind::Member(..)));
                assert!(b.types.is_left_value(lhs));
            }
            other => panic!("expected a final assignment, got {:?}", other),
        }
    }
}
