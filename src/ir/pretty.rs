//! Concrete-syntax printing of the IR.
//!
//! The layout is deliberately rigid: expressions never break, statements
//! sit one per line, nesting indents by two. Rewrite tests compare
//! rendered programs, so the printer must produce the same text at every
//! width.

use super::syntax::*;
use crate::impl_Display_Pretty;
use crate::shared::pretty::Pretty;
use crate::shared::{Direction, Param, Type};

/// wrap compound operands so precedence never has to be reconstructed
fn operand<'b, D, A>(e: &'b Expr, pp: &'b D) -> pretty::DocBuilder<'b, D, A>
where
    D: pretty::DocAllocator<'b, A>,
    D::Doc: Clone,
    A: Clone,
{
    match e.kind {
        ExprKind::Binary(..) | ExprKind::And(..) | ExprKind::Or(..) | ExprKind::Mux(..) => {
            e.pretty(pp).parens()
        }
        _ => e.pretty(pp),
    }
}

fn comma_sep<'b, D, A, T: Pretty>(items: &'b [T], pp: &'b D) -> pretty::DocBuilder<'b, D, A>
where
    D: pretty::DocAllocator<'b, A>,
    D::Doc: Clone,
    A: Clone,
{
    pp.intersperse(items.iter().map(|i| i.pretty(pp)), pp.text(", "))
}

fn block<'b, D, A>(components: &'b [StmtOrDecl], pp: &'b D) -> pretty::DocBuilder<'b, D, A>
where
    D: pretty::DocAllocator<'b, A>,
    D::Doc: Clone,
    A: Clone,
{
    if components.is_empty() {
        return pp.text("{ }");
    }
    pp.text("{")
        .append(
            pp.concat(
                components
                    .iter()
                    .map(|c| pp.hardline().append(c.pretty(pp)))
                    .collect::<Vec<_>>(),
            )
            .nest(2),
        )
        .append(pp.hardline())
        .append(pp.text("}"))
}

/// an `if` branch prints inline unless it is a block
fn branch<'b, D, A>(s: &'b Stmt, pp: &'b D) -> pretty::DocBuilder<'b, D, A>
where
    D: pretty::DocAllocator<'b, A>,
    D::Doc: Clone,
    A: Clone,
{
    match &s.kind {
        StmtKind::Block(components) => block(components, pp),
        _ => s.pretty(pp),
    }
}

impl Pretty for Lit {
    fn pretty<'b, D, A>(&'b self, pp: &'b D) -> pretty::DocBuilder<'b, D, A>
    where
        D: pretty::DocAllocator<'b, A>,
        D::Doc: Clone,
        A: Clone,
    {
        match self {
            Lit::Bool(b) => pp.text(if *b { "true" } else { "false" }),
            Lit::Int {
                value,
                width: Some(w),
            } => pp.text(format!("{}w{}", w, value)),
            Lit::Int { value, width: None } => pp.as_string(value),
        }
    }
}

impl Pretty for Expr {
    fn pretty<'b, D, A>(&'b self, pp: &'b D) -> pretty::DocBuilder<'b, D, A>
    where
        D: pretty::DocAllocator<'b, A>,
        D::Doc: Clone,
        A: Clone,
    {
        use ExprKind::*;
        match &self.kind {
            Lit(l) => l.pretty(pp),
            Path(name) => pp.as_string(name),
            Member(e, name) => operand(e, pp).append(pp.text(format!(".{}", name))),
            Index(a, i) => operand(a, pp).append(i.pretty(pp).brackets()),
            Slice(e, hi, lo) => {
                operand(e, pp).append(pp.text(format!("[{}:{}]", hi, lo)))
            }
            Unary(op, e) => pp.text(op_str(*op)).append(operand(e, pp)),
            Binary(op, l, r) => operand(l, pp)
                .append(pp.text(format!(" {} ", bin_str(*op))))
                .append(operand(r, pp)),
            And(l, r) => operand(l, pp).append(pp.text(" && ")).append(operand(r, pp)),
            Or(l, r) => operand(l, pp).append(pp.text(" || ")).append(operand(r, pp)),
            Mux(c, t, f) => operand(c, pp)
                .append(pp.text(" ? "))
                .append(operand(t, pp))
                .append(pp.text(" : "))
                .append(operand(f, pp)),
            Call {
                callee,
                type_args,
                args,
            } => {
                let targs = if type_args.is_empty() {
                    pp.nil()
                } else {
                    pp.text("<")
                        .append(comma_sep(type_args, pp))
                        .append(pp.text(">"))
                };
                operand(callee, pp)
                    .append(targs)
                    .append(comma_sep(args, pp).parens())
            }
            List(es) => pp.text("{ ").append(comma_sep(es, pp)).append(pp.text(" }")),
            Select { selector, cases } => {
                // a list selector shares the parens of the select head
                let sel = match &selector.kind {
                    List(es) => comma_sep(es, pp),
                    _ => selector.pretty(pp),
                };
                pp.text("select (")
                    .append(sel)
                    .append(pp.text(") {"))
                    .append(
                        pp.concat(
                            cases
                                .iter()
                                .map(|c| pp.hardline().append(c.pretty(pp)))
                                .collect::<Vec<_>>(),
                        )
                        .nest(2),
                    )
                    .append(pp.hardline())
                    .append(pp.text("}"))
            }
        }
    }
}

fn op_str(op: UnOp) -> &'static str {
    match op {
        UnOp::Not => "!",
        UnOp::Cmpl => "~",
        UnOp::Neg => "-",
    }
}

fn bin_str(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Shl => "<<",
        BinOp::Shr => ">>",
        BinOp::BitAnd => "&",
        BinOp::BitOr => "|",
        BinOp::BitXor => "^",
        BinOp::Eq => "==",
        BinOp::Ne => "!=",
        BinOp::Lt => "<",
        BinOp::Le => "<=",
        BinOp::Gt => ">",
        BinOp::Ge => ">=",
    }
}

impl Pretty for SelectCase {
    fn pretty<'b, D, A>(&'b self, pp: &'b D) -> pretty::DocBuilder<'b, D, A>
    where
        D: pretty::DocAllocator<'b, A>,
        D::Doc: Clone,
        A: Clone,
    {
        let key = match &self.keyset {
            Keyset::Value(l) => l.pretty(pp),
            Keyset::Default => pp.text("default"),
        };
        key.append(pp.text(format!(": {};", self.state)))
    }
}

impl Pretty for Stmt {
    fn pretty<'b, D, A>(&'b self, pp: &'b D) -> pretty::DocBuilder<'b, D, A>
    where
        D: pretty::DocAllocator<'b, A>,
        D::Doc: Clone,
        A: Clone,
    {
        use StmtKind::*;
        match &self.kind {
            Empty => pp.text(";"),
            Block(components) => block(components, pp),
            Assign(l, r) => l
                .pretty(pp)
                .append(pp.text(" = "))
                .append(r.pretty(pp))
                .append(pp.text(";")),
            MethodCall(e) => e.pretty(pp).append(pp.text(";")),
            Return(None) => pp.text("return;"),
            Return(Some(e)) => pp
                .text("return ")
                .append(e.pretty(pp))
                .append(pp.text(";")),
            If(c, t, f) => {
                let head = pp
                    .text("if (")
                    .append(c.pretty(pp))
                    .append(pp.text(") "))
                    .append(branch(t, pp));
                match f {
                    Some(f) => head.append(pp.text(" else ")).append(branch(f, pp)),
                    None => head,
                }
            }
            Switch(e, cases) => pp
                .text("switch (")
                .append(e.pretty(pp))
                .append(pp.text(") {"))
                .append(
                    pp.concat(
                        cases
                            .iter()
                            .map(|c| pp.hardline().append(c.pretty(pp)))
                            .collect::<Vec<_>>(),
                    )
                    .nest(2),
                )
                .append(pp.hardline())
                .append(pp.text("}")),
        }
    }
}

impl Pretty for SwitchCase {
    fn pretty<'b, D, A>(&'b self, pp: &'b D) -> pretty::DocBuilder<'b, D, A>
    where
        D: pretty::DocAllocator<'b, A>,
        D::Doc: Clone,
        A: Clone,
    {
        let label = match &self.label {
            SwitchLabel::Name(n) => pp.as_string(n),
            SwitchLabel::Default => pp.text("default"),
        };
        match &self.body {
            Some(s) => label.append(pp.text(": ")).append(branch(s, pp)),
            None => label.append(pp.text(":")),
        }
    }
}

impl Pretty for StmtOrDecl {
    fn pretty<'b, D, A>(&'b self, pp: &'b D) -> pretty::DocBuilder<'b, D, A>
    where
        D: pretty::DocAllocator<'b, A>,
        D::Doc: Clone,
        A: Clone,
    {
        match self {
            StmtOrDecl::Stmt(s) => s.pretty(pp),
            StmtOrDecl::Decl(d) => d.pretty(pp),
        }
    }
}

impl Pretty for Type {
    fn pretty<'b, D, A>(&'b self, pp: &'b D) -> pretty::DocBuilder<'b, D, A>
    where
        D: pretty::DocAllocator<'b, A>,
        D::Doc: Clone,
        A: Clone,
    {
        match self {
            Type::Bool => pp.text("bool"),
            Type::Bits { width, signed } => {
                pp.text(format!("{}<{}>", if *signed { "int" } else { "bit" }, width))
            }
            Type::Void => pp.text("void"),
            Type::Named(n) | Type::Table(n) => pp.as_string(n),
            Type::ApplyResult(n) => pp.text(format!("apply_result({})", n)),
            Type::State => pp.text("state"),
            Type::Method(_) => pp.text("method"),
        }
    }
}

impl Pretty for Param {
    fn pretty<'b, D, A>(&'b self, pp: &'b D) -> pretty::DocBuilder<'b, D, A>
    where
        D: pretty::DocAllocator<'b, A>,
        D::Doc: Clone,
        A: Clone,
    {
        let dir = match self.direction {
            Direction::None => "",
            Direction::In => "in ",
            Direction::Out => "out ",
            Direction::InOut => "inout ",
        };
        pp.text(dir)
            .append(self.ty.pretty(pp))
            .append(pp.text(format!(" {}", self.name)))
    }
}

impl Pretty for Declaration {
    fn pretty<'b, D, A>(&'b self, pp: &'b D) -> pretty::DocBuilder<'b, D, A>
    where
        D: pretty::DocAllocator<'b, A>,
        D::Doc: Clone,
        A: Clone,
    {
        match self {
            Declaration::Variable(v) => v.pretty(pp),
            Declaration::Action(a) => a.pretty(pp),
            Declaration::Table(t) => {
                if t.actions.is_empty() {
                    pp.text(format!("table {} {{ }}", t.name))
                } else {
                    let actions = t
                        .actions
                        .iter()
                        .map(|a| a.to_string())
                        .collect::<Vec<_>>()
                        .join("; ");
                    pp.text(format!("table {} {{ actions = {{ {}; }} }}", t.name, actions))
                }
            }
        }
    }
}

impl Pretty for VarDecl {
    fn pretty<'b, D, A>(&'b self, pp: &'b D) -> pretty::DocBuilder<'b, D, A>
    where
        D: pretty::DocAllocator<'b, A>,
        D::Doc: Clone,
        A: Clone,
    {
        let head = self
            .ty
            .pretty(pp)
            .append(pp.text(format!(" {}", self.name)));
        match &self.init {
            Some(e) => head
                .append(pp.text(" = "))
                .append(e.pretty(pp))
                .append(pp.text(";")),
            None => head.append(pp.text(";")),
        }
    }
}

impl Pretty for Action {
    fn pretty<'b, D, A>(&'b self, pp: &'b D) -> pretty::DocBuilder<'b, D, A>
    where
        D: pretty::DocAllocator<'b, A>,
        D::Doc: Clone,
        A: Clone,
    {
        pp.text(format!("action {}", self.name))
            .append(comma_sep(&self.params, pp).parens())
            .append(pp.text(" "))
            .append(block(&self.body, pp))
    }
}

impl Pretty for Function {
    fn pretty<'b, D, A>(&'b self, pp: &'b D) -> pretty::DocBuilder<'b, D, A>
    where
        D: pretty::DocAllocator<'b, A>,
        D::Doc: Clone,
        A: Clone,
    {
        self.ret
            .pretty(pp)
            .append(pp.text(format!(" {}", self.name)))
            .append(comma_sep(&self.params, pp).parens())
            .append(pp.text(" "))
            .append(block(&self.body, pp))
    }
}

impl Pretty for ParserState {
    fn pretty<'b, D, A>(&'b self, pp: &'b D) -> pretty::DocBuilder<'b, D, A>
    where
        D: pretty::DocAllocator<'b, A>,
        D::Doc: Clone,
        A: Clone,
    {
        let mut lines = Vec::new();
        for c in &self.components {
            lines.push(pp.hardline().append(c.pretty(pp)));
        }
        if let Some(sel) = &self.select {
            let transition = match &sel.kind {
                ExprKind::Select { .. } => pp.text("transition ").append(sel.pretty(pp)),
                _ => pp
                    .text("transition ")
                    .append(sel.pretty(pp))
                    .append(pp.text(";")),
            };
            lines.push(pp.hardline().append(transition));
        }
        if lines.is_empty() {
            return pp.text(format!("state {} {{ }}", self.name));
        }
        pp.text(format!("state {} {{", self.name))
            .append(pp.concat(lines).nest(2))
            .append(pp.hardline())
            .append(pp.text("}"))
    }
}

impl Pretty for Parser {
    fn pretty<'b, D, A>(&'b self, pp: &'b D) -> pretty::DocBuilder<'b, D, A>
    where
        D: pretty::DocAllocator<'b, A>,
        D::Doc: Clone,
        A: Clone,
    {
        let mut lines = Vec::new();
        for d in &self.locals {
            lines.push(pp.hardline().append(d.pretty(pp)));
        }
        for s in &self.states {
            lines.push(pp.hardline().append(s.pretty(pp)));
        }
        pp.text(format!("parser {}() {{", self.name))
            .append(pp.concat(lines).nest(2))
            .append(pp.hardline())
            .append(pp.text("}"))
    }
}

impl Pretty for Control {
    fn pretty<'b, D, A>(&'b self, pp: &'b D) -> pretty::DocBuilder<'b, D, A>
    where
        D: pretty::DocAllocator<'b, A>,
        D::Doc: Clone,
        A: Clone,
    {
        let mut lines = Vec::new();
        for d in &self.locals {
            lines.push(pp.hardline().append(d.pretty(pp)));
        }
        lines.push(
            pp.hardline()
                .append(pp.text("apply "))
                .append(block(&self.apply, pp)),
        );
        pp.text(format!("control {}() {{", self.name))
            .append(pp.concat(lines).nest(2))
            .append(pp.hardline())
            .append(pp.text("}"))
    }
}

impl Pretty for TopLevel {
    fn pretty<'b, D, A>(&'b self, pp: &'b D) -> pretty::DocBuilder<'b, D, A>
    where
        D: pretty::DocAllocator<'b, A>,
        D::Doc: Clone,
        A: Clone,
    {
        match self {
            TopLevel::Parser(p) => p.pretty(pp),
            TopLevel::Control(c) => c.pretty(pp),
            TopLevel::Function(f) => f.pretty(pp),
            TopLevel::Action(a) => a.pretty(pp),
        }
    }
}

impl Pretty for Program {
    fn pretty<'b, D, A>(&'b self, pp: &'b D) -> pretty::DocBuilder<'b, D, A>
    where
        D: pretty::DocAllocator<'b, A>,
        D::Doc: Clone,
        A: Clone,
    {
        pp.intersperse(
            self.objects.iter().map(|o| o.pretty(pp)),
            pp.hardline().append(pp.hardline()),
        )
    }
}

impl_Display_Pretty!(Expr);
impl_Display_Pretty!(Stmt);
impl_Display_Pretty!(Declaration);
impl_Display_Pretty!(Action);
impl_Display_Pretty!(Function);
impl_Display_Pretty!(ParserState);
impl_Display_Pretty!(Parser);
impl_Display_Pretty!(Control);
impl_Display_Pretty!(Program);
impl_Display_Pretty!(Type);
