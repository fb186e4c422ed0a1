//! Lowering from the typed AST to the flat IR.
//!
//! This walks each function body exactly once and rewrites every high-level
//! construct into labels, jumps, and assignments over pure expression trees:
//!
//! * control flow (`if`/`while`/`do`/`for`/`switch`, short-circuit operators,
//!   `goto`) becomes [`ir::Stmt::Jump`]/[`ir::Stmt::CondJump`] between fresh
//!   labels;
//! * side-effecting expressions (assignments, op-assignments, `++`/`--`,
//!   calls in subexpressions) are split out into statements, with their value
//!   flowing through a fresh temporary;
//! * array indexing, member access, and pointer arithmetic become explicit
//!   address computations.
//!
//! User-level labels are audited after each body: `goto` to a missing label
//! is an error, a label nothing jumps to is a warning.  All diagnostics go to
//! the [`ErrorSink`]; the pass keeps going and fails only at the end, so one
//! run reports everything.

use indexmap::IndexMap;

use crate::ast;
use crate::entity::{EntityId, EntityTable, ScopeId};
use crate::error::{ErrorReported, ErrorSink};
use crate::ident::Ident;
use crate::ir;
use crate::pos::{Sp, Span};
use crate::types::TypeTable;

mod expr;

/// Lower a whole semantically-analyzed program.
///
/// Temporaries minted during lowering are added to `program.entities`; the
/// type table gains interned pointer types but is otherwise passed through.
pub fn run(program: &mut ast::Program, sink: &mut ErrorSink) -> Result<ir::Program, ErrorReported> {
    let ast::Program {
        ref mut types,
        ref mut entities,
        consts: _,
        ref defined_variables,
        ref defined_functions,
    } = *program;

    let mut variables = Vec::with_capacity(defined_variables.len());
    for var in defined_variables {
        let init = var.init.as_ref().map(|init| {
            Lowerer::new(types, entities, sink).lower_module_init(init)
        });
        variables.push(ir::DefinedVariable { entity: var.entity, init });
    }

    let mut functions = Vec::with_capacity(defined_functions.len());
    for func in defined_functions {
        let (body, statics) = Lowerer::new(types, entities, sink).lower_function_body(func);
        variables.extend(statics);
        functions.push(ir::DefinedFunction { entity: func.entity, body });
    }

    if sink.error_occurred() {
        return Err(ErrorReported);
    }
    Ok(ir::Program { variables, functions })
}

/// Bookkeeping for one user-level label name.
struct JumpEntry {
    label: ir::Label,
    defined: bool,
    ref_count: u32,
    /// The definition site once defined; until then, the first reference.
    location: Span,
}

/// Per-function lowering state.
///
/// The statement list, the scope stack (for temporary allocation), the
/// break/continue target stacks, and the user-label jump map all live exactly
/// as long as one function body.
struct Lowerer<'a> {
    types: &'a mut TypeTable,
    entities: &'a mut EntityTable,
    sink: &'a mut ErrorSink,

    stmts: Vec<ir::Stmt>,
    static_variables: Vec<ir::DefinedVariable>,
    scope_stack: Vec<ScopeId>,
    break_stack: Vec<ir::Label>,
    continue_stack: Vec<ir::Label>,
    jump_map: IndexMap<Ident, JumpEntry>,
    next_label: u32,

    /// Depth of expression nesting; see [`Self::is_statement`] in `expr.rs`.
    expr_nest_level: u32,
    /// Index in `stmts` where the expression currently being lowered began;
    /// hoisted assignments are inserted here, in hoisting order.
    before_stmt: usize,
}

impl<'a> Lowerer<'a> {
    fn new(
        types: &'a mut TypeTable,
        entities: &'a mut EntityTable,
        sink: &'a mut ErrorSink,
    ) -> Self {
        Lowerer {
            types,
            entities,
            sink,
            stmts: vec![],
            static_variables: vec![],
            scope_stack: vec![],
            break_stack: vec![],
            continue_stack: vec![],
            jump_map: IndexMap::new(),
            next_label: 1,
            expr_nest_level: 0,
            before_stmt: 0,
        }
    }

    /// Lower the initializer of a module-scope variable.
    ///
    /// There is no statement context here; the analyzer only lets constant
    /// expressions through, so anything that would need to emit a statement
    /// is an upstream bug.
    fn lower_module_init(mut self, init: &Sp<ast::Expr>) -> ir::Expr {
        let expr = self.transform_value_expr(init);
        assert!(
            self.stmts.is_empty(),
            "(bug!) module-level initializer needed runtime statements",
        );
        expr
    }

    fn lower_function_body(
        mut self,
        func: &ast::DefinedFunction,
    ) -> (Vec<ir::Stmt>, Vec<ir::DefinedVariable>) {
        self.lower_block(&func.body);
        self.audit_jump_map();
        assert!(
            self.break_stack.is_empty() && self.continue_stack.is_empty(),
            "(bug!) unbalanced break/continue stacks after lowering",
        );
        (self.stmts, self.static_variables)
    }

    // ------------------
    // Statements.

    fn lower_stmt(&mut self, stmt: &Sp<ast::Stmt>) {
        self.before_stmt = self.stmts.len();
        match &stmt.value {
            ast::Stmt::Block(block) => self.lower_block(block),

            ast::Stmt::Expr(expr) => self.lower_expr_stmt(expr),

            ast::Stmt::If { cond, then_body, else_body } => {
                self.lower_if(stmt.span, cond, then_body, else_body.as_deref());
            }

            ast::Stmt::While { cond, body } => self.lower_while(stmt.span, cond, body),

            ast::Stmt::DoWhile { body, cond } => self.lower_do_while(stmt.span, body, cond),

            ast::Stmt::For { init, cond, step, body } => {
                self.lower_for(stmt.span, init.as_ref(), cond.as_ref(), step.as_ref(), body);
            }

            ast::Stmt::Switch { cond, cases } => self.lower_switch(stmt.span, cond, cases),

            ast::Stmt::Break => match self.break_stack.last().copied() {
                Some(target) => self.jump(stmt.span, target),
                None => self.sink.emit(error!(
                    message("break outside of a loop or switch"),
                    primary(stmt, "nothing to break out of"),
                )),
            },

            ast::Stmt::Continue => match self.continue_stack.last().copied() {
                Some(target) => self.jump(stmt.span, target),
                None => self.sink.emit(error!(
                    message("continue outside of a loop"),
                    primary(stmt, "nothing to continue"),
                )),
            },

            ast::Stmt::Label { name, body } => self.lower_label_stmt(name, body.as_deref()),

            ast::Stmt::Goto { target } => {
                let label = self.refer_label(target);
                self.jump(stmt.span, label);
            }

            ast::Stmt::Return { value } => {
                let value = value.as_ref().map(|value| self.transform_value_expr(value));
                self.push(ir::Stmt::Return { loc: stmt.span, value });
            }
        }
    }

    /// An expression in statement position: an expression statement, or the
    /// init/step clause of a `for`.
    fn lower_expr_stmt(&mut self, expr: &Sp<ast::Expr>) {
        self.before_stmt = self.stmts.len();
        // `None` means the expression already emitted itself as statements.
        if let Some(e) = self.transform_expr(expr) {
            self.push(ir::Stmt::ExprStmt { loc: expr.span, expr: e });
        }
    }

    fn lower_block(&mut self, block: &ast::Block) {
        self.scope_stack.push(block.scope);
        for var in &block.variables {
            let init = match &var.init {
                Some(init) => init,
                None => continue,
            };
            if self.entities.get(var.entity).is_static() {
                // `static` locals initialize at load time, like module-scope
                // variables; nothing executes here.
                let watermark = self.stmts.len();
                let expr = self.transform_value_expr(init);
                assert_eq!(
                    self.stmts.len(), watermark,
                    "(bug!) static initializer needed runtime statements",
                );
                self.static_variables.push(ir::DefinedVariable {
                    entity: var.entity,
                    init: Some(expr),
                });
            } else {
                let rhs = self.transform_value_expr(init);
                let lhs = self.ref_var(var.entity);
                self.push(ir::Stmt::Assign { loc: init.span, lhs, rhs });
            }
        }
        for stmt in &block.stmts {
            self.lower_stmt(stmt);
        }
        self.scope_stack.pop();
    }

    fn lower_if(
        &mut self,
        span: Span,
        cond: &Sp<ast::Expr>,
        then_body: &Sp<ast::Stmt>,
        else_body: Option<&Sp<ast::Stmt>>,
    ) {
        let then_label = self.new_label();
        let else_label = self.new_label();
        let end_label = self.new_label();

        let cond = self.transform_value_expr(cond);
        match else_body {
            None => {
                self.cjump(span, cond, then_label, end_label);
                self.label(then_label);
                self.lower_stmt(then_body);
                self.jump(span, end_label);
                self.label(end_label);
            }
            Some(else_body) => {
                self.cjump(span, cond, then_label, else_label);
                self.label(then_label);
                self.lower_stmt(then_body);
                self.jump(span, end_label);
                self.label(else_label);
                self.lower_stmt(else_body);
                self.jump(span, end_label);
                self.label(end_label);
            }
        }
    }

    fn lower_while(&mut self, span: Span, cond: &Sp<ast::Expr>, body: &Sp<ast::Stmt>) {
        let beg_label = self.new_label();
        let body_label = self.new_label();
        let end_label = self.new_label();

        self.label(beg_label);
        // the condition re-evaluates each iteration, so anything it hoists
        // must land after `beg_label` (transform_value_expr resets the
        // hoisting cursor)
        let cond = self.transform_value_expr(cond);
        self.cjump(span, cond, body_label, end_label);
        self.label(body_label);
        self.push_continue(beg_label);
        self.push_break(end_label);
        self.lower_stmt(body);
        self.pop_break();
        self.pop_continue();
        self.jump(span, beg_label);
        self.label(end_label);
    }

    fn lower_do_while(&mut self, span: Span, body: &Sp<ast::Stmt>, cond: &Sp<ast::Expr>) {
        let beg_label = self.new_label();
        let cont_label = self.new_label();
        let end_label = self.new_label();

        self.push_continue(cont_label);
        self.push_break(end_label);
        self.label(beg_label);
        self.lower_stmt(body);
        self.pop_break();
        self.pop_continue();
        self.label(cont_label);
        let cond = self.transform_value_expr(cond);
        self.cjump(span, cond, beg_label, end_label);
        self.label(end_label);
    }

    fn lower_for(
        &mut self,
        span: Span,
        init: Option<&Sp<ast::Expr>>,
        cond: Option<&Sp<ast::Expr>>,
        step: Option<&Sp<ast::Expr>>,
        body: &Sp<ast::Stmt>,
    ) {
        let beg_label = self.new_label();
        let body_label = self.new_label();
        let cont_label = self.new_label();
        let end_label = self.new_label();

        if let Some(init) = init {
            self.lower_expr_stmt(init);
        }
        self.label(beg_label);
        if let Some(cond) = cond {
            let cond = self.transform_value_expr(cond);
            self.cjump(span, cond, body_label, end_label);
        }
        self.label(body_label);
        self.push_continue(cont_label);
        self.push_break(end_label);
        self.lower_stmt(body);
        self.pop_break();
        self.pop_continue();
        self.label(cont_label);
        if let Some(step) = step {
            self.lower_expr_stmt(step);
        }
        self.jump(span, beg_label);
        self.label(end_label);
    }

    fn lower_switch(&mut self, span: Span, cond: &Sp<ast::Expr>, cases: &[ast::SwitchCase]) {
        // one label per clause, in source order; the end label follows
        let clause_labels: Vec<ir::Label> = cases.iter().map(|_| self.new_label()).collect();
        let end_label = self.new_label();

        let cond = self.transform_value_expr(cond);

        let mut ir_cases = vec![];
        let mut default_label = end_label;
        for (case, &label) in cases.iter().zip(&clause_labels) {
            if case.is_default() {
                default_label = label;
                continue;
            }
            for value in &case.values {
                match self.transform_value_expr(value) {
                    ir::Expr::Int { value, .. } => ir_cases.push(ir::Case { value, label }),
                    _ => self.sink.emit(error!(
                        message("case value is not a constant integer"),
                        primary(value, "must be a compile-time integer constant"),
                    )),
                }
            }
        }

        self.push(ir::Stmt::Switch {
            loc: span,
            cond,
            cases: ir_cases,
            default_label,
            end_label,
        });

        // fall-through between clauses is just the next clause's label being
        // reached naturally
        self.push_break(end_label);
        for (case, &label) in cases.iter().zip(&clause_labels) {
            self.label(label);
            self.lower_block(&case.body);
        }
        self.pop_break();
        self.label(end_label);
    }

    fn lower_label_stmt(&mut self, name: &Sp<Ident>, body: Option<&Sp<ast::Stmt>>) {
        match self.define_label(name) {
            Ok(label) => {
                self.push(ir::Stmt::Label { label });
                if let Some(body) = body {
                    self.lower_stmt(body);
                }
            }
            // the duplicate definition and its statement are skipped;
            // lowering continues after it
            Err(diagnostic) => self.sink.emit(diagnostic),
        }
    }

    // ------------------
    // Control-flow helpers.

    fn new_label(&mut self) -> ir::Label {
        let label = ir::Label(self.next_label);
        self.next_label += 1;
        label
    }

    fn push(&mut self, stmt: ir::Stmt) {
        self.stmts.push(stmt);
    }

    fn label(&mut self, label: ir::Label) {
        self.push(ir::Stmt::Label { label });
    }

    fn jump(&mut self, loc: Span, to: ir::Label) {
        self.push(ir::Stmt::Jump { loc, to });
    }

    fn cjump(&mut self, loc: Span, cond: ir::Expr, then_label: ir::Label, else_label: ir::Label) {
        self.push(ir::Stmt::CondJump { loc, cond, then_label, else_label });
    }

    fn push_break(&mut self, label: ir::Label) {
        self.break_stack.push(label);
    }

    fn pop_break(&mut self) {
        self.break_stack.pop().expect("(bug!) break stack underflow");
    }

    fn push_continue(&mut self, label: ir::Label) {
        self.continue_stack.push(label);
    }

    fn pop_continue(&mut self) {
        self.continue_stack.pop().expect("(bug!) continue stack underflow");
    }

    // ------------------
    // User labels.

    /// Get or create the jump-map entry for `name`.
    fn jump_entry(&mut self, name: &Sp<Ident>) -> &mut JumpEntry {
        if !self.jump_map.contains_key(&name.value) {
            let label = self.new_label();
            self.jump_map.insert(name.value.clone(), JumpEntry {
                label,
                defined: false,
                ref_count: 0,
                location: name.span,
            });
        }
        self.jump_map.get_mut(&name.value).expect("just inserted")
    }

    fn define_label(&mut self, name: &Sp<Ident>) -> Result<ir::Label, crate::error::Diagnostic> {
        let span = name.span;
        let entry = self.jump_entry(name);
        if entry.defined {
            return Err(error!(
                message("duplicate label `{}`", name),
                primary(span, "label already defined in this function"),
                secondary(entry.location, "previous definition is here"),
            ));
        }
        entry.defined = true;
        entry.location = span;
        Ok(entry.label)
    }

    fn refer_label(&mut self, name: &Sp<Ident>) -> ir::Label {
        let entry = self.jump_entry(name);
        entry.ref_count += 1;
        entry.label
    }

    /// Post-pass audit: `goto` without a label is an error, a label without a
    /// `goto` is only a warning.
    fn audit_jump_map(&mut self) {
        for (name, entry) in &self.jump_map {
            if !entry.defined {
                self.sink.emit(error!(
                    message("undefined label `{}`", name),
                    primary(entry.location, "no such label in this function"),
                ));
            } else if entry.ref_count == 0 {
                self.sink.emit(warning!(
                    message("unused label `{}`", name),
                    primary(entry.location, "nothing jumps here"),
                ));
            }
        }
    }

    // ------------------
    // Temporaries.

    fn current_scope(&self) -> ScopeId {
        *self.scope_stack.last().expect("(bug!) no active scope for temporary")
    }

    /// Mint a temporary in the innermost active scope.
    fn tmp_var(&mut self, ty: crate::types::TypeId) -> EntityId {
        let scope = self.current_scope();
        self.entities.declare_temporary(scope, ty)
    }

    fn ref_var(&self, entity: EntityId) -> ir::Expr {
        ir::Expr::Var { ty: self.entities.get(entity).ty, entity }
    }
}
