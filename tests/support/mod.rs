//! Shared helpers for the lowering tests.
//!
//! [`Builder`] plays the role of the upstream semantic analyzer: it hands out
//! entities and fully-typed expression nodes with all the analysis results
//! (decay flags, member offsets, element sizes) already filled in, the way
//! the real front end would.

use flintc::ast::{self, BinaryOp, ExprKind, IncDecOp, UnaryOp};
use flintc::consts::ConstTable;
use flintc::entity::{Entity, EntityId, EntityTable, ScopeId, Storage};
use flintc::ir;
use flintc::pos::Sp;
use flintc::types::{Type, TypeId, TypeTable};
use flintc::{lower, sp, ErrorSink};

pub struct Builder {
    pub types: TypeTable,
    pub entities: EntityTable,
    pub consts: ConstTable,
    pub int: TypeId,
    pub long: TypeId,
}

impl Builder {
    pub fn new() -> Builder {
        let types = TypeTable::new();
        let int = types.signed_int();
        let long = types.ptr_diff_type();
        Builder {
            types,
            entities: EntityTable::new(),
            consts: ConstTable::new(),
            int,
            long,
        }
    }

    // ------------------
    // Types.

    pub fn ptr(&mut self, base: TypeId) -> TypeId {
        self.types.pointer_to(base)
    }

    pub fn array(&mut self, base: TypeId, length: u64) -> TypeId {
        self.types.intern(Type::Array { base, length })
    }

    pub fn uint(&mut self) -> TypeId {
        self.types.intern(Type::Integer { size: 4, signed: false })
    }

    /// A struct with sequentially-packed members.
    pub fn strukt(&mut self, name: &str, members: &[(&str, TypeId)]) -> TypeId {
        let mut laid_out = vec![];
        let mut offset = 0;
        for &(member_name, ty) in members {
            laid_out.push(flintc::types::Member {
                name: member_name.parse().unwrap(),
                ty,
                offset,
            });
            offset += self.types.size_of(ty);
        }
        self.types.intern(Type::Struct {
            name: name.parse().unwrap(),
            size: offset,
            members: laid_out,
        })
    }

    // ------------------
    // Entities.

    pub fn scope(&mut self) -> ScopeId {
        self.entities.new_scope()
    }

    pub fn local(&mut self, scope: ScopeId, name: &str, ty: TypeId) -> EntityId {
        self.define(scope, name, ty, Storage::Local)
    }

    pub fn static_var(&mut self, scope: ScopeId, name: &str, ty: TypeId) -> EntityId {
        self.define(scope, name, ty, Storage::Static)
    }

    fn define(&mut self, scope: ScopeId, name: &str, ty: TypeId, storage: Storage) -> EntityId {
        let cannot_load = matches!(
            self.types.get(ty),
            Type::Array { .. } | Type::Struct { .. } | Type::Function { .. },
        );
        self.entities.define(Entity {
            name: name.parse().unwrap(),
            ty,
            storage,
            cannot_load,
            scope,
        })
    }

    /// A function entity with the given return type.
    pub fn function(&mut self, scope: ScopeId, name: &str, return_type: TypeId) -> EntityId {
        let ty = self.types.intern(Type::Function {
            return_type,
            params: vec![],
            variadic: false,
        });
        self.define(scope, name, ty, Storage::Static)
    }

    // ------------------
    // Expressions.  All analysis results are attached here, as the semantic
    // analyzer would have.

    fn expr(&self, ty: TypeId, kind: ExprKind) -> Sp<ast::Expr> {
        // array-typed lvalues decay to their own address
        let eval_to_address = self.types.is_array(ty);
        sp!(ast::Expr { ty, eval_to_address, kind })
    }

    pub fn int_lit(&mut self, value: i64) -> Sp<ast::Expr> {
        self.expr(self.int, ExprKind::Int(value))
    }

    pub fn str_lit(&mut self, text: &str) -> Sp<ast::Expr> {
        let entry = self.consts.intern(text);
        let char_ty = self.types.intern(Type::Integer { size: 1, signed: true });
        let ty = self.types.pointer_to(char_ty);
        self.expr(ty, ExprKind::Str(entry))
    }

    pub fn var(&mut self, entity: EntityId) -> Sp<ast::Expr> {
        let ty = self.entities.get(entity).ty;
        self.expr(ty, ExprKind::Var(entity))
    }

    pub fn bin(&mut self, op: &str, ty: TypeId, lhs: Sp<ast::Expr>, rhs: Sp<ast::Expr>) -> Sp<ast::Expr> {
        let op: BinaryOp = op.parse().unwrap();
        self.expr(ty, ExprKind::Bin {
            op: op.into(),
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    /// A comparison or logical operator; the result is `int`.
    pub fn cmp(&mut self, op: &str, lhs: Sp<ast::Expr>, rhs: Sp<ast::Expr>) -> Sp<ast::Expr> {
        let int = self.int;
        self.bin(op, int, lhs, rhs)
    }

    pub fn unary(&mut self, op: &str, operand: Sp<ast::Expr>) -> Sp<ast::Expr> {
        let op: UnaryOp = op.parse().unwrap();
        let ty = operand.ty;
        self.expr(ty, ExprKind::Unary { op: op.into(), expr: Box::new(operand) })
    }

    pub fn prefix(&mut self, op: &str, target: Sp<ast::Expr>) -> Sp<ast::Expr> {
        let op: IncDecOp = op.parse().unwrap();
        let ty = target.ty;
        self.expr(ty, ExprKind::Prefix { op: op.into(), expr: Box::new(target) })
    }

    pub fn suffix(&mut self, op: &str, target: Sp<ast::Expr>) -> Sp<ast::Expr> {
        let op: IncDecOp = op.parse().unwrap();
        let ty = target.ty;
        self.expr(ty, ExprKind::Suffix { op: op.into(), expr: Box::new(target) })
    }

    pub fn assign(&mut self, lhs: Sp<ast::Expr>, rhs: Sp<ast::Expr>) -> Sp<ast::Expr> {
        let ty = lhs.ty;
        self.expr(ty, ExprKind::Assign { lhs: Box::new(lhs), rhs: Box::new(rhs) })
    }

    pub fn op_assign(&mut self, op: &str, lhs: Sp<ast::Expr>, rhs: Sp<ast::Expr>) -> Sp<ast::Expr> {
        let op: BinaryOp = op.parse().unwrap();
        let ty = lhs.ty;
        self.expr(ty, ExprKind::OpAssign {
            op: op.into(),
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    pub fn ternary(&mut self, cond: Sp<ast::Expr>, then_expr: Sp<ast::Expr>, else_expr: Sp<ast::Expr>) -> Sp<ast::Expr> {
        let ty = then_expr.ty;
        self.expr(ty, ExprKind::Ternary {
            cond: Box::new(cond),
            then_expr: Box::new(then_expr),
            else_expr: Box::new(else_expr),
        })
    }

    pub fn call(&mut self, callee: EntityId, args: Vec<Sp<ast::Expr>>) -> Sp<ast::Expr> {
        let ty = match self.types.get(self.entities.get(callee).ty) {
            Type::Function { return_type, .. } => *return_type,
            other => panic!("call target is not a function: {:?}", other),
        };
        let callee = self.var(callee);
        self.expr(ty, ExprKind::Funcall { callee: Box::new(callee), args })
    }

    /// `base[index]`, with element size, dimension length, and the
    /// multi-dimension flag derived the way the analyzer derives them.
    pub fn index(&mut self, base: Sp<ast::Expr>, index: Sp<ast::Expr>) -> Sp<ast::Expr> {
        let (elem, length) = match self.types.get(base.ty) {
            Type::Array { base, length } => (*base, *length),
            other => panic!("indexing into non-array {:?}", other),
        };
        let element_size = self.types.size_of(elem);
        let multi_dimension =
            matches!(base.kind, ExprKind::Aref { .. }) && self.types.is_array(base.ty);
        self.expr(elem, ExprKind::Aref {
            base: Box::new(base),
            index: Box::new(index),
            element_size,
            length,
            multi_dimension,
        })
    }

    pub fn member(&mut self, base: Sp<ast::Expr>, name: &str) -> Sp<ast::Expr> {
        let (ty, offset) = self.lookup_member(base.ty, name);
        self.expr(ty, ExprKind::Member {
            base: Box::new(base),
            member: name.parse::<flintc::Ident>().unwrap().into(),
            offset,
        })
    }

    pub fn ptr_member(&mut self, base: Sp<ast::Expr>, name: &str) -> Sp<ast::Expr> {
        let struct_ty = self.types.base_type(base.ty);
        let (ty, offset) = self.lookup_member(struct_ty, name);
        self.expr(ty, ExprKind::PtrMember {
            base: Box::new(base),
            member: name.parse::<flintc::Ident>().unwrap().into(),
            offset,
        })
    }

    fn lookup_member(&self, struct_ty: TypeId, name: &str) -> (TypeId, u64) {
        match self.types.get(struct_ty) {
            Type::Struct { members, .. } => {
                let member = members.iter()
                    .find(|member| member.name.as_str() == name)
                    .unwrap_or_else(|| panic!("no member named {}", name));
                (member.ty, member.offset)
            }
            other => panic!("member access into non-struct {:?}", other),
        }
    }

    pub fn deref(&mut self, operand: Sp<ast::Expr>) -> Sp<ast::Expr> {
        let ty = self.types.base_type(operand.ty);
        self.expr(ty, ExprKind::Deref { expr: Box::new(operand) })
    }

    pub fn addr(&mut self, operand: Sp<ast::Expr>) -> Sp<ast::Expr> {
        let ty = self.types.pointer_to(operand.ty);
        self.expr(ty, ExprKind::Addr { expr: Box::new(operand) })
    }

    pub fn cast(&mut self, ty: TypeId, effective: bool, operand: Sp<ast::Expr>) -> Sp<ast::Expr> {
        self.expr(ty, ExprKind::Cast { effective, expr: Box::new(operand) })
    }

    pub fn sizeof(&mut self, alloc_size: u64) -> Sp<ast::Expr> {
        self.expr(self.int, ExprKind::Sizeof { alloc_size })
    }

    // ------------------
    // Statements.

    pub fn expr_stmt(&self, expr: Sp<ast::Expr>) -> Sp<ast::Stmt> {
        ast::Stmt::Expr(expr).into()
    }

    pub fn block(&self, scope: ScopeId, variables: Vec<ast::DefinedVariable>, stmts: Vec<Sp<ast::Stmt>>) -> ast::Block {
        ast::Block { scope, variables, stmts }
    }

    pub fn block_stmt(&self, block: ast::Block) -> Sp<ast::Stmt> {
        ast::Stmt::Block(block).into()
    }

    pub fn if_(&self, cond: Sp<ast::Expr>, then_body: Sp<ast::Stmt>, else_body: Option<Sp<ast::Stmt>>) -> Sp<ast::Stmt> {
        ast::Stmt::If {
            cond,
            then_body: Box::new(then_body),
            else_body: else_body.map(Box::new),
        }.into()
    }

    pub fn while_(&self, cond: Sp<ast::Expr>, body: Sp<ast::Stmt>) -> Sp<ast::Stmt> {
        ast::Stmt::While { cond, body: Box::new(body) }.into()
    }

    pub fn do_while(&self, body: Sp<ast::Stmt>, cond: Sp<ast::Expr>) -> Sp<ast::Stmt> {
        ast::Stmt::DoWhile { body: Box::new(body), cond }.into()
    }

    pub fn for_(
        &self,
        init: Option<Sp<ast::Expr>>,
        cond: Option<Sp<ast::Expr>>,
        step: Option<Sp<ast::Expr>>,
        body: Sp<ast::Stmt>,
    ) -> Sp<ast::Stmt> {
        ast::Stmt::For { init, cond, step, body: Box::new(body) }.into()
    }

    pub fn switch(&self, cond: Sp<ast::Expr>, cases: Vec<ast::SwitchCase>) -> Sp<ast::Stmt> {
        ast::Stmt::Switch { cond, cases }.into()
    }

    pub fn case(&self, values: Vec<Sp<ast::Expr>>, body: ast::Block) -> ast::SwitchCase {
        ast::SwitchCase { values, body }
    }

    pub fn default_case(&self, body: ast::Block) -> ast::SwitchCase {
        ast::SwitchCase { values: vec![], body }
    }

    pub fn break_(&self) -> Sp<ast::Stmt> {
        ast::Stmt::Break.into()
    }

    pub fn continue_(&self) -> Sp<ast::Stmt> {
        ast::Stmt::Continue.into()
    }

    pub fn label(&self, name: &str, body: Option<Sp<ast::Stmt>>) -> Sp<ast::Stmt> {
        ast::Stmt::Label {
            name: name.parse::<flintc::Ident>().unwrap().into(),
            body: body.map(Box::new),
        }.into()
    }

    pub fn goto(&self, target: &str) -> Sp<ast::Stmt> {
        ast::Stmt::Goto {
            target: target.parse::<flintc::Ident>().unwrap().into(),
        }.into()
    }

    pub fn ret(&self, value: Option<Sp<ast::Expr>>) -> Sp<ast::Stmt> {
        ast::Stmt::Return { value }.into()
    }

    // ------------------
    // Driving the pass.

    /// Wrap `stmts` in a single function and lower the whole program.
    pub fn lower_body(self, scope: ScopeId, stmts: Vec<Sp<ast::Stmt>>) -> Lowered {
        self.lower_body_with_vars(scope, vec![], stmts)
    }

    pub fn lower_body_with_vars(
        mut self,
        scope: ScopeId,
        variables: Vec<ast::DefinedVariable>,
        stmts: Vec<Sp<ast::Stmt>>,
    ) -> Lowered {
        let int = self.int;
        let main = self.function(scope, "main", int);
        let body = ast::Block { scope, variables, stmts };
        let mut program = ast::Program {
            types: self.types,
            entities: self.entities,
            consts: self.consts,
            defined_variables: vec![],
            defined_functions: vec![ast::DefinedFunction { entity: main, body }],
        };
        Lowered::from_run(&mut program)
    }

    /// Lower a program consisting only of module-scope variables.
    pub fn lower_module_vars(self, variables: Vec<ast::DefinedVariable>) -> Lowered {
        let mut program = ast::Program {
            types: self.types,
            entities: self.entities,
            consts: self.consts,
            defined_variables: variables,
            defined_functions: vec![],
        };
        Lowered::from_run(&mut program)
    }

    pub fn defined_var(&self, entity: EntityId, init: Option<Sp<ast::Expr>>) -> ast::DefinedVariable {
        ast::DefinedVariable { entity, init }
    }
}

/// The outcome of one lowering run, rendered for comparison.
pub struct Lowered {
    pub ok: bool,
    /// The first function's body, one line per statement.
    pub lines: Vec<String>,
    /// All diagnostics, as `"severity: message"` strings.
    pub diagnostics: Vec<String>,
    /// Variables with lowered initializers (module-scope and static locals),
    /// as `(name, rendered init)` pairs.
    pub var_inits: Vec<(String, String)>,
}

impl Lowered {
    fn from_run(program: &mut ast::Program) -> Lowered {
        let mut sink = ErrorSink::new();
        let result = lower::run(program, &mut sink);
        let diagnostics = sink.diagnostics().iter().map(|d| d.to_string()).collect();
        match result {
            Ok(ir) => {
                for func in &ir.functions {
                    ir::validate::check_body(&func.body, &program.types)
                        .expect("lowered body violates the IR invariants");
                }
                let lines = match ir.functions.first() {
                    Some(func) => {
                        ir::stringify_body(&func.body, &program.entities, &program.consts)
                            .lines()
                            .map(str::to_owned)
                            .collect()
                    }
                    None => vec![],
                };
                let var_inits = ir.variables.iter()
                    .filter_map(|var| {
                        let init = var.init.as_ref()?;
                        Some((
                            program.entities.get(var.entity).name.to_string(),
                            ir::stringify_expr(init, &program.entities, &program.consts),
                        ))
                    })
                    .collect();
                Lowered { ok: true, lines, diagnostics, var_inits }
            }
            Err(_) => Lowered { ok: false, lines: vec![], diagnostics, var_inits: vec![] },
        }
    }
}
